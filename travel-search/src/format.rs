//! Normalisation and client-side ordering of search responses.

use std::cmp::Ordering;

use serde_json::Value;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::{
    content_type::ContentType,
    types::{total_pages, SearchItem, SearchResponse, PAGE_SIZE},
};

/// Shape a raw backend body into a [`SearchResponse`].
///
/// A body without a `results` array or a numeric `total` becomes the empty
/// response rather than an error. Non-object entries in `results` are dropped.
pub fn format(raw: &Value, content_type: ContentType) -> SearchResponse {
    let Some(items) = raw.get("results").and_then(Value::as_array) else {
        tracing::warn!(%content_type, "search response has no results array");
        return SearchResponse::empty();
    };
    let Some(total) = raw.get("total").and_then(as_count) else {
        tracing::warn!(%content_type, "search response has no usable total");
        return SearchResponse::empty();
    };

    let page_size = raw
        .get("pageSize")
        .and_then(as_count)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(PAGE_SIZE);
    let page = raw
        .get("page")
        .and_then(as_count)
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(1);

    let results: Vec<SearchItem> = items
        .iter()
        .cloned()
        .filter_map(SearchItem::from_value)
        .collect();

    tracing::debug!(%content_type, total, page, count = results.len(), "formatted search response");

    SearchResponse {
        results,
        total,
        page,
        page_size,
        total_pages: total_pages(total, page_size),
    }
}

fn as_count(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    })
}

#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Number(f64),
    Date(OffsetDateTime),
    Text(String),
}

impl SortValue {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().map(SortValue::Number),
            Value::Bool(b) => Some(SortValue::Number(if *b { 1.0 } else { 0.0 })),
            Value::String(s) => Some(
                OffsetDateTime::parse(s, &Rfc3339)
                    .map(SortValue::Date)
                    .unwrap_or_else(|_| SortValue::Text(s.to_lowercase())),
            ),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Number(_) => 0,
            SortValue::Date(_) => 1,
            SortValue::Text(_) => 2,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Stable sort of `items` by the field `key`.
///
/// Strings compare case-insensitively, numbers numerically and RFC 3339
/// timestamps chronologically. Items without the field keep their relative
/// order after all items that have it. A key no item carries leaves the
/// input untouched.
pub fn sort(items: Vec<SearchItem>, key: &str, descending: bool) -> Vec<SearchItem> {
    if key.is_empty() || !items.iter().any(|item| item.get(key).is_some()) {
        return items;
    }

    let mut keyed: Vec<(Option<SortValue>, SearchItem)> = items
        .into_iter()
        .map(|item| (item.get(key).and_then(SortValue::from_json), item))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => {
            let ordering = a.compare(b);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items(values: Vec<Value>) -> Vec<SearchItem> {
        values
            .into_iter()
            .map(|v| SearchItem::from_value(v).unwrap())
            .collect()
    }

    fn names(items: &[SearchItem]) -> Vec<&str> {
        items.iter().map(|i| i.name().unwrap_or("-")).collect()
    }

    #[test]
    fn format_null_results_is_empty() {
        let response = format(&json!({"results": null, "total": 0}), ContentType::Destinations);
        assert_eq!(response, SearchResponse::empty());
        assert_eq!(response.total_pages, 0);
    }

    #[test]
    fn format_non_object_body_is_empty() {
        assert_eq!(format(&json!("oops"), ContentType::Flights), SearchResponse::empty());
        assert_eq!(format(&Value::Null, ContentType::Flights), SearchResponse::empty());
        assert_eq!(
            format(&json!({"results": [], "total": "many"}), ContentType::Hotels),
            SearchResponse::empty()
        );
    }

    #[test]
    fn format_computes_total_pages() {
        let raw = json!({
            "results": [{"id": 1, "name": "Paris"}, {"id": 2, "name": "Parma"}],
            "total": 23,
            "page": 1,
            "pageSize": 10
        });
        let response = format(&raw, ContentType::Destinations);
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.total, 23);
        assert_eq!(response.total_pages, 3);
        assert!(response.is_displayable());
    }

    #[test]
    fn format_falls_back_on_missing_paging_fields() {
        let raw = json!({"results": [{"id": 1}, 42], "total": 1});
        let response = format(&raw, ContentType::Hotels);
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.page, 1);
        assert_eq!(response.page_size, PAGE_SIZE);
        assert_eq!(response.total_pages, 1);
    }

    #[test]
    fn format_is_pure() {
        let raw = json!({"results": [{"id": 1}], "total": 11, "page": 2, "pageSize": 10});
        assert_eq!(
            format(&raw, ContentType::Flights),
            format(&raw, ContentType::Flights)
        );
    }

    #[test]
    fn sort_strings_case_insensitively() {
        let sorted = sort(
            items(vec![
                json!({"name": "lisbon"}),
                json!({"name": "Amsterdam"}),
                json!({"name": "berlin"}),
            ]),
            "name",
            false,
        );
        assert_eq!(names(&sorted), vec!["Amsterdam", "berlin", "lisbon"]);
    }

    #[test]
    fn sort_numbers_numerically() {
        let sorted = sort(
            items(vec![
                json!({"name": "b", "price": 900}),
                json!({"name": "a", "price": 85.5}),
                json!({"name": "c", "price": 1200}),
            ]),
            "price",
            true,
        );
        assert_eq!(names(&sorted), vec!["c", "b", "a"]);
    }

    #[test]
    fn sort_dates_chronologically_across_offsets() {
        let sorted = sort(
            items(vec![
                json!({"name": "utc", "departureTime": "2025-03-01T09:00:00Z"}),
                json!({"name": "pkt", "departureTime": "2025-03-01T10:00:00+05:00"}),
            ]),
            "departureTime",
            false,
        );
        assert_eq!(names(&sorted), vec!["pkt", "utc"]);
    }

    #[test]
    fn sort_descending_reverses_ascending_for_distinct_keys() {
        let input = items(vec![
            json!({"name": "Quetta"}),
            json!({"name": "Gilgit"}),
            json!({"name": "Multan"}),
            json!({"name": "Swat"}),
        ]);
        let ascending = sort(input, "name", false);
        let mut expected = ascending.clone();
        expected.reverse();
        assert_eq!(sort(ascending, "name", true), expected);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let sorted = sort(
            items(vec![
                json!({"name": "first", "rating": 4}),
                json!({"name": "top", "rating": 5}),
                json!({"name": "second", "rating": 4}),
            ]),
            "rating",
            true,
        );
        assert_eq!(names(&sorted), vec!["top", "first", "second"]);
    }

    #[test]
    fn sort_unknown_key_is_noop() {
        let input = items(vec![json!({"name": "z"}), json!({"name": "a"})]);
        assert_eq!(sort(input.clone(), "stars", false), input);
        assert_eq!(sort(input.clone(), "", true), input);
    }

    #[test]
    fn sort_puts_missing_values_last() {
        let sorted = sort(
            items(vec![
                json!({"name": "none"}),
                json!({"name": "cheap", "pricePerNight": 10}),
                json!({"name": "null", "pricePerNight": null}),
                json!({"name": "dear", "pricePerNight": 99}),
            ]),
            "pricePerNight",
            true,
        );
        assert_eq!(names(&sorted), vec!["dear", "cheap", "none", "null"]);
    }
}
