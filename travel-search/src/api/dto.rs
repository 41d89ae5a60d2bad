use serde::Deserialize;
use serde_json::Value;

use crate::types::SuggestionItem;

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// `message` from a JSON error body, if there is a non-empty one.
pub(crate) fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
}

/// Accepts a bare array or `{ "suggestions": [...] }`. Entries that do not
/// parse are skipped.
pub(crate) fn parse_suggestions(body: Value) -> Vec<SuggestionItem> {
    let entries = match body {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("suggestions") {
            Some(Value::Array(entries)) => entries,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<SuggestionItem>(entry).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SuggestionKind;
    use serde_json::json;

    #[test]
    fn parses_bare_array_and_skips_unknown_kinds() {
        let items = parse_suggestions(json!([
            {"text": "Paris", "type": "destination"},
            {"text": "Park Lane", "type": "hotel"},
            {"text": "PIA 301", "type": "flight"},
            {"label": "broken"}
        ]));
        assert_eq!(
            items,
            vec![
                SuggestionItem::new("Paris", SuggestionKind::Destination),
                SuggestionItem::new("Park Lane", SuggestionKind::Hotel),
            ]
        );
    }

    #[test]
    fn parses_wrapped_suggestions() {
        let items = parse_suggestions(json!({
            "query": "pa",
            "suggestions": [{"text": "Paris", "type": "destination"}]
        }));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn unexpected_shapes_are_empty() {
        assert!(parse_suggestions(json!(null)).is_empty());
        assert!(parse_suggestions(json!({"suggestions": "none"})).is_empty());
    }

    #[test]
    fn error_message_requires_message_field() {
        assert_eq!(
            error_message(br#"{"message": "Index offline"}"#).as_deref(),
            Some("Index offline")
        );
        assert_eq!(error_message(br#"{"title": "Bad Request"}"#), None);
        assert_eq!(error_message(b"<html>502</html>"), None);
    }
}
