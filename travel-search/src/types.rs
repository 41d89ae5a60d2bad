use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    content_type::ContentType,
    error::{Result, SearchError},
};

/// Page size used for every search request.
pub const PAGE_SIZE: u32 = 10;

/// Shortest trimmed query that is worth sending to the backend.
pub const MIN_QUERY_LEN: usize = 2;

/// Check a query before it is sent and return its trimmed form.
pub fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SearchError::validation("Search query is required"));
    }
    if trimmed.chars().count() < MIN_QUERY_LEN {
        return Err(SearchError::validation(
            "Search query must be at least 2 characters long",
        ));
    }
    Ok(trimmed)
}

/// `ceil(total / page_size)`, with an empty result set having zero pages.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}

/// Parameters of one search call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub content_type: ContentType,
    pub page: u32,
    pub page_size: u32,
    pub sort_key: Option<String>,
    pub sort_descending: bool,
    /// `(key, value)` pairs, sent as `filters=key:value`.
    pub filters: Vec<(String, String)>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, content_type: ContentType) -> Self {
        Self {
            query: query.into(),
            content_type,
            page: 1,
            page_size: PAGE_SIZE,
            sort_key: None,
            sort_descending: false,
            filters: Vec::new(),
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_sort(mut self, key: Option<String>, descending: bool) -> Self {
        self.sort_key = key;
        self.sort_descending = descending;
        self
    }

    pub fn with_filters(mut self, filters: Vec<(String, String)>) -> Self {
        self.filters = filters;
        self
    }

    /// Query string pairs in the order the backend documents them.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("query", self.query.trim().to_string()),
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ];

        if let Some(key) = self.sort_key.as_deref().filter(|k| !k.is_empty()) {
            params.push(("sortBy", key.to_string()));
        }
        if self.sort_descending {
            params.push(("sortDescending", "true".to_string()));
        }
        for (key, value) in &self.filters {
            params.push(("filters", format!("{}:{}", key, value)));
        }

        params
    }
}

/// One record of a search response.
///
/// The column schema depends on the content type and is owned by the server,
/// so the record is kept as a JSON object with typed accessors on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchItem(Map<String, Value>);

impl SearchItem {
    /// Wrap a JSON value. Anything other than an object is rejected.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    /// Record id, whether the server sends it as a string or a number.
    pub fn id(&self) -> Option<String> {
        match self.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn field(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => "?".to_string(),
        }
    }

    /// One-line description using the columns of the given content type.
    pub fn summary(&self, content_type: ContentType) -> String {
        match content_type {
            ContentType::Destinations => {
                format!("{} ({})", self.field("name"), self.field("country"))
            }
            ContentType::Flights => format!(
                "{}: {} → {}, PKR {}, departs {}",
                self.field("airline"),
                self.field("departureDestination"),
                self.field("arrivalDestination"),
                self.field("price"),
                self.field("departureTime"),
            ),
            ContentType::Hotels => format!(
                "{}, {} ({}★), PKR {} per night",
                self.field("name"),
                self.field("destination"),
                self.field("rating"),
                self.field("pricePerNight"),
            ),
        }
    }
}

/// A search response normalised for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchItem>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl SearchResponse {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            total: 0,
            page: 1,
            page_size: PAGE_SIZE,
            total_pages: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether `page` lies inside `[1, total_pages]`.
    pub fn is_displayable(&self) -> bool {
        self.page >= 1 && self.page <= self.total_pages
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Destination,
    Hotel,
}

/// An autocomplete entry, as returned by `GET /Search/autocomplete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionItem {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
}

impl SuggestionItem {
    pub fn new(text: impl Into<String>, kind: SuggestionKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// The content type a search for this suggestion should use.
    pub fn content_type(&self) -> ContentType {
        match self.kind {
            SuggestionKind::Destination => ContentType::Destinations,
            SuggestionKind::Hotel => ContentType::Hotels,
        }
    }
}
