use async_trait::async_trait;
use serde_json::Value;

use crate::{
    error::Result,
    types::{SearchRequest, SuggestionItem},
};

/// The backend search surface the coordinator and suggestion fetcher use.
///
/// Search bodies are returned raw; shaping them is the formatter's job so a
/// malformed body never becomes an error.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// `GET /Search/{type}` for the request's content type.
    async fn search(&self, request: &SearchRequest) -> Result<Value>;

    /// `GET /Search/autocomplete`. Queries shorter than two characters
    /// resolve to an empty list without a network call.
    async fn autocomplete(&self, query: &str) -> Result<Vec<SuggestionItem>>;

    /// `GET /Search/health`.
    async fn health(&self) -> Result<Value>;
}
