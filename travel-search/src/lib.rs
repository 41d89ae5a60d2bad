//! Client-side search coordination for the travel portal.
//!
//! The crate wires together the pieces a front end needs to drive the
//! backend search API:
//!
//! - [`SearchCoordinator`] - owns query text, content type, sort and filters,
//!   and runs the type-specific search call
//! - [`SuggestionFetcher`] - debounced autocomplete where only the latest
//!   input may update visible state
//! - [`format`] / [`sort`] - normalise raw backend bodies and re-order items
//! - [`Pagination`] - page-index arithmetic and the visible page window
//!
//! All network access goes through the [`SearchBackend`] trait so the
//! coordinator can run against the real HTTP API ([`ApiClient`]), seeded
//! in-memory data ([`DevBackend`]) or a scripted mock in tests.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use travel_search::{ApiClient, ContentType, FileSessionStore, SearchCoordinator};
//!
//! let session = Arc::new(FileSessionStore::default_location()?);
//! let client = Arc::new(ApiClient::new("https://localhost:7060/api", session)?);
//! let mut coordinator = SearchCoordinator::new(client);
//!
//! coordinator.set_query_text("paris");
//! coordinator.set_content_type(ContentType::Hotels);
//! let response = coordinator.execute_search(1, None, None).await?;
//! println!("{} hotels", response.total);
//! ```

pub mod api;
mod content_type;
mod coordinator;
mod error;
mod filters;
mod format;
mod pagination;
mod session_store;
mod suggestions;
mod types;

pub use api::{ApiClient, DevBackend, MockBackend, SearchBackend};
pub use content_type::ContentType;
pub use coordinator::{SearchCoordinator, SearchState};
pub use error::{Result, SearchError};
pub use filters::SearchFilters;
pub use format::{format, sort};
pub use pagination::Pagination;
pub use session_store::{FileSessionStore, MemorySessionStore, Session, SessionStore, SessionUser};
pub use suggestions::{SuggestionFetcher, SuggestionState, DEFAULT_DEBOUNCE};
pub use types::{
    total_pages, validate_query, SearchItem, SearchRequest, SearchResponse, SuggestionItem,
    SuggestionKind, MIN_QUERY_LEN, PAGE_SIZE,
};
