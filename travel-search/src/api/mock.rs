//! Scriptable backend for tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{json, Value};

use super::backend::SearchBackend;
use crate::{
    error::Result,
    types::{SearchRequest, SuggestionItem},
};

/// Backend whose answers are scripted up front.
///
/// Every call is recorded so tests can assert what reached the "network".
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use travel_search::MockBackend;
///
/// let backend = MockBackend::new()
///     .with_search_response(json!({"results": [], "total": 0}));
/// assert_eq!(backend.search_call_count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    queued_searches: VecDeque<Result<Value>>,
    default_search: Option<Value>,
    search_delay: Duration,
    suggestions: HashMap<String, Result<Vec<SuggestionItem>>>,
    suggestion_delays: HashMap<String, Duration>,
    search_calls: Vec<SearchRequest>,
    autocomplete_calls: Vec<String>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Body returned by every search that has nothing queued.
    pub fn with_search_response(self, body: Value) -> Self {
        self.state().default_search = Some(body);
        self
    }

    /// Queue a one-off search outcome, consumed in order.
    pub fn push_search_result(&self, result: Result<Value>) {
        self.state().queued_searches.push_back(result);
    }

    pub fn with_search_delay(self, delay: Duration) -> Self {
        self.state().search_delay = delay;
        self
    }

    pub fn with_suggestions(self, query: &str, items: Vec<SuggestionItem>) -> Self {
        self.state().suggestions.insert(query.to_string(), Ok(items));
        self
    }

    pub fn with_autocomplete_error(self, query: &str, error: crate::SearchError) -> Self {
        self.state()
            .suggestions
            .insert(query.to_string(), Err(error));
        self
    }

    /// Delay the autocomplete answer for `query`.
    pub fn with_suggestion_delay(self, query: &str, delay: Duration) -> Self {
        self.state()
            .suggestion_delays
            .insert(query.to_string(), delay);
        self
    }

    pub fn search_calls(&self) -> Vec<SearchRequest> {
        self.state().search_calls.clone()
    }

    pub fn search_call_count(&self) -> usize {
        self.state().search_calls.len()
    }

    pub fn autocomplete_calls(&self) -> Vec<String> {
        self.state().autocomplete_calls.clone()
    }

    pub fn autocomplete_call_count(&self) -> usize {
        self.state().autocomplete_calls.len()
    }
}

#[async_trait]
impl SearchBackend for MockBackend {
    async fn search(&self, request: &SearchRequest) -> Result<Value> {
        let (outcome, delay) = {
            let mut state = self.state();
            state.search_calls.push(request.clone());
            let outcome = match state.queued_searches.pop_front() {
                Some(outcome) => outcome,
                None => Ok(state.default_search.clone().unwrap_or_else(|| {
                    json!({"results": [], "total": 0, "page": 1, "pageSize": 10})
                })),
            };
            (outcome, state.search_delay)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        outcome
    }

    async fn autocomplete(&self, query: &str) -> Result<Vec<SuggestionItem>> {
        let (outcome, delay) = {
            let mut state = self.state();
            state.autocomplete_calls.push(query.to_string());
            let outcome = state
                .suggestions
                .get(query)
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()));
            let delay = state
                .suggestion_delays
                .get(query)
                .copied()
                .unwrap_or_default();
            (outcome, delay)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        outcome
    }

    async fn health(&self) -> Result<Value> {
        Ok(json!({"status": "Healthy", "backend": "mock"}))
    }
}
