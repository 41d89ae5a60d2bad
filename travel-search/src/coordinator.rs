use std::sync::Arc;

use tracing::instrument;

use crate::{
    api::SearchBackend,
    content_type::ContentType,
    error::{Result, SearchError},
    filters::SearchFilters,
    format::{format, sort},
    pagination::Pagination,
    types::{validate_query, SearchRequest, SearchResponse, PAGE_SIZE},
};

/// Everything a search view renders. Lives as long as the view.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub query: String,
    pub content_type: ContentType,
    pub results: Option<SearchResponse>,
    pub loading: bool,
    pub error: Option<SearchError>,
    pub current_page: u32,
    pub sort_key: Option<String>,
    pub sort_descending: bool,
    pub filters: SearchFilters,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: String::new(),
            content_type: ContentType::default(),
            results: None,
            loading: false,
            error: None,
            current_page: 1,
            sort_key: None,
            sort_descending: false,
            filters: SearchFilters::default(),
        }
    }
}

/// Owns the search view state and runs searches against a backend.
///
/// Methods take `&mut self`, so one coordinator never has two searches in
/// flight at once.
pub struct SearchCoordinator<B: SearchBackend + ?Sized> {
    backend: Arc<B>,
    state: SearchState,
}

impl<B: SearchBackend + ?Sized> SearchCoordinator<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            state: SearchState::default(),
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn set_query_text(&mut self, text: impl Into<String>) {
        self.state.query = text.into();
    }

    /// Switch the search domain. Results of the old type are dropped so they
    /// are never shown under the wrong columns.
    pub fn set_content_type(&mut self, content_type: ContentType) {
        if self.state.content_type == content_type {
            return;
        }

        self.state.content_type = content_type;
        self.state.results = None;
        self.state.current_page = 1;

        if let Some(key) = &self.state.sort_key {
            if !content_type.is_valid_sort_key(key) {
                tracing::debug!(%key, %content_type, "dropping sort key not valid for new type");
                self.state.sort_key = None;
            }
        }
    }

    /// Change ordering. With results on screen the last search is re-run at
    /// the current page so the server decides the order.
    ///
    /// Returns the refreshed response when a re-run happened.
    pub async fn set_sort(
        &mut self,
        key: Option<&str>,
        descending: bool,
    ) -> Result<Option<&SearchResponse>> {
        let key = key.map(str::trim).filter(|k| !k.is_empty());
        let content_type = self.state.content_type;
        if let Some(key) = key {
            if !content_type.is_valid_sort_key(key) {
                return Err(SearchError::InvalidSortKey {
                    key: key.to_string(),
                    content_type,
                });
            }
        }

        let key = key.map(str::to_string);
        if self.state.sort_key == key && self.state.sort_descending == descending {
            return Ok(None);
        }

        self.state.sort_key = key;
        self.state.sort_descending = descending;

        if self.state.results.is_none() || validate_query(&self.state.query).is_err() {
            return Ok(None);
        }

        let page = self.state.current_page;
        self.execute_search(page, None, None).await.map(Some)
    }

    /// Run a search. Overrides replace the stored query text and content
    /// type before the request is made.
    ///
    /// Invalid input fails before the backend is called. Failures are also
    /// recorded in [`SearchState::error`]; earlier results stay in place.
    #[instrument(skip(self, override_query), fields(content_type = tracing::field::Empty))]
    pub async fn execute_search(
        &mut self,
        page: u32,
        override_query: Option<&str>,
        override_type: Option<ContentType>,
    ) -> Result<&SearchResponse> {
        if let Some(content_type) = override_type {
            self.set_content_type(content_type);
        }
        if let Some(query) = override_query {
            self.set_query_text(query);
        }

        let content_type = self.state.content_type;
        tracing::Span::current().record("content_type", tracing::field::display(content_type));

        let query = match validate_query(&self.state.query) {
            Ok(query) => query.to_string(),
            Err(e) => {
                tracing::debug!(error = %e, "search rejected before request");
                self.state.error = Some(e.clone());
                return Err(e);
            }
        };

        let page = page.max(1);
        self.state.loading = true;
        self.state.error = None;
        self.state.current_page = page;

        let request = SearchRequest::new(query, content_type)
            .with_page(page)
            .with_sort(self.state.sort_key.clone(), self.state.sort_descending)
            .with_filters(self.state.filters.to_vec());

        let outcome = self.backend.search(&request).await;
        self.state.loading = false;

        match outcome {
            Ok(raw) => {
                let mut response = format(&raw, content_type);
                if response.total > 0 && raw.get("page").is_none() {
                    response.page = page;
                }
                if let Some(key) = &self.state.sort_key {
                    response.results = sort(response.results, key, self.state.sort_descending);
                }
                tracing::info!(total = response.total, page, "search completed");
                Ok(&*self.state.results.insert(response))
            }
            Err(e) => {
                tracing::warn!(error = %e, "search failed");
                self.state.error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Drop results and errors, back to page 1.
    pub fn clear_results(&mut self) {
        self.state.results = None;
        self.state.current_page = 1;
        self.state.error = None;
    }

    /// Back to a blank search, keeping the selected content type.
    pub fn reset_search(&mut self) {
        self.state = SearchState {
            content_type: self.state.content_type,
            ..SearchState::default()
        };
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.state.filters
    }

    /// Filters apply from the next search on.
    pub fn filters_mut(&mut self) -> &mut SearchFilters {
        &mut self.state.filters
    }

    pub fn has_results(&self) -> bool {
        self.state
            .results
            .as_ref()
            .is_some_and(|r| !r.results.is_empty())
    }

    pub fn total_results(&self) -> u64 {
        self.state.results.as_ref().map_or(0, |r| r.total)
    }

    pub fn total_pages(&self) -> u32 {
        self.state.results.as_ref().map_or(0, |r| r.total_pages)
    }

    /// Page tracker for the current result set, positioned on the current page.
    pub fn pagination(&self) -> Pagination {
        let page_size = self
            .state
            .results
            .as_ref()
            .map_or(PAGE_SIZE, |r| r.page_size);
        let mut pagination = Pagination::new(self.total_results(), page_size);
        pagination.go_to_page(self.state.current_page);
        pagination
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use serde_json::{json, Value};

    fn destinations_page(total: u64, names: &[&str]) -> Value {
        let results: Vec<Value> = names
            .iter()
            .enumerate()
            .map(|(i, name)| json!({"id": i + 1, "name": name, "country": "France"}))
            .collect();
        json!({"results": results, "total": total, "page": 1, "pageSize": 10})
    }

    fn coordinator(backend: &Arc<MockBackend>) -> SearchCoordinator<MockBackend> {
        SearchCoordinator::new(Arc::clone(backend))
    }

    #[tokio::test]
    async fn short_query_never_reaches_backend() {
        let backend = Arc::new(MockBackend::new());
        let mut search = coordinator(&backend);

        for query in ["", " ", "p", " p "] {
            search.set_query_text(query);
            let err = search.execute_search(1, None, None).await.unwrap_err();
            assert!(err.is_validation());
        }

        assert_eq!(backend.search_call_count(), 0);
        assert_eq!(
            search.state().error,
            Some(SearchError::validation(
                "Search query must be at least 2 characters long"
            ))
        );
        assert!(!search.state().loading);
    }

    #[tokio::test]
    async fn search_routes_to_selected_type_and_formats() {
        let backend = Arc::new(
            MockBackend::new().with_search_response(destinations_page(23, &["Paris", "Parma"])),
        );
        let mut search = coordinator(&backend);
        search.set_query_text("  par ");

        let response = search.execute_search(1, None, None).await.unwrap();
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.results.len(), 2);

        let calls = backend.search_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query, "par");
        assert_eq!(calls[0].content_type, ContentType::Destinations);
        assert_eq!(calls[0].page_size, 10);

        assert!(search.has_results());
        assert_eq!(search.total_results(), 23);
        assert_eq!(search.pagination().page_numbers(5), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn overrides_replace_query_and_type() {
        let backend = Arc::new(MockBackend::new());
        let mut search = coordinator(&backend);
        search.set_query_text("ignored");

        search
            .execute_search(2, Some("Serena Hunza"), Some(ContentType::Hotels))
            .await
            .unwrap();

        let call = &backend.search_calls()[0];
        assert_eq!(call.query, "Serena Hunza");
        assert_eq!(call.content_type, ContentType::Hotels);
        assert_eq!(call.page, 2);
        assert_eq!(search.state().content_type, ContentType::Hotels);
        assert_eq!(search.state().current_page, 2);
    }

    #[tokio::test]
    async fn switching_type_clears_results_and_page() {
        let backend = Arc::new(
            MockBackend::new().with_search_response(destinations_page(23, &["Paris"])),
        );
        let mut search = coordinator(&backend);
        search.set_query_text("par");
        search.execute_search(3, None, None).await.unwrap();
        assert_eq!(search.state().current_page, 3);

        search.set_content_type(ContentType::Flights);

        assert_eq!(search.state().results, None);
        assert_eq!(search.state().current_page, 1);
        assert_eq!(search.total_pages(), 0);
        assert_eq!(backend.search_call_count(), 1);
    }

    #[tokio::test]
    async fn switching_type_drops_incompatible_sort_key() {
        let backend = Arc::new(MockBackend::new());
        let mut search = coordinator(&backend);
        search.set_content_type(ContentType::Flights);
        search.set_sort(Some("price"), true).await.unwrap();

        search.set_content_type(ContentType::Hotels);
        assert_eq!(search.state().sort_key, None);

        search.set_sort(Some("name"), false).await.unwrap();
        search.set_content_type(ContentType::Destinations);
        assert_eq!(search.state().sort_key.as_deref(), Some("name"));
    }

    #[tokio::test]
    async fn sort_change_reruns_search_at_current_page() {
        let backend = Arc::new(MockBackend::new().with_search_response(json!({
            "results": [
                {"id": 1, "name": "a", "rating": 3},
                {"id": 2, "name": "b", "rating": 5}
            ],
            "total": 32, "page": 2, "pageSize": 10
        })));
        let mut search = coordinator(&backend);
        search.set_content_type(ContentType::Hotels);
        search.set_query_text("lahore");
        search.execute_search(2, None, None).await.unwrap();

        let refreshed = search
            .set_sort(Some("rating"), true)
            .await
            .unwrap()
            .expect("search re-run");
        let names: Vec<_> = refreshed.results.iter().filter_map(|r| r.name()).collect();
        assert_eq!(names, vec!["b", "a"]);

        let calls = backend.search_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].page, 2);
        assert_eq!(calls[1].sort_key.as_deref(), Some("rating"));
        assert!(calls[1].sort_descending);
    }

    #[tokio::test]
    async fn sort_change_without_results_only_records() {
        let backend = Arc::new(MockBackend::new());
        let mut search = coordinator(&backend);
        search.set_content_type(ContentType::Flights);

        assert_eq!(search.set_sort(Some("departureTime"), false).await, Ok(None));
        assert_eq!(search.state().sort_key.as_deref(), Some("departureTime"));
        assert_eq!(backend.search_call_count(), 0);
    }

    #[tokio::test]
    async fn invalid_sort_key_is_rejected() {
        let backend = Arc::new(MockBackend::new());
        let mut search = coordinator(&backend);

        let err = search.set_sort(Some("price"), false).await.unwrap_err();
        assert_eq!(
            err,
            SearchError::InvalidSortKey {
                key: "price".to_string(),
                content_type: ContentType::Destinations,
            }
        );
        assert_eq!(search.state().sort_key, None);
    }

    #[tokio::test]
    async fn network_failure_is_returned_and_loading_reset() {
        let backend = Arc::new(MockBackend::new());
        backend.push_search_result(Err(SearchError::Network("connection refused".to_string())));
        let mut search = coordinator(&backend);
        search.set_query_text("skardu");

        let err = search.execute_search(1, None, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Network error");
        assert!(!search.state().loading);
        assert_eq!(search.state().error, Some(err));
    }

    #[tokio::test]
    async fn failure_keeps_previous_results() {
        let backend = Arc::new(
            MockBackend::new().with_search_response(destinations_page(1, &["Paris"])),
        );
        let mut search = coordinator(&backend);
        search.set_query_text("paris");
        search.execute_search(1, None, None).await.unwrap();

        backend.push_search_result(Err(SearchError::Timeout));
        assert!(search.execute_search(1, None, None).await.is_err());
        assert!(search.has_results());

        search.execute_search(1, None, None).await.unwrap();
        assert_eq!(search.state().error, None);
    }

    #[tokio::test]
    async fn malformed_body_is_an_empty_success() {
        let backend = Arc::new(MockBackend::new());
        backend.push_search_result(Ok(json!({"results": null, "total": 0})));
        let mut search = coordinator(&backend);
        search.set_query_text("atlantis");

        let response = search.execute_search(1, None, None).await.unwrap();
        assert_eq!(response, &SearchResponse::empty());
        assert!(!search.has_results());
        assert_eq!(search.state().error, None);
    }

    #[tokio::test]
    async fn missing_page_in_body_uses_requested_page() {
        let backend = Arc::new(MockBackend::new().with_search_response(json!({
            "results": [{"id": 21, "name": "Swat"}],
            "total": 21
        })));
        let mut search = coordinator(&backend);
        search.set_query_text("swat");

        let response = search.execute_search(3, None, None).await.unwrap();
        assert_eq!(response.page, 3);
        assert!(response.is_displayable());
    }

    #[tokio::test]
    async fn filters_travel_with_request() {
        let backend = Arc::new(MockBackend::new());
        let mut search = coordinator(&backend);
        search.set_query_text("paris");
        search.filters_mut().add("country", "France");
        search.filters_mut().toggle("rating", "5");

        search.execute_search(1, None, None).await.unwrap();

        assert_eq!(
            backend.search_calls()[0].filters,
            vec![
                ("country".to_string(), "France".to_string()),
                ("rating".to_string(), "5".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn reset_search_keeps_content_type() {
        let backend = Arc::new(
            MockBackend::new().with_search_response(destinations_page(1, &["Paris"])),
        );
        let mut search = coordinator(&backend);
        search.set_content_type(ContentType::Hotels);
        search.set_query_text("paris");
        search.filters_mut().add("rating", "5");
        search.execute_search(1, None, None).await.unwrap();

        search.reset_search();

        let state = search.state();
        assert_eq!(state.query, "");
        assert_eq!(state.results, None);
        assert!(state.filters.is_empty());
        assert_eq!(state.content_type, ContentType::Hotels);
        assert_eq!(state.current_page, 1);
    }

    #[tokio::test]
    async fn clear_results_keeps_query() {
        let backend = Arc::new(
            MockBackend::new().with_search_response(destinations_page(12, &["Paris"])),
        );
        let mut search = coordinator(&backend);
        search.set_query_text("paris");
        search.execute_search(2, None, None).await.unwrap();

        search.clear_results();
        assert_eq!(search.state().query, "paris");
        assert_eq!(search.state().current_page, 1);
        assert!(!search.has_results());
    }

    #[tokio::test]
    async fn works_behind_trait_object() {
        let backend: Arc<dyn SearchBackend> = Arc::new(crate::api::DevBackend::new());
        let mut search = SearchCoordinator::new(backend);
        search.set_query_text("skardu");
        let response = search
            .execute_search(1, None, Some(ContentType::Flights))
            .await
            .unwrap();
        assert_eq!(response.total, 2);
    }
}
