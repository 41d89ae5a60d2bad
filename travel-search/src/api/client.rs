use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::{backend::SearchBackend, dto};
use crate::{
    error::{Result, SearchError},
    session_store::SessionStore,
    types::{SearchRequest, SuggestionItem, MIN_QUERY_LEN},
};

pub const DEFAULT_API_URL: &str = "https://localhost:7060/api";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the backend search API.
///
/// Every request carries the stored bearer token. A 401 clears the session
/// store before the error is returned.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>) -> Result<Self> {
        Self::with_timeout(base_url, session, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        session: Arc<dyn SessionStore>,
        timeout: Duration,
    ) -> Result<Self> {
        // Trailing slash so `join` appends to the `/api` path instead of replacing it.
        let base_url = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| {
                SearchError::validation(format!("Invalid API URL {}: {}", base_url, e))
            })?;

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers())
            .build()
            .map_err(|e| SearchError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| {
                SearchError::validation(format!("Failed to build URL for {}: {}", path, e))
            })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        request: RequestBuilder,
        call_name: &str,
        fallback: &str,
    ) -> Result<Response> {
        let response = self.authorize(request).send().await.map_err(|e| {
            let err = SearchError::from(e);
            tracing::warn!(call = call_name, error = ?err, "request failed without response");
            err
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(call = call_name, "unauthorized, clearing stored session");
            if let Err(e) = self.session.clear() {
                tracing::warn!(error = %e, "failed to clear session after 401");
            }
            return Err(SearchError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = dto::error_message(&body).unwrap_or_else(|| fallback.to_string());
            tracing::warn!(call = call_name, status = status.as_u16(), %message, "request returned error");
            return Err(SearchError::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Body as JSON. A body that is not JSON is logged and read as `null`.
    async fn get_json(
        &self,
        request: RequestBuilder,
        call_name: &str,
        fallback: &str,
    ) -> Result<Value> {
        let response = self.send(request, call_name, fallback).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body).unwrap_or_else(|e| {
            tracing::warn!(call = call_name, error = %e, "response body is not JSON");
            Value::Null
        }))
    }
}

fn default_headers() -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );
    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    headers
}

#[async_trait]
impl SearchBackend for ApiClient {
    #[instrument(
        name = "GET /Search/{type}",
        skip(self, request),
        fields(content_type = %request.content_type, page = request.page)
    )]
    async fn search(&self, request: &SearchRequest) -> Result<Value> {
        let content_type = request.content_type;
        self.get_json(
            self.client
                .get(self.endpoint(content_type.endpoint())?)
                .query(&request.query_params()),
            content_type.endpoint(),
            content_type.failure_message(),
        )
        .await
    }

    #[instrument(name = "GET /Search/autocomplete", skip(self))]
    async fn autocomplete(&self, query: &str) -> Result<Vec<SuggestionItem>> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Ok(Vec::new());
        }

        let body = self
            .get_json(
                self.client
                    .get(self.endpoint("Search/autocomplete")?)
                    .query(&[("query", query)]),
                "Search/autocomplete",
                "Failed to get autocomplete suggestions",
            )
            .await?;

        Ok(dto::parse_suggestions(body))
    }

    #[instrument(name = "GET /Search/health", skip(self))]
    async fn health(&self) -> Result<Value> {
        self.get_json(
            self.client.get(self.endpoint("Search/health")?),
            "Search/health",
            "Search service is unavailable",
        )
        .await
    }
}
