use thiserror::Error;

use crate::content_type::ContentType;

/// Every failure the search module can report to its caller.
///
/// Validation variants are produced before any network call is made.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid search type: {0}")]
    InvalidSearchType(String),

    #[error("Sort key `{key}` is not available for {content_type}")]
    InvalidSortKey {
        key: String,
        content_type: ContentType,
    },

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Session expired. Log in again to continue.")]
    Unauthorized,

    #[error("Request timed out")]
    Timeout,

    /// No response was received. The detail is kept for logs only.
    #[error("Network error")]
    Network(String),

    #[error("Session store error: {0}")]
    Session(String),
}

impl SearchError {
    pub fn validation(message: impl Into<String>) -> Self {
        SearchError::Validation(message.into())
    }

    /// True for errors raised before a request was issued.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SearchError::Validation(_)
                | SearchError::InvalidSearchType(_)
                | SearchError::InvalidSortKey { .. }
        )
    }

    /// HTTP status carried by the error, if the server responded at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            SearchError::Http { status, .. } => Some(*status),
            SearchError::Unauthorized => Some(401),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout
        } else if let Some(status) = e.status() {
            SearchError::Http {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            SearchError::Network(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_hides_detail_in_display() {
        let err = SearchError::Network("connection refused (os error 111)".to_string());
        assert_eq!(err.to_string(), "Network error");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn validation_variants_are_flagged() {
        assert!(SearchError::validation("Search query is required").is_validation());
        assert!(SearchError::InvalidSearchType("cars".to_string()).is_validation());
        assert!(!SearchError::Timeout.is_validation());
        assert!(!SearchError::Unauthorized.is_validation());
    }

    #[test]
    fn http_error_exposes_status() {
        let err = SearchError::Http {
            status: 503,
            message: "Search index unavailable".to_string(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "Search index unavailable");
    }
}
