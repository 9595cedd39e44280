//! Client error types.

use thiserror::Error;

/// Why a refresh cycle failed.
///
/// Cloned to every caller that joined the cycle, so it carries strings
/// rather than source errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshFailure {
    /// Nothing to exchange; the store holds no refresh token
    #[error("no refresh token stored")]
    NoRefreshToken,

    /// Refresh endpoint answered with a non-success status
    #[error("refresh rejected with HTTP {status} ({body_summary})")]
    Rejected { status: u16, body_summary: String },

    /// Transport failure while calling the refresh endpoint
    #[error("refresh request failed: {0}")]
    Network(String),

    /// Refresh call exceeded the request timeout
    #[error("refresh request timed out")]
    Timeout,

    /// Success status but the body was not a usable credential
    #[error("malformed refresh response: {0}")]
    MalformedResponse(String),

    /// New credentials could not be stored
    #[error("failed to persist refreshed credentials: {0}")]
    Persist(String),
}

/// Client error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Authorization failure that will not be recovered
    #[error("Unauthorized (HTTP {status}, retried: {retried})")]
    Unauthorized { status: u16, retried: bool },

    /// Session ended because the credential could not be refreshed
    #[error("Session expired: {0}")]
    SessionExpired(RefreshFailure),

    /// Refresh cycle ended without settling this caller
    #[error("Refresh aborted before completion")]
    RefreshAborted,

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] gateway_storage::StorageError),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Header value rejected by the HTTP layer
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Network unavailable (transient error, can retry)
    #[error("Network unavailable")]
    NetworkUnavailable,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuthError {
    /// Returns true if the caller should treat this as "session ended, log in again".
    pub fn is_authorization_error(&self) -> bool {
        matches!(
            self,
            AuthError::Unauthorized { .. } | AuthError::SessionExpired(_)
        )
    }

    /// Returns true if this error is transient and the operation can be retried.
    ///
    /// Transient errors include:
    /// - Network unavailable
    /// - HTTP errors with 5xx status codes
    /// - Connection timeouts
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::NetworkUnavailable => true,
            AuthError::Timeout => true,
            AuthError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                if let Some(status) = e.status() {
                    return status.is_server_error();
                }
                false
            }
            _ => false,
        }
    }
}

impl From<gateway_config::CoreError> for AuthError {
    fn from(err: gateway_config::CoreError) -> Self {
        AuthError::Config(err.to_string())
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_transient_network_errors() {
        assert!(AuthError::NetworkUnavailable.is_transient());
        assert!(AuthError::Timeout.is_transient());
    }

    #[test]
    fn test_authorization_errors_are_not_transient() {
        let unauthorized = AuthError::Unauthorized {
            status: 401,
            retried: true,
        };
        assert!(unauthorized.is_authorization_error());
        assert!(!unauthorized.is_transient());

        let expired = AuthError::SessionExpired(RefreshFailure::Timeout);
        assert!(expired.is_authorization_error());
        assert!(!expired.is_transient());
    }

    #[test]
    fn test_transport_errors_are_not_authorization_errors() {
        assert!(!AuthError::Timeout.is_authorization_error());
        assert!(!AuthError::NetworkUnavailable.is_authorization_error());
        assert!(!AuthError::RefreshAborted.is_authorization_error());
    }

    #[test]
    fn test_refresh_failure_display() {
        let failure = RefreshFailure::Rejected {
            status: 400,
            body_summary: "12 bytes".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "refresh rejected with HTTP 400 (12 bytes)"
        );
        assert_eq!(
            AuthError::SessionExpired(failure).to_string(),
            "Session expired: refresh rejected with HTTP 400 (12 bytes)"
        );
    }

    #[test]
    fn test_core_error_maps_to_config() {
        let err: AuthError = gateway_config::CoreError::Config("bad".into()).into();
        assert!(matches!(err, AuthError::Config(_)));
    }
}
