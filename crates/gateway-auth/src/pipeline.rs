//! Credential attachment for outgoing requests.

use crate::{ApiRequest, AuthResult, RequestAttempt};
use gateway_storage::CredentialStore;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use std::sync::Arc;

/// Attaches the stored access token to every outgoing request.
pub struct RequestPipeline {
    store: Arc<CredentialStore>,
}

impl RequestPipeline {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self { store }
    }

    /// Build the request to transmit for `attempt`.
    ///
    /// Without a stored credential the request goes out unauthenticated and
    /// the server's 401 is left to the response guard.
    pub fn prepare(&self, attempt: &mut RequestAttempt) -> AuthResult<ApiRequest> {
        let token = self.store.access_token();
        if token.is_none() {
            tracing::debug!(
                request_id = %attempt.id(),
                path = %attempt.request().path,
                "no stored credential; sending unauthenticated"
            );
        }

        let outgoing = with_bearer(attempt.request(), token.as_deref())?;
        attempt.record_sent_with(token);
        Ok(outgoing)
    }
}

/// Copy of `request` carrying `Authorization: Bearer <token>`.
///
/// Any caller-supplied Authorization header is replaced.
pub(crate) fn with_bearer(request: &ApiRequest, token: Option<&str>) -> AuthResult<ApiRequest> {
    let mut outgoing = request.clone();
    outgoing.headers.remove(AUTHORIZATION);

    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))?;
        value.set_sensitive(true);
        outgoing.headers.insert(AUTHORIZATION, value);
    }

    Ok(outgoing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_storage::{CredentialPair, MemoryStorage};

    fn pipeline_with(pair: Option<CredentialPair>) -> RequestPipeline {
        let store = Arc::new(CredentialStore::new(Arc::new(MemoryStorage::new())));
        if let Some(pair) = pair {
            store.write(&pair).unwrap();
        }
        RequestPipeline::new(store)
    }

    #[test]
    fn test_attaches_stored_token() {
        let pipeline = pipeline_with(Some(CredentialPair::new("A1", "R1")));
        let mut attempt = RequestAttempt::new(ApiRequest::get("/me"));

        let outgoing = pipeline.prepare(&mut attempt).unwrap();

        assert_eq!(outgoing.header(AUTHORIZATION), Some("Bearer A1"));
        assert_eq!(attempt.sent_with(), Some("A1"));
        assert!(attempt.request().header(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_sends_unauthenticated_without_credentials() {
        let pipeline = pipeline_with(None);
        let mut attempt = RequestAttempt::new(ApiRequest::get("/public"));

        let outgoing = pipeline.prepare(&mut attempt).unwrap();

        assert!(outgoing.header(AUTHORIZATION).is_none());
        assert_eq!(attempt.sent_with(), None);
    }

    #[test]
    fn test_replaces_caller_authorization_header() {
        let request = ApiRequest::get("/me")
            .with_header(AUTHORIZATION, "Bearer stale")
            .unwrap();

        let outgoing = with_bearer(&request, Some("fresh")).unwrap();
        assert_eq!(outgoing.header(AUTHORIZATION), Some("Bearer fresh"));

        let stripped = with_bearer(&request, None).unwrap();
        assert!(stripped.header(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_bearer_header_is_sensitive() {
        let outgoing = with_bearer(&ApiRequest::get("/me"), Some("A1")).unwrap();
        assert!(outgoing.headers[AUTHORIZATION].is_sensitive());
    }
}
