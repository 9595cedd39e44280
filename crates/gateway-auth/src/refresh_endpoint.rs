//! Refresh endpoint client.
//!
//! `POST <refresh_path>` with `{"refreshToken": "..."}`. A 2xx answer carries
//! `{"accessToken": "...", "refreshToken": "..."}`, the refresh token being
//! optional. Every other outcome is a refresh failure.

use crate::{ApiRequest, AuthError, RefreshFailure, Transport};
use gateway_storage::CredentialPair;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

pub struct RefreshEndpoint {
    transport: Arc<dyn Transport>,
    path: String,
}

impl RefreshEndpoint {
    pub fn new(transport: Arc<dyn Transport>, path: impl Into<String>) -> Self {
        Self {
            transport,
            path: path.into(),
        }
    }

    /// Exchange `refresh_token` for a new pair.
    ///
    /// When the server does not rotate the refresh token the current one is
    /// kept in the returned pair.
    pub async fn exchange(&self, refresh_token: &str) -> Result<CredentialPair, RefreshFailure> {
        let request = ApiRequest::post(self.path.as_str())
            .with_json(&RefreshRequest { refresh_token })
            .map_err(|e| RefreshFailure::Network(e.to_string()))?;

        tracing::debug!(path = %self.path, "calling refresh endpoint");

        let response = self.transport.send(&request).await.map_err(|e| match e {
            AuthError::Timeout => RefreshFailure::Timeout,
            other => RefreshFailure::Network(other.to_string()),
        })?;

        if !response.is_success() {
            let body_summary = summarize_body(&response.body);
            tracing::warn!(
                status = response.status.as_u16(),
                body = %body_summary,
                "refresh endpoint rejected the request"
            );
            return Err(RefreshFailure::Rejected {
                status: response.status.as_u16(),
                body_summary,
            });
        }

        let data: RefreshResponse = serde_json::from_slice(&response.body)
            .map_err(|e| RefreshFailure::MalformedResponse(e.to_string()))?;

        if data.access_token.is_empty() {
            return Err(RefreshFailure::MalformedResponse(
                "empty accessToken".to_string(),
            ));
        }

        let rotated = data.refresh_token.filter(|t| !t.is_empty());
        tracing::debug!(rotated = rotated.is_some(), "refresh endpoint issued new credential");

        Ok(CredentialPair {
            access_token: data.access_token,
            refresh_token: rotated.unwrap_or_else(|| refresh_token.to_string()),
        })
    }
}

/// Length and short digest of a body, safe to log.
pub(crate) fn summarize_body(body: &[u8]) -> String {
    if body.is_empty() {
        return "empty body".to_string();
    }
    let digest = Sha256::digest(body);
    let short: String = digest[..6].iter().map(|b| format!("{:02x}", b)).collect();
    format!("{} bytes, sha256:{}", body.len(), short)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedTransport;
    use crate::ApiResponse;
    use reqwest::StatusCode;

    fn endpoint(transport: &Arc<ScriptedTransport>) -> RefreshEndpoint {
        RefreshEndpoint::new(transport.clone(), "/auth/refresh")
    }

    #[tokio::test]
    async fn test_exchange_with_rotation() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on_refresh(|_| {
            Ok(ApiResponse::new(
                StatusCode::OK,
                br#"{"accessToken":"A2","refreshToken":"R2"}"#.to_vec(),
            ))
        });

        let pair = endpoint(&transport).exchange("R1").await.unwrap();

        assert_eq!(pair, CredentialPair::new("A2", "R2"));
        let sent = transport.refresh_bodies();
        assert_eq!(sent, vec![serde_json::json!({"refreshToken": "R1"})]);
    }

    #[tokio::test]
    async fn test_exchange_keeps_refresh_token_when_not_rotated() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on_refresh(|_| {
            Ok(ApiResponse::new(StatusCode::OK, br#"{"accessToken":"A2"}"#.to_vec()))
        });

        let pair = endpoint(&transport).exchange("R1").await.unwrap();
        assert_eq!(pair, CredentialPair::new("A2", "R1"));
    }

    #[tokio::test]
    async fn test_exchange_non_success_is_rejected() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on_refresh(|_| {
            Ok(ApiResponse::new(
                StatusCode::BAD_REQUEST,
                br#"{"error":"invalid_grant"}"#.to_vec(),
            ))
        });

        let err = endpoint(&transport).exchange("R1").await.unwrap_err();
        match err {
            RefreshFailure::Rejected {
                status,
                body_summary,
            } => {
                assert_eq!(status, 400);
                assert!(!body_summary.contains("invalid_grant"));
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_exchange_malformed_body() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on_refresh(|_| Ok(ApiResponse::new(StatusCode::OK, b"<html>".to_vec())));

        let err = endpoint(&transport).exchange("R1").await.unwrap_err();
        assert!(matches!(err, RefreshFailure::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_exchange_transport_errors() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.on_refresh(|_| Err(AuthError::Timeout));
        let err = endpoint(&transport).exchange("R1").await.unwrap_err();
        assert_eq!(err, RefreshFailure::Timeout);

        transport.on_refresh(|_| Err(AuthError::NetworkUnavailable));
        let err = endpoint(&transport).exchange("R1").await.unwrap_err();
        assert!(matches!(err, RefreshFailure::Network(_)));
    }

    #[test]
    fn test_summarize_body() {
        assert_eq!(summarize_body(b""), "empty body");
        let summary = summarize_body(b"secret-token");
        assert!(summary.starts_with("12 bytes, sha256:"));
        assert!(!summary.contains("secret"));
    }
}
