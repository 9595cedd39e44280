//! Scripted in-memory transport for unit tests.

use crate::{ApiRequest, ApiResponse, AuthResult, Transport};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

type Handler = Box<dyn Fn(&ApiRequest) -> AuthResult<ApiResponse> + Send + Sync>;

pub const REFRESH_PATH: &str = "/auth/refresh";

/// A business request as it reached the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentRequest {
    pub path: String,
    pub authorization: Option<String>,
}

/// Routes `REFRESH_PATH` to the refresh handler and everything else to the
/// request handler, recording what was sent.
pub struct ScriptedTransport {
    refresh_handler: Mutex<Handler>,
    request_handler: Mutex<Handler>,
    refresh_delay: Mutex<Duration>,
    request_delay: Mutex<Duration>,
    refresh_calls: AtomicUsize,
    refresh_bodies: Mutex<Vec<serde_json::Value>>,
    sent: Mutex<Vec<SentRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            refresh_handler: Mutex::new(Box::new(|_| {
                Ok(ApiResponse::new(StatusCode::INTERNAL_SERVER_ERROR, Vec::new()))
            })),
            request_handler: Mutex::new(Box::new(|_| Ok(ApiResponse::new(StatusCode::OK, Vec::new())))),
            refresh_delay: Mutex::new(Duration::ZERO),
            request_delay: Mutex::new(Duration::ZERO),
            refresh_calls: AtomicUsize::new(0),
            refresh_bodies: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn on_refresh(
        &self,
        handler: impl Fn(&ApiRequest) -> AuthResult<ApiResponse> + Send + Sync + 'static,
    ) {
        *self.refresh_handler.lock() = Box::new(handler);
    }

    pub fn on_request(
        &self,
        handler: impl Fn(&ApiRequest) -> AuthResult<ApiResponse> + Send + Sync + 'static,
    ) {
        *self.request_handler.lock() = Box::new(handler);
    }

    /// Refresh answers `{"accessToken": access_token}` with status 200.
    pub fn refresh_succeeds(&self, access_token: &'static str) {
        self.on_refresh(move |_| {
            Ok(ApiResponse::new(
                StatusCode::OK,
                serde_json::to_vec(&serde_json::json!({ "accessToken": access_token }))?,
            ))
        });
    }

    /// Refresh answers with `status` and a small JSON error body.
    pub fn refresh_fails(&self, status: StatusCode) {
        self.on_refresh(move |_| {
            Ok(ApiResponse::new(status, br#"{"error":"invalid_grant"}"#.to_vec()))
        });
    }

    /// Business requests get 200 when they carry `Bearer <token>`, else 401.
    pub fn accept_only(&self, token: &'static str) {
        let expected = format!("Bearer {}", token);
        self.on_request(move |request| {
            let status = if request.header(AUTHORIZATION) == Some(expected.as_str()) {
                StatusCode::OK
            } else {
                StatusCode::UNAUTHORIZED
            };
            Ok(ApiResponse::new(status, br#"{"ok":true}"#.to_vec()))
        });
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        *self.refresh_delay.lock() = delay;
    }

    pub fn set_request_delay(&self, delay: Duration) {
        *self.request_delay.lock() = delay;
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_bodies(&self) -> Vec<serde_json::Value> {
        self.refresh_bodies.lock().clone()
    }

    pub fn sent(&self) -> Vec<SentRequest> {
        self.sent.lock().clone()
    }

    /// Authorization headers of business requests, in send order.
    pub fn authorizations(&self) -> Vec<Option<String>> {
        self.sent().into_iter().map(|s| s.authorization).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> AuthResult<ApiResponse> {
        if request.path == REFRESH_PATH {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(body) = &request.body {
                self.refresh_bodies.lock().push(serde_json::from_slice(body)?);
            }
            let delay = *self.refresh_delay.lock();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let handler = self.refresh_handler.lock();
            return (*handler)(request);
        }

        self.sent.lock().push(SentRequest {
            path: request.path.clone(),
            authorization: request.header(AUTHORIZATION).map(str::to_string),
        });
        let delay = *self.request_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let handler = self.request_handler.lock();
        (*handler)(request)
    }
}
