//! Authenticated API client.
//!
//! ```text
//! caller ─► RequestPipeline ─► Transport ─► ResponseGuard ─┬─► caller
//!                                                         │ 401, first time
//!                                                         ▼
//!                                  RefreshCoordinator ─► RetryExecutor ─► caller
//! ```

use crate::coordinator::RefreshCoordinator;
use crate::guard::{ResponseGuard, Verdict};
use crate::pipeline::RequestPipeline;
use crate::refresh_endpoint::RefreshEndpoint;
use crate::retry::RetryExecutor;
use crate::session::{SessionCallback, SessionEvent, SessionNotifier};
use crate::{
    ApiRequest, ApiResponse, AuthError, AuthResult, ClientConfig, RefreshSnapshot,
    ReqwestTransport, RequestAttempt, Transport,
};
use gateway_storage::{CredentialPair, CredentialStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Sends requests with the stored bearer credential and recovers from an
/// expired credential transparently.
///
/// Cloning is cheap; clones share the credential store and refresh state.
#[derive(Clone)]
pub struct AuthenticatedClient {
    inner: Arc<Inner>,
}

struct Inner {
    transport: Arc<dyn Transport>,
    store: Arc<CredentialStore>,
    pipeline: RequestPipeline,
    guard: ResponseGuard,
    coordinator: RefreshCoordinator,
    retry: RetryExecutor,
    notifier: Arc<SessionNotifier>,
}

impl AuthenticatedClient {
    /// Client over HTTP using `reqwest`.
    pub fn new(config: &ClientConfig, store: Arc<CredentialStore>) -> AuthResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(config)?);
        Ok(Self::with_transport(config, store, transport))
    }

    /// Client over any [`Transport`].
    pub fn with_transport(
        config: &ClientConfig,
        store: Arc<CredentialStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let notifier = Arc::new(SessionNotifier::default());
        let coordinator = RefreshCoordinator::new(
            store.clone(),
            RefreshEndpoint::new(transport.clone(), config.refresh_path.clone()),
            config.request_timeout,
            notifier.clone(),
        );

        Self {
            inner: Arc::new(Inner {
                pipeline: RequestPipeline::new(store.clone()),
                guard: ResponseGuard::new(),
                retry: RetryExecutor::new(transport.clone()),
                transport,
                store,
                coordinator,
                notifier,
            }),
        }
    }

    /// Send `request` and return the final response.
    ///
    /// A first 401 triggers one refresh and one replay. Transport errors and
    /// non-401 responses are returned unchanged. A 401 on the replay or a
    /// failed refresh is an authorization error, and the stored credential is
    /// gone afterwards.
    pub async fn execute(&self, request: ApiRequest) -> AuthResult<ApiResponse> {
        let inner = &self.inner;
        let mut attempt = RequestAttempt::new(request);

        let outgoing = inner.pipeline.prepare(&mut attempt)?;
        debug!(
            request_id = %attempt.id(),
            method = %outgoing.method,
            path = %outgoing.path,
            "sending request"
        );
        let response = inner.transport.send(&outgoing).await?;

        match inner.guard.inspect(&response, &mut attempt) {
            Verdict::PassThrough => return Ok(response),
            Verdict::Reject => return Err(unauthorized(&response, &attempt)),
            Verdict::Recover => {}
        }

        let access_token = inner.coordinator.refresh(attempt.sent_with()).await?;
        let replayed = inner.retry.replay(&mut attempt, &access_token).await?;

        match inner.guard.inspect(&replayed, &mut attempt) {
            Verdict::PassThrough => Ok(replayed),
            Verdict::Recover | Verdict::Reject => {
                inner
                    .coordinator
                    .end_session_if_current(&access_token, "request rejected after refresh");
                Err(unauthorized(&replayed, &attempt))
            }
        }
    }

    pub async fn get(&self, path: &str) -> AuthResult<ApiResponse> {
        self.execute(ApiRequest::get(path)).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> AuthResult<ApiResponse> {
        self.execute(ApiRequest::post(path).with_json(body)?).await
    }

    /// Store a pair obtained from a login flow.
    pub fn login(&self, pair: &CredentialPair) -> AuthResult<()> {
        self.inner.store.write(pair)?;
        info!("credentials stored");
        self.inner.notifier.notify(SessionEvent::LoggedIn);
        Ok(())
    }

    /// Discard the stored pair. Safe to call when logged out.
    pub fn logout(&self) -> AuthResult<()> {
        self.inner.store.clear()?;
        info!("logged out");
        self.inner.notifier.notify(SessionEvent::LoggedOut);
        Ok(())
    }

    pub fn credentials(&self) -> Option<CredentialPair> {
        self.inner.store.read()
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.store.has_credentials()
    }

    pub fn refresh_snapshot(&self) -> RefreshSnapshot {
        self.inner.coordinator.snapshot()
    }

    /// Set a callback to be notified of session changes.
    pub fn set_session_callback(&self, callback: SessionCallback) {
        self.inner.notifier.set(callback);
    }
}

fn unauthorized(response: &ApiResponse, attempt: &RequestAttempt) -> AuthError {
    AuthError::Unauthorized {
        status: response.status.as_u16(),
        retried: attempt.is_retried(),
    }
}
