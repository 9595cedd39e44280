//! Single replay of a request with a refreshed credential.

use crate::pipeline::with_bearer;
use crate::{ApiResponse, AuthResult, RequestAttempt, Transport};
use std::sync::Arc;

pub struct RetryExecutor {
    transport: Arc<dyn Transport>,
}

impl RetryExecutor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Reissue `attempt` carrying `access_token`.
    ///
    /// The attempt must already be marked retried, so whatever this returns
    /// is final for it.
    pub async fn replay(
        &self,
        attempt: &mut RequestAttempt,
        access_token: &str,
    ) -> AuthResult<ApiResponse> {
        debug_assert!(attempt.is_retried(), "replaying an attempt not marked retried");

        let outgoing = with_bearer(attempt.request(), Some(access_token))?;
        attempt.record_sent_with(Some(access_token.to_string()));

        tracing::debug!(
            request_id = %attempt.id(),
            method = %outgoing.method,
            path = %outgoing.path,
            "replaying request with refreshed credential"
        );

        self.transport.send(&outgoing).await
    }
}
