//! Response classification.

use crate::{ApiResponse, RequestAttempt};
use reqwest::StatusCode;

/// What to do with a completed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Success or a non-authorization error; hand it to the caller unchanged.
    PassThrough,
    /// First authorization failure for this attempt; refresh and replay.
    Recover,
    /// Authorization failure after a replay; terminal.
    Reject,
}

/// Decides whether a response needs credential recovery.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseGuard;

impl ResponseGuard {
    pub fn new() -> Self {
        Self
    }

    /// Classify `response` and, on a first authorization failure, consume
    /// the attempt's replay marker.
    pub fn inspect(&self, response: &ApiResponse, attempt: &mut RequestAttempt) -> Verdict {
        if !is_authorization_failure(response.status) {
            return Verdict::PassThrough;
        }

        if attempt.mark_retried() {
            tracing::debug!(
                request_id = %attempt.id(),
                status = response.status.as_u16(),
                "authorization failure; recovering"
            );
            Verdict::Recover
        } else {
            tracing::warn!(
                request_id = %attempt.id(),
                status = response.status.as_u16(),
                "authorization failure after replay"
            );
            Verdict::Reject
        }
    }
}

/// The origin's "credential missing, invalid or expired" signal.
pub fn is_authorization_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED
}
