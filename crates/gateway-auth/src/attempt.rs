//! One logical call and its replay marker.

use crate::ApiRequest;
use std::fmt;
use uuid::Uuid;

/// A caller's request plus the bookkeeping needed to replay it at most once.
///
/// `request` is kept without authorization headers; each send attaches the
/// credential current at that moment.
pub struct RequestAttempt {
    id: Uuid,
    request: ApiRequest,
    retried: bool,
    sent_with: Option<String>,
}

impl RequestAttempt {
    pub fn new(request: ApiRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            retried: false,
            sent_with: None,
        }
    }

    /// Correlation id for log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    pub fn is_retried(&self) -> bool {
        self.retried
    }

    /// Flip the one-shot replay marker. Returns false if it was already set.
    pub fn mark_retried(&mut self) -> bool {
        !std::mem::replace(&mut self.retried, true)
    }

    /// Access token the most recent send carried, if any.
    pub fn sent_with(&self) -> Option<&str> {
        self.sent_with.as_deref()
    }

    pub(crate) fn record_sent_with(&mut self, token: Option<String>) {
        self.sent_with = token;
    }
}

impl fmt::Debug for RequestAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestAttempt")
            .field("id", &self.id)
            .field("method", &self.request.method)
            .field("path", &self.request.path)
            .field("retried", &self.retried)
            .field("authenticated", &self.sent_with.is_some())
            .finish()
    }
}
