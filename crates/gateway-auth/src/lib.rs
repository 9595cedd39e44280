//! Authenticated API client for authgate.
//!
//! This crate provides:
//! - Bearer credential attachment for every outgoing request
//! - Transparent recovery from an expired credential (one refresh, one replay)
//! - Single-flight refresh shared by all concurrent callers
//! - Explicit FSM-based refresh state
//! - A `reqwest` transport and a seam for substituting others

mod attempt;
mod client;
mod config;
mod coordinator;
mod error;
mod guard;
mod pipeline;
mod refresh_endpoint;
mod refresh_fsm;
mod retry;
mod session;
mod transport;

#[cfg(test)]
mod test_support;

pub use attempt::RequestAttempt;
pub use client::AuthenticatedClient;
pub use config::ClientConfig;
pub use coordinator::RefreshCoordinator;
pub use error::{AuthError, AuthResult, RefreshFailure};
pub use guard::{is_authorization_failure, ResponseGuard, Verdict};
pub use pipeline::RequestPipeline;
pub use refresh_endpoint::RefreshEndpoint;
pub use refresh_fsm::refresh_machine;
pub use refresh_fsm::{RefreshMachine, RefreshMachineInput, RefreshMachineState, RefreshSnapshot};
pub use retry::RetryExecutor;
pub use session::{SessionCallback, SessionEvent};
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

pub use gateway_storage::{CredentialPair, CredentialStore};
