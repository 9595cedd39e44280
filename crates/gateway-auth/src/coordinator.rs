//! Single-flight credential refresh.
//!
//! Any number of requests may be rejected for the same expired credential at
//! once. The first caller starts a refresh cycle; everyone arriving while it
//! runs is queued behind it. When the cycle ends every queued caller, the
//! originator included, is settled with the same outcome in arrival order.
//!
//! The cycle runs on its own task. Dropping a waiting caller's future never
//! abandons the cycle or the other waiters.

use crate::refresh_endpoint::RefreshEndpoint;
use crate::refresh_fsm::{RefreshMachine, RefreshMachineInput, RefreshMachineState, RefreshSnapshot};
use crate::session::{SessionEvent, SessionNotifier};
use crate::{AuthError, AuthResult, RefreshFailure};
use gateway_storage::CredentialStore;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

type Settlement = Result<String, RefreshFailure>;

struct RefreshState {
    machine: RefreshMachine,
    /// Non-empty only while the machine is `Refreshing`.
    waiters: VecDeque<oneshot::Sender<Settlement>>,
    cycles: u64,
}

impl RefreshState {
    fn in_flight(&self) -> bool {
        *self.machine.state() == RefreshMachineState::Refreshing
    }
}

struct Shared {
    state: Mutex<RefreshState>,
    store: Arc<CredentialStore>,
    endpoint: RefreshEndpoint,
    timeout: Duration,
    notifier: Arc<SessionNotifier>,
}

/// Owns the refresh state of one client instance.
#[derive(Clone)]
pub struct RefreshCoordinator {
    shared: Arc<Shared>,
}

impl RefreshCoordinator {
    pub(crate) fn new(
        store: Arc<CredentialStore>,
        endpoint: RefreshEndpoint,
        timeout: Duration,
        notifier: Arc<SessionNotifier>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(RefreshState {
                    machine: RefreshMachine::new(),
                    waiters: VecDeque::new(),
                    cycles: 0,
                }),
                store,
                endpoint,
                timeout,
                notifier,
            }),
        }
    }

    /// Get an access token to replay a request that was rejected while
    /// carrying `sent_with`.
    ///
    /// Returns the stored token without refreshing when it already differs
    /// from `sent_with`. Otherwise starts or joins a refresh cycle and waits
    /// for it to settle.
    pub async fn refresh(&self, sent_with: Option<&str>) -> AuthResult<String> {
        let receiver = {
            let mut state = self.shared.state.lock();
            let (sender, receiver) = oneshot::channel();

            if state.in_flight() {
                state.waiters.push_back(sender);
                debug!(waiters = state.waiters.len(), "joining in-flight refresh");
            } else {
                match self.shared.store.read() {
                    None => {
                        debug!("refresh requested without stored credentials");
                        if let Err(e) = self.shared.store.clear() {
                            error!(error = %e, "failed to clear credential store");
                        }
                        return Err(AuthError::SessionExpired(RefreshFailure::NoRefreshToken));
                    }
                    Some(pair) if sent_with != Some(pair.access_token.as_str()) => {
                        debug!("stored credential already rotated; replaying without refresh");
                        return Ok(pair.access_token);
                    }
                    Some(_) => {}
                }

                state
                    .machine
                    .consume(&RefreshMachineInput::RefreshStarted)
                    .map_err(|_| AuthError::RefreshAborted)?;
                state.cycles += 1;
                state.waiters.push_back(sender);
                info!(cycle = state.cycles, "starting credential refresh");

                tokio::spawn(self.shared.clone().run_cycle());
            }

            receiver
        };

        match receiver.await {
            Ok(Ok(access_token)) => Ok(access_token),
            Ok(Err(failure)) => Err(AuthError::SessionExpired(failure)),
            Err(_) => Err(AuthError::RefreshAborted),
        }
    }

    /// Discard the stored pair if it still carries `access_token`.
    ///
    /// Used when a replay made with a just-refreshed token is rejected again.
    /// Does nothing while a cycle is running or after the pair has changed.
    pub(crate) fn end_session_if_current(&self, access_token: &str, reason: &str) {
        {
            let state = self.shared.state.lock();
            if state.in_flight() {
                return;
            }
            if self.shared.store.access_token().as_deref() != Some(access_token) {
                return;
            }
            if let Err(e) = self.shared.store.clear() {
                error!(error = %e, "failed to clear credential store");
            }
        }

        warn!(reason, "session ended");
        self.shared.notifier.notify(SessionEvent::Ended {
            reason: reason.to_string(),
        });
    }

    pub fn snapshot(&self) -> RefreshSnapshot {
        let state = self.shared.state.lock();
        RefreshSnapshot {
            in_flight: state.in_flight(),
            waiters: state.waiters.len(),
            cycles: state.cycles,
        }
    }
}

impl Shared {
    async fn run_cycle(self: Arc<Self>) {
        let outcome = self.exchange_and_persist().await;

        if let Err(failure) = &outcome {
            warn!(error = %failure, "credential refresh failed; clearing stored credentials");
            if let Err(e) = self.store.clear() {
                error!(error = %e, "failed to clear credential store");
            }
        }

        let settled = {
            let mut state = self.state.lock();
            let waiters = std::mem::take(&mut state.waiters);
            let count = waiters.len();
            for waiter in waiters {
                // A dropped receiver only means that caller stopped waiting.
                let _ = waiter.send(outcome.clone());
            }

            let input = match outcome {
                Ok(_) => RefreshMachineInput::RefreshSucceeded,
                Err(_) => RefreshMachineInput::RefreshFailed,
            };
            if state.machine.consume(&input).is_err() {
                error!(input = ?input, "refresh machine rejected settle transition");
            }
            count
        };

        match outcome {
            Ok(_) => {
                info!(waiters = settled, "credential refresh settled");
                self.notifier.notify(SessionEvent::Refreshed);
            }
            Err(failure) => {
                info!(waiters = settled, "credential refresh failed for all waiters");
                self.notifier.notify(SessionEvent::Ended {
                    reason: failure.to_string(),
                });
            }
        }
    }

    /// Call the endpoint and store the new pair. Nothing is settled until
    /// this returns, so no waiter sees a token that is not yet stored.
    async fn exchange_and_persist(&self) -> Settlement {
        let current = self.store.read().ok_or(RefreshFailure::NoRefreshToken)?;

        let pair = match tokio::time::timeout(
            self.timeout,
            self.endpoint.exchange(&current.refresh_token),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => return Err(RefreshFailure::Timeout),
        };

        self.store
            .write(&pair)
            .map_err(|e| RefreshFailure::Persist(e.to_string()))?;

        Ok(pair.access_token)
    }
}
