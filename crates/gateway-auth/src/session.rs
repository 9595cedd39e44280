//! Session lifecycle notifications.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Changes to the stored credential that a UI layer may care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A pair was stored by `login`.
    LoggedIn,
    /// A refresh cycle stored a new pair.
    Refreshed,
    /// The credential was discarded after an unrecoverable failure. Return to login.
    Ended { reason: String },
    /// The credential was cleared by `logout`.
    LoggedOut,
}

/// Callback type for session event notifications.
pub type SessionCallback = Box<dyn Fn(SessionEvent) + Send + Sync>;

type SharedCallback = Arc<dyn Fn(SessionEvent) + Send + Sync>;

/// Holds the optional session callback.
///
/// The callback runs with no lock held, so it may replace itself.
#[derive(Default)]
pub(crate) struct SessionNotifier {
    callback: Mutex<Option<SharedCallback>>,
}

impl SessionNotifier {
    pub(crate) fn set(&self, callback: SessionCallback) {
        *self.callback.lock() = Some(Arc::from(callback));
    }

    pub(crate) fn notify(&self, event: SessionEvent) {
        tracing::debug!(event = ?event, "session event");
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_without_callback_is_noop() {
        SessionNotifier::default().notify(SessionEvent::LoggedOut);
    }

    #[test]
    fn test_callback_receives_events() {
        let notifier = SessionNotifier::default();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        notifier.set(Box::new(move |event| sink.lock().push(event)));

        notifier.notify(SessionEvent::LoggedIn);
        notifier.notify(SessionEvent::Ended {
            reason: "refresh rejected".into(),
        });

        assert_eq!(
            *seen.lock(),
            vec![
                SessionEvent::LoggedIn,
                SessionEvent::Ended {
                    reason: "refresh rejected".into()
                }
            ]
        );
    }

    #[test]
    fn test_callback_can_replace_itself() {
        let notifier = Arc::new(SessionNotifier::default());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let weak = Arc::downgrade(&notifier);
        let sink = seen.clone();
        notifier.set(Box::new(move |event| {
            sink.lock().push(format!("first: {:?}", event));
            if let Some(notifier) = weak.upgrade() {
                let sink = sink.clone();
                notifier.set(Box::new(move |event| {
                    sink.lock().push(format!("second: {:?}", event))
                }));
            }
        }));

        notifier.notify(SessionEvent::LoggedIn);
        notifier.notify(SessionEvent::LoggedOut);

        assert_eq!(
            *seen.lock(),
            vec!["first: LoggedIn".to_string(), "second: LoggedOut".to_string()]
        );
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(SessionEvent::Ended {
            reason: "timeout".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"event": "ended", "reason": "timeout"}));
    }
}
