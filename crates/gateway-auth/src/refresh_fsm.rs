//! Refresh state machine using rust-fsm.
//!
//! ```text
//! ┌─────────┐  RefreshStarted   ┌────────────┐
//! │  Idle   │ ────────────────► │ Refreshing │
//! └─────────┘ ◄──────────────── └────────────┘
//!       RefreshSucceeded / RefreshFailed
//! ```
//!
//! Starting a second refresh while one is running is not a transition; the
//! coordinator enqueues the caller instead.

use rust_fsm::*;
use serde::Serialize;

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub refresh_machine(Idle)

    Idle => {
        RefreshStarted => Refreshing
    },
    Refreshing => {
        RefreshSucceeded => Idle,
        RefreshFailed => Idle
    }
}

pub use refresh_machine::Input as RefreshMachineInput;
pub use refresh_machine::State as RefreshMachineState;
pub use refresh_machine::StateMachine as RefreshMachine;

/// Point-in-time view of a coordinator, for status output and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshSnapshot {
    /// A refresh call is outstanding.
    pub in_flight: bool,
    /// Callers waiting on the outstanding refresh, originator included.
    pub waiters: usize,
    /// Refresh cycles started since the coordinator was created.
    pub cycles: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let machine = RefreshMachine::new();
        assert_eq!(*machine.state(), RefreshMachineState::Idle);
    }

    #[test]
    fn test_refresh_cycle_returns_to_idle() {
        let mut machine = RefreshMachine::new();

        machine.consume(&RefreshMachineInput::RefreshStarted).unwrap();
        assert_eq!(*machine.state(), RefreshMachineState::Refreshing);

        machine.consume(&RefreshMachineInput::RefreshSucceeded).unwrap();
        assert_eq!(*machine.state(), RefreshMachineState::Idle);

        machine.consume(&RefreshMachineInput::RefreshStarted).unwrap();
        machine.consume(&RefreshMachineInput::RefreshFailed).unwrap();
        assert_eq!(*machine.state(), RefreshMachineState::Idle);
    }

    #[test]
    fn test_cannot_start_twice() {
        let mut machine = RefreshMachine::new();
        machine.consume(&RefreshMachineInput::RefreshStarted).unwrap();

        assert!(machine.consume(&RefreshMachineInput::RefreshStarted).is_err());
        assert_eq!(*machine.state(), RefreshMachineState::Refreshing);
    }

    #[test]
    fn test_cannot_settle_when_idle() {
        let mut machine = RefreshMachine::new();
        assert!(machine.consume(&RefreshMachineInput::RefreshSucceeded).is_err());
        assert!(machine.consume(&RefreshMachineInput::RefreshFailed).is_err());
    }
}
