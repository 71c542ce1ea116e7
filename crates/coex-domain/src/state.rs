//! Execution status transition rules.
//!
//! ```text
//! Accepted ──▶ Started ──▶ Finished ──▶ Stopped
//!    │  └──────────────────────▲  │
//!    │            │               │
//!    └────────────┴───────────────┴──▶ Failed
//! ```

use coex_types::{EventType, ExecutionStatus};

/// Status an event moves the execution to, when its precondition holds.
///
/// `component_stop` returns `None` here because its outcome depends on
/// teardown; use [`can_stop`] for its precondition.
pub fn event_target(current: ExecutionStatus, event: EventType) -> Option<ExecutionStatus> {
    use ExecutionStatus::*;
    match (event, current) {
        (EventType::ComponentStart, Accepted) => Some(Started),
        (EventType::ComponentResult, Accepted | Started) => Some(Finished),
        _ => None,
    }
}

/// Precondition shared by the `component_stop` event and explicit stops.
pub fn can_stop(current: ExecutionStatus) -> bool {
    !current.is_terminal()
}

/// Whether a firing watchdog marks the execution failed.
pub fn watchdog_applies(current: ExecutionStatus) -> bool {
    current.is_running()
}

/// Whether `from → to` appears in the transition table.
pub fn is_allowed(from: ExecutionStatus, to: ExecutionStatus) -> bool {
    use ExecutionStatus::*;
    matches!(
        (from, to),
        (Accepted, Started)
            | (Accepted | Started, Finished)
            | (Accepted | Started | Finished, Stopped)
            | (Accepted | Started | Finished, Failed)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ExecutionStatus::*;

    const ALL: [ExecutionStatus; 5] = [Accepted, Started, Finished, Stopped, Failed];

    #[test]
    fn test_event_targets_follow_table() {
        assert_eq!(event_target(Accepted, EventType::ComponentStart), Some(Started));
        assert_eq!(event_target(Started, EventType::ComponentStart), None);
        assert_eq!(event_target(Accepted, EventType::ComponentResult), Some(Finished));
        assert_eq!(event_target(Started, EventType::ComponentResult), Some(Finished));
        assert_eq!(event_target(Finished, EventType::ComponentResult), None);
        for status in ALL {
            assert_eq!(event_target(status, EventType::ComponentStop), None);
        }
    }

    #[test]
    fn test_every_event_target_is_allowed() {
        for status in ALL {
            for event in EventType::ALL {
                if let Some(to) = event_target(status, event) {
                    assert!(is_allowed(status, to), "{status} -> {to}");
                }
            }
        }
    }

    #[test]
    fn test_terminal_states_have_no_exit() {
        for to in ALL {
            assert!(!is_allowed(Stopped, to));
            assert!(!is_allowed(Failed, to));
        }
        assert!(!can_stop(Stopped));
        assert!(!can_stop(Failed));
        assert!(can_stop(Finished));
    }

    #[test]
    fn test_watchdog_only_for_running() {
        let fires: Vec<_> = ALL.into_iter().filter(|s| watchdog_applies(*s)).collect();
        assert_eq!(fires, [Accepted, Started]);
    }

    #[test]
    fn test_no_backward_transitions() {
        assert!(!is_allowed(Started, Accepted));
        assert!(!is_allowed(Finished, Started));
        assert!(!is_allowed(Finished, Accepted));
        for status in ALL {
            assert!(!is_allowed(status, status));
        }
    }
}
