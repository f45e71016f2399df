use crate::phase::Phase;

/// Notifications the coordinator emits towards host code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A phase was entered (or the loop restarted a pass).
    State { phase: Phase },
}
