//! Lifecycle of a single enhancement attempt.

use std::fmt;

use log::trace;
use serde::Serialize;

/// State of one enhancement attempt.
///
/// ```text
/// Idle -> Requested -> Succeeded -> Resolved
///                   -> TimedOut  -> Resolved
///                   -> Errored   -> Resolved
///                   -> Invalid   -> Resolved
///          Succeeded -> Invalid   (merged result failed validation)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptState {
    Idle,
    Requested,
    Succeeded,
    TimedOut,
    Invalid,
    Errored,
    Resolved,
}

impl AttemptState {
    /// Whether moving from `self` to `next` is a legal step
    pub fn can_transition_to(self, next: AttemptState) -> bool {
        use AttemptState::*;
        matches!(
            (self, next),
            (Idle, Requested)
                | (Requested, Succeeded | TimedOut | Invalid | Errored)
                | (Succeeded, Invalid)
                | (Succeeded | TimedOut | Invalid | Errored, Resolved)
        )
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Requested => "requested",
            Self::Succeeded => "succeeded",
            Self::TimedOut => "timed_out",
            Self::Invalid => "invalid",
            Self::Errored => "errored",
            Self::Resolved => "resolved",
        };
        write!(f, "{name}")
    }
}

/// Tracks an attempt through its states.
#[derive(Debug)]
pub(crate) struct Attempt {
    state: AttemptState,
    /// Last state before `Resolved`
    outcome: AttemptState,
}

impl Attempt {
    pub fn new() -> Self {
        Self {
            state: AttemptState::Idle,
            outcome: AttemptState::Idle,
        }
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn outcome(&self) -> AttemptState {
        self.outcome
    }

    pub fn advance(&mut self, next: AttemptState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal attempt transition {} -> {}",
            self.state,
            next
        );
        trace!(from:% = self.state, to:% = next; "Attempt transition");
        if next != AttemptState::Resolved {
            self.outcome = next;
        }
        self.state = next;
    }
}
