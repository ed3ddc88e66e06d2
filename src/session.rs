//! The state of one open switch session.
//!
//! A session is created when a gesture opens the switcher and dropped when it
//! commits or cancels. It is never reused: the next gesture builds a fresh one.

use crate::candidate::{ProcessId, SwitchCandidate};
use crate::ranker;

/// Which way a navigation step moves the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Advance,
    Retreat,
}

/// Candidate snapshot and current selection during a switch session.
///
/// The candidate list is fixed at construction; only the selection moves.
#[derive(Debug)]
pub struct SwitchSession {
    candidates: Vec<SwitchCandidate>,
    selected_index: usize,
}

impl SwitchSession {
    /// Open a session over `candidates`, seeded at the first candidate owned by
    /// `active` and then moved one step in `direction`.
    ///
    /// Returns `None` for an empty candidate list: no session can exist.
    pub fn open(
        candidates: Vec<SwitchCandidate>,
        active: Option<ProcessId>,
        direction: Direction,
    ) -> Option<Self> {
        if candidates.is_empty() {
            return None;
        }

        let selected_index = ranker::find_index(&candidates, active);
        let mut session = SwitchSession {
            candidates,
            selected_index,
        };
        session.step(direction);
        Some(session)
    }

    pub fn candidates(&self) -> &[SwitchCandidate] {
        &self.candidates
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn selected(&self) -> &SwitchCandidate {
        &self.candidates[self.selected_index]
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Move the selection one position, wrapping at both ends.
    ///
    /// Returns the new selection index.
    pub fn step(&mut self, direction: Direction) -> usize {
        let len = self.candidates.len();
        self.selected_index = match direction {
            Direction::Advance => (self.selected_index + 1) % len,
            Direction::Retreat => (self.selected_index + len - 1) % len,
        };
        self.selected_index
    }

    /// Consume the session and hand back the selected candidate.
    pub fn finalize(mut self) -> SwitchCandidate {
        self.candidates.swap_remove(self.selected_index)
    }
}
