//! Switch candidates and the raw process snapshot they are built from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier of the process owning a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessId(pub i32);

/// Opaque reference to one specific window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub i64);

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What committing a candidate actually brings forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchTarget {
    /// A specific window, raised before its process is activated
    Window(WindowHandle),
    /// The process as a whole; there is no window to raise
    ProcessOnly,
}

/// One process as reported by a [`WindowSource`](crate::window_source::WindowSource)
/// enumeration, together with its windows in enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub process_id: ProcessId,
    pub is_frontmost: bool,
    pub recency_key: i64,
    pub windows: Vec<WindowHandle>,
}

/// One cyclable target in a switch session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchCandidate {
    pub process_id: ProcessId,
    pub target: SwitchTarget,
    /// Display string, filled in after ranking. May be empty.
    pub title: String,
    pub is_frontmost: bool,
    /// Tie-break only. Not a usage history.
    pub recency_key: i64,
}

impl SwitchCandidate {
    pub fn window(&self) -> Option<WindowHandle> {
        match self.target {
            SwitchTarget::Window(handle) => Some(handle),
            SwitchTarget::ProcessOnly => None,
        }
    }
}
