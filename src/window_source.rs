//! Window system abstraction consumed by the switch engine.
//!
//! The engine never talks to the compositor directly; it goes through this
//! trait so the Sway implementation can be swapped for a recording mock in tests.

use crate::candidate::{ProcessEntry, ProcessId, WindowHandle};
use anyhow::Result;

/// What a title lookup is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleQuery {
    Window(WindowHandle),
    Process(ProcessId),
}

/// Source of switch candidates and sink for focus requests.
pub trait WindowSource {
    /// Snapshot the eligible processes and their windows.
    ///
    /// Background and terminated processes must already be excluded.
    fn enumerate(&mut self) -> Result<Vec<ProcessEntry>>;

    /// Display title for a window or process. Empty when unknown.
    /// Must not block indefinitely.
    fn title_of(&mut self, query: TitleQuery) -> String;

    /// Give a window focus and bring it to the front, restoring it first
    /// if it is minimized.
    fn focus_and_raise(&mut self, window: WindowHandle) -> Result<()>;

    /// Make a process the active one.
    fn activate(&mut self, process: ProcessId) -> Result<()>;
}
