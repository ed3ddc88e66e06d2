//! Switch session state machine.
//!
//! The engine owns at most one [`SwitchSession`]. It is `Closed` when no
//! session exists and `Open` otherwise. Every action is total: anything that
//! does not apply to the current phase is a no-op.

use crate::candidate::{SwitchCandidate, SwitchTarget};
use crate::ranker;
use crate::session::{Direction, SwitchSession};
use crate::ui_commands::PresentationPort;
use crate::window_source::{TitleQuery, WindowSource};
use tracing::{debug, info, warn};

/// Discrete actions driving a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Open a session, or step it if one is already open
    GestureStart { direction: Direction },
    Advance,
    Retreat,
    Commit,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Open,
}

pub struct SwitchEngine<S: WindowSource, P: PresentationPort> {
    source: S,
    presenter: P,
    session: Option<SwitchSession>,
    ready: bool,
}

impl<S: WindowSource, P: PresentationPort> SwitchEngine<S, P> {
    /// Create a disarmed engine. Call [`set_ready`](Self::set_ready) once the
    /// input permission has been confirmed.
    pub fn new(source: S, presenter: P) -> Self {
        SwitchEngine {
            source,
            presenter,
            session: None,
            ready: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    pub fn phase(&self) -> Phase {
        if self.session.is_some() {
            Phase::Open
        } else {
            Phase::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&SwitchSession> {
        self.session.as_ref()
    }

    /// Apply one action to the current phase.
    pub fn handle(&mut self, action: SessionAction) {
        debug!("Session action: {:?}, phase: {:?}", action, self.phase());

        match (action, self.session.is_some()) {
            (SessionAction::GestureStart { direction }, false) => self.open(direction),
            (SessionAction::GestureStart { direction }, true) => self.step(direction),
            (SessionAction::Advance, true) => self.step(Direction::Advance),
            (SessionAction::Retreat, true) => self.step(Direction::Retreat),
            (SessionAction::Commit, true) => self.commit(),
            (SessionAction::Cancel, true) => self.cancel(),
            (_, false) => {
                debug!("Ignoring {:?} while closed", action);
            }
        }
    }

    /// Close any open session without activating anything.
    ///
    /// Safe to call when already closed.
    pub fn teardown(&mut self) {
        if self.session.take().is_some() {
            info!("Tearing down open switch session");
            self.presenter.dismiss();
        }
    }

    fn open(&mut self, direction: Direction) {
        if !self.ready {
            debug!("Engine not ready, ignoring gesture");
            return;
        }

        let processes = match self.source.enumerate() {
            Ok(processes) => processes,
            Err(e) => {
                warn!("Failed to enumerate windows: {:#}", e);
                Vec::new()
            }
        };

        let active = ranker::frontmost_process(&processes);
        let mut candidates = ranker::rank(&processes);
        for candidate in &mut candidates {
            candidate.title = self.source.title_of(title_query(candidate));
        }

        let Some(session) = SwitchSession::open(candidates, active, direction) else {
            info!("No windows to switch to");
            return;
        };

        info!(
            "Opening switch session with {} candidates at index {}",
            session.len(),
            session.selected_index()
        );
        self.presenter
            .present(session.candidates(), session.selected_index());
        self.session = Some(session);
    }

    fn step(&mut self, direction: Direction) {
        if let Some(session) = self.session.as_mut() {
            let index = session.step(direction);
            debug!("Selection moved {:?} to {}", direction, index);
            self.presenter.update_selection(index);
        }
    }

    fn commit(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };

        let selected = session.finalize();
        info!(
            "Committing switch to pid {} ({:?}) {:?}",
            selected.process_id, selected.target, selected.title
        );
        self.activate(&selected);
        self.presenter.dismiss();
    }

    fn cancel(&mut self) {
        info!("Cancelling switch session");
        self.session = None;
        self.presenter.dismiss();
    }

    /// Best effort: the gesture already completed, so failures are only logged.
    fn activate(&mut self, candidate: &SwitchCandidate) {
        if let SwitchTarget::Window(window) = candidate.target {
            if let Err(e) = self.source.focus_and_raise(window) {
                warn!("Failed to focus window {}: {:#}", window, e);
            }
        }

        if let Err(e) = self.source.activate(candidate.process_id) {
            warn!("Failed to activate pid {}: {:#}", candidate.process_id, e);
        }
    }
}

fn title_query(candidate: &SwitchCandidate) -> TitleQuery {
    match candidate.target {
        SwitchTarget::Window(window) => TitleQuery::Window(window),
        SwitchTarget::ProcessOnly => TitleQuery::Process(candidate.process_id),
    }
}
