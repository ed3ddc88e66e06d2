use crate::candidate::SwitchCandidate;
use tokio::sync::mpsc;
use tracing::warn;

/// Receives switcher notifications. Fire-and-forget: nothing flows back.
pub trait PresentationPort {
    /// A session opened with these candidates and this initial selection
    fn present(&mut self, candidates: &[SwitchCandidate], selected_index: usize);

    /// The selection moved within the open session
    fn update_selection(&mut self, selected_index: usize);

    /// The session closed
    fn dismiss(&mut self);
}

/// Commands sent from daemon to UI
#[derive(Debug, Clone, PartialEq)]
pub enum UiCommand {
    /// Show the switcher with a list of candidates
    Show {
        candidates: Vec<SwitchCandidate>,
        initial_index: usize,
    },
    /// Update the selected candidate to the given index
    /// (the engine owns the authoritative selection state)
    UpdateSelection { index: usize },
    /// Hide the switcher
    Hide,
}

/// Presentation port that forwards notifications to the UI task.
pub struct ChannelPresenter {
    tx: mpsc::UnboundedSender<UiCommand>,
}

impl ChannelPresenter {
    pub fn new(tx: mpsc::UnboundedSender<UiCommand>) -> Self {
        ChannelPresenter { tx }
    }

    fn send(&self, command: UiCommand) {
        if self.tx.send(command).is_err() {
            warn!("UI channel closed, dropping UI command");
        }
    }
}

impl PresentationPort for ChannelPresenter {
    fn present(&mut self, candidates: &[SwitchCandidate], selected_index: usize) {
        self.send(UiCommand::Show {
            candidates: candidates.to_vec(),
            initial_index: selected_index,
        });
    }

    fn update_selection(&mut self, selected_index: usize) {
        self.send(UiCommand::UpdateSelection {
            index: selected_index,
        });
    }

    fn dismiss(&mut self) {
        self.send(UiCommand::Hide);
    }
}
