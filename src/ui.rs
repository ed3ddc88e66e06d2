use crate::candidate::SwitchCandidate;
use std::fmt::Write;
use tracing::{debug, info};

const MAX_TITLE_LENGTH: usize = 20;

/// Renders the switcher strip to stderr.
pub struct TerminalSwitcher {
    candidates: Vec<SwitchCandidate>,
    current_index: usize,
    visible: bool,
}

impl TerminalSwitcher {
    pub fn new() -> Self {
        TerminalSwitcher {
            candidates: Vec::new(),
            current_index: 0,
            visible: false,
        }
    }

    #[allow(dead_code)]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[allow(dead_code)]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Show the switcher with a list of candidates
    pub fn show(&mut self, candidates: Vec<SwitchCandidate>, initial_index: usize) {
        self.candidates = candidates;
        self.current_index = initial_index.min(self.candidates.len().saturating_sub(1));
        self.visible = true;

        info!("Showing switcher with {} candidates", self.candidates.len());
        self.draw();
    }

    /// Move the highlight. Ignored while hidden or out of range.
    pub fn set_selection(&mut self, index: usize) {
        if !self.visible || index >= self.candidates.len() {
            debug!("Ignoring selection {} (visible: {})", index, self.visible);
            return;
        }

        self.current_index = index;
        debug!("Selected {}: {:?}", index, self.candidates[index].title);
        self.draw();
    }

    /// Hide the switcher
    pub fn close(&mut self) {
        if self.visible {
            info!("Hiding switcher");
        }
        self.visible = false;
        self.candidates.clear();
        self.current_index = 0;
    }

    pub fn render(&self) -> String {
        let mut out = String::from("\n=== Window Switcher ===\n");
        for (i, candidate) in self.candidates.iter().enumerate() {
            let marker = if i == self.current_index { ">>>" } else { "   " };
            let target = candidate
                .window()
                .map_or_else(|| "-".to_string(), |w| w.to_string());
            let title = if candidate.title.is_empty() {
                "<untitled>".to_string()
            } else {
                truncate_string(&candidate.title, MAX_TITLE_LENGTH)
            };
            let _ = writeln!(
                out,
                "{} [{}] pid {} - {}",
                marker, target, candidate.process_id, title
            );
        }
        out.push_str("=======================\n");
        out
    }

    fn draw(&self) {
        eprint!("{}", self.render());
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
