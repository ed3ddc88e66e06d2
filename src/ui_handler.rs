use crate::ui::TerminalSwitcher;
use crate::ui_commands::UiCommand;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Spawn the task that applies UI commands to the switcher, in order
pub fn handle_ui_commands(
    switcher: TerminalSwitcher,
    ui_rx: mpsc::UnboundedReceiver<UiCommand>,
) -> JoinHandle<TerminalSwitcher> {
    info!("UI command handler started");
    tokio::spawn(run(switcher, ui_rx))
}

async fn run(
    mut switcher: TerminalSwitcher,
    mut ui_rx: mpsc::UnboundedReceiver<UiCommand>,
) -> TerminalSwitcher {
    while let Some(command) = ui_rx.recv().await {
        debug!("Received UI command: {:?}", command);
        apply(&mut switcher, command);
    }

    info!("UI command handler stopped");
    switcher
}

fn apply(switcher: &mut TerminalSwitcher, command: UiCommand) {
    match command {
        UiCommand::Show {
            candidates,
            initial_index,
        } => switcher.show(candidates, initial_index),
        UiCommand::UpdateSelection { index } => switcher.set_selection(index),
        UiCommand::Hide => switcher.close(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{ProcessId, SwitchCandidate, SwitchTarget};

    fn candidates(n: i32) -> Vec<SwitchCandidate> {
        (1..=n)
            .map(|pid| SwitchCandidate {
                process_id: ProcessId(pid),
                target: SwitchTarget::ProcessOnly,
                title: format!("app {}", pid),
                is_frontmost: pid == 1,
                recency_key: pid as i64,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_commands_are_applied_in_order() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = handle_ui_commands(TerminalSwitcher::new(), rx);

        tx.send(UiCommand::Show {
            candidates: candidates(3),
            initial_index: 1,
        })
        .unwrap();
        tx.send(UiCommand::UpdateSelection { index: 2 }).unwrap();
        drop(tx);

        let switcher = handle.await.unwrap();
        assert!(switcher.is_visible());
        assert_eq!(switcher.current_index(), 2);
    }

    #[tokio::test]
    async fn test_hide_after_show() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = handle_ui_commands(TerminalSwitcher::new(), rx);

        tx.send(UiCommand::Show {
            candidates: candidates(2),
            initial_index: 1,
        })
        .unwrap();
        tx.send(UiCommand::Hide).unwrap();
        drop(tx);

        let switcher = handle.await.unwrap();
        assert!(!switcher.is_visible());
    }
}
