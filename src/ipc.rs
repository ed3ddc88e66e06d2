use crate::candidate::SwitchCandidate;
use crate::engine::SessionAction;
use crate::session::Direction;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::sync::oneshot;

/// Commands sent from CLI client to daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IpcCommand {
    /// Open the switcher, or cycle forward if already open
    Show,
    /// Cycle to next window
    Next,
    /// Cycle to previous window
    Prev,
    /// Select current window and close switcher
    Select,
    /// Cancel switching without selecting
    Cancel,
    /// Query daemon status (for debugging)
    Status,
    /// Shutdown the daemon gracefully
    Shutdown,
}

/// Response from daemon to CLI client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IpcResponse {
    /// Command executed successfully
    Ok,
    /// Error occurred
    Error(String),
    /// Status response
    Status {
        ready: bool,
        open: bool,
        candidate_count: usize,
        selected_index: Option<usize>,
        selected: Option<SwitchCandidate>,
    },
}

impl IpcCommand {
    /// The session action this command drives, if any.
    /// `Status` and `Shutdown` are handled by the daemon itself.
    pub fn action(&self) -> Option<SessionAction> {
        match self {
            IpcCommand::Show => Some(SessionAction::GestureStart {
                direction: Direction::Advance,
            }),
            IpcCommand::Next => Some(SessionAction::Advance),
            IpcCommand::Prev => Some(SessionAction::Retreat),
            IpcCommand::Select => Some(SessionAction::Commit),
            IpcCommand::Cancel => Some(SessionAction::Cancel),
            IpcCommand::Status | IpcCommand::Shutdown => None,
        }
    }
}

/// A command from a client together with the channel to answer it on
#[derive(Debug)]
pub struct IpcRequest {
    pub command: IpcCommand,
    pub reply: oneshot::Sender<IpcResponse>,
}

/// Get the path to the Unix socket
pub fn get_socket_path() -> Result<PathBuf> {
    let runtime_dir = dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .context("Could not determine runtime directory")?;

    Ok(runtime_dir.join("tabswitch.sock"))
}

/// Error returned when parsing an invalid IpcCommand string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIpcCommandError;

impl fmt::Display for ParseIpcCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid IPC command")
    }
}

impl std::error::Error for ParseIpcCommandError {}

impl FromStr for IpcCommand {
    type Err = ParseIpcCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "show" => Ok(IpcCommand::Show),
            "next" => Ok(IpcCommand::Next),
            "prev" => Ok(IpcCommand::Prev),
            "select" => Ok(IpcCommand::Select),
            "cancel" => Ok(IpcCommand::Cancel),
            "status" => Ok(IpcCommand::Status),
            "shutdown" => Ok(IpcCommand::Shutdown),
            _ => Err(ParseIpcCommandError),
        }
    }
}

impl fmt::Display for IpcCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IpcCommand::Show => "show",
            IpcCommand::Next => "next",
            IpcCommand::Prev => "prev",
            IpcCommand::Select => "select",
            IpcCommand::Cancel => "cancel",
            IpcCommand::Status => "status",
            IpcCommand::Shutdown => "shutdown",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::{ProcessId, SwitchTarget, WindowHandle};

    #[test]
    fn test_command_line_parsing() {
        assert_eq!("  Prev\n".parse(), Ok(IpcCommand::Prev));
        assert_eq!("open".parse::<IpcCommand>(), Err(ParseIpcCommandError));
    }

    #[test]
    fn test_status_response_roundtrip_with_candidate() {
        let response = IpcResponse::Status {
            ready: true,
            open: true,
            candidate_count: 2,
            selected_index: Some(1),
            selected: Some(SwitchCandidate {
                process_id: ProcessId(7),
                target: SwitchTarget::Window(WindowHandle(70)),
                title: "Editor".to_string(),
                is_frontmost: false,
                recency_key: 7,
            }),
        };
        let json = serde_json::to_string(&response).unwrap();
        let parsed: IpcResponse = serde_json::from_str(&json).unwrap();

        match parsed {
            IpcResponse::Status {
                selected: Some(c),
                selected_index,
                ..
            } => {
                assert_eq!(selected_index, Some(1));
                assert_eq!(c.title, "Editor");
                assert_eq!(c.target, SwitchTarget::Window(WindowHandle(70)));
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_command_actions() {
        assert_eq!(
            IpcCommand::Show.action(),
            Some(SessionAction::GestureStart {
                direction: Direction::Advance
            })
        );
        assert_eq!(IpcCommand::Next.action(), Some(SessionAction::Advance));
        assert_eq!(IpcCommand::Prev.action(), Some(SessionAction::Retreat));
        assert_eq!(IpcCommand::Select.action(), Some(SessionAction::Commit));
        assert_eq!(IpcCommand::Cancel.action(), Some(SessionAction::Cancel));
        assert_eq!(IpcCommand::Status.action(), None);
        assert_eq!(IpcCommand::Shutdown.action(), None);
    }

    #[test]
    fn test_get_socket_path() {
        let path = get_socket_path().unwrap();
        assert!(path.ends_with("tabswitch.sock"));
    }
}
