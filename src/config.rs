use crate::gesture::{HotKeyBinding, Modifiers};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum WorkspaceMode {
    /// Show windows from current workspace only
    Current,
    /// Show windows from all workspaces
    All,
}

/// Modifier held for the whole gesture. Tab, Escape and Shift are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum TriggerModifier {
    Alt,
    Super,
}

impl TriggerModifier {
    pub fn modifiers(self) -> Modifiers {
        match self {
            TriggerModifier::Alt => Modifiers::ALT,
            TriggerModifier::Super => Modifiers::SUPER,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run as daemon (default if no command specified)
    Daemon,
    /// Open the switcher, or cycle forward if it is already open
    Show,
    /// Cycle to next window
    Next,
    /// Cycle to previous window
    Prev,
    /// Select current window and close switcher
    Select,
    /// Cancel switching without selecting
    Cancel,
    /// Query daemon status
    Status,
    /// Shutdown the daemon
    Shutdown,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "tabswitch")]
#[command(about = "Hold-modifier window switcher for Sway", long_about = None)]
pub struct Config {
    /// Workspace filtering mode (only applies to daemon mode)
    #[arg(short, long, value_enum, default_value = "current")]
    pub mode: WorkspaceMode,

    /// Modifier held while cycling (only applies to daemon mode)
    #[arg(long, value_enum, default_value = "alt")]
    pub modifier: TriggerModifier,

    /// Keyboard device to read, e.g. /dev/input/event3 (default: auto-detect)
    #[arg(short, long)]
    pub device: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Config {
    pub fn parse() -> Self {
        <Config as Parser>::parse()
    }

    /// Get the command, defaulting to Daemon if none specified
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Daemon)
    }

    pub fn binding(&self) -> HotKeyBinding {
        HotKeyBinding::new(self.modifier.modifiers())
    }
}
