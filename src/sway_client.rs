//! Sway IPC abstraction for testability.

use anyhow::{Context, Result};
use swayipc::{Connection, Node, Workspace};

/// Trait for Sway IPC operations.
pub trait SwayClient {
    /// Get the full window tree from Sway
    fn get_tree(&mut self) -> Result<Node>;

    /// Get the list of workspaces
    fn get_workspaces(&mut self) -> Result<Vec<Workspace>>;

    /// Run a sway command, failing if sway rejects it
    fn run_command(&mut self, command: &str) -> Result<()>;
}

/// Real implementation using swayipc
pub struct RealSwayClient {
    connection: Connection,
}

impl RealSwayClient {
    /// Create a new connection to Sway
    pub fn new() -> Result<Self> {
        let connection = Connection::new().context("Failed to connect to Sway IPC")?;
        Ok(RealSwayClient { connection })
    }
}

impl SwayClient for RealSwayClient {
    fn get_tree(&mut self) -> Result<Node> {
        Ok(self.connection.get_tree()?)
    }

    fn get_workspaces(&mut self) -> Result<Vec<Workspace>> {
        Ok(self.connection.get_workspaces()?)
    }

    fn run_command(&mut self, command: &str) -> Result<()> {
        for outcome in self.connection.run_command(command)? {
            outcome.with_context(|| format!("Sway rejected command: {}", command))?;
        }
        Ok(())
    }
}
