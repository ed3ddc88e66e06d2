mod candidate;
mod config;
mod daemon;
mod engine;
mod gesture;
mod ipc;
mod keyboard_monitor;
mod ranker;
mod session;
mod socket_client;
mod socket_server;
mod sway_client;
mod ui;
mod ui_commands;
mod ui_handler;
mod window_manager;
mod window_source;

use anyhow::{Context, Result};
use config::{Command, Config};
use daemon::Daemon;
use ipc::IpcCommand;
use keyboard_monitor::KeyboardMonitor;
use std::fs;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use ui::TerminalSwitcher;

/// Get the path to the pidfile
fn get_pidfile_path() -> Result<PathBuf> {
    // Try to use XDG_RUNTIME_DIR, fall back to ~/.cache
    let runtime_dir = dirs::runtime_dir()
        .or_else(dirs::cache_dir)
        .context("Could not determine runtime directory")?;

    Ok(runtime_dir.join("tabswitch.pid"))
}

/// Check if another instance is already running
fn check_pidfile() -> Result<()> {
    let pidfile = get_pidfile_path()?;

    if pidfile.exists() {
        let pid_str = fs::read_to_string(&pidfile).context("Failed to read pidfile")?;
        let pid: u32 = pid_str.trim().parse().context("Invalid PID in pidfile")?;

        if process_exists(pid) {
            anyhow::bail!(
                "Another instance of tabswitch is already running (PID: {}). \
                 If this is incorrect, remove the pidfile at: {}",
                pid,
                pidfile.display()
            );
        } else {
            info!("Removing stale pidfile (PID {} not found)", pid);
            if let Err(e) = fs::remove_file(&pidfile) {
                warn!("Failed to remove stale pidfile: {}", e);
            }
        }
    }

    Ok(())
}

/// Check if a process with the given PID exists
fn process_exists(pid: u32) -> bool {
    PathBuf::from(format!("/proc/{}", pid)).exists()
}

/// Create the pidfile
fn create_pidfile() -> Result<PidfileGuard> {
    let pidfile = get_pidfile_path()?;
    let pid = std::process::id();

    fs::write(&pidfile, pid.to_string()).context("Failed to write pidfile")?;

    info!("Created pidfile at {} with PID {}", pidfile.display(), pid);

    Ok(PidfileGuard { path: pidfile })
}

/// Guard that removes the pidfile when dropped
struct PidfileGuard {
    path: PathBuf,
}

impl Drop for PidfileGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            error!("Failed to remove pidfile: {}", e);
        } else {
            info!("Removed pidfile at {}", self.path.display());
        }
    }
}

fn main() -> Result<()> {
    let config = Config::parse();

    let log_level = if config.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let command = match config.command() {
        Command::Daemon => return run_daemon_process(config),
        Command::Show => IpcCommand::Show,
        Command::Next => IpcCommand::Next,
        Command::Prev => IpcCommand::Prev,
        Command::Select => IpcCommand::Select,
        Command::Cancel => IpcCommand::Cancel,
        Command::Status => IpcCommand::Status,
        Command::Shutdown => IpcCommand::Shutdown,
    };
    socket_client::send_command_and_exit(command)
}

fn run_daemon_process(config: Config) -> Result<()> {
    // Ignore SIGUSR1 signal to prevent crashes
    #[cfg(unix)]
    unsafe {
        use libc::{SIG_IGN, SIGUSR1, signal};
        signal(SIGUSR1, SIG_IGN);
    }

    info!("Starting tabswitch daemon");
    info!(
        "Workspace mode: {:?}, modifier: {:?}",
        config.mode, config.modifier
    );

    check_pidfile()?;
    let _pidfile_guard = create_pidfile()?;

    // Without keyboard access the engine stays disarmed; IPC still answers.
    let ready = match keyboard_monitor::check_permissions(config.device.as_deref()) {
        Ok(()) => true,
        Err(e) => {
            error!("Keyboard access unavailable, switcher disarmed: {:#}", e);
            false
        }
    };

    let rt = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(run_daemon(config, ready))
}

async fn run_daemon(config: Config, ready: bool) -> Result<()> {
    let (key_tx, key_rx) = mpsc::unbounded_channel();
    let (ui_tx, ui_rx) = mpsc::unbounded_channel();

    let ui_task = ui_handler::handle_ui_commands(TerminalSwitcher::new(), ui_rx);
    let (ipc_rx, _socket_guard) = socket_server::start_server().await?;

    let keyboard_monitor = if ready {
        match KeyboardMonitor::new(config.device.as_deref()) {
            Ok(monitor) => Some(monitor),
            Err(e) => {
                error!("Failed to open keyboard, switcher disarmed: {:#}", e);
                None
            }
        }
    } else {
        None
    };
    let ready = keyboard_monitor.is_some();

    // The daemon sees the key channel close when this thread ends
    if let Some(keyboard_monitor) = keyboard_monitor {
        std::thread::spawn(move || {
            if let Err(e) = keyboard_monitor.monitor_blocking(key_tx) {
                error!("Keyboard monitor error: {:#}", e);
            }
        });
    } else {
        drop(key_tx);
    }

    let daemon = Daemon::new(&config, ui_tx, ready)?;
    daemon.run(key_rx, ipc_rx).await?;

    // The daemon owned the last UI sender, so the UI task drains and stops
    if let Err(e) = ui_task.await {
        warn!("UI task ended abnormally: {}", e);
    }

    info!("Daemon exited normally");
    Ok(())
}
