use crate::config::Config;
use crate::engine::{Phase, SwitchEngine};
use crate::gesture::{GestureInterpreter, HotKeyBinding, RawInputEvent};
use crate::ipc::{IpcCommand, IpcRequest, IpcResponse};
use crate::ui_commands::{ChannelPresenter, PresentationPort, UiCommand};
use crate::window_manager::WindowManager;
use crate::window_source::WindowSource;
use anyhow::Result;
use std::future::Future;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Shutdown,
}

/// Serialises keyboard events and IPC requests into the switch engine.
pub struct Daemon<S: WindowSource = WindowManager, P: PresentationPort = ChannelPresenter> {
    engine: SwitchEngine<S, P>,
    gestures: GestureInterpreter,
}

impl Daemon {
    /// Connect to Sway and build a daemon that reports to the UI channel.
    ///
    /// `ready` is the outcome of the input permission check.
    pub fn new(
        config: &Config,
        ui_tx: mpsc::UnboundedSender<UiCommand>,
        ready: bool,
    ) -> Result<Self> {
        let source = WindowManager::new(config.mode)?;
        let presenter = ChannelPresenter::new(ui_tx);
        Ok(Self::with_parts(source, presenter, config.binding(), ready))
    }
}

impl<S: WindowSource, P: PresentationPort> Daemon<S, P> {
    pub fn with_parts(source: S, presenter: P, binding: HotKeyBinding, ready: bool) -> Self {
        let mut engine = SwitchEngine::new(source, presenter);
        engine.set_ready(ready);

        Daemon {
            engine,
            gestures: GestureInterpreter::new(binding),
        }
    }

    /// Main event loop. Returns on a shutdown request or SIGINT/SIGTERM.
    pub async fn run(
        self,
        key_rx: mpsc::UnboundedReceiver<RawInputEvent>,
        ipc_rx: mpsc::UnboundedReceiver<IpcRequest>,
    ) -> Result<()> {
        self.run_until(key_rx, ipc_rx, shutdown_signal()).await
    }

    /// Main event loop, stopping when `shutdown` completes.
    ///
    /// Each event is handled to completion before the next one is taken.
    pub async fn run_until(
        mut self,
        mut key_rx: mpsc::UnboundedReceiver<RawInputEvent>,
        mut ipc_rx: mpsc::UnboundedReceiver<IpcRequest>,
        shutdown: impl Future<Output = ()>,
    ) -> Result<()> {
        info!("Starting daemon event loop (ready: {})", self.engine.is_ready());
        tokio::pin!(shutdown);
        let mut keys_open = true;

        loop {
            tokio::select! {
                biased;

                key_event = key_rx.recv(), if keys_open => match key_event {
                    Some(key_event) => self.handle_key_event(key_event),
                    None => {
                        keys_open = false;
                        self.keyboard_lost();
                    }
                },
                Some(request) = ipc_rx.recv() => {
                    if self.handle_ipc_request(request) == Flow::Shutdown {
                        info!("Shutdown requested over IPC");
                        break;
                    }
                }
                _ = &mut shutdown => {
                    info!("Received termination signal");
                    break;
                }
                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        self.engine.teardown();
        Ok(())
    }

    /// The keyboard monitor is gone, so no release can ever commit.
    fn keyboard_lost(&mut self) {
        if self.engine.is_ready() {
            warn!("Keyboard monitor stopped, switcher disarmed");
        }
        self.engine.set_ready(false);
        self.engine.teardown();
    }

    fn handle_key_event(&mut self, event: RawInputEvent) {
        debug!("Key event: {:?}, phase: {:?}", event, self.engine.phase());

        if let Some(action) = self.gestures.interpret(event, self.engine.is_open()) {
            self.engine.handle(action);
        }
    }

    fn handle_ipc_request(&mut self, request: IpcRequest) -> Flow {
        let IpcRequest { command, reply } = request;
        debug!("IPC command: {:?}, phase: {:?}", command, self.engine.phase());

        let (response, flow) = match command {
            IpcCommand::Status => (self.status(), Flow::Continue),
            IpcCommand::Shutdown => {
                self.engine.teardown();
                (IpcResponse::Ok, Flow::Shutdown)
            }
            IpcCommand::Show if !self.engine.is_ready() => (
                IpcResponse::Error("Switcher is disarmed: no keyboard access".to_string()),
                Flow::Continue,
            ),
            command => {
                if let Some(action) = command.action() {
                    self.engine.handle(action);
                }
                (IpcResponse::Ok, Flow::Continue)
            }
        };

        if reply.send(response).is_err() {
            warn!("IPC client went away before the reply was sent");
        }
        flow
    }

    fn status(&self) -> IpcResponse {
        let session = self.engine.session();
        IpcResponse::Status {
            ready: self.engine.is_ready(),
            open: self.engine.phase() == Phase::Open,
            candidate_count: session.map_or(0, |s| s.len()),
            selected_index: session.map(|s| s.selected_index()),
            selected: session.map(|s| s.selected().clone()),
        }
    }
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!("Failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
}
