use anyhow::{Context, Result};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use swayipc::{Node, NodeType};
use tracing::debug;

use crate::candidate::{ProcessEntry, ProcessId, WindowHandle};
use crate::config::WorkspaceMode;
use crate::sway_client::{RealSwayClient, SwayClient};
use crate::window_source::{TitleQuery, WindowSource};

/// Sway's hidden workspace holding scratchpad windows.
const SCRATCHPAD_WORKSPACE: &str = "__i3_scratch";

#[derive(Debug, Clone)]
pub struct WindowInfo {
    pub id: i64,
    pub pid: i32,
    pub app_id: Option<String>,
    pub title: String,
    pub workspace: String,
}

impl WindowInfo {
    pub fn from_node(node: &Node, workspace: String) -> Option<Self> {
        // Only include actual windows (views), not containers
        // Windows have a pid, containers don't
        if !matches!(node.node_type, NodeType::Con | NodeType::FloatingCon) {
            return None;
        }
        let pid = node.pid?;

        // XWayland windows have no app_id; fall back to WM_CLASS
        let app_id = node.app_id.clone().or_else(|| {
            node.window_properties
                .as_ref()
                .and_then(|props| props.class.clone())
        });

        Some(WindowInfo {
            id: node.id,
            pid,
            app_id,
            title: node.name.clone().unwrap_or_default(),
            workspace,
        })
    }

    /// Scratchpad windows are Sway's equivalent of minimized windows.
    pub fn is_minimized(&self) -> bool {
        self.workspace == SCRATCHPAD_WORKSPACE
    }
}

/// [`WindowSource`] backed by Sway IPC.
pub struct WindowManager<C: SwayClient = RealSwayClient> {
    client: C,
    mode: WorkspaceMode,
    /// Windows seen by the last enumeration, in tree order
    windows: Vec<WindowInfo>,
    minimized: HashSet<i64>,
    /// Focused view as (con_id, pid), kept current across our own focus commands
    focused: Option<(i64, i32)>,
}

impl WindowManager<RealSwayClient> {
    /// Create a new WindowManager with a real Sway connection
    pub fn new(mode: WorkspaceMode) -> Result<Self> {
        let client = RealSwayClient::new()?;
        Ok(Self::with_client(client, mode))
    }
}

impl<C: SwayClient> WindowManager<C> {
    /// Create a WindowManager with a custom SwayClient (for testing)
    pub fn with_client(client: C, mode: WorkspaceMode) -> Self {
        WindowManager {
            client,
            mode,
            windows: Vec::new(),
            minimized: HashSet::new(),
            focused: None,
        }
    }

    fn window(&self, id: i64) -> Option<&WindowInfo> {
        self.windows.iter().find(|w| w.id == id)
    }

    fn current_workspace(&mut self) -> Option<String> {
        match self.client.get_workspaces() {
            Ok(workspaces) => workspaces.into_iter().find(|w| w.focused).map(|w| w.name),
            Err(e) => {
                debug!("Failed to query workspaces: {:#}", e);
                None
            }
        }
    }
}

impl<C: SwayClient> WindowSource for WindowManager<C> {
    fn enumerate(&mut self) -> Result<Vec<ProcessEntry>> {
        let tree = self.client.get_tree()?;

        let focused_id = find_focused_window(&tree);
        let all_windows = collect_windows(&tree, Cow::Borrowed(""));
        self.focused = focused_id
            .and_then(|id| all_windows.iter().find(|w| w.id == id))
            .map(|w| (w.id, w.pid));

        let windows = match self.mode {
            WorkspaceMode::Current => match self.current_workspace() {
                Some(ws) => filter_workspace(all_windows, &ws),
                None => all_windows,
            },
            WorkspaceMode::All => all_windows,
        };

        // A focused view filtered out by the workspace mode leaves no frontmost process
        let focused_pid = self
            .focused
            .filter(|(id, _)| windows.iter().any(|w| w.id == *id))
            .map(|(_, pid)| pid);

        self.minimized = windows
            .iter()
            .filter(|w| w.is_minimized())
            .map(|w| w.id)
            .collect();
        let processes = group_by_process(&windows, focused_pid);
        self.windows = windows;

        debug!(
            "Enumerated {} windows in {} processes (focused pid: {:?})",
            self.windows.len(),
            processes.len(),
            focused_pid
        );

        Ok(processes)
    }

    fn title_of(&mut self, query: TitleQuery) -> String {
        match query {
            TitleQuery::Window(handle) => self
                .window(handle.0)
                .map(|w| w.title.clone())
                .unwrap_or_default(),
            TitleQuery::Process(pid) => self
                .windows
                .iter()
                .find(|w| w.pid == pid.0)
                .and_then(|w| w.app_id.clone())
                .unwrap_or_default(),
        }
    }

    fn focus_and_raise(&mut self, window: WindowHandle) -> Result<()> {
        if self.minimized.contains(&window.0) {
            debug!("Restoring window {} from scratchpad", window);
            self.client
                .run_command(&format!("[con_id={}] scratchpad show", window.0))?;
        }
        self.client
            .run_command(&format!("[con_id={}] focus", window.0))?;

        self.focused = self.window(window.0).map(|w| (w.id, w.pid));
        Ok(())
    }

    /// Bring the process forward through one of its windows. Sway applies a
    /// `[pid=N]` criteria to every matching container, so only `con_id` is used.
    fn activate(&mut self, process: ProcessId) -> Result<()> {
        if self.focused.is_some_and(|(_, pid)| pid == process.0) {
            debug!("pid {} already owns the focused window", process);
            return Ok(());
        }

        let window = self
            .windows
            .iter()
            .find(|w| w.pid == process.0)
            .map(|w| WindowHandle(w.id))
            .with_context(|| format!("No window known for pid {}", process))?;
        self.focus_and_raise(window)
    }
}

fn filter_workspace(windows: Vec<WindowInfo>, workspace: &str) -> Vec<WindowInfo> {
    windows
        .into_iter()
        .filter(|w| w.workspace == workspace)
        .collect()
}

/// Group windows by owning process, keeping first-seen process order and
/// tree order within each process.
///
/// The pid doubles as the recency key.
#[must_use]
fn group_by_process(windows: &[WindowInfo], focused_pid: Option<i32>) -> Vec<ProcessEntry> {
    let mut processes: Vec<ProcessEntry> = Vec::new();
    let mut index_by_pid: HashMap<i32, usize> = HashMap::new();

    for window in windows {
        let idx = *index_by_pid.entry(window.pid).or_insert_with(|| {
            processes.push(ProcessEntry {
                process_id: ProcessId(window.pid),
                is_frontmost: focused_pid == Some(window.pid),
                recency_key: i64::from(window.pid),
                windows: Vec::new(),
            });
            processes.len() - 1
        });
        processes[idx].windows.push(WindowHandle(window.id));
    }

    processes
}

/// Recursively collect all windows from a Sway node tree.
/// Returns a flat list of WindowInfo structs.
///
/// Uses `Cow<str>` to avoid cloning workspace names during traversal.
#[must_use]
fn collect_windows<'a>(node: &'a Node, current_workspace: Cow<'a, str>) -> Vec<WindowInfo> {
    let mut windows = Vec::new();

    let workspace: Cow<'a, str> = if node.node_type == NodeType::Workspace {
        node.name
            .as_deref()
            .map(Cow::Borrowed)
            .unwrap_or(current_workspace)
    } else {
        current_workspace
    };

    if let Some(window) = WindowInfo::from_node(node, workspace.clone().into_owned()) {
        windows.push(window);
    }

    for child in node.nodes.iter().chain(&node.floating_nodes) {
        windows.extend(collect_windows(child, Cow::Borrowed(&workspace)));
    }

    windows
}

/// Find the currently focused window in a Sway node tree.
#[must_use]
fn find_focused_window(node: &Node) -> Option<i64> {
    if node.focused && node.pid.is_some() {
        return Some(node.id);
    }

    node.nodes
        .iter()
        .chain(&node.floating_nodes)
        .find_map(find_focused_window)
}
