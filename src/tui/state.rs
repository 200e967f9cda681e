//! AppState - Domain Layer
//!
//! Everything the renderer reads. Producers never touch it directly: they
//! send [`PanelUpdate`]s over a channel and the UI loop applies them between
//! frames, so all mutation happens on one task.

use std::time::Duration;

use crate::docker::ContainerRow;
use crate::projects::ProjectEntry;
use crate::sources::{
    CpuSnapshot, DiskSnapshot, InterfaceSnapshot, MemorySnapshot, PortStatus, ProcessRow,
    PublicIp, ServiceStatus, StatusSnapshot, ToolVersions,
};

use super::focus::{ScrollEvent, ScrollState, SelectionEvent, SelectionState};

// ─────────────────────────────────────────────────────────────────────────────
// Panels
// ─────────────────────────────────────────────────────────────────────────────

/// Panels with focus + scroll behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollPanel {
    Projects,
    Docker,
    Services,
    Ports,
}

impl ScrollPanel {
    pub const ALL: [ScrollPanel; 4] = [
        ScrollPanel::Projects,
        ScrollPanel::Docker,
        ScrollPanel::Services,
        ScrollPanel::Ports,
    ];

    /// Focus toggle key
    pub fn hotkey(self) -> char {
        match self {
            ScrollPanel::Projects => 'r',
            ScrollPanel::Docker => 'd',
            ScrollPanel::Services => 's',
            ScrollPanel::Ports => 'p',
        }
    }

    pub fn from_hotkey(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.hotkey() == c)
    }
}

/// Three-state panel content
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Loading
    }
}

impl<T> Loadable<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(v) => Some(v),
            _ => None,
        }
    }
}

/// Interface stats plus the latency probe taken alongside
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkSample {
    pub interfaces: InterfaceSnapshot,
    pub ping: Option<Duration>,
}

/// One producer result, tagged by panel
#[derive(Debug, Clone)]
pub enum PanelUpdate {
    Cpu(CpuSnapshot),
    Memory(MemorySnapshot),
    Disks(DiskSnapshot),
    Processes(Vec<ProcessRow>),
    Network(NetworkSample),
    PublicIp(PublicIp),
    Ports(Vec<PortStatus>),
    Services(Vec<ServiceStatus>),
    Projects(Vec<ProjectEntry>),
    /// `Err` carries the message shown in the panel
    Docker(std::result::Result<Vec<ContainerRow>, String>),
    Status(StatusSnapshot),
    Versions(ToolVersions),
}

// ─────────────────────────────────────────────────────────────────────────────
// Core State
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct AppState {
    // Host
    pub cpu: Option<CpuSnapshot>,
    pub memory: Option<MemorySnapshot>,
    pub disks: Option<DiskSnapshot>,
    pub processes: Vec<ProcessRow>,
    pub process_selection: SelectionState,

    // Network
    pub network: Option<NetworkSample>,
    pub public_ip: Option<PublicIp>,

    // Lists
    pub ports: Option<Vec<PortStatus>>,
    pub services: Option<Vec<ServiceStatus>>,
    pub projects: Vec<ProjectEntry>,
    pub docker: Loadable<Vec<ContainerRow>>,

    // Status bar
    pub status: StatusSnapshot,
    pub versions: ToolVersions,
    pub location: String,

    // UI state
    pub projects_scroll: ScrollState,
    pub docker_scroll: ScrollState,
    pub services_scroll: ScrollState,
    pub ports_scroll: ScrollState,
    /// One-line message for the footer (e.g. rejected config)
    pub notice: Option<String>,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(location: String, notice: Option<String>) -> Self {
        Self {
            location,
            notice,
            ..Self::default()
        }
    }

    /// Fold one producer result into the state.
    pub fn apply(&mut self, update: PanelUpdate) {
        match update {
            PanelUpdate::Cpu(v) => self.cpu = Some(v),
            PanelUpdate::Memory(v) => self.memory = Some(v),
            PanelUpdate::Disks(v) => self.disks = Some(v),
            PanelUpdate::Processes(rows) => {
                self.process_selection.set_item_count(rows.len());
                self.processes = rows;
            }
            PanelUpdate::Network(v) => self.network = Some(v),
            PanelUpdate::PublicIp(v) => self.public_ip = Some(v),
            PanelUpdate::Ports(v) => self.ports = Some(v),
            PanelUpdate::Services(v) => self.services = Some(v),
            PanelUpdate::Projects(v) => self.projects = v,
            PanelUpdate::Docker(Ok(rows)) => self.docker = Loadable::Ready(rows),
            PanelUpdate::Docker(Err(message)) => self.docker = Loadable::Failed(message),
            PanelUpdate::Status(v) => self.status = v,
            PanelUpdate::Versions(v) => self.versions = v,
        }
    }

    pub fn scroll(&self, panel: ScrollPanel) -> &ScrollState {
        match panel {
            ScrollPanel::Projects => &self.projects_scroll,
            ScrollPanel::Docker => &self.docker_scroll,
            ScrollPanel::Services => &self.services_scroll,
            ScrollPanel::Ports => &self.ports_scroll,
        }
    }

    pub fn scroll_mut(&mut self, panel: ScrollPanel) -> &mut ScrollState {
        match panel {
            ScrollPanel::Projects => &mut self.projects_scroll,
            ScrollPanel::Docker => &mut self.docker_scroll,
            ScrollPanel::Services => &mut self.services_scroll,
            ScrollPanel::Ports => &mut self.ports_scroll,
        }
    }

    /// Number of content rows a scroll panel currently holds
    pub fn content_len(&self, panel: ScrollPanel) -> usize {
        match panel {
            ScrollPanel::Projects => self.projects.len(),
            ScrollPanel::Docker => self.docker.ready().map_or(0, Vec::len),
            ScrollPanel::Services => self.services.as_ref().map_or(0, Vec::len),
            ScrollPanel::Ports => self.ports.as_ref().map_or(0, Vec::len),
        }
    }

    /// Send a scroll event to every panel; unfocused panels ignore it.
    pub fn scroll_all(&mut self, event: ScrollEvent) {
        for panel in ScrollPanel::ALL {
            self.scroll_mut(panel).apply(event);
        }
    }

    pub fn select_process(&mut self, event: SelectionEvent) {
        self.process_selection.apply(event);
    }

    /// Re-clamp a panel after a resize or a content change.
    pub fn remeasure(&mut self, panel: ScrollPanel, viewport_height: usize) {
        let content_height = self.content_len(panel);
        self.scroll_mut(panel).apply(ScrollEvent::Remeasure {
            viewport_height,
            content_height,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::{ContainerMetrics, ContainerState};
    use crate::projects::{GitStatus, ProjectRecord};

    fn row(name: &str) -> ContainerRow {
        ContainerRow {
            short_id: "abc".into(),
            name: name.into(),
            state: ContainerState::Running,
            image: "img".into(),
            metrics: ContainerMetrics::default(),
        }
    }

    #[test]
    fn test_hotkeys_roundtrip() {
        for panel in ScrollPanel::ALL {
            assert_eq!(ScrollPanel::from_hotkey(panel.hotkey()), Some(panel));
        }
        assert_eq!(ScrollPanel::from_hotkey('x'), None);
    }

    #[test]
    fn test_docker_loading_error_ready() {
        let mut state = AppState::default();
        assert_eq!(state.docker, Loadable::Loading);

        state.apply(PanelUpdate::Docker(Err("socket missing".into())));
        assert_eq!(state.docker, Loadable::Failed("socket missing".into()));
        assert_eq!(state.content_len(ScrollPanel::Docker), 0);

        state.apply(PanelUpdate::Docker(Ok(vec![row("a"), row("b")])));
        assert_eq!(state.content_len(ScrollPanel::Docker), 2);
    }

    #[test]
    fn test_processes_update_reclamps_selection() {
        let mut state = AppState::default();
        let rows = |n: u32| {
            (0..n)
                .map(|pid| ProcessRow {
                    pid,
                    name: "x".into(),
                    cpu: 0.0,
                    rss: 0,
                    mem_percent: 0.0,
                })
                .collect::<Vec<_>>()
        };
        state.apply(PanelUpdate::Processes(rows(20)));
        state.select_process(SelectionEvent::JumpLast);
        assert_eq!(state.process_selection.selected_index(), 19);

        state.apply(PanelUpdate::Processes(rows(5)));
        assert_eq!(state.process_selection.selected_index(), 4);
    }

    #[test]
    fn test_scroll_all_only_moves_focused_panel() {
        let mut state = AppState::default();
        state.projects = (0..10)
            .map(|i| ProjectEntry {
                project: ProjectRecord::from_path(format!("/p/{}", i).into()),
                git: GitStatus {
                    is_repo: true,
                    ..Default::default()
                },
            })
            .collect();
        state.services = Some(Vec::new());
        state.remeasure(ScrollPanel::Projects, 3);
        state.remeasure(ScrollPanel::Services, 3);

        state.scroll_mut(ScrollPanel::Projects).apply(ScrollEvent::ToggleFocus);
        state.scroll_all(ScrollEvent::ScrollDown(2));

        assert_eq!(state.projects_scroll.scroll_offset(), 2);
        assert_eq!(state.services_scroll.scroll_offset(), 0);
    }

    #[test]
    fn test_remeasure_after_content_shrinks() {
        let mut state = AppState::default();
        state.docker = Loadable::Ready((0..8).map(|i| row(&i.to_string())).collect());
        state.remeasure(ScrollPanel::Docker, 2);
        state.docker_scroll.apply(ScrollEvent::ToggleFocus);
        state.docker_scroll.apply(ScrollEvent::ScrollDown(10));
        assert_eq!(state.docker_scroll.scroll_offset(), 6);

        state.apply(PanelUpdate::Docker(Ok(vec![row("only")])));
        state.remeasure(ScrollPanel::Docker, 2);
        assert_eq!(state.docker_scroll.scroll_offset(), 0);
        assert!(state.docker_scroll.is_focused());
    }
}
