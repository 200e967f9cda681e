//! TUI Application - Main entry point and run loop

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Frame, Terminal};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::events::{handle_key_event, poll_event, Action, TermEvent};
use super::state::{AppState, NetworkSample, PanelUpdate, ScrollPanel};
use super::theme::Theme;
use super::widgets::{self, utils::list_viewport, DashboardLayout};
use crate::config::DashConfig;
use crate::docker::{collect_containers, BollardEngine, ContainerEngine};
use crate::error::DashError;
use crate::projects::{discover, GitCli, MonitorOutcome, ProjectGitMonitor};
use crate::refresh::RefreshScheduler;
use crate::sources::{
    probe, status, CpuSampler, DiskSampler, MemorySampler, NetworkSampler, ProcessSampler,
    SharedSampler,
};

/// Event poll timeout; also bounds how stale a received update can get
const TICK_RATE: Duration = Duration::from_millis(100);

/// TUI Application
pub struct TuiApp {
    config: DashConfig,
    state: AppState,
    theme: Theme,
    layout: DashboardLayout,
    tx: UnboundedSender<PanelUpdate>,
    rx: UnboundedReceiver<PanelUpdate>,
    schedulers: Vec<RefreshScheduler>,
    monitor: Option<Arc<ProjectGitMonitor>>,
}

impl TuiApp {
    /// Create a new TUI application
    ///
    /// `notice` is shown in the footer, e.g. why the config file was ignored.
    pub fn new(config: DashConfig, notice: Option<String>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let theme = Theme::from_config(&config.theme);
        let state = AppState::new(status::location(), notice);

        Self {
            config,
            state,
            theme,
            layout: DashboardLayout::default(),
            tx,
            rx,
            schedulers: Vec::new(),
            monitor: None,
        }
    }

    /// Run the TUI application
    pub async fn run(mut self) -> anyhow::Result<()> {
        self.start_producers()?;

        let mut terminal = self.setup_terminal()?;
        let result = self.main_loop(&mut terminal).await;

        self.stop_producers();
        self.restore_terminal(&mut terminal)?;

        result
    }

    /// Setup terminal for TUI
    fn setup_terminal(&self) -> anyhow::Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    /// Restore terminal to normal state
    fn restore_terminal(
        &self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        Ok(())
    }

    /// Main event loop
    async fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            self.drain_updates();

            let size = terminal.size()?;
            self.relayout(Rect::new(0, 0, size.width, size.height));

            terminal.draw(|frame| self.render(frame))?;

            match poll_event(TICK_RATE)? {
                Some(TermEvent::Key(key)) => {
                    if handle_key_event(key, &mut self.state) == Action::Quit {
                        self.state.should_quit = true;
                    }
                }
                // Picked up by the relayout at the top of the next pass
                Some(TermEvent::Resize) | None => {}
            }

            if self.state.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Apply every update the producers sent since the last frame.
    fn drain_updates(&mut self) {
        while let Ok(update) = self.rx.try_recv() {
            self.state.apply(update);
        }
    }

    /// Recompute panel rects and re-clamp every scroll panel to its viewport.
    fn relayout(&mut self, area: Rect) {
        self.layout = DashboardLayout::compute(area);
        for panel in ScrollPanel::ALL {
            let rect = self.panel_rect(panel);
            self.state.remeasure(panel, list_viewport(rect));
        }
    }

    fn panel_rect(&self, panel: ScrollPanel) -> Rect {
        match panel {
            ScrollPanel::Projects => self.layout.projects,
            ScrollPanel::Docker => self.layout.docker,
            ScrollPanel::Services => self.layout.services,
            ScrollPanel::Ports => self.layout.ports,
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame) {
        let layout = &self.layout;
        let (state, theme) = (&self.state, &self.theme);

        widgets::render_status_bar(frame, layout.status_bar, state, &self.config.status_bar, theme);
        widgets::render_cpu(frame, layout.cpu, state, theme);
        widgets::render_memory(frame, layout.memory, state, theme);
        widgets::render_disks(frame, layout.disks, state, theme);
        widgets::render_network(frame, layout.network, state, theme);
        widgets::render_ports(frame, layout.ports, state, theme);
        widgets::render_services(frame, layout.services, state, theme);
        widgets::render_projects(frame, layout.projects, state, theme);
        widgets::render_processes(frame, layout.processes, state, theme);
        widgets::render_docker(frame, layout.docker, state, theme);
        widgets::render_footer(frame, layout.footer, state, theme);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Producers
    // ─────────────────────────────────────────────────────────────────────

    fn sink(&self) -> impl Fn(PanelUpdate) + Send + Sync + 'static {
        let tx = self.tx.clone();
        move |update| {
            // Receiver gone means the UI is shutting down
            let _ = tx.send(update);
        }
    }

    fn start_producers(&mut self) -> anyhow::Result<()> {
        let config = self.config.clone();
        let client = probe::http_client()?;

        let cpu = SharedSampler::new(CpuSampler::new());
        self.schedule("cpu", config.cpu.interval(), move || {
            let cpu = cpu.clone();
            async move { cpu.sample().await.map(PanelUpdate::Cpu) }
        });

        let memory = SharedSampler::new(MemorySampler::new());
        self.schedule("memory", config.memory.interval(), move || {
            let memory = memory.clone();
            async move { memory.sample().await.map(PanelUpdate::Memory) }
        });

        let disks = SharedSampler::new(DiskSampler::new());
        self.schedule("disks", config.disks.interval(), move || {
            let disks = disks.clone();
            async move { disks.sample().await.map(PanelUpdate::Disks) }
        });

        let processes = SharedSampler::new(ProcessSampler::new());
        self.schedule("processes", config.processes.interval(), move || {
            let processes = processes.clone();
            async move { processes.sample().await.map(PanelUpdate::Processes) }
        });

        let network = SharedSampler::new(NetworkSampler::new());
        self.schedule("network", config.network.interval(), move || {
            let network = network.clone();
            async move {
                let (interfaces, ping) = tokio::join!(network.sample(), probe::ping());
                Ok::<_, DashError>(PanelUpdate::Network(NetworkSample {
                    interfaces: interfaces?,
                    ping,
                }))
            }
        });

        // A failed lookup keeps the last known address on screen
        let ip_client = client.clone();
        self.schedule("public-ip", config.network.public_ip_interval(), move || {
            let client = ip_client.clone();
            async move { probe::fetch_public_ip(&client).await.map(PanelUpdate::PublicIp) }
        });

        let ports = Arc::new(config.port_scanner.list.clone());
        self.schedule("ports", config.port_scanner.interval(), move || {
            let ports = Arc::clone(&ports);
            async move { Ok::<_, DashError>(PanelUpdate::Ports(probe::scan_ports(&ports).await)) }
        });

        let services = Arc::new(config.services.list.clone());
        self.schedule("services", config.services.interval(), move || {
            let (client, services) = (client.clone(), Arc::clone(&services));
            async move {
                Ok::<_, DashError>(PanelUpdate::Services(
                    probe::check_services(&client, &services).await,
                ))
            }
        });

        let engine: Arc<dyn ContainerEngine> = Arc::new(BollardEngine::connect());
        self.schedule("docker", config.docker.interval(), move || {
            let engine = Arc::clone(&engine);
            async move {
                let rows = collect_containers(engine.as_ref()).await;
                Ok::<_, DashError>(PanelUpdate::Docker(rows.map_err(|e| e.panel_message())))
            }
        });

        let bar = config.status_bar.clone();
        self.schedule("status", bar.interval(), move || {
            let (wifi, battery) = (bar.wifi.enabled, bar.battery.enabled);
            async move { status::sample_status(wifi, battery).await.map(PanelUpdate::Status) }
        });

        // Versions don't change while we run
        let sink = self.sink();
        let bar = config.status_bar.clone();
        tokio::spawn(async move {
            sink(PanelUpdate::Versions(status::tool_versions(&bar).await));
        });

        self.start_project_monitor();
        Ok(())
    }

    fn schedule<P, Fut>(&mut self, name: &'static str, interval: Duration, producer: P)
    where
        P: FnMut() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = crate::error::Result<PanelUpdate>> + Send + 'static,
    {
        let scheduler = RefreshScheduler::start(name, interval, producer, self.sink());
        self.schedulers.push(scheduler);
    }

    fn start_project_monitor(&mut self) {
        let projects = discover(&self.config.projects);
        tracing::info!(count = projects.len(), "projects discovered");

        let monitor = Arc::new(ProjectGitMonitor::new(
            projects,
            Arc::new(GitCli::default()),
            self.config.projects.git_timeout(),
            self.config.projects.query_delay(),
        ));
        self.monitor = Some(Arc::clone(&monitor));

        let sink = self.sink();
        let scheduler = RefreshScheduler::start(
            "projects",
            self.config.projects.interval(),
            move || {
                let monitor = Arc::clone(&monitor);
                async move { Ok::<_, DashError>(monitor.run_cycle().await) }
            },
            move |outcome| {
                if let MonitorOutcome::Completed(entries) = outcome {
                    sink(PanelUpdate::Projects(entries));
                }
            },
        );
        self.schedulers.push(scheduler);
    }

    fn stop_producers(&mut self) {
        for scheduler in &mut self.schedulers {
            scheduler.stop();
        }
        if let Some(monitor) = self.monitor.take() {
            monitor.shutdown();
        }
        tracing::debug!(count = self.schedulers.len(), "refresh tasks stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projects::{GitStatus, ProjectEntry, ProjectRecord};
    use crate::tui::focus::ScrollEvent;

    fn app_with_projects(n: usize) -> TuiApp {
        let mut app = TuiApp::new(DashConfig::default(), None);
        app.state.projects = (0..n)
            .map(|i| ProjectEntry {
                project: ProjectRecord::from_path(format!("/src/p{}", i).into()),
                git: GitStatus {
                    is_repo: true,
                    ..Default::default()
                },
            })
            .collect();
        app
    }

    #[test]
    fn test_relayout_measures_each_panel() {
        let mut app = app_with_projects(40);
        app.relayout(Rect::new(0, 0, 160, 48));

        let expected = list_viewport(app.layout.projects);
        assert!(expected > 0);
        assert_eq!(app.state.projects_scroll.viewport_height(), expected);
        assert_eq!(app.state.projects_scroll.content_height(), 40);
        assert_eq!(
            app.state.docker_scroll.viewport_height(),
            list_viewport(app.layout.docker)
        );
    }

    #[test]
    fn test_growing_terminal_reclamps_offset() {
        let mut app = app_with_projects(40);
        app.relayout(Rect::new(0, 0, 160, 48));
        app.state.projects_scroll.apply(ScrollEvent::ToggleFocus);
        app.state.projects_scroll.apply(ScrollEvent::ScrollDown(100));
        let deep = app.state.projects_scroll.scroll_offset();
        assert_eq!(deep, app.state.projects_scroll.max_offset());

        app.relayout(Rect::new(0, 0, 160, 120));
        assert!(app.state.projects_scroll.scroll_offset() < deep);
        assert_eq!(
            app.state.projects_scroll.scroll_offset(),
            app.state.projects_scroll.max_offset()
        );
    }

    #[test]
    fn test_drain_applies_pending_updates() {
        let mut app = TuiApp::new(DashConfig::default(), None);
        app.tx.send(PanelUpdate::Docker(Err("down".into()))).unwrap();
        app.tx.send(PanelUpdate::Ports(Vec::new())).unwrap();
        app.drain_updates();
        assert_eq!(app.state.ports, Some(Vec::new()));
        assert!(matches!(app.state.docker, crate::tui::state::Loadable::Failed(_)));
    }
}
