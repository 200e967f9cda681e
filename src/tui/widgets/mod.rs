//! TUI Widgets - Panel renderers
//!
//! Each renderer is stateless: it reads `AppState` and the theme and draws
//! into the rect the layout gave it. Scroll offsets are owned by the state
//! and only read here.

mod host;
mod lists;
mod status_bar;

pub use host::{render_cpu, render_disks, render_memory, render_network, render_processes};
pub use lists::{render_docker, render_ports, render_projects, render_services};
pub use status_bar::{render_footer, render_status_bar};

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Every panel's rect for one terminal size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardLayout {
    pub status_bar: Rect,
    pub cpu: Rect,
    pub memory: Rect,
    pub disks: Rect,
    pub network: Rect,
    pub ports: Rect,
    pub services: Rect,
    pub projects: Rect,
    pub processes: Rect,
    pub docker: Rect,
    pub footer: Rect,
}

impl DashboardLayout {
    pub fn compute(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Status bar
                Constraint::Min(10),   // Panels
                Constraint::Length(1), // Footer
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
            .split(rows[1]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // CPU
                Constraint::Length(6), // Memory | Disks
                Constraint::Fill(1),   // Network | Ports
                Constraint::Fill(1),   // Services | Projects
            ])
            .split(columns[0]);

        let split = |rect: Rect, left_pct: u16| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(left_pct),
                    Constraint::Percentage(100 - left_pct),
                ])
                .split(rect)
        };
        let mem_disks = split(left[1], 50);
        let net_ports = split(left[2], 35);
        let services_projects = split(left[3], 50);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(columns[1]);

        Self {
            status_bar: rows[0],
            cpu: left[0],
            memory: mem_disks[0],
            disks: mem_disks[1],
            network: net_ports[0],
            ports: net_ports[1],
            services: services_projects[0],
            projects: services_projects[1],
            processes: right[0],
            docker: right[1],
            footer: rows[2],
        }
    }
}

/// Common widget utilities
pub mod utils {
    use ratatui::layout::Rect;
    use ratatui::text::Span;
    use ratatui::widgets::{Block, Borders};

    use crate::tui::theme::Theme;

    /// Rows available to a bordered list with one header row
    pub fn list_viewport(area: Rect) -> usize {
        area.height.saturating_sub(3) as usize
    }

    /// Bordered panel with a titled top edge
    pub fn panel_block<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border(focused))
            .title(Span::styled(format!(" {} ", title), theme.title()))
    }

    /// Truncate string with ellipsis, counting characters
    pub fn truncate(s: &str, max_len: usize) -> String {
        let len = s.chars().count();
        if len <= max_len {
            s.to_string()
        } else if max_len <= 3 {
            s.chars().take(max_len).collect()
        } else {
            let mut out: String = s.chars().take(max_len - 3).collect();
            out.push_str("...");
            out
        }
    }

    /// `"42ms"`, or `"N/A"` without a measurement
    pub fn format_latency(latency: Option<std::time::Duration>) -> String {
        latency.map_or_else(|| "N/A".to_string(), |d| format!("{}ms", d.as_millis()))
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("hi", 2), "hi");
        assert_eq!(truncate("żółć-żółć", 6), "żół...");
    }

    #[test]
    fn test_format_latency() {
        assert_eq!(format_latency(Some(Duration::from_millis(42))), "42ms");
        assert_eq!(format_latency(None), "N/A");
    }

    #[test]
    fn test_list_viewport() {
        assert_eq!(list_viewport(Rect::new(0, 0, 40, 10)), 7);
        assert_eq!(list_viewport(Rect::new(0, 0, 40, 2)), 0);
    }

    #[test]
    fn test_layout_covers_terminal() {
        let area = Rect::new(0, 0, 160, 48);
        let layout = DashboardLayout::compute(area);
        assert_eq!(layout.status_bar.y, 0);
        assert_eq!(layout.footer.y, 47);
        assert_eq!(layout.cpu.height, 4);
        assert!(layout.processes.x >= layout.cpu.right());
        assert_eq!(layout.docker.bottom(), 47);
    }
}
