//! Scrollable list panels: ports, services, projects, docker
//!
//! All four share the same shape: a header row, then the slice of rows the
//! panel's `ScrollState` says is visible. A focused panel gets a highlighted
//! border and a `[n-m/total]` position hint in its title.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use super::utils::{format_latency, panel_block, truncate};
use crate::tui::focus::ScrollState;
use crate::tui::state::{AppState, Loadable, ScrollPanel};
use crate::tui::theme::{icons, Theme};
use crate::util::first_upper_case;

fn panel_title(name: &str, panel: ScrollPanel, scroll: &ScrollState) -> String {
    let base = format!("{} ({})", name, panel.hotkey());
    if !scroll.is_focused() || scroll.content_height() <= scroll.viewport_height() {
        return base;
    }
    let range = scroll.visible_range();
    format!(
        "{} [{}-{}/{}]",
        base,
        range.start + 1,
        range.end,
        scroll.content_height()
    )
}

fn render_message(frame: &mut Frame, area: Rect, title: &str, focused: bool, line: Line, theme: &Theme) {
    let paragraph = Paragraph::new(line).block(panel_block(title, focused, theme));
    frame.render_widget(paragraph, area);
}

#[allow(clippy::too_many_arguments)]
fn render_rows<'a, const N: usize>(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    scroll: &ScrollState,
    header: [&'a str; N],
    widths: [Constraint; N],
    rows: Vec<Row<'a>>,
    theme: &Theme,
) {
    let range = scroll.visible_range();
    let visible: Vec<Row> = rows
        .into_iter()
        .skip(range.start)
        .take(range.len())
        .collect();

    let table = Table::new(visible, widths)
        .header(Row::new(header).style(theme.column_header()))
        .block(panel_block(title, scroll.is_focused(), theme));
    frame.render_widget(table, area);
}

// ─────────────────────────────────────────────────────────────────────────────
// Ports
// ─────────────────────────────────────────────────────────────────────────────

pub fn render_ports(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let scroll = &state.ports_scroll;
    let title = panel_title("Ports", ScrollPanel::Ports, scroll);

    let Some(ports) = &state.ports else {
        let line = Line::from(Span::styled(" Loading...", theme.dimmed()));
        return render_message(frame, area, &title, scroll.is_focused(), line, theme);
    };
    if ports.is_empty() {
        let line = Line::from(Span::styled(" No ports configured.", theme.dimmed()));
        return render_message(frame, area, &title, scroll.is_focused(), line, theme);
    }

    let rows = ports
        .iter()
        .map(|p| {
            let (label, style) = if p.open {
                ("OK", theme.success())
            } else {
                ("NOT OK", theme.error())
            };
            Row::new(vec![
                Cell::from(truncate(&p.name, 16)).style(theme.text()),
                Cell::from("TCP").style(theme.dimmed()),
                Cell::from(p.port.to_string()),
                Cell::from(format!("{} {}", icons::DOT, label)).style(style),
            ])
        })
        .collect();

    render_rows(
        frame,
        area,
        &title,
        scroll,
        ["Service", "Protocol", "Port", "Status"],
        [
            Constraint::Fill(1),
            Constraint::Length(8),
            Constraint::Length(6),
            Constraint::Length(8),
        ],
        rows,
        theme,
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Services
// ─────────────────────────────────────────────────────────────────────────────

pub fn render_services(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let scroll = &state.services_scroll;
    let title = panel_title("Services", ScrollPanel::Services, scroll);

    let Some(services) = &state.services else {
        let line = Line::from(Span::styled(" Loading...", theme.dimmed()));
        return render_message(frame, area, &title, scroll.is_focused(), line, theme);
    };
    if services.is_empty() {
        let line = Line::from(Span::styled(" No services found.", theme.dimmed()));
        return render_message(frame, area, &title, scroll.is_focused(), line, theme);
    }

    let rows = services
        .iter()
        .map(|s| {
            let style = theme.health(s.is_ok());
            let label = if s.is_ok() { "OK" } else { "NOT OK" };
            Row::new(vec![
                Cell::from(truncate(&first_upper_case(&s.name), 18)).style(theme.text()),
                Cell::from(format_latency(s.latency)),
                Cell::from(format!("{} {}", icons::DOT, label)).style(style),
            ])
        })
        .collect();

    render_rows(
        frame,
        area,
        &title,
        scroll,
        ["Service", "Latency", "Status"],
        [
            Constraint::Fill(1),
            Constraint::Length(8),
            Constraint::Length(8),
        ],
        rows,
        theme,
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────────────────────────

fn git_status_spans(entry: &crate::projects::ProjectEntry, theme: &Theme) -> Line<'static> {
    let git = &entry.git;
    if git.is_clean() {
        return Line::from(Span::styled(format!("{} Clean", icons::CLEAN), theme.success()));
    }

    let mut spans = Vec::new();
    if git.behind > 0 {
        spans.push(Span::styled(format!("{}{} ", icons::BEHIND, git.behind), theme.error()));
    }
    if git.ahead > 0 {
        spans.push(Span::styled(format!("{}{} ", icons::AHEAD, git.ahead), theme.success()));
    }
    if git.changes > 0 {
        spans.push(Span::styled(
            format!("{} {}", icons::CHANGES, git.changes),
            theme.warning(),
        ));
    }
    Line::from(spans)
}

pub fn render_projects(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let scroll = &state.projects_scroll;
    let title = panel_title("Projects", ScrollPanel::Projects, scroll);

    if state.projects.is_empty() {
        let line = Line::from(Span::styled(" No projects found.", theme.dimmed()));
        return render_message(frame, area, &title, scroll.is_focused(), line, theme);
    }

    let rows = state
        .projects
        .iter()
        .map(|entry| {
            let branch = entry.git.branch.as_deref().unwrap_or("HEAD");
            Row::new(vec![
                Cell::from(truncate(&entry.project.name, 20)).style(theme.text()),
                Cell::from(format!("{} {}", icons::BRANCH, truncate(branch, 18))).style(theme.accent()),
                Cell::from(git_status_spans(entry, theme)),
            ])
        })
        .collect();

    render_rows(
        frame,
        area,
        &title,
        scroll,
        ["Project", "Branch", "Status"],
        [
            Constraint::Fill(2),
            Constraint::Fill(2),
            Constraint::Fill(1),
        ],
        rows,
        theme,
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Docker
// ─────────────────────────────────────────────────────────────────────────────

pub fn render_docker(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let scroll = &state.docker_scroll;
    let title = panel_title("Docker", ScrollPanel::Docker, scroll);

    let containers = match &state.docker {
        Loadable::Loading => {
            let line = Line::from(Span::styled(" Loading...", theme.dimmed()));
            return render_message(frame, area, &title, scroll.is_focused(), line, theme);
        }
        Loadable::Failed(message) => {
            let line = Line::from(Span::styled(format!(" Error: {}", message), theme.error()));
            return render_message(frame, area, &title, scroll.is_focused(), line, theme);
        }
        Loadable::Ready(rows) if rows.is_empty() => {
            let line = Line::from(Span::styled(" No Docker containers found.", theme.dimmed()));
            return render_message(frame, area, &title, scroll.is_focused(), line, theme);
        }
        Loadable::Ready(rows) => rows,
    };

    let rows = containers
        .iter()
        .map(|c| {
            Row::new(vec![
                Cell::from(truncate(&c.name, 20)).style(theme.text()),
                Cell::from(c.state.as_str().to_string()).style(theme.container_state(&c.state)),
                Cell::from(c.metrics.cpu.clone()),
                Cell::from(c.metrics.memory.clone()),
                Cell::from(c.metrics.net_io.clone()).style(theme.dimmed()),
            ])
        })
        .collect();

    render_rows(
        frame,
        area,
        &title,
        scroll,
        ["Name", "State", "CPU", "Mem", "Net I/O"],
        [
            Constraint::Fill(2),
            Constraint::Length(10),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Fill(2),
        ],
        rows,
        theme,
    );
}
