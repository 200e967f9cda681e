//! Top status bar and bottom key-help footer

use std::fmt::Write as _;

use chrono::{DateTime, Local, TimeZone};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::config::StatusBarConfig;
use crate::tui::state::AppState;
use crate::tui::theme::{icons, Theme};

/// Format `now` with a strftime pattern, `None` if the pattern is invalid.
fn format_clock<Tz: TimeZone>(now: &DateTime<Tz>, pattern: &str) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    write!(out, "{}", now.format(pattern)).ok()?;
    Some(out)
}

/// Status bar items in display order; disabled or unavailable ones are left out.
pub fn status_items<Tz: TimeZone>(
    state: &AppState,
    config: &StatusBarConfig,
    now: &DateTime<Tz>,
    theme: &Theme,
) -> Vec<Span<'static>>
where
    Tz::Offset: std::fmt::Display,
{
    let mut items = Vec::new();

    if config.location.enabled && !state.location.is_empty() {
        items.push(Span::styled(state.location.clone(), theme.text()));
    }
    for toggle in [&config.date, &config.time] {
        if !toggle.enabled {
            continue;
        }
        match format_clock(now, &toggle.format) {
            Some(text) => items.push(Span::styled(text, theme.accent())),
            None => items.push(Span::styled("Invalid format", theme.error())),
        }
    }
    if config.wifi.enabled {
        if let Some(wifi) = &state.status.wifi {
            items.push(Span::styled(
                format!("{} {} {}dBm", icons::DOT, wifi.iface, wifi.signal_dbm),
                theme.signal(wifi.quality()),
            ));
        }
    }
    if config.battery.enabled {
        let text = match &state.status.battery {
            Some(b) if b.charging => format!("Bat: {}% (charging)", b.percent),
            Some(b) => format!("Bat: {}%", b.percent),
            None => "Power: AC".to_string(),
        };
        items.push(Span::styled(text, theme.text()));
    }

    let versions = [
        (config.node.enabled, "Node", &state.versions.node),
        (config.python3.enabled, "Python", &state.versions.python3),
        (config.git.enabled, "Git", &state.versions.git),
    ];
    for (enabled, label, version) in versions {
        if let (true, Some(v)) = (enabled, version) {
            items.push(Span::styled(format!("{} {}", label, v), theme.dimmed()));
        }
    }

    items
}

fn join_items(items: Vec<Span<'static>>, theme: &Theme) -> Line<'static> {
    let mut spans = Vec::with_capacity(items.len() * 2 + 1);
    spans.push(Span::raw(" "));
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(icons::SEPARATOR, theme.dimmed()));
        }
        spans.push(item);
    }
    Line::from(spans)
}

pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    config: &StatusBarConfig,
    theme: &Theme,
) {
    let items = status_items(state, config, &Local::now(), theme);
    frame.render_widget(Paragraph::new(join_items(items, theme)), area);
}

pub fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let keys = [
        ("q", "quit"),
        ("r/d/s/p", "focus"),
        ("↑↓", "scroll"),
        ("PgUp/PgDn", "page"),
        ("g/G", "first/last"),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (key, what)) in keys.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(*key, theme.accent()));
        spans.push(Span::styled(format!(" {}", what), theme.dimmed()));
    }
    if let Some(notice) = &state.notice {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(notice.clone(), theme.warning()));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
