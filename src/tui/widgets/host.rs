//! Host panels: CPU, memory, disks, processes, network

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Row, Table},
    Frame,
};

use super::utils::{format_latency, panel_block, truncate};
use crate::tui::state::AppState;
use crate::tui::theme::Theme;
use crate::util::{format_bytes, format_speed, usage_bar};

const BAR_WIDTH: usize = 20;

fn loading(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) {
    let paragraph = Paragraph::new(Line::from(Span::styled(" Loading...", theme.dimmed())))
        .block(panel_block(title, false, theme));
    frame.render_widget(paragraph, area);
}

fn bar_line<'a>(label: &'a str, percent: f64, style: ratatui::style::Style, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!(" {:<7}", label), theme.label()),
        Span::styled(usage_bar(percent, BAR_WIDTH), style),
        Span::styled(format!(" {:.0}%", percent), style),
    ])
}

pub fn render_cpu(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let Some(cpu) = &state.cpu else {
        return loading(frame, area, "CPU Usage", theme);
    };

    let temperature = match cpu.temperature {
        Some(t) => Span::styled(format!("{:.0}°C", t), theme.temperature(t)),
        None => Span::styled("N/A", theme.dimmed()),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(" CPU Model: ", theme.label()),
            Span::styled(cpu.model.clone(), theme.text()),
            Span::raw("  "),
            Span::styled("Current Speed: ", theme.label()),
            Span::raw(format!("{:.2} GHz | ", cpu.speed_ghz)),
            Span::styled("Cores: ", theme.label()),
            Span::raw(cpu.cores.to_string()),
        ]),
        Line::from(vec![
            Span::styled(" Avg: ", theme.label()),
            Span::styled(
                format!("{} {:.2}%", usage_bar(cpu.usage, BAR_WIDTH), cpu.usage),
                theme.usage(cpu.usage),
            ),
            Span::raw("  "),
            Span::styled("Avg Load: ", theme.label()),
            Span::raw(format!("{:.2} | ", cpu.load_avg)),
            Span::styled("Temp: ", theme.label()),
            temperature,
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(panel_block("CPU Usage", false, theme)),
        area,
    );
}

pub fn render_memory(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let Some(mem) = &state.memory else {
        return loading(frame, area, "Memory Usage", theme);
    };

    let used = mem.used_percent();
    let lines = vec![
        bar_line("Free:", mem.free_percent(), theme.success(), theme),
        bar_line("Usage:", used, theme.usage(used), theme),
        bar_line("Swap:", mem.swap_percent(), theme.warning(), theme),
        Line::from(vec![
            Span::styled(format!(" {:<7}", "Total:"), theme.label()),
            Span::raw(format!(
                "{} (swap {})",
                format_bytes(mem.total),
                format_bytes(mem.swap_total)
            )),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(panel_block("Memory Usage", false, theme)),
        area,
    );
}

pub fn render_disks(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let Some(disk) = &state.disks else {
        return loading(frame, area, "Disk Usage", theme);
    };

    let used = disk.used_percent();
    let lines = vec![
        bar_line("Free:", disk.free_percent(), theme.success(), theme),
        bar_line("Used:", used, theme.usage(used), theme),
        Line::from(vec![
            Span::styled(format!(" {:<7}", "Total:"), theme.label()),
            Span::raw(format!(
                "{} ({} free)",
                format_bytes(disk.total),
                format_bytes(disk.free())
            )),
        ]),
        Line::from(vec![
            Span::styled(format!(" {:<7}", "I/O:"), theme.label()),
            Span::styled(format!("R {}", format_speed(disk.read_per_sec)), theme.accent()),
            Span::raw("  "),
            Span::styled(format!("W {}", format_speed(disk.write_per_sec)), theme.warning()),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(panel_block("Disk Usage", false, theme)),
        area,
    );
}

pub fn render_processes(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let block = panel_block("Processes", false, theme);
    if state.processes.is_empty() {
        let paragraph = Paragraph::new(Span::styled(" Loading...", theme.dimmed())).block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let viewport = area.height.saturating_sub(3).max(1) as usize;
    let selected = state.process_selection.selected_index();
    // Keep the cursor on screen
    let first = selected.saturating_sub(viewport.saturating_sub(1));

    let header = Row::new(vec!["PID", "Name", "CPU", "Memory"]).style(theme.column_header());
    let rows = state
        .processes
        .iter()
        .enumerate()
        .skip(first)
        .take(viewport)
        .map(|(i, p)| {
            let row = Row::new(vec![
                p.pid.to_string(),
                truncate(&p.name, 24),
                format!("{:.2}%", p.cpu),
                format!("{} ({:.1}%)", format_bytes(p.rss), p.mem_percent),
            ]);
            if i == selected {
                row.style(theme.selected())
            } else {
                row.style(theme.text())
            }
        });

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Fill(1),
            Constraint::Length(9),
            Constraint::Length(18),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}

pub fn render_network(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let wan = match &state.public_ip {
        Some(ip) => format!("{} ({}, {})", ip.ip, ip.city, ip.country),
        None => "Loading...".to_string(),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(" WAN: ", theme.label()),
        Span::styled(wan, theme.text()),
    ])];
    if let Some(ip) = &state.public_ip {
        lines.push(Line::from(vec![
            Span::styled(" ISP: ", theme.label()),
            Span::styled(ip.isp.clone(), theme.dimmed()),
        ]));
    }

    match &state.network {
        Some(net) => {
            let lan = match (&net.interfaces.lan_ip, &net.interfaces.iface) {
                (Some(ip), Some(iface)) => format!("{} ({})", ip, iface),
                _ => "N/A".to_string(),
            };
            let vpn = net
                .interfaces
                .vpn_ip
                .map_or_else(|| "Not Connected".to_string(), |ip| ip.to_string());
            let vpn_style = if net.interfaces.vpn_ip.is_some() {
                theme.success()
            } else {
                theme.dimmed()
            };
            lines.extend([
                Line::from(vec![
                    Span::styled(" LAN: ", theme.label()),
                    Span::styled(lan, theme.text()),
                ]),
                Line::from(vec![
                    Span::styled(" VPN: ", theme.label()),
                    Span::styled(vpn, vpn_style),
                ]),
                Line::from(vec![
                    Span::styled(" ↓ ", theme.success()),
                    Span::raw(format_speed(net.interfaces.rx_per_sec)),
                    Span::styled("  ↑ ", theme.accent()),
                    Span::raw(format_speed(net.interfaces.tx_per_sec)),
                ]),
                Line::from(vec![
                    Span::styled(" Ping: ", theme.label()),
                    Span::styled(
                        format_latency(net.ping),
                        theme.health(net.ping.is_some()),
                    ),
                ]),
            ]);
        }
        None => lines.push(Line::from(Span::styled(" LAN: loading...", theme.dimmed()))),
    }

    frame.render_widget(
        Paragraph::new(lines).block(panel_block("Network", false, theme)),
        area,
    );
}
