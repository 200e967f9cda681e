//! Dashboard Theme
//!
//! Palette comes from the `theme` config block. Each entry is anything
//! ratatui's `Color` parses: a name (`blue`, `lightcyan`), `#rrggbb` or an
//! ANSI index. Unparseable entries fall back to the default for that slot.

use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};

use crate::config::ThemeConfig;
use crate::docker::ContainerState;
use crate::sources::status::SignalQuality;

/// Usage above this is drawn in the error color
pub const HIGH_USAGE_PERCENT: f64 = 80.0;

/// Temperatures above this (°C) are drawn in the error color
pub const HIGH_TEMPERATURE: f64 = 75.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub primary: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub text: Color,
    pub border: Option<Color>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}

fn parse_color(value: &str, slot: &str, fallback: Color) -> Color {
    match Color::from_str(value.trim()) {
        Ok(color) => color,
        Err(_) => {
            tracing::warn!(slot, value, "unknown theme color, using default");
            fallback
        }
    }
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        Self {
            primary: parse_color(&config.primary, "primary", Color::Blue),
            secondary: parse_color(&config.secondary, "secondary", Color::Cyan),
            success: parse_color(&config.success, "success", Color::Green),
            warning: parse_color(&config.warning, "warning", Color::Yellow),
            error: parse_color(&config.error, "error", Color::Red),
            text: parse_color(&config.text, "text", Color::White),
            border: config
                .border
                .as_deref()
                .map(|b| parse_color(b, "border", Color::Reset)),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Styles
    // ─────────────────────────────────────────────────────────────────────

    pub fn text(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn label(&self) -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn column_header(&self) -> Style {
        Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }

    pub fn dimmed(&self) -> Style {
        Style::default().fg(Color::DarkGray)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Focused panels get the secondary color
    pub fn border(&self, focused: bool) -> Style {
        match (focused, self.border) {
            (true, _) => Style::default().fg(self.secondary),
            (false, Some(color)) => Style::default().fg(color),
            (false, None) => Style::default(),
        }
    }

    /// Selected row in the processes panel
    pub fn selected(&self) -> Style {
        Style::default()
            .fg(self.secondary)
            .add_modifier(Modifier::REVERSED)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Value Colors
    // ─────────────────────────────────────────────────────────────────────

    pub fn usage(&self, percent: f64) -> Style {
        if percent > HIGH_USAGE_PERCENT {
            self.error()
        } else {
            self.success()
        }
    }

    pub fn temperature(&self, celsius: f64) -> Style {
        if celsius > HIGH_TEMPERATURE {
            self.error()
        } else {
            self.success()
        }
    }

    pub fn container_state(&self, state: &ContainerState) -> Style {
        match state {
            ContainerState::Running => self.success(),
            ContainerState::Restarting => self.warning(),
            ContainerState::Other(_) => self.error(),
        }
    }

    pub fn signal(&self, quality: SignalQuality) -> Style {
        match quality {
            SignalQuality::Good => self.success(),
            SignalQuality::Fair => self.warning(),
            SignalQuality::Poor => self.error(),
        }
    }

    pub fn health(&self, ok: bool) -> Style {
        if ok {
            self.success()
        } else {
            self.error()
        }
    }
}

/// Symbols used throughout the dashboard
pub mod icons {
    pub const BRANCH: &str = "⎇";
    pub const BEHIND: &str = "↓";
    pub const AHEAD: &str = "↑";
    pub const CHANGES: &str = "●";
    pub const CLEAN: &str = "✔";
    pub const DOT: &str = "●";
    pub const SEPARATOR: &str = " • ";
}
