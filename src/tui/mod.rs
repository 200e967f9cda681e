//! TUI Module - Developer dashboard
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        UI LAYER (widgets/)                          │
//! │  Pure rendering. No business logic. Reads AppState.                 │
//! └─────────────────────────────────────────────────────────────────────┘
//!                               ▲
//!                               │ AppState
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │               DOMAIN LAYER (state.rs, focus.rs)                     │
//! │  AppState folds PanelUpdates. Scroll/selection state machines.      │
//! └─────────────────────────────────────────────────────────────────────┘
//!                               ▲
//!                               │ PanelUpdate channel
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 PRODUCERS (app.rs → refresh.rs)                     │
//! │  One RefreshScheduler per panel over sources/, docker/, projects/.  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

mod app;
mod events;
mod state;
mod theme;

pub mod focus;
pub mod widgets;

pub use app::TuiApp;
pub use focus::{ScrollEvent, ScrollState, SelectionEvent, SelectionState};
pub use state::{AppState, Loadable, PanelUpdate, ScrollPanel};
pub use theme::Theme;

use crate::config::DashConfig;

/// Run the dashboard until the user quits
pub async fn run(config: DashConfig, notice: Option<String>) -> anyhow::Result<()> {
    TuiApp::new(config, notice).run().await
}
