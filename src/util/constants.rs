//! Centralized constants for collector timeouts
//!
//! Panel refresh intervals live in the config defaults; these are the
//! per-operation limits that keep a single probe from stalling its panel.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════
// Probe Timeouts
// ═══════════════════════════════════════════════════════════════

/// Timeout for a single TCP connect probe (ports, ping)
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Timeout for HTTP checks and the public IP lookup
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for `<tool> --version` lookups in the status bar
pub const VERSION_TIMEOUT: Duration = Duration::from_secs(2);

/// Timeout for a local port probe (loopback answers or refuses immediately)
pub const LOCAL_PORT_TIMEOUT: Duration = Duration::from_millis(300);

// ═══════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════
