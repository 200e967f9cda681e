//! Utilities Module - shared infrastructure
//!
//! - `constants`: Centralized timeouts and probe limits
//! - `format`: Byte/speed/percent formatting shared by collectors and panels

pub mod constants;
pub mod format;

// Re-export public items
pub use constants::{HTTP_TIMEOUT, PROBE_TIMEOUT, VERSION_TIMEOUT};
pub use format::{first_upper_case, format_bytes, format_percent, format_speed, usage_bar};
