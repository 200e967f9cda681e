//! Human-readable formatting for sizes, rates and percentages

const BYTE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const SPEED_UNITS: [&str; 4] = ["B/s", "kB/s", "MB/s", "GB/s"];

/// Bar glyphs
pub const BAR_FULL: char = '█';
pub const BAR_EMPTY: char = '░';

/// Format a byte count on the 1024-based ladder with one decimal.
///
/// `0` is special-cased to `"0B"`; everything else is `"<value> <unit>"`,
/// capped at terabytes.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, BYTE_UNITS[unit])
}

/// Format a transfer rate (bytes per second) with two decimals.
pub fn format_speed(bytes_per_sec: f64) -> String {
    if !bytes_per_sec.is_finite() || bytes_per_sec <= 0.0 {
        return "0 B/s".to_string();
    }
    let mut value = bytes_per_sec;
    let mut unit = 0;
    while value >= 1024.0 && unit < SPEED_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, SPEED_UNITS[unit])
}

/// Format a percentage with two decimals (`"40.00%"`).
pub fn format_percent(percent: f64) -> String {
    let percent = if percent.is_finite() { percent } else { 0.0 };
    format!("{:.2}%", percent)
}

/// Fixed-width usage bar, one cell per 5%.
pub fn usage_bar(percent: f64, width: usize) -> String {
    let percent = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let filled = ((percent / 100.0) * width as f64).floor() as usize;
    let filled = filled.min(width);
    let mut bar = String::with_capacity(width * 3);
    bar.extend(std::iter::repeat(BAR_FULL).take(filled));
    bar.extend(std::iter::repeat(BAR_EMPTY).take(width - filled));
    bar
}

/// Uppercase the first character.
pub fn first_upper_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
