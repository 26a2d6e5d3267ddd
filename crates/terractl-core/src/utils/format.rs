//! Human-readable sizes and terminal output cleanup.

use regex::Regex;
use std::sync::LazyLock;

static ANSI_ESCAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1B(?:[@-Z\\-_]|\[[0-?]*[ -/]*[@-~])").expect("static ANSI pattern")
});

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with one decimal in the first unit below 1024.
///
/// `0 -> "0.0B"`, `1536 -> "1.5KB"`, `1073741824 -> "1.0GB"`; anything past
/// terabytes is reported in PB.
#[allow(clippy::cast_precision_loss)]
pub fn format_bytes(size: u64) -> String {
    let mut value = size as f64;
    for unit in UNITS {
        if value.abs() < 1024.0 {
            return format!("{value:.1}{unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.1}PB")
}

/// Remove ANSI escape sequences (colors, cursor movement) from captured output.
pub fn strip_ansi_codes(text: &str) -> String {
    ANSI_ESCAPE_RE.replace_all(text, "").into_owned()
}
