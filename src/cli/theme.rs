//! Color theming for CLI output.
//!
//! Respects `NO_COLOR` environment variable and TTY detection.

use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::style::Stylize;

static COLORS_ENABLED: AtomicBool = AtomicBool::new(false);

/// Initialize color support detection.
/// Call this once at startup before any themed output.
pub fn init() {
    let enabled = std::env::var("NO_COLOR").is_err() && std::io::stdout().is_terminal();
    COLORS_ENABLED.store(enabled, Ordering::Relaxed);
}

fn colors_enabled() -> bool {
    COLORS_ENABLED.load(Ordering::Relaxed)
}

// ─── Semantic Functions ─────────────────────────────────────────────────────

/// Format text as an error (red).
pub fn error(text: &str) -> String {
    if colors_enabled() {
        text.red().to_string()
    } else {
        text.to_string()
    }
}

/// Format text as a warning (yellow).
pub fn warning(text: &str) -> String {
    if colors_enabled() {
        text.yellow().to_string()
    } else {
        text.to_string()
    }
}

/// Format text as success (green).
pub fn success(text: &str) -> String {
    if colors_enabled() {
        text.green().to_string()
    } else {
        text.to_string()
    }
}

// ─── Data Display Functions ────────────────────────────────────────────────

/// Format a visibility or status label (yellow).
pub fn label(text: &str) -> String {
    if colors_enabled() {
        text.yellow().to_string()
    } else {
        text.to_string()
    }
}

/// Format secondary metadata like counts or sizes (cyan).
pub fn meta(text: &str) -> String {
    if colors_enabled() {
        text.cyan().to_string()
    } else {
        text.to_string()
    }
}

/// Format text as dim/secondary (dark grey).
pub fn dim(text: &str) -> String {
    if colors_enabled() {
        text.dark_grey().to_string()
    } else {
        text.to_string()
    }
}

/// Format text as a header (bold white).
pub fn header(text: &str) -> String {
    if colors_enabled() {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

// ─── Helper Functions ───────────────────────────────────────────────────────

/// Shorten a memo UID to its first 8 characters, with a dim suffix.
pub fn short_uid(uid: &str) -> String {
    let prefix: String = uid.chars().take(8).collect();
    if uid.chars().count() <= 8 {
        return prefix;
    }
    if colors_enabled() {
        format!("{}{}", prefix.blue(), "…".dark_blue())
    } else {
        format!("{}…", prefix)
    }
}
