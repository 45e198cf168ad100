/// Crate-level constants
pub const ENGINE_NAME: &str = "CareBuddy";
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum length (in chars) of a derived episode title.
pub const TITLE_MAX_LEN: usize = 60;

/// Maximum length (in chars) of stored message snippets, both the
/// episode's last-message snippet and feedback snippets.
pub const SNIPPET_MAX_LEN: usize = 120;

/// Default number of entries returned in a feedback summary's
/// recent-feedback list.
pub const RECENT_FEEDBACK_LIMIT: usize = 10;

/// Timestamp storage format for SQLite text columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fixed call-to-action appended to every emergency escalation message.
pub const EMERGENCY_CALL_TO_ACTION: &str = "If this is happening right now, \
please call your local emergency number (such as 911), or ask someone \
nearby to call for you. You don't need to figure this out alone.";

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "carebuddy=info".to_string()
}

/// Char-boundary-safe truncation with a trailing ellipsis.
/// Returns the input unchanged when it fits.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}\u{2026}", cut.trim_end())
}
