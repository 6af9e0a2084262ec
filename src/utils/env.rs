//! Environment variable utilities
//!
//! Provides helpers for reading environment variables.

/// Get environment variable as Option
///
/// Returns `Some(value)` if set, `None` if not set.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get environment variable as boolean
///
/// Returns `true` if value is "true", "1", "yes", "on" (case-insensitive).
/// Returns `false` otherwise or if not set.
pub fn env_bool(key: &str) -> bool {
    env_bool_opt(key).unwrap_or(false)
}

/// Get environment variable as boolean, `None` if not set
pub fn env_bool_opt(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|v| {
        let v_lower = v.to_lowercase();
        v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
    })
}
