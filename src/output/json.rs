//! JSON output formatting

use serde::Serialize;

/// Format any result as pretty JSON, newline terminated
pub fn format<T: Serialize>(value: &T) -> String {
    let mut json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize results: {}"}}"#, e));
    json.push('\n');
    json
}
