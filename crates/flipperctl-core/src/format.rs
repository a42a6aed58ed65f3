//! Terminal output helpers.
//!
//! Pretty JSON, aligned tables, byte sizes, and ANSI-coloured status
//! messages for the CLI.

use serde_json::{Map, Value};

// ============================================================================
// ANSI colours
// ============================================================================

/// ANSI escape codes for terminal output.
pub mod colors {
    pub const GREEN: &str = "\x1b[92m";
    pub const RED: &str = "\x1b[91m";
    pub const YELLOW: &str = "\x1b[93m";
    pub const BLUE: &str = "\x1b[94m";
    pub const CYAN: &str = "\x1b[96m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
}

fn colored(text: &str, color: &str) -> String {
    format!("{color}{text}{}", colors::RESET)
}

/// Format a success message.
pub fn success_message(message: &str) -> String {
    colored(&format!("✓ {message}"), colors::GREEN)
}

/// Format an error message.
pub fn error_message(message: &str) -> String {
    colored(&format!("✗ {message}"), colors::RED)
}

/// Format an info message.
pub fn info_message(message: &str) -> String {
    colored(&format!("ℹ {message}"), colors::BLUE)
}

/// Format a warning message.
pub fn warning_message(message: &str) -> String {
    colored(&format!("⚠ {message}"), colors::YELLOW)
}

/// Format a section heading.
pub fn heading(title: &str) -> String {
    format!("{}{}{title}{}", colors::CYAN, colors::BOLD, colors::RESET)
}

// ============================================================================
// JSON and tables
// ============================================================================

/// Pretty-print a JSON value.
pub fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Render rows of key/value maps as an aligned text table.
///
/// Column order follows `headers` when given, otherwise the keys of the
/// first row. Missing cells render empty.
pub fn render_table(rows: &[Map<String, Value>], headers: Option<&[&str]>) -> String {
    if rows.is_empty() {
        return "No data to display".to_string();
    }

    let headers: Vec<String> = match headers {
        Some(h) => h.iter().map(|s| s.to_string()).collect(),
        None => rows[0].keys().cloned().collect(),
    };

    let mut widths: Vec<usize> = headers.iter().map(String::len).collect();
    for row in rows {
        for (i, header) in headers.iter().enumerate() {
            let cell = cell_text(row.get(header));
            widths[i] = widths[i].max(cell.len());
        }
    }

    let header_row = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{h:<width$}", width = widths[i]))
        .collect::<Vec<_>>()
        .join(" | ");

    let mut out = String::new();
    out.push_str(&header_row);
    out.push('\n');
    out.push_str(&"-".repeat(header_row.len()));
    for row in rows {
        out.push('\n');
        let line = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:<width$}", cell_text(row.get(h)), width = widths[i]))
            .collect::<Vec<_>>()
            .join(" | ");
        out.push_str(&line);
    }
    out
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Format a byte count as a human-readable size.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    for unit in UNITS {
        if value < 1024.0 {
            return format!("{value:.2} {unit}");
        }
        value /= 1024.0;
    }
    format!("{value:.2} PB")
}

// ============================================================================
// Tests
// ============================================================================
