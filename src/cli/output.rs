//! Operator-facing CLI output.
//!
//! Human-readable text with colored status symbols, or one JSON object per
//! line when JSON mode is on (for scripting).

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;
use serde_json::json;

static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// Switch JSON line output on or off.
pub fn configure(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);
}

/// Return whether machine-readable JSON output is enabled.
#[must_use]
pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

fn emit_json_line(kind: &str, payload: serde_json::Value) {
    println!(
        "{}",
        json!({
            "type": kind,
            "payload": payload,
        })
    );
}

/// Print the application header with name and version.
pub fn header(version: &str) {
    if is_json() {
        emit_json_line(
            "header",
            json!({
                "app": "twemrelic",
                "version": version,
            }),
        );
        return;
    }

    println!("{} {}", "twemrelic".bold(), version.dimmed());
}

/// Print a section header.
pub fn section(title: &str) {
    if is_json() {
        emit_json_line("section", json!({ "title": title }));
        return;
    }

    println!();
    println!("{}", title.bold());
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let value = value.to_string();
    if is_json() {
        emit_json_line("field", json!({ "label": label, "value": value }));
        return;
    }

    println!("  {:<14} {}", label.dimmed(), value);
}

/// Print a success line.
pub fn success(message: &str) {
    if is_json() {
        emit_json_line("success", json!({ "message": message }));
        return;
    }

    println!("  {} {}", "✓".green(), message);
}

/// Print a warning line.
pub fn warning(message: &str) {
    if is_json() {
        emit_json_line("warning", json!({ "message": message }));
        return;
    }

    println!("  {} {}", "⚠".yellow(), message);
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if is_json() {
        eprintln!(
            "{}",
            json!({
                "type": "error",
                "payload": { "message": message },
            })
        );
        return;
    }

    eprintln!("  {} {}", "×".red(), message);
}

/// Print a raw JSON value as one line.
pub fn json_output(value: serde_json::Value) {
    println!("{value}");
}

/// Print preformatted text, such as a rendered table.
pub fn block(text: &str) {
    println!("{text}");
}
