//! Terminal output: styled text for humans, one JSON object per line for machines.
//!
//! Answers and the context dump go to stdout; spinners and errors go to stderr.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::cli::OutputFormat;

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(format: OutputFormat) {
    JSON_MODE.store(matches!(format, OutputFormat::Json), Ordering::Relaxed);
}

fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

#[derive(Serialize)]
struct Msg<'a> {
    level: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a JsonValue>,
}

fn to_json_line(level: &str, message: &str, data: Option<&JsonValue>) -> String {
    serde_json::to_string(&Msg {
        level,
        message,
        data,
    })
    .unwrap_or_else(|_| serde_json::json!({ "level": level, "message": message }).to_string())
}

fn emit_json(level: &str, message: &str, data: Option<&JsonValue>) {
    println!("{}", to_json_line(level, message, data));
}

pub fn header(text: &str) {
    if is_json() {
        emit_json("info", text, None);
    } else {
        println!("{}", style(text).bold().cyan());
    }
}

pub fn success(text: &str) {
    if is_json() {
        emit_json("success", text, None);
    } else {
        println!("{} {}", style("✓").green(), style(text).bright());
    }
}

pub fn error(text: &str) {
    if is_json() {
        eprintln!("{}", to_json_line("error", text, None));
    } else {
        eprintln!("{} {}", style("✗").red(), style(text).bright());
    }
}

/// Non-fatal notice, e.g. no active debugging session.
pub fn warning(text: &str) {
    if is_json() {
        emit_json("warning", text, None);
    } else {
        eprintln!("{} {}", style("!").yellow(), style(text).bright());
    }
}

pub fn dim(text: &str) {
    if is_json() {
        emit_json("info", text, None);
    } else {
        println!("{}", style(text).dim());
    }
}

pub fn kv(key: &str, value: &str) {
    if is_json() {
        let data = serde_json::json!({ key: value });
        emit_json("info", key, Some(&data));
    } else {
        println!("  {} {}", style(key).cyan().bold(), value);
    }
}

/// The rendered debug context, verbatim.
pub fn context_block(text: &str) {
    if is_json() {
        let data = serde_json::json!({ "context": text });
        emit_json("data", "debug_context", Some(&data));
    } else {
        println!("{text}");
    }
}

/// One streamed answer fragment, printed without a line break.
pub fn fragment(text: &str) {
    if is_json() {
        let data = serde_json::json!({ "text": text });
        emit_json("markdown", "", Some(&data));
    } else {
        print!("{text}");
        let _ = std::io::stdout().flush();
    }
}

/// Close a run of fragments.
pub fn end_fragments() {
    if !is_json() {
        println!();
    }
}

pub fn prompt(text: &str) {
    if !is_json() {
        print!("{} ", style(text).green().bold());
        let _ = std::io::stdout().flush();
    }
}

pub fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn table_header(table: &mut Table, columns: &[&str]) {
    table.set_header(
        columns
            .iter()
            .map(|c| Cell::new(c).fg(Color::Cyan).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
}

/// Print a single-column listing (JSON mode emits an items array instead).
pub fn list(title: &str, items: &[String]) {
    if is_json() {
        let data = serde_json::json!({ "items": items });
        emit_json("list", title, Some(&data));
        return;
    }
    let mut table = table();
    table_header(&mut table, &[title]);
    for item in items {
        table.add_row(vec![Cell::new(item).fg(Color::Green)]);
    }
    println!("{table}");
}

/// Spinner on stderr; hidden in JSON mode.
pub fn spinner(message: &str) -> ProgressBar {
    if is_json() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    let template = ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(template);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

pub fn spinner_success(spinner: &ProgressBar, message: &str) {
    spinner.finish_and_clear();
    if is_json() {
        emit_json("success", message, None);
    } else {
        eprintln!("{} {}", style("✓").green(), message);
    }
}

pub fn spinner_error(spinner: &ProgressBar, message: &str) {
    spinner.finish_and_clear();
    error(message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line_envelope() {
        let data = serde_json::json!({ "text": "hi" });
        let line = to_json_line("markdown", "", Some(&data));
        let parsed: JsonValue = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["level"], "markdown");
        assert_eq!(parsed["data"]["text"], "hi");

        let line = to_json_line("error", "boom \"quoted\"", None);
        let parsed: JsonValue = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["message"], "boom \"quoted\"");
        assert!(parsed.get("data").is_none());
    }
}
