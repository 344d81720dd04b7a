//! Terminal output for CLI handlers.
//!
//! Every helper honours the global flags: `--json` turns each call into one
//! JSON line (`{"type": ..., "payload": ...}`), `--quiet` drops everything
//! except warnings and errors, and `--color` decides whether styling is
//! applied.

use std::fmt::Display;
use std::sync::OnceLock;

use owo_colors::OwoColorize;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::json;

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
    pub verbose: u8,
    pub color: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8, color: bool) -> Self {
        Self {
            json,
            quiet,
            verbose,
            color,
        }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn current() -> OutputConfig {
    *config_cell().read()
}

fn suppressed(config: OutputConfig) -> bool {
    !config.json && config.quiet
}

fn emit_json_line(kind: &str, payload: serde_json::Value) {
    println!("{}", json!({ "type": kind, "payload": payload }));
}

/// Apply output settings from the global CLI flags.
pub fn configure(config: OutputConfig) {
    *config_cell().write() = config;
}

#[must_use]
pub fn is_json() -> bool {
    current().json
}

#[must_use]
pub fn verbosity() -> u8 {
    current().verbose
}

fn styled<F>(text: &str, style: F) -> String
where
    F: FnOnce(&str) -> String,
{
    if current().color {
        style(text)
    } else {
        text.to_string()
    }
}

/// Print the application name and version.
pub fn header(version: &str) {
    let config = current();
    if config.json {
        emit_json_line("header", json!({ "app": "hatchery", "version": version }));
        return;
    }
    if suppressed(config) {
        return;
    }

    let name = styled("hatchery", |s| s.bold().to_string());
    let version = styled(version, |s| s.dimmed().to_string());
    println!("{name} {version}");
    println!();
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let config = current();
    let value = value.to_string();
    if config.json {
        emit_json_line("field", json!({ "label": label, "value": value }));
        return;
    }
    if suppressed(config) {
        return;
    }

    let label = styled(&format!("{label:<12}"), |s| s.dimmed().to_string());
    println!("  {label} {value}");
}

pub fn section(title: &str) {
    let config = current();
    if config.json {
        emit_json_line("section", json!({ "title": title }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!();
    println!("{}", styled(title, |s| s.bold().to_string()));
}

pub fn success(message: &str) {
    let config = current();
    if config.json {
        emit_json_line("success", json!({ "message": message }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!("  {} {message}", styled("✓", |s| s.green().to_string()));
}

/// Print a warning. Shown in quiet mode too.
pub fn warning(message: &str) {
    if current().json {
        emit_json_line("warning", json!({ "message": message }));
        return;
    }
    println!("  {} {message}", styled("⚠", |s| s.yellow().to_string()));
}

/// Print an error to stderr.
pub fn error(message: &str) {
    if current().json {
        eprintln!("{}", json!({ "type": "error", "payload": { "message": message } }));
        return;
    }
    eprintln!("  {} {message}", styled("×", |s| s.red().to_string()));
}

pub fn hint(message: &str) {
    let config = current();
    if config.json {
        emit_json_line("hint", json!({ "message": message }));
        return;
    }
    if suppressed(config) {
        return;
    }

    let prefix = styled("hint", |s| s.cyan().to_string());
    println!("  {prefix}: {}", styled(message, |s| s.dimmed().to_string()));
}

/// Print pre-rendered multi-line content (tables), indented.
pub fn lines(content: &str) {
    let config = current();
    if config.json {
        emit_json_line("lines", json!({ "content": content }));
        return;
    }
    if suppressed(config) {
        return;
    }

    for line in content.lines() {
        println!("  {line}");
    }
}

/// Emit a serializable record. Only produces output in JSON mode.
pub fn record<T: Serialize>(kind: &str, value: &T) {
    if !current().json {
        return;
    }
    match serde_json::to_value(value) {
        Ok(payload) => emit_json_line(kind, payload),
        Err(e) => error(&format!("could not encode {kind}: {e}")),
    }
}
