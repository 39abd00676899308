//! CLI console utilities

use colored::*;
use serde::Serialize;

/// Formatted terminal output, or raw JSON when `--json` is set
pub struct CliConsole {
    json: bool,
}

impl CliConsole {
    pub const fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Print `value` as pretty JSON on stdout
    pub fn emit<T: Serialize + ?Sized>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if !self.json {
            println!("{} {}", "✓".green().bold(), message.green());
        }
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    pub fn hint(&self, message: &str) {
        eprintln!("  {} {}", "hint:".cyan().bold(), message);
    }

    /// Print a header
    pub fn header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.chars().count()).dimmed());
    }

    /// Print an aligned `label: value` line
    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        println!("  {:<14} {}", format!("{}:", label).dimmed(), value);
    }
}
