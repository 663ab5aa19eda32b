//! Terminal output for the CLI: colored status lines, a polling spinner and
//! report tables.

use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::Value;
use std::io::IsTerminal;
use std::time::Duration;

use crate::error::field_message;
use crate::models::{Report, ReportStatus};

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Icon for a report status.
pub fn status_icon(status: &ReportStatus) -> &'static str {
    match status {
        ReportStatus::Queued => "○",
        ReportStatus::Processing => "◐",
        ReportStatus::Completed => "✓",
        ReportStatus::Failed => "✗",
        ReportStatus::Cancelled => "⊘",
        ReportStatus::Unknown => "?",
    }
}

/// Status word with icon, colored for terminals.
pub fn styled_status(status: &ReportStatus) -> String {
    let text = format!("{} {}", status_icon(status), status);
    match status {
        ReportStatus::Completed => text.green().bold().to_string(),
        ReportStatus::Failed => text.red().bold().to_string(),
        ReportStatus::Cancelled => text.yellow().to_string(),
        ReportStatus::Queued => text.dimmed().to_string(),
        ReportStatus::Processing => text.cyan().to_string(),
        ReportStatus::Unknown => text,
    }
}

/// Print a success line to stderr.
pub fn print_success(msg: &str) {
    eprintln!("{} {}", "✓".green().bold(), msg);
}

/// Print an error line to stderr.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Print a hint line to stderr.
pub fn print_hint(msg: &str) {
    eprintln!("{} {}", "ℹ".cyan().bold(), msg.dimmed());
}

/// Short human summary of a single report body.
pub fn print_report_summary(report: &Value) {
    let status = ReportStatus::of(report);
    let id = report
        .get("report_id")
        .and_then(Value::as_str)
        .unwrap_or("?");

    println!("{} {}", "Report".bold(), id.cyan().bold());
    println!("  Status: {}", styled_status(&status));
    for (label, key) in [
        ("Product", "product"),
        ("Token", "token"),
        ("PDF", "download_url"),
        ("PPTX", "pptx_download_url"),
        ("JSON", "intelligence_download_url"),
        ("Error", "error"),
    ] {
        if let Some(value) = field_message(report, &[key]) {
            println!("  {:<8}{}", format!("{}:", label), value);
        }
    }
}

/// Table of reports for `list` output.
pub fn report_table(reports: &[Report]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Report ID", "Product", "Status", "PDF"]);

    for report in reports {
        let status_cell = Cell::new(format!("{} {}", status_icon(&report.status), report.status));
        let status_cell = match report.status {
            ReportStatus::Completed => status_cell.fg(Color::Green),
            ReportStatus::Failed => status_cell.fg(Color::Red),
            ReportStatus::Cancelled => status_cell.fg(Color::Yellow),
            _ => status_cell,
        };

        table.add_row(vec![
            Cell::new(&report.report_id).add_attribute(Attribute::Bold),
            Cell::new(report.product.as_deref().unwrap_or("-")),
            status_cell,
            Cell::new(
                report
                    .download_url
                    .as_deref()
                    .map(|url| truncate_with_ellipsis(url, 48))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }
    table
}

/// Truncate text to at most `max_chars` characters.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars <= 3 {
        return "...".to_string();
    }
    let truncated: String = text.chars().take(max_chars - 3).collect();
    format!("{}...", truncated)
}

/// Spinner shown while waiting on a report.
pub struct Spinner {
    pb: indicatif::ProgressBar,
}

impl Spinner {
    /// Create a new spinner with the given message.
    pub fn new(msg: &str) -> Self {
        let pb = indicatif::ProgressBar::new_spinner();
        pb.set_style(spinner_style("{spinner:.cyan} {msg}").tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "));
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Finish with success message.
    pub fn finish_with_success(&self, msg: &str) {
        self.pb
            .set_style(spinner_style("{spinner:.green} {msg}").tick_chars("✓✓"));
        self.pb.finish_with_message(msg.to_string());
    }

    /// Finish with error message.
    pub fn finish_with_error(&self, msg: &str) {
        self.pb
            .set_style(spinner_style("{spinner:.red} {msg}").tick_chars("✗✗"));
        self.pb.finish_with_message(msg.to_string());
    }
}

fn spinner_style(template: &str) -> indicatif::ProgressStyle {
    indicatif::ProgressStyle::with_template(template)
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_spinner())
}
