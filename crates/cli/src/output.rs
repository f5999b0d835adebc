//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use thyme_runner::report::{NodeReport, NodeStatus};
use thyme_runner::RunSummary;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// One line of the results listing
#[derive(Debug, Clone, Serialize)]
pub struct ResultRow {
    pub test: String,
    pub status: NodeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultRow {
    /// Flatten report trees into rows for their leaves.
    pub fn leaves(reports: &[NodeReport]) -> Vec<Self> {
        let mut rows = Vec::new();
        for report in reports {
            collect_leaves(report, &mut rows);
        }
        rows
    }
}

fn collect_leaves(report: &NodeReport, rows: &mut Vec<ResultRow>) {
    if report.children.is_empty() {
        rows.push(ResultRow {
            test: report.full_key.clone(),
            status: report.status,
            error: report.error.clone(),
        });
    }
    for child in &report.children {
        collect_leaves(child, rows);
    }
}

impl TableDisplay for ResultRow {
    fn headers() -> Vec<&'static str> {
        vec!["Test", "Status", "Error"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.test.clone(),
            status_label(self.status),
            self.error.clone().unwrap_or_default(),
        ]
    }
}

fn status_label(status: NodeStatus) -> String {
    match status {
        NodeStatus::Passed => "passed".to_string(),
        NodeStatus::Failed => "failed".to_string(),
        NodeStatus::Skipped => "skipped".to_string(),
        NodeStatus::Incomplete => "incomplete".to_string(),
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if items.is_empty() {
        println!("No tests found.");
        return;
    }

    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }

            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(items).unwrap_or_default());
        }
        OutputFormat::Plain => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                let row = item.row();
                for (header, value) in T::headers().iter().zip(row.iter()) {
                    println!("{}: {}", header, value);
                }
            }
        }
    }
}

/// Print the run summary line
pub fn print_summary(summary: &RunSummary) {
    let line = format!(
        "{} passed, {} failed, {} incomplete ({} total)",
        summary.passed,
        summary.failed,
        summary.incomplete(),
        summary.total
    );
    if summary.has_failures() {
        print_error(&line);
    } else {
        print_success(&line);
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}
