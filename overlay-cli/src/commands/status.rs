//! `overlay status` — per-document sync and correction visibility.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use overlay_sync::status::{check_dir, format_age, DocumentStatus, FileStatus, StatusReport};

use super::GlobalArgs;

/// Arguments for `overlay status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let config = global.load()?;
        let report = check_dir(&config).context("status check failed")?;

        if self.json {
            print_json(&report)?;
        } else {
            print_table(&report);
        }
        if report.failed() > 0 {
            anyhow::bail!("{} document(s) could not be read", report.failed());
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusReportJson {
    summary: StatusSummaryJson,
    documents: Vec<DocumentStatusJson>,
    orphans: Vec<String>,
}

#[derive(Serialize)]
struct StatusSummaryJson {
    documents: usize,
    needs_sync: usize,
    corrections: usize,
    orphans: usize,
}

#[derive(Serialize)]
struct DocumentStatusJson {
    name: String,
    status: String,
    detail: String,
    overlay_modified: Option<String>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "document")]
    document: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "detail")]
    detail: String,
    #[tabled(rename = "modified")]
    modified: String,
}

fn print_json(report: &StatusReport) -> Result<()> {
    let payload = StatusReportJson {
        summary: StatusSummaryJson {
            documents: report.documents.len(),
            needs_sync: report.needs_sync(),
            corrections: report.corrections(),
            orphans: report.orphans.len(),
        },
        documents: report
            .documents
            .iter()
            .map(|doc| DocumentStatusJson {
                name: doc.name.clone(),
                status: status_key(&doc.status).to_string(),
                detail: status_detail(&doc.status),
                overlay_modified: doc.overlay_modified.map(|t| t.to_rfc3339()),
            })
            .collect(),
        orphans: report.orphans.clone(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(report: &StatusReport) {
    println!(
        "Overlay v{} | {} documents | {} need sync | {} corrections | {} orphans",
        env!("CARGO_PKG_VERSION"),
        report.documents.len(),
        report.needs_sync(),
        report.corrections(),
        report.orphans.len(),
    );

    if report.documents.is_empty() {
        println!("No source documents found.");
        return;
    }

    let separator = "■".repeat(67).bright_black().to_string();
    println!("{separator}");
    println!(
        "Indicators: {} CURRENT  {} CORRECTIONS  {} PENDING  {} MISSING  {} FAILED",
        status_indicator(&FileStatus::Current),
        status_indicator(&FileStatus::Corrections { count: 0 }),
        status_indicator(&FileStatus::Pending {
            additions: 0,
            removals: 0
        }),
        status_indicator(&FileStatus::Missing),
        status_indicator(&FileStatus::Failed {
            error: String::new()
        }),
    );
    println!("{separator}");

    let rows: Vec<StatusTableRow> = report.documents.iter().map(table_row).collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if !report.orphans.is_empty() {
        println!("{separator}");
        println!("{}", "ORPHANS".bold());
        for name in &report.orphans {
            println!("  {} {name}", "■".magenta().bold());
        }
    }
    println!("{separator}");

    if report.needs_sync() > 0 || !report.orphans.is_empty() {
        println!("Run 'overlay sync' to update the overlay.");
    }
}

fn table_row(doc: &DocumentStatus) -> StatusTableRow {
    StatusTableRow {
        document: doc.name.clone(),
        status: format!("{} {}", status_indicator(&doc.status), status_label(&doc.status)),
        detail: status_detail(&doc.status),
        modified: doc
            .overlay_modified
            .map(format_age)
            .unwrap_or_else(|| "never".to_string()),
    }
}

fn status_key(status: &FileStatus) -> &'static str {
    match status {
        FileStatus::Missing => "missing",
        FileStatus::Pending { .. } => "pending",
        FileStatus::Corrections { .. } => "corrections",
        FileStatus::Current => "current",
        FileStatus::Failed { .. } => "failed",
    }
}

fn status_label(status: &FileStatus) -> &'static str {
    match status {
        FileStatus::Missing => "MISSING",
        FileStatus::Pending { .. } => "PENDING",
        FileStatus::Corrections { .. } => "CORRECTIONS",
        FileStatus::Current => "CURRENT",
        FileStatus::Failed { .. } => "FAILED",
    }
}

fn status_indicator(status: &FileStatus) -> String {
    match status {
        FileStatus::Missing => "■".bright_black().bold().to_string(),
        FileStatus::Current => "■".green().bold().to_string(),
        FileStatus::Corrections { .. } => "■".cyan().bold().to_string(),
        FileStatus::Pending { .. } => "■".yellow().bold().to_string(),
        FileStatus::Failed { .. } => "■".red().bold().to_string(),
    }
}

fn status_detail(status: &FileStatus) -> String {
    match status {
        FileStatus::Missing => "no overlay yet".to_string(),
        FileStatus::Pending {
            additions,
            removals,
        } => format!("+{additions} -{removals}"),
        FileStatus::Corrections { count } => format!("{count} to promote"),
        FileStatus::Current => "up to date".to_string(),
        FileStatus::Failed { error } => error.clone(),
    }
}
