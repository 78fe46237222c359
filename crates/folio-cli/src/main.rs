// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Folio: batch PDF editor.
//
// Entry point. Initialises logging, merges the config file with command-line
// flags, runs the batch and prints per-file status plus a summary.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use folio_core::error::Result;
use folio_core::{BatchConfig, BookmarkLevel, RunSummary};
use folio_document::batch::relative_to;
use folio_document::{BatchEvent, BatchRunner};

const RULE_WIDTH: usize = 50;

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version)]
#[command(
    about = "Batch-edit PDFs: fast web view, bookmarks panel, metadata and tag removal, outline collapsing",
    long_about = None
)]
struct Cli {
    /// Folder searched recursively for PDF files
    #[arg(value_name = "FOLDER")]
    folder: PathBuf,

    /// Bookmark levels left expanded (0 = all, 1 = top level only)
    #[arg(short = 'b', long = "bookmark-levels", value_name = "N", allow_negative_numbers = true)]
    bookmark_levels: Option<i64>,

    /// JSON settings file; command-line flags take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Save without fast web view (no qpdf needed)
    #[arg(long)]
    no_linearize: bool,

    /// Skip the before/after CSV report
    #[arg(long)]
    no_report: bool,

    /// Print the run summary as JSON instead of status lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied.
    fn batch_config(&self) -> Result<BatchConfig> {
        let mut config = match &self.config {
            Some(path) => BatchConfig::load(path)?,
            None => BatchConfig::default(),
        };
        if let Some(level) = self.bookmark_levels {
            config.bookmark_level = BookmarkLevel::new(level)?;
        }
        if self.no_linearize {
            config.linearize = false;
        }
        if self.no_report {
            config.write_report = false;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}: {}", "Error".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

/// Run the batch. Per-file failures are part of the summary; only invalid
/// settings or an unusable root folder are errors.
fn run(cli: &Cli) -> Result<RunSummary> {
    let config = cli.batch_config()?;
    tracing::info!(?config, folder = %cli.folder.display(), "Folio starting");

    let runner = BatchRunner::new(config)?;
    let root = cli.folder.as_path();

    if !cli.json {
        print_banner(runner.config());
    }

    let summary = runner.run(root, |event| {
        if !cli.json {
            print_event(root, &event);
        }
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(root, &summary);
    }
    Ok(summary)
}

fn print_banner(config: &BatchConfig) {
    println!(
        "{} {}",
        "Bookmark visibility:".bold(),
        config.bookmark_level.describe()
    );
    if config.linearize {
        println!(
            "{} enabled ({})",
            "Fast web view:".bold(),
            config.qpdf_path.display()
        );
    } else {
        println!("{} disabled", "Fast web view:".bold());
    }
}

fn print_event(root: &Path, event: &BatchEvent<'_>) {
    match event {
        BatchEvent::Discovered { total: 0 } => {
            println!("No PDF files found in {}", root.display());
        }
        BatchEvent::Discovered { total } => {
            println!("Found {total} PDF file(s)\n");
        }
        BatchEvent::Started { source, .. } => {
            println!("Processing: {}", relative_to(root, source).display());
        }
        BatchEvent::Finished(result) if result.is_success() => {
            println!(
                "  {} Saved to: {}",
                "✓".green(),
                relative_to(root, &result.destination).display()
            );
        }
        BatchEvent::Finished(result) => {
            println!(
                "  {} Failed: {}",
                "✗".red(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}

fn print_summary(root: &Path, summary: &RunSummary) {
    if summary.total() == 0 {
        return;
    }

    if let Some(report) = summary.report_path() {
        println!(
            "\n{} {}",
            "Comparison report:".bold(),
            relative_to(root, report).display()
        );
    }

    let rule = "=".repeat(RULE_WIDTH);
    println!("\n{rule}");
    println!("{}", "Processing Summary".bold());
    println!("{rule}");
    println!("Successful: {}", summary.succeeded().to_string().green());
    if summary.failed() > 0 {
        println!("Failed: {}", summary.failed().to_string().red());
    } else {
        println!("Failed: 0");
    }
    println!("Total: {}", summary.total());

    if summary.failed() > 0 {
        println!("\n{}", "Failed files:".red().bold());
        for (path, reason) in summary.failures() {
            println!("  - {}: {}", relative_to(root, path).display(), reason);
        }
    }
}
