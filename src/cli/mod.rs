//! # CLI Module
//!
//! Command-line interface for picsort.
//!
//! ## Usage
//! ```bash
//! # Sort two card dumps into one tree
//! picsort ~/dump1 ~/dump2 --output ~/Pictures/sorted
//!
//! # Single threaded, SHA-256 names
//! picsort ~/dump1 -o ~/sorted -t 0 --digest sha256
//!
//! # Check a sorted tree for bit rot
//! picsort ~/Pictures/sorted --verify
//! ```

use clap::{Parser, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use picsort::core::digest::DigestKind;
use picsort::core::grouping::PrimaryPolicy;
use picsort::core::pipeline::{
    default_workers, output_inside_inputs, Pipeline, SortOutcome, VerifyOutcome,
};
use picsort::core::reporter::{write_failure_report, DEFAULT_REPORT_FILE};
use picsort::error::Result;
use picsort::events::{Event, EventChannel, ExecuteEvent, HashEvent, PipelineEvent, PipelinePhase};
use std::path::PathBuf;
use std::thread;
use tracing::warn;

/// picsort - deduplicate pictures and sort them by camera and date
#[derive(Parser, Debug)]
#[command(name = "picsort")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to read pictures from
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Root of the sorted tree
    #[arg(short, long, required_unless_present = "verify")]
    output: Option<PathBuf>,

    /// Worker threads per phase, 0 = no threading
    #[arg(short, long)]
    threads: Option<usize>,

    /// Verify an already sorted tree instead of sorting
    #[arg(long)]
    verify: bool,

    /// Digest used for dedup and file names
    #[arg(long, value_enum, default_value = "sha1")]
    digest: DigestArg,

    /// Where to write the failure report
    #[arg(long, default_value = DEFAULT_REPORT_FILE)]
    report: PathBuf,

    /// Name each group after the first file hashed instead of the smallest path
    #[arg(long)]
    first_inserted: bool,

    /// Follow symbolic links while scanning
    #[arg(long)]
    follow_symlinks: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DigestArg {
    Sha1,
    Sha256,
}

impl From<DigestArg> for DigestKind {
    fn from(arg: DigestArg) -> Self {
        match arg {
            DigestArg::Sha1 => DigestKind::Sha1,
            DigestArg::Sha256 => DigestKind::Sha256,
        }
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    picsort::init_tracing(cli.verbose);

    let policy = if cli.first_inserted {
        PrimaryPolicy::FirstInserted
    } else {
        PrimaryPolicy::SmallestPath
    };

    let mut builder = Pipeline::builder()
        .inputs(cli.inputs.clone())
        .workers(cli.threads.unwrap_or_else(default_workers))
        .digest(cli.digest.into())
        .primary_policy(policy)
        .follow_symlinks(cli.follow_symlinks);

    if let Some(ref output) = cli.output {
        if !cli.verify && output_inside_inputs(output, &cli.inputs) {
            warn!(
                "output {} is inside an input directory; later runs will rescan it",
                output.display()
            );
        }
        builder = builder.output(output);
    }

    let pipeline = builder.build();
    let term = Term::stderr();

    term.write_line(&format!(
        "{} {}",
        style("picsort").bold().cyan(),
        style(env!("CARGO_PKG_VERSION")).dim()
    ))
    .ok();

    let (sender, receiver) = EventChannel::new();
    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg:>10} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    progress_clone.set_message(phase.to_string());
                    if phase == PipelinePhase::Verifying {
                        progress_clone.finish_and_clear();
                    }
                }
                Event::Hash(HashEvent::Started { total_files }) => {
                    progress_clone.set_length(total_files as u64);
                    progress_clone.set_position(0);
                }
                Event::Hash(HashEvent::Progress(p)) => {
                    progress_clone.set_position(p.completed as u64);
                }
                Event::Execute(ExecuteEvent::Started { total_actions }) => {
                    progress_clone.set_length(total_actions as u64);
                    progress_clone.set_position(0);
                }
                Event::Execute(ExecuteEvent::Progress { completed, .. }) => {
                    progress_clone.set_position(completed as u64);
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) => {
                    progress_clone.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = if cli.verify {
        pipeline.verify_with_events(&sender).map(Outcome::Verify)
    } else {
        pipeline.sort_with_events(&sender).map(Outcome::Sort)
    };

    drop(sender);
    event_thread.join().ok();
    progress.finish_and_clear();

    let records = match result? {
        Outcome::Sort(outcome) => {
            print_sort_summary(&term, &outcome);
            outcome.failures
        }
        Outcome::Verify(outcome) => {
            print_verify_summary(&term, &outcome);
            outcome.report.failure_records()
        }
    };

    write_failure_report(&cli.report, &records)?;
    if !records.is_empty() {
        term.write_line(&format!(
            "  {} failures written to {}",
            style(records.len()).red().bold(),
            cli.report.display()
        ))
        .ok();
    }

    Ok(())
}

enum Outcome {
    Sort(SortOutcome),
    Verify(VerifyOutcome),
}

fn print_sort_summary(term: &Term, outcome: &SortOutcome) {
    term.write_line("").ok();
    term.write_line(&format!("{} Sort Complete", style("✓").green().bold()))
        .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} pictures scanned in {:.1}s",
        style(outcome.total_pictures).cyan(),
        outcome.duration_ms as f64 / 1000.0
    ))
    .ok();
    term.write_line(&format!(
        "  {} unique, {} duplicates skipped",
        style(outcome.groups.len()).cyan(),
        style(outcome.groups.duplicate_count()).dim()
    ))
    .ok();
    term.write_line(&format!(
        "  {} of {} actions completed, {} folders created",
        style(outcome.execution.completed).cyan(),
        outcome.planned_actions,
        outcome.execution.folders_created
    ))
    .ok();
}

fn print_verify_summary(term: &Term, outcome: &VerifyOutcome) {
    let report = &outcome.report;

    term.write_line("").ok();
    if report.is_clean() {
        term.write_line(&format!("{} Verify Complete", style("✓").green().bold()))
            .ok();
    } else {
        term.write_line(&format!("{} Verify Found Problems", style("✗").red().bold()))
            .ok();
    }
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} verified, {} unlabeled",
        style(report.verified.len()).green(),
        style(report.unlabeled.len()).dim()
    ))
    .ok();

    for mismatch in &report.mismatched {
        term.write_line(&format!(
            "    {} {} ({} vs {})",
            style("✗").red(),
            mismatch.path.display(),
            mismatch.expected,
            mismatch.found
        ))
        .ok();
    }
}
