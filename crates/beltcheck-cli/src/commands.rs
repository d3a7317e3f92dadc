use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use tracing::warn;

use beltcheck_extract::Scanner;
use beltcheck_types::{ActorId, EventKind, SourceContext};
use beltcheck_verify::{Aggregates, VerificationReport, VerifyConfig};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Stats(args) => cmd_stats(args, &config, &cli.format),
        Command::Sum(args) => cmd_sum(args, &config, &cli.format),
        Command::Lifecycle(args) => cmd_lifecycle(args, &config, &cli.format),
        Command::Verify(args) => cmd_verify(args, &config, &cli.format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<VerifyConfig> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("cannot read config {}", path.display()))?;
            Ok(VerifyConfig::from_toml_str(&text)?)
        }
        None => Ok(VerifyConfig::default()),
    }
}

/// Read one expected log, skipping with a warning when it is unreadable.
fn read_source(path: &Path, skipped: &mut Vec<String>) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!(file = %path.display(), error = %e, "skipping unreadable log");
            eprintln!(
                "{} skipping {}: {}",
                "warning:".yellow().bold(),
                path.display(),
                e
            );
            skipped.push(path.display().to_string());
            None
        }
    }
}

/// Parse each log independently and merge at the aggregator boundary.
///
/// `workers` supplies the per-file worker context positionally; files
/// beyond its length scan anonymously. The declaration check runs once,
/// after the merge, since declarations and uses may live in different
/// files.
fn aggregate_files(
    scanner: &Scanner,
    files: &[PathBuf],
    workers: &[u64],
    config: &VerifyConfig,
) -> anyhow::Result<(Aggregates, Vec<String>)> {
    let mut aggregates = Aggregates::new();
    let mut skipped = Vec::new();

    for (index, path) in files.iter().enumerate() {
        let Some(text) = read_source(path, &mut skipped) else {
            continue;
        };
        let label = path.display().to_string();
        let context = match workers.get(index) {
            Some(&id) => SourceContext::for_worker(id, label),
            None => SourceContext::anonymous(label),
        };
        let mut partial = Aggregates::new();
        for event in scanner.scan(&text, &context) {
            partial.ingest(&event?);
        }
        aggregates.merge(partial);
    }

    aggregates.check_declarations(config)?;
    Ok((aggregates, skipped))
}

fn cmd_stats(args: StatsArgs, config: &VerifyConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let scanner = Scanner::only(&[
        EventKind::WorkerInsert,
        EventKind::TruckStart,
        EventKind::TruckRemoval,
    ]);
    let (mut aggregates, skipped) = aggregate_files(&scanner, &args.files, &[], config)?;
    aggregates.seed_roster(&config.roster);

    let report = VerificationReport::build(&aggregates, skipped)?;
    match format {
        OutputFormat::Json => emit_json(&report),
        OutputFormat::Text => {
            render_tallies(&report);
            render_conservation(&report);
            Ok(())
        }
    }
}

fn cmd_sum(args: SumArgs, config: &VerifyConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let scanner = Scanner::only(&[EventKind::Insert, EventKind::Remove]);
    let (aggregates, skipped) =
        aggregate_files(&scanner, std::slice::from_ref(&args.file), &[], config)?;

    let report = VerificationReport::build(&aggregates, skipped)?;
    match format {
        OutputFormat::Json => emit_json(&report),
        OutputFormat::Text => {
            let insertions = stream_events(&aggregates, true);
            let removals = stream_events(&aggregates, false);
            let sum = aggregates.signed_sum();
            println!(
                "With {insertions} insertions and {removals} removals, total sum is equal to {sum} (should be 0)"
            );
            if sum == 0 {
                println!("{}", "CORRECT".green().bold());
            } else {
                println!("{}", "ERROR".red().bold());
            }
            Ok(())
        }
    }
}

fn cmd_lifecycle(
    args: LifecycleArgs,
    config: &VerifyConfig,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    if args.files.len() != args.workers.len() {
        bail!(
            "each log file needs a matching --worker id ({} file(s), {} id(s))",
            args.files.len(),
            args.workers.len()
        );
    }

    let scanner = Scanner::only(&[EventKind::WorkerStarted, EventKind::WorkerFinished]);
    let (mut aggregates, skipped) =
        aggregate_files(&scanner, &args.files, &args.workers, config)?;
    aggregates.seed_roster(&config.roster);

    let report = VerificationReport::build(&aggregates, skipped)?;
    match format {
        OutputFormat::Json => emit_json(&report),
        OutputFormat::Text => {
            for verdict in report.lifecycle_verdicts() {
                let actor = match verdict.actor {
                    Some(actor) => actor,
                    None => continue,
                };
                if verdict.passed {
                    println!("{} {} {}", "SUCCESS:".green().bold(), actor, verdict.detail);
                } else {
                    println!("{} {} {}", "ERROR:".red().bold(), actor, verdict.detail);
                }
            }
            Ok(())
        }
    }
}

fn cmd_verify(
    args: VerifyArgs,
    config: &VerifyConfig,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let scanner = Scanner::with_builtin_patterns();
    let (mut aggregates, skipped) =
        aggregate_files(&scanner, &args.files, &args.workers, config)?;
    aggregates.seed_roster(&config.roster);

    let report = VerificationReport::build(&aggregates, skipped)?;
    match format {
        OutputFormat::Json => emit_json(&report),
        OutputFormat::Text => {
            render_tallies(&report);
            for verdict in &report.verdicts {
                let tag = if verdict.passed {
                    "✓".green().bold()
                } else {
                    "✗".red().bold()
                };
                match verdict.actor {
                    Some(actor) => {
                        println!("{} {} {}: {}", tag, verdict.invariant, actor, verdict.detail)
                    }
                    None => println!("{} {}: {}", tag, verdict.invariant, verdict.detail),
                }
            }
            render_conservation(&report);
            Ok(())
        }
    }
}

fn emit_json(report: &VerificationReport) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn render_tallies(report: &VerificationReport) {
    for stats in &report.producers {
        if let Some(id) = stats.actor.index() {
            println!(
                "Worker {} put {} bricks on the conveyor, total mass {}",
                id.to_string().yellow(),
                stats.events,
                stats.magnitude.to_string().bold()
            );
        }
    }
    for stats in &report.consumers {
        if let Some(id) = stats.actor.index() {
            println!(
                "Truck {} received {} bricks from the conveyor, total mass {}",
                id.to_string().yellow(),
                stats.events,
                stats.magnitude.to_string().bold()
            );
        }
    }
    for source in &report.skipped_sources {
        println!("{} {} was not read", "skipped:".yellow(), source);
    }
}

fn render_conservation(report: &VerificationReport) {
    match report.conservation() {
        Some(v) if v.passed => println!("{}", "CONSERVATION_OK".green().bold()),
        Some(v) => println!("{} ({})", "CONSERVATION_FAILED".red().bold(), v.detail),
        None => {}
    }
}

fn stream_events(aggregates: &Aggregates, producer: bool) -> u64 {
    let side = if producer {
        aggregates.produced()
    } else {
        aggregates.consumed()
    };
    side.get(&ActorId::Stream).map(|s| s.events).unwrap_or(0)
}
