use anyhow::{Result, bail};
use colored::*;
use log::{error, info, warn};
use crate::config::DuplicaciConfig;
use crate::executor::error::ExecError;
use crate::executor::Executor;
use crate::stats::parser::ParseError;
use crate::stats::writer::StatsWriter;
use crate::stats::{format_bytes, parse_check_output, DayStatistics};

pub fn handle_check(config: &DuplicaciConfig, executor: &Executor, storages: &[String], no_stats: bool) -> Result<()> {
    let extra = config.check_options()?;
    let persist = config.stats.enabled && !no_stats;
    let stats_path = config.stats_path();
    let writer = StatsWriter::new(executor.context(), executor.runner()).with_stats_path(&stats_path);

    let mut failed = Vec::new();

    for storage in storages {
        info!("{} Checking storage: {}", "🔍".cyan(), storage.bold());

        let mut args = vec!["check".to_string(), "-tabular".to_string(), "-storage".to_string(), storage.clone()];
        args.extend(extra.iter().cloned());

        let captured = executor.capture_for_storage(storage, &args);
        let report = captured_report(&captured);
        if !report.is_empty() {
            print!("{}", report);
        }

        if let Err(e) = &captured {
            error!("{} Check failed for {}: {}", "❌".red(), storage, e);
            failed.push(storage.clone());
            continue;
        }

        let day = match statistics_from(report, executor.is_dry_run()) {
            None => continue,
            Some(Ok(day)) => day,
            Some(Err(e)) => {
                warn!("{} Could not parse check output for {}: {}", "⚠️".yellow(), storage, e);
                continue;
            }
        };

        print_summary(&day);

        if persist {
            match writer.update_storage_stats(storage, &day) {
                Ok(()) => info!("{} Stats updated: {}", "✅".green(), writer.stats_file(storage)),
                Err(e) => warn!("{} Failed to update stats for {}: {:#}", "⚠️".yellow(), storage, e),
            }
        }
    }

    if !failed.is_empty() {
        bail!("Check failed for: {}", failed.join(", "));
    }
    Ok(())
}

/// What duplicacy printed, whether or not it succeeded.
fn captured_report(captured: &Result<String, ExecError>) -> &str {
    match captured {
        Ok(out) => out,
        Err(e) => e.stdout(),
    }
}

/// None only for the empty output of a dry run.
fn statistics_from(report: &str, dry_run: bool) -> Option<Result<DayStatistics, ParseError>> {
    if dry_run && report.trim().is_empty() {
        return None;
    }
    Some(parse_check_output(report))
}

pub fn print_summary(day: &DayStatistics) {
    println!("   Total size:  {}", format_bytes(day.total_size).bold());
    println!("   Chunks:      {}", day.total_chunks);
    println!("   Repositories:");
    for (name, repo) in &day.repositories {
        println!(
            "     - {}: {} revisions, {} ({} unique)",
            name.cyan(),
            repo.revisions,
            format_bytes(repo.total_size),
            format_bytes(repo.unique_size)
        );
    }
}
