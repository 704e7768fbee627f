pub mod backup;
pub mod check;
pub mod compose;
pub mod exec;
pub mod parse;
pub mod prune;

use anyhow::{Result, bail};
use colored::*;
use log::{error, info};
use crate::executor::Executor;

/// Streams one duplicacy command per storage. A failing storage is logged
/// and the rest still run; the error lists every storage that failed.
fn run_per_storage<F>(executor: &Executor, storages: &[String], action: &str, build_args: F) -> Result<()>
where
    F: Fn(&str) -> Result<Vec<String>>,
{
    let mut failed = Vec::new();

    for storage in storages {
        info!("{} {} storage: {}", "==>".cyan(), action, storage.bold());
        let args = build_args(storage)?;

        match executor.run_for_storage(storage, &args) {
            Ok(()) => info!("{} {} on {} completed", "✅".green(), action, storage),
            Err(e) => {
                error!("{} {} failed for {}: {}", "❌".red(), action, storage, e);
                failed.push(storage.as_str());
            }
        }
    }

    if !failed.is_empty() {
        bail!("{} failed for: {}", action, failed.join(", "));
    }
    Ok(())
}
