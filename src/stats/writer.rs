use anyhow::{Context, Result};
use colored::*;
use log::{debug, warn};
use crate::executor::compose::Composer;
use crate::executor::context::ExecutionContext;
use crate::executor::process::ProcessRunner;
use super::{today, DayStatistics, StatisticsArchive};

pub const DEFAULT_STATS_PATH: &str = "/config/stats/storages";
const HEREDOC_MARKER: &str = "STATSEOF";

/// Keeps `<stats_path>/<storage>.stats` up to date wherever duplicacy runs.
pub struct StatsWriter<'a> {
    context: &'a ExecutionContext,
    runner: &'a ProcessRunner,
    stats_path: String,
}

impl<'a> StatsWriter<'a> {
    pub fn new(context: &'a ExecutionContext, runner: &'a ProcessRunner) -> Self {
        Self {
            context,
            runner,
            stats_path: DEFAULT_STATS_PATH.to_string(),
        }
    }

    pub fn with_stats_path(mut self, path: &str) -> Self {
        self.stats_path = path.trim_end_matches('/').to_string();
        self
    }

    pub fn stats_file(&self, storage: &str) -> String {
        format!("{}/{}.stats", self.stats_path, storage)
    }

    pub fn update_storage_stats(&self, storage: &str, day: &DayStatistics) -> Result<()> {
        self.update_for_date(storage, &today(), day)
    }

    /// Read, record `date`, write back.
    pub fn update_for_date(&self, storage: &str, date: &str, day: &DayStatistics) -> Result<()> {
        let path = self.stats_file(storage);
        let mut archive = self.read(&path)?;
        archive.record(date, day.clone());
        self.write(&path, &archive)
    }

    /// A missing or unreadable file starts a fresh archive.
    pub fn read(&self, path: &str) -> Result<StatisticsArchive> {
        let script = format!("cat {} 2>/dev/null || echo '{{}}'", path);
        let cmd = Composer::new(self.context).compose_script(&script);
        debug!("Reading stats: {}", path);

        let output = self
            .runner
            .capture(&cmd)
            .with_context(|| format!("Failed to read stats file {}", path))?;

        let trimmed = output.trim();
        if trimmed.is_empty() {
            return Ok(StatisticsArchive::new());
        }

        match StatisticsArchive::from_json(trimmed) {
            Ok(archive) => Ok(archive),
            Err(e) => {
                warn!("Ignoring unparsable stats file {}: {}", path, e);
                Ok(StatisticsArchive::new())
            }
        }
    }

    pub fn write(&self, path: &str, archive: &StatisticsArchive) -> Result<()> {
        let data = archive.to_json().context("Failed to serialize stats")?;

        if self.runner.is_dry_run() {
            println!("{} [DRY-RUN] Would write to {}:\n{}", "::".yellow(), path, data);
            return Ok(());
        }

        let script = format!("cat > {} << '{marker}'\n{}\n{marker}", path, data, marker = HEREDOC_MARKER);
        let cmd = Composer::new(self.context).compose_script(&script);
        debug!("Writing stats: {}", path);

        self.runner
            .capture(&cmd)
            .with_context(|| format!("Failed to write stats file {}", path))?;
        Ok(())
    }
}
