use anyhow::{Context, Result, bail};
use colored::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use crate::executor::context::{ExecutionContext, RemoteHost, DEFAULT_RUNTIME};
use crate::executor::process::DEFAULT_SHELL;
use crate::stats::writer::DEFAULT_STATS_PATH;

pub const DEFAULT_CONFIG: &str = "duplicaci.toml";
pub const DEFAULT_GCD_TOKEN: &str = "/config/gcd-token.json";
pub const DEFAULT_PRUNE_OPTIONS: &str = "-keep 0:180 -keep 7:14 -keep 1:1 -a";

#[derive(Debug, Deserialize, Default)]
pub struct DuplicaciConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub duplicacy: DuplicacyConfig,
    #[serde(default)]
    pub storages: HashMap<String, StorageConfig>,
    #[serde(default)]
    pub backup: OptionsConfig,
    #[serde(default)]
    pub prune: OptionsConfig,
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub stats: StatsConfig,

    /// Variables from the `.env` file next to the config, resolved before
    /// the process environment.
    #[serde(skip)]
    pub env: HashMap<String, String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ConnectionConfig {
    /// ssh target, `user@host`
    pub host: Option<String>,
    pub password_env: Option<String>,
    pub container: Option<String>,
    pub runtime: Option<String>,
    pub gcd_token: Option<String>,
    pub shell: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DuplicacyConfig {
    pub path: Option<String>,
    pub repository: Option<String>,
    pub cache_dir: Option<String>,
    pub password_env: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct StorageConfig {
    pub password_env: Option<String>,
    /// Takes precedence over `[prune] options` for this storage.
    pub retention: Option<RetentionConfig>,
}

/// Extra flags for one duplicacy command, shell-style.
#[derive(Debug, Deserialize, Default)]
pub struct OptionsConfig {
    pub options: Option<String>,
}

/// Snapshot counts to keep. `days`/`weeks` are the older day-boundary form
/// and win when either is set.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct RetentionConfig {
    pub daily: u32,
    pub weekly: u32,
    pub monthly: u32,
    pub days: u32,
    pub weeks: u32,
}

impl RetentionConfig {
    /// `-keep` flags for `duplicacy prune`, always with `-a`.
    pub fn to_prune_options(&self) -> String {
        if self.days > 0 || self.weeks > 0 {
            let days = if self.days == 0 { 14 } else { self.days };
            let weeks = if self.weeks == 0 { 180 } else { self.weeks };
            return format!("-keep 0:{} -keep 7:{} -keep 1:1 -a", weeks, days);
        }

        let daily = if self.daily == 0 { 7 } else { self.daily };
        let weekly = if self.weekly == 0 { 4 } else { self.weekly };
        let daily_end = daily;
        let weekly_end = daily_end + weekly * 7;

        if self.monthly > 0 {
            let monthly_end = weekly_end + self.monthly * 30;
            format!("-keep 0:{} -keep 30:{} -keep 7:{} -keep 1:1 -a", monthly_end, weekly_end, daily_end)
        } else {
            format!("-keep 0:{} -keep 7:{} -keep 1:1 -a", weekly_end, daily_end)
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct CheckConfig {
    /// Extra `duplicacy check` flags, shell-style.
    pub options: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub path: Option<String>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self { enabled: true, path: None }
    }
}

fn default_true() -> bool {
    true
}

impl DuplicaciConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: DuplicaciConfig = toml::from_str(content).context("Failed to parse config")?;
        config.apply_defaults();
        Ok(config)
    }

    fn apply_defaults(&mut self) {
        if self.connection.gcd_token.is_none() {
            self.connection.gcd_token = Some(DEFAULT_GCD_TOKEN.to_string());
        }
    }

    /// `.env` first, then the process environment. Empty values count as unset.
    pub fn secret(&self, var: &str) -> Option<String> {
        self.env
            .get(var)
            .cloned()
            .or_else(|| env::var(var).ok())
            .filter(|v| !v.is_empty())
    }

    pub fn shell(&self) -> String {
        self.connection.shell.clone().unwrap_or_else(|| DEFAULT_SHELL.to_string())
    }

    pub fn stats_path(&self) -> String {
        self.stats.path.clone().unwrap_or_else(|| DEFAULT_STATS_PATH.to_string())
    }

    pub fn check_options(&self) -> Result<Vec<String>> {
        split_options(self.check.options.as_deref(), "[check]")
    }

    /// `--options` from the command line replaces `[backup] options`.
    pub fn backup_options(&self, cli: Option<&str>) -> Result<Vec<String>> {
        split_options(cli.or(self.backup.options.as_deref()), "[backup]")
    }

    /// First of: `--options`, the storage's retention, `[prune] options`,
    /// the stock retention.
    pub fn prune_options(&self, storage: &str, cli: Option<&str>) -> Result<Vec<String>> {
        let retention = self
            .storages
            .get(storage)
            .and_then(|s| s.retention)
            .map(|r| r.to_prune_options());
        let opts = cli
            .map(str::to_string)
            .or(retention)
            .or_else(|| self.prune.options.clone())
            .unwrap_or_else(|| DEFAULT_PRUNE_OPTIONS.to_string());
        split_options(Some(opts.as_str()), "[prune]")
    }

    pub fn execution_context(&self) -> ExecutionContext {
        let remote = self.connection.host.as_ref().filter(|h| !h.is_empty()).map(|host| RemoteHost {
            host: host.clone(),
            password: self.connection.password_env.as_deref().and_then(|v| self.secret(v)),
        });

        let entity_credentials = self
            .storages
            .iter()
            .filter_map(|(name, storage)| {
                let var = storage.password_env.as_deref()?;
                self.secret(var).map(|pw| (name.clone(), pw))
            })
            .collect();

        ExecutionContext {
            binary_path: self.duplicacy.path.clone(),
            repository: self.duplicacy.repository.clone(),
            cache_dir: self.duplicacy.cache_dir.clone(),
            container: self.connection.container.clone(),
            container_runtime: self.connection.runtime.clone().unwrap_or_else(|| DEFAULT_RUNTIME.to_string()),
            remote,
            default_credential: self.duplicacy.password_env.as_deref().and_then(|v| self.secret(v)),
            entity_credentials,
            token_path: self.connection.gcd_token.clone(),
        }
    }
}

fn split_options(opts: Option<&str>, section: &str) -> Result<Vec<String>> {
    match opts {
        Some(opts) => shell_words::split(opts).with_context(|| format!("Failed to parse {} options", section)),
        None => Ok(Vec::new()),
    }
}

pub fn load_config(path: &Path) -> Result<DuplicaciConfig> {
    if !path.exists() {
        bail!("❌ Critical: config file {:?} not found.", path);
    }
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    // 1. Parse TOML (Base Layer)
    let mut config = DuplicaciConfig::from_toml(&content)?;

    // 2. Load .env using dotenvy (Secrets Layer)
    // Determines filename: .env or .env.prod based on DUPLICACI_ENV
    let env_filename = env::var("DUPLICACI_ENV")
        .map(|v| format!(".env.{}", v))
        .unwrap_or_else(|_| ".env".to_string());

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let env_path = dir.join(&env_filename);

    if env_path.exists() {
        eprintln!("{} Loading secrets from: {}", "🌿".green(), env_filename.bold());

        // Kept as a map instead of exported, so secrets only reach the
        // wrapped command through the composed exports.
        for item in dotenvy::from_path_iter(&env_path)? {
            let (key, val) = item?;
            config.env.insert(key, val);
        }
    }

    Ok(config)
}
