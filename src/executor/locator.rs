use log::{debug, info, warn};
use std::sync::OnceLock;
use super::compose::Composer;
use super::context::ExecutionContext;
use super::error::DiscoveryError;
use super::process::ProcessRunner;

pub const DEFAULT_BINARY: &str = "duplicacy";
/// The web UI downloads the CLI here as `duplicacy_linux_x64_<version>`.
pub const INSTALL_DIR: &str = "/config/bin/";
const DISCOVERY_SCRIPT: &str = "ls /config/bin/duplicacy_linux_x64_* 2>/dev/null | head -1";

/// Finds the duplicacy binary once and replays the outcome, success or
/// failure, for the lifetime of the locator.
#[derive(Debug, Default)]
pub struct BinaryLocator {
    resolved: OnceLock<Result<String, DiscoveryError>>,
}

impl BinaryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, ctx: &ExecutionContext, runner: &ProcessRunner) -> Result<String, DiscoveryError> {
        self.resolved.get_or_init(|| discover(ctx, runner)).clone()
    }

    /// Best guess without running anything: an earlier successful lookup,
    /// the explicit path, or the bare name.
    pub fn peek(&self, ctx: &ExecutionContext) -> String {
        if let Some(Ok(path)) = self.resolved.get() {
            return path.clone();
        }
        ctx.binary_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_BINARY)
            .to_string()
    }
}

fn discover(ctx: &ExecutionContext, runner: &ProcessRunner) -> Result<String, DiscoveryError> {
    // 1. Explicit path wins
    if let Some(path) = ctx.binary_path.as_deref().filter(|p| !p.is_empty()) {
        return Ok(path.to_string());
    }

    // 2. No container: rely on PATH wherever the command ends up running
    if ctx.container().is_none() {
        if ctx.remote().is_none() {
            match which::which(DEFAULT_BINARY) {
                Ok(path) => debug!("{} resolves to {}", DEFAULT_BINARY, path.display()),
                Err(_) => warn!("{} not found in PATH", DEFAULT_BINARY),
            }
        }
        return Ok(DEFAULT_BINARY.to_string());
    }

    // 3. Dry-run never inspects the container
    if runner.is_dry_run() {
        return Ok(DEFAULT_BINARY.to_string());
    }

    // 4. Ask the container
    let search_cmd = Composer::new(ctx).compose_script(DISCOVERY_SCRIPT);
    debug!("Discovering duplicacy: {}", search_cmd);

    let output = runner
        .capture(&search_cmd)
        .map_err(|e| DiscoveryError::Failed(e.to_string()))?;

    let path = output.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    if path.is_empty() {
        return Err(DiscoveryError::NotFound { dir: INSTALL_DIR.to_string() });
    }

    info!("Discovered duplicacy at: {}", path);
    Ok(path.to_string())
}
