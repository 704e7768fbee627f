use thiserror::Error;

/// Outcome of a failed binary lookup. Cloneable because the locator replays
/// the same failure to every later caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiscoveryError {
    #[error("duplicacy CLI not found in {dir}")]
    NotFound { dir: String },

    #[error("failed to discover duplicacy path: {0}")]
    Failed(String),
}

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("cannot find duplicacy: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("failed to launch `{shell}`: {source}")]
    Launch {
        shell: String,
        #[source]
        source: std::io::Error,
    },

    /// `stdout` holds whatever a captured command printed before failing;
    /// duplicacy reports most of its errors there.
    #[error("command exited with code {code}{}", format_stderr(.stderr))]
    Exit { code: i32, stdout: String, stderr: String },
}

impl ExecError {
    /// Exit code of the wrapped process, if it ran at all.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecError::Exit { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Captured stdout of a failed command, empty when nothing was captured.
    pub fn stdout(&self) -> &str {
        match self {
            ExecError::Exit { stdout, .. } => stdout,
            _ => "",
        }
    }
}

fn format_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}
