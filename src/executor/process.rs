use log::debug;
use std::process::{Command, Stdio};
use super::error::ExecError;

pub const DEFAULT_SHELL: &str = "bash";

/// Runs composed command strings through `<shell> -c`. One blocking process
/// per call, no timeout.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    shell: String,
    dry_run: bool,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL, false)
    }
}

impl ProcessRunner {
    pub fn new(shell: &str, dry_run: bool) -> Self {
        Self {
            shell: shell.to_string(),
            dry_run,
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Stdout and stderr pass straight through to ours.
    pub fn stream(&self, cmd_str: &str) -> Result<(), ExecError> {
        if self.dry_run {
            debug!("dry-run, not executing: {}", cmd_str);
            return Ok(());
        }

        let status = self
            .command(cmd_str)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| ExecError::Launch { shell: self.shell.clone(), source })?;

        if !status.success() {
            return Err(ExecError::Exit {
                code: status.code().unwrap_or(-1),
                stdout: String::new(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    /// Buffers stdout and returns it. On failure both streams travel in the error.
    pub fn capture(&self, cmd_str: &str) -> Result<String, ExecError> {
        if self.dry_run {
            debug!("dry-run, not executing: {}", cmd_str);
            return Ok(String::new());
        }

        let output = self
            .command(cmd_str)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ExecError::Launch { shell: self.shell.clone(), source })?;

        if !output.status.success() {
            return Err(ExecError::Exit {
                code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn command(&self, cmd_str: &str) -> Command {
        let mut command = Command::new(&self.shell);
        command.arg("-c").arg(cmd_str);
        command
    }
}
