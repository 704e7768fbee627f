pub mod context;
pub mod compose;
pub mod locator;
pub mod process;
pub mod error;

use colored::*;
use log::debug;
use self::compose::Composer;
use self::context::ExecutionContext;
use self::error::ExecError;
use self::locator::BinaryLocator;
use self::process::{ProcessRunner, DEFAULT_SHELL};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone)]
pub struct ExecutorOptions {
    pub context: ExecutionContext,
    pub dry_run: bool,
    pub verbose: bool,
    pub shell: String,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            context: ExecutionContext::default(),
            dry_run: false,
            verbose: false,
            shell: DEFAULT_SHELL.to_string(),
        }
    }
}

/// Locates duplicacy, composes the wrapped command and runs it.
pub struct Executor {
    context: ExecutionContext,
    verbose: bool,
    locator: BinaryLocator,
    runner: ProcessRunner,
}

impl Executor {
    pub fn new(opts: ExecutorOptions) -> Self {
        Self {
            runner: ProcessRunner::new(&opts.shell, opts.dry_run),
            context: opts.context,
            verbose: opts.verbose,
            locator: BinaryLocator::new(),
        }
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn runner(&self) -> &ProcessRunner {
        &self.runner
    }

    pub fn is_dry_run(&self) -> bool {
        self.runner.is_dry_run()
    }

    /// Resolved binary path, discovered on first use.
    pub fn binary(&self) -> Result<String, ExecError> {
        Ok(self.locator.resolve(&self.context, &self.runner)?)
    }

    /// An empty `storage` exports only the generic password.
    pub fn run_for_storage(&self, storage: &str, args: &[String]) -> Result<(), ExecError> {
        let cmd_str = self.prepare(storage, args)?;
        self.runner.stream(&cmd_str)
    }

    pub fn capture_for_storage(&self, storage: &str, args: &[String]) -> Result<String, ExecError> {
        let cmd_str = self.prepare(storage, args)?;
        self.runner.capture(&cmd_str)
    }

    /// Composed command with secrets masked, for display only. Never runs
    /// discovery, so the binary is whatever is already known.
    pub fn compose_for_storage(&self, storage: &str, args: &[String]) -> String {
        let binary = self.locator.peek(&self.context);
        Composer::new(&self.context.redacted()).compose(&binary, args, storage)
    }

    fn prepare(&self, storage: &str, args: &[String]) -> Result<String, ExecError> {
        let binary = self.binary()?;
        let cmd_str = Composer::new(&self.context).compose(&binary, args, storage);

        if self.is_dry_run() {
            let shown = Composer::new(&self.context.redacted()).compose(&binary, args, storage);
            println!("{} [DRY-RUN] Executing: {}", "::".yellow(), shown);
        } else if self.verbose {
            let shown = Composer::new(&self.context.redacted()).compose(&binary, args, storage);
            println!("{} Executing: {}", "::".blue(), shown);
        } else {
            debug!("composed command for storage '{}'", storage);
        }

        Ok(cmd_str)
    }
}
