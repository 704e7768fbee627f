//! Turns a duplicacy invocation into one shell string.
//!
//! Layering is fixed: base command, `cd`, env exports, container wrap, remote
//! wrap. Each stage takes the command built so far and returns the next one,
//! so every layer only has to quote for the shell directly outside it.

use super::context::{ExecutionContext, RemoteHost, env_name_fragment};

const SSH_FLAGS: &str = "-o StrictHostKeyChecking=no -o LogLevel=ERROR";

pub struct Composer<'a> {
    ctx: &'a ExecutionContext,
}

impl<'a> Composer<'a> {
    pub fn new(ctx: &'a ExecutionContext) -> Self {
        Self { ctx }
    }

    /// Full command for `binary args...`, with credentials looked up for
    /// `entity` (empty for none). Never fails; a bad binary path surfaces when
    /// the command runs.
    pub fn compose(&self, binary: &str, args: &[String], entity: &str) -> String {
        let mut cmd = base_command(binary, args);

        let workdir = self.ctx.working_directory();
        if let Some(dir) = workdir {
            cmd = with_workdir(&cmd, dir);
        }

        let exports = self.exports(entity);
        let has_exports = !exports.is_empty();
        cmd = with_exports(&cmd, &exports);

        if let Some(container) = self.ctx.container() {
            let inner_shell = workdir.is_some() || has_exports;
            cmd = wrap_container(&cmd, &self.ctx.container_runtime, container, inner_shell);
        }

        if let Some(remote) = self.ctx.remote() {
            cmd = wrap_remote(&cmd, remote);
        }

        cmd
    }

    /// Wraps an arbitrary shell script (pipes, redirects, heredocs) so it runs
    /// wherever duplicacy runs. No `cd` or credentials are applied.
    pub fn compose_script(&self, script: &str) -> String {
        let mut cmd = script.to_string();

        if let Some(container) = self.ctx.container() {
            cmd = wrap_container(&cmd, &self.ctx.container_runtime, container, true);
        }

        if let Some(remote) = self.ctx.remote() {
            cmd = wrap_remote(&cmd, remote);
        }

        cmd
    }

    /// Export statements in execution order: token path first, then the
    /// generic password, then the storage-specific one.
    fn exports(&self, entity: &str) -> Vec<String> {
        let mut exports = Vec::new();

        if !entity.is_empty() {
            if let Some(token) = self.ctx.token_path() {
                exports.push(export_var(&format!("DUPLICACY_{}_GCD_TOKEN", env_name_fragment(entity)), token));
            }
        }

        if let Some(secret) = self.ctx.credential_for(entity) {
            exports.push(export_var("DUPLICACY_PASSWORD", secret));
            if !entity.is_empty() {
                exports.push(export_var(&format!("DUPLICACY_{}_PASSWORD", env_name_fragment(entity)), secret));
            }
        }

        exports
    }
}

pub fn base_command(binary: &str, args: &[String]) -> String {
    if args.is_empty() {
        return binary.to_string();
    }
    format!("{} {}", binary, args.join(" "))
}

pub fn with_workdir(cmd: &str, dir: &str) -> String {
    format!("cd {} && {}", dir, cmd)
}

pub fn with_exports(cmd: &str, exports: &[String]) -> String {
    if exports.is_empty() {
        return cmd.to_string();
    }
    format!("{} && {}", exports.join(" && "), cmd)
}

pub fn wrap_container(cmd: &str, runtime: &str, container: &str, inner_shell: bool) -> String {
    if inner_shell {
        format!("{} exec {} sh -c '{}'", runtime, container, escape_single_quoted(cmd))
    } else {
        format!("{} exec {} {}", runtime, container, cmd)
    }
}

pub fn wrap_remote(cmd: &str, remote: &RemoteHost) -> String {
    let ssh = format!("ssh {} {} '{}'", SSH_FLAGS, remote.host, escape_single_quoted(cmd));
    match remote.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => format!("sshpass -p '{}' {}", escape_single_quoted(password), ssh),
        None => ssh,
    }
}

fn export_var(name: &str, value: &str) -> String {
    format!("export {}=\"{}\"", name, escape_double_quoted(value))
}

/// Escapes `\`, `"`, `$` and backtick for use between double quotes.
/// Backslash goes first so later escapes are not doubled.
pub fn escape_double_quoted(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
        .replace('`', "\\`")
}

/// Closes the quote, emits a double-quoted `'`, and reopens.
pub fn escape_single_quoted(s: &str) -> String {
    s.replace('\'', "'\"'\"'")
}
