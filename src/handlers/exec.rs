use anyhow::{Result, bail};
use colored::*;
use log::info;
use crate::executor::Executor;

pub fn handle_exec(executor: &Executor, storage: &str, args: &[String]) -> Result<()> {
    info!("{} Running: duplicacy {}", "⚡".yellow(), args.join(" ").bold());

    if let Err(e) = executor.run_for_storage(storage, args) {
        match e.exit_code() {
            Some(code) => bail!("❌ duplicacy exited with code {}", code),
            None => bail!("❌ {}", e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::executor;

    #[test]
    fn test_exec_with_and_without_storage() {
        let args = vec!["list".to_string()];
        assert!(handle_exec(&executor("true", false), "", &args).is_ok());
        assert!(handle_exec(&executor("true", false), "gdrive", &args).is_ok());
    }

    #[test]
    fn test_exec_reports_exit_code() {
        let err = handle_exec(&executor("exit 7;", false), "gdrive", &["list".to_string()]).unwrap_err();
        assert_eq!(err.to_string(), "❌ duplicacy exited with code 7");
    }
}
