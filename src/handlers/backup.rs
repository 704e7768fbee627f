use anyhow::Result;
use crate::config::DuplicaciConfig;
use crate::executor::Executor;
use super::run_per_storage;

pub fn handle_backup(config: &DuplicaciConfig, executor: &Executor, storages: &[String], options: Option<&str>) -> Result<()> {
    let extra = config.backup_options(options)?;

    run_per_storage(executor, storages, "Backup", |storage| {
        let mut args = vec!["backup".to_string(), "-storage".to_string(), storage.to_string()];
        args.extend(extra.iter().cloned());
        Ok(args)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{executor, storages};

    #[test]
    fn test_backup_every_storage() {
        let config = DuplicaciConfig::from_toml("[backup]\noptions = \"-threads 4\"").unwrap();
        assert!(handle_backup(&config, &executor("true", false), &storages(&["a", "b"]), None).is_ok());
    }

    #[test]
    fn test_backup_keeps_going_after_failure() {
        let config = DuplicaciConfig::from_toml("").unwrap();
        // only the backup to "b" fails
        let exec = executor("f() { test \"$3\" != b; }; f", false);
        let err = handle_backup(&config, &exec, &storages(&["a", "b", "c"]), None).unwrap_err();
        assert_eq!(err.to_string(), "Backup failed for: b");
    }

    #[test]
    fn test_bad_options_fail_before_running() {
        let config = DuplicaciConfig::from_toml("").unwrap();
        let err = handle_backup(&config, &executor("true", false), &storages(&["a"]), Some("-x 'unterminated"));
        assert!(err.is_err());
    }
}
