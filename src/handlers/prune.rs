use anyhow::Result;
use crate::config::DuplicaciConfig;
use crate::executor::Executor;
use super::run_per_storage;

pub fn handle_prune(config: &DuplicaciConfig, executor: &Executor, storages: &[String], options: Option<&str>) -> Result<()> {
    run_per_storage(executor, storages, "Prune", |storage| {
        let mut args = vec!["prune".to_string(), "-storage".to_string(), storage.to_string()];
        args.extend(config.prune_options(storage, options)?);
        Ok(args)
    })
}
