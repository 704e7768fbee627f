mod cli;
mod config;
mod executor;
mod handlers;
mod logger;
mod stats;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::{load_config, DuplicaciConfig};
use executor::{Executor, ExecutorOptions};
use handlers::{backup, check, compose, exec, parse, prune};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let load = || -> Result<(DuplicaciConfig, Executor)> {
        let config = load_config(&cli.config)?;
        let executor = Executor::new(ExecutorOptions {
            context: config.execution_context(),
            dry_run: cli.dry_run,
            verbose: cli.verbose,
            shell: config.shell(),
        });
        Ok((config, executor))
    };

    match &cli.command {
        // parsing a saved report needs no config
        Commands::Parse { file } => parse::handle_parse(file),
        Commands::Exec { storage, args } => {
            let (_, executor) = load()?;
            exec::handle_exec(&executor, storage, args)
        }
        Commands::Compose { storage, args } => {
            let (_, executor) = load()?;
            compose::handle_compose(&executor, storage, args)
        }
        Commands::Backup { storages, options } => {
            let (config, executor) = load()?;
            backup::handle_backup(&config, &executor, storages, options.as_deref())
        }
        Commands::Prune { storages, options } => {
            let (config, executor) = load()?;
            prune::handle_prune(&config, &executor, storages, options.as_deref())
        }
        Commands::Check { storages, no_stats } => {
            let (config, executor) = load()?;
            check::handle_check(&config, &executor, storages, *no_stats)
        }
    }
}
