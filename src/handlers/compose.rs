use anyhow::Result;
use crate::executor::Executor;

pub fn handle_compose(executor: &Executor, storage: &str, args: &[String]) -> Result<()> {
    println!("{}", executor.compose_for_storage(storage, args));
    Ok(())
}
