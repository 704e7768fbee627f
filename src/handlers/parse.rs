use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use crate::stats::parse_check_output;
use super::check::print_summary;

pub fn handle_parse(file: &Path) -> Result<()> {
    let report = if file == Path::new("-") {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("Failed to read report from stdin")?;
        buf
    } else {
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?
    };

    let day = parse_check_output(&report)?;
    print_summary(&day);
    Ok(())
}
