//! Recovers statistics from `duplicacy check -tabular` output.
//!
//! The report mixes log lines with one table per snapshot id. Three line
//! shapes matter and are matched independently:
//!
//! ```text
//! ... INFO SNAPSHOT_CHECK Total chunk size is 4,617M in 975 chunks
//!  unraid_appdata_backup |   1 | @ 2025-10-13 20:34 -hash |    28 | 3,384M |    195 | 991,477K | ...
//!  unraid_appdata_backup | all |                          |       |        |    883 |   4,608M | ...
//! ```

use log::{debug, warn};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;
use super::lexer::{parse_number, parse_size, LexError};
use super::{DayStatistics, EntityStatistics, STATUS_CHECKED};

static TOTAL_CHUNKS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Total chunk size is ([\d,]+[KMGT]?) in ([\d,]+) chunks").expect("total chunks pattern")
});

// snap | rev | date | files | bytes | chunks | bytes | uniq | bytes | new | bytes
static ALL_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\S+)\s*\|\s*all\s*\|[^|]*\|[^|]*\|[^|]*\|([^|]*)\|([^|]*)\|([^|]*)\|([^|]*)\|")
        .expect("all row pattern")
});

static REVISION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\S+)\s*\|\s*(\d+)\s*\|\s*@").expect("revision pattern"));

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("no repository statistics found in check output")]
    NoStatistics,

    #[error("line {line}: {source}")]
    InvalidNumber {
        line: usize,
        #[source]
        source: LexError,
    },
}

pub fn parse_check_output(output: &str) -> Result<DayStatistics, ParseError> {
    let mut stats = DayStatistics {
        status: STATUS_CHECKED.to_string(),
        ..Default::default()
    };
    let mut revision_counts: HashMap<&str, u32> = HashMap::new();

    for (idx, line) in output.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(caps) = TOTAL_CHUNKS_RE.captures(line) {
            stats.total_size = size_or_zero(&caps[1]);
            stats.total_chunks = count_field(&caps[2], line_no)?;
            continue;
        }

        if let Some(caps) = REVISION_RE.captures(line) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            *revision_counts.entry(name).or_insert(0) += 1;
            continue;
        }

        if let Some(caps) = ALL_ROW_RE.captures(line) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            let total_chunks = count_field(&caps[2], line_no)?;
            let total_size = size_or_zero(&caps[3]);
            // unique chunk count is validated but not stored
            count_field(&caps[4], line_no)?;
            let unique_size = size_or_zero(&caps[5]);

            stats.repositories.insert(
                name.to_string(),
                EntityStatistics { revisions: 0, total_size, unique_size, total_chunks },
            );
        }
    }

    if stats.repositories.is_empty() {
        return Err(ParseError::NoStatistics);
    }

    // revision lines may sit anywhere relative to their "all" row
    for (name, entry) in stats.repositories.iter_mut() {
        entry.revisions = revision_counts.get(name.as_str()).copied().unwrap_or(0);
        debug!("{}: {:?}", name, entry);
    }

    Ok(stats)
}

fn size_or_zero(token: &str) -> u64 {
    parse_size(token).unwrap_or_else(|e| {
        warn!("{}, using 0", e);
        0
    })
}

/// Counts tolerate garbage as zero, but a unit suffix on a count is an error.
fn count_field(token: &str, line: usize) -> Result<u64, ParseError> {
    match parse_number(token) {
        Ok(n) => Ok(n),
        Err(source @ LexError::UnexpectedSuffix { .. }) => Err(ParseError::InvalidNumber { line, source }),
        Err(e) => {
            warn!("line {}: {}, using 0", line, e);
            Ok(0)
        }
    }
}
