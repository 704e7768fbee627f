pub mod lexer;
pub mod parser;
pub mod writer;

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use parser::parse_check_output;

pub const STATUS_CHECKED: &str = "Checked";

/// One day's snapshot for a storage, in the web UI's stats file layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DayStatistics {
    pub total_size: u64,
    pub total_chunks: u64,
    #[serde(default)]
    pub pruned_chunks: u64,
    #[serde(default)]
    pub pruned_revisions: u64,
    pub status: String,
    #[serde(default)]
    pub repositories: BTreeMap<String, EntityStatistics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EntityStatistics {
    pub revisions: u32,
    pub total_size: u64,
    pub unique_size: u64,
    pub total_chunks: u64,
}

/// `YYYY-MM-DD` -> that day's statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatisticsArchive(BTreeMap<String, DayStatistics>);

impl StatisticsArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the entry for `date`.
    pub fn record(&mut self, date: &str, day: DayStatistics) {
        self.0.insert(date.to_string(), day);
    }

    #[cfg(test)]
    pub fn get(&self, date: &str) -> Option<&DayStatistics> {
        self.0.get(date)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Pretty JSON with four-space indent, as the web UI writes it.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// 1536 -> "1.5 KB".
pub fn format_bytes(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    if bytes < UNIT {
        return format!("{} B", bytes);
    }
    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let unit = "KMGTPE".as_bytes()[exp] as char;
    format!("{:.1} {}B", bytes as f64 / div as f64, unit)
}
