//! Exclusion of parts JLCPCB should not place
//!
//! Test points, mounting holes and net labels show up in the BOM but are not
//! assembled. The exclusion set is plain data so other vendors' conventions
//! can be loaded from a file.

use crate::{
    bom::ComponentRecord,
    error::{Result, ResultExt},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::debug;

const DEFAULT_PREFIXES: &[&str] = &["TP", "H", "MH"];

const DEFAULT_COMMENTS: &[&str] = &[
    "+15V USB-PD",
    "GND",
    "+13.5V",
    "+7.5V",
    "-13.5V",
    "+5V",
    "+12V",
    "-12V",
];

/// Designator prefixes and comment labels to drop from a BOM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSet {
    /// Dropped when the first designator starts with one of these
    #[serde(default)]
    pub prefixes: Vec<String>,

    /// Dropped when the comment equals one of these exactly
    #[serde(default)]
    pub comments: Vec<String>,
}

impl Default for ExclusionSet {
    fn default() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES.iter().map(|s| s.to_string()).collect(),
            comments: DEFAULT_COMMENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ExclusionSet {
    /// Load an exclusion set from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_path_context("read exclusion", path)?;
        let set = serde_json::from_str(&text).with_path_context("parse exclusion", path)?;
        Ok(set)
    }

    pub fn excludes(&self, record: &ComponentRecord) -> bool {
        let designator = record.primary_designator();

        self.prefixes
            .iter()
            .any(|prefix| designator.starts_with(prefix.as_str()))
            || self.comments.iter().any(|comment| *comment == record.comment)
    }

    /// Keep only the records that should be assembled
    pub fn apply(&self, records: Vec<ComponentRecord>) -> Vec<ComponentRecord> {
        let before = records.len();
        let kept: Vec<ComponentRecord> = records
            .into_iter()
            .filter(|record| !self.excludes(record))
            .collect();

        debug!("Exclusion filter dropped {} rows", before - kept.len());
        kept
    }
}
