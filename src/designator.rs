//! Natural ordering of reference designators
//!
//! Designators such as `R10` or `TP3` are split into an alphabetic prefix and
//! a numeric index so that `R2` sorts before `R10`, the way schematics number
//! their parts.

use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;

lazy_static! {
    static ref PREFIX: Regex = Regex::new(r"^([A-Za-z]+)").expect("valid prefix regex");
    static ref INDEX: Regex = Regex::new(r"([0-9]+)").expect("valid index regex");
}

/// Sort key of a single designator
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DesignatorKey {
    pub prefix: String,
    pub index: u64,
}

impl DesignatorKey {
    /// Decompose a designator into its prefix and index.
    ///
    /// The prefix is the leading run of letters and the index is the first run
    /// of digits anywhere in the string. Missing parts fall back to an empty
    /// prefix and index 0.
    pub fn parse(designator: &str) -> Self {
        let designator = designator.trim_matches('"');

        let prefix = PREFIX
            .captures(designator)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        // Indices too large for u64 saturate instead of failing
        let index = INDEX
            .captures(designator)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().parse::<u64>().unwrap_or(u64::MAX))
            .unwrap_or(0);

        Self { prefix, index }
    }
}

/// Compare two designators by prefix text, then by numeric index
pub fn compare(a: &str, b: &str) -> Ordering {
    DesignatorKey::parse(a).cmp(&DesignatorKey::parse(b))
}

/// Stable natural sort of designator strings
pub fn sort_designators<S: AsRef<str>>(designators: &mut [S]) {
    designators.sort_by_cached_key(|d| DesignatorKey::parse(d.as_ref()));
}

/// Split a comma separated designator list, order it and join it back
pub fn normalize_list(field: &str) -> String {
    let mut parts: Vec<&str> = field
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
    sort_designators(&mut parts);
    parts.join(",")
}
