//! Part number mapping files
//!
//! A mapping is a JSON object from BOM comment text to an LCSC part number.
//! Entries with a `null` value are ignored, which lets a mapping file carry
//! `"# SECTION": null` headings.

use crate::error::{Result, ResultExt, TransBomError};
use rust_embed::RustEmbed;
use serde_json::{Map, Value};
use std::{collections::HashMap, fs, path::Path};
use tracing::{debug, info};

#[derive(RustEmbed)]
#[folder = "Assets/"]
struct Asset;

const TEMPLATE_ASSET: &str = "parts_mapping.json";

/// Comment text to LCSC part number
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartMapping {
    parts: HashMap<String, String>,
}

impl PartMapping {
    /// Parse a mapping from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: HashMap<String, Option<String>> = serde_json::from_str(text)?;
        let parts: HashMap<String, String> = raw
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .collect();

        debug!("Loaded {} part mappings", parts.len());
        Ok(Self { parts })
    }

    /// Load a mapping file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_path_context("read mapping", path)?;
        Self::from_json(&text).with_path_context("parse mapping", path)
    }

    /// Exact, case-sensitive lookup
    pub fn get(&self, comment: &str) -> Option<&str> {
        self.parts.get(comment).map(String::as_str)
    }

    pub fn insert(&mut self, comment: impl Into<String>, part: impl Into<String>) {
        self.parts.insert(comment.into(), part.into());
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Starter mapping with section headings removed, in asset order
pub fn template_entries() -> Result<Map<String, Value>> {
    let asset = Asset::get(TEMPLATE_ASSET).ok_or_else(|| TransBomError::AssetNotFound {
        name: TEMPLATE_ASSET.to_string(),
    })?;

    let entries: Map<String, Value> = serde_json::from_slice(asset.data.as_ref())?;
    Ok(entries
        .into_iter()
        .filter(|(key, _)| !key.starts_with('#'))
        .collect())
}

/// Write the starter mapping and return the number of entries
pub fn write_template(path: &Path) -> Result<usize> {
    let entries = template_entries()?;
    let text = serde_json::to_string_pretty(&entries)?;

    fs::write(path, text).with_path_context("write mapping template", path)?;
    info!("Created parts mapping template: {}", path.display());
    Ok(entries.len())
}
