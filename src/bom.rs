//! Bill-of-materials conversion
//!
//! Reads the semicolon separated BOM exported by KiCad and emits the
//! `Comment,Designator,Footprint,JLCPCB Part #` table JLCPCB expects.

use crate::{
    designator::{self, DesignatorKey},
    error::{Result, ResultExt},
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};
use tracing::{debug, info};

/// Header of the JLCPCB BOM table
pub const BOM_HEADER: [&str; 4] = ["Comment", "Designator", "Footprint", "JLCPCB Part #"];

/// One row of the JLCPCB BOM: a group of parts sharing a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentRecord {
    #[serde(rename = "Comment")]
    pub comment: String,

    /// Comma separated, naturally ordered designators
    #[serde(rename = "Designator")]
    pub designators: String,

    #[serde(rename = "Footprint")]
    pub footprint: String,

    /// LCSC part number, empty until annotated
    #[serde(rename = "JLCPCB Part #", default)]
    pub part: String,
}

impl ComponentRecord {
    /// The first designator of the group
    pub fn primary_designator(&self) -> &str {
        self.designators.split(',').next().unwrap_or("").trim()
    }

    /// Sort key derived from the first designator
    pub fn sort_key(&self) -> DesignatorKey {
        DesignatorKey::parse(self.primary_designator())
    }

    pub fn has_part(&self) -> bool {
        !self.part.is_empty()
    }
}

/// A row of the KiCad BOM export, other columns are ignored
#[derive(Debug, Deserialize)]
struct KicadBomRow {
    #[serde(rename = "Designation", default)]
    designation: String,

    #[serde(rename = "Designator", default)]
    designator: String,

    #[serde(rename = "Footprint", default)]
    footprint: String,
}

impl KicadBomRow {
    fn into_record(self) -> Option<ComponentRecord> {
        let designators = strip_quotes(&self.designator);
        if designators.trim().is_empty() {
            return None;
        }

        Some(ComponentRecord {
            comment: strip_quotes(&self.designation).to_string(),
            designators: designator::normalize_list(designators),
            footprint: strip_quotes(&self.footprint).to_string(),
            part: String::new(),
        })
    }
}

fn strip_quotes(field: &str) -> &str {
    field.trim_matches('"')
}

/// Parse a KiCad BOM from any reader
pub fn parse_kicad_bom<R: Read>(reader: R) -> Result<Vec<ComponentRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in reader.deserialize::<KicadBomRow>() {
        let row = row?;
        match row.into_record() {
            Some(record) => records.push(record),
            None => skipped += 1,
        }
    }

    debug!(
        "Parsed {} BOM rows, skipped {} without designators",
        records.len(),
        skipped
    );
    Ok(records)
}

/// Read and convert a KiCad BOM file
pub fn read_kicad_bom(path: &Path) -> Result<Vec<ComponentRecord>> {
    let file = File::open(path).with_path_context("open BOM", path)?;
    parse_kicad_bom(file).with_path_context("parse BOM", path)
}

/// Read a BOM previously written in JLCPCB format
pub fn read_jlc_bom(path: &Path) -> Result<Vec<ComponentRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_path_context("open BOM", path)?;

    let records = reader
        .deserialize::<ComponentRecord>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_path_context("parse BOM", path)?;

    info!("Loaded {} BOM rows from {}", records.len(), path.display());
    Ok(records)
}

/// Write records as a JLCPCB BOM table
pub fn write_jlc_bom<W: Write>(writer: W, records: &[ComponentRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    // Written explicitly so an empty table still carries its header
    writer.write_record(BOM_HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a JLCPCB BOM file
pub fn write_jlc_bom_file(path: &Path, records: &[ComponentRecord]) -> Result<()> {
    let file = File::create(path).with_path_context("create BOM", path)?;
    write_jlc_bom(file, records).with_path_context("write BOM", path)?;
    debug!("Written BOM: {}", path.display());
    Ok(())
}
