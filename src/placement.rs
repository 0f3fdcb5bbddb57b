//! Placement (CPL) conversion
//!
//! Parses KiCad `.pos` files and produces the JLCPCB component placement list.
//! JLCPCB mirrors the Y axis relative to KiCad and expects rotations in
//! `[0, 360)`, so both are adjusted on the way through.

use crate::{
    designator::DesignatorKey,
    error::{Result, ResultExt, TransBomError},
};
use anyhow::Context;
use std::{fmt, fs, io::Write, path::Path, str::FromStr};
use tracing::{debug, info};

/// Header of the JLCPCB placement table
pub const CPL_HEADER: [&str; 5] = ["Designator", "Mid X", "Mid Y", "Layer", "Rotation"];

/// Minimum number of whitespace separated fields on a data line
const MIN_FIELDS: usize = 7;

/// Board side a component is mounted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
}

impl FromStr for Side {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top" => Ok(Side::Top),
            "bottom" => Ok(Side::Bottom),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Top => f.write_str("Top"),
            Side::Bottom => f.write_str("Bottom"),
        }
    }
}

/// A component position as found in the source file
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRecord {
    pub designator: String,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub side: Side,
}

impl PlacementRecord {
    /// Build a record from the tokens of one data line.
    ///
    /// Returns `Ok(None)` for lines with too few fields.
    pub fn from_tokens(tokens: &[&str]) -> Result<Option<Self>> {
        if tokens.len() < MIN_FIELDS {
            return Ok(None);
        }

        let designator = tokens[0].to_string();
        let x = parse_number(&designator, "X", tokens[3])?;
        let y = parse_number(&designator, "Y", tokens[4])?;
        let rotation = parse_number(&designator, "rotation", tokens[5])?;
        let side = tokens[6]
            .parse::<Side>()
            .map_err(|_| TransBomError::UnknownSide {
                designator: designator.clone(),
                side: tokens[6].to_string(),
            })?;

        Ok(Some(Self {
            designator,
            x,
            y,
            rotation,
            side,
        }))
    }

    /// Convert to the JLCPCB coordinate conventions
    pub fn to_cpl_row(&self) -> CplRow {
        CplRow {
            designator: self.designator.clone(),
            mid_x: format_mm(self.x),
            mid_y: format_mm(-self.y),
            layer: self.side.to_string(),
            rotation: format_rotation(normalize_rotation(self.rotation)),
        }
    }
}

/// A formatted row of the JLCPCB placement table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CplRow {
    pub designator: String,
    pub mid_x: String,
    pub mid_y: String,
    pub layer: String,
    pub rotation: String,
}

impl CplRow {
    fn fields(&self) -> [&str; 5] {
        [
            self.designator.as_str(),
            self.mid_x.as_str(),
            self.mid_y.as_str(),
            self.layer.as_str(),
            self.rotation.as_str(),
        ]
    }
}

fn parse_number(designator: &str, field: &'static str, value: &str) -> Result<f64> {
    value.parse::<f64>().map_err(|_| {
        TransBomError::InvalidNumber {
            designator: designator.to_string(),
            field,
            value: value.to_string(),
        }
        .into()
    })
}

/// Fold a negative angle into the positive range once.
///
/// Angles at or below -360 stay negative.
pub fn normalize_rotation(rotation: f64) -> f64 {
    if rotation < 0.0 {
        rotation + 360.0
    } else {
        rotation
    }
}

/// Format a coordinate as millimeters with four decimals
pub fn format_mm(value: f64) -> String {
    format!("{:.4}mm", value)
}

/// Whole angles print without a fractional part, others print as-is
pub fn format_rotation(rotation: f64) -> String {
    if rotation.is_finite() && rotation.fract() == 0.0 {
        format!("{}", rotation as i64)
    } else {
        format!("{}", rotation)
    }
}

/// Parse the text of one position file
pub fn parse_positions(text: &str) -> Result<Vec<PlacementRecord>> {
    let mut records = Vec::new();

    for (number, line) in text.lines().enumerate() {
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        match PlacementRecord::from_tokens(&tokens)
            .with_context(|| format!("line {}", number + 1))?
        {
            Some(record) => records.push(record),
            None => debug!("Skipping short line {}: {:?}", number + 1, line),
        }
    }

    Ok(records)
}

/// Read one position file
pub fn read_position_file(path: &Path) -> Result<Vec<PlacementRecord>> {
    info!("Processing: {}", path.display());
    let text = fs::read_to_string(path).with_path_context("read position", path)?;
    let records = parse_positions(&text).with_path_context("parse position", path)?;
    debug!("Read {} placements from {}", records.len(), path.display());
    Ok(records)
}

/// Stable sort of placements by designator across all sides
pub fn sort_placements(records: &mut [PlacementRecord]) {
    records.sort_by_cached_key(|record| DesignatorKey::parse(&record.designator));
}

/// Concatenate several position files and order the result globally
pub fn merge_positions<I>(files: I) -> Vec<PlacementRecord>
where
    I: IntoIterator<Item = Vec<PlacementRecord>>,
{
    let mut records: Vec<PlacementRecord> = files.into_iter().flatten().collect();
    sort_placements(&mut records);
    records
}

/// Write placements as a JLCPCB CPL table
pub fn write_cpl<W: Write>(writer: W, records: &[PlacementRecord]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    writer.write_record(CPL_HEADER)?;
    for record in records {
        writer.write_record(record.to_cpl_row().fields())?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a JLCPCB CPL file
pub fn write_cpl_file(path: &Path, records: &[PlacementRecord]) -> Result<()> {
    let file = fs::File::create(path).with_path_context("create CPL", path)?;
    write_cpl(file, records).with_path_context("write CPL", path)?;
    debug!("Written CPL: {}", path.display());
    Ok(())
}
