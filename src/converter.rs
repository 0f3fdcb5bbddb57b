//! Core conversion engine for TransBOM
//!
//! This module orchestrates the conversion of a KiCad BOM and its position
//! files into the JLCPCB BOM and CPL tables, and the later annotation pass.

use crate::{
    annotate::{AnnotationReport, Annotator, PartPrompt},
    bom,
    config::{AnnotateOptions, ConvertOptions},
    error::Result,
    filter::ExclusionSet,
    mapping::PartMapping,
    placement,
    progress::ProgressTracker,
};
use anyhow::Context;
use std::path::{Path, PathBuf};
use tracing::info;

pub const BOM_OUTPUT_NAME: &str = "jlcpcb-bom.csv";
pub const CPL_OUTPUT_NAME: &str = "jlcpcb-cpl.csv";

/// The main conversion engine
pub struct Converter {
    options: ConvertOptions,
    progress_tracker: ProgressTracker,
}

impl Converter {
    /// Create a new converter with the given options
    pub fn new(options: ConvertOptions, progress_enabled: bool) -> Self {
        Self {
            options,
            progress_tracker: ProgressTracker::new(progress_enabled),
        }
    }

    /// Run the complete conversion process
    pub fn run(&self) -> Result<ConversionStats> {
        let start = std::time::Instant::now();
        info!("Converting KiCad exports to JLCPCB format...");

        let bom_path = self.options.output_path.join(BOM_OUTPUT_NAME);
        let bom_components = self
            .convert_bom(&bom_path)
            .context("Failed to convert BOM")?;

        let cpl_path = self.options.output_path.join(CPL_OUTPUT_NAME);
        let placements = self
            .convert_positions(&cpl_path)
            .context("Failed to convert position files")?;

        info!("Conversion completed in {} ms", start.elapsed().as_millis());
        Ok(ConversionStats {
            bom_components,
            placements,
            bom_path,
            cpl_path,
        })
    }

    fn convert_bom(&self, output: &Path) -> Result<usize> {
        let spinner = self.progress_tracker.create_spinner("Converting BOM...");

        let records = bom::read_kicad_bom(&self.options.bom)?;
        bom::write_jlc_bom_file(output, &records)?;

        ProgressTracker::finish_progress(spinner, "BOM converted");
        info!("Converted BOM saved to: {}", output.display());
        Ok(records.len())
    }

    fn convert_positions(&self, output: &Path) -> Result<usize> {
        let progress = self
            .progress_tracker
            .create_file_progress(self.options.positions.len(), "Reading position files");

        let mut files = Vec::with_capacity(self.options.positions.len());
        for path in &self.options.positions {
            files.push(placement::read_position_file(path)?);
            ProgressTracker::update_progress(&progress, 1, None);
        }
        ProgressTracker::finish_progress(progress, "Position files read");

        let records = placement::merge_positions(files);
        placement::write_cpl_file(output, &records)?;

        info!("Converted CPL saved to: {}", output.display());
        Ok(records.len())
    }
}

/// Statistics about the conversion process
#[derive(Debug)]
pub struct ConversionStats {
    /// BOM rows written, after dropping rows without designators
    pub bom_components: usize,
    pub placements: usize,
    pub bom_path: PathBuf,
    pub cpl_path: PathBuf,
}

/// Run the annotation pass described by `options`
pub fn annotate(
    options: &AnnotateOptions,
    prompt: Option<&mut dyn PartPrompt>,
) -> Result<AnnotationReport> {
    let records = bom::read_jlc_bom(&options.bom)?;

    let mapping = options
        .mapping
        .as_deref()
        .map(PartMapping::from_file)
        .transpose()?;

    let exclusions = match (&options.exclusions, options.filter_test_points) {
        (Some(path), true) => Some(ExclusionSet::from_file(path)?),
        (None, true) => Some(ExclusionSet::default()),
        (_, false) => None,
    };

    let mut annotator = Annotator::new();
    if let Some(mapping) = &mapping {
        annotator = annotator.with_mapping(mapping);
    }
    if let Some(prompt) = prompt {
        annotator = annotator.with_prompt(prompt);
    }
    if let Some(exclusions) = &exclusions {
        annotator = annotator.with_exclusions(exclusions);
    }

    let (records, report) = annotator.run(records)?;
    bom::write_jlc_bom_file(&options.output, &records)?;

    info!("Updated BOM saved to: {}", options.output.display());
    Ok(report)
}
