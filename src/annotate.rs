//! LCSC part number annotation of a converted BOM
//!
//! Rows are joined against a [`PartMapping`] by their comment, then optionally
//! handed to a [`PartPrompt`] for whatever is still missing, and finally run
//! through an [`ExclusionSet`].

use crate::{bom::ComponentRecord, error::Result, filter::ExclusionSet, mapping::PartMapping};
use anyhow::Context;
use std::io::{BufRead, Write};
use tracing::{debug, info};

/// Answer to a part number prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptAnswer {
    Part(String),
    Skip,
    /// Stop prompting, remaining rows are left as they are
    Quit,
}

/// Source of part numbers for rows the mapping did not cover
pub trait PartPrompt {
    fn ask(&mut self, record: &ComponentRecord) -> Result<PromptAnswer>;
}

/// Console prompt asking the operator for each missing part
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> PartPrompt for ConsolePrompt<R, W> {
    fn ask(&mut self, record: &ComponentRecord) -> Result<PromptAnswer> {
        writeln!(self.output, "Component: {}", record.comment)?;
        writeln!(self.output, "Designator: {}", record.designators)?;
        writeln!(self.output, "Footprint: {}", record.footprint)?;
        write!(self.output, "LCSC Part # (C-prefix): ")?;
        self.output.flush()?;

        let mut line = String::new();
        // End of input behaves like quit
        if self.input.read_line(&mut line)? == 0 {
            return Ok(PromptAnswer::Quit);
        }
        writeln!(self.output)?;

        let answer = line.trim();
        Ok(if answer.eq_ignore_ascii_case("quit") {
            PromptAnswer::Quit
        } else if answer.is_empty() {
            PromptAnswer::Skip
        } else {
            PromptAnswer::Part(answer.to_string())
        })
    }
}

/// Outcome of an annotation run
#[derive(Debug, Clone, Default)]
pub struct AnnotationReport {
    pub total: usize,
    pub with_part: usize,
    /// Rows still lacking a part number, in output order
    pub missing: Vec<ComponentRecord>,
}

/// Configurable annotation pass
#[derive(Default)]
pub struct Annotator<'a> {
    mapping: Option<&'a PartMapping>,
    prompt: Option<&'a mut dyn PartPrompt>,
    exclusions: Option<&'a ExclusionSet>,
}

impl<'a> Annotator<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mapping(mut self, mapping: &'a PartMapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    pub fn with_prompt(mut self, prompt: &'a mut dyn PartPrompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn with_exclusions(mut self, exclusions: &'a ExclusionSet) -> Self {
        self.exclusions = Some(exclusions);
        self
    }

    /// Annotate the records and report what is still missing
    pub fn run(
        mut self,
        mut records: Vec<ComponentRecord>,
    ) -> Result<(Vec<ComponentRecord>, AnnotationReport)> {
        if let Some(mapping) = self.mapping {
            apply_mapping(&mut records, mapping);
        }

        if let Some(prompt) = self.prompt.take() {
            prompt_missing(&mut records, prompt)?;
        }

        if let Some(exclusions) = self.exclusions {
            records = exclusions.apply(records);
        }

        let report = AnnotationReport::from_records(&records);
        info!(
            "Annotated {} rows, {} with part numbers",
            report.total, report.with_part
        );
        Ok((records, report))
    }
}

impl AnnotationReport {
    pub fn from_records(records: &[ComponentRecord]) -> Self {
        let missing: Vec<ComponentRecord> = records
            .iter()
            .filter(|record| !record.has_part())
            .cloned()
            .collect();

        Self {
            total: records.len(),
            with_part: records.len() - missing.len(),
            missing,
        }
    }
}

/// Fill part numbers from the mapping, leaving unmatched rows untouched
pub fn apply_mapping(records: &mut [ComponentRecord], mapping: &PartMapping) {
    for record in records.iter_mut() {
        match mapping.get(&record.comment) {
            Some(part) => record.part = part.to_string(),
            None => debug!("No mapping for '{}'", record.comment),
        }
    }
}

/// Ask for every row that still has no part number
pub fn prompt_missing(records: &mut [ComponentRecord], prompt: &mut dyn PartPrompt) -> Result<()> {
    for record in records.iter_mut().filter(|record| !record.has_part()) {
        match prompt
            .ask(record)
            .with_context(|| format!("Prompt failed for {}", record.designators))?
        {
            PromptAnswer::Part(part) => record.part = part,
            PromptAnswer::Skip => {}
            PromptAnswer::Quit => {
                info!("Interactive annotation stopped by operator");
                break;
            }
        }
    }
    Ok(())
}
