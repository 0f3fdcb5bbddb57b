//! TransBOM - Convert KiCad assembly exports to JLCPCB format
//!
//! Command line front end for the BOM/CPL conversion, part number
//! annotation and mapping template generation.

#![allow(non_snake_case)]

use std::io;
use tracing::{error, info};
use TransBOM::{
    annotate::{AnnotationReport, ConsolePrompt, PartPrompt},
    config::{AnnotateOptions, Config, Task},
    converter::{self, Converter},
    error::Result,
    mapping,
};

fn main() {
    // Parse configuration and initialize logging
    let config = Config::from_args().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = run(config) {
        error!("Run failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(config: Config) -> Result<()> {
    config.validate()?;

    match config.task {
        Task::Convert(options) => {
            let stats = Converter::new(options, !config.no_progress).run()?;

            println!("Converted BOM saved to: {}", stats.bom_path.display());
            println!("   Total components: {}", stats.bom_components);
            println!("Converted CPL saved to: {}", stats.cpl_path.display());
            println!("   Total components: {}", stats.placements);
            println!();
            println!("Next step: add JLCPCB Part # (LCSC numbers) with `transbom annotate`");
        }
        Task::Annotate(options) => {
            let report = run_annotate(&options)?;
            print_report(&options, &report);
        }
        Task::Template { output } => {
            let entries = mapping::write_template(&output)?;

            println!("Created parts mapping template: {}", output.display());
            println!("   Total entries: {}", entries);
            println!(
                "Then use with: transbom annotate bom.csv --map {}",
                output.display()
            );
        }
    }

    info!("Done");
    Ok(())
}

fn run_annotate(options: &AnnotateOptions) -> Result<AnnotationReport> {
    if !options.interactive {
        return converter::annotate(options, None);
    }

    println!("Interactive mode: enter LCSC part numbers for each component");
    println!("   (Press Enter to skip, type 'quit' to stop)\n");

    let stdin = io::stdin();
    let mut prompt = ConsolePrompt::new(stdin.lock(), io::stdout());
    converter::annotate(options, Some(&mut prompt as &mut dyn PartPrompt))
}

fn print_report(options: &AnnotateOptions, report: &AnnotationReport) {
    println!("Updated BOM saved to: {}", options.output.display());
    println!("   Total components: {}", report.total);
    println!("   With LCSC part #: {}", report.with_part);
    println!("   Missing part #: {}", report.missing.len());

    if !report.missing.is_empty() {
        println!("\nComponents missing LCSC part numbers:");
        for record in &report.missing {
            println!("   - {} ({})", record.comment, record.designators);
            println!("     Footprint: {}", record.footprint);
        }
    }
}
