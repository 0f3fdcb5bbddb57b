//! Configuration management for TransBOM
//!
//! This module handles CLI argument parsing and application settings.

use anyhow::{anyhow, Context, Result};
use clap::builder::styling;
use clap::{value_parser, Arg, ArgMatches, ColorChoice, Command};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::TransBomError;

pub const DEFAULT_OUTPUT_DIR: &str = "./jlcpcb-output";
pub const DEFAULT_TEMPLATE_PATH: &str = "parts_mapping.json";

/// Build the CLI command
pub fn build_cli() -> Command {
    let styles = styling::Styles::styled()
        .header(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
        .literal(styling::AnsiColor::Blue.on_default() | styling::Effects::BOLD)
        .placeholder(styling::AnsiColor::Cyan.on_default());

    Command::new("transbom")
        .about("TransBOM - Convert KiCad BOM and position files for JLCPCB assembly")
        .author("HalfSweet <HalfSweet@HalfSweet.cn>")
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no_progress")
                .long("no-progress")
                .help("Disable progress indicators")
                .global(true)
                .action(clap::ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a KiCad BOM and position files to JLCPCB BOM and CPL")
                .arg(
                    Arg::new("bom")
                        .help("KiCad BOM (semicolon separated)")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("pos")
                        .help("Position files, e.g. top.pos bottom.pos")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output_path")
                        .short('o')
                        .long("output_path")
                        .help("Output directory")
                        .value_parser(value_parser!(PathBuf))
                        .default_value(DEFAULT_OUTPUT_DIR),
                ),
        )
        .subcommand(
            Command::new("annotate")
                .about("Add LCSC part numbers to a converted JLCPCB BOM")
                .arg(
                    Arg::new("bom")
                        .help("JLCPCB BOM produced by `convert`")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("map")
                        .short('m')
                        .long("map")
                        .help("JSON mapping file (Comment -> LCSC Part #)")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("interactive")
                        .short('i')
                        .long("interactive")
                        .help("Prompt for each part still missing a number")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("filter_test_points")
                        .short('f')
                        .long("filter-test-points")
                        .help("Drop test points, mounting holes and net labels")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("exclusions")
                        .long("exclusions")
                        .help("JSON file with exclusion prefixes and comments")
                        .requires("filter_test_points")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Output CSV file (default: <input>_with_lcsc.csv)")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("template")
                .about("Write a starter parts mapping JSON file")
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Output JSON file")
                        .value_parser(value_parser!(PathBuf))
                        .default_value(DEFAULT_TEMPLATE_PATH),
                ),
        )
}

/// Options of the `convert` task
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// KiCad BOM file
    pub bom: PathBuf,

    /// Position files, concatenated in order
    pub positions: Vec<PathBuf>,

    /// Output directory
    pub output_path: PathBuf,
}

/// Options of the `annotate` task
#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    pub bom: PathBuf,
    pub mapping: Option<PathBuf>,
    pub interactive: bool,
    pub filter_test_points: bool,
    pub exclusions: Option<PathBuf>,
    pub output: PathBuf,
}

#[derive(Debug, Clone)]
pub enum Task {
    Convert(ConvertOptions),
    Annotate(AnnotateOptions),
    Template { output: PathBuf },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// What to run
    pub task: Task,

    /// Enable verbose logging
    pub verbose: bool,

    /// Disable progress bars
    pub no_progress: bool,
}

impl Config {
    /// Parse arguments and apply initial configuration
    pub fn from_args() -> Result<Self> {
        let config = Self::from_matches(&build_cli().get_matches())?;

        // Set up tracing with environment variable support
        // RUST_LOG takes precedence over verbose flag
        let default_filter = if config.verbose { "info" } else { "off" };
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();

        if config.verbose {
            info!("Configuration: {:?}", config);
        }

        Ok(config)
    }

    /// Build a configuration from parsed arguments
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let verbose = matches.get_flag("verbose");
        let no_progress = matches.get_flag("no_progress");

        let task = match matches.subcommand() {
            Some(("convert", sub)) => Task::Convert(ConvertOptions {
                bom: required_path(sub, "bom")?,
                positions: sub
                    .get_many::<PathBuf>("pos")
                    .ok_or_else(|| anyhow!("At least one position file is required"))?
                    .cloned()
                    .collect(),
                output_path: sub
                    .get_one::<PathBuf>("output_path")
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            }),
            Some(("annotate", sub)) => {
                let bom = required_path(sub, "bom")?;
                let output = sub
                    .get_one::<PathBuf>("output")
                    .cloned()
                    .unwrap_or_else(|| default_annotated_path(&bom));

                Task::Annotate(AnnotateOptions {
                    mapping: sub.get_one::<PathBuf>("map").cloned(),
                    interactive: sub.get_flag("interactive"),
                    filter_test_points: sub.get_flag("filter_test_points"),
                    exclusions: sub.get_one::<PathBuf>("exclusions").cloned(),
                    bom,
                    output,
                })
            }
            Some(("template", sub)) => Task::Template {
                output: sub
                    .get_one::<PathBuf>("output")
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATE_PATH)),
            },
            _ => return Err(anyhow!("A subcommand is required")),
        };

        Ok(Config {
            task,
            verbose,
            no_progress,
        })
    }

    /// Check inputs exist and prepare the output location
    pub fn validate(&self) -> Result<()> {
        match &self.task {
            Task::Convert(options) => {
                ensure_exists(&options.bom)?;
                for position in &options.positions {
                    ensure_exists(position)?;
                }
                ensure_dir(&options.output_path)?;
            }
            Task::Annotate(options) => {
                if options.mapping.is_none() && !options.interactive && !options.filter_test_points
                {
                    return Err(TransBomError::NoAnnotationMode.into());
                }

                ensure_exists(&options.bom)?;
                for path in options.mapping.iter().chain(options.exclusions.iter()) {
                    ensure_exists(path)?;
                }
                if let Some(parent) = options.output.parent() {
                    ensure_dir(parent)?;
                }
            }
            Task::Template { output } => {
                if let Some(parent) = output.parent() {
                    ensure_dir(parent)?;
                }
            }
        }

        info!("Configuration validation completed successfully");
        Ok(())
    }
}

fn required_path(matches: &ArgMatches, name: &str) -> Result<PathBuf> {
    matches
        .get_one::<PathBuf>(name)
        .cloned()
        .ok_or_else(|| anyhow!("Argument '{}' is required", name))
}

/// `<dir>/<stem>_with_lcsc.csv` next to the input
pub fn default_annotated_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "bom".to_string());

    input.with_file_name(format!("{}_with_lcsc.csv", stem))
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(TransBomError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }
    Ok(())
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }

    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create output directory: {}", path.display()))?;
    info!("Created output directory: {}", path.display());
    Ok(())
}
