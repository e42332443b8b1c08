use std::path::PathBuf;

use clap::Parser;

use crate::layout::PresenceRule;

/// Format of the plan report printed by `--dry-run`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Fully resolved conversion configuration (constructed from CLI args).
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input: PathBuf,
    pub binary_dir: PathBuf,
    pub source_dir: PathBuf,
    pub header_dir: PathBuf,
    pub presence_rule: PresenceRule,
    pub dry_run: bool,
    pub report: ReportFormat,
    pub verbose: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            binary_dir: PathBuf::from("."),
            source_dir: PathBuf::from("."),
            header_dir: PathBuf::from("."),
            presence_rule: PresenceRule::AnyComponent,
            dry_run: false,
            report: ReportFormat::Text,
            verbose: false,
        }
    }
}

/// CLI argument definition (clap derive).
#[derive(Parser, Debug)]
#[command(name = "plytogx", about = "PLYtoGX Converter", version)]
pub struct CliArgs {
    /// PLY file to process
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output path for binary blob
    #[arg(short = 'b', value_name = "DIR", default_value = ".")]
    pub binary_dir: PathBuf,

    /// Output path for generated C file
    #[arg(short = 's', value_name = "DIR", default_value = ".")]
    pub source_dir: PathBuf,

    /// Output path for generated H file
    #[arg(short = 'e', value_name = "DIR", default_value = ".")]
    pub header_dir: PathBuf,

    /// Require every component of an attribute group (e.g. x, y and z)
    #[arg(long)]
    pub strict_attributes: bool,

    /// Plan the layout and report it without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Plan report format: text or json
    #[arg(long, value_enum, default_value = "text")]
    pub report: ReportFormat,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl From<CliArgs> for ConvertConfig {
    fn from(args: CliArgs) -> Self {
        ConvertConfig {
            input: args.file,
            binary_dir: args.binary_dir,
            source_dir: args.source_dir,
            header_dir: args.header_dir,
            presence_rule: if args.strict_attributes {
                PresenceRule::AllComponents
            } else {
                PresenceRule::AnyComponent
            },
            dry_run: args.dry_run,
            report: args.report,
            verbose: args.verbose,
        }
    }
}
