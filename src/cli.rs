use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::engine::{
    DEFAULT_CONTRACT_TYPE, DEFAULT_CURRENCY, DEFAULT_REPORT_CONTEXT, DEFAULT_REPORT_YEAR,
};

#[derive(Parser, Debug)]
#[command(
    name = "contract-risk",
    version,
    about = "Severity-annotated risk reports for public works contracts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Analyze(AnalyzeArgs),
    Batch(BatchArgs),
    Status(StatusArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum EnrichmentMode {
    Off,
    Lexicon,
}

impl EnrichmentMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Lexicon => "lexicon",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Reference date for days-remaining; defaults to today (UTC).
    #[arg(long)]
    pub evaluation_date: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = EnrichmentMode::Off)]
    pub enrichment: EnrichmentMode,

    #[arg(long, default_value = DEFAULT_CONTRACT_TYPE)]
    pub contract_type: String,

    #[arg(long, default_value_t = DEFAULT_REPORT_YEAR)]
    pub year: i32,

    #[arg(long, default_value = DEFAULT_REPORT_CONTEXT)]
    pub context: String,

    #[arg(long, default_value = DEFAULT_CURRENCY)]
    pub currency: String,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// JSON object, or a JSON array whose first object is analyzed.
    #[arg(long)]
    pub input: PathBuf,

    /// Report destination; stdout when omitted.
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Args, Debug, Clone)]
pub struct BatchArgs {
    /// JSON array of objects, or JSON Lines (`.jsonl` / `.ndjson`).
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long, default_value = "reports")]
    pub output_dir: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "contract_reports.sqlite")]
    pub db_path: PathBuf,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}
