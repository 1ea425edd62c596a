use crate::constants::{DEFAULT_LIMIT, DEFAULT_OUT_DIR, DEFAULT_UNIT};
use crate::error::UsageError;
use crate::logging::{LogFormat, default_log_format};
use crate::pipeline::RunOptions;
use crate::source::{FileSource, Journalctl, LogSource, StdinSource};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sshtally",
    version,
    about = "Count failed SSH password attempts by source IP and username"
)]
pub struct Cli {
    /// List the N most common attacks in each category
    #[arg(
        value_name = "N",
        default_value_t = DEFAULT_LIMIT,
        value_parser = parse_limit,
        allow_negative_numbers = true
    )]
    pub limit: i64,

    /// journald unit to read when no capture file is given
    #[arg(long, default_value = DEFAULT_UNIT)]
    pub unit: String,

    /// Read a saved log capture instead of journalctl ("-" for stdin)
    #[arg(long, conflicts_with = "unit")]
    pub input: Option<PathBuf>,

    /// Existing directory the JSON snapshots are written to
    #[arg(long, default_value = DEFAULT_OUT_DIR)]
    pub out_dir: PathBuf,

    /// Diagnostic log format on stderr
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,
}

/// Parse the listing limit. Anything that is not an integer is a usage error.
pub fn parse_limit(raw: &str) -> Result<i64, UsageError> {
    raw.trim().parse::<i64>().map_err(|_| UsageError {
        value: raw.to_string(),
    })
}

/// Where the log capture comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Journal { unit: String },
    File(PathBuf),
    Stdin,
}

impl SourceSpec {
    pub fn open(&self) -> Box<dyn LogSource> {
        match self {
            Self::Journal { unit } => Box::new(Journalctl::new(unit.clone())),
            Self::File(path) => Box::new(FileSource { path: path.clone() }),
            Self::Stdin => Box::new(StdinSource),
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyConfig {
    pub limit: i64,
    pub source: SourceSpec,
    pub out_dir: PathBuf,
    pub log_format: LogFormat,
}

impl TallyConfig {
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            limit: self.limit,
            out_dir: self.out_dir.clone(),
        }
    }
}

impl From<Cli> for TallyConfig {
    fn from(cli: Cli) -> Self {
        let source = match cli.input {
            Some(path) if path.as_os_str() == "-" => SourceSpec::Stdin,
            Some(path) => SourceSpec::File(path),
            None => SourceSpec::Journal { unit: cli.unit },
        };

        Self {
            limit: cli.limit,
            source,
            out_dir: cli.out_dir,
            log_format: cli.log_format.unwrap_or_else(default_log_format),
        }
    }
}
