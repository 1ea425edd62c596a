use crate::cli::TallyConfig;
use crate::error::PipelineError;
use crate::pipeline::{RunSummary, run};
use owo_colors::OwoColorize;
use std::io::{self, Write};

const BANNER: &str = "\
*******************************
** SSH ATTACKS COUNTER TOOL  **
*******************************";

/// Print the banner, read the capture, then report and persist.
pub fn run_tally(config: &TallyConfig) -> Result<RunSummary, PipelineError> {
    let source = config.source.open();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "{BANNER}")?;
    writeln!(out, "Reading logs from {}...", source.describe())?;
    out.flush()?;

    let summary = run(source.as_ref(), &config.run_options(), &mut out)?;

    tracing::info!(
        lines = summary.lines,
        attempts = summary.attempts,
        artifacts = summary.artifacts.len(),
        "tally complete"
    );

    Ok(summary)
}

/// Render a pipeline failure for the operator on stderr.
pub fn print_tally_error(err: &PipelineError) {
    match err {
        PipelineError::LogSource(source) => {
            eprintln!("{}: failed to read logs: {}", "error".red().bold(), source);
        }
        PipelineError::Persist { failed, report } => {
            for failure in failed {
                eprintln!("{}: {}", "error".red().bold(), failure);
            }
            if let Some(io) = report {
                eprintln!("{}: failed to write report: {}", "error".red().bold(), io);
            }
        }
        PipelineError::Report(io) => {
            eprintln!("{}: failed to write report: {}", "error".red().bold(), io);
        }
    }
}
