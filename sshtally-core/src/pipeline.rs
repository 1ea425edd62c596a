//! Log-to-aggregate pipeline
//!
//! One run reads a complete log capture, counts every failed password
//! attempt three ways and then reports and persists the result:
//!
//! LogSource
//! match_line
//! LogEvent
//! AggregateState
//! rank / render_ranking  -> console
//! Snapshot               -> <out_dir>/{ip_user,ip,user}.json
//!
//! A failing source stops the run before anything is printed or written.
//! Snapshot failures are collected so every artifact is still attempted.

use crate::aggregate::AggregateState;
use crate::constants::{IP_ARTIFACT, JOINT_ARTIFACT, USER_ARTIFACT};
use crate::error::{PipelineError, SnapshotError};
use crate::report::{rank, render_ranking};
use crate::snapshot::{Snapshot, write_snapshot};
use crate::source::LogSource;
use std::io::Write;
use std::path::{Path, PathBuf};

const JOINT_TITLE: &str = "------- Attackers IPs and their username guesses (most common) -------";
const IP_TITLE: &str = "------- Attackers IPs (most common) -------";
const USER_TITLE: &str = "------- Attackers username guesses (most common) -------";

/// Per-run settings threaded through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub limit: i64,
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub lines: usize,
    pub attempts: u64,
    pub artifacts: Vec<PathBuf>,
}

/// Feed every line, in order, through the matcher into a fresh state.
pub fn aggregate_lines<I, S>(lines: I) -> AggregateState
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut state = AggregateState::new();
    let mut skipped = 0usize;

    for line in lines {
        if !state.ingest(line.as_ref()) {
            skipped += 1;
        }
    }

    tracing::debug!(matched = state.attempts, skipped, "log capture aggregated");
    state
}

/// Write the three ranked sections, joint table first.
pub fn write_report<W: Write>(
    out: &mut W,
    state: &AggregateState,
    limit: i64,
) -> std::io::Result<()> {
    writeln!(out, "{JOINT_TITLE}")?;
    write!(out, "{}", render_ranking(&rank(&state.by_pair, limit)))?;

    writeln!(out, "\n{IP_TITLE}")?;
    write!(out, "{}", render_ranking(&rank(&state.by_ip, limit)))?;

    writeln!(out, "\n{USER_TITLE}")?;
    write!(out, "{}", render_ranking(&rank(&state.by_user, limit)))?;

    Ok(())
}

/// Persist the three tables. Every artifact is attempted; the failures are returned.
pub fn persist(state: &AggregateState, out_dir: &Path) -> (Vec<PathBuf>, Vec<SnapshotError>) {
    let snapshots = [
        (JOINT_ARTIFACT, Snapshot::from_table(&state.by_pair)),
        (IP_ARTIFACT, Snapshot::from_table(&state.by_ip)),
        (USER_ARTIFACT, Snapshot::from_table(&state.by_user)),
    ];

    let mut written = Vec::new();
    let mut failed = Vec::new();

    for (artifact, snapshot) in snapshots {
        match write_snapshot(out_dir, artifact, &snapshot) {
            Ok(path) => written.push(path),
            Err(err) => {
                tracing::error!(artifact, error = %err, "snapshot not written");
                failed.push(err);
            }
        }
    }

    (written, failed)
}

fn announce<W: Write>(out: &mut W, written: &[PathBuf]) -> std::io::Result<()> {
    for path in written {
        writeln!(out, "Dumped result to {}.", path.display())?;
    }
    Ok(())
}

/// Run the whole pipeline against `source`, writing the report to `out`.
///
/// Snapshots are persisted even when `out` stops accepting writes.
pub fn run<S, W>(
    source: &S,
    options: &RunOptions,
    out: &mut W,
) -> Result<RunSummary, PipelineError>
where
    S: LogSource + ?Sized,
    W: Write,
{
    let lines = source.fetch_lines()?;
    tracing::info!(source = %source.describe(), lines = lines.len(), "log capture read");

    let state = aggregate_lines(&lines);

    let report = write_report(out, &state, options.limit);
    let (artifacts, failed) = persist(&state, &options.out_dir);
    let report = report.and_then(|_| announce(out, &artifacts));

    if let Err(err) = &report {
        tracing::error!(error = %err, "report not written");
    }

    match (failed.is_empty(), report) {
        (true, Ok(())) => Ok(RunSummary {
            lines: lines.len(),
            attempts: state.attempts,
            artifacts,
        }),
        (true, Err(err)) => Err(PipelineError::Report(err)),
        (false, report) => Err(PipelineError::Persist {
            failed,
            report: report.err(),
        }),
    }
}

#[cfg(test)]
mod tests;
