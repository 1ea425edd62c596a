use crate::aggregate::JointKey;
use crate::error::{LogSourceError, PipelineError};
use crate::pipeline::{RunOptions, aggregate_lines, run, write_report};
use crate::snapshot::read_table;
use crate::source::{LogSource, StaticSource};
use pretty_assertions::assert_eq;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tempfile::tempdir;

const SAMPLE: [&str; 3] = [
    "Failed password for root from 1.1.1.1 port 22 ssh2",
    "irrelevant line",
    "Failed password for invalid user x from 1.1.1.1 port 22 ssh2",
];

struct BrokenSource;

impl LogSource for BrokenSource {
    fn describe(&self) -> String {
        "broken".to_string()
    }

    fn fetch_lines(&self) -> Result<Vec<String>, LogSourceError> {
        Err(LogSourceError::Read {
            path: PathBuf::from("/nowhere"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        })
    }
}

/// Accepts writes until one contains `fail_on`, then reports a broken pipe.
struct ClosingWriter {
    fail_on: &'static str,
    accepted: Vec<u8>,
}

impl ClosingWriter {
    fn new(fail_on: &'static str) -> Self {
        Self {
            fail_on,
            accepted: Vec::new(),
        }
    }
}

impl Write for ClosingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if String::from_utf8_lossy(buf).contains(self.fail_on) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"));
        }
        self.accepted.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn options_in(dir: &std::path::Path) -> RunOptions {
    RunOptions {
        limit: 20,
        out_dir: dir.to_path_buf(),
    }
}

#[test]
fn aggregates_the_three_line_sample() {
    // Act
    let state = aggregate_lines(SAMPLE);

    // Assert
    assert_eq!(state.attempts, 2);
    assert_eq!(state.by_ip.len(), 1);
    assert_eq!(state.by_ip.get(&"1.1.1.1".to_string()), 2);
    assert_eq!(state.by_user.len(), 2);
    assert_eq!(state.by_user.get(&"root".to_string()), 1);
    assert_eq!(state.by_user.get(&"x".to_string()), 1);
    assert_eq!(state.by_pair.len(), 2);
    assert_eq!(state.by_pair.get(&JointKey::new("1.1.1.1", "root")), 1);
    assert_eq!(state.by_pair.get(&JointKey::new("1.1.1.1", "x")), 1);
}

#[test]
fn report_lists_sections_in_order() {
    // Arrange
    let state = aggregate_lines(SAMPLE);
    let mut out = Vec::new();

    // Act
    write_report(&mut out, &state, 20).unwrap();

    // Assert
    let text = String::from_utf8(out).unwrap();
    let expected = format!(
        "------- Attackers IPs and their username guesses (most common) -------\n\
         {:<30} : 1\n\
         {:<30} : 1\n\
         {:<30} : 2\n\
         \n\
         ------- Attackers IPs (most common) -------\n\
         {:<30} : 2\n\
         {:<30} : 2\n\
         \n\
         ------- Attackers username guesses (most common) -------\n\
         {:<30} : 1\n\
         {:<30} : 1\n\
         {:<30} : 2\n",
        "1.1.1.1,root", "1.1.1.1,x", "TOTAL", "1.1.1.1", "TOTAL", "root", "x", "TOTAL"
    );
    assert_eq!(text, expected);
}

#[test]
fn run_writes_report_and_three_artifacts() {
    // Arrange
    let dir = tempdir().unwrap();
    let options = RunOptions {
        limit: 20,
        out_dir: dir.path().to_path_buf(),
    };
    let mut out = Vec::new();

    // Act
    let summary = run(&StaticSource::new(SAMPLE), &options, &mut out).unwrap();

    // Assert
    assert_eq!(summary.lines, 3);
    assert_eq!(summary.attempts, 2);
    assert_eq!(
        summary.artifacts,
        vec![
            dir.path().join("ip_user.json"),
            dir.path().join("ip.json"),
            dir.path().join("user.json"),
        ]
    );

    let ips = read_table::<String>(&dir.path().join("ip.json")).unwrap();
    assert_eq!(ips.get(&"1.1.1.1".to_string()), 2);

    let pairs = read_table::<JointKey>(&dir.path().join("ip_user.json")).unwrap();
    assert_eq!(pairs.get(&JointKey::new("1.1.1.1", "x")), 1);

    let text = String::from_utf8(out).unwrap();
    let dumped = format!("Dumped result to {}.", dir.path().join("user.json").display());
    assert!(text.contains(&dumped));
}

#[test]
fn limit_applies_to_every_section() {
    let state = aggregate_lines(SAMPLE);
    let mut out = Vec::new();

    write_report(&mut out, &state, 0).unwrap();

    let text = String::from_utf8(out).unwrap();
    let entry_lines = text.lines().filter(|l| l.contains(" : ")).count();
    assert_eq!(entry_lines, 3);
    assert!(text.lines().filter(|l| l.starts_with("TOTAL")).all(|l| l.ends_with(": 2")));
}

#[test]
fn source_failure_produces_no_output() {
    // Arrange
    let dir = tempdir().unwrap();
    let options = RunOptions {
        limit: 20,
        out_dir: dir.path().to_path_buf(),
    };
    let mut out = Vec::new();

    // Act
    let err = run(&BrokenSource, &options, &mut out).unwrap_err();

    // Assert
    assert!(matches!(err, PipelineError::LogSource(_)));
    assert!(out.is_empty());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn missing_out_dir_reports_every_failed_artifact() {
    // Arrange
    let dir = tempdir().unwrap();
    let options = RunOptions {
        limit: 20,
        out_dir: dir.path().join("missing"),
    };
    let mut out = Vec::new();

    // Act
    let err = run(&StaticSource::new(SAMPLE), &options, &mut out).unwrap_err();

    // Assert
    let PipelineError::Persist { failed, report } = err else {
        panic!("expected persist failure");
    };
    let artifacts: Vec<_> = failed.iter().filter_map(|e| e.artifact()).collect();
    assert_eq!(artifacts, vec!["ip_user.json", "ip.json", "user.json"]);
    assert!(report.is_none());

    // the report is still printed before persisting
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("TOTAL"));
    assert!(!text.contains("Dumped result"));
}

#[test]
fn closed_stdout_while_announcing_still_writes_every_artifact() {
    // Arrange
    let dir = tempdir().unwrap();
    let mut out = ClosingWriter::new("Dumped");

    // Act
    let err = run(&StaticSource::new(SAMPLE), &options_in(dir.path()), &mut out).unwrap_err();

    // Assert
    match err {
        PipelineError::Report(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected report failure, got {other}"),
    }
    for artifact in ["ip_user.json", "ip.json", "user.json"] {
        assert!(dir.path().join(artifact).exists(), "missing {artifact}");
    }
    assert!(String::from_utf8_lossy(&out.accepted).contains("TOTAL"));
}

#[test]
fn closed_stdout_during_report_still_writes_every_artifact() {
    // Arrange
    let dir = tempdir().unwrap();
    let mut out = ClosingWriter::new("-------");

    // Act
    let err = run(&StaticSource::new(SAMPLE), &options_in(dir.path()), &mut out).unwrap_err();

    // Assert
    assert!(matches!(err, PipelineError::Report(_)));
    let ips = read_table::<String>(&dir.path().join("ip.json")).unwrap();
    assert_eq!(ips.get(&"1.1.1.1".to_string()), 2);
    assert!(dir.path().join("ip_user.json").exists());
    assert!(dir.path().join("user.json").exists());
}

#[test]
fn one_failing_artifact_does_not_suppress_the_others() {
    // Arrange
    let dir = tempdir().unwrap();
    let blocked = dir.path().join("ip.json");
    fs::create_dir(&blocked).unwrap();
    fs::write(blocked.join("keep"), "old").unwrap();
    let mut out = Vec::new();

    // Act
    let err = run(&StaticSource::new(SAMPLE), &options_in(dir.path()), &mut out).unwrap_err();

    // Assert
    let PipelineError::Persist { failed, report } = err else {
        panic!("expected persist failure");
    };
    let artifacts: Vec<_> = failed.iter().filter_map(|e| e.artifact()).collect();
    assert_eq!(artifacts, vec!["ip.json"]);
    assert!(report.is_none());

    let pairs = read_table::<JointKey>(&dir.path().join("ip_user.json")).unwrap();
    assert_eq!(pairs.total(), 2);
    let users = read_table::<String>(&dir.path().join("user.json")).unwrap();
    assert_eq!(users.total(), 2);
    assert_eq!(fs::read_to_string(blocked.join("keep")).unwrap(), "old");

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("ip_user.json."));
    assert!(text.contains("user.json."));
    assert!(!text.contains(&format!("{}.", blocked.display())));
}

#[test]
fn artifact_and_report_failures_are_both_surfaced() {
    // Arrange
    let dir = tempdir().unwrap();
    let mut out = ClosingWriter::new("-------");
    let options = RunOptions {
        limit: 20,
        out_dir: dir.path().join("missing"),
    };

    // Act
    let err = run(&StaticSource::new(SAMPLE), &options, &mut out).unwrap_err();

    // Assert
    let PipelineError::Persist { failed, report } = err else {
        panic!("expected persist failure");
    };
    assert_eq!(failed.len(), 3);
    assert_eq!(report.map(|e| e.kind()), Some(io::ErrorKind::BrokenPipe));
}
