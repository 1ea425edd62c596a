use crate::error::LogSourceError;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::Command;

/// Something that hands over one complete log capture as lines.
///
/// Called once per run; the whole capture is returned before aggregation
/// starts.
pub trait LogSource {
    /// Human-readable origin, shown before reading.
    fn describe(&self) -> String;

    fn fetch_lines(&self) -> Result<Vec<String>, LogSourceError>;
}

/// `journalctl -u <unit> --no-pager`, run to completion.
#[derive(Debug, Clone)]
pub struct Journalctl {
    pub unit: String,
}

impl Journalctl {
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }

    fn args(&self) -> [&str; 3] {
        ["-u", &self.unit, "--no-pager"]
    }

    fn command_line(&self) -> String {
        format!("journalctl {}", self.args().join(" "))
    }
}

impl LogSource for Journalctl {
    fn describe(&self) -> String {
        "journalctl".to_string()
    }

    fn fetch_lines(&self) -> Result<Vec<String>, LogSourceError> {
        tracing::debug!(command = %self.command_line(), "invoking log source");

        let output = Command::new("journalctl")
            .args(self.args())
            .output()
            .map_err(|source| LogSourceError::Spawn {
                command: self.command_line(),
                source,
            })?;

        if !output.status.success() {
            return Err(LogSourceError::Exited {
                command: self.command_line(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(split_lines(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// A log capture saved to disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    pub path: PathBuf,
}

impl LogSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch_lines(&self) -> Result<Vec<String>, LogSourceError> {
        let raw = std::fs::read(&self.path).map_err(|source| LogSourceError::Read {
            path: self.path.clone(),
            source,
        })?;

        Ok(split_lines(&String::from_utf8_lossy(&raw)))
    }
}

/// A log capture piped in on stdin.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinSource;

impl LogSource for StdinSource {
    fn describe(&self) -> String {
        "stdin".to_string()
    }

    fn fetch_lines(&self) -> Result<Vec<String>, LogSourceError> {
        let mut raw = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut raw)
            .map_err(|source| LogSourceError::Read {
                path: PathBuf::from("-"),
                source,
            })?;

        Ok(split_lines(&String::from_utf8_lossy(&raw)))
    }
}

/// Lines supplied up front; used by tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub lines: Vec<String>,
}

impl StaticSource {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl LogSource for StaticSource {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn fetch_lines(&self) -> Result<Vec<String>, LogSourceError> {
        Ok(self.lines.clone())
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}
