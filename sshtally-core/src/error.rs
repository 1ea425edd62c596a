use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid value '{value}'. Specify n to list the n most common attacks.")]
pub struct UsageError {
    pub value: String,
}

#[derive(Debug, Error)]
pub enum LogSourceError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Exited {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("failed to read log capture {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to write {artifact} to {path}: {source}")]
    Write {
        artifact: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {artifact}: {source}")]
    Encode {
        artifact: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode snapshot {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid snapshot key '{key}'")]
    InvalidKey { key: String },
}

impl SnapshotError {
    pub fn write(artifact: &str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            artifact: artifact.to_string(),
            path: path.into(),
            source,
        }
    }

    /// Name of the artifact this failure belongs to, if it happened while persisting.
    pub fn artifact(&self) -> Option<&str> {
        match self {
            Self::Write { artifact, .. } | Self::Encode { artifact, .. } => {
                Some(artifact.as_str())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    LogSource(#[from] LogSourceError),

    #[error("failed to write {} snapshot(s)", failed.len())]
    Persist {
        failed: Vec<SnapshotError>,
        /// Set when the console report also failed.
        report: Option<std::io::Error>,
    },

    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
}
