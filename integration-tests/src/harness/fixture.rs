use sshtally_core::pipeline::{RunOptions, RunSummary, run};
use sshtally_core::error::PipelineError;
use sshtally_core::source::LogSource;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn fixture_path(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(file)
}

pub fn fixture_lines(file: &str) -> Vec<String> {
    fs::read_to_string(fixture_path(file))
        .expect("failed to read fixture")
        .split('\n')
        .map(str::to_string)
        .collect()
}

/// Temporary working directory with an `ssh-result` output directory.
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        fs::create_dir(dir.path().join("ssh-result")).expect("failed to create output dir");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn out_dir(&self) -> PathBuf {
        self.dir.path().join("ssh-result")
    }

    pub fn artifact(&self, name: &str) -> PathBuf {
        self.out_dir().join(name)
    }

    pub fn options(&self, limit: i64) -> RunOptions {
        RunOptions {
            limit,
            out_dir: self.out_dir(),
        }
    }

    /// Run the pipeline and capture the console report.
    pub fn run(
        &self,
        source: &dyn LogSource,
        limit: i64,
    ) -> (Result<RunSummary, PipelineError>, String) {
        let mut out = Vec::new();
        let result = run(source, &self.options(limit), &mut out);
        let text = String::from_utf8(out).expect("report is not UTF-8");
        (result, text)
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}
