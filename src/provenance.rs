/// Commit provenance lookup.
///
/// The walker treats provenance as opaque: anything implementing
/// [`Provenance`] can answer, and a `None` answer becomes empty provenance
/// on the record. [`GitLog`] shells out to `git log` for the last commit
/// touching a file.
use std::path::Path;
use std::process::Command;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use chrono::DateTime;
use regex::Regex;

use crate::record::CommitInfo;

/// Source of commit metadata for files in the corpus.
///
/// Implementations must be `Send + Sync`; packages are processed in
/// parallel against one shared lookup.
pub trait Provenance: Send + Sync {
    /// Last commit touching `path`, or `None` when it cannot be determined.
    fn commit_info(&self, path: &Path) -> Option<CommitInfo>;
}

/// Provenance disabled: every lookup is unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProvenance;

impl Provenance for NoProvenance {
    fn commit_info(&self, _path: &Path) -> Option<CommitInfo> {
        None
    }
}

/// Reads the last commit of a file with `git log -1 --date=iso-strict`.
#[derive(Debug, Clone)]
pub struct GitLog {
    program: String,
}

impl Default for GitLog {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
        }
    }
}

impl GitLog {
    /// Use a specific git executable.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, path: &Path) -> Result<CommitInfo> {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file = path.file_name().context("path has no file name")?;

        let output = Command::new(&self.program)
            .current_dir(dir)
            .args(["log", "-1", "--date=iso-strict", "--"])
            .arg(file)
            .output()
            .with_context(|| format!("failed to run {}", self.program))?;

        if !output.status.success() {
            bail!(
                "git log exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        parse_git_log(&String::from_utf8_lossy(&output.stdout))
    }
}

impl Provenance for GitLog {
    fn commit_info(&self, path: &Path) -> Option<CommitInfo> {
        match self.run(path) {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::debug!("No provenance for {}: {e:#}", path.display());
                None
            }
        }
    }
}

/// Extract hash, author and date from the head of `git log` output.
///
/// A date that is not RFC 3339 is dropped rather than failing the lookup.
fn parse_git_log(stdout: &str) -> Result<CommitInfo> {
    static RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"commit (\w+)[^\n]*\nAuthor: (.*)\nDate: (.*)").expect("valid git log pattern")
    });
    let caps = RE.captures(stdout).context("no commit in git log output")?;

    let date = DateTime::parse_from_rfc3339(caps[3].trim()).ok();

    Ok(CommitInfo {
        hash: caps[1].to_string(),
        author: caps[2].trim().to_string(),
        date,
    })
}

// ── Tests ────────────────────────────────────────────────────────────
