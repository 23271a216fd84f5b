//! Commits artifacts to disk.
//!
//! Writes are sequential. The first failure stops the run and reports which
//! files were already committed; nothing is rolled back.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use naming::resolve_file_name;
use thiserror::Error;

use crate::artifacts::{GeneratedArtifact, WriteMode};

/// What to do when an overwritable artifact already exists.
pub enum OverwritePolicy<'a> {
    /// Replace the existing file
    AlwaysOverwrite,
    /// Keep the existing file and write under a disambiguated name
    NeverOverwrite,
    /// Ask the callback; `true` replaces the file
    AskCaller(Box<dyn FnMut(&Path) -> bool + 'a>),
}

impl OverwritePolicy<'_> {
    fn allows(&mut self, path: &Path) -> bool {
        match self {
            OverwritePolicy::AlwaysOverwrite => true,
            OverwritePolicy::NeverOverwrite => false,
            OverwritePolicy::AskCaller(ask) => ask(path),
        }
    }
}

impl fmt::Debug for OverwritePolicy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverwritePolicy::AlwaysOverwrite => f.write_str("AlwaysOverwrite"),
            OverwritePolicy::NeverOverwrite => f.write_str("NeverOverwrite"),
            OverwritePolicy::AskCaller(_) => f.write_str("AskCaller(..)"),
        }
    }
}

/// Outcome of a successful write run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Files created or replaced, in write order
    pub written: Vec<PathBuf>,
    /// Write-once files left untouched because they already existed
    pub skipped: Vec<PathBuf>,
}

/// A write that failed part-way through a run.
#[derive(Debug, Error)]
#[error("failed to write {}: {source}", failed.display())]
pub struct WriteError {
    /// Path that could not be written
    pub failed: PathBuf,
    /// Paths committed before the failure
    pub committed: Vec<PathBuf>,
    /// Underlying I/O error
    #[source]
    pub source: io::Error,
}

/// Write `artifacts` below `root` in order.
pub fn write_artifacts(
    root: &Path,
    artifacts: &[GeneratedArtifact],
    policy: &mut OverwritePolicy<'_>,
) -> Result<WriteReport, WriteError> {
    let mut report = WriteReport::default();
    for artifact in artifacts {
        let dir = artifact.directory(root);
        let fail = |failed: PathBuf, source: io::Error, report: &WriteReport| WriteError {
            failed,
            committed: report.written.clone(),
            source,
        };
        fs::create_dir_all(&dir).map_err(|e| fail(dir.clone(), e, &report))?;

        let mut path = dir.join(&artifact.name);
        if path.exists() {
            match artifact.mode {
                WriteMode::WriteOnce => {
                    tracing::info!(path = %path.display(), "keeping existing write-once file");
                    report.skipped.push(path);
                    continue;
                }
                WriteMode::Overwrite if !policy.allows(&path) => {
                    let existing = file_names(&dir).map_err(|e| fail(dir.clone(), e, &report))?;
                    let (stem, extension) = split_name(&artifact.name);
                    path = dir.join(resolve_file_name(stem, extension, &existing));
                }
                WriteMode::Overwrite => {}
            }
        }

        fs::write(&path, &artifact.content).map_err(|e| fail(path.clone(), e, &report))?;
        tracing::info!(path = %path.display(), "wrote artifact");
        report.written.push(path);
    }
    Ok(report)
}

/// Names of the regular files in `dir`.
pub fn file_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}

/// Split `client.rs` into `("client", "rs")`.
pub fn split_name(name: &str) -> (&str, &str) { name.split_once('.').unwrap_or((name, "")) }
