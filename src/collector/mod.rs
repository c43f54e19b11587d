//! # Artifact Collector
//!
//! Turns an artifact path into the ordered subject list of a statement.
//!
//! - A file yields one subject named after its base file name.
//! - A directory is walked recursively and yields one subject per regular file,
//!   named by its path relative to the directory with `/` separators on every
//!   platform.
//!
//! Symlinks found beneath a directory are always skipped, never followed.
//! The root path itself is resolved like any path a user passes in.
//!
//! Files are digested by a bounded pool of worker threads. Subjects are sorted
//! by name afterwards, so the output order never depends on scheduling.
//!
//! ## Examples
//!
//! ```no_run
//! use slsa_provenance::collector::ArtifactCollector;
//! use slsa_provenance::config::CollectorConfig;
//! use std::path::Path;
//!
//! let subjects = ArtifactCollector::new(CollectorConfig::default())
//!     .collect(Path::new("target/release"))
//!     .unwrap();
//! for subject in &subjects {
//!     println!("{} {}", subject.name, subject.digest["sha256"]);
//! }
//! ```

use crate::cancel::{self, CancellationToken};
use crate::config::CollectorConfig;
use crate::error::{Error, Result};
use crate::hash::{self, DigestSet};
use crate::in_toto::statement::Subject;
use indicatif::ProgressBar;
use log::{debug, trace};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::panic;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use walkdir::WalkDir;

/// A file selected for digesting.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Artifact {
    name: String,
    path: PathBuf,
}

pub struct ArtifactCollector {
    config: CollectorConfig,
    cancel: CancellationToken,
    progress: Option<ProgressBar>,
}

impl ArtifactCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
            progress: None,
        }
    }

    /// Polls `token` while enumerating and before every file read.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Advances `progress` once per digested file.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Collects the subjects for `root`.
    ///
    /// # Errors
    ///
    /// - [`Error::PathNotFound`] if `root` does not exist
    /// - [`Error::EmptyArtifactSet`] if a directory holds no regular files
    /// - [`Error::Enumerate`] if walking the directory fails
    /// - [`Error::Validation`] if a file name is not valid UTF-8
    /// - [`Error::Digest`] if a file cannot be fully read
    /// - [`Error::Cancelled`] if the cancellation token fires
    pub fn collect(&self, root: &Path) -> Result<Vec<Subject>> {
        cancel::check(&self.cancel)?;

        let artifacts = enumerate(root, &self.cancel)?;
        debug!(
            "collected {} artifact(s) under {}",
            artifacts.len(),
            root.display()
        );

        if let Some(progress) = &self.progress {
            progress.set_length(artifacts.len() as u64);
        }

        let subjects = self.digest_all(artifacts)?;

        if let Some(progress) = &self.progress {
            progress.finish_and_clear();
        }

        Ok(subjects)
    }

    fn digest_all(&self, artifacts: Vec<Artifact>) -> Result<Vec<Subject>> {
        let workers = self.config.concurrency.get().min(artifacts.len()).max(1);
        trace!("digesting with {workers} worker(s)");

        let next = AtomicUsize::new(0);
        let failed = AtomicBool::new(false);

        let mut results: Vec<Option<Result<DigestSet>>> = Vec::new();
        results.resize_with(artifacts.len(), || None);

        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    scope.spawn(|| {
                        let mut done = Vec::new();
                        // Indices are claimed in order and no new claim is made
                        // after a failure, so every index below a failing one
                        // has been processed.
                        while !failed.load(Ordering::SeqCst) {
                            let index = next.fetch_add(1, Ordering::SeqCst);
                            let Some(artifact) = artifacts.get(index) else {
                                break;
                            };

                            let result = cancel::check(&self.cancel)
                                .and_then(|_| hash::digest_file(&artifact.path, &self.config.digest));
                            if result.is_err() {
                                failed.store(true, Ordering::SeqCst);
                            }
                            if let Some(progress) = &self.progress {
                                progress.inc(1);
                            }
                            done.push((index, result));
                        }
                        done
                    })
                })
                .collect();

            for handle in handles {
                match handle.join() {
                    Ok(done) => {
                        for (index, result) in done {
                            results[index] = Some(result);
                        }
                    }
                    Err(payload) => panic::resume_unwind(payload),
                }
            }
        });

        if results
            .iter()
            .any(|r| matches!(r, Some(Err(Error::Cancelled))))
        {
            return Err(Error::Cancelled);
        }

        let mut subjects = Vec::with_capacity(artifacts.len());
        for (artifact, result) in artifacts.into_iter().zip(results) {
            match result {
                Some(Ok(digest)) => subjects.push(Subject::new(artifact.name, digest)),
                Some(Err(e)) => return Err(e),
                // only unclaimed after an earlier failure, which returned above
                None => return Err(Error::Cancelled),
            }
        }

        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subjects)
    }
}

/// Lists the artifacts under `root`, sorted by name.
fn enumerate(root: &Path, token: &CancellationToken) -> Result<Vec<Artifact>> {
    let metadata = match fs::metadata(root) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::PathNotFound {
                path: root.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(Error::Digest {
                path: root.to_path_buf(),
                source,
            });
        }
    };

    if metadata.is_file() {
        let name = root
            .file_name()
            .ok_or_else(|| {
                Error::Validation(format!("cannot derive a name for {}", root.display()))
            })
            .and_then(|n| utf8_name(n, root))?;
        return Ok(vec![Artifact {
            name,
            path: root.to_path_buf(),
        }]);
    }

    if !metadata.is_dir() {
        return Err(Error::Validation(format!(
            "{} is neither a regular file nor a directory",
            root.display()
        )));
    }

    let mut artifacts = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        cancel::check(token)?;

        let entry = entry.map_err(|source| Error::Enumerate {
            path: source
                .path()
                .map_or_else(|| root.to_path_buf(), Path::to_path_buf),
            source,
        })?;

        let file_type = entry.file_type();
        if file_type.is_symlink() {
            debug!("skipping symlink {}", entry.path().display());
            continue;
        }
        if !file_type.is_file() {
            if !file_type.is_dir() {
                trace!("skipping special file {}", entry.path().display());
            }
            continue;
        }

        let relative = entry.path().strip_prefix(root).map_err(|_| {
            Error::Validation(format!(
                "{} is not under {}",
                entry.path().display(),
                root.display()
            ))
        })?;

        artifacts.push(Artifact {
            name: relative_name(relative)?,
            path: entry.into_path(),
        });
    }

    if artifacts.is_empty() {
        return Err(Error::EmptyArtifactSet {
            path: root.to_path_buf(),
        });
    }

    artifacts.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(artifacts)
}

/// `relative` joined with `/`, whatever the host separator is.
fn relative_name(relative: &Path) -> Result<String> {
    let parts = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(utf8_name(part, relative)),
            _ => None,
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}

/// Subject names must name the file exactly, so non-UTF-8 names are refused.
fn utf8_name(part: &OsStr, path: &Path) -> Result<String> {
    part.to_str().map(str::to_string).ok_or_else(|| {
        Error::Validation(format!("file name is not valid UTF-8: {}", path.display()))
    })
}
