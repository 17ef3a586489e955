//! Batch conversion of a directory tree.
//!
//! [`BatchRunner::run`] discovers input files under a root, runs each one
//! through a [`DocumentConverter`] and an [`Exporter`] on a pool of exactly
//! `parallelism` worker threads, and collects one [`BatchOutcome`] per file
//! into a [`BatchReport`]. Per-file failures are recorded, never fatal; only
//! invalid inputs abort a run, before any file is touched.
//!
//! # Example
//!
//! ```no_run
//! use docpack::batch::{BatchOptions, BatchRunner};
//! use docpack::convert::DocumentConverter;
//! use docpack::export::Exporter;
//! use std::path::Path;
//!
//! fn main() -> docpack::Result<()> {
//!     let options = BatchOptions::new("out").with_recursive(true).with_parallelism(4);
//!     let runner = BatchRunner::new(DocumentConverter::default(), Exporter::default(), options);
//!
//!     let report = runner.run(Path::new("lectures"))?;
//!     report.write(Path::new("out"))?;
//!     println!("{}/{} succeeded", report.succeeded, report.total);
//!     Ok(())
//! }
//! ```

mod discover;
mod report;

pub use discover::{assign_base_names, discover_files, sanitize_base_name, InputFile};
pub use report::{BatchOutcome, BatchReport, ExitStatus, REPORT_JSON, REPORT_MARKDOWN};

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{info, warn};

use crate::convert::DocumentConverter;
use crate::error::{Error, Result};
use crate::export::{Exporter, FormatSet};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directory receiving one package subdirectory per input
    pub output_dir: PathBuf,

    /// Descend into subdirectories
    pub recursive: bool,

    /// Number of worker threads (at least 1)
    pub parallelism: usize,

    /// Formats exported for every file
    pub formats: FormatSet,

    /// Accepted input extensions, case-insensitive, without the dot
    pub extensions: Vec<String>,
}

impl BatchOptions {
    /// Create options with defaults: top level only, one worker, Markdown,
    /// PDF inputs.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            recursive: false,
            parallelism: 1,
            formats: FormatSet::default(),
            extensions: vec!["pdf".to_string()],
        }
    }

    /// Enable or disable recursive discovery.
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Set the number of worker threads.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    /// Set the export formats.
    pub fn with_formats(mut self, formats: FormatSet) -> Self {
        self.formats = formats;
        self
    }

    /// Set the accepted input extensions.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.into().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    fn validate(&self) -> Result<()> {
        if self.parallelism < 1 {
            return Err(Error::precondition(format!(
                "parallelism must be at least 1, got {}",
                self.parallelism
            )));
        }
        if self.formats.is_empty() {
            return Err(Error::precondition("no export formats selected"));
        }
        if self.extensions.is_empty() {
            return Err(Error::precondition("no input extensions given"));
        }
        Ok(())
    }
}

/// Receives progress notifications from the collecting thread.
///
/// All methods are called from the thread that called [`BatchRunner::run`].
pub trait BatchObserver {
    /// Files were discovered and work is about to start.
    fn on_start(&self, _total: usize) {}

    /// One file finished; `done` counts finished files so far.
    fn on_file_done(&self, _outcome: &BatchOutcome, _done: usize, _total: usize) {}

    /// Every file finished and the report is final.
    fn on_finish(&self, _report: &BatchReport) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Runs batch conversions.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    converter: DocumentConverter,
    exporter: Exporter,
    options: BatchOptions,
}

impl BatchRunner {
    /// Create a runner.
    pub fn new(converter: DocumentConverter, exporter: Exporter, options: BatchOptions) -> Self {
        Self {
            converter,
            exporter,
            options,
        }
    }

    /// Batch options.
    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Process every matching file under `root`.
    pub fn run(&self, root: &Path) -> Result<BatchReport> {
        self.run_with_observer(root, &NoopObserver)
    }

    /// Process every matching file under `root`, reporting progress to
    /// `observer`.
    pub fn run_with_observer(
        &self,
        root: &Path,
        observer: &dyn BatchObserver,
    ) -> Result<BatchReport> {
        let inputs = self.prepare(root)?;
        let total = inputs.len();
        let started = Instant::now();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.parallelism)
            .thread_name(|i| format!("docpack-worker-{}", i))
            .build()
            .map_err(|e| Error::precondition(format!("cannot start worker pool: {}", e)))?;

        info!(
            "Processing {} files from {} with {} workers",
            total,
            root.display(),
            self.options.parallelism
        );
        observer.on_start(total);

        let (tx, rx) = crossbeam_channel::unbounded::<BatchOutcome>();
        let mut outcomes = Vec::with_capacity(total);

        // The calling thread is not part of the pool, so it can block on the
        // channel while workers run; it is the only writer of `outcomes`.
        pool.in_place_scope(|scope| {
            for input in &inputs {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let _ = tx.send(self.process_guarded(input));
                });
            }
            drop(tx);

            for outcome in rx.iter() {
                outcomes.push(outcome);
                if let Some(last) = outcomes.last() {
                    observer.on_file_done(last, outcomes.len(), total);
                }
            }
        });

        let report = BatchReport::new(
            root.to_path_buf(),
            self.options.output_dir.clone(),
            self.options.formats,
            outcomes,
            started.elapsed(),
        );
        info!(
            "Batch finished: {} succeeded, {} failed in {:.2}s",
            report.succeeded, report.failed, report.elapsed_secs
        );
        observer.on_finish(&report);
        Ok(report)
    }

    /// Check preconditions and discover inputs. Nothing is written unless
    /// every check passes.
    fn prepare(&self, root: &Path) -> Result<Vec<InputFile>> {
        self.options.validate()?;

        if !root.exists() {
            return Err(Error::precondition(format!(
                "input directory '{}' does not exist",
                root.display()
            )));
        }
        if !root.is_dir() {
            return Err(Error::precondition(format!(
                "input path '{}' is not a directory",
                root.display()
            )));
        }

        let files = discover_files(
            root,
            self.options.recursive,
            &self.options.extensions,
            Some(&self.options.output_dir),
        )?;
        if files.is_empty() {
            return Err(Error::precondition(format!(
                "no matching files found in '{}'",
                root.display()
            )));
        }

        fs::create_dir_all(&self.options.output_dir).map_err(|e| {
            Error::precondition(format!(
                "cannot create output directory '{}': {}",
                self.options.output_dir.display(),
                e
            ))
        })?;

        Ok(assign_base_names(root, &files))
    }

    fn process_guarded(&self, input: &InputFile) -> BatchOutcome {
        let started = Instant::now();
        match panic::catch_unwind(AssertUnwindSafe(|| self.process_file(input, started))) {
            Ok(outcome) => outcome,
            Err(_) => {
                let err = Error::conversion(&input.path, "worker panicked while processing file");
                warn!("{}", err);
                BatchOutcome::failed(
                    input.path.clone(),
                    input.base_name.clone(),
                    &err,
                    started.elapsed(),
                )
            }
        }
    }

    fn process_file(&self, input: &InputFile, started: Instant) -> BatchOutcome {
        let package_dir = self.options.output_dir.join(&input.base_name);
        let result = self.converter.convert(&input.path).and_then(|doc| {
            self.exporter
                .export(&doc, &package_dir, &input.base_name, self.options.formats)
        });

        match result {
            Ok(package) => BatchOutcome::succeeded(
                input.path.clone(),
                input.base_name.clone(),
                package,
                started.elapsed(),
            ),
            Err(e) => {
                warn!("{}", e);
                BatchOutcome::failed(
                    input.path.clone(),
                    input.base_name.clone(),
                    &e,
                    started.elapsed(),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = BatchOptions::new("out")
            .with_recursive(true)
            .with_parallelism(4)
            .with_formats(FormatSet::all())
            .with_extensions([".PDF", "json"]);

        assert!(options.recursive);
        assert_eq!(options.parallelism, 4);
        assert_eq!(options.extensions, vec!["pdf", "json"]);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_parallelism_rejected() {
        let err = BatchOptions::new("out")
            .with_parallelism(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, Error::Precondition(_)));
    }

    #[test]
    fn test_empty_formats_rejected() {
        let err = BatchOptions::new("out")
            .with_formats(FormatSet::empty())
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("no export formats"));
    }

    #[test]
    fn test_root_must_be_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.pdf");
        fs::write(&file, "x").unwrap();

        let runner = BatchRunner::new(
            DocumentConverter::default(),
            Exporter::default(),
            BatchOptions::new(dir.path().join("out")),
        );
        let err = runner.run(&file).unwrap_err();
        assert!(err.to_string().contains("is not a directory"));
        assert!(!dir.path().join("out").exists());
    }
}
