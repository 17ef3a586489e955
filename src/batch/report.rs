//! Per-file outcomes and the aggregate batch report.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};
use crate::export::{ExportPackage, FormatSet, TIMESTAMP_FORMAT};
use crate::model::ElementCounts;

/// Markdown report file name.
pub const REPORT_MARKDOWN: &str = "BATCH_REPORT.md";

/// JSON report file name.
pub const REPORT_JSON: &str = "batch_report.json";

/// Result of processing one input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Input file
    pub input: PathBuf,

    /// Package base name
    pub base_name: String,

    /// Whether conversion and export both succeeded
    pub success: bool,

    /// Written package on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<ExportPackage>,

    /// Error description on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Error category on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,

    /// Wall time spent on this file, in seconds
    pub elapsed_secs: f64,
}

impl BatchOutcome {
    /// Record a successful file.
    pub fn succeeded(
        input: PathBuf,
        base_name: String,
        package: ExportPackage,
        elapsed: Duration,
    ) -> Self {
        Self {
            input,
            base_name,
            success: true,
            package: Some(package),
            error: None,
            error_kind: None,
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }

    /// Record a failed file.
    pub fn failed(input: PathBuf, base_name: String, error: &Error, elapsed: Duration) -> Self {
        Self {
            input,
            base_name,
            success: false,
            package: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
            elapsed_secs: elapsed.as_secs_f64(),
        }
    }

    /// Element counts of the exported document, if any.
    pub fn counts(&self) -> Option<ElementCounts> {
        self.package.as_ref().map(|p| p.counts)
    }

    /// File name of the input, for display.
    pub fn file_name(&self) -> String {
        self.input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.display().to_string())
    }
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// When the report was finalized
    pub generated: DateTime<Local>,

    /// Scanned root directory
    pub root: PathBuf,

    /// Directory holding the per-file packages
    pub output_dir: PathBuf,

    /// Formats requested for every file
    pub formats: FormatSet,

    /// Number of files attempted
    pub total: usize,

    /// Number of files that succeeded
    pub succeeded: usize,

    /// Number of files that failed
    pub failed: usize,

    /// Percentage of files that succeeded
    pub success_rate: f64,

    /// Wall time of the whole run, in seconds
    pub elapsed_secs: f64,

    /// Element counts summed over successful files
    pub counts: ElementCounts,

    /// One outcome per input, sorted by input path
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    /// Finalize a report from collected outcomes.
    pub fn new(
        root: PathBuf,
        output_dir: PathBuf,
        formats: FormatSet,
        mut outcomes: Vec<BatchOutcome>,
        elapsed: Duration,
    ) -> Self {
        outcomes.sort_by(|a, b| a.input.cmp(&b.input));

        let total = outcomes.len();
        let succeeded = outcomes.iter().filter(|o| o.success).count();
        let mut counts = ElementCounts::default();
        for c in outcomes.iter().filter_map(BatchOutcome::counts) {
            counts.merge(&c);
        }
        let success_rate = if total == 0 {
            0.0
        } else {
            succeeded as f64 / total as f64 * 100.0
        };

        Self {
            generated: Local::now(),
            root,
            output_dir,
            formats,
            total,
            succeeded,
            failed: total - succeeded,
            success_rate,
            elapsed_secs: elapsed.as_secs_f64(),
            counts,
            outcomes,
        }
    }

    /// Successful outcomes.
    pub fn successes(&self) -> impl Iterator<Item = &BatchOutcome> {
        self.outcomes.iter().filter(|o| o.success)
    }

    /// Failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &BatchOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    /// Render the human-readable report.
    pub fn to_markdown(&self) -> String {
        let mut md = String::from("# Batch Processing Report\n\n## Summary\n\n");
        md.push_str(&format!("- **Generated**: {}\n", self.generated.format(TIMESTAMP_FORMAT)));
        md.push_str(&format!("- **Root**: `{}`\n", self.root.display()));
        md.push_str(&format!("- **Output**: `{}`\n", self.output_dir.display()));
        let formats: Vec<&str> = self.formats.iter().map(|f| f.name()).collect();
        md.push_str(&format!("- **Formats**: {}\n", formats.join(", ")));
        md.push_str(&format!("- **Total files**: {}\n", self.total));
        md.push_str(&format!("- **Succeeded**: {}\n", self.succeeded));
        md.push_str(&format!("- **Failed**: {}\n", self.failed));
        md.push_str(&format!("- **Success rate**: {:.1}%\n", self.success_rate));
        md.push_str(&format!("- **Total time**: {:.2}s\n\n", self.elapsed_secs));

        if self.succeeded > 0 {
            md.push_str("## Succeeded\n\n");
            md.push_str("| File | Package | Texts | Tables | Pictures | Time |\n");
            md.push_str("| --- | --- | ---: | ---: | ---: | ---: |\n");
            for outcome in self.successes() {
                let counts = outcome.counts().unwrap_or_default();
                md.push_str(&format!(
                    "| {} | `{}/` | {} | {} | {} | {:.2}s |\n",
                    outcome.file_name(),
                    outcome.base_name,
                    counts.texts,
                    counts.tables,
                    counts.pictures,
                    outcome.elapsed_secs
                ));
            }
            md.push('\n');
        }

        if self.failed > 0 {
            md.push_str("## Failed\n\n");
            for outcome in self.failures() {
                md.push_str(&format!("### {}\n\n", outcome.file_name()));
                if let Some(kind) = outcome.error_kind {
                    md.push_str(&format!("- **Kind**: {}\n", kind));
                }
                md.push_str(&format!(
                    "- **Error**: `{}`\n\n",
                    outcome.error.as_deref().unwrap_or("unknown error")
                ));
            }
        }

        md.push_str("## Totals over successful files\n\n");
        md.push_str(&format!("- **Text elements**: {}\n", self.counts.texts));
        md.push_str(&format!("- **Tables**: {}\n", self.counts.tables));
        md.push_str(&format!("- **Pictures**: {}\n\n", self.counts.pictures));

        md.push_str(&format!("JSON report: `{}`\n", REPORT_JSON));
        md
    }

    /// Render the machine-readable report.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write `BATCH_REPORT.md` and `batch_report.json` into `dir`.
    pub fn write(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir).map_err(|e| Error::export(dir, e))?;

        let md_path = dir.join(REPORT_MARKDOWN);
        fs::write(&md_path, self.to_markdown()).map_err(|e| Error::export(&md_path, e))?;

        let json_path = dir.join(REPORT_JSON);
        fs::write(&json_path, self.to_json()?).map_err(|e| Error::export(&json_path, e))?;

        Ok((md_path, json_path))
    }
}

/// Process exit status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every file succeeded, or at least one did
    Success,
    /// Nothing was processed, or a single-file run failed
    Failure,
    /// Every file in a batch failed
    AllFailed,
}

impl ExitStatus {
    /// Status for a finished batch.
    pub fn from_report(report: &BatchReport) -> Self {
        if report.total > 0 && report.succeeded == 0 {
            ExitStatus::AllFailed
        } else {
            ExitStatus::Success
        }
    }

    /// Status for an error that ended a run.
    pub fn from_error(_error: &Error) -> Self {
        ExitStatus::Failure
    }

    /// Numeric process exit code.
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
            ExitStatus::AllFailed => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(tables: usize) -> ExportPackage {
        ExportPackage {
            output_dir: PathBuf::from("out/a"),
            markdown: Some(PathBuf::from("out/a/a.md")),
            html: None,
            json: None,
            images_dir: Some(PathBuf::from("out/a/a_images")),
            readme: PathBuf::from("out/a/README.md"),
            images: Vec::new(),
            counts: ElementCounts {
                texts: 5,
                tables,
                pictures: 3,
            },
        }
    }

    fn report(outcomes: Vec<BatchOutcome>) -> BatchReport {
        BatchReport::new(
            PathBuf::from("in"),
            PathBuf::from("out"),
            FormatSet::default(),
            outcomes,
            Duration::from_millis(1500),
        )
    }

    fn ok(name: &str) -> BatchOutcome {
        BatchOutcome::succeeded(
            PathBuf::from(format!("in/{}.pdf", name)),
            name.to_string(),
            package(1),
            Duration::from_millis(10),
        )
    }

    fn failed(name: &str) -> BatchOutcome {
        BatchOutcome::failed(
            PathBuf::from(format!("in/{}.pdf", name)),
            name.to_string(),
            &Error::conversion(format!("in/{}.pdf", name), "Unknown file format: not a valid PDF"),
            Duration::from_millis(1),
        )
    }

    #[test]
    fn test_report_aggregates_and_sorts() {
        let report = report(vec![failed("b"), ok("a")]);

        assert_eq!(report.total, 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(report.success_rate, 50.0);
        assert_eq!(report.outcomes[0].base_name, "a");
        assert_eq!(
            report.counts,
            ElementCounts {
                texts: 5,
                tables: 1,
                pictures: 3
            }
        );
        assert_eq!(report.outcomes[1].error_kind, Some(ErrorKind::Conversion));
    }

    #[test]
    fn test_report_markdown() {
        let md = report(vec![ok("a"), failed("b")]).to_markdown();
        assert!(md.contains("- **Succeeded**: 1"));
        assert!(md.contains("- **Success rate**: 50.0%"));
        assert!(md.contains("| a.pdf | `a/` | 5 | 1 | 3 |"));
        assert!(md.contains("### b.pdf"));
        assert!(md.contains("- **Kind**: ConversionError"));
        assert!(md.contains("not a valid PDF"));
    }

    #[test]
    fn test_report_write() {
        let dir = tempfile::tempdir().unwrap();
        let (md, json) = report(vec![ok("a")]).write(dir.path()).unwrap();
        assert!(md.ends_with(REPORT_MARKDOWN));

        let parsed: BatchReport =
            serde_json::from_str(&fs::read_to_string(json).unwrap()).unwrap();
        assert_eq!(parsed.succeeded, 1);
        assert_eq!(parsed.outcomes[0].counts().unwrap().tables, 1);
    }

    #[test]
    fn test_exit_status() {
        assert_eq!(ExitStatus::from_report(&report(vec![ok("a")])).code(), 0);
        assert_eq!(ExitStatus::from_report(&report(vec![ok("a"), failed("b")])).code(), 0);
        assert_eq!(ExitStatus::from_report(&report(vec![failed("b")])).code(), 2);
        assert_eq!(
            ExitStatus::from_error(&Error::precondition("no matching files found")).code(),
            1
        );
    }
}
