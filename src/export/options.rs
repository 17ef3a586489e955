//! Export formats.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A single export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// `<base>.md` with images referenced from `<base>_images/`
    Markdown,
    /// `<base>.html`, standalone with embedded images
    Html,
    /// `<base>_structure.json`
    Json,
}

impl ExportFormat {
    /// All formats in canonical order.
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Markdown, ExportFormat::Html, ExportFormat::Json];

    /// Lowercase format name.
    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "markdown",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
        }
    }

    /// Output file name for a document base name.
    pub fn file_name(&self, base_name: &str) -> String {
        match self {
            ExportFormat::Markdown => format!("{}.md", base_name),
            ExportFormat::Html => format!("{}.html", base_name),
            ExportFormat::Json => format!("{}_structure.json", base_name),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "html" | "htm" => Ok(ExportFormat::Html),
            "json" => Ok(ExportFormat::Json),
            other => Err(Error::precondition(format!(
                "unknown export format '{}' (expected markdown, html or json)",
                other
            ))),
        }
    }
}

/// A set of export formats.
///
/// Defaults to Markdown only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatSet {
    markdown: bool,
    html: bool,
    json: bool,
}

impl FormatSet {
    /// No formats.
    pub fn empty() -> Self {
        Self {
            markdown: false,
            html: false,
            json: false,
        }
    }

    /// Every format.
    pub fn all() -> Self {
        Self {
            markdown: true,
            html: true,
            json: true,
        }
    }

    /// A single format.
    pub fn only(format: ExportFormat) -> Self {
        Self::empty().with(format)
    }

    /// Add a format and return self.
    pub fn with(mut self, format: ExportFormat) -> Self {
        match format {
            ExportFormat::Markdown => self.markdown = true,
            ExportFormat::Html => self.html = true,
            ExportFormat::Json => self.json = true,
        }
        self
    }

    /// Check if a format is selected.
    pub fn contains(&self, format: ExportFormat) -> bool {
        match format {
            ExportFormat::Markdown => self.markdown,
            ExportFormat::Html => self.html,
            ExportFormat::Json => self.json,
        }
    }

    /// Check if no format is selected.
    pub fn is_empty(&self) -> bool {
        !(self.markdown || self.html || self.json)
    }

    /// Selected formats in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = ExportFormat> + '_ {
        ExportFormat::ALL.into_iter().filter(|f| self.contains(*f))
    }
}

impl Default for FormatSet {
    fn default() -> Self {
        Self::only(ExportFormat::Markdown)
    }
}

impl FromIterator<ExportFormat> for FormatSet {
    fn from_iter<I: IntoIterator<Item = ExportFormat>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), FormatSet::with)
    }
}

impl Serialize for FormatSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for FormatSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let formats = Vec::<ExportFormat>::deserialize(deserializer)?;
        Ok(formats.into_iter().collect())
    }
}
