//! Slide de-duplication.
//!
//! Presentation exports often repeat a slide several times while revealing
//! one more bullet each time. A [`Deduplicator`] groups a document's text
//! by page ("slides") and removes that repetition using one of three
//! [`DedupStrategy`] variants.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use md5::{Digest, Md5};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{StructuredDocument, TextLabel};

/// Default similarity above which two slides count as the same slide.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Default minimum length of a text to take part in de-duplication.
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 10;

/// How repeated slides are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupStrategy {
    /// Compare each slide to the one before it and keep only new items
    Sequential,
    /// Drop slides whose whole content was already seen
    Hashing,
    /// Merge runs of similar slides into sections
    #[default]
    SmartMerge,
}

impl DedupStrategy {
    /// Strategy name as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            DedupStrategy::Sequential => "sequential",
            DedupStrategy::Hashing => "hashing",
            DedupStrategy::SmartMerge => "smart-merge",
        }
    }
}

impl fmt::Display for DedupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DedupStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "sequential" => Ok(DedupStrategy::Sequential),
            "hashing" => Ok(DedupStrategy::Hashing),
            "smart-merge" | "smart" => Ok(DedupStrategy::SmartMerge),
            other => Err(Error::precondition(format!(
                "unknown dedup strategy: {}",
                other
            ))),
        }
    }
}

/// One text of a slide.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlideItem {
    pub label: TextLabel,
    pub text: String,
}

impl SlideItem {
    fn hash(&self) -> String {
        md5_hex(&self.text)
    }
}

/// The texts of one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slide {
    pub page: u32,
    pub items: Vec<SlideItem>,
    /// MD5 of the item texts joined by newlines
    pub hash: String,
    /// Holds only the items new relative to the previous slide
    pub incremental: bool,
    /// Similarity to the previous slide, for incremental slides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl Slide {
    fn new(page: u32, items: Vec<SlideItem>) -> Self {
        let hash = slide_hash(&items);
        Self {
            page,
            items,
            hash,
            incremental: false,
            similarity: None,
        }
    }
}

/// A run of similar slides merged together.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub start_page: u32,
    pub end_page: u32,
    pub items: Vec<SlideItem>,
}

/// Result of de-duplication, shaped by the strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "entries", rename_all = "snake_case")]
pub enum DedupOutput {
    Slides(Vec<Slide>),
    Sections(Vec<Section>),
}

impl DedupOutput {
    /// Number of items kept.
    pub fn item_count(&self) -> usize {
        match self {
            DedupOutput::Slides(slides) => slides.iter().map(|s| s.items.len()).sum(),
            DedupOutput::Sections(sections) => sections.iter().map(|s| s.items.len()).sum(),
        }
    }
}

/// Item counts before and after de-duplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    pub original_items: usize,
    pub deduplicated_items: usize,
    pub removed: usize,
}

impl DedupStats {
    /// Share of removed items in percent; 0 when there were no items.
    pub fn reduction_percent(&self) -> f64 {
        if self.original_items == 0 {
            0.0
        } else {
            self.removed as f64 / self.original_items as f64 * 100.0
        }
    }
}

/// De-duplicated content of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DedupResult {
    pub name: String,
    pub strategy: DedupStrategy,
    pub output: DedupOutput,
    pub stats: DedupStats,
}

impl DedupResult {
    /// Render the result and its statistics as Markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.name));
        out.push_str(&format!("*De-duplicated with strategy: {}*\n\n", self.strategy));
        out.push_str("---\n\n");

        match &self.output {
            DedupOutput::Sections(sections) => {
                for (i, section) in sections.iter().enumerate() {
                    if section.start_page == section.end_page {
                        out.push_str(&format!("## Section {} (slide {})\n\n", i + 1, section.start_page));
                    } else {
                        out.push_str(&format!(
                            "## Section {} (slides {}-{})\n\n",
                            i + 1,
                            section.start_page,
                            section.end_page
                        ));
                    }
                    write_items(&mut out, &section.items);
                    out.push_str("---\n\n");
                }
            }
            DedupOutput::Slides(slides) => {
                for slide in slides {
                    if slide.incremental {
                        out.push_str(&format!("### Additions to slide {}\n", slide.page));
                    } else {
                        out.push_str(&format!("## Slide {}\n", slide.page));
                    }
                    if let Some(similarity) = slide.similarity {
                        out.push_str(&format!("*Similarity to previous: {:.1}%*\n", similarity * 100.0));
                    }
                    out.push('\n');
                    write_items(&mut out, &slide.items);
                    out.push_str("---\n\n");
                }
            }
        }

        out.push_str("## De-duplication statistics\n\n");
        out.push_str(&format!("- Original items: {}\n", self.stats.original_items));
        out.push_str(&format!("- After de-duplication: {}\n", self.stats.deduplicated_items));
        out.push_str(&format!("- Duplicates removed: {}\n", self.stats.removed));
        if self.stats.original_items > 0 {
            out.push_str(&format!("- Reduction: {:.1}%\n", self.stats.reduction_percent()));
        }
        out
    }
}

fn write_items(out: &mut String, items: &[SlideItem]) {
    for item in items {
        match item.label {
            label if label.is_heading() => {
                out.push_str(&format!("### {}\n\n", item.text));
            }
            TextLabel::ListItem => {
                out.push_str(&format!("- {}\n\n", item.text));
            }
            _ => {
                out.push_str(&format!("{}\n\n", item.text));
            }
        }
    }
}

/// Removes repeated slide content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deduplicator {
    similarity_threshold: f64,
    min_text_length: usize,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
        }
    }
}

impl Deduplicator {
    /// Create a deduplicator. The threshold must lie in `[0, 1]`.
    pub fn new(similarity_threshold: f64, min_text_length: usize) -> Result<Self> {
        if !(0.0..=1.0).contains(&similarity_threshold) {
            return Err(Error::precondition(format!(
                "similarity threshold must be between 0 and 1, got {}",
                similarity_threshold
            )));
        }
        Ok(Self {
            similarity_threshold,
            min_text_length,
        })
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    pub fn min_text_length(&self) -> usize {
        self.min_text_length
    }

    /// Group the document's texts into slides, one per page in page order.
    ///
    /// Texts shorter than the minimum length (after trimming) are ignored,
    /// and so are pages left without any text.
    pub fn slides(&self, doc: &StructuredDocument) -> Vec<Slide> {
        let mut by_page: BTreeMap<u32, Vec<SlideItem>> = BTreeMap::new();
        for text in &doc.texts {
            let trimmed = text.text.trim();
            if trimmed.chars().count() < self.min_text_length {
                continue;
            }
            by_page.entry(text.page).or_default().push(SlideItem {
                label: text.label,
                text: trimmed.to_string(),
            });
        }

        by_page
            .into_iter()
            .map(|(page, items)| Slide::new(page, items))
            .collect()
    }

    /// De-duplicate `doc` with `strategy`.
    pub fn run(&self, doc: &StructuredDocument, strategy: DedupStrategy) -> DedupResult {
        let slides = self.slides(doc);
        let original_items = slides.iter().map(|s| s.items.len()).sum();

        let output = match strategy {
            DedupStrategy::Sequential => DedupOutput::Slides(self.sequential(slides)),
            DedupStrategy::Hashing => DedupOutput::Slides(hashing(slides)),
            DedupStrategy::SmartMerge => DedupOutput::Sections(self.smart_merge(slides)),
        };

        let deduplicated_items = output.item_count();
        log::info!(
            "De-duplicated {} with {}: {} -> {} items",
            doc.name,
            strategy,
            original_items,
            deduplicated_items
        );

        DedupResult {
            name: doc.name.clone(),
            strategy,
            output,
            stats: DedupStats {
                original_items,
                deduplicated_items,
                removed: original_items - deduplicated_items,
            },
        }
    }

    fn sequential(&self, slides: Vec<Slide>) -> Vec<Slide> {
        let mut kept = Vec::with_capacity(slides.len());
        let mut previous: Option<Slide> = None;

        for slide in slides {
            let Some(prev) = previous.as_ref() else {
                kept.push(slide.clone());
                previous = Some(slide);
                continue;
            };

            let score = similarity(&prev.items, &slide.items);
            if score >= self.similarity_threshold {
                let seen: HashSet<String> = prev.items.iter().map(SlideItem::hash).collect();
                let fresh: Vec<SlideItem> = slide
                    .items
                    .iter()
                    .filter(|item| !seen.contains(&item.hash()))
                    .cloned()
                    .collect();
                if !fresh.is_empty() {
                    let mut incremental = Slide::new(slide.page, fresh);
                    incremental.incremental = true;
                    incremental.similarity = Some(score);
                    kept.push(incremental);
                }
            } else {
                kept.push(slide.clone());
            }
            previous = Some(slide);
        }

        kept
    }

    fn smart_merge(&self, slides: Vec<Slide>) -> Vec<Section> {
        let mut sections: Vec<Section> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();

        for slide in slides {
            let merge = sections.last().is_some_and(|current| {
                similarity(&current.items, &slide.items) >= self.similarity_threshold
            });

            match sections.last_mut() {
                Some(current) if merge => {
                    for item in slide.items {
                        if seen.insert(item.hash()) {
                            current.items.push(item);
                        }
                    }
                    current.end_page = slide.page;
                }
                _ => {
                    seen = slide.items.iter().map(SlideItem::hash).collect();
                    sections.push(Section {
                        start_page: slide.page,
                        end_page: slide.page,
                        items: slide.items,
                    });
                }
            }
        }

        sections
    }
}

fn hashing(slides: Vec<Slide>) -> Vec<Slide> {
    let mut seen = HashSet::new();
    slides
        .into_iter()
        .filter(|slide| seen.insert(slide.hash.clone()))
        .collect()
}

/// Similarity of two item lists: `2·M / (|a| + |b|)` where `M` is the
/// length of their longest common subsequence of texts. Two empty lists
/// are identical.
pub fn similarity(a: &[SlideItem], b: &[SlideItem]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * lcs_len(a, b) as f64 / total as f64
}

fn lcs_len(a: &[SlideItem], b: &[SlideItem]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for x in a {
        let mut diagonal = 0;
        for (j, y) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if x.text == y.text {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}

fn md5_hex(text: &str) -> String {
    format!("{:x}", Md5::digest(text.trim().as_bytes()))
}

fn slide_hash(items: &[SlideItem]) -> String {
    let joined: Vec<&str> = items.iter().map(|i| i.text.as_str()).collect();
    format!("{:x}", Md5::digest(joined.join("\n").as_bytes()))
}
