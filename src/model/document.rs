//! Document-level types.

use serde::{Deserialize, Serialize};

use super::{PictureElement, TableElement, TextElement};
use crate::error::{Error, Result};

/// Schema identifier written into JSON structure dumps.
pub const SCHEMA_NAME: &str = "DocpackDocument";

/// Schema version written into JSON structure dumps.
pub const SCHEMA_VERSION: &str = "1.0.0";

/// A converted document.
///
/// Elements live in flat per-kind collections; `body` references them by
/// index and defines the read order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredDocument {
    /// Schema identifier
    pub schema_name: String,

    /// Schema version
    pub version: String,

    /// Source base name (file stem)
    pub name: String,

    /// Document metadata
    #[serde(default)]
    pub metadata: Metadata,

    /// Text elements
    #[serde(default)]
    pub texts: Vec<TextElement>,

    /// Table elements
    #[serde(default)]
    pub tables: Vec<TableElement>,

    /// Picture elements
    #[serde(default)]
    pub pictures: Vec<PictureElement>,

    /// Read-order hierarchy
    pub body: GroupNode,
}

impl StructuredDocument {
    /// Create an empty document.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema_name: SCHEMA_NAME.to_string(),
            version: SCHEMA_VERSION.to_string(),
            name: name.into(),
            metadata: Metadata::default(),
            texts: Vec::new(),
            tables: Vec::new(),
            pictures: Vec::new(),
            body: GroupNode::new("body", None),
        }
    }

    /// Open a new page group; subsequent elements are appended to it.
    pub fn start_page(&mut self, number: u32) {
        self.body
            .children
            .push(BodyNode::Group(GroupNode::new("page", Some(number))));
    }

    /// Append a text element in read order.
    pub fn add_text(&mut self, text: TextElement) {
        let index = self.texts.len();
        self.texts.push(text);
        self.current_group().children.push(BodyNode::Text { index });
    }

    /// Append a table element in read order.
    pub fn add_table(&mut self, table: TableElement) {
        let index = self.tables.len();
        self.tables.push(table);
        self.current_group().children.push(BodyNode::Table { index });
    }

    /// Append a picture element in read order.
    pub fn add_picture(&mut self, picture: PictureElement) {
        let index = self.pictures.len();
        self.pictures.push(picture);
        self.current_group().children.push(BodyNode::Picture { index });
    }

    fn current_group(&mut self) -> &mut GroupNode {
        if matches!(self.body.children.last(), Some(BodyNode::Group(_))) {
            match self.body.children.last_mut() {
                Some(BodyNode::Group(group)) => group,
                _ => unreachable!("last body node was checked to be a group"),
            }
        } else {
            &mut self.body
        }
    }

    /// Element counts.
    pub fn counts(&self) -> ElementCounts {
        ElementCounts {
            texts: self.texts.len(),
            tables: self.tables.len(),
            pictures: self.pictures.len(),
        }
    }

    /// Check if the document has no elements.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.tables.is_empty() && self.pictures.is_empty()
    }

    /// Walk the body in read order.
    pub fn iter_body(&self) -> Vec<BodyItem<'_>> {
        let mut items = Vec::new();
        self.collect_items(&self.body, &mut items);
        items
    }

    fn collect_items<'a>(&'a self, group: &'a GroupNode, items: &mut Vec<BodyItem<'a>>) {
        for node in &group.children {
            match node {
                BodyNode::Group(child) => {
                    items.push(BodyItem::GroupStart(child));
                    self.collect_items(child, items);
                }
                BodyNode::Text { index } => {
                    if let Some(text) = self.texts.get(*index) {
                        items.push(BodyItem::Text(text));
                    }
                }
                BodyNode::Table { index } => {
                    if let Some(table) = self.tables.get(*index) {
                        items.push(BodyItem::Table(table));
                    }
                }
                BodyNode::Picture { index } => {
                    if let Some(picture) = self.pictures.get(*index) {
                        items.push(BodyItem::Picture(*index, picture));
                    }
                }
            }
        }
    }

    /// Check that every body reference points at an existing element and
    /// that every table's cells fit its grid.
    pub fn validate(&self) -> Result<()> {
        fn check(doc: &StructuredDocument, group: &GroupNode) -> std::result::Result<(), String> {
            for node in &group.children {
                let (kind, index, len) = match node {
                    BodyNode::Group(child) => {
                        check(doc, child)?;
                        continue;
                    }
                    BodyNode::Text { index } => ("text", *index, doc.texts.len()),
                    BodyNode::Table { index } => ("table", *index, doc.tables.len()),
                    BodyNode::Picture { index } => ("picture", *index, doc.pictures.len()),
                };
                if index >= len {
                    return Err(format!(
                        "body references {} #{} but document has {}",
                        kind, index, len
                    ));
                }
            }
            Ok(())
        }

        if self.schema_name != SCHEMA_NAME {
            return Err(Error::Json(format!(
                "unexpected schema '{}', expected '{}'",
                self.schema_name, SCHEMA_NAME
            )));
        }
        for (i, table) in self.tables.iter().enumerate() {
            table
                .check_bounds()
                .map_err(|reason| Error::Json(format!("table #{}: {}", i, reason)))?;
        }
        check(self, &self.body).map_err(Error::Json)
    }

    /// Plain text of all text elements in read order.
    pub fn plain_text(&self) -> String {
        self.iter_body()
            .into_iter()
            .filter_map(|item| match item {
                BodyItem::Text(t) => Some(t.text.clone()),
                BodyItem::Table(t) => Some(t.plain_text()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Source format version (e.g., "1.7" for PDF 1.7)
    pub format_version: Option<String>,

    /// Source file name (e.g., "lecture.pdf")
    #[serde(default)]
    pub source_file: Option<String>,

    /// Total number of pages
    pub page_count: u32,
}

/// A group in the body hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupNode {
    /// Group kind ("body", "page")
    pub label: String,

    /// Page number for page groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Child nodes in read order
    #[serde(default)]
    pub children: Vec<BodyNode>,
}

impl GroupNode {
    /// Create an empty group.
    pub fn new(label: impl Into<String>, page: Option<u32>) -> Self {
        Self {
            label: label.into(),
            page,
            children: Vec::new(),
        }
    }
}

/// A node in the body hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BodyNode {
    /// Nested group
    Group(GroupNode),
    /// Reference into `texts`
    Text { index: usize },
    /// Reference into `tables`
    Table { index: usize },
    /// Reference into `pictures`
    Picture { index: usize },
}

/// An element visited while walking the body.
#[derive(Debug, Clone, Copy)]
pub enum BodyItem<'a> {
    /// A nested group begins
    GroupStart(&'a GroupNode),
    Text(&'a TextElement),
    Table(&'a TableElement),
    /// Picture with its index in `pictures`
    Picture(usize, &'a PictureElement),
}

/// Number of elements per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementCounts {
    pub texts: usize,
    pub tables: usize,
    pub pictures: usize,
}

impl ElementCounts {
    /// Merge another count into this one.
    pub fn merge(&mut self, other: &ElementCounts) {
        self.texts += other.texts;
        self.tables += other.tables;
        self.pictures += other.pictures;
    }
}
