//! Text element types.

use serde::{Deserialize, Serialize};

/// Kind of a text element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextLabel {
    /// Document title
    Title,
    /// Section heading (see [`TextElement::level`])
    SectionHeader,
    /// Body text
    #[default]
    Paragraph,
    /// Item of a bulleted or numbered list
    ListItem,
    /// Caption of a table or picture
    Caption,
    /// Preformatted code
    Code,
}

impl TextLabel {
    /// Whether this label renders as a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, TextLabel::Title | TextLabel::SectionHeader)
    }
}

impl std::fmt::Display for TextLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextLabel::Title => write!(f, "title"),
            TextLabel::SectionHeader => write!(f, "section_header"),
            TextLabel::Paragraph => write!(f, "paragraph"),
            TextLabel::ListItem => write!(f, "list_item"),
            TextLabel::Caption => write!(f, "caption"),
            TextLabel::Code => write!(f, "code"),
        }
    }
}

/// A labelled piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    /// Element kind
    pub label: TextLabel,

    /// Text content
    pub text: String,

    /// Heading level (1-6) for section headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,

    /// Source page (1-indexed, 0 = unknown)
    #[serde(default)]
    pub page: u32,
}

impl TextElement {
    /// Create a text element with the given label.
    pub fn new(label: TextLabel, text: impl Into<String>, page: u32) -> Self {
        Self {
            label,
            text: text.into(),
            level: None,
            page,
        }
    }

    /// Create a body paragraph.
    pub fn paragraph(text: impl Into<String>, page: u32) -> Self {
        Self::new(TextLabel::Paragraph, text, page)
    }

    /// Create a section header. The level is clamped to 1-6.
    pub fn heading(text: impl Into<String>, level: u8, page: u32) -> Self {
        Self {
            level: Some(level.clamp(1, 6)),
            ..Self::new(TextLabel::SectionHeader, text, page)
        }
    }

    /// Create a list item.
    pub fn list_item(text: impl Into<String>, page: u32) -> Self {
        Self::new(TextLabel::ListItem, text, page)
    }

    /// Create a caption.
    pub fn caption(text: impl Into<String>, page: u32) -> Self {
        Self::new(TextLabel::Caption, text, page)
    }

    /// Heading level used for rendering; titles are level 1.
    pub fn heading_level(&self) -> Option<u8> {
        match self.label {
            TextLabel::Title => Some(1),
            TextLabel::SectionHeader => Some(self.level.unwrap_or(2).clamp(1, 6)),
            _ => None,
        }
    }

    /// Check if the element carries no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_clamped() {
        let h = TextElement::heading("Intro", 9, 1);
        assert_eq!(h.level, Some(6));
        assert_eq!(h.heading_level(), Some(6));

        let title = TextElement::new(TextLabel::Title, "Course", 1);
        assert_eq!(title.heading_level(), Some(1));

        let p = TextElement::paragraph("Body", 1);
        assert_eq!(p.heading_level(), None);
    }

    #[test]
    fn test_label_serde_names() {
        let json = serde_json::to_string(&TextLabel::SectionHeader).unwrap();
        assert_eq!(json, "\"section_header\"");
        assert_eq!(TextLabel::ListItem.to_string(), "list_item");
    }
}
