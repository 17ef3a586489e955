//! Markdown rendering.

use crate::model::{BodyItem, PictureElement, StructuredDocument, TableElement, TextElement, TextLabel};

/// Marker written for pictures without an image file.
pub const IMAGE_PLACEHOLDER: &str = "<!-- image -->";

/// Render a document to Markdown.
///
/// `image_links[i]` is the relative path of picture `i`'s image file; pictures
/// without a link render as [`IMAGE_PLACEHOLDER`]. Image bytes are never
/// inlined.
pub fn render_markdown(doc: &StructuredDocument, image_links: &[Option<String>]) -> String {
    MarkdownRenderer::new(image_links).render(doc)
}

struct MarkdownRenderer<'a> {
    image_links: &'a [Option<String>],
    output: String,
    in_list: bool,
}

impl<'a> MarkdownRenderer<'a> {
    fn new(image_links: &'a [Option<String>]) -> Self {
        Self {
            image_links,
            output: String::new(),
            in_list: false,
        }
    }

    fn render(mut self, doc: &StructuredDocument) -> String {
        for item in doc.iter_body() {
            match item {
                BodyItem::GroupStart(_) => {}
                BodyItem::Text(text) => self.render_text(text),
                BodyItem::Table(table) => self.render_table(table),
                BodyItem::Picture(index, picture) => self.render_picture(index, picture),
            }
        }

        let trimmed = self.output.trim();
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{}\n", trimmed)
        }
    }

    fn start_block(&mut self, list_item: bool) {
        if self.output.is_empty() {
            self.in_list = list_item;
            return;
        }
        if list_item && self.in_list {
            self.output.push('\n');
        } else {
            self.output.push_str("\n\n");
        }
        self.in_list = list_item;
    }

    fn render_text(&mut self, text: &TextElement) {
        if text.is_empty() {
            return;
        }

        self.start_block(text.label == TextLabel::ListItem);
        if let Some(level) = text.heading_level() {
            self.output.push_str(&"#".repeat(level as usize));
            self.output.push(' ');
            self.output.push_str(&escape_markdown(&single_line(&text.text)));
            return;
        }

        match text.label {
            TextLabel::ListItem => {
                let item = text
                    .text
                    .trim_start_matches(['•', '-', '*', '\u{25aa}', '\u{2013}'])
                    .trim_start();
                self.output.push_str("- ");
                self.output.push_str(&escape_markdown(&single_line(item)));
            }
            TextLabel::Caption => {
                self.output.push('*');
                self.output.push_str(&escape_markdown(&single_line(&text.text)));
                self.output.push('*');
            }
            TextLabel::Code => {
                self.output.push_str("```\n");
                self.output.push_str(text.text.trim_end());
                self.output.push_str("\n```");
            }
            _ => self.output.push_str(&escape_markdown(&text.text)),
        }
    }

    fn render_table(&mut self, table: &TableElement) {
        if table.is_empty() {
            return;
        }

        self.start_block(false);
        if let Some(caption) = &table.caption {
            self.output.push('*');
            self.output.push_str(&escape_markdown(&single_line(caption)));
            self.output.push_str("*\n\n");
        }

        let mut lines = Vec::with_capacity(table.num_rows + 1);
        for (i, row) in table.grid().iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .map(|cell| escape_markdown(&single_line(cell)))
                .collect();
            lines.push(format!("| {} |", cells.join(" | ")));

            // The first row is always the header row of a pipe table.
            if i == 0 {
                lines.push(format!("|{}", " --- |".repeat(row.len())));
            }
        }
        self.output.push_str(&lines.join("\n"));
    }

    fn render_picture(&mut self, index: usize, picture: &PictureElement) {
        self.start_block(false);
        match self.image_links.get(index).and_then(Option::as_deref) {
            Some(link) => {
                let alt = picture
                    .caption
                    .as_deref()
                    .map(|c| escape_markdown(&single_line(c)))
                    .unwrap_or_else(|| format!("Image {}", index + 1));
                self.output.push_str(&format!("![{}]({})", alt, link));
            }
            None => self.output.push_str(IMAGE_PLACEHOLDER),
        }
        if let Some(caption) = &picture.caption {
            self.output.push_str("\n\n*");
            self.output.push_str(&escape_markdown(&single_line(caption)));
            self.output.push('*');
        }
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escape characters that Markdown would read as inline syntax.
pub fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' | '<' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
