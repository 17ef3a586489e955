//! Standalone HTML rendering with embedded images.

use crate::model::{BodyItem, PictureElement, StructuredDocument, TableElement, TextElement, TextLabel};

use super::markdown::IMAGE_PLACEHOLDER;

const STYLE: &str = r#"        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
            line-height: 1.6;
            max-width: 900px;
            margin: 0 auto;
            padding: 20px;
            color: #333;
            background-color: #f5f5f5;
        }
        .content {
            background-color: white;
            padding: 40px;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        h1, h2, h3, h4, h5, h6 { color: #2c3e50; margin-top: 1.5em; margin-bottom: 0.5em; }
        h1 { font-size: 2.5em; border-bottom: 3px solid #3498db; padding-bottom: 10px; }
        h2 { font-size: 2em; border-bottom: 2px solid #3498db; padding-bottom: 8px; }
        h3 { font-size: 1.5em; }
        img { max-width: 100%; height: auto; display: block; margin: 20px auto; border-radius: 4px; }
        figcaption, .caption { color: #555; font-style: italic; text-align: center; }
        table { border-collapse: collapse; width: 100%; margin: 20px 0; background-color: white; }
        th, td { border: 1px solid #ddd; padding: 12px; text-align: left; }
        th { background-color: #3498db; color: white; font-weight: bold; }
        tr:nth-child(even) { background-color: #f9f9f9; }
        pre { background-color: #f4f4f4; padding: 15px; border-radius: 5px; overflow-x: auto; }
        ul { padding-left: 30px; }
        li { margin: 5px 0; }
        .metadata {
            color: #7f8c8d;
            font-size: 0.9em;
            margin-bottom: 30px;
            padding: 15px;
            background-color: #ecf0f1;
            border-radius: 5px;
        }
"#;

/// Render the full standalone page.
///
/// `generated` appears only inside the `<div class="metadata">` block; the
/// rest of the page depends on `doc` alone.
pub fn render_html(doc: &StructuredDocument, generated: &str) -> String {
    let title = escape_html(doc.metadata.title.as_deref().unwrap_or(&doc.name));
    let source = escape_html(doc.metadata.source_file.as_deref().unwrap_or(&doc.name));

    let mut page = String::with_capacity(4096);
    page.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    page.push_str("    <meta charset=\"UTF-8\">\n");
    page.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    page.push_str(&format!("    <title>{}</title>\n", title));
    page.push_str("    <style>\n");
    page.push_str(STYLE);
    page.push_str("    </style>\n</head>\n<body>\n    <div class=\"content\">\n");
    page.push_str("        <div class=\"metadata\">\n");
    page.push_str(&format!(
        "            <strong>Extracted:</strong> {}<br>\n",
        escape_html(generated)
    ));
    page.push_str(&format!("            <strong>Source:</strong> {}<br>\n", source));
    page.push_str(&format!(
        "            <strong>Tool:</strong> docpack {}\n",
        env!("CARGO_PKG_VERSION")
    ));
    page.push_str("        </div>\n");
    page.push_str(&render_body(doc));
    page.push_str("    </div>\n</body>\n</html>\n");
    page
}

/// Render only the document content as an HTML fragment.
pub fn render_body(doc: &StructuredDocument) -> String {
    let mut out = String::new();
    let mut in_list = false;

    for item in doc.iter_body() {
        let is_list_item = matches!(item, BodyItem::Text(t) if t.label == TextLabel::ListItem && !t.is_empty());
        if in_list && !is_list_item {
            out.push_str("</ul>\n");
            in_list = false;
        }

        match item {
            BodyItem::GroupStart(_) => {}
            BodyItem::Text(text) => {
                if is_list_item && !in_list {
                    out.push_str("<ul>\n");
                    in_list = true;
                }
                render_text(&mut out, text);
            }
            BodyItem::Table(table) => render_table(&mut out, table),
            BodyItem::Picture(_, picture) => render_picture(&mut out, picture),
        }
    }
    if in_list {
        out.push_str("</ul>\n");
    }

    out
}

fn render_text(out: &mut String, text: &TextElement) {
    if text.is_empty() {
        return;
    }
    let content = escape_html(text.text.trim());

    if let Some(level) = text.heading_level() {
        out.push_str(&format!("<h{0}>{1}</h{0}>\n", level, content));
        return;
    }

    match text.label {
        TextLabel::ListItem => out.push_str(&format!("<li>{}</li>\n", content)),
        TextLabel::Caption => out.push_str(&format!("<p class=\"caption\">{}</p>\n", content)),
        TextLabel::Code => out.push_str(&format!("<pre><code>{}</code></pre>\n", content)),
        _ => out.push_str(&format!("<p>{}</p>\n", content.replace('\n', "<br>\n"))),
    }
}

fn render_table(out: &mut String, table: &TableElement) {
    if table.is_empty() {
        return;
    }

    let grid = table.grid();
    let header_rows = table.header_rows().min(grid.len());

    out.push_str("<table>\n");
    if let Some(caption) = &table.caption {
        out.push_str(&format!("<caption>{}</caption>\n", escape_html(caption)));
    }
    if header_rows > 0 {
        out.push_str("<thead>\n");
        for row in &grid[..header_rows] {
            render_row(out, row, "th");
        }
        out.push_str("</thead>\n");
    }
    out.push_str("<tbody>\n");
    for row in &grid[header_rows..] {
        render_row(out, row, "td");
    }
    out.push_str("</tbody>\n</table>\n");
}

fn render_row(out: &mut String, row: &[String], tag: &str) {
    out.push_str("<tr>");
    for cell in row {
        out.push_str(&format!("<{0}>{1}</{0}>", tag, escape_html(cell)));
    }
    out.push_str("</tr>\n");
}

fn render_picture(out: &mut String, picture: &PictureElement) {
    let caption = picture.caption.as_deref().map(escape_html);
    match picture.image.as_ref().filter(|_| picture.has_image()) {
        Some(image) => {
            out.push_str("<figure>\n");
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\">\n",
                image.to_data_uri(),
                caption.as_deref().unwrap_or("")
            ));
            if let Some(caption) = &caption {
                out.push_str(&format!("<figcaption>{}</figcaption>\n", caption));
            }
            out.push_str("</figure>\n");
        }
        None => {
            out.push_str(IMAGE_PLACEHOLDER);
            out.push('\n');
            if let Some(caption) = &caption {
                out.push_str(&format!("<p class=\"caption\">{}</p>\n", caption));
            }
        }
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ImageData, SpanCell};

    fn sample() -> StructuredDocument {
        let mut doc = StructuredDocument::new("lecture");
        doc.start_page(1);
        doc.add_text(TextElement::heading("Rust & <Safety>", 1, 1));
        doc.add_text(TextElement::list_item("one", 1));
        doc.add_text(TextElement::list_item("two", 1));
        doc.add_text(TextElement::paragraph("after", 1));
        doc.add_table(TableElement::from_span_rows(
            vec![
                vec![SpanCell::new("Head").colspan(2).header(true)],
                vec![SpanCell::new("x"), SpanCell::new("y")],
            ],
            1,
        ));
        doc.add_picture(PictureElement::new(1, ImageData::png(vec![1, 2, 3])).with_caption("Fig"));
        doc.add_picture(PictureElement::placeholder(1));
        doc
    }

    #[test]
    fn test_render_body() {
        let body = render_body(&sample());
        assert!(body.contains("<h1>Rust &amp; &lt;Safety&gt;</h1>"));
        assert!(body.contains("<ul>\n<li>one</li>\n<li>two</li>\n</ul>\n<p>after</p>"));
        assert!(body.contains("<thead>\n<tr><th>Head</th><th>Head</th></tr>\n</thead>"));
        assert!(body.contains("<tbody>\n<tr><td>x</td><td>y</td></tr>\n</tbody>"));
        assert!(body.contains("<img src=\"data:image/png;base64,AQID\" alt=\"Fig\">"));
        assert!(body.contains("<figcaption>Fig</figcaption>"));
        assert!(body.contains(IMAGE_PLACEHOLDER));
    }

    #[test]
    fn test_page_embeds_images_only() {
        let html = render_html(&sample(), "2026-01-01 00:00:00");
        let srcs: Vec<&str> = html.split("src=\"").skip(1).collect();
        assert_eq!(srcs.len(), 1);
        assert!(srcs.iter().all(|s| s.starts_with("data:")));
    }

    #[test]
    fn test_timestamp_only_in_metadata_block() {
        let a = render_html(&sample(), "2026-01-01 00:00:00");
        let b = render_html(&sample(), "2027-06-30 12:34:56");
        assert_ne!(a, b);
        assert_eq!(
            a.replace("2026-01-01 00:00:00", ""),
            b.replace("2027-06-30 12:34:56", "")
        );
        let metadata_end = a.find("</div>").unwrap();
        assert!(a.find("2026-01-01").unwrap() < metadata_end);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href='x'>\"&\"</a>"), "&lt;a href=&#39;x&#39;&gt;&quot;&amp;&quot;&lt;/a&gt;");
    }
}
