//! Package README generation.

use crate::convert::ConversionConfig;
use crate::model::ElementCounts;

use super::ExportFormat;

/// Everything the package README describes.
#[derive(Debug, Clone)]
pub struct ReadmeContext<'a> {
    pub base_name: &'a str,
    pub source_file: &'a str,
    pub output_dir_name: &'a str,
    pub generated: &'a str,
    pub counts: ElementCounts,
    pub formats: &'a [ExportFormat],
    pub images_written: usize,
    pub config: &'a ConversionConfig,
}

/// Render the package README.
pub fn render_readme(ctx: &ReadmeContext<'_>) -> String {
    let base = ctx.base_name;
    let mut out = String::new();

    out.push_str(&format!("# Extracted content: {}\n\n", base));

    out.push_str("## Extraction\n\n");
    out.push_str(&format!("- **Extracted**: {}\n", ctx.generated));
    out.push_str(&format!("- **Tool**: docpack {}\n", env!("CARGO_PKG_VERSION")));
    out.push_str(&format!("- **Source file**: {}\n\n", ctx.source_file));

    out.push_str("## Content\n\n");
    out.push_str(&format!("- **Text elements**: {}\n", ctx.counts.texts));
    out.push_str(&format!("- **Tables**: {}\n", ctx.counts.tables));
    out.push_str(&format!("- **Pictures**: {}\n", ctx.counts.pictures));
    out.push_str(&format!("- **Image files written**: {}\n\n", ctx.images_written));

    out.push_str("## Generated files\n\n");
    for format in ctx.formats {
        out.push_str(&format!(
            "- **{}**: `{}`\n",
            format.name().to_uppercase(),
            format.file_name(base)
        ));
    }
    out.push('\n');

    out.push_str("## Directory layout\n\n```\n");
    out.push_str(&format!("{}/\n", ctx.output_dir_name));
    for format in ctx.formats {
        let (file, note) = match format {
            ExportFormat::Markdown => (format.file_name(base), "Markdown version"),
            ExportFormat::Html => (format.file_name(base), "HTML version (self-contained)"),
            ExportFormat::Json => (format.file_name(base), "JSON document structure"),
        };
        out.push_str(&format!("├── {:<36}# {}\n", file, note));
        if *format == ExportFormat::Markdown {
            let images_dir = format!("{}_images/", base);
            out.push_str(&format!("├── {:<36}# Images referenced by the Markdown\n", images_dir));
            out.push_str("│   ├── image_001.png\n│   └── ...\n");
        }
    }
    out.push_str(&format!("└── {:<36}# This file\n", "README.md"));
    out.push_str("```\n\n");

    out.push_str("## Usage\n\n");
    for format in ctx.formats {
        match format {
            ExportFormat::Markdown => {
                out.push_str("### Markdown\n\n");
                out.push_str("- Edit it or pull it into other documents\n");
                out.push_str(&format!("- Images are linked from `{}_images/`\n", base));
                out.push_str("- Diffs well under version control\n\n");
            }
            ExportFormat::Html => {
                out.push_str("### HTML\n\n");
                out.push_str("- Self-contained: images are embedded as base64\n");
                out.push_str("- Open it in any browser, or share it as a single file\n\n");
            }
            ExportFormat::Json => {
                out.push_str("### JSON\n\n");
                out.push_str("- Full document structure for programmatic processing\n");
                out.push_str("- Holds metadata, read order and every element\n");
                out.push_str("- Re-export it with `docpack convert <file>_structure.json`\n\n");
            }
        }
    }

    out.push_str("## Technical details\n\n");
    out.push_str("- **Source format**: PDF\n");
    out.push_str(&format!("- **OCR used**: {}\n", yes_no(ctx.config.ocr())));
    out.push_str(&format!("- **Image scale**: {}x\n", ctx.config.image_scale()));
    out.push_str(&format!(
        "- **Table extraction**: {}\n",
        if ctx.config.table_structure() {
            "enabled"
        } else {
            "disabled"
        }
    ));
    out.push_str(&format!(
        "- **Image extraction**: {}\n",
        if ctx.config.extract_images() {
            "enabled"
        } else {
            "disabled"
        }
    ));

    out
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
