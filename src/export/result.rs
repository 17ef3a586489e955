//! Export results.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::ElementCounts;

/// Files written for one exported document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPackage {
    /// Directory holding every artifact
    pub output_dir: PathBuf,

    /// Markdown file, when selected
    pub markdown: Option<PathBuf>,

    /// HTML file, when selected
    pub html: Option<PathBuf>,

    /// JSON structure dump, when selected
    pub json: Option<PathBuf>,

    /// Image directory referenced by the Markdown file
    pub images_dir: Option<PathBuf>,

    /// Package README
    pub readme: PathBuf,

    /// Image files written into `images_dir`
    pub images: Vec<PathBuf>,

    /// Element counts of the exported document
    pub counts: ElementCounts,
}

impl ExportPackage {
    /// Every regular file written, document files first.
    pub fn files(&self) -> Vec<&Path> {
        let mut files: Vec<&Path> = [&self.markdown, &self.html, &self.json]
            .into_iter()
            .flatten()
            .map(PathBuf::as_path)
            .collect();
        files.push(&self.readme);
        files.extend(self.images.iter().map(PathBuf::as_path));
        files
    }

    /// Number of image files written.
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_lists_documents_readme_and_images() {
        let package = ExportPackage {
            output_dir: PathBuf::from("out"),
            markdown: Some(PathBuf::from("out/a.md")),
            html: None,
            json: Some(PathBuf::from("out/a_structure.json")),
            images_dir: Some(PathBuf::from("out/a_images")),
            readme: PathBuf::from("out/README.md"),
            images: vec![PathBuf::from("out/a_images/image_001.png")],
            counts: ElementCounts::default(),
        };

        assert_eq!(
            package.files(),
            vec![
                Path::new("out/a.md"),
                Path::new("out/a_structure.json"),
                Path::new("out/README.md"),
                Path::new("out/a_images/image_001.png"),
            ]
        );
        assert_eq!(package.image_count(), 1);
    }
}
