//! Input discovery and package naming.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;

use crate::error::{Error, Result};

use super::report::{REPORT_JSON, REPORT_MARKDOWN};

/// A discovered input with its package base name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub base_name: String,
}

/// Find files under `root` whose extension is in `extensions`.
///
/// Only the top level is scanned unless `recursive` is set. `skip` (the
/// batch output directory) is never descended into. The result is sorted
/// by path.
pub fn discover_files(
    root: &Path,
    recursive: bool,
    extensions: &[String],
    skip: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let skip = skip.and_then(|p| fs::canonicalize(p).ok());
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    let mut is_root = true;

    while let Some(dir) = pending.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if is_root => {
                return Err(Error::precondition(format!(
                    "cannot read directory '{}': {}",
                    dir.display(),
                    e
                )))
            }
            Err(e) => {
                warn!("Skipping unreadable directory {}: {}", dir.display(), e);
                continue;
            }
        };
        is_root = false;

        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                if !recursive {
                    continue;
                }
                if skip.is_some() && fs::canonicalize(&path).ok() == skip {
                    debug!("Skipping output directory {}", path.display());
                    continue;
                }
                pending.push(path);
            } else if path.is_file() && has_extension(&path, extensions) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}

/// Pair each file with a unique package base name.
///
/// Top-level files use their stem; nested files prefix the stem with their
/// parent directories joined by `_`. Names that collide case-insensitively
/// get `_2`, `_3`, ... suffixes in input order. The batch report file
/// names are reserved so no package directory can shadow them.
pub fn assign_base_names(root: &Path, files: &[PathBuf]) -> Vec<InputFile> {
    let mut taken: HashSet<String> = [REPORT_MARKDOWN, REPORT_JSON]
        .iter()
        .map(|name| name.to_lowercase())
        .collect();

    files
        .iter()
        .map(|path| {
            let candidate = sanitize_base_name(&raw_base_name(root, path));
            let mut name = candidate.clone();
            let mut n = 1;
            while !taken.insert(name.to_lowercase()) {
                n += 1;
                name = format!("{}_{}", candidate, n);
            }
            InputFile {
                path: path.clone(),
                base_name: name,
            }
        })
        .collect()
}

fn raw_base_name(root: &Path, path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let parents: Vec<String> = path
        .strip_prefix(root)
        .ok()
        .and_then(Path::parent)
        .map(|parent| {
            parent
                .components()
                .filter_map(|c| match c {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();

    if parents.is_empty() {
        stem
    } else {
        format!("{}_{}", parents.join("_"), stem)
    }
}

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w.\-]+").expect("valid regex"))
}

/// Make a string safe to use as a file and directory name.
pub fn sanitize_base_name(name: &str) -> String {
    let cleaned = unsafe_chars().replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_matches(|c| c == '_' || c == '.');
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned.to_string()
    }
}
