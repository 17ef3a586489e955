//! Input format detection.

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Detected input format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputFormat {
    /// PDF with its header version (e.g., "1.7")
    Pdf { version: String },
    /// JSON structure dump
    StructureJson,
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputFormat::Pdf { version } => write!(f, "PDF {}", version),
            InputFormat::StructureJson => write!(f, "structure JSON"),
        }
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3;

/// Some producers put junk before the header; readers accept it within the
/// first kilobyte.
const HEADER_SEARCH_LEN: usize = 1024;

/// Detect the format of a file from its leading bytes.
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Option<InputFormat>> {
    let mut file = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_SEARCH_LEN);
    file.by_ref()
        .take(HEADER_SEARCH_LEN as u64)
        .read_to_end(&mut header)?;
    Ok(detect_format_from_bytes(&header))
}

/// Detect the format of a byte buffer.
pub fn detect_format_from_bytes(data: &[u8]) -> Option<InputFormat> {
    if let Some(version) = pdf_version(data) {
        return Some(InputFormat::Pdf { version });
    }

    let first = data.iter().find(|b| !b.is_ascii_whitespace())?;
    if *first == b'{' {
        return Some(InputFormat::StructureJson);
    }

    None
}

fn pdf_version(data: &[u8]) -> Option<String> {
    let window = &data[..data.len().min(HEADER_SEARCH_LEN)];
    let start = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)?;
    let version_bytes = window.get(start + PDF_MAGIC.len()..start + PDF_MAGIC.len() + VERSION_LEN)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();
    is_valid_version(&version).then_some(version)
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Check if bytes start like a PDF.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    pdf_version(data).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_pdf() {
        let format = detect_format_from_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(
            format,
            InputFormat::Pdf {
                version: "1.7".to_string()
            }
        );
        assert_eq!(format.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_detect_pdf_with_leading_junk() {
        assert!(is_pdf_bytes(b"\r\n\x00garbage%PDF-2.0\n"));
    }

    #[test]
    fn test_detect_rejects_other_bytes() {
        assert_eq!(detect_format_from_bytes(b"Not a PDF at all"), None);
        assert_eq!(detect_format_from_bytes(b"%PDF"), None);
        assert_eq!(detect_format_from_bytes(b"%PDF-abc"), None);
        assert_eq!(detect_format_from_bytes(b""), None);
    }

    #[test]
    fn test_detect_structure_json() {
        assert_eq!(
            detect_format_from_bytes(b"  \n{\"schema_name\": \"DocpackDocument\"}"),
            Some(InputFormat::StructureJson)
        );
    }

    #[test]
    fn test_version_validation() {
        assert!(is_valid_version("1.0"));
        assert!(is_valid_version("2.0"));
        assert!(!is_valid_version("10.0"));
        assert!(!is_valid_version("abc"));
    }
}
