//! JSON structure dump.

use crate::error::Result;
use crate::model::StructuredDocument;

/// Serialize a document as pretty-printed JSON.
///
/// The output is deterministic: the same document always yields the same
/// bytes.
pub fn to_json(doc: &StructuredDocument) -> Result<String> {
    let mut json = serde_json::to_string_pretty(doc)?;
    json.push('\n');
    Ok(json)
}

/// Parse a JSON structure dump.
pub fn from_json(json: &str) -> Result<StructuredDocument> {
    let doc: StructuredDocument = serde_json::from_str(json)?;
    doc.validate()?;
    Ok(doc)
}
