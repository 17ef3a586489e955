//! Structured document model.
//!
//! [`StructuredDocument`] is the single shape every conversion backend
//! produces and every exporter consumes: ordered text, table, and picture
//! collections plus a hierarchical body that fixes the read order.

mod document;
mod picture;
mod table;
mod text;

pub use document::{
    BodyItem, BodyNode, ElementCounts, GroupNode, Metadata, StructuredDocument, SCHEMA_NAME,
    SCHEMA_VERSION,
};
pub use picture::{ImageData, PictureElement};
pub use table::{SpanCell, TableCell, TableElement};
pub use text::{TextElement, TextLabel};
