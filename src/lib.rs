//! # docxflow
//!
//! Streaming conversion of Word (.docx) documents into a rich-text flow tree.
//!
//! The main document part is read in a single forward pass; no DOM of the
//! source XML is ever built. The result is an owned tree of paragraphs,
//! spans, hyperlinks and tables, plus a registry of the editable controls
//! found in the document.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docxflow::{convert_file, render};
//!
//! let doc = convert_file("document.docx")?;
//! println!("{}", render::to_text(&doc.document));
//!
//! for label in &doc.labels.entries {
//!     println!("{} ({} children)", label.tag, label.children.len());
//! }
//! # Ok::<(), docxflow::Error>(())
//! ```
//!
//! ## Custom packages
//!
//! Anything that can hand out a main document stream and resolve
//! relationship ids implements [`Package`]:
//!
//! ```no_run
//! use docxflow::docx::{ConvertOptions, DocxConverter};
//! use docxflow::OoxmlContainer;
//!
//! let package = OoxmlContainer::open("report.docx")?;
//! let doc = DocxConverter::from_package(package)
//!     .with_options(ConvertOptions::new().with_cell_borders(false))
//!     .convert()?;
//! # Ok::<(), docxflow::Error>(())
//! ```

pub mod container;
pub mod docx;
pub mod error;
pub mod model;
pub mod reader;
pub mod render;

// Re-exports
pub use container::{OoxmlContainer, Package, Relationship, Relationships};
pub use docx::{ConvertOptions, DocxConverter};
pub use error::{Error, Result};
pub use model::{
    Color, ConvertedDocument, Label, LabelKind, LabelRegistry, Node, NodeKind, ParagraphStyle,
    RunStyle, TextAlignment,
};

use std::path::Path;

/// Convert a .docx file.
///
/// # Example
///
/// ```no_run
/// let doc = docxflow::convert_file("document.docx")?;
/// println!("Blocks: {}", doc.blocks().len());
/// # Ok::<(), docxflow::Error>(())
/// ```
pub fn convert_file(path: impl AsRef<Path>) -> Result<ConvertedDocument> {
    DocxConverter::open(path)?.convert()
}

/// Convert a .docx file held in memory.
///
/// # Example
///
/// ```no_run
/// let data = std::fs::read("document.docx")?;
/// let doc = docxflow::convert_bytes(&data)?;
/// # Ok::<(), docxflow::Error>(())
/// ```
pub fn convert_bytes(data: &[u8]) -> Result<ConvertedDocument> {
    DocxConverter::from_bytes(data.to_vec())?.convert()
}

/// Extract plain text from a .docx file.
///
/// # Example
///
/// ```no_run
/// let text = docxflow::extract_text("document.docx")?;
/// println!("{}", text);
/// # Ok::<(), docxflow::Error>(())
/// ```
pub fn extract_text(path: impl AsRef<Path>) -> Result<String> {
    let doc = convert_file(path)?;
    Ok(doc.plain_text())
}

/// Convert a .docx file to JSON.
pub fn to_json(path: impl AsRef<Path>, format: render::JsonFormat) -> Result<String> {
    let doc = convert_file(path)?;
    render::to_json(&doc, format)
}
