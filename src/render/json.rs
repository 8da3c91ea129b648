//! JSON renderer implementation.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{ConvertedDocument, Node};

use super::options::RenderOptions;

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Converted document without its label registry.
#[derive(Serialize)]
struct TreeOnly<'a> {
    document: &'a Node,
    has_hyperlinks: bool,
}

fn serialize<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Compact => serde_json::to_string(value),
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
    };
    json.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Convert a document to JSON.
pub fn to_json(doc: &ConvertedDocument, format: JsonFormat) -> Result<String> {
    serialize(doc, format)
}

/// Convert a document to JSON with default formatting.
pub fn to_json_default(doc: &ConvertedDocument) -> Result<String> {
    to_json(doc, JsonFormat::Pretty)
}

/// Convert a document to JSON with render options.
pub fn to_json_with_options(doc: &ConvertedDocument, options: &RenderOptions) -> Result<String> {
    if options.include_labels {
        return to_json(doc, options.json_format);
    }
    let tree = TreeOnly {
        document: &doc.document,
        has_hyperlinks: doc.has_hyperlinks,
    };
    serialize(&tree, options.json_format)
}
