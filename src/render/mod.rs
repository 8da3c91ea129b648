//! Output rendering for converted documents.
//!
//! # Example
//!
//! ```no_run
//! use docxflow::{convert_file, render::*};
//!
//! let doc = convert_file("document.docx")?;
//!
//! // Render to plain text
//! let text = to_text(&doc.document);
//!
//! // Render to JSON
//! let json = to_json(&doc, JsonFormat::Pretty)?;
//! # Ok::<(), docxflow::Error>(())
//! ```

mod json;
mod options;
mod text;

pub use json::{to_json, to_json_default, to_json_with_options, JsonFormat};
pub use options::RenderOptions;
pub use text::{to_text, to_text_with_options};
