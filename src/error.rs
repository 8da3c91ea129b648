//! Error types for the docxflow library.

use std::io;
use thiserror::Error;

/// Result type alias for docxflow operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a conversion.
///
/// Missing optional structure (no body, unresolved hyperlink ids, orphaned
/// label entries) is never reported here; the converter degrades instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Malformed or truncated XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// A required package component is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// The table grid violates the vertical merge invariants.
    #[error("Invalid table structure: {0}")]
    InvalidTable(String),

    /// Error during rendering.
    #[error("Render error: {0}")]
    Render(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}
