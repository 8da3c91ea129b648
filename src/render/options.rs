//! Rendering options configuration.

use super::json::JsonFormat;

/// Options for rendering converted documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// JSON layout
    pub json_format: JsonFormat,

    /// Include the label registry in JSON output
    pub include_labels: bool,

    /// Emit a line for paragraphs without text
    pub include_empty_paragraphs: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            json_format: JsonFormat::Pretty,
            include_labels: true,
            include_empty_paragraphs: false,
        }
    }
}

impl RenderOptions {
    /// Create new render options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the JSON layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Include or omit labels in JSON output.
    pub fn with_labels(mut self, include: bool) -> Self {
        self.include_labels = include;
        self
    }

    /// Keep empty paragraphs in text output.
    pub fn with_empty_paragraphs(mut self, include: bool) -> Self {
        self.include_empty_paragraphs = include;
        self
    }
}
