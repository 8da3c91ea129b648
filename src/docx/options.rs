//! Conversion options.

/// Font size in pixels a run starts from when nothing sets one (12 pt).
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// Options for converting a document.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Inherited font size in pixels. Subscript/superscript scaling and
    /// double-line decoration offsets start from this size when a run sets
    /// no explicit size before them.
    pub default_font_size: f64,

    /// Give every table cell a 1px black border
    pub cell_borders: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            default_font_size: DEFAULT_FONT_SIZE,
            cell_borders: true,
        }
    }
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inherited font size. Non-positive or non-finite values are
    /// ignored.
    pub fn with_default_font_size(mut self, size: f64) -> Self {
        if size.is_finite() && size > 0.0 {
            self.default_font_size = size;
        }
        self
    }

    /// Enable or disable cell borders.
    pub fn with_cell_borders(mut self, enabled: bool) -> Self {
        self.cell_borders = enabled;
        self
    }
}
