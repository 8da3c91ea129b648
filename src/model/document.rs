//! Conversion result.

use super::{LabelRegistry, Node, NodeKind};
use serde::{Deserialize, Serialize};

/// A converted flow document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedDocument {
    /// Root of the flow tree, always a [`NodeKind::Document`] node
    pub document: Node,

    /// Editable controls discovered in the document
    #[serde(default)]
    pub labels: LabelRegistry,

    /// Whether any external hyperlink was seen, including ones inside
    /// controls that produce no node. Callers use this to decide once
    /// whether link activation needs wiring up at all.
    #[serde(default)]
    pub has_hyperlinks: bool,
}

impl Default for ConvertedDocument {
    fn default() -> Self {
        Self {
            document: Node::document(),
            labels: LabelRegistry::default(),
            has_hyperlinks: false,
        }
    }
}

impl ConvertedDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level blocks of the document.
    pub fn blocks(&self) -> &[Node] {
        &self.document.children
    }

    /// Check if the document has no blocks.
    pub fn is_empty(&self) -> bool {
        self.document.children.is_empty()
    }

    /// Extract all text content, one line per paragraph.
    pub fn plain_text(&self) -> String {
        crate::render::to_text(&self.document)
    }

    /// External hyperlink targets in document order.
    pub fn hyperlink_targets(&self) -> Vec<&str> {
        self.document
            .descendants()
            .filter_map(|node| match &node.kind {
                NodeKind::Hyperlink { target } => Some(target.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Names of all placeholders in document order.
    pub fn placeholder_names(&self) -> Vec<&str> {
        self.document
            .descendants()
            .filter_map(Node::placeholder_name)
            .collect()
    }
}
