//! Document tree nodes.

use super::{CellBorder, ParagraphStyle, RunStyle};
use serde::{Deserialize, Serialize};

/// Properties of a table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellProps {
    /// Number of grid columns covered
    #[serde(default = "default_span")]
    pub column_span: u32,

    /// Number of rows covered, after vertical merges are folded in
    #[serde(default = "default_span")]
    pub row_span: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub border: Option<CellBorder>,
}

fn default_span() -> u32 {
    1
}

impl Default for CellProps {
    fn default() -> Self {
        Self {
            column_span: 1,
            row_span: 1,
            border: None,
        }
    }
}

/// What a node is, along with its own attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    Document,
    Paragraph(ParagraphStyle),
    Span(RunStyle),
    Hyperlink { target: String },
    LineBreak,
    Tab,
    Text { text: String },
    Table,
    TableRow,
    TableCell(CellProps),
    /// Opaque block-level interactive control
    BlockPlaceholder { name: String },
    /// Opaque inline interactive control
    InlinePlaceholder { name: String },
}

/// A node in the flow document tree. Children are owned and kept in
/// document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: NodeKind,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
        }
    }

    pub fn document() -> Self {
        Self::new(NodeKind::Document)
    }

    pub fn paragraph() -> Self {
        Self::new(NodeKind::Paragraph(ParagraphStyle::default()))
    }

    pub fn span() -> Self {
        Self::new(NodeKind::Span(RunStyle::default()))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text { text: text.into() })
    }

    pub fn table_cell() -> Self {
        Self::new(NodeKind::TableCell(CellProps::default()))
    }

    /// Append a child and return a mutable reference to it.
    pub fn push(&mut self, child: Node) -> &mut Node {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Builder-style append.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn paragraph_style(&self) -> Option<&ParagraphStyle> {
        match &self.kind {
            NodeKind::Paragraph(style) => Some(style),
            _ => None,
        }
    }

    pub fn paragraph_style_mut(&mut self) -> Option<&mut ParagraphStyle> {
        match &mut self.kind {
            NodeKind::Paragraph(style) => Some(style),
            _ => None,
        }
    }

    pub fn run_style(&self) -> Option<&RunStyle> {
        match &self.kind {
            NodeKind::Span(style) => Some(style),
            _ => None,
        }
    }

    pub fn run_style_mut(&mut self) -> Option<&mut RunStyle> {
        match &mut self.kind {
            NodeKind::Span(style) => Some(style),
            _ => None,
        }
    }

    pub fn cell_props(&self) -> Option<&CellProps> {
        match &self.kind {
            NodeKind::TableCell(props) => Some(props),
            _ => None,
        }
    }

    pub fn cell_props_mut(&mut self) -> Option<&mut CellProps> {
        match &mut self.kind {
            NodeKind::TableCell(props) => Some(props),
            _ => None,
        }
    }

    /// Name of a placeholder node.
    pub fn placeholder_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::BlockPlaceholder { name } | NodeKind::InlinePlaceholder { name } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// Concatenated text of this subtree. Tabs and line breaks are kept as
    /// `\t` and `\n`.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text { text } => out.push_str(text),
            NodeKind::Tab => out.push('\t'),
            NodeKind::LineBreak => out.push('\n'),
            _ => {
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Depth-first, pre-order walk over this node and its descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Count nodes in this subtree matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&Node) -> bool) -> usize {
        self.descendants().filter(|&n| predicate(n)).count()
    }
}

/// Iterator returned by [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
