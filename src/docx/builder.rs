//! Flow tree construction on top of the streaming walker.
//!
//! [`DocumentBuilder`] keeps a stack of open nodes. The top of the stack is
//! the write cursor: entering a structural element pushes a fresh node,
//! leaving it pops the node and appends it to the new top. Leaf content is
//! appended to the top directly. Because every push is paired with a pop on
//! all exit paths, the stack always mirrors the lexical nesting of the
//! source.
//!
//! Inside a structured document control the builder switches to
//! [`ContentMode::Opaque`]: the control becomes a single placeholder node,
//! its content is still walked (so nested controls register their labels)
//! but nothing inside it reaches the tree.

use std::io::BufRead;

use crate::container::Package;
use crate::error::Result;
use crate::model::{
    CellBorder, Color, ConvertedDocument, LabelRegistry, Node, NodeKind, Registration,
};
use crate::reader::{
    walk_block_control, walk_inline_content, walk_inline_control, walk_paragraph, walk_run,
    walk_table, walk_table_cell, walk_table_row, Handler, NameTable, QName, Subtree,
    WORDML_NAMESPACE,
};

use super::options::ConvertOptions;
use super::properties::{CellMerge, PropertyReader};
use super::row_span::RowSpanGrid;

/// Whether parsed content is added to the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    Visible,
    /// Inside a control: content is parsed but dropped.
    Opaque,
}

/// Builds a [`ConvertedDocument`] from walker callbacks.
pub struct DocumentBuilder<'p> {
    package: &'p dyn Package,
    properties: PropertyReader,
    options: ConvertOptions,
    /// Open nodes; the document root is at the bottom.
    stack: Vec<Node>,
    mode: ContentMode,
    /// One grid per open table. Tables inside controls are checked but
    /// never normalized, since they do not reach the tree.
    tables: Vec<RowSpanGrid>,
    /// Merge information of each open cell.
    cells: Vec<CellMerge>,
    labels: LabelRegistry,
    has_hyperlinks: bool,
}

impl<'p> DocumentBuilder<'p> {
    /// Create a builder, registering the names it needs into `table`.
    pub fn new(package: &'p dyn Package, options: ConvertOptions, table: &mut NameTable) -> Self {
        let wordml = table.add(WORDML_NAMESPACE);
        Self {
            package,
            properties: PropertyReader::register(table, wordml),
            options,
            stack: vec![Node::document()],
            mode: ContentMode::Visible,
            tables: Vec::new(),
            cells: Vec::new(),
            labels: LabelRegistry::new(),
            has_hyperlinks: false,
        }
    }

    /// Close any nodes still open and return the result.
    pub fn finish(mut self) -> ConvertedDocument {
        while self.stack.len() > 1 {
            if let Some(node) = self.stack.pop() {
                self.append(node);
            }
        }
        let document = self.stack.pop().unwrap_or_else(Node::document);

        log::info!(
            "converted document: {} blocks, {} labels, hyperlinks: {}",
            document.children.len(),
            self.labels.len(),
            self.has_hyperlinks
        );

        ConvertedDocument {
            document,
            labels: self.labels,
            has_hyperlinks: self.has_hyperlinks,
        }
    }

    /// Append `node` to the write cursor, unless content is opaque.
    fn append(&mut self, node: Node) {
        if self.mode == ContentMode::Opaque {
            return;
        }
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
    }

    /// Make `node` the write cursor while `f` runs, then pop it.
    ///
    /// The pop happens whether or not `f` succeeds; the node is only handed
    /// back on success.
    fn scoped<F>(&mut self, node: Node, f: F) -> Result<Option<Node>>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.stack.push(node);
        let result = f(self);
        let node = self.stack.pop();
        result.map(|()| node)
    }

    fn with_node<F>(&mut self, node: Node, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if let Some(node) = self.scoped(node, f)? {
            self.append(node);
        }
        Ok(())
    }

    /// Walk a control as a single placeholder with opaque content.
    fn control<F>(&mut self, placeholder: Node, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let outer = self.mode;
        let node = self.scoped(placeholder, |builder| {
            builder.mode = ContentMode::Opaque;
            f(builder)
        });
        self.mode = outer;

        if let Some(node) = node? {
            self.append(node);
        }
        Ok(())
    }

    fn register_label(&mut self, tag: &str, alias: Option<String>) {
        match self.labels.register(tag, alias) {
            Registration::TopLevel | Registration::Nested => {}
            Registration::MissingParent => {
                log::debug!("dropping label {:?}: parent entry not registered", tag)
            }
            Registration::Unrecognized => log::trace!("control tag {:?} is not a label", tag),
        }
    }

    /// External target of the relationship `id`, if any.
    fn hyperlink_target(&self, id: &str) -> Option<String> {
        match self.package.relationship(id) {
            Some(rel) if rel.external => Some(rel.target.clone()),
            Some(rel) => {
                log::debug!("hyperlink {} targets {} inside the package", id, rel.target);
                None
            }
            None => {
                log::debug!("hyperlink {} has no relationship", id);
                None
            }
        }
    }
}

impl Handler for DocumentBuilder<'_> {
    fn paragraph<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        self.with_node(Node::paragraph(), |b| walk_paragraph(b, reader))
    }

    fn paragraph_properties<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        match self.stack.last_mut().and_then(Node::paragraph_style_mut) {
            Some(style) => self.properties.apply_paragraph(reader, style),
            None => Ok(()),
        }
    }

    fn table<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        self.tables.push(RowSpanGrid::new());
        let table = self.scoped(Node::new(NodeKind::Table), |b| walk_table(b, reader));
        let grid = self.tables.pop().unwrap_or_default();

        if let Some(mut table) = table? {
            if self.mode == ContentMode::Visible {
                grid.setup_table(&mut table)?;
                self.append(table);
            }
        }
        Ok(())
    }

    fn table_row<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        if let Some(grid) = self.tables.last_mut() {
            grid.add_row();
        }
        self.with_node(Node::new(NodeKind::TableRow), |b| walk_table_row(b, reader))
    }

    fn table_cell<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        let mut cell = Node::table_cell();
        if self.options.cell_borders {
            if let Some(props) = cell.cell_props_mut() {
                props.border = Some(CellBorder {
                    color: Color::BLACK,
                    thickness: 1.0,
                });
            }
        }

        self.cells.push(CellMerge::default());
        let cell = self.scoped(cell, |b| walk_table_cell(b, reader));
        let merge = self.cells.pop().unwrap_or_default();

        if let Some(cell) = cell? {
            if let Some(grid) = self.tables.last_mut() {
                grid.add_cell(merge.column_span, merge.continues)?;
            }
            self.append(cell);
        }
        Ok(())
    }

    fn cell_properties<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        let merge = self.properties.read_cell(reader)?;
        if let Some(props) = self.stack.last_mut().and_then(Node::cell_props_mut) {
            props.column_span = merge.column_span;
        }
        if let Some(current) = self.cells.last_mut() {
            *current = merge;
        }
        Ok(())
    }

    fn block_control<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        let placeholder = Node::new(NodeKind::BlockPlaceholder {
            name: String::new(),
        });
        self.control(placeholder, |b| walk_block_control(b, reader))
    }

    fn inline_control<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        let placeholder = Node::new(NodeKind::InlinePlaceholder {
            name: String::new(),
        });
        self.control(placeholder, |b| walk_inline_control(b, reader))
    }

    fn control_properties<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        let control = self.properties.read_control(reader)?;
        let tag = control.tag.unwrap_or_default();

        if let Some(node) = self.stack.last_mut() {
            if let NodeKind::BlockPlaceholder { name } | NodeKind::InlinePlaceholder { name } =
                &mut node.kind
            {
                name.clone_from(&tag);
            }
        }
        self.register_label(&tag, control.alias);
        Ok(())
    }

    fn hyperlink<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        let elements = reader.vocab().elements;
        let target = reader
            .attribute(QName::new(elements.relationships, elements.id))
            .filter(|id| !id.is_empty())
            .and_then(|id| self.hyperlink_target(id));

        match target {
            Some(target) => {
                self.has_hyperlinks = true;
                let link = Node::new(NodeKind::Hyperlink { target });
                self.with_node(link, |b| walk_inline_content(b, reader))
            }
            None => walk_inline_content(self, reader),
        }
    }

    fn run<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        self.with_node(Node::span(), |b| walk_run(b, reader))
    }

    fn run_properties<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        let inherited = self.options.default_font_size;
        match self.stack.last_mut().and_then(Node::run_style_mut) {
            Some(style) => self.properties.apply_run(reader, style, inherited),
            None => Ok(()),
        }
    }

    fn line_break<R: BufRead>(&mut self, _reader: &mut Subtree<'_, R>) -> Result<()> {
        self.append(Node::new(NodeKind::LineBreak));
        Ok(())
    }

    fn tab<R: BufRead>(&mut self, _reader: &mut Subtree<'_, R>) -> Result<()> {
        self.append(Node::new(NodeKind::Tab));
        Ok(())
    }

    fn text<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        let text = reader.read_string()?;
        self.append(Node::text(text));
        Ok(())
    }
}
