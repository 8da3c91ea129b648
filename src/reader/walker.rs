//! Streaming tree walker for WordprocessingML main document parts.
//!
//! The walker makes exactly one forward pass. It finds `w:document`, then
//! `w:body`, and classifies every element below through dispatch tables keyed
//! by qualified name. A recognized element is handed to the matching
//! [`Handler`] hook together with a [`Subtree`] bounded to that element; an
//! unrecognized one is skipped along with everything inside it.
//!
//! Every hook has a default. Structural hooks default to the `walk_*`
//! functions in this module, which keep descending; leaf and property hooks
//! default to doing nothing. An implementor overrides a hook and calls the
//! matching `walk_*` function to keep the default descent.

use std::collections::HashMap;
use std::io::BufRead;

use super::cursor::{Subtree, XmlCursor};
use super::names::{name_set, NameTable, QName};
use crate::error::Result;

/// WordprocessingML main namespace.
pub const WORDML_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Office document relationships namespace (`r:id` attributes).
pub const RELATIONSHIPS_NAMESPACE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

name_set! {
    /// Namespaces and element names the walker itself compares against.
    pub struct ElementNames {
        wordml = "http://schemas.openxmlformats.org/wordprocessingml/2006/main",
        relationships = "http://schemas.openxmlformats.org/officeDocument/2006/relationships",
        document = "document",
        body = "body",
        paragraph = "p",
        table = "tbl",
        control = "sdt",
        simple_field = "fldSimple",
        hyperlink = "hyperlink",
        run = "r",
        inserted = "ins",
        smart_tag = "smartTag",
        line_break = "br",
        tab = "tab",
        text = "t",
        table_row = "tr",
        table_cell = "tc",
        control_content = "sdtContent",
        paragraph_properties = "pPr",
        run_properties = "rPr",
        control_properties = "sdtPr",
        cell_properties = "tcPr",
        id = "id",
    }
}

/// Elements allowed where blocks are expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockElement {
    Paragraph,
    Table,
    Control,
}

/// Elements allowed inside a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineElement {
    /// Wrapper whose inline children are read as if they were siblings
    /// (`w:fldSimple`, `w:ins`, `w:smartTag`).
    Container,
    Hyperlink,
    Run,
    Control,
}

/// Leaf elements inside a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunContent {
    Break,
    Tab,
    Text,
}

/// Registered names plus the dispatch tables built from them.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub table: NameTable,
    pub elements: ElementNames,
    block: HashMap<QName, BlockElement>,
    inline: HashMap<QName, InlineElement>,
    run_content: HashMap<QName, RunContent>,
}

impl Vocabulary {
    /// Register the walker's names into `table` and build the dispatch
    /// tables. Names registered beforehand by a handler are kept.
    pub fn new(mut table: NameTable) -> Self {
        let elements = ElementNames::register(&mut table);
        let w = |local| QName::new(elements.wordml, local);

        let block = HashMap::from([
            (w(elements.paragraph), BlockElement::Paragraph),
            (w(elements.table), BlockElement::Table),
            (w(elements.control), BlockElement::Control),
        ]);
        let inline = HashMap::from([
            (w(elements.simple_field), InlineElement::Container),
            (w(elements.inserted), InlineElement::Container),
            (w(elements.smart_tag), InlineElement::Container),
            (w(elements.hyperlink), InlineElement::Hyperlink),
            (w(elements.run), InlineElement::Run),
            (w(elements.control), InlineElement::Control),
        ]);
        let run_content = HashMap::from([
            (w(elements.line_break), RunContent::Break),
            (w(elements.tab), RunContent::Tab),
            (w(elements.text), RunContent::Text),
        ]);

        Self {
            table,
            elements,
            block,
            inline,
            run_content,
        }
    }

    /// Qualified name in the WordprocessingML namespace.
    pub fn wordml(&self, local: super::Atom) -> QName {
        QName::new(self.elements.wordml, local)
    }

    pub fn block_element(&self, name: QName) -> Option<BlockElement> {
        self.block.get(&name).copied()
    }

    pub fn inline_element(&self, name: QName) -> Option<InlineElement> {
        self.inline.get(&name).copied()
    }

    pub fn run_content(&self, name: QName) -> Option<RunContent> {
        self.run_content.get(&name).copied()
    }
}

/// Per-element hooks invoked by the walker.
///
/// Each hook receives a reader positioned on the element's start tag and
/// bounded to its subtree.
pub trait Handler: Sized {
    fn document<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        walk_document(self, reader)
    }

    fn paragraph<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        walk_paragraph(self, reader)
    }

    fn paragraph_properties<R: BufRead>(&mut self, _reader: &mut Subtree<'_, R>) -> Result<()> {
        Ok(())
    }

    fn table<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        walk_table(self, reader)
    }

    fn table_row<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        walk_table_row(self, reader)
    }

    fn table_cell<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        walk_table_cell(self, reader)
    }

    fn cell_properties<R: BufRead>(&mut self, _reader: &mut Subtree<'_, R>) -> Result<()> {
        Ok(())
    }

    fn block_control<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        walk_block_control(self, reader)
    }

    fn block_control_content<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        walk_block_content(self, reader)
    }

    fn inline_control<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        walk_inline_control(self, reader)
    }

    fn inline_control_content<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        walk_inline_content(self, reader)
    }

    fn control_properties<R: BufRead>(&mut self, _reader: &mut Subtree<'_, R>) -> Result<()> {
        Ok(())
    }

    fn hyperlink<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        walk_inline_content(self, reader)
    }

    fn run<R: BufRead>(&mut self, reader: &mut Subtree<'_, R>) -> Result<()> {
        walk_run(self, reader)
    }

    fn run_properties<R: BufRead>(&mut self, _reader: &mut Subtree<'_, R>) -> Result<()> {
        Ok(())
    }

    fn line_break<R: BufRead>(&mut self, _reader: &mut Subtree<'_, R>) -> Result<()> {
        Ok(())
    }

    fn tab<R: BufRead>(&mut self, _reader: &mut Subtree<'_, R>) -> Result<()> {
        Ok(())
    }

    fn text<R: BufRead>(&mut self, _reader: &mut Subtree<'_, R>) -> Result<()> {
        Ok(())
    }
}

/// Walk a main document part in a single forward pass.
///
/// Top-level siblings are scanned until `w:document` is found; a stream
/// without one produces no callbacks at all.
pub fn read<H: Handler, R: BufRead>(source: R, vocab: Vocabulary, handler: &mut H) -> Result<()> {
    let mut cursor = XmlCursor::new(source, vocab);
    let document = {
        let elements = &cursor.vocab().elements;
        QName::new(elements.wordml, elements.document)
    };

    while cursor.advance()? {
        if cursor.is(document) {
            return cursor.read_subtree(|reader| handler.document(reader));
        }
    }

    log::debug!("no w:document element in main part");
    Ok(())
}

/// Scan for `w:body` and walk its blocks.
pub fn walk_document<H: Handler, R: BufRead>(handler: &mut H, reader: &mut Subtree<'_, R>) -> Result<()> {
    let body = reader.vocab().wordml(reader.vocab().elements.body);
    while reader.read()? {
        if reader.is(body) {
            return reader.read_subtree(|body| {
                while body.read()? {
                    dispatch_block(handler, body)?;
                }
                Ok(())
            });
        }
    }

    log::debug!("no w:body element in document");
    Ok(())
}

/// Route a block-level element to its hook, or skip it.
pub fn dispatch_block<H: Handler, R: BufRead>(handler: &mut H, reader: &mut Subtree<'_, R>) -> Result<()> {
    if !reader.is_element() {
        return Ok(());
    }
    match reader.qname().and_then(|name| reader.vocab().block_element(name)) {
        Some(BlockElement::Paragraph) => reader.read_subtree(|r| handler.paragraph(r)),
        Some(BlockElement::Table) => reader.read_subtree(|r| handler.table(r)),
        Some(BlockElement::Control) => reader.read_subtree(|r| handler.block_control(r)),
        None => skip_unrecognized(reader),
    }
}

/// Route an inline-level element to its hook, or skip it.
pub fn dispatch_inline<H: Handler, R: BufRead>(handler: &mut H, reader: &mut Subtree<'_, R>) -> Result<()> {
    if !reader.is_element() {
        return Ok(());
    }
    match reader.qname().and_then(|name| reader.vocab().inline_element(name)) {
        Some(InlineElement::Container) => reader.read_subtree(|r| walk_inline_content(handler, r)),
        Some(InlineElement::Hyperlink) => reader.read_subtree(|r| handler.hyperlink(r)),
        Some(InlineElement::Run) => reader.read_subtree(|r| handler.run(r)),
        Some(InlineElement::Control) => reader.read_subtree(|r| handler.inline_control(r)),
        None => skip_unrecognized(reader),
    }
}

/// Route a run content element to its hook, or skip it.
pub fn dispatch_run_content<H: Handler, R: BufRead>(
    handler: &mut H,
    reader: &mut Subtree<'_, R>,
) -> Result<()> {
    if !reader.is_element() {
        return Ok(());
    }
    match reader.qname().and_then(|name| reader.vocab().run_content(name)) {
        Some(RunContent::Break) => reader.read_subtree(|r| handler.line_break(r)),
        Some(RunContent::Tab) => reader.read_subtree(|r| handler.tab(r)),
        Some(RunContent::Text) => reader.read_subtree(|r| handler.text(r)),
        None => skip_unrecognized(reader),
    }
}

fn skip_unrecognized<R: BufRead>(reader: &mut Subtree<'_, R>) -> Result<()> {
    log::trace!("skipping <{}>", reader.name_for_log());
    reader.skip()
}

pub fn walk_paragraph<H: Handler, R: BufRead>(handler: &mut H, reader: &mut Subtree<'_, R>) -> Result<()> {
    let properties = reader.vocab().wordml(reader.vocab().elements.paragraph_properties);
    while reader.read()? {
        if reader.is(properties) {
            reader.read_subtree(|r| handler.paragraph_properties(r))?;
        } else {
            dispatch_inline(handler, reader)?;
        }
    }
    Ok(())
}

pub fn walk_table<H: Handler, R: BufRead>(handler: &mut H, reader: &mut Subtree<'_, R>) -> Result<()> {
    let row = reader.vocab().wordml(reader.vocab().elements.table_row);
    while reader.read()? {
        if reader.is(row) {
            reader.read_subtree(|r| handler.table_row(r))?;
        } else if reader.is_element() {
            skip_unrecognized(reader)?;
        }
    }
    Ok(())
}

pub fn walk_table_row<H: Handler, R: BufRead>(handler: &mut H, reader: &mut Subtree<'_, R>) -> Result<()> {
    let cell = reader.vocab().wordml(reader.vocab().elements.table_cell);
    while reader.read()? {
        if reader.is(cell) {
            reader.read_subtree(|r| handler.table_cell(r))?;
        } else if reader.is_element() {
            skip_unrecognized(reader)?;
        }
    }
    Ok(())
}

pub fn walk_table_cell<H: Handler, R: BufRead>(handler: &mut H, reader: &mut Subtree<'_, R>) -> Result<()> {
    let properties = reader.vocab().wordml(reader.vocab().elements.cell_properties);
    while reader.read()? {
        if reader.is(properties) {
            reader.read_subtree(|r| handler.cell_properties(r))?;
        } else {
            dispatch_block(handler, reader)?;
        }
    }
    Ok(())
}

pub fn walk_block_control<H: Handler, R: BufRead>(handler: &mut H, reader: &mut Subtree<'_, R>) -> Result<()> {
    walk_control(handler, reader, |h, r| h.block_control_content(r))
}

pub fn walk_inline_control<H: Handler, R: BufRead>(handler: &mut H, reader: &mut Subtree<'_, R>) -> Result<()> {
    walk_control(handler, reader, |h, r| h.inline_control_content(r))
}

fn walk_control<H, R, F>(handler: &mut H, reader: &mut Subtree<'_, R>, mut content: F) -> Result<()>
where
    H: Handler,
    R: BufRead,
    F: FnMut(&mut H, &mut Subtree<'_, R>) -> Result<()>,
{
    let elements = reader.vocab().elements;
    let properties = reader.vocab().wordml(elements.control_properties);
    let body = reader.vocab().wordml(elements.control_content);
    while reader.read()? {
        if reader.is(properties) {
            reader.read_subtree(|r| handler.control_properties(r))?;
        } else if reader.is(body) {
            reader.read_subtree(|r| content(handler, r))?;
        } else if reader.is_element() {
            skip_unrecognized(reader)?;
        }
    }
    Ok(())
}

pub fn walk_block_content<H: Handler, R: BufRead>(handler: &mut H, reader: &mut Subtree<'_, R>) -> Result<()> {
    while reader.read()? {
        dispatch_block(handler, reader)?;
    }
    Ok(())
}

/// Walk inline children (hyperlinks, fields, control content).
pub fn walk_inline_content<H: Handler, R: BufRead>(handler: &mut H, reader: &mut Subtree<'_, R>) -> Result<()> {
    while reader.read()? {
        dispatch_inline(handler, reader)?;
    }
    Ok(())
}

pub fn walk_run<H: Handler, R: BufRead>(handler: &mut H, reader: &mut Subtree<'_, R>) -> Result<()> {
    let properties = reader.vocab().wordml(reader.vocab().elements.run_properties);
    while reader.read()? {
        if reader.is(properties) {
            reader.read_subtree(|r| handler.run_properties(r))?;
        } else {
            dispatch_run_content(handler, reader)?;
        }
    }
    Ok(())
}
