//! Forward-only XML cursor with subtree scoping.
//!
//! [`XmlCursor`] wraps a namespace-aware `quick_xml` reader and keeps a small
//! owned snapshot of the node it is positioned on. Handlers never see the
//! cursor directly: they get a [`Subtree`], which refuses to read past the
//! end tag of the element it was opened on. Whatever a handler leaves unread
//! is skipped when its subtree is closed, so sibling content is never
//! consumed by the wrong handler.

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use super::names::{Atom, NameTable, QName};
use super::walker::Vocabulary;
use crate::error::{Error, Result};

/// Kind of node the cursor is positioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    EndElement,
    Text,
}

/// An attribute whose local name is registered.
#[derive(Debug, Clone)]
struct Attribute {
    ns: Option<Atom>,
    local: Atom,
    value: String,
}

#[derive(Debug, Clone)]
struct Current {
    node_type: NodeType,
    ns: Option<Atom>,
    local: Option<Atom>,
    depth: usize,
    attributes: Vec<Attribute>,
    text: String,
}

impl Current {
    fn start() -> Self {
        Self {
            node_type: NodeType::EndElement,
            ns: None,
            local: None,
            depth: 0,
            attributes: Vec::new(),
            text: String::new(),
        }
    }

    fn text(depth: usize, text: String) -> Self {
        Self {
            node_type: NodeType::Text,
            ns: None,
            local: None,
            depth,
            attributes: Vec::new(),
            text,
        }
    }
}

/// Namespace-resolving cursor over one XML stream.
pub struct XmlCursor<R> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    vocab: Vocabulary,
    current: Current,
    depth: usize,
    pending_end: bool,
}

impl<R: BufRead> XmlCursor<R> {
    pub fn new(source: R, vocab: Vocabulary) -> Self {
        let mut reader = NsReader::from_reader(source);
        let config = reader.config_mut();
        config.trim_text(false);
        config.expand_empty_elements = true;
        config.check_end_names = true;

        Self {
            reader,
            buf: Vec::new(),
            vocab,
            current: Current::start(),
            depth: 0,
            pending_end: false,
        }
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    fn names(&self) -> &NameTable {
        &self.vocab.table
    }

    /// Move to the next element, end tag or text node.
    ///
    /// Returns `false` at the end of the stream. Comments, processing
    /// instructions and declarations are passed over.
    pub fn advance(&mut self) -> Result<bool> {
        if self.pending_end {
            self.pending_end = false;
            self.depth -= 1;
            self.current.node_type = NodeType::EndElement;
            self.current.depth = self.depth;
            self.current.attributes.clear();
            return Ok(true);
        }

        loop {
            self.buf.clear();
            let (ns, event) = self.reader.read_resolved_event_into(&mut self.buf)?;
            let ns = match ns {
                ResolveResult::Bound(ns) => self.vocab.table.get(ns.as_ref()),
                _ => None,
            };

            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let mut attributes = Vec::new();
                    for attr in e.attributes() {
                        let attr = attr?;
                        let (attr_ns, attr_local) = self.reader.resolve_attribute(attr.key);
                        let Some(local) = self.vocab.table.get(attr_local.as_ref()) else {
                            continue;
                        };
                        let attr_ns = match attr_ns {
                            ResolveResult::Bound(ns) => self.vocab.table.get(ns.as_ref()),
                            _ => None,
                        };
                        attributes.push(Attribute {
                            ns: attr_ns,
                            local,
                            value: attr.unescape_value()?.into_owned(),
                        });
                    }

                    self.current = Current {
                        node_type: NodeType::Element,
                        ns,
                        local: self.vocab.table.get(e.local_name().as_ref()),
                        depth: self.depth,
                        attributes,
                        text: String::new(),
                    };
                    self.depth += 1;
                    self.pending_end = matches!(event, Event::Empty(_));
                    return Ok(true);
                }
                Event::End(ref e) => {
                    self.depth = self.depth.checked_sub(1).ok_or_else(|| {
                        Error::XmlParse("unbalanced end tag".to_string())
                    })?;
                    self.current = Current {
                        node_type: NodeType::EndElement,
                        ns,
                        local: self.vocab.table.get(e.local_name().as_ref()),
                        depth: self.depth,
                        attributes: Vec::new(),
                        text: String::new(),
                    };
                    return Ok(true);
                }
                Event::Text(ref e) => {
                    self.current = Current::text(self.depth, e.unescape()?.into_owned());
                    return Ok(true);
                }
                Event::CData(ref e) => {
                    self.current = Current::text(self.depth, String::from_utf8_lossy(e).into_owned());
                    return Ok(true);
                }
                Event::Eof => return Ok(false),
                _ => {}
            }
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.current.node_type
    }

    /// Qualified name of the current element, if both parts are registered.
    pub fn qname(&self) -> Option<QName> {
        match (self.current.node_type, self.current.ns, self.current.local) {
            (NodeType::Element, Some(ns), Some(local)) => Some(QName::new(ns, local)),
            _ => None,
        }
    }

    /// Whether the cursor sits on the start of element `name`.
    pub fn is(&self, name: QName) -> bool {
        self.qname() == Some(name)
    }

    /// Open a subtree on the current element, run `f`, and skip whatever
    /// `f` left unread. Does nothing when not positioned on an element start.
    pub fn read_subtree<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Subtree<'_, R>) -> Result<()>,
    {
        if self.current.node_type != NodeType::Element {
            return Ok(());
        }
        let mut subtree = Subtree {
            depth: self.current.depth,
            done: false,
            cursor: self,
        };
        f(&mut subtree)?;
        subtree.finish()
    }

    fn describe(&self) -> String {
        match self.current.local {
            Some(local) => self.names().resolve(local).to_string(),
            None => "element".to_string(),
        }
    }
}

/// A read cursor confined to a single element.
///
/// Freshly opened, a subtree is positioned on its element's start tag, so
/// attributes can be inspected before reading on. [`Subtree::read`] then
/// walks the descendants in document order and returns `false` once the
/// element's end tag is reached.
pub struct Subtree<'c, R> {
    cursor: &'c mut XmlCursor<R>,
    depth: usize,
    done: bool,
}

impl<R: BufRead> Subtree<'_, R> {
    /// Advance to the next node inside this element.
    pub fn read(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }
        if !self.cursor.advance()? {
            return Err(Error::XmlParse(format!(
                "unexpected end of document inside <{}>",
                self.cursor.describe()
            )));
        }
        if self.cursor.current.node_type == NodeType::EndElement
            && self.cursor.current.depth == self.depth
        {
            self.done = true;
            return Ok(false);
        }
        Ok(true)
    }

    /// Consume the rest of this element.
    fn finish(&mut self) -> Result<()> {
        while self.read()? {}
        Ok(())
    }

    /// Run `f` on the subtree of the current child element.
    pub fn read_subtree<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Subtree<'_, R>) -> Result<()>,
    {
        self.cursor.read_subtree(f)
    }

    /// Skip the current child element and all of its content.
    pub fn skip(&mut self) -> Result<()> {
        self.cursor.read_subtree(|_| Ok(()))
    }

    /// Concatenate the text content of the rest of this element.
    pub fn read_string(&mut self) -> Result<String> {
        let mut text = String::new();
        while self.read()? {
            if self.cursor.current.node_type == NodeType::Text {
                text.push_str(&self.cursor.current.text);
            }
        }
        Ok(text)
    }

    pub fn vocab(&self) -> &Vocabulary {
        self.cursor.vocab()
    }

    pub fn node_type(&self) -> NodeType {
        self.cursor.node_type()
    }

    pub fn is_element(&self) -> bool {
        self.cursor.node_type() == NodeType::Element
    }

    pub fn qname(&self) -> Option<QName> {
        self.cursor.qname()
    }

    pub fn is(&self, name: QName) -> bool {
        self.cursor.is(name)
    }

    /// Whether the current element is in namespace `ns`.
    pub fn in_namespace(&self, ns: Atom) -> bool {
        self.is_element() && self.cursor.current.ns == Some(ns)
    }

    /// Local name atom of the current element.
    pub fn local_name(&self) -> Option<Atom> {
        match self.cursor.current.node_type {
            NodeType::Element => self.cursor.current.local,
            _ => None,
        }
    }

    /// Value of the namespaced attribute `name` on the current element.
    pub fn attribute(&self, name: QName) -> Option<&str> {
        self.cursor
            .current
            .attributes
            .iter()
            .find(|attr| attr.ns == Some(name.ns) && attr.local == name.local)
            .map(|attr| attr.value.as_str())
    }

    /// Text of the current element's name, for diagnostics.
    pub fn name_for_log(&self) -> String {
        self.cursor.describe()
    }
}
