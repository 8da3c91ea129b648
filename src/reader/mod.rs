//! Streaming WordprocessingML reader.
//!
//! - `names`: interned namespace and local names
//! - `cursor`: forward-only XML cursor with subtree scoping
//! - `walker`: element dispatch and the [`Handler`] hooks

mod cursor;
mod names;
mod walker;

pub use cursor::{NodeType, Subtree, XmlCursor};
pub(crate) use names::name_set;
pub use names::{Atom, NameTable, QName};
pub use walker::{
    dispatch_block, dispatch_inline, dispatch_run_content, read, walk_block_content,
    walk_block_control, walk_document, walk_inline_content, walk_inline_control, walk_paragraph,
    walk_run, walk_table, walk_table_cell, walk_table_row, BlockElement, ElementNames, Handler,
    InlineElement, RunContent, Vocabulary, RELATIONSHIPS_NAMESPACE, WORDML_NAMESPACE,
};
