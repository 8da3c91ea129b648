//! Flow document model.
//!
//! The converter produces a single owned tree of [`Node`]s rooted at a
//! [`NodeKind::Document`] node, plus a [`LabelRegistry`] describing the
//! editable controls found along the way.

mod document;
mod labels;
mod node;
mod style;

pub use document::*;
pub use labels::*;
pub use node::*;
pub use style::*;
