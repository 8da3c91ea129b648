//! Registry of editable control labels.
//!
//! Controls are bound to editable fields purely by their tag naming
//! convention: `<kind>_<rest>`. `text_`, `list_` and `table_` tags open new
//! top-level entries keyed by the full tag; `col_<rest>` attaches under
//! `table_<rest>` and `item_<rest>` under `list_<rest>`, provided that parent
//! was registered earlier in the document.

use serde::{Deserialize, Serialize};

/// Kind of an editable control, taken from its tag prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelKind {
    Text,
    List,
    Table,
    Col,
    Item,
}

impl LabelKind {
    /// Split a tag on its first underscore into a kind and the remainder.
    ///
    /// Returns `None` for prefixes outside the naming convention.
    pub fn parse_tag(tag: &str) -> Option<(LabelKind, &str)> {
        let (prefix, rest) = tag.split_once('_').unwrap_or((tag, ""));
        let kind = match prefix {
            "text" => LabelKind::Text,
            "list" => LabelKind::List,
            "table" => LabelKind::Table,
            "col" => LabelKind::Col,
            "item" => LabelKind::Item,
            _ => return None,
        };
        Some((kind, rest))
    }

    /// Prefix of the entry a nested kind must be attached to.
    pub fn parent_prefix(&self) -> Option<&'static str> {
        match self {
            LabelKind::Col => Some("table"),
            LabelKind::Item => Some("list"),
            _ => None,
        }
    }
}

/// One editable control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub kind: LabelKind,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Label>,
}

/// Outcome of [`LabelRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// Added as a new top-level entry.
    TopLevel,
    /// Attached under an existing parent entry.
    Nested,
    /// The required parent entry does not exist (yet); nothing was recorded.
    MissingParent,
    /// The tag does not follow the naming convention.
    Unrecognized,
}

/// Tree of labels discovered during a conversion. Entries are only ever
/// added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelRegistry {
    #[serde(default)]
    pub entries: Vec<Label>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a control by its tag and optional alias.
    pub fn register(&mut self, tag: &str, alias: Option<String>) -> Registration {
        let Some((kind, rest)) = LabelKind::parse_tag(tag) else {
            return Registration::Unrecognized;
        };

        let label = Label {
            kind,
            tag: tag.to_string(),
            alias,
            children: Vec::new(),
        };

        match kind.parent_prefix() {
            None => {
                self.entries.push(label);
                Registration::TopLevel
            }
            Some(prefix) => {
                let parent_tag = format!("{}_{}", prefix, rest);
                match self.get_mut(&parent_tag) {
                    Some(parent) => {
                        parent.children.push(label);
                        Registration::Nested
                    }
                    None => Registration::MissingParent,
                }
            }
        }
    }

    /// Look up a top-level entry by its full tag.
    pub fn get(&self, tag: &str) -> Option<&Label> {
        self.entries.iter().find(|label| label.tag == tag)
    }

    fn get_mut(&mut self, tag: &str) -> Option<&mut Label> {
        self.entries.iter_mut().find(|label| label.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
