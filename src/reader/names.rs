//! Interned XML names.
//!
//! Every namespace URI and local name the converter compares against is
//! registered up front. The cursor then resolves each element and attribute
//! name to [`Atom`]s once, and all later comparisons are integer equality.
//! Names that were never registered resolve to `None` and therefore never
//! match anything.

use std::collections::HashMap;

/// Interned name handle. Only meaningful for the [`NameTable`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(u32);

/// Namespace-qualified name made of two atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QName {
    pub ns: Atom,
    pub local: Atom,
}

impl QName {
    pub fn new(ns: Atom, local: Atom) -> Self {
        Self { ns, local }
    }
}

/// Registry of interned names.
#[derive(Debug, Default, Clone)]
pub struct NameTable {
    ids: HashMap<Box<[u8]>, Atom>,
    names: Vec<Box<str>>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `name`, returning the existing atom when already present.
    pub fn add(&mut self, name: &str) -> Atom {
        if let Some(atom) = self.ids.get(name.as_bytes()) {
            return *atom;
        }
        let atom = Atom(self.names.len() as u32);
        self.names.push(name.into());
        self.ids.insert(name.as_bytes().into(), atom);
        atom
    }

    /// Look up raw name bytes without interning them.
    pub fn get(&self, name: &[u8]) -> Option<Atom> {
        self.ids.get(name).copied()
    }

    /// Text of an interned name.
    pub fn resolve(&self, atom: Atom) -> &str {
        &self.names[atom.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Declare a struct of pre-registered names.
///
/// ```ignore
/// name_set! {
///     pub struct Colors {
///         red = "red",
///     }
/// }
/// let colors = Colors::register(&mut table);
/// ```
macro_rules! name_set {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $($field:ident = $value:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        $vis struct $name {
            $(pub $field: $crate::reader::Atom,)*
        }

        impl $name {
            /// Intern every name of the set into `table`.
            pub fn register(table: &mut $crate::reader::NameTable) -> Self {
                Self {
                    $($field: table.add($value),)*
                }
            }
        }
    };
}

pub(crate) use name_set;
