use std::collections::HashMap;

/// An interned string, only meaningful together with the [`Interner`] that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(u32);

impl Name {
    pub fn to_idx(self) -> usize {
        self.0 as usize
    }
}

/// Owns the text behind every [`Name`] of a module.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    map: HashMap<Box<str>, Name>,
    strings: Vec<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the existing name for `s` or interns a new one.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(name) = self.map.get(s) {
            return *name;
        }
        assert!(self.strings.len() < u32::MAX as usize, "interner is full");
        let name = Name(self.strings.len() as u32);
        self.strings.push(s.into());
        self.map.insert(s.into(), name);
        name
    }

    /// Looks up a string without interning it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.map.get(s).copied()
    }

    /// Panics if `name` came from another interner.
    pub fn lookup(&self, name: Name) -> &str {
        &self.strings[name.to_idx()]
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// A reference to a module entity: a dense 1-based index, a symbolic name, or nothing.
///
/// Used for branch labels, locals, call targets, call-indirect signatures and
/// table entries. An index never equals a name, even when both would denote the
/// same entity once resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Var {
    /// The unset identifier.
    #[default]
    None,
    Index(u32),
    Name(Name),
}

impl Var {
    /// Numeric identifiers must stay strictly below this value.
    pub const MAX_INDEX: u32 = 1_000_000;

    /// Panics unless `0 < index < Var::MAX_INDEX`.
    pub fn index(index: u32) -> Self {
        assert!(
            index > 0 && index < Self::MAX_INDEX,
            "numeric var {index} out of range (1..{})",
            Self::MAX_INDEX
        );
        Var::Index(index)
    }

    pub fn name(name: Name) -> Self {
        Var::Name(name)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Var::None)
    }

    pub fn as_index(&self) -> Option<u32> {
        match self {
            Var::Index(index) => Some(*index),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<Name> {
        match self {
            Var::Name(name) => Some(*name),
            _ => None,
        }
    }
}

impl From<Name> for Var {
    fn from(name: Name) -> Self {
        Var::Name(name)
    }
}
