//! Side table of decoration metadata.
//!
//! Whatever marks declarations (an attribute macro, a builder call, a
//! configuration file) materialises its output here instead of touching the
//! class itself. The container consults the table, keyed by class id, when it
//! auto-resolves a class.

use std::collections::{BTreeMap, HashMap};

use crate::class::Class;
use crate::identifier::Identifier;

/// Metadata attached to one class.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    pub injectable: bool,
    /// Identifier overrides by parameter position.
    pub parameters: BTreeMap<usize, Identifier>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata of a class marked injectable.
    pub fn injectable() -> Self {
        Self {
            injectable: true,
            ..Self::default()
        }
    }

    /// Names the identifier to resolve for the parameter at `position`.
    pub fn parameter(mut self, position: usize, identifier: impl Into<Identifier>) -> Self {
        self.parameters.insert(position, identifier.into());
        self
    }

    /// The identifier override for the parameter at `position`.
    pub fn identifier_for(&self, position: usize) -> Option<&Identifier> {
        self.parameters.get(&position)
    }
}

#[derive(Debug, Default)]
pub struct MetadataTable {
    entries: HashMap<u64, Metadata>,
}

impl MetadataTable {
    /// Attaches `metadata` to `class`, merging with what is already recorded.
    pub fn annotate(&mut self, class: &Class, metadata: Metadata) {
        let entry = self.entries.entry(class.id()).or_default();
        entry.injectable |= metadata.injectable;
        entry.parameters.extend(metadata.parameters);
    }

    /// Metadata recorded for `class`, if any.
    pub fn get(&self, class: &Class) -> Option<&Metadata> {
        self.entries.get(&class.id())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
