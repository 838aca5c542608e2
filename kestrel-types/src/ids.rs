//! Identities for syntax elements and the symbols they declare.
//!
//! Both are plain indices handed out by an [`IdGenerator`]; the elements themselves are owned
//! by whatever tree holds them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one element of the resolved syntax tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(u32);

impl ElementId {
    /// The placeholder element carried by stub nodes.
    pub const SYNTHETIC: ElementId = ElementId(u32::MAX);

    pub fn is_synthetic(&self) -> bool {
        *self == ElementId::SYNTHETIC
    }

    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_synthetic() {
            f.write_str("e<synthetic>")
        } else {
            write!(f, "e{}", self.0)
        }
    }
}

/// Identity of a declared symbol. Every reference to a declaration carries its symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(u32);

impl SymbolId {
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Hands out fresh element and symbol ids. Ids are never reused by one generator.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next_element: u32,
    next_symbol: u32,
}

impl IdGenerator {
    pub fn next_element(&mut self) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element += 1;
        assert!(
            !id.is_synthetic(),
            "element id space exhausted"
        );
        id
    }

    pub fn next_symbol(&mut self) -> SymbolId {
        let id = SymbolId(self.next_symbol);
        self.next_symbol += 1;
        id
    }
}
