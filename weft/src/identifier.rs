//! Identifiers under which bindings are registered.
//!
//! An [`Identifier`] is a plain name, a process-unique [`Symbol`], or a class
//! reference. Names compare by value; symbols and classes compare by their
//! unique id, so two symbols created from the same description never collide.
//!
//! [`interface`] creates the identifier for a non-class contract together with
//! a marker name that declaration sources can use in type position.
//!
//! ```
//! use weft::{Identifier, interface};
//!
//! let logger = interface("Logger");
//! assert_eq!(logger.marker(), "Logger");
//! assert_ne!(Identifier::from(&logger), Identifier::from(&interface("Logger")));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::class::ClassRef;
use crate::runtime::Shared;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates a process-unique id for symbols and classes.
pub(crate) fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// A unique identifier with a human-readable description.
#[derive(Clone)]
pub struct Symbol {
    id: u64,
    description: Shared<str>,
}

impl Symbol {
    /// Creates a fresh symbol. Symbols with equal descriptions are still distinct.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: next_id(),
            description: Shared::from(description.into()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Human-readable description, also the name the symbol is declared under.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({}#{})", self.description, self.id)
    }
}

/// Identifier of a non-class contract.
///
/// The [`marker`](Interface::marker) is the name a declaration uses to refer
/// to the contract, either as a type (`logger: Rc<dyn Logger>`) or as a hint
/// (`#[inject(Logger)]`). Markers are mapped back to the symbol once the
/// interface is bound or declared on a container.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Interface {
    symbol: Symbol,
}

impl Interface {
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Name usable in type position (`dyn Logger`, `#[inject(Logger)]`).
    pub fn marker(&self) -> &str {
        self.symbol.description()
    }
}

/// Creates a unique interface identifier from a human-readable name.
pub fn interface(name: impl Into<String>) -> Interface {
    Interface {
        symbol: Symbol::new(name),
    }
}

/// Key of a binding.
#[derive(Clone, Debug)]
pub enum Identifier {
    Name(String),
    Symbol(Symbol),
    Class(ClassRef),
}

impl Identifier {
    /// The name this identifier is known by in declaration sources, if any.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Identifier::Name(_) => None,
            Identifier::Symbol(symbol) => Some(symbol.description()),
            Identifier::Class(class) => Some(class.name()),
        }
    }

    pub fn as_class(&self) -> Option<&ClassRef> {
        match self {
            Identifier::Class(class) => Some(class),
            _ => None,
        }
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Identifier::Name(a), Identifier::Name(b)) => a == b,
            (Identifier::Symbol(a), Identifier::Symbol(b)) => a == b,
            (Identifier::Class(a), Identifier::Class(b)) => a.id() == b.id(),
            _ => false,
        }
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Identifier::Name(name) => name.hash(state),
            Identifier::Symbol(symbol) => symbol.hash(state),
            Identifier::Class(class) => class.id().hash(state),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Name(name) => f.write_str(name),
            Identifier::Symbol(symbol) => write!(f, "Symbol({})", symbol.description()),
            Identifier::Class(class) => f.write_str(class.name()),
        }
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::Name(name.to_string())
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Identifier::Name(name)
    }
}

impl From<Symbol> for Identifier {
    fn from(symbol: Symbol) -> Self {
        Identifier::Symbol(symbol)
    }
}

impl From<&Symbol> for Identifier {
    fn from(symbol: &Symbol) -> Self {
        Identifier::Symbol(symbol.clone())
    }
}

impl From<Interface> for Identifier {
    fn from(interface: Interface) -> Self {
        Identifier::Symbol(interface.symbol)
    }
}

impl From<&Interface> for Identifier {
    fn from(interface: &Interface) -> Self {
        Identifier::Symbol(interface.symbol.clone())
    }
}

impl From<ClassRef> for Identifier {
    fn from(class: ClassRef) -> Self {
        Identifier::Class(class)
    }
}

impl From<&ClassRef> for Identifier {
    fn from(class: &ClassRef) -> Self {
        Identifier::Class(class.clone())
    }
}

impl From<&Identifier> for Identifier {
    fn from(identifier: &Identifier) -> Self {
        identifier.clone()
    }
}
