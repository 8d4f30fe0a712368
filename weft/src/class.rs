//! Class references: the unit of auto-resolution.
//!
//! Rust offers no runtime view of a constructor's parameters, so a [`Class`]
//! carries the declaration source alongside the closure that builds it. The
//! container analyses the source to decide what to inject, then hands the
//! collected values to the constructor as positional [`Arguments`].
//!
//! ```
//! use weft::{Class, Container};
//!
//! struct Clock;
//!
//! let clock = Class::new("Clock", "struct Clock;", |_args| Ok(Clock));
//! let container = Container::new();
//! assert!(container.make_as::<Clock>(&clock).is_ok());
//! ```

use std::any::Any;
use std::fmt;

use crate::error::{Error, Result};
use crate::identifier::next_id;
use crate::runtime::{Instance, Shared, downcast, instance};

type Constructor = Box<dyn Fn(&mut Arguments) -> Result<Instance> + 'static>;

/// A constructible target: a name, its declaration source, and a constructor.
pub struct Class {
    id: u64,
    name: String,
    source: String,
    constructor: Constructor,
}

/// Shared handle to a [`Class`]; its identity is the class id.
pub type ClassRef = Shared<Class>;

impl Class {
    /// Declares a class.
    ///
    /// `source` is the Rust declaration the container introspects: a `struct`,
    /// an `impl` block with a constructor, a `fn`, or a closure expression.
    pub fn new<T, F>(name: impl Into<String>, source: impl Into<String>, constructor: F) -> ClassRef
    where
        T: Any,
        F: Fn(&mut Arguments) -> Result<T> + 'static,
    {
        Shared::new(Self {
            id: next_id(),
            name: name.into(),
            source: source.into(),
            constructor: Box::new(move |args| constructor(args).map(instance)),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaration source analysed for auto-resolution.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn instantiate(&self, mut arguments: Arguments) -> Result<Instance> {
        (self.constructor)(&mut arguments)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish()
    }
}

/// Positional constructor arguments collected by the container.
///
/// A slot is empty when the parameter has a default and its dependency could
/// not be resolved; the constructor decides the fallback. Explicit arguments
/// past the declared parameters (or from a rest parameter on) form the
/// [`rest`](Arguments::rest) tail.
pub struct Arguments {
    class: String,
    slots: Vec<Option<Instance>>,
    rest: Vec<Instance>,
}

impl Arguments {
    pub(crate) fn new(class: &str, slots: Vec<Option<Instance>>, rest: Vec<Instance>) -> Self {
        Self {
            class: class.to_string(),
            slots,
            rest,
        }
    }

    pub(crate) fn explicit(class: &str, args: Vec<Instance>) -> Self {
        Self::new(class, args.into_iter().map(Some).collect(), Vec::new())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Peeks at a slot without taking it.
    pub fn get(&self, position: usize) -> Option<&Instance> {
        self.slots.get(position).and_then(Option::as_ref)
    }

    /// Takes a required argument, downcast to `T`.
    pub fn take<T: Any>(&mut self, position: usize) -> Result<Shared<T>> {
        self.optional(position)?
            .ok_or_else(|| Error::missing_argument(&self.class, position))
    }

    /// Takes an argument that may have been left empty.
    pub fn optional<T: Any>(&mut self, position: usize) -> Result<Option<Shared<T>>> {
        self.slots
            .get_mut(position)
            .and_then(Option::take)
            .map(downcast::<T>)
            .transpose()
    }

    /// Takes an argument, falling back to `default` when the slot is empty.
    pub fn take_or<T: Any>(&mut self, position: usize, default: impl FnOnce() -> T) -> Result<Shared<T>> {
        Ok(self
            .optional(position)?
            .unwrap_or_else(|| Shared::new(default())))
    }

    /// Takes the variadic tail.
    pub fn rest(&mut self) -> Vec<Instance> {
        std::mem::take(&mut self.rest)
    }
}
