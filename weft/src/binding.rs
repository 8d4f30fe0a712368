//! Binding records and the registry that owns them.
//!
//! A [`Binding`] maps an identifier to a [`Concrete`] and a sharing flag.
//! The [`BindingRegistry`] also owns the singleton cache, which is evicted
//! whenever an identifier is re-bound, and the declaration table used to turn
//! type names found in declaration sources back into identifiers.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::class::ClassRef;
use crate::container::Container;
use crate::error::Result;
use crate::identifier::Identifier;
use crate::runtime::{Instance, Shared, instance};

/// Factory closure: receives the container and the caller's explicit arguments.
pub type Factory = Shared<dyn Fn(&Container, &[Instance]) -> Result<Instance>>;

/// What an identifier resolves to.
#[derive(Clone)]
pub enum Concrete {
    /// Invoked as is; its parameters are never introspected.
    Factory(Factory),
    /// Auto-resolved from its declaration source.
    Class(ClassRef),
    /// Resolved by making another identifier.
    Alias(Identifier),
    /// A pre-built value.
    Value(Instance),
}

impl Concrete {
    /// Wraps a factory returning a plain value.
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: Any,
        F: Fn(&Container, &[Instance]) -> Result<T> + 'static,
    {
        Concrete::Factory(Shared::new(move |container: &Container, args: &[Instance]| {
            factory(container, args).map(instance)
        }))
    }

    /// Wraps a factory returning an already erased [`Instance`].
    pub fn instance_factory<F>(factory: F) -> Self
    where
        F: Fn(&Container, &[Instance]) -> Result<Instance> + 'static,
    {
        Concrete::Factory(Shared::new(factory))
    }

    /// A pre-built value, handed out as is.
    pub fn value<T: Any>(value: T) -> Self {
        Concrete::Value(instance(value))
    }

    /// Resolves by making `identifier` instead.
    pub fn alias(identifier: impl Into<Identifier>) -> Self {
        Concrete::Alias(identifier.into())
    }

    /// The concrete an identifier stands for when bound to itself.
    pub fn of(identifier: &Identifier) -> Self {
        match identifier {
            Identifier::Class(class) => Concrete::Class(class.clone()),
            other => Concrete::Alias(other.clone()),
        }
    }
}

impl From<ClassRef> for Concrete {
    fn from(class: ClassRef) -> Self {
        Concrete::Class(class)
    }
}

impl From<&ClassRef> for Concrete {
    fn from(class: &ClassRef) -> Self {
        Concrete::Class(class.clone())
    }
}

impl fmt::Debug for Concrete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Concrete::Factory(_) => f.write_str("Factory(..)"),
            Concrete::Class(class) => write!(f, "Class({})", class.name()),
            Concrete::Alias(identifier) => write!(f, "Alias({})", identifier),
            Concrete::Value(_) => f.write_str("Value(..)"),
        }
    }
}

/// A binding record.
#[derive(Clone, Debug)]
pub struct Binding {
    pub concrete: Concrete,
    pub shared: bool,
}

#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: HashMap<Identifier, Binding>,
    instances: HashMap<Identifier, Instance>,
    declarations: HashMap<String, Identifier>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the binding of `identifier` and evicts its cached instance.
    ///
    /// The bound identifier takes over its type name; a concrete class only
    /// claims its name when nothing else has.
    pub fn bind(&mut self, identifier: Identifier, concrete: Concrete, shared: bool) {
        self.declare(&identifier);
        if let Concrete::Class(class) = &concrete {
            self.declare_unclaimed(&Identifier::Class(class.clone()));
        }
        self.instances.remove(&identifier);
        self.bindings.insert(identifier, Binding { concrete, shared });
    }

    pub fn get(&self, identifier: &Identifier) -> Option<&Binding> {
        self.bindings.get(identifier)
    }

    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.bindings.contains_key(identifier)
    }

    /// The cached shared instance of `identifier`, if built.
    pub fn cached(&self, identifier: &Identifier) -> Option<Instance> {
        self.instances.get(identifier).cloned()
    }

    pub fn cache(&mut self, identifier: Identifier, instance: Instance) {
        self.instances.insert(identifier, instance);
    }

    /// Evicts the cached instance of `identifier`, keeping its binding.
    pub fn forget(&mut self, identifier: &Identifier) -> Option<Instance> {
        self.instances.remove(identifier)
    }

    /// Drops every binding, cached instance and declaration.
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.instances.clear();
        self.declarations.clear();
    }

    /// Makes the type name of `identifier` (class name or symbol description)
    /// resolvable from declaration sources. The latest declaration of a name wins.
    pub fn declare(&mut self, identifier: &Identifier) {
        if let Some(name) = identifier.type_name() {
            self.declarations.insert(name.to_string(), identifier.clone());
        }
    }

    /// Like [`declare`](Self::declare), but keeps an existing entry for the name.
    pub fn declare_unclaimed(&mut self, identifier: &Identifier) {
        if let Some(name) = identifier.type_name() {
            self.declarations
                .entry(name.to_string())
                .or_insert_with(|| identifier.clone());
        }
    }

    /// The identifier a type name found in declaration sources stands for.
    pub fn declared(&self, type_name: &str) -> Option<&Identifier> {
        self.declarations.get(type_name)
    }
}
