//! Contextual bindings: "when building C, give Y for D".
//!
//! ```
//! use weft::{Class, Concrete, Container};
//!
//! struct Report(String);
//!
//! let report = Class::new("Report", "fn new(title: Title) -> Report { todo!() }", |args| {
//!     Ok(Report(args.take::<String>(0)?.to_string()))
//! });
//!
//! let container = Container::new();
//! container.bind("Title", Concrete::factory(|_, _| Ok(String::from("default"))), false);
//! container
//!     .when(&report)
//!     .needs("Title")
//!     .give(Concrete::factory(|_, _| Ok(String::from("quarterly"))));
//!
//! assert_eq!(container.make_as::<Report>(&report).unwrap().0, "quarterly");
//! assert_eq!(*container.make_as::<String>("Title").unwrap(), "default");
//! ```

use std::collections::HashMap;

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::binding::Concrete;
use crate::container::Container;
use crate::identifier::Identifier;

/// Overrides keyed by `(consumer, dependency)`; exact matches only.
#[derive(Debug, Default)]
pub struct ContextualBindings {
    entries: HashMap<(Identifier, Identifier), Concrete>,
}

impl ContextualBindings {
    pub fn insert(&mut self, consumer: Identifier, dependency: Identifier, implementation: Concrete) {
        self.entries.insert((consumer, dependency), implementation);
    }

    pub fn get(&self, consumer: &Identifier, dependency: &Identifier) -> Option<&Concrete> {
        self.entries.get(&(consumer.clone(), dependency.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Returned by [`Container::when`]; pick the dependency with [`needs`](Self::needs).
pub struct ContextualBindingBuilder<'a> {
    container: &'a Container,
    consumers: Vec<Identifier>,
}

impl<'a> ContextualBindingBuilder<'a> {
    pub(crate) fn new(container: &'a Container, consumers: Vec<Identifier>) -> Self {
        Self {
            container,
            consumers,
        }
    }

    /// Names the dependency to override.
    pub fn needs(self, dependency: impl Into<Identifier>) -> ContextualBindingNeeds<'a> {
        ContextualBindingNeeds {
            container: self.container,
            consumers: self.consumers,
            dependency: dependency.into(),
        }
    }
}

/// Consumer and dependency are set; [`give`](Self::give) stores the override.
pub struct ContextualBindingNeeds<'a> {
    container: &'a Container,
    consumers: Vec<Identifier>,
    dependency: Identifier,
}

impl ContextualBindingNeeds<'_> {
    /// Stores `implementation` as the override for every consumer.
    pub fn give(self, implementation: impl Into<Concrete>) {
        let implementation = implementation.into();
        for consumer in self.consumers {
            #[cfg(feature = "tracing")]
            debug!(
                "Contextual binding: when {} needs {} give {:?}",
                consumer, self.dependency, implementation
            );

            self.container.add_contextual_binding(
                consumer,
                self.dependency.clone(),
                implementation.clone(),
            );
        }
    }
}
