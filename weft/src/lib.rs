//! # weft
//!
//! A dependency injection container that wires object graphs without a
//! reflection API. Targets are registered under identifiers (names, unique
//! symbols or class references) and resolved on demand; when a class has no
//! explicit binding, its declaration source is parsed with `syn` to find the
//! constructor parameters to inject.
//!
//! ```
//! use weft::{Class, Concrete, Container, interface};
//!
//! trait Logger {
//!     fn log(&self, line: &str) -> String;
//! }
//!
//! struct Stdout;
//! impl Logger for Stdout {
//!     fn log(&self, line: &str) -> String {
//!         format!("stdout: {line}")
//!     }
//! }
//!
//! struct Service {
//!     logger: std::rc::Rc<dyn Logger>,
//! }
//!
//! let logger = interface("Logger");
//! let service = Class::new(
//!     "Service",
//!     "impl Service { fn new(logger: Rc<dyn Logger>) -> Self { Self { logger } } }",
//!     |args| {
//!         let logger = args.take::<std::rc::Rc<dyn Logger>>(0)?;
//!         Ok(Service { logger: (*logger).clone() })
//!     },
//! );
//!
//! let container = Container::new();
//! container.singleton(
//!     &logger,
//!     Some(Concrete::factory(|_, _| Ok(std::rc::Rc::new(Stdout) as std::rc::Rc<dyn Logger>))),
//! );
//!
//! let service = container.make_as::<Service>(&service).unwrap();
//! assert_eq!(service.logger.log("ready"), "stdout: ready");
//! ```
//!
//! Features:
//! - `tracing` (default): log registration and resolution through `tracing`.

pub mod analyser;
pub mod binding;
pub mod class;
pub mod config;
pub mod container;
pub mod contextual;
pub mod error;
pub mod identifier;
pub mod macros;
pub mod metadata;
pub mod resolve_guard;
pub mod runtime;
pub mod syntax;

pub use analyser::{DeclarationKind, FunctionAnalyser, ParameterAnalyser, ParameterDescriptor, Reference};
pub use binding::{Binding, Concrete, Factory};
pub use class::{Arguments, Class, ClassRef};
pub use config::ContainerConfig;
pub use container::Container;
pub use contextual::{ContextualBindingBuilder, ContextualBindingNeeds};
pub use error::{Error, ErrorKind, Result};
pub use identifier::{Identifier, Interface, Symbol, interface};
pub use metadata::Metadata;
pub use runtime::{Instance, Shared, downcast, instance};
