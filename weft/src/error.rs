//! Error types for the weft dependency injection container.
//!
//! This module defines a lightweight error model used across the container to
//! describe failures that can occur while parsing declarations, analysing
//! parameters, and resolving bindings.
//!
//! # Design
//!
//! - `ErrorKind` captures the error category.
//! - `Error` stores the category, a human-readable message, the resolution
//!   chain when one is relevant, and the wrapped cause for resolution failures.
//!
//! The helpers in `Error` keep call sites concise and the messages consistent.
//!
//! # Feature Flags
//!
//! - `tracing`: logs errors when they are created.
//!
//! # Examples
//!
//! ```
//! use weft::error::{Error, ErrorKind};
//!
//! let err = Error::binding_not_found("mailer");
//! assert_eq!(err.kind, ErrorKind::BindingNotFound);
//! assert!(err.message.contains("mailer"));
//! ```

use core::fmt;

#[cfg(feature = "tracing")]
use tracing::error;

/// Error categories for the container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Declaration source text is not valid Rust.
    Parse,
    /// Source parses but holds no recognisable function or class declaration.
    Analysis,
    /// An identifier appeared twice in the build stack.
    CircularDependency,
    /// No binding registered and the identifier is not a constructible class.
    BindingNotFound,
    /// The target is abstract (no body) or not marked injectable.
    NotInstantiable,
    /// Resolution of a class failed because its declaration could not be analysed.
    Resolution,
    /// An instance could not be downcast to the requested type.
    TypeMismatch,
    /// A constructor asked for an argument slot the container left empty.
    MissingArgument,
    /// A user factory or constructor reported a failure.
    Factory,
}

/// Container error structure.
///
/// `kind` enables programmatic handling, while `message` is human-readable.
#[derive(Clone, Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    /// Identifiers on the build stack when the error was raised, outermost first.
    pub chain: Vec<String>,
    cause: Option<Box<Error>>,
}

impl Error {
    /// Creates a new error with the given kind and message.
    ///
    /// If the `tracing` feature is enabled, the error is automatically logged.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let error = Self {
            kind,
            message: message.into(),
            chain: Vec::new(),
            cause: None,
        };

        #[cfg(feature = "tracing")]
        error!("{}", error);

        error
    }

    pub fn parse(detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::Parse,
            format!("Failed to parse declaration source: {}", detail),
        )
    }

    pub fn analysis(detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::Analysis,
            format!("Failed to analyse declaration: {}", detail),
        )
    }

    /// Circular dependency detected in resolution chain.
    ///
    /// The last element of `dependency_chain` is the offending identifier.
    pub fn circular_dependency(dependency_chain: &[&str]) -> Self {
        let mut error = Self::new(
            ErrorKind::CircularDependency,
            format!(
                "Circular dependency detected: {}",
                dependency_chain.join(" -> ")
            ),
        );
        error.chain = dependency_chain.iter().map(|s| s.to_string()).collect();
        error
    }

    pub fn binding_not_found(identifier: &str) -> Self {
        Self::new(
            ErrorKind::BindingNotFound,
            format!("No binding registered for identifier: {}", identifier),
        )
    }

    pub fn not_instantiable(identifier: &str, reason: &str) -> Self {
        Self::new(
            ErrorKind::NotInstantiable,
            format!("Target [{}] is not instantiable: {}", identifier, reason),
        )
    }

    /// Wraps a parse or analysis failure raised while resolving `identifier`.
    pub fn resolution(identifier: &str, cause: Error) -> Self {
        let mut error = Self::new(
            ErrorKind::Resolution,
            format!("Unable to resolve [{}]: {}", identifier, cause.message),
        );
        error.cause = Some(Box::new(cause));
        error
    }

    /// Type mismatch during downcast of a resolved instance or argument.
    pub fn type_mismatch(type_name: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("Type mismatch when resolving: {}", type_name),
        )
    }

    pub fn missing_argument(class: &str, position: usize) -> Self {
        Self::new(
            ErrorKind::MissingArgument,
            format!("Missing argument {} for [{}]", position, class),
        )
    }

    /// Failure reported by application code inside a factory or constructor.
    pub fn factory(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Factory, message)
    }

    /// Returns the wrapped cause of a [`ErrorKind::Resolution`] error.
    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_deref()
    }

    pub fn with_chain(mut self, chain: Vec<String>) -> Self {
        self.chain = chain;
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}) - {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Alias of [`core::result::Result`] with [`Error`] as the default error type.
pub type Result<T, E = Error> = core::result::Result<T, E>;
