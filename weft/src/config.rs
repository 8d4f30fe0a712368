//! Container configuration.
//!
//! ```
//! use weft::{Container, ContainerConfig};
//!
//! let config = ContainerConfig::default()
//!     .strict_analysis(false)
//!     .constructor("create");
//! let container = Container::with_config(config);
//! assert_eq!(container.config().constructor, "create");
//! ```

/// Tunables of a [`Container`](crate::Container).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Analyse class declarations to inject constructor parameters. When off,
    /// classes only receive the caller's explicit arguments.
    pub auto_resolve: bool,
    /// Propagate parse and analysis failures as resolution errors. When off,
    /// the failure is logged and the class is built from explicit arguments.
    pub strict_analysis: bool,
    /// Only auto-resolve classes whose metadata marks them injectable.
    pub require_injectable: bool,
    /// Associated function treated as the constructor in `impl` blocks.
    pub constructor: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            auto_resolve: true,
            strict_analysis: true,
            require_injectable: false,
            constructor: "new".to_string(),
        }
    }
}

impl ContainerConfig {
    pub fn auto_resolve(mut self, enabled: bool) -> Self {
        self.auto_resolve = enabled;
        self
    }

    pub fn strict_analysis(mut self, enabled: bool) -> Self {
        self.strict_analysis = enabled;
        self
    }

    pub fn require_injectable(mut self, enabled: bool) -> Self {
        self.require_injectable = enabled;
        self
    }

    /// Renames the associated function treated as the constructor.
    pub fn constructor(mut self, name: impl Into<String>) -> Self {
        self.constructor = name.into();
        self
    }
}
