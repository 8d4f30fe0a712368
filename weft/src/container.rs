//! The dependency injection container.
//!
//! Public API:
//! - `bind` / `singleton` / `instance`: register what an identifier resolves to
//! - `when(..).needs(..).give(..)`: consumer-scoped overrides
//! - `annotate` / `declare`: feed the metadata side table and type-name declarations
//! - `make` / `make_with` / `make_as` / `make_as_with`: resolve an identifier
//! - `bound` / `resolved` / `forget_instance` / `flush`: inspect and reset state
//!
//! Resolution precedence for one constructor parameter slot, highest first:
//! explicit argument, contextual override, registry binding, self-resolution
//! of a class identifier, and finally the parameter's own default (an empty
//! slot the constructor fills in).
//!
//! The container is single-threaded; no registry borrow is held while a
//! factory, constructor or nested resolution runs, so factories may call back
//! into the container freely.

use std::any::Any;

#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

use crate::analyser::{FunctionAnalyser, ParameterDescriptor, Reference};
use crate::binding::{BindingRegistry, Concrete};
use crate::class::{Arguments, ClassRef};
use crate::config::ContainerConfig;
use crate::contextual::{ContextualBindingBuilder, ContextualBindings};
use crate::error::{Error, ErrorKind, Result};
use crate::identifier::Identifier;
use crate::metadata::{Metadata, MetadataTable};
use crate::resolve_guard::BuildStack;
use crate::runtime::{Instance, Shared, Store, downcast, instance};

/// The DI container.
#[derive(Debug)]
pub struct Container {
    config: ContainerConfig,
    registry: Store<BindingRegistry>,
    contextual: Store<ContextualBindings>,
    metadata: Store<MetadataTable>,
    stack: BuildStack,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// Creates an empty container with the default [`ContainerConfig`].
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// Creates an empty container with `config`.
    pub fn with_config(config: ContainerConfig) -> Self {
        #[cfg(feature = "tracing")]
        info!("Creating container with {:?}", config);

        Self {
            config,
            registry: Store::new(BindingRegistry::new()),
            contextual: Store::new(ContextualBindings::default()),
            metadata: Store::new(MetadataTable::default()),
            stack: BuildStack::default(),
        }
    }

    /// The configuration this container was created with.
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Registers `concrete` under `identifier`, replacing any previous binding
    /// and evicting its cached singleton.
    pub fn bind(
        &self,
        identifier: impl Into<Identifier>,
        concrete: impl Into<Concrete>,
        shared: bool,
    ) -> &Self {
        let identifier = identifier.into();
        let concrete = concrete.into();

        #[cfg(feature = "tracing")]
        debug!("Binding {} to {:?} (shared: {})", identifier, concrete, shared);

        self.registry.borrow_mut().bind(identifier, concrete, shared);
        self
    }

    /// Registers a shared binding. Without a concrete, a class identifier is
    /// bound to itself.
    pub fn singleton(&self, identifier: impl Into<Identifier>, concrete: Option<Concrete>) -> &Self {
        let identifier = identifier.into();
        let concrete = concrete.unwrap_or_else(|| Concrete::of(&identifier));
        self.bind(identifier, concrete, true)
    }

    /// Registers an already built value as the shared instance of `identifier`.
    pub fn instance<T: Any>(&self, identifier: impl Into<Identifier>, value: T) -> &Self {
        let identifier = identifier.into();
        let value = instance(value);

        #[cfg(feature = "tracing")]
        debug!("Registering instance for {}", identifier);

        let mut registry = self.registry.borrow_mut();
        registry.bind(identifier.clone(), Concrete::Value(value.clone()), true);
        registry.cache(identifier, value);
        self
    }

    /// Makes a class name or interface marker resolvable from declaration
    /// sources without binding it.
    pub fn declare(&self, identifier: impl Into<Identifier>) -> &Self {
        self.registry.borrow_mut().declare(&identifier.into());
        self
    }

    /// Attaches decoration metadata to `class`.
    pub fn annotate(&self, class: &ClassRef, metadata: Metadata) -> &Self {
        self.registry.borrow_mut().declare(&Identifier::from(class));
        self.metadata.borrow_mut().annotate(class, metadata);
        self
    }

    /// Starts a contextual binding for `consumer`.
    pub fn when(&self, consumer: impl Into<Identifier>) -> ContextualBindingBuilder<'_> {
        ContextualBindingBuilder::new(self, vec![consumer.into()])
    }

    /// Starts a contextual binding shared by several consumers.
    pub fn when_any<I>(&self, consumers: I) -> ContextualBindingBuilder<'_>
    where
        I: IntoIterator,
        I::Item: Into<Identifier>,
    {
        ContextualBindingBuilder::new(self, consumers.into_iter().map(Into::into).collect())
    }

    pub(crate) fn add_contextual_binding(
        &self,
        consumer: Identifier,
        dependency: Identifier,
        implementation: Concrete,
    ) {
        {
            // An override never takes over a type name already in use.
            let mut registry = self.registry.borrow_mut();
            registry.declare_unclaimed(&consumer);
            registry.declare_unclaimed(&dependency);
            if let Concrete::Class(class) = &implementation {
                registry.declare_unclaimed(&Identifier::Class(class.clone()));
            }
        }
        self.contextual
            .borrow_mut()
            .insert(consumer, dependency, implementation);
    }

    #[cfg(test)]
    pub(crate) fn contextual_binding_count(&self) -> usize {
        self.contextual.borrow().len()
    }

    /// Whether `identifier` has a binding or a cached instance.
    pub fn bound(&self, identifier: impl Into<Identifier>) -> bool {
        let identifier = identifier.into();
        let registry = self.registry.borrow();
        registry.contains(&identifier) || registry.cached(&identifier).is_some()
    }

    /// Whether a shared instance of `identifier` is cached.
    pub fn resolved(&self, identifier: impl Into<Identifier>) -> bool {
        self.registry.borrow().cached(&identifier.into()).is_some()
    }

    /// Drops the cached instance of `identifier`; the next `make` builds a new one.
    pub fn forget_instance(&self, identifier: impl Into<Identifier>) -> &Self {
        self.registry.borrow_mut().forget(&identifier.into());
        self
    }

    /// Drops all bindings, cached instances, declarations, contextual bindings
    /// and metadata. The configuration is kept.
    pub fn flush(&self) {
        #[cfg(feature = "tracing")]
        info!("Flushing container");

        self.registry.borrow_mut().clear();
        self.contextual.borrow_mut().clear();
        self.metadata.borrow_mut().clear();
    }

    /// Resolves `identifier`.
    pub fn make(&self, identifier: impl Into<Identifier>) -> Result<Instance> {
        self.resolve(identifier.into(), Vec::new())
    }

    /// Resolves `identifier`, passing `args` positionally. Explicit arguments
    /// take precedence over injected ones and bypass the singleton cache.
    pub fn make_with(&self, identifier: impl Into<Identifier>, args: Vec<Instance>) -> Result<Instance> {
        self.resolve(identifier.into(), args)
    }

    /// Resolves `identifier` and downcasts the result to `T`.
    pub fn make_as<T: Any>(&self, identifier: impl Into<Identifier>) -> Result<Shared<T>> {
        downcast(self.make(identifier)?)
    }

    pub fn make_as_with<T: Any>(
        &self,
        identifier: impl Into<Identifier>,
        args: Vec<Instance>,
    ) -> Result<Shared<T>> {
        downcast(self.make_with(identifier, args)?)
    }

    fn resolve(&self, identifier: Identifier, args: Vec<Instance>) -> Result<Instance> {
        let _guard = self.stack.push(&identifier)?;

        #[cfg(feature = "tracing")]
        debug!("Resolving {} (depth {})", identifier, self.stack.depth());

        let contextual = self.contextual_concrete(&identifier);
        let needs_contextual_build = contextual.is_some() || !args.is_empty();

        if !needs_contextual_build {
            let cached = self.registry.borrow().cached(&identifier);
            if let Some(cached) = cached {
                return Ok(cached);
            }
        }

        let (concrete, shared) = match contextual {
            Some(concrete) => (concrete, false),
            None => self.binding_for(&identifier)?,
        };

        let resolved = self.build(&identifier, concrete, args)?;

        if shared && !needs_contextual_build {
            #[cfg(feature = "tracing")]
            debug!("Caching shared instance of {}", identifier);

            self.registry
                .borrow_mut()
                .cache(identifier, resolved.clone());
        }

        Ok(resolved)
    }

    fn contextual_concrete(&self, dependency: &Identifier) -> Option<Concrete> {
        let bindings = self.contextual.borrow();
        if bindings.is_empty() {
            return None;
        }
        self.stack
            .consumer()
            .iter()
            .find_map(|consumer| bindings.get(consumer, dependency).cloned())
    }

    fn binding_for(&self, identifier: &Identifier) -> Result<(Concrete, bool)> {
        let binding = self.registry.borrow().get(identifier).cloned();
        if let Some(binding) = binding {
            return Ok((binding.concrete, binding.shared));
        }

        match identifier {
            Identifier::Class(class) => Ok((Concrete::Class(class.clone()), false)),
            _ => Err(Error::binding_not_found(&identifier.to_string())
                .with_chain(self.stack.snapshot())),
        }
    }

    fn build(&self, identifier: &Identifier, concrete: Concrete, args: Vec<Instance>) -> Result<Instance> {
        match concrete {
            Concrete::Factory(factory) => {
                #[cfg(feature = "tracing")]
                debug!("Invoking factory for {}", identifier);

                factory(self, &args)
            }
            Concrete::Value(value) => Ok(value),
            Concrete::Alias(target) if &target == identifier => Err(Error::not_instantiable(
                &identifier.to_string(),
                "bound to itself without a concrete",
            )),
            Concrete::Alias(target) => self.resolve(target, args),
            Concrete::Class(class) => self.construct(&class, args),
        }
    }

    fn construct(&self, class: &ClassRef, explicit: Vec<Instance>) -> Result<Instance> {
        self.stack.attach(class);

        let metadata = self
            .metadata
            .borrow()
            .get(class)
            .cloned()
            .unwrap_or_default();

        if self.config.require_injectable && !metadata.injectable {
            return Err(Error::not_instantiable(class.name(), "not marked injectable"));
        }

        if !self.config.auto_resolve {
            return class.instantiate(Arguments::explicit(class.name(), explicit));
        }

        let analyser = match FunctionAnalyser::analyse(class.source(), &self.config.constructor) {
            Ok(analyser) => analyser,
            Err(err) if self.config.strict_analysis => {
                return Err(Error::resolution(class.name(), err).with_chain(self.stack.snapshot()));
            }
            Err(_err) => {
                #[cfg(feature = "tracing")]
                warn!(
                    "Building {} without injected parameters: {}",
                    class.name(),
                    _err
                );

                return class.instantiate(Arguments::explicit(class.name(), explicit));
            }
        };

        if !analyser.has_body() {
            return Err(Error::not_instantiable(class.name(), "declaration has no body"));
        }

        let Some(parameters) = analyser.parameter_analyser() else {
            return class.instantiate(Arguments::explicit(class.name(), explicit));
        };

        let mut explicit = explicit.into_iter();
        let mut slots = Vec::with_capacity(parameters.len());
        for (position, parameter) in parameters.injectable().enumerate() {
            let slot = match explicit.next() {
                Some(argument) => Some(argument),
                None => self.resolve_parameter(class, &metadata, position, parameter)?,
            };
            slots.push(slot);
        }
        let rest = explicit.collect();

        class.instantiate(Arguments::new(class.name(), slots, rest))
    }

    fn resolve_parameter(
        &self,
        class: &ClassRef,
        metadata: &Metadata,
        position: usize,
        parameter: &ParameterDescriptor,
    ) -> Result<Option<Instance>> {
        let identifier = metadata
            .identifier_for(position)
            .cloned()
            .or_else(|| parameter.contextual().map(|hint| self.identify(hint)))
            .or_else(|| parameter.type_reference().map(|name| self.identify_type(name)));

        let Some(identifier) = identifier else {
            if parameter.has_default() {
                return Ok(None);
            }
            return Err(Error::not_instantiable(
                class.name(),
                &format!("parameter `{}` names no dependency", parameter.name()),
            ));
        };

        // Only a miss on the parameter's own identifier leaves the slot empty.
        let own_depth = self.stack.depth() + 1;
        match self.resolve(identifier, Vec::new()) {
            Ok(resolved) => Ok(Some(resolved)),
            Err(err)
                if parameter.has_default()
                    && err.kind == ErrorKind::BindingNotFound
                    && err.chain.len() == own_depth =>
            {
                #[cfg(feature = "tracing")]
                debug!(
                    "Leaving defaulted parameter `{}` of {} empty",
                    parameter.name(),
                    class.name()
                );

                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn identify(&self, reference: &Reference) -> Identifier {
        match reference {
            Reference::Name(name) => Identifier::from(name.as_str()),
            Reference::Type(name) => self.identify_type(name),
        }
    }

    fn identify_type(&self, name: &str) -> Identifier {
        self.registry
            .borrow()
            .declared(name)
            .cloned()
            .unwrap_or_else(|| Identifier::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::Class;
    use crate::identifier::interface;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Database {
        url: String,
    }

    struct Repository {
        db: Shared<Database>,
    }

    fn database() -> ClassRef {
        Class::new("Database", "struct Database;", |_| {
            Ok(Database {
                url: "sqlite::memory:".to_string(),
            })
        })
    }

    fn repository() -> ClassRef {
        Class::new(
            "Repository",
            r#"
            struct Repository { db: Rc<Database> }

            impl Repository {
                fn new(db: Rc<Database>) -> Self {
                    Self { db }
                }
            }
            "#,
            |args| Ok(Repository { db: args.take(0)? }),
        )
    }

    #[test]
    fn factory_binding_resolves() {
        let container = Container::new();
        container.bind("foo", Concrete::factory(|_, _| Ok("bar")), false);

        let foo = container.make_as::<&str>("foo").unwrap();
        assert_eq!(*foo, "bar");
    }

    #[test]
    fn singleton_returns_same_instance() {
        let container = Container::new();
        let db = database();
        container.singleton(&db, None);

        let a1 = container.make_as::<Database>(&db).unwrap();
        let a2 = container.make_as::<Database>(&db).unwrap();
        assert!(Rc::ptr_eq(&a1, &a2));
        assert!(container.resolved(&db));
    }

    #[test]
    fn transient_returns_distinct_instances() {
        let container = Container::new();
        let db = database();
        container.bind(&db, &db, false);

        let a1 = container.make_as::<Database>(&db).unwrap();
        let a2 = container.make_as::<Database>(&db).unwrap();
        assert!(!Rc::ptr_eq(&a1, &a2));
        assert!(!container.resolved(&db));
    }

    #[test]
    fn rebinding_singleton_creates_fresh_instance() {
        let container = Container::new();
        container.singleton("config", Some(Concrete::factory(|_, _| Ok(1u32))));
        let first = container.make_as::<u32>("config").unwrap();

        container.singleton("config", Some(Concrete::factory(|_, _| Ok(2u32))));
        let second = container.make_as::<u32>("config").unwrap();

        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(*second, 2);
    }

    #[test]
    fn unbound_class_resolves_itself() {
        let container = Container::new();
        let db = database();

        let resolved = container.make_as::<Database>(&db).unwrap();
        assert_eq!(resolved.url, "sqlite::memory:");
        assert!(!container.resolved(&db));
    }

    #[test]
    fn parameter_typed_as_bound_class_is_injected() {
        let container = Container::new();
        let db = database();
        let repo = repository();
        container.singleton(&db, None);

        let repository = container.make_as::<Repository>(&repo).unwrap();
        let shared = container.make_as::<Database>(&db).unwrap();
        assert!(Rc::ptr_eq(&repository.db, &shared));
    }

    #[test]
    fn declared_class_is_injected_without_binding() {
        let container = Container::new();
        let db = database();
        container.declare(&db);

        let repository = container.make_as::<Repository>(&repository()).unwrap();
        assert_eq!(repository.db.url, "sqlite::memory:");
        assert!(!container.bound(&db));
    }

    #[test]
    fn unknown_name_is_binding_not_found() {
        let container = Container::new();
        let err = container.make("missing").unwrap_err();
        assert_eq!(err.kind, ErrorKind::BindingNotFound);
        assert!(err.message.contains("missing"));
    }

    #[test]
    fn missing_dependency_reports_chain() {
        let container = Container::new();
        let err = container.make(&repository()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BindingNotFound);
        assert_eq!(err.chain, vec!["Repository", "Database"]);
    }

    #[test]
    fn circular_dependency_is_fatal() {
        let container = Container::new();
        let a = Class::new("A", "fn new(b: B) -> A { todo!() }", |args| {
            args.take::<()>(0)?;
            Ok(())
        });
        let b = Class::new("B", "fn new(a: A) -> B { todo!() }", |args| {
            args.take::<()>(0)?;
            Ok(())
        });
        container.singleton(&a, None);
        container.singleton(&b, None);

        let err = container.make(&a).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CircularDependency);
        assert_eq!(err.chain, vec!["A", "B", "A"]);
        assert!(!container.resolved(&a));
        assert!(!container.resolved(&b));

        // The build stack unwound; unrelated resolutions still work.
        container.bind("ok", Concrete::value(()), false);
        assert!(container.make("ok").is_ok());
    }

    #[test]
    fn self_dependency_is_circular() {
        let container = Container::new();
        container.bind("loop", Concrete::alias("loop2"), false);
        container.bind("loop2", Concrete::alias("loop"), false);

        let err = container.make("loop").unwrap_err();
        assert_eq!(err.kind, ErrorKind::CircularDependency);
    }

    #[test]
    fn zero_parameter_class_needs_nothing_else() {
        let container = Container::new();
        let clock = Class::new("Clock", "impl Clock { fn new() -> Self { Clock } }", |args| {
            assert!(args.is_empty());
            Ok(42u64)
        });
        assert_eq!(*container.make_as::<u64>(&clock).unwrap(), 42);
    }

    #[test]
    fn contextual_binding_only_applies_to_consumer() {
        let container = Container::new();
        let db = database();
        let repo = repository();

        container.singleton(&db, None);
        container.when(&repo).needs(&db).give(Concrete::factory(|_, _| {
            Ok(Database {
                url: "postgres://reports".to_string(),
            })
        }));

        // Cache the default first; the override must still win under the consumer.
        let top_level = container.make_as::<Database>(&db).unwrap();
        let repository = container.make_as::<Repository>(&repo).unwrap();

        assert_eq!(repository.db.url, "postgres://reports");
        assert_eq!(top_level.url, "sqlite::memory:");
        assert_eq!(container.make_as::<Database>(&db).unwrap().url, "sqlite::memory:");
    }

    #[test]
    fn contextual_binding_matches_consumer_identifier() {
        let container = Container::new();
        let repo = repository();
        let db = database();
        container.declare(&db);
        container.bind("reports", &repo, false);
        container
            .when("reports")
            .needs(&db)
            .give(Concrete::factory(|_, _| {
                Ok(Database {
                    url: "reports".to_string(),
                })
            }));

        let repository = container.make_as::<Repository>("reports").unwrap();
        assert_eq!(repository.db.url, "reports");
    }

    #[test]
    fn contextual_binding_applies_inside_factories() {
        let container = Container::new();
        container.bind("name", Concrete::factory(|_, _| Ok("world")), false);
        container.bind(
            "greeting",
            Concrete::factory(|c, _| Ok(format!("hello {}", c.make_as::<&str>("name")?))),
            false,
        );
        container
            .when("greeting")
            .needs("name")
            .give(Concrete::value("weft"));

        assert_eq!(*container.make_as::<String>("greeting").unwrap(), "hello weft");
        assert_eq!(*container.make_as::<&str>("name").unwrap(), "world");
    }

    #[test]
    fn interface_bound_to_class_is_injected_by_hint() {
        trait Logger {
            fn name(&self) -> &'static str;
        }
        struct FileLogger;
        impl Logger for FileLogger {
            fn name(&self) -> &'static str {
                "file"
            }
        }
        struct Service {
            logger: Rc<dyn Logger>,
        }

        let container = Container::new();
        let logger = interface("Logger");
        let file_logger = Class::new("FileLogger", "struct FileLogger;", |_| {
            Ok(Rc::new(FileLogger) as Rc<dyn Logger>)
        });
        let service = Class::new(
            "Service",
            "fn new(#[inject(Logger)] logger: Rc<dyn Logger>) -> Service { todo!() }",
            |args| {
                let logger = args.take::<Rc<dyn Logger>>(0)?;
                Ok(Service {
                    logger: Rc::clone(&*logger),
                })
            },
        );

        container.bind(&logger, &file_logger, false);

        let resolved = container.make_as::<Service>(&service).unwrap();
        assert_eq!(resolved.logger.name(), "file");
    }

    #[test]
    fn metadata_identifier_overrides_type() {
        struct Mailer {
            transport: Shared<String>,
        }

        let container = Container::new();
        let transport = interface("Transport");
        let mailer = Class::new("Mailer", "struct Mailer { transport: Box<dyn Any> }", |args| {
            Ok(Mailer {
                transport: args.take(0)?,
            })
        });

        container.bind(&transport, Concrete::factory(|_, _| Ok("smtp".to_string())), true);
        container.annotate(&mailer, Metadata::injectable().parameter(0, &transport));

        let resolved = container.make_as::<Mailer>(&mailer).unwrap();
        assert_eq!(*resolved.transport, "smtp");
    }

    #[test]
    fn string_hint_names_binding() {
        let container = Container::new();
        let dsn = Class::new("Dsn", r#"fn new(#[inject("db.url")] url: String) -> Dsn { todo!() }"#, |args| {
            Ok(args.take::<String>(0)?.to_uppercase())
        });
        container.instance("db.url", "sqlite".to_string());

        assert_eq!(*container.make_as::<String>(&dsn).unwrap(), "SQLITE");
    }

    #[test]
    fn explicit_arguments_take_precedence() {
        let container = Container::new();
        let db = database();
        let repo = repository();
        container.singleton(&db, None);
        container.singleton(&repo, None);

        let custom = instance(Database {
            url: "custom".to_string(),
        });
        let repository = container
            .make_as_with::<Repository>(&repo, vec![custom])
            .unwrap();

        assert_eq!(repository.db.url, "custom");
        assert!(!container.resolved(&repo));
        assert!(!container.resolved(&db));
    }

    #[test]
    fn defaulted_parameter_left_to_constructor() {
        let container = Container::new();
        let client = Class::new(
            "Client",
            "fn new(#[default] retries: Retries, timeout: Option<Timeout>) -> Client { todo!() }",
            |args| {
                let retries = args.take_or::<u32>(0, || 3)?;
                let timeout = args.optional::<u64>(1)?;
                Ok((*retries, timeout.map(|t| *t)))
            },
        );

        let resolved = container.make_as::<(u32, Option<u64>)>(&client).unwrap();
        assert_eq!(*resolved, (3, None));

        container.bind("Timeout", Concrete::value(30u64), false);
        let resolved = container.make_as::<(u32, Option<u64>)>(&client).unwrap();
        assert_eq!(*resolved, (3, Some(30)));
    }

    #[test]
    fn rest_parameter_is_not_injected() {
        let container = Container::new();
        container.bind("Prefix", Concrete::value("log"), false);
        let joiner = Class::new(
            "Joiner",
            "fn new(prefix: Prefix, #[rest] parts: Vec<Part>) -> Joiner { todo!() }",
            |args| {
                let prefix = args.take::<&str>(0)?;
                let parts: Vec<String> = args
                    .rest()
                    .into_iter()
                    .filter_map(|part| part.downcast_ref::<&str>().map(|s| s.to_string()))
                    .collect();
                Ok(format!("{}:{}", prefix, parts.join(",")))
            },
        );

        assert_eq!(*container.make_as::<String>(&joiner).unwrap(), "log:");

        let joined = container
            .make_as_with::<String>(
                &joiner,
                vec![instance("app"), instance("a"), instance("b")],
            )
            .unwrap();
        assert_eq!(*joined, "app:a,b");
    }

    #[test]
    fn factory_receives_explicit_arguments() {
        let container = Container::new();
        container.bind("count", Concrete::factory(|_, args| Ok(args.len())), false);

        let count = container
            .make_as_with::<usize>("count", vec![instance(1), instance(2)])
            .unwrap();
        assert_eq!(*count, 2);
    }

    #[test]
    fn parse_failure_surfaces_as_resolution_error() {
        let container = Container::new();
        let broken = Class::new("Broken", "struct {", |_| Ok(()));

        let err = container.make(&broken).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Resolution);
        assert_eq!(err.cause().map(|c| c.kind), Some(ErrorKind::Parse));
    }

    #[test]
    fn lenient_analysis_falls_back_to_explicit_arguments() {
        let container = Container::with_config(ContainerConfig::default().strict_analysis(false));
        let broken = Class::new("Broken", "fn a() {} fn b() {}", |args| Ok(args.len()));

        assert_eq!(*container.make_as::<usize>(&broken).unwrap(), 0);
        let with_args = container
            .make_as_with::<usize>(&broken, vec![instance(())])
            .unwrap();
        assert_eq!(*with_args, 1);
    }

    #[test]
    fn bodyless_declaration_is_not_instantiable() {
        let container = Container::new();
        let repository = Class::new("Repository", "trait Repository { fn find(&self); }", |_| Ok(()));

        let err = container.make(&repository).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotInstantiable);
    }

    #[test]
    fn require_injectable_gates_auto_resolution() {
        let container = Container::with_config(ContainerConfig::default().require_injectable(true));
        let db = database();

        let err = container.make(&db).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotInstantiable);

        container.annotate(&db, Metadata::injectable());
        assert!(container.make(&db).is_ok());
    }

    #[test]
    fn auto_resolve_disabled_uses_explicit_arguments_only() {
        let container = Container::with_config(ContainerConfig::default().auto_resolve(false));
        let counted = Class::new("Counted", "fn new(a: Missing) -> Counted { todo!() }", |args| {
            Ok(args.len())
        });

        assert_eq!(*container.make_as::<usize>(&counted).unwrap(), 0);
    }

    #[test]
    fn singleton_name_without_concrete_is_not_instantiable() {
        let container = Container::new();
        container.singleton("thing", None);

        let err = container.make("thing").unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotInstantiable);
    }

    #[test]
    fn alias_resolves_target() {
        let container = Container::new();
        let db = database();
        container.singleton(&db, None);
        container.bind("db", Concrete::alias(&db), false);

        let via_alias = container.make_as::<Database>("db").unwrap();
        let direct = container.make_as::<Database>(&db).unwrap();
        assert!(Rc::ptr_eq(&via_alias, &direct));
    }

    #[test]
    fn failed_build_is_not_cached() {
        let container = Container::new();
        let attempts = Rc::new(Cell::new(0));
        let counter = Rc::clone(&attempts);
        container.singleton(
            "flaky",
            Some(Concrete::factory(move |_, _| {
                counter.set(counter.get() + 1);
                if counter.get() == 1 {
                    Err(Error::factory("first attempt fails"))
                } else {
                    Ok(counter.get())
                }
            })),
        );

        assert_eq!(container.make("flaky").unwrap_err().kind, ErrorKind::Factory);
        assert!(!container.resolved("flaky"));
        assert_eq!(*container.make_as::<i32>("flaky").unwrap(), 2);
        assert_eq!(*container.make_as::<i32>("flaky").unwrap(), 2);
        assert_eq!(attempts.get(), 2);
    }

    #[test]
    fn typed_make_reports_mismatch() {
        let container = Container::new();
        container.instance("port", 8080u16);

        let err = container.make_as::<String>("port").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn forget_and_flush() {
        let container = Container::new();
        let db = database();
        container.singleton(&db, None);
        let first = container.make_as::<Database>(&db).unwrap();

        container.forget_instance(&db);
        let second = container.make_as::<Database>(&db).unwrap();
        assert!(!Rc::ptr_eq(&first, &second));

        container.flush();
        assert!(!container.bound(&db));
        assert!(!container.bound("anything"));
    }

    #[test]
    fn containers_are_independent() {
        let first = Container::new();
        let second = Container::new();
        first.instance("name", "first");

        assert!(first.bound("name"));
        assert!(!second.bound("name"));
    }

    #[test]
    fn contextual_class_does_not_leak_to_other_consumers() {
        struct Service {
            db: Shared<Database>,
        }

        let container = Container::new();
        let db = database();
        let repo = repository();
        let mock = Class::new("Database", "struct Database;", |_| {
            Ok(Database {
                url: "mock".to_string(),
            })
        });
        let service = Class::new(
            "Service",
            "fn new(db: Rc<Database>) -> Service { todo!() }",
            |args| Ok(Service { db: args.take(0)? }),
        );

        container.singleton(&db, None);
        container.when(&repo).needs(&db).give(&mock);

        let service = container.make_as::<Service>(&service).unwrap();
        let repository = container.make_as::<Repository>(&repo).unwrap();

        assert_eq!(service.db.url, "sqlite::memory:");
        assert_eq!(repository.db.url, "mock");
        assert!(container.resolved(&db));
    }

    #[test]
    fn singleton_concrete_with_same_name_stays_shared() {
        let container = Container::new();
        let db = Class::new("Database", "trait Database {}", |_| Ok(()));
        let postgres = Class::new("Database", "struct Database;", |_| {
            Ok(Database {
                url: "postgres".to_string(),
            })
        });
        container.singleton(&db, Some(Concrete::from(&postgres)));

        let first = container.make_as::<Repository>(&repository()).unwrap();
        let second = container.make_as::<Repository>(&repository()).unwrap();

        assert_eq!(first.db.url, "postgres");
        assert!(Rc::ptr_eq(&first.db, &second.db));
        assert!(container.resolved(&db));
    }

    #[test]
    fn defaulted_parameter_surfaces_errors_of_bound_dependency() {
        let container = Container::new();
        let cache = Class::new("Cache", "fn new(backend: Backend) -> Cache { todo!() }", |args| {
            args.take::<()>(0)?;
            Ok(())
        });
        let service = Class::new(
            "Service",
            "fn new(#[default] cache: Option<Cache>) -> Service { todo!() }",
            |args| Ok(args.optional::<()>(0)?.is_some()),
        );
        container.bind(&cache, &cache, false);

        let err = container.make(&service).unwrap_err();
        assert_eq!(err.kind, ErrorKind::BindingNotFound);
        assert_eq!(err.chain, vec!["Service", "Cache", "Backend"]);
    }

    #[test]
    fn flush_drops_metadata() {
        let container = Container::with_config(ContainerConfig::default().require_injectable(true));
        let db = database();
        container.annotate(&db, Metadata::injectable());
        assert!(container.make(&db).is_ok());

        container.flush();

        let err = container.make(&db).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotInstantiable);
    }

    #[test]
    fn public_bodyless_signature_is_not_instantiable() {
        let container = Container::new();
        let factory = Class::new("Factory", "pub fn new(db: Database) -> Self;", |_| Ok(()));

        let err = container.make(&factory).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotInstantiable);
    }
}
