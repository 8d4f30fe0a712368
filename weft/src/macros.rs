//! Macros for terse registration.
//!
//! - [`bind!`]: one registration (transient, singleton, or instance).
//! - [`container!`]: build a container from several `bind(..)` statements.
//!
//! # Example
//! ```
//! use weft::{Class, Concrete, container};
//!
//! struct Clock;
//! let clock = Class::new("Clock", "struct Clock;", |_| Ok(Clock));
//!
//! let c = container! {
//!     bind("greeting" => Concrete::factory(|_, _| Ok("hello")))
//!     bind(singleton &clock)
//!     bind(singleton "answer" => Concrete::value(42u32))
//!     bind(instance "port" => 8080u16)
//! };
//!
//! assert_eq!(*c.make_as::<&str>("greeting").unwrap(), "hello");
//! assert!(c.make_as::<Clock>(&clock).is_ok());
//! ```

/// Registers one binding on a container.
///
/// - `id => concrete`: transient binding.
/// - `singleton id => concrete`: shared binding.
/// - `singleton id`: a class bound to itself as a singleton.
/// - `instance id => value`: a pre-built shared value.
#[macro_export]
macro_rules! bind {
    ($container:expr, singleton $id:expr => $concrete:expr) => {{
        $container.singleton(
            $id,
            Some(::core::convert::Into::<$crate::Concrete>::into($concrete)),
        );
    }};

    ($container:expr, singleton $id:expr) => {{
        $container.singleton($id, None);
    }};

    ($container:expr, instance $id:expr => $value:expr) => {{
        $container.instance($id, $value);
    }};

    ($container:expr, $id:expr => $concrete:expr) => {{
        $container.bind($id, $concrete, false);
    }};
}

/// Composes a container from several `bind(..)` statements.
#[macro_export]
macro_rules! container {
    (
        $(
            bind( $($stmt:tt)* )
        )*
    ) => {{
        let container = $crate::Container::new();

        $(
            $crate::bind!(container, $($stmt)*);
        )*

        container
    }};
}
