//! Runtime type definitions for shared ownership and interior mutability.
//!
//! The container is single-threaded and synchronous, so these aliases resolve
//! to the non-atomic types:
//!
//! - [`Shared<T>`]: `Rc<T>`, shared ownership of resolved instances
//! - [`Store<T>`]: `RefCell<T>`, interior mutability for registry state
//! - [`Instance`]: a type-erased resolved value
//!
//! # Examples
//!
//! ```
//! use weft::runtime::{Shared, Store, instance};
//!
//! let store = Store::new(42);
//! let shared = Shared::new(store);
//! assert_eq!(*shared.borrow(), 42);
//!
//! let value = instance(String::from("bar"));
//! assert_eq!(value.downcast_ref::<String>().map(String::as_str), Some("bar"));
//! ```

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};

/// Smart pointer for shared ownership of resolved instances.
pub type Shared<T> = Rc<T>;

/// Interior mutability with runtime borrow checking.
pub type Store<T> = RefCell<T>;

/// A resolved, type-erased instance.
pub type Instance = Shared<dyn Any>;

/// Wraps a value into an [`Instance`].
pub fn instance<T: Any>(value: T) -> Instance {
    Shared::new(value)
}

/// Downcasts an [`Instance`] to a concrete type, keeping shared ownership.
pub fn downcast<T: Any>(instance: Instance) -> Result<Shared<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| Error::type_mismatch(std::any::type_name::<T>()))
}
