//! Build stack guard for circular dependency detection.
//!
//! Every [`Container`](crate::Container) owns a [`BuildStack`] holding the
//! identifiers currently being resolved. [`BuildStack::push`] refuses an
//! identifier that is already on the stack and otherwise returns a
//! [`ResolveGuard`] that pops it again on drop, so the stack unwinds on both
//! success and error paths.
//!
//! Frames also remember the class being constructed for them, which lets
//! contextual bindings match a consumer either by the identifier it was
//! requested under or by its class.
//!
//! # Example
//! ```
//! use weft::{ErrorKind, Identifier, resolve_guard::BuildStack};
//!
//! let stack = BuildStack::default();
//! let _a = stack.push(&Identifier::from("A")).unwrap();
//! let _b = stack.push(&Identifier::from("B")).unwrap();
//! let err = stack.push(&Identifier::from("A")).unwrap_err();
//! assert_eq!(err.kind, ErrorKind::CircularDependency);
//! assert!(err.message.contains("A -> B -> A"));
//! ```

use crate::class::ClassRef;
use crate::error::{Error, Result};
use crate::identifier::Identifier;
use crate::runtime::Store;

#[derive(Debug)]
struct Frame {
    identifier: Identifier,
    class: Option<ClassRef>,
}

/// Identifiers being resolved in the active `make` call chain.
#[derive(Debug, Default)]
pub struct BuildStack {
    frames: Store<Vec<Frame>>,
}

impl BuildStack {
    /// Pushes `identifier`, failing with a circular dependency error if it is
    /// already being resolved.
    pub fn push(&self, identifier: &Identifier) -> Result<ResolveGuard<'_>> {
        let mut frames = self.frames.borrow_mut();
        if frames.iter().any(|frame| &frame.identifier == identifier) {
            let mut chain: Vec<String> = frames
                .iter()
                .map(|frame| frame.identifier.to_string())
                .collect();
            chain.push(identifier.to_string());
            let refs: Vec<&str> = chain.iter().map(|s| s.as_str()).collect();
            return Err(Error::circular_dependency(&refs));
        }
        frames.push(Frame {
            identifier: identifier.clone(),
            class: None,
        });
        Ok(ResolveGuard { stack: self })
    }

    /// Records the class being constructed for the top frame.
    pub fn attach(&self, class: &ClassRef) {
        if let Some(frame) = self.frames.borrow_mut().last_mut() {
            frame.class = Some(class.clone());
        }
    }

    /// Identifiers of the consumer one frame below the top: the identifier it
    /// was requested under, then its class if that differs.
    pub fn consumer(&self) -> Vec<Identifier> {
        let frames = self.frames.borrow();
        let Some(frame) = frames.len().checked_sub(2).and_then(|i| frames.get(i)) else {
            return Vec::new();
        };

        let mut identifiers = vec![frame.identifier.clone()];
        if let Some(class) = &frame.class {
            let class = Identifier::Class(class.clone());
            if class != frame.identifier {
                identifiers.push(class);
            }
        }
        identifiers
    }

    pub fn depth(&self) -> usize {
        self.frames.borrow().len()
    }

    /// Identifiers on the stack, outermost first.
    pub fn snapshot(&self) -> Vec<String> {
        self.frames
            .borrow()
            .iter()
            .map(|frame| frame.identifier.to_string())
            .collect()
    }
}

/// Pops the frame pushed by [`BuildStack::push`] on drop.
#[derive(Debug)]
pub struct ResolveGuard<'a> {
    stack: &'a BuildStack,
}

impl Drop for ResolveGuard<'_> {
    fn drop(&mut self) {
        self.stack.frames.borrow_mut().pop();
    }
}
