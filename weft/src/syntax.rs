//! Syntax tree provider.
//!
//! Thin adapter over `syn`: turns declaration source text into a
//! [`SyntaxTree`] and reports anything that is not valid Rust as a
//! [`ErrorKind::Parse`](crate::ErrorKind::Parse) error. Nothing is cached;
//! each call parses from scratch.

use syn::{ExprClosure, File, ForeignItemFn};

use crate::error::{Error, Result};

/// A parsed declaration source.
#[derive(Debug)]
pub enum SyntaxTree {
    /// One or more items: `fn`, `struct`, `impl`, `trait`, ...
    Items(File),
    /// A lone signature without a body, e.g. `fn new(db: Db) -> Self;`.
    Signature(ForeignItemFn),
    /// A closure expression.
    Closure(ExprClosure),
}

/// Parses `source`, trying a file of items, then a bare signature, then a
/// closure expression.
pub fn parse(source: &str) -> Result<SyntaxTree> {
    let file_error = match syn::parse_file(source) {
        Ok(file) => return Ok(SyntaxTree::Items(file)),
        Err(err) => err,
    };

    if let Ok(signature) = syn::parse_str::<ForeignItemFn>(source) {
        return Ok(SyntaxTree::Signature(signature));
    }

    if let Ok(closure) = syn::parse_str::<ExprClosure>(source) {
        return Ok(SyntaxTree::Closure(closure));
    }

    Err(Error::parse(file_error))
}
