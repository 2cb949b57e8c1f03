//! Contains the trait conformance checker.
//!
//! A [`Checker`] is created per analysis session over a read-only
//! [`Model`]. It answers three kinds of questions:
//!
//! - [`Checker::closure`]: which requirements does a trait impose, including
//!   everything inherited from its parents;
//! - [`matching::matches`]: does an implementation satisfy a requirement,
//!   modulo calling convention;
//! - [`Checker::check_conformance`]: does a struct satisfy every requirement
//!   of the traits it claims.
//!
//! The only state a [`Checker`] carries is the closure cache, so a single
//! checker can serve queries from several threads at once.

use conformc_declaration::Model;
use getset::CopyGetters;

pub mod checker;
pub mod closure;
pub mod diagnostic;
pub mod matching;

pub use checker::{Conformance, Obligation, Origin, Witness};
pub use diagnostic::{AmbiguousImplementation, Error, MissingRequirement};

/// The entry point of every conformance query of one analysis session.
#[derive(Debug, CopyGetters)]
pub struct Checker<'a> {
    /// The declaration graph the queries are answered against.
    #[get_copy = "pub"]
    model: &'a Model,

    closures: closure::Cache,
}

impl<'a> Checker<'a> {
    /// Creates a checker with empty caches.
    #[must_use]
    pub fn new(model: &'a Model) -> Self {
        Self { model, closures: closure::Cache::default() }
    }
}
