//! Contains the materialization resolver.
//!
//! Values of a restricted struct can only be computed at compile time. When
//! such a value flows into a context that needs a runtime value, it is
//! converted into the struct's target type through a constructor of the
//! target taking the restricted value. Before that, everything the value's
//! expression reaches must be evaluable at compile time.

use std::collections::HashSet;

use conformc_arena::ID;
use conformc_conformance::{Checker, Obligation, Origin, Witness};
use conformc_declaration::{
    entity::{OperationRef, Struct},
    signature::{Signature, Type},
    Model,
};
use getset::CopyGetters;

pub mod diagnostic;
pub mod input;
pub mod value;

use diagnostic::{Error, NoMaterializationPath, NonInlinableOperation};
use value::{
    Domain, Expression, Materialized, RuntimeValue, TransitionContext, Value,
};

/// Answers materialization queries against the conformance checker of the
/// same session.
#[derive(Debug, Clone, Copy, CopyGetters)]
pub struct Resolver<'a> {
    /// The checker used to look up conversion constructors.
    #[get_copy = "pub"]
    checker: &'a Checker<'a>,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver over the given checker.
    #[must_use]
    pub const fn new(checker: &'a Checker<'a>) -> Self { Self { checker } }

    fn model(&self) -> &'a Model { self.checker.model() }

    /// Returns the domain a value of the given type starts in.
    #[must_use]
    pub fn domain_of(&self, ty: ID<Struct>) -> Domain {
        if self.model()[ty].is_restricted() {
            Domain::Parameter
        } else {
            Domain::Runtime
        }
    }

    /// Resolves what flows into `context` when `value` is used there.
    ///
    /// Values of unrestricted types and values flowing into a parameter
    /// context are passed through unchanged. Otherwise every operation
    /// reachable from the expression must be always-inline, and the value is
    /// converted into the target type of its struct.
    ///
    /// # Errors
    ///
    /// - [`Error::NonInlinableOperation`] for the first reachable operation
    ///   that is not always-inline or does not exist.
    /// - [`Error::NoMaterializationPath`] if the target type has no
    ///   constructor taking the restricted type.
    /// - [`Error::AmbiguousImplementation`] if it has more than one.
    pub fn resolve_materialization(
        &self,
        value: Value,
        context: &TransitionContext,
    ) -> Result<Materialized, Error> {
        let restricted = value.ty;

        let policy = match self.model()[restricted].materialization() {
            Some(policy) if context.requires_runtime() => policy,
            _ => {
                return Ok(Materialized {
                    target: restricted,
                    domain: self.domain_of(restricted),
                    value: RuntimeValue::Unchanged(value),
                })
            }
        };

        let mut visited = HashSet::new();
        self.visit_expression(&value.expression, context, &mut visited)?;

        let obligation = Obligation {
            origin: Origin::Conversion(restricted),
            requirement: Signature::constructor(vec![Type::Struct(
                restricted,
            )]),
        };

        let constructor = match self.checker.satisfy(policy.target, &obligation)
        {
            Ok(Witness::Implementation(constructor)) => constructor,

            Ok(Witness::Synthesized)
            | Err(conformc_conformance::Error::MissingRequirement(_)) => {
                return Err(NoMaterializationPath {
                    site: context.clone(),
                    restricted,
                    target: policy.target,
                }
                .into());
            }

            Err(conformc_conformance::Error::AmbiguousImplementation(error)) => {
                return Err(error.into());
            }
        };

        log::debug!(
            "materialized `{}` into `{}` at {context} after checking {} \
             operation(s)",
            self.model()[restricted].name(),
            self.model()[policy.target].name(),
            visited.len()
        );

        Ok(Materialized {
            target: policy.target,
            domain: Domain::Runtime,
            value: RuntimeValue::Converted { constructor, argument: value },
        })
    }

    fn visit_expression(
        &self,
        expression: &Expression,
        site: &TransitionContext,
        visited: &mut HashSet<OperationRef>,
    ) -> Result<(), Error> {
        match expression {
            Expression::Literal(_) => Ok(()),

            Expression::Call { operation, arguments } => {
                self.visit_operation(operation, site, visited)?;

                for argument in arguments {
                    self.visit_expression(argument, site, visited)?;
                }

                Ok(())
            }
        }
    }

    /// Checks every overload under the operation's key, then everything they
    /// call. Each key is checked once.
    fn visit_operation(
        &self,
        operation: &OperationRef,
        site: &TransitionContext,
        visited: &mut HashSet<OperationRef>,
    ) -> Result<(), Error> {
        if !visited.insert(operation.clone()) {
            return Ok(());
        }

        log::trace!("visiting {operation:?} for {site}");

        let owner = &self.model()[operation.struct_id];
        let overloads = owner.implementations_of(operation.kind, &operation.name);

        let non_inlinable = |implementation| NonInlinableOperation {
            site: site.clone(),
            operation: operation.clone(),
            implementation,
        };

        if overloads.is_empty() {
            return Err(non_inlinable(None).into());
        }

        for id in overloads {
            let implementation = &owner.implementations()[*id];

            if !implementation.always_inline() {
                return Err(non_inlinable(Some(*id)).into());
            }

            for call in implementation.calls() {
                self.visit_operation(call, site, visited)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test;
