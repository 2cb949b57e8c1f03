//! Contains the errors reported by the conformance checker.

use conformc_arena::ID;
use conformc_declaration::{
    entity::{Implementation, Struct},
    signature::Requirement,
    Model,
};
use conformc_diagnostic::{Diagnostic, Related, Report};
use enum_as_inner::EnumAsInner;

use crate::checker::Origin;

fn origin_to_string(model: &Model, origin: Origin) -> String {
    match origin {
        Origin::Trait(trait_id) => model.get_trait(trait_id).map_or_else(
            || format!("{trait_id:?}"),
            |x| format!("trait `{}`", x.name()),
        ),
        Origin::Implicit => "every struct".to_owned(),
        Origin::Conversion(struct_id) => model.get_struct(struct_id).map_or_else(
            || format!("{struct_id:?}"),
            |x| format!("materialization of `{}`", x.name()),
        ),
    }
}

fn struct_name(model: &Model, struct_id: ID<Struct>) -> String {
    model
        .get_struct(struct_id)
        .map_or_else(|| format!("{struct_id:?}"), |x| x.name().clone())
}

/// No implementation of the struct satisfies a requirement, and none could be
/// synthesized.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("{struct_id:?} does not implement {requirement:?} required by {origin:?}")]
pub struct MissingRequirement {
    /// The struct being checked.
    pub struct_id: ID<Struct>,

    /// The trait (or implicit rule) the requirement comes from.
    pub origin: Origin,

    /// The first requirement in order that is not satisfied.
    pub requirement: Requirement,
}

impl Report<&Model> for MissingRequirement {
    fn report(&self, model: &Model) -> Diagnostic {
        let requirement = model.signature_to_string(&self.requirement);

        Diagnostic::error(format!(
            "struct `{}` does not implement `{requirement}`",
            struct_name(model, self.struct_id),
        ))
        .with_related(Related::new(
            origin_to_string(model, self.origin),
            format!("requires `{requirement}`"),
        ))
    }
}

/// More than one implementation of the struct satisfies a requirement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error(
    "{struct_id:?} has {} implementations of {requirement:?}",
    .candidates.len()
)]
pub struct AmbiguousImplementation {
    /// The struct being checked.
    pub struct_id: ID<Struct>,

    /// The trait (or implicit rule) the requirement comes from.
    pub origin: Origin,

    /// The ambiguous requirement.
    pub requirement: Requirement,

    /// Every matching implementation, in declaration order.
    pub candidates: Vec<ID<Implementation>>,
}

impl Report<&Model> for AmbiguousImplementation {
    fn report(&self, model: &Model) -> Diagnostic {
        let name = struct_name(model, self.struct_id);
        let requirement = model.signature_to_string(&self.requirement);

        let mut diagnostic = Diagnostic::error(format!(
            "struct `{name}` has {} implementations of `{requirement}` \
             required by {}",
            self.candidates.len(),
            origin_to_string(model, self.origin)
        ))
        .with_help("remove all but one of the candidates");

        let declared = model.get_struct(self.struct_id);
        for candidate in &self.candidates {
            let signature = declared
                .and_then(|x| x.implementations().get(*candidate))
                .map_or_else(
                    || format!("{candidate:?}"),
                    |x| model.signature_to_string(x.signature()),
                );

            diagnostic = diagnostic.with_related(Related::new(
                format!("struct `{name}`"),
                format!("candidate `{signature}`"),
            ));
        }

        diagnostic
    }
}

/// Any error reported by the conformance checker.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error,
    EnumAsInner,
)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    MissingRequirement(#[from] MissingRequirement),

    #[error(transparent)]
    AmbiguousImplementation(#[from] AmbiguousImplementation),
}

impl Report<&Model> for Error {
    fn report(&self, model: &Model) -> Diagnostic {
        match self {
            Self::MissingRequirement(error) => error.report(model),
            Self::AmbiguousImplementation(error) => error.report(model),
        }
    }
}
