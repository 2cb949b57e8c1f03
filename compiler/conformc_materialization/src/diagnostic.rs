//! Contains the errors reported by the materialization resolver.

use conformc_arena::ID;
use conformc_conformance::AmbiguousImplementation;
use conformc_declaration::{
    entity::{Implementation, OperationRef, Struct},
    Model,
};
use conformc_diagnostic::{Diagnostic, Related, Report};
use enum_as_inner::EnumAsInner;

use crate::value::TransitionContext;

fn struct_name(model: &Model, struct_id: ID<Struct>) -> String {
    model
        .get_struct(struct_id)
        .map_or_else(|| format!("{struct_id:?}"), |x| x.name().clone())
}

/// The target type of a restricted value has no constructor taking it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("{restricted:?} cannot be materialized into {target:?} at {site}")]
pub struct NoMaterializationPath {
    /// Where the runtime value is required.
    pub site: TransitionContext,

    /// The type of the value.
    pub restricted: ID<Struct>,

    /// The materialization target of the type.
    pub target: ID<Struct>,
}

impl Report<&Model> for NoMaterializationPath {
    fn report(&self, model: &Model) -> Diagnostic {
        let restricted = struct_name(model, self.restricted);
        let target = struct_name(model, self.target);

        Diagnostic::error(format!(
            "a value of type `{restricted}` is used as a runtime value but \
             `{target}` has no constructor taking `{restricted}`"
        ))
        .with_related(Related::new(
            self.site.to_string(),
            "requires a runtime value".to_owned(),
        ))
        .with_help(format!(
            "declare `__init__` on `{target}` with a single `{restricted}` \
             parameter"
        ))
    }
}

/// An operation reachable from a parameter-domain expression can not be
/// evaluated at compile time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("{operation:?} is not always-inline; reached at {site}")]
pub struct NonInlinableOperation {
    /// Where the runtime value is required.
    pub site: TransitionContext,

    /// The reached operation.
    pub operation: OperationRef,

    /// The overload lacking the inline marker, or `None` if the struct
    /// defines no operation under that key.
    pub implementation: Option<ID<Implementation>>,
}

impl Report<&Model> for NonInlinableOperation {
    fn report(&self, model: &Model) -> Diagnostic {
        let owner = struct_name(model, self.operation.struct_id);
        let subject = format!("`{owner}.{}`", self.operation.name);

        let diagnostic = Diagnostic::error(format!(
            "{subject} can not be evaluated at compile time"
        ))
        .with_related(Related::new(
            self.site.to_string(),
            "materializes a value computed with it".to_owned(),
        ));

        match self.implementation {
            Some(_) => diagnostic
                .with_help("mark the operation as always-inline".to_owned()),
            None => diagnostic.with_help(format!(
                "`{owner}` defines no {:?} named `{}`",
                self.operation.kind, self.operation.name
            )),
        }
    }
}

/// Any error reported by the materialization resolver.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error,
    EnumAsInner,
)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    NoMaterializationPath(#[from] NoMaterializationPath),

    #[error(transparent)]
    NonInlinableOperation(#[from] NonInlinableOperation),

    #[error(transparent)]
    AmbiguousImplementation(#[from] AmbiguousImplementation),
}

impl Report<&Model> for Error {
    fn report(&self, model: &Model) -> Diagnostic {
        match self {
            Self::NoMaterializationPath(error) => error.report(model),
            Self::NonInlinableOperation(error) => error.report(model),
            Self::AmbiguousImplementation(error) => error.report(model),
        }
    }
}
