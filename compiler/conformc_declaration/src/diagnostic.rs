//! Contains the errors reported while building the declaration model.
//!
//! No model exists yet when these errors are produced, so every error refers
//! to the offending entities by their declared names.

use conformc_diagnostic::{Diagnostic, Related, Report};
use enum_as_inner::EnumAsInner;

use crate::signature::{Convention, Kind};

/// The trait inheritance graph contains a cycle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("cyclic inheritance through `{}` -> `{}`", .back_edge.0, .back_edge.1)]
pub struct CyclicInheritance {
    /// The edge `(child, parent)` that closed the cycle during the
    /// depth-first search.
    pub back_edge: (String, String),

    /// The traits forming the cycle, starting and ending at the parent end
    /// of the back edge.
    pub cycle: Vec<String>,
}

impl Report<()> for CyclicInheritance {
    fn report(&self, (): ()) -> Diagnostic {
        Diagnostic::error(format!(
            "trait `{}` inherits from itself",
            self.back_edge.1
        ))
        .with_related(Related::new(
            format!("trait `{}`", self.back_edge.0),
            format!("inherits `{}` here, closing the cycle", self.back_edge.1),
        ))
        .with_help(format!(
            "the inheritance cycle is {}",
            self.cycle
                .iter()
                .map(|name| format!("`{name}`"))
                .collect::<Vec<_>>()
                .join(" -> ")
        ))
    }
}

/// The reason a restricted struct is malformed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MalformedReason {
    /// The struct is restricted but names no target type.
    MissingTarget,

    /// The target type is itself restricted.
    RestrictedTarget {
        /// The name of the restricted target.
        target: String,
    },

    /// An operation of the struct is not marked for unconditional inlining.
    NonInlinableOperation {
        /// The kind of the offending operation.
        kind: Kind,

        /// The name of the offending operation.
        name: String,
    },
}

/// A struct restricted to the parameter domain violates its well-formedness
/// rules.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("restricted struct `{struct_name}` is malformed: {reason:?}")]
pub struct MalformedRestrictedType {
    /// The restricted struct.
    pub struct_name: String,

    /// What is wrong with it.
    pub reason: MalformedReason,
}

impl Report<()> for MalformedRestrictedType {
    fn report(&self, (): ()) -> Diagnostic {
        let subject = format!("struct `{}`", self.struct_name);

        match &self.reason {
            MalformedReason::MissingTarget => Diagnostic::error(format!(
                "{subject} is restricted to the parameter domain but has no \
                 target type"
            ))
            .with_help(
                "name the runtime type its values are materialized into",
            ),

            MalformedReason::RestrictedTarget { target } => {
                Diagnostic::error(format!(
                    "{subject} materializes into `{target}`, which is itself \
                     restricted to the parameter domain"
                ))
                .with_related(Related::new(
                    format!("struct `{target}`"),
                    "is restricted here".to_owned(),
                ))
                .with_help(
                    "a restricted type must materialize into a runtime type \
                     in a single step",
                )
            }

            MalformedReason::NonInlinableOperation { kind, name } => {
                Diagnostic::error(format!(
                    "{subject} is restricted to the parameter domain but its \
                     {kind:?} `{name}` is not marked always-inline"
                ))
                .with_help(
                    "every operation of a restricted type must be evaluable \
                     at compile time",
                )
            }
        }
    }
}

/// The category of a name that failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SymbolKind {
    /// A trait name.
    Trait,

    /// A struct name (a type or the owner of a called operation).
    Struct,
}

/// A referenced name does not exist.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("unknown {kind:?} `{name}` referenced from `{referenced_from}`")]
pub struct UnknownSymbol {
    /// The name that was not found.
    pub name: String,

    /// What the name was expected to denote.
    pub kind: SymbolKind,

    /// The trait or struct whose declaration contains the reference.
    pub referenced_from: String,
}

impl Report<()> for UnknownSymbol {
    fn report(&self, (): ()) -> Diagnostic {
        let kind = match self.kind {
            SymbolKind::Trait => "trait",
            SymbolKind::Struct => "struct",
        };

        Diagnostic::error(format!("{kind} `{}` is not declared", self.name))
            .with_related(Related::new(
                format!("`{}`", self.referenced_from),
                "referenced here".to_owned(),
            ))
    }
}

/// Two traits or two structs share the same name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("`{name}` is declared more than once")]
pub struct DuplicateDeclaration {
    /// The duplicated name.
    pub name: String,

    /// Whether the duplicate is a trait or a struct.
    pub kind: SymbolKind,
}

impl Report<()> for DuplicateDeclaration {
    fn report(&self, (): ()) -> Diagnostic {
        Diagnostic::error(format!("`{}` is declared more than once", self.name))
            .with_help("the later declaration is ignored")
    }
}

/// The reason a lifecycle operation is not allowed on a struct.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleViolation {
    /// The operation is declared with a name other than the one fixed for
    /// its kind.
    UnexpectedName {
        /// The name the kind requires.
        expected: &'static str,
    },

    /// The struct's convention does not allow this kind at all.
    Forbidden,

    /// The operation uses the encoding of the other convention.
    WrongEncoding {
        /// The encoding the struct's convention requires.
        expected: Convention,
    },
}

/// A struct defines a lifecycle operation its convention does not allow.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
#[error("invalid {kind:?} `{name}` on `{struct_name}`: {violation:?}")]
pub struct InvalidLifecycleConvention {
    /// The struct declaring the operation.
    pub struct_name: String,

    /// The kind of the operation.
    pub kind: Kind,

    /// The declared name of the operation.
    pub name: String,

    /// The violated rule.
    pub violation: LifecycleViolation,
}

impl Report<()> for InvalidLifecycleConvention {
    fn report(&self, (): ()) -> Diagnostic {
        let subject = format!("struct `{}`", self.struct_name);

        match &self.violation {
            LifecycleViolation::UnexpectedName { expected } => {
                Diagnostic::error(format!(
                    "the {:?} of {subject} must be named `{expected}`, found \
                     `{}`",
                    self.kind, self.name
                ))
            }
            LifecycleViolation::Forbidden => Diagnostic::error(format!(
                "{subject} cannot define a {:?} because of its convention",
                self.kind
            ))
            .with_help(
                "trivial register-passable types are copied, moved and \
                 destroyed implicitly",
            ),
            LifecycleViolation::WrongEncoding { expected } => {
                Diagnostic::error(format!(
                    "the {:?} `{}` of {subject} must use the {expected:?} \
                     encoding",
                    self.kind, self.name
                ))
                .with_help(match expected {
                    Convention::Standard => {
                        "take an `inout self` receiver and return nothing"
                    }
                    Convention::RegisterPassable => {
                        "take no receiver and return `Self`"
                    }
                })
            }
        }
    }
}

/// Any error reported by [`crate::declare`].
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error,
    EnumAsInner,
)]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    CyclicInheritance(#[from] CyclicInheritance),

    #[error(transparent)]
    MalformedRestrictedType(#[from] MalformedRestrictedType),

    #[error(transparent)]
    UnknownSymbol(#[from] UnknownSymbol),

    #[error(transparent)]
    DuplicateDeclaration(#[from] DuplicateDeclaration),

    #[error(transparent)]
    InvalidLifecycleConvention(#[from] InvalidLifecycleConvention),
}

impl Report<()> for Error {
    fn report(&self, (): ()) -> Diagnostic {
        match self {
            Self::CyclicInheritance(error) => error.report(()),
            Self::MalformedRestrictedType(error) => error.report(()),
            Self::UnknownSymbol(error) => error.report(()),
            Self::DuplicateDeclaration(error) => error.report(()),
            Self::InvalidLifecycleConvention(error) => error.report(()),
        }
    }
}
