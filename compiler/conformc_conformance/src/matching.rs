//! Contains the signature matcher.
//!
//! Lifecycle operations can be written in two encodings. A standard
//! constructor initializes an `inout` receiver and returns nothing; a
//! register-passable constructor takes no receiver and returns the new value.
//! Both describe the same logical operation, so signatures are first brought
//! to a common [`Normalized`] form and only then compared.

use conformc_arena::ID;
use conformc_declaration::{
    entity::{Implementation, Struct},
    signature::{Convention, Kind, Receiver, Requirement, Signature, Type},
};

/// A signature with the calling convention factored out. Two signatures
/// describe the same operation if and only if their normalized forms are
/// equal, which also makes this the identity used to deduplicate
/// requirements.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Normalized {
    /// The kind of the operation.
    pub kind: Kind,

    /// The name of the operation.
    pub name: String,

    /// The receiver left after normalization.
    pub receiver: Option<Receiver>,

    /// The parameter types, excluding the receiver.
    pub parameters: Vec<Type>,

    /// The return type.
    pub return_type: Type,
}

/// Brings the signature to its convention-independent form.
///
/// A standard-encoded constructor, copy constructor or move constructor is
/// rewritten into the register-passable encoding: the receiver is dropped and
/// the return type becomes [`Type::This`]. Every other signature is kept
/// as-is apart from the convention tag.
#[must_use]
pub fn normalize(signature: &Signature) -> Normalized {
    let is_standard_lifecycle = signature.kind.is_constructor_like()
        && signature.convention == Convention::Standard
        && signature.receiver.is_some()
        && signature.return_type == Type::Unit;

    let (receiver, return_type) = if is_standard_lifecycle {
        (None, Type::This)
    } else {
        (signature.receiver, signature.return_type)
    };

    Normalized {
        kind: signature.kind,
        name: signature.name.clone(),
        receiver,
        parameters: signature.parameters.clone(),
        return_type,
    }
}

/// Normalizes a requirement as seen from the struct implementing it.
///
/// Implementations refer to their own struct as [`Type::This`], so a
/// requirement naming the `implementer` concretely is rewritten the same way.
#[must_use]
pub fn normalize_for(
    requirement: &Requirement,
    implementer: ID<Struct>,
) -> Normalized {
    let own = |ty: Type| {
        if ty == Type::Struct(implementer) {
            Type::This
        } else {
            ty
        }
    };

    let mut normalized = normalize(requirement);
    normalized.parameters =
        normalized.parameters.into_iter().map(own).collect();
    normalized.return_type = own(normalized.return_type);

    normalized
}

/// Decides whether the `candidate` implementation of `implementer` satisfies
/// `required`.
///
/// Name and kind must be equal; the rest of the signatures must be equal
/// after [`normalize_for`].
#[must_use]
pub fn matches(
    required: &Requirement,
    implementer: ID<Struct>,
    candidate: &Implementation,
) -> bool {
    let candidate = candidate.signature();

    required.kind == candidate.kind
        && required.name == candidate.name
        && normalize_for(required, implementer) == normalize(candidate)
}
