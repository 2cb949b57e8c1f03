//! Contains the validated entities of the declaration graph.
//!
//! Entities are built once by [`crate::declare`] and are read-only afterwards;
//! every field is private and only exposed through getters.

use std::collections::BTreeMap;

use conformc_arena::{Arena, ID};
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

use crate::signature::{Kind, Requirement, Signature};

/// A named set of required operation signatures.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Trait {
    /// The declared name.
    #[get = "pub"]
    pub(crate) name: String,

    /// The requirements declared directly by this trait, in declaration
    /// order.
    #[get = "pub"]
    pub(crate) requirements: Vec<Requirement>,

    /// The traits this trait inherits from, in declaration order.
    #[get = "pub"]
    pub(crate) parents: Vec<ID<Trait>>,
}

/// The calling convention a struct is declared with. Determines which
/// lifecycle operations it may define and in which encoding.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
pub enum StructConvention {
    /// Passed by reference. Lifecycle operations take a receiver.
    #[default]
    Standard,

    /// Passed in registers. Constructors return the value and no move
    /// constructor may be defined.
    RegisterPassable,

    /// Passed in registers and copied bitwise. Only constructors may be
    /// defined; copy, move and destruction are implicit.
    RegisterPassableTrivial,
}

impl StructConvention {
    /// Returns `true` for both register-passable variants.
    #[must_use]
    pub const fn is_register_passable(self) -> bool {
        matches!(self, Self::RegisterPassable | Self::RegisterPassableTrivial)
    }
}

/// Refers to the operations a struct defines under a `(kind, name)` key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_new::new)]
pub struct OperationRef {
    /// The struct defining the operation.
    pub struct_id: ID<Struct>,

    /// The kind of the operation.
    pub kind: Kind,

    /// The name of the operation.
    pub name: String,
}

/// A concrete operation defined by a struct.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct Implementation {
    /// The signature of the operation. References to the declaring struct
    /// are already normalized to [`crate::signature::Type::This`].
    #[get = "pub"]
    pub(crate) signature: Signature,

    /// Whether the operation is marked for unconditional inlining, which is
    /// what makes it evaluable in the parameter domain.
    #[get_copy = "pub"]
    pub(crate) always_inline: bool,

    /// The operations the body of this implementation invokes.
    #[get = "pub"]
    pub(crate) calls: Vec<OperationRef>,
}

/// Marks a struct as usable in the parameter domain only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MaterializationPolicy {
    /// The runtime type values of the restricted struct are converted to.
    /// Never restricted itself.
    pub target: ID<Struct>,
}

/// A declared struct together with the operations it defines.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct Struct {
    /// The declared name.
    #[get = "pub"]
    pub(crate) name: String,

    /// The declared convention.
    #[get_copy = "pub"]
    pub(crate) convention: StructConvention,

    /// The traits the struct claims to conform to, in declaration order.
    #[get = "pub"]
    pub(crate) traits: Vec<ID<Trait>>,

    /// Every implementation in declaration order.
    #[get = "pub"]
    pub(crate) implementations: Arena<Implementation>,

    pub(crate) implementation_ids_by_key:
        BTreeMap<Kind, BTreeMap<String, Vec<ID<Implementation>>>>,

    /// Present when the struct is restricted to the parameter domain.
    #[get_copy = "pub"]
    pub(crate) materialization: Option<MaterializationPolicy>,
}

impl Struct {
    /// Returns the IDs of the implementations declared under the given kind
    /// and name, in declaration order.
    #[must_use]
    pub fn implementations_of(
        &self,
        kind: Kind,
        name: &str,
    ) -> &[ID<Implementation>] {
        self.implementation_ids_by_key
            .get(&kind)
            .and_then(|x| x.get(name))
            .map_or(&[], Vec::as_slice)
    }

    /// Returns `true` if the struct defines at least one operation of the
    /// given kind.
    #[must_use]
    pub fn defines_kind(&self, kind: Kind) -> bool {
        self.implementation_ids_by_key.contains_key(&kind)
    }

    /// Returns `true` if the struct is restricted to the parameter domain.
    #[must_use]
    pub const fn is_restricted(&self) -> bool {
        self.materialization.is_some()
    }
}
