//! Contains the raw declarations handed over by the front end.
//!
//! Everything here refers to other entities by name. [`crate::declare`]
//! resolves the names and turns the declarations into the validated entities
//! of [`crate::entity`].

use serde::{Deserialize, Serialize};

use crate::{
    entity::StructConvention,
    signature::{Convention, Kind, Primitive, Receiver},
};

/// A type written by name.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
)]
pub enum TypeName {
    /// No value.
    #[default]
    Unit,

    /// A built-in type.
    Primitive(Primitive),

    /// The declaring type.
    This,

    /// A declared struct.
    Named(String),
}

impl TypeName {
    /// Shorthand for [`TypeName::Named`].
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self { Self::Named(name.into()) }
}

/// An operation signature written by name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SignatureDeclaration {
    /// The kind of the operation.
    pub kind: Kind,

    /// The name of the operation.
    pub name: String,

    /// The receiver, if any.
    #[serde(default)]
    pub receiver: Option<Receiver>,

    /// The parameter types, excluding the receiver.
    #[serde(default)]
    pub parameters: Vec<TypeName>,

    /// The return type; [`TypeName::Unit`] when omitted.
    #[serde(default)]
    pub return_type: TypeName,

    /// The encoding convention; [`Convention::Standard`] when omitted.
    #[serde(default)]
    pub convention: Convention,
}

impl SignatureDeclaration {
    /// An instance method taking a borrowed receiver.
    #[must_use]
    pub fn method(
        name: impl Into<String>,
        parameters: Vec<TypeName>,
        return_type: TypeName,
    ) -> Self {
        Self {
            kind: Kind::InstanceMethod,
            name: name.into(),
            receiver: Some(Receiver::Borrowed),
            parameters,
            return_type,
            convention: Convention::Standard,
        }
    }

    /// A static method.
    #[must_use]
    pub fn static_method(
        name: impl Into<String>,
        parameters: Vec<TypeName>,
        return_type: TypeName,
    ) -> Self {
        Self {
            kind: Kind::StaticMethod,
            name: name.into(),
            receiver: None,
            parameters,
            return_type,
            convention: Convention::Standard,
        }
    }

    /// A lifecycle operation of the given kind in the standard encoding:
    /// `inout` receiver (`owned` for destructors) and no return value.
    #[must_use]
    pub fn standard_lifecycle(kind: Kind, parameters: Vec<TypeName>) -> Self {
        Self {
            kind,
            name: kind.lifecycle_name().unwrap_or_default().to_owned(),
            receiver: Some(if kind == Kind::Destructor {
                Receiver::Owned
            } else {
                Receiver::Inout
            }),
            parameters,
            return_type: TypeName::Unit,
            convention: Convention::Standard,
        }
    }

    /// A constructor-like operation of the given kind in the
    /// register-passable encoding: no receiver, returns the value.
    #[must_use]
    pub fn register_lifecycle(kind: Kind, parameters: Vec<TypeName>) -> Self {
        Self {
            kind,
            name: kind.lifecycle_name().unwrap_or_default().to_owned(),
            receiver: None,
            parameters,
            return_type: TypeName::This,
            convention: Convention::RegisterPassable,
        }
    }
}

/// A raw trait declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TraitDeclaration {
    /// The trait name; unique among traits.
    pub name: String,

    /// The names of the inherited traits.
    #[serde(default)]
    pub parents: Vec<String>,

    /// The directly declared requirements.
    #[serde(default)]
    pub requirements: Vec<SignatureDeclaration>,
}

/// An operation invoked from the body of an implementation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CallDeclaration {
    /// The struct defining the called operation.
    pub struct_name: String,

    /// The kind of the called operation.
    pub kind: Kind,

    /// The name of the called operation.
    pub name: String,
}

/// A raw implementation declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementationDeclaration {
    /// The signature of the operation.
    pub signature: SignatureDeclaration,

    /// Whether the operation is marked for unconditional inlining.
    #[serde(default)]
    pub always_inline: bool,

    /// The operations invoked from its body.
    #[serde(default)]
    pub calls: Vec<CallDeclaration>,
}

impl From<SignatureDeclaration> for ImplementationDeclaration {
    fn from(signature: SignatureDeclaration) -> Self {
        Self { signature, always_inline: false, calls: Vec::new() }
    }
}

impl ImplementationDeclaration {
    /// Marks the implementation for unconditional inlining.
    #[must_use]
    pub fn inline(mut self) -> Self {
        self.always_inline = true;
        self
    }
}

/// The raw materialization attribute of a struct.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MaterializationDeclaration {
    /// Whether the struct is restricted to the parameter domain.
    pub restricted: bool,

    /// The name of the runtime type values get converted to.
    #[serde(default)]
    pub target: Option<String>,
}

/// A raw struct declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StructDeclaration {
    /// The struct name; unique among structs.
    pub name: String,

    /// The declared convention.
    #[serde(default)]
    pub convention: StructConvention,

    /// The names of the traits the struct claims to conform to.
    #[serde(default)]
    pub traits: Vec<String>,

    /// The operations the struct defines.
    #[serde(default)]
    pub implementations: Vec<ImplementationDeclaration>,

    /// The materialization attribute, if any.
    #[serde(default)]
    pub materialization: Option<MaterializationDeclaration>,
}
