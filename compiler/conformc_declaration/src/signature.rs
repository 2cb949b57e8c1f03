//! Contains the definition of [`Signature`] and the type language used by it.

use conformc_arena::ID;
use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use crate::entity::Struct;

/// The name every constructor is declared with.
pub const CONSTRUCTOR_NAME: &str = "__init__";

/// The name every copy constructor is declared with.
pub const COPY_CONSTRUCTOR_NAME: &str = "__copyinit__";

/// The name every move constructor is declared with.
pub const MOVE_CONSTRUCTOR_NAME: &str = "__moveinit__";

/// The name every destructor is declared with.
pub const DESTRUCTOR_NAME: &str = "__del__";

/// A built-in type that needs no declaration.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
#[allow(missing_docs)]
pub enum Primitive {
    Bool,
    Int,
    Float64,
    String,
}

/// A type appearing in a parameter list or as a return type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumAsInner,
)]
pub enum Type {
    /// No value; the return type of an operation that returns nothing.
    Unit,

    /// A built-in type.
    Primitive(Primitive),

    /// A declared struct other than the declaring one.
    Struct(ID<Struct>),

    /// The declaring type (`Self`). Inside a struct, references to the struct
    /// itself are always normalized to this variant.
    This,
}

/// The kind of operation a [`Signature`] describes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum Kind {
    /// A method invoked on a value.
    InstanceMethod,

    /// A method invoked on the type.
    StaticMethod,

    /// `__init__`.
    Constructor,

    /// `__copyinit__`.
    CopyConstructor,

    /// `__moveinit__`.
    MoveConstructor,

    /// `__del__`.
    Destructor,
}

impl Kind {
    /// Returns `true` for the kinds whose encoding depends on the calling
    /// convention.
    #[must_use]
    pub const fn is_constructor_like(self) -> bool {
        matches!(
            self,
            Self::Constructor | Self::CopyConstructor | Self::MoveConstructor
        )
    }

    /// Returns the name a lifecycle operation of this kind must be declared
    /// with.
    #[must_use]
    pub const fn lifecycle_name(self) -> Option<&'static str> {
        match self {
            Self::Constructor => Some(CONSTRUCTOR_NAME),
            Self::CopyConstructor => Some(COPY_CONSTRUCTOR_NAME),
            Self::MoveConstructor => Some(MOVE_CONSTRUCTOR_NAME),
            Self::Destructor => Some(DESTRUCTOR_NAME),
            Self::InstanceMethod | Self::StaticMethod => None,
        }
    }
}

/// How the receiver (`self`) is passed to an operation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum Receiver {
    /// Immutable borrow.
    Borrowed,

    /// Mutable borrow; standard-convention constructors initialize the
    /// receiver in place through it.
    Inout,

    /// Ownership is transferred; destructors consume the receiver.
    Owned,
}

/// The calling convention an operation is encoded in.
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
pub enum Convention {
    /// Values are passed by reference; constructors take an `inout` receiver
    /// and return nothing.
    #[default]
    Standard,

    /// Values are passed in registers; constructors take no receiver and
    /// return the constructed value.
    RegisterPassable,
}

/// A named operation signature. Used both for the requirements a trait
/// declares and for the implementations a struct defines.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signature {
    /// The kind of the operation.
    pub kind: Kind,

    /// The name of the operation.
    pub name: String,

    /// The receiver, if the operation takes one.
    pub receiver: Option<Receiver>,

    /// The parameter types, excluding the receiver.
    pub parameters: Vec<Type>,

    /// The return type.
    pub return_type: Type,

    /// The convention the signature is encoded in.
    pub convention: Convention,
}

/// A single requirement declared by a trait.
pub type Requirement = Signature;

impl Signature {
    /// The destructor every conforming struct is implicitly required to
    /// expose: `__del__(owned self)`.
    #[must_use]
    pub fn destructor() -> Self {
        Self {
            kind: Kind::Destructor,
            name: DESTRUCTOR_NAME.to_owned(),
            receiver: Some(Receiver::Owned),
            parameters: Vec::new(),
            return_type: Type::Unit,
            convention: Convention::Standard,
        }
    }

    /// A standard-convention constructor taking the given parameters:
    /// `__init__(inout self, ...)`.
    #[must_use]
    pub fn constructor(parameters: Vec<Type>) -> Self {
        Self {
            kind: Kind::Constructor,
            name: CONSTRUCTOR_NAME.to_owned(),
            receiver: Some(Receiver::Inout),
            parameters,
            return_type: Type::Unit,
            convention: Convention::Standard,
        }
    }
}
