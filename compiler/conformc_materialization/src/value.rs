//! Contains the values the resolver works on and the contexts they flow
//! into.

use conformc_arena::ID;
use conformc_declaration::entity::{Implementation, OperationRef, Struct};
use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

/// Where a value can be evaluated.
///
/// A value starts in the parameter domain if its type is restricted and in
/// the runtime domain otherwise. The only transition is from
/// [`Domain::Parameter`] to [`Domain::Runtime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Domain {
    /// Compile time only.
    Parameter,

    /// Available at run time.
    Runtime,
}

/// A literal constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float64(f64),
    String(String),
}

/// An expression tree of literals and operation calls.
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum Expression {
    /// A constant.
    Literal(Literal),

    /// A call to the operations a struct defines under a `(kind, name)` key.
    Call {
        /// The called operation.
        operation: OperationRef,

        /// The arguments in order.
        arguments: Vec<Expression>,
    },
}

/// A typed expression.
#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct Value {
    /// The type of the value.
    pub ty: ID<Struct>,

    /// How the value is computed.
    pub expression: Expression,
}

/// A place a value flows into.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
pub enum TransitionContext {
    /// Binding to a runtime variable.
    #[display(fmt = "binding of `{}`", variable)]
    RuntimeBinding {
        /// The bound variable.
        variable: String,
    },

    /// Passing as an argument of a runtime function.
    #[display(fmt = "argument {} of `{}`", position, function)]
    RuntimeArgument {
        /// The called function.
        function: String,

        /// The zero-based position of the argument.
        position: usize,
    },

    /// Returning from a runtime function.
    #[display(fmt = "return value of `{}`", function)]
    RuntimeReturn {
        /// The returning function.
        function: String,
    },

    /// Binding to a compile-time parameter.
    #[display(fmt = "parameter `{}`", name)]
    ParameterBinding {
        /// The bound parameter.
        name: String,
    },
}

impl TransitionContext {
    /// Returns `true` if only runtime values may flow into this context.
    #[must_use]
    pub const fn requires_runtime(&self) -> bool {
        !matches!(self, Self::ParameterBinding { .. })
    }
}

/// The value that ends up in the context.
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum RuntimeValue {
    /// The value is used as-is.
    Unchanged(Value),

    /// The value is passed to a conversion constructor of the target type.
    Converted {
        /// The constructor of the target type taking the restricted value.
        constructor: ID<Implementation>,

        /// The restricted value.
        argument: Value,
    },
}

/// The result of a successful materialization query.
#[derive(Debug, Clone, PartialEq)]
pub struct Materialized {
    /// The type of the value that flows into the context.
    pub target: ID<Struct>,

    /// The domain the value is in after the transition.
    pub domain: Domain,

    /// The value that flows into the context.
    pub value: RuntimeValue,
}
