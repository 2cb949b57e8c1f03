//! Contains the name-based form of the values handed to the resolver.

use conformc_declaration::{
    diagnostic::{SymbolKind, UnknownSymbol},
    entity::OperationRef,
    signature::Kind,
    Model,
};
use serde::{Deserialize, Serialize};

use crate::value::{Expression, Literal, TransitionContext, Value};

/// An expression written by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpressionDeclaration {
    /// A constant.
    Literal(Literal),

    /// A call to an operation.
    Call {
        /// The struct defining the operation.
        struct_name: String,

        /// The kind of the operation.
        kind: Kind,

        /// The name of the operation.
        name: String,

        /// The arguments in order.
        #[serde(default)]
        arguments: Vec<ExpressionDeclaration>,
    },
}

/// A typed expression written by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDeclaration {
    /// The name of the value's type.
    pub ty: String,

    /// How the value is computed.
    pub expression: ExpressionDeclaration,
}

/// A value flowing into a context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionDeclaration {
    /// The value.
    pub value: ValueDeclaration,

    /// Where the value flows into.
    pub context: TransitionContext,
}

impl ExpressionDeclaration {
    /// Resolves every struct name of the expression.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownSymbol`] for the first struct name that is not
    /// declared.
    pub fn resolve(
        &self,
        model: &Model,
        referenced_from: &str,
    ) -> Result<Expression, UnknownSymbol> {
        match self {
            Self::Literal(literal) => Ok(Expression::Literal(literal.clone())),

            Self::Call { struct_name, kind, name, arguments } => {
                let struct_id = model.struct_id(struct_name).ok_or_else(|| {
                    UnknownSymbol {
                        name: struct_name.clone(),
                        kind: SymbolKind::Struct,
                        referenced_from: referenced_from.to_owned(),
                    }
                })?;

                let arguments = arguments
                    .iter()
                    .map(|x| x.resolve(model, referenced_from))
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(Expression::Call {
                    operation: OperationRef::new(struct_id, *kind, name.clone()),
                    arguments,
                })
            }
        }
    }
}

impl TransitionDeclaration {
    /// Resolves the value of the transition.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownSymbol`] for the first struct name that is not
    /// declared.
    pub fn resolve(&self, model: &Model) -> Result<Value, UnknownSymbol> {
        let referenced_from = self.context.to_string();

        let ty = model.struct_id(&self.value.ty).ok_or_else(|| UnknownSymbol {
            name: self.value.ty.clone(),
            kind: SymbolKind::Struct,
            referenced_from: referenced_from.clone(),
        })?;

        Ok(Value {
            ty,
            expression: self.value.expression.resolve(model, &referenced_from)?,
        })
    }
}
