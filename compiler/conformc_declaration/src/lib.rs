//! Contains the declaration model: the read-only graph of traits, structs and
//! the operation signatures they declare.
//!
//! The graph is built in a single step by [`declare`] from the raw
//! declarations of [`input`], and is never mutated afterwards. Every query of
//! the conformance checker and the materialization resolver only reads it.

use std::{collections::HashMap, ops::Index};

use conformc_arena::{Arena, ID};
use getset::Getters;

pub mod diagnostic;
pub mod entity;
pub mod input;
pub mod signature;

mod declare;

pub use declare::declare;
use entity::{Struct, Trait};
use signature::{Primitive, Receiver, Signature, Type};

/**
The declarations were rejected; every reason has been reported to the handler.
 */
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    thiserror::Error,
    displaydoc::Display,
)]
pub struct Rejected;

/// The validated declaration graph of one analysis session.
#[derive(Debug, Clone, Getters)]
pub struct Model {
    /// Every trait in declaration order.
    #[get = "pub"]
    traits: Arena<Trait>,

    /// Every struct in declaration order.
    #[get = "pub"]
    structs: Arena<Struct>,

    trait_ids_by_name: HashMap<String, ID<Trait>>,
    struct_ids_by_name: HashMap<String, ID<Struct>>,
}

impl Model {
    /// Looks up a trait by its declared name.
    #[must_use]
    pub fn trait_id(&self, name: &str) -> Option<ID<Trait>> {
        self.trait_ids_by_name.get(name).copied()
    }

    /// Looks up a struct by its declared name.
    #[must_use]
    pub fn struct_id(&self, name: &str) -> Option<ID<Struct>> {
        self.struct_ids_by_name.get(name).copied()
    }

    /// Returns the trait with the given ID.
    #[must_use]
    pub fn get_trait(&self, id: ID<Trait>) -> Option<&Trait> {
        self.traits.get(id)
    }

    /// Returns the struct with the given ID.
    #[must_use]
    pub fn get_struct(&self, id: ID<Struct>) -> Option<&Struct> {
        self.structs.get(id)
    }

    /// Renders a type the way it would be written in source code.
    #[must_use]
    pub fn type_to_string(&self, ty: &Type) -> String {
        match ty {
            Type::Unit => "()".to_owned(),
            Type::Primitive(Primitive::Bool) => "Bool".to_owned(),
            Type::Primitive(Primitive::Int) => "Int".to_owned(),
            Type::Primitive(Primitive::Float64) => "Float64".to_owned(),
            Type::Primitive(Primitive::String) => "String".to_owned(),
            Type::Struct(id) => self
                .get_struct(*id)
                .map_or_else(|| format!("{id:?}"), |s| s.name().clone()),
            Type::This => "Self".to_owned(),
        }
    }

    /// Renders a signature the way it would be written in source code, e.g.
    /// `__init__(inout self, Int) -> ()`.
    #[must_use]
    pub fn signature_to_string(&self, signature: &Signature) -> String {
        let receiver = signature.receiver.map(|receiver| match receiver {
            Receiver::Borrowed => "self".to_owned(),
            Receiver::Inout => "inout self".to_owned(),
            Receiver::Owned => "owned self".to_owned(),
        });

        let parameters = receiver
            .into_iter()
            .chain(signature.parameters.iter().map(|x| self.type_to_string(x)))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "{}({parameters}) -> {}",
            signature.name,
            self.type_to_string(&signature.return_type)
        )
    }
}

impl Index<ID<Trait>> for Model {
    type Output = Trait;

    fn index(&self, id: ID<Trait>) -> &Self::Output { &self.traits[id] }
}

impl Index<ID<Struct>> for Model {
    type Output = Struct;

    fn index(&self, id: ID<Struct>) -> &Self::Output { &self.structs[id] }
}
