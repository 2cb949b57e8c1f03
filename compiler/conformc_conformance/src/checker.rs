//! Contains the conformance checker.

use std::collections::HashSet;

use conformc_arena::ID;
use conformc_declaration::{
    entity::{Implementation, Struct, StructConvention, Trait},
    signature::{Kind, Requirement, Signature, Type},
};
use enum_as_inner::EnumAsInner;
use getset::{CopyGetters, Getters};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::{
    diagnostic::{AmbiguousImplementation, Error, MissingRequirement},
    matching::{self, Normalized},
    Checker,
};

/// Why a requirement has to be satisfied.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumAsInner,
)]
pub enum Origin {
    /// The requirement is declared by this trait.
    Trait(ID<Trait>),

    /// Every conforming struct must be destructible.
    Implicit,

    /// The struct is the materialization target of this restricted struct
    /// and must be constructible from it.
    Conversion(ID<Struct>),
}

/// A requirement paired with its origin.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Obligation {
    /// Where the requirement comes from.
    pub origin: Origin,

    /// The required signature.
    pub requirement: Requirement,
}

/// What satisfies an [`Obligation`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumAsInner,
)]
pub enum Witness {
    /// An implementation defined by the struct.
    Implementation(ID<Implementation>),

    /// An operation provided by the checker: the no-op destructor of a
    /// struct that declares none, or the bitwise copy and move of a trivial
    /// register-passable struct.
    Synthesized,
}

/// The successful result of a conformance check: every obligation with the
/// witness that satisfies it, in obligation order.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct Conformance {
    /// The checked struct.
    #[get_copy = "pub"]
    struct_id: ID<Struct>,

    /// The traits the struct was checked against.
    #[get = "pub"]
    traits: Vec<ID<Trait>>,

    /// Every obligation with its witness.
    #[get = "pub"]
    witnesses: Vec<(Obligation, Witness)>,
}

impl Conformance {
    /// Returns the witness of the first obligation with the given kind and
    /// name.
    #[must_use]
    pub fn witness_of(&self, kind: Kind, name: &str) -> Option<Witness> {
        self.witnesses
            .iter()
            .find(|(x, _)| {
                x.requirement.kind == kind && x.requirement.name == name
            })
            .map(|(_, witness)| *witness)
    }

    /// Returns the witness of the destructor every conforming struct has.
    #[must_use]
    pub fn destructor(&self) -> Witness {
        self.witness_of(Kind::Destructor, &Signature::destructor().name)
            .unwrap_or(Witness::Synthesized)
    }
}

impl Checker<'_> {
    /// Checks the struct against the traits it declares.
    ///
    /// # Errors
    ///
    /// See [`Checker::check_conformance`].
    pub fn check(&self, struct_id: ID<Struct>) -> Result<Conformance, Error> {
        self.check_conformance(struct_id, self.model[struct_id].traits())
    }

    /// Checks every struct of the model against the traits it declares, in
    /// parallel. The verdicts are returned in declaration order.
    #[must_use]
    pub fn check_all(
        &self,
    ) -> Vec<(ID<Struct>, Result<Conformance, Error>)> {
        self.model
            .structs()
            .keys()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|struct_id| (struct_id, self.check(struct_id)))
            .collect()
    }

    /// Checks the struct against the given traits.
    ///
    /// The requirements are the union of the closures of the `claimed`
    /// traits followed by the implicit destructor requirement. They are
    /// visited in that order, so the reported error is always the first
    /// unsatisfied requirement.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingRequirement`] if no implementation matches a
    ///   requirement and none can be synthesized.
    /// - [`Error::AmbiguousImplementation`] if more than one implementation
    ///   matches a requirement.
    pub fn check_conformance(
        &self,
        struct_id: ID<Struct>,
        claimed: &[ID<Trait>],
    ) -> Result<Conformance, Error> {
        let mut witnesses = Vec::new();

        for obligation in self.obligations(claimed) {
            let witness = self.satisfy(struct_id, &obligation)?;
            witnesses.push((obligation, witness));
        }

        log::debug!(
            "struct `{}` conforms to {} trait(s) with {} obligation(s)",
            self.model[struct_id].name(),
            claimed.len(),
            witnesses.len()
        );

        Ok(Conformance { struct_id, traits: claimed.to_vec(), witnesses })
    }

    /// Decides whether the struct can be used where `trait_id` is expected
    /// without having declared it: one of its declared traits must inherit
    /// from `trait_id` (or be it), and the struct must conform to what it
    /// declares.
    ///
    /// Returns `Ok(false)` if no declared trait leads to `trait_id`.
    ///
    /// # Errors
    ///
    /// Returns the conformance error of the declared traits, if any.
    pub fn is_substitutable(
        &self,
        struct_id: ID<Struct>,
        trait_id: ID<Trait>,
    ) -> Result<bool, Error> {
        let declared = self.model[struct_id].traits();

        if !declared.iter().any(|x| self.ancestors(*x).contains(&trait_id)) {
            return Ok(false);
        }

        self.check_conformance(struct_id, declared).map(|_| true)
    }

    /// Finds the witness of a single obligation.
    ///
    /// # Errors
    ///
    /// See [`Checker::check_conformance`].
    pub fn satisfy(
        &self,
        struct_id: ID<Struct>,
        obligation: &Obligation,
    ) -> Result<Witness, Error> {
        let declared = &self.model[struct_id];
        let requirement = &obligation.requirement;

        let candidates = declared
            .implementations_of(requirement.kind, &requirement.name)
            .iter()
            .copied()
            .filter(|x| {
                matching::matches(
                    requirement,
                    struct_id,
                    &declared.implementations()[*x],
                )
            })
            .collect::<Vec<_>>();

        match candidates.as_slice() {
            [single] => Ok(Witness::Implementation(*single)),

            [] => synthesize(declared, struct_id, requirement).ok_or_else(|| {
                MissingRequirement {
                    struct_id,
                    origin: obligation.origin,
                    requirement: requirement.clone(),
                }
                .into()
            }),

            _ => Err(AmbiguousImplementation {
                struct_id,
                origin: obligation.origin,
                requirement: requirement.clone(),
                candidates,
            }
            .into()),
        }
    }

    fn obligations(&self, claimed: &[ID<Trait>]) -> Vec<Obligation> {
        let mut seen = HashSet::<Normalized>::new();
        let mut obligations = Vec::new();

        for trait_id in claimed {
            for obligation in self.closure(*trait_id).iter() {
                if seen.insert(matching::normalize(&obligation.requirement)) {
                    obligations.push(obligation.clone());
                }
            }
        }

        let destructor = Signature::destructor();
        if seen.insert(matching::normalize(&destructor)) {
            obligations.push(Obligation {
                origin: Origin::Implicit,
                requirement: destructor,
            });
        }

        obligations
    }
}

/// Provides the operations the checker is allowed to make up when the struct
/// defines nothing that matches.
fn synthesize(
    declared: &Struct,
    struct_id: ID<Struct>,
    requirement: &Requirement,
) -> Option<Witness> {
    let normalized = matching::normalize_for(requirement, struct_id);

    let synthesizable = match requirement.kind {
        Kind::Destructor => {
            !declared.defines_kind(Kind::Destructor)
                && normalized == matching::normalize(&Signature::destructor())
        }

        Kind::CopyConstructor | Kind::MoveConstructor => {
            declared.convention() == StructConvention::RegisterPassableTrivial
                && normalized.receiver.is_none()
                && normalized.parameters == [Type::This]
                && normalized.return_type == Type::This
        }

        Kind::InstanceMethod | Kind::StaticMethod | Kind::Constructor => false,
    };

    synthesizable.then_some(Witness::Synthesized)
}
