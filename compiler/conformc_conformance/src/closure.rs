//! Contains the trait closure builder.

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    sync::Arc,
};

use conformc_arena::ID;
use conformc_declaration::entity::Trait;
use parking_lot::RwLock;

use crate::{
    checker::{Obligation, Origin},
    matching::{self, Normalized},
    Checker,
};

/// The memoized closures of one session.
///
/// Entries are written at most once per key and never removed. Two threads
/// racing on the same trait may both compute its closure; the first insertion
/// wins and the other (equal) result is dropped.
#[derive(Debug, Default)]
pub(crate) struct Cache {
    closures: RwLock<HashMap<ID<Trait>, Arc<[Obligation]>>>,
    ancestors: RwLock<HashMap<ID<Trait>, Arc<BTreeSet<ID<Trait>>>>>,
}

impl Checker<'_> {
    /// Returns every requirement the given trait imposes: its own
    /// requirements followed by the closures of its parents in declaration
    /// order.
    ///
    /// Requirements are deduplicated by their [`Normalized`] signature, so a
    /// requirement reachable through several inheritance paths appears once,
    /// attributed to the first trait that declares it in that order.
    ///
    /// # Panics
    ///
    /// Panics if `trait_id` does not belong to the model of this checker.
    #[must_use]
    pub fn closure(&self, trait_id: ID<Trait>) -> Arc<[Obligation]> {
        let cached =
            |id: ID<Trait>| self.closures.closures.read().get(&id).cloned();
        if let Some(closure) = cached(trait_id) {
            return closure;
        }

        let mut resolved = HashMap::new();
        for id in self.parents_first(trait_id, &mut resolved, cached) {
            let closure = self.build_closure(id, &resolved);

            let closure = self
                .closures
                .closures
                .write()
                .entry(id)
                .or_insert_with(|| closure.into())
                .clone();

            resolved.insert(id, closure);
        }

        resolved[&trait_id].clone()
    }

    /// Returns the given trait together with every trait it inherits from,
    /// directly or transitively.
    ///
    /// # Panics
    ///
    /// Panics if `trait_id` does not belong to the model of this checker.
    #[must_use]
    pub fn ancestors(&self, trait_id: ID<Trait>) -> Arc<BTreeSet<ID<Trait>>> {
        let cached =
            |id: ID<Trait>| self.closures.ancestors.read().get(&id).cloned();
        if let Some(ancestors) = cached(trait_id) {
            return ancestors;
        }

        let mut resolved = HashMap::<_, Arc<BTreeSet<_>>>::new();
        for id in self.parents_first(trait_id, &mut resolved, cached) {
            let mut ancestors = BTreeSet::from([id]);
            for parent in self.model[id].parents() {
                ancestors.extend(resolved[parent].iter().copied());
            }

            let ancestors = self
                .closures
                .ancestors
                .write()
                .entry(id)
                .or_insert_with(|| Arc::new(ancestors))
                .clone();

            resolved.insert(id, ancestors);
        }

        resolved[&trait_id].clone()
    }

    /// Orders `root` and the traits it inherits from so that every trait
    /// comes after all of its parents. Traits already `cached` are put into
    /// `resolved` instead and their parents are not visited.
    ///
    /// The walk keeps its own stack, so the depth of the hierarchy is not
    /// limited by the call stack.
    fn parents_first<T>(
        &self,
        root: ID<Trait>,
        resolved: &mut HashMap<ID<Trait>, T>,
        cached: impl Fn(ID<Trait>) -> Option<T>,
    ) -> Vec<ID<Trait>> {
        let mut order = Vec::new();
        let mut entered = HashSet::from([root]);
        let mut stack = vec![(root, 0)];

        while let Some((id, next)) = stack.last_mut() {
            let id = *id;

            let Some(parent) = self.model[id].parents().get(*next).copied()
            else {
                stack.pop();
                order.push(id);
                continue;
            };
            *next += 1;

            if !entered.insert(parent) {
                continue;
            }

            match cached(parent) {
                Some(value) => {
                    resolved.insert(parent, value);
                }
                None => stack.push((parent, 0)),
            }
        }

        order
    }

    /// Computes the closure of `trait_id` from the closures of its parents,
    /// which must all be in `resolved`.
    fn build_closure(
        &self,
        trait_id: ID<Trait>,
        resolved: &HashMap<ID<Trait>, Arc<[Obligation]>>,
    ) -> Vec<Obligation> {
        let declared = &self.model[trait_id];
        let mut seen = HashSet::<Normalized>::new();
        let mut closure = Vec::new();

        for requirement in declared.requirements() {
            if seen.insert(matching::normalize(requirement)) {
                closure.push(Obligation {
                    origin: Origin::Trait(trait_id),
                    requirement: requirement.clone(),
                });
            }
        }

        for parent in declared.parents() {
            for obligation in resolved[parent].iter() {
                if seen.insert(matching::normalize(&obligation.requirement)) {
                    closure.push(obligation.clone());
                }
            }
        }

        log::trace!(
            "closure of trait `{}` has {} requirement(s)",
            declared.name(),
            closure.len()
        );

        closure
    }
}

#[cfg(test)]
mod test;
