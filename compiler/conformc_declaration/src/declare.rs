//! Builds the [`Model`] from the raw declarations.

use std::collections::{BTreeMap, HashMap};

use conformc_arena::{Arena, Map, ID};
use conformc_handler::Handler;

use crate::{
    diagnostic::{
        CyclicInheritance, DuplicateDeclaration, Error,
        InvalidLifecycleConvention, LifecycleViolation, MalformedReason,
        MalformedRestrictedType, SymbolKind, UnknownSymbol,
    },
    entity::{
        Implementation, MaterializationPolicy, OperationRef, Struct,
        StructConvention, Trait,
    },
    input::{
        ImplementationDeclaration, SignatureDeclaration, StructDeclaration,
        TraitDeclaration, TypeName,
    },
    signature::{Convention, Kind, Receiver, Signature, Type},
    Model, Rejected,
};

/// Builds the validated declaration graph.
///
/// Every problem found is reported to the `handler`; the declarations are
/// validated as a whole, so one bad trait does not hide the errors of the
/// others. The checks performed are:
///
/// - trait and struct names are unique and every referenced name exists,
/// - the trait inheritance graph is acyclic,
/// - lifecycle operations follow the convention of their struct,
/// - restricted structs are well formed: they name a non-restricted target
///   and every operation they define is marked always-inline.
///
/// # Errors
///
/// Returns [`Rejected`] if at least one error was reported.
pub fn declare(
    traits: impl IntoIterator<Item = TraitDeclaration>,
    structs: impl IntoIterator<Item = StructDeclaration>,
    handler: &dyn Handler<Error>,
) -> Result<Model, Rejected> {
    let mut builder = Builder::default();

    let mut raw_traits = Map::<TraitDeclaration, String, ID<Trait>>::new();
    for declaration in traits {
        if let Err((_, rejected)) =
            raw_traits.insert(declaration.name.clone(), declaration)
        {
            builder.report(DuplicateDeclaration {
                name: rejected.name,
                kind: SymbolKind::Trait,
            });
        }
    }

    let mut raw_structs = Map::<StructDeclaration, String, ID<Struct>>::new();
    for declaration in structs {
        if let Err((_, rejected)) =
            raw_structs.insert(declaration.name.clone(), declaration)
        {
            builder.report(DuplicateDeclaration {
                name: rejected.name,
                kind: SymbolKind::Struct,
            });
        }
    }

    let scope = Scope { traits: &raw_traits, structs: &raw_structs };

    let traits = raw_traits
        .entries()
        .map(|(_, declaration)| builder.build_trait(&scope, declaration))
        .collect::<Arena<Trait>>();

    for cycle in find_cycles(&traits) {
        builder.report(cycle);
    }

    let structs = raw_structs
        .entries()
        .map(|(id, declaration)| builder.build_struct(&scope, id, declaration))
        .collect::<Arena<Struct>>();

    log::debug!(
        "declared {} trait(s) and {} struct(s) with {} error(s)",
        traits.len(),
        structs.len(),
        builder.errors.len()
    );

    if !builder.errors.is_empty() {
        for error in builder.errors {
            handler.receive(error);
        }

        return Err(Rejected);
    }

    let trait_ids_by_name =
        traits.entries().map(|(id, x)| (x.name.clone(), id)).collect();
    let struct_ids_by_name =
        structs.entries().map(|(id, x)| (x.name.clone(), id)).collect();

    Ok(Model { traits, structs, trait_ids_by_name, struct_ids_by_name })
}

struct Scope<'a> {
    traits: &'a Map<TraitDeclaration, String, ID<Trait>>,
    structs: &'a Map<StructDeclaration, String, ID<Struct>>,
}

#[derive(Default)]
struct Builder {
    errors: Vec<Error>,
}

impl Builder {
    fn report(&mut self, error: impl Into<Error>) {
        self.errors.push(error.into());
    }

    fn resolve_trait(
        &mut self,
        scope: &Scope,
        name: &str,
        referenced_from: &str,
    ) -> Option<ID<Trait>> {
        let id = scope.traits.get_id(name);

        if id.is_none() {
            self.report(UnknownSymbol {
                name: name.to_owned(),
                kind: SymbolKind::Trait,
                referenced_from: referenced_from.to_owned(),
            });
        }

        id
    }

    fn resolve_struct(
        &mut self,
        scope: &Scope,
        name: &str,
        referenced_from: &str,
    ) -> Option<ID<Struct>> {
        let id = scope.structs.get_id(name);

        if id.is_none() {
            self.report(UnknownSymbol {
                name: name.to_owned(),
                kind: SymbolKind::Struct,
                referenced_from: referenced_from.to_owned(),
            });
        }

        id
    }

    fn resolve_type(
        &mut self,
        scope: &Scope,
        ty: &TypeName,
        owner: &str,
        this: Option<ID<Struct>>,
    ) -> Type {
        match ty {
            TypeName::Unit => Type::Unit,
            TypeName::Primitive(primitive) => Type::Primitive(*primitive),
            TypeName::This => Type::This,
            TypeName::Named(name) => {
                match self.resolve_struct(scope, name, owner) {
                    Some(id) if Some(id) == this => Type::This,
                    Some(id) => Type::Struct(id),

                    // the model is rejected anyway
                    None => Type::Unit,
                }
            }
        }
    }

    fn resolve_signature(
        &mut self,
        scope: &Scope,
        declaration: &SignatureDeclaration,
        owner: &str,
        this: Option<ID<Struct>>,
    ) -> Signature {
        let parameters = declaration
            .parameters
            .iter()
            .map(|x| self.resolve_type(scope, x, owner, this))
            .collect();
        let return_type =
            self.resolve_type(scope, &declaration.return_type, owner, this);

        Signature {
            kind: declaration.kind,
            name: declaration.name.clone(),
            receiver: declaration.receiver,
            parameters,
            return_type,
            convention: declaration.convention,
        }
    }

    fn build_trait(
        &mut self,
        scope: &Scope,
        declaration: &TraitDeclaration,
    ) -> Trait {
        let parents = declaration
            .parents
            .iter()
            .filter_map(|x| self.resolve_trait(scope, x, &declaration.name))
            .collect();

        let requirements = declaration
            .requirements
            .iter()
            .map(|x| self.resolve_signature(scope, x, &declaration.name, None))
            .collect();

        Trait { name: declaration.name.clone(), requirements, parents }
    }

    fn build_implementation(
        &mut self,
        scope: &Scope,
        declaration: &ImplementationDeclaration,
        owner: &str,
        this: ID<Struct>,
    ) -> Implementation {
        let signature = self.resolve_signature(
            scope,
            &declaration.signature,
            owner,
            Some(this),
        );

        let calls = declaration
            .calls
            .iter()
            .filter_map(|call| {
                self.resolve_struct(scope, &call.struct_name, owner).map(|id| {
                    OperationRef::new(id, call.kind, call.name.clone())
                })
            })
            .collect();

        Implementation {
            signature,
            always_inline: declaration.always_inline,
            calls,
        }
    }

    fn build_struct(
        &mut self,
        scope: &Scope,
        id: ID<Struct>,
        declaration: &StructDeclaration,
    ) -> Struct {
        let traits = declaration
            .traits
            .iter()
            .filter_map(|x| self.resolve_trait(scope, x, &declaration.name))
            .collect();

        let mut implementations = Arena::<Implementation>::new();
        let mut implementation_ids_by_key = BTreeMap::<
            Kind,
            BTreeMap<String, Vec<ID<Implementation>>>,
        >::new();

        for implementation in &declaration.implementations {
            let implementation = self.build_implementation(
                scope,
                implementation,
                &declaration.name,
                id,
            );

            self.check_lifecycle(
                &declaration.name,
                declaration.convention,
                &implementation.signature,
            );

            let kind = implementation.signature.kind;
            let name = implementation.signature.name.clone();
            let implementation_id = implementations.insert(implementation);

            implementation_ids_by_key
                .entry(kind)
                .or_default()
                .entry(name)
                .or_default()
                .push(implementation_id);
        }

        let materialization =
            self.build_materialization(scope, declaration, &implementations);

        Struct {
            name: declaration.name.clone(),
            convention: declaration.convention,
            traits,
            implementations,
            implementation_ids_by_key,
            materialization,
        }
    }

    fn check_lifecycle(
        &mut self,
        struct_name: &str,
        convention: StructConvention,
        signature: &Signature,
    ) {
        let Some(expected_name) = signature.kind.lifecycle_name() else {
            return;
        };

        let violation = if signature.name != expected_name {
            Some(LifecycleViolation::UnexpectedName { expected: expected_name })
        } else if is_forbidden(convention, signature.kind) {
            Some(LifecycleViolation::Forbidden)
        } else if signature.kind.is_constructor_like() {
            let expected = if convention.is_register_passable() {
                Convention::RegisterPassable
            } else {
                Convention::Standard
            };

            (!is_encoded_as(signature, expected))
                .then_some(LifecycleViolation::WrongEncoding { expected })
        } else {
            None
        };

        if let Some(violation) = violation {
            self.report(InvalidLifecycleConvention {
                struct_name: struct_name.to_owned(),
                kind: signature.kind,
                name: signature.name.clone(),
                violation,
            });
        }
    }

    fn build_materialization(
        &mut self,
        scope: &Scope,
        declaration: &StructDeclaration,
        implementations: &Arena<Implementation>,
    ) -> Option<MaterializationPolicy> {
        let materialization = declaration.materialization.as_ref()?;

        if !materialization.restricted {
            if let Some(target) = &materialization.target {
                log::warn!(
                    "struct `{}` names `{target}` as its materialization \
                     target but is not restricted; the target is ignored",
                    declaration.name
                );
            }

            return None;
        }

        let malformed = |reason| MalformedRestrictedType {
            struct_name: declaration.name.clone(),
            reason,
        };

        for implementation in implementations.iter() {
            if !implementation.always_inline {
                self.report(malformed(MalformedReason::NonInlinableOperation {
                    kind: implementation.signature.kind,
                    name: implementation.signature.name.clone(),
                }));
            }
        }

        let Some(target_name) = &materialization.target else {
            self.report(malformed(MalformedReason::MissingTarget));
            return None;
        };

        let target = self.resolve_struct(scope, target_name, &declaration.name)?;

        let target_is_restricted = scope
            .structs
            .get(target)
            .and_then(|x| x.materialization.as_ref())
            .is_some_and(|x| x.restricted);

        if target_is_restricted {
            self.report(malformed(MalformedReason::RestrictedTarget {
                target: target_name.clone(),
            }));
            return None;
        }

        Some(MaterializationPolicy { target })
    }
}

const fn is_forbidden(convention: StructConvention, kind: Kind) -> bool {
    match convention {
        StructConvention::Standard => false,
        StructConvention::RegisterPassable => {
            matches!(kind, Kind::MoveConstructor)
        }
        StructConvention::RegisterPassableTrivial => matches!(
            kind,
            Kind::CopyConstructor | Kind::MoveConstructor | Kind::Destructor
        ),
    }
}

fn is_encoded_as(signature: &Signature, convention: Convention) -> bool {
    if signature.convention != convention {
        return false;
    }

    match convention {
        Convention::Standard => {
            signature.receiver == Some(Receiver::Inout)
                && signature.return_type == Type::Unit
        }
        Convention::RegisterPassable => {
            signature.receiver.is_none() && signature.return_type == Type::This
        }
    }
}

/// Finds every cycle of the inheritance graph with a depth-first search. Each
/// back edge found yields one error.
///
/// The search keeps its own stack of `(trait, next parent index)` frames, so
/// deep hierarchies do not exhaust the call stack.
fn find_cycles(traits: &Arena<Trait>) -> Vec<CyclicInheritance> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Unvisited,
        OnStack,
        Done,
    }

    let mut marks = HashMap::<ID<Trait>, Mark>::new();
    let mut found = Vec::new();

    for root in traits.keys() {
        if marks.contains_key(&root) {
            continue;
        }

        marks.insert(root, Mark::OnStack);
        let mut stack = vec![(root, 0)];

        while let Some((id, next)) = stack.last_mut() {
            let id = *id;

            let Some(parent) = traits[id].parents.get(*next).copied() else {
                stack.pop();
                marks.insert(id, Mark::Done);
                continue;
            };
            *next += 1;

            match marks.get(&parent).copied().unwrap_or(Mark::Unvisited) {
                Mark::Unvisited => {
                    marks.insert(parent, Mark::OnStack);
                    stack.push((parent, 0));
                }
                Mark::OnStack => {
                    let start = stack
                        .iter()
                        .position(|(x, _)| *x == parent)
                        .unwrap_or_default();

                    let cycle = stack[start..]
                        .iter()
                        .map(|(x, _)| *x)
                        .chain(std::iter::once(parent))
                        .map(|x| traits[x].name.clone())
                        .collect();

                    found.push(CyclicInheritance {
                        back_edge: (
                            traits[id].name.clone(),
                            traits[parent].name.clone(),
                        ),
                        cycle,
                    });
                }
                Mark::Done => {}
            }
        }
    }

    found
}
