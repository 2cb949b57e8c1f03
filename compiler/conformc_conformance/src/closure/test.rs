use std::{collections::HashSet, sync::Arc};

use conformc_declaration::{
    declare,
    input::{SignatureDeclaration, TraitDeclaration, TypeName},
    signature::Primitive,
    Model,
};
use conformc_handler::Panic;
use proptest::{prelude::*, test_runner::TestCaseError};

use crate::{checker::Origin, matching, Checker};

const METHODS: [&str; 4] = ["alpha", "beta", "gamma", "delta"];

fn method(name: &str) -> SignatureDeclaration {
    SignatureDeclaration::method(name, Vec::new(), TypeName::Unit)
}

fn trait_decl(
    name: &str,
    parents: &[&str],
    requirements: Vec<SignatureDeclaration>,
) -> TraitDeclaration {
    TraitDeclaration {
        name: name.to_owned(),
        parents: parents.iter().map(|x| (*x).to_owned()).collect(),
        requirements,
    }
}

/// Builds a random acyclic hierarchy: trait `T{i}` only inherits from traits
/// declared before it.
fn hierarchy() -> impl Strategy<Value = Vec<TraitDeclaration>> {
    proptest::collection::vec((any::<u8>(), 0u8..16), 1..8).prop_map(
        |masks| {
            masks
                .iter()
                .enumerate()
                .map(|(index, (parents, requirements))| TraitDeclaration {
                    name: format!("T{index}"),
                    parents: (0..index.min(8))
                        .filter(|x| parents & (1u8 << x) != 0)
                        .map(|x| format!("T{x}"))
                        .collect(),
                    requirements: METHODS
                        .iter()
                        .enumerate()
                        .filter(|(x, _)| requirements & (1u8 << x) != 0)
                        .map(|(_, name)| method(name))
                        .collect(),
                })
                .collect()
        },
    )
}

fn property(model: &Model) -> Result<(), TestCaseError> {
    let checker = Checker::new(model);

    for (id, _) in model.traits().entries() {
        let closure = checker
            .closure(id)
            .iter()
            .map(|x| matching::normalize(&x.requirement))
            .collect::<Vec<_>>();
        let distinct = closure.iter().cloned().collect::<HashSet<_>>();

        prop_assert_eq!(closure.len(), distinct.len(), "duplicates in closure");

        for ancestor in checker.ancestors(id).iter() {
            for obligation in checker.closure(*ancestor).iter() {
                let normalized = matching::normalize(&obligation.requirement);

                prop_assert!(
                    distinct.contains(&normalized),
                    "closure of {:?} misses {:?} of {:?}",
                    id,
                    obligation.requirement,
                    ancestor
                );
            }
        }
    }

    Ok(())
}

proptest! {
    #[test]
    fn closure_is_superset_of_ancestor_closures(
        declarations in hierarchy()
    ) {
        let model = declare(declarations, Vec::new(), &Panic).unwrap();

        property(&model)?;
    }
}

#[test]
fn diamond_requirement_appears_once() {
    let model = declare(
        vec![
            trait_decl("Top", &[], vec![method("alpha")]),
            trait_decl("Left", &["Top"], vec![method("beta")]),
            trait_decl("Right", &["Top"], vec![method("beta")]),
            trait_decl("Bottom", &["Left", "Right"], Vec::new()),
        ],
        Vec::new(),
        &Panic,
    )
    .unwrap();
    let checker = Checker::new(&model);

    let closure = checker.closure(model.trait_id("Bottom").unwrap());
    let entries = closure
        .iter()
        .map(|x| (x.requirement.name.as_str(), x.origin))
        .collect::<Vec<_>>();

    assert_eq!(entries, vec![
        ("beta", Origin::Trait(model.trait_id("Left").unwrap())),
        ("alpha", Origin::Trait(model.trait_id("Top").unwrap())),
    ]);
}

#[test]
fn own_requirements_come_before_inherited_ones() {
    let model = declare(
        vec![
            trait_decl("Pet", &["Animal", "Named"], vec![method("play")]),
            trait_decl("Animal", &[], vec![method("makeSound")]),
            trait_decl("Named", &[], vec![SignatureDeclaration::method(
                "getName",
                Vec::new(),
                TypeName::Primitive(Primitive::String),
            )]),
        ],
        Vec::new(),
        &Panic,
    )
    .unwrap();
    let checker = Checker::new(&model);

    let pet = model.trait_id("Pet").unwrap();
    let names = checker
        .closure(pet)
        .iter()
        .map(|x| x.requirement.name.clone())
        .collect::<Vec<_>>();

    assert_eq!(names, vec!["play", "makeSound", "getName"]);
    assert_eq!(checker.ancestors(pet).len(), 3);
}

#[test]
fn closure_is_memoized() {
    let model = declare(
        vec![trait_decl("Named", &[], vec![method("getName")])],
        Vec::new(),
        &Panic,
    )
    .unwrap();
    let checker = Checker::new(&model);
    let named = model.trait_id("Named").unwrap();

    let first = checker.closure(named);
    let second = checker.closure(named);

    assert!(Arc::ptr_eq(&first, &second));
}

/// `T{i}` inherits from `T{i - 1}` and requires `m{i}`.
fn chain(length: usize) -> Vec<TraitDeclaration> {
    (0..length)
        .map(|index| TraitDeclaration {
            name: format!("T{index}"),
            parents: index
                .checked_sub(1)
                .map(|x| format!("T{x}"))
                .into_iter()
                .collect(),
            requirements: vec![method(&format!("m{index}"))],
        })
        .collect()
}

#[test]
fn deep_inheritance_chain() {
    const LENGTH: usize = 3_000;

    let model = declare(chain(LENGTH), Vec::new(), &Panic).unwrap();
    let checker = Checker::new(&model);
    let last = model.trait_id(&format!("T{}", LENGTH - 1)).unwrap();

    assert_eq!(checker.ancestors(last).len(), LENGTH);

    let closure = checker.closure(last);
    assert_eq!(closure.len(), LENGTH);
    assert_eq!(closure[0].requirement.name, format!("m{}", LENGTH - 1));
    assert_eq!(closure[LENGTH - 1].requirement.name, "m0");

    // every trait on the way was cached too
    let middle = model.trait_id("T100").unwrap();
    assert_eq!(checker.closure(middle).len(), 101);
}
