use std::io::Write;

use conformc_diagnostic::Diagnostic;
use conformc_handler::Storage;

use crate::{check, Assertion, LoadError, Program, Summary};

const PETS: &str = include_str!("../../../inputs/pets.ron");
const LITERALS: &str = include_str!("../../../inputs/literals.ron");

fn messages_of(program: Program) -> (Summary, Vec<String>) {
    let storage = Storage::<Diagnostic>::new();
    let summary = check(program, &storage);

    (summary, storage.into_vec().into_iter().map(|x| x.message).collect())
}

#[test]
fn sample_programs_pass() {
    let (summary, messages) = messages_of(ron::from_str(PETS).unwrap());

    assert!(messages.is_empty(), "{messages:?}");
    assert_eq!(summary, Summary { structs: 2, assertions: 1, transitions: 0 });

    let (summary, messages) = messages_of(ron::from_str(LITERALS).unwrap());

    assert!(messages.is_empty(), "{messages:?}");
    assert_eq!(summary, Summary { structs: 2, assertions: 0, transitions: 2 });
}

#[test]
fn every_failure_is_reported() {
    let mut program: Program = ron::from_str(PETS).unwrap();

    // `Cat` loses `getName`
    program.structs[0].implementations.truncate(1);
    program.assertions.push(Assertion {
        struct_name: "Stone".to_owned(),
        traits: vec!["Animal".to_owned(), "Flying".to_owned()],
    });

    let (summary, messages) = messages_of(program);

    assert_eq!(summary.structs, 2);
    assert_eq!(messages, vec![
        "struct `Cat` does not implement `getName(self) -> String`".to_owned(),
        "trait `Flying` is not declared".to_owned(),
    ]);
}

#[test]
fn rejected_declarations_stop_the_checks() {
    let mut program: Program = ron::from_str(LITERALS).unwrap();

    // `IntLiteral` now materializes into itself
    if let Some(materialization) = &mut program.structs[0].materialization {
        materialization.target = Some("IntLiteral".to_owned());
    }

    let (summary, messages) = messages_of(program);

    assert_eq!(summary, Summary::default());
    assert_eq!(messages.len(), 1);
}

#[test]
fn failing_transition_is_reported() {
    let mut program: Program = ron::from_str(LITERALS).unwrap();

    // `Int` can no longer be built from `IntLiteral`
    program.structs[1].implementations.clear();

    let (summary, messages) = messages_of(program);

    assert_eq!(summary.transitions, 2);
    assert_eq!(messages, vec![
        "a value of type `IntLiteral` is used as a runtime value but `Int` \
         has no constructor taking `IntLiteral`"
            .to_owned()
    ]);
}

#[test]
fn load_reads_ron_files() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(PETS.as_bytes()).unwrap();

    let program = Program::load(file.path()).unwrap();

    assert_eq!(program.traits.len(), 3);
    assert_eq!(program.structs.len(), 2);
}

#[test]
fn load_reports_io_and_parse_errors() {
    let directory = tempfile::tempdir().unwrap();

    assert!(matches!(
        Program::load(&directory.path().join("missing.ron")),
        Err(LoadError::Io(_))
    ));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"Program(traits: [").unwrap();

    assert!(matches!(Program::load(file.path()), Err(LoadError::Parse(_))));
}
