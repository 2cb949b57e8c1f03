//! Contains the main `run()` function of the conformance checker.

use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use conformc_conformance::Checker;
use conformc_declaration::{
    declare,
    diagnostic::{self, SymbolKind, UnknownSymbol},
    input::{StructDeclaration, TraitDeclaration},
    Model,
};
use conformc_diagnostic::{Diagnostic, Report, Severity};
use conformc_handler::{Handler, Storage};
use conformc_materialization::{input::TransitionDeclaration, Resolver};
use parking_lot::RwLock;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::{Deserialize, Serialize};

/// The arguments to the program.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, clap::Parser)]
#[clap(
    name = "conformc",
    about = "Checks trait conformance and parameter-domain materialization",
    author = "Simmypeet"
)]
pub struct Arguments {
    /// The RON file containing the program to check.
    pub file: PathBuf,

    /// Prints nothing when the program passes every check.
    #[clap(short, long)]
    pub quiet: bool,
}

/// Claims a struct conforms to traits it does not necessarily declare.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Assertion {
    /// The name of the struct.
    pub struct_name: String,

    /// The names of the claimed traits.
    pub traits: Vec<String>,
}

/// The content of an input file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    /// Every trait declaration.
    #[serde(default)]
    pub traits: Vec<TraitDeclaration>,

    /// Every struct declaration.
    #[serde(default)]
    pub structs: Vec<StructDeclaration>,

    /// Conformance claims checked in addition to the declared ones.
    #[serde(default)]
    pub assertions: Vec<Assertion>,

    /// Values flowing into contexts.
    #[serde(default)]
    pub transitions: Vec<TransitionDeclaration>,
}

/// The input file could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read the program: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid RON program.
    #[error("failed to parse the program: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

impl Program {
    /// Reads a program from a RON file.
    ///
    /// # Errors
    ///
    /// See [`LoadError`].
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let source = fs::read_to_string(path)?;

        Ok(ron::from_str(&source)?)
    }
}

/// What [`check`] went through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
pub struct Summary {
    /// The number of structs checked against their declared traits.
    pub structs: usize,

    /// The number of assertions checked.
    pub assertions: usize,

    /// The number of transitions resolved.
    pub transitions: usize,
}

/// A struct that implements [`Handler`] but prints all the diagnostics to
/// the standard error stream.
#[derive(Debug)]
struct Printer {
    printed: RwLock<bool>,
}

impl Printer {
    /// Creates a new [`Printer`].
    const fn new() -> Self { Self { printed: RwLock::new(false) } }

    fn has_printed(&self) -> bool { *self.printed.read() }
}

impl Handler<Diagnostic> for Printer {
    fn receive(&self, diagnostic: Diagnostic) {
        eprintln!("{diagnostic}\n");

        *self.printed.write() = true;
    }
}

/// Runs every check of the program and reports each failure to the
/// `handler`.
///
/// The program is declared first; if that fails nothing else is checked.
/// Otherwise every struct is checked against the traits it declares, then
/// every assertion, then every transition. A failing check never stops the
/// following ones.
pub fn check(program: Program, handler: &dyn Handler<Diagnostic>) -> Summary {
    let declaration_errors = Storage::<diagnostic::Error>::new();

    let Ok(model) =
        declare(program.traits, program.structs, &declaration_errors)
    else {
        for error in declaration_errors.into_vec() {
            handler.receive(error.report(()));
        }

        return Summary::default();
    };

    let checker = Checker::new(&model);

    let verdicts = checker.check_all();
    for (_, verdict) in &verdicts {
        if let Err(error) = verdict {
            handler.receive(error.report(&model));
        }
    }

    for assertion in &program.assertions {
        check_assertion(&checker, assertion, handler);
    }

    let resolver = Resolver::new(&checker);
    let resolutions = program
        .transitions
        .par_iter()
        .map(|transition| -> Result<_, Diagnostic> {
            let value =
                transition.resolve(&model).map_err(|x| x.report(()))?;

            resolver
                .resolve_materialization(value, &transition.context)
                .map_err(|x| x.report(&model))
        })
        .collect::<Vec<_>>();

    for resolution in resolutions {
        match resolution {
            Ok(materialized) => {
                log::debug!(
                    "a value of `{}` flows into its context",
                    model[materialized.target].name()
                );
            }
            Err(diagnostic) => handler.receive(diagnostic),
        }
    }

    Summary {
        structs: verdicts.len(),
        assertions: program.assertions.len(),
        transitions: program.transitions.len(),
    }
}

fn check_assertion(
    checker: &Checker<'_>,
    assertion: &Assertion,
    handler: &dyn Handler<Diagnostic>,
) {
    let model: &Model = checker.model();
    let referenced_from = format!("assertion on `{}`", assertion.struct_name);
    let unknown = |name: &str, kind| UnknownSymbol {
        name: name.to_owned(),
        kind,
        referenced_from: referenced_from.clone(),
    };

    let Some(struct_id) = model.struct_id(&assertion.struct_name) else {
        handler.receive(
            unknown(&assertion.struct_name, SymbolKind::Struct).report(()),
        );
        return;
    };

    let mut traits = Vec::with_capacity(assertion.traits.len());
    for name in &assertion.traits {
        match model.trait_id(name) {
            Some(trait_id) => traits.push(trait_id),
            None => {
                handler.receive(unknown(name, SymbolKind::Trait).report(()));
                return;
            }
        }
    }

    if let Err(error) = checker.check_conformance(struct_id, &traits) {
        handler.receive(error.report(model));
    }
}

/// Runs the program with the given arguments.
#[must_use]
pub fn run(arguments: Arguments) -> ExitCode {
    let Arguments { file, quiet } = arguments;

    let program = match Program::load(&file) {
        Ok(program) => program,
        Err(error) => {
            eprintln!(
                "{}",
                Diagnostic::error(format!("{}: {error}", file.display()))
            );
            return ExitCode::FAILURE;
        }
    };

    let printer = Printer::new();
    let summary = check(program, &printer);

    if printer.has_printed() {
        return ExitCode::FAILURE;
    }

    if !quiet {
        println!(
            "{} {} struct(s), {} assertion(s) and {} transition(s) checked",
            Severity::Info,
            summary.structs,
            summary.assertions,
            summary.transitions
        );
    }

    ExitCode::SUCCESS
}

#[cfg(test)]
mod test;
