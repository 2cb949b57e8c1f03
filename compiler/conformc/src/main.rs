//! The executable of the conformance checker.

use std::process::ExitCode;

use clap::Parser;
use conformc_driver::Arguments;

fn main() -> ExitCode {
    env_logger::init();

    conformc_driver::run(Arguments::parse())
}
