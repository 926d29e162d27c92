use std::process::ExitCode;

use crate::cli::run;

pub mod cli;
mod config;
pub mod domain;
pub mod import;
pub mod providers;
#[cfg(test)]
mod testing;

fn main() -> ExitCode {
    run()
}
