//! cad - command-line front end for the cadastre hierarchy engine.

use std::process::ExitCode;

use cadastre::ui::output;

fn main() -> ExitCode {
    match cadastre::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
