use std::process::ExitCode;

use clap::Parser;
use lokey::cli::Arguments;

fn main() -> ExitCode {
    let args = Arguments::parse();

    match lokey::cli::run_cli(args) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("Error: {}", err);
            lokey::cli::ExitStatus::Error.into()
        }
    }
}
