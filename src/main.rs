//! mdsc binary entry point

use std::process::ExitCode;

fn main() -> ExitCode {
    match metadata_service_client::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
