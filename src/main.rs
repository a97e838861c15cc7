//! catalog-sync - Landscape and registry drift checker

use std::process::ExitCode;

fn main() -> ExitCode {
    match catalog_sync::cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
