//! slurmscript - edit SLURM batch scripts from the command line

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = slurm_script::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
