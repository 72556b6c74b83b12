use std::process::ExitCode;

use mmstack::error::ErrorClass;

fn main() -> ExitCode {
    match mmstack::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            match err.class() {
                ErrorClass::Output => ExitCode::from(2),
                ErrorClass::Structural | ErrorClass::Schema => ExitCode::FAILURE,
            }
        }
    }
}
