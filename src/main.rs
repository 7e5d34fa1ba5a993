use std::process::ExitCode;

fn main() -> ExitCode {
    oistats::logging::init_logging();

    match oistats::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}
