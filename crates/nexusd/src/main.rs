use std::process::ExitCode;

fn main() -> ExitCode {
    match nexusd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("nexusd: {error}");
            ExitCode::FAILURE
        }
    }
}
