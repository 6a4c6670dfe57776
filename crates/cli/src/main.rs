use std::process::ExitCode;

fn main() -> ExitCode {
    swimfit_cli::run()
}
