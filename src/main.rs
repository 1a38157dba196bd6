use std::process::ExitCode;

fn main() -> ExitCode {
    match cru_checks::app::run() {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
