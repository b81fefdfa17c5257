use std::process::ExitCode;

fn main() -> ExitCode {
    match pr_report::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("pr: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
