use std::process::ExitCode;

use revfs::ui::output;

fn main() -> ExitCode {
    match revfs::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
