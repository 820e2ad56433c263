use std::process::ExitCode;

use tracing::error;

mod bootstrap;
mod config;
mod loop_runner;
mod pong;

pub(crate) fn main() -> ExitCode {
    match bootstrap::build_app() {
        Ok(app) => loop_runner::run(app),
        Err(err) => {
            error!(error = %err, "config_load_failed");
            ExitCode::FAILURE
        }
    }
}
