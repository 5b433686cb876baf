//! `comlink` binary: call one gateway endpoint and print the JSON result.

use std::process::ExitCode;

use clap::Parser;
use comlink_common_async::{build_runtime, RuntimeConfig};
use tracing::error;

mod cli;
mod commands;
mod error;

use cli::Cli;
use error::CliError;

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("failed to initialise logging: {e}");
        return Exit::GeneralError.into();
    }

    let runtime = match build_runtime(RuntimeConfig::default()) {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to start runtime: {e}");
            return Exit::GeneralError.into();
        }
    };

    match runtime.block_on(commands::run(cli)) {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            error!("{e}");
            report(&e);
            e.exit_code()
        }
    }
}

fn init_logging(cli: &Cli) -> Result<(), comlink_common_log::LogError> {
    let mut config = comlink_common_log::LogConfig::from_env();
    // Flags win; without flags or COMLINK_LOG_LEVEL only warnings are shown.
    if cli.verbose > 0 || cli.quiet || std::env::var_os("COMLINK_LOG_LEVEL").is_none() {
        config.level = comlink_common_log::LogLevel::from_verbosity(cli.verbose, cli.quiet);
    }
    comlink_common_log::init(config)
}

fn report(e: &CliError) {
    eprintln!("error[{}]: {e}", e.code());
    if let Some(gateway) = e.gateway_error() {
        eprintln!("  gateway code: {}", gateway.code);
        eprintln!("  gateway message: {}", gateway.message);
    }
}
