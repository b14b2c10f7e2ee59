use anyhow::Error;
use chatfilter_config::ConfigError;
use chatfilter_core::FilterError;
use std::error::Error as StdError;
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

/// Prints the top-level error, or the whole cause chain when `verbose`.
pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {err:#}");
    } else {
        eprintln!("error: {err}");
    }
}

/// Exit code of the first cause in the chain that the binary knows about.
pub fn exit_code_for(err: &Error) -> ExitCode {
    ExitCode::from(exit_status(err))
}

fn exit_status(err: &Error) -> u8 {
    err.chain().find_map(classify).unwrap_or(EXIT_FAILURE)
}

fn classify(cause: &(dyn StdError + 'static)) -> Option<u8> {
    if cause.is::<CliError>() || cause.is::<FilterError>() {
        return Some(EXIT_INVALID_INPUT);
    }
    cause.downcast_ref::<ConfigError>().map(|err| match err {
        ConfigError::MissingHomeDir | ConfigError::Read { .. } => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    })
}
