mod commands;
mod error;
mod util;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

use crate::commands::{attributes, check, completions, run, tokens, Context};
use crate::error::{exit_code_for, report_error};

#[derive(Debug, Parser)]
#[command(name = "chatfilter", version, about = "Compile and apply chat message filters")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the attributes a filter can reference
    Attributes(attributes::AttributesArgs),
    /// Print the token stream of a filter
    Tokens(tokens::TokensArgs),
    /// Compile a filter and report errors
    Check(check::CheckArgs),
    /// Print the JSON-lines messages that pass the given filters
    Run(run::RunArgs),
    /// Print a shell completion script
    Completions(completions::CompletionsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    if let Err(err) = dispatch(cli) {
        report_error(&err, verbose);
        return exit_code_for(&err);
    }
    ExitCode::SUCCESS
}

fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        config,
        json,
        command,
        ..
    } = cli;
    match command {
        Command::Completions(args) => completions::emit(args),
        Command::Attributes(args) => {
            with_context(config, json, |ctx| attributes::list_attributes(ctx, args))
        }
        Command::Tokens(args) => with_context(config, json, |ctx| tokens::print_tokens(ctx, args)),
        Command::Check(args) => with_context(config, json, |ctx| check::check_filter(ctx, args)),
        Command::Run(args) => with_context(config, json, |ctx| run::run_filters(ctx, args)),
    }
}

fn with_context(
    config_path: Option<PathBuf>,
    json: bool,
    command: impl FnOnce(&Context<'_>) -> Result<()>,
) -> Result<()> {
    let loaded = chatfilter_config::load(config_path).context("load config")?;
    match &loaded.source {
        Some(path) => debug!(path = %path.display(), "config loaded"),
        None => debug!("no config file, using defaults"),
    }
    command(&Context {
        json,
        config: &loaded.config,
    })
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
