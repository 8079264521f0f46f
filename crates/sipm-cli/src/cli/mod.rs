mod commands;
mod helpers;

use clap::Parser;
use sipm_core::domain::SipmError;
use tracing_subscriber::EnvFilter;

pub fn run_from_env() -> i32 {
    match parse_and_dispatch(std::env::args().collect()) {
        Ok(code) => code,
        Err(error) => {
            let sipm_error = error.as_sipm_error();
            eprintln!("{}", sipm_error.diagnostic_line());
            sipm_error.exit_code()
        }
    }
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            init_tracing(&cli.log_level);
            dispatch_parsed(cli.command)
        }
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser)]
#[command(name = "sipm-spe", about = "SiPM single photo-electron spectrum model", version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Evaluate the model curve for a set of named parameters
    Evaluate(commands::EvaluateArgs),
    /// Print the fit parameter schema as JSON
    Schema(commands::SchemaArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Evaluate(args) => commands::run_evaluate_command(args),
        CliCommand::Schema(args) => commands::run_schema_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(SipmError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<SipmError> for CliError {
    fn from(error: SipmError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_sipm_error(&self) -> SipmError {
        match self {
            Self::Usage(message) => SipmError::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => SipmError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
