mod commands;
mod helpers;

use clap::{ArgAction, Parser};
use triton_core::domain::TritonError;

pub fn run_from_env() -> i32 {
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            error.report();
            error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("triton".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => {
            helpers::init_logging(cli.quiet, cli.verbose);
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

#[derive(Parser)]
#[command(
    name = "triton",
    version,
    about = "Batch driver for the Netuno 4 rainwater harvesting simulator"
)]
struct Cli {
    /// Lower the log level; repeat to show errors only. Ignored with --verbose
    #[arg(short, long, action = ArgAction::Count, global = true)]
    quiet: u8,

    /// Show debug messages. Overrides --quiet
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Simulate every precipitation file in a directory and consolidate the results
    Run(commands::RunArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Run(args) => commands::run_batch_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Batch(TritonError),
}

impl CliError {
    fn as_triton_error(&self) -> TritonError {
        match self {
            Self::Usage(message) => TritonError::validation("INPUT.CLI_USAGE", message.clone()),
            Self::Batch(error) => error.clone(),
        }
    }

    fn exit_code(&self) -> i32 {
        self.as_triton_error().exit_code()
    }

    fn report(&self) {
        match self {
            Self::Usage(message) => eprint!("{}", message),
            Self::Batch(error) if error.category().is_validation() => {
                eprintln!("{}", error.diagnostic_line());
            }
            _ => tracing::error!("{}", self.as_triton_error()),
        }
    }
}

impl From<TritonError> for CliError {
    fn from(error: TritonError) -> Self {
        Self::Batch(error)
    }
}
