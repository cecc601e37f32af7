mod commands;
mod helpers;

use clap::Parser;
use su2_core::domain::Su2Error;

const PROGRAM_NAME: &str = "su2-3nj";

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let error = error.as_su2_error();
            eprintln!("{}", error.diagnostic_line());
            eprintln!("{}", error.fatal_exit_line());
            error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once(PROGRAM_NAME.to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
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
    name = "su2-3nj",
    version,
    about = "SU(2) recoupling coefficients and recurrence stability analysis"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Compare forward and backward recursion of the model 6j recurrence
    Stability(commands::StabilityArgs),
    /// Evaluate a 6j (six spins) or 9j (nine spins) symbol
    Symbol(commands::SymbolArgs),
    /// Check reflection symmetry of the closed-form product formula
    Symmetry(commands::SymmetryArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Stability(args) => commands::run_stability_command(args),
        CliCommand::Symbol(args) => commands::run_symbol_command(args),
        CliCommand::Symmetry(args) => commands::run_symmetry_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(Su2Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn as_su2_error(&self) -> Su2Error {
        match self {
            Self::Usage(message) => Su2Error::input_validation("INPUT.CLI_USAGE", message.clone()),
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => Su2Error::internal("RUN.CLI", format!("{error:#}")),
        }
    }

    pub(crate) fn compute(error: impl Into<Su2Error>) -> Self {
        Self::Compute(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::{run, CliError};

    #[test]
    fn help_exits_successfully() {
        assert_eq!(run(["--help"]).expect("help renders"), 0);
        assert_eq!(run(["symbol", "--help"]).expect("help renders"), 0);
    }

    #[test]
    fn unknown_subcommand_is_a_usage_error() {
        let error = run(["regress"]).expect_err("unknown subcommand");
        assert!(matches!(error, CliError::Usage(_)));
        assert_eq!(error.as_su2_error().exit_code(), 2);
    }

    #[test]
    fn unexpected_failures_map_to_internal_exit_code() {
        let error = CliError::from(anyhow::anyhow!("renderer failed"));
        let error = error.as_su2_error();
        assert_eq!(error.exit_code(), 5);
        assert_eq!(error.diagnostic_line(), "ERROR: [RUN.CLI] renderer failed");
    }
}
