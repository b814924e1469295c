mod commands;
mod helpers;

use clap::Parser;
use rtdiag_core::domain::RtDiagError;

const PROGRAM_NAME: &str = "rtdiag";

pub fn run_from_env() -> i32 {
    helpers::init_tracing();
    let remaining: Vec<String> = std::env::args().skip(1).collect();

    match run(remaining) {
        Ok(code) => code,
        Err(error) => {
            let diagnostic = error.as_rtdiag_error();
            eprintln!("{}", diagnostic.diagnostic_line());
            eprintln!("{}", diagnostic.fatal_exit_line());
            diagnostic.exit_code()
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
    name = "rtdiag",
    version,
    about = "Inspect spectra and diagnostics from radiative-transfer simulations"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Build the panel data for one inclination of a spectrum
    Spectrum(commands::SpectrumArgs),
    /// Build one spectrum panel per inclination
    Spectra(commands::SpectraArgs),
    /// Build the emission component panels of a spectrum
    Components(commands::ComponentsArgs),
    /// Build the optical depth panel data for a simulation
    OpticalDepth(commands::OpticalDepthArgs),
    /// List the inclinations present in spectrum files
    Inclinations(commands::InclinationsArgs),
    /// Report wind convergence from the rank-0 diag file
    Convergence(commands::ConvergenceArgs),
    /// Sum the error summaries of every process
    Errors(commands::ErrorsArgs),
    /// Print a line or edge catalog
    Lines(commands::LinesArgs),
    /// Find spectrum files below a directory
    FindSpecs(commands::FindSpecsArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Spectrum(args) => commands::run_spectrum_command(args),
        CliCommand::Spectra(args) => commands::run_spectra_command(args),
        CliCommand::Components(args) => commands::run_components_command(args),
        CliCommand::OpticalDepth(args) => commands::run_optical_depth_command(args),
        CliCommand::Inclinations(args) => commands::run_inclinations_command(args),
        CliCommand::Convergence(args) => commands::run_convergence_command(args),
        CliCommand::Errors(args) => commands::run_errors_command(args),
        CliCommand::Lines(args) => commands::run_lines_command(args),
        CliCommand::FindSpecs(args) => commands::run_find_specs_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Core(RtDiagError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<RtDiagError> for CliError {
    fn from(error: RtDiagError) -> Self {
        Self::Core(error)
    }
}

impl CliError {
    fn as_rtdiag_error(&self) -> RtDiagError {
        match self {
            Self::Usage(message) => RtDiagError::input_type("INPUT.CLI_USAGE", message.clone()),
            Self::Core(error) => error.clone(),
            Self::Internal(error) => RtDiagError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
