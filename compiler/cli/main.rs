use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use compiler__analysis::DEFAULT_ERROR_LIMIT;
use compiler__check_session::{CheckConfig, CheckError, check_paths};
use compiler__reports::ReportFormat;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "policyc", about = "Validate policy source", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Enable verbose logging (debug level) on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Check policy modules for parse and compile errors
    Check(CheckArgs),
}

#[derive(Args)]
struct CheckArgs {
    /// Files or directories to check
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Output format: pretty or json
    #[arg(short, long, default_value_t = ReportFormat::Pretty)]
    format: ReportFormat,
    /// Maximum number of errors to report; zero or negative means no limit
    #[arg(
        short = 'm',
        long,
        default_value_t = DEFAULT_ERROR_LIMIT,
        allow_negative_numbers = true
    )]
    max_errors: i64,
    /// Skip files and directories whose name matches the glob
    #[arg(long, value_delimiter = ',')]
    ignore: Vec<String>,
    /// Treat each path as a bundle directory
    #[arg(short, long)]
    bundle: bool,
}

impl CheckArgs {
    fn config(&self) -> CheckConfig {
        CheckConfig {
            format: self.format,
            error_limit: self.max_errors,
            ignore: self.ignore.clone(),
            bundle_mode: self.bundle,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return if error.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Check(args) => run_check(&args),
    }
}

fn run_check(args: &CheckArgs) -> ExitCode {
    let config = args.config();
    debug!(?config, paths = args.paths.len(), "starting check");

    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    match check_paths(&config, &args.paths, &mut stdout, &mut stderr) {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(error @ (CheckError::NoPaths | CheckError::InvalidIgnorePattern(_))) => {
            let kind = match &error {
                CheckError::NoPaths => ErrorKind::MissingRequiredArgument,
                _ => ErrorKind::ValueValidation,
            };
            let mut command = Cli::command();
            command.build();
            let usage_error = match command.find_subcommand_mut("check") {
                Some(check) => check.error(kind, error),
                None => command.error(kind, error),
            };
            let _ = usage_error.print();
            ExitCode::FAILURE
        }
        Err(error) => {
            let _ = writeln!(stderr, "error: {error}");
            ExitCode::FAILURE
        }
    }
}
