mod commands;
mod error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::commands::Commands;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "revertctl")]
#[command(bin_name = "revertctl")]
#[command(about = "Run apply/revert plans, reverting applied actions on failure", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory plans run in and relative paths resolve against (default: current directory)
    #[arg(long = "path", short = 'C', global = true)]
    path: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); overrides RUST_LOG
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors; overrides RUST_LOG
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::ERROR;
        }
        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// `RUST_LOG` applies only when neither `-v` nor `-q` is given.
    fn env_filter(&self) -> EnvFilter {
        let builder = EnvFilter::builder().with_default_directive(self.log_level().into());
        if self.quiet || self.verbose > 0 {
            builder.parse_lossy("")
        } else {
            builder.from_env_lossy()
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.env_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let base_dir = match resolve_base_dir(cli.path) {
        Ok(path) => path,
        Err(e) => {
            print_error(&e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = cli.command.execute(&base_dir) {
        print_error(&e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn resolve_base_dir(path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match path {
        Some(p) => Ok(p),
        None => std::env::current_dir().map_err(CliError::Io),
    }
}

fn print_error(error: &CliError) {
    eprintln!("error: {error}");

    if let CliError::Run { source, .. } = error {
        for action_error in source {
            eprintln!("  {action_error}");
            print_causes(std::error::Error::source(action_error), "    ");
        }
        return;
    }

    print_causes(std::error::Error::source(error), "");
}

fn print_causes(mut source: Option<&(dyn std::error::Error + 'static)>, indent: &str) {
    while let Some(cause) = source {
        eprintln!("{indent}caused by: {cause}");
        source = cause.source();
    }
}
