mod check;
mod run;

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::error::{CliError, Result};

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run a plan, reverting applied actions if one fails
    Run(RunArgs),
    /// Validate a plan and show its apply order
    Check(CheckArgs),
}

#[derive(Args)]
pub(crate) struct RunArgs {
    /// Plan file (.toml, .yaml or .yml)
    pub(crate) plan: PathBuf,

    /// Log what each action would do without doing it
    #[arg(long)]
    pub(crate) dry_run: bool,

    /// Set an environment variable for every command (repeatable)
    #[arg(long = "env", short = 'e', value_name = "KEY=VALUE", value_parser = parse_env)]
    pub(crate) env: Vec<(String, String)>,

    /// Print the run report as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Plan file (.toml, .yaml or .yml)
    pub(crate) plan: PathBuf,

    /// Print the parsed plan as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl Commands {
    pub(crate) fn execute(self, base_dir: &Path) -> Result<()> {
        match self {
            Self::Run(args) => run::run(args, base_dir),
            Self::Check(args) => check::run(args, base_dir),
        }
    }
}

fn parse_env(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(CliError::InvalidEnv(raw.to_string())),
    }
}

/// Plan paths on the command line are relative to the base directory.
fn resolve_plan_path(base_dir: &Path, plan: &Path) -> PathBuf {
    base_dir.join(plan)
}
