use std::fmt;
use std::path::PathBuf;
use std::process::Command;

use indexmap::IndexMap;
use revertable::{RevertOutcome, Revertable};
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::error::ExecError;

/// A command to run, either directly or through `sh -c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    Argv(Vec<String>),
    Shell(String),
}

impl CommandLine {
    fn to_command(&self) -> Result<Command, ExecError> {
        match self {
            Self::Argv(argv) => {
                let (program, args) = argv.split_first().ok_or(ExecError::EmptyCommand)?;
                let mut command = Command::new(program);
                command.args(args);
                Ok(command)
            }
            Self::Shell(script) => {
                let mut command = Command::new("sh");
                command.arg("-c").arg(script);
                Ok(command)
            }
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argv(argv) => write!(f, "{}", argv.join(" ")),
            Self::Shell(script) => write!(f, "sh -c {script:?}"),
        }
    }
}

/// Runs one command to apply and, optionally, another to revert.
#[derive(Debug)]
pub struct CommandAction {
    name: String,
    apply: CommandLine,
    revert: Option<CommandLine>,
    working_dir: PathBuf,
    env: IndexMap<String, String>,
}

impl CommandAction {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        apply: CommandLine,
        revert: Option<CommandLine>,
        config: &RunConfig,
    ) -> Self {
        Self {
            name: name.into(),
            apply,
            revert,
            working_dir: config.working_dir().to_path_buf(),
            env: config.env().clone(),
        }
    }

    fn execute(&self, line: &CommandLine) -> Result<(), ExecError> {
        let mut command = line.to_command()?;
        command.current_dir(&self.working_dir).envs(&self.env);

        info!(action = %self.name, command = %line, "running command");
        let output = command.output().map_err(|source| ExecError::Spawn {
            command: line.to_string(),
            source,
        })?;

        if output.status.success() {
            debug!(
                action = %self.name,
                stdout = %String::from_utf8_lossy(&output.stdout).trim(),
                "command succeeded"
            );
            Ok(())
        } else {
            Err(ExecError::Failed {
                command: line.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl Revertable for CommandAction {
    type Error = ExecError;

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self) -> Result<(), ExecError> {
        self.execute(&self.apply)
    }

    fn revert(&mut self) -> RevertOutcome<ExecError> {
        match &self.revert {
            Some(line) => self.execute(line).into(),
            None => RevertOutcome::Reverted,
        }
    }

    fn revert_description(&self) -> String {
        match &self.revert {
            Some(line) => format!("run `{line}`"),
            None => "nothing to revert".to_string(),
        }
    }
}
