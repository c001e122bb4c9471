use revertable::RunError;
use revertable_plan::{ExecError, PlanError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("plan error")]
    Plan(#[from] PlanError),

    #[error("plan '{plan}' failed")]
    Run {
        plan: String,
        #[source]
        source: RunError<ExecError>,
    },

    #[error("failed to render JSON output")]
    Json(#[from] serde_json::Error),

    #[error("invalid environment override '{0}' (expected KEY=VALUE)")]
    InvalidEnv(String),
}

pub type Result<T> = std::result::Result<T, CliError>;
