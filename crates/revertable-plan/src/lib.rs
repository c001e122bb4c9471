//! Declarative apply/revert plans.
//!
//! A [`Plan`] is an ordered list of [`ActionSpec`]s loaded from TOML or YAML.
//! Each spec is turned into a [`revertable::Revertable`] by [`build_action`]
//! and the resulting list is run with [`run_plan`].

mod actions;
mod config;
mod error;
mod plan;

pub use actions::{
    CommandAction, CommandLine, CreateDirAction, DryRunAction, PlanAction, WriteFileAction,
    build_action, build_actions, run_plan,
};
pub use config::RunConfig;
pub use error::{ExecError, PlanError};
pub use plan::{ActionKind, ActionSpec, Plan, PlanFormat, PlanSettings};
