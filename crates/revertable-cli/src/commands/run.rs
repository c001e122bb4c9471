use std::path::Path;

use revertable_plan::{Plan, RunConfig, run_plan};
use tracing::info;

use super::{RunArgs, resolve_plan_path};
use crate::error::{CliError, Result};
use crate::output::{JsonFormatter, PlainTextFormatter, ReportFormatter, RunReport};

pub(crate) fn run(args: RunArgs, base_dir: &Path) -> Result<()> {
    let plan = Plan::load(&resolve_plan_path(base_dir, &args.plan))?;

    let config = args.env.into_iter().fold(
        RunConfig::from_settings(&plan.settings, base_dir).with_dry_run(args.dry_run),
        |config, (key, value)| config.with_env(key, value),
    );

    let (result, audit_log) = run_plan(&plan, &config);

    let report = RunReport {
        plan: &plan,
        audit_log: &audit_log,
        error: result.as_ref().err(),
        dry_run: config.dry_run(),
    };
    let rendered = if args.json {
        JsonFormatter.format_run(&report)?
    } else {
        PlainTextFormatter.format_run(&report)?
    };
    print!("{rendered}");

    match result {
        Ok(()) => {
            info!(plan = %plan.name, "plan applied");
            Ok(())
        }
        Err(source) => Err(CliError::Run {
            plan: plan.name.clone(),
            source,
        }),
    }
}
