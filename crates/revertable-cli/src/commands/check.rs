use std::path::Path;

use revertable_plan::Plan;

use super::{CheckArgs, resolve_plan_path};
use crate::error::Result;
use crate::output::{JsonFormatter, PlainTextFormatter, ReportFormatter};

pub(crate) fn run(args: CheckArgs, base_dir: &Path) -> Result<()> {
    let plan = Plan::load(&resolve_plan_path(base_dir, &args.plan))?;

    let rendered = if args.json {
        JsonFormatter.format_plan(&plan)?
    } else {
        PlainTextFormatter.format_plan(&plan)?
    };
    print!("{rendered}");
    Ok(())
}
