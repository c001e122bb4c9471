//! End-to-end tests running plans against a temporary directory.

use std::fs;
use std::path::Path;

use revertable::{ActionError, ActionStatus};
use revertable_plan::{ExecError, Plan, PlanError, RunConfig, run_plan};
use tempfile::TempDir;

fn write_plan(dir: &TempDir, file_name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(file_name);
    fs::write(&path, contents).expect("failed to write plan");
    path
}

fn config_for(plan: &Plan, dir: &Path) -> RunConfig {
    RunConfig::from_settings(&plan.settings, dir)
}

#[test]
fn successful_plan_keeps_every_effect() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let plan_path = write_plan(
        &dir,
        "plan.toml",
        r#"
name = "setup"

[[actions]]
name = "output dir"
kind = "create-dir"
path = "out"

[[actions]]
name = "marker"
kind = "write-file"
path = "out/marker.txt"
contents = "done"
"#,
    );

    let plan = Plan::load(&plan_path)?;
    let (result, audit_log) = run_plan(&plan, &config_for(&plan, dir.path()));

    assert!(result.is_ok());
    assert_eq!(fs::read_to_string(dir.path().join("out/marker.txt"))?, "done");
    assert_eq!(audit_log.revert_calls(), 0);
    Ok(())
}

#[test]
fn failing_command_unwinds_earlier_actions() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("config.yaml"), "replicas: 3")?;
    let plan_path = write_plan(
        &dir,
        "plan.yaml",
        r#"
name: rollout
actions:
  - name: output dir
    kind: create-dir
    path: out
  - name: patch config
    kind: write-file
    path: config.yaml
    contents: "replicas: 0"
  - name: rollout
    kind: shell
    apply: "echo rollout failed >&2; exit 1"
  - name: never runs
    kind: write-file
    path: never.txt
    contents: ""
"#,
    );

    let plan = Plan::load(&plan_path)?;
    let (result, audit_log) = run_plan(&plan, &config_for(&plan, dir.path()));

    let err = result.expect_err("rollout should fail");
    assert_eq!(err.len(), 1);
    match err.apply_error().and_then(ActionError::inner) {
        Some(ExecError::Failed { stderr, .. }) => assert_eq!(stderr, "rollout failed"),
        other => panic!("unexpected apply error: {other:?}"),
    }

    assert_eq!(fs::read_to_string(dir.path().join("config.yaml"))?, "replicas: 3");
    assert!(!dir.path().join("out").exists());
    assert!(!dir.path().join("never.txt").exists());
    assert_eq!(audit_log.records()[3].status, ActionStatus::Pending);
    Ok(())
}

#[test]
fn blocked_create_dir_reports_only_the_apply_error() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("file.txt"), "keep")?;
    let plan_path = write_plan(
        &dir,
        "plan.toml",
        r#"
name = "blocked"

[[actions]]
name = "marker"
kind = "write-file"
path = "marker.txt"
contents = "x"

[[actions]]
name = "nested"
kind = "create-dir"
path = "file.txt/sub"
"#,
    );

    let plan = Plan::load(&plan_path)?;
    let (result, audit_log) = run_plan(&plan, &config_for(&plan, dir.path()));

    let err = result.expect_err("file.txt is not a directory");
    assert_eq!(err.len(), 1);
    assert!(err.errors()[0].is_apply());
    assert_eq!(audit_log.records()[0].status, ActionStatus::Reverted);
    assert!(!dir.path().join("marker.txt").exists());
    assert_eq!(fs::read_to_string(dir.path().join("file.txt"))?, "keep");
    Ok(())
}

#[test]
fn cancel_flag_stops_the_unwind() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let plan_path = write_plan(
        &dir,
        "plan.toml",
        r#"
name = "guarded"

[[actions]]
name = "first file"
kind = "write-file"
path = "first.txt"
contents = "first"

[[actions]]
name = "guard"
kind = "shell"
apply = "true"
revert = "exit 7"
cancel_unwind_on_revert_failure = true

[[actions]]
name = "boom"
kind = "command"
apply = ["false"]
"#,
    );

    let plan = Plan::load(&plan_path)?;
    let (result, audit_log) = run_plan(&plan, &config_for(&plan, dir.path()));

    let err = result.expect_err("plan should fail");
    assert!(err.was_cancelled());
    assert!(dir.path().join("first.txt").exists());
    assert_eq!(audit_log.records()[0].status, ActionStatus::Skipped);
    assert_eq!(audit_log.records()[1].status, ActionStatus::RevertCancelled);
    Ok(())
}

#[test]
fn plan_settings_set_working_dir_and_env() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    fs::create_dir(dir.path().join("work"))?;
    let plan_path = write_plan(
        &dir,
        "plan.toml",
        r#"
name = "env"

[settings]
working_dir = "work"
env = { TARGET = "from-plan" }

[[actions]]
name = "record env"
kind = "shell"
apply = "printf '%s' \"$TARGET\" > target.txt"
"#,
    );

    let plan = Plan::load(&plan_path)?;
    let config = config_for(&plan, dir.path()).with_env("TARGET", "from-override");
    let (result, _audit_log) = run_plan(&plan, &config);

    assert!(result.is_ok());
    assert_eq!(
        fs::read_to_string(dir.path().join("work/target.txt"))?,
        "from-override"
    );
    Ok(())
}

#[test]
fn dry_run_reports_success_without_effects() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let plan_path = write_plan(
        &dir,
        "plan.toml",
        r#"
name = "dry"

[[actions]]
name = "marker"
kind = "write-file"
path = "marker.txt"
contents = "x"
"#,
    );

    let plan = Plan::load(&plan_path)?;
    let config = config_for(&plan, dir.path()).with_dry_run(true);
    let (result, _audit_log) = run_plan(&plan, &config);

    assert!(result.is_ok());
    assert!(!dir.path().join("marker.txt").exists());
    Ok(())
}

#[test]
fn load_reports_path_of_invalid_plan() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let plan_path = write_plan(&dir, "empty.toml", r#"name = "empty""#);

    let err = Plan::load(&plan_path).expect_err("plan without actions is invalid");

    assert!(matches!(&err, PlanError::Invalid { path, .. } if path == &plan_path));
    assert!(err.to_string().contains("empty.toml"));
    Ok(())
}

#[test]
fn load_rejects_unknown_extension() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let plan_path = write_plan(&dir, "plan.json", "{}");

    let err = Plan::load(&plan_path).expect_err("json plans are unsupported");

    assert!(matches!(err, PlanError::UnsupportedFormat { .. }));
    Ok(())
}

#[test]
fn load_reports_missing_file() {
    let err = Plan::load(Path::new("/definitely/not/here.toml")).expect_err("missing file");

    assert!(matches!(err, PlanError::Read { .. }));
}
