use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::plan::PlanSettings;

/// Everything an action needs to know about the invocation it runs in.
///
/// Built once per run from the plan's settings and the caller's overrides,
/// then passed by reference to every action constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    working_dir: PathBuf,
    env: IndexMap<String, String>,
    dry_run: bool,
}

impl RunConfig {
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            env: IndexMap::new(),
            dry_run: false,
        }
    }

    /// Apply plan settings on top of `base_dir`.
    ///
    /// A relative `working_dir` setting is resolved against `base_dir`.
    #[must_use]
    pub fn from_settings(settings: &PlanSettings, base_dir: &Path) -> Self {
        let working_dir = match &settings.working_dir {
            Some(dir) => base_dir.join(dir),
            None => base_dir.to_path_buf(),
        };

        Self {
            working_dir,
            env: settings.env.clone(),
            dry_run: false,
        }
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set an environment variable, replacing any value from the plan.
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    #[must_use]
    pub fn env(&self) -> &IndexMap<String, String> {
        &self.env
    }

    #[must_use]
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Resolve `path` against the working directory.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.working_dir.join(path)
    }
}
