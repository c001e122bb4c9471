use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlanError, Result};

/// On-disk encoding of a plan, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    Toml,
    Yaml,
}

impl PlanFormat {
    /// # Errors
    ///
    /// Returns `PlanError::UnsupportedFormat` for unknown extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(PlanError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Settings shared by every action of a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanSettings {
    /// Directory commands run in and relative paths resolve against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables for every command.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub env: IndexMap<String, String>,
}

/// What an action does, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ActionKind {
    /// Run a program with arguments, without a shell.
    Command {
        apply: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        revert: Option<Vec<String>>,
    },
    /// Run a script with `sh -c`.
    Shell {
        apply: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        revert: Option<String>,
    },
    /// Write a file; revert restores what was there before.
    WriteFile { path: PathBuf, contents: String },
    /// Create a directory; revert removes it if this action created it.
    CreateDir { path: PathBuf },
}

impl ActionKind {
    #[must_use]
    pub fn describe_apply(&self) -> String {
        match self {
            Self::Command { apply, .. } => format!("run `{}`", apply.join(" ")),
            Self::Shell { apply, .. } => format!("run `sh -c {apply:?}`"),
            Self::WriteFile { path, .. } => format!("write {}", path.display()),
            Self::CreateDir { path } => format!("create directory {}", path.display()),
        }
    }

    #[must_use]
    pub fn describe_revert(&self) -> String {
        match self {
            Self::Command {
                revert: Some(revert),
                ..
            } => format!("run `{}`", revert.join(" ")),
            Self::Shell {
                revert: Some(revert),
                ..
            } => format!("run `sh -c {revert:?}`"),
            Self::Command { revert: None, .. } | Self::Shell { revert: None, .. } => {
                "nothing to revert".to_string()
            }
            Self::WriteFile { path, .. } => format!("restore {}", path.display()),
            Self::CreateDir { path } => {
                format!("remove directory {} if created", path.display())
            }
        }
    }

    /// Keys this kind reads from an action table, besides `kind` itself.
    fn field_names(&self) -> &'static [&'static str] {
        match self {
            Self::Command { .. } | Self::Shell { .. } => &["apply", "revert"],
            Self::WriteFile { .. } => &["path", "contents"],
            Self::CreateDir { .. } => &["path"],
        }
    }
}

/// One named action of a plan.
///
/// Unknown keys are rejected, so a mistyped
/// `cancel_unwind_on_revert_failure` fails to load instead of defaulting
/// to `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawActionSpec")]
pub struct ActionSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: ActionKind,
    /// Turn a failed revert of this action into a cancel of the whole unwind.
    #[serde(default)]
    pub cancel_unwind_on_revert_failure: bool,
}

/// `ActionSpec` as written, with every key the kind did not claim.
#[derive(Deserialize)]
struct RawActionSpec {
    name: String,
    #[serde(flatten)]
    kind: ActionKind,
    #[serde(default)]
    cancel_unwind_on_revert_failure: bool,
    #[serde(flatten)]
    rest: BTreeMap<String, IgnoredAny>,
}

impl TryFrom<RawActionSpec> for ActionSpec {
    type Error = String;

    fn try_from(raw: RawActionSpec) -> std::result::Result<Self, String> {
        let fields = raw.kind.field_names();
        // flattened maps also see the keys the tagged kind consumed
        if let Some(unknown) = raw
            .rest
            .keys()
            .find(|key| key.as_str() != "kind" && !fields.contains(&key.as_str()))
        {
            return Err(format!(
                "unknown field `{unknown}` in action '{}', expected one of `name`, `kind`, {}, `cancel_unwind_on_revert_failure`",
                raw.name,
                fields
                    .iter()
                    .map(|field| format!("`{field}`"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        Ok(Self {
            name: raw.name,
            kind: raw.kind,
            cancel_unwind_on_revert_failure: raw.cancel_unwind_on_revert_failure,
        })
    }
}

impl ActionSpec {
    fn validate(&self, index: usize) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PlanError::EmptyName { index });
        }

        let empty_field = match &self.kind {
            ActionKind::Command { apply, revert } => {
                if apply.first().is_none_or(|program| program.is_empty()) {
                    Some("apply command")
                } else if revert
                    .as_ref()
                    .is_some_and(|revert| revert.first().is_none_or(|program| program.is_empty()))
                {
                    Some("revert command")
                } else {
                    None
                }
            }
            ActionKind::Shell { apply, revert } => {
                if apply.trim().is_empty() {
                    Some("apply script")
                } else if revert.as_ref().is_some_and(|revert| revert.trim().is_empty()) {
                    Some("revert script")
                } else {
                    None
                }
            }
            ActionKind::WriteFile { path, .. } | ActionKind::CreateDir { path } => {
                path.as_os_str().is_empty().then_some("path")
            }
        };

        match empty_field {
            Some(field) => Err(PlanError::EmptyField {
                name: self.name.clone(),
                field,
            }),
            None => Ok(()),
        }
    }
}

/// An ordered, validated list of actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    pub name: String,
    #[serde(default)]
    pub settings: PlanSettings,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
}

impl Plan {
    /// Load and validate a plan file, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unknown extension,
    /// fails to parse, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let format = PlanFormat::from_path(path)?;
        let contents = fs::read_to_string(path).map_err(|source| PlanError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let plan = match format {
            PlanFormat::Toml => Self::from_toml_str(&contents),
            PlanFormat::Yaml => Self::from_yaml_str(&contents),
        }
        .map_err(|source| PlanError::Invalid {
            path: path.to_path_buf(),
            source: Box::new(source),
        })?;

        debug!(
            path = %path.display(),
            plan = %plan.name,
            actions = plan.actions.len(),
            "loaded plan"
        );
        Ok(plan)
    }

    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or the plan is invalid.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let plan: Self = toml::from_str(contents)?;
        plan.validate()?;
        Ok(plan)
    }

    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the plan is invalid.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let plan: Self = serde_yml::from_str(contents)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Check that the plan has actions with unique, non-empty names and
    /// non-empty commands and paths.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.actions.is_empty() {
            return Err(PlanError::NoActions {
                name: self.name.clone(),
            });
        }

        let mut seen = HashSet::new();
        for (index, action) in self.actions.iter().enumerate() {
            action.validate(index)?;
            if !seen.insert(action.name.as_str()) {
                return Err(PlanError::DuplicateName {
                    name: action.name.clone(),
                });
            }
        }

        Ok(())
    }
}
