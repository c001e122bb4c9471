use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use revertable::{RevertOutcome, Revertable};
use tracing::debug;

use crate::error::ExecError;

fn fs_error(operation: &'static str, path: &Path) -> impl FnOnce(io::Error) -> ExecError {
    let path = path.to_path_buf();
    move |source| ExecError::Filesystem {
        operation,
        path,
        source,
    }
}

/// What was at the target path before `apply` wrote to it.
#[derive(Debug)]
enum Backup {
    NotTaken,
    Absent,
    Contents(Vec<u8>),
}

/// Writes a file, restoring the previous contents (or absence) on revert.
///
/// The previous contents are held in memory and neither the write nor the
/// restore is atomic, so this suits config-sized files.
#[derive(Debug)]
pub struct WriteFileAction {
    name: String,
    path: PathBuf,
    contents: String,
    backup: Backup,
}

impl WriteFileAction {
    #[must_use]
    pub fn new(name: impl Into<String>, path: PathBuf, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path,
            contents: contents.into(),
            backup: Backup::NotTaken,
        }
    }
}

impl Revertable for WriteFileAction {
    type Error = ExecError;

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self) -> Result<(), ExecError> {
        self.backup = match fs::read(&self.path) {
            Ok(previous) => Backup::Contents(previous),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Backup::Absent,
            Err(error) => return Err(fs_error("read", &self.path)(error)),
        };

        debug!(action = %self.name, path = %self.path.display(), "writing file");
        fs::write(&self.path, &self.contents).map_err(fs_error("write", &self.path))
    }

    fn revert(&mut self) -> RevertOutcome<ExecError> {
        let result = match &self.backup {
            Backup::NotTaken => Ok(()),
            Backup::Absent => match fs::remove_file(&self.path) {
                Err(error) if error.kind() != io::ErrorKind::NotFound => {
                    Err(fs_error("remove", &self.path)(error))
                }
                _ => Ok(()),
            },
            Backup::Contents(previous) => {
                fs::write(&self.path, previous).map_err(fs_error("restore", &self.path))
            }
        };

        if result.is_ok() {
            debug!(action = %self.name, path = %self.path.display(), "restored file");
            self.backup = Backup::NotTaken;
        }
        result.into()
    }

    fn revert_description(&self) -> String {
        format!("restore {}", self.path.display())
    }
}

/// Creates a directory (and missing parents), removing what it created on
/// revert.
#[derive(Debug)]
pub struct CreateDirAction {
    name: String,
    path: PathBuf,
    created: Option<PathBuf>,
}

impl CreateDirAction {
    #[must_use]
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
            created: None,
        }
    }
}

impl Revertable for CreateDirAction {
    type Error = ExecError;

    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&mut self) -> Result<(), ExecError> {
        let topmost_missing = self
            .path
            .ancestors()
            .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
            .last()
            .map(Path::to_path_buf);

        debug!(action = %self.name, path = %self.path.display(), "creating directory");
        let result =
            fs::create_dir_all(&self.path).map_err(fs_error("create directory", &self.path));

        // a failed create may still have made some of the parents
        self.created = topmost_missing.filter(|dir| dir.is_dir());
        result
    }

    fn revert(&mut self) -> RevertOutcome<ExecError> {
        let Some(created) = &self.created else {
            return RevertOutcome::Reverted;
        };

        match fs::remove_dir_all(created) {
            Err(error) if error.kind() != io::ErrorKind::NotFound => {
                RevertOutcome::Failed(fs_error("remove directory", created)(error))
            }
            _ => {
                debug!(action = %self.name, path = %created.display(), "removed directory");
                self.created = None;
                RevertOutcome::Reverted
            }
        }
    }

    fn revert_description(&self) -> String {
        format!("remove {} if created", self.path.display())
    }
}
