use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::ProjectError;

/// Desktop integration the workbench delegates to.
/// 工作台委派給作業系統的桌面整合功能。
pub trait Shell {
    /// Shows `path` in the platform file manager.
    fn reveal(&mut self, path: &Path) -> Result<(), ProjectError>;

    /// Opens `path` with its default application.
    fn open_external(&mut self, path: &Path) -> Result<(), ProjectError>;

    /// Moves `path` to the OS trash. On failure nothing is removed.
    fn move_to_trash(&mut self, path: &Path) -> Result<(), ProjectError>;

    fn beep(&mut self);
}

/// [`Shell`] backed by the running desktop.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShell;

impl Shell for SystemShell {
    fn reveal(&mut self, path: &Path) -> Result<(), ProjectError> {
        // The file manager opens the containing folder; selecting the entry is not portable.
        let folder = if path.is_dir() {
            path
        } else {
            path.parent().unwrap_or(path)
        };
        open::that(folder).map_err(|source| ProjectError::Shell {
            action: "reveal",
            path: path.to_path_buf(),
            source,
        })
    }

    fn open_external(&mut self, path: &Path) -> Result<(), ProjectError> {
        open::that(path).map_err(|source| ProjectError::Shell {
            action: "open",
            path: path.to_path_buf(),
            source,
        })
    }

    fn move_to_trash(&mut self, path: &Path) -> Result<(), ProjectError> {
        if !path.exists() {
            return Err(ProjectError::NotFound(path.to_path_buf()));
        }
        trash::delete(path).map_err(|err| ProjectError::Shell {
            action: "move to trash",
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::Other, err.to_string()),
        })
    }

    fn beep(&mut self) {
        let mut stderr = io::stderr();
        let _ = stderr.write_all(b"\x07").and_then(|_| stderr.flush());
    }
}

/// Records every request instead of touching the desktop.
/// 僅記錄請求、不實際呼叫桌面的替身。
///
/// `move_to_trash` deletes for real (or fails when `fail_trash` is set) so the
/// workbench sees the same filesystem effects as with [`SystemShell`].
#[derive(Debug, Default, Clone)]
pub struct RecordingShell {
    pub revealed: Vec<PathBuf>,
    pub opened: Vec<PathBuf>,
    pub trashed: Vec<PathBuf>,
    pub beeps: usize,
    pub fail_trash: bool,
}

impl Shell for RecordingShell {
    fn reveal(&mut self, path: &Path) -> Result<(), ProjectError> {
        self.revealed.push(path.to_path_buf());
        Ok(())
    }

    fn open_external(&mut self, path: &Path) -> Result<(), ProjectError> {
        self.opened.push(path.to_path_buf());
        Ok(())
    }

    fn move_to_trash(&mut self, path: &Path) -> Result<(), ProjectError> {
        if self.fail_trash {
            return Err(ProjectError::Shell {
                action: "move to trash",
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::Unsupported, "trash unavailable"),
            });
        }
        let removed = if path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        removed.map_err(|err| ProjectError::from_io(path, err))?;
        self.trashed.push(path.to_path_buf());
        Ok(())
    }

    fn beep(&mut self) {
        self.beeps += 1;
    }
}
