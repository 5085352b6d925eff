use std::io;
use std::path::PathBuf;

use rpide_core::DocumentError;
use thiserror::Error;

/// Errors raised by project, tree, tab and metadata operations.  
/// 專案、檔案樹、分頁與中繼資料操作的錯誤類型。
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("{0} not found")]
    NotFound(PathBuf),
    #[error("{0} already exists")]
    AlreadyExists(PathBuf),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid state: {0}")]
    InvalidState(&'static str),
    #[error("invalid entry name {0:?}")]
    InvalidName(String),
    #[error("invalid record {path}: {message}")]
    InvalidRecord { path: PathBuf, message: String },
    #[error("document error: {0}")]
    Document(#[source] DocumentError),
    #[error("{action} failed for {path}: {source}")]
    Shell {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ProjectError {
    /// Classifies an OS error into the project taxonomy.  
    /// 將作業系統錯誤歸類為專案錯誤。
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::NotFound => ProjectError::NotFound(path),
            io::ErrorKind::AlreadyExists => ProjectError::AlreadyExists(path),
            _ => ProjectError::Io { path, source },
        }
    }

    /// Whether this is an expected conflict the UI reports as a notice.  
    /// 是否為介面僅需提示使用者的預期衝突。
    pub fn is_conflict(&self) -> bool {
        matches!(self, ProjectError::AlreadyExists(_))
    }
}

impl From<DocumentError> for ProjectError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Io { path, source } => ProjectError::from_io(path, source),
            other => ProjectError::Document(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_kinds_map_onto_taxonomy() {
        let not_found = ProjectError::from_io("a", io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(not_found, ProjectError::NotFound(_)));

        let exists = ProjectError::from_io("a", io::Error::from(io::ErrorKind::AlreadyExists));
        assert!(exists.is_conflict());

        let denied = ProjectError::from_io("a", io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(denied, ProjectError::Io { .. }));
        assert!(!denied.is_conflict());
    }
}
