use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ProjectError;

/// OS metadata files hidden from the file browser (exact name match).
pub const NOISE_ENTRIES: &[&str] = &[".DS_Store", "Thumbs.db", "desktop.ini"];

/// The kind of a directory entry.
/// 目錄項目的類型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    Other,
}

/// Display classification derived from the file extension.
/// 依副檔名推得的顯示分類。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Json,
    Text,
    Image,
}

impl FileClass {
    pub fn for_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" | "mcmeta" => Some(FileClass::Json),
            "txt" => Some(FileClass::Text),
            "png" => Some(FileClass::Image),
            _ => None,
        }
    }
}

/// One child of a listed directory. Not persisted; rebuilt on every expand.
/// 目錄中的單一項目；不落地，每次展開重新建立。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    pub class: Option<FileClass>,
}

impl DirectoryEntry {
    /// Stats `path` (following symlinks) and builds its entry.
    /// 查詢檔案狀態並建立項目。
    pub fn stat(path: impl Into<PathBuf>) -> Result<Self, ProjectError> {
        let path = path.into();
        let metadata = fs::metadata(&path).map_err(|err| ProjectError::from_io(&path, err))?;
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let class = match kind {
            EntryKind::File => FileClass::for_path(&path),
            _ => None,
        };
        Ok(Self {
            name,
            path,
            kind,
            class,
        })
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

pub fn is_noise(name: &str) -> bool {
    NOISE_ENTRIES.contains(&name)
}

/// Directories first, then everything else; each group by code point of the name.
pub fn compare_entries(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    b.is_dir().cmp(&a.is_dir()).then_with(|| a.name.cmp(&b.name))
}

/// Lists `dir`, dropping noise entries and sorting directories before files.
/// 列出資料夾內容，過濾雜訊項目並將資料夾排在檔案之前。
///
/// Every entry is stat'ed one at a time. Any read or stat failure aborts the
/// whole listing.
pub fn list_directory(dir: &Path) -> Result<Vec<DirectoryEntry>, ProjectError> {
    let reader = fs::read_dir(dir).map_err(|err| ProjectError::from_io(dir, err))?;
    let mut entries = Vec::new();
    for item in reader {
        let item = item.map_err(|err| ProjectError::from_io(dir, err))?;
        let name = item.file_name();
        if name.to_str().is_some_and(is_noise) {
            continue;
        }
        entries.push(DirectoryEntry::stat(item.path())?);
    }
    entries.sort_by(compare_entries);
    tracing::debug!(dir = %dir.display(), count = entries.len(), "listed directory");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn demo_pack_lists_folder_then_sorted_files() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::write(root.join("zzz.txt"), b"").unwrap();
        fs::create_dir(root.join("folder")).unwrap();
        fs::write(root.join(".DS_Store"), b"").unwrap();
        fs::write(root.join("a.txt"), b"").unwrap();

        let names: Vec<_> = list_directory(root)
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, vec!["folder", "a.txt", "zzz.txt"]);
    }

    #[test]
    fn ordering_is_by_code_point_not_locale() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        for name in ["b.txt", "C.txt", "_x.txt", "ä.txt"] {
            fs::write(root.join(name), b"").unwrap();
        }
        for name in ["textures", "Models"] {
            fs::create_dir(root.join(name)).unwrap();
        }

        let entries = list_directory(root).unwrap();
        let names: Vec<_> = entries.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Models", "textures", "C.txt", "_x.txt", "b.txt", "ä.txt"]
        );
        let first_file = entries.iter().position(|e| !e.is_dir()).unwrap();
        assert!(entries[..first_file].iter().all(DirectoryEntry::is_dir));
        assert!(entries[first_file..].iter().all(|e| !e.is_dir()));
    }

    #[test]
    fn classifies_by_extension() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        for name in ["pack.mcmeta", "en_us.json", "notes.txt", "pack.png", "shader.fsh"] {
            fs::write(root.join(name), b"").unwrap();
        }
        fs::create_dir(root.join("dir.json")).unwrap();

        let classes: Vec<_> = list_directory(root)
            .unwrap()
            .into_iter()
            .map(|entry| (entry.name, entry.class))
            .collect();
        assert_eq!(
            classes,
            vec![
                ("dir.json".to_string(), None),
                ("en_us.json".to_string(), Some(FileClass::Json)),
                ("notes.txt".to_string(), Some(FileClass::Text)),
                ("pack.mcmeta".to_string(), Some(FileClass::Json)),
                ("pack.png".to_string(), Some(FileClass::Image)),
                ("shader.fsh".to_string(), None),
            ]
        );
    }

    #[test]
    fn missing_directory_is_not_found() {
        let tmp = tempdir().unwrap();
        let err = list_directory(&tmp.path().join("vanished")).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound(_)));
    }
}
