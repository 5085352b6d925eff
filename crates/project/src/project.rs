use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use crate::error::ProjectError;
use crate::pack::{read_pack_format, PackFormat};
use crate::serde_path;
use crate::util::{absolutize, normalize_path};

/// Stable identifier of a project: md5 hex of its normalized root path.
/// 專案的穩定識別碼：正規化根路徑的 md5 十六進位值。
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectHash(String);

impl ProjectHash {
    pub fn of_root(root: &Path) -> Self {
        let normalized = normalize_path(root);
        let digest = Md5::digest(serde_path::encode(&normalized).as_bytes());
        Self(hex::encode(digest))
    }

    /// Accepts exactly 32 hex digits, lowercased.
    pub fn parse(value: &str) -> Result<Self, ProjectError> {
        let valid = value.len() == 32 && value.bytes().all(|byte| byte.is_ascii_hexdigit());
        if valid {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Err(ProjectError::InvalidName(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An opened resource pack.
/// 已開啟的資源包專案。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
    hash: ProjectHash,
    pub name: String,
    pub pack_format: u32,
    pub last_opened: DateTime<Utc>,
}

impl Project {
    pub fn new(root: impl AsRef<Path>, name: impl Into<String>, pack_format: u32) -> Self {
        let root = normalize_path(root.as_ref());
        let hash = ProjectHash::of_root(&root);
        Self {
            root,
            hash,
            name: name.into(),
            pack_format,
            last_opened: Utc::now(),
        }
    }

    /// Builds a project for a directory that has no stored record yet.
    /// 為尚未有紀錄的資料夾建立專案。
    ///
    /// The name is the directory name; the pack format comes from
    /// `pack.mcmeta`, falling back to the latest known format.
    pub fn from_directory(root: &Path) -> Result<Self, ProjectError> {
        let root = absolutize(root).map_err(|err| ProjectError::from_io(root, err))?;
        if !root.is_dir() {
            return Err(ProjectError::NotFound(root));
        }
        let name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.to_string_lossy().into_owned());
        let pack_format = match read_pack_format(&root) {
            Ok(Some(format)) => format,
            Ok(None) => PackFormat::latest().pack_format,
            Err(err) => {
                tracing::warn!(root = %root.display(), error = %err, "unreadable pack.mcmeta");
                PackFormat::latest().pack_format
            }
        };
        Ok(Self::new(root, name, pack_format))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn hash(&self) -> &ProjectHash {
        &self.hash
    }

    /// Marks the project as opened now.
    pub fn touch(&mut self) {
        self.last_opened = Utc::now();
    }

    pub fn to_record(&self) -> ProjectRecord {
        ProjectRecord {
            root_dir: self.root.clone(),
            pack_format: self.pack_format,
            name: self.name.clone(),
            last_opened: self.last_opened,
        }
    }
}

/// On-disk form of a project, one file per project hash.
/// 專案的落地格式，每個專案一個檔案。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    #[serde(with = "serde_path")]
    pub root_dir: PathBuf,
    pub pack_format: u32,
    pub name: String,
    pub last_opened: DateTime<Utc>,
}

impl From<ProjectRecord> for Project {
    fn from(record: ProjectRecord) -> Self {
        let mut project = Project::new(record.root_dir, record.name, record.pack_format);
        project.last_opened = record.last_opened;
        project
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn hash_ignores_trailing_separator_and_dot_segments() {
        let a = ProjectHash::of_root(Path::new("/a/b/"));
        let b = ProjectHash::of_root(Path::new("/a/b"));
        let c = ProjectHash::of_root(Path::new("/a/./x/../b"));
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.as_str().len(), 32);
        assert_ne!(a, ProjectHash::of_root(Path::new("/a/c")));
    }

    #[test]
    fn hash_is_md5_of_the_path_text() {
        let expected = hex::encode(Md5::digest(b"/packs/demo"));
        assert_eq!(ProjectHash::of_root(Path::new("/packs/demo")).as_str(), expected);
    }

    #[test]
    fn parse_validates_hex() {
        let hash = ProjectHash::of_root(Path::new("/packs/demo"));
        assert_eq!(ProjectHash::parse(&hash.as_str().to_uppercase()).unwrap(), hash);
        assert!(ProjectHash::parse("abc").is_err());
        assert!(ProjectHash::parse(&"z".repeat(32)).is_err());
    }

    #[test]
    fn record_uses_camel_case_keys() {
        let project = Project::new("/packs/demo", "demo", 6);
        let json = serde_json::to_value(project.to_record()).unwrap();
        assert_eq!(json["rootDir"], "/packs/demo");
        assert_eq!(json["packFormat"], 6);
        assert_eq!(json["name"], "demo");
        assert!(json["lastOpened"].as_str().unwrap().contains('T'));

        let back: ProjectRecord = serde_json::from_value(json).unwrap();
        assert_eq!(Project::from(back), project);
    }

    #[test]
    fn from_directory_reads_pack_format() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("Faithful");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("pack.mcmeta"), r#"{"pack":{"pack_format":3}}"#).unwrap();

        let project = Project::from_directory(&root).unwrap();
        assert_eq!(project.name, "Faithful");
        assert_eq!(project.pack_format, 3);
        assert_eq!(project.root(), root.as_path());
    }

    #[test]
    fn from_directory_falls_back_to_latest_format() {
        let tmp = tempdir().unwrap();
        let project = Project::from_directory(tmp.path()).unwrap();
        assert_eq!(project.pack_format, PackFormat::latest().pack_format);

        let missing = tmp.path().join("missing");
        assert!(matches!(
            Project::from_directory(&missing),
            Err(ProjectError::NotFound(_))
        ));
    }
}
