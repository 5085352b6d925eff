use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProjectError;
use crate::project::{Project, ProjectHash, ProjectRecord};
use crate::util::{absolutize, ensure_dir, write_atomic};

/// Entry of the shared recents index.
/// 最近專案索引中的條目。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub last_opened: i64,
}

type ProjectsIndex = BTreeMap<ProjectHash, IndexEntry>;

/// One row of the recent projects list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub hash: ProjectHash,
    pub name: String,
    pub last_opened: DateTime<Utc>,
}

/// Persists project records and the recents index.
/// 管理專案紀錄與最近專案索引的存取。
///
/// Index writes are read-modify-write without locking; concurrent writers can
/// lose each other's entries.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    projects_dir: PathBuf,
    index_path: PathBuf,
}

impl ProjectStore {
    pub fn new(projects_dir: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            projects_dir: projects_dir.into(),
            index_path: index_path.into(),
        }
    }

    /// Standard layout: `<data>/projects/<hash>.json` and `<data>/projects.json`.
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("projects"), data_dir.join("projects.json"))
    }

    pub fn projects_dir(&self) -> &Path {
        &self.projects_dir
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn record_path(&self, hash: &ProjectHash) -> PathBuf {
        self.projects_dir.join(format!("{}.json", hash.as_str()))
    }

    /// Writes the project record and upserts its index entry.
    /// 寫入專案紀錄並更新索引條目。
    pub fn save(&self, project: &Project) -> Result<(), ProjectError> {
        ensure_dir(&self.projects_dir)
            .map_err(|err| ProjectError::from_io(&self.projects_dir, err))?;
        let path = self.record_path(project.hash());
        let json = serde_json::to_vec_pretty(&project.to_record()).map_err(|err| {
            ProjectError::InvalidRecord {
                path: path.clone(),
                message: err.to_string(),
            }
        })?;
        write_atomic(&path, &json).map_err(|err| ProjectError::from_io(&path, err))?;

        let mut index = self.read_index();
        index.insert(
            project.hash().clone(),
            IndexEntry {
                name: project.name.clone(),
                last_opened: Utc::now().timestamp_millis(),
            },
        );
        self.write_index(&index)?;
        tracing::info!(hash = %project.hash(), name = %project.name, "saved project record");
        Ok(())
    }

    /// Loads a stored project by hash.
    /// 依雜湊值載入專案紀錄。
    pub fn load(&self, hash: &ProjectHash) -> Result<Project, ProjectError> {
        let path = self.record_path(hash);
        let contents = fs::read_to_string(&path).map_err(|err| ProjectError::from_io(&path, err))?;
        let record: ProjectRecord =
            serde_json::from_str(&contents).map_err(|err| ProjectError::InvalidRecord {
                path: path.clone(),
                message: err.to_string(),
            })?;
        Ok(record.into())
    }

    /// Recent projects, most recently opened first.
    /// 依最近開啟時間排序的專案列表。
    pub fn list(&self) -> Vec<ProjectSummary> {
        let mut summaries: Vec<ProjectSummary> = self
            .read_index()
            .into_iter()
            .map(|(hash, entry)| ProjectSummary {
                hash,
                name: entry.name,
                last_opened: Utc
                    .timestamp_millis_opt(entry.last_opened)
                    .single()
                    .unwrap_or_default(),
            })
            .collect();
        summaries.sort_by(|a, b| {
            b.last_opened
                .cmp(&a.last_opened)
                .then_with(|| a.hash.cmp(&b.hash))
        });
        summaries
    }

    /// Opens the project rooted at `root`, creating its record on first use.
    /// 開啟指定根目錄的專案；首次開啟時建立紀錄。
    pub fn open(&self, root: &Path) -> Result<Project, ProjectError> {
        let root = absolutize(root).map_err(|err| ProjectError::from_io(root, err))?;
        let hash = ProjectHash::of_root(&root);
        let mut project = match self.load(&hash) {
            Ok(project) => project,
            Err(ProjectError::NotFound(_)) => Project::from_directory(&root)?,
            Err(ProjectError::InvalidRecord { path, message }) => {
                tracing::warn!(path = %path.display(), %message, "discarding malformed project record");
                Project::from_directory(&root)?
            }
            Err(err) => return Err(err),
        };
        if !project.root().is_dir() {
            return Err(ProjectError::NotFound(project.root().to_path_buf()));
        }
        project.touch();
        self.save(&project)?;
        Ok(project)
    }

    /// A missing or unreadable index reads as empty.
    fn read_index(&self) -> ProjectsIndex {
        match fs::read_to_string(&self.index_path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
                tracing::warn!(path = %self.index_path.display(), error = %err, "ignoring malformed projects index");
                ProjectsIndex::new()
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => ProjectsIndex::new(),
            Err(err) => {
                tracing::warn!(path = %self.index_path.display(), error = %err, "cannot read projects index");
                ProjectsIndex::new()
            }
        }
    }

    fn write_index(&self, index: &ProjectsIndex) -> Result<(), ProjectError> {
        let json = serde_json::to_vec_pretty(index).map_err(|err| ProjectError::InvalidRecord {
            path: self.index_path.clone(),
            message: err.to_string(),
        })?;
        write_atomic(&self.index_path, &json)
            .map_err(|err| ProjectError::from_io(&self.index_path, err))
    }
}
