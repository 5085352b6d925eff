use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use rpide_core::Indentation;

use crate::error::ProjectError;
use crate::tab::{DirtyTransition, Tab, TabKind, TabSummary, TextTab};
use crate::util::resolve_path;

/// Opaque identifier for an open tab.
/// 已開啟分頁的識別碼。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(usize);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// One tab per normalized file path within a project.
/// 每個專案中，每個正規化檔案路徑至多對應一個分頁。
///
/// Tabs live as long as the registry; there is no close operation.
#[derive(Debug)]
pub struct TabRegistry {
    root: PathBuf,
    default_indentation: Indentation,
    tabs: Vec<TabKind>,
    by_path: HashMap<PathBuf, TabId>,
    active: Option<TabId>,
}

impl TabRegistry {
    pub fn new(root: impl AsRef<Path>, default_indentation: Indentation) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            default_indentation,
            tabs: Vec::new(),
            by_path: HashMap::new(),
            active: None,
        }
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active(&self) -> Option<TabId> {
        self.active
    }

    pub fn get(&self, id: TabId) -> Option<&TabKind> {
        self.tabs.get(id.0)
    }

    pub fn get_mut(&mut self, id: TabId) -> Option<&mut TabKind> {
        self.tabs.get_mut(id.0)
    }

    /// Looks up the tab for `path` without creating one.
    pub fn find(&self, path: &Path) -> Option<TabId> {
        self.by_path.get(&self.key(path)).copied()
    }

    /// Returns the tab for `path`, reading the file if no tab exists yet.
    /// 取得 `path` 對應的分頁；若尚未存在則讀取檔案並建立。
    ///
    /// Relative paths resolve against the project root. A failed read leaves
    /// the registry untouched.
    pub fn get_or_create(&mut self, path: &Path) -> Result<TabId, ProjectError> {
        let key = self.key(path);
        if let Some(id) = self.by_path.get(&key) {
            return Ok(*id);
        }
        let mut tab = TabKind::for_path(key.clone());
        tab.initialize(self.default_indentation)?;
        let id = TabId(self.tabs.len());
        self.tabs.push(tab);
        self.by_path.insert(key, id);
        tracing::debug!(%id, path = %path.display(), "tab created");
        Ok(id)
    }

    /// Makes `id` the single active tab.
    /// 將指定分頁設為唯一的使用中分頁。
    pub fn open(&mut self, id: TabId) -> Result<(), ProjectError> {
        self.tab(id)?;
        if let Some(previous) = self.active.replace(id) {
            self.tabs[previous.0].activate(false);
        }
        self.tabs[id.0].activate(true);
        Ok(())
    }

    /// Replaces the buffer of a text tab.
    /// 取代文字分頁的內容。
    pub fn edit(
        &mut self,
        id: TabId,
        text: impl Into<String>,
    ) -> Result<DirtyTransition, ProjectError> {
        self.text_tab_mut(id)?.edit(text)
    }

    /// Writes a text tab back to disk and clears its dirty flag.
    /// 將文字分頁寫回磁碟並清除已修改狀態。
    pub fn save(&mut self, id: TabId) -> Result<(), ProjectError> {
        self.text_tab_mut(id)?.save()
    }

    /// Summaries in opening order.
    pub fn summaries(&self) -> Vec<TabSummary> {
        self.tabs.iter().map(Tab::summary).collect()
    }

    pub fn dirty_tabs(&self) -> impl Iterator<Item = TabId> + '_ {
        self.tabs
            .iter()
            .enumerate()
            .filter(|(_, tab)| tab.is_dirty())
            .map(|(index, _)| TabId(index))
    }

    fn key(&self, path: &Path) -> PathBuf {
        resolve_path(&self.root, path)
    }

    fn tab(&self, id: TabId) -> Result<&TabKind, ProjectError> {
        self.tabs
            .get(id.0)
            .ok_or(ProjectError::InvalidState("unknown tab"))
    }

    fn text_tab_mut(&mut self, id: TabId) -> Result<&mut TextTab, ProjectError> {
        self.tabs
            .get_mut(id.0)
            .ok_or(ProjectError::InvalidState("unknown tab"))?
            .as_text_mut()
            .ok_or(ProjectError::InvalidState("tab is not a text document"))
    }
}
