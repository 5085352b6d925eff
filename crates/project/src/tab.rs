use std::path::{Path, PathBuf};

use rpide_core::{Document, Indentation, LineEnding};

use crate::error::ProjectError;

/// Whether an edit changed the tab from clean to dirty.
/// 編輯是否使分頁由乾淨變為已修改。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyTransition {
    BecameDirty,
    AlreadyDirty,
}

/// Render data for one tab header and its status bar.
/// 分頁標題與狀態列的顯示資料。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSummary {
    pub title: String,
    pub path: PathBuf,
    pub dirty: bool,
    pub active: bool,
    /// `Spaces: n` / `Tabs: n`, `None` before initialization.
    pub indentation: Option<String>,
    /// `LF` / `CRLF`, `None` before initialization.
    pub line_ending: Option<&'static str>,
}

/// Capabilities every kind of tab provides to the registry.
/// 各類分頁提供給登錄表的共同能力。
pub trait Tab {
    fn path(&self) -> &Path;

    /// Reads the backing file. Must run before any edit or save.
    fn initialize(&mut self, default_indentation: Indentation) -> Result<(), ProjectError>;

    fn summary(&self) -> TabSummary;

    fn activate(&mut self, active: bool);

    fn is_dirty(&self) -> bool;
}

/// Plain text editing tab backed by a [`Document`].
/// 以 [`Document`] 為後端的純文字分頁。
#[derive(Debug)]
pub struct TextTab {
    path: PathBuf,
    document: Option<Document>,
    active: bool,
}

impl TextTab {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: None,
            active: false,
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn contents(&self) -> Result<&str, ProjectError> {
        Ok(self.loaded()?.contents())
    }

    pub fn edit(&mut self, text: impl Into<String>) -> Result<DirtyTransition, ProjectError> {
        let document = self.loaded_mut()?;
        if document.set_contents(text) {
            Ok(DirtyTransition::BecameDirty)
        } else {
            Ok(DirtyTransition::AlreadyDirty)
        }
    }

    /// Writes the buffer to disk, overwriting whatever is there.
    pub fn save(&mut self) -> Result<(), ProjectError> {
        self.loaded_mut()?.save()?;
        Ok(())
    }

    pub fn line_ending(&self) -> Option<LineEnding> {
        self.document.as_ref().map(Document::line_ending)
    }

    fn loaded(&self) -> Result<&Document, ProjectError> {
        self.document
            .as_ref()
            .ok_or(ProjectError::InvalidState("tab used before initialization"))
    }

    fn loaded_mut(&mut self) -> Result<&mut Document, ProjectError> {
        self.document
            .as_mut()
            .ok_or(ProjectError::InvalidState("tab used before initialization"))
    }
}

impl Tab for TextTab {
    fn path(&self) -> &Path {
        &self.path
    }

    fn initialize(&mut self, default_indentation: Indentation) -> Result<(), ProjectError> {
        let document = Document::open(&self.path, default_indentation)?;
        self.document = Some(document);
        Ok(())
    }

    fn summary(&self) -> TabSummary {
        TabSummary {
            title: file_title(&self.path),
            path: self.path.clone(),
            dirty: self.is_dirty(),
            active: self.active,
            indentation: self
                .document
                .as_ref()
                .map(|document| document.indentation().to_string()),
            line_ending: self.line_ending().map(LineEnding::label),
        }
    }

    fn activate(&mut self, active: bool) {
        self.active = active;
    }

    fn is_dirty(&self) -> bool {
        self.document.as_ref().is_some_and(Document::is_dirty)
    }
}

/// Every concrete tab kind the registry can hold.
/// 登錄表可容納的分頁種類。
#[derive(Debug)]
pub enum TabKind {
    Text(TextTab),
}

impl TabKind {
    /// Picks the tab kind for a file. Everything opens as text for now.
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        TabKind::Text(TextTab::new(path))
    }

    pub fn as_text(&self) -> Option<&TextTab> {
        match self {
            TabKind::Text(tab) => Some(tab),
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextTab> {
        match self {
            TabKind::Text(tab) => Some(tab),
        }
    }

    fn inner(&self) -> &dyn Tab {
        match self {
            TabKind::Text(tab) => tab,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Tab {
        match self {
            TabKind::Text(tab) => tab,
        }
    }
}

impl Tab for TabKind {
    fn path(&self) -> &Path {
        self.inner().path()
    }

    fn initialize(&mut self, default_indentation: Indentation) -> Result<(), ProjectError> {
        self.inner_mut().initialize(default_indentation)
    }

    fn summary(&self) -> TabSummary {
        self.inner().summary()
    }

    fn activate(&mut self, active: bool) {
        self.inner_mut().activate(active)
    }

    fn is_dirty(&self) -> bool {
        self.inner().is_dirty()
    }
}

fn file_title(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
