use std::path::PathBuf;

use crate::listing::{DirectoryEntry, EntryKind};

/// Category used when none is named.
pub const MAIN_CATEGORY: &str = "main";
pub const NEW_CATEGORY: &str = "new";
pub const DANGER_CATEGORY: &str = "danger";

/// Mutating or delegated action behind a menu entry.
/// 選單項目對應的動作。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    NewFile,
    NewFolder,
    Reveal,
    OpenExternal,
    MoveToTrash,
}

impl MenuAction {
    pub fn label(self) -> &'static str {
        match self {
            MenuAction::NewFile => "New file",
            MenuAction::NewFolder => "New folder",
            MenuAction::Reveal => "Reveal in file manager",
            MenuAction::OpenExternal => "Open with default application",
            MenuAction::MoveToTrash => "Move to trash",
        }
    }

    /// Whether the host must ask for a name before dispatching.
    pub fn needs_name(self) -> bool {
        matches!(self, MenuAction::NewFile | MenuAction::NewFolder)
    }
}

/// The entry a context menu was opened on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuTarget {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl MenuTarget {
    pub fn new(path: impl Into<PathBuf>, kind: EntryKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

impl From<&DirectoryEntry> for MenuTarget {
    fn from(entry: &DirectoryEntry) -> Self {
        Self::new(entry.path.clone(), entry.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: String,
    pub action: MenuAction,
    pub target: PathBuf,
}

impl MenuEntry {
    pub fn new(action: MenuAction, target: impl Into<PathBuf>) -> Self {
        Self {
            label: action.label().to_string(),
            action,
            target: target.into(),
        }
    }
}

/// Named bucket of related entries; higher priority renders first.
/// 相關項目的分組；優先權較高者顯示在上方。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuCategory {
    name: String,
    pub priority: i32,
    entries: Vec<MenuEntry>,
}

impl MenuCategory {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            priority: 0,
            entries: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }
}

/// Context menu about to be shown for a right-clicked entry.
/// 右鍵點擊檔案項目時即將顯示的選單。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextMenu {
    categories: Vec<MenuCategory>,
}

impl ContextMenu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard file-browser menu for `target`.
    /// 為檔案瀏覽器項目建立標準選單。
    pub fn for_entry(target: &MenuTarget) -> Self {
        let mut menu = Self::new();
        if target.kind == EntryKind::Directory {
            menu.set_category_priority(NEW_CATEGORY, 10);
            menu.add_entry_to(NEW_CATEGORY, MenuEntry::new(MenuAction::NewFile, &target.path));
            menu.add_entry_to(NEW_CATEGORY, MenuEntry::new(MenuAction::NewFolder, &target.path));
        }
        menu.add_entry(MenuEntry::new(MenuAction::Reveal, &target.path));
        menu.add_entry(MenuEntry::new(MenuAction::OpenExternal, &target.path));
        menu.set_category_priority(DANGER_CATEGORY, -10);
        menu.add_entry_to(DANGER_CATEGORY, MenuEntry::new(MenuAction::MoveToTrash, &target.path));
        menu
    }

    pub fn add_entry(&mut self, entry: MenuEntry) {
        self.add_entry_to(MAIN_CATEGORY, entry);
    }

    pub fn add_entry_to(&mut self, category: &str, entry: MenuEntry) {
        self.category_mut(category).entries.push(entry);
    }

    /// Creates the category if needed.
    pub fn set_category_priority(&mut self, category: &str, priority: i32) {
        self.category_mut(category).priority = priority;
    }

    pub fn category(&self, name: &str) -> Option<&MenuCategory> {
        self.categories.iter().find(|category| category.name == name)
    }

    /// Categories by descending priority; ties keep insertion order.
    pub fn categories(&self) -> Vec<&MenuCategory> {
        let mut sorted: Vec<&MenuCategory> = self.categories.iter().collect();
        sorted.sort_by(|a, b| b.priority.cmp(&a.priority));
        sorted
    }

    /// All entries in render order.
    pub fn entries(&self) -> impl Iterator<Item = &MenuEntry> {
        self.categories()
            .into_iter()
            .flat_map(|category| category.entries.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.categories
            .iter()
            .all(|category| category.entries.is_empty())
    }

    fn category_mut(&mut self, name: &str) -> &mut MenuCategory {
        let index = match self.categories.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.categories.push(MenuCategory::new(name));
                self.categories.len() - 1
            }
        };
        &mut self.categories[index]
    }
}
