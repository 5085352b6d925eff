use std::path::PathBuf;

use crate::context_menu::{MenuAction, MenuEntry};
use crate::error::ProjectError;
use crate::tab::DirtyTransition;
use crate::tabs::TabId;

/// Kind of entry a create command makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewEntryKind {
    File,
    Folder,
}

/// User intent emitted by the host UI.
/// 由介面送出的使用者意圖。
///
/// Relative paths resolve against the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenFile(PathBuf),
    Expand(PathBuf),
    Collapse(PathBuf),
    Edit { tab: TabId, text: String },
    Save(TabId),
    CreateEntry {
        parent: PathBuf,
        name: String,
        kind: NewEntryKind,
    },
    DeleteEntry(PathBuf),
    Reveal(PathBuf),
    OpenExternal(PathBuf),
}

impl Command {
    /// Turns a picked menu entry into a command.
    /// 將使用者選取的選單項目轉換為命令。
    ///
    /// Creation entries need the name the host prompted for.
    pub fn from_menu(entry: &MenuEntry, name: Option<&str>) -> Result<Self, ProjectError> {
        let target = entry.target.clone();
        let name = match (entry.action.needs_name(), name) {
            (true, None) => return Err(ProjectError::InvalidName(String::new())),
            (_, name) => name.unwrap_or_default().to_string(),
        };
        match entry.action {
            MenuAction::NewFile => Ok(Command::CreateEntry {
                parent: target,
                name,
                kind: NewEntryKind::File,
            }),
            MenuAction::NewFolder => Ok(Command::CreateEntry {
                parent: target,
                name,
                kind: NewEntryKind::Folder,
            }),
            MenuAction::Reveal => Ok(Command::Reveal(target)),
            MenuAction::OpenExternal => Ok(Command::OpenExternal(target)),
            MenuAction::MoveToTrash => Ok(Command::DeleteEntry(target)),
        }
    }
}

/// Expected condition shown to the user instead of an error.
/// 以提示方式呈現給使用者的預期狀況。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The entry to create is already on disk; nothing was written.
    AlreadyExists,
}

/// Result of a dispatched command.
/// 命令執行結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The tree was rebuilt from disk after a mutation.
    TreeRefreshed,
    /// The mutation happened but re-reading the tree failed; the tree
    /// still shows the listing from before the command.
    TreeStale,
    /// A node was expanded or collapsed.
    TreeUpdated,
    TabOpened(TabId),
    TabDirty(DirtyTransition),
    Saved(PathBuf),
    /// Handed to the host shell.
    Delegated,
    Notice(Notice),
}
