//! Project, file tree, tab and metadata bookkeeping for rpide.
//! rpide 的專案、檔案樹、分頁與中繼資料管理核心模組。

mod serde_path;
mod util;

pub mod command;
pub mod context_menu;
pub mod error;
pub mod listing;
pub mod pack;
pub mod project;
pub mod shell;
pub mod store;
pub mod tab;
pub mod tabs;
pub mod tree;
pub mod workbench;

pub use command::{Command, NewEntryKind, Notice, NoticeKind, Outcome};
pub use context_menu::{
    ContextMenu, MenuAction, MenuCategory, MenuEntry, MenuTarget, DANGER_CATEGORY, MAIN_CATEGORY,
    NEW_CATEGORY,
};
pub use error::ProjectError;
pub use listing::{list_directory, DirectoryEntry, EntryKind, FileClass, NOISE_ENTRIES};
pub use pack::{create_pack, read_pack_format, PackFormat, PACK_FORMATS, PACK_MCMETA};
pub use project::{Project, ProjectHash, ProjectRecord};
pub use shell::{RecordingShell, Shell, SystemShell};
pub use store::{IndexEntry, ProjectStore, ProjectSummary};
pub use tab::{DirtyTransition, Tab, TabKind, TabSummary, TextTab};
pub use tabs::{TabId, TabRegistry};
pub use tree::{FileTree, NodeId, TreeRow};
pub use util::{absolutize, normalize_path};
pub use workbench::Workbench;
