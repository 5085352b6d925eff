use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use rpide_core::Indentation;

use crate::command::{Command, NewEntryKind, Notice, NoticeKind, Outcome};
use crate::context_menu::{ContextMenu, MenuTarget};
use crate::error::ProjectError;
use crate::listing::DirectoryEntry;
use crate::pack::validate_entry_name;
use crate::project::Project;
use crate::shell::Shell;
use crate::tab::Tab;
use crate::tabs::TabRegistry;
use crate::tree::{FileTree, NodeId};
use crate::util::resolve_path;

/// Everything open for one project: tree, tabs and the desktop shell.
/// 單一專案的工作台：檔案樹、分頁與桌面整合。
///
/// Commands are applied one at a time through [`Workbench::dispatch`].
#[derive(Debug)]
pub struct Workbench<S: Shell> {
    project: Project,
    tree: FileTree,
    tabs: TabRegistry,
    shell: S,
}

impl<S: Shell> Workbench<S> {
    pub fn new(
        project: Project,
        default_indentation: Indentation,
        shell: S,
    ) -> Result<Self, ProjectError> {
        let tree = FileTree::load(project.root())?;
        let tabs = TabRegistry::new(project.root(), default_indentation);
        Ok(Self {
            project,
            tree,
            tabs,
            shell,
        })
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn tree(&self) -> &FileTree {
        &self.tree
    }

    pub fn tabs(&self) -> &TabRegistry {
        &self.tabs
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    /// Menu for the entry at `path`.
    pub fn context_menu(&self, path: &Path) -> Result<ContextMenu, ProjectError> {
        let entry = DirectoryEntry::stat(self.resolve(path))?;
        Ok(ContextMenu::for_entry(&MenuTarget::from(&entry)))
    }

    /// Applies one command against the project.
    /// 對專案套用一個命令。
    ///
    /// Create conflicts come back as [`Outcome::Notice`] after a beep and a
    /// refresh. Other failures before the filesystem changes are returned and
    /// leave state unchanged.
    pub fn dispatch(&mut self, command: Command) -> Result<Outcome, ProjectError> {
        let result = self.apply(command);
        if let Err(err) = &result {
            tracing::warn!(error = %err, "command failed");
        }
        result
    }

    fn apply(&mut self, command: Command) -> Result<Outcome, ProjectError> {
        match command {
            Command::OpenFile(path) => {
                let id = self.tabs.get_or_create(&path)?;
                self.tabs.open(id)?;
                Ok(Outcome::TabOpened(id))
            }
            Command::Expand(path) => {
                let id = self.node(&path)?;
                self.tree.expand(id)?;
                Ok(Outcome::TreeUpdated)
            }
            Command::Collapse(path) => {
                let id = self.node(&path)?;
                self.tree.collapse(id)?;
                Ok(Outcome::TreeUpdated)
            }
            Command::Edit { tab, text } => self.tabs.edit(tab, text).map(Outcome::TabDirty),
            Command::Save(tab) => {
                self.tabs.save(tab)?;
                let path = self
                    .tabs
                    .get(tab)
                    .map(|tab| tab.path().to_path_buf())
                    .unwrap_or_default();
                Ok(Outcome::Saved(path))
            }
            Command::CreateEntry { parent, name, kind } => self.create_entry(&parent, &name, kind),
            Command::DeleteEntry(path) => {
                let path = self.resolve(&path);
                self.shell.move_to_trash(&path)?;
                tracing::info!(path = %path.display(), "moved to trash");
                Ok(self.refresh_after_mutation())
            }
            Command::Reveal(path) => {
                let path = self.resolve(&path);
                if let Err(err) = self.shell.reveal(&path) {
                    tracing::warn!(error = %err, "reveal failed");
                }
                Ok(Outcome::Delegated)
            }
            Command::OpenExternal(path) => {
                let path = self.resolve(&path);
                if let Err(err) = self.shell.open_external(&path) {
                    tracing::warn!(error = %err, "open with default application failed");
                }
                Ok(Outcome::Delegated)
            }
        }
    }

    fn create_entry(
        &mut self,
        parent: &Path,
        name: &str,
        kind: NewEntryKind,
    ) -> Result<Outcome, ProjectError> {
        validate_entry_name(name)?;
        let target = self.resolve(parent).join(name);
        let created = match kind {
            NewEntryKind::File => OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .map(|_| ()),
            NewEntryKind::Folder => fs::create_dir(&target),
        };
        match created.map_err(|err| ProjectError::from_io(&target, err)) {
            Ok(()) => {
                tracing::info!(path = %target.display(), ?kind, "created entry");
                Ok(self.refresh_after_mutation())
            }
            Err(err) if err.is_conflict() => {
                self.shell.beep();
                self.refresh_after_mutation();
                Ok(Outcome::Notice(Notice {
                    kind: NoticeKind::AlreadyExists,
                    message: format!("{} already exists", entry_label(&target)),
                    path: target,
                }))
            }
            Err(err) => Err(err),
        }
    }

    /// The filesystem already changed, so a failed re-read is logged and
    /// reported as [`Outcome::TreeStale`] rather than as an error.
    fn refresh_after_mutation(&mut self) -> Outcome {
        match self.tree.refresh() {
            Ok(()) => Outcome::TreeRefreshed,
            Err(err) => {
                tracing::warn!(error = %err, "tree refresh failed after mutation");
                Outcome::TreeStale
            }
        }
    }

    fn node(&self, path: &Path) -> Result<NodeId, ProjectError> {
        let path = self.resolve(path);
        self.tree.find(&path).ok_or(ProjectError::NotFound(path))
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        resolve_path(self.project.root(), path)
    }
}

fn entry_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
