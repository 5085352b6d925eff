use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ProjectError;
use crate::listing::{list_directory, DirectoryEntry, EntryKind, FileClass};
use crate::util::normalize_path;

/// Identifier of a node in the current tree revision.
/// 目前樹版本中節點的識別碼；重新整理後失效。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct TreeNode {
    entry: DirectoryEntry,
    depth: usize,
    /// `None` until the directory has been listed once.
    children: Option<Vec<NodeId>>,
    expanded: bool,
}

/// One visible line of the file browser.
/// 檔案瀏覽器中可見的一列。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeRow {
    pub id: NodeId,
    pub depth: usize,
    pub name: String,
    pub path: PathBuf,
    pub kind: EntryKind,
    pub class: Option<FileClass>,
    pub expanded: bool,
}

/// Lazily expanded view of a project directory.
/// 延遲展開的專案資料夾樹。
///
/// Directory listings are cached per node once fetched. Collapsing keeps the
/// cache, expanding a cached node is a no-op, and only [`FileTree::refresh`]
/// throws the caches away.
#[derive(Debug, Clone)]
pub struct FileTree {
    root: PathBuf,
    nodes: Vec<TreeNode>,
    revision: u64,
}

impl FileTree {
    /// Builds a tree for `root` and lists its top level.
    /// 建立樹並列出根目錄第一層。
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let root = normalize_path(root.as_ref());
        let mut tree = Self {
            root,
            nodes: Vec::new(),
            revision: 0,
        };
        tree.rebuild()?;
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Bumped on every refresh; node ids from older revisions are stale.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn entry(&self, id: NodeId) -> Option<&DirectoryEntry> {
        self.nodes.get(id.0).map(|node| &node.entry)
    }

    /// Cached children of `id`, `None` when never listed.
    pub fn children(&self, id: NodeId) -> Option<&[NodeId]> {
        self.nodes.get(id.0)?.children.as_deref()
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|node| node.expanded)
    }

    pub fn is_loaded(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.0)
            .is_some_and(|node| node.children.is_some())
    }

    /// Expands a directory, listing it on first use.
    /// 展開資料夾；僅在第一次展開時讀取磁碟。
    ///
    /// Returns `true` when the filesystem was read.
    pub fn expand(&mut self, id: NodeId) -> Result<bool, ProjectError> {
        let node = self.node(id)?;
        if !node.entry.is_dir() {
            return Err(ProjectError::InvalidState("only directories can be expanded"));
        }
        let listed = if node.children.is_none() {
            self.load_children(id)?;
            true
        } else {
            false
        };
        self.nodes[id.0].expanded = true;
        Ok(listed)
    }

    /// Hides the children of `id` without discarding the cached listing.
    /// 收合資料夾但保留快取。
    pub fn collapse(&mut self, id: NodeId) -> Result<(), ProjectError> {
        self.node(id)?;
        if id != self.root() {
            self.nodes[id.0].expanded = false;
        }
        Ok(())
    }

    pub fn toggle(&mut self, id: NodeId) -> Result<(), ProjectError> {
        if self.is_expanded(id) {
            self.collapse(id)
        } else {
            self.expand(id).map(|_| ())
        }
    }

    /// Locates a loaded node by path.
    /// 依路徑尋找已載入的節點。
    pub fn find(&self, path: &Path) -> Option<NodeId> {
        let path = normalize_path(path);
        self.nodes
            .iter()
            .position(|node| node.entry.path == path)
            .map(NodeId)
    }

    /// Flattens the visible part of the tree, depth-first, root excluded.
    /// 將可見節點攤平成列（不含根節點）。
    pub fn rows(&self) -> Vec<TreeRow> {
        let mut rows = Vec::new();
        let mut stack: Vec<NodeId> = self.visible_children(self.root()).rev().collect();
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            rows.push(TreeRow {
                id,
                depth: node.depth,
                name: node.entry.name.clone(),
                path: node.entry.path.clone(),
                kind: node.entry.kind,
                class: node.entry.class,
                expanded: node.expanded,
            });
            stack.extend(self.visible_children(id).rev());
        }
        rows
    }

    /// Re-reads the whole tree from disk.
    /// 從磁碟重新建立整棵樹。
    ///
    /// Directories that were expanded and still exist are expanded again.
    /// Node ids from before the refresh must not be reused. On error the
    /// tree keeps its previous listing and revision.
    pub fn refresh(&mut self) -> Result<(), ProjectError> {
        let mut expanded: Vec<(usize, PathBuf)> = self
            .nodes
            .iter()
            .skip(1)
            .filter(|node| node.expanded)
            .map(|node| (node.depth, node.entry.path.clone()))
            .collect();
        expanded.sort();

        let mut fresh = Self {
            root: self.root.clone(),
            nodes: Vec::new(),
            revision: self.revision.wrapping_add(1),
        };
        fresh.rebuild()?;
        for (_, path) in expanded {
            if let Some(id) = fresh.find(&path) {
                if fresh.nodes[id.0].entry.is_dir() {
                    fresh.expand(id)?;
                }
            }
        }
        *self = fresh;
        tracing::debug!(root = %self.root.display(), revision = self.revision, "tree refreshed");
        Ok(())
    }

    fn rebuild(&mut self) -> Result<(), ProjectError> {
        let entry = DirectoryEntry::stat(&self.root)?;
        if !entry.is_dir() {
            return Err(ProjectError::InvalidState("project root is not a directory"));
        }
        self.nodes = vec![TreeNode {
            entry,
            depth: 0,
            children: None,
            expanded: true,
        }];
        self.load_children(self.root())
    }

    fn load_children(&mut self, id: NodeId) -> Result<(), ProjectError> {
        let depth = self.nodes[id.0].depth + 1;
        let entries = list_directory(&self.nodes[id.0].entry.path)?;
        let mut children = Vec::with_capacity(entries.len());
        for entry in entries {
            children.push(NodeId(self.nodes.len()));
            self.nodes.push(TreeNode {
                entry,
                depth,
                children: None,
                expanded: false,
            });
        }
        self.nodes[id.0].children = Some(children);
        Ok(())
    }

    fn node(&self, id: NodeId) -> Result<&TreeNode, ProjectError> {
        self.nodes
            .get(id.0)
            .ok_or(ProjectError::InvalidState("stale tree node"))
    }

    fn visible_children(&self, id: NodeId) -> impl DoubleEndedIterator<Item = NodeId> + '_ {
        let node = &self.nodes[id.0];
        let children: &[NodeId] = if node.expanded {
            node.children.as_deref().unwrap_or(&[])
        } else {
            &[]
        };
        children.iter().copied()
    }
}
