//! JSON-file graph
//!
//! Keeps the whole block tree in memory and rewrites the file after every
//! mutation. A graph without a path lives only in memory.

use super::tree::BlockTree;
use super::{Graph, GraphError};
use crate::outline::OutlineNode;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

pub(crate) struct LocalGraph {
    path: Option<PathBuf>,
    tree: Mutex<BlockTree>,
}

impl LocalGraph {
    /// Open the graph stored at `path`, starting empty if it does not exist.
    pub(crate) fn open(path: impl Into<PathBuf>) -> Result<Self, GraphError> {
        let path = path.into();
        let tree = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| GraphError::Read {
                path: path.clone(),
                source: e,
            })?;
            serde_json::from_str(&contents)?
        } else {
            info!("No graph at {:?}, starting empty", path);
            BlockTree::default()
        };

        Ok(Self {
            path: Some(path),
            tree: Mutex::new(tree),
        })
    }

    pub(crate) fn in_memory() -> Self {
        Self {
            path: None,
            tree: Mutex::new(BlockTree::default()),
        }
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BlockTree>, GraphError> {
        self.tree.lock().map_err(|_| GraphError::Poisoned)
    }

    fn persist(&self, tree: &BlockTree) -> Result<(), GraphError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| GraphError::Write {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let json = serde_json::to_string_pretty(tree)?;
        fs::write(path, json).map_err(|e| GraphError::Write {
            path: path.clone(),
            source: e,
        })?;
        debug!("Saved graph to: {:?}", path);
        Ok(())
    }

    /// Apply `change` to a copy of the tree and keep it only once it is saved.
    fn commit<T>(
        &self,
        change: impl FnOnce(&mut BlockTree) -> Result<T, GraphError>,
    ) -> Result<T, GraphError> {
        let mut tree = self.lock()?;
        let mut next = tree.clone();
        let value = change(&mut next)?;
        self.persist(&next)?;
        *tree = next;
        Ok(value)
    }

    /// Create a page if missing, e.g. today's daily page.
    pub(crate) fn ensure_page(&self, uid: &str, title: &str) -> Result<(), GraphError> {
        let created = self.commit(|tree| Ok(tree.ensure_page(uid, title)))?;
        if created {
            info!(uid, title, "Created page");
        }
        Ok(())
    }

    /// Text of a block, or the title of a page.
    pub(crate) fn text_of(&self, uid: &str) -> Result<Option<String>, GraphError> {
        Ok(self.lock()?.get(uid).map(|b| b.text.clone()))
    }

    /// Outline rooted at `uid`.
    #[cfg(test)]
    pub(crate) fn outline_of(&self, uid: &str) -> Result<Option<OutlineNode>, GraphError> {
        Ok(self.lock()?.outline_of(uid))
    }
}

#[async_trait]
impl Graph for LocalGraph {
    async fn create_block(
        &self,
        parent_uid: &str,
        node: &OutlineNode,
        order: usize,
    ) -> Result<(), GraphError> {
        let uid = self.commit(|tree| tree.insert(parent_uid, node, order))?;
        debug!(parent_uid, uid = %uid, order, "Created block");
        Ok(())
    }

    async fn delete_block(&self, uid: &str) -> Result<(), GraphError> {
        self.commit(|tree| tree.remove(uid))?;
        debug!(uid, "Deleted block");
        Ok(())
    }

    async fn children_count(&self, parent_uid: &str) -> Result<usize, GraphError> {
        Ok(self.lock()?.children_count(parent_uid))
    }

    async fn parent_of(&self, uid: &str) -> Result<Option<String>, GraphError> {
        self.lock()?.parent_of(uid)
    }

    async fn order_of(&self, uid: &str) -> Result<usize, GraphError> {
        self.lock()?.order_of(uid)
    }

    async fn page_of(&self, uid: &str) -> Result<Option<String>, GraphError> {
        self.lock()?.page_of(uid)
    }
}
