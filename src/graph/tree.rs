//! Block tree shared by graph implementations

use super::GraphError;
use crate::outline::{generate_uid, OutlineNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One block or page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Block {
    /// Block text, or the title for pages
    pub(crate) text: String,
    #[serde(default)]
    pub(crate) is_page: bool,
    #[serde(default)]
    pub(crate) parent: Option<String>,
    #[serde(default)]
    pub(crate) children: Vec<String>,
}

/// All blocks of a graph keyed by uid
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BlockTree {
    #[serde(default)]
    blocks: BTreeMap<String, Block>,
}

impl BlockTree {
    pub(crate) fn get(&self, uid: &str) -> Option<&Block> {
        self.blocks.get(uid)
    }

    /// Create a page if it does not exist yet. Returns true when created.
    pub(crate) fn ensure_page(&mut self, uid: &str, title: &str) -> bool {
        if self.blocks.contains_key(uid) {
            return false;
        }
        self.blocks.insert(
            uid.to_string(),
            Block {
                text: title.to_string(),
                is_page: true,
                parent: None,
                children: Vec::new(),
            },
        );
        true
    }

    /// Insert `node` under `parent_uid` at `order`, clamped to the end.
    ///
    /// Returns the uid of the inserted root.
    pub(crate) fn insert(
        &mut self,
        parent_uid: &str,
        node: &OutlineNode,
        order: usize,
    ) -> Result<String, GraphError> {
        if !self.blocks.contains_key(parent_uid) {
            return Err(GraphError::NotFound(parent_uid.to_string()));
        }
        if let Some(uid) = &node.uid {
            if self.blocks.contains_key(uid) {
                return Err(GraphError::DuplicateUid(uid.clone()));
            }
        }

        let uid = self.insert_subtree(parent_uid, node);
        let siblings = &mut self
            .blocks
            .get_mut(parent_uid)
            .ok_or_else(|| GraphError::NotFound(parent_uid.to_string()))?
            .children;
        let position = order.min(siblings.len());
        siblings.insert(position, uid.clone());
        Ok(uid)
    }

    fn insert_subtree(&mut self, parent_uid: &str, node: &OutlineNode) -> String {
        let uid = node.uid.clone().unwrap_or_else(|| self.fresh_uid());
        self.blocks.insert(
            uid.clone(),
            Block {
                text: node.text.clone(),
                is_page: false,
                parent: Some(parent_uid.to_string()),
                children: Vec::new(),
            },
        );

        let children: Vec<String> = node
            .children
            .iter()
            .map(|child| self.insert_subtree(&uid, child))
            .collect();
        if let Some(block) = self.blocks.get_mut(&uid) {
            block.children = children;
        }
        uid
    }

    fn fresh_uid(&self) -> String {
        loop {
            let uid = generate_uid();
            if !self.blocks.contains_key(&uid) {
                return uid;
            }
        }
    }

    /// Remove a block and all of its descendants.
    pub(crate) fn remove(&mut self, uid: &str) -> Result<(), GraphError> {
        let block = self
            .blocks
            .remove(uid)
            .ok_or_else(|| GraphError::NotFound(uid.to_string()))?;

        if let Some(parent) = block.parent.as_deref().and_then(|p| self.blocks.get_mut(p)) {
            parent.children.retain(|child| child != uid);
        }

        let mut pending = block.children;
        while let Some(child) = pending.pop() {
            if let Some(removed) = self.blocks.remove(&child) {
                pending.extend(removed.children);
            }
        }
        Ok(())
    }

    /// Number of children; zero for unknown uids.
    pub(crate) fn children_count(&self, uid: &str) -> usize {
        self.blocks.get(uid).map_or(0, |b| b.children.len())
    }

    pub(crate) fn parent_of(&self, uid: &str) -> Result<Option<String>, GraphError> {
        self.blocks
            .get(uid)
            .map(|b| b.parent.clone())
            .ok_or_else(|| GraphError::NotFound(uid.to_string()))
    }

    /// Position among siblings; pages are at order zero.
    pub(crate) fn order_of(&self, uid: &str) -> Result<usize, GraphError> {
        let block = self
            .blocks
            .get(uid)
            .ok_or_else(|| GraphError::NotFound(uid.to_string()))?;
        let Some(parent) = block.parent.as_deref().and_then(|p| self.blocks.get(p)) else {
            return Ok(0);
        };
        Ok(parent
            .children
            .iter()
            .position(|child| child == uid)
            .unwrap_or(0))
    }

    /// Uid of the page containing `uid` (a page contains itself).
    pub(crate) fn page_of(&self, uid: &str) -> Result<Option<String>, GraphError> {
        let mut current = uid;
        loop {
            let block = self
                .blocks
                .get(current)
                .ok_or_else(|| GraphError::NotFound(current.to_string()))?;
            if block.is_page {
                return Ok(Some(current.to_string()));
            }
            match block.parent.as_deref() {
                Some(parent) => current = parent,
                None => return Ok(None),
            }
        }
    }

    /// Rebuild the outline rooted at `uid`.
    #[cfg(test)]
    pub(crate) fn outline_of(&self, uid: &str) -> Option<OutlineNode> {
        let block = self.blocks.get(uid)?;
        Some(OutlineNode {
            uid: Some(uid.to_string()),
            text: block.text.clone(),
            children: block
                .children
                .iter()
                .filter_map(|child| self.outline_of(child))
                .collect(),
        })
    }
}
