//! Notes graph access
//!
//! The importer writes outlines through the [`Graph`] trait. The shipped
//! implementation is [`LocalGraph`], a JSON file of blocks and pages.

mod local;
mod tree;

pub(crate) use local::LocalGraph;

use crate::outline::OutlineNode;
use async_trait::async_trait;
use std::path::PathBuf;

/// Block-level operations on the host document
#[async_trait]
pub(crate) trait Graph: Send + Sync {
    /// Create `node` (and its children) under `parent_uid` at `order`.
    async fn create_block(
        &self,
        parent_uid: &str,
        node: &OutlineNode,
        order: usize,
    ) -> Result<(), GraphError>;

    /// Delete a block and its descendants.
    async fn delete_block(&self, uid: &str) -> Result<(), GraphError>;

    /// Number of children under `parent_uid`; zero when it does not exist.
    async fn children_count(&self, parent_uid: &str) -> Result<usize, GraphError>;

    async fn parent_of(&self, uid: &str) -> Result<Option<String>, GraphError>;

    async fn order_of(&self, uid: &str) -> Result<usize, GraphError>;

    /// Uid of the page containing `uid`.
    async fn page_of(&self, uid: &str) -> Result<Option<String>, GraphError>;
}

/// Graph errors with contextual information
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Block {0} does not exist")]
    NotFound(String),

    #[error("Block {0} already exists")]
    DuplicateUid(String),

    #[error("Failed to read graph {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write graph {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Graph file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Graph lock poisoned")]
    Poisoned,
}
