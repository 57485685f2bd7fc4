//! Recording selection dialog
//!
//! State machine behind "Import Otter": lists recordings page by page,
//! lets the user pick one and imports it where the transient block sits.
//! Rendering and input live in the command layer.

use crate::error::ImportError;
use crate::graph::{Graph, GraphError};
use crate::importer::{ImportMode, ImportOutcome, ImportRequest, Importer};
use crate::otter::{PageCursor, RecordingSummary};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default number of recordings shown at once
pub(crate) const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DialogState {
    Idle,
    ListLoading,
    ListLoaded,
    ListError(String),
    Importing,
    Closed,
}

pub(crate) struct SelectionDialog {
    /// Transient block the dialog was opened on
    block_uid: String,
    state: DialogState,
    speeches: Vec<RecordingSummary>,
    page: usize,
    page_size: usize,
    cursor: Option<PageCursor>,
    is_end: bool,
    selected: Option<String>,
    /// Last import failure, shown until the next attempt
    error: Option<String>,
    cancel: CancellationToken,
}

impl SelectionDialog {
    pub(crate) fn new(block_uid: impl Into<String>, page_size: usize) -> Self {
        Self {
            block_uid: block_uid.into(),
            state: DialogState::Idle,
            speeches: Vec::new(),
            page: 0,
            page_size: page_size.max(1),
            cursor: None,
            is_end: false,
            selected: None,
            error: None,
            cancel: CancellationToken::new(),
        }
    }

    pub(crate) fn state(&self) -> &DialogState {
        &self.state
    }

    pub(crate) fn page_size(&self) -> usize {
        self.page_size
    }

    pub(crate) fn page(&self) -> usize {
        self.page
    }

    pub(crate) fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub(crate) fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub(crate) fn open(&mut self) {
        if self.state == DialogState::Idle {
            self.state = DialogState::ListLoading;
        }
    }

    /// Fetch the next page of recordings and append it.
    pub(crate) async fn load(&mut self, importer: &Importer) {
        if self.state != DialogState::ListLoading {
            return;
        }

        match importer.list_recordings(None, self.cursor.clone()).await {
            Ok(page) => {
                debug!(
                    count = page.speeches.len(),
                    is_end = page.is_end,
                    "Loaded recordings"
                );
                self.cursor = Some(page.cursor());
                self.is_end = page.is_end;
                self.speeches.extend(page.speeches);
                self.state = DialogState::ListLoaded;
            }
            Err(e) => {
                warn!("Failed to list recordings: {}", e);
                self.state = DialogState::ListError(e.display_message());
            }
        }
    }

    /// Go back to loading after a listing error.
    pub(crate) fn retry(&mut self) {
        if matches!(self.state, DialogState::ListError(_)) {
            self.state = DialogState::ListLoading;
        }
    }

    /// Recordings on the current page
    pub(crate) fn visible(&self) -> &[RecordingSummary] {
        let start = self.page.min(self.speeches.len());
        let end = (self.page + self.page_size).min(self.speeches.len());
        &self.speeches[start..end]
    }

    pub(crate) fn can_previous(&self) -> bool {
        self.state == DialogState::ListLoaded && self.page > 0
    }

    pub(crate) fn can_next(&self) -> bool {
        self.state == DialogState::ListLoaded
            && !(self.is_end && self.page + self.page_size >= self.speeches.len())
    }

    pub(crate) fn previous(&mut self) {
        if self.can_previous() {
            self.page = self.page.saturating_sub(self.page_size);
        }
    }

    /// Advance one page. Returns true when the caller must `load` first.
    pub(crate) fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        let needs_load = !self.is_end && self.page + self.page_size >= self.speeches.len();
        self.page += self.page_size;
        if needs_load {
            self.state = DialogState::ListLoading;
        }
        needs_load
    }

    /// Select a loaded recording. Returns false for unknown ids.
    pub(crate) fn select(&mut self, id: &str) -> bool {
        if self.state != DialogState::ListLoaded || !self.speeches.iter().any(|s| s.id == id) {
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    /// Import the selected recording where the transient block sits.
    ///
    /// Success closes the dialog and removes the transient block. Any
    /// failure other than cancellation returns to the list with the error
    /// text so the user can try again.
    pub(crate) async fn confirm(
        &mut self,
        importer: &Importer,
    ) -> Result<ImportOutcome, ImportError> {
        let Some(id) = self.selected.clone() else {
            return Err(ImportError::Cancelled);
        };
        if self.state != DialogState::ListLoaded {
            return Err(ImportError::Cancelled);
        }

        self.state = DialogState::Importing;
        self.error = None;

        match self.import_at_block(importer, id).await {
            Ok(outcome) => {
                info!(id = %outcome.id, block_uid = %outcome.block_uid, "Dialog import complete");
                self.close(importer.graph()).await;
                Ok(outcome)
            }
            Err(ImportError::Cancelled) => {
                self.close(importer.graph()).await;
                Err(ImportError::Cancelled)
            }
            Err(e) => {
                warn!("Dialog import failed: {}", e);
                self.error = Some(e.display_message());
                self.state = DialogState::ListLoaded;
                Err(e)
            }
        }
    }

    async fn import_at_block(
        &self,
        importer: &Importer,
        id: String,
    ) -> Result<ImportOutcome, ImportError> {
        let graph = importer.graph();
        let parent = graph
            .parent_of(&self.block_uid)
            .await?
            .ok_or_else(|| GraphError::NotFound(format!("parent of {}", self.block_uid)))?;
        let order = graph.order_of(&self.block_uid).await?;

        importer
            .import_one(
                ImportRequest {
                    id,
                    target: parent,
                    mode: ImportMode::Manual,
                    order,
                },
                &self.cancel,
            )
            .await
    }

    /// Dismiss the dialog without importing.
    pub(crate) async fn cancel(&mut self, graph: &dyn Graph) {
        self.close(graph).await;
    }

    async fn close(&mut self, graph: &dyn Graph) {
        if self.state == DialogState::Closed {
            return;
        }
        self.cancel.cancel();
        self.state = DialogState::Closed;
        if let Err(e) = graph.delete_block(&self.block_uid).await {
            warn!(block_uid = %self.block_uid, "Failed to remove transient block: {}", e);
        }
    }
}
