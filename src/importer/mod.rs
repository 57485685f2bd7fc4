//! Recording import
//!
//! Imports one recording at a time into the graph:
//! 1. Fetches the recording with its transcript
//! 2. Picks the destination (folder rules for automatic imports only)
//! 3. Formats the transcript and builds the outline
//! 4. Writes the outline into the graph
//! 5. Records the recording id as imported
//!
//! The sweep (see [`sweep`]) drives this over the newest recordings.

mod sweep;

pub(crate) use sweep::{SweepReport, SweepSettings};

use crate::destination::DestinationTable;
use crate::error::{ImportError, OtterError};
use crate::graph::Graph;
use crate::keychain::Credentials;
use crate::otter::{ListPage, PageCursor, RecordingSource};
use crate::outline::{build_outline, generate_uid, OutlineVariant};
use crate::registry::ImportRegistry;
use crate::transcript::{format_transcript_with, SpeakerStyle};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// Called with the recording id after each successful import
pub(crate) type SuccessCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Who asked for the import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImportMode {
    /// User-directed placement; folder rules are ignored
    Manual,
    /// Sweep import; folder rules may override the target
    Automatic,
}

#[derive(Debug, Clone)]
pub(crate) struct ImportRequest {
    pub(crate) id: String,
    pub(crate) target: String,
    pub(crate) mode: ImportMode,
    pub(crate) order: usize,
}

/// Result of a successful import
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportOutcome {
    pub(crate) id: String,
    pub(crate) block_uid: String,
    pub(crate) target: String,
    pub(crate) variant: OutlineVariant,
    pub(crate) order: usize,
}

pub(crate) struct Importer {
    source: Arc<dyn RecordingSource>,
    graph: Arc<dyn Graph>,
    registry: Arc<ImportRegistry>,
    destinations: DestinationTable,
    credentials: Credentials,
    sweep: SweepSettings,
    on_success: Option<SuccessCallback>,
}

impl Importer {
    pub(crate) fn new(
        source: Arc<dyn RecordingSource>,
        graph: Arc<dyn Graph>,
        registry: Arc<ImportRegistry>,
        destinations: DestinationTable,
        credentials: Credentials,
    ) -> Self {
        Self {
            source,
            graph,
            registry,
            destinations,
            credentials,
            sweep: SweepSettings::default(),
            on_success: None,
        }
    }

    pub(crate) fn with_sweep_settings(mut self, sweep: SweepSettings) -> Self {
        self.sweep = sweep;
        self
    }

    pub(crate) fn on_success(mut self, callback: SuccessCallback) -> Self {
        self.on_success = Some(callback);
        self
    }

    pub(crate) fn graph(&self) -> &dyn Graph {
        self.graph.as_ref()
    }

    /// Fetch one page of recording summaries.
    pub(crate) async fn list_recordings(
        &self,
        page_size: Option<u32>,
        cursor: Option<PageCursor>,
    ) -> Result<ListPage, OtterError> {
        self.source
            .list_recordings(&self.credentials, page_size, cursor)
            .await
    }

    /// Fetch one recording with its transcript.
    pub(crate) async fn fetch_recording(
        &self,
        id: &str,
    ) -> Result<crate::otter::RecordingDetail, OtterError> {
        self.source.get_recording(&self.credentials, id).await
    }

    /// Import one recording.
    ///
    /// Cancelling `cancel` before the graph write abandons the import with
    /// no mutation. Once the write has started the import always records
    /// its id, so the registry never disagrees with the graph.
    #[instrument(skip(self, request, cancel), fields(id = %request.id, mode = ?request.mode))]
    pub(crate) async fn import_one(
        &self,
        request: ImportRequest,
        cancel: &CancellationToken,
    ) -> Result<ImportOutcome, ImportError> {
        if cancel.is_cancelled() {
            return Err(ImportError::Cancelled);
        }

        let detail = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Import cancelled while fetching recording");
                return Err(ImportError::Cancelled);
            }
            result = self.source.get_recording(&self.credentials, &request.id) => result?,
        };

        let (target, variant) = match request.mode {
            ImportMode::Manual => (request.target.clone(), OutlineVariant::Default),
            ImportMode::Automatic => self
                .destinations
                .route(detail.folder.as_ref(), &request.target),
        };

        let transcript = format_transcript_with(&detail.turns, SpeakerStyle::Bold);
        let block_uid = generate_uid();
        let node = build_outline(&detail, &transcript, variant, &block_uid);

        if cancel.is_cancelled() {
            info!("Import cancelled before writing to the graph");
            return Err(ImportError::Cancelled);
        }

        // Routed imports append to their own target
        let order = if target == request.target {
            request.order
        } else {
            self.graph.children_count(&target).await?
        };
        self.graph.create_block(&target, &node, order).await?;
        self.registry.record(&request.id, &block_uid).await?;

        info!(
            block_uid = %block_uid,
            target = %target,
            variant = %variant,
            turns = detail.turns.len(),
            "Imported recording"
        );

        if let Some(callback) = &self.on_success {
            callback(&request.id);
        }

        Ok(ImportOutcome {
            id: request.id,
            block_uid,
            target,
            variant,
            order,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::destination::DestinationRule;
    use crate::graph::LocalGraph;
    use crate::otter::mock::{self, ScriptedSource};
    use crate::preferences::PreferencesStore;
    use tempfile::TempDir;

    pub(crate) const TARGET: &str = "target001";

    pub(crate) struct Harness {
        pub(crate) source: Arc<ScriptedSource>,
        pub(crate) graph: Arc<LocalGraph>,
        pub(crate) store: PreferencesStore,
        pub(crate) importer: Importer,
        _dir: TempDir,
    }

    pub(crate) fn harness(source: ScriptedSource, rules: Vec<DestinationRule>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferencesStore::at(dir.path().join("prefs.json"));
        let source = Arc::new(source);
        let graph = Arc::new(LocalGraph::in_memory());
        graph.ensure_page(TARGET, "Inbox").unwrap();

        let importer = Importer::new(
            source.clone(),
            graph.clone(),
            Arc::new(ImportRegistry::new(store.clone())),
            DestinationTable::new(rules, OutlineVariant::Default).unwrap(),
            mock::credentials(),
        );

        Harness {
            source,
            graph,
            store,
            importer,
            _dir: dir,
        }
    }
}
