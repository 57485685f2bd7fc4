use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ListPage, PageCursor, RecordingDetail, RecordingSource, RecordingSummary};
use crate::error::OtterError;
use crate::keychain::Credentials;

/// Recording source that replays canned pages and details.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    pages: Mutex<VecDeque<Result<ListPage, OtterError>>>,
    details: Mutex<HashMap<String, RecordingDetail>>,
    /// Ids whose detail request never completes
    stalled: Mutex<Vec<String>>,
    pub(crate) list_calls: Mutex<Vec<Option<PageCursor>>>,
    pub(crate) detail_calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(self, page: ListPage) -> Self {
        self.pages.lock().unwrap().push_back(Ok(page));
        self
    }

    pub(crate) fn with_list_error(self, status: u16, message: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .push_back(Err(OtterError::ServerError {
                status,
                message: message.to_string(),
            }));
        self
    }

    pub(crate) fn with_detail(self, id: &str, detail: RecordingDetail) -> Self {
        self.details
            .lock()
            .unwrap()
            .insert(id.to_string(), detail);
        self
    }

    pub(crate) fn with_stalled(self, id: &str) -> Self {
        self.stalled.lock().unwrap().push(id.to_string());
        self
    }

    pub(crate) fn detail_calls(&self) -> Vec<String> {
        self.detail_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordingSource for ScriptedSource {
    async fn list_recordings(
        &self,
        _credentials: &Credentials,
        _page_size: Option<u32>,
        cursor: Option<PageCursor>,
    ) -> Result<ListPage, OtterError> {
        self.list_calls.lock().unwrap().push(cursor);
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ListPage { is_end: true, ..Default::default() }))
    }

    async fn get_recording(
        &self,
        _credentials: &Credentials,
        id: &str,
    ) -> Result<RecordingDetail, OtterError> {
        self.detail_calls.lock().unwrap().push(id.to_string());
        let stalled = self.stalled.lock().unwrap().iter().any(|s| s == id);
        if stalled {
            std::future::pending::<()>().await;
        }
        self.details
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| OtterError::ServerError {
                status: 404,
                message: format!("Speech {} not found", id),
            })
    }
}

pub(crate) fn credentials() -> Credentials {
    Credentials {
        email: "me@example.com".to_string(),
        password: "secret".to_string(),
    }
}

pub(crate) fn summary(id: &str, is_processed: bool) -> RecordingSummary {
    RecordingSummary {
        id: id.to_string(),
        title: Some(format!("Recording {}", id)),
        summary: Some("notes".to_string()),
        created_at: 1_700_000_000,
        is_processed,
        folder: None,
    }
}

pub(crate) fn detail(title: &str) -> RecordingDetail {
    RecordingDetail {
        title: Some(title.to_string()),
        summary: Some("notes".to_string()),
        created_at: 1_700_000_000,
        link: Some("https://otter.ai/u/abc".to_string()),
        folder: None,
        turns: vec![super::TranscriptTurn {
            start: 0,
            end: 16_000,
            text: "hello".to_string(),
            speaker: "Ann".to_string(),
        }],
    }
}
