//! Otter transcription service access
//!
//! Recordings are fetched through the samepage.network proxy, which
//! exposes `GET_SPEECHES` (paginated summaries) and `GET_SPEECH` (one
//! recording with its transcript) on a single endpoint.

mod client;
mod messages;
#[cfg(test)]
pub(crate) mod mock;

pub(crate) use client::OtterClient;
pub(crate) use messages::{
    Folder, ListPage, PageCursor, RecordingDetail, RecordingSummary, TranscriptTurn,
};

use crate::error::OtterError;
use crate::keychain::Credentials;
use async_trait::async_trait;

/// Source of recordings and their transcripts
#[async_trait]
pub(crate) trait RecordingSource: Send + Sync {
    /// Fetch one page of recording summaries.
    ///
    /// `cursor` is the value returned with the previous page; `None`
    /// requests the newest recordings.
    async fn list_recordings(
        &self,
        credentials: &Credentials,
        page_size: Option<u32>,
        cursor: Option<PageCursor>,
    ) -> Result<ListPage, OtterError>;

    /// Fetch one recording with its full transcript.
    async fn get_recording(
        &self,
        credentials: &Credentials,
        id: &str,
    ) -> Result<RecordingDetail, OtterError>;
}
