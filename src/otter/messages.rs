//! Otter proxy request and response messages
//!
//! Every call is a POST to the same endpoint; `operation` selects what the
//! proxy does. Credentials travel in each body.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request body shared by all operations
#[derive(Debug, Serialize)]
pub(super) struct SpeechesRequest<'a, P> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
    pub(super) operation: Operation,
    pub(super) params: P,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum Operation {
    GetSpeeches,
    GetSpeech,
}

/// Parameters for `GET_SPEECHES`
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) last_load: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) last_modified: Option<Value>,
}

/// Parameters for `GET_SPEECH`
#[derive(Debug, Serialize)]
pub(super) struct SpeechParams<'a> {
    pub(super) id: &'a str,
}

/// Folder a recording was filed under in Otter
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Folder {
    pub(crate) id: i64,
    #[serde(default)]
    pub(crate) name: String,
}

/// One entry of a `GET_SPEECHES` page
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct RecordingSummary {
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) summary: Option<String>,
    /// Epoch seconds
    #[serde(default, alias = "createdAt", alias = "createdDate")]
    pub(crate) created_at: i64,
    /// Transcription finished
    #[serde(default, rename = "isProcessed", alias = "is_processed")]
    pub(crate) is_processed: bool,
    #[serde(default)]
    pub(crate) folder: Option<Folder>,
}

/// Opaque pagination cursor returned by `GET_SPEECHES`
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PageCursor {
    pub(crate) last_load: Value,
    pub(crate) last_modified: Value,
}

/// Response to `GET_SPEECHES`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListPage {
    #[serde(default)]
    pub(crate) speeches: Vec<RecordingSummary>,
    #[serde(default)]
    pub(crate) last_load: Value,
    #[serde(default)]
    pub(crate) last_modified: Value,
    #[serde(default)]
    pub(crate) is_end: bool,
}

impl ListPage {
    pub(crate) fn cursor(&self) -> PageCursor {
        PageCursor {
            last_load: self.last_load.clone(),
            last_modified: self.last_modified.clone(),
        }
    }
}

/// One speaker turn of a transcript
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct TranscriptTurn {
    /// Offset in samples (16 kHz)
    #[serde(default, alias = "startOffset", alias = "start_offset")]
    pub(crate) start: i64,
    #[serde(default, alias = "endOffset", alias = "end_offset")]
    pub(crate) end: i64,
    #[serde(default, alias = "transcript")]
    pub(crate) text: String,
    #[serde(default, alias = "speakerId", alias = "speaker_id")]
    pub(crate) speaker: String,
}

/// Response to `GET_SPEECH`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct RecordingDetail {
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) summary: Option<String>,
    #[serde(default, alias = "createdAt", alias = "createdDate")]
    pub(crate) created_at: i64,
    #[serde(default)]
    pub(crate) link: Option<String>,
    #[serde(default)]
    pub(crate) folder: Option<Folder>,
    #[serde(default, rename = "transcripts", alias = "transcriptTurns")]
    pub(crate) turns: Vec<TranscriptTurn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_request_serialization() {
        let request = SpeechesRequest {
            email: "me@example.com",
            password: "secret",
            operation: Operation::GetSpeeches,
            params: ListParams {
                page_size: Some(10),
                ..Default::default()
            },
        };

        let json = serde_json::to_value(&request).expect("Failed to serialize");
        assert_eq!(json["operation"], "GET_SPEECHES");
        assert_eq!(json["params"]["pageSize"], 10);
        assert!(json["params"].get("lastLoad").is_none());
        assert_eq!(json["email"], "me@example.com");
    }

    #[test]
    fn test_speech_request_serialization() {
        let request = SpeechesRequest {
            email: "me@example.com",
            password: "secret",
            operation: Operation::GetSpeech,
            params: SpeechParams { id: "abc123" },
        };

        let json = serde_json::to_value(&request).expect("Failed to serialize");
        assert_eq!(json["operation"], "GET_SPEECH");
        assert_eq!(json["params"]["id"], "abc123");
    }

    #[test]
    fn test_list_page_deserialization() {
        let json = r#"{
            "speeches": [
                {
                    "id": "s1",
                    "title": "Standup",
                    "summary": "sprint, demo",
                    "createdDate": 1700000000,
                    "isProcessed": true,
                    "folder": { "id": 42, "name": "Walks" }
                },
                { "id": "s2", "title": null, "created_at": 1700000100, "folder": null }
            ],
            "lastLoad": 1700000200.5,
            "lastModified": 1700000300,
            "isEnd": false
        }"#;

        let page: ListPage = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(page.speeches.len(), 2);

        let first = &page.speeches[0];
        assert_eq!(first.created_at, 1700000000);
        assert!(first.is_processed);
        assert_eq!(first.folder.as_ref().map(|f| f.id), Some(42));

        let second = &page.speeches[1];
        assert!(second.title.is_none());
        assert!(!second.is_processed);
        assert!(second.folder.is_none());

        assert!(!page.is_end);
        let cursor = page.cursor();
        assert_eq!(cursor.last_modified, serde_json::json!(1700000300));
    }

    #[test]
    fn test_detail_deserialization() {
        let json = r#"{
            "title": "Walk",
            "summary": "ideas",
            "createdDate": 1700000000,
            "link": "https://otter.ai/u/abc",
            "transcripts": [
                { "start": 0, "end": 16000, "text": "hi", "speaker": "Ann" },
                { "startOffset": 16000, "endOffset": 32000, "text": "there", "speakerId": "Ann" }
            ]
        }"#;

        let detail: RecordingDetail = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(detail.turns.len(), 2);
        assert_eq!(detail.turns[1].start, 16000);
        assert_eq!(detail.turns[1].speaker, "Ann");
        assert!(detail.folder.is_none());
    }
}
