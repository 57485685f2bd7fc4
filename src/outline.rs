//! Outline construction
//!
//! Builds the fixed block tree written into the graph for one imported
//! recording:
//!
//! ```text
//! [[<daily page>]]
//! └─ [[Automated transcript from otter]]
//!    ├─ Recording Metadata
//!    │  ├─ Date:: [[<daily page>]]
//!    │  ├─ Start time:: H:MM
//!    │  ├─ Otter Link:: <link>
//!    │  ├─ Source::              (audio notes only)
//!    │  └─ {{[[TODO]]}} Moved as needed?
//!    └─ {{[[TODO]]}} [[Transcript]]
//!       └─ <transcript text>
//! ```

use crate::otter::RecordingDetail;
use crate::roam_date;
use chrono::{DateTime, Local, TimeZone, Timelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Length of generated block uids
pub(crate) const UID_LENGTH: usize = 9;

const UID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

const SECTION_HEADER: &str = "[[Automated transcript from otter]]";
const METADATA_HEADER: &str = "Recording Metadata";
const TRANSCRIPT_HEADER: &str = "{{[[TODO]]}} [[Transcript]]";
const MOVED_TODO: &str = "{{[[TODO]]}} Moved as needed?";
const WALKING_JOURNAL_TAG: &str = "#[[Walking Journal]]";
const VERBAL_NOTES_TAG: &str = "#[[Verbal Notes]]";

/// Which outline shape an import produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum OutlineVariant {
    #[default]
    Default,
    AudioNotes,
    WalkingJournal,
}

impl fmt::Display for OutlineVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutlineVariant::Default => write!(f, "default"),
            OutlineVariant::AudioNotes => write!(f, "audio notes"),
            OutlineVariant::WalkingJournal => write!(f, "walking journal"),
        }
    }
}

/// A block of text with nested children
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OutlineNode {
    /// Uid to create the block with; generated by the graph when absent
    pub(crate) uid: Option<String>,
    pub(crate) text: String,
    pub(crate) children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub(crate) fn leaf(text: impl Into<String>) -> Self {
        Self {
            uid: None,
            text: text.into(),
            children: Vec::new(),
        }
    }

    pub(crate) fn with_children(text: impl Into<String>, children: Vec<OutlineNode>) -> Self {
        Self {
            uid: None,
            text: text.into(),
            children,
        }
    }
}

/// Generate a fresh block uid
pub(crate) fn generate_uid() -> String {
    let mut rng = rand::thread_rng();
    (0..UID_LENGTH)
        .map(|_| UID_ALPHABET[rng.gen_range(0..UID_ALPHABET.len())] as char)
        .collect()
}

/// Build the outline for a recording in local time.
pub(crate) fn build_outline(
    detail: &RecordingDetail,
    transcript: &str,
    variant: OutlineVariant,
    uid: &str,
) -> OutlineNode {
    build_outline_in(detail, transcript, variant, uid, &Local)
}

/// Build the outline for a recording, dating it in `tz`.
pub(crate) fn build_outline_in<Tz: TimeZone>(
    detail: &RecordingDetail,
    transcript: &str,
    variant: OutlineVariant,
    uid: &str,
    tz: &Tz,
) -> OutlineNode {
    let created: DateTime<Tz> = Utc
        .timestamp_opt(detail.created_at, 0)
        .single()
        .unwrap_or_default()
        .with_timezone(tz);
    let date_link = roam_date::page_link(created.date_naive());
    let start_time = format!("{}:{:02}", created.hour(), created.minute());

    let mut metadata = vec![
        OutlineNode::leaf(format!("Date:: {}", date_link)),
        OutlineNode::leaf(format!("Start time:: {}", start_time)),
        OutlineNode::leaf(format!(
            "Otter Link:: {}",
            detail.link.as_deref().unwrap_or("")
        )),
    ];
    if variant == OutlineVariant::AudioNotes {
        metadata.push(OutlineNode::leaf("Source:: "));
    }
    metadata.push(OutlineNode::leaf(MOVED_TODO));

    let section_header = match variant {
        OutlineVariant::AudioNotes => format!("{} {}", SECTION_HEADER, VERBAL_NOTES_TAG),
        _ => SECTION_HEADER.to_string(),
    };
    let root_text = match variant {
        OutlineVariant::WalkingJournal => format!("{} {}", date_link, WALKING_JOURNAL_TAG),
        _ => date_link,
    };

    let section = OutlineNode::with_children(
        section_header,
        vec![
            OutlineNode::with_children(METADATA_HEADER, metadata),
            OutlineNode::with_children(
                TRANSCRIPT_HEADER,
                vec![OutlineNode::leaf(transcript)],
            ),
        ],
    );

    OutlineNode {
        uid: Some(uid.to_string()),
        text: root_text,
        children: vec![section],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otter::mock;
    use chrono::FixedOffset;

    fn detail() -> RecordingDetail {
        // 2023-11-14 22:13:20 UTC
        mock::detail("Standup")
    }

    fn texts(node: &OutlineNode) -> Vec<&str> {
        node.children.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_default_outline_shape() {
        let node = build_outline_in(
            &detail(),
            "A:\nhi",
            OutlineVariant::Default,
            "abcdefghi",
            &Utc,
        );

        assert_eq!(node.uid.as_deref(), Some("abcdefghi"));
        assert_eq!(node.text, "[[November 14th, 2023]]");
        assert_eq!(texts(&node), vec![SECTION_HEADER]);

        let section = &node.children[0];
        assert_eq!(texts(section), vec![METADATA_HEADER, TRANSCRIPT_HEADER]);

        let metadata = &section.children[0];
        assert_eq!(
            texts(metadata),
            vec![
                "Date:: [[November 14th, 2023]]",
                "Start time:: 22:13",
                "Otter Link:: https://otter.ai/u/abc",
                MOVED_TODO,
            ]
        );

        let transcript = &section.children[1];
        assert_eq!(texts(transcript), vec!["A:\nhi"]);
        assert!(transcript.children[0].children.is_empty());
    }

    #[test]
    fn test_start_time_uses_zone() {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let node = build_outline_in(&detail(), "", OutlineVariant::Default, "abcdefghi", &tz);
        assert_eq!(node.text, "[[November 15th, 2023]]");
        let metadata = &node.children[0].children[0];
        assert_eq!(metadata.children[1].text, "Start time:: 1:13");
    }

    #[test]
    fn test_audio_notes_variant() {
        let node = build_outline_in(&detail(), "", OutlineVariant::AudioNotes, "abcdefghi", &Utc);
        assert_eq!(node.text, "[[November 14th, 2023]]");

        let section = &node.children[0];
        assert_eq!(section.text, "[[Automated transcript from otter]] #[[Verbal Notes]]");

        let metadata = &section.children[0];
        assert_eq!(metadata.children.len(), 5);
        assert_eq!(metadata.children[3].text, "Source:: ");
    }

    #[test]
    fn test_walking_journal_variant() {
        let node = build_outline_in(
            &detail(),
            "",
            OutlineVariant::WalkingJournal,
            "abcdefghi",
            &Utc,
        );
        assert_eq!(node.text, "[[November 14th, 2023]] #[[Walking Journal]]");
        assert_eq!(node.children[0].text, SECTION_HEADER);
        assert_eq!(node.children[0].children[0].children.len(), 4);
    }

    #[test]
    fn test_missing_link_renders_empty() {
        let mut detail = detail();
        detail.link = None;
        let node = build_outline_in(&detail, "", OutlineVariant::Default, "abcdefghi", &Utc);
        assert_eq!(node.children[0].children[0].children[2].text, "Otter Link:: ");
    }

    #[test]
    fn test_deterministic_for_same_uid() {
        let a = build_outline_in(&detail(), "t", OutlineVariant::Default, "abcdefghi", &Utc);
        let b = build_outline_in(&detail(), "t", OutlineVariant::Default, "abcdefghi", &Utc);
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_uid() {
        let uid = generate_uid();
        assert_eq!(uid.len(), UID_LENGTH);
        assert!(uid.bytes().all(|b| UID_ALPHABET.contains(&b)));
        assert_ne!(generate_uid(), generate_uid());
    }

    #[test]
    fn test_variant_serde_names() {
        let v: OutlineVariant = serde_json::from_str("\"audio_notes\"").unwrap();
        assert_eq!(v, OutlineVariant::AudioNotes);
        assert_eq!(
            serde_json::to_string(&OutlineVariant::WalkingJournal).unwrap(),
            "\"walking_journal\""
        );
    }
}
