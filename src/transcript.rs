//! Transcript formatting
//!
//! Turns an ordered list of speaker turns into display text, labelling
//! each run of consecutive turns by the same speaker.

use crate::label::replace_placeholder;
use crate::otter::TranscriptTurn;
use std::fmt::Write;

/// Otter offsets are sample counts at 16 kHz
const SAMPLES_PER_SECOND: f64 = 16_000.0;

/// How speaker label lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum SpeakerStyle {
    /// `Ann:`
    #[default]
    Plain,
    /// `**Ann**:` (bold markup in the graph)
    Bold,
}

/// Format turns with plain speaker labels.
pub(crate) fn format_transcript(turns: &[TranscriptTurn]) -> String {
    format_transcript_with(turns, SpeakerStyle::Plain)
}

/// Format turns into one block of text.
///
/// A label line is emitted before the first turn and before every turn
/// whose speaker differs from the previous turn's. Turns are separated
/// by a blank line. Labels are not deduplicated across non-adjacent runs.
pub(crate) fn format_transcript_with(turns: &[TranscriptTurn], style: SpeakerStyle) -> String {
    let mut previous_speaker: Option<&str> = None;
    let mut lines = Vec::with_capacity(turns.len());

    for turn in turns {
        let mut line = String::new();
        if previous_speaker != Some(turn.speaker.as_str()) {
            match style {
                SpeakerStyle::Plain => line.push_str(&turn.speaker),
                SpeakerStyle::Bold => {
                    let _ = write!(line, "**{}**", turn.speaker);
                }
            }
            line.push_str(":\n");
        }
        line.push_str(&turn.text);
        lines.push(line);
        previous_speaker = Some(turn.speaker.as_str());
    }

    lines.join("\n\n")
}

/// Convert a sample offset to `M:SS`. Zero renders as `00:00`.
pub(crate) fn offset_to_timestamp(offset: i64) -> String {
    if offset == 0 {
        return "00:00".to_string();
    }
    let total_seconds = (offset as f64 / SAMPLES_PER_SECOND).round() as i64;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Render each turn with a line template, one line per turn.
///
/// Supports `{start}`, `{end}`, `{text}` and `{speaker}`.
pub(crate) fn render_turns(turns: &[TranscriptTurn], template: &str) -> String {
    turns
        .iter()
        .map(|turn| {
            let line = replace_placeholder(template, "{start}", &offset_to_timestamp(turn.start));
            let line = replace_placeholder(&line, "{end}", &offset_to_timestamp(turn.end));
            let line = replace_placeholder(&line, "{speaker}", &turn.speaker);
            replace_placeholder(&line, "{text}", &turn.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
