//! Label formatting for recordings
//!
//! The `label` preference controls how a recording is described when
//! listed. Placeholders are matched case-insensitively:
//! `{title}`, `{summary}`, `{link}`, `{created-date}` (or
//! `{created-date:<strftime>}`), `{today}` and `{tomorrow}`.

use crate::roam_date;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::fmt::Display;

pub(crate) const DEFAULT_LABEL: &str = "{title} - {summary} ({created-date})";
pub(crate) const DEFAULT_TEMPLATE: &str = "{start} - {end} - {text}";

/// Format used for `{created-date}` without an explicit pattern
const DEFAULT_DATE_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

const CREATED_DATE: &str = "{created-date";

/// Fields a label can reference
#[derive(Debug, Clone, Copy)]
pub(crate) struct LabelFields<'a> {
    pub(crate) title: Option<&'a str>,
    pub(crate) summary: Option<&'a str>,
    pub(crate) created_at: i64,
    pub(crate) link: Option<&'a str>,
}

/// Replace every ASCII case-insensitive occurrence of `placeholder`.
pub(crate) fn replace_placeholder(haystack: &str, placeholder: &str, value: &str) -> String {
    if placeholder.is_empty() {
        return haystack.to_string();
    }
    // ASCII lowercasing keeps byte offsets aligned with the original
    let lowered = haystack.to_ascii_lowercase();
    let needle = placeholder.to_ascii_lowercase();

    let mut out = String::with_capacity(haystack.len());
    let mut cursor = 0;
    while let Some(found) = lowered[cursor..].find(&needle) {
        let start = cursor + found;
        out.push_str(&haystack[cursor..start]);
        out.push_str(value);
        cursor = start + needle.len();
    }
    out.push_str(&haystack[cursor..]);
    out
}

/// Render a label in the given time zone.
///
/// `now` anchors `{today}` and `{tomorrow}`.
pub(crate) fn render_label<Tz>(
    label: &str,
    fields: &LabelFields<'_>,
    tz: &Tz,
    now: DateTime<Utc>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let created = Utc
        .timestamp_opt(fields.created_at, 0)
        .single()
        .unwrap_or_default()
        .with_timezone(tz);

    let text = replace_placeholder(label, "{title}", fields.title.unwrap_or("Untitled"));
    let text = replace_placeholder(&text, "{summary}", fields.summary.unwrap_or(""));
    let text = replace_created_date(&text, &created);
    let text = replace_placeholder(&text, "{link}", fields.link.unwrap_or(""));

    let today = now.with_timezone(tz).date_naive();
    let tomorrow = today + Duration::days(1);
    let text = replace_placeholder(&text, "{today}", &roam_date::page_link(today));
    replace_placeholder(&text, "{tomorrow}", &roam_date::page_link(tomorrow))
}

/// Expand `{created-date}` and `{created-date:<pattern>}`.
///
/// Invalid patterns are left in place rather than rendered.
fn replace_created_date<Tz>(text: &str, created: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let lowered = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;

    while let Some(found) = lowered[cursor..].find(CREATED_DATE) {
        let start = cursor + found;
        let after = start + CREATED_DATE.len();
        let rest = &text[after..];

        let (pattern, consumed) = if rest.starts_with('}') {
            (None, 1)
        } else if let Some(spec) = rest.strip_prefix(':') {
            match spec.find('}') {
                Some(close) => (Some(&spec[..close]), close + 2),
                None => break,
            }
        } else {
            // Not a placeholder, keep scanning past it
            out.push_str(&text[cursor..after]);
            cursor = after;
            continue;
        };

        out.push_str(&text[cursor..start]);
        match format_date(created, pattern.unwrap_or(DEFAULT_DATE_FORMAT)) {
            Some(formatted) => out.push_str(&formatted),
            None => out.push_str(&text[start..after + consumed]),
        }
        cursor = after + consumed;
    }

    out.push_str(&text[cursor..]);
    out
}

fn format_date<Tz>(date: &DateTime<Tz>, pattern: &str) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let items: Vec<Item<'_>> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(date.format_with_items(items.into_iter()).to_string())
}
