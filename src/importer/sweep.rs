//! Auto-import sweep
//!
//! Imports every processed recording on the newest page of the listing
//! that has not been imported before. Imports run concurrently and the
//! sweep reports each one separately.

use super::{ImportMode, ImportOutcome, ImportRequest, Importer};
use crate::error::ImportError;
use crate::otter::RecordingSummary;
use chrono::{DateTime, Duration, TimeZone, Utc};
use futures_util::future::join_all;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SweepSettings {
    pub(crate) page_size: u32,
    /// Skip recordings younger than this many hours
    pub(crate) min_age_hours: Option<u64>,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            min_age_hours: None,
        }
    }
}

/// Per-recording results of one sweep
#[derive(Debug, Default)]
pub(crate) struct SweepReport {
    pub(crate) imported: Vec<ImportOutcome>,
    pub(crate) failed: Vec<(String, ImportError)>,
    pub(crate) skipped_unprocessed: usize,
    pub(crate) skipped_imported: usize,
    pub(crate) skipped_recent: usize,
}

impl SweepReport {
    /// Number of recordings imported
    pub(crate) fn count(&self) -> usize {
        self.imported.len()
    }
}

/// Recordings a sweep should import, in listing order.
struct Selection<'a> {
    chosen: Vec<&'a RecordingSummary>,
    skipped_unprocessed: usize,
    skipped_imported: usize,
    skipped_recent: usize,
}

fn select_for_sweep<'a>(
    speeches: &'a [RecordingSummary],
    imported: &BTreeMap<String, String>,
    min_age_hours: Option<u64>,
    now: DateTime<Utc>,
) -> Selection<'a> {
    let cutoff = min_age_hours.map(|hours| {
        i64::try_from(hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|age| now.checked_sub_signed(age))
            // Further back than any timestamp: every recording is too recent
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    });
    let mut selection = Selection {
        chosen: Vec::new(),
        skipped_unprocessed: 0,
        skipped_imported: 0,
        skipped_recent: 0,
    };

    for speech in speeches {
        if !speech.is_processed {
            selection.skipped_unprocessed += 1;
        } else if imported.contains_key(&speech.id) {
            selection.skipped_imported += 1;
        } else if is_newer_than(speech.created_at, cutoff) {
            selection.skipped_recent += 1;
        } else {
            selection.chosen.push(speech);
        }
    }
    selection
}

fn is_newer_than(created_at: i64, cutoff: Option<DateTime<Utc>>) -> bool {
    let Some(cutoff) = cutoff else {
        return false;
    };
    match Utc.timestamp_opt(created_at, 0).single() {
        Some(created) => created > cutoff,
        None => false,
    }
}

impl Importer {
    /// Import new processed recordings under `target`.
    ///
    /// Fails only when the listing, the registry snapshot or the child
    /// count cannot be read. Individual import failures land in the report.
    #[instrument(skip(self))]
    pub(crate) async fn sweep(&self, target: &str) -> Result<SweepReport, ImportError> {
        let page = self
            .list_recordings(Some(self.sweep.page_size), None)
            .await?;
        let imported = self.registry.snapshot()?;

        let selection = select_for_sweep(
            &page.speeches,
            &imported,
            self.sweep.min_age_hours,
            Utc::now(),
        );
        let base = self.graph.children_count(target).await?;

        info!(
            listed = page.speeches.len(),
            selected = selection.chosen.len(),
            base,
            "Starting sweep"
        );

        let cancel = CancellationToken::new();
        let imports = selection.chosen.iter().enumerate().map(|(i, speech)| {
            let request = ImportRequest {
                id: speech.id.clone(),
                target: target.to_string(),
                mode: ImportMode::Automatic,
                order: base + i,
            };
            let cancel = &cancel;
            async move {
                let id = request.id.clone();
                (id, self.import_one(request, cancel).await)
            }
        });

        let mut report = SweepReport {
            skipped_unprocessed: selection.skipped_unprocessed,
            skipped_imported: selection.skipped_imported,
            skipped_recent: selection.skipped_recent,
            ..Default::default()
        };
        for (id, result) in join_all(imports).await {
            match result {
                Ok(outcome) => report.imported.push(outcome),
                Err(e) => {
                    warn!(id = %id, error = %e, "Sweep import failed");
                    report.failed.push((id, e));
                }
            }
        }

        info!(
            imported = report.count(),
            failed = report.failed.len(),
            "Sweep complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{harness, TARGET};
    use super::*;
    use crate::error::OtterError;
    use crate::graph::Graph;
    use crate::otter::mock::{self, ScriptedSource};
    use crate::otter::ListPage;

    fn page(speeches: Vec<RecordingSummary>) -> ListPage {
        ListPage {
            speeches,
            is_end: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_selection_filters() {
        let speeches = vec![
            mock::summary("1", true),
            mock::summary("2", false),
            mock::summary("3", true),
        ];
        let mut imported = BTreeMap::new();
        imported.insert("3".to_string(), "uid000003".to_string());

        let selection = select_for_sweep(&speeches, &imported, None, Utc::now());
        let ids: Vec<&str> = selection.chosen.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
        assert_eq!(selection.skipped_unprocessed, 1);
        assert_eq!(selection.skipped_imported, 1);
    }

    #[test]
    fn test_selection_min_age() {
        let now = Utc.timestamp_opt(1_700_000_000 + 3600, 0).unwrap();
        let speeches = vec![mock::summary("1", true)];

        let recent = select_for_sweep(&speeches, &BTreeMap::new(), Some(24), now);
        assert!(recent.chosen.is_empty());
        assert_eq!(recent.skipped_recent, 1);

        let old_enough = select_for_sweep(&speeches, &BTreeMap::new(), Some(1), now);
        assert_eq!(old_enough.chosen.len(), 1);
    }

    #[test]
    fn test_selection_huge_min_age_skips_everything() {
        let speeches = vec![mock::summary("1", true)];
        for hours in [1 << 40, i64::MAX as u64, u64::MAX / 2, u64::MAX] {
            let selection =
                select_for_sweep(&speeches, &BTreeMap::new(), Some(hours), Utc::now());
            assert!(selection.chosen.is_empty(), "min age {} hours", hours);
            assert_eq!(selection.skipped_recent, 1);
        }
    }

    #[tokio::test]
    async fn test_sweep_imports_processed_in_order() {
        let source = ScriptedSource::new()
            .with_page(page(vec![
                mock::summary("1", true),
                mock::summary("2", false),
                mock::summary("3", true),
            ]))
            .with_detail("1", mock::detail("One"))
            .with_detail("2", mock::detail("Two"))
            .with_detail("3", mock::detail("Three"));
        let h = harness(source, vec![]);
        h.graph
            .create_block(TARGET, &crate::outline::OutlineNode::leaf("existing"), 0)
            .await
            .unwrap();

        let report = h.importer.sweep(TARGET).await.unwrap();

        assert_eq!(report.count(), 2);
        assert_eq!(report.skipped_unprocessed, 1);
        let mut orders: Vec<(String, usize)> = report
            .imported
            .iter()
            .map(|o| (o.id.clone(), o.order))
            .collect();
        orders.sort();
        assert_eq!(orders, vec![("1".to_string(), 1), ("3".to_string(), 2)]);

        let mut fetched = h.source.detail_calls();
        fetched.sort();
        assert_eq!(fetched, vec!["1".to_string(), "3".to_string()]);

        let ids = h.store.load().ids;
        assert_eq!(ids.len(), 2);
        assert_eq!(h.graph.children_count(TARGET).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_second_sweep_imports_nothing() {
        let listing = vec![mock::summary("1", true)];
        let source = ScriptedSource::new()
            .with_page(page(listing.clone()))
            .with_page(page(listing))
            .with_detail("1", mock::detail("One"));
        let h = harness(source, vec![]);

        assert_eq!(h.importer.sweep(TARGET).await.unwrap().count(), 1);
        let second = h.importer.sweep(TARGET).await.unwrap();

        assert_eq!(second.count(), 0);
        assert_eq!(second.skipped_imported, 1);
        assert_eq!(h.graph.children_count(TARGET).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_hide_others() {
        let source = ScriptedSource::new()
            .with_page(page(vec![
                mock::summary("1", true),
                mock::summary("gone", true),
            ]))
            .with_detail("1", mock::detail("One"));
        let h = harness(source, vec![]);

        let report = h.importer.sweep(TARGET).await.unwrap();

        assert_eq!(report.count(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "gone");
        assert!(matches!(
            report.failed[0].1,
            ImportError::Fetch(OtterError::ServerError { status: 404, .. })
        ));
        assert!(!h.store.load().ids.contains_key("gone"));
    }

    #[tokio::test]
    async fn test_list_failure_aborts_sweep() {
        let source = ScriptedSource::new().with_list_error(401, "Invalid Otter credentials");
        let h = harness(source, vec![]);

        let err = h.importer.sweep(TARGET).await.unwrap_err();

        assert_eq!(err.display_message(), "Invalid Otter credentials");
        assert!(h.source.detail_calls().is_empty());
    }
}
