//! Folder-based routing for automatic imports
//!
//! Recordings filed in a configured Otter folder go to that folder's
//! target block with that folder's outline variant. Everything else,
//! including recordings without a folder, uses the defaults. Manual
//! imports never consult the rules.

use crate::otter::Folder;
use crate::outline::OutlineVariant;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where recordings from one Otter folder are imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct DestinationRule {
    pub(crate) folder_id: i64,
    /// Parent block uid
    pub(crate) target: String,
    #[serde(default)]
    pub(crate) variant: OutlineVariant,
}

/// Pick the target and variant for a recording's folder.
pub(crate) fn resolve<'a>(
    folder: Option<&Folder>,
    rules: &'a [DestinationRule],
    default_target: &'a str,
    default_variant: OutlineVariant,
) -> (&'a str, OutlineVariant) {
    let Some(folder) = folder else {
        return (default_target, default_variant);
    };

    rules
        .iter()
        .find(|rule| rule.folder_id == folder.id)
        .map(|rule| (rule.target.as_str(), rule.variant))
        .unwrap_or((default_target, default_variant))
}

/// Validated rule table loaded from preferences
#[derive(Debug, Clone, Default)]
pub(crate) struct DestinationTable {
    rules: Vec<DestinationRule>,
    default_variant: OutlineVariant,
}

impl DestinationTable {
    /// Build a table, rejecting folders with more than one rule.
    pub(crate) fn new(
        rules: Vec<DestinationRule>,
        default_variant: OutlineVariant,
    ) -> Result<Self, DestinationError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.folder_id) {
                return Err(DestinationError::DuplicateRule(rule.folder_id));
            }
        }
        Ok(Self {
            rules,
            default_variant,
        })
    }

    /// Route an automatic import; `default_target` is the sweep's target.
    pub(crate) fn route(
        &self,
        folder: Option<&Folder>,
        default_target: &str,
    ) -> (String, OutlineVariant) {
        let (target, variant) = resolve(folder, &self.rules, default_target, self.default_variant);
        (target.to_string(), variant)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DestinationError {
    #[error("Folder {0} has more than one destination rule")]
    DuplicateRule(i64),
}
