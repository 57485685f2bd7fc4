//! Imported recording registry
//!
//! Maps Otter recording ids to the uid of the block created for them.
//! All writes go through one async lock and re-read the stored
//! preferences before inserting their single key, so concurrent imports
//! never overwrite each other's entries.

use crate::preferences::{PreferencesError, PreferencesStore};
use std::collections::BTreeMap;
use tokio::sync::Mutex;
use tracing::debug;

pub(crate) struct ImportRegistry {
    store: PreferencesStore,
    write_lock: Mutex<()>,
}

impl ImportRegistry {
    pub(crate) fn new(store: PreferencesStore) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Current recording id -> block uid mapping
    pub(crate) fn snapshot(&self) -> Result<BTreeMap<String, String>, PreferencesError> {
        Ok(self.store.try_load()?.ids)
    }

    /// Associate a recording id with its block uid.
    pub(crate) async fn record(&self, id: &str, block_uid: &str) -> Result<(), PreferencesError> {
        let _guard = self.write_lock.lock().await;
        self.store.update(|prefs| {
            prefs.ids.insert(id.to_string(), block_uid.to_string());
        })?;
        debug!(id, block_uid, "Recorded imported recording");
        Ok(())
    }
}
