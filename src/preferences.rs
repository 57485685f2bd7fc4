//! User preferences storage
//!
//! Handles saving and loading user preferences to a JSON file
//! in the application config directory. The imported-id registry
//! is stored here as well, under `ids`.

use crate::destination::DestinationRule;
use crate::label::{DEFAULT_LABEL, DEFAULT_TEMPLATE};
use crate::outline::OutlineVariant;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// User preferences
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub(crate) struct Preferences {
    /// The email tied to the Otter account
    pub email: Option<String>,
    /// Format used for recording labels (see [`crate::label`])
    pub label: Option<String>,
    /// Format used for each transcript line by `show`
    pub template: Option<String>,
    /// Import the latest recordings on startup
    pub auto_import: Option<bool>,
    /// Block uid that startup sweeps write into
    pub default_destination: Option<String>,
    /// Outline variant when no destination rule matches
    pub default_variant: Option<OutlineVariant>,
    /// Folder-based routing for automatic imports
    #[serde(default)]
    pub destination_rules: Vec<DestinationRule>,
    /// Skip recordings younger than this many hours during sweeps
    pub sweep_min_age_hours: Option<u64>,
    /// Recording id -> uid of the block created for it
    #[serde(default)]
    pub ids: BTreeMap<String, String>,
}

impl Preferences {
    pub(crate) fn label_or_default(&self) -> &str {
        self.label
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(DEFAULT_LABEL)
    }

    pub(crate) fn template_or_default(&self) -> &str {
        self.template
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TEMPLATE)
    }

    pub(crate) fn auto_import_enabled(&self) -> bool {
        self.auto_import.unwrap_or(false)
    }

    pub(crate) fn default_variant(&self) -> OutlineVariant {
        self.default_variant.unwrap_or_default()
    }
}

/// Location of the preferences file
#[derive(Debug, Clone)]
pub(crate) struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub(crate) fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform config directory
    pub(crate) fn default_location() -> Result<Self, PreferencesError> {
        default_preferences_path()
            .map(Self::at)
            .ok_or(PreferencesError::NoConfigDir)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences, failing on unreadable or malformed files.
    ///
    /// A missing file yields the defaults.
    pub(crate) fn try_load(&self) -> Result<Preferences, PreferencesError> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }
        let contents = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Load preferences from disk
    ///
    /// Returns default preferences if the file doesn't exist or can't be read
    pub(crate) fn load(&self) -> Preferences {
        match self.try_load() {
            Ok(prefs) => prefs,
            Err(e) => {
                error!("Failed to load preferences from {:?}: {}", self.path, e);
                Preferences::default()
            }
        }
    }

    /// Save preferences to disk
    pub(crate) fn save(&self, prefs: &Preferences) -> Result<(), PreferencesError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
                info!("Created preferences directory: {:?}", parent);
            }
        }

        let json = serde_json::to_string_pretty(prefs)?;
        fs::write(&self.path, json)?;
        debug!("Saved preferences to: {:?}", self.path);

        Ok(())
    }

    /// Read-modify-write of the stored preferences
    pub(crate) fn update<F>(&self, f: F) -> Result<Preferences, PreferencesError>
    where
        F: FnOnce(&mut Preferences),
    {
        let mut prefs = self.try_load()?;
        f(&mut prefs);
        self.save(&prefs)?;
        Ok(prefs)
    }
}

/// Directory holding preferences and the local graph
pub(crate) fn app_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("OtterImport"))
}

fn default_preferences_path() -> Option<PathBuf> {
    app_config_dir().map(|d| d.join("preferences.json"))
}

/// Preferences errors
#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    #[error("Could not find config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
