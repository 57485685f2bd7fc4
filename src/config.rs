//! Application configuration
//!
//! Static settings embedded from `config.toml` at build time: the Otter
//! proxy endpoint, request timeouts and page sizes. User-editable settings
//! live in [`crate::preferences`].

use serde::Deserialize;

const CONFIG_TOML: &str = include_str!("../config.toml");

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AppConfig {
    pub(crate) api: ApiConfig,
    pub(crate) sweep: SweepConfig,
    pub(crate) dialog: DialogConfig,
}

/// Otter proxy endpoint
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiConfig {
    pub(crate) base_url: String,
    pub(crate) path: String,
    pub(crate) timeout_secs: u64,
    pub(crate) connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SweepConfig {
    /// Number of recordings requested per sweep
    pub(crate) page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DialogConfig {
    /// Number of recordings shown per dialog page
    pub(crate) page_size: usize,
}

/// Load configuration from embedded config.toml
pub(crate) fn load_config() -> Result<AppConfig, toml::de::Error> {
    toml::from_str(CONFIG_TOML)
}
