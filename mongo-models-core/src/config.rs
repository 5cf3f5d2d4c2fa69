//! Connection and registration settings.
//!
//! Hosts usually load a [`PluginConfig`] from JSON:
//!
//! ```json
//! {
//!     "mongodb": { "uri": "mongodb://localhost:27017/", "database": "app" },
//!     "autoIndex": false
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::env;

use crate::error::ModelResult;

/// Default connection string used when `MONGODB_URI` is unset.
pub const DEFAULT_URI: &str = "mongodb://localhost:27017/";

/// Default database used when `MONGODB_DATABASE` is unset.
pub const DEFAULT_DATABASE: &str = "test";

/// Where and how to connect.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    /// Connection string.
    pub uri: String,
    /// Database holding every model's collection.
    pub database: String,
    /// Application name reported to the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    /// Upper bound on pooled connections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pool_size: Option<u32>,
}

impl ConnectionConfig {
    /// Creates a configuration for the given connection string and database.
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            app_name: None,
            max_pool_size: None,
        }
    }

    /// Reads `MONGODB_URI` and `MONGODB_DATABASE`, falling back to [`DEFAULT_URI`] and
    /// [`DEFAULT_DATABASE`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::new(
            lookup("MONGODB_URI").unwrap_or_else(|| DEFAULT_URI.to_string()),
            lookup("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
        )
    }

    /// Sets the application name reported to the server.
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Caps the number of pooled connections.
    pub fn with_max_pool_size(mut self, max_pool_size: u32) -> Self {
        self.max_pool_size = Some(max_pool_size);
        self
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URI, DEFAULT_DATABASE)
    }
}

/// Registration behavior.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryOptions {
    /// Create declared indexes before the host starts. Defaults to `true`.
    #[serde(default = "enabled")]
    pub auto_index: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self { auto_index: true }
    }
}

/// Full host configuration: the connection plus registration options.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    #[serde(default)]
    pub mongodb: ConnectionConfig,
    #[serde(default = "enabled")]
    pub auto_index: bool,
}

impl PluginConfig {
    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Serialization`](crate::error::ModelError::Serialization) for
    /// malformed input.
    pub fn from_json(input: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// The registration options carried by this configuration.
    pub fn registry_options(&self) -> RegistryOptions {
        RegistryOptions { auto_index: self.auto_index }
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            mongodb: ConnectionConfig::default(),
            auto_index: true,
        }
    }
}

fn enabled() -> bool {
    true
}
