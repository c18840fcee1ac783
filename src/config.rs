//! Store Configuration
//!
//! Declarative [`ParamStore`](crate::ParamStore) options, usually kept in a
//! TOML file next to the application:
//!
//! ```toml
//! prefix = "prod/app"
//! tag = "ssm"
//! parse_duration = true
//! parse_number = true
//! time_layout = "rfc3339"
//! ```
//!
//! ## Priority Order (highest to lowest)
//!
//! 1. Environment variables (`PARAMSTORE_PREFIX`, `PARAMSTORE_TAG`)
//! 2. Config file
//! 3. Defaults

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BindError, Result};
use crate::store::{ParamStore, ParamStoreBuilder};

pub const ENV_PREFIX: &str = "PARAMSTORE_PREFIX";
pub const ENV_TAG: &str = "PARAMSTORE_TAG";

/// Store options as written in a config file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// Key prefix (normalized when applied)
    pub prefix: Option<String>,

    /// Annotation name (`ssm` when unset)
    pub tag: Option<String>,

    /// Enable the duration converter
    pub parse_duration: bool,

    /// Enable the number converter
    pub parse_number: bool,

    /// Enable the timestamp converter with this layout
    /// (`rfc3339`, `rfc2822` or a strftime format)
    pub time_layout: Option<String>,
}

impl StoreConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BindError::Config {
            reason: format!("Failed to parse config: {}", e),
        })
    }

    /// Load configuration from file
    ///
    /// Returns default config if file doesn't exist.
    /// Returns error if file exists but is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| BindError::Config {
            reason: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Merge with environment variables
    ///
    /// Environment variables take precedence over config file values.
    pub fn with_env(self) -> Self {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(prefix) = var(ENV_PREFIX) {
            self.prefix = Some(prefix);
        }
        if let Some(tag) = var(ENV_TAG).filter(|t| !t.is_empty()) {
            self.tag = Some(tag);
        }
        self
    }

    /// Builder with these options applied; add a source and build
    pub fn builder(&self) -> ParamStoreBuilder {
        let mut builder = ParamStore::builder();
        if let Some(prefix) = &self.prefix {
            builder = builder.with_prefix(prefix);
        }
        if let Some(tag) = &self.tag {
            builder = builder.with_tag(tag.clone());
        }
        if self.parse_duration {
            builder = builder.with_parse_duration();
        }
        if let Some(layout) = &self.time_layout {
            builder = builder.with_parse_time(layout.as_str());
        }
        if self.parse_number {
            builder = builder.with_parse_number();
        }
        builder
    }
}
