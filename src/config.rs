//! Library configuration: the default digest algorithm.
//!
//! The default is threaded explicitly into record and collector constructors
//! rather than read from a process-wide global.

use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::checksum::ChecksumType;
use crate::error::MetadataError;

/// Configuration consulted when no explicit checksum type is supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Registered digest algorithm name used as the default checksum type.
    #[serde(default = "default_digest_algorithm")]
    pub digest_algorithm: String,
}

fn default_digest_algorithm() -> String {
    "sha256".to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            digest_algorithm: default_digest_algorithm(),
        }
    }
}

impl CoreConfig {
    /// Load configuration from an optional TOML file with an `FSMETA_*`
    /// environment overlay (environment wins).
    ///
    /// An unregistered algorithm name fails here, not at first use.
    pub fn load(file: Option<&Path>) -> Result<Self, MetadataError> {
        let mut builder = Config::builder()
            .set_default("digest_algorithm", default_digest_algorithm())
            .map_err(config_error)?;
        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }
        let builder = builder.add_source(
            Environment::with_prefix("FSMETA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let cfg: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error)?;
        cfg.digest_algorithm.parse::<ChecksumType>()?;
        Ok(cfg)
    }

    /// The configured default as a registry value.
    pub fn default_checksum_type(&self) -> Result<ChecksumType, MetadataError> {
        self.digest_algorithm.parse()
    }
}

fn config_error(err: ConfigError) -> MetadataError {
    MetadataError::Config(err.to_string())
}
