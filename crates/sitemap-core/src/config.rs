//! Writer configuration.
//!
//! The configuration surface is deliberately small: the target directory
//! for output files and two optional location prefixes. Unknown keys are
//! rejected during deserialization, and an empty target directory is
//! rejected when the writer is constructed.
//!
//! ## Examples
//!
//! ```rust
//! use sitemap_core::WriterConfig;
//!
//! let config = WriterConfig::from_toml_str(
//!     r#"
//!     targetDirectory = "/var/www/sitemaps"
//!     urlLocationPrefix = "https://example.com"
//!     "#,
//! )?;
//! assert_eq!(config.url_location_prefix, "https://example.com");
//! # Ok::<(), sitemap_core::Error>(())
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{Error, Result};

/// Configuration for a [`SitemapWriter`](crate::SitemapWriter).
///
/// Key names follow the camelCase convention of the serialized form;
/// unrecognized keys fail deserialization with a configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WriterConfig {
    /// Root directory for output files; created recursively if missing.
    pub target_directory: PathBuf,

    /// Prefix prepended to sitemap filenames when building the `<loc>`
    /// entries of the index file. Supports hosting sitemaps at a different
    /// public URL than their filesystem path. Empty means "use the
    /// filename unchanged".
    #[serde(default)]
    pub sitemap_location_prefix: String,

    /// Prefix prepended to each entry's location when writing `<loc>`
    /// inside sitemap files. Empty means "use the location unchanged".
    #[serde(default)]
    pub url_location_prefix: String,
}

impl WriterConfig {
    /// Create a configuration with no location prefixes.
    pub fn new(target_directory: impl Into<PathBuf>) -> Self {
        Self {
            target_directory: target_directory.into(),
            sitemap_location_prefix: String::new(),
            url_location_prefix: String::new(),
        }
    }

    /// Parse a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed TOML, a missing
    /// `targetDirectory`, or any unrecognized key.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse writer config: {e}")))
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the target directory is empty.
    pub fn validate(&self) -> Result<()> {
        if self.target_directory.as_os_str().is_empty() {
            return Err(Error::Config(
                "targetDirectory must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
