//! Core data types for sitemap entries.
//!
//! A [`UrlEntry`] is one `<url>` element of a sitemap: a required location
//! plus optional last-modified timestamp, change frequency, and priority.
//! Entries validate their fields at construction time, so a `UrlEntry` held
//! by the writer is always serializable without further checks.
//!
//! ## Quick Start
//!
//! ```rust
//! use sitemap_core::{ChangeFrequency, UrlEntry};
//!
//! let entry = UrlEntry::new("https://example.com/docs")?
//!     .with_change_frequency(ChangeFrequency::Weekly)
//!     .with_priority(0.8)?;
//!
//! assert_eq!(entry.priority_string().as_deref(), Some("0.8"));
//! # Ok::<(), sitemap_core::Error>(())
//! ```

use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Maximum number of Unicode characters allowed in a location.
///
/// The sitemap protocol caps `<loc>` values at 2048 characters. The limit
/// is measured in characters, not bytes.
pub const MAX_LOCATION_CHARS: usize = 2048;

/// Change frequency hints for a sitemap URL.
///
/// These values indicate how frequently a page is likely to change,
/// though consumers of the sitemap may not follow them strictly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    /// The page changes every time it is accessed.
    Always,
    /// The page changes hourly.
    Hourly,
    /// The page changes daily.
    Daily,
    /// The page changes weekly.
    Weekly,
    /// The page changes monthly.
    Monthly,
    /// The page changes yearly.
    Yearly,
    /// The page is archived and will not change.
    Never,
}

impl ChangeFrequency {
    /// The protocol token for this frequency (`"weekly"`, `"never"`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

impl std::fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChangeFrequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            "never" => Ok(Self::Never),
            _ => Err(Error::Validation(format!(
                "Invalid change frequency value: {s}"
            ))),
        }
    }
}

/// A single sitemap entry.
///
/// The location is fixed at construction; the optional fields are set with
/// the fluent `with_*` methods, which validate on assignment and return the
/// entry for chaining. Re-setting a field is permitted (last write wins).
///
/// Deserialization runs through the same validation as the constructors, so
/// an entry obtained from serde input upholds the same invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawUrlEntry", rename_all = "camelCase")]
pub struct UrlEntry {
    location: String,
    last_modified: Option<DateTime<FixedOffset>>,
    change_frequency: Option<ChangeFrequency>,
    priority: Option<f32>,
}

impl UrlEntry {
    /// Create an entry for the given location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the location is empty or longer
    /// than [`MAX_LOCATION_CHARS`] characters.
    pub fn new(location: impl Into<String>) -> Result<Self> {
        let location = location.into();
        if location.is_empty() {
            return Err(Error::Validation("Location must not be empty".to_string()));
        }
        let chars = location.chars().count();
        if chars > MAX_LOCATION_CHARS {
            return Err(Error::Validation(format!(
                "Location exceeds {MAX_LOCATION_CHARS} characters (got {chars})"
            )));
        }
        Ok(Self {
            location,
            last_modified: None,
            change_frequency: None,
            priority: None,
        })
    }

    /// Set the last modification time.
    #[must_use]
    pub const fn with_last_modified(mut self, lastmod: DateTime<FixedOffset>) -> Self {
        self.last_modified = Some(lastmod);
        self
    }

    /// Set the change frequency hint.
    ///
    /// Takes the typed enum; parsing a protocol token goes through
    /// [`ChangeFrequency::from_str`](std::str::FromStr), which rejects
    /// unknown values.
    #[must_use]
    pub const fn with_change_frequency(mut self, freq: ChangeFrequency) -> Self {
        self.change_frequency = Some(freq);
        self
    }

    /// Set the priority hint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] unless `priority` lies in the closed
    /// range `[0.0, 1.0]` (NaN is rejected).
    pub fn with_priority(mut self, priority: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&priority) {
            return Err(Error::Validation(format!(
                "Priority must be within [0.0, 1.0], got {priority}"
            )));
        }
        self.priority = Some(priority);
        Ok(self)
    }

    /// The location string, exactly as constructed.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// The last modification time, if set.
    #[must_use]
    pub const fn last_modified(&self) -> Option<DateTime<FixedOffset>> {
        self.last_modified
    }

    /// The last modification time in W3C date-time format, if set.
    #[must_use]
    pub fn last_modified_string(&self) -> Option<String> {
        self.last_modified
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    /// The change frequency hint, if set.
    #[must_use]
    pub const fn change_frequency(&self) -> Option<ChangeFrequency> {
        self.change_frequency
    }

    /// The raw priority value, if set.
    #[must_use]
    pub const fn priority(&self) -> Option<f32> {
        self.priority
    }

    /// The priority formatted for serialization, if set.
    ///
    /// Exactly one decimal digit, half-up rounding, `.` as the separator
    /// regardless of locale: `0.5`, `1.0`, `0.0`.
    #[must_use]
    pub fn priority_string(&self) -> Option<String> {
        self.priority.map(format_priority)
    }
}

/// Format a validated priority to one decimal digit with half-up rounding.
fn format_priority(priority: f32) -> String {
    let tenths = (f64::from(priority) * 10.0).round();
    // Adding 0.0 collapses a negative-zero input to plain zero so the
    // output never carries a sign.
    format!("{:.1}", tenths / 10.0 + 0.0)
}

/// Serde mirror of [`UrlEntry`] used to validate deserialized input.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUrlEntry {
    location: String,
    #[serde(default)]
    last_modified: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    change_frequency: Option<ChangeFrequency>,
    #[serde(default)]
    priority: Option<f32>,
}

impl TryFrom<RawUrlEntry> for UrlEntry {
    type Error = Error;

    fn try_from(raw: RawUrlEntry) -> Result<Self> {
        let mut entry = Self::new(raw.location)?;
        if let Some(lastmod) = raw.last_modified {
            entry = entry.with_last_modified(lastmod);
        }
        if let Some(freq) = raw.change_frequency {
            entry = entry.with_change_frequency(freq);
        }
        if let Some(priority) = raw.priority {
            entry = entry.with_priority(priority)?;
        }
        Ok(entry)
    }
}
