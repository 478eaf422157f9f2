//! # sitemap-core
//!
//! Streaming generation of sitemaps.org XML files with automatic pagination.
//!
//! This crate turns a lazy, finite sequence of URL entries into one or more
//! standards-compliant sitemap files plus a single index file, honoring the
//! protocol's hard limits of 50,000 entries and 49 MiB of XML per file.
//! Records are pulled one at a time and written incrementally, so inputs of
//! any size stream through in constant memory.
//!
//! ## Architecture
//!
//! - **Types**: [`UrlEntry`] and [`ChangeFrequency`], self-validating value
//!   objects for one `<url>` element
//! - **Configuration**: [`WriterConfig`], the writer's small option surface
//! - **Writer**: [`SitemapWriter`], the pagination loop, XML emission, and
//!   index construction
//! - **Error Handling**: a single [`Error`] enum; everything propagates,
//!   nothing is retried
//!
//! ## Quick Start
//!
//! ```no_run
//! use sitemap_core::{SitemapWriter, UrlEntry, WriterConfig};
//!
//! let writer = SitemapWriter::new(WriterConfig::new("/var/www/sitemaps"))?;
//!
//! // Any single-pass producer works: an in-memory list, a database
//! // cursor, or a generator-style iterator.
//! let entries = (0..200_000).map(|i| UrlEntry::new(format!("https://example.com/p/{i}")));
//! let report = writer.generate(entries)?;
//!
//! println!(
//!     "{} URLs across {} files",
//!     report.urls_written,
//!     report.sitemaps.len()
//! );
//! # Ok::<(), sitemap_core::Error>(())
//! ```
//!
//! ## Concurrency
//!
//! Generation is single-threaded, synchronous, and pull-based. Each call to
//! [`SitemapWriter::generate`] owns its own session state, so a writer
//! instance can be reused freely; concurrent calls against the same target
//! directory would race on the output files and are the caller's
//! responsibility to serialize.

/// Writer configuration
pub mod config;
/// Error types and result aliases
pub mod error;
/// URL entry value objects
pub mod types;
/// Streaming sitemap writer with pagination
pub mod writer;

// Re-export commonly used types
pub use config::WriterConfig;
pub use error::{Error, Result};
pub use types::{ChangeFrequency, MAX_LOCATION_CHARS, UrlEntry};
pub use writer::{
    GenerateReport, INDEX_FILE_NAME, MAX_BYTES_PER_FILE, MAX_URLS_PER_FILE, SITEMAP_NAMESPACE,
    SitemapWriter, sitemap_file_name,
};
