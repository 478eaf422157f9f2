//! Streaming sitemap generation with automatic pagination.
//!
//! [`SitemapWriter`] consumes a lazy, finite, single-pass sequence of
//! [`UrlEntry`] values and produces one or more sitemap XML files plus a
//! single index file in a configured target directory. Two hard limits of
//! the sitemaps.org protocol drive the pagination: at most
//! [`MAX_URLS_PER_FILE`] entries per file and at most [`MAX_BYTES_PER_FILE`]
//! bytes of XML content per file. The writer pulls one record at a time,
//! emits indented XML incrementally, and splits to the next file exactly
//! when a limit is crossed — no record is ever dropped, duplicated, or
//! reordered.
//!
//! While streaming, the writer tracks the most recent modification time
//! seen in each file; the index file reports that timestamp per sitemap.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sitemap_core::{SitemapWriter, UrlEntry, WriterConfig};
//!
//! let writer = SitemapWriter::new(WriterConfig::new("/var/www/sitemaps"))?;
//! let entries = (0..3).map(|i| UrlEntry::new(format!("https://example.com/page/{i}")));
//! let report = writer.generate(entries)?;
//!
//! assert_eq!(report.sitemaps.len(), 1);
//! # Ok::<(), sitemap_core::Error>(())
//! ```
//!
//! ## Failure semantics
//!
//! Errors abort generation immediately: sitemap files flushed before the
//! failure stay on disk, but no index file is written, so the output set is
//! incomplete and the caller must clean it up. There is no internal retry.
//! All per-call counters live in a session value created inside
//! [`SitemapWriter::generate`], so a failed call cannot poison a later one
//! and a successful call always starts the next one back at file index 0.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use quick_xml::Writer as XmlWriter;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::{Result, UrlEntry, WriterConfig};

/// XML namespace shared by sitemap and sitemap index documents.
pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Maximum number of URL entries per sitemap file (protocol limit).
pub const MAX_URLS_PER_FILE: u64 = 50_000;

/// Maximum bytes of XML content per sitemap file.
///
/// A file may exceed this by at most one entry: the limit check runs
/// after each record is written, never before.
pub const MAX_BYTES_PER_FILE: u64 = 49 * 1024 * 1024;

/// Fixed name of the sitemap index file.
pub const INDEX_FILE_NAME: &str = "sitemap_index.xml";

/// Deterministic filename for the sitemap file at a zero-based index.
#[must_use]
pub fn sitemap_file_name(index: usize) -> String {
    format!("sitemap_{index}.xml")
}

/// Join a location prefix and a value with exactly one `/`.
///
/// An empty prefix leaves the value unchanged. Otherwise trailing slashes
/// are stripped from the prefix and leading slashes from the value, so
/// `"https://cdn.example.com"` + `"/a/b"` becomes
/// `"https://cdn.example.com/a/b"` without a double slash.
fn join_location(prefix: &str, value: &str) -> String {
    if prefix.is_empty() {
        return value.to_string();
    }
    let prefix = prefix.trim_end_matches('/');
    let value = value.trim_start_matches('/');
    format!("{prefix}/{value}")
}

/// `io::Write` adapter that counts every byte passing through it.
///
/// Sits between the XML writer and the buffered file so the pagination
/// loop can read the exact number of XML bytes emitted to the current
/// file after each record.
struct CountingWriter<W> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    const fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    const fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.bytes += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Write `<name>text</name>` with text escaping.
fn write_text_element<W: Write>(xml: &mut XmlWriter<W>, name: &str, text: &str) -> io::Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// A sitemap file currently being streamed.
///
/// At most one of these exists at any instant; it is flushed and closed
/// before the next file opens.
struct OpenSitemap {
    index: usize,
    path: PathBuf,
    xml: XmlWriter<CountingWriter<BufWriter<File>>>,
}

impl OpenSitemap {
    /// Create the file for `index` and emit the document preamble.
    fn open(dir: &Path, index: usize) -> Result<Self> {
        let path = dir.join(sitemap_file_name(index));
        let file = File::create(&path)?;
        let mut xml = XmlWriter::new_with_indent(CountingWriter::new(BufWriter::new(file)), b' ', 2);

        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut root = BytesStart::new("urlset");
        root.push_attribute(("xmlns", SITEMAP_NAMESPACE));
        xml.write_event(Event::Start(root))?;

        debug!(file = %path.display(), index, "opened sitemap file");
        Ok(Self { index, path, xml })
    }

    /// Emit one `<url>` element.
    ///
    /// Child element order is fixed by the protocol: `<loc>`, then the
    /// optional `<lastmod>`, `<changefreq>`, and `<priority>`; absent
    /// fields are omitted entirely.
    fn write_entry(&mut self, entry: &UrlEntry, url_prefix: &str) -> Result<()> {
        self.xml.write_event(Event::Start(BytesStart::new("url")))?;

        let loc = join_location(url_prefix, entry.location());
        write_text_element(&mut self.xml, "loc", &loc)?;
        if let Some(lastmod) = entry.last_modified_string() {
            write_text_element(&mut self.xml, "lastmod", &lastmod)?;
        }
        if let Some(freq) = entry.change_frequency() {
            write_text_element(&mut self.xml, "changefreq", freq.as_str())?;
        }
        if let Some(priority) = entry.priority_string() {
            write_text_element(&mut self.xml, "priority", &priority)?;
        }

        self.xml.write_event(Event::End(BytesEnd::new("url")))?;
        Ok(())
    }

    /// Bytes of XML content written to this file so far.
    fn bytes_written(&mut self) -> u64 {
        self.xml.get_mut().bytes_written()
    }

    /// Close the `urlset` element, flush, and close the file.
    fn close(mut self) -> Result<()> {
        self.xml.write_event(Event::End(BytesEnd::new("urlset")))?;
        let mut counting = self.xml.into_inner();
        counting.flush()?;
        debug!(
            file = %self.path.display(),
            bytes = counting.bytes_written(),
            "closed sitemap file"
        );
        Ok(())
    }
}

/// Per-call pagination state.
///
/// Created inside [`SitemapWriter::generate`] and dropped when it returns,
/// so a fresh call always starts from file index 0 regardless of how the
/// previous call ended.
#[derive(Default)]
struct Session {
    /// Number of sitemap files opened so far; the current file, when one
    /// is open, has index `files_opened - 1`.
    files_opened: usize,
    /// Running total of URL entries written across all files.
    items_count: u64,
    /// Per-file maximum last-modified timestamp, keyed by file index.
    /// Absent when no entry in that file carried a timestamp.
    files_last_modified: BTreeMap<usize, DateTime<FixedOffset>>,
}

impl Session {
    fn note_last_modified(&mut self, file_index: usize, lastmod: DateTime<FixedOffset>) {
        self.files_last_modified
            .entry(file_index)
            .and_modify(|current| {
                if lastmod > *current {
                    *current = lastmod;
                }
            })
            .or_insert(lastmod);
    }
}

/// Summary of a completed generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateReport {
    /// Paths of the sitemap files produced, in index order.
    pub sitemaps: Vec<PathBuf>,
    /// Path of the index file, or `None` when the input was empty and
    /// nothing was written.
    pub index: Option<PathBuf>,
    /// Total number of URL entries written.
    pub urls_written: u64,
}

/// Streaming writer producing paginated sitemap files plus an index.
///
/// The writer itself only holds configuration; all mutable state of a run
/// lives in a per-call session, so a single instance can be reused for any
/// number of `generate` calls.
#[derive(Debug, Clone)]
pub struct SitemapWriter {
    config: WriterConfig,
}

impl SitemapWriter {
    /// Create a writer from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the target
    /// directory is empty.
    pub fn new(config: WriterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The writer's configuration.
    #[must_use]
    pub const fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Consume a fallible sequence of URL entries and write sitemap files
    /// plus the index file.
    ///
    /// Records are pulled one at a time, written in input order, and each
    /// lands in exactly one file. The current file is closed and the next
    /// one opened when the running entry total reaches a multiple of
    /// [`MAX_URLS_PER_FILE`] or the current file's byte count exceeds
    /// [`MAX_BYTES_PER_FILE`]. After the sequence is exhausted the index
    /// file is written, referencing every produced sitemap with its
    /// tracked maximum last-modified timestamp.
    ///
    /// An empty input writes nothing at all: no sitemap file and no index
    /// file.
    ///
    /// # Errors
    ///
    /// Propagates the first `Err` yielded by the producer and any I/O
    /// failure. On error, files already flushed stay on disk and no index
    /// file is written; the caller owns cleanup.
    #[instrument(skip_all, fields(target = %self.config.target_directory.display()))]
    pub fn generate<I>(&self, records: I) -> Result<GenerateReport>
    where
        I: IntoIterator<Item = Result<UrlEntry>>,
    {
        let mut session = Session::default();
        let mut current: Option<OpenSitemap> = None;

        for record in records {
            let entry = record?;

            let mut file = match current.take() {
                Some(file) => file,
                None => {
                    if session.files_opened == 0 {
                        fs::create_dir_all(&self.config.target_directory)?;
                    }
                    let file = OpenSitemap::open(&self.config.target_directory, session.files_opened)?;
                    session.files_opened += 1;
                    file
                },
            };

            file.write_entry(&entry, &self.config.url_location_prefix)?;
            session.items_count += 1;
            if let Some(lastmod) = entry.last_modified() {
                session.note_last_modified(file.index, lastmod);
            }

            // Post-write limit check: split on the global entry count or
            // on the current file's byte count.
            if session.items_count % MAX_URLS_PER_FILE == 0
                || file.bytes_written() > MAX_BYTES_PER_FILE
            {
                file.close()?;
            } else {
                current = Some(file);
            }
        }

        if let Some(file) = current {
            file.close()?;
        }

        if session.files_opened == 0 {
            debug!("input sequence was empty; no sitemap or index file written");
            return Ok(GenerateReport::default());
        }

        let index = self.write_index(&session)?;
        info!(
            files = session.files_opened,
            urls = session.items_count,
            "sitemap generation complete"
        );

        Ok(GenerateReport {
            sitemaps: (0..session.files_opened)
                .map(|i| self.config.target_directory.join(sitemap_file_name(i)))
                .collect(),
            index: Some(index),
            urls_written: session.items_count,
        })
    }

    /// Convenience wrapper over [`generate`](Self::generate) for producers
    /// that cannot fail.
    pub fn generate_from<I>(&self, records: I) -> Result<GenerateReport>
    where
        I: IntoIterator<Item = UrlEntry>,
    {
        self.generate(records.into_iter().map(Ok))
    }

    /// Write the `sitemapindex` document covering every produced file.
    fn write_index(&self, session: &Session) -> Result<PathBuf> {
        let path = self.config.target_directory.join(INDEX_FILE_NAME);
        let file = File::create(&path)?;
        let mut xml = XmlWriter::new_with_indent(BufWriter::new(file), b' ', 2);

        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        let mut root = BytesStart::new("sitemapindex");
        root.push_attribute(("xmlns", SITEMAP_NAMESPACE));
        xml.write_event(Event::Start(root))?;

        for index in 0..session.files_opened {
            xml.write_event(Event::Start(BytesStart::new("sitemap")))?;
            let loc = join_location(
                &self.config.sitemap_location_prefix,
                &sitemap_file_name(index),
            );
            write_text_element(&mut xml, "loc", &loc)?;
            if let Some(lastmod) = session.files_last_modified.get(&index) {
                write_text_element(
                    &mut xml,
                    "lastmod",
                    &lastmod.to_rfc3339_opts(SecondsFormat::Secs, true),
                )?;
            }
            xml.write_event(Event::End(BytesEnd::new("sitemap")))?;
        }

        xml.write_event(Event::End(BytesEnd::new("sitemapindex")))?;
        xml.into_inner().flush()?;

        debug!(file = %path.display(), entries = session.files_opened, "wrote sitemap index");
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::{ChangeFrequency, Error};
    use chrono::DateTime;
    use std::fs;
    use tempfile::TempDir;

    fn writer_for(dir: &TempDir) -> SitemapWriter {
        SitemapWriter::new(WriterConfig::new(dir.path())).unwrap()
    }

    fn entry(location: &str) -> UrlEntry {
        UrlEntry::new(location).unwrap()
    }

    #[test]
    fn test_join_location() {
        assert_eq!(join_location("", "/a/b"), "/a/b");
        assert_eq!(join_location("", "a/b"), "a/b");
        assert_eq!(
            join_location("https://cdn.example.com", "/a/b"),
            "https://cdn.example.com/a/b"
        );
        assert_eq!(
            join_location("https://cdn.example.com/", "a/b"),
            "https://cdn.example.com/a/b"
        );
        assert_eq!(
            join_location("https://cdn.example.com//", "//a/b"),
            "https://cdn.example.com/a/b"
        );
    }

    #[test]
    fn test_sitemap_file_names() {
        assert_eq!(sitemap_file_name(0), "sitemap_0.xml");
        assert_eq!(sitemap_file_name(12), "sitemap_12.xml");
    }

    #[test]
    fn test_counting_writer_tracks_bytes() {
        let mut counting = CountingWriter::new(Vec::new());
        counting.write_all(b"hello").unwrap();
        counting.write_all(b", world").unwrap();
        assert_eq!(counting.bytes_written(), 12);
    }

    #[test]
    fn test_rejects_empty_target_directory() {
        let result = SitemapWriter::new(WriterConfig::new(""));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_single_file_generation() {
        let dir = TempDir::new().unwrap();
        let writer = writer_for(&dir);

        let lastmod = DateTime::parse_from_rfc3339("2024-01-15T10:30:00Z").unwrap();
        let entries = vec![
            entry("https://example.com/a")
                .with_last_modified(lastmod)
                .with_change_frequency(ChangeFrequency::Weekly)
                .with_priority(0.8)
                .unwrap(),
            entry("https://example.com/b"),
        ];

        let report = writer.generate_from(entries).unwrap();
        assert_eq!(report.urls_written, 2);
        assert_eq!(report.sitemaps.len(), 1);

        let xml = fs::read_to_string(dir.path().join("sitemap_0.xml")).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"));
        assert!(xml.contains("<loc>https://example.com/a</loc>"));
        assert!(xml.contains("<lastmod>2024-01-15T10:30:00Z</lastmod>"));
        assert!(xml.contains("<changefreq>weekly</changefreq>"));
        assert!(xml.contains("<priority>0.8</priority>"));

        // Child order within <url> is loc, lastmod, changefreq, priority.
        let loc = xml.find("<loc>https://example.com/a").unwrap();
        let lastmod_pos = xml.find("<lastmod>").unwrap();
        let changefreq_pos = xml.find("<changefreq>").unwrap();
        let priority_pos = xml.find("<priority>").unwrap();
        assert!(loc < lastmod_pos && lastmod_pos < changefreq_pos && changefreq_pos < priority_pos);

        let index = fs::read_to_string(dir.path().join(INDEX_FILE_NAME)).unwrap();
        assert!(index.contains("<sitemapindex xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">"));
        assert!(index.contains("<loc>sitemap_0.xml</loc>"));
        assert!(index.contains("<lastmod>2024-01-15T10:30:00Z</lastmod>"));
    }

    #[test]
    fn test_optional_elements_are_omitted() {
        let dir = TempDir::new().unwrap();
        let writer = writer_for(&dir);

        writer
            .generate_from(vec![entry("https://example.com/bare")])
            .unwrap();

        let xml = fs::read_to_string(dir.path().join("sitemap_0.xml")).unwrap();
        assert!(!xml.contains("<lastmod>"));
        assert!(!xml.contains("<changefreq>"));
        assert!(!xml.contains("<priority>"));

        // No lastmod seen in the file, so the index omits it too.
        let index = fs::read_to_string(dir.path().join(INDEX_FILE_NAME)).unwrap();
        assert!(!index.contains("<lastmod>"));
    }

    #[test]
    fn test_empty_input_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let writer = writer_for(&dir);

        let report = writer.generate_from(Vec::new()).unwrap();
        assert_eq!(report, GenerateReport::default());
        assert!(!dir.path().join("sitemap_0.xml").exists());
        assert!(!dir.path().join(INDEX_FILE_NAME).exists());
    }

    #[test]
    fn test_url_location_prefix_applied() {
        let dir = TempDir::new().unwrap();
        let mut config = WriterConfig::new(dir.path());
        config.url_location_prefix = "https://cdn.example.com".to_string();
        let writer = SitemapWriter::new(config).unwrap();

        writer.generate_from(vec![entry("/a/b")]).unwrap();

        let xml = fs::read_to_string(dir.path().join("sitemap_0.xml")).unwrap();
        assert!(xml.contains("<loc>https://cdn.example.com/a/b</loc>"));
    }

    #[test]
    fn test_sitemap_location_prefix_applied_in_index() {
        let dir = TempDir::new().unwrap();
        let mut config = WriterConfig::new(dir.path());
        config.sitemap_location_prefix = "https://example.com/sitemaps/".to_string();
        let writer = SitemapWriter::new(config).unwrap();

        writer.generate_from(vec![entry("https://example.com/a")]).unwrap();

        let index = fs::read_to_string(dir.path().join(INDEX_FILE_NAME)).unwrap();
        assert!(index.contains("<loc>https://example.com/sitemaps/sitemap_0.xml</loc>"));
    }

    #[test]
    fn test_index_reports_max_lastmod_per_file() {
        let dir = TempDir::new().unwrap();
        let writer = writer_for(&dir);

        let t1 = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap();
        let t2 = DateTime::parse_from_rfc3339("2024-02-01T00:00:00Z").unwrap();
        let t3 = DateTime::parse_from_rfc3339("2024-03-01T00:00:00Z").unwrap();

        writer
            .generate_from(vec![
                entry("https://example.com/1").with_last_modified(t1),
                entry("https://example.com/2").with_last_modified(t3),
                entry("https://example.com/3"),
                entry("https://example.com/4").with_last_modified(t2),
            ])
            .unwrap();

        let index = fs::read_to_string(dir.path().join(INDEX_FILE_NAME)).unwrap();
        assert!(index.contains("<lastmod>2024-03-01T00:00:00Z</lastmod>"));
        assert!(!index.contains("2024-02-01"));
        assert!(!index.contains("2024-01-01"));
    }

    #[test]
    fn test_locations_are_xml_escaped() {
        let dir = TempDir::new().unwrap();
        let writer = writer_for(&dir);

        writer
            .generate_from(vec![entry("https://example.com/page?foo=1&bar=2")])
            .unwrap();

        let xml = fs::read_to_string(dir.path().join("sitemap_0.xml")).unwrap();
        assert!(xml.contains("<loc>https://example.com/page?foo=1&amp;bar=2</loc>"));
    }

    #[test]
    fn test_writer_is_reusable_after_success() {
        let dir = TempDir::new().unwrap();
        let writer = writer_for(&dir);

        writer.generate_from(vec![entry("https://example.com/a")]).unwrap();
        let report = writer
            .generate_from(vec![entry("https://example.com/b")])
            .unwrap();

        // Second run starts back at file index 0.
        assert_eq!(
            report.sitemaps,
            vec![dir.path().join("sitemap_0.xml")]
        );
        let xml = fs::read_to_string(dir.path().join("sitemap_0.xml")).unwrap();
        assert!(xml.contains("https://example.com/b"));
        assert!(!xml.contains("https://example.com/a"));
    }

    #[test]
    fn test_producer_error_aborts_without_index() {
        let dir = TempDir::new().unwrap();
        let writer = writer_for(&dir);

        let records = vec![
            Ok(entry("https://example.com/a")),
            Err(Error::InvalidRecord("not a URL entry".to_string())),
            Ok(entry("https://example.com/never-reached")),
        ];

        let result = writer.generate(records);
        assert!(matches!(result, Err(Error::InvalidRecord(_))));

        // The first file may remain on disk, but no index covers it.
        assert!(!dir.path().join(INDEX_FILE_NAME).exists());
    }

    #[test]
    fn test_io_error_propagates() {
        let dir = TempDir::new().unwrap();
        // A file where the target directory should be.
        let blocked = dir.path().join("blocked");
        fs::write(&blocked, b"").unwrap();

        let writer = SitemapWriter::new(WriterConfig::new(blocked.join("out"))).unwrap();
        let result = writer.generate_from(vec![entry("https://example.com/a")]);
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
