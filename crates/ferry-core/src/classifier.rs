//! Inbound frame classification.
//!
//! Every frame received from the peer is routed here in arrival order. File
//! payloads are published into the session's [`BlobStore`] and recorded in the
//! file ledger; text messages are recorded in the text ledger with a display
//! timestamp derived from the sender's origination time. Frames of unknown
//! kind are dropped.

use std::{fmt::Write as _, num::NonZeroUsize};

use chrono::{DateTime, SecondsFormat, Utc};
use ferry_proto::{DEFAULT_CONTENT_TYPE, FileFrame, TextFrame, TransferFrame};

use crate::{
    blob::{Blob, BlobRef, BlobStore},
    error::BlobError,
    ids::{IdGenerator, RecordId},
    ledger::Ledger,
    record::{ReceivedFileRecord, ReceivedTextRecord},
};

/// Default display format for text timestamps (UTC).
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// Classifier configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// `chrono` format string for text timestamps.
    pub time_format: String,
    /// File ledger capacity. `None` keeps every record for the session.
    pub max_files: Option<NonZeroUsize>,
    /// Text ledger capacity. `None` keeps every record for the session.
    pub max_texts: Option<NonZeroUsize>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { time_format: DEFAULT_TIME_FORMAT.to_string(), max_files: None, max_texts: None }
    }
}

/// Ledger entry created for an accepted frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified {
    /// Appended to the file ledger.
    File(RecordId),
    /// Appended to the text ledger.
    Text(RecordId),
}

/// Routes inbound frames into the file and text ledgers.
///
/// # Invariants
///
/// - Each accepted frame appends exactly one record to exactly one ledger.
/// - Every live file record's reference resolves in [`Self::blobs`].
/// - Record identifiers are unique across both ledgers.
#[derive(Debug, Clone)]
pub struct InboundClassifier {
    config: ClassifierConfig,
    blobs: BlobStore,
    files: Ledger<ReceivedFileRecord>,
    texts: Ledger<ReceivedTextRecord>,
    ids: IdGenerator,
}

impl InboundClassifier {
    /// Create a classifier whose blob references are scoped to `scope`.
    pub fn new(scope: u64, config: ClassifierConfig) -> Self {
        Self {
            blobs: BlobStore::new(scope),
            files: Ledger::with_capacity(config.max_files),
            texts: Ledger::with_capacity(config.max_texts),
            ids: IdGenerator::new(),
            config,
        }
    }

    /// Classify one inbound frame.
    ///
    /// Returns `None` for frames of unknown kind.
    pub fn on_frame(&mut self, frame: TransferFrame) -> Option<Classified> {
        match frame {
            TransferFrame::File(file) => Some(Classified::File(self.accept_file(file))),
            TransferFrame::Text(text) => Some(Classified::Text(self.accept_text(text))),
            TransferFrame::Unknown => {
                tracing::debug!("dropping frame of unknown kind");
                None
            },
        }
    }

    fn accept_file(&mut self, file: FileFrame) -> RecordId {
        let actual = file.payload.len() as u64;
        if file.size != actual {
            tracing::warn!(
                name = %file.name,
                declared = file.size,
                actual,
                "declared size disagrees with payload"
            );
        }

        let content_type = if file.content_type.is_empty() {
            DEFAULT_CONTENT_TYPE.to_string()
        } else {
            file.content_type
        };

        let reference = self.blobs.publish(file.payload, content_type.clone());
        let id = self.ids.next();
        let record =
            ReceivedFileRecord { id, name: file.name, size: actual, reference, content_type };

        tracing::info!(%id, name = %record.name, size = record.size, "file received");

        if let Some(evicted) = self.files.append(record) {
            tracing::debug!(id = %evicted.id, "file ledger full, evicting oldest");
            self.blobs.release(&evicted.reference);
        }
        id
    }

    fn accept_text(&mut self, text: TextFrame) -> RecordId {
        let sent_at = text.sent_at();
        let timestamp = match sent_at {
            Some(at) => display_time(at, &self.config.time_format),
            None => {
                tracing::warn!(timestamp = %text.timestamp, "unparseable text timestamp");
                text.timestamp
            },
        };

        let id = self.ids.next();
        tracing::info!(%id, len = text.content.len(), "text received");

        let record = ReceivedTextRecord { id, content: text.content, timestamp, sent_at };
        if let Some(evicted) = self.texts.append(record) {
            tracing::debug!(id = %evicted.id, "text ledger full, evicting oldest");
        }
        id
    }

    /// Blob behind a file record's reference.
    ///
    /// # Errors
    ///
    /// `BlobError::NotFound` if the reference is no longer live.
    pub fn resolve(&self, reference: &BlobRef) -> Result<&Blob, BlobError> {
        self.blobs.resolve(reference)
    }

    /// Drop a file record and release its blob. Returns `false` if absent.
    pub fn evict_file(&mut self, id: RecordId) -> bool {
        match self.files.remove(id) {
            Some(record) => {
                self.blobs.release(&record.reference);
                true
            },
            None => false,
        }
    }

    /// Session teardown: drop every record and release every blob.
    pub fn clear(&mut self) {
        for record in self.files.drain() {
            self.blobs.release(&record.reference);
        }
        self.texts.drain().for_each(drop);

        let leaked = self.blobs.clear();
        debug_assert_eq!(leaked, 0, "blob without a file record");
    }

    /// File ledger.
    pub fn files(&self) -> &Ledger<ReceivedFileRecord> {
        &self.files
    }

    /// Text ledger.
    pub fn texts(&self) -> &Ledger<ReceivedTextRecord> {
        &self.texts
    }

    /// Session blob table.
    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }
}

/// Format `at` for display, falling back to RFC 3339 if the format string is
/// invalid.
fn display_time(at: DateTime<Utc>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", at.format(format)).is_err() {
        tracing::warn!(format, "invalid time format, using RFC 3339");
        return at.to_rfc3339_opts(SecondsFormat::Secs, true);
    }
    out
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use chrono::TimeZone;

    use super::*;

    fn classifier() -> InboundClassifier {
        InboundClassifier::new(42, ClassifierConfig::default())
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 5).unwrap()
    }

    #[test]
    fn file_frame_becomes_resolvable_record() {
        let mut classifier = classifier();
        let frame = TransferFrame::file("a.txt", Some("text/plain"), Bytes::from_static(b"hello"));

        let Some(Classified::File(id)) = classifier.on_frame(frame) else {
            panic!("expected a file record");
        };

        let record = classifier.files().get(id).unwrap();
        assert_eq!(record.name, "a.txt");
        assert_eq!(record.size, 5);
        assert_eq!(record.content_type, "text/plain");
        assert_eq!(classifier.resolve(&record.reference).unwrap().bytes.as_ref(), b"hello");
        assert!(classifier.texts().is_empty());
    }

    #[test]
    fn text_timestamp_comes_from_sender() {
        let mut classifier = classifier();
        let frame = TransferFrame::text("hello", noon());

        let Some(Classified::Text(id)) = classifier.on_frame(frame) else {
            panic!("expected a text record");
        };

        let record = classifier.texts().get(id).unwrap();
        assert_eq!(record.content, "hello");
        assert_eq!(record.timestamp, "12:30:05");
        assert_eq!(record.sent_at, Some(noon()));
        assert!(classifier.files().is_empty());
    }

    #[test]
    fn unparseable_timestamp_is_kept_verbatim() {
        let mut classifier = classifier();
        let frame = TransferFrame::Text(TextFrame {
            content: "hi".into(),
            timestamp: "yesterday".into(),
        });

        classifier.on_frame(frame);
        let record = classifier.texts().latest().unwrap();
        assert_eq!(record.timestamp, "yesterday");
        assert_eq!(record.sent_at, None);
    }

    #[test]
    fn custom_time_format() {
        let config =
            ClassifierConfig { time_format: "%Y-%m-%d %H:%M".into(), ..Default::default() };
        let mut classifier = InboundClassifier::new(1, config);

        classifier.on_frame(TransferFrame::text("hi", noon()));
        assert_eq!(classifier.texts().latest().unwrap().timestamp, "2024-01-01 12:30");
    }

    #[test]
    fn invalid_time_format_falls_back() {
        assert_eq!(display_time(noon(), "%Q"), "2024-01-01T12:30:05Z");
    }

    #[test]
    fn unknown_frame_is_ignored() {
        let mut classifier = classifier();

        assert_eq!(classifier.on_frame(TransferFrame::Unknown), None);
        assert!(classifier.files().is_empty());
        assert!(classifier.texts().is_empty());
    }

    #[test]
    fn empty_content_type_defaults() {
        let mut classifier = classifier();
        let frame = TransferFrame::File(FileFrame {
            name: "x".into(),
            size: 1,
            content_type: String::new(),
            payload: Bytes::from_static(b"x"),
        });

        classifier.on_frame(frame);
        assert_eq!(classifier.files().latest().unwrap().content_type, DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn eviction_releases_blob() {
        let config = ClassifierConfig { max_files: NonZeroUsize::new(1), ..Default::default() };
        let mut classifier = InboundClassifier::new(1, config);

        classifier.on_frame(TransferFrame::file("a", None, Bytes::from_static(b"a")));
        let first = classifier.files().latest().unwrap().reference;
        classifier.on_frame(TransferFrame::file("b", None, Bytes::from_static(b"b")));

        assert_eq!(classifier.files().len(), 1);
        assert!(classifier.resolve(&first).is_err());
        assert_eq!(classifier.blobs().len(), 1);
    }

    #[test]
    fn explicit_eviction_and_clear() {
        let mut classifier = classifier();
        let Some(Classified::File(id)) =
            classifier.on_frame(TransferFrame::file("a", None, Bytes::from_static(b"a")))
        else {
            panic!("expected a file record");
        };
        classifier.on_frame(TransferFrame::file("b", None, Bytes::from_static(b"b")));
        classifier.on_frame(TransferFrame::text("t", noon()));

        assert!(classifier.evict_file(id));
        assert!(!classifier.evict_file(id));
        assert_eq!(classifier.blobs().len(), 1);

        classifier.clear();
        assert!(classifier.files().is_empty());
        assert!(classifier.texts().is_empty());
        assert!(classifier.blobs().is_empty());
    }
}
