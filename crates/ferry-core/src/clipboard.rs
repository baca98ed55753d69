//! Clipboard export with graceful degradation.
//!
//! Exporting an image walks a fallback chain: no clipboard at all reports
//! [`ExportOutcome::Unsupported`]; a clipboard that cannot take (or rejects)
//! structured binary content gets the blob opened in a viewer instead and
//! reports [`ExportOutcome::DegradedFallback`]. Only a failed fetch of the
//! blob itself is [`ExportOutcome::Failed`].

use std::future::Future;

use crate::{
    blob::{Blob, BlobRef, BlobSource},
    error::ClipboardError,
};

/// What the platform clipboard can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClipboardCapabilities {
    /// Any clipboard write is possible.
    pub write: bool,
    /// Typed binary content (images) can be written.
    pub structured: bool,
}

impl ClipboardCapabilities {
    /// Text and structured writes available.
    pub const FULL: Self = Self { write: true, structured: true };
    /// Plain text only.
    pub const TEXT_ONLY: Self = Self { write: true, structured: false };
    /// No clipboard.
    pub const NONE: Self = Self { write: false, structured: false };
}

/// Platform clipboard primitives.
///
/// Implementations do the actual platform work. Each method is a suspension
/// point of the export path.
pub trait Clipboard: Send {
    /// Capabilities, queried before every export.
    fn capabilities(&self) -> ClipboardCapabilities;

    /// Write typed binary content.
    fn write_binary(&mut self, blob: &Blob)
    -> impl Future<Output = Result<(), ClipboardError>> + Send;

    /// Write plain text.
    fn write_text(&mut self, text: &str) -> impl Future<Output = Result<(), ClipboardError>> + Send;

    /// Present the blob outside the clipboard so the user can copy it by
    /// hand.
    fn open_viewer(
        &mut self,
        reference: &BlobRef,
        blob: &Blob,
        name: &str,
    ) -> impl Future<Output = Result<(), ClipboardError>> + Send;
}

/// Result of an export request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Content is on the clipboard.
    Copied,
    /// Platform has no clipboard write capability.
    Unsupported,
    /// Structured write unavailable or failed; content opened in a viewer.
    DegradedFallback,
    /// Export failed.
    Failed {
        /// Error description.
        reason: String,
    },
}

/// Runs the export fallback chain against a clipboard and a blob source.
pub struct ClipboardExporter<'a, C, S> {
    clipboard: &'a mut C,
    source: &'a S,
}

impl<'a, C: Clipboard, S: BlobSource> ClipboardExporter<'a, C, S> {
    /// Create an exporter for one or more requests.
    pub fn new(clipboard: &'a mut C, source: &'a S) -> Self {
        Self { clipboard, source }
    }

    /// Copy the blob behind `reference` to the clipboard.
    ///
    /// Capability is checked before anything is fetched.
    pub async fn export_image(&mut self, reference: &BlobRef, display_name: &str) -> ExportOutcome {
        let capabilities = self.clipboard.capabilities();
        if !capabilities.write {
            tracing::debug!(%reference, "clipboard unsupported");
            return ExportOutcome::Unsupported;
        }

        let blob = match self.source.fetch(reference).await {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(%reference, error = %e, "blob fetch failed");
                return ExportOutcome::Failed { reason: e.to_string() };
            },
        };

        if capabilities.structured {
            match self.clipboard.write_binary(&blob).await {
                Ok(()) => {
                    tracing::debug!(%reference, name = display_name, "image copied");
                    return ExportOutcome::Copied;
                },
                Err(e) => {
                    tracing::warn!(%reference, error = %e, "structured write failed");
                },
            }
        }

        if let Err(e) = self.clipboard.open_viewer(reference, &blob, display_name).await {
            tracing::warn!(%reference, error = %e, "viewer fallback failed");
        }
        ExportOutcome::DegradedFallback
    }

    /// Copy plain text. No fallback chain.
    pub async fn export_text(&mut self, content: &str) -> ExportOutcome {
        if !self.clipboard.capabilities().write {
            return ExportOutcome::Failed {
                reason: ClipboardError::Unavailable("no clipboard".into()).to_string(),
            };
        }

        match self.clipboard.write_text(content).await {
            Ok(()) => ExportOutcome::Copied,
            Err(e) => {
                tracing::warn!(error = %e, "text write failed");
                ExportOutcome::Failed { reason: e.to_string() }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::blob::BlobStore;

    #[derive(Default)]
    struct FakeClipboard {
        capabilities: ClipboardCapabilities,
        fail_binary: bool,
        fail_text: bool,
        binary: Vec<Blob>,
        text: Vec<String>,
        viewed: Vec<String>,
    }

    impl Clipboard for FakeClipboard {
        fn capabilities(&self) -> ClipboardCapabilities {
            self.capabilities
        }

        async fn write_binary(&mut self, blob: &Blob) -> Result<(), ClipboardError> {
            if self.fail_binary {
                return Err(ClipboardError::Write("denied".into()));
            }
            self.binary.push(blob.clone());
            Ok(())
        }

        async fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
            if self.fail_text {
                return Err(ClipboardError::Write("denied".into()));
            }
            self.text.push(text.to_string());
            Ok(())
        }

        async fn open_viewer(
            &mut self,
            _reference: &BlobRef,
            _blob: &Blob,
            name: &str,
        ) -> Result<(), ClipboardError> {
            self.viewed.push(name.to_string());
            Ok(())
        }
    }

    fn store_with_image() -> (BlobStore, BlobRef) {
        let mut store = BlobStore::new(9);
        let reference = store.publish(Bytes::from_static(b"\x89PNG"), "image/png");
        (store, reference)
    }

    #[tokio::test]
    async fn full_clipboard_copies() {
        let (store, reference) = store_with_image();
        let mut clipboard =
            FakeClipboard { capabilities: ClipboardCapabilities::FULL, ..Default::default() };

        let outcome = ClipboardExporter::new(&mut clipboard, &store)
            .export_image(&reference, "cat.png")
            .await;

        assert_eq!(outcome, ExportOutcome::Copied);
        assert_eq!(clipboard.binary.len(), 1);
        assert!(clipboard.viewed.is_empty());
    }

    #[tokio::test]
    async fn text_only_clipboard_opens_viewer() {
        let (store, reference) = store_with_image();
        let mut clipboard =
            FakeClipboard { capabilities: ClipboardCapabilities::TEXT_ONLY, ..Default::default() };

        let outcome = ClipboardExporter::new(&mut clipboard, &store)
            .export_image(&reference, "cat.png")
            .await;

        assert_eq!(outcome, ExportOutcome::DegradedFallback);
        assert_eq!(clipboard.viewed, vec!["cat.png".to_string()]);
    }

    #[tokio::test]
    async fn failed_structured_write_degrades() {
        let (store, reference) = store_with_image();
        let mut clipboard = FakeClipboard {
            capabilities: ClipboardCapabilities::FULL,
            fail_binary: true,
            ..Default::default()
        };

        let outcome = ClipboardExporter::new(&mut clipboard, &store)
            .export_image(&reference, "cat.png")
            .await;

        assert_eq!(outcome, ExportOutcome::DegradedFallback);
    }

    #[tokio::test]
    async fn released_blob_fails() {
        let (mut store, reference) = store_with_image();
        store.release(&reference);
        let mut clipboard =
            FakeClipboard { capabilities: ClipboardCapabilities::FULL, ..Default::default() };

        let outcome = ClipboardExporter::new(&mut clipboard, &store)
            .export_image(&reference, "cat.png")
            .await;

        assert!(matches!(outcome, ExportOutcome::Failed { .. }));
        assert!(clipboard.viewed.is_empty());
    }

    #[tokio::test]
    async fn text_export() {
        let store = BlobStore::new(1);
        let mut clipboard =
            FakeClipboard { capabilities: ClipboardCapabilities::TEXT_ONLY, ..Default::default() };

        let outcome = ClipboardExporter::new(&mut clipboard, &store).export_text("hello").await;
        assert_eq!(outcome, ExportOutcome::Copied);
        assert_eq!(clipboard.text, vec!["hello".to_string()]);

        clipboard.fail_text = true;
        let outcome = ClipboardExporter::new(&mut clipboard, &store).export_text("again").await;
        assert!(matches!(outcome, ExportOutcome::Failed { .. }));
    }

    #[tokio::test]
    async fn text_export_without_clipboard_fails() {
        let store = BlobStore::new(1);
        let mut clipboard = FakeClipboard::default();

        let outcome = ClipboardExporter::new(&mut clipboard, &store).export_text("hello").await;
        assert!(matches!(outcome, ExportOutcome::Failed { .. }));
    }
}
