//! Session blob table.
//!
//! Received file payloads are published here and addressed by a [`BlobRef`],
//! which UIs use to render previews and the clipboard exporter uses to fetch
//! bytes. Each entry is owned by exactly one record and disappears when that
//! record releases it.

use std::{collections::HashMap, fmt, future::Future};

use bytes::Bytes;

use crate::error::BlobError;

const SCHEME: &str = "blob:ferry/";

/// Published reference to a blob.
///
/// The scope ties a reference to the session that published it; references
/// from a previous session never resolve against a new table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlobRef {
    scope: u64,
    index: u64,
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SCHEME}{:016x}/{}", self.scope, self.index)
    }
}

/// Bytes tagged with their content type.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    /// Raw content.
    pub bytes: Bytes,
    /// MIME type.
    pub content_type: String,
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Blob {
    /// Content type is an image MIME type.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Arena of published blobs for one session.
///
/// # Invariants
///
/// - Indices are never reused within a scope.
/// - A released index never resolves again.
#[derive(Debug, Clone)]
pub struct BlobStore {
    scope: u64,
    next_index: u64,
    entries: HashMap<u64, Blob>,
}

impl BlobStore {
    /// Create an empty table for the given session scope.
    pub fn new(scope: u64) -> Self {
        Self { scope, next_index: 0, entries: HashMap::new() }
    }

    /// Publish bytes and return their reference.
    pub fn publish(&mut self, bytes: Bytes, content_type: impl Into<String>) -> BlobRef {
        let index = self.next_index;
        self.next_index += 1;

        let blob = Blob { bytes, content_type: content_type.into() };
        tracing::trace!(
            index,
            len = blob.bytes.len(),
            content_type = %blob.content_type,
            "blob published"
        );
        self.entries.insert(index, blob);

        BlobRef { scope: self.scope, index }
    }

    /// Look up a published blob.
    ///
    /// # Errors
    ///
    /// `BlobError::NotFound` if the reference was released or belongs to
    /// another session.
    pub fn resolve(&self, reference: &BlobRef) -> Result<&Blob, BlobError> {
        if reference.scope != self.scope {
            return Err(BlobError::NotFound(*reference));
        }
        self.entries.get(&reference.index).ok_or(BlobError::NotFound(*reference))
    }

    /// Free a published blob. Returns `true` if it was live.
    pub fn release(&mut self, reference: &BlobRef) -> bool {
        if reference.scope != self.scope || self.entries.remove(&reference.index).is_none() {
            return false;
        }
        tracing::trace!(%reference, "blob released");
        true
    }

    /// Release every blob. Returns how many were freed.
    pub fn clear(&mut self) -> usize {
        let freed = self.entries.len();
        self.entries.clear();
        freed
    }

    /// Number of live blobs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No live blobs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Asynchronous access to the bytes behind a published reference.
///
/// Fetching is a suspension point of the export path; the in-memory
/// [`BlobStore`] resolves immediately.
pub trait BlobSource: Send + Sync {
    /// Fetch the blob behind `reference`.
    fn fetch(&self, reference: &BlobRef) -> impl Future<Output = Result<Blob, BlobError>> + Send;
}

impl BlobSource for BlobStore {
    async fn fetch(&self, reference: &BlobRef) -> Result<Blob, BlobError> {
        self.resolve(reference).cloned()
    }
}
