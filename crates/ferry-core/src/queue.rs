//! Outbound queue.
//!
//! Ordered collection of files waiting to be sent. Pure membership bookkeeping:
//! no I/O, and file contents are never read here.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use bytes::Bytes;

use crate::ids::{IdGenerator, ItemId};

/// Where the bytes of a [`FileHandle`] live.
#[derive(Clone, PartialEq, Eq)]
pub enum FileSource {
    /// File on the local filesystem, read when its turn comes.
    Path(PathBuf),
    /// Content already materialized by the capture layer.
    Memory(Bytes),
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
        }
    }
}

/// Opaque handle to a user-selected file.
///
/// The core only reads the name and declared content type; the driver turns
/// the source into bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    name: String,
    content_type: Option<String>,
    source: FileSource,
}

impl FileHandle {
    /// Handle to a file on disk, named after the last path component.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Self { name, content_type: None, source: FileSource::Path(path) }
    }

    /// Handle to content that is already in memory.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self { name: name.into(), content_type: None, source: FileSource::Memory(bytes.into()) }
    }

    /// Attach a declared content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// File name presented to the peer.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared content type. `None` if unknown.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Where the content lives.
    pub fn source(&self) -> &FileSource {
        &self.source
    }

    /// Filesystem path. `None` for in-memory content.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Path(path) => Some(path),
            FileSource::Memory(_) => None,
        }
    }
}

/// Queued file with its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundItem {
    /// Identifier assigned at enqueue time.
    pub id: ItemId,
    /// File to send.
    pub handle: FileHandle,
}

/// Ordered collection of pending send items.
///
/// # Invariants
///
/// - Items keep enqueue order.
/// - Identifiers are unique within the queue (monotonic generator).
#[derive(Debug, Clone, Default)]
pub struct OutboundQueue {
    items: Vec<OutboundItem>,
    ids: IdGenerator,
}

impl OutboundQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append each handle with a fresh identifier.
    ///
    /// Never rejects and never deduplicates: the same file queued twice is
    /// sent twice.
    pub fn enqueue(&mut self, handles: impl IntoIterator<Item = FileHandle>) -> Vec<ItemId> {
        handles
            .into_iter()
            .map(|handle| {
                let id = self.ids.next();
                self.items.push(OutboundItem { id, handle });
                id
            })
            .collect()
    }

    /// Remove the matching entry. `None` if it was not queued.
    pub fn remove(&mut self, id: ItemId) -> Option<OutboundItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Current contents, for the executor to consume. Does not clear.
    pub fn drain_snapshot(&self) -> Vec<OutboundItem> {
        self.items.clone()
    }

    /// Queued items in enqueue order.
    pub fn items(&self) -> &[OutboundItem] {
        &self.items
    }

    /// Look up a queued item.
    pub fn get(&self, id: ItemId) -> Option<&OutboundItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Number of queued items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Queue has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
