//! File content loading shared by drivers.

use std::io;

use bytes::Bytes;
use ferry_core::{FileHandle, FileSource};

/// Read the full content behind a handle.
///
/// In-memory handles resolve immediately; path handles are read with
/// `tokio::fs`.
pub async fn read_handle(handle: &FileHandle) -> io::Result<Bytes> {
    match handle.source() {
        FileSource::Memory(bytes) => Ok(bytes.clone()),
        FileSource::Path(path) => {
            let content = tokio::fs::read(path).await?;
            tracing::debug!(path = %path.display(), len = content.len(), "file read");
            Ok(Bytes::from(content))
        },
    }
}
