//! System clipboard through `arboard`.
//!
//! Text goes to the clipboard as-is. Images are decoded to RGBA first since
//! that is the only binary form the platform clipboards share; any other
//! content type is refused so the exporter falls back to the viewer. The
//! viewer fallback stages the blob in a temporary file and hands it to the
//! platform opener.

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    process::Stdio,
};

use arboard::ImageData;
use ferry_core::{Blob, BlobRef, Clipboard, ClipboardCapabilities, ClipboardError};
use tokio::process::Command;

/// Platform clipboard.
///
/// Holds the `arboard` handle for the life of the session; on X11 the
/// contents are only served while it exists.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl std::fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemClipboard").field("available", &self.is_available()).finish()
    }
}

impl SystemClipboard {
    /// Open the clipboard of this session.
    pub fn detect() -> Self {
        match arboard::Clipboard::new() {
            Ok(clipboard) => {
                tracing::info!("clipboard available");
                Self { inner: Some(clipboard) }
            },
            Err(e) => {
                tracing::warn!(error = %e, "clipboard unavailable");
                Self::unavailable()
            },
        }
    }

    /// A clipboard that cannot be written. Exports degrade accordingly.
    pub fn unavailable() -> Self {
        Self { inner: None }
    }

    /// Whether a platform clipboard was opened.
    pub fn is_available(&self) -> bool {
        self.inner.is_some()
    }

    fn require(&mut self) -> Result<&mut arboard::Clipboard, ClipboardError> {
        self.inner.as_mut().ok_or_else(|| ClipboardError::Unavailable("no clipboard".into()))
    }
}

impl Clipboard for SystemClipboard {
    fn capabilities(&self) -> ClipboardCapabilities {
        if self.is_available() { ClipboardCapabilities::FULL } else { ClipboardCapabilities::NONE }
    }

    async fn write_binary(&mut self, blob: &Blob) -> Result<(), ClipboardError> {
        if !blob.is_image() {
            return Err(ClipboardError::Unavailable(format!(
                "clipboard only takes images, not {}",
                blob.content_type
            )));
        }
        self.require()?;

        let bytes = blob.bytes.clone();
        let image = tokio::task::spawn_blocking(move || rgba(&bytes))
            .await
            .map_err(|e| ClipboardError::Write(e.to_string()))??;

        self.require()?.set_image(image).map_err(|e| ClipboardError::Write(e.to_string()))
    }

    async fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.require()?.set_text(text).map_err(|e| ClipboardError::Write(e.to_string()))
    }

    async fn open_viewer(
        &mut self,
        reference: &BlobRef,
        blob: &Blob,
        name: &str,
    ) -> Result<(), ClipboardError> {
        let path = stage(blob, name).await?;
        tracing::debug!(%reference, path = %path.display(), "opening viewer");

        let status = opener(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| ClipboardError::Open(e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::Open(format!("opener exited with {status}")))
        }
    }
}

/// Decode an encoded image into the RGBA form the clipboard takes.
pub fn rgba(bytes: &[u8]) -> Result<ImageData<'static>, ClipboardError> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| ClipboardError::Write(format!("undecodable image: {e}")))?
        .to_rgba8();

    Ok(ImageData {
        width: image.width() as usize,
        height: image.height() as usize,
        bytes: Cow::Owned(image.into_raw()),
    })
}

/// Write the blob to a temporary file named after `name`.
///
/// The file outlives the process so the viewer can still read it.
pub async fn stage(blob: &Blob, name: &str) -> Result<PathBuf, ClipboardError> {
    let safe_name = Path::new(name)
        .file_name()
        .map_or_else(|| "received".to_string(), |n| n.to_string_lossy().into_owned());

    let file = tempfile::Builder::new()
        .prefix("ferry-")
        .suffix(&format!("-{safe_name}"))
        .tempfile()
        .map_err(|e| ClipboardError::Open(e.to_string()))?;
    let (_, path) = file.keep().map_err(|e| ClipboardError::Open(e.to_string()))?;

    tokio::fs::write(&path, &blob.bytes).await.map_err(|e| ClipboardError::Open(e.to_string()))?;
    Ok(path)
}

fn opener(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg(path);
        command
    } else if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]).arg(path);
        command
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(path);
        command
    }
}
