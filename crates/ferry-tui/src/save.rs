//! Writing received files to a directory.

use std::{
    io,
    path::{Path, PathBuf},
};

use tokio::{fs::OpenOptions, io::AsyncWriteExt};

const MAX_ATTEMPTS: usize = 1000;
const FALLBACK_NAME: &str = "received";

/// Write `bytes` into `dir` under the last component of `name`.
///
/// Never overwrites: an existing file gets a numbered sibling
/// (`photo (1).png`). Returns the path written.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the write fails.
pub async fn save_received(dir: &Path, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let name = Path::new(name).file_name().map_or_else(|| Path::new(FALLBACK_NAME), Path::new);
    let stem = name.file_stem().map_or_else(String::new, |s| s.to_string_lossy().into_owned());
    let ext =
        name.extension().map_or_else(String::new, |e| format!(".{}", e.to_string_lossy()));

    for attempt in 0..MAX_ATTEMPTS {
        let candidate = if attempt == 0 {
            dir.join(name)
        } else {
            dir.join(format!("{stem} ({attempt}){ext}"))
        };

        match OpenOptions::new().write(true).create_new(true).open(&candidate).await {
            Ok(mut file) => {
                file.write_all(bytes).await?;
                file.flush().await?;
                return Ok(candidate);
            },
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {},
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free name for {}", name.display()),
    ))
}
