// src/downloader.rs
use sanitize_filename::sanitize;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

const FALLBACK_NAME: &str = "output.bin";

/// Local path for `key` inside `dir`.
///
/// Each `/`-separated segment of the key becomes a subdirectory after being
/// sanitized for the OS. Empty, `.` and `..` segments are dropped, so the
/// result never escapes `dir`. Falls back to "output.bin" if nothing is left.
pub fn destination_path(dir: &Path, key: &str) -> PathBuf {
    let mut path = dir.to_path_buf();
    let mut pushed = false;

    let segments = key
        .split('/')
        .filter(|s| !matches!(*s, "" | "." | ".."))
        .map(sanitize)
        .filter(|s| !s.is_empty());

    for segment in segments {
        path.push(segment);
        pushed = true;
    }

    if !pushed {
        path.push(FALLBACK_NAME);
    }
    path
}

/// Creates (or truncates) the destination and pre-allocates it to `size` bytes.
///
/// Missing parent directories are created. The returned handle belongs to the
/// caller, who closes it once the transfer has finished.
pub async fn prepare_destination(path: &Path, size: u64) -> io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }

    // Pre-allocate file (prevents fragmentation)
    let file = fs::File::create(path).await?;
    file.set_len(size).await?;

    Ok(file.into_std().await)
}
