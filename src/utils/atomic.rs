//! Atomic file operations
//!
//! Documents are never truncated in place. Every write goes to a sibling
//! `<file name>.tmp` file which is flushed with `sync_all()` and then renamed
//! over the destination, so a crash leaves either the old document or the
//! new one. All I/O goes through `tokio::fs`.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

/// Extension appended to the full file name of an in-flight write
pub const TEMP_SUFFIX: &str = ".tmp";

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Temp file used while writing `path`: `students.json` -> `students.json.tmp`
pub fn temp_path_for(path: &Path) -> PathBuf {
    with_suffix(path, TEMP_SUFFIX)
}

/// Atomically write content to a file without blocking the runtime
///
/// ```ignore
/// atomic_write_async("data/students.json", json.as_bytes()).await?;
/// ```
pub async fn atomic_write_async<P: AsRef<Path>>(path: P, content: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    let temp_path = temp_path_for(path);

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let mut file = tokio::fs::File::create(&temp_path).await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&temp_path, path).await?;

    Ok(())
}

/// Move an unreadable document aside as `<file>.corrupt`
///
/// The next save would otherwise overwrite it. Any older `.corrupt` copy is
/// replaced.
///
/// # Returns
///
/// * `Ok(Some(path))` - The document was moved to `path`
/// * `Ok(None)` - The document doesn't exist
pub async fn preserve_corrupt<P: AsRef<Path>>(path: P) -> io::Result<Option<PathBuf>> {
    let path = path.as_ref();
    if !tokio::fs::try_exists(path).await? {
        return Ok(None);
    }

    let backup = with_suffix(path, ".corrupt");
    if tokio::fs::try_exists(&backup).await? {
        tokio::fs::remove_file(&backup).await?;
    }
    tokio::fs::rename(path, &backup).await?;

    Ok(Some(backup))
}

/// Clean up any leftover temp files from interrupted writes
///
/// Call this on startup; returns how many files were removed.
pub async fn cleanup_temp_files<P: AsRef<Path>>(dir: P) -> io::Result<usize> {
    let dir = dir.as_ref();
    let mut cleaned = 0;

    if !tokio::fs::try_exists(dir).await? {
        return Ok(0);
    }

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();

        if path.extension().map(|e| e == "tmp").unwrap_or(false) {
            tokio::fs::remove_file(&path).await?;
            cleaned += 1;
        }
    }

    Ok(cleaned)
}
