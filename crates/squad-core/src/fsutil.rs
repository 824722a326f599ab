//! Filesystem helpers: atomic writes, tree copies and directory listings

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Write `contents` to `path` through a sibling temp file and a rename,
/// so readers never observe a half-written file.
pub async fn write_atomic(path: &Path, contents: impl AsRef<[u8]>) -> io::Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let tmp = path.with_file_name(format!(".{}.tmp", file_name));

    tokio::fs::write(&tmp, contents.as_ref()).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e);
    }
    Ok(())
}

pub async fn path_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Recursively copy `src` into `dst`, skipping top-level entries named in `exclude`.
///
/// Returns the copied files relative to `src`.
pub fn copy_dir(src: &Path, dst: &Path, exclude: &[&str]) -> io::Result<Vec<PathBuf>> {
    let mut copied = Vec::new();
    std::fs::create_dir_all(dst)?;

    let walker = WalkDir::new(src).min_depth(1).into_iter().filter_entry(|entry| {
        entry.depth() != 1 || !exclude.iter().any(|ex| entry.file_name() == *ex)
    });

    for entry in walker {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
            copied.push(rel.to_path_buf());
        }
    }

    copied.sort();
    Ok(copied)
}

/// Names of the regular, non-hidden files directly inside `dir`, sorted.
///
/// A missing directory yields an empty list.
pub async fn list_visible_files(dir: &Path) -> io::Result<Vec<String>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if entry.file_type().await?.is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
