//! File I/O collaborators: read a whole file, write bytes creating parent
//! directories as needed. Both exist in synchronous and asynchronous form
//! with identical semantics; neither has any interesting behavior beyond
//! argument checks and error mapping.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Error, Result};

fn check_path(path: &Path, what: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::InvalidArgument(format!("{what} path is empty")));
    }
    Ok(())
}

fn map_read_error(err: std::io::Error, path: &Path) -> Error {
    match err.kind() {
        ErrorKind::NotFound => Error::NotFound(path.to_path_buf()),
        _ => Error::Io(err),
    }
}

fn map_write_error(err: std::io::Error, path: &Path) -> Error {
    match err.kind() {
        ErrorKind::PermissionDenied => Error::Permission(path.to_path_buf()),
        _ => Error::Io(err),
    }
}

/// Read the full contents of a file.
///
/// # Errors
/// `InvalidArgument` for an empty path, `NotFound` if the file does not
/// exist, `Io` for any other failure (original cause preserved).
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    check_path(path, "input")?;
    std::fs::read(path).map_err(|e| map_read_error(e, path))
}

/// Asynchronous variant of [`read_bytes`] with identical semantics.
pub async fn read_bytes_async(path: &Path) -> Result<Vec<u8>> {
    check_path(path, "input")?;
    tokio::fs::read(path)
        .await
        .map_err(|e| map_read_error(e, path))
}

/// Write bytes to a path, creating missing parent directories first.
///
/// # Errors
/// `InvalidArgument` for an empty path or empty buffer, `Directory` if a
/// parent directory could not be created, `Permission` if the location
/// refuses writes, `Io` otherwise.
pub fn write_bytes(path: &Path, data: &[u8]) -> Result<()> {
    check_write_args(path, data)?;
    if let Some(parent) = nonempty_parent(path) {
        std::fs::create_dir_all(parent).map_err(|_| Error::Directory(parent.to_path_buf()))?;
    }
    std::fs::write(path, data).map_err(|e| map_write_error(e, path))
}

/// Asynchronous variant of [`write_bytes`] with identical semantics.
pub async fn write_bytes_async(path: &Path, data: &[u8]) -> Result<()> {
    check_write_args(path, data)?;
    if let Some(parent) = nonempty_parent(path) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|_| Error::Directory(parent.to_path_buf()))?;
    }
    tokio::fs::write(path, data)
        .await
        .map_err(|e| map_write_error(e, path))
}

fn check_write_args(path: &Path, data: &[u8]) -> Result<()> {
    check_path(path, "output")?;
    if data.is_empty() {
        return Err(Error::InvalidArgument("output buffer is empty".into()));
    }
    Ok(())
}

fn nonempty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}
