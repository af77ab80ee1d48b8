//! Raw byte persistence with absolute path resolution.
//!
//! [`load`] and [`save`] resolve their path to an absolute one before
//! touching the filesystem and refuse directories. [`save`] stages the new
//! content in a temporary file next to the target and renames it into
//! place, so readers never observe a half-written document.
//!
//! Nothing here locks the target. Callers that let several requests update
//! the same document must serialize those updates themselves.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use get5_config_core::{Match, decode_match, encode_match};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{Result, StoreError};

/// Resolves `path` to an absolute path.
///
/// Surrounding whitespace is ignored. The path does not need to exist.
///
/// # Errors
///
/// Returns [`StoreError::EmptyPath`] for an empty or whitespace-only path,
/// or [`StoreError::Resolve`] if the current directory cannot be read.
///
/// # Examples
///
/// ```
/// use get5_config_store::resolve_path;
///
/// let path = resolve_path(" match.json ").unwrap();
/// assert!(path.is_absolute());
/// assert!(path.ends_with("match.json"));
/// assert!(resolve_path("   ").is_err());
/// ```
pub fn resolve_path(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let path = path.to_str().map(|s| Path::new(s.trim())).unwrap_or(path);
    if path.as_os_str().is_empty() {
        return Err(StoreError::EmptyPath);
    }

    let absolute = std::path::absolute(path).map_err(|source| StoreError::Resolve {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %absolute.display(), "resolved path");
    Ok(absolute)
}

/// Reads the file at `path`.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] when nothing exists at the path,
/// [`StoreError::IsDirectory`] for a directory, and [`StoreError::Read`]
/// for any other read failure.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = resolve_path(path)?;

    let metadata = match fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound(path));
        }
        Err(source) => return Err(StoreError::Read { path, source }),
    };
    if metadata.is_dir() {
        return Err(StoreError::IsDirectory(path));
    }

    match fs::read(&path) {
        Ok(bytes) => {
            debug!(path = %path.display(), bytes = bytes.len(), "loaded file");
            Ok(bytes)
        }
        Err(source) => Err(StoreError::Read { path, source }),
    }
}

/// Replaces the file at `path` with `bytes`.
///
/// The parent directory must exist. An existing file keeps its permissions.
///
/// # Errors
///
/// Returns [`StoreError::IsDirectory`] when `path` is a directory, or
/// [`StoreError::Write`] if staging or renaming the file fails.
pub fn save(path: impl AsRef<Path>, bytes: &[u8]) -> Result<()> {
    let path = resolve_path(path)?;
    if path.is_dir() {
        return Err(StoreError::IsDirectory(path));
    }

    let write_err = |source: io::Error| StoreError::Write {
        path: path.clone(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut staged = NamedTempFile::new_in(dir).map_err(write_err)?;
    staged.write_all(bytes).map_err(write_err)?;
    staged.as_file().sync_all().map_err(write_err)?;
    match fs::metadata(&path) {
        Ok(existing) => staged
            .as_file()
            .set_permissions(existing.permissions())
            .map_err(write_err)?,
        Err(_) => set_default_permissions(staged.as_file()).map_err(write_err)?,
    }
    staged.persist(&path).map_err(|err| write_err(err.error))?;

    debug!(path = %path.display(), bytes = bytes.len(), "saved file");
    Ok(())
}

#[cfg(unix)]
fn set_default_permissions(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    file.set_permissions(fs::Permissions::from_mode(0o664))
}

#[cfg(not(unix))]
fn set_default_permissions(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

/// Reads and decodes the match document at `path`.
///
/// The document is returned as decoded, without normalization.
///
/// # Errors
///
/// Any error from [`load`], or [`StoreError::Match`] when the content is not
/// a valid match document.
pub fn load_match(path: impl AsRef<Path>) -> Result<Match> {
    let path = resolve_path(path)?;
    let bytes = load(&path)?;
    decode_match(&bytes).map_err(|source| StoreError::Match { path, source })
}

/// Encodes `doc` as pretty JSON and writes it to `path`.
///
/// # Errors
///
/// Any error from [`save`], or [`StoreError::Match`] if encoding fails.
pub fn save_match(path: impl AsRef<Path>, doc: &Match) -> Result<()> {
    let path = resolve_path(path)?;
    let bytes = encode_match(doc).map_err(|source| StoreError::Match {
        path: path.clone(),
        source,
    })?;
    save(&path, &bytes)
}
