//! Whole-file persistence for vault state files.
//!
//! Writes are **atomic**:
//!
//! 1. Write the new contents to a temp file next to the target
//!    (`.<name>.tmp`, same directory, so the rename stays on one
//!    filesystem) and flush it to disk.
//! 2. Rename the temp file over the target.
//!
//! Readers therefore see either the previous file or the new one, never
//! a partial write.  A crash between the two steps leaves a stale temp
//! file and the previous target untouched; the next write overwrites
//! the temp file.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::errors::{Result, VaultError};

/// Read a vault file.
///
/// Returns `None` when the file does not exist or is empty, which
/// callers treat as "initialize a new vault".
pub fn read_existing(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(data) if data.is_empty() => Ok(None),
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "vault file unreadable");
            Err(VaultError::VaultNotFound(path.to_path_buf()))
        }
    }
}

/// Atomically replace `path` with `data`.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let tmp_path = stage(path, data)?;
    commit(&tmp_path, path)
}

/// The temp sibling used while writing `path`.
pub fn temp_path(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ))
}

/// Step 1: write `data` to the temp sibling of `path` and sync it.
///
/// Creates the parent directory if needed.  The temp file is created
/// with owner-only permissions on Unix.
pub fn stage(path: &Path, data: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            create_private_dir(parent)?;
        }
    }

    let tmp_path = temp_path(path);

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&tmp_path)?;
    if let Err(e) = file.write_all(data).and_then(|()| file.sync_all()) {
        drop(file);
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(tmp_path)
}

/// Step 2: rename the staged temp file over `path`.
pub fn commit(tmp_path: &Path, path: &Path) -> Result<()> {
    if let Err(e) = fs::rename(tmp_path, path) {
        let _ = fs::remove_file(tmp_path);
        return Err(e.into());
    }
    tracing::debug!(path = %path.display(), "vault file replaced");
    Ok(())
}

fn create_private_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_existing(&dir.path().join("nope")).unwrap().is_none());
    }

    #[test]
    fn empty_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty");
        fs::write(&path, b"").unwrap();
        assert!(read_existing(&path).unwrap().is_none());
    }

    #[test]
    fn write_atomic_creates_directories_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("vault-x.enc");
        write_atomic(&path, b"hello").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"hello");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn staged_but_uncommitted_write_keeps_previous_contents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault-x.enc");
        write_atomic(&path, b"v1").unwrap();

        let tmp = stage(&path, b"v2").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"v1");

        commit(&tmp, &path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"v2");
    }

    #[cfg(unix)]
    #[test]
    fn written_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vault-x.enc");
        write_atomic(&path, b"data").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
