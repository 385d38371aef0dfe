//! I/O utility functions

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Sibling path used as the staging file for [`atomic_write`]
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("config"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace a file's content using the write-then-rename pattern.
///
/// The content goes to a sibling temporary file first, which is then renamed
/// over the target, so readers only ever observe the old or the new file.
///
/// # Example
/// ```ignore
/// atomic_write(Path::new("config/PhysiCell_settings.xml"), &xml)?;
/// ```
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let temp_path = staging_path(path);
    fs::write(&temp_path, content)?;
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err);
    }
    Ok(())
}

/// Remove a directory with everything in it (if present) and recreate it empty
pub fn clear_directory(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    fs::create_dir_all(path)
}

/// Move a directory tree to `to`, creating missing parents.
///
/// A plain rename is attempted first; when that fails (for example across
/// filesystems) the tree is copied and the source removed.
pub fn move_directory(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    copy_tree(from, to)?;
    fs::remove_dir_all(from)
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.xml");

        atomic_write(&path, "<a>1</a>").unwrap();
        atomic_write(&path, "<a>2</a>").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "<a>2</a>");
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_clear_directory_empties_existing_tree() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("output");
        fs::create_dir_all(output.join("nested")).unwrap();
        fs::write(output.join("nested/file.mat"), b"x").unwrap();

        clear_directory(&output).unwrap();

        assert!(output.is_dir());
        assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
    }

    #[test]
    fn test_clear_directory_creates_missing() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("missing/output");
        clear_directory(&output).unwrap();
        assert!(output.is_dir());
    }

    #[test]
    fn test_move_directory_creates_parents() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("output");
        fs::create_dir_all(&from).unwrap();
        fs::write(from.join("snapshot.xml"), "<x/>").unwrap();

        let to = dir.path().join("archive/run-1/replicate-0");
        move_directory(&from, &to).unwrap();

        assert!(!from.exists());
        assert_eq!(fs::read_to_string(to.join("snapshot.xml")).unwrap(), "<x/>");
    }
}
