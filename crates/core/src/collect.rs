//! Local path collection
//!
//! Expands a local path into the regular files it denotes: the file itself,
//! or every file below a directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Collect the files denoted by `path`
///
/// Directories are walked depth-first in lexical order. Entries are not
/// followed through symlinks; a symlink is reported like any other
/// non-directory entry. Any walk error discards the partial result.
pub fn collect_files(path: &Path) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(path).map_err(|e| {
        Error::InvalidPath(format!("failed to stat path {}: {e}", path.display()))
    })?;

    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    walk_dir(path, &mut files).map_err(|e| {
        Error::InvalidPath(format!("failed to walk directory {}: {e}", path.display()))
    })?;
    Ok(files)
}

/// Count the files denoted by `path`
pub fn count_files(path: &Path) -> Result<usize> {
    collect_files(path).map(|files| files.len())
}

fn walk_dir(dir: &Path, files: &mut Vec<PathBuf>) -> io::Result<()> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            walk_dir(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_single_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.txt");
        touch(&file);

        assert_eq!(collect_files(&file).unwrap(), vec![file]);
    }

    #[test]
    fn test_directory_is_walked_recursively() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("site");
        touch(&root.join("index.html"));
        touch(&root.join("css/app.css"));
        touch(&root.join("js/vendor/lib.js"));
        fs::create_dir_all(root.join("empty")).unwrap();

        let files = collect_files(&root).unwrap();
        assert_eq!(
            files,
            vec![
                root.join("css/app.css"),
                root.join("index.html"),
                root.join("js/vendor/lib.js"),
            ]
        );
    }

    #[test]
    fn test_empty_directory() {
        let temp = TempDir::new().unwrap();
        assert!(collect_files(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_path() {
        let temp = TempDir::new().unwrap();
        let err = collect_files(&temp.path().join("nope")).unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
        assert!(err.to_string().contains("failed to stat path"));
    }

    #[test]
    fn test_count_files() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("a"));
        touch(&temp.path().join("b/c"));
        assert_eq!(count_files(temp.path()).unwrap(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_directory_is_not_followed() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("target");
        touch(&target.join("inner.txt"));
        let root = temp.path().join("root");
        fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(&target, root.join("link")).unwrap();

        let files = collect_files(&root).unwrap();
        assert_eq!(files, vec![root.join("link")]);
    }

    /// Lock `dir` so it cannot be listed; `None` when permissions are not enforced
    #[cfg(unix)]
    pub(crate) fn lock_dir(dir: &Path) -> Option<()> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(dir).is_ok() {
            // Privileged users bypass the mode bits
            fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
            return None;
        }
        Some(())
    }

    #[cfg(unix)]
    pub(crate) fn unlock_dir(dir: &Path) {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_subdirectory_discards_partial_result() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root");
        touch(&root.join("a.txt"));
        touch(&root.join("locked/secret.txt"));
        touch(&root.join("z.txt"));

        let locked = root.join("locked");
        if lock_dir(&locked).is_none() {
            return;
        }
        let result = collect_files(&root);
        unlock_dir(&locked);

        let err = result.unwrap_err();
        assert!(matches!(err, Error::InvalidPath(_)));
        assert!(err.to_string().contains("failed to walk directory"));
    }
}
