//! Filesystem access used by the finder.
//!
//! The finder only ever needs two read-only operations, listing the files
//! under a directory and reading a file as text, so that is all
//! [`FileSystem`] exposes.  [`LocalFileSystem`] implements them on top of
//! `ignore`'s directory walker and classifies failures into [`FsError`].

use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use thiserror::Error;
use tracing::debug;

/// Normalised filesystem failure.
#[derive(Debug, Error)]
pub enum FsError {
    /// The directory to list does not exist (or is not a directory).
    #[error("directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },
    /// The file to read does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },
    /// Any other I/O failure (permissions, unreadable directories, ...).
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FsError {
    pub fn path(&self) -> &Path {
        match self {
            FsError::DirectoryNotFound { path }
            | FsError::FileNotFound { path }
            | FsError::Io { path, .. } => path.as_path(),
        }
    }

    fn io(path: &Path, source: io::Error) -> Self {
        FsError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The read-only filesystem operations the finder depends on.
pub trait FileSystem: Sync {
    /// List the files (not directories) under `dir`, descending into
    /// subdirectories when `recursive` is set.
    fn list_files(&self, dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, FsError>;

    /// Read a whole file as text.  Invalid UTF-8 is replaced, not rejected.
    fn read_text(&self, path: &Path) -> Result<String, FsError>;
}

/// [`FileSystem`] backed by the local disk.
///
/// Listing order is deterministic: entries are sorted by file name within
/// each directory.
#[derive(Debug, Clone, Default)]
pub struct LocalFileSystem {
    /// Honour `.gitignore`, `.ignore` and git exclude files.
    pub respect_gitignore: bool,
    /// Follow symbolic links while walking.
    pub follow_links: bool,
    /// Directory names never descended into (e.g. `vendor`).
    pub skip_dirs: Vec<String>,
}

impl FileSystem for LocalFileSystem {
    fn list_files(&self, dir: &Path, recursive: bool) -> Result<Vec<PathBuf>, FsError> {
        match std::fs::metadata(dir) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(FsError::DirectoryNotFound {
                    path: dir.to_path_buf(),
                });
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FsError::DirectoryNotFound {
                    path: dir.to_path_buf(),
                });
            }
            Err(e) => return Err(FsError::io(dir, e)),
        }

        let mut builder = WalkBuilder::new(dir);
        builder
            .hidden(false)
            .parents(self.respect_gitignore)
            .ignore(self.respect_gitignore)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .follow_links(self.follow_links)
            .max_depth(if recursive { None } else { Some(1) })
            .sort_by_file_name(|a, b| a.cmp(b));

        if !self.skip_dirs.is_empty() {
            let skip_dirs = self.skip_dirs.clone();
            builder.filter_entry(move |entry| {
                let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
                // Never filter the root itself.
                if !is_dir || entry.depth() == 0 {
                    return true;
                }
                entry
                    .file_name()
                    .to_str()
                    .is_none_or(|name| !skip_dirs.iter().any(|s| s == name))
            });
        }

        let mut files = Vec::new();
        for entry in builder.build() {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_some_and(|ft| ft.is_file()) {
                        files.push(entry.into_path());
                    }
                }
                Err(err) => {
                    let message = err.to_string();
                    let source = err
                        .into_io_error()
                        .unwrap_or_else(|| io::Error::other(message));
                    if source.kind() == io::ErrorKind::NotFound {
                        // Removed while we were walking.
                        debug!(dir = %dir.display(), error = %source, "entry vanished during walk");
                        continue;
                    }
                    return Err(FsError::io(dir, source));
                }
            }
        }

        Ok(files)
    }

    fn read_text(&self, path: &Path) -> Result<String, FsError> {
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                FsError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                FsError::io(path, e)
            }
        })?;
        Ok(match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &[u8]) {
        let full = root.join(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create dirs");
        }
        fs::write(full, content).expect("failed to write file");
    }

    fn relative(root: &Path, files: Vec<PathBuf>) -> Vec<String> {
        files
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = LocalFileSystem::default()
            .list_files(&missing, true)
            .unwrap_err();
        assert!(matches!(err, FsError::DirectoryNotFound { .. }));
        assert_eq!(err.path(), missing);
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.php", b"<?php");
        let err = LocalFileSystem::default()
            .list_files(&dir.path().join("a.php"), true)
            .unwrap_err();
        assert!(matches!(err, FsError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_recursive_listing_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.php", b"");
        write(dir.path(), "a.php", b"");
        write(dir.path(), "sub/c.php", b"");
        write(dir.path(), ".hidden/d.php", b"");

        let files = LocalFileSystem::default()
            .list_files(dir.path(), true)
            .unwrap();
        assert_eq!(
            relative(dir.path(), files),
            vec![".hidden/d.php", "a.php", "b.php", "sub/c.php"]
        );
    }

    #[test]
    fn test_non_recursive_listing() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.php", b"");
        write(dir.path(), "sub/c.php", b"");

        let files = LocalFileSystem::default()
            .list_files(dir.path(), false)
            .unwrap();
        assert_eq!(relative(dir.path(), files), vec!["a.php"]);
    }

    #[test]
    fn test_skip_dirs() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/a.php", b"");
        write(dir.path(), "vendor/lib/b.php", b"");

        let fs = LocalFileSystem {
            skip_dirs: vec!["vendor".to_string()],
            ..Default::default()
        };
        let files = fs.list_files(dir.path(), true).unwrap();
        assert_eq!(relative(dir.path(), files), vec!["src/a.php"]);
    }

    #[test]
    fn test_gitignore_only_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), ".gitignore", b"generated/\n");
        write(dir.path(), "generated/g.php", b"");
        write(dir.path(), "a.php", b"");

        let all = LocalFileSystem::default()
            .list_files(dir.path(), true)
            .unwrap();
        assert!(relative(dir.path(), all).contains(&"generated/g.php".to_string()));

        let fs = LocalFileSystem {
            respect_gitignore: true,
            ..Default::default()
        };
        let filtered = relative(dir.path(), fs.list_files(dir.path(), true).unwrap());
        assert!(!filtered.contains(&"generated/g.php".to_string()));
        assert!(filtered.contains(&"a.php".to_string()));
    }

    #[test]
    fn test_read_text_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFileSystem::default()
            .read_text(&dir.path().join("gone.php"))
            .unwrap_err();
        assert!(matches!(err, FsError::FileNotFound { .. }));
    }

    #[test]
    fn test_read_text_replaces_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "latin1.php", b"<?php class Caf\xe9 {}");
        let text = LocalFileSystem::default()
            .read_text(&dir.path().join("latin1.php"))
            .unwrap();
        assert!(text.starts_with("<?php class Caf"));
        assert!(text.contains('\u{FFFD}'));
    }
}
