//! Shared test helpers for sdkprep crates.
//!
//! [`ProjectTree`] lays out a throwaway source checkout in a temporary
//! directory so unit and behaviour tests can exercise filesystem-facing
//! steps (generator detection, data discovery, documentation sync) without
//! touching the real repository.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use tempfile::TempDir;

/// A temporary project directory that is removed when dropped.
pub struct ProjectTree {
    _tempdir: TempDir,
    root: Utf8PathBuf,
}

impl ProjectTree {
    /// Creates an empty project tree.
    ///
    /// # Errors
    ///
    /// Returns an error when the temporary directory cannot be created or its
    /// path is not valid UTF-8.
    pub fn new() -> io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let root = Utf8PathBuf::from_path_buf(tempdir.path().to_path_buf())
            .map_err(|path| io::Error::other(format!("non UTF-8 temp path: {}", path.display())))?;
        Ok(Self {
            _tempdir: tempdir,
            root,
        })
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Resolves `relative` against the project root.
    #[must_use]
    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    /// Writes `contents` to `relative`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while writing.
    ///
    /// # Examples
    ///
    /// ```
    /// use common::test_support::ProjectTree;
    ///
    /// let tree = ProjectTree::new()?;
    /// tree.write("pkg/version.py", "__version__ = '1.0.0'\n")?;
    /// assert!(tree.path("pkg/version.py").exists());
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn write(&self, relative: &str, contents: &str) -> io::Result<Utf8PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Writes an empty file at each of `relatives`.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error raised.
    pub fn touch_all(&self, relatives: &[&str]) -> io::Result<()> {
        for relative in relatives {
            self.write(relative, "")?;
        }
        Ok(())
    }

    /// Creates the directory `relative` and any missing parents.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while creating the directory.
    pub fn mkdir(&self, relative: &str) -> io::Result<Utf8PathBuf> {
        let path = self.path(relative);
        fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Lists every file below `relative`, as sorted paths relative to it.
    ///
    /// Returns an empty list when the directory does not exist.
    ///
    /// # Errors
    ///
    /// Returns any I/O error raised while reading directories.
    pub fn files_under(&self, relative: &str) -> io::Result<Vec<String>> {
        let base = self.path(relative);
        let mut found = Vec::new();
        if base.is_dir() {
            collect_files(&base, &base, &mut found)?;
        }
        found.sort();
        Ok(found)
    }
}

fn collect_files(base: &Utf8Path, dir: &Utf8Path, found: &mut Vec<String>) -> io::Result<()> {
    for entry in dir.read_dir_utf8()? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(base, path, found)?;
        } else if let Ok(relative) = path.strip_prefix(base) {
            found.push(relative.as_str().replace('\\', "/"));
        }
    }
    Ok(())
}
