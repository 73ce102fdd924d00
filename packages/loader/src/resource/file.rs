//! File system resources.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use url::Url;

use super::Resource;
use crate::error::{LoaderError, Result};

/// A definition document on the local file system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileResource {
    path: PathBuf,
}

impl FileResource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn absolute_path(&self) -> io::Result<PathBuf> {
        std::path::absolute(&self.path)
    }
}

impl Resource for FileResource {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn absolute_location(&self) -> Result<String> {
        let absolute = self.absolute_path()?;
        Url::from_file_path(&absolute)
            .map(String::from)
            .map_err(|()| LoaderError::UnsupportedLocation(absolute.display().to_string()))
    }

    /// Resolve against this file's directory; a leading `/` is stripped.
    fn create_relative(&self, relative_path: &str) -> Result<Arc<dyn Resource>> {
        let relative = relative_path.strip_prefix('/').unwrap_or(relative_path);
        let folder = self.path.parent().unwrap_or_else(|| Path::new(""));
        Ok(Arc::new(Self::new(folder.join(relative))))
    }

    fn read_to_string(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => LoaderError::ResourceNotFound(self.description()),
            _ => LoaderError::Io(e),
        })
    }

    fn description(&self) -> String {
        format!("file [{}]", self.path.display())
    }

    /// Canonical path when the file exists, so `a/../b.xml` and `b.xml` match.
    fn identity(&self) -> String {
        fs::canonicalize(&self.path)
            .or_else(|_| self.absolute_path())
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| self.path.display().to_string())
    }
}
