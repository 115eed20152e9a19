//! Filesystem enumeration for the importer.
//!
//! Names come back in whatever order the directory yields them. Nothing
//! here sorts. Names stay `OsString` so a listed entry can always be
//! joined back into a path that opens.

use std::ffi::OsString;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Result, VaError};

/// Directory listing primitives
pub trait MediaFs {
    /// Names of the immediate subdirectories of `path`
    fn list_subdirectories(&self, path: &Path) -> Result<Vec<OsString>>;

    /// Names of the regular files directly inside `path`
    fn list_files(&self, path: &Path) -> Result<Vec<OsString>>;
}

/// Real filesystem, one level deep, in directory order
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    fn list(&self, path: &Path, want_dirs: bool) -> Result<Vec<OsString>> {
        let mut names = Vec::new();
        let walker = WalkDir::new(path).min_depth(1).max_depth(1).follow_links(true);
        for entry in walker {
            let entry = entry.map_err(|e| VaError::Io(e.into()))?;
            let file_type = entry.file_type();
            let keep = if want_dirs {
                file_type.is_dir()
            } else {
                file_type.is_file()
            };
            if keep {
                names.push(entry.file_name().to_os_string());
            }
        }
        Ok(names)
    }
}

impl MediaFs for LocalFs {
    fn list_subdirectories(&self, path: &Path) -> Result<Vec<OsString>> {
        self.list(path, true)
    }

    fn list_files(&self, path: &Path) -> Result<Vec<OsString>> {
        self.list(path, false)
    }
}

/// In-memory tree with a fixed listing order, for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FakeFs {
    pub dirs: std::collections::HashMap<std::path::PathBuf, (Vec<OsString>, Vec<OsString>)>,
}

#[cfg(test)]
impl FakeFs {
    pub fn with_dir(mut self, path: &str, subdirs: &[&str], files: &[&str]) -> Self {
        self.dirs.insert(
            std::path::PathBuf::from(path),
            (
                subdirs.iter().map(OsString::from).collect(),
                files.iter().map(OsString::from).collect(),
            ),
        );
        self
    }

    fn entry(&self, path: &Path) -> Result<&(Vec<OsString>, Vec<OsString>)> {
        self.dirs.get(path).ok_or_else(|| {
            VaError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                path.display().to_string(),
            ))
        })
    }
}

#[cfg(test)]
impl MediaFs for FakeFs {
    fn list_subdirectories(&self, path: &Path) -> Result<Vec<OsString>> {
        Ok(self.entry(path)?.0.clone())
    }

    fn list_files(&self, path: &Path) -> Result<Vec<OsString>> {
        Ok(self.entry(path)?.1.clone())
    }
}
