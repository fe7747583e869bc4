use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{IoContext, Result};

/// A flat directory of source PNGs.
///
/// Catalog building and iconset staging only ever look at file names and
/// bytes, so tests can hand them a [`MemoryDir`] instead of real files.
pub trait SourceDir {
    /// Names of the regular files directly inside the directory.
    fn file_names(&self) -> Result<Vec<String>>;

    fn exists(&self, name: &str) -> bool;

    fn read(&self, name: &str) -> Result<Vec<u8>>;

    /// Human-readable location used in diagnostics.
    fn describe(&self) -> String;
}

pub struct DiskDir {
    root: PathBuf,
}

impl DiskDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceDir for DiskDir {
    fn file_names(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root)
            .io_context(|| format!("reading {}", self.root.display()))?;

        let mut names = Vec::new();
        for entry in entries.flatten() {
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        // read_dir order is filesystem dependent
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> bool {
        self.root.join(name).is_file()
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);
        std::fs::read(&path).io_context(|| format!("reading {}", path.display()))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// In-memory directory fixture.
#[derive(Default)]
pub struct MemoryDir {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryDir {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.files.insert(name.into(), bytes);
    }

    pub fn with(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(name, bytes);
        self
    }
}

impl SourceDir for MemoryDir {
    fn file_names(&self) -> Result<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn exists(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    fn read(&self, name: &str) -> Result<Vec<u8>> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| crate::error::IconError::Io {
                context: format!("reading {}", name),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }

    fn describe(&self) -> String {
        "<memory>".to_string()
    }
}
