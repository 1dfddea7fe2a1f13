//! Persistence of job artifacts.
//!
//! The batch job only needs two abstract operations from durable storage:
//! write/read a typed table and write/read an opaque blob. [`ArtifactStore`]
//! is that seam; [`DirectoryStore`] backs it with CSV files and raw blobs in a
//! local directory.

use crate::error::{DataLoadError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Durable storage for tables and model blobs.
///
/// Names are logical (`"item_mapping"`, `"model.json"`); how they map onto
/// storage is up to the implementation.
pub trait ArtifactStore: Send + Sync {
    /// Write `rows` as the table `name`, replacing any previous contents
    fn write_table<T: Serialize>(&self, name: &str, rows: &[T]) -> Result<()>;

    /// Read every row of the table `name`
    fn read_table<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>>;

    /// Write an opaque blob
    fn write_blob(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Read an opaque blob
    fn read_blob(&self, name: &str) -> Result<Vec<u8>>;
}

/// Stores tables as `<root>/<name>.csv` and blobs as `<root>/<name>`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn table_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.csv"))
    }

    fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        Ok(())
    }
}

impl ArtifactStore for DirectoryStore {
    fn write_table<T: Serialize>(&self, name: &str, rows: &[T]) -> Result<()> {
        self.ensure_root()?;
        let path = self.table_path(name);
        let mut writer = csv::Writer::from_path(&path).map_err(|e| table_error(name, e))?;
        for row in rows {
            writer.serialize(row).map_err(|e| table_error(name, e))?;
        }
        writer.flush()?;
        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }

    fn read_table<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let path = self.table_path(name);
        let file = open(&path)?;
        let mut reader = csv::Reader::from_reader(file);
        reader
            .deserialize()
            .collect::<std::result::Result<Vec<T>, _>>()
            .map_err(|e| table_error(name, e))
    }

    fn write_blob(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.ensure_root()?;
        let path = self.root.join(name);
        fs::write(&path, bytes)?;
        debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn read_blob(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.root.join(name);
        fs::read(&path).map_err(|e| not_found_or_io(&path, e))
    }
}

fn open(path: &Path) -> Result<fs::File> {
    fs::File::open(path).map_err(|e| not_found_or_io(path, e))
}

fn not_found_or_io(path: &Path, e: io::Error) -> DataLoadError {
    match e.kind() {
        io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    }
}

fn table_error(name: &str, e: csv::Error) -> DataLoadError {
    DataLoadError::Serialization {
        table: name.to_string(),
        reason: e.to_string(),
    }
}
