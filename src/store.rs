//! Where model bytes come from.
//!
//! A [`ModelStore`] is an indexed list of named blobs. The viewer lists the
//! names, filters them with a [`Catalog`] and reads the selected blob.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("model {index} is out of range, the store holds {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An ordered collection of model blobs.
pub trait ModelStore: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display name of entry `index`, also used as its export file stem.
    fn name(&self, index: usize) -> Option<&str>;

    fn read(&self, index: usize) -> Result<Vec<u8>, StoreError>;
}

/// Models kept in memory, named by insertion.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Vec<(String, Vec<u8>)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.entries.push((name.into(), bytes));
        self
    }
}

impl ModelStore for MemoryStore {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(name, _)| name.as_str())
    }

    fn read(&self, index: usize) -> Result<Vec<u8>, StoreError> {
        self.entries
            .get(index)
            .map(|(_, bytes)| bytes.clone())
            .ok_or(StoreError::OutOfRange {
                index,
                len: self.entries.len(),
            })
    }
}

/// Model files imported from a directory.
///
/// Only names containing a `.` are taken. Files whose stem (the text before
/// the first `.`) is a number come first, in numeric order; a later file
/// with the same number replaces an earlier one. The remaining files follow
/// in name order.
#[derive(Debug, Clone, Default)]
pub struct DirectoryStore {
    entries: Vec<(String, PathBuf)>,
}

impl DirectoryStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        let io_err = |source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if entry.file_type().map_err(io_err)?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        let store = Self::from_paths(paths);
        log::info!("imported {} models from {}", store.len(), dir.display());
        Ok(store)
    }

    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut numbered = BTreeMap::new();
        let mut named = Vec::new();

        for path in paths {
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_owned) else {
                continue;
            };
            let Some((stem, _)) = name.split_once('.') else {
                continue;
            };
            match stem.parse::<u64>() {
                Ok(number) => {
                    numbered.insert(number, (name, path));
                }
                Err(_) => named.push((name, path)),
            }
        }
        named.sort();

        Self {
            entries: numbered.into_values().chain(named).collect(),
        }
    }
}

impl ModelStore for DirectoryStore {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(name, _)| name.as_str())
    }

    fn read(&self, index: usize) -> Result<Vec<u8>, StoreError> {
        let (_, path) = self.entries.get(index).ok_or(StoreError::OutOfRange {
            index,
            len: self.entries.len(),
        })?;
        fs::read(path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })
    }
}

/// Case-insensitive name filter over a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    query: String,
}

impl Catalog {
    pub fn new(query: &str) -> Self {
        Self {
            query: query.to_lowercase(),
        }
    }

    /// An empty query matches everything.
    pub fn matches(&self, name: &str) -> bool {
        self.query.is_empty() || name.to_lowercase().contains(&self.query)
    }

    /// Indices of the entries whose name matches, in store order.
    pub fn filter(&self, store: &dyn ModelStore) -> Vec<usize> {
        (0..store.len())
            .filter(|&i| store.name(i).is_some_and(|name| self.matches(name)))
            .collect()
    }
}
