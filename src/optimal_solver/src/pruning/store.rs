//! Where generated tables are kept between runs.

use super::{TableKey, UNPOPULATED};
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),
    #[error("Stored table has {actual} entries, expected {expected}")]
    Incomplete { expected: u64, actual: u64 },
}

/// A keyed blob store for pattern database tables.
pub trait PersistentStore {
    /// The stored table for `key`, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// If the backend fails, or holds only part of the table.
    fn read(&self, key: &TableKey) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `table` under `key`, replacing any previous table.
    ///
    /// # Errors
    ///
    /// If the backend fails.
    fn write(&self, key: &TableKey, table: &[u8]) -> Result<(), StoreError>;
}

impl<S: PersistentStore + ?Sized> PersistentStore for &S {
    fn read(&self, key: &TableKey) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &TableKey, table: &[u8]) -> Result<(), StoreError> {
        (**self).write(key, table)
    }
}

impl<S: PersistentStore + ?Sized> PersistentStore for Arc<S> {
    fn read(&self, key: &TableKey) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).read(key)
    }

    fn write(&self, key: &TableKey, table: &[u8]) -> Result<(), StoreError> {
        (**self).write(key, table)
    }
}

/// Tables as raw bytes in `<dir>/<key>.pdb`, one byte per entry and no
/// header.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path(&self, key: &TableKey) -> PathBuf {
        self.dir.join(format!("{key}.pdb"))
    }
}

impl PersistentStore for FileStore {
    fn read(&self, key: &TableKey) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &TableKey, table: &[u8]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        // Write then rename so a reader never sees a partial table
        let path = self.path(key);
        let partial = path.with_extension("pdb.partial");
        fs::write(&partial, table)?;
        fs::rename(partial, path)?;
        Ok(())
    }
}

/// An in-process store of tables as maps from stringified indices to
/// entries, the shape a generic key-value backend would hold them in.
#[derive(Debug, Default)]
pub struct KeyValueStore {
    tables: Mutex<HashMap<String, HashMap<String, u8>>>,
}

impl KeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove one entry of a stored table, returning whether it existed.
    pub fn remove_entry(&self, key: &TableKey, index: u64) -> bool {
        let mut tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        tables
            .get_mut(&key.to_string())
            .and_then(|entries| entries.remove(&index.to_string()))
            .is_some()
    }
}

impl PersistentStore for KeyValueStore {
    fn read(&self, key: &TableKey) -> Result<Option<Vec<u8>>, StoreError> {
        let tables = self.tables.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(entries) = tables.get(&key.to_string()) else {
            return Ok(None);
        };
        let expected = key.cardinality();
        let incomplete = || StoreError::Incomplete {
            expected,
            actual: entries.len() as u64,
        };
        if entries.len() as u64 != expected {
            return Err(incomplete());
        }
        let mut table = vec![UNPOPULATED; expected as usize];
        for (index, &entry) in entries {
            let slot = index
                .parse::<usize>()
                .ok()
                .and_then(|index| table.get_mut(index))
                .ok_or_else(incomplete)?;
            *slot = entry;
        }
        Ok(Some(table))
    }

    fn write(&self, key: &TableKey, table: &[u8]) -> Result<(), StoreError> {
        let entries = table
            .iter()
            .enumerate()
            .map(|(index, &entry)| (index.to_string(), entry))
            .collect();
        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), entries);
        Ok(())
    }
}

/// A store that keeps nothing, so every build generates its table.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullStore;

impl PersistentStore for NullStore {
    fn read(&self, _key: &TableKey) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(None)
    }

    fn write(&self, _key: &TableKey, _table: &[u8]) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pruning::{Orbit, PieceSubset};

    fn key() -> TableKey {
        PieceSubset::new(Orbit::Edges, vec![2]).unwrap().key()
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "optimal_solver_store_{name}_{}",
            fastrand::u64(..)
        ))
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = temp_dir("round_trip");
        let store = FileStore::new(&dir);
        let table = (0..24).collect::<Vec<u8>>();
        assert!(store.read(&key()).unwrap().is_none());
        store.write(&key(), &table).unwrap();
        assert_eq!(store.path(&key()), dir.join("edges_2_24.pdb"));
        assert_eq!(store.read(&key()).unwrap(), Some(table));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_key_value_store_round_trip() {
        let store = KeyValueStore::new();
        let table = (0..24).rev().collect::<Vec<u8>>();
        assert!(store.read(&key()).unwrap().is_none());
        store.write(&key(), &table).unwrap();
        assert_eq!(store.read(&key()).unwrap(), Some(table));
    }

    #[test]
    fn test_key_value_store_incomplete() {
        let store = KeyValueStore::new();
        store.write(&key(), &[0; 24]).unwrap();
        assert!(store.remove_entry(&key(), 7));
        assert!(!store.remove_entry(&key(), 7));
        assert!(matches!(
            store.read(&key()),
            Err(StoreError::Incomplete {
                expected: 24,
                actual: 23
            })
        ));
    }

    #[test]
    fn test_null_store() {
        let store = NullStore;
        store.write(&key(), &[0; 24]).unwrap();
        assert!(store.read(&key()).unwrap().is_none());
    }
}
