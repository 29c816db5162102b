//! Durable registry snapshots.
//!
//! The whole registry is serialized to a single JSON file after every
//! mutating operation and read back once at startup. Saves go through a
//! temporary file in the same directory followed by a rename, so a crash
//! mid-write can never leave a torn state file behind.

use super::error::DriverError;
use super::volume::VolumeRecord;
use log::debug;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Loads and saves the volume registry snapshot.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Creates a store backed by the given state-file path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the backing state file.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Reads the persisted registry.
    ///
    /// A missing file is a fresh install and yields an empty registry.
    /// A file that exists but cannot be decoded yields
    /// [`DriverError::CorruptState`]; the caller must treat that as fatal
    /// rather than continue with guessed state.
    pub fn load(&self) -> Result<HashMap<String, VolumeRecord>, DriverError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no state found at {}", self.path.display());
                return Ok(HashMap::new());
            }
            Err(err) => return Err(err.into()),
        };

        serde_json::from_slice(&data).map_err(|err| {
            DriverError::CorruptState(format!("{}: {}", self.path.display(), err))
        })
    }

    /// Atomically replaces the persisted registry with `volumes`.
    pub fn save(&self, volumes: &HashMap<String, VolumeRecord>) -> Result<(), DriverError> {
        let parent = self.path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let mut tmp = NamedTempFile::new_in(parent)?;
        serde_json::to_writer(&mut tmp, volumes)
            .map_err(|err| DriverError::Io(err.into()))?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|err| DriverError::Io(err.error))?;
        debug!("saved {} volume(s) to {}", volumes.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::path::Path;

    fn sample_volumes() -> HashMap<String, VolumeRecord> {
        let options: HashMap<String, String> = [("host", "example.org"), ("token", "t0ken")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let record = VolumeRecord::from_options(&options, Path::new("/tmp/volumes")).unwrap();
        HashMap::from([("v1".to_string(), record)])
    }

    #[test]
    fn test_load_missing_file_is_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = StateStore::new(dir.path().join("state.json"));
        assert!(store.load()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_save_load_roundtrip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = StateStore::new(dir.path().join("state.json"));

        let volumes = sample_volumes();
        store.save(&volumes)?;
        let loaded = store.load()?;
        assert_eq!(loaded, volumes);
        Ok(())
    }

    #[test]
    fn test_malformed_state_is_corrupt() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("state.json");
        fs::write(&path, b"{ not json")?;

        let store = StateStore::new(path);
        match store.load() {
            Err(DriverError::CorruptState(_)) => Ok(()),
            other => panic!("expected CorruptState, got {:?}", other.map(|m| m.len())),
        }
    }

    #[test]
    fn test_save_replaces_previous_snapshot() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = StateStore::new(dir.path().join("state.json"));

        store.save(&sample_volumes())?;
        store.save(&HashMap::new())?;
        assert!(store.load()?.is_empty());

        // The temporary file must not linger next to the snapshot.
        let entries: Vec<_> = fs::read_dir(dir.path())?.collect();
        assert_eq!(entries.len(), 1);
        Ok(())
    }
}
