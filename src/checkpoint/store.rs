use crate::checkpoint::Checkpoint;
use chrono::Utc;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from checkpoint persistence
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Checkpoint I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Checkpoint serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persists checkpoints with an atomic write-then-rename.
///
/// A save writes the full snapshot to `<path>.tmp`, syncs it, then renames
/// over the real path. Readers therefore only ever observe the previous
/// complete snapshot or the new one, never a torn write.
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the checkpoint if one exists.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(checkpoint))` - A prior snapshot was found and parsed
    /// * `Ok(None)` - No checkpoint file exists (fresh start)
    /// * `Err(_)` - The file exists but is unreadable or corrupt
    pub fn load(&self) -> Result<Option<Checkpoint>, CheckpointError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let checkpoint = serde_json::from_str(&data)?;
        Ok(Some(checkpoint))
    }

    /// Saves a snapshot, bumping its sequence number and timestamp
    pub fn save(&self, checkpoint: &mut Checkpoint) -> Result<(), CheckpointError> {
        checkpoint.sequence += 1;
        checkpoint.updated_at = Utc::now();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(checkpoint)?;
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&data)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(
            "checkpoint saved: seq={} page={} records={}",
            checkpoint.sequence,
            checkpoint.last_page,
            checkpoint.listings.len()
        );
        Ok(())
    }

    /// Removes the checkpoint file; absence is not an error
    pub fn delete(&self) -> Result<(), CheckpointError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Listing;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> CheckpointStore {
        CheckpointStore::new(dir.path().join("checkpoint.json"))
    }

    #[test]
    fn test_load_absent_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut cp = Checkpoint::new("abc123".to_string());
        let mut listing = Listing::new("42".to_string());
        listing.price = Some(150_000);
        cp.absorb_records(vec![listing]);
        cp.complete_page(3);
        store.save(&mut cp).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.sequence, 1);
        assert_eq!(loaded.last_page, 3);
        assert_eq!(loaded.config_hash, "abc123");
        assert_eq!(loaded.listings["42"].price, Some(150_000));
    }

    #[test]
    fn test_sequence_increments_each_save() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let mut cp = Checkpoint::new("h".to_string());
        store.save(&mut cp).unwrap();
        store.save(&mut cp).unwrap();
        assert_eq!(store.load().unwrap().unwrap().sequence, 2);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&mut Checkpoint::new("h".to_string())).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["checkpoint.json"]);
    }

    #[test]
    fn test_corrupt_checkpoint_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn test_delete_absent_is_ok() {
        let dir = TempDir::new().unwrap();
        assert!(store_in(&dir).delete().is_ok());
    }
}
