//! Directory-backed persistence for calculator data and tracked snapshots
//!
//! The full snapshot is written twice: a primary file and an autosave copy
//! that is read only when the primary file is missing or unreadable.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::LoadError;
use crate::household::{CalculatorData, PortfolioSnapshot};

const PRIMARY_FILE: &str = "calculator_data.json";
const AUTOSAVE_FILE: &str = "retirement_calculator_autosave.json";
const SNAPSHOTS_FILE: &str = "portfolio_snapshots.json";

/// JSON files under one directory
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, LoadError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the snapshot to the primary file and the autosave copy
    pub fn save(&self, data: &CalculatorData) -> Result<(), LoadError> {
        let json = serde_json::to_string_pretty(data)?;
        fs::write(self.dir.join(PRIMARY_FILE), &json)?;
        fs::write(self.dir.join(AUTOSAVE_FILE), &json)?;
        debug!("Saved calculator data to {}", self.dir.display());
        Ok(())
    }

    /// Primary file, then the autosave copy, then None
    pub fn load(&self) -> Option<CalculatorData> {
        for name in [PRIMARY_FILE, AUTOSAVE_FILE] {
            match read_json::<CalculatorData>(&self.dir.join(name)) {
                Ok(Some(data)) => return Some(data),
                Ok(None) => {}
                Err(err) => warn!("Ignoring unreadable {}: {}", name, err),
            }
        }
        None
    }

    /// Tracked snapshots in insertion order
    pub fn snapshots(&self) -> Result<Vec<PortfolioSnapshot>, LoadError> {
        Ok(read_json(&self.dir.join(SNAPSHOTS_FILE))?.unwrap_or_default())
    }

    /// Append a snapshot; returns its index
    pub fn add_snapshot(&self, snapshot: PortfolioSnapshot) -> Result<usize, LoadError> {
        let mut snapshots = self.snapshots()?;
        snapshots.push(snapshot);
        self.write_snapshots(&snapshots)?;
        Ok(snapshots.len() - 1)
    }

    /// Remove the snapshot at `index`; false if there is none
    pub fn delete_snapshot(&self, index: usize) -> Result<bool, LoadError> {
        let mut snapshots = self.snapshots()?;
        if index >= snapshots.len() {
            return Ok(false);
        }
        snapshots.remove(index);
        self.write_snapshots(&snapshots)?;
        Ok(true)
    }

    /// Remove every stored file
    pub fn clear_all(&self) -> Result<(), LoadError> {
        for name in [PRIMARY_FILE, AUTOSAVE_FILE, SNAPSHOTS_FILE] {
            match fs::remove_file(self.dir.join(name)) {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    fn write_snapshots(&self, snapshots: &[PortfolioSnapshot]) -> Result<(), LoadError> {
        let json = serde_json::to_string_pretty(snapshots)?;
        fs::write(self.dir.join(SNAPSHOTS_FILE), json)?;
        Ok(())
    }
}

/// Ok(None) when the file does not exist
fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>, LoadError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_str(&text)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn temp_store(name: &str) -> SnapshotStore {
        let dir = std::env::temp_dir().join(format!("retirement_store_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        SnapshotStore::open(dir).unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let store = temp_store("save_load");
        assert!(store.load().is_none());

        let data = CalculatorData::default_snapshot(2024);
        store.save(&data).unwrap();
        assert_eq!(store.load(), Some(data));

        store.clear_all().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_autosave_fallback() {
        let store = temp_store("fallback");
        let data = CalculatorData::default_snapshot(2025);
        store.save(&data).unwrap();

        fs::write(store.dir().join(PRIMARY_FILE), "{ not json").unwrap();
        assert_eq!(store.load(), Some(data.clone()));

        fs::remove_file(store.dir().join(PRIMARY_FILE)).unwrap();
        assert_eq!(store.load(), Some(data));
    }

    #[test]
    fn test_snapshot_list() {
        let store = temp_store("snapshots");
        assert!(store.snapshots().unwrap().is_empty());

        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(store.add_snapshot(PortfolioSnapshot::new(date, 1.0)).unwrap(), 0);
        assert_eq!(store.add_snapshot(PortfolioSnapshot::new(date, 2.0)).unwrap(), 1);

        assert!(store.delete_snapshot(0).unwrap());
        assert!(!store.delete_snapshot(5).unwrap());

        let remaining = store.snapshots().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].total_value, 2.0);
        assert_eq!(remaining[0].date, date);

        store.clear_all().unwrap();
        assert!(store.snapshots().unwrap().is_empty());
    }
}
