use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::config;
use crate::error::{Error, Result};

/// Last-watched episode for a series. `episode` is a basename, never a
/// full path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchRecord {
    pub episode: String,
    #[serde(default)]
    pub position_ms: u64,
}

/// Per-series watch records in a single JSON document, last write wins.
///
/// Each save is a read-modify-write of the whole document under one lock,
/// replaced atomically on disk, so a manual stop racing an end-of-playback
/// save cannot interleave. Records are never evicted.
pub struct WatchStateStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl WatchStateStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at the user-level data location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::at(config::watch_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, series: &str, episode: &str, position_ms: u64) -> Result<()> {
        let _guard = self.lock.lock().unwrap();

        let mut records = self.read_document()?;
        records.insert(
            series.to_string(),
            WatchRecord {
                episode: episode.to_string(),
                position_ms,
            },
        );
        self.write_document(&records)?;

        debug!(series = %series, episode = %episode, position_ms, "Saved watch record");
        Ok(())
    }

    pub fn load(&self, series: &str) -> Result<Option<WatchRecord>> {
        let _guard = self.lock.lock().unwrap();
        Ok(self.read_document()?.remove(series))
    }

    /// Missing document reads as empty; a corrupt one is surfaced, not
    /// silently discarded.
    fn read_document(&self) -> Result<BTreeMap<String, WatchRecord>> {
        if !self.path.is_file() {
            return Ok(BTreeMap::new());
        }
        let content =
            fs::read_to_string(&self.path).map_err(|e| Error::WatchLoad(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| Error::WatchLoad(e.to_string()))
    }

    /// Whole-document atomic replace; parent directories created on demand.
    fn write_document(&self, records: &BTreeMap<String, WatchRecord>) -> Result<()> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| Error::WatchPersist(e.to_string()))?;

        let Some(dir) = self.path.parent() else {
            return Err(Error::WatchPersist(format!(
                "no parent directory for {}",
                self.path.display()
            )));
        };
        fs::create_dir_all(dir).map_err(|e| Error::WatchPersist(e.to_string()))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::WatchPersist(e.to_string()))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| Error::WatchPersist(e.to_string()))?;
        tmp.persist(&self.path)
            .map_err(|e| Error::WatchPersist(e.to_string()))?;
        Ok(())
    }
}
