pub mod natsort;
pub mod parser;
pub mod scanner;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use natsort::natural_sort;

const CATALOG_FILE: &str = "library.json";

/// One catalogued series: inferred name (unique key) and folder path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Outcome of a scan pass.
#[derive(Debug, Default)]
pub struct ScanSummary {
    pub catalogued: usize,
    /// Folders whose series name could not be inferred.
    pub skipped: Vec<String>,
}

/// The library root plus the persisted name -> path catalog.
///
/// The catalog document lives under the scanned root and is rewritten as a
/// whole after every mutation. A catalog with no entries is "cold":
/// `list_series` scans lazily before answering.
pub struct LibraryCatalog {
    root: PathBuf,
    catalog_path: PathBuf,
    threshold: usize,
    entries: Vec<SeriesEntry>,
}

impl LibraryCatalog {
    /// Open a catalog over `root`. Fails if `root` is not a directory.
    pub fn open(root: impl AsRef<Path>, threshold: usize) -> Result<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(Error::InvalidRoot(root.to_path_buf()));
        }

        // Owned absolute root; paths are always resolved against it rather
        // than the process working directory.
        let root = root.canonicalize()?;
        let catalog_path = root.join(CATALOG_FILE);

        let entries = if catalog_path.exists() {
            let content = fs::read_to_string(&catalog_path)
                .map_err(|e| Error::CatalogLoad(e.to_string()))?;
            serde_json::from_str(&content).map_err(|e| Error::CatalogLoad(e.to_string()))?
        } else {
            Vec::new()
        };

        Ok(Self {
            root,
            catalog_path,
            threshold,
            entries,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the root for series folders, infer their names and upsert the
    /// results. Folders without an inferable name are reported and skipped;
    /// the document is persisted once after the pass either way.
    pub fn scan(&mut self) -> Result<ScanSummary> {
        let folders = scanner::list_series_folders(&self.root, self.threshold);
        let mut summary = ScanSummary::default();

        for folder in folders {
            let path = self.root.join(&folder);
            let mut files = scanner::split_entries(&path).files;
            natural_sort(&mut files);

            let name = parser::infer_series_name(&files);
            if name.is_empty() {
                warn!(folder = %folder, "Could not infer series name, skipping");
                summary.skipped.push(folder);
                continue;
            }

            debug!(folder = %folder, name = %name, "Catalogued series");
            self.upsert_entry(name, path);
            summary.catalogued += 1;
        }

        self.persist()?;
        info!(
            catalogued = summary.catalogued,
            skipped = summary.skipped.len(),
            "Scan finished"
        );
        Ok(summary)
    }

    /// All catalogued series in catalog order. A cold catalog scans first.
    pub fn list_series(&mut self) -> Result<Vec<SeriesEntry>> {
        if self.entries.is_empty() {
            info!("Catalog is empty, scanning library root");
            self.scan()?;
        }
        Ok(self.entries.clone())
    }

    pub fn series(&self, name: &str) -> Option<&SeriesEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Direct files of a series folder in natural order. Not a directory
    /// is non-fatal and yields an empty list.
    pub fn list_episodes(&self, series_path: &Path) -> Vec<String> {
        if !series_path.is_dir() {
            debug!(path = %series_path.display(), "Not a series directory");
            return Vec::new();
        }
        let mut files = scanner::split_entries(series_path).files;
        natural_sort(&mut files);
        files
    }

    /// Insert or overwrite a series entry and persist immediately.
    pub fn upsert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Result<()> {
        self.upsert_entry(name.into(), path.into());
        self.persist()
    }

    fn upsert_entry(&mut self, name: String, path: PathBuf) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.path = path,
            None => self.entries.push(SeriesEntry { name, path }),
        }
    }

    /// Whole-document replace via a temp file in the same directory.
    fn persist(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| Error::CatalogPersist(e.to_string()))?;

        let dir = self.catalog_path.parent().unwrap_or(&self.root);
        let mut tmp =
            NamedTempFile::new_in(dir).map_err(|e| Error::CatalogPersist(e.to_string()))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| Error::CatalogPersist(e.to_string()))?;
        tmp.persist(&self.catalog_path)
            .map_err(|e| Error::CatalogPersist(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::File;

    use tempfile::TempDir;

    fn seed_series(root: &Path, folder: &str, prefix: &str, count: usize) -> PathBuf {
        let dir = root.join(folder);
        fs::create_dir(&dir).unwrap();
        for i in 1..=count {
            File::create(dir.join(format!("{} - {}.mkv", prefix, i))).unwrap();
        }
        dir
    }

    #[test]
    fn test_open_rejects_non_directory() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        assert!(matches!(
            LibraryCatalog::open(&missing, 10),
            Err(Error::InvalidRoot(_))
        ));
    }

    #[test]
    fn test_scan_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let show_dir = seed_series(tmp.path(), "ShowA", "ShowA", 12);

        let mut catalog = LibraryCatalog::open(tmp.path(), 10).unwrap();
        let summary = catalog.scan().unwrap();
        assert_eq!(summary.catalogued, 1);
        assert!(summary.skipped.is_empty());

        let entry = catalog.series("ShowA").unwrap();
        assert_eq!(entry.path, show_dir.canonicalize().unwrap());

        let episodes = catalog.list_episodes(&entry.path);
        assert_eq!(episodes.len(), 12);
        assert_eq!(episodes[0], "ShowA - 1.mkv");
        assert_eq!(episodes[1], "ShowA - 2.mkv");
        assert_eq!(episodes[11], "ShowA - 12.mkv");

        assert!(tmp.path().join(CATALOG_FILE).exists());
    }

    #[test]
    fn test_scan_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        seed_series(tmp.path(), "ShowA", "ShowA", 10);
        seed_series(tmp.path(), "ShowB", "ShowB", 11);

        let mut catalog = LibraryCatalog::open(tmp.path(), 10).unwrap();
        catalog.scan().unwrap();
        let first = fs::read(tmp.path().join(CATALOG_FILE)).unwrap();
        catalog.scan().unwrap();
        let second = fs::read(tmp.path().join(CATALOG_FILE)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_cold_list_series_scans_lazily() {
        let tmp = TempDir::new().unwrap();
        seed_series(tmp.path(), "ShowA", "ShowA", 10);

        let mut catalog = LibraryCatalog::open(tmp.path(), 10).unwrap();
        let series = catalog.list_series().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, "ShowA");
        assert!(tmp.path().join(CATALOG_FILE).exists());
    }

    #[test]
    fn test_warm_catalog_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        seed_series(tmp.path(), "ShowA", "ShowA", 10);

        let mut catalog = LibraryCatalog::open(tmp.path(), 10).unwrap();
        catalog.scan().unwrap();
        drop(catalog);

        let mut reopened = LibraryCatalog::open(tmp.path(), 10).unwrap();
        let series = reopened.list_series().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name, "ShowA");
    }

    #[test]
    fn test_uninferable_folder_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        // Ten files with nothing in common: no inferable name
        let dir = tmp.path().join("mixed");
        fs::create_dir(&dir).unwrap();
        for name in [
            "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india",
            "juliet",
        ] {
            File::create(dir.join(format!("{}.mkv", name))).unwrap();
        }
        seed_series(tmp.path(), "ShowA", "ShowA", 10);

        let mut catalog = LibraryCatalog::open(tmp.path(), 10).unwrap();
        let summary = catalog.scan().unwrap();
        assert_eq!(summary.catalogued, 1);
        assert_eq!(summary.skipped, vec!["mixed".to_string()]);
        assert!(catalog.series("ShowA").is_some());
    }

    #[test]
    fn test_upsert_overwrites_by_name() {
        let tmp = TempDir::new().unwrap();
        let mut catalog = LibraryCatalog::open(tmp.path(), 10).unwrap();

        catalog.upsert("ShowA", tmp.path().join("old")).unwrap();
        catalog.upsert("ShowA", tmp.path().join("new")).unwrap();

        let entry = catalog.series("ShowA").unwrap();
        assert_eq!(entry.path, tmp.path().join("new"));

        let reopened = LibraryCatalog::open(tmp.path(), 10).unwrap();
        assert_eq!(reopened.entries.len(), 1);
    }

    #[test]
    fn test_list_episodes_outside_directory() {
        let tmp = TempDir::new().unwrap();
        let catalog = LibraryCatalog::open(tmp.path(), 10).unwrap();
        assert!(catalog.list_episodes(&tmp.path().join("gone")).is_empty());
    }
}
