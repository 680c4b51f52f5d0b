use std::fs;
use std::path::Path;

use tracing::debug;

use super::natsort::natural_cmp;

/// A directory listing partitioned by filesystem type, names only.
#[derive(Debug, Default)]
pub struct DirSplit {
    pub files: Vec<String>,
    pub dirs: Vec<String>,
}

/// Partition the direct entries of `base` into files and subdirectories.
/// Unreadable directories yield an empty split.
pub fn split_entries(base: &Path) -> DirSplit {
    let Ok(entries) = fs::read_dir(base) else {
        debug!(path = %base.display(), "Could not read directory");
        return DirSplit::default();
    };

    let mut split = DirSplit::default();
    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name().to_string_lossy().to_string();
        if entry.path().is_file() {
            split.files.push(name);
        } else {
            split.dirs.push(name);
        }
    }
    split
}

/// A folder counts as a series when it directly holds at least
/// `threshold` files (non-recursive).
pub fn is_series_folder(path: &Path, threshold: usize) -> bool {
    if !path.is_dir() {
        return false;
    }
    split_entries(path).files.len() >= threshold
}

/// Names of the direct subdirectories of `root` that look like series
/// folders, sorted so repeated scans walk them in the same order.
pub fn list_series_folders(root: &Path, threshold: usize) -> Vec<String> {
    let Ok(entries) = fs::read_dir(root) else {
        debug!(path = %root.display(), "Could not read library root");
        return Vec::new();
    };

    let mut folders: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| is_series_folder(&e.path(), threshold))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();

    folders.sort_by(|a, b| natural_cmp(a, b));
    folders
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::File;

    use tempfile::TempDir;

    fn touch_files(dir: &Path, count: usize) {
        for i in 1..=count {
            File::create(dir.join(format!("Show - {:02}.mkv", i))).unwrap();
        }
    }

    #[test]
    fn test_split_entries() {
        let tmp = TempDir::new().unwrap();
        File::create(tmp.path().join("a.mkv")).unwrap();
        File::create(tmp.path().join("b.mkv")).unwrap();
        fs::create_dir(tmp.path().join("extras")).unwrap();

        let split = split_entries(tmp.path());
        assert_eq!(split.files.len(), 2);
        assert_eq!(split.dirs, vec!["extras".to_string()]);
    }

    #[test]
    fn test_series_threshold_is_inclusive() {
        let tmp = TempDir::new().unwrap();
        let nine = tmp.path().join("nine");
        let ten = tmp.path().join("ten");
        fs::create_dir(&nine).unwrap();
        fs::create_dir(&ten).unwrap();
        touch_files(&nine, 9);
        touch_files(&ten, 10);

        assert!(!is_series_folder(&nine, 10));
        assert!(is_series_folder(&ten, 10));
    }

    #[test]
    fn test_subdirectories_do_not_count() {
        let tmp = TempDir::new().unwrap();
        let show = tmp.path().join("show");
        fs::create_dir(&show).unwrap();
        touch_files(&show, 9);
        fs::create_dir(show.join("extras")).unwrap();

        assert!(!is_series_folder(&show, 10));
    }

    #[test]
    fn test_not_a_directory() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("loose.mkv");
        File::create(&file).unwrap();

        assert!(!is_series_folder(&file, 10));
    }

    #[test]
    fn test_list_series_folders() {
        let tmp = TempDir::new().unwrap();
        let full = tmp.path().join("Full Show");
        let sparse = tmp.path().join("Sparse");
        fs::create_dir(&full).unwrap();
        fs::create_dir(&sparse).unwrap();
        touch_files(&full, 12);
        touch_files(&sparse, 3);
        File::create(tmp.path().join("loose.mkv")).unwrap();

        let folders = list_series_folders(tmp.path(), 10);
        assert_eq!(folders, vec!["Full Show".to_string()]);
    }

    #[test]
    fn test_lower_threshold_from_config() {
        let tmp = TempDir::new().unwrap();
        let show = tmp.path().join("short");
        fs::create_dir(&show).unwrap();
        touch_files(&show, 3);

        assert!(is_series_folder(&show, 3));
        assert_eq!(list_series_folders(tmp.path(), 3).len(), 1);
    }
}
