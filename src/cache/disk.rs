//! Disk tier: one JSON file per key
//!
//! Files are written under a process-unique temporary name and renamed into
//! place, so readers never see a half-written entry from a live writer. A
//! file that still fails to parse or names a different key is reported as
//! corrupt and removed by the caller.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;

const ENTRY_EXTENSION: &str = "json";
const TEMP_EXTENSION: &str = "tmp";

#[derive(Serialize)]
struct EntryRef<'a> {
    key: &'a str,
    geometry: &'a Geometry,
}

#[derive(Deserialize)]
struct Entry {
    key: String,
    geometry: Geometry,
}

/// Outcome of reading one entry
pub(crate) enum DiskRead {
    Hit(Geometry),
    Missing,
    Corrupt(String),
}

#[derive(Debug)]
pub(crate) struct DiskStore {
    dir: PathBuf,
}

impl DiskStore {
    pub fn open(dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Keys reach the filesystem only if they are plain file-name tokens
    pub fn accepts(key: &str) -> bool {
        !key.is_empty()
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{ENTRY_EXTENSION}"))
    }

    pub fn read(&self, key: &str) -> DiskRead {
        let file = match File::open(self.entry_path(key)) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return DiskRead::Missing,
            Err(e) => return DiskRead::Corrupt(format!("unreadable: {e}")),
        };
        match serde_json::from_reader::<_, Entry>(BufReader::new(file)) {
            Ok(entry) if entry.key == key => DiskRead::Hit(entry.geometry),
            Ok(entry) => DiskRead::Corrupt(format!("entry names key {}", entry.key)),
            Err(e) => DiskRead::Corrupt(e.to_string()),
        }
    }

    pub fn write(&self, key: &str, geometry: &Geometry) -> io::Result<()> {
        let final_path = self.entry_path(key);
        let temp_path = self
            .dir
            .join(format!(".{key}.{}.{TEMP_EXTENSION}", std::process::id()));

        let written = Self::write_entry(&temp_path, key, geometry)
            .and_then(|()| fs::rename(&temp_path, &final_path));
        if written.is_err() {
            let _ = fs::remove_file(&temp_path); // Ignore errors
        }
        written
    }

    fn write_entry(path: &Path, key: &str, geometry: &Geometry) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &EntryRef { key, geometry })?;
        writer.flush()
    }

    pub fn remove(&self, key: &str) {
        let _ = fs::remove_file(self.entry_path(key)); // Ignore errors
    }

    /// Number of complete entries on disk
    pub fn len(&self) -> usize {
        self.files_with(ENTRY_EXTENSION).count()
    }

    /// Remove every entry and leftover temporary file
    pub fn clear(&self) {
        let doomed: Vec<PathBuf> = self
            .files_with(ENTRY_EXTENSION)
            .chain(self.files_with(TEMP_EXTENSION))
            .collect();
        for path in doomed {
            let _ = fs::remove_file(path); // Ignore errors
        }
    }

    fn files_with<'a>(&'a self, extension: &'a str) -> impl Iterator<Item = PathBuf> + 'a {
        fs::read_dir(&self.dir)
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(move |path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == extension)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::test_shapes::rect;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let store = DiskStore::open(dir.path().to_path_buf()).unwrap();
        let geometry = rect(0.0, 0.0, 1.0, 1.0);

        store.write("abc123", &geometry).unwrap();
        assert!(matches!(store.read("abc123"), DiskRead::Hit(g) if g == geometry));
        assert!(matches!(store.read("other"), DiskRead::Missing));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_truncated_file_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = DiskStore::open(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("abc.json"), b"{\"key\":\"abc\",\"geom").unwrap();
        assert!(matches!(store.read("abc"), DiskRead::Corrupt(_)));
    }

    #[test]
    fn test_foreign_key_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = DiskStore::open(dir.path().to_path_buf()).unwrap();
        store.write("abc", &rect(0.0, 0.0, 1.0, 1.0)).unwrap();
        fs::rename(dir.path().join("abc.json"), dir.path().join("def.json")).unwrap();
        assert!(matches!(store.read("def"), DiskRead::Corrupt(_)));
    }

    #[test]
    fn test_key_filter() {
        assert!(DiskStore::accepts("0af3_b-9"));
        assert!(!DiskStore::accepts("../escape"));
        assert!(!DiskStore::accepts(""));
    }

    #[test]
    fn test_clear_removes_entries_and_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = DiskStore::open(dir.path().to_path_buf()).unwrap();
        store.write("a", &rect(0.0, 0.0, 1.0, 1.0)).unwrap();
        fs::write(dir.path().join(".b.1.tmp"), b"partial").unwrap();
        store.clear();
        assert_eq!(store.len(), 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
