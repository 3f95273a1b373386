// Cache file persistence.
// JSON serialization with timestamps and atomic replacement on disk.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::Result;

/// Wrapper for cached data with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    /// The cached data.
    pub data: T,
    /// When the data was written.
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }
}

/// True when `at` lies further in the past than `ttl`.
pub fn is_older_than(at: DateTime<Utc>, ttl: Duration) -> bool {
    let elapsed = Utc::now()
        .signed_duration_since(at)
        .to_std()
        .unwrap_or(Duration::ZERO);

    elapsed > ttl
}

/// Read cached JSON data from a file.
pub fn read_cached<T: DeserializeOwned>(path: &Path) -> Result<Option<CachedData<T>>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let cached: CachedData<T> = serde_json::from_str(&contents)?;
    Ok(Some(cached))
}

/// Write data to cache as JSON. Readers see either the old or the new file, never a mix.
pub fn write_cached<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let cached = CachedData::new(data);
    let json = serde_json::to_string(&cached)?;

    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Delete a cached file.
pub fn delete(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_write_and_read_cached() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("test.json");

        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        write_cached(&path, &data).unwrap();

        let cached: CachedData<TestData> = read_cached(&path).unwrap().unwrap();
        assert_eq!(cached.data, data);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_expiry() {
        let data = CachedData::new("test");
        assert!(!is_older_than(data.cached_at, Duration::from_secs(300)));

        let stale = Utc::now() - chrono::Duration::seconds(600);
        assert!(is_older_than(stale, Duration::from_secs(300)));
    }

    #[test]
    fn test_read_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.json");

        let cached: Option<CachedData<TestData>> = read_cached(&path).unwrap();
        assert!(cached.is_none());
    }

    #[test]
    fn test_write_fails_when_parent_is_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();

        let result = write_cached(&blocker.join("store.json"), &1u32);
        assert!(result.is_err());
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("gone.json");
        write_cached(&path, &1u32).unwrap();

        delete(&path).unwrap();
        assert!(!path.exists());
        delete(&path).unwrap();
    }
}
