//! JSON snapshot persistence for the store.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{Route, Schedule, User};

use super::error::StoreError;

/// All collections, in storage order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Collections {
    pub schedules: Vec<Schedule>,
    pub routes: Vec<Route>,
    pub users: Vec<User>,
}

/// A snapshot file on disk.
#[derive(Debug, Clone)]
pub(crate) struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Load the snapshot. A missing file is an empty store.
    pub async fn load(&self) -> Result<Collections, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Collections::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the snapshot.
    ///
    /// The new contents go to a sibling temporary file which is then renamed
    /// over the old snapshot, so a reader never sees a half-written file.
    /// Creates parent directories if they don't exist.
    pub async fn save(&self, collections: &Collections) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(collections).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RecordId;
    use tempfile::tempdir;

    #[tokio::test]
    async fn save_and_load() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("bus.json"));

        let collections = Collections {
            routes: vec![Route {
                id: RecordId::from("r1"),
                from: "Kochi".into(),
                to: "Chennai".into(),
            }],
            ..Default::default()
        };

        file.save(&collections).await.unwrap();
        assert_eq!(file.load().await.unwrap(), collections);
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let file = SnapshotFile::new(dir.path().join("absent.json"));
        assert_eq!(file.load().await.unwrap(), Collections::default());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bus.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = SnapshotFile::new(&path).load().await.unwrap_err();
        assert!(matches!(err, StoreError::Json { .. }));
    }

    #[tokio::test]
    async fn creates_parent_directories_and_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("bus.json");
        let file = SnapshotFile::new(&path);

        file.save(&Collections::default()).await.unwrap();

        assert!(path.exists());
        assert!(!dir.path().join("nested/dir/bus.json.tmp").exists());
    }
}
