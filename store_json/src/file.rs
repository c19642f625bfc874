//! Snapshot file with atomic replace.

use hush_store::{Records, SnapshotStore, StoreError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::JsonStoreError;

/// On-disk layout: `{"muted_users": {"<target>": <record>, ...}}`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    #[serde(default)]
    pub muted_users: Records,
}

/// A [`SnapshotStore`] persisting to one JSON file.
#[derive(Clone, Debug)]
pub struct JsonSnapshotFile {
    path: PathBuf,
}

impl JsonSnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Write the document to the temporary sibling, flush it to disk, then
    /// rename it over the snapshot.
    pub fn write_document(&self, doc: &SnapshotDocument) -> Result<(), JsonStoreError> {
        let bytes = serde_json::to_vec_pretty(doc).map_err(JsonStoreError::Encode)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| JsonStoreError::io(parent, e))?;
        }

        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp).map_err(|e| JsonStoreError::io(&tmp, e))?;
            file.write_all(&bytes)
                .map_err(|e| JsonStoreError::io(&tmp, e))?;
            file.sync_all().map_err(|e| JsonStoreError::io(&tmp, e))?;
        }
        fs::rename(&tmp, &self.path).map_err(|e| JsonStoreError::io(&self.path, e))?;

        tracing::trace!(path = %self.path.display(), bytes = bytes.len(), "snapshot written");
        Ok(())
    }

    /// Read the document. A missing file yields `Ok(None)`.
    pub fn read_document(&self) -> Result<Option<SnapshotDocument>, JsonStoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(JsonStoreError::io(&self.path, e)),
        };
        let doc = serde_json::from_slice(&raw).map_err(|source| JsonStoreError::Malformed {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(Some(doc))
    }
}

impl SnapshotStore for JsonSnapshotFile {
    fn save(&self, records: &Records) -> Result<(), StoreError> {
        let doc = SnapshotDocument {
            muted_users: records.clone(),
        };
        self.write_document(&doc).map_err(Into::into)
    }

    fn load(&self) -> Result<Option<Records>, StoreError> {
        Ok(self.read_document()?.map(|doc| doc.muted_users))
    }
}
