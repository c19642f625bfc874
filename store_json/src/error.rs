use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JsonStoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

impl JsonStoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        JsonStoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl From<JsonStoreError> for hush_store::StoreError {
    fn from(e: JsonStoreError) -> Self {
        let message = e.to_string();
        match e {
            JsonStoreError::Io { path, source } => hush_store::StoreError::Io {
                path,
                message: source.to_string(),
            },
            JsonStoreError::Malformed { .. } => hush_store::StoreError::Corruption(message),
            JsonStoreError::Encode(_) => hush_store::StoreError::Serialization(message),
        }
    }
}
