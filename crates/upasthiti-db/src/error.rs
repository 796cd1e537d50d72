//! Storage-specific error types and conversions.

use std::path::PathBuf;

use upasthiti_core::error::UpasthitiError;

/// Storage-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt store file {}: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Store write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<DbError> for UpasthitiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => UpasthitiError::NotFound { entity, id },
            other => UpasthitiError::Storage(other.to_string()),
        }
    }
}
