//! Single-writer JSON collection backed by one file.
//!
//! The file holds a flat JSON array. All mutations go through one async
//! mutex, are written to a sibling `*.tmp` file and renamed over the
//! original; the in-memory copy is only replaced after the rename
//! succeeds. A failed write leaves both disk and memory at the previous
//! state.
//!
//! The write and the swap run on a spawned task that owns the lock, so a
//! caller that is cancelled mid-update cannot leave memory behind disk.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::DbError;

pub struct JsonStore<T> {
    path: PathBuf,
    records: Arc<Mutex<Vec<T>>>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Open the collection at `path`, creating it as `[]` when absent.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, DbError> {
        let path = path.into();

        let records = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| DbError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                write_atomic(&path, b"[]").await?;
                Vec::new()
            }
            Err(e) => return Err(DbError::io(&path, e)),
        };

        debug!(path = %path.display(), records = records.len(), "Opened JSON store");

        Ok(Self {
            path,
            records: Arc::new(Mutex::new(records)),
        })
    }

    /// Snapshot of every record in insertion order.
    pub async fn read(&self) -> Vec<T> {
        self.records.lock().await.clone()
    }

    /// First record matching `predicate`.
    pub async fn find<P>(&self, predicate: P) -> Option<T>
    where
        P: Fn(&T) -> bool + Send,
    {
        self.records
            .lock()
            .await
            .iter()
            .find(|r| predicate(r))
            .cloned()
    }

    /// Append one record and persist.
    pub async fn append(&self, record: T) -> Result<T, DbError> {
        self.update(move |records| {
            records.push(record.clone());
            Ok(record)
        })
        .await
    }

    /// Run `f` against a working copy of the collection and persist the
    /// result.
    ///
    /// If `f` returns an error nothing is written. The mutex is held for
    /// the whole read-modify-write so concurrent updates are serialized.
    /// Once `f` succeeds the commit finishes even if this future is
    /// dropped.
    pub async fn update<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, E> + Send,
        R: Send,
        E: From<DbError> + Send,
    {
        let mut guard = Arc::clone(&self.records).lock_owned().await;
        let mut working = guard.clone();

        let out = f(&mut working)?;

        let bytes = serde_json::to_vec_pretty(&working).map_err(DbError::from)?;
        let path = self.path.clone();
        let commit = tokio::spawn(async move {
            write_atomic(&path, &bytes).await?;
            *guard = working;
            Ok::<_, DbError>(())
        });
        commit.await.map_err(DbError::from)??;

        Ok(out)
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DbError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = tokio::fs::File::create(&tmp)
        .await
        .map_err(|e| DbError::io(&tmp, e))?;
    file.write_all(bytes)
        .await
        .map_err(|e| DbError::io(&tmp, e))?;
    file.sync_all().await.map_err(|e| DbError::io(&tmp, e))?;
    drop(file);

    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| DbError::io(path, e))
}
