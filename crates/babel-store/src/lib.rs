mod error;
mod executor;
mod params;
mod queue;
pub mod schema;

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use babel_config::database::DatabaseConfig;
use babel_types::{ReadMode, SqlParams};
use rusqlite::Connection;
use serde_json::Value;

pub use error::StoreError;
pub use executor::{SqliteExecutor, WriteExecutor, WriteJob, WriteOutcome};
pub use queue::WriteQueue;

/// The translations database: queued writes, direct reads.
pub struct Store {
    path: PathBuf,
    writes: WriteQueue,
    reader: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open(config: &DatabaseConfig) -> Result<Self, StoreError> {
        Self::open_at(
            config.resolved_path(),
            Duration::from_millis(config.write_timeout_ms),
        )
    }

    /// Open (creating if needed) the database at `path`. Needs a tokio runtime.
    pub fn open_at(path: impl Into<PathBuf>, write_timeout: Duration) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let writer = schema::open_writer(&path)?;
        let reader = schema::open_reader(&path)?;
        tracing::info!("Database initialized at {:?}", path);

        let executor = Arc::new(SqliteExecutor::new(writer));
        Ok(Self {
            path,
            writes: WriteQueue::spawn(executor, write_timeout),
            reader: Arc::new(Mutex::new(reader)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Queue a mutating statement; see [`WriteQueue::enqueue`] for ordering.
    pub fn write(
        &self,
        sql: impl Into<String>,
        params: SqlParams,
    ) -> impl Future<Output = Result<WriteOutcome, StoreError>> + Send + 'static {
        self.writes.enqueue(WriteJob::new(sql, params))
    }

    /// Run a query on the reader connection, outside the write queue.
    ///
    /// `Get` yields the first row or `null`, `All` an array of rows.
    pub async fn read(
        &self,
        mode: ReadMode,
        sql: String,
        params: SqlParams,
    ) -> Result<Value, StoreError> {
        let reader = self.reader.clone();
        tokio::task::spawn_blocking(move || -> Result<Value, StoreError> {
            let conn = reader.lock().unwrap_or_else(PoisonError::into_inner);
            let mut stmt = conn.prepare(&sql)?;
            match mode {
                ReadMode::Get => {
                    let rows = params::query_rows(&mut stmt, &params, Some(1))?;
                    Ok(rows.into_iter().next().unwrap_or(Value::Null))
                }
                ReadMode::All => Ok(Value::Array(params::query_rows(
                    &mut stmt, &params, None,
                )?)),
            }
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }

    /// Drain pending writes and stop the queue. Later writes fail with `QueueClosed`.
    pub async fn shutdown(&self) {
        self.writes.shutdown().await;
        tracing::info!("Database closed");
    }
}
