use std::sync::{Mutex, PoisonError};

use babel_types::SqlParams;
use rusqlite::{Connection, InterruptHandle};

use crate::error::StoreError;
use crate::params;

/// One mutating statement waiting in the write queue.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteJob {
    pub sql: String,
    pub params: SqlParams,
}

impl WriteJob {
    pub fn new(sql: impl Into<String>, params: SqlParams) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub changes: usize,
    pub last_insert_rowid: i64,
}

/// Runs write jobs on a blocking thread.
pub trait WriteExecutor: Send + Sync + 'static {
    fn execute(&self, job: &WriteJob) -> Result<WriteOutcome, StoreError>;

    /// Abort whatever statement is currently running, if any.
    fn interrupt(&self);
}

pub struct SqliteExecutor {
    conn: Mutex<Connection>,
    interrupt: InterruptHandle,
}

impl SqliteExecutor {
    pub fn new(conn: Connection) -> Self {
        let interrupt = conn.get_interrupt_handle();
        Self {
            conn: Mutex::new(conn),
            interrupt,
        }
    }
}

impl WriteExecutor for SqliteExecutor {
    fn execute(&self, job: &WriteJob) -> Result<WriteOutcome, StoreError> {
        let conn = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stmt = conn.prepare(&job.sql)?;
        params::bind(&mut stmt, &job.params)?;
        let changes = stmt.raw_execute()?;
        Ok(WriteOutcome {
            changes,
            last_insert_rowid: conn.last_insert_rowid(),
        })
    }

    fn interrupt(&self) {
        self.interrupt.interrupt();
    }
}
