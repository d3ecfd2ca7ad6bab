use std::path::Path;

use rusqlite::{Connection, OpenFlags};

const MIGRATIONS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS folders (
        folder_id INTEGER PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        last_accessed DATETIME,
        is_favorite BOOLEAN DEFAULT 0
    );",
    "CREATE TABLE IF NOT EXISTS translations (
        translation_id INTEGER PRIMARY KEY,
        folder_id INTEGER NOT NULL REFERENCES folders(folder_id) ON DELETE CASCADE,
        source_text TEXT NOT NULL,
        deepl_translated TEXT,
        manual_translated TEXT,
        notes TEXT,
        created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
        is_favorite BOOLEAN DEFAULT 0
    );",
    "CREATE INDEX IF NOT EXISTS idx_translations_folder ON translations(folder_id);",
    // Refresh updated_at unless the statement set it explicitly
    "CREATE TRIGGER IF NOT EXISTS folders_touch AFTER UPDATE ON folders
     WHEN NEW.updated_at = OLD.updated_at BEGIN
        UPDATE folders SET updated_at = CURRENT_TIMESTAMP WHERE folder_id = NEW.folder_id;
     END;",
    "CREATE TRIGGER IF NOT EXISTS translations_touch AFTER UPDATE ON translations
     WHEN NEW.updated_at = OLD.updated_at BEGIN
        UPDATE translations SET updated_at = CURRENT_TIMESTAMP
        WHERE translation_id = NEW.translation_id;
     END;",
];

/// Writer connection: WAL, foreign keys on, migrations applied.
pub fn open_writer(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    run(&conn)?;
    Ok(conn)
}

/// Read-only connection used by queries that bypass the write queue.
pub fn open_reader(path: &Path) -> Result<Connection, rusqlite::Error> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
}

pub fn run(conn: &Connection) -> Result<(), rusqlite::Error> {
    for migration in MIGRATIONS {
        conn.execute_batch(migration)?;
    }
    tracing::info!("Database migrations complete");
    Ok(())
}
