use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::core::error::AppResult;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// In-memory database path, mostly for tests
pub const IN_MEMORY: &str = ":memory:";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tag_mappings (
    chat_id INTEGER NOT NULL,
    tag TEXT NOT NULL,
    category TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (chat_id, tag)
);

CREATE TABLE IF NOT EXISTS categories (
    name TEXT PRIMARY KEY,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS media_group_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chat_id INTEGER NOT NULL,
    media_group_id TEXT NOT NULL,
    message_id INTEGER NOT NULL,
    photos_json TEXT NOT NULL,
    UNIQUE (chat_id, media_group_id, message_id)
);

CREATE TABLE IF NOT EXISTS media_group_tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    chat_id INTEGER NOT NULL,
    media_group_id TEXT NOT NULL,
    tag TEXT NOT NULL,
    UNIQUE (chat_id, media_group_id, tag)
);
"#;

/// Create a new database connection pool
///
/// Creates the schema on the first connection. An in-memory database lives
/// only as long as its connection, so `":memory:"` gets a single connection
/// that is never recycled.
///
/// # Example
///
/// ```no_run
/// use spike::storage::db;
///
/// let pool = db::create_pool("spike.sqlite")?;
/// # Ok::<(), spike::core::AppError>(())
/// ```
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path);
    let builder = if database_path == IN_MEMORY {
        Pool::builder().max_size(1).max_lifetime(None).idle_timeout(None)
    } else {
        Pool::builder().max_size(4)
    };
    let pool = builder.build(manager)?;

    let conn = pool.get()?;
    init_schema(&conn)?;
    log::info!("Database ready at {}", database_path);

    Ok(pool)
}

/// Get a connection from the pool
pub fn get_connection(pool: &DbPool) -> AppResult<DbConnection> {
    Ok(pool.get()?)
}

fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}
