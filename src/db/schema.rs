use tracing::info;

use super::DbPool;
use crate::errors::StoreError;

/// Columns that were added after the first version of the schema.
/// Databases created by older releases get them through `ensure_column`.
const LATE_COLUMNS: [(&str, &str, &str); 3] = [
    ("users", "is_admin", "INTEGER NOT NULL DEFAULT 0"),
    ("places", "address", "TEXT"),
    ("places", "photo_ref", "TEXT"),
];

/// Initialize the database schema.
///
/// Safe to run on every startup: tables are created only when missing and
/// late columns are added only when absent. Any failure is returned.
pub async fn init_database_schema(pool: &DbPool) -> Result<(), StoreError> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            status INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(pool)
    .await?;

    // `kind` has no declared type: category numbers stay integers, custom
    // categories stay text
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS places (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            kind NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS favorites (
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            place_id INTEGER NOT NULL REFERENCES places(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, place_id)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS reviews (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            place_id INTEGER NOT NULL REFERENCES places(id) ON DELETE CASCADE,
            body TEXT NOT NULL,
            rating INTEGER CHECK (rating IS NULL OR rating BETWEEN 1 AND 5),
            created_at INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS reviews_place_idx ON reviews (place_id, created_at)")
        .execute(pool)
        .await?;

    for (table, column, declaration) in LATE_COLUMNS {
        if ensure_column(pool, table, column, declaration).await? {
            info!(table, column, "Added missing column");
        }
    }

    info!("Database schema initialized successfully");
    Ok(())
}

/// Add `column` to `table` unless it already exists. Returns whether it was added.
async fn ensure_column(
    pool: &DbPool,
    table: &'static str,
    column: &'static str,
    declaration: &'static str,
) -> Result<bool, StoreError> {
    let present: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2")
            .bind(table)
            .bind(column)
            .fetch_one(pool)
            .await?;

    if present > 0 {
        return Ok(false);
    }

    sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN {column} {declaration}"))
        .execute(pool)
        .await?;

    Ok(true)
}
