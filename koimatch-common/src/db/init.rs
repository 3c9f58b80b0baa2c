//! Database initialization
//!
//! Creates the database file on first run and brings the schema up to
//! date. All statements are idempotent (`CREATE TABLE IF NOT EXISTS`)
//! so initialization is safe to run on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use sqlite options to create database if it doesn't exist
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_connection(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// Connect to an in-memory database with the full schema.
/// Used by tests and by tooling that needs a scratch store.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    configure_connection(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

async fn configure_connection(pool: &SqlitePool) -> Result<()> {
    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    // WAL mode allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;

    // Wait out transient lock contention instead of failing immediately
    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;

    Ok(())
}

async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_users_table(pool).await?;
    create_likes_table(pool).await?;
    Ok(())
}

/// Create the users table
///
/// `id` is the stable external messaging-platform identifier. Rows are
/// created lazily on first inbound interaction (step 0) or via the
/// structured registration call, and are never hard-deleted.
async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL DEFAULT '',
            birthday TEXT NOT NULL DEFAULT '',
            registration_step INTEGER NOT NULL DEFAULT 0,
            crush_name TEXT,
            crush_birthday TEXT,
            matched_with_user_id TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (registration_step >= 0 AND registration_step <= 2),
            CHECK ((crush_name IS NULL) = (crush_birthday IS NULL))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Reciprocity lookups resolve targets by (name, birthday)
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_identity ON users(name, birthday)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the likes table
///
/// One row per declarer (`from_user_id` is the primary key): declaring
/// again overwrites the previous declaration rather than appending.
async fn create_likes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS likes (
            from_user_id TEXT PRIMARY KEY REFERENCES users(id),
            to_name TEXT NOT NULL,
            to_birthday TEXT NOT NULL,
            matched INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK (matched IN (0, 1))
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Reverse lookup when checking whether a target's declaration points back
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_likes_target ON likes(to_name, to_birthday)")
        .execute(pool)
        .await?;

    Ok(())
}
