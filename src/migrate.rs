//! Schema creation and additive evolution.
//!
//! Runs at service construction. Beyond creating the tables, it compares the
//! `items` table against the current column set and adds any missing column
//! with its safe default, so a store written by an older version opens
//! without manual migration steps or data loss.

use anyhow::Result;
use sqlx::{Row, SqlitePool};
use tracing::info;

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    // Raw source snapshots, one row per URL (latest fetch only)
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sources (
            url TEXT PRIMARY KEY,
            markdown_content TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            last_updated TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Parsed resources, per tenant. The composite key keeps the
    // content-derived id collision-free across tenants.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id TEXT NOT NULL,
            user_id TEXT NOT NULL,
            source_url TEXT NOT NULL,
            title TEXT NOT NULL,
            link TEXT NOT NULL,
            first_seen TEXT NOT NULL,
            categories TEXT NOT NULL DEFAULT '[]',
            summary TEXT NOT NULL DEFAULT '',
            full_content TEXT NOT NULL DEFAULT '',
            ranking REAL NOT NULL DEFAULT 0,
            removed INTEGER NOT NULL DEFAULT 0,
            notes TEXT NOT NULL DEFAULT '',
            PRIMARY KEY (user_id, id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Columns added after the first release; older stores lack them
    ensure_column(pool, "items", "removed", "INTEGER NOT NULL DEFAULT 0").await?;
    ensure_column(pool, "items", "notes", "TEXT NOT NULL DEFAULT ''").await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_items_user_source ON items(user_id, source_url)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Add `column` to `table` if it is not already present.
/// `table`, `column`, and `decl` are compile-time constants, never user input.
async fn ensure_column(pool: &SqlitePool, table: &str, column: &str, decl: &str) -> Result<()> {
    let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
        .fetch_all(pool)
        .await?;

    let exists = rows
        .iter()
        .any(|row| row.get::<String, _>("name") == column);

    if !exists {
        info!(table, column, "adding missing column to existing store");
        sqlx::query(&format!("ALTER TABLE {table} ADD COLUMN {column} {decl}"))
            .execute(pool)
            .await?;
    }

    Ok(())
}
