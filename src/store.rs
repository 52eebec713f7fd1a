//! Low-level table operations and row mapping.
//!
//! Everything here works against the pool directly and returns plain
//! `Result`s; the [`crate::storage`] facade is responsible for normalizing
//! outcomes into the public contract. Row conversions are total functions
//! with defined defaults for every optional column, so they stay testable
//! without a database.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

use crate::identity;
use crate::models::{ParsedItem, Resource, ResourceQuery, ResourceUpdate, UserStatistics};
use crate::query::{build_resource_query, ITEM_COLUMNS};

/// One row of the `items` table, as stored.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ItemRow {
    pub id: String,
    pub user_id: String,
    pub source_url: String,
    pub title: String,
    pub link: String,
    pub first_seen: String,
    pub categories: String,
    pub summary: String,
    pub full_content: String,
    pub ranking: f64,
    pub removed: bool,
    pub notes: String,
}

/// Total row→domain conversion.
///
/// Defaults: unparseable `categories` decode to an empty list, unparseable
/// `first_seen` to the Unix epoch. Neither should occur for rows this crate
/// wrote, but older or hand-edited stores must stay readable.
pub fn row_to_resource(row: ItemRow) -> Resource {
    let categories: Vec<String> = serde_json::from_str(&row.categories).unwrap_or_default();
    let datetime = DateTime::parse_from_rfc3339(&row.first_seen)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    Resource {
        id: row.id,
        user_id: row.user_id,
        title: row.title,
        url: row.link,
        categories,
        ranking: row.ranking,
        summary: row.summary,
        full_content: row.full_content,
        datetime,
        source: row.source_url,
        removed: row.removed,
        notes: row.notes,
    }
}

/// Total parsed-item→row conversion for insertion.
///
/// Assigns the content-derived identity when the pipeline did not; new rows
/// start not-removed with empty notes.
pub fn row_from_parsed(user_id: &str, first_seen: DateTime<Utc>, item: &ParsedItem) -> ItemRow {
    let id = item
        .id
        .clone()
        .unwrap_or_else(|| identity::resource_id(&item.link, &item.title));

    ItemRow {
        id,
        user_id: user_id.to_string(),
        source_url: item.source.clone(),
        title: item.title.clone(),
        link: item.link.clone(),
        first_seen: first_seen.to_rfc3339(),
        categories: serde_json::to_string(&item.categories).unwrap_or_else(|_| "[]".to_string()),
        summary: item.summary.clone(),
        full_content: item.full_content.clone(),
        ranking: item.ranking,
        removed: false,
        notes: String::new(),
    }
}

/// Insert a batch of parsed items for one tenant, as a single transaction.
///
/// Insertion is an upsert on identity: a row whose `(user_id, id)` already
/// exists is left untouched, so re-ingesting a seen item neither duplicates
/// it nor clobbers user curation state (`notes`, `removed`). Returns the
/// number of rows actually written.
pub async fn insert_items(pool: &SqlitePool, user_id: &str, items: &[ParsedItem]) -> Result<u64> {
    let now = Utc::now();
    let mut tx = pool.begin().await?;
    let mut written = 0u64;

    for item in items {
        let row = row_from_parsed(user_id, now, item);
        let result = sqlx::query(
            r#"
            INSERT INTO items
                (id, user_id, source_url, title, link, first_seen,
                 categories, summary, full_content, ranking, removed, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id, id) DO NOTHING
            "#,
        )
        .bind(&row.id)
        .bind(&row.user_id)
        .bind(&row.source_url)
        .bind(&row.title)
        .bind(&row.link)
        .bind(&row.first_seen)
        .bind(&row.categories)
        .bind(&row.summary)
        .bind(&row.full_content)
        .bind(row.ranking)
        .bind(row.removed)
        .bind(&row.notes)
        .execute(&mut *tx)
        .await?;

        written += result.rows_affected();
    }

    tx.commit().await?;
    Ok(written)
}

/// Fetch one non-removed resource by id, scoped to the tenant.
pub async fn get_item(
    pool: &SqlitePool,
    user_id: &str,
    resource_id: &str,
) -> Result<Option<Resource>> {
    let row: Option<ItemRow> = sqlx::query_as(&format!(
        "SELECT {ITEM_COLUMNS} FROM items WHERE user_id = ? AND id = ? AND removed = 0"
    ))
    .bind(user_id)
    .bind(resource_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_to_resource))
}

/// Run a filtered/sorted/paginated query for one tenant.
pub async fn query_items(
    pool: &SqlitePool,
    user_id: &str,
    query: &ResourceQuery,
) -> Result<Vec<Resource>> {
    let mut qb = build_resource_query(user_id, query);
    let rows: Vec<ItemRow> = qb.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().map(row_to_resource).collect())
}

/// Apply a partial update to a non-removed resource.
///
/// Returns `false` when the row does not exist (or is soft-deleted), in
/// which case nothing is written. An update with no fields set still counts
/// as applied against an existing row.
pub async fn update_item(
    pool: &SqlitePool,
    user_id: &str,
    resource_id: &str,
    updates: &ResourceUpdate,
) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let exists: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM items WHERE user_id = ? AND id = ? AND removed = 0")
            .bind(user_id)
            .bind(resource_id)
            .fetch_optional(&mut *tx)
            .await?;

    if exists.is_none() {
        return Ok(false);
    }

    if !updates.is_empty() {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE items SET ");
        let mut assignments = qb.separated(", ");

        if let Some(title) = &updates.title {
            assignments.push("title = ");
            assignments.push_bind_unseparated(title.as_str());
        }
        if let Some(summary) = &updates.summary {
            assignments.push("summary = ");
            assignments.push_bind_unseparated(summary.as_str());
        }
        if let Some(full_content) = &updates.full_content {
            assignments.push("full_content = ");
            assignments.push_bind_unseparated(full_content.as_str());
        }
        if let Some(notes) = &updates.notes {
            assignments.push("notes = ");
            assignments.push_bind_unseparated(notes.as_str());
        }
        if let Some(ranking) = updates.ranking {
            assignments.push("ranking = ");
            assignments.push_bind_unseparated(ranking);
        }
        if let Some(categories) = &updates.categories {
            let json = serde_json::to_string(categories)?;
            assignments.push("categories = ");
            assignments.push_bind_unseparated(json);
        }

        qb.push(" WHERE user_id = ");
        qb.push_bind(user_id);
        qb.push(" AND id = ");
        qb.push_bind(resource_id);

        qb.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(true)
}

/// Soft-delete a resource. Unknown ids are a no-op: removal is "ensure
/// gone", not "assert existed".
pub async fn mark_removed(pool: &SqlitePool, user_id: &str, resource_id: &str) -> Result<()> {
    sqlx::query("UPDATE items SET removed = 1 WHERE user_id = ? AND id = ?")
        .bind(user_id)
        .bind(resource_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Return the subset of `items` not yet stored (non-removed) for this
/// tenant, preserving input order. Lets the ingestion pipeline skip AI
/// analysis for items it has already seen.
pub async fn filter_new_items(
    pool: &SqlitePool,
    user_id: &str,
    items: &[ParsedItem],
) -> Result<Vec<ParsedItem>> {
    let mut fresh = Vec::new();

    for item in items {
        let id = item
            .id
            .clone()
            .unwrap_or_else(|| identity::resource_id(&item.link, &item.title));

        let seen: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM items WHERE user_id = ? AND id = ? AND removed = 0 LIMIT 1",
        )
        .bind(user_id)
        .bind(&id)
        .fetch_optional(pool)
        .await?;

        if seen.is_none() {
            fresh.push(item.clone());
        }
    }

    Ok(fresh)
}

/// Fetch the latest stored snapshot for a source URL.
pub async fn get_source_content(pool: &SqlitePool, url: &str) -> Result<Option<String>> {
    let content: Option<String> =
        sqlx::query_scalar("SELECT markdown_content FROM sources WHERE url = ?")
            .bind(url)
            .fetch_optional(pool)
            .await?;
    Ok(content)
}

/// Store the latest snapshot for a source URL, last-write-wins.
pub async fn put_source_content(pool: &SqlitePool, url: &str, content: &str) -> Result<()> {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let content_hash = format!("{:x}", hasher.finalize());

    sqlx::query(
        r#"
        INSERT INTO sources (url, markdown_content, content_hash, last_updated)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(url) DO UPDATE SET
            markdown_content = excluded.markdown_content,
            content_hash = excluded.content_hash,
            last_updated = excluded.last_updated
        "#,
    )
    .bind(url)
    .bind(content)
    .bind(content_hash)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Aggregate counts for one tenant, over non-removed rows only.
pub async fn user_statistics(pool: &SqlitePool, user_id: &str) -> Result<UserStatistics> {
    let total_resources: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE user_id = ? AND removed = 0")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    let total_sources: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT source_url) FROM items WHERE user_id = ? AND removed = 0",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    // Source snapshots are global (keyed by URL only), not per tenant
    let total_source_content: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sources")
        .fetch_one(pool)
        .await?;

    Ok(UserStatistics {
        total_resources,
        total_sources,
        total_source_content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(title: &str, link: &str) -> ParsedItem {
        ParsedItem {
            id: None,
            title: title.to_string(),
            link: link.to_string(),
            source: "https://a.com/feed".to_string(),
            categories: vec!["AI".to_string()],
            summary: "s".to_string(),
            full_content: String::new(),
            ranking: 50.0,
        }
    }

    #[test]
    fn test_row_from_parsed_assigns_identity() {
        let now = Utc::now();
        let row = row_from_parsed("u1", now, &parsed("T", "https://a.com/1"));
        assert_eq!(row.id, identity::resource_id("https://a.com/1", "T"));
        assert_eq!(row.user_id, "u1");
        assert!(!row.removed);
        assert_eq!(row.notes, "");
        assert_eq!(row.categories, r#"["AI"]"#);
    }

    #[test]
    fn test_row_from_parsed_keeps_assigned_id() {
        let mut item = parsed("T", "https://a.com/1");
        item.id = Some("pre-assigned".to_string());
        let row = row_from_parsed("u1", Utc::now(), &item);
        assert_eq!(row.id, "pre-assigned");
    }

    #[test]
    fn test_row_round_trips_to_resource() {
        let now = Utc::now();
        let row = row_from_parsed("u1", now, &parsed("T", "https://a.com/1"));
        let resource = row_to_resource(row);
        assert_eq!(resource.title, "T");
        assert_eq!(resource.url, "https://a.com/1");
        assert_eq!(resource.source, "https://a.com/feed");
        assert_eq!(resource.categories, vec!["AI"]);
        assert_eq!(resource.datetime, now.with_timezone(&Utc));
        assert!(!resource.removed);
    }

    #[test]
    fn test_row_to_resource_defaults_on_bad_columns() {
        let row = ItemRow {
            id: "x".into(),
            user_id: "u1".into(),
            source_url: "s".into(),
            title: "t".into(),
            link: "l".into(),
            first_seen: "not a timestamp".into(),
            categories: "not json".into(),
            summary: String::new(),
            full_content: String::new(),
            ranking: 0.0,
            removed: false,
            notes: String::new(),
        };
        let resource = row_to_resource(row);
        assert!(resource.categories.is_empty());
        assert_eq!(resource.datetime, DateTime::<Utc>::UNIX_EPOCH);
    }
}
