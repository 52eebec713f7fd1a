//! The `StorageService` facade.
//!
//! The only entry point other subsystems use. Composes the content store,
//! the item store, and the query builder, and normalizes outcomes into the
//! public contract: reads degrade to empty/absent results (a transient
//! storage fault must never crash a read-only UI render), while writes
//! always report, as [`OperationResult`].

use std::path::Path;

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::warn;

use crate::db;
use crate::diff;
use crate::migrate;
use crate::models::{
    ContentDiff, OperationResult, ParsedItem, Resource, ResourceQuery, ResourceUpdate,
    UserContext, UserStatistics,
};
use crate::store;

/// Multi-tenant storage for curated resources and raw source snapshots.
///
/// Construct one instance at startup and share it; all operations take
/// `&self`. Callers are expected to await each call to completion; the
/// store itself tolerates independent process instances sharing the
/// backing file (WAL mode).
pub struct StorageService {
    pool: SqlitePool,
}

impl StorageService {
    /// Open (or create) the backing store and bring its schema up to date.
    ///
    /// This is the one boundary where an unrecoverable storage fault (bad
    /// path, corrupted file) surfaces as an error; per-call faults are
    /// normalized afterwards.
    pub async fn open(db_path: &Path) -> Result<Self> {
        let pool = db::connect(db_path).await?;
        migrate::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Disposal hook. The embedded store needs no explicit shutdown, but
    /// future non-embedded backends will.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Filtered, sorted, paginated resources for one tenant.
    /// Soft-deleted rows are never included. Faults degrade to an empty list.
    pub async fn get_resources(&self, user: &UserContext, query: &ResourceQuery) -> Vec<Resource> {
        match store::query_items(&self.pool, &user.user_id, query).await {
            Ok(resources) => resources,
            Err(e) => {
                warn!(user_id = %user.user_id, error = %e, "resource query failed");
                Vec::new()
            }
        }
    }

    /// One resource by id, or `None` if absent, soft-deleted, owned by
    /// another tenant, or the read faulted.
    pub async fn get_resource_by_id(
        &self,
        user: &UserContext,
        resource_id: &str,
    ) -> Option<Resource> {
        match store::get_item(&self.pool, &user.user_id, resource_id).await {
            Ok(resource) => resource,
            Err(e) => {
                warn!(user_id = %user.user_id, resource_id, error = %e, "resource lookup failed");
                None
            }
        }
    }

    /// Store a batch of parsed items atomically. Items whose identity is
    /// already stored are skipped (see [`store::insert_items`]); the
    /// success payload is the number of rows actually written.
    pub async fn store_resources(
        &self,
        user: &UserContext,
        items: &[ParsedItem],
    ) -> OperationResult<u64> {
        match store::insert_items(&self.pool, &user.user_id, items).await {
            Ok(written) => OperationResult::success(
                Some(written),
                format!("stored {} of {} resources", written, items.len()),
            ),
            Err(e) => OperationResult::error(format!("failed to store resources: {e}")),
        }
    }

    /// Apply a partial update to a resource. `NotFound` when the id does
    /// not exist (or is soft-deleted) for this tenant.
    pub async fn update_resource(
        &self,
        user: &UserContext,
        resource_id: &str,
        updates: &ResourceUpdate,
    ) -> OperationResult {
        match store::update_item(&self.pool, &user.user_id, resource_id, updates).await {
            Ok(true) => OperationResult::success(None, format!("resource {resource_id} updated")),
            Ok(false) => OperationResult::not_found(format!("resource {resource_id} not found")),
            Err(e) => OperationResult::error(format!("failed to update resource: {e}")),
        }
    }

    /// Soft-delete a resource. Idempotent: already-removed and unknown ids
    /// also report success.
    pub async fn mark_resource_removed(
        &self,
        user: &UserContext,
        resource_id: &str,
    ) -> OperationResult {
        match store::mark_removed(&self.pool, &user.user_id, resource_id).await {
            Ok(()) => {
                OperationResult::success(None, format!("resource {resource_id} marked removed"))
            }
            Err(e) => OperationResult::error(format!("failed to remove resource: {e}")),
        }
    }

    /// The subset of `items` this tenant has not stored yet, in input order.
    ///
    /// On a read fault all items pass through: the insert path dedups on
    /// identity anyway, whereas dropping items here would silently lose
    /// new content.
    pub async fn filter_new_items(
        &self,
        user: &UserContext,
        items: &[ParsedItem],
    ) -> Vec<ParsedItem> {
        match store::filter_new_items(&self.pool, &user.user_id, items).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(user_id = %user.user_id, error = %e, "new-item filter failed");
                items.to_vec()
            }
        }
    }

    /// Latest stored snapshot for a source URL. Snapshots are keyed by URL
    /// only: a fetched page is the same for every tenant.
    pub async fn get_sources_content(&self, _user: &UserContext, url: &str) -> Option<String> {
        match store::get_source_content(&self.pool, url).await {
            Ok(content) => content,
            Err(e) => {
                warn!(url, error = %e, "source content lookup failed");
                None
            }
        }
    }

    /// Overwrite the stored snapshot for a source URL (last-write-wins).
    pub async fn store_source_content(
        &self,
        _user: &UserContext,
        url: &str,
        content: &str,
    ) -> OperationResult {
        match store::put_source_content(&self.pool, url, content).await {
            Ok(()) => OperationResult::success(None, format!("content stored for {url}")),
            Err(e) => OperationResult::error(format!("failed to store content: {e}")),
        }
    }

    /// Diff a fresh fetch against the stored snapshot for `url`. With no
    /// stored snapshot (or a faulted read) the entire new content counts
    /// as added.
    pub async fn get_content_diff(
        &self,
        _user: &UserContext,
        url: &str,
        new_content: &str,
    ) -> ContentDiff {
        let stored = match store::get_source_content(&self.pool, url).await {
            Ok(content) => content,
            Err(e) => {
                warn!(url, error = %e, "stored content read failed, diffing against empty");
                None
            }
        };
        diff::content_diff(stored.as_deref(), new_content)
    }

    /// Aggregate counts for one tenant. Faults degrade to zeroed statistics.
    pub async fn get_user_statistics(&self, user: &UserContext) -> UserStatistics {
        match store::user_statistics(&self.pool, &user.user_id).await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(user_id = %user.user_id, error = %e, "statistics query failed");
                UserStatistics::default()
            }
        }
    }
}
