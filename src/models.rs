//! Core data models used throughout Curator Store.
//!
//! These types represent the resources, queries, and operation results that
//! flow between the ingestion pipeline, the store, and the UI.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single curated content item.
///
/// `id` is content-derived (see [`crate::identity`]) and stable across
/// re-ingestion; `user_id` is the tenant key. Instances returned by the store
/// are detached copies: mutating one does not touch storage until an explicit
/// update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub url: String,
    pub categories: Vec<String>,
    pub ranking: f64,
    pub summary: String,
    pub full_content: String,
    pub datetime: DateTime<Utc>,
    pub source: String,
    pub removed: bool,
    pub notes: String,
}

/// Raw parsed item handed over by the ingestion pipeline.
///
/// `id` may be pre-assigned by the pipeline; when `None` the store derives it
/// from `(link, title)` at insert time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParsedItem {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub link: String,
    /// Origin feed/site URL the item was parsed from.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub full_content: String,
    pub ranking: f64,
}

/// Tenant key threaded through every storage operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl Default for UserContext {
    fn default() -> Self {
        Self::new("default_user")
    }
}

/// Result of a mutating storage operation.
///
/// Expected failure modes (not-found, infrastructure faults on writes) are
/// values, never panics or errors crossing the service boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult<T = ()> {
    Success { data: Option<T>, message: String },
    NotFound { message: String },
    Error { message: String },
}

impl<T> OperationResult<T> {
    pub fn success(data: Option<T>, message: impl Into<String>) -> Self {
        Self::Success {
            data,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::NotFound { message } | Self::Error { message } => {
                message
            }
        }
    }
}

/// Aggregate counts over non-removed rows for one tenant.
///
/// `total_source_content` counts raw source snapshots, which are stored
/// globally (one per URL), not per tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct UserStatistics {
    pub total_resources: i64,
    pub total_sources: i64,
    pub total_source_content: i64,
}

/// Differences between the stored snapshot of a source and a fresh fetch.
///
/// Advisory input to the analysis step: only `added_blocks` need re-analysis.
/// Block order follows the new content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentDiff {
    pub added_blocks: Vec<String>,
    pub removed_blocks: Vec<String>,
    pub has_changes: bool,
}

/// Allow-listed partial update of a stored resource.
///
/// Only fields that are `Some` are written; everything else is left
/// untouched. The field set is the complete list of user-mutable columns,
/// so the allow-list is enforced at compile time rather than by runtime
/// filtering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceUpdate {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub full_content: Option<String>,
    pub notes: Option<String>,
    pub ranking: Option<f64>,
    pub categories: Option<Vec<String>>,
}

impl ResourceUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.summary.is_none()
            && self.full_content.is_none()
            && self.notes.is_none()
            && self.ranking.is_none()
            && self.categories.is_none()
    }
}

/// Column a resource query sorts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Ranking,
    Datetime,
}

impl SortField {
    /// Parse a sort-field name. Unrecognized names fall back to the default
    /// (`Ranking`) instead of failing.
    pub fn parse(name: &str) -> Self {
        match name {
            "datetime" | "first_seen" => Self::Datetime,
            _ => Self::Ranking,
        }
    }
}

/// Structured filter/sort/pagination request against the item store.
///
/// Category membership is ORed across the requested set; the category and
/// source filters AND together. An empty or absent set means no filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceQuery {
    pub categories: Option<BTreeSet<String>>,
    pub sources: Option<BTreeSet<String>>,
    pub sort_by: SortField,
    pub sort_desc: bool,
    pub limit: Option<i64>,
    pub offset: i64,
}

impl Default for ResourceQuery {
    fn default() -> Self {
        Self {
            categories: None,
            sources: None,
            sort_by: SortField::Ranking,
            sort_desc: true,
            limit: None,
            offset: 0,
        }
    }
}

/// Display bucket for a resource's ranking, relative to the configured
/// quality thresholds. Not a storage concern; rankings are stored unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTier {
    High,
    Medium,
    Low,
}

impl QualityTier {
    pub fn for_ranking(ranking: f64, min_threshold: f64, max_threshold: f64) -> Self {
        if ranking >= max_threshold {
            Self::High
        } else if ranking >= min_threshold {
            Self::Medium
        } else {
            Self::Low
        }
    }
}
