//! # Curator Store
//!
//! The multi-tenant storage and query layer of a personal content-curation
//! tool.
//!
//! Callers (an AI-driven ingestion pipeline and a terminal UI, both outside
//! this crate) hand the store parsed content items and structured queries;
//! the store resolves content-derived identity, persists resources per
//! tenant in SQLite, and answers filtered, sorted, paginated queries.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────────┐   ┌───────────┐
//! │ Ingestion  │──▶│ StorageService │──▶│  SQLite    │
//! │ pipeline   │   │ identity+query │   │ items+src  │
//! └────────────┘   └───────┬────────┘   └───────────┘
//!                          │
//!                    ┌─────┴─────┐
//!                    ▼           ▼
//!               ┌────────┐  ┌────────┐
//!               │  TUI   │  │ Export │
//!               └────────┘  └────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use curator_store::{ParsedItem, ResourceQuery, StorageService, UserContext};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let store = StorageService::open(std::path::Path::new("curator.sqlite")).await?;
//! let user = UserContext::new("alice");
//!
//! let items = vec![ParsedItem {
//!     id: None,
//!     title: "Interesting article".into(),
//!     link: "https://example.com/post".into(),
//!     source: "https://example.com/feed".into(),
//!     categories: vec!["AI".into()],
//!     summary: "Worth a read.".into(),
//!     full_content: String::new(),
//!     ranking: 82.0,
//! }];
//! store.store_resources(&user, &items).await;
//!
//! let resources = store.get_resources(&user, &ResourceQuery::default()).await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`identity`] | Content-derived resource identifiers |
//! | [`diff`] | Block-level content diffing between sync runs |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation and additive evolution |
//! | [`query`] | Filter/sort/paginate query construction |
//! | [`store`] | Table operations and row mapping |
//! | [`storage`] | The `StorageService` facade |

pub mod config;
pub mod db;
pub mod diff;
pub mod identity;
pub mod migrate;
pub mod models;
pub mod query;
pub mod storage;
pub mod store;

pub use models::{
    ContentDiff, OperationResult, ParsedItem, QualityTier, Resource, ResourceQuery,
    ResourceUpdate, SortField, UserContext, UserStatistics,
};
pub use storage::StorageService;
