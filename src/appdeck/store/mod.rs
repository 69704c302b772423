//! # Storage Layer
//!
//! Entries live behind a generic REST "table" API: one table per [`Collection`], each
//! exposing list, get, create, partial update, full replace and delete. The
//! [`EntryStore`] trait mirrors those six calls so the rest of the crate never deals
//! with URLs or status codes.
//!
//! ## Implementations
//!
//! - [`http::HttpStore`]: Production client (reqwest)
//!   - `GET    {base}/{table}?limit=N&sort=created_at` returns `{"data": [...]}`
//!   - `GET    {base}/{table}/{id}` returns the bare record
//!   - `POST`, `PUT`, `PATCH` send JSON bodies; `DELETE` sends none
//!
//! - [`memory::InMemoryStore`]: In-memory tables for testing
//!   - Assigns uuid ids and timestamps like the real service
//!   - Can be told to fail per collection, to exercise degraded loads
//!
//! ## Collection Tagging
//!
//! Every entry a store returns has [`CatalogEntry::collection`] set to the table it came
//! from. Follow-up writes are routed through [`CatalogEntry::entry_ref`], so an entry
//! loaded from `ai_apps_tools` is updated in `ai_apps_tools`.

use crate::error::Result;
use crate::model::{CatalogEntry, Collection, EntryDraft, EntryPatch, EntryRef};
use async_trait::async_trait;

pub mod http;
pub mod memory;

pub const DEFAULT_LIST_LIMIT: usize = 100;
pub const DEFAULT_LIST_SORT: &str = "created_at";

/// Query parameters sent with every list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: usize,
    pub sort: String,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            sort: DEFAULT_LIST_SORT.to_string(),
        }
    }
}

/// Abstract interface over the table API.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// List up to `query.limit` entries of one collection.
    async fn list(&self, collection: Collection, query: &ListQuery) -> Result<Vec<CatalogEntry>>;

    /// Fetch a single entry.
    async fn get(&self, entry: &EntryRef) -> Result<CatalogEntry>;

    /// Create an entry; usage starts at zero. Returns the stored record.
    async fn create(&self, collection: Collection, draft: &EntryDraft) -> Result<CatalogEntry>;

    /// Partial update: only the fields present in the patch change.
    async fn update(&self, entry: &EntryRef, patch: &EntryPatch) -> Result<CatalogEntry>;

    /// Full replace of the user-editable fields.
    async fn replace(&self, entry: &EntryRef, draft: &EntryDraft) -> Result<CatalogEntry>;

    async fn delete(&self, entry: &EntryRef) -> Result<()>;
}
