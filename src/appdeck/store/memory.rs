use super::{EntryStore, ListQuery};
use crate::error::{DeckError, Result};
use crate::model::{CatalogEntry, Collection, EntryDraft, EntryPatch, EntryRef};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    entries: HashMap<Collection, Vec<CatalogEntry>>,
    failing: HashSet<Collection>,
    failing_calls: HashMap<Collection, usize>,
    list_calls: HashMap<Collection, usize>,
}

/// In-memory tables for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts entries as-is (ids kept, or assigned when empty).
    pub fn with_entries(self, collection: Collection, entries: Vec<CatalogEntry>) -> Self {
        {
            let mut tables = self.lock();
            let table = tables.entries.entry(collection).or_default();
            for mut entry in entries {
                if entry.id.is_empty() {
                    entry.id = Uuid::new_v4().to_string();
                }
                entry.collection = collection;
                table.push(entry);
            }
        }
        self
    }

    /// Every call touching `collection` fails with a 503 until [`Self::recover`] is called.
    pub fn fail_collection(&self, collection: Collection) {
        self.lock().failing.insert(collection);
    }

    /// The next `calls` calls touching `collection` fail, later ones succeed.
    pub fn fail_next(&self, collection: Collection, calls: usize) {
        self.lock().failing_calls.insert(collection, calls);
    }

    pub fn go_offline(&self) {
        let mut tables = self.lock();
        tables.failing.extend(Collection::ALL);
    }

    pub fn recover(&self, collection: Collection) {
        self.lock().failing.remove(&collection);
    }

    /// Number of list calls made against `collection`.
    pub fn list_calls(&self, collection: Collection) -> usize {
        self.lock()
            .list_calls
            .get(&collection)
            .copied()
            .unwrap_or(0)
    }

    /// Snapshot of a table without going through the store API.
    pub fn entries(&self, collection: Collection) -> Vec<CatalogEntry> {
        self.lock()
            .entries
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        // A panic while holding the lock only happens in a failing test; keep the data.
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Tables {
    fn check(&mut self, collection: Collection) -> Result<()> {
        let mut fail = self.failing.contains(&collection);
        if let Some(remaining) = self.failing_calls.get_mut(&collection) {
            if *remaining > 0 {
                *remaining -= 1;
                fail = true;
            }
        }
        if fail {
            return Err(DeckError::Status {
                collection,
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn find_mut(&mut self, entry: &EntryRef) -> Result<&mut CatalogEntry> {
        self.check(entry.collection)?;
        self.entries
            .get_mut(&entry.collection)
            .and_then(|table| table.iter_mut().find(|e| e.id == entry.id))
            .ok_or_else(|| DeckError::EntryNotFound(entry.clone()))
    }
}

#[async_trait]
impl EntryStore for InMemoryStore {
    async fn list(&self, collection: Collection, query: &ListQuery) -> Result<Vec<CatalogEntry>> {
        let mut tables = self.lock();
        *tables.list_calls.entry(collection).or_default() += 1;
        tables.check(collection)?;
        Ok(tables
            .entries
            .get(&collection)
            .map(|table| table.iter().take(query.limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, entry: &EntryRef) -> Result<CatalogEntry> {
        let mut tables = self.lock();
        tables.find_mut(entry).map(|e| e.clone())
    }

    async fn create(&self, collection: Collection, draft: &EntryDraft) -> Result<CatalogEntry> {
        let mut tables = self.lock();
        tables.check(collection)?;

        let now = Utc::now();
        let mut entry = CatalogEntry::new("", "");
        entry.apply_draft(draft);
        entry.id = Uuid::new_v4().to_string();
        entry.collection = collection;
        entry.created_at = Some(now);
        entry.updated_at = Some(now);

        tables
            .entries
            .entry(collection)
            .or_default()
            .push(entry.clone());
        Ok(entry)
    }

    async fn update(&self, entry: &EntryRef, patch: &EntryPatch) -> Result<CatalogEntry> {
        let mut tables = self.lock();
        let stored = tables.find_mut(entry)?;
        stored.apply_patch(patch);
        stored.updated_at = Some(Utc::now());
        Ok(stored.clone())
    }

    async fn replace(&self, entry: &EntryRef, draft: &EntryDraft) -> Result<CatalogEntry> {
        let mut tables = self.lock();
        let stored = tables.find_mut(entry)?;
        stored.apply_draft(draft);
        stored.updated_at = Some(Utc::now());
        Ok(stored.clone())
    }

    async fn delete(&self, entry: &EntryRef) -> Result<()> {
        let mut tables = self.lock();
        tables.check(entry.collection)?;
        let table = tables.entries.entry(entry.collection).or_default();
        let before = table.len();
        table.retain(|e| e.id != entry.id);
        if table.len() == before {
            return Err(DeckError::EntryNotFound(entry.clone()));
        }
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{BillingCycle, SubscriptionStatus};
    use chrono::NaiveDate;

    /// A free entry with one category.
    pub fn entry(name: &str, category: &str) -> CatalogEntry {
        let mut entry = CatalogEntry::new(name, format!("https://{}.example", slug(name)));
        entry.categories = vec![category.to_string()];
        entry
    }

    pub fn paid(name: &str, category: &str, price: f64, cycle: BillingCycle) -> CatalogEntry {
        let mut entry = entry(name, category);
        entry.subscription_status = SubscriptionStatus::Paid;
        entry.subscription_plan = Some("Pro Plan".to_string());
        entry.subscription_price = Some(price);
        entry.billing_cycle = Some(cycle);
        entry
    }

    pub fn trial(name: &str, category: &str, ends: Option<NaiveDate>) -> CatalogEntry {
        let mut entry = entry(name, category);
        entry.subscription_status = SubscriptionStatus::Trial;
        entry.subscription_plan = Some("Trial".to_string());
        entry.billing_cycle = Some(BillingCycle::Trial);
        entry.next_billing_date = ends;
        entry
    }

    pub fn favorite(mut entry: CatalogEntry) -> CatalogEntry {
        entry.is_favorite = true;
        entry
    }

    fn slug(name: &str) -> String {
        let slug: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        if slug.is_empty() {
            "app".to_string()
        } else {
            slug
        }
    }

    pub struct StoreFixture {
        pub store: InMemoryStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
            }
        }

        pub fn with(mut self, collection: Collection, entries: Vec<CatalogEntry>) -> Self {
            self.store = self.store.with_entries(collection, entries);
            self
        }

        /// One free entry per collection: Alpha (general), Brush (creative), Compiler (tools).
        pub fn with_each_collection(self) -> Self {
            self.with(Collection::General, vec![entry("Alpha", "Text")])
                .with(Collection::Creative, vec![entry("Brush", "Image")])
                .with(Collection::Tools, vec![entry("Compiler", "Dev")])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[tokio::test]
    async fn create_assigns_id_and_zero_usage() {
        let store = InMemoryStore::new();
        let draft = EntryDraft::new("New", "https://new.app", vec!["Dev".into()]);
        let created = store.create(Collection::Tools, &draft).await.unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(created.collection, Collection::Tools);
        assert_eq!(created.usage_count, 0);
        assert!(created.last_used.is_none());
        assert!(created.created_at.is_some());
        assert_eq!(store.entries(Collection::Tools).len(), 1);
    }

    #[tokio::test]
    async fn list_respects_limit_and_tags_collection() {
        let store = StoreFixture::new()
            .with(
                Collection::Creative,
                vec![entry("A", "x"), entry("B", "x"), entry("C", "x")],
            )
            .store;
        let query = ListQuery {
            limit: 2,
            ..ListQuery::default()
        };
        let listed = store.list(Collection::Creative, &query).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|e| e.collection == Collection::Creative));
        assert_eq!(store.list_calls(Collection::Creative), 1);
    }

    #[tokio::test]
    async fn failing_collection_returns_status_error() {
        let store = StoreFixture::new().with_each_collection().store;
        store.fail_collection(Collection::General);

        let err = store
            .list(Collection::General, &ListQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DeckError::Status { status: 503, .. }));
        assert!(store
            .list(Collection::Tools, &ListQuery::default())
            .await
            .is_ok());

        store.recover(Collection::General);
        assert!(store
            .list(Collection::General, &ListQuery::default())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn ids_are_scoped_per_collection() {
        let mut a = entry("A", "x");
        a.id = "same".into();
        let mut b = entry("B", "x");
        b.id = "same".into();
        let store = StoreFixture::new()
            .with(Collection::General, vec![a])
            .with(Collection::Tools, vec![b])
            .store;

        store
            .update(
                &EntryRef::new(Collection::Tools, "same"),
                &EntryPatch::favorite(true),
            )
            .await
            .unwrap();

        assert!(!store.entries(Collection::General)[0].is_favorite);
        assert!(store.entries(Collection::Tools)[0].is_favorite);
    }

    #[tokio::test]
    async fn missing_entries_are_reported() {
        let store = InMemoryStore::new();
        let missing = EntryRef::new(Collection::General, "nope");
        assert!(matches!(
            store.get(&missing).await,
            Err(DeckError::EntryNotFound(_))
        ));
        assert!(matches!(
            store.delete(&missing).await,
            Err(DeckError::EntryNotFound(_))
        ));
    }
}
