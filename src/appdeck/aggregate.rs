//! # Aggregation
//!
//! The catalog is split across three tables. [`aggregate`] lists all of them concurrently
//! and concatenates the results in [`Collection::ALL`] order. A collection that fails
//! contributes nothing and is reported in [`Aggregation::failures`]; only when every
//! collection fails does the whole load fail.
//!
//! [`aggregate_or_fallback`] adds one more chance on total failure: a single retry
//! against the general collection alone.

use crate::error::{CollectionFailure, DeckError, Result};
use crate::model::{CatalogEntry, Collection};
use crate::store::{EntryStore, ListQuery};

/// Combined listing of every collection.
#[derive(Debug, Default)]
pub struct Aggregation {
    pub entries: Vec<CatalogEntry>,
    /// Collections that answered, with how many entries each contributed.
    pub loaded: Vec<(Collection, usize)>,
    /// Collections that could not be listed.
    pub failures: Vec<CollectionFailure>,
    /// True when this listing came from the general-only retry.
    pub fallback: bool,
}

impl Aggregation {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub async fn aggregate<S: EntryStore + ?Sized>(store: &S, query: &ListQuery) -> Result<Aggregation> {
    let (general, creative, tools) = tokio::join!(
        store.list(Collection::General, query),
        store.list(Collection::Creative, query),
        store.list(Collection::Tools, query),
    );

    let mut aggregation = Aggregation::default();
    for (collection, outcome) in [
        (Collection::General, general),
        (Collection::Creative, creative),
        (Collection::Tools, tools),
    ] {
        match outcome {
            Ok(entries) => {
                aggregation.loaded.push((collection, entries.len()));
                aggregation.entries.extend(entries);
            }
            Err(err) => {
                tracing::warn!(%collection, error = %err, "collection failed to load");
                aggregation.failures.push(CollectionFailure {
                    collection,
                    message: err.to_string(),
                });
            }
        }
    }

    if aggregation.loaded.is_empty() {
        return Err(DeckError::AggregationFailed {
            failures: aggregation.failures,
        });
    }

    tracing::info!(
        total = aggregation.entries.len(),
        general = count_for(&aggregation, Collection::General),
        creative = count_for(&aggregation, Collection::Creative),
        tools = count_for(&aggregation, Collection::Tools),
        "loaded entries"
    );
    Ok(aggregation)
}

/// Like [`aggregate`], but retries the general collection alone when everything fails.
pub async fn aggregate_or_fallback<S: EntryStore + ?Sized>(
    store: &S,
    query: &ListQuery,
) -> Result<Aggregation> {
    let failures = match aggregate(store, query).await {
        Ok(aggregation) => return Ok(aggregation),
        Err(DeckError::AggregationFailed { failures }) => failures,
        Err(other) => return Err(other),
    };

    tracing::warn!("every collection failed, retrying general only");
    match store.list(Collection::General, query).await {
        Ok(entries) => Ok(Aggregation {
            loaded: vec![(Collection::General, entries.len())],
            entries,
            failures,
            fallback: true,
        }),
        Err(err) => {
            tracing::error!(error = %err, "fallback load failed");
            Err(DeckError::AggregationFailed { failures })
        }
    }
}

fn count_for(aggregation: &Aggregation, collection: Collection) -> usize {
    aggregation
        .loaded
        .iter()
        .find(|(c, _)| *c == collection)
        .map(|(_, n)| *n)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::*;

    fn names(aggregation: &Aggregation) -> Vec<&str> {
        aggregation.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[tokio::test]
    async fn concatenates_in_collection_order() {
        let store = StoreFixture::new().with_each_collection().store;
        let aggregation = aggregate(&store, &ListQuery::default()).await.unwrap();

        assert_eq!(names(&aggregation), vec!["Alpha", "Brush", "Compiler"]);
        assert!(!aggregation.is_partial());
        assert_eq!(aggregation.entries[1].collection, Collection::Creative);
    }

    #[tokio::test]
    async fn failed_collection_contributes_nothing() {
        let store = StoreFixture::new().with_each_collection().store;
        store.fail_collection(Collection::Creative);

        let aggregation = aggregate(&store, &ListQuery::default()).await.unwrap();
        assert_eq!(names(&aggregation), vec!["Alpha", "Compiler"]);
        assert_eq!(aggregation.failures.len(), 1);
        assert_eq!(aggregation.failures[0].collection, Collection::Creative);
        assert!(!aggregation.fallback);
    }

    #[tokio::test]
    async fn empty_collections_are_not_failures() {
        let store = StoreFixture::new()
            .with(Collection::Tools, vec![entry("Only", "Dev")])
            .store;
        let aggregation = aggregate(&store, &ListQuery::default()).await.unwrap();
        assert_eq!(names(&aggregation), vec!["Only"]);
        assert!(!aggregation.is_partial());
    }

    #[tokio::test]
    async fn total_failure_is_an_error() {
        let store = StoreFixture::new().with_each_collection().store;
        store.go_offline();

        let err = aggregate(&store, &ListQuery::default()).await.unwrap_err();
        match err {
            DeckError::AggregationFailed { failures } => assert_eq!(failures.len(), 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn fallback_retries_general_alone() {
        let store = StoreFixture::new().with_each_collection().store;
        store.fail_next(Collection::General, 1);
        store.fail_collection(Collection::Creative);
        store.fail_collection(Collection::Tools);

        let aggregation = aggregate_or_fallback(&store, &ListQuery::default())
            .await
            .unwrap();
        assert!(aggregation.fallback);
        assert_eq!(names(&aggregation), vec!["Alpha"]);
        assert_eq!(aggregation.failures.len(), 3);
    }

    #[tokio::test]
    async fn fallback_fails_when_general_stays_down() {
        let store = StoreFixture::new().with_each_collection().store;
        store.go_offline();

        let err = aggregate_or_fallback(&store, &ListQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DeckError::AggregationFailed { .. }));
        // One call from the concurrent load plus the retry.
        assert_eq!(store.list_calls(Collection::General), 2);
        assert_eq!(store.list_calls(Collection::Tools), 1);
    }
}
