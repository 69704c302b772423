//! Table API client.

use super::{EntryStore, ListQuery};
use crate::config::DeckConfig;
use crate::error::{DeckError, Result};
use crate::model::{CatalogEntry, Collection, EntryDraft, EntryPatch, EntryRef, NewEntry};
use crate::wire;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

/// List envelope returned by `GET {base}/{table}`.
#[derive(Debug, Deserialize)]
struct TablePage {
    #[serde(default, deserialize_with = "wire::null_as_default")]
    data: Vec<CatalogEntry>,
}

#[async_trait]
trait ResponseExt {
    async fn map_store_error(self, collection: Collection) -> Result<Response>;
}

#[async_trait]
impl ResponseExt for reqwest::Result<Response> {
    async fn map_store_error(self, collection: Collection) -> Result<Response> {
        let response = self.map_err(|e| DeckError::Network {
            collection,
            message: e.to_string(),
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(DeckError::Status {
            collection,
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}

fn not_found(entry: &EntryRef) -> impl FnOnce(DeckError) -> DeckError + '_ {
    move |err| match err {
        DeckError::Status { status: 404, .. } => DeckError::EntryNotFound(entry.clone()),
        other => other,
    }
}

async fn decode<T: DeserializeOwned>(response: Response, collection: Collection) -> Result<T> {
    response.json::<T>().await.map_err(|e| DeckError::Decode {
        collection,
        message: e.to_string(),
    })
}

fn tagged(mut entry: CatalogEntry, collection: Collection) -> CatalogEntry {
    entry.collection = collection;
    entry
}

/// HTTP client for the table API.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: Url,
}

impl HttpStore {
    pub fn new(config: &DeckConfig) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|e| DeckError::Config(format!("Invalid base_url '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(DeckError::Config(format!(
                "Invalid base_url '{}': not a hierarchical URL",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| DeckError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, collection: Collection, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so the segments are always available.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(collection.table());
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }
}

#[async_trait]
impl EntryStore for HttpStore {
    #[tracing::instrument(skip(self, query), fields(limit = query.limit))]
    async fn list(&self, collection: Collection, query: &ListQuery) -> Result<Vec<CatalogEntry>> {
        let response = self
            .client
            .get(self.endpoint(collection, None))
            .query(&[("limit", query.limit.to_string()), ("sort", query.sort.clone())])
            .send()
            .await
            .map_store_error(collection)
            .await?;

        let page: TablePage = decode(response, collection).await?;
        tracing::debug!(count = page.data.len(), "listed entries");
        Ok(page
            .data
            .into_iter()
            .map(|entry| tagged(entry, collection))
            .collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get(&self, entry: &EntryRef) -> Result<CatalogEntry> {
        let response = self
            .client
            .get(self.endpoint(entry.collection, Some(&entry.id)))
            .send()
            .await
            .map_store_error(entry.collection)
            .await
            .map_err(not_found(entry))?;

        let record = decode(response, entry.collection).await?;
        Ok(tagged(record, entry.collection))
    }

    #[tracing::instrument(skip(self, draft), fields(name = %draft.name))]
    async fn create(&self, collection: Collection, draft: &EntryDraft) -> Result<CatalogEntry> {
        let response = self
            .client
            .post(self.endpoint(collection, None))
            .json(&NewEntry::new(draft))
            .send()
            .await
            .map_store_error(collection)
            .await?;

        let record = decode(response, collection).await?;
        Ok(tagged(record, collection))
    }

    #[tracing::instrument(skip(self, patch))]
    async fn update(&self, entry: &EntryRef, patch: &EntryPatch) -> Result<CatalogEntry> {
        let response = self
            .client
            .patch(self.endpoint(entry.collection, Some(&entry.id)))
            .json(patch)
            .send()
            .await
            .map_store_error(entry.collection)
            .await
            .map_err(not_found(entry))?;

        let record = decode(response, entry.collection).await?;
        Ok(tagged(record, entry.collection))
    }

    #[tracing::instrument(skip(self, draft))]
    async fn replace(&self, entry: &EntryRef, draft: &EntryDraft) -> Result<CatalogEntry> {
        let response = self
            .client
            .put(self.endpoint(entry.collection, Some(&entry.id)))
            .json(draft)
            .send()
            .await
            .map_store_error(entry.collection)
            .await
            .map_err(not_found(entry))?;

        let record = decode(response, entry.collection).await?;
        Ok(tagged(record, entry.collection))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, entry: &EntryRef) -> Result<()> {
        self.client
            .delete(self.endpoint(entry.collection, Some(&entry.id)))
            .send()
            .await
            .map_store_error(entry.collection)
            .await
            .map_err(not_found(entry))?;
        Ok(())
    }
}
