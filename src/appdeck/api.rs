//! # API Facade
//!
//! [`DeckApi`] is the single entry point for every catalog operation, whatever the UI.
//! It dispatches to `commands/*`, and it keeps the small amount of state a browsing
//! session needs:
//!
//! - the active [`EntryFilter`], so a refresh after a mutation shows the same view and
//!   [`DeckApi::clear_filters`] has something to clear,
//! - the last arranged listing, so a position like `3` can be resolved to an entry and
//!   launches or favorite toggles can use what is already on screen instead of re-reading.
//!
//! ## Refresh After Mutations
//!
//! Create, update, remove, favorite and launch reload the listing once they succeed. The
//! mutation's outcome is never undone by a failing reload: the failure is reported as a
//! warning on the mutation's result.
//!
//! ## What the API Does NOT Do
//!
//! No printing, no opening URLs, no prompts. Launch hands back the URL to open in
//! [`CmdResult::launch_url`]; the presentation layer opens it.

use crate::arrange::EntryFilter;
use crate::commands;
use crate::error::{DeckError, Result};
use crate::form::EntryForm;
use crate::model::{CatalogEntry, Collection, EntryDraft, EntryRef};
use crate::store::{EntryStore, ListQuery};
use chrono::Utc;

/// The main API facade for catalog operations.
///
/// Generic over `EntryStore`: `DeckApi<HttpStore>` in production, `DeckApi<InMemoryStore>`
/// in tests.
pub struct DeckApi<S: EntryStore> {
    store: S,
    query: ListQuery,
    filter: EntryFilter,
    listed: Vec<CatalogEntry>,
}

impl<S: EntryStore> DeckApi<S> {
    pub fn new(store: S, query: ListQuery) -> Self {
        Self {
            store,
            query,
            filter: EntryFilter::default(),
            listed: Vec::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn current_filter(&self) -> &EntryFilter {
        &self.filter
    }

    /// The listing as last loaded, in display order.
    pub fn listed(&self) -> &[CatalogEntry] {
        &self.listed
    }

    /// Loads every collection with the active filter.
    pub async fn load_all(&mut self) -> Result<commands::CmdResult> {
        let result = commands::load::run(&self.store, &self.query, &self.filter).await?;
        self.listed = result.listed_entries.clone();
        Ok(result)
    }

    /// Replaces the active filter and reloads.
    pub async fn filter(
        &mut self,
        search_term: &str,
        category: Option<&str>,
    ) -> Result<commands::CmdResult> {
        self.filter = EntryFilter::new(search_term, category);
        self.load_all().await
    }

    pub async fn clear_filters(&mut self) -> Result<commands::CmdResult> {
        self.filter = EntryFilter::default();
        self.load_all().await
    }

    /// `3` (position in the current listing, 1-based) or `tools/<id>`.
    pub fn resolve(&self, selector: &str) -> Result<EntryRef> {
        let selector = selector.trim();
        if let Ok(position) = selector.parse::<usize>() {
            return position
                .checked_sub(1)
                .and_then(|i| self.listed.get(i))
                .map(CatalogEntry::entry_ref)
                .ok_or_else(|| {
                    DeckError::Api(format!(
                        "No entry at position {} ({} listed)",
                        position,
                        self.listed.len()
                    ))
                });
        }
        selector.parse()
    }

    pub async fn launch(&mut self, target: &EntryRef) -> Result<commands::CmdResult> {
        let known_url = self
            .known(target)
            .map(|e| e.url.clone())
            .filter(|url| !url.trim().is_empty());
        let mut result =
            commands::launch::run(&self.store, target, known_url.as_deref(), Utc::now()).await?;
        self.refresh(&mut result).await;
        Ok(result)
    }

    pub async fn toggle_favorite(&mut self, target: &EntryRef) -> Result<commands::CmdResult> {
        let current = self.known(target).map(|e| e.is_favorite);
        let mut result = commands::favorite::toggle(&self.store, target, current).await?;
        self.refresh(&mut result).await;
        Ok(result)
    }

    pub async fn remove(&mut self, target: &EntryRef) -> Result<commands::CmdResult> {
        let name = self.known(target).map(|e| e.name.clone());
        let mut result = commands::remove::run(&self.store, target, name.as_deref()).await?;
        self.refresh(&mut result).await;
        Ok(result)
    }

    pub async fn create(
        &mut self,
        collection: Collection,
        draft: &EntryDraft,
    ) -> Result<commands::CmdResult> {
        let mut result = commands::create::run(&self.store, collection, draft).await?;
        self.refresh(&mut result).await;
        Ok(result)
    }

    /// Registers the form's contents and clears the form on success.
    pub async fn create_from_form(
        &mut self,
        collection: Collection,
        form: &mut EntryForm,
    ) -> Result<commands::CmdResult> {
        let draft = form.to_draft()?;
        let result = self.create(collection, &draft).await?;
        form.reset();
        Ok(result)
    }

    pub async fn update(
        &mut self,
        target: &EntryRef,
        draft: &EntryDraft,
    ) -> Result<commands::CmdResult> {
        let mut result = commands::update::run(&self.store, target, draft).await?;
        self.refresh(&mut result).await;
        Ok(result)
    }

    pub async fn update_from_form(
        &mut self,
        target: &EntryRef,
        form: &mut EntryForm,
    ) -> Result<commands::CmdResult> {
        let draft = form.to_draft()?;
        self.update(target, &draft).await
    }

    /// Fresh copy of one entry (edit form, subscription details).
    pub async fn show(&self, target: &EntryRef) -> Result<commands::CmdResult> {
        commands::show::run(&self.store, target).await
    }

    /// Edit form prefilled from the stored entry.
    pub async fn edit_form(&self, target: &EntryRef) -> Result<EntryForm> {
        let entry = self.store.get(target).await?;
        Ok(EntryForm::from_entry(&entry))
    }

    fn known(&self, target: &EntryRef) -> Option<&CatalogEntry> {
        self.listed
            .iter()
            .find(|e| e.collection == target.collection && e.id == target.id)
    }

    async fn refresh(&mut self, result: &mut commands::CmdResult) {
        match self.load_all().await {
            Ok(listing) => result.merge_listing(listing),
            Err(err) => {
                tracing::warn!(error = %err, "refresh after update failed");
                result.add_message(commands::CmdMessage::warning(format!(
                    "Could not refresh the listing: {}",
                    err
                )));
            }
        }
    }
}

pub use commands::{CmdMessage, CmdResult, MessageLevel};
