use crate::model::CatalogEntry;
use crate::render::FilterSummary;

pub mod create;
pub mod favorite;
pub mod launch;
pub mod load;
pub mod remove;
pub mod show;
pub mod update;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Entries written or read by the command.
    pub affected_entries: Vec<CatalogEntry>,
    /// The arranged listing (after a load, or the refresh following a mutation).
    pub listed_entries: Vec<CatalogEntry>,
    pub summary: Option<FilterSummary>,
    /// Set by launch: the URL the presentation layer should open.
    pub launch_url: Option<String>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_affected_entries(mut self, entries: Vec<CatalogEntry>) -> Self {
        self.affected_entries = entries;
        self
    }

    pub fn with_listed_entries(mut self, entries: Vec<CatalogEntry>) -> Self {
        self.listed_entries = entries;
        self
    }

    pub fn with_summary(mut self, summary: FilterSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    /// Takes over another result's listing, summary and messages (used after a refresh).
    pub fn merge_listing(&mut self, listing: CmdResult) {
        self.listed_entries = listing.listed_entries;
        self.summary = listing.summary;
        self.messages.extend(listing.messages);
    }
}

/// Display name for messages: the entry's name, or its reference when unnamed.
pub(crate) fn label(entry: &CatalogEntry) -> String {
    if entry.name.trim().is_empty() {
        entry.entry_ref().to_string()
    } else {
        entry.name.clone()
    }
}
