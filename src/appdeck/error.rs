use crate::model::{Collection, EntryRef};
use thiserror::Error;

/// A collection that could not be read during aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFailure {
    pub collection: Collection,
    pub message: String,
}

impl std::fmt::Display for CollectionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.collection, self.message)
    }
}

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Entry not found: {0}")]
    EntryNotFound(EntryRef),

    #[error("Request to {collection} failed: {message}")]
    Network {
        collection: Collection,
        message: String,
    },

    #[error("{collection} responded with status {status}: {body}")]
    Status {
        collection: Collection,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {collection}: {message}")]
    Decode {
        collection: Collection,
        message: String,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to load entries from every collection ({})", join_failures(.failures))]
    AggregationFailed { failures: Vec<CollectionFailure> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl DeckError {
    /// True for failures talking to the backing store (as opposed to bad input).
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            DeckError::EntryNotFound(_)
                | DeckError::Network { .. }
                | DeckError::Status { .. }
                | DeckError::Decode { .. }
                | DeckError::AggregationFailed { .. }
        )
    }
}

fn join_failures(failures: &[CollectionFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Input problems caught before any request is issued.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Name is required")]
    MissingName,

    #[error("URL is required")]
    MissingUrl,

    #[error("Select at least one category")]
    NoCategory,

    #[error("Invalid URL: {0}")]
    MalformedUrl(String),

    #[error("Rating must be between 0 and 5, got {0}")]
    RatingOutOfRange(u32),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Invalid {field}: {value} (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error("Unknown subscription status: {0} (expected free, paid or trial)")]
    InvalidStatus(String),

    #[error("Unknown billing cycle: {0} (expected monthly, yearly or trial)")]
    InvalidBillingCycle(String),
}

impl ValidationError {
    /// The form field this error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingName => "name",
            ValidationError::MissingUrl | ValidationError::MalformedUrl(_) => "url",
            ValidationError::NoCategory => "categories",
            ValidationError::RatingOutOfRange(_) => "rating",
            ValidationError::InvalidPrice(_) => "subscription_price",
            ValidationError::InvalidDate { field, .. } => field,
            ValidationError::InvalidStatus(_) => "subscription_status",
            ValidationError::InvalidBillingCycle(_) => "billing_cycle",
        }
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
