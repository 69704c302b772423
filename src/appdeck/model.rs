//! # Domain Model
//!
//! [`CatalogEntry`] is one registered application as the table API returns it.
//! Writes go out as one of two shapes:
//!
//! - [`EntryDraft`]: every user-editable field. Sent on create (POST) and replace (PUT).
//! - [`EntryPatch`]: only the fields that change. Sent on partial updates (PATCH), which is
//!   how launches bump the usage counter and how the favorite flag is toggled.
//!
//! ## Collections
//!
//! Entries live in one of three tables of identical shape ([`Collection`]). Ids are unique
//! per table only, so an entry is addressed with an [`EntryRef`] (`general/<id>`). The
//! collection is attached in memory when an entry is fetched and never sent on the wire.
//!
//! ## Subscriptions
//!
//! `subscription_status` drives the primary sort key and the badge. When it is `free`,
//! every other subscription field is meaningless: [`CatalogEntry::subscription`] hides them
//! and [`SubscriptionDraft::free`] writes them as `null`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{DeckError, ValidationError};
use crate::wire;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    #[default]
    General,
    Creative,
    Tools,
}

impl Collection {
    /// Aggregation order: general, then creative, then tools.
    pub const ALL: [Collection; 3] = [Collection::General, Collection::Creative, Collection::Tools];

    /// Name of the backing table.
    pub fn table(self) -> &'static str {
        match self {
            Collection::General => "ai_apps",
            Collection::Creative => "ai_apps_creative",
            Collection::Tools => "ai_apps_tools",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::General => "general",
            Collection::Creative => "creative",
            Collection::Tools => "tools",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = DeckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| s.eq_ignore_ascii_case(c.as_str()) || s == c.table())
            .ok_or_else(|| {
                DeckError::Api(format!(
                    "Unknown collection '{}' (expected general, creative or tools)",
                    s
                ))
            })
    }
}

/// Address of one entry: the table it lives in plus its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryRef {
    pub collection: Collection,
    pub id: String,
}

impl EntryRef {
    pub fn new(collection: Collection, id: impl Into<String>) -> Self {
        Self {
            collection,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

impl FromStr for EntryRef {
    type Err = DeckError;

    /// `creative/abc` or a bare `abc` (general collection).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (collection, id) = match s.split_once('/') {
            Some((collection, id)) => (collection.parse()?, id),
            None => (Collection::General, s),
        };
        if id.is_empty() {
            return Err(DeckError::Api(format!("Missing entry id in '{}'", s)));
        }
        Ok(EntryRef::new(collection, id))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    Free,
    Trial,
    Paid,
}

impl SubscriptionStatus {
    /// Primary sort key: higher tiers list first.
    pub fn tier(self) -> u8 {
        match self {
            SubscriptionStatus::Paid => 3,
            SubscriptionStatus::Trial => 2,
            SubscriptionStatus::Free => 1,
        }
    }

    pub fn is_free(self) -> bool {
        self == SubscriptionStatus::Free
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionStatus::Free => "free",
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "free" => Ok(SubscriptionStatus::Free),
            "trial" => Ok(SubscriptionStatus::Trial),
            "paid" => Ok(SubscriptionStatus::Paid),
            other => Err(ValidationError::InvalidStatus(other.to_string())),
        }
    }
}

// Anything the store hands back that is not exactly "paid" or "trial" counts as free.
impl<'de> Deserialize<'de> for SubscriptionStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            Some("paid") => SubscriptionStatus::Paid,
            Some("trial") => SubscriptionStatus::Trial,
            _ => SubscriptionStatus::Free,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
    Trial,
}

impl BillingCycle {
    pub fn as_str(self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
            BillingCycle::Trial => "trial",
        }
    }
}

impl FromStr for BillingCycle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "monthly" => Ok(BillingCycle::Monthly),
            "yearly" => Ok(BillingCycle::Yearly),
            "trial" => Ok(BillingCycle::Trial),
            other => Err(ValidationError::InvalidBillingCycle(other.to_string())),
        }
    }
}

fn lenient_cycle<'de, D>(deserializer: D) -> Result<Option<BillingCycle>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

/// One registered application, as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub id: String,
    /// Table the entry was read from. Attached by the store client, never serialized.
    #[serde(skip)]
    pub collection: Collection,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub categories: Vec<String>,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub icon_url: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "wire::rating")]
    pub rating: u8,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub is_favorite: bool,
    #[serde(default, deserialize_with = "wire::count")]
    pub usage_count: u64,
    #[serde(default, with = "wire::timestamp")]
    pub last_used: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subscription_status: SubscriptionStatus,
    #[serde(default)]
    pub subscription_plan: Option<String>,
    #[serde(default, deserialize_with = "wire::price")]
    pub subscription_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_cycle")]
    pub billing_cycle: Option<BillingCycle>,
    #[serde(default, with = "wire::date")]
    pub subscription_start_date: Option<NaiveDate>,
    #[serde(default, with = "wire::date")]
    pub next_billing_date: Option<NaiveDate>,
    #[serde(default, with = "wire::timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "wire::timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Subscription details of a non-free entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription<'a> {
    pub status: SubscriptionStatus,
    pub plan: Option<&'a str>,
    pub price: Option<f64>,
    pub billing_cycle: Option<BillingCycle>,
    pub start_date: Option<NaiveDate>,
    pub next_billing_date: Option<NaiveDate>,
}

impl CatalogEntry {
    /// A blank entry with the given name and URL, mostly useful for fixtures.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            collection: Collection::General,
            name: name.into(),
            url: url.into(),
            categories: Vec::new(),
            description: String::new(),
            icon_url: String::new(),
            tags: Vec::new(),
            rating: 0,
            is_favorite: false,
            usage_count: 0,
            last_used: None,
            subscription_status: SubscriptionStatus::Free,
            subscription_plan: None,
            subscription_price: None,
            billing_cycle: None,
            subscription_start_date: None,
            next_billing_date: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn entry_ref(&self) -> EntryRef {
        EntryRef::new(self.collection, self.id.clone())
    }

    /// Subscription fields, or `None` for free entries (whose fields are ignored).
    pub fn subscription(&self) -> Option<Subscription<'_>> {
        if self.subscription_status.is_free() {
            return None;
        }
        Some(Subscription {
            status: self.subscription_status,
            plan: self.subscription_plan.as_deref().filter(|p| !p.is_empty()),
            price: self.subscription_price,
            billing_cycle: self.billing_cycle,
            start_date: self.subscription_start_date,
            next_billing_date: self.next_billing_date,
        })
    }

    /// Merges the fields present in `patch` into this entry.
    pub fn apply_patch(&mut self, patch: &EntryPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(url) = &patch.url {
            self.url = url.clone();
        }
        if let Some(categories) = &patch.categories {
            self.categories = categories.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(icon_url) = &patch.icon_url {
            self.icon_url = icon_url.clone();
        }
        if let Some(tags) = &patch.tags {
            self.tags = tags.clone();
        }
        if let Some(rating) = patch.rating {
            self.rating = rating.min(5);
        }
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = is_favorite;
        }
        if let Some(usage_count) = patch.usage_count {
            self.usage_count = usage_count;
        }
        if let Some(last_used) = patch.last_used {
            self.last_used = Some(last_used);
        }
    }

    /// Replaces every user-editable field with the draft's values.
    pub fn apply_draft(&mut self, draft: &EntryDraft) {
        self.name = draft.name.clone();
        self.url = draft.url.clone();
        self.categories = draft.categories.clone();
        self.description = draft.description.clone();
        self.icon_url = draft.icon_url.clone();
        self.tags = draft.tags.clone();
        self.rating = draft.rating;
        self.is_favorite = draft.is_favorite;
        let sub = &draft.subscription;
        self.subscription_status = sub.subscription_status;
        self.subscription_plan = sub.subscription_plan.clone();
        self.subscription_price = sub.subscription_price;
        self.billing_cycle = sub.billing_cycle;
        self.subscription_start_date = sub.subscription_start_date;
        self.next_billing_date = sub.next_billing_date;
    }
}

/// Subscription half of a draft, flattened into the request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubscriptionDraft {
    pub subscription_status: SubscriptionStatus,
    pub subscription_plan: Option<String>,
    pub subscription_price: Option<f64>,
    pub billing_cycle: Option<BillingCycle>,
    #[serde(with = "wire::date")]
    pub subscription_start_date: Option<NaiveDate>,
    #[serde(with = "wire::date")]
    pub next_billing_date: Option<NaiveDate>,
}

impl SubscriptionDraft {
    pub fn free() -> Self {
        Self::default()
    }

    pub fn paid(
        plan: Option<String>,
        price: Option<f64>,
        cycle: BillingCycle,
        start_date: Option<NaiveDate>,
        next_billing_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            subscription_status: SubscriptionStatus::Paid,
            subscription_plan: plan,
            subscription_price: price,
            billing_cycle: Some(cycle),
            subscription_start_date: start_date,
            next_billing_date,
        }
    }

    /// Trials carry no price; the trial end date is stored as the next billing date.
    pub fn trial(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            subscription_status: SubscriptionStatus::Trial,
            subscription_plan: Some("Trial".to_string()),
            subscription_price: None,
            billing_cycle: Some(BillingCycle::Trial),
            subscription_start_date: start_date,
            next_billing_date: end_date,
        }
    }
}

/// Every user-editable field of an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntryDraft {
    pub name: String,
    pub url: String,
    pub categories: Vec<String>,
    pub description: String,
    pub icon_url: String,
    pub tags: Vec<String>,
    pub rating: u8,
    pub is_favorite: bool,
    #[serde(flatten)]
    pub subscription: SubscriptionDraft,
}

impl EntryDraft {
    pub fn new(name: impl Into<String>, url: impl Into<String>, categories: Vec<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            categories,
            ..Default::default()
        }
    }

    /// Checks required fields and URL shape, in the order the form reports them.
    pub fn validate(&self) -> Result<(), ValidationError> {
        crate::form::validate_draft(self)
    }
}

impl From<&CatalogEntry> for EntryDraft {
    fn from(entry: &CatalogEntry) -> Self {
        let subscription = match entry.subscription_status {
            SubscriptionStatus::Free => SubscriptionDraft::free(),
            status => SubscriptionDraft {
                subscription_status: status,
                subscription_plan: entry.subscription_plan.clone(),
                subscription_price: entry.subscription_price,
                billing_cycle: entry.billing_cycle,
                subscription_start_date: entry.subscription_start_date,
                next_billing_date: entry.next_billing_date,
            },
        };
        Self {
            name: entry.name.clone(),
            url: entry.url.clone(),
            categories: entry.categories.clone(),
            description: entry.description.clone(),
            icon_url: entry.icon_url.clone(),
            tags: entry.tags.clone(),
            rating: entry.rating,
            is_favorite: entry.is_favorite,
            subscription,
        }
    }
}

/// Body of a create call: the draft plus zeroed usage tracking.
#[derive(Debug, Serialize)]
pub struct NewEntry<'a> {
    #[serde(flatten)]
    pub draft: &'a EntryDraft,
    pub usage_count: u64,
    #[serde(with = "wire::timestamp")]
    pub last_used: Option<DateTime<Utc>>,
}

impl<'a> NewEntry<'a> {
    pub fn new(draft: &'a EntryDraft) -> Self {
        Self {
            draft,
            usage_count: 0,
            last_used: None,
        }
    }
}

/// A partial update. Only the fields that are `Some` are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_count: Option<u64>,
    #[serde(with = "wire::timestamp", skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl EntryPatch {
    pub fn favorite(is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Default::default()
        }
    }

    pub fn usage(usage_count: u64, last_used: DateTime<Utc>) -> Self {
        Self {
            usage_count: Some(usage_count),
            last_used: Some(last_used),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entry_ref_parses_collection_prefix() {
        let r: EntryRef = "creative/abc-1".parse().unwrap();
        assert_eq!(r, EntryRef::new(Collection::Creative, "abc-1"));
        assert_eq!(r.to_string(), "creative/abc-1");

        let bare: EntryRef = "xyz".parse().unwrap();
        assert_eq!(bare.collection, Collection::General);

        let by_table: EntryRef = "ai_apps_tools/9".parse().unwrap();
        assert_eq!(by_table.collection, Collection::Tools);

        assert!("music/1".parse::<EntryRef>().is_err());
        assert!("tools/".parse::<EntryRef>().is_err());
    }

    #[test]
    fn unknown_status_deserializes_as_free() {
        let entry: CatalogEntry = serde_json::from_value(json!({
            "id": "1", "name": "X", "subscription_status": "enterprise"
        }))
        .unwrap();
        assert_eq!(entry.subscription_status, SubscriptionStatus::Free);

        let entry: CatalogEntry =
            serde_json::from_value(json!({"id": "1", "subscription_status": null})).unwrap();
        assert_eq!(entry.subscription_status, SubscriptionStatus::Free);
    }

    #[test]
    fn sparse_record_deserializes_with_defaults() {
        let entry: CatalogEntry = serde_json::from_value(json!({
            "id": "a1",
            "name": "Tool",
            "url": "https://tool.dev",
            "categories": null,
            "tags": null,
            "billing_cycle": "weekly",
            "last_used": 1_700_000_000_000_i64
        }))
        .unwrap();
        assert!(entry.categories.is_empty());
        assert!(entry.tags.is_empty());
        assert_eq!(entry.billing_cycle, None);
        assert_eq!(entry.rating, 0);
        assert!(entry.last_used.is_some());
        assert_eq!(entry.collection, Collection::General);
    }

    #[test]
    fn free_entries_hide_subscription_fields() {
        let mut entry = CatalogEntry::new("Free", "https://free.app");
        entry.subscription_price = Some(10.0);
        entry.subscription_plan = Some("Stale".into());
        assert!(entry.subscription().is_none());

        entry.subscription_status = SubscriptionStatus::Paid;
        let sub = entry.subscription().unwrap();
        assert_eq!(sub.plan, Some("Stale"));
        assert_eq!(sub.price, Some(10.0));
    }

    #[test]
    fn free_draft_serializes_null_subscription_fields() {
        let draft = EntryDraft::new("A", "https://a.io", vec!["Dev".into()]);
        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body["subscription_status"], "free");
        assert!(body["subscription_plan"].is_null());
        assert!(body["subscription_price"].is_null());
        assert!(body["billing_cycle"].is_null());
        assert!(body["subscription_start_date"].is_null());
        assert!(body["next_billing_date"].is_null());
        assert!(body.get("usage_count").is_none());
    }

    #[test]
    fn new_entry_body_zeroes_usage() {
        let draft = EntryDraft::new("A", "https://a.io", vec!["Dev".into()]);
        let body = serde_json::to_value(NewEntry::new(&draft)).unwrap();
        assert_eq!(body["usage_count"], 0);
        assert!(body["last_used"].is_null());
        assert_eq!(body["name"], "A");
    }

    #[test]
    fn trial_draft_has_fixed_plan_and_cycle() {
        let end = NaiveDate::from_ymd_opt(2025, 2, 1);
        let sub = SubscriptionDraft::trial(None, end);
        let body = serde_json::to_value(&sub).unwrap();
        assert_eq!(body["subscription_plan"], "Trial");
        assert_eq!(body["billing_cycle"], "trial");
        assert!(body["subscription_price"].is_null());
        assert_eq!(body["next_billing_date"], "2025-02-01");
    }

    #[test]
    fn patch_only_sends_present_fields() {
        let body = serde_json::to_value(EntryPatch::favorite(true)).unwrap();
        assert_eq!(body, json!({"is_favorite": true}));

        let at = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let body = serde_json::to_value(EntryPatch::usage(4, at)).unwrap();
        assert_eq!(
            body,
            json!({"usage_count": 4, "last_used": 1_700_000_000_000_i64})
        );
    }

    #[test]
    fn draft_round_trips_through_entry() {
        let mut draft = EntryDraft::new("Writer", "https://w.ai", vec!["Text".into()]);
        draft.tags = vec!["nlp".into()];
        draft.rating = 4;
        draft.subscription = SubscriptionDraft::paid(
            Some("Pro".into()),
            Some(20.0),
            BillingCycle::Monthly,
            None,
            NaiveDate::from_ymd_opt(2025, 3, 1),
        );

        let mut entry = CatalogEntry::new("", "");
        entry.apply_draft(&draft);
        assert_eq!(EntryDraft::from(&entry), draft);
    }

    #[test]
    fn apply_patch_leaves_absent_fields_alone() {
        let mut entry = CatalogEntry::new("Keep", "https://keep.me");
        entry.usage_count = 3;
        entry.apply_patch(&EntryPatch::favorite(true));
        assert!(entry.is_favorite);
        assert_eq!(entry.usage_count, 3);
        assert_eq!(entry.name, "Keep");
    }
}
