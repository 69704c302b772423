//! # Entry Forms
//!
//! The registration and edit forms hold raw user input. [`EntryForm::to_draft`] turns that
//! input into an [`EntryDraft`], or reports the first problem found:
//!
//! 1. name is empty
//! 2. URL is empty
//! 3. no category is checked (also raises the category error indicator)
//! 4. URL does not parse
//!
//! Each form owns its own [`RatingState`] and [`CategorySelection`], so the create and edit
//! forms never share star or checkbox state.

use crate::error::ValidationError;
use crate::model::{
    BillingCycle, CatalogEntry, EntryDraft, SubscriptionDraft, SubscriptionStatus,
};
use crate::render::MAX_RATING;
use crate::wire;
use chrono::NaiveDate;
use url::Url;

/// Star widget state: the committed rating plus a transient hover preview.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatingState {
    current: u8,
    hover: Option<u8>,
}

impl RatingState {
    pub fn new(current: u8) -> Self {
        Self {
            current: current.min(MAX_RATING),
            hover: None,
        }
    }

    pub fn select(&mut self, rating: u32) -> Result<(), ValidationError> {
        self.current = checked_rating(rating)?;
        Ok(())
    }

    pub fn hover(&mut self, rating: u32) -> Result<(), ValidationError> {
        self.hover = Some(checked_rating(rating)?);
        Ok(())
    }

    pub fn leave(&mut self) {
        self.hover = None;
    }

    /// What the stars show right now: the hover preview, else the selection.
    pub fn displayed(&self) -> u8 {
        self.hover.unwrap_or(self.current)
    }

    pub fn value(&self) -> u8 {
        self.current
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn checked_rating(rating: u32) -> Result<u8, ValidationError> {
    if rating > MAX_RATING as u32 {
        return Err(ValidationError::RatingOutOfRange(rating));
    }
    Ok(rating as u8)
}

/// Checked categories plus the "select at least one" indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySelection {
    selected: Vec<String>,
    error_visible: bool,
}

impl CategorySelection {
    pub fn from_selected(selected: Vec<String>) -> Self {
        let mut selection = Self::default();
        for category in selected {
            selection.set(&category, true);
        }
        selection.error_visible = false;
        selection
    }

    pub fn set(&mut self, category: &str, checked: bool) {
        let category = category.trim();
        let present = self.selected.iter().any(|c| c == category);
        if checked && !present && !category.is_empty() {
            self.selected.push(category.to_string());
        } else if !checked {
            self.selected.retain(|c| c != category);
        }
        self.error_visible = false;
    }

    pub fn toggle(&mut self, category: &str) {
        let checked = self.is_selected(category);
        self.set(category, !checked);
    }

    pub fn is_selected(&self, category: &str) -> bool {
        let category = category.trim();
        self.selected.iter().any(|c| c == category)
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn error_visible(&self) -> bool {
        self.error_visible
    }

    pub fn show_error(&mut self) {
        self.error_visible = true;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Raw subscription inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionForm {
    pub status: String,
    pub plan: String,
    pub price: String,
    pub billing_cycle: String,
    pub start_date: String,
    /// Next billing date, or the trial end date for trials.
    pub next_billing_date: String,
}

impl SubscriptionForm {
    pub fn from_entry(entry: &CatalogEntry) -> Self {
        if entry.subscription_status.is_free() {
            return Self::default();
        }
        Self {
            status: entry.subscription_status.as_str().to_string(),
            plan: entry.subscription_plan.clone().unwrap_or_default(),
            price: entry
                .subscription_price
                .map(|p| p.to_string())
                .unwrap_or_default(),
            billing_cycle: entry
                .billing_cycle
                .map(|c| c.as_str().to_string())
                .unwrap_or_default(),
            start_date: format_date(entry.subscription_start_date),
            next_billing_date: format_date(entry.next_billing_date),
        }
    }

    pub fn to_draft(&self) -> Result<SubscriptionDraft, ValidationError> {
        let status: SubscriptionStatus = self.status.parse()?;
        let start_date = parse_date("subscription_start_date", &self.start_date)?;
        let next_billing_date = parse_date("next_billing_date", &self.next_billing_date)?;

        Ok(match status {
            SubscriptionStatus::Free => SubscriptionDraft::free(),
            SubscriptionStatus::Trial => SubscriptionDraft::trial(start_date, next_billing_date),
            SubscriptionStatus::Paid => {
                let plan = self.plan.trim();
                let cycle = match self.billing_cycle.trim() {
                    "" => BillingCycle::Monthly,
                    raw => raw.parse()?,
                };
                SubscriptionDraft::paid(
                    (!plan.is_empty()).then(|| plan.to_string()),
                    parse_price(&self.price)?,
                    cycle,
                    start_date,
                    next_billing_date,
                )
            }
        })
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(wire::date::FORMAT).to_string())
        .unwrap_or_default()
}

fn parse_date(field: &'static str, raw: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    wire::date::parse_str(raw)
        .map(Some)
        .ok_or_else(|| ValidationError::InvalidDate {
            field,
            value: raw.to_string(),
        })
}

fn parse_price(raw: &str) -> Result<Option<f64>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .map(Some)
        .ok_or_else(|| ValidationError::InvalidPrice(raw.to_string()))
}

/// The registration or edit form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryForm {
    pub name: String,
    pub url: String,
    pub description: String,
    pub icon_url: String,
    /// Comma-separated.
    pub tags: String,
    pub rating: RatingState,
    pub categories: CategorySelection,
    pub is_favorite: bool,
    pub subscription: SubscriptionForm,
}

impl EntryForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Edit form prefilled from a stored entry.
    pub fn from_entry(entry: &CatalogEntry) -> Self {
        Self {
            name: entry.name.clone(),
            url: entry.url.clone(),
            description: entry.description.clone(),
            icon_url: entry.icon_url.clone(),
            tags: entry.tags.join(", "),
            rating: RatingState::new(entry.rating),
            categories: CategorySelection::from_selected(entry.categories.clone()),
            is_favorite: entry.is_favorite,
            subscription: SubscriptionForm::from_entry(entry),
        }
    }

    /// Builds and validates the draft. A missing category also raises the category indicator.
    pub fn to_draft(&mut self) -> Result<EntryDraft, ValidationError> {
        let draft = EntryDraft {
            name: self.name.trim().to_string(),
            url: self.url.trim().to_string(),
            categories: self.categories.selected().to_vec(),
            description: self.description.trim().to_string(),
            icon_url: self.icon_url.trim().to_string(),
            tags: parse_tags(&self.tags),
            rating: self.rating.value(),
            is_favorite: self.is_favorite,
            subscription: SubscriptionDraft::free(),
        };

        if let Err(err) = validate_draft(&draft) {
            if err == ValidationError::NoCategory {
                self.categories.show_error();
            }
            return Err(err);
        }

        Ok(EntryDraft {
            subscription: self.subscription.to_draft()?,
            ..draft
        })
    }

    /// Points the icon URL at the site's favicon.
    pub fn use_favicon(&mut self) -> Result<&str, ValidationError> {
        self.icon_url = favicon_url(&self.url)?;
        Ok(&self.icon_url)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Splits on commas, trims, drops empties.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn validate_url(raw: &str) -> Result<Url, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingUrl);
    }
    Url::parse(raw).map_err(|e| ValidationError::MalformedUrl(format!("{} ({})", raw, e)))
}

/// Which input a blur-time check applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Name,
    Url,
}

pub fn validate_field(kind: FieldKind, value: &str) -> Result<(), ValidationError> {
    match kind {
        FieldKind::Name if value.trim().is_empty() => Err(ValidationError::MissingName),
        FieldKind::Name => Ok(()),
        FieldKind::Url => validate_url(value).map(|_| ()),
    }
}

/// `{scheme}://{host}/favicon.ico` for the given site URL.
pub fn favicon_url(raw: &str) -> Result<String, ValidationError> {
    let url = validate_url(raw)?;
    let host = url
        .host_str()
        .ok_or_else(|| ValidationError::MalformedUrl(format!("{} (no host)", raw.trim())))?;
    Ok(format!("{}://{}/favicon.ico", url.scheme(), host))
}

pub fn validate_draft(draft: &EntryDraft) -> Result<(), ValidationError> {
    if draft.name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if draft.url.trim().is_empty() {
        return Err(ValidationError::MissingUrl);
    }
    if draft.categories.is_empty() {
        return Err(ValidationError::NoCategory);
    }
    validate_url(&draft.url)?;
    if draft.rating > MAX_RATING {
        return Err(ValidationError::RatingOutOfRange(draft.rating as u32));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::{paid, trial};

    fn filled() -> EntryForm {
        let mut form = EntryForm::new();
        form.name = "  Writer ".into();
        form.url = "https://writer.ai/app".into();
        form.tags = "nlp, , writing ,".into();
        form.categories.set("텍스트 & 언어", true);
        form
    }

    #[test]
    fn draft_is_trimmed_and_tags_split() {
        let draft = filled().to_draft().unwrap();
        assert_eq!(draft.name, "Writer");
        assert_eq!(draft.tags, vec!["nlp", "writing"]);
        assert_eq!(draft.subscription, SubscriptionDraft::free());
    }

    #[test]
    fn validation_reports_in_form_order() {
        let mut form = EntryForm::new();
        form.url = "not a url".into();
        assert_eq!(form.to_draft(), Err(ValidationError::MissingName));

        form.name = "X".into();
        form.url.clear();
        assert_eq!(form.to_draft(), Err(ValidationError::MissingUrl));

        // A malformed URL is only reported once a category is chosen.
        form.url = "not a url".into();
        assert_eq!(form.to_draft(), Err(ValidationError::NoCategory));
        form.categories.set("Dev", true);
        assert!(matches!(
            form.to_draft(),
            Err(ValidationError::MalformedUrl(_))
        ));
    }

    #[test]
    fn category_error_clears_on_any_checkbox_change() {
        let mut form = filled();
        form.categories.set("텍스트 & 언어", false);
        assert_eq!(form.to_draft(), Err(ValidationError::NoCategory));
        assert!(form.categories.error_visible());

        form.categories.toggle("Dev");
        assert!(!form.categories.error_visible());
        assert_eq!(form.categories.selected().to_vec(), vec!["Dev".to_string()]);
    }

    #[test]
    fn rating_state_previews_on_hover() {
        let mut rating = RatingState::default();
        rating.select(3).unwrap();
        rating.hover(5).unwrap();
        assert_eq!(rating.displayed(), 5);
        assert_eq!(rating.value(), 3);
        rating.leave();
        assert_eq!(rating.displayed(), 3);
        assert_eq!(rating.select(6), Err(ValidationError::RatingOutOfRange(6)));
        rating.reset();
        assert_eq!(rating.value(), 0);
    }

    #[test]
    fn forms_do_not_share_rating_state() {
        let mut create = EntryForm::new();
        let edit = EntryForm::new();
        create.rating.select(4).unwrap();
        assert_eq!(edit.rating.value(), 0);
    }

    #[test]
    fn paid_subscription_defaults_to_monthly() {
        let mut form = filled();
        form.subscription = SubscriptionForm {
            status: "paid".into(),
            price: "19.5".into(),
            next_billing_date: "2025-07-01".into(),
            ..Default::default()
        };
        let sub = form.to_draft().unwrap().subscription;
        assert_eq!(sub.subscription_status, SubscriptionStatus::Paid);
        assert_eq!(sub.billing_cycle, Some(BillingCycle::Monthly));
        assert_eq!(sub.subscription_plan, None);
        assert_eq!(sub.subscription_price, Some(19.5));
        assert_eq!(sub.next_billing_date, NaiveDate::from_ymd_opt(2025, 7, 1));
    }

    #[test]
    fn trial_ignores_plan_and_price_input() {
        let mut form = filled();
        form.subscription = SubscriptionForm {
            status: "trial".into(),
            plan: "Enterprise".into(),
            price: "99".into(),
            next_billing_date: "2025-07-01".into(),
            ..Default::default()
        };
        let sub = form.to_draft().unwrap().subscription;
        assert_eq!(sub.subscription_plan.as_deref(), Some("Trial"));
        assert_eq!(sub.subscription_price, None);
        assert_eq!(sub.billing_cycle, Some(BillingCycle::Trial));
    }

    #[test]
    fn bad_subscription_input_is_rejected() {
        let mut form = filled();
        form.subscription.status = "paid".into();
        form.subscription.price = "lots".into();
        assert_eq!(
            form.to_draft(),
            Err(ValidationError::InvalidPrice("lots".into()))
        );

        form.subscription.price.clear();
        form.subscription.start_date = "yesterday".into();
        assert!(matches!(
            form.to_draft(),
            Err(ValidationError::InvalidDate {
                field: "subscription_start_date",
                ..
            })
        ));

        form.subscription.start_date.clear();
        form.subscription.status = "gold".into();
        assert_eq!(
            form.to_draft(),
            Err(ValidationError::InvalidStatus("gold".into()))
        );
    }

    #[test]
    fn edit_form_round_trips_stored_entry() {
        let mut entry = paid("Studio", "이미지 & 비주얼", 12.0, BillingCycle::Yearly);
        entry.tags = vec!["art".into(), "3d".into()];
        entry.rating = 4;
        entry.next_billing_date = NaiveDate::from_ymd_opt(2026, 1, 15);

        let mut form = EntryForm::from_entry(&entry);
        assert_eq!(form.tags, "art, 3d");
        assert_eq!(form.subscription.next_billing_date, "2026-01-15");
        assert_eq!(form.to_draft().unwrap(), EntryDraft::from(&entry));
    }

    #[test]
    fn edit_form_for_trial_keeps_end_date() {
        let entry = trial("Try", "x", NaiveDate::from_ymd_opt(2025, 8, 1));
        let mut form = EntryForm::from_entry(&entry);
        let sub = form.to_draft().unwrap().subscription;
        assert_eq!(sub.next_billing_date, NaiveDate::from_ymd_opt(2025, 8, 1));
    }

    #[test]
    fn favicon_uses_scheme_and_host_only() {
        assert_eq!(
            favicon_url("https://app.example.com:8443/path?q=1").unwrap(),
            "https://app.example.com/favicon.ico"
        );
        assert_eq!(favicon_url(""), Err(ValidationError::MissingUrl));
        assert!(favicon_url("mailto:me@example.com").is_err());
        assert_eq!(
            favicon_url("http://localhost:3000/").unwrap(),
            "http://localhost/favicon.ico"
        );

        let mut form = filled();
        assert_eq!(form.use_favicon().unwrap(), "https://writer.ai/favicon.ico");
    }

    #[test]
    fn field_checks_match_blur_validation() {
        assert_eq!(
            validate_field(FieldKind::Name, "  "),
            Err(ValidationError::MissingName)
        );
        assert!(validate_field(FieldKind::Url, "https://ok.dev").is_ok());
        assert!(validate_field(FieldKind::Url, "ok.dev").is_err());
    }
}
