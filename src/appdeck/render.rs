//! # Render Models
//!
//! Pure functions from stored entries to the values a presentation layer shows. Nothing
//! here formats for a terminal or a page; the CLI's `print` module does that.
//!
//! - [`EntryCard`]: one row of the catalog listing.
//! - [`SubscriptionView`]: the billing details of one entry.
//! - [`FilterSummary`]: the "N of M" banner shown while filters are active.

use crate::model::{BillingCycle, CatalogEntry, EntryRef, SubscriptionStatus};
use crate::subscription::{self, BadgeState};
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const MAX_RATING: u8 = 5;
pub const DEFAULT_PLAN: &str = "Pro Plan";
pub const FALLBACK_EMOJI: &str = "🤖";
pub const UNCATEGORIZED: &str = "Uncategorized";

static CATEGORY_EMOJI: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("텍스트 & 언어", "📝"),
        ("이미지 & 비주얼", "🎨"),
        ("음성 & 오디오", "🎵"),
        ("개발 & 코딩", "💻"),
        ("비즈니스 & 생산성", "📊"),
        ("교육 & 학습", "📚"),
        ("마케팅 & SEO", "📈"),
    ])
});

const RATING_LABELS: [&str; 6] = [
    "Select a rating",
    "Poor",
    "Fair",
    "Good",
    "Very good",
    "Excellent",
];

pub fn category_emoji(category: &str) -> &'static str {
    CATEGORY_EMOJI
        .get(category)
        .copied()
        .unwrap_or(FALLBACK_EMOJI)
}

/// Known category names, in the order the registration form lists them.
pub fn known_categories() -> [&'static str; 7] {
    [
        "텍스트 & 언어",
        "이미지 & 비주얼",
        "음성 & 오디오",
        "개발 & 코딩",
        "비즈니스 & 생산성",
        "교육 & 학습",
        "마케팅 & SEO",
    ]
}

/// Label for a rating; out-of-range values get the prompt label.
pub fn rating_label(rating: u8) -> &'static str {
    RATING_LABELS
        .get(rating as usize)
        .copied()
        .unwrap_or(RATING_LABELS[0])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLabel {
    pub emoji: &'static str,
    pub name: String,
}

impl std::fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.emoji, self.name)
    }
}

pub fn category_labels(categories: &[String]) -> Vec<CategoryLabel> {
    if categories.is_empty() {
        return vec![CategoryLabel {
            emoji: FALLBACK_EMOJI,
            name: UNCATEGORIZED.to_string(),
        }];
    }
    categories
        .iter()
        .map(|name| CategoryLabel {
            emoji: category_emoji(name),
            name: name.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryCard {
    pub entry_ref: EntryRef,
    pub name: String,
    pub url: String,
    pub icon_url: Option<String>,
    pub categories: Vec<CategoryLabel>,
    pub description: Option<String>,
    pub rating: u8,
    /// Filled state of each of the five stars.
    pub stars: [bool; MAX_RATING as usize],
    pub rating_label: &'static str,
    pub usage_count: u64,
    pub last_used: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub badge: Option<BadgeState>,
}

pub fn entry_card(entry: &CatalogEntry, now: DateTime<Utc>) -> EntryCard {
    let rating = entry.rating.min(MAX_RATING);
    let mut stars = [false; MAX_RATING as usize];
    for star in stars.iter_mut().take(rating as usize) {
        *star = true;
    }

    EntryCard {
        entry_ref: entry.entry_ref(),
        name: entry.name.clone(),
        url: entry.url.clone(),
        icon_url: non_empty(&entry.icon_url),
        categories: category_labels(&entry.categories),
        description: non_empty(&entry.description),
        rating,
        stars,
        rating_label: rating_label(rating),
        usage_count: entry.usage_count,
        last_used: entry.last_used,
        tags: entry.tags.clone(),
        is_favorite: entry.is_favorite,
        badge: subscription::badge(entry, now),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubscriptionView {
    Free {
        name: String,
    },
    Active {
        name: String,
        status: SubscriptionStatus,
        plan: String,
        price: Option<f64>,
        cycle_label: &'static str,
        next_billing_date: Option<NaiveDate>,
        start_date: Option<NaiveDate>,
        expiring: bool,
        yearly_price: Option<f64>,
        savings: Option<f64>,
    },
}

pub fn subscription_view(entry: &CatalogEntry, now: DateTime<Utc>) -> SubscriptionView {
    let Some(sub) = entry.subscription() else {
        return SubscriptionView::Free {
            name: entry.name.clone(),
        };
    };

    let cycle_label = match sub.billing_cycle {
        Some(BillingCycle::Yearly) => "Yearly",
        _ => "Monthly",
    };

    SubscriptionView::Active {
        name: entry.name.clone(),
        status: sub.status,
        plan: sub.plan.unwrap_or(DEFAULT_PLAN).to_string(),
        price: sub.price,
        cycle_label,
        next_billing_date: sub.next_billing_date,
        start_date: sub.start_date,
        expiring: subscription::is_expiring_soon(sub.next_billing_date, now),
        yearly_price: sub
            .price
            .map(|p| subscription::yearly_price(p, sub.billing_cycle)),
        savings: sub
            .price
            .and_then(|p| subscription::annual_savings(p, sub.billing_cycle)),
    }
}

/// Counts behind the results banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSummary {
    pub total: usize,
    pub shown: usize,
    pub search_term: String,
    pub category: Option<String>,
}

impl FilterSummary {
    pub fn has_filters(&self) -> bool {
        !self.search_term.is_empty() || self.category.is_some()
    }
}

impl std::fmt::Display for FilterSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {} entries", self.shown, self.total)?;
        match (&self.category, self.search_term.is_empty()) {
            (Some(category), false) => write!(
                f,
                " (category: {} {}, search: \"{}\")",
                category_emoji(category),
                category,
                self.search_term
            ),
            (Some(category), true) => {
                write!(f, " (category: {} {})", category_emoji(category), category)
            }
            (None, false) => write!(f, " (search: \"{}\")", self.search_term),
            (None, true) => Ok(()),
        }
    }
}
