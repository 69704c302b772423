//! Billing math for subscription entries: expiry window, yearly equivalents and badges.
//!
//! Everything here takes `now` explicitly so callers (and tests) control the clock.

use crate::model::{BillingCycle, CatalogEntry, SubscriptionStatus};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// An entry is expiring once its next billing date is this many days away or closer.
pub const EXPIRY_WINDOW_DAYS: i64 = 7;

/// Share of the yearly price suggested as savings when switching to annual billing.
pub const ANNUAL_SAVINGS_RATE: f64 = 0.2;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whole days until `date` (midnight UTC), rounded up. Negative when overdue.
pub fn days_until(date: NaiveDate, now: DateTime<Utc>) -> i64 {
    let due = date.and_time(NaiveTime::MIN).and_utc();
    let millis = (due - now).num_milliseconds();
    // Ceiling division; `div_euclid` floors, so shift by one day minus a millisecond.
    (millis + MILLIS_PER_DAY - 1).div_euclid(MILLIS_PER_DAY)
}

pub fn is_expiring_soon(next_billing_date: Option<NaiveDate>, now: DateTime<Utc>) -> bool {
    next_billing_date.is_some_and(|date| days_until(date, now) <= EXPIRY_WINDOW_DAYS)
}

/// Expiry for an entry. Free entries never expire.
pub fn entry_expiring_soon(entry: &CatalogEntry, now: DateTime<Utc>) -> bool {
    !entry.subscription_status.is_free() && is_expiring_soon(entry.next_billing_date, now)
}

/// Yearly cost. A yearly cycle's price already is the annual charge.
pub fn yearly_price(price: f64, cycle: Option<BillingCycle>) -> f64 {
    match cycle {
        Some(BillingCycle::Yearly) => price,
        _ => price * 12.0,
    }
}

/// Suggested savings from switching a monthly plan to annual billing.
pub fn annual_savings(price: f64, cycle: Option<BillingCycle>) -> Option<f64> {
    match cycle {
        Some(BillingCycle::Monthly) => Some(yearly_price(price, cycle) * ANNUAL_SAVINGS_RATE),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Pro,
    Trial,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::Pro => "PRO",
            Badge::Trial => "TRIAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeState {
    pub badge: Badge,
    pub expiring: bool,
}

pub fn badge(entry: &CatalogEntry, now: DateTime<Utc>) -> Option<BadgeState> {
    let badge = match entry.subscription_status {
        SubscriptionStatus::Paid => Badge::Pro,
        SubscriptionStatus::Trial => Badge::Trial,
        SubscriptionStatus::Free => return None,
    };
    Some(BadgeState {
        badge,
        expiring: is_expiring_soon(entry.next_billing_date, now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::{entry, paid, trial};
    use chrono::{Duration, TimeZone};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
    }

    fn today_plus(days: i64) -> NaiveDate {
        noon().date_naive() + Duration::days(days)
    }

    #[test]
    fn days_until_rounds_up() {
        assert_eq!(days_until(today_plus(5), noon()), 5);
        assert_eq!(days_until(today_plus(1), noon()), 1);
        // Today's midnight has passed: half a day overdue rounds toward zero.
        assert_eq!(days_until(today_plus(0), noon()), 0);
        assert_eq!(days_until(today_plus(-3), noon()), -3);

        let midnight = Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap();
        assert_eq!(days_until(today_plus(7), midnight), 7);
    }

    #[test]
    fn expiry_window_is_inclusive() {
        assert!(is_expiring_soon(Some(today_plus(5)), noon()));
        assert!(is_expiring_soon(Some(today_plus(7)), noon()));
        assert!(!is_expiring_soon(Some(today_plus(8)), noon()));
        assert!(is_expiring_soon(Some(today_plus(-30)), noon()));
        assert!(!is_expiring_soon(None, noon()));
    }

    #[test]
    fn yearly_price_depends_on_cycle() {
        assert_eq!(yearly_price(10.0, Some(BillingCycle::Monthly)), 120.0);
        assert_eq!(yearly_price(100.0, Some(BillingCycle::Yearly)), 100.0);
        assert_eq!(yearly_price(10.0, None), 120.0);
    }

    #[test]
    fn savings_only_for_monthly_plans() {
        let savings = annual_savings(10.0, Some(BillingCycle::Monthly)).unwrap();
        assert!((savings - 24.0).abs() < 1e-9);
        assert_eq!(annual_savings(100.0, Some(BillingCycle::Yearly)), None);
        assert_eq!(annual_savings(0.0, Some(BillingCycle::Trial)), None);
    }

    #[test]
    fn badges_follow_status() {
        let pro = paid("P", "x", 10.0, BillingCycle::Monthly);
        assert_eq!(
            badge(&pro, noon()),
            Some(BadgeState {
                badge: Badge::Pro,
                expiring: false
            })
        );

        let ending = trial("T", "x", Some(today_plus(2)));
        let state = badge(&ending, noon()).unwrap();
        assert_eq!(state.badge.label(), "TRIAL");
        assert!(state.expiring);

        let mut free = entry("F", "x");
        free.next_billing_date = Some(today_plus(1));
        assert_eq!(badge(&free, noon()), None);
        assert!(!entry_expiring_soon(&free, noon()));
    }
}
