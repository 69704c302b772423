use appdeck::api::{CmdMessage, MessageLevel};
use appdeck::render::{EntryCard, FilterSummary, SubscriptionView};
use appdeck::subscription::{Badge, BadgeState};
use chrono::{DateTime, NaiveDate, Utc};
use colored::Colorize;
use console::Style;
use once_cell::sync::Lazy;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const STARS_WIDTH: usize = 6;
const FAVORITE_MARKER: &str = "♥";
const STAR_FULL: char = '★';
const STAR_EMPTY: char = '☆';

static BADGE_PRO: Lazy<Style> = Lazy::new(|| Style::new().magenta().bold());
static BADGE_TRIAL: Lazy<Style> = Lazy::new(|| Style::new().cyan().bold());
static EXPIRING: Lazy<Style> = Lazy::new(|| Style::new().red().bold());
static LABEL: Lazy<Style> = Lazy::new(|| Style::new().dim());

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(super) fn print_summary(summary: &FilterSummary) {
    if summary.has_filters() {
        println!("{}\n", summary.to_string().dimmed());
    }
}

pub(super) fn print_entries(cards: &[EntryCard]) {
    if cards.is_empty() {
        println!("No entries found.");
        return;
    }
    for (i, card) in cards.iter().enumerate() {
        println!("{}", entry_line(i + 1, card));
    }
}

pub(super) fn print_card(card: &EntryCard) {
    let badge = card.badge.map(badge_text).unwrap_or_default();
    let favorite = if card.is_favorite {
        format!(" {}", FAVORITE_MARKER.red())
    } else {
        String::new()
    };
    println!("{}{}{}", card.name.bold(), favorite, badge);
    println!("{}", card.url.underline());
    println!("--------------------------------");

    let categories = card
        .categories
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("  ");
    field("Categories", &categories);
    field(
        "Rating",
        &format!("{} {}", stars(&card.stars), card.rating_label),
    );
    if let Some(description) = &card.description {
        field("About", description);
    }
    if !card.tags.is_empty() {
        field("Tags", &card.tags.join(", "));
    }
    if let Some(icon) = &card.icon_url {
        field("Icon", icon);
    }
    field(
        "Used",
        &format!(
            "{} times, last {}",
            card.usage_count,
            format_time_ago(card.last_used).trim_start()
        ),
    );
    field("Ref", &card.entry_ref.to_string());
}

pub(super) fn print_subscription(view: &SubscriptionView) {
    println!();
    match view {
        SubscriptionView::Free { .. } => field("Plan", "Free"),
        SubscriptionView::Active {
            status,
            plan,
            price,
            cycle_label,
            next_billing_date,
            start_date,
            expiring,
            yearly_price,
            savings,
            ..
        } => {
            field("Plan", &format!("{} ({})", plan, status));
            if let Some(price) = price {
                field("Price", &format!("${:.2} / month", price));
            }
            field("Billing", cycle_label);
            if let Some(start) = start_date {
                field("Started", &format_date(*start));
            }
            if let Some(next) = next_billing_date {
                let next = format_date(*next);
                if *expiring {
                    field("Next bill", &EXPIRING.apply_to(format!("{} (soon)", next)).to_string());
                } else {
                    field("Next bill", &next);
                }
            }
            if let Some(yearly) = yearly_price {
                field("Per year", &format!("${:.2}", yearly));
            }
            if let Some(savings) = savings {
                println!(
                    "{}",
                    format!("Switching to yearly billing could save about ${:.2}", savings)
                        .green()
                );
            }
        }
    }
}

fn field(label: &str, value: &str) {
    println!("{} {}", LABEL.apply_to(format!("{:<11}", label)), value);
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// One listing row: position, name, badge, categories, stars, last used.
fn entry_line(position: usize, card: &EntryCard) -> String {
    let idx_str = format!("{}. ", position);
    let left_prefix = if card.is_favorite {
        format!("  {} ", FAVORITE_MARKER)
    } else {
        "    ".to_string()
    };

    let badge = card.badge.map(badge_text).unwrap_or_default();
    let badge_width = card
        .badge
        .map(|b| b.badge.label().width() + 3)
        .unwrap_or(0);

    let categories: String = card.categories.iter().map(|c| c.emoji).collect();
    let title = format!("{} {}", card.name, categories);

    let fixed_width = left_prefix.width()
        + idx_str.width()
        + badge_width
        + STARS_WIDTH
        + TIME_WIDTH;
    let available = LINE_WIDTH.saturating_sub(fixed_width);
    let title_display = truncate_to_width(&title, available);
    let padding = available.saturating_sub(title_display.width());

    format!(
        "{}{}{}{}{}{} {}",
        left_prefix,
        idx_str.yellow(),
        title_display,
        badge,
        " ".repeat(padding),
        stars(&card.stars),
        format_time_ago(card.last_used).dimmed()
    )
}

fn badge_text(state: BadgeState) -> String {
    let style = if state.expiring {
        &*EXPIRING
    } else {
        match state.badge {
            Badge::Pro => &*BADGE_PRO,
            Badge::Trial => &*BADGE_TRIAL,
        }
    };
    format!(" {}", style.apply_to(format!("[{}]", state.badge.label())))
}

fn stars(filled: &[bool]) -> String {
    filled
        .iter()
        .map(|&f| if f { STAR_FULL } else { STAR_EMPTY })
        .collect()
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: Option<DateTime<Utc>>) -> String {
    let Some(timestamp) = timestamp else {
        return format!("{:>width$}", "never used", width = TIME_WIDTH);
    };
    let duration = Utc::now().signed_duration_since(timestamp);

    let formatter = Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
