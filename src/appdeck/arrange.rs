//! # Sorting and Filtering
//!
//! [`arrange`] turns the aggregated listing into what the user sees: entries are filtered
//! by category and search term, then ordered by
//!
//! 1. subscription tier (paid, trial, free),
//! 2. favorite flag (favorites first),
//! 3. name, with Latin-script names ahead of Hangul names.
//!
//! The sort is stable, so entries that tie on every key keep their aggregation order.
//!
//! ## Name Collation
//!
//! Names are compared by [`NameKey`], a small collation tailored to the catalog:
//!
//! - fullwidth forms fold to ASCII and everything is lowercased,
//! - runs of ASCII digits compare by numeric value (`item2` < `item10`),
//! - punctuation and spaces sort before digits, digits before letters,
//! - accented Latin letters share the weight of their base letter; the accent only
//!   breaks ties between otherwise equal Latin names,
//! - Hangul is ordered by initial consonant, then by syllable, so `ㄱ` < `가` < `나`.
//!
//! Within the Hangul group letters follow Korean order: Hangul ahead of every other
//! script (`비서` < `AI 비서`), and accents never break ties.

use crate::model::CatalogEntry;
use std::cmp::{Ordering, Reverse};

/// Search and category constraints. Empty values match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    search_term: String,
    category: Option<String>,
}

impl EntryFilter {
    pub fn new(search_term: &str, category: Option<&str>) -> Self {
        Self {
            search_term: search_term.trim().to_lowercase(),
            category: category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        }
    }

    pub fn search(search_term: &str) -> Self {
        Self::new(search_term, None)
    }

    pub fn category(category: &str) -> Self {
        Self::new("", Some(category))
    }

    /// Normalized (trimmed, lowercased) search term.
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.search_term.is_empty() && self.category.is_none()
    }

    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        self.matches_category(entry) && self.matches_search(entry)
    }

    fn matches_category(&self, entry: &CatalogEntry) -> bool {
        match &self.category {
            None => true,
            Some(category) => entry.categories.iter().any(|c| c == category),
        }
    }

    fn matches_search(&self, entry: &CatalogEntry) -> bool {
        if self.search_term.is_empty() {
            return true;
        }
        let mut haystack = vec![entry.name.as_str(), entry.description.as_str()];
        haystack.extend(entry.tags.iter().map(String::as_str));
        haystack
            .join(" ")
            .to_lowercase()
            .contains(&self.search_term)
    }
}

/// Filters, then sorts into display order.
pub fn arrange(entries: Vec<CatalogEntry>, filter: &EntryFilter) -> Vec<CatalogEntry> {
    let mut kept: Vec<CatalogEntry> = entries.into_iter().filter(|e| filter.matches(e)).collect();
    kept.sort_by_cached_key(EntryKey::new);
    kept
}

/// Display order of two entries.
pub fn compare_entries(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    EntryKey::new(a).cmp(&EntryKey::new(b))
}

/// Name order on its own: non-Hangul names first, then the collation below.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    NameKey::new(a).cmp(&NameKey::new(b))
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct EntryKey {
    tier: Reverse<u8>,
    favorite: Reverse<bool>,
    name: NameKey,
}

impl EntryKey {
    fn new(entry: &CatalogEntry) -> Self {
        Self {
            tier: Reverse(entry.subscription_status.tier()),
            favorite: Reverse(entry.is_favorite),
            name: NameKey::new(&entry.name),
        }
    }
}

/// Collation key of a trimmed name. Field order is comparison order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct NameKey {
    hangul: bool,
    primary: Vec<Unit>,
    /// Accent marks; left empty for Hangul names.
    secondary: Vec<u8>,
}

impl NameKey {
    pub fn new(name: &str) -> Self {
        let name = name.trim();
        let hangul = contains_hangul(name);
        let (primary, secondary) = collation_units(name, hangul);
        Self {
            hangul,
            primary,
            secondary: if hangul { Vec::new() } else { secondary },
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Unit {
    Other(char),
    /// Digit run without leading zeros, ordered by length then digits.
    Number(usize, String),
    Letter(u32),
}

/// True if the name has any Hangul syllable or jamo.
pub fn contains_hangul(s: &str) -> bool {
    s.chars().any(is_hangul)
}

fn is_hangul(c: char) -> bool {
    matches!(c,
        '\u{1100}'..='\u{11FF}'   // jamo
        | '\u{3131}'..='\u{3163}' // compatibility jamo
        | '\u{AC00}'..='\u{D7A3}' // syllables
    )
}

fn collation_units(name: &str, hangul_first: bool) -> (Vec<Unit>, Vec<u8>) {
    let folded: Vec<char> = name
        .chars()
        .map(fold_width)
        .flat_map(char::to_lowercase)
        .collect();

    let mut primary = Vec::with_capacity(folded.len());
    let mut secondary = Vec::new();
    let mut i = 0;
    while i < folded.len() {
        let c = folded[i];
        if c.is_ascii_digit() {
            let start = i;
            while i < folded.len() && folded[i].is_ascii_digit() {
                i += 1;
            }
            let digits: String = folded[start..i].iter().collect();
            let trimmed = digits.trim_start_matches('0');
            let value = if trimmed.is_empty() { "0" } else { trimmed };
            primary.push(Unit::Number(value.len(), value.to_string()));
            continue;
        }
        if c.is_alphabetic() {
            let (base, accent) = strip_accent(c);
            primary.push(Unit::Letter(letter_weight(base, hangul_first)));
            secondary.push(accent);
        } else {
            primary.push(Unit::Other(c));
        }
        i += 1;
    }
    (primary, secondary)
}

fn fold_width(c: char) -> char {
    match c {
        '\u{3000}' => ' ',
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        _ => c,
    }
}

// Above every code point, so Hangul trails other scripts in Latin names.
const HANGUL_BASE: u32 = 0x11_0000;
// Above every Hangul weight, so other scripts trail Hangul in Hangul names.
const OTHER_BASE: u32 = 20 * INITIAL_STRIDE;
const INITIAL_STRIDE: u32 = 1000;
const SYLLABLES_PER_INITIAL: u32 = 21 * 28;

/// Korean collation puts Hangul letters ahead of every other letter.
fn letter_weight(c: char, hangul_first: bool) -> u32 {
    match (hangul_weight(c), hangul_first) {
        (Some(weight), true) => weight,
        (Some(weight), false) => HANGUL_BASE + weight,
        (None, true) => OTHER_BASE + c as u32,
        (None, false) => c as u32,
    }
}

/// A bare consonant sorts right before the syllables it starts.
fn hangul_weight(c: char) -> Option<u32> {
    let code = c as u32;
    match c {
        '\u{AC00}'..='\u{D7A3}' => {
            let index = code - 0xAC00;
            let initial = index / SYLLABLES_PER_INITIAL;
            Some(initial * INITIAL_STRIDE + 1 + index % SYLLABLES_PER_INITIAL)
        }
        '\u{1100}'..='\u{1112}' => Some((code - 0x1100) * INITIAL_STRIDE),
        '\u{3131}'..='\u{3163}' => Some(match compat_initial(c) {
            Some(initial) => initial * INITIAL_STRIDE,
            None => 19 * INITIAL_STRIDE + (code - 0x3131),
        }),
        '\u{1113}'..='\u{11FF}' => Some(19 * INITIAL_STRIDE + 0x100 + (code - 0x1100)),
        _ => None,
    }
}

/// Index of a compatibility consonant among the 19 syllable initials.
fn compat_initial(c: char) -> Option<u32> {
    const INITIALS: [char; 19] = [
        'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ',
        'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
    ];
    INITIALS.iter().position(|&i| i == c).map(|p| p as u32)
}

/// Latin-1 letters with diacritics map to their base letter plus an accent rank.
fn strip_accent(c: char) -> (char, u8) {
    let base = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => return (c, 0),
    };
    // Rank within the Latin-1 block keeps distinct accents distinct.
    (base, (c as u32 - 0xBF) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SubscriptionStatus;
    use crate::store::memory::fixtures::{entry, favorite};

    fn named(name: &str, status: SubscriptionStatus, fav: bool) -> CatalogEntry {
        let mut e = entry(name, "General");
        e.subscription_status = status;
        e.is_favorite = fav;
        e
    }

    fn names(entries: &[CatalogEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn tier_then_favorite_then_name() {
        let a = named("Zebra", SubscriptionStatus::Free, false);
        let b = named("Apple", SubscriptionStatus::Paid, false);
        let c = named("가위", SubscriptionStatus::Free, true);
        let t = named("Mango", SubscriptionStatus::Trial, false);

        let arranged = arrange(vec![a, b, c, t], &EntryFilter::default());
        assert_eq!(names(&arranged), vec!["Apple", "Mango", "가위", "Zebra"]);
    }

    #[test]
    fn hangul_names_follow_latin_names_in_same_tier() {
        let d = named("apple", SubscriptionStatus::Free, false);
        let e = named("가나", SubscriptionStatus::Free, false);
        let arranged = arrange(vec![e, d], &EntryFilter::default());
        assert_eq!(names(&arranged), vec!["apple", "가나"]);
    }

    #[test]
    fn mixed_script_name_counts_as_hangul() {
        assert_eq!(compare_names("Zoom", "AI 비서"), Ordering::Less);
        assert!(contains_hangul("  ChatGPT 한국어 "));
        assert!(contains_hangul("ㅋㅋ"));
        assert!(!contains_hangul("Claude"));
    }

    #[test]
    fn numbers_compare_by_value() {
        assert_eq!(compare_names("item2", "item10"), Ordering::Less);
        assert_eq!(compare_names("v007", "v7"), Ordering::Equal);
        assert_eq!(compare_names("도구3", "도구20"), Ordering::Less);
    }

    #[test]
    fn latin_names_ignore_case_and_width() {
        assert_eq!(compare_names("apple", "APPLE"), Ordering::Equal);
        assert_eq!(compare_names("ＡＢＣ", "abc"), Ordering::Equal);
        assert_eq!(compare_names("banana", "Cherry"), Ordering::Less);
    }

    #[test]
    fn accents_only_break_ties() {
        assert_eq!(compare_names("école", "ecole"), Ordering::Greater);
        assert_eq!(compare_names("éclair", "ecole"), Ordering::Less);
    }

    #[test]
    fn punctuation_sorts_before_digits_and_letters() {
        assert_eq!(compare_names("_tool", "1tool"), Ordering::Less);
        assert_eq!(compare_names("1tool", "atool"), Ordering::Less);
    }

    #[test]
    fn hangul_orders_by_initial_then_syllable() {
        assert_eq!(compare_names("가", "나"), Ordering::Less);
        assert_eq!(compare_names("ㄱ", "가"), Ordering::Less);
        assert_eq!(compare_names("깋", "ㄲ"), Ordering::Less);
        assert_eq!(compare_names("하나", "가나다"), Ordering::Greater);
        assert_eq!(compare_names("가", "가나"), Ordering::Less);
    }

    #[test]
    fn hangul_group_puts_hangul_letters_before_latin() {
        assert_eq!(compare_names("AI 비서", "비서"), Ordering::Greater);
        assert_eq!(compare_names("ChatGPT 한국어", "뤼튼"), Ordering::Greater);
        assert_eq!(compare_names("1 가", "가 a"), Ordering::Less);
        assert_eq!(compare_names("ㄱ x", "a 가"), Ordering::Less);

        let names_in_order = ["_ 가", "1 가", "ㄱ", "가", "a 가", "x 가"];
        let mut shuffled = names_in_order.to_vec();
        shuffled.reverse();
        shuffled.sort_by(|a, b| compare_names(a, b));
        assert_eq!(shuffled, names_in_order);
    }

    #[test]
    fn hangul_group_keeps_mixed_names_after_latin_names() {
        let latin = named("Zoom", SubscriptionStatus::Free, false);
        let mixed = named("AI 비서", SubscriptionStatus::Free, false);
        let korean = named("비서", SubscriptionStatus::Free, false);

        let arranged = arrange(vec![mixed, latin, korean], &EntryFilter::default());
        assert_eq!(names(&arranged), vec!["Zoom", "비서", "AI 비서"]);
    }

    #[test]
    fn empty_name_sorts_first() {
        assert_eq!(compare_names("", "a"), Ordering::Less);
        assert_eq!(compare_names("   ", ""), Ordering::Equal);
        assert_eq!(compare_names("", "가"), Ordering::Less);
    }

    #[test]
    fn ties_keep_input_order() {
        let mut first = entry("Same", "x");
        first.id = "1".into();
        let mut second = entry("same", "x");
        second.id = "2".into();

        let arranged = arrange(vec![first, second], &EntryFilter::default());
        assert_eq!(arranged[0].id, "1");
        assert_eq!(arranged[1].id, "2");
    }

    #[test]
    fn arrange_is_idempotent() {
        let list = vec![
            named("b", SubscriptionStatus::Free, false),
            named("나", SubscriptionStatus::Trial, true),
            named("A10", SubscriptionStatus::Paid, false),
            named("a9", SubscriptionStatus::Paid, false),
            favorite(entry("c", "x")),
        ];
        let once = arrange(list, &EntryFilter::default());
        let twice = arrange(once.clone(), &EntryFilter::default());
        assert_eq!(once, twice);
        assert_eq!(names(&once), vec!["a9", "A10", "나", "c", "b"]);
    }

    #[test]
    fn category_filter_requires_membership() {
        let seo = entry("One", "SEO");
        let dev = entry("Two", "Dev");
        let arranged = arrange(vec![seo, dev], &EntryFilter::category("Dev"));
        assert_eq!(names(&arranged), vec!["Two"]);
    }

    #[test]
    fn search_covers_name_description_and_tags() {
        let mut tool = entry("Tool", "Dev");
        tool.tags = vec!["nlp".into()];
        let mut other = entry("Other", "Dev");
        other.description = "Image upscaler".into();

        assert!(EntryFilter::search("nlp").matches(&tool));
        assert!(EntryFilter::search("  UPSCALER ").matches(&other));
        assert!(!EntryFilter::search("nlp").matches(&other));
        // Matches may span the joining space.
        assert!(EntryFilter::search("other image").matches(&other));
    }

    #[test]
    fn filters_compose() {
        let mut a = entry("Writer", "Text");
        a.tags = vec!["ai".into()];
        let mut b = entry("Painter", "Image");
        b.tags = vec!["ai".into()];

        let filter = EntryFilter::new("ai", Some("Image"));
        let arranged = arrange(vec![a, b], &filter);
        assert_eq!(names(&arranged), vec!["Painter"]);
        assert!(!filter.is_empty());
        assert!(EntryFilter::new("  ", Some("")).is_empty());
    }

    #[test]
    fn entries_without_categories_only_pass_without_category_filter() {
        let mut bare = entry("Bare", "x");
        bare.categories.clear();
        assert!(EntryFilter::default().matches(&bare));
        assert!(!EntryFilter::category("x").matches(&bare));
    }
}
