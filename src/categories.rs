use crate::quote::Quote;
use std::collections::BTreeMap;

/// Synthetic option meaning "no filtering".
pub const ALL_CATEGORIES: &str = "all";

/// The persisted category selection. A named filter may reference a category
/// that no longer exists, in which case the filtered view is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_CATEGORIES) {
            Self::All
        } else {
            Self::Named(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Named(name) => name,
        }
    }

    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => quote.category == *name,
        }
    }
}

/// Distinct categories, sorted, with the leading `all` option.
pub fn category_options(quotes: &[Quote]) -> Vec<String> {
    let mut options = vec![ALL_CATEGORIES.to_string()];
    options.extend(category_counts(quotes).into_keys());
    options
}

/// Count quotes per category, keyed in sorted order.
pub fn category_counts(quotes: &[Quote]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for q in quotes {
        *counts.entry(q.category.clone()).or_insert(0) += 1;
    }
    counts
}

/// Hash a category for deterministic color selection
pub fn hash_category(category: &str) -> u64 {
    let mut h: u64 = 5381;
    for b in category.bytes() {
        h = (h.wrapping_shl(5)).wrapping_add(h) ^ u64::from(b);
    }
    h
}

pub fn color_for_category(category: &str) -> (u8, u8, u8) {
    const PALETTE: &[(u8, u8, u8)] = &[
        (137, 180, 250),
        (166, 227, 161),
        (249, 226, 175),
        (245, 194, 231),
        (255, 169, 167),
        (148, 226, 213),
        (198, 160, 246),
        (240, 198, 198),
        (181, 232, 224),
        (255, 214, 165),
        (196, 181, 255),
        (186, 225, 255),
    ];
    let h = hash_category(category);
    PALETTE[(h as usize) % PALETTE.len()]
}
