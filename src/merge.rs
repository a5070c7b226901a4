// src/merge.rs

use crate::domain::ListingRecord;
use std::collections::HashSet;
use tracing::info;

// Street suffixes, directions and unit designators folded onto one spelling.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("street", "st"),
    ("avenue", "ave"),
    ("av", "ave"),
    ("road", "rd"),
    ("drive", "dr"),
    ("boulevard", "blvd"),
    ("lane", "ln"),
    ("court", "ct"),
    ("place", "pl"),
    ("terrace", "ter"),
    ("circle", "cir"),
    ("parkway", "pkwy"),
    ("highway", "hwy"),
    ("square", "sq"),
    ("trail", "trl"),
    ("way", "wy"),
    ("north", "n"),
    ("south", "s"),
    ("east", "e"),
    ("west", "w"),
    ("northeast", "ne"),
    ("northwest", "nw"),
    ("southeast", "se"),
    ("southwest", "sw"),
    ("apartment", "unit"),
    ("apt", "unit"),
    ("suite", "unit"),
    ("ste", "unit"),
];

/// Comparison key for an address: case-folded, punctuation-free, abbreviated.
///
/// "12 Oak Avenue, Apt. #4" and "12 oak ave unit 4" share a key.
pub fn address_key(address: &str) -> String {
    let spaced: String = address
        .chars()
        .flat_map(|c| match c {
            '#' => " unit ".chars().collect::<Vec<_>>(),
            c if c.is_alphanumeric() => c.to_lowercase().collect(),
            _ => vec![' '],
        })
        .collect();

    let mut words: Vec<&str> = Vec::new();
    for word in spaced.split_whitespace() {
        let word = ABBREVIATIONS
            .iter()
            .find(|(long, _)| *long == word)
            .map(|(_, short)| *short)
            .unwrap_or(word);

        // "apt #4" folds to "unit unit 4"
        if word == "unit" && words.last() == Some(&"unit") {
            continue;
        }
        words.push(word);
    }

    words.join(" ")
}

/// When two listings count as the same property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMatch {
    /// Identical address strings only.
    #[default]
    Exact,
    /// Identical [`address_key`]s.
    Normalized,
}

impl AddressMatch {
    fn key(self, address: &str) -> String {
        match self {
            AddressMatch::Exact => address.to_string(),
            AddressMatch::Normalized => address_key(address),
        }
    }
}

/// Unions two sources' records, `primary` first, keeping the first record seen per address.
///
/// A later duplicate is discarded even when it is more complete.
pub fn merge(
    primary: Vec<ListingRecord>,
    secondary: Vec<ListingRecord>,
    matching: AddressMatch,
) -> Vec<ListingRecord> {
    let total = primary.len() + secondary.len();
    let mut seen = HashSet::with_capacity(total);
    let mut merged = Vec::with_capacity(total);

    for record in primary.into_iter().chain(secondary) {
        if seen.insert(matching.key(&record.address)) {
            merged.push(record);
        }
    }

    info!(
        ?matching,
        input = total,
        kept = merged.len(),
        duplicates = total - merged.len(),
        "merged sources"
    );

    merged
}
