use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// At most this many identifiers are kept per text.
pub const MAX_ENTITIES: usize = 5;

lazy_static! {
    static ref TICKER: Regex = Regex::new(r"\b([A-Z]{1,5})\b").expect("ticker pattern is valid");
    static ref DENYLIST: HashSet<&'static str> = [
        "A", "I", "CEO", "CFO", "US", "UK", "EU", "GDP", "IPO", "ETF", "SEC", "FDA", "AI",
    ]
    .into_iter()
    .collect();
}

/// Pulls candidate ticker symbols out of free text.
///
/// Matches runs of one to five capital letters on word boundaries, drops
/// common acronyms and single letters, and keeps the first five distinct
/// symbols in the order they appear.
pub fn extract(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    TICKER
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| token.len() >= 2 && !DENYLIST.contains(token))
        .filter(|token| seen.insert(*token))
        .take(MAX_ENTITIES)
        .map(str::to_string)
        .collect()
}
