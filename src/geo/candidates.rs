//! Geocoding query candidates
//!
//! Free-text addresses vary a lot in how much context they carry, and
//! geocoder hit rates drop sharply without it. One raw address is expanded
//! into an ordered ladder of queries, most likely to succeed first:
//!
//! 1. normalized form, then normalized form + anchor (only if normalization changed anything)
//! 2. raw address
//! 3. raw address without its leading house number
//! 4. raw and stripped forms + anchor (only if the raw address does not name the anchor region)

use crate::config::GeocodingConfig;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Leading house/alley number such as "123", "123/4" or "45/2-3A"
fn house_number() -> &'static Regex {
    static HOUSE_NUMBER: OnceLock<Regex> = OnceLock::new();
    HOUSE_NUMBER.get_or_init(|| Regex::new(r"^\d+[/\w-]*\s").expect("house number pattern is valid"))
}

/// Builds query ladders against a fixed anchor region
#[derive(Debug, Clone)]
pub struct QueryCandidateBuilder {
    anchor_region: String,
    anchor_aliases: Vec<String>,
}

impl QueryCandidateBuilder {
    /// Create a builder
    ///
    /// `anchor_aliases` are matched case-insensitively as substrings.
    pub fn new(anchor_region: impl Into<String>, anchor_aliases: &[String]) -> Self {
        Self {
            anchor_region: anchor_region.into().trim().to_string(),
            anchor_aliases: anchor_aliases
                .iter()
                .map(|alias| alias.trim().to_lowercase())
                .filter(|alias| !alias.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &GeocodingConfig) -> Self {
        Self::new(config.anchor_region.clone(), &config.anchor_aliases)
    }

    /// Whether the address already places itself in the anchor region
    pub fn mentions_anchor(&self, address: &str) -> bool {
        let lower = address.to_lowercase();
        self.anchor_aliases.iter().any(|alias| lower.contains(alias.as_str()))
    }

    /// Build the ordered, deduplicated query list for one address
    pub fn build(&self, raw: &str, normalized: &str) -> Vec<String> {
        let mut ladder = Ladder::default();
        let stripped = strip_house_number(raw);
        let stripped = (stripped.trim() != raw.trim()).then_some(stripped);

        if normalized != raw {
            ladder.push(normalized);
            ladder.push(&self.anchored(normalized));
        }

        ladder.push(raw);
        if let Some(stripped) = stripped {
            ladder.push(stripped);
        }

        if !self.mentions_anchor(raw) {
            ladder.push(&self.anchored(raw));
            if let Some(stripped) = stripped {
                ladder.push(&self.anchored(stripped));
            }
        }

        ladder.into_queries()
    }

    fn anchored(&self, query: &str) -> String {
        let query = query.trim();
        if self.anchor_region.is_empty() || query.is_empty() {
            return query.to_string();
        }
        format!("{}, {}", query, self.anchor_region)
    }
}

impl Default for QueryCandidateBuilder {
    fn default() -> Self {
        Self::from_config(&GeocodingConfig::default())
    }
}

/// Drop a leading house number, e.g. "123/4 Lê Lợi" -> "Lê Lợi"
pub fn strip_house_number(raw: &str) -> &str {
    match house_number().find(raw) {
        Some(m) => raw[m.end()..].trim(),
        None => raw,
    }
}

/// Insertion-ordered set of trimmed, non-empty queries
#[derive(Debug, Default)]
struct Ladder {
    seen: HashSet<String>,
    queries: Vec<String>,
}

impl Ladder {
    fn push(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() || self.seen.contains(query) {
            return;
        }
        self.seen.insert(query.to_string());
        self.queries.push(query.to_string());
    }

    fn into_queries(self) -> Vec<String> {
        self.queries
    }
}
