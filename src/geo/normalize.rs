//! Vietnamese address normalization
//!
//! Rewrites shorthand that geocoders handle poorly:
//! institution abbreviations ("dh bk") become full names, and
//! administrative units ("quận 5", "p. 3") become their English forms
//! ("District 5", "Ward 3"). Matching is case-insensitive and respects
//! word boundaries; anything that does not match passes through untouched.

use crate::config::GeocodingConfig;
use regex::{NoExpand, Regex};
use std::sync::OnceLock;
use tracing::warn;

/// Administrative-unit rewrites, applied after abbreviation expansion
fn unit_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (r"(?i)\bquận\s+(\d+)\b", "District ${1}"),
            (r"(?i)\bq\.\s*(\d+)\b", "District ${1}"),
            (r"(?i)\bphường\s+(\d+)\b", "Ward ${1}"),
            (r"(?i)\bp\.\s*(\d+)\b", "Ward ${1}"),
        ]
        .into_iter()
        .map(|(pattern, replacement)| {
            (Regex::new(pattern).expect("unit pattern is valid"), replacement)
        })
        .collect()
    })
}

/// A compiled abbreviation rule
#[derive(Debug, Clone)]
struct Expansion {
    pattern: Regex,
    replacement: String,
}

/// Table-driven address normalizer
#[derive(Debug, Clone)]
pub struct AddressNormalizer {
    expansions: Vec<Expansion>,
}

impl AddressNormalizer {
    /// Build a normalizer from (abbreviation, expansion) pairs
    ///
    /// Longer abbreviations are tried first. Whitespace inside an
    /// abbreviation matches any run of whitespace in the input.
    pub fn new<I, K, V>(table: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut entries: Vec<(String, String)> = table
            .into_iter()
            .map(|(abbr, full)| (abbr.as_ref().trim().to_lowercase(), full.into()))
            .filter(|(abbr, _)| !abbr.is_empty())
            .collect();
        entries.sort_by(|a, b| {
            b.0.chars()
                .count()
                .cmp(&a.0.chars().count())
                .then_with(|| a.0.cmp(&b.0))
        });
        entries.dedup_by(|a, b| a.0 == b.0);

        let expansions = entries
            .into_iter()
            .filter_map(|(abbr, replacement)| {
                let body = abbr
                    .split_whitespace()
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(r"\s+");
                match Regex::new(&format!(r"(?i)\b{}\b", body)) {
                    Ok(pattern) => Some(Expansion {
                        pattern,
                        replacement,
                    }),
                    Err(e) => {
                        warn!("Skipping abbreviation {:?}: {}", abbr, e);
                        None
                    }
                }
            })
            .collect();

        Self { expansions }
    }

    /// Build a normalizer from the configured abbreviation table
    pub fn from_config(config: &GeocodingConfig) -> Self {
        Self::new(
            config
                .abbreviations
                .iter()
                .map(|(abbr, full)| (abbr.as_str(), full.clone())),
        )
    }

    /// Number of abbreviation rules
    pub fn len(&self) -> usize {
        self.expansions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expansions.is_empty()
    }

    /// Normalize one address
    pub fn normalize(&self, raw: &str) -> String {
        let mut result = raw.to_string();

        for expansion in &self.expansions {
            if expansion.pattern.is_match(&result) {
                result = expansion
                    .pattern
                    .replace_all(&result, NoExpand(&expansion.replacement))
                    .into_owned();
            }
        }

        for (pattern, replacement) in unit_rules() {
            if pattern.is_match(&result) {
                result = pattern.replace_all(&result, *replacement).into_owned();
            }
        }

        result
    }
}

impl Default for AddressNormalizer {
    fn default() -> Self {
        Self::from_config(&GeocodingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> String {
        AddressNormalizer::default().normalize(raw)
    }

    #[test]
    fn test_district_rewrite() {
        assert_eq!(normalize("quận 7"), "District 7");
        assert!(normalize("Phú Mỹ Hưng, Quận 7, TP.HCM").contains("District 7"));
        assert!(normalize("QUẬN 7").contains("District 7"));
    }

    #[test]
    fn test_multi_digit_units_stay_whole() {
        assert_eq!(normalize("quận 70"), "District 70");
        assert_eq!(normalize("quận 10"), "District 10");
        assert_eq!(normalize("q.10"), "District 10");
        assert!(!normalize("quận 70").contains("District 7 "));
    }

    #[test]
    fn test_short_forms() {
        assert_eq!(normalize("p. 5, q. 3"), "Ward 5, District 3");
        assert_eq!(normalize("Phường 12, Quận Gò Vấp"), "Ward 12, Quận Gò Vấp");
    }

    #[test]
    fn test_unit_needs_word_boundary() {
        // "tp." is not "p." and "7a" is not a bare number
        assert_eq!(normalize("tp.5"), "tp.5");
        assert_eq!(normalize("quận 7a"), "quận 7a");
    }

    #[test]
    fn test_abbreviation_expansion() {
        assert_eq!(normalize("dh bk"), "Đại học Bách Khoa");
        assert_eq!(normalize("Cổng ĐH BK, quận 10"), "Cổng Đại học Bách Khoa, District 10");
        assert_eq!(normalize("đh  khtn"), "Đại học Khoa học Tự nhiên");
    }

    #[test]
    fn test_abbreviation_needs_whole_word() {
        assert_eq!(normalize("adh bkx"), "adh bkx");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        for raw in [
            "dh bk, quận 10",
            "Đại học Bách Khoa, District 10",
            "đh spkt, p. 4",
            "227 Nguyễn Văn Cừ, Quận 5",
        ] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_unmatched_text_is_unchanged() {
        for raw in ["", "   ", "123/4 Lê Lợi", "Bitexco Tower", "!!"] {
            assert_eq!(normalize(raw), raw);
        }
    }

    #[test]
    fn test_custom_table() {
        let normalizer = AddressNormalizer::new([("dh kt", "Đại học Kinh tế"), ("  ", "ignored")]);
        assert_eq!(normalizer.len(), 1);
        assert_eq!(normalizer.normalize("DH KT quận 3"), "Đại học Kinh tế District 3");
    }

    #[test]
    fn test_longest_abbreviation_wins() {
        let normalizer = AddressNormalizer::new([
            ("dh", "Đại học"),
            ("dh bk", "Đại học Bách Khoa"),
        ]);
        assert_eq!(normalizer.normalize("dh bk"), "Đại học Bách Khoa");
    }
}
