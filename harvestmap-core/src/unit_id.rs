//! Wildlife management unit label normalization
//!
//! Boundary features are labelled `WMU15A`, `15B`, `11-A` and so on, while the
//! harvest tables often report only the parent unit. The parent id is the label
//! with its `WMU` prefix and one sub-unit letter suffix removed.
use regex::Regex;
use std::sync::OnceLock;

/// Id returned when a label is missing or normalizes to nothing.
pub const UNKNOWN_UNIT: &str = "Unknown";

const PARENT_PATTERNS: [&str; 3] = [r"(?i)^WMU", r"-[A-Z]$", r"[A-Z]$"];

fn parent_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        PARENT_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern).expect("valid unit suffix pattern"))
            .collect()
    })
}

fn prefix_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^WMU").expect("valid unit prefix pattern"))
}

/// Parent unit id used as the fallback lookup key.
///
/// `"WMU15A"` and `"15A"` both become `"15"`; missing or empty labels become
/// [`UNKNOWN_UNIT`].
#[must_use]
pub fn parent_unit_id(label: Option<&str>) -> String {
    let Some(label) = label.filter(|l| !l.is_empty()) else {
        return UNKNOWN_UNIT.to_string();
    };
    let normalized = parent_patterns()
        .iter()
        .fold(label.to_string(), |current, pattern| {
            pattern.replace(&current, "").into_owned()
        });
    if normalized.is_empty() {
        UNKNOWN_UNIT.to_string()
    } else {
        normalized
    }
}

/// Normalize free-text search input: trimmed and upper-cased.
#[must_use]
pub fn normalize_search(query: &str) -> String {
    query.trim().to_uppercase()
}

/// Whether a feature label matches an already normalized search query.
///
/// Matches `15A` against both `WMU15A` and `15A`; an empty query matches nothing.
#[must_use]
pub fn matches_search(label: &str, normalized_query: &str) -> bool {
    if normalized_query.is_empty() {
        return false;
    }
    let upper = label.to_uppercase();
    let stripped = prefix_pattern().replace(&upper, "");
    stripped == normalized_query || upper == format!("WMU{normalized_query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_prefix_and_letter_suffix() {
        assert_eq!(parent_unit_id(Some("WMU15A")), "15");
        assert_eq!(parent_unit_id(Some("15A")), "15");
        assert_eq!(parent_unit_id(Some("wmu42")), "42");
        assert_eq!(parent_unit_id(Some("11-B")), "11");
        assert_eq!(parent_unit_id(Some("65")), "65");
    }

    #[test]
    fn missing_labels_are_unknown() {
        assert_eq!(parent_unit_id(Some("")), UNKNOWN_UNIT);
        assert_eq!(parent_unit_id(None), UNKNOWN_UNIT);
        assert_eq!(parent_unit_id(Some("WMU")), UNKNOWN_UNIT);
        assert_eq!(parent_unit_id(Some("A")), UNKNOWN_UNIT);
    }

    #[test]
    fn only_one_suffix_letter_is_removed() {
        assert_eq!(parent_unit_id(Some("15AB")), "15A");
        assert_eq!(parent_unit_id(Some("15a")), "15a");
    }

    #[test]
    fn every_label_pattern_compiles() {
        assert_eq!(parent_patterns().len(), PARENT_PATTERNS.len());
        assert!(prefix_pattern().is_match("WMU15A"));
    }

    #[test]
    fn search_matches_with_or_without_prefix() {
        let query = normalize_search("  15a ");
        assert_eq!(query, "15A");
        assert!(matches_search("WMU15A", &query));
        assert!(matches_search("15A", &query));
        assert!(matches_search("wmu15a", &query));
        assert!(!matches_search("WMU15B", &query));
        assert!(!matches_search("WMU15A", ""));
    }
}
