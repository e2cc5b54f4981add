//! Honorific stripping and name normalization.

use std::sync::LazyLock;

use rapidfuzz::distance::jaro_winkler;
use regex::Regex;

/// Parenthetical deceased marker: `(alm)` or `(alm.)`.
static DECEASED_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(alm\.?\)").expect("Invalid deceased marker regex")
});

/// Leading title token: `Bpk.`, `Bu `, `Hj.` or `H.`, with trailing whitespace.
static LEADING_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:bpk\.|bu |hj\.|h\.)\s*").expect("Invalid leading title regex")
});

/// Strips honorifics and deceased markers and collapses whitespace, keeping case.
///
/// Repeats until nothing changes, so stacked titles (`"Bpk. H. Ahmad"`) and
/// markers revealed by an earlier removal are stripped too. The result is a
/// fixed point: `clean(clean(x)) == clean(x)`.
pub fn clean(raw: &str) -> String {
    let mut current = collapse_whitespace(raw);
    loop {
        let without_markers = collapse_whitespace(&DECEASED_MARKER.replace_all(&current, ""));
        let next = collapse_whitespace(&LEADING_TITLE.replace(&without_markers, ""));
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Lower-cased [`clean`]. The key used for normalized and containment matching.
///
/// ```
/// use silsilah_match::normalize;
///
/// assert_eq!(normalize("Bpk. Ahmad (alm)"), "ahmad");
/// assert_eq!(normalize("  Hj.  Siti   AMINAH "), "siti aminah");
/// assert_eq!(normalize(""), "");
/// ```
pub fn normalize(raw: &str) -> String {
    clean(&raw.to_lowercase())
}

/// Jaro-Winkler similarity of two normalized names, in `0.0..=1.0`.
pub fn similarity(left: &str, right: &str) -> f64 {
    jaro_winkler::similarity(normalize(left).chars(), normalize(right).chars())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_deceased_marker_any_case() {
        assert_eq!(clean("Ahmad (alm)"), "Ahmad");
        assert_eq!(clean("Ahmad (Alm.)"), "Ahmad");
        assert_eq!(clean("(ALM) Ahmad Susanto"), "Ahmad Susanto");
    }

    #[test]
    fn strips_leading_titles_only() {
        assert_eq!(clean("Bpk. Ahmad"), "Ahmad");
        assert_eq!(clean("Bu Siti"), "Siti");
        assert_eq!(clean("Hj.Siti"), "Siti");
        assert_eq!(clean("H. Mucksin"), "Mucksin");
        assert_eq!(clean("Bpk. H. Mucksin"), "Mucksin");
        // Not at the start, or not followed by the required separator.
        assert_eq!(clean("Ahmad Bpk."), "Ahmad Bpk.");
        assert_eq!(clean("Budi"), "Budi");
        assert_eq!(clean("Hadi"), "Hadi");
    }

    #[test]
    fn removal_that_reveals_a_marker_is_stripped_again() {
        assert_eq!(clean("Ahmad (al(alm)m)"), "Ahmad");
    }

    #[test]
    fn clean_preserves_case_and_normalize_lowers() {
        assert_eq!(clean("  Dewi   Rahayu "), "Dewi Rahayu");
        assert_eq!(normalize("  Dewi   Rahayu "), "dewi rahayu");
    }

    #[test]
    fn similarity_ignores_honorifics() {
        assert!((similarity("Bpk. Ahmad", "ahmad") - 1.0).abs() < f64::EPSILON);
        assert!(similarity("Ani", "Anisa") < 1.0);
    }
}
