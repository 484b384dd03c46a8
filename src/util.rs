// Utility helpers for string cleanup, year parsing and number formatting.
//
// The loader leans on these so the rest of the code can assume clean,
// typed values.
use chrono::Datelike;
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

/// Marker the UI uses for "no constraint on this dimension".
pub const ALL_MARKER: &str = "_all_";

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[1-9]\d{3}").unwrap());

/// Trim an optional field and drop it if nothing is left.
pub fn clean(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    Some(s.to_string())
}

/// First four-digit year embedded in a report identifier, e.g.
/// `"PCI/14/123/2019-20"` gives `2019`.
pub fn extract_year(report_id: Option<&str>) -> Option<i32> {
    let s = report_id?;
    YEAR_RE.find(s).and_then(|m| m.as_str().parse::<i32>().ok())
}

pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

/// Percentage of `part` in `total` with one decimal place.
///
/// Returns the display string together with the numeric value so callers
/// can sort on it. An empty total yields `"0"` instead of `NaN`.
pub fn format_pct(part: usize, total: usize) -> (String, f64) {
    if total == 0 {
        return ("0".to_string(), 0.0);
    }
    let pct = part as f64 / total as f64 * 100.0;
    (format!("{:.1}", pct), pct)
}

/// Split a comma-separated CLI/menu value into trimmed entries.
///
/// Blank input and the `_all_` marker both mean "everything".
pub fn parse_list(s: &str) -> Vec<String> {
    let items: Vec<String> = s
        .split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    if items.iter().any(|p| p == ALL_MARKER) {
        return Vec::new();
    }
    items
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in console messages
    // (e.g., `12,408 complaints loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_is_taken_from_first_four_digit_run() {
        assert_eq!(extract_year(Some("PCI/14/123/2019-20")), Some(2019));
        assert_eq!(extract_year(Some("14/455/13-14")), None);
        assert_eq!(extract_year(Some("")), None);
        assert_eq!(extract_year(None), None);
    }

    #[test]
    fn pct_guards_empty_total() {
        assert_eq!(format_pct(0, 0).0, "0");
        assert_eq!(format_pct(1, 3).0, "33.3");
        assert_eq!(format_pct(2, 2).0, "100.0");
    }

    #[test]
    fn list_parsing_treats_all_marker_as_empty() {
        assert_eq!(parse_list("Delhi, Kerala ,"), vec!["Delhi", "Kerala"]);
        assert!(parse_list("_all_").is_empty());
        assert!(parse_list("  ").is_empty());
    }

    #[test]
    fn clean_drops_blank_values() {
        assert_eq!(clean(Some("  x ")), Some("x".to_string()));
        assert_eq!(clean(Some("   ")), None);
    }
}
