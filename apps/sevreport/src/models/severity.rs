//! Severity codes (0 = Lowest .. 4 = Highest) and their display labels.

use std::ops::RangeInclusive;

/// Valid severity codes.
pub const SEVERITY_RANGE: RangeInclusive<i32> = 0..=4;

/// Severity used when nothing better is known.
pub const DEFAULT_SEVERITY: i32 = 1;

/// Every label `severity_label` can return.
pub const LABELS: [&str; 6] = ["Lowest", "Low", "Medium", "High", "Highest", "Unknown"];

/// Map a severity code to its display label; any code outside `[0,4]` is `Unknown`.
pub fn severity_label(sev: i64) -> &'static str {
    match sev {
        0 => "Lowest",
        1 => "Low",
        2 => "Medium",
        3 => "High",
        4 => "Highest",
        _ => "Unknown",
    }
}

pub fn is_valid(sev: i64) -> bool {
    i32::try_from(sev).is_ok_and(|s| SEVERITY_RANGE.contains(&s))
}

/// Parse a severity attribute. Returns `None` for anything that is not an
/// integer in `[0,4]` (`-1` is the "not yet known" marker in reports).
pub fn parse_severity(raw: &str) -> Option<i32> {
    let sev: i64 = raw.trim().parse().ok()?;
    if is_valid(sev) {
        i32::try_from(sev).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_for_known_codes() {
        assert_eq!(severity_label(0), "Lowest");
        assert_eq!(severity_label(1), "Low");
        assert_eq!(severity_label(2), "Medium");
        assert_eq!(severity_label(3), "High");
        assert_eq!(severity_label(4), "Highest");
    }

    #[test]
    fn test_label_is_total() {
        for sev in [-1, 5, 42, i64::MIN, i64::MAX] {
            assert_eq!(severity_label(sev), "Unknown");
        }
        for sev in -10..10 {
            assert!(LABELS.contains(&severity_label(sev)));
        }
    }

    #[test]
    fn test_parse_severity_rejects_out_of_range() {
        assert_eq!(parse_severity("3"), Some(3));
        assert_eq!(parse_severity(" 0 "), Some(0));
        assert_eq!(parse_severity("-1"), None);
        assert_eq!(parse_severity("5"), None);
        assert_eq!(parse_severity("high"), None);
        assert_eq!(parse_severity(""), None);
    }
}
