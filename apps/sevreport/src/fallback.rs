//! Fallback tiers used when no catalog rule matched any violation.

use crate::catalog::backfill;
use crate::models::severity::{is_valid, DEFAULT_SEVERITY};
use crate::models::{FiledReport, RuleReport, RuleViolations, Violation};
use tracing::debug;

pub const GENERIC_RULE_ID: &str = "GENERIC_RULE";
pub const GENERIC_RULE_DESC: &str = "All violations";

/// Identifier-heuristic tier: one report per classifiable rule identifier.
pub fn classify(violations: &RuleViolations) -> Vec<FiledReport> {
    let mut filed = Vec::new();
    for (id, list) in violations.iter() {
        if list.is_empty() {
            continue;
        }
        if !is_classifiable(id) {
            debug!(rule = %id, "identifier not classifiable");
            continue;
        }
        let severity = infer_severity(id, list);
        debug!(
            rule = %id,
            severity,
            violations = list.len(),
            "classified rule by heuristic"
        );
        filed.push(FiledReport {
            severity,
            report: RuleReport {
                id: id.to_string(),
                description: format!("Rule: {id}"),
                category: list.iter().find_map(|v| v.category.clone()),
                violations: backfill(list.to_vec(), severity),
            },
        });
    }
    filed
}

/// Last resort: everything in one report at severity Low, messages prefixed with the original rule id.
pub fn generic_bucket(violations: &RuleViolations) -> Option<FiledReport> {
    let collected: Vec<Violation> = violations
        .iter()
        .flat_map(|(id, list)| {
            list.iter().map(move |v| Violation {
                message: format!("Rule: {id} - {}", v.message),
                ..v.clone()
            })
        })
        .collect();
    if collected.is_empty() {
        return None;
    }
    Some(FiledReport {
        severity: DEFAULT_SEVERITY,
        report: RuleReport {
            id: GENERIC_RULE_ID.to_string(),
            description: GENERIC_RULE_DESC.to_string(),
            category: None,
            violations: backfill(collected, DEFAULT_SEVERITY),
        },
    })
}

/// First valid per-violation severity, else the identifier suffix, else Low.
pub fn infer_severity(id: &str, violations: &[Violation]) -> i32 {
    violations
        .iter()
        .find_map(|v| v.severity.filter(|s| is_valid(i64::from(*s))))
        .or_else(|| severity_from_identifier(id))
        .unwrap_or(DEFAULT_SEVERITY)
}

/// Numeric token after the last `-` or `_`, when it is a severity in `[0,4]`.
pub fn severity_from_identifier(id: &str) -> Option<i32> {
    let (_, token) = id.rsplit_once(['-', '_'])?;
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let sev: i64 = token.parse().ok()?;
    if is_valid(sev) {
        i32::try_from(sev).ok()
    } else {
        None
    }
}

/// An identifier needs at least one ASCII alphanumeric character to be classified.
pub fn is_classifiable(id: &str) -> bool {
    id.chars().any(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(rule: &str, line: u64, sev: Option<i32>, msg: &str) -> Violation {
        Violation {
            location: "a.c".into(),
            line,
            message: msg.into(),
            severity: sev,
            category: None,
            rule_id: rule.into(),
        }
    }

    #[test]
    fn test_severity_from_identifier() {
        assert_eq!(severity_from_identifier("CERT_C-EXP30-a-2"), Some(2));
        assert_eq!(severity_from_identifier("MISRA_4"), Some(4));
        assert_eq!(severity_from_identifier("MISRA-023"), None);
        assert_eq!(severity_from_identifier("BD-PB-NP"), None);
        assert_eq!(severity_from_identifier("R2"), None);
        assert_eq!(severity_from_identifier("R-"), None);
        assert_eq!(severity_from_identifier("MISRA2012-RULE-8_4"), Some(4));
        assert_eq!(severity_from_identifier("X-3a"), None);
    }

    #[test]
    fn test_infer_prefers_violation_severity() {
        let list = vec![v("X-4", 1, None, ""), v("X-4", 2, Some(3), "")];
        assert_eq!(infer_severity("X-4", &list), 3);
        let list = vec![v("X-4", 1, None, "")];
        assert_eq!(infer_severity("X-4", &list), 4);
        let list = vec![v("X-9", 1, None, "")];
        assert_eq!(infer_severity("X-9", &list), DEFAULT_SEVERITY);
    }

    #[test]
    fn test_classify_builds_one_report_per_identifier() {
        let mut m = RuleViolations::new();
        m.push(v("R2", 1, Some(3), "a"));
        m.push(v("CODSTA-1", 2, None, "b"));
        m.push(v("R2", 3, None, "c"));
        let filed = classify(&m);
        assert_eq!(filed.len(), 2);
        assert_eq!(filed[0].report.id, "R2");
        assert_eq!(filed[0].severity, 3);
        assert_eq!(filed[0].report.description, "Rule: R2");
        assert_eq!(filed[0].report.violations[1].severity, Some(3));
        assert_eq!(filed[1].severity, 1);
    }

    #[test]
    fn test_classify_skips_unclassifiable_ids() {
        let mut m = RuleViolations::new();
        m.push(v("--", 1, None, "x"));
        assert!(classify(&m).is_empty());
    }

    #[test]
    fn test_generic_bucket_prefixes_messages() {
        let mut m = RuleViolations::new();
        m.push(v("--", 1, None, "x"));
        m.push(v("??", 2, Some(4), "y"));
        let filed = generic_bucket(&m).unwrap();
        assert_eq!(filed.severity, 1);
        assert_eq!(filed.report.id, GENERIC_RULE_ID);
        assert_eq!(filed.report.violations.len(), 2);
        assert_eq!(filed.report.violations[0].message, "Rule: -- - x");
        assert_eq!(filed.report.violations[1].severity, Some(4));
    }

    #[test]
    fn test_generic_bucket_empty() {
        assert!(generic_bucket(&RuleViolations::new()).is_none());
    }
}
