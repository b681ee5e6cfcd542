//! Resolution ladder and severity grouping.
//!
//! Tiers run in order catalog -> heuristic -> generic; a tier only runs
//! when every tier before it produced no rule report.

use crate::catalog::{self, MatchMode};
use crate::fallback;
use crate::models::severity::severity_label;
use crate::models::{
    ExtractionStats, FiledReport, ReportMeta, ReportModel, RuleDefinition, RuleReport,
    RuleViolations, SeverityCount, Summary, Tier,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Run the ladder and return the tier that produced output with its reports.
pub fn resolve_ladder(
    catalog: &[RuleDefinition],
    violations: &RuleViolations,
    mode: MatchMode,
) -> (Tier, Vec<FiledReport>) {
    if violations.is_empty() {
        return (Tier::Empty, Vec::new());
    }
    let matched = catalog::resolve(catalog, violations, mode);
    if !matched.is_empty() {
        return (Tier::Catalog, matched);
    }
    warn!(
        rules = violations.rule_count(),
        "violations could not be matched to rule definitions; classifying by identifier"
    );
    let classified = fallback::classify(violations);
    if !classified.is_empty() {
        return (Tier::Heuristic, classified);
    }
    warn!("no identifier could be classified; grouping all violations into one rule");
    match fallback::generic_bucket(violations) {
        Some(bucket) => (Tier::Generic, vec![bucket]),
        None => (Tier::Empty, Vec::new()),
    }
}

/// Group filed reports by severity, keeping their relative order.
pub fn group(filed: Vec<FiledReport>) -> BTreeMap<i32, Vec<RuleReport>> {
    let mut groups: BTreeMap<i32, Vec<RuleReport>> = BTreeMap::new();
    for f in filed {
        if f.report.violations.is_empty() {
            continue;
        }
        groups.entry(f.severity).or_default().push(f.report);
    }
    groups
}

/// Build the final model from whichever tier produced output.
pub fn aggregate(
    tier: Tier,
    filed: Vec<FiledReport>,
    stats: ExtractionStats,
    meta: ReportMeta,
) -> ReportModel {
    let model = ReportModel {
        groups: group(filed),
        tier,
        stats,
        meta,
    };
    for c in summarize(&model).by_severity {
        info!(
            severity = c.label,
            rules = c.rules,
            violations = c.violations,
            "severity group"
        );
    }
    model
}

/// Derive summary counts from the model.
pub fn summarize(model: &ReportModel) -> Summary {
    let mut ids: BTreeSet<&str> = BTreeSet::new();
    let mut files: BTreeSet<&str> = BTreeSet::new();
    let mut by_severity = Vec::new();
    let mut total = 0usize;
    for (sev, reports) in &model.groups {
        let mut count = 0usize;
        for r in reports {
            ids.insert(r.id.as_str());
            count += r.violations.len();
            files.extend(r.violations.iter().map(|v| v.location.as_str()));
        }
        total += count;
        by_severity.push(SeverityCount {
            severity: *sev,
            label: severity_label(i64::from(*sev)),
            rules: reports.len(),
            violations: count,
        });
    }
    Summary {
        rules: ids.len(),
        violations: total,
        files: files.into_iter().map(str::to_string).collect(),
        tier: model.tier,
        dropped_records: model.stats.dropped(),
        by_severity,
    }
}

impl ReportModel {
    pub fn summary(&self) -> Summary {
        summarize(self)
    }

    /// Groups in ascending severity order.
    pub fn iter_groups(&self) -> impl Iterator<Item = (i32, &[RuleReport])> + '_ {
        self.groups.iter().map(|(s, r)| (*s, r.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Violation;

    fn v(rule: &str, line: u64, sev: Option<i32>) -> Violation {
        Violation {
            location: format!("{rule}.c"),
            line,
            message: String::new(),
            severity: sev,
            category: None,
            rule_id: rule.into(),
        }
    }

    fn def(id: &str, sev: i32) -> RuleDefinition {
        RuleDefinition {
            id: id.into(),
            description: "desc".into(),
            category: None,
            severity: sev,
        }
    }

    #[test]
    fn test_catalog_tier_stops_the_ladder() {
        let mut m = RuleViolations::new();
        m.push(v("R1", 10, None));
        m.push(v("R2", 3, Some(3)));
        let (tier, filed) = resolve_ladder(&[def("R1", 2)], &m, MatchMode::CaseSensitive);
        assert_eq!(tier, Tier::Catalog);
        assert_eq!(filed.len(), 1);
        assert_eq!(filed[0].report.id, "R1");
    }

    #[test]
    fn test_heuristic_tier_when_catalog_misses() {
        let mut m = RuleViolations::new();
        m.push(v("R2", 3, Some(3)));
        let (tier, filed) = resolve_ladder(&[def("R1", 2)], &m, MatchMode::CaseSensitive);
        assert_eq!(tier, Tier::Heuristic);
        assert_eq!(filed[0].severity, 3);
    }

    #[test]
    fn test_generic_tier_yields_exactly_one_report() {
        let mut m = RuleViolations::new();
        m.push(v("##", 3, None));
        m.push(v("%%", 4, None));
        let (tier, filed) = resolve_ladder(&[], &m, MatchMode::CaseSensitive);
        assert_eq!(tier, Tier::Generic);
        assert_eq!(filed.len(), 1);
        assert_eq!(filed[0].report.violations.len(), 2);
    }

    #[test]
    fn test_empty_extraction() {
        let (tier, filed) = resolve_ladder(&[def("R1", 2)], &RuleViolations::new(), MatchMode::CaseSensitive);
        assert_eq!(tier, Tier::Empty);
        assert!(filed.is_empty());
    }

    #[test]
    fn test_summary_counts_follow_groups() {
        let filed = vec![
            FiledReport {
                severity: 3,
                report: RuleReport {
                    id: "B".into(),
                    description: "d".into(),
                    category: None,
                    violations: vec![v("B", 1, None), v("B", 2, None)],
                },
            },
            FiledReport {
                severity: 0,
                report: RuleReport {
                    id: "A".into(),
                    description: "d".into(),
                    category: None,
                    violations: vec![v("A", 1, None)],
                },
            },
        ];
        let model = aggregate(Tier::Catalog, filed, ExtractionStats::default(), ReportMeta::default());
        let sevs: Vec<i32> = model.iter_groups().map(|(s, _)| s).collect();
        assert_eq!(sevs, vec![0, 3]);
        let s = model.summary();
        assert_eq!(s.rules, 2);
        assert_eq!(s.violations, 3);
        assert_eq!(s.files, vec!["A.c".to_string(), "B.c".to_string()]);
        assert_eq!(s.by_severity[1].label, "High");
        assert_eq!(s.by_severity[1].violations, 2);
    }
}
