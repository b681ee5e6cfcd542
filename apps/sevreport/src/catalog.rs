//! Rule catalog reading and the catalog-matched resolution tier.

use crate::document::{children_named, first_child, XmlReport};
use crate::models::severity::parse_severity;
use crate::models::{FiledReport, RuleDefinition, RuleReport, RuleViolations, Violation};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
/// How violation keys are compared with catalog ids.
pub enum MatchMode {
    #[default]
    CaseSensitive,
    /// Both sides are lowercased before comparison.
    CaseInsensitive,
}

impl MatchMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "case-sensitive" | "sensitive" | "exact" => Some(MatchMode::CaseSensitive),
            "case-insensitive" | "insensitive" => Some(MatchMode::CaseInsensitive),
            _ => None,
        }
    }

    fn key(&self, id: &str) -> String {
        match self {
            MatchMode::CaseSensitive => id.to_string(),
            MatchMode::CaseInsensitive => id.to_lowercase(),
        }
    }
}

/// Read `CodingStandards/Rules/RulesList/Rule`. A missing list is an empty catalog.
///
/// Definitions lacking an id, a description, or a severity in `[0,4]` are skipped.
pub fn read_catalog(report: &XmlReport<'_, '_>) -> Vec<RuleDefinition> {
    let Some(list) = first_child(report.standards, "Rules")
        .and_then(|rules| first_child(rules, "RulesList"))
    else {
        info!("no <RulesList> in report; catalog is empty");
        return Vec::new();
    };
    let mut defs = Vec::new();
    let mut skipped = 0usize;
    for rule in children_named(list, "Rule") {
        let id = rule.attribute("id").map(str::trim).filter(|s| !s.is_empty());
        let desc = rule.attribute("desc");
        let sev = rule.attribute("sev").and_then(parse_severity);
        match (id, desc, sev) {
            (Some(id), Some(desc), Some(severity)) => defs.push(RuleDefinition {
                id: id.to_string(),
                description: desc.to_string(),
                category: rule
                    .attribute("cat")
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
                severity,
            }),
            _ => skipped += 1,
        }
    }
    info!(rules = defs.len(), skipped, "read rule catalog");
    defs
}

/// Join catalog definitions with extracted violations.
///
/// Output follows catalog order; rules without violations are omitted and a
/// repeated catalog id is only filed once.
pub fn resolve(
    catalog: &[RuleDefinition],
    violations: &RuleViolations,
    mode: MatchMode,
) -> Vec<FiledReport> {
    let index = KeyIndex::build(violations, mode);
    let mut filed = Vec::new();
    let mut done: HashSet<String> = HashSet::new();
    for def in catalog {
        let key = mode.key(&def.id);
        if done.contains(&key) {
            debug!(rule = %def.id, "duplicate catalog entry ignored");
            continue;
        }
        let matched = index.lookup(&key, violations);
        if matched.is_empty() {
            debug!(rule = %def.id, "rule has no matching violations");
            continue;
        }
        done.insert(key);
        let violations = backfill(matched, def.severity);
        debug!(
            rule = %def.id,
            severity = def.severity,
            violations = violations.len(),
            "matched rule"
        );
        filed.push(FiledReport {
            severity: def.severity,
            report: RuleReport {
                id: def.id.clone(),
                description: def.description.clone(),
                category: def.category.clone(),
                violations,
            },
        });
    }
    info!(
        catalog = catalog.len(),
        matched = filed.len(),
        "resolved catalog rules"
    );
    filed
}

/// Violations without their own severity inherit `severity`.
pub fn backfill(violations: Vec<Violation>, severity: i32) -> Vec<Violation> {
    violations
        .into_iter()
        .map(|mut v| {
            v.severity.get_or_insert(severity);
            v
        })
        .collect()
}

/// Maps a comparison key to the extracted rule ids that produce it, in first-seen order.
struct KeyIndex<'v> {
    keys: HashMap<String, Vec<&'v str>>,
}

impl<'v> KeyIndex<'v> {
    fn build(violations: &'v RuleViolations, mode: MatchMode) -> Self {
        let mut keys: HashMap<String, Vec<&'v str>> = HashMap::new();
        for id in violations.rule_ids() {
            keys.entry(mode.key(id)).or_default().push(id);
        }
        Self { keys }
    }

    fn lookup(&self, key: &str, violations: &RuleViolations) -> Vec<Violation> {
        self.keys
            .get(key)
            .into_iter()
            .flatten()
            .filter_map(|id| violations.get(id))
            .flat_map(|list| list.iter().cloned())
            .collect()
    }
}
