//! Shared data models: violations, rule definitions, and the grouped report.

pub mod severity;

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Placeholder used when a record carries no file path.
pub const UNKNOWN_LOCATION: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One observed defect instance.
pub struct Violation {
    pub location: String,
    pub line: u64,
    pub message: String,
    /// Own severity when the record carried a valid one; back-filled from the rule otherwise.
    pub severity: Option<i32>,
    pub category: Option<String>,
    pub rule_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Catalog metadata for a rule.
pub struct RuleDefinition {
    pub id: String,
    pub description: String,
    pub category: Option<String>,
    pub severity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A rule joined with all of its observed violations.
pub struct RuleReport {
    pub id: String,
    pub description: String,
    pub category: Option<String>,
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A rule report together with the severity it is filed under.
pub struct FiledReport {
    pub severity: i32,
    pub report: RuleReport,
}

#[derive(Debug, Default, Clone)]
/// Violations keyed by rule identifier, iterated in first-seen order.
pub struct RuleViolations {
    order: Vec<String>,
    by_rule: HashMap<String, Vec<Violation>>,
}

impl RuleViolations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, v: Violation) {
        if let Some(list) = self.by_rule.get_mut(&v.rule_id) {
            list.push(v);
            return;
        }
        self.order.push(v.rule_id.clone());
        self.by_rule.insert(v.rule_id.clone(), vec![v]);
    }

    pub fn get(&self, rule_id: &str) -> Option<&[Violation]> {
        self.by_rule.get(rule_id).map(Vec::as_slice)
    }

    /// Iterate `(rule_id, violations)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Violation])> + '_ {
        self.order.iter().filter_map(move |id| {
            self.by_rule
                .get(id)
                .map(|list| (id.as_str(), list.as_slice()))
        })
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn rule_count(&self) -> usize {
        self.order.len()
    }

    pub fn violation_count(&self) -> usize {
        self.by_rule.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
/// Source shapes the extractor understands.
pub enum Shape {
    /// `Modules/Module/File/Viols/V`
    Modules,
    /// `CodingStandards/StdViols/StdViol`
    StandardList,
    /// `FlowViol` records
    FlowList,
    /// Loosely tagged text or HTML, scanned line by line
    LegacyText,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Modules => "modules",
            Shape::StandardList => "standard-list",
            Shape::FlowList => "flow-list",
            Shape::LegacyText => "legacy-text",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Record accounting for one extracted shape.
pub struct ShapeStats {
    pub shape: Shape,
    pub seen: usize,
    pub kept: usize,
    pub dropped: usize,
}

impl ShapeStats {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            seen: 0,
            kept: 0,
            dropped: 0,
        }
    }

    /// Count one candidate record; `kept` decides which bucket it lands in.
    pub fn record(&mut self, kept: bool) {
        self.seen += 1;
        if kept {
            self.kept += 1;
        } else {
            self.dropped += 1;
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionStats {
    pub shapes: Vec<ShapeStats>,
}

impl ExtractionStats {
    pub fn seen(&self) -> usize {
        self.shapes.iter().map(|s| s.seen).sum()
    }

    pub fn kept(&self) -> usize {
        self.shapes.iter().map(|s| s.kept).sum()
    }

    pub fn dropped(&self) -> usize {
        self.shapes.iter().map(|s| s.dropped).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
/// Which rung of the resolution ladder produced the model.
pub enum Tier {
    Catalog,
    Heuristic,
    Generic,
    /// Nothing was extracted; a valid, empty report.
    Empty,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Catalog => "catalog",
            Tier::Heuristic => "heuristic",
            Tier::Generic => "generic",
            Tier::Empty => "empty",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
/// Header information about the analysed report.
pub struct ReportMeta {
    pub source: String,
    pub tool: Option<String>,
    pub tool_version: Option<String>,
    pub project: Option<String>,
    pub session_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// The normalized model handed to rendering: severity -> rule reports.
pub struct ReportModel {
    pub groups: BTreeMap<i32, Vec<RuleReport>>,
    pub tier: Tier,
    pub stats: ExtractionStats,
    pub meta: ReportMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeverityCount {
    pub severity: i32,
    pub label: &'static str,
    pub rules: usize,
    pub violations: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Counts derived from a `ReportModel`; never stored alongside it.
pub struct Summary {
    pub rules: usize,
    pub violations: usize,
    pub files: Vec<String>,
    pub tier: Tier,
    pub dropped_records: usize,
    pub by_severity: Vec<SeverityCount>,
}
