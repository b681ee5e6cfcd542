//! Violation extraction across the report shapes.
//!
//! A report may carry several shapes at once; every shape whose container is
//! present is extracted and the results are unioned into one
//! `RuleViolations` map (modules first, then standard, then flow records).
//! Records without a rule key or with a negative/non-numeric line are
//! dropped and counted in the per-shape stats.

use crate::document::{children_named, first_child, XmlReport};
use crate::legacy;
use crate::models::severity::parse_severity;
use crate::models::{ExtractionStats, RuleViolations, Shape, ShapeStats, Violation, UNKNOWN_LOCATION};
use roxmltree::Node;
use tracing::{debug, info};

/// What the extractor is given to scan.
pub enum Source<'s, 'a, 'input> {
    Xml(&'s XmlReport<'a, 'input>),
    Legacy(&'s str),
}

#[derive(Debug, Default)]
pub struct Extraction {
    pub violations: RuleViolations,
    pub stats: ExtractionStats,
}

/// Key attribute of `<V>` records; it changed between report revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAttr {
    Id,
    Rid,
}

impl KeyAttr {
    fn name(&self) -> &'static str {
        match self {
            KeyAttr::Id => "id",
            KeyAttr::Rid => "rid",
        }
    }
}

/// Extract every violation the source carries.
pub fn extract(source: Source<'_, '_, '_>) -> Extraction {
    let mut out = Extraction::default();
    match source {
        Source::Xml(report) => {
            for shape in detect_shapes(report) {
                let stats = match shape {
                    Shape::Modules => match first_child(report.root, "Modules") {
                        Some(modules) => extract_modules(modules, &mut out.violations),
                        None => ShapeStats::new(shape),
                    },
                    Shape::StandardList => extract_flat(
                        standard_records(report),
                        shape,
                        &mut out.violations,
                    ),
                    Shape::FlowList => {
                        extract_flat(flow_records(report), shape, &mut out.violations)
                    }
                    Shape::LegacyText => ShapeStats::new(shape),
                };
                info!(
                    shape = shape.as_str(),
                    seen = stats.seen,
                    kept = stats.kept,
                    dropped = stats.dropped,
                    "extracted violations"
                );
                out.stats.shapes.push(stats);
            }
        }
        Source::Legacy(text) => {
            let stats = legacy::scan(text, &mut out.violations);
            info!(
                shape = stats.shape.as_str(),
                seen = stats.seen,
                kept = stats.kept,
                dropped = stats.dropped,
                "extracted violations"
            );
            out.stats.shapes.push(stats);
        }
    }
    out
}

/// Probe container tags to find which shapes are present.
pub fn detect_shapes(report: &XmlReport<'_, '_>) -> Vec<Shape> {
    let mut shapes = Vec::new();
    if first_child(report.root, "Modules").is_some() {
        shapes.push(Shape::Modules);
    }
    if let Some(list) = first_child(report.standards, "StdViols") {
        if first_child(list, "StdViol").is_some() {
            shapes.push(Shape::StandardList);
        }
    }
    if flow_records(report).next().is_some() {
        shapes.push(Shape::FlowList);
    }
    shapes
}

fn standard_records<'a, 'input>(
    report: &XmlReport<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    first_child(report.standards, "StdViols")
        .into_iter()
        .flat_map(|list| children_named(list, "StdViol"))
}

/// `FlowViol` records live under `StdViols` in some revisions and under their own `FlowViols` container in others.
fn flow_records<'a, 'input>(
    report: &XmlReport<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    let standards = report.standards;
    ["StdViols", "FlowViols"]
        .into_iter()
        .filter_map(move |container| first_child(standards, container))
        .flat_map(|c| children_named(c, "FlowViol"))
}

fn detect_key_attr(modules: Node<'_, '_>) -> KeyAttr {
    let any_rid = modules
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "V")
        .any(|n| n.attribute("rid").is_some());
    if any_rid {
        KeyAttr::Rid
    } else {
        KeyAttr::Id
    }
}

fn extract_modules(modules: Node<'_, '_>, out: &mut RuleViolations) -> ShapeStats {
    let key = detect_key_attr(modules);
    debug!(key_attr = key.name(), "module violation key attribute");
    let mut stats = ShapeStats::new(Shape::Modules);
    for module in children_named(modules, "Module") {
        for file in children_named(module, "File") {
            let path = file.attribute("path").unwrap_or(UNKNOWN_LOCATION);
            for viols in children_named(file, "Viols") {
                for v in children_named(viols, "V") {
                    let built = build_violation(RawRecord {
                        rule: v.attribute(key.name()),
                        line: v.attribute("line"),
                        location: Some(path),
                        message: v.attribute("msg"),
                        severity: v.attribute("sev"),
                        category: v.attribute("cat"),
                    });
                    keep(built, Shape::Modules, &mut stats, out);
                }
            }
        }
    }
    stats
}

fn extract_flat<'a, 'input: 'a>(
    records: impl Iterator<Item = Node<'a, 'input>>,
    shape: Shape,
    out: &mut RuleViolations,
) -> ShapeStats {
    let mut stats = ShapeStats::new(shape);
    for v in records {
        let built = build_violation(RawRecord {
            rule: v.attribute("rule"),
            line: v.attribute("ln"),
            location: v.attribute("locFile"),
            message: v.attribute("msg"),
            severity: v.attribute("sev"),
            category: v.attribute("cat"),
        });
        keep(built, shape, &mut stats, out);
    }
    stats
}

fn keep(built: Option<Violation>, shape: Shape, stats: &mut ShapeStats, out: &mut RuleViolations) {
    stats.record(built.is_some());
    if let Some(v) = built {
        debug!(
            shape = shape.as_str(),
            rule = %v.rule_id,
            line = v.line,
            sev = ?v.severity,
            "violation"
        );
        out.push(v);
    }
}

#[derive(Debug, Default, Clone, Copy)]
/// Attribute values of one candidate record, before validation.
pub struct RawRecord<'r> {
    pub rule: Option<&'r str>,
    pub line: Option<&'r str>,
    pub location: Option<&'r str>,
    pub message: Option<&'r str>,
    pub severity: Option<&'r str>,
    pub category: Option<&'r str>,
}

/// Validate a candidate record. `None` means the record is dropped.
pub fn build_violation(raw: RawRecord<'_>) -> Option<Violation> {
    let rule_id = raw.rule.map(str::trim).filter(|s| !s.is_empty())?;
    let line = parse_line(raw.line?)?;
    let location = raw
        .location
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_LOCATION);
    Some(Violation {
        location: location.to_string(),
        line,
        message: raw.message.unwrap_or_default().to_string(),
        severity: raw.severity.and_then(parse_severity),
        category: raw
            .category
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        rule_id: rule_id.to_string(),
    })
}

/// Line numbers are non-negative integers; anything else is rejected.
pub fn parse_line(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.starts_with('-') {
        return None;
    }
    raw.parse().ok()
}
