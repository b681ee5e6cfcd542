//! Best-effort scanner for legacy text/HTML reports.
//!
//! Each line is tried against a small table of marker rules. A rule names
//! the open/close substrings that bound each field; fields are located one
//! after another along the line. The scanner may under-extract but never
//! fails: a line that matches no rule, or whose line token is not a
//! non-negative integer, is skipped and counted as dropped.

use crate::extract::{build_violation, RawRecord};
use crate::models::{RuleViolations, Shape, ShapeStats};
use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
/// Substrings bounding one field. An empty `open` starts at the cursor.
pub struct Bounds {
    pub open: &'static str,
    pub close: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct MarkerRule {
    pub name: &'static str,
    /// Optional; when its `open` marker is absent the location is unknown.
    pub file: Option<Bounds>,
    pub line: Bounds,
    pub message: Bounds,
    pub rule: Bounds,
}

/// Built-in marker rules, tried in order; the first that yields a line token wins.
pub const MARKER_RULES: &[MarkerRule] = &[
    MarkerRule {
        name: "table-row",
        file: Some(Bounds {
            open: "<td class=\"file\">",
            close: "</td>",
        }),
        line: Bounds {
            open: "<td class=\"line\">",
            close: "</td>",
        },
        message: Bounds {
            open: "<td class=\"msg\">",
            close: "</td>",
        },
        rule: Bounds {
            open: "<td class=\"rule\">",
            close: "</td>",
        },
    },
    MarkerRule {
        name: "inline",
        file: Some(Bounds {
            open: "File: ",
            close: ",",
        }),
        line: Bounds {
            open: "Line: ",
            close: " - ",
        },
        message: Bounds {
            open: "",
            close: " [",
        },
        rule: Bounds {
            open: "",
            close: "]",
        },
    },
];

#[derive(Debug, PartialEq, Eq)]
/// Raw field text captured from one line.
pub struct Captured {
    pub file: Option<String>,
    pub line: String,
    pub message: String,
    pub rule: String,
}

/// Scan every line of `text`, pushing the violations that parse.
pub fn scan(text: &str, out: &mut RuleViolations) -> ShapeStats {
    let mut stats = ShapeStats::new(Shape::LegacyText);
    for (idx, line) in text.lines().enumerate() {
        let Some((rule, cap)) = MARKER_RULES
            .iter()
            .find_map(|r| capture(r, line).map(|c| (r.name, c)))
        else {
            continue;
        };
        let built = build_violation(RawRecord {
            rule: Some(&cap.rule),
            line: Some(&cap.line),
            location: cap.file.as_deref(),
            message: Some(&cap.message),
            severity: None,
            category: None,
        });
        stats.record(built.is_some());
        match built {
            Some(v) => out.push(v),
            None => debug!(
                input_line = idx + 1,
                marker = rule,
                token = %cap.line,
                "skipped legacy line"
            ),
        }
    }
    stats
}

/// Apply one marker rule to a line. `None` when the line/message/rule markers do not all appear.
pub fn capture(rule: &MarkerRule, line: &str) -> Option<Captured> {
    let mut cursor = 0usize;
    let file = match rule.file {
        Some(b) => match take(line, cursor, b) {
            Some((text, next)) => {
                cursor = next;
                Some(clean(text))
            }
            None => None,
        },
        None => None,
    };
    let (line_tok, next) = take(line, cursor, rule.line)?;
    cursor = next;
    let (message, next) = take(line, cursor, rule.message)?;
    cursor = next;
    let (rule_tok, _) = take(line, cursor, rule.rule)?;
    Some(Captured {
        file,
        line: clean(line_tok),
        message: clean(message),
        rule: clean(rule_tok),
    })
}

/// Locate `bounds` at or after `from`; returns the enclosed text and the index after the close marker.
fn take(line: &str, from: usize, bounds: Bounds) -> Option<(&str, usize)> {
    let rest = line.get(from..)?;
    let start = if bounds.open.is_empty() {
        0
    } else {
        rest.find(bounds.open)? + bounds.open.len()
    };
    let body = &rest[start..];
    let end = body.find(bounds.close)?;
    Some((&body[..end], from + start + end + bounds.close.len()))
}

fn tag_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").ok()).as_ref()
}

/// Strip inner tags, decode common entities, collapse whitespace.
pub fn clean(raw: &str) -> String {
    let stripped = match tag_re() {
        Some(re) => re.replace_all(raw, ""),
        None => Cow::Borrowed(raw),
    };
    let decoded = stripped
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
