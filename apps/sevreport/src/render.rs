//! HTML rendering of a `ReportModel`.
//!
//! Produces one self-contained document with inline CSS and a small toggle
//! script. Every text value is escaped; the page carries every aggregated
//! rule report exactly once, under its severity, with all of its violations.

use crate::models::severity::severity_label;
use crate::models::{ReportModel, RuleReport, Summary, Violation, UNKNOWN_LOCATION};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    /// Violation paths under this directory are shown relative to it.
    pub source_root: Option<PathBuf>,
    pub generated_at: String,
}

/// Render the full HTML page.
pub fn render_html(model: &ReportModel, opts: &RenderOptions) -> String {
    let summary = model.summary();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <style>{css}</style>
  <script>{js}</script>
</head>
<body>
  <h1>{title}</h1>
{header}
{summary}
{body}
</body>
</html>
"#,
        title = html_escape(&opts.title),
        css = inline_css(),
        js = inline_javascript(),
        header = render_header(model, &summary, opts),
        summary = render_summary(&summary),
        body = render_groups(model, opts),
    )
}

fn render_header(model: &ReportModel, summary: &Summary, opts: &RenderOptions) -> String {
    let meta = &model.meta;
    let mut out = String::from("  <div class='header'>\n");
    let _ = writeln!(
        out,
        "    <p>Source: <code>{}</code></p>",
        html_escape(&meta.source)
    );
    let tool = match (&meta.tool, &meta.tool_version) {
        (Some(t), Some(v)) => Some(format!("{t} {v}")),
        (Some(t), None) => Some(t.clone()),
        (None, Some(v)) => Some(v.clone()),
        (None, None) => None,
    };
    if let Some(tool) = tool {
        let _ = writeln!(out, "    <p>Tool: {}</p>", html_escape(&tool));
    }
    if let Some(project) = &meta.project {
        let _ = writeln!(out, "    <p>Project: {}</p>", html_escape(project));
    }
    if let Some(time) = &meta.session_time {
        let _ = writeln!(out, "    <p>Analysis time: {}</p>", html_escape(time));
    }
    let _ = writeln!(
        out,
        "    <p>Generated: {}</p>",
        html_escape(&opts.generated_at)
    );
    if !summary.files.is_empty() {
        let _ = writeln!(
            out,
            "    <details><summary>Files with violations ({})</summary>\n    <ul class='files'>",
            summary.files.len()
        );
        for f in &summary.files {
            let _ = writeln!(
                out,
                "      <li>{}</li>",
                html_escape(&display_path(f, opts.source_root.as_deref()))
            );
        }
        out.push_str("    </ul></details>\n");
    }
    out.push_str("  </div>");
    out
}

fn render_summary(summary: &Summary) -> String {
    let mut out = String::from("  <div class='summary'>\n    <h2>Summary</h2>\n");
    let _ = writeln!(
        out,
        "    <p>Total Rules with Violations: {}</p>\n    <p>Total Violations: {}</p>",
        summary.rules, summary.violations
    );
    out.push_str("    <h3>Violations by Severity</h3>\n    <ul>\n");
    for c in &summary.by_severity {
        let _ = writeln!(
            out,
            "      <li><strong>{}:</strong> {} rules with {} violations</li>",
            c.label, c.rules, c.violations
        );
    }
    out.push_str("    </ul>\n  </div>");
    out
}

fn render_groups(model: &ReportModel, opts: &RenderOptions) -> String {
    if model.is_empty() {
        return "  <p>No rule violations found in the analysis results.</p>".to_string();
    }
    let mut out = String::new();
    for (sev, reports) in model.iter_groups() {
        let count: usize = reports.iter().map(|r| r.violations.len()).sum();
        let _ = writeln!(
            out,
            "  <div class='severity severity-{sev}'>{label} Severity ({rules} rules, {count} violations) <span class='toggle-btn' onclick='toggleSection(\"sev-{sev}\")'>&#9660;</span></div>\n  <div id='sev-{sev}' class='tree'>",
            sev = sev,
            label = severity_label(i64::from(sev)),
            rules = reports.len(),
            count = count,
        );
        for r in reports {
            out.push_str(&render_rule(sev, r, opts));
        }
        out.push_str("  </div>\n");
    }
    out
}

fn render_rule(sev: i32, rule: &RuleReport, opts: &RenderOptions) -> String {
    let anchor = format!("rule-{sev}-{}", safe_id(&rule.id));
    let mut out = String::new();
    let _ = writeln!(
        out,
        "    <div class='rule'>\n      <span class='rule-id'>{id}</span>\n      <span class='rule-desc'>{desc}</span>",
        id = html_escape(&rule.id),
        desc = html_escape(&rule.description),
    );
    if let Some(cat) = &rule.category {
        let _ = writeln!(
            out,
            "      <span class='rule-cat'>{}</span>",
            html_escape(cat)
        );
    }
    let _ = writeln!(
        out,
        "      <span class='rule-count'>{count}</span>\n      <span class='toggle-btn' onclick='toggleSection(\"{anchor}\")'>&#9660;</span>\n      <div id='{anchor}' class='violations'>",
        count = rule.violations.len(),
        anchor = anchor,
    );
    for v in &rule.violations {
        out.push_str(&render_violation(v, opts));
    }
    out.push_str("      </div>\n    </div>\n");
    out
}

fn render_violation(v: &Violation, opts: &RenderOptions) -> String {
    let mut out = format!(
        "        <div class='violation'>\n          <span class='file-path'>{file}</span>:<span class='line-number'>{line}</span>\n",
        file = html_escape(&display_path(&v.location, opts.source_root.as_deref())),
        line = v.line,
    );
    if !v.message.is_empty() {
        let _ = writeln!(
            out,
            "          <span class='message'>{}</span>",
            html_escape(&v.message)
        );
    }
    if let Some(cat) = &v.category {
        let _ = writeln!(
            out,
            "          <span class='category'>{}</span>",
            html_escape(cat)
        );
    }
    out.push_str("        </div>\n");
    out
}

/// Show `path` relative to `root` when it lives underneath it.
pub fn display_path(path: &str, root: Option<&Path>) -> String {
    let Some(root) = root else {
        return path.to_string();
    };
    if path == UNKNOWN_LOCATION {
        return path.to_string();
    }
    let p = Path::new(path);
    if !p.starts_with(root) {
        return path.to_string();
    }
    match pathdiff::diff_paths(p, root) {
        Some(rel) if !rel.as_os_str().is_empty() => rel.to_string_lossy().to_string(),
        _ => path.to_string(),
    }
}

/// Element id fragment for a rule id.
pub fn safe_id(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            '.' | ' ' | '-' | ':' | '/' => '_',
            c if c.is_ascii_alphanumeric() || c == '_' => c,
            _ => '_',
        })
        .collect()
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn inline_css() -> &'static str {
    r#"
    body { font-family: Arial, sans-serif; margin: 20px; }
    h1 { color: #2c3e50; }
    code { font-family: monospace; }
    .header { color: #555; margin-bottom: 10px; }
    .header p { margin: 2px 0; }
    .files { font-family: monospace; font-size: 0.9em; }
    .summary { margin-bottom: 20px; background-color: #f8f9fa; padding: 10px; border-left: 4px solid #2c3e50; }
    .tree { margin-left: 20px; }
    .severity { color: white; font-weight: bold; padding: 10px; margin: 10px 0; border-radius: 5px; }
    .severity-0 { background-color: #3498db; }
    .severity-1 { background-color: #2ecc71; }
    .severity-2 { background-color: #f39c12; }
    .severity-3 { background-color: #e67e22; }
    .severity-4 { background-color: #e74c3c; }
    .rule { margin: 10px 0; padding: 8px; background-color: #f8f9fa; border-left: 4px solid #2c3e50; }
    .rule-id { font-weight: bold; color: #2c3e50; }
    .rule-desc { margin-left: 5px; }
    .rule-cat { margin-left: 8px; font-size: 0.85em; color: #7f8c8d; }
    .rule-count { float: right; font-weight: bold; background-color: #e8eaed; padding: 2px 8px; border-radius: 10px; }
    .violations { margin-left: 30px; }
    .violation { margin: 5px 0; padding: 5px; background-color: #f1f2f6; border-left: 3px solid #a4b0be; }
    .file-path { color: #2980b9; }
    .line-number { font-weight: bold; color: #c0392b; }
    .message { display: block; margin-top: 3px; color: #34495e; font-style: italic; }
    .category { display: block; font-size: 0.8em; color: #7f8c8d; }
    .toggle-btn { cursor: pointer; user-select: none; }
    .hidden { display: none; }
"#
}

fn inline_javascript() -> &'static str {
    r#"
    function toggleSection(id) {
      const element = document.getElementById(id);
      if (element) { element.classList.toggle('hidden'); }
    }
"#
}
