//! Console rendering of a run result.
//!
//! Supports `human` (default) and `json` outputs. The JSON form carries the
//! summary counts, the tier used, and the written report path.

use crate::pipeline::{RunOutcome, RunSuccess};
use owo_colors::OwoColorize;
use serde_json::json;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && crate::utils::colors_enabled()
}

/// Print the outcome of one run in the requested format.
pub fn print_outcome(outcome: &RunOutcome, output: &str) {
    match outcome {
        RunOutcome::Success(ok) => print_success(ok, output),
        RunOutcome::Failure { kind, message } => match output {
            "json" => println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "ok": false,
                    "error": {"kind": kind, "message": message},
                }))
                .unwrap_or_default()
            ),
            _ => eprintln!("{} {}", crate::utils::error_prefix(), message),
        },
    }
}

fn print_success(ok: &RunSuccess, output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_summary_json(ok)).unwrap_or_default()
        ),
        _ => {
            let color = use_colors(output);
            let s = ok.model.summary();
            for c in &s.by_severity {
                let label = format!("⟦{}⟧", c.label);
                let label = if color {
                    match c.severity {
                        4 | 3 => label.red().bold().to_string(),
                        2 => label.yellow().bold().to_string(),
                        _ => label.blue().bold().to_string(),
                    }
                } else {
                    label
                };
                println!("{} {} rules, {} violations", label, c.rules, c.violations);
            }
            if s.dropped_records > 0 {
                println!(
                    "{} {} record(s) skipped (missing rule key or invalid line)",
                    crate::utils::note_prefix(),
                    s.dropped_records
                );
            }
            let summary = format!(
                "Summary: rules={} violations={} files={} tier={}",
                s.rules,
                s.violations,
                s.files.len(),
                s.tier.as_str()
            );
            if color {
                println!("{}", summary.bold());
                println!(
                    "{} {}",
                    "📄 report:".green().bold(),
                    ok.output_path.display()
                );
            } else {
                println!("{}", summary);
                println!("📄 report: {}", ok.output_path.display());
            }
        }
    }
}

/// Compose the JSON summary object (pure) for testing/snapshot purposes.
pub fn compose_summary_json(ok: &RunSuccess) -> JsonVal {
    let summary = serde_json::to_value(ok.model.summary()).unwrap_or(JsonVal::Null);
    json!({
        "ok": true,
        "output": ok.output_path.to_string_lossy(),
        "source": ok.model.meta.source,
        "summary": summary,
        "extraction": ok.model.stats,
    })
}
