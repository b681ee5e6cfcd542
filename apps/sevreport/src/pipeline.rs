//! One report run: read -> extract -> resolve -> aggregate -> render -> write.
//!
//! `run` never exits the process; it returns a `RunOutcome` and leaves the
//! decision to loop or exit to the caller.

use crate::aggregate::{aggregate, resolve_ladder};
use crate::catalog::{read_catalog, MatchMode};
use crate::document::{declares_xml, is_html_root, parse_xml, read_input, SourceKind, XmlReport};
use crate::error::{FailureKind, ReportError};
use crate::extract::{extract, Extraction, Source};
use crate::models::{ReportMeta, ReportModel, RuleDefinition};
use crate::render::{render_html, RenderOptions};
use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const DEFAULT_OUTPUT_FILE: &str = "parasoft_report_by_severity.html";
pub const DEFAULT_TITLE: &str = "Parasoft Static Analysis Results";

#[derive(Debug, Clone)]
/// Explicit context for one run.
pub struct RunConfig {
    pub debug_logging: bool,
    pub input_path: Option<String>,
    pub match_mode: MatchMode,
    pub output_file: PathBuf,
    /// Append a local timestamp to the output file stem.
    pub timestamped: bool,
    pub title: String,
    pub source_root: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            debug_logging: false,
            input_path: None,
            match_mode: MatchMode::CaseSensitive,
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            timestamped: false,
            title: DEFAULT_TITLE.to_string(),
            source_root: None,
        }
    }
}

#[derive(Debug)]
pub struct RunSuccess {
    pub model: ReportModel,
    pub output_path: PathBuf,
}

#[derive(Debug)]
pub enum RunOutcome {
    Success(RunSuccess),
    Failure { kind: FailureKind, message: String },
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Success(_) => 0,
            RunOutcome::Failure { kind, .. } => kind.exit_code(),
        }
    }
}

impl From<ReportError> for RunOutcome {
    fn from(err: ReportError) -> Self {
        RunOutcome::Failure {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Run the whole pipeline for `cfg.input_path`.
pub fn run(cfg: &RunConfig) -> RunOutcome {
    match try_run(cfg, Local::now()) {
        Ok(ok) => RunOutcome::Success(ok),
        Err(e) => e.into(),
    }
}

fn try_run(cfg: &RunConfig, now: DateTime<Local>) -> Result<RunSuccess, ReportError> {
    let input = cfg
        .input_path
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ReportError::InputMissing)?;
    let model = build_model(Path::new(input), cfg)?;
    let output_path = output_path(&cfg.output_file, cfg.timestamped, now);
    let html = render_html(
        &model,
        &RenderOptions {
            title: cfg.title.clone(),
            source_root: cfg.source_root.clone(),
            generated_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        },
    );
    write_report(&output_path, &html)?;
    info!(path = %output_path.display(), "report written");
    Ok(RunSuccess { model, output_path })
}

/// Build the normalized model for one input file without rendering it.
pub fn build_model(path: &Path, cfg: &RunConfig) -> Result<ReportModel, ReportError> {
    info!(path = %path.display(), "opening report");
    let raw = read_input(path)?;
    let source = path.to_string_lossy().to_string();
    if raw.kind == SourceKind::Legacy {
        info!("input is not structured XML; scanning as legacy text report");
        return Ok(legacy_model(&raw.text, source, cfg));
    }
    let doc = match parse_xml(&raw) {
        Ok(doc) => doc,
        Err(e) if !declares_xml(&raw.text) => {
            warn!(error = %e, "input is not well-formed XML; scanning as legacy text report");
            return Ok(legacy_model(&raw.text, source, cfg));
        }
        Err(e) => return Err(e),
    };
    if is_html_root(doc.root_element()) {
        info!("input is an XHTML page; scanning as legacy text report");
        return Ok(legacy_model(&raw.text, source, cfg));
    }
    let report = XmlReport::open(&doc, path)?;
    debug!(root = report.root.tag_name().name(), "xml report loaded");
    let extraction = extract(Source::Xml(&report));
    let catalog = read_catalog(&report);
    Ok(finish(extraction, &catalog, cfg, report.meta(&source)))
}

fn legacy_model(text: &str, source: String, cfg: &RunConfig) -> ReportModel {
    finish(
        extract(Source::Legacy(text)),
        &[],
        cfg,
        ReportMeta {
            source,
            ..ReportMeta::default()
        },
    )
}

fn finish(
    extraction: Extraction,
    catalog: &[RuleDefinition],
    cfg: &RunConfig,
    meta: ReportMeta,
) -> ReportModel {
    info!(
        rules = extraction.violations.rule_count(),
        violations = extraction.violations.violation_count(),
        dropped = extraction.stats.dropped(),
        "extraction complete"
    );
    if cfg.debug_logging {
        log_details(&extraction);
    }
    let (tier, filed) = resolve_ladder(catalog, &extraction.violations, cfg.match_mode);
    info!(tier = tier.as_str(), reports = filed.len(), "resolution tier");
    aggregate(tier, filed, extraction.stats, meta)
}

fn log_details(extraction: &Extraction) {
    for id in extraction.violations.rule_ids() {
        debug!(rule = %id, "rule id found in report");
    }
    let levels: BTreeSet<i32> = extraction
        .violations
        .iter()
        .flat_map(|(_, list)| list.iter().filter_map(|v| v.severity))
        .collect();
    for sev in levels {
        debug!(severity = sev, "severity level seen in violations");
    }
}

/// Output location; with `timestamped`, `_YYYYmmdd_HHMMSS` is appended to the stem.
pub fn output_path(base: &Path, timestamped: bool, now: DateTime<Local>) -> PathBuf {
    if !timestamped {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "report".to_string());
    let ext = base
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_else(|| "html".to_string());
    base.with_file_name(format!("{stem}_{}.{ext}", now.format("%Y%m%d_%H%M%S")))
}

/// Write through a sibling temp file and rename, so a failed write leaves no partial report.
pub fn write_report(path: &Path, html: &str) -> Result<(), ReportError> {
    let unwritable = |source: std::io::Error| ReportError::OutputUnwritable {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    if let Err(e) = fs::write(&tmp, html) {
        let _ = fs::remove_file(&tmp);
        return Err(unwritable(e));
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        unwritable(e)
    })
}
