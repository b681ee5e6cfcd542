//! Configuration discovery and effective settings resolution.
//!
//! Sevreport reads `sevreport.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config.
//! Defaults:
//! - `output_file`: `parasoft_report_by_severity.html`
//! - `title`: `Parasoft Static Analysis Results`
//! - `output`: `human`
//! - `match_mode`: `case-sensitive`
//! - `timestamped|debug|open`: false
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::catalog::MatchMode;
use crate::pipeline::{RunConfig, DEFAULT_OUTPUT_FILE, DEFAULT_TITLE};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const CONFIG_NAMES: [&str; 3] = ["sevreport.toml", "sevreport.yaml", "sevreport.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `sevreport.toml|yaml`.
pub struct SevreportConfig {
    pub input: Option<String>,
    pub output_file: Option<String>,
    pub timestamped: Option<bool>,
    pub output: Option<String>,
    pub match_mode: Option<String>,
    pub debug: Option<bool>,
    pub open: Option<bool>,
    pub title: Option<String>,
    /// Violation paths are shown relative to this directory.
    pub source_root: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// What config discovery found in the repository root.
pub enum ConfigSource {
    Loaded(PathBuf),
    /// Present but not parsable; defaults were used.
    Invalid(PathBuf),
    Missing,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config: ConfigSource,
    pub input: Option<String>,
    pub output_file: PathBuf,
    pub timestamped: bool,
    pub output: String,
    pub match_mode: MatchMode,
    pub debug: bool,
    pub open: bool,
    pub title: String,
    pub source_root: Option<PathBuf>,
}

/// CLI-side overrides; `None` means "not given on the command line".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides<'a> {
    pub repo_root: Option<&'a str>,
    pub input: Option<&'a str>,
    pub output_file: Option<&'a str>,
    pub timestamped: Option<bool>,
    pub output: Option<&'a str>,
    pub case_insensitive: Option<bool>,
    pub debug: Option<bool>,
    pub open: Option<bool>,
    pub title: Option<&'a str>,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `sevreport.toml|yaml|yml` or a `.git` directory is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_NAMES.iter().any(|n| cur.join(n).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// First config file present in `root`, in lookup order.
pub fn config_path(root: &Path) -> Option<PathBuf> {
    CONFIG_NAMES
        .iter()
        .map(|n| root.join(n))
        .find(|p| p.exists())
}

/// Load `SevreportConfig` from `sevreport.toml` or `sevreport.yaml|yml` if present.
pub fn load_config(root: &Path) -> Option<SevreportConfig> {
    let toml_path = root.join("sevreport.toml");
    if toml_path.exists() {
        let s = fs::read_to_string(&toml_path).ok()?;
        return match toml::from_str(&s) {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                warn!(path = %toml_path.display(), error = %e, "ignoring invalid config file");
                None
            }
        };
    }
    for yml in ["sevreport.yaml", "sevreport.yml"] {
        let p = root.join(yml);
        if p.exists() {
            let s = fs::read_to_string(&p).ok()?;
            return match serde_yaml::from_str(&s) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "ignoring invalid config file");
                    None
                }
            };
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &CliOverrides<'_>) -> Effective {
    let start = PathBuf::from(cli.repo_root.unwrap_or("."));
    let repo_root = detect_repo_root(&start);
    let (config, cfg) = match config_path(&repo_root) {
        None => (ConfigSource::Missing, SevreportConfig::default()),
        Some(path) => match load_config(&repo_root) {
            Some(cfg) => (ConfigSource::Loaded(path), cfg),
            None => (ConfigSource::Invalid(path), SevreportConfig::default()),
        },
    };

    // Paths from the config file are relative to the directory holding it.
    let from_root = |s: String| -> PathBuf {
        let p = PathBuf::from(s);
        if p.is_absolute() {
            p
        } else {
            repo_root.join(p)
        }
    };

    let input = cli
        .input
        .map(str::to_string)
        .or_else(|| cfg.input.clone().map(|s| from_root(s).to_string_lossy().to_string()));

    let output_file = match cli.output_file {
        Some(s) => PathBuf::from(s),
        None => cfg
            .output_file
            .clone()
            .map(from_root)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
    };

    let output = cli
        .output
        .map(str::to_string)
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let match_mode = match cli.case_insensitive {
        Some(true) => MatchMode::CaseInsensitive,
        _ => cfg
            .match_mode
            .as_deref()
            .and_then(|m| {
                let parsed = MatchMode::parse(m);
                if parsed.is_none() {
                    warn!(value = m, "unknown match_mode; using case-sensitive");
                }
                parsed
            })
            .unwrap_or_default(),
    };

    let title = cli
        .title
        .map(str::to_string)
        .or(cfg.title)
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    Effective {
        input,
        output_file,
        timestamped: cli.timestamped.or(cfg.timestamped).unwrap_or(false),
        output,
        match_mode,
        debug: cli.debug.or(cfg.debug).unwrap_or(false),
        open: cli.open.or(cfg.open).unwrap_or(false),
        title,
        source_root: cfg.source_root.map(from_root),
        repo_root,
        config,
    }
}

impl Effective {
    /// Build the per-run context for one input path.
    pub fn run_config(&self, input: Option<String>) -> RunConfig {
        RunConfig {
            debug_logging: self.debug,
            input_path: input,
            match_mode: self.match_mode,
            output_file: self.output_file.clone(),
            timestamped: self.timestamped,
            title: self.title.clone(),
            source_root: self.source_root.clone(),
        }
    }
}
