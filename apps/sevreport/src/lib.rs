//! Sevreport core library.
//!
//! Turns a Parasoft static-analysis report into a standalone HTML report
//! grouped by severity.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `document`: Input reading, format sniffing, and the XML report view.
//! - `extract`: Violation extraction across the structural shapes.
//! - `legacy`: Marker-table scanner for non-XML text reports.
//! - `catalog`: Rule definitions and the catalog-matched tier.
//! - `fallback`: Identifier-heuristic and generic tiers.
//! - `aggregate`: Resolution ladder, severity grouping, and summaries.
//! - `render`: Self-contained HTML rendering.
//! - `pipeline`: One end-to-end run with a typed outcome.
//! - `prompt`: Fixed and interactive input path providers.
//! - `models`: Shared data model.
//! - `output`: Human/JSON console printers.
//! - `error`: Error and failure classification.
//! - `utils`: Console prefixes and the document opener.
pub mod aggregate;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod legacy;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod render;
pub mod utils;
