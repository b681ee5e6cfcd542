//! Abort classes for a report run.
//!
//! Per-record defects (missing attributes, bad line numbers, unparseable
//! legacy lines) never surface here; they are absorbed by the extractor and
//! only show up in the dropped-record counts.

use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("No input file selected")]
    InputMissing,

    #[error("Cannot read input file {}: {source}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input file {} is not valid markup: {message}", path.display())]
    MalformedMarkup { path: PathBuf, message: String },

    #[error(
        "{} does not appear to be a Static Analysis report (no <CodingStandards> section); unit test reports are not supported",
        path.display()
    )]
    Unsupported { path: PathBuf },

    #[error("Cannot write report to {}: {source}", path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    InputMissing,
    InputUnreadable,
    StructurallyUnsupported,
    OutputUnwritable,
}

impl FailureKind {
    /// Process exit status for this failure class.
    pub fn exit_code(&self) -> i32 {
        match self {
            FailureKind::InputMissing | FailureKind::InputUnreadable => 2,
            FailureKind::StructurallyUnsupported => 3,
            FailureKind::OutputUnwritable => 4,
        }
    }
}

impl ReportError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ReportError::InputMissing => FailureKind::InputMissing,
            ReportError::InputUnreadable { .. } | ReportError::MalformedMarkup { .. } => {
                FailureKind::InputUnreadable
            }
            ReportError::Unsupported { .. } => FailureKind::StructurallyUnsupported,
            ReportError::OutputUnwritable { .. } => FailureKind::OutputUnwritable,
        }
    }
}
