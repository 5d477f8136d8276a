//! Error and diagnostic types for modpath.
//!
//! Two tiers:
//! - [`PlannerError`] - fatal, the run cannot produce a report
//! - [`Diagnostic`] - soft failures collected during the run and surfaced in the report

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Fatal errors. Only database-level problems end a run.
#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed compilation database: {0}")]
    MalformedDatabase(String),

    #[error("no translation units found in compilation database")]
    EmptyDatabase,
}

pub type PlannerResult<T> = Result<T, PlannerError>;

/// Soft failure recorded while building the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Quoted include that matched no file; the edge is dropped.
    UnresolvedInclude { from: String, include: String },
    /// Source or header that could not be read; it contributes no includes or macros.
    UnreadableFile { path: String, reason: String },
    /// Database entry without `command` or `arguments`.
    SkippedRecord { index: usize, file: String },
}

impl Diagnostic {
    pub fn is_unresolved_include(&self) -> bool {
        matches!(self, Diagnostic::UnresolvedInclude { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnresolvedInclude { from, include } => {
                write!(f, "{}: unresolved include {}", from, include)
            }
            Diagnostic::UnreadableFile { path, reason } => {
                write!(f, "{}: unreadable ({})", path, reason)
            }
            Diagnostic::SkippedRecord { index, file } => {
                write!(
                    f,
                    "entry #{} ({}): no command or arguments, skipped",
                    index, file
                )
            }
        }
    }
}

/// Ordered collector for soft failures. Every push is also logged.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unresolved_count(&self) -> usize {
        self.items
            .iter()
            .filter(|d| d.is_unresolved_include())
            .count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}
