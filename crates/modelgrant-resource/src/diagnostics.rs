//! Host-facing rendering of handler errors.

use modelgrant_core::Error;
use serde::{Deserialize, Serialize};

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The operation failed.
    Error,
    /// The operation succeeded with a caveat.
    Warning,
}

/// A message returned to the host alongside (or instead of) new state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity.
    pub severity: Severity,

    /// One-line summary.
    pub summary: String,

    /// Optional longer explanation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Diagnostic {
    /// An error diagnostic.
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: None,
        }
    }

    /// Adds a detail line.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Whether the diagnostic fails the operation.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<&Error> for Diagnostic {
    fn from(err: &Error) -> Self {
        let diagnostic = Self::error(err.to_string());
        match err {
            Error::InvalidId(_) => diagnostic
                .with_detail("expected an identifier of the form <model>:<access>"),
            Error::State(_) => diagnostic
                .with_detail("the stored state does not describe an existing access model"),
            _ => diagnostic,
        }
    }
}

impl From<Error> for Diagnostic {
    fn from(err: Error) -> Self {
        Self::from(&err)
    }
}
