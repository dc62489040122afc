use std::fmt;

use thiserror::Error;

/// Marker prepended to issues caused by a caller bug rather than user input.
pub const INTERNAL_ERROR_MARKER: &str = "(internal error)";

/// Category of a generation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// Required field missing or malformed.
    Configuration,
    /// Correlation source values do not coerce into the expected shape.
    CorrelationSource,
    /// Caller bug, e.g. no column type selected.
    Internal,
}

/// One field-level problem found while validating or generating a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationIssue {
    pub kind: IssueKind,
    /// Dotted path of the offending field, empty when not field-specific.
    pub path: String,
    pub message: String,
}

impl GenerationIssue {
    pub fn new(kind: IssueKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn configuration(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(IssueKind::Configuration, path, message)
    }

    pub fn correlation_source(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(IssueKind::CorrelationSource, path, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(IssueKind::Internal, "", message)
    }
}

impl fmt::Display for GenerationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == IssueKind::Internal {
            write!(f, "{INTERNAL_ERROR_MARKER} ")?;
        }
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Aggregated issues for a single generate attempt.
///
/// Validation never stops at the first problem, so this always carries every
/// issue found. An instance returned as an error is never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("column generation rejected with {} issue(s)", .issues.len())]
pub struct GenerationErrors {
    issues: Vec<GenerationIssue>,
}

impl GenerationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(issue: GenerationIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    pub fn push(&mut self, issue: GenerationIssue) {
        self.issues.push(issue);
    }

    pub fn merge(&mut self, other: GenerationErrors) {
        self.issues.extend(other.issues);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn issues(&self) -> &[GenerationIssue] {
        &self.issues
    }

    /// Human-readable messages, one per issue, in discovery order.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }

    pub fn has_internal(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.kind == IssueKind::Internal)
    }

    /// `Ok(value)` when no issue was recorded, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, GenerationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl From<GenerationIssue> for GenerationErrors {
    fn from(issue: GenerationIssue) -> Self {
        Self::single(issue)
    }
}

/// Errors emitted around the engine: session bookkeeping and export.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Rejected(#[from] GenerationErrors),
    #[error("core error: {0}")]
    Core(#[from] synthtab_core::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}
