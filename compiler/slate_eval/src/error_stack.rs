//! Error records accumulated by one `interp` call.

use std::fmt::Write as _;
use std::ops::Deref;

use slate_ir::{SourceLocation, Span};
use thiserror::Error;

use crate::errors::{ErrorKind, EvalError};

/// A recorded failure, inspectable by the host after `interp` returns.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorRecord {
    kind: ErrorKind,
    message: String,
    span: Option<Span>,
    location: Option<SourceLocation>,
    source_line: Option<String>,
}

impl ErrorRecord {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// `(kind name, message)`, e.g. `("NameError", "name 'x' is not defined")`.
    pub fn get_error(&self) -> (&'static str, &str) {
        (self.kind.name(), &self.message)
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    pub fn location(&self) -> Option<SourceLocation> {
        self.location
    }

    /// Multi-line report written to the output sink when errors are shown.
    pub fn report(&self) -> String {
        let mut out = String::new();
        if let Some(line) = &self.source_line {
            let _ = writeln!(out, "   {line}");
        }
        let _ = write!(out, "{}: {}", self.kind, self.message);
        if let Some(location) = self.location {
            let _ = write!(out, "\n  at {location}");
        }
        out
    }
}

impl From<EvalError> for ErrorRecord {
    fn from(err: EvalError) -> Self {
        ErrorRecord {
            kind: err.kind,
            message: err.message,
            span: err.span,
            location: err.location,
            source_line: err.source_line,
        }
    }
}

/// Ordered error records; the last one is the most recent.
#[derive(Clone, Debug, Default)]
pub struct ErrorStack {
    records: Vec<ErrorRecord>,
}

impl ErrorStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ErrorRecord) {
        self.records.push(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Deref for ErrorStack {
    type Target = [ErrorRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl<'a> IntoIterator for &'a ErrorStack {
    type Item = &'a ErrorRecord;
    type IntoIter = std::slice::Iter<'a, ErrorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Host-level failure of an `interp` call.
///
/// Carries the first record of the call; the full list stays available
/// through `Interpreter::error`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InterpError {
    /// Evaluation finished but recorded errors, and errors were suppressed.
    #[error("{kind}: {message}")]
    Failed { kind: ErrorKind, message: String },
    /// Evaluation was stopped before the program finished.
    #[error("evaluation aborted: {kind}: {message}")]
    Aborted { kind: ErrorKind, message: String },
}

impl InterpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InterpError::Failed { kind, .. } | InterpError::Aborted { kind, .. } => *kind,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            InterpError::Failed { message, .. } | InterpError::Aborted { message, .. } => message,
        }
    }
}
