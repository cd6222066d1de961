//! Structured minifier diagnostics.

use std::fmt;

use parking_lot::Mutex;

use super::AssetKind;
use crate::error::MinifyError;
use crate::log;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One message from a minifier, positioned in its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: AssetKind,
    pub source_name: String,
    pub message: String,
    /// 1-based.
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl Diagnostic {
    pub fn error(kind: AssetKind, source_name: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            source_name: source_name.to_string(),
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn warning(kind: AssetKind, source_name: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, source_name, message)
        }
    }

    pub fn at(mut self, line: Option<u32>, column: Option<u32>) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn to_error(&self) -> MinifyError {
        MinifyError {
            kind: self.kind,
            source_name: self.source_name.clone(),
            message: self.message.clone(),
            line: self.line,
            column: self.column,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source_name)?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        write!(f, ": {}", self.message)
    }
}

/// Sink for minifier diagnostics.
pub trait DiagnosticReporter: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Writes diagnostics to the terminal log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl DiagnosticReporter for LogReporter {
    fn report(&self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Warning => log!("warning"; "{diagnostic}"),
            Severity::Error => log!("error"; "{diagnostic}"),
        }
    }
}

/// Keeps every diagnostic for later inspection.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    pub fn errors(&self) -> usize {
        self.diagnostics
            .lock()
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }
}

impl DiagnosticReporter for CollectingReporter {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}
