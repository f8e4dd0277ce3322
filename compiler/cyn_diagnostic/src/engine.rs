//! The diagnostic sink shared by the lexer components.

use std::cell::RefCell;
use std::fmt;

use crate::code::{DiagnosticKind, Severity};
use crate::span::SourceLocation;

/// A reported diagnostic: a stable code plus where it happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// What went wrong, with parameters.
    pub kind: DiagnosticKind,
    /// Where it went wrong.
    pub loc: SourceLocation,
}

impl Diagnostic {
    /// Severity, derived from the kind.
    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    /// Stable identifier, derived from the kind.
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity(), self.kind)
    }
}

/// Collects diagnostics from the tokenizer and the literal analyzers.
///
/// Interior-mutable so the scanner can report through a shared reference
/// while tokens borrow the same buffer. Single-threaded: one compilation,
/// one writer (see the concurrency notes in the crate docs).
#[derive(Debug, Default)]
pub struct DiagnosticEngine {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl DiagnosticEngine {
    /// Create an empty engine.
    pub fn new() -> DiagnosticEngine {
        DiagnosticEngine::default()
    }

    /// Append a diagnostic.
    pub fn report(&self, loc: SourceLocation, kind: DiagnosticKind) {
        self.diagnostics.borrow_mut().push(Diagnostic { kind, loc });
    }

    /// Whether any error-severity diagnostic was reported.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.severity() == Severity::Error)
    }

    /// Whether any warning-severity diagnostic was reported.
    pub fn has_warnings(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.severity() == Severity::Warning)
    }

    /// Number of error-severity diagnostics.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.severity() == Severity::Error)
            .count()
    }

    /// Number of warning-severity diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.severity() == Severity::Warning)
            .count()
    }

    /// Snapshot of everything reported so far, in insertion order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}
