//! Recoverable problems noticed during a run.
//!
//! These are logged where they happen and also collected, so callers can
//! report them without depending on the logger.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A first/last row bound was ignored.
    RowRange,
    /// An attribute carrier's reference could not be parsed.
    AttributePath,
    /// An attribute carrier's reference designated no element.
    AttributeTarget,
    /// A frame link pointed at an object that does not exist.
    LinkTarget,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::RowRange => "row range",
            DiagnosticKind::AttributePath => "attribute path",
            DiagnosticKind::AttributeTarget => "attribute target",
            DiagnosticKind::LinkTarget => "link target",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}
