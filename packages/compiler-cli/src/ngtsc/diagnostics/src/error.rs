use std::fmt;

use ts::{Diagnostic, TextRange};

use super::error_code::ErrorCode;
use super::util::ng_error_code;

/// A location in a source file that a diagnostic points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpan {
    pub file: String,
    pub range: TextRange,
}

impl SourceSpan {
    pub fn new(file: impl Into<String>, range: TextRange) -> Self {
        Self {
            file: file.into(),
            range,
        }
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.file, self.range.pos)
    }
}

/// An error in user code that stops analysis of the declaration it occurs in.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("FatalDiagnosticError: Code: {code:?}, Message: {message}")]
pub struct FatalDiagnosticError {
    pub code: ErrorCode,
    pub span: Option<SourceSpan>,
    pub message: String,
}

impl FatalDiagnosticError {
    pub fn new(code: ErrorCode, span: Option<SourceSpan>, message: impl Into<String>) -> Self {
        Self {
            code,
            span,
            message: message.into(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        make_diagnostic(self.code, self.span.as_ref(), self.message.clone())
    }
}

pub fn make_diagnostic(code: ErrorCode, span: Option<&SourceSpan>, message: impl Into<String>) -> Diagnostic {
    let diagnostic = Diagnostic::error(ng_error_code(code), message);
    match span {
        Some(span) => diagnostic.with_span(span.file.clone(), span.range),
        None => diagnostic,
    }
}

/// Failure of a decorator handler operation.
///
/// `Fatal` errors belong to the user and are reported against the class being
/// analyzed. `Internal` errors are compiler bugs and abort the compilation.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Fatal(#[from] FatalDiagnosticError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type HandlerResult<T> = Result<T, HandlerError>;

/// Shorthand for returning a `FatalDiagnosticError`.
pub fn fatal<T>(code: ErrorCode, span: Option<SourceSpan>, message: impl Into<String>) -> HandlerResult<T> {
    Err(HandlerError::Fatal(FatalDiagnosticError::new(code, span, message)))
}
