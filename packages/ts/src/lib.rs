//! Host compiler model used by the Angular compiler.
//!
//! This crate plays the part of the TypeScript compiler for the rest of the
//! workspace: it lowers TypeScript parsed by `oxc_parser` into the declaration
//! model decorator analysis needs, resolves modules and exported symbols
//! inside a `Program`, and defines the `Diagnostic` types every other crate
//! reports through.

use std::fmt;

pub mod node;
pub mod parser;
pub mod path;
pub mod program;
pub mod testing;

pub use node::*;
pub use parser::{parse_source_file, ParseError};
pub use program::*;

// --- Diagnostics ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticMessageChain {
    String(String),
    Chain {
        message_text: String,
        category: DiagnosticCategory,
        code: i32,
        next: Option<Vec<DiagnosticMessageChain>>,
    },
}

impl DiagnosticMessageChain {
    pub fn new(message: impl Into<String>) -> Self {
        Self::String(message.into())
    }
}

impl From<String> for DiagnosticMessageChain {
    fn from(s: String) -> Self {
        DiagnosticMessageChain::String(s)
    }
}

impl From<&str> for DiagnosticMessageChain {
    fn from(s: &str) -> Self {
        DiagnosticMessageChain::String(s.to_string())
    }
}

impl fmt::Display for DiagnosticMessageChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticMessageChain::String(s) => write!(f, "{}", s),
            DiagnosticMessageChain::Chain { message_text, .. } => write!(f, "{}", message_text),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticRelatedInformation {
    pub category: DiagnosticCategory,
    pub code: i32,
    pub file: Option<String>,
    pub start: Option<usize>,
    pub length: Option<usize>,
    pub message_text: String,
}

/// A diagnostic as reported to the user, anchored to a file span when one is known.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: i32,
    pub file: Option<String>,
    pub start: Option<usize>,
    pub length: Option<usize>,
    pub message_text: DiagnosticMessageChain,
    pub related_information: Option<Vec<DiagnosticRelatedInformation>>,
}

impl Diagnostic {
    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            file: None,
            start: None,
            length: None,
            message_text: DiagnosticMessageChain::new(message),
            related_information: None,
        }
    }

    pub fn with_span(mut self, file: impl Into<String>, range: TextRange) -> Self {
        self.file = Some(file.into());
        self.start = Some(range.pos as usize);
        self.length = Some(range.len() as usize);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}", file)?;
            if let Some(start) = self.start {
                write!(f, "@{}", start)?;
            }
            write!(f, " - ")?;
        }
        write!(f, "error TS{}: {}", self.code, self.message_text)
    }
}
