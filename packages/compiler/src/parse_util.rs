//! Parse Utilities
//!
//! Source files, locations and spans shared by the HTML, expression and
//! template parsers, plus the `ParseError` they report.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseSourceFile {
    pub content: String,
    pub url: String,
}

impl ParseSourceFile {
    pub fn new(content: impl Into<String>, url: impl Into<String>) -> Self {
        ParseSourceFile {
            content: content.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseLocation {
    pub file: Arc<ParseSourceFile>,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl ParseLocation {
    pub fn new(file: Arc<ParseSourceFile>, offset: usize, line: usize, col: usize) -> Self {
        ParseLocation {
            file,
            offset,
            line,
            col,
        }
    }

    /// Location of byte `offset` in `file`, computing line and column.
    pub fn at_offset(file: Arc<ParseSourceFile>, offset: usize) -> Self {
        let offset = offset.min(file.content.len());
        let before = &file.content[..offset];
        let line = before.matches('\n').count();
        let col = match before.rfind('\n') {
            Some(nl) => before[nl + 1..].chars().count(),
            None => before.chars().count(),
        };
        ParseLocation::new(file, offset, line, col)
    }

    /// Moves the location by `delta` bytes, keeping line and column in sync.
    pub fn move_by(&self, delta: i64) -> ParseLocation {
        let target = (self.offset as i64 + delta).clamp(0, self.file.content.len() as i64);
        ParseLocation::at_offset(self.file.clone(), target as usize)
    }
}

impl fmt::Display for ParseLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.file.url, self.line, self.col)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseSourceSpan {
    pub start: ParseLocation,
    pub end: ParseLocation,
    pub details: Option<String>,
}

impl ParseSourceSpan {
    pub fn new(start: ParseLocation, end: ParseLocation) -> Self {
        ParseSourceSpan {
            start,
            end,
            details: None,
        }
    }

    pub fn from_offsets(file: &Arc<ParseSourceFile>, start: usize, end: usize) -> Self {
        ParseSourceSpan::new(
            ParseLocation::at_offset(file.clone(), start),
            ParseLocation::at_offset(file.clone(), end),
        )
    }

    pub fn text(&self) -> &str {
        let content = &self.start.file.content;
        let start = self.start.offset.min(content.len());
        let end = self.end.offset.clamp(start, content.len());
        &content[start..end]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub struct ParseError {
    pub span: ParseSourceSpan,
    pub msg: String,
    pub level: ParseErrorLevel,
}

impl ParseError {
    pub fn new(span: ParseSourceSpan, msg: impl Into<String>) -> Self {
        ParseError {
            span,
            msg: msg.into(),
            level: ParseErrorLevel::Error,
        }
    }

    /// The message with up to a line of source on either side of the error.
    pub fn contextual_message(&self) -> String {
        let content = &self.span.start.file.content;
        let offset = self.span.start.offset.min(content.len());
        let line_start = content[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let line_end = content[offset..]
            .find('\n')
            .map(|i| offset + i)
            .unwrap_or(content.len());
        let level = match self.level {
            ParseErrorLevel::Warning => "WARNING",
            ParseErrorLevel::Error => "ERROR",
        };
        format!(
            "{} (\"{}[{} ->]{}\")",
            self.msg,
            &content[line_start..offset],
            level,
            &content[offset..line_end]
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let details = self
            .span
            .details
            .as_ref()
            .map(|d| format!(", {}", d))
            .unwrap_or_default();
        write!(f, "{}: {}{}", self.contextual_message(), self.span.start, details)
    }
}

/// Replaces every non-word character with `_`.
pub fn sanitize_identifier(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
