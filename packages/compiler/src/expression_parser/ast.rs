//! Angular Expression AST
//!
//! Nodes produced by the expression parser for bindings, actions,
//! interpolations and inline template bindings.

use serde::{Deserialize, Serialize};

/// Span relative to the start of the parsed expression text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParseSpan {
    pub start: usize,
    pub end: usize,
}

impl ParseSpan {
    pub fn new(start: usize, end: usize) -> Self {
        ParseSpan { start, end }
    }

    pub fn to_absolute(&self, absolute_offset: usize) -> AbsoluteSourceSpan {
        AbsoluteSourceSpan::new(absolute_offset + self.start, absolute_offset + self.end)
    }
}

/// Span relative to the start of the whole template source. Expressions are
/// identified by this span when bound to their targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbsoluteSourceSpan {
    pub start: usize,
    pub end: usize,
}

impl AbsoluteSourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        AbsoluteSourceSpan { start, end }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralMapKey {
    pub key: String,
    pub quoted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRead {
    pub receiver: Box<AST>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyWrite {
    pub receiver: Box<AST>,
    pub name: String,
    pub value: Box<AST>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyedRead {
    pub obj: Box<AST>,
    pub key: Box<AST>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyedWrite {
    pub obj: Box<AST>,
    pub key: Box<AST>,
    pub value: Box<AST>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub receiver: Box<AST>,
    pub name: String,
    pub args: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BindingPipe {
    pub exp: Box<AST>,
    pub name: String,
    pub args: Vec<AST>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ASTKind {
    EmptyExpr,
    ImplicitReceiver,
    Chain(Vec<AST>),
    Conditional {
        condition: Box<AST>,
        true_exp: Box<AST>,
        false_exp: Box<AST>,
    },
    PropertyRead(PropertyRead),
    PropertyWrite(PropertyWrite),
    SafePropertyRead(PropertyRead),
    KeyedRead(KeyedRead),
    KeyedWrite(KeyedWrite),
    MethodCall(MethodCall),
    SafeMethodCall(MethodCall),
    FunctionCall {
        target: Box<AST>,
        args: Vec<AST>,
    },
    BindingPipe(BindingPipe),
    LiteralPrimitive(LiteralValue),
    LiteralArray(Vec<AST>),
    LiteralMap {
        keys: Vec<LiteralMapKey>,
        values: Vec<AST>,
    },
    Interpolation {
        strings: Vec<String>,
        expressions: Vec<AST>,
    },
    Binary {
        operation: String,
        left: Box<AST>,
        right: Box<AST>,
    },
    PrefixNot(Box<AST>),
    NonNullAssert(Box<AST>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AST {
    pub span: ParseSpan,
    pub source_span: AbsoluteSourceSpan,
    pub kind: ASTKind,
}

impl AST {
    pub fn new(span: ParseSpan, absolute_offset: usize, kind: ASTKind) -> Self {
        AST {
            span,
            source_span: span.to_absolute(absolute_offset),
            kind,
        }
    }

    pub fn is_implicit_receiver(&self) -> bool {
        matches!(self.kind, ASTKind::ImplicitReceiver)
    }

    /// Direct child expressions in evaluation order.
    pub fn children(&self) -> Vec<&AST> {
        match &self.kind {
            ASTKind::EmptyExpr | ASTKind::ImplicitReceiver | ASTKind::LiteralPrimitive(_) => Vec::new(),
            ASTKind::Chain(exprs) | ASTKind::LiteralArray(exprs) => exprs.iter().collect(),
            ASTKind::Conditional {
                condition,
                true_exp,
                false_exp,
            } => vec![&**condition, &**true_exp, &**false_exp],
            ASTKind::PropertyRead(read) | ASTKind::SafePropertyRead(read) => vec![&*read.receiver],
            ASTKind::PropertyWrite(write) => vec![&*write.receiver, &*write.value],
            ASTKind::KeyedRead(read) => vec![&*read.obj, &*read.key],
            ASTKind::KeyedWrite(write) => vec![&*write.obj, &*write.key, &*write.value],
            ASTKind::MethodCall(call) | ASTKind::SafeMethodCall(call) => {
                std::iter::once(call.receiver.as_ref()).chain(call.args.iter()).collect()
            }
            ASTKind::FunctionCall { target, args } => std::iter::once(target.as_ref()).chain(args.iter()).collect(),
            ASTKind::BindingPipe(pipe) => std::iter::once(pipe.exp.as_ref()).chain(pipe.args.iter()).collect(),
            ASTKind::LiteralMap { values, .. } => values.iter().collect(),
            ASTKind::Interpolation { expressions, .. } => expressions.iter().collect(),
            ASTKind::Binary { left, right, .. } => vec![&**left, &**right],
            ASTKind::PrefixNot(expr) | ASTKind::NonNullAssert(expr) => vec![&**expr],
        }
    }

    /// Calls `f` for this node and every descendant, parents first.
    pub fn walk<'a>(&'a self, f: &mut dyn FnMut(&'a AST)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParserError {
    pub message: String,
    pub input: String,
    pub location: String,
}

impl ParserError {
    /// `err_location` reads like `at column 5 in` or `at the end of the expression`.
    pub fn new(message: impl Into<String>, input: &str, err_location: &str, location: &str) -> Self {
        ParserError {
            message: format!("Parser Error: {} {} [{}] in {}", message.into(), err_location, input, location),
            input: input.to_string(),
            location: location.to_string(),
        }
    }
}

/// A parsed expression along with the text it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct ASTWithSource {
    pub ast: AST,
    pub source: String,
    pub location: String,
    pub absolute_offset: usize,
    pub errors: Vec<ParserError>,
}

/// One entry of a `*directive="..."` microsyntax binding. When `key_is_var`
/// the entry declares the template variable `key` reading context property
/// `name`; otherwise it binds `key` to `expression` (or to nothing).
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateBinding {
    pub span: ParseSpan,
    pub key: String,
    pub key_is_var: bool,
    pub name: Option<String>,
    pub expression: Option<ASTWithSource>,
}
