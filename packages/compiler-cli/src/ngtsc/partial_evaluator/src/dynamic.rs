// Dynamic Value
//
// Represents a value that could not be evaluated statically, and why.

use std::fmt;

use ts::{FileId, TextRange};

#[derive(Debug, Clone, PartialEq)]
pub enum DynamicReason {
    /// The expression is of a kind the evaluator does not interpret.
    UnsupportedSyntax,
    /// An identifier that does not resolve to a declaration.
    UnknownIdentifier(String),
    /// A declaration whose value is only known at runtime, such as a
    /// `declare const` without initializer.
    ExternalReference,
    /// An operation was applied to a value of the wrong kind.
    InvalidExpressionType,
    /// A call to a function whose body is more than a single `return`.
    ComplexFunctionCall,
    /// A variable whose initializer depends on itself.
    Cycle,
    /// Derived from another dynamic value.
    DynamicInput(Box<DynamicValue>),
}

/// A value that cannot be evaluated statically.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicValue {
    pub reason: DynamicReason,
    /// File and range of the expression that produced this value.
    pub file: FileId,
    pub range: TextRange,
}

impl DynamicValue {
    pub fn new(reason: DynamicReason, file: FileId, range: TextRange) -> Self {
        Self { reason, file, range }
    }

    pub fn unknown_identifier(name: impl Into<String>, file: FileId, range: TextRange) -> Self {
        Self::new(DynamicReason::UnknownIdentifier(name.into()), file, range)
    }

    pub fn from_dynamic_input(input: DynamicValue, file: FileId, range: TextRange) -> Self {
        Self::new(DynamicReason::DynamicInput(Box::new(input)), file, range)
    }

    /// The innermost dynamic value this one was derived from.
    pub fn root_cause(&self) -> &DynamicValue {
        match &self.reason {
            DynamicReason::DynamicInput(input) => input.root_cause(),
            _ => self,
        }
    }
}

impl fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root_cause().reason {
            DynamicReason::UnsupportedSyntax => write!(f, "expression is not statically analyzable"),
            DynamicReason::UnknownIdentifier(name) => write!(f, "unknown identifier '{}'", name),
            DynamicReason::ExternalReference => write!(f, "value is only known at runtime"),
            DynamicReason::InvalidExpressionType => write!(f, "operation on a value of the wrong type"),
            DynamicReason::ComplexFunctionCall => write!(f, "function call is too complex to evaluate"),
            DynamicReason::Cycle => write!(f, "value depends on itself"),
            DynamicReason::DynamicInput(_) => unreachable!("root cause is never derived"),
        }
    }
}
