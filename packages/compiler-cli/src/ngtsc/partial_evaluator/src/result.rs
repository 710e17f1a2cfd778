// Result Types
//
// Values produced by static evaluation.

use indexmap::IndexMap;

use super::dynamic::DynamicValue;
use crate::ngtsc::imports::Reference;

/// A value that was resolved statically from an expression.
///
/// Anything the evaluator cannot follow becomes `Dynamic`; evaluation itself
/// never fails.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
    List(Vec<ResolvedValue>),
    Map(IndexMap<String, ResolvedValue>),
    Reference(Reference),
    Dynamic(DynamicValue),
}

impl ResolvedValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResolvedValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResolvedValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ResolvedValue]> {
        match self {
            ResolvedValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, ResolvedValue>> {
        match self {
            ResolvedValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            ResolvedValue::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, ResolvedValue::Dynamic(_))
    }

    /// JavaScript truthiness. `None` for values whose truthiness is unknown.
    pub fn truthy(&self) -> Option<bool> {
        match self {
            ResolvedValue::String(s) => Some(!s.is_empty()),
            ResolvedValue::Number(n) => Some(*n != 0.0 && !n.is_nan()),
            ResolvedValue::Boolean(b) => Some(*b),
            ResolvedValue::Null | ResolvedValue::Undefined => Some(false),
            ResolvedValue::List(_) | ResolvedValue::Map(_) | ResolvedValue::Reference(_) => Some(true),
            ResolvedValue::Dynamic(_) => None,
        }
    }

    /// A short description of the value's kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ResolvedValue::String(_) => "string",
            ResolvedValue::Number(_) => "number",
            ResolvedValue::Boolean(_) => "boolean",
            ResolvedValue::Null => "null",
            ResolvedValue::Undefined => "undefined",
            ResolvedValue::List(_) => "array",
            ResolvedValue::Map(_) => "object",
            ResolvedValue::Reference(_) => "reference",
            ResolvedValue::Dynamic(_) => "dynamic value",
        }
    }

    /// String conversion as performed by JavaScript's `+` operator, for
    /// primitives only.
    pub(crate) fn to_js_string(&self) -> Option<String> {
        match self {
            ResolvedValue::String(s) => Some(s.clone()),
            ResolvedValue::Number(n) => Some(ts::parser::format_number(*n)),
            ResolvedValue::Boolean(b) => Some(b.to_string()),
            ResolvedValue::Null => Some("null".to_string()),
            ResolvedValue::Undefined => Some("undefined".to_string()),
            _ => None,
        }
    }
}

impl From<&str> for ResolvedValue {
    fn from(value: &str) -> Self {
        ResolvedValue::String(value.to_string())
    }
}

impl From<f64> for ResolvedValue {
    fn from(value: f64) -> Self {
        ResolvedValue::Number(value)
    }
}

impl From<bool> for ResolvedValue {
    fn from(value: bool) -> Self {
        ResolvedValue::Boolean(value)
    }
}
