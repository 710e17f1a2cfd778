//! Render3 Utilities
//!
//! Helpers shared by the render3 definition compilers.

use indexmap::IndexMap;

use crate::output::output_ast::{
    dynamic_type, expression_type, literal, literal_arr, literal_map, Expression, LiteralMapEntry, Statement, Type,
};

/// `T` or `T<any, ...>` with `num_params` dynamic type arguments.
pub fn type_with_parameters(type_expr: Expression, num_params: usize) -> Type {
    if num_params == 0 {
        return expression_type(type_expr, None);
    }
    let params = (0..num_params).map(|_| dynamic_type()).collect();
    expression_type(type_expr, Some(params))
}

/// A class seen both as a value and as a type.
#[derive(Debug, Clone, PartialEq)]
pub struct R3Reference {
    pub value: Expression,
    pub type_expr: Expression,
}

impl R3Reference {
    pub fn new(value: Expression, type_expr: Expression) -> Self {
        R3Reference { value, type_expr }
    }

    /// Value and type are the same expression.
    pub fn of(expr: Expression) -> Self {
        R3Reference {
            value: expr.clone(),
            type_expr: expr,
        }
    }
}

/// Result of compiling a definition: the initializer, its declared type and
/// any statements that must be emitted alongside the class.
#[derive(Debug, Clone, PartialEq)]
pub struct R3CompiledExpression {
    pub expression: Expression,
    pub type_: Type,
    pub statements: Vec<Statement>,
}

impl R3CompiledExpression {
    pub fn new(expression: Expression, type_: Type, statements: Vec<Statement>) -> Self {
        R3CompiledExpression {
            expression,
            type_,
            statements,
        }
    }
}

/// Ordered `key: value` entries of a definition map.
#[derive(Debug, Clone, Default)]
pub struct DefinitionMap {
    entries: Vec<LiteralMapEntry>,
}

impl DefinitionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: Option<Expression>) {
        if let Some(value) = value {
            self.entries.push(LiteralMapEntry::new(key, value, false));
        }
    }

    pub fn to_literal_map(self) -> Expression {
        literal_map(self.entries)
    }
}

/// `{a: "b", ...}` from a string map, quoting keys that are not identifiers.
pub fn map_to_map_expression(map: &IndexMap<String, String>) -> Expression {
    literal_map(
        map.iter()
            .map(|(key, value)| LiteralMapEntry::new(key.clone(), literal(value.as_str()), !is_identifier(key)))
            .collect(),
    )
}

/// `None` for an empty map, so the definition omits the key.
pub fn conditionally_create_map_object_literal(map: &IndexMap<String, String>) -> Option<Expression> {
    if map.is_empty() {
        None
    } else {
        Some(map_to_map_expression(map))
    }
}

pub fn as_literal(values: &[String]) -> Expression {
    literal_arr(values.iter().map(|v| literal(v.as_str())).collect())
}

fn is_identifier(name: &str) -> bool {
    crate::chars::is_identifier(name)
}
