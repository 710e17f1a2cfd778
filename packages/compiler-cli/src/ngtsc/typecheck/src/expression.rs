// TypeCheck Expressions
//
// Lowers template binding expressions into TypeScript text for a type check
// block.

use angular_compiler::expression_parser::ast::{ASTKind, LiteralValue, AST};
use anyhow::bail;

use crate::ngtsc::util::is_valid_identifier;

/// Binary operators a template expression may use.
pub const BINARY_OPS: &[&str] = &[
    "+", "-", "<", ">", "<=", ">=", "==", "===", "*", "/", "%", "!=", "!==", "||", "&&", "&", "|",
];

/// Resolves nodes whose meaning depends on the template: the implicit
/// receiver and reads of template variables.
pub trait ExpressionResolver {
    /// Text for `ast`, or `None` to lower it structurally.
    fn resolve(&mut self, ast: &AST) -> anyhow::Result<Option<String>>;
}

/// Converts `ast` to TypeScript, asking `resolver` first at every node.
pub fn ast_to_typescript(ast: &AST, resolver: &mut dyn ExpressionResolver) -> anyhow::Result<String> {
    if let Some(resolved) = resolver.resolve(ast)? {
        return Ok(resolved);
    }
    Ok(match &ast.kind {
        ASTKind::PropertyRead(read) => {
            let receiver = ast_to_typescript(&read.receiver, resolver)?;
            property_access(&receiver, &read.name)
        }
        ASTKind::MethodCall(call) => {
            let receiver = ast_to_typescript(&call.receiver, resolver)?;
            let args = call
                .args
                .iter()
                .map(|arg| ast_to_typescript(arg, resolver))
                .collect::<anyhow::Result<Vec<_>>>()?;
            format!("{}({})", property_access(&receiver, &call.name), args.join(", "))
        }
        ASTKind::Binary { operation, left, right } => {
            if !BINARY_OPS.contains(&operation.as_str()) {
                bail!("Unsupported binary operator: {}", operation);
            }
            let left = ast_to_typescript(left, resolver)?;
            let right = ast_to_typescript(right, resolver)?;
            format!("({} {} {})", left, operation, right)
        }
        ASTKind::Conditional {
            condition,
            true_exp,
            false_exp,
        } => format!(
            "({} ? {} : {})",
            ast_to_typescript(condition, resolver)?,
            ast_to_typescript(true_exp, resolver)?,
            ast_to_typescript(false_exp, resolver)?
        ),
        ASTKind::LiteralPrimitive(value) => literal(value),
        ASTKind::Interpolation { expressions, .. } => {
            let mut parts = expressions
                .iter()
                .map(|expr| ast_to_typescript(expr, resolver))
                .collect::<anyhow::Result<Vec<_>>>()?;
            match parts.len() {
                0 => bail!("Interpolation without expressions"),
                1 => parts.remove(0),
                _ => format!("({})", parts.join(", ")),
            }
        }
        other => bail!("Unknown node type: {}", kind_name(other)),
    })
}

/// `receiver.name`, or `receiver["name"]` when `name` is not an identifier.
pub fn property_access(receiver: &str, name: &str) -> String {
    if is_valid_identifier(name) {
        format!("{}.{}", receiver, name)
    } else {
        format!("{}[{}]", receiver, string_literal(name))
    }
}

pub fn string_literal(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

fn literal(value: &LiteralValue) -> String {
    match value {
        LiteralValue::Null => "null".to_string(),
        LiteralValue::Undefined => "undefined".to_string(),
        LiteralValue::Bool(value) => value.to_string(),
        LiteralValue::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => format!("{}", *value as i64),
        LiteralValue::Number(value) => value.to_string(),
        LiteralValue::String(value) => string_literal(value),
    }
}

fn kind_name(kind: &ASTKind) -> &'static str {
    match kind {
        ASTKind::EmptyExpr => "EmptyExpr",
        ASTKind::ImplicitReceiver => "ImplicitReceiver",
        ASTKind::Chain(_) => "Chain",
        ASTKind::Conditional { .. } => "Conditional",
        ASTKind::PropertyRead(_) => "PropertyRead",
        ASTKind::PropertyWrite(_) => "PropertyWrite",
        ASTKind::SafePropertyRead(_) => "SafePropertyRead",
        ASTKind::KeyedRead(_) => "KeyedRead",
        ASTKind::KeyedWrite(_) => "KeyedWrite",
        ASTKind::MethodCall(_) => "MethodCall",
        ASTKind::SafeMethodCall(_) => "SafeMethodCall",
        ASTKind::FunctionCall { .. } => "FunctionCall",
        ASTKind::BindingPipe(_) => "BindingPipe",
        ASTKind::LiteralPrimitive(_) => "LiteralPrimitive",
        ASTKind::LiteralArray(_) => "LiteralArray",
        ASTKind::LiteralMap { .. } => "LiteralMap",
        ASTKind::Interpolation { .. } => "Interpolation",
        ASTKind::Binary { .. } => "Binary",
        ASTKind::PrefixNot(_) => "PrefixNot",
        ASTKind::NonNullAssert(_) => "NonNullAssert",
    }
}
