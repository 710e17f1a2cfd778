//! Angular Expression Serializer
//!
//! Prints an expression AST back to template syntax. Pipes are wrapped in
//! parentheses so precedence stays visible.

use super::ast::*;

pub fn serialize(ast: &AST) -> String {
    match &ast.kind {
        ASTKind::EmptyExpr | ASTKind::ImplicitReceiver => String::new(),
        ASTKind::Chain(exprs) => join(exprs, "; "),
        ASTKind::Conditional {
            condition,
            true_exp,
            false_exp,
        } => format!("{} ? {} : {}", serialize(condition), serialize(true_exp), serialize(false_exp)),
        ASTKind::PropertyRead(read) => with_receiver(&read.receiver, ".", &read.name),
        ASTKind::SafePropertyRead(read) => with_receiver(&read.receiver, "?.", &read.name),
        ASTKind::PropertyWrite(write) => format!(
            "{} = {}",
            with_receiver(&write.receiver, ".", &write.name),
            serialize(&write.value)
        ),
        ASTKind::KeyedRead(read) => format!("{}[{}]", serialize(&read.obj), serialize(&read.key)),
        ASTKind::KeyedWrite(write) => format!(
            "{}[{}] = {}",
            serialize(&write.obj),
            serialize(&write.key),
            serialize(&write.value)
        ),
        ASTKind::MethodCall(call) => format!("{}({})", with_receiver(&call.receiver, ".", &call.name), join(&call.args, ", ")),
        ASTKind::SafeMethodCall(call) => {
            format!("{}({})", with_receiver(&call.receiver, "?.", &call.name), join(&call.args, ", "))
        }
        ASTKind::FunctionCall { target, args } => format!("{}({})", serialize(target), join(args, ", ")),
        ASTKind::BindingPipe(pipe) => {
            let args: String = pipe.args.iter().map(|a| format!(":{}", serialize(a))).collect();
            format!("({} | {}{})", serialize(&pipe.exp), pipe.name, args)
        }
        ASTKind::LiteralPrimitive(value) => match value {
            LiteralValue::Null => "null".to_string(),
            LiteralValue::Undefined => "undefined".to_string(),
            LiteralValue::Bool(b) => b.to_string(),
            LiteralValue::Number(n) => n.to_string(),
            LiteralValue::String(s) => serde_json::to_string(s).unwrap_or_default(),
        },
        ASTKind::LiteralArray(exprs) => format!("[{}]", join(exprs, ", ")),
        ASTKind::LiteralMap { keys, values } => {
            let entries: Vec<String> = keys
                .iter()
                .zip(values)
                .map(|(key, value)| {
                    let key = if key.quoted {
                        serde_json::to_string(&key.key).unwrap_or_default()
                    } else {
                        key.key.clone()
                    };
                    format!("{}: {}", key, serialize(value))
                })
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        ASTKind::Interpolation { strings, expressions } => {
            let mut out = String::new();
            for (i, string) in strings.iter().enumerate() {
                out.push_str(string);
                if let Some(expr) = expressions.get(i) {
                    out.push_str(&format!("{{{{ {} }}}}", serialize(expr)));
                }
            }
            out
        }
        ASTKind::Binary { operation, left, right } => {
            format!("{} {} {}", serialize(left), operation, serialize(right))
        }
        ASTKind::PrefixNot(expr) => format!("!{}", serialize(expr)),
        ASTKind::NonNullAssert(expr) => format!("{}!", serialize(expr)),
    }
}

fn with_receiver(receiver: &AST, separator: &str, name: &str) -> String {
    if receiver.is_implicit_receiver() {
        name.to_string()
    } else {
        format!("{}{}{}", serialize(receiver), separator, name)
    }
}

fn join(exprs: &[AST], separator: &str) -> String {
    exprs.iter().map(serialize).collect::<Vec<_>>().join(separator)
}
