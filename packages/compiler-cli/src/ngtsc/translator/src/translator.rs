// Translator
//
// Prints output AST expressions and statements as TypeScript source text.
// External references are routed through an `ImportManager`.

use anyhow::{anyhow, bail};
use angular_compiler::output::output_ast as o;

use super::import_manager::ImportManager;
use crate::ngtsc::util::is_valid_identifier;

#[derive(Debug, Clone, Copy)]
struct Context {
    is_statement: bool,
}

impl Context {
    const STATEMENT: Context = Context { is_statement: true };
    const EXPRESSION: Context = Context { is_statement: false };
}

pub fn translate_expression(expression: &o::Expression, imports: &mut ImportManager) -> anyhow::Result<String> {
    ExpressionTranslatorVisitor::new(imports).visit_expression(expression, Context::EXPRESSION)
}

pub fn translate_statement(statement: &o::Statement, imports: &mut ImportManager) -> anyhow::Result<String> {
    ExpressionTranslatorVisitor::new(imports).visit_statement(statement)
}

struct ExpressionTranslatorVisitor<'a> {
    imports: &'a mut ImportManager,
}

impl<'a> ExpressionTranslatorVisitor<'a> {
    fn new(imports: &'a mut ImportManager) -> Self {
        Self { imports }
    }

    fn visit_statement(&mut self, statement: &o::Statement) -> anyhow::Result<String> {
        match statement {
            o::Statement::DeclareVar(stmt) => {
                let keyword = if stmt.has_modifier(o::StmtModifier::Final) {
                    "const"
                } else {
                    "let"
                };
                let export = if stmt.has_modifier(o::StmtModifier::Exported) {
                    "export "
                } else {
                    ""
                };
                match &stmt.value {
                    Some(value) => Ok(format!(
                        "{}{} {} = {};",
                        export,
                        keyword,
                        stmt.name,
                        self.visit_expression(value, Context::EXPRESSION)?
                    )),
                    None => Ok(format!("{}{} {};", export, keyword, stmt.name)),
                }
            }
            o::Statement::DeclareFn(stmt) => Ok(format!(
                "function {}({}) {}",
                stmt.name,
                param_list(&stmt.params),
                self.visit_block(&stmt.statements)?
            )),
            o::Statement::Expression(stmt) => Ok(format!("{};", self.visit_expression(&stmt.expr, Context::STATEMENT)?)),
            o::Statement::Return(stmt) => Ok(format!(
                "return {};",
                self.visit_expression(&stmt.value, Context::EXPRESSION)?
            )),
            o::Statement::If(stmt) => {
                let condition = self.visit_expression(&stmt.condition, Context::EXPRESSION)?;
                let mut text = format!("if ({}) {}", condition, self.visit_block(&stmt.true_case)?);
                if !stmt.false_case.is_empty() {
                    text.push_str(" else ");
                    text.push_str(&self.visit_block(&stmt.false_case)?);
                }
                Ok(text)
            }
        }
    }

    fn visit_block(&mut self, statements: &[o::Statement]) -> anyhow::Result<String> {
        if statements.is_empty() {
            return Ok("{ }".to_string());
        }
        let mut body = String::new();
        for statement in statements {
            for line in self.visit_statement(statement)?.lines() {
                body.push_str("    ");
                body.push_str(line);
                body.push('\n');
            }
        }
        Ok(format!("{{\n{}}}", body))
    }

    fn visit_expression(&mut self, expr: &o::Expression, context: Context) -> anyhow::Result<String> {
        let text = match expr {
            o::Expression::ReadVar(e) => e.name.clone(),
            o::Expression::WriteVar(e) => {
                let text = format!("{} = {}", e.name, self.visit_expression(&e.value, Context::EXPRESSION)?);
                parenthesize_unless_statement(text, context)
            }
            o::Expression::WriteProp(e) => {
                let text = format!(
                    "{}.{} = {}",
                    self.visit_operand(&e.receiver)?,
                    e.name,
                    self.visit_expression(&e.value, Context::EXPRESSION)?
                );
                parenthesize_unless_statement(text, context)
            }
            o::Expression::WriteKey(e) => {
                let text = format!(
                    "{}[{}] = {}",
                    self.visit_operand(&e.receiver)?,
                    self.visit_expression(&e.index, Context::EXPRESSION)?,
                    self.visit_expression(&e.value, Context::EXPRESSION)?
                );
                parenthesize_unless_statement(text, context)
            }
            o::Expression::InvokeFn(e) => {
                let call = format!("{}({})", self.visit_operand(&e.fn_)?, self.visit_arguments(&e.args)?);
                if e.pure {
                    format!("/*@__PURE__*/ {}", call)
                } else {
                    call
                }
            }
            o::Expression::Instantiate(e) => {
                format!("new {}({})", self.visit_operand(&e.class_expr)?, self.visit_arguments(&e.args)?)
            }
            o::Expression::Literal(e) => literal_text(&e.value),
            o::Expression::External(e) => self.visit_external(&e.value)?,
            o::Expression::Conditional(e) => {
                let false_case = match &e.false_case {
                    Some(false_case) => self.visit_expression(false_case, Context::EXPRESSION)?,
                    None => "undefined".to_string(),
                };
                format!(
                    "({} ? {} : {})",
                    self.visit_expression(&e.condition, Context::EXPRESSION)?,
                    self.visit_expression(&e.true_case, Context::EXPRESSION)?,
                    false_case
                )
            }
            o::Expression::Not(e) => format!("!{}", self.visit_operand(&e.condition)?),
            o::Expression::AssertNotNull(e) => format!("{}!", self.visit_operand(&e.condition)?),
            o::Expression::Cast(e) => self.visit_expression(&e.value, context)?,
            o::Expression::Fn(e) => {
                let head = match &e.name {
                    Some(name) => format!("function {}", name),
                    None => "function".to_string(),
                };
                format!("{}({}) {}", head, param_list(&e.params), self.visit_block(&e.statements)?)
            }
            o::Expression::BinaryOp(e) => format!(
                "{} {} {}",
                self.visit_operand(&e.lhs)?,
                binary_operator(e.operator),
                self.visit_operand(&e.rhs)?
            ),
            o::Expression::ReadProp(e) => format!("{}.{}", self.visit_operand(&e.receiver)?, e.name),
            o::Expression::ReadKey(e) => format!(
                "{}[{}]",
                self.visit_operand(&e.receiver)?,
                self.visit_expression(&e.index, Context::EXPRESSION)?
            ),
            o::Expression::LiteralArray(e) => format!("[{}]", self.visit_arguments(&e.entries)?),
            o::Expression::LiteralMap(e) => {
                if e.entries.is_empty() {
                    return Ok("{}".to_string());
                }
                let mut entries = Vec::with_capacity(e.entries.len());
                for entry in &e.entries {
                    let key = if entry.quoted || !is_valid_identifier(&entry.key) {
                        quote(&entry.key)
                    } else {
                        entry.key.clone()
                    };
                    entries.push(format!(
                        "{}: {}",
                        key,
                        self.visit_expression(&entry.value, Context::EXPRESSION)?
                    ));
                }
                format!("{{ {} }}", entries.join(", "))
            }
            o::Expression::Comma(e) => format!("({})", self.visit_arguments(&e.parts)?),
            o::Expression::WrappedNode(e) => e.node.clone(),
            o::Expression::TypeOf(e) => format!("typeof {}", self.visit_operand(&e.expr)?),
            o::Expression::Unary(e) => {
                let operator = match e.operator {
                    o::UnaryOperator::Minus => "-",
                    o::UnaryOperator::Plus => "+",
                };
                format!("{}{}", operator, self.visit_operand(&e.expr)?)
            }
        };
        Ok(text)
    }

    /// An expression used as an operand, receiver or callee, parenthesized
    /// when it would otherwise bind differently.
    fn visit_operand(&mut self, expr: &o::Expression) -> anyhow::Result<String> {
        let text = self.visit_expression(expr, Context::EXPRESSION)?;
        Ok(match expr {
            o::Expression::BinaryOp(_) | o::Expression::Fn(_) | o::Expression::Unary(_) | o::Expression::Not(_) => {
                format!("({})", text)
            }
            _ => text,
        })
    }

    fn visit_arguments(&mut self, args: &[o::Expression]) -> anyhow::Result<String> {
        let args = args
            .iter()
            .map(|arg| self.visit_expression(arg, Context::EXPRESSION))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(args.join(", "))
    }

    fn visit_external(&mut self, reference: &o::ExternalReference) -> anyhow::Result<String> {
        let name = reference
            .name
            .as_deref()
            .ok_or_else(|| anyhow!("Cannot translate an external reference without a name: {:?}", reference))?;
        match &reference.module_name {
            Some(module_name) => {
                let import = self.imports.generate_named_import(module_name, name)?;
                Ok(match import.module_import {
                    Some(qualifier) => format!("{}.{}", qualifier, import.symbol),
                    None => import.symbol,
                })
            }
            None => bail!("Cannot translate a local external reference to {}", name),
        }
    }
}

fn parenthesize_unless_statement(text: String, context: Context) -> String {
    if context.is_statement {
        text
    } else {
        format!("({})", text)
    }
}

fn param_list(params: &[o::FnParam]) -> String {
    params
        .iter()
        .map(|param| param.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn binary_operator(operator: o::BinaryOperator) -> &'static str {
    match operator {
        o::BinaryOperator::Equals => "==",
        o::BinaryOperator::NotEquals => "!=",
        o::BinaryOperator::Identical => "===",
        o::BinaryOperator::NotIdentical => "!==",
        o::BinaryOperator::Minus => "-",
        o::BinaryOperator::Plus => "+",
        o::BinaryOperator::Divide => "/",
        o::BinaryOperator::Multiply => "*",
        o::BinaryOperator::Modulo => "%",
        o::BinaryOperator::And => "&&",
        o::BinaryOperator::Or => "||",
        o::BinaryOperator::BitwiseAnd => "&",
        o::BinaryOperator::BitwiseOr => "|",
        o::BinaryOperator::Lower => "<",
        o::BinaryOperator::LowerEquals => "<=",
        o::BinaryOperator::Bigger => ">",
        o::BinaryOperator::BiggerEquals => ">=",
    }
}

pub(crate) fn literal_text(value: &o::LiteralValue) -> String {
    match value {
        o::LiteralValue::Null => "null".to_string(),
        o::LiteralValue::Undefined => "undefined".to_string(),
        o::LiteralValue::Bool(b) => b.to_string(),
        o::LiteralValue::Number(n) => ts::parser::format_number(*n),
        o::LiteralValue::String(s) => quote(s),
    }
}

/// A double-quoted string literal.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use angular_compiler::output::output_ast::{
        fn_expr, import_expr, literal, literal_arr, literal_map, variable, write_var, ExternalReference, FnParam,
        LiteralMapEntry,
    };

    #[test]
    fn should_parenthesize_assignments_in_expression_position() {
        let mut imports = ImportManager::with_default_prefix();
        let call = variable("refresh").call_fn(vec![write_var("_t", variable("load").call_fn(vec![]))]);
        assert_eq!(translate_expression(&call, &mut imports).unwrap(), "refresh((_t = load()))");
        assert_eq!(
            translate_statement(&write_var("a", literal(1.0)).to_stmt(), &mut imports).unwrap(),
            "a = 1;"
        );
    }

    #[test]
    fn should_mark_pure_calls() {
        let mut imports = ImportManager::with_default_prefix();
        let iife = fn_expr(vec![], vec![variable("x").to_stmt()], None).call_pure(vec![]);
        assert_eq!(
            translate_expression(&iife, &mut imports).unwrap(),
            "/*@__PURE__*/ (function() {\n    x;\n})()"
        );
    }

    #[test]
    fn should_qualify_external_references() {
        let mut imports = ImportManager::with_default_prefix();
        let define = import_expr(ExternalReference::new("@angular/core", "ɵdefinePipe"));
        let map = literal_map(vec![
            LiteralMapEntry::new("name", literal("upper"), false),
            LiteralMapEntry::new("data-x", literal_arr(vec![literal(true)]), false),
        ]);
        let text = translate_expression(&define.call_fn(vec![map]), &mut imports).unwrap();
        assert_eq!(text, "i0.ɵdefinePipe({ name: \"upper\", \"data-x\": [true] })");
    }

    #[test]
    fn should_print_function_declarations() {
        let stmt = o::Statement::DeclareFn(o::DeclareFunctionStmt {
            name: "f".into(),
            params: vec![FnParam::new("a")],
            statements: vec![variable("a").to_return()],
            type_: None,
            modifiers: vec![],
        });
        let mut imports = ImportManager::with_default_prefix();
        assert_eq!(
            translate_statement(&stmt, &mut imports).unwrap(),
            "function f(a) {\n    return a;\n}"
        );
    }

    #[test]
    fn should_reject_local_external_references() {
        let local = o::Expression::External(o::ExternalExpr {
            value: o::ExternalReference {
                module_name: None,
                name: Some("x".into()),
            },
            type_params: None,
        });
        let mut imports = ImportManager::with_default_prefix();
        assert!(translate_expression(&local, &mut imports).is_err());
    }
}
