// Type Translator
//
// Prints output AST types as TypeScript type syntax for `.d.ts` files.

use anyhow::bail;
use angular_compiler::output::output_ast as o;

use super::import_manager::ImportManager;

pub fn translate_type(type_: &o::Type, imports: &mut ImportManager) -> anyhow::Result<String> {
    TypeTranslatorVisitor { imports }.visit_type(type_)
}

struct TypeTranslatorVisitor<'a> {
    imports: &'a mut ImportManager,
}

impl TypeTranslatorVisitor<'_> {
    fn visit_type(&mut self, type_: &o::Type) -> anyhow::Result<String> {
        match type_ {
            o::Type::Builtin(builtin) => Ok(match builtin.name {
                o::BuiltinTypeName::Bool => "boolean",
                o::BuiltinTypeName::Dynamic => "any",
                o::BuiltinTypeName::Int | o::BuiltinTypeName::Number => "number",
                o::BuiltinTypeName::String => "string",
                o::BuiltinTypeName::None => "never",
                other => bail!("Unsupported builtin type: {:?}", other),
            }
            .to_string()),
            o::Type::Expression(expression_type) => {
                let base = self.visit_expression(&expression_type.value)?;
                Ok(format!("{}{}", base, self.type_parameters(expression_type.type_params.as_deref())?))
            }
            o::Type::Array(array) => Ok(format!("Array<{}>", self.visit_type(&array.of)?)),
            o::Type::Map(map) => {
                let value = match &map.value_type {
                    Some(value) => self.visit_type(value)?,
                    None => "any".to_string(),
                };
                Ok(format!("{{[key: string]: {}}}", value))
            }
        }
    }

    fn type_parameters(&mut self, params: Option<&[o::Type]>) -> anyhow::Result<String> {
        match params {
            Some(params) if !params.is_empty() => {
                let params = params
                    .iter()
                    .map(|param| self.visit_type(param))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Ok(format!("<{}>", params.join(", ")))
            }
            _ => Ok(String::new()),
        }
    }

    /// Expressions in type position: names, literals, tuples and `typeof`.
    fn visit_expression(&mut self, expr: &o::Expression) -> anyhow::Result<String> {
        match expr {
            o::Expression::ReadVar(e) => Ok(e.name.clone()),
            o::Expression::Literal(e) => Ok(match &e.value {
                o::LiteralValue::String(s) => format!("'{}'", s.replace('\'', "\\'")),
                o::LiteralValue::Number(n) => ts::parser::format_number(*n),
                o::LiteralValue::Bool(b) => b.to_string(),
                o::LiteralValue::Null => "null".to_string(),
                o::LiteralValue::Undefined => "undefined".to_string(),
            }),
            o::Expression::External(e) => {
                let (Some(module_name), Some(name)) = (&e.value.module_name, &e.value.name) else {
                    bail!("Cannot translate a local external reference in type position: {:?}", e.value);
                };
                let import = self.imports.generate_named_import(module_name, name)?;
                let base = match import.module_import {
                    Some(qualifier) => format!("{}.{}", qualifier, import.symbol),
                    None => import.symbol,
                };
                Ok(format!("{}{}", base, self.type_parameters(e.type_params.as_deref())?))
            }
            o::Expression::LiteralArray(e) => {
                let entries = e
                    .entries
                    .iter()
                    .map(|entry| self.visit_expression(entry))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Ok(format!("[{}]", entries.join(", ")))
            }
            o::Expression::LiteralMap(e) => {
                let entries = e
                    .entries
                    .iter()
                    .map(|entry| {
                        let key = if entry.quoted {
                            format!("'{}'", entry.key)
                        } else {
                            entry.key.clone()
                        };
                        Ok(format!("{}: {}", key, self.visit_expression(&entry.value)?))
                    })
                    .collect::<anyhow::Result<Vec<_>>>()?;
                Ok(format!("{{{}}}", entries.join(", ")))
            }
            o::Expression::WrappedNode(e) => Ok(e.node.clone()),
            o::Expression::TypeOf(e) => Ok(format!("typeof {}", self.visit_expression(&e.expr)?)),
            other => bail!("Unsupported expression in type position: {:?}", other),
        }
    }
}
