// Common Utilities
//
// Helpers shared by the decorator handlers: recognizing Angular decorators,
// peeling casts and `forwardRef` wrappers off expressions, and turning
// user-written expressions into output AST nodes.

use angular_compiler::output::output_ast::{self as o, wrapped};
use indexmap::IndexMap;
use ts::{Expression, ExpressionKind, FileId, FunctionBody, SourceFile, StatementKind};

use crate::ngtsc::diagnostics::{fatal, ErrorCode, HandlerResult, SourceSpan};
use crate::ngtsc::imports::{Reference, CORE_MODULE};
use crate::ngtsc::partial_evaluator::{ForeignFunctionResolver, ForeignFunctionResult, ResolvedValue};
use crate::ngtsc::reflection::{ClassMember, ClassMemberKind, Decorator, FunctionDefinition, ReflectionHost};

/// True if the decorator was imported from `@angular/core`.
pub fn is_angular_core(decorator: &Decorator) -> bool {
    decorator.import.as_ref().is_some_and(|import| import.from == CORE_MODULE)
}

/// True if the decorator counts as an Angular decorator. Inside the core
/// package itself decorators are recognized without an import.
pub fn is_angular_decorator(decorator: &Decorator, is_core: bool) -> bool {
    is_core || is_angular_core(decorator)
}

/// Finds the Angular decorator `name` among `decorators`.
///
/// Outside of core the decorator has to be imported from `@angular/core`
/// under that exported name, whatever its local alias.
pub fn find_angular_decorator<'d>(decorators: &'d [Decorator], name: &str, is_core: bool) -> Option<&'d Decorator> {
    decorators.iter().find(|decorator| is_angular_decorator_named(decorator, name, is_core))
}

pub fn is_angular_decorator_named(decorator: &Decorator, name: &str, is_core: bool) -> bool {
    if is_core {
        return decorator.name == name;
    }
    decorator
        .import
        .as_ref()
        .is_some_and(|import| import.from == CORE_MODULE && import.name == name)
}

/// Strips `as` casts and parentheses.
pub fn unwrap_expression(mut expr: &Expression) -> &Expression {
    loop {
        match &expr.kind {
            ExpressionKind::As { expression, .. } | ExpressionKind::Parenthesized(expression) => {
                expr = expression.as_ref()
            }
            _ => return expr,
        }
    }
}

/// The expression returned by a `forwardRef` callback: `() => Foo`,
/// `function () { return Foo; }`.
pub fn expand_forward_ref(arg: &Expression) -> Option<&Expression> {
    let function = match &unwrap_expression(arg).kind {
        ExpressionKind::Arrow(function) | ExpressionKind::Function(function) => function,
        _ => return None,
    };
    match function.body.as_ref()? {
        FunctionBody::Expression(body) => Some(body.as_ref()),
        FunctionBody::Block(statements) => match statements.as_slice() {
            [statement] => match &statement.kind {
                StatementKind::Return(Some(value)) => Some(value),
                _ => None,
            },
            _ => None,
        },
    }
}

/// Unwraps `forwardRef(() => Foo)` to `Foo`. Anything else is returned as is.
pub fn unwrap_forward_ref<'e>(expr: &'e Expression, file: FileId, host: &dyn ReflectionHost) -> &'e Expression {
    let expr = unwrap_expression(expr);
    let ExpressionKind::Call { callee, arguments } = &expr.kind else {
        return expr;
    };
    let [arg] = arguments.as_slice() else {
        return expr;
    };
    let Some(name) = callee.as_identifier() else {
        return expr;
    };
    match host.get_import_of_identifier(name, file) {
        Some(import) if import.from == CORE_MODULE && import.name == "forwardRef" => {
            expand_forward_ref(arg).unwrap_or(expr)
        }
        _ => expr,
    }
}

/// Lets the partial evaluator see through `forwardRef` calls.
pub struct ForwardRefResolver;

impl ForeignFunctionResolver for ForwardRefResolver {
    fn resolve(
        &self,
        callee: &Reference,
        _function: &FunctionDefinition,
        args: &[Expression],
        call_site: FileId,
    ) -> Option<ForeignFunctionResult> {
        if !callee.is_symbol_of(CORE_MODULE, "forwardRef") {
            return None;
        }
        let [arg] = args else {
            return None;
        };
        Some(ForeignFunctionResult {
            expression: expand_forward_ref(arg)?.clone(),
            file: call_site,
        })
    }
}

/// The user's expression, copied verbatim into generated code.
pub fn wrap_expression(expr: &Expression, file: &SourceFile) -> o::Expression {
    wrapped(expression_text(expr, file))
}

fn expression_text(expr: &Expression, file: &SourceFile) -> String {
    match &expr.kind {
        ExpressionKind::Identifier(name) => name.clone(),
        ExpressionKind::PropertyAccess { object, name } => format!("{}.{}", expression_text(object, file), name.text),
        _ => file.text_of(expr.range).to_string(),
    }
}

/// Template guards declared by a directive class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectiveGuards {
    /// Inputs with a `static ngTemplateGuard_<input>` method.
    pub ng_template_guards: Vec<String>,
    pub has_ng_template_context_guard: bool,
}

pub fn extract_directive_guards(members: &[ClassMember]) -> DirectiveGuards {
    let static_methods = || {
        members
            .iter()
            .filter(|member| member.is_static && member.kind == ClassMemberKind::Method)
    };
    DirectiveGuards {
        ng_template_guards: static_methods()
            .filter_map(|member| member.name.strip_prefix("ngTemplateGuard_"))
            .map(str::to_string)
            .collect(),
        has_ng_template_context_guard: static_methods().any(|member| member.name == "ngTemplateContextGuard"),
    }
}

/// Parses `['field', 'field: property']` into a map of field to property name.
pub fn parse_field_to_property_mapping(values: &[String]) -> IndexMap<String, String> {
    values
        .iter()
        .map(|value| {
            let mut parts = value.splitn(2, ':');
            let field = parts.next().unwrap_or_default().trim().to_string();
            let property = parts.next().map(str::trim).filter(|p| !p.is_empty());
            let property = property.map(str::to_string).unwrap_or_else(|| field.clone());
            (field, property)
        })
        .collect()
}

/// Reads an array of strings, raising `ValueHasWrongType` for anything else.
pub fn resolve_string_array(value: &ResolvedValue, span: &SourceSpan, what: &str) -> HandlerResult<Vec<String>> {
    let Some(items) = value.as_list() else {
        return fatal(
            ErrorCode::ValueHasWrongType,
            Some(span.clone()),
            format!("Failed to resolve {} to a string array", what),
        );
    };
    items
        .iter()
        .map(|item| match item.as_str() {
            Some(s) => Ok(s.to_string()),
            None => fatal(
                ErrorCode::ValueHasWrongType,
                Some(span.clone()),
                format!("Failed to resolve {} to a string array, got {}", what, item.kind_name()),
            ),
        })
        .collect()
}
