// Interpreter
//
// Walks expressions and evaluates the statically known subset of them.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use ts::{
    BinaryOperator, DeclId, DeclarationNode, EnumDeclaration, Expression, ExpressionKind, FileId,
    ObjectMember, PrefixOperator, Program, StatementKind, TextRange,
};

use super::dynamic::{DynamicReason, DynamicValue};
use super::interface::ForeignFunctionResolver;
use super::result::ResolvedValue;
use crate::ngtsc::imports::Reference;
use crate::ngtsc::reflection::{ClassMemberKind, ReflectionHost};

/// Where an expression is being evaluated.
#[derive(Debug, Clone)]
struct Context {
    file: FileId,
    /// Module through which the declarations being evaluated were reached.
    /// References found inside them are owned by it.
    absolute_module: Option<String>,
    /// Parameters bound by an enclosing function call, or enum members.
    scope: HashMap<String, ResolvedValue>,
}

impl Context {
    fn new(file: FileId, absolute_module: Option<String>) -> Self {
        Self {
            file,
            absolute_module,
            scope: HashMap::new(),
        }
    }
}

pub(crate) struct StaticInterpreter<'a, 'f> {
    host: &'a dyn ReflectionHost,
    program: &'a Program,
    foreign: Option<&'f dyn ForeignFunctionResolver>,
    /// Variables and functions currently being evaluated.
    resolving: HashSet<DeclId>,
}

impl<'a, 'f> StaticInterpreter<'a, 'f> {
    pub(crate) fn new(
        host: &'a dyn ReflectionHost,
        program: &'a Program,
        foreign: Option<&'f dyn ForeignFunctionResolver>,
    ) -> Self {
        Self {
            host,
            program,
            foreign,
            resolving: HashSet::new(),
        }
    }

    pub(crate) fn visit(mut self, expr: &Expression, file: FileId) -> ResolvedValue {
        self.visit_expression(expr, &Context::new(file, None))
    }

    fn visit_expression(&mut self, expr: &Expression, ctx: &Context) -> ResolvedValue {
        match &expr.kind {
            ExpressionKind::String(value) => ResolvedValue::String(value.clone()),
            ExpressionKind::Number(value) => ResolvedValue::Number(*value),
            ExpressionKind::True => ResolvedValue::Boolean(true),
            ExpressionKind::False => ResolvedValue::Boolean(false),
            ExpressionKind::Null => ResolvedValue::Null,
            ExpressionKind::Identifier(name) => self.visit_identifier(name, expr.range, ctx),
            ExpressionKind::Array(elements) => self.visit_array_literal(elements, expr.range, ctx),
            ExpressionKind::Object(members) => self.visit_object_literal(members, expr.range, ctx),
            ExpressionKind::PropertyAccess { object, name } => {
                self.visit_property_access(object, &name.text, expr.range, ctx)
            }
            ExpressionKind::ElementAccess { object, index } => {
                let lhs = self.visit_expression(object, ctx);
                let index = self.visit_expression(index, ctx);
                self.access_element(lhs, index, expr.range, ctx)
            }
            ExpressionKind::Call { callee, arguments } => self.visit_call(callee, arguments, expr.range, ctx),
            ExpressionKind::Binary { operator, left, right } => {
                self.visit_binary(*operator, left, right, expr.range, ctx)
            }
            ExpressionKind::Prefix { operator, operand } => {
                let value = self.visit_expression(operand, ctx);
                self.visit_prefix(*operator, value, expr.range, ctx)
            }
            ExpressionKind::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                let condition = self.visit_expression(condition, ctx);
                match condition.truthy() {
                    Some(true) => self.visit_expression(when_true, ctx),
                    Some(false) => self.visit_expression(when_false, ctx),
                    None => derived(condition, expr.range, ctx),
                }
            }
            ExpressionKind::Parenthesized(inner) | ExpressionKind::NonNull(inner) => {
                self.visit_expression(inner, ctx)
            }
            ExpressionKind::As { expression, .. } => self.visit_expression(expression, ctx),
            _ => dynamic(DynamicReason::UnsupportedSyntax, expr.range, ctx),
        }
    }

    fn visit_identifier(&mut self, name: &str, range: TextRange, ctx: &Context) -> ResolvedValue {
        if let Some(value) = ctx.scope.get(name) {
            return value.clone();
        }
        if name == "undefined" {
            return ResolvedValue::Undefined;
        }
        match self.host.get_declaration_of_identifier(name, ctx.file) {
            Some(declaration) => {
                let module = declaration.via_module.or_else(|| ctx.absolute_module.clone());
                self.visit_declaration(declaration.decl, module, range, ctx)
            }
            None => {
                tracing::trace!(name, "unknown identifier during static evaluation");
                ResolvedValue::Dynamic(DynamicValue::unknown_identifier(name, ctx.file, range))
            }
        }
    }

    fn visit_declaration(
        &mut self,
        decl: DeclId,
        module: Option<String>,
        range: TextRange,
        ctx: &Context,
    ) -> ResolvedValue {
        let Some(node) = self.program.declaration(decl) else {
            return dynamic(DynamicReason::UnsupportedSyntax, range, ctx);
        };
        match node {
            DeclarationNode::Variable { declaration, statement } => match &declaration.initializer {
                Some(initializer) => {
                    if !self.resolving.insert(decl) {
                        return dynamic(DynamicReason::Cycle, range, ctx);
                    }
                    let value = self.visit_expression(initializer, &Context::new(decl.file, module));
                    self.resolving.remove(&decl);
                    value
                }
                // `declare const TOKEN: InjectionToken<..>` only exists at runtime.
                None if statement.modifiers.contains(ts::ModifierFlags::DECLARE)
                    || self.program.file(decl.file).is_declaration_file() =>
                {
                    ResolvedValue::Reference(self.reference(decl, node, module))
                }
                None => ResolvedValue::Undefined,
            },
            DeclarationNode::Enum(declaration) => self.visit_enum(declaration, module),
            DeclarationNode::Class(_) | DeclarationNode::Function(_) | DeclarationNode::Member { .. } => {
                ResolvedValue::Reference(self.reference(decl, node, module))
            }
        }
    }

    fn visit_enum(&mut self, declaration: &EnumDeclaration, module: Option<String>) -> ResolvedValue {
        let mut inner = Context::new(declaration.id.file, module);
        let mut members = IndexMap::new();
        let mut next = 0.0;
        for member in &declaration.members {
            let value = match &member.initializer {
                Some(initializer) => self.visit_expression(initializer, &inner),
                None => ResolvedValue::Number(next),
            };
            if let ResolvedValue::Number(n) = value {
                next = n + 1.0;
            }
            inner.scope.insert(member.name.text.clone(), value.clone());
            members.insert(member.name.text.clone(), value);
        }
        ResolvedValue::Map(members)
    }

    fn reference(&self, decl: DeclId, node: DeclarationNode<'_>, module: Option<String>) -> Reference {
        let name = node.name().unwrap_or_default();
        let file_name = &self.program.file(decl.file).file_name;
        match module {
            Some(module) => Reference::absolute(decl, name, file_name.as_str(), module),
            None => Reference::resolved(decl, name, file_name.as_str()),
        }
    }

    fn visit_array_literal(&mut self, elements: &[Expression], range: TextRange, ctx: &Context) -> ResolvedValue {
        let mut items = Vec::with_capacity(elements.len());
        for element in elements {
            match &element.kind {
                ExpressionKind::Spread(inner) => match self.visit_expression(inner, ctx) {
                    ResolvedValue::List(spread) => items.extend(spread),
                    other => return derived(other, range, ctx),
                },
                _ => items.push(self.visit_expression(element, ctx)),
            }
        }
        ResolvedValue::List(items)
    }

    fn visit_object_literal(&mut self, members: &[ObjectMember], range: TextRange, ctx: &Context) -> ResolvedValue {
        let mut map = IndexMap::new();
        for member in members {
            match member {
                ObjectMember::Property { name, value } => {
                    let value = self.visit_expression(value, ctx);
                    map.insert(name.text.clone(), value);
                }
                ObjectMember::Shorthand(id) => {
                    let value = self.visit_identifier(&id.text, id.range, ctx);
                    map.insert(id.text.clone(), value);
                }
                ObjectMember::Spread(inner) => match self.visit_expression(inner, ctx) {
                    ResolvedValue::Map(spread) => map.extend(spread),
                    other => return derived(other, range, ctx),
                },
            }
        }
        ResolvedValue::Map(map)
    }

    fn visit_property_access(
        &mut self,
        object: &Expression,
        name: &str,
        range: TextRange,
        ctx: &Context,
    ) -> ResolvedValue {
        // `ns.Name` through `import * as ns from '..'`.
        if let Some(namespace) = object.as_identifier().filter(|n| !ctx.scope.contains_key(*n)) {
            if let Some(import) = self.program.namespace_import(ctx.file, namespace) {
                return match self.program.resolve_export(import.file, name) {
                    Some(symbol) => {
                        let module = if is_bare_specifier(&import.specifier) {
                            Some(import.specifier)
                        } else {
                            symbol.via_module.or_else(|| ctx.absolute_module.clone())
                        };
                        self.visit_declaration(symbol.decl, module, range, ctx)
                    }
                    None => ResolvedValue::Dynamic(DynamicValue::unknown_identifier(
                        format!("{}.{}", namespace, name),
                        ctx.file,
                        range,
                    )),
                };
            }
        }
        let lhs = self.visit_expression(object, ctx);
        self.access_property(lhs, name, range, ctx)
    }

    fn access_property(&mut self, lhs: ResolvedValue, name: &str, range: TextRange, ctx: &Context) -> ResolvedValue {
        match lhs {
            ResolvedValue::Map(mut map) => map.shift_remove(name).unwrap_or(ResolvedValue::Undefined),
            ResolvedValue::List(items) if name == "length" => ResolvedValue::Number(items.len() as f64),
            ResolvedValue::String(s) if name == "length" => ResolvedValue::Number(s.encode_utf16().count() as f64),
            ResolvedValue::Reference(reference) => self.visit_static_member(&reference, name, range, ctx),
            other => derived(other, range, ctx),
        }
    }

    /// Static properties evaluate to their initializer, static methods to a
    /// reference that can be called.
    fn visit_static_member(&mut self, reference: &Reference, name: &str, range: TextRange, ctx: &Context) -> ResolvedValue {
        let Some(class) = self.program.class(reference.decl) else {
            return dynamic(DynamicReason::InvalidExpressionType, range, ctx);
        };
        let member = self
            .host
            .get_members_of_class(class)
            .into_iter()
            .find(|member| member.is_static && member.name == name);
        let Some(member) = member else {
            return ResolvedValue::Dynamic(DynamicValue::unknown_identifier(name, ctx.file, range));
        };
        let module = reference.module_name().map(str::to_string);
        match (member.kind, member.value, member.implementation) {
            (ClassMemberKind::Property, Some(value), _) => {
                self.visit_expression(&value, &Context::new(reference.decl.file, module))
            }
            (ClassMemberKind::Method, _, Some(decl)) => match self.program.declaration(decl) {
                Some(node) => ResolvedValue::Reference(self.reference(decl, node, module)),
                None => dynamic(DynamicReason::UnsupportedSyntax, range, ctx),
            },
            _ => dynamic(DynamicReason::ExternalReference, range, ctx),
        }
    }

    fn access_element(&mut self, lhs: ResolvedValue, index: ResolvedValue, range: TextRange, ctx: &Context) -> ResolvedValue {
        match (lhs, index) {
            (lhs, ResolvedValue::String(key)) => self.access_property(lhs, &key, range, ctx),
            (ResolvedValue::List(items), ResolvedValue::Number(n)) => {
                if n >= 0.0 && n.fract() == 0.0 {
                    items.into_iter().nth(n as usize).unwrap_or(ResolvedValue::Undefined)
                } else {
                    ResolvedValue::Undefined
                }
            }
            (ResolvedValue::Dynamic(input), _) | (_, ResolvedValue::Dynamic(input)) => {
                ResolvedValue::Dynamic(DynamicValue::from_dynamic_input(input, ctx.file, range))
            }
            _ => dynamic(DynamicReason::InvalidExpressionType, range, ctx),
        }
    }

    fn visit_call(&mut self, callee: &Expression, arguments: &[Expression], range: TextRange, ctx: &Context) -> ResolvedValue {
        let reference = match self.visit_expression(callee, ctx) {
            ResolvedValue::Reference(reference) => reference,
            other => return derived(other, range, ctx),
        };
        let Some(function) = self.host.get_definition_of_function(reference.decl) else {
            return dynamic(DynamicReason::InvalidExpressionType, range, ctx);
        };
        let callee_module = reference
            .module_name()
            .map(str::to_string)
            .or_else(|| ctx.absolute_module.clone());

        if let Some(foreign) = self.foreign {
            if let Some(result) = foreign.resolve(&reference, &function, arguments, ctx.file) {
                return if result.file == ctx.file {
                    self.visit_expression(&result.expression, ctx)
                } else {
                    self.visit_expression(&result.expression, &Context::new(result.file, callee_module))
                };
            }
        }

        let Some(body) = &function.body else {
            return dynamic(DynamicReason::ExternalReference, range, ctx);
        };
        let returned = match body.as_slice() {
            [statement] => match &statement.kind {
                StatementKind::Return(Some(expression)) => expression,
                _ => return dynamic(DynamicReason::ComplexFunctionCall, range, ctx),
            },
            _ => return dynamic(DynamicReason::ComplexFunctionCall, range, ctx),
        };

        let mut inner = Context::new(function.file, callee_module);
        for (index, parameter) in function.parameters.iter().enumerate() {
            let value = match arguments.get(index) {
                Some(argument) => self.visit_expression(argument, ctx),
                None => match &parameter.initializer {
                    Some(initializer) => self.visit_expression(initializer, &inner),
                    None => ResolvedValue::Undefined,
                },
            };
            inner.scope.insert(parameter.name.clone(), value);
        }

        if !self.resolving.insert(function.decl) {
            return dynamic(DynamicReason::Cycle, range, ctx);
        }
        let value = self.visit_expression(returned, &inner);
        self.resolving.remove(&function.decl);
        value
    }

    fn visit_binary(
        &mut self,
        operator: BinaryOperator,
        left: &Expression,
        right: &Expression,
        range: TextRange,
        ctx: &Context,
    ) -> ResolvedValue {
        let lhs = self.visit_expression(left, ctx);
        match operator {
            BinaryOperator::And | BinaryOperator::Or => {
                let Some(truthy) = lhs.truthy() else {
                    return derived(lhs, range, ctx);
                };
                let short_circuits = if operator == BinaryOperator::And { !truthy } else { truthy };
                if short_circuits {
                    lhs
                } else {
                    self.visit_expression(right, ctx)
                }
            }
            BinaryOperator::Coalesce => match lhs {
                ResolvedValue::Null | ResolvedValue::Undefined => self.visit_expression(right, ctx),
                ResolvedValue::Dynamic(_) => derived(lhs, range, ctx),
                _ => lhs,
            },
            _ => {
                let rhs = self.visit_expression(right, ctx);
                if lhs.is_dynamic() {
                    return derived(lhs, range, ctx);
                }
                if rhs.is_dynamic() {
                    return derived(rhs, range, ctx);
                }
                evaluate_binary(operator, &lhs, &rhs)
                    .unwrap_or_else(|| dynamic(DynamicReason::InvalidExpressionType, range, ctx))
            }
        }
    }

    fn visit_prefix(&mut self, operator: PrefixOperator, value: ResolvedValue, range: TextRange, ctx: &Context) -> ResolvedValue {
        if value.is_dynamic() {
            return derived(value, range, ctx);
        }
        match (operator, &value) {
            (PrefixOperator::Not, _) => match value.truthy() {
                Some(truthy) => ResolvedValue::Boolean(!truthy),
                None => derived(value, range, ctx),
            },
            (PrefixOperator::Minus, ResolvedValue::Number(n)) => ResolvedValue::Number(-n),
            (PrefixOperator::Plus, ResolvedValue::Number(n)) => ResolvedValue::Number(*n),
            (PrefixOperator::TypeOf, _) => ResolvedValue::String(type_of(&value).to_string()),
            _ => dynamic(DynamicReason::InvalidExpressionType, range, ctx),
        }
    }
}

fn dynamic(reason: DynamicReason, range: TextRange, ctx: &Context) -> ResolvedValue {
    ResolvedValue::Dynamic(DynamicValue::new(reason, ctx.file, range))
}

/// The value of an operation on `input`, which must be dynamic for the
/// result to be meaningful.
fn derived(input: ResolvedValue, range: TextRange, ctx: &Context) -> ResolvedValue {
    match input {
        ResolvedValue::Dynamic(input) => {
            ResolvedValue::Dynamic(DynamicValue::from_dynamic_input(input, ctx.file, range))
        }
        _ => dynamic(DynamicReason::InvalidExpressionType, range, ctx),
    }
}

fn is_bare_specifier(specifier: &str) -> bool {
    !specifier.is_empty() && !specifier.starts_with('.') && !specifier.starts_with('/')
}

fn type_of(value: &ResolvedValue) -> &'static str {
    match value {
        ResolvedValue::String(_) => "string",
        ResolvedValue::Number(_) => "number",
        ResolvedValue::Boolean(_) => "boolean",
        ResolvedValue::Undefined => "undefined",
        ResolvedValue::Reference(_) => "function",
        _ => "object",
    }
}

fn strict_equals(lhs: &ResolvedValue, rhs: &ResolvedValue) -> Option<bool> {
    use ResolvedValue::*;
    match (lhs, rhs) {
        (String(a), String(b)) => Some(a == b),
        (Number(a), Number(b)) => Some(a == b),
        (Boolean(a), Boolean(b)) => Some(a == b),
        (Null, Null) | (Undefined, Undefined) => Some(true),
        (Reference(a), Reference(b)) => Some(a == b),
        // Object identity is unknown at compile time.
        (List(_) | Map(_), _) | (_, List(_) | Map(_)) => None,
        _ => Some(false),
    }
}

fn compare(lhs: &ResolvedValue, rhs: &ResolvedValue) -> Option<std::cmp::Ordering> {
    match (lhs, rhs) {
        (ResolvedValue::Number(a), ResolvedValue::Number(b)) => a.partial_cmp(b),
        (ResolvedValue::String(a), ResolvedValue::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn evaluate_binary(operator: BinaryOperator, lhs: &ResolvedValue, rhs: &ResolvedValue) -> Option<ResolvedValue> {
    use std::cmp::Ordering;
    let numbers = || Some((lhs.as_number()?, rhs.as_number()?));
    let value = match operator {
        BinaryOperator::Plus => match (lhs, rhs) {
            (ResolvedValue::Number(a), ResolvedValue::Number(b)) => ResolvedValue::Number(a + b),
            (ResolvedValue::String(_), _) | (_, ResolvedValue::String(_)) => {
                ResolvedValue::String(format!("{}{}", lhs.to_js_string()?, rhs.to_js_string()?))
            }
            _ => return None,
        },
        BinaryOperator::Minus => numbers().map(|(a, b)| ResolvedValue::Number(a - b))?,
        BinaryOperator::Multiply => numbers().map(|(a, b)| ResolvedValue::Number(a * b))?,
        BinaryOperator::Divide => numbers().map(|(a, b)| ResolvedValue::Number(a / b))?,
        BinaryOperator::Modulo => numbers().map(|(a, b)| ResolvedValue::Number(a % b))?,
        BinaryOperator::Exponent => numbers().map(|(a, b)| ResolvedValue::Number(a.powf(b)))?,
        BinaryOperator::LeftShift => {
            numbers().map(|(a, b)| ResolvedValue::Number(((a as i32).wrapping_shl(b as u32)) as f64))?
        }
        BinaryOperator::RightShift => {
            numbers().map(|(a, b)| ResolvedValue::Number(((a as i32).wrapping_shr(b as u32)) as f64))?
        }
        BinaryOperator::UnsignedRightShift => {
            numbers().map(|(a, b)| ResolvedValue::Number(((a as i64 as u32).wrapping_shr(b as u32)) as f64))?
        }
        BinaryOperator::BitAnd => numbers().map(|(a, b)| ResolvedValue::Number(((a as i32) & (b as i32)) as f64))?,
        BinaryOperator::BitOr => numbers().map(|(a, b)| ResolvedValue::Number(((a as i32) | (b as i32)) as f64))?,
        BinaryOperator::BitXor => numbers().map(|(a, b)| ResolvedValue::Number(((a as i32) ^ (b as i32)) as f64))?,
        BinaryOperator::Less => ResolvedValue::Boolean(compare(lhs, rhs)? == Ordering::Less),
        BinaryOperator::Greater => ResolvedValue::Boolean(compare(lhs, rhs)? == Ordering::Greater),
        BinaryOperator::LessEquals => ResolvedValue::Boolean(compare(lhs, rhs)? != Ordering::Greater),
        BinaryOperator::GreaterEquals => ResolvedValue::Boolean(compare(lhs, rhs)? != Ordering::Less),
        BinaryOperator::StrictEquals => ResolvedValue::Boolean(strict_equals(lhs, rhs)?),
        BinaryOperator::StrictNotEquals => ResolvedValue::Boolean(!strict_equals(lhs, rhs)?),
        BinaryOperator::Equals | BinaryOperator::NotEquals => {
            let nullish = |v: &ResolvedValue| matches!(v, ResolvedValue::Null | ResolvedValue::Undefined);
            let equal = if nullish(lhs) || nullish(rhs) {
                nullish(lhs) && nullish(rhs)
            } else {
                strict_equals(lhs, rhs)?
            };
            ResolvedValue::Boolean(if operator == BinaryOperator::Equals { equal } else { !equal })
        }
        _ => return None,
    };
    Some(value)
}
