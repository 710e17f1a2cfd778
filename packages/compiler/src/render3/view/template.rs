//! Render3 Template
//!
//! Parses component template text into Render3 nodes and compiles the nodes
//! into template functions. A template function runs in creation mode
//! (`rf & 1`) to build the view and in update mode (`rf & 2`) to refresh its
//! bindings. Every `<ng-template>` becomes a separate function.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};

use crate::constant_pool::ConstantPool;
use crate::core::{parse_selector_to_r3_selector, selector_list_to_expression, AttributeMarker, RenderFlags};
use crate::expression_parser::ast::{self as e, ASTKind, AST};
use crate::ml_parser::html_parser::HtmlParser;
use crate::output::output_ast::{
    self as o, fn_expr, import_expr, literal, literal_arr, literal_map, null_expr, variable, BinaryOperator,
    ExternalReference, FnParam, LiteralMapEntry,
};
use crate::parse_util::{sanitize_identifier, ParseError};
use crate::render3::r3_ast::{self as t, NodeId, R3Node};
use crate::render3::r3_identifiers::Identifiers as R3;
use crate::render3::r3_template_transform::html_ast_to_render3_ast;

use super::api::R3UsedDirectiveMetadata;
use super::t2_api::TemplateEntity;
use super::t2_binder::BoundTarget;

pub const CONTEXT_NAME: &str = "ctx";
pub const RENDER_FLAGS: &str = "rf";
pub const EVENT_NAME: &str = "$event";
pub const ELEMENT_INDEX: &str = "elIndex";

const NG_TEMPLATE_TAG: &str = "ng-template";
const MAX_INTERPOLATION_ARGS: usize = 8;
const MAX_PIPE_BIND_ARGS: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseTemplateOptions {
    /// Keep whitespace-only text nodes and whitespace runs.
    pub preserve_whitespaces: bool,
}

#[derive(Debug, Clone)]
pub struct ParsedTemplate {
    pub nodes: Vec<t::R3Node>,
    /// Markup, binding and expression errors. Any error makes the template
    /// unusable.
    pub errors: Vec<ParseError>,
    /// Path of the template relative to the project root dirs.
    pub relative_context_file_path: String,
}

/// Parses `template`. `template_url` names the source in spans and errors.
pub fn parse_template(
    template: &str,
    template_url: &str,
    options: ParseTemplateOptions,
    relative_context_file_path: &str,
) -> ParsedTemplate {
    let parse_result = HtmlParser::new().parse(template, template_url, options.preserve_whitespaces);
    if !parse_result.errors.is_empty() {
        return ParsedTemplate {
            nodes: Vec::new(),
            errors: parse_result.errors,
            relative_context_file_path: relative_context_file_path.to_string(),
        };
    }

    let result = html_ast_to_render3_ast(&parse_result.root_nodes);
    ParsedTemplate {
        nodes: result.nodes,
        errors: result.errors,
        relative_context_file_path: relative_context_file_path.to_string(),
    }
}

// ============================================================================
// Template functions
// ============================================================================

/// One compiled view.
#[derive(Debug, Clone)]
pub struct TemplateFunction {
    pub function: o::Expression,
    /// Data slots of the view: nodes, local references and pipes.
    pub consts: usize,
    /// Binding slots of the view, pure function slots included.
    pub vars: usize,
}

/// View level and data slot of every local reference in a template tree.
#[derive(Debug, Default)]
pub struct ReferenceSlots {
    slots: HashMap<NodeId, (usize, usize)>,
}

impl ReferenceSlots {
    pub fn collect(nodes: &[R3Node]) -> Self {
        let mut slots = ReferenceSlots::default();
        slots.collect_view(nodes, 0);
        slots
    }

    fn collect_view(&mut self, nodes: &[R3Node], level: usize) {
        let mut next = 0;
        self.collect_nodes(nodes, level, &mut next);
    }

    fn collect_nodes(&mut self, nodes: &[R3Node], level: usize, next: &mut usize) {
        for node in nodes {
            *next += 1;
            match node {
                R3Node::Element(el) => {
                    self.collect_references(&el.references, level, next);
                    self.collect_nodes(&el.children, level, next);
                }
                R3Node::Template(tmpl) => {
                    self.collect_references(&tmpl.references, level, next);
                    self.collect_view(&tmpl.children, level + 1);
                }
                R3Node::Content(_) | R3Node::Text(_) | R3Node::BoundText(_) => {}
            }
        }
    }

    fn collect_references(&mut self, references: &[t::Reference], level: usize, next: &mut usize) {
        for reference in references {
            self.slots.insert(reference.id, (level, *next));
            *next += 1;
        }
    }

    pub fn get(&self, reference: NodeId) -> Option<(usize, usize)> {
        self.slots.get(&reference).copied()
    }
}

/// Node and reference slots of one view. Pipes are allocated after these.
fn view_slot_count(nodes: &[R3Node]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            R3Node::Element(el) => 1 + el.references.len() + view_slot_count(&el.children),
            R3Node::Template(tmpl) => 1 + tmpl.references.len(),
            R3Node::Content(_) | R3Node::Text(_) | R3Node::BoundText(_) => 1,
        })
        .sum()
}

fn instruction(reference: ExternalReference, args: Vec<o::Expression>) -> o::Statement {
    import_expr(reference).call_fn(args).to_stmt()
}

fn slot_literal(slot: usize) -> o::Expression {
    literal(slot as f64)
}

fn render_flag_check(flag: RenderFlags, statements: Vec<o::Statement>) -> o::Statement {
    o::Statement::If(o::IfStmt {
        condition: variable(RENDER_FLAGS).bitwise_and(literal(flag as u8 as f64)),
        true_case: statements,
        false_case: Vec::new(),
    })
}

fn binary_operator(operation: &str) -> Option<BinaryOperator> {
    Some(match operation {
        "+" => BinaryOperator::Plus,
        "-" => BinaryOperator::Minus,
        "*" => BinaryOperator::Multiply,
        "/" => BinaryOperator::Divide,
        "%" => BinaryOperator::Modulo,
        "==" => BinaryOperator::Equals,
        "===" => BinaryOperator::Identical,
        "!=" => BinaryOperator::NotEquals,
        "!==" => BinaryOperator::NotIdentical,
        "&&" => BinaryOperator::And,
        "||" => BinaryOperator::Or,
        "<" => BinaryOperator::Lower,
        "<=" => BinaryOperator::LowerEquals,
        ">" => BinaryOperator::Bigger,
        ">=" => BinaryOperator::BiggerEquals,
        "&" => BinaryOperator::BitwiseAnd,
        "|" => BinaryOperator::BitwiseOr,
        _ => return None,
    })
}

fn convert_literal(value: &e::LiteralValue) -> o::Expression {
    o::Expression::Literal(o::LiteralExpr {
        value: match value {
            e::LiteralValue::Null => o::LiteralValue::Null,
            e::LiteralValue::Undefined => o::LiteralValue::Undefined,
            e::LiteralValue::Bool(b) => o::LiteralValue::Bool(*b),
            e::LiteralValue::Number(n) => o::LiteralValue::Number(*n),
            e::LiteralValue::String(s) => o::LiteralValue::String(s.clone()),
        },
    })
}

/// `receiver == null ? null : access`
fn guarded(receiver: o::Expression, access: o::Expression) -> o::Expression {
    receiver
        .binary(BinaryOperator::Equals, null_expr())
        .conditional(null_expr(), Some(access))
}

/// Compiles one view of a template into its template function.
pub struct TemplateDefinitionBuilder<'b, 'a> {
    constant_pool: &'b mut ConstantPool,
    bound: &'b BoundTarget<'a, R3UsedDirectiveMetadata>,
    reference_slots: &'b ReferenceSlots,
    ng_content_selectors: &'b [String],
    level: usize,
    context_name: String,
    creation: Vec<o::Statement>,
    update: Vec<o::Statement>,
    next_slot: usize,
    next_pipe_slot: usize,
    binding_slots: usize,
    pure_function_slots: usize,
}

impl<'b, 'a> TemplateDefinitionBuilder<'b, 'a> {
    pub fn new(
        constant_pool: &'b mut ConstantPool,
        bound: &'b BoundTarget<'a, R3UsedDirectiveMetadata>,
        reference_slots: &'b ReferenceSlots,
        ng_content_selectors: &'b [String],
        level: usize,
        context_name: &str,
    ) -> Self {
        TemplateDefinitionBuilder {
            constant_pool,
            bound,
            reference_slots,
            ng_content_selectors,
            level,
            context_name: context_name.to_string(),
            creation: Vec::new(),
            update: Vec::new(),
            next_slot: 0,
            next_pipe_slot: 0,
            binding_slots: 0,
            pure_function_slots: 0,
        }
    }

    /// Builds `function <context>_Template(rf, ctx)`. Nested views are
    /// declared as functions in the constant pool.
    pub fn build(mut self, nodes: &'a [R3Node], has_ng_content: bool) -> Result<TemplateFunction> {
        self.next_pipe_slot = view_slot_count(nodes);
        if has_ng_content {
            let projection_def = self.projection_def_args();
            self.creation.push(instruction(R3::projection_def(), projection_def));
        }
        for node in nodes {
            self.visit_node(node)?;
        }

        let name = format!("{}_Template", self.context_name);
        let function = self.finish(vec![FnParam::new(RENDER_FLAGS), FnParam::new(CONTEXT_NAME)], name);
        Ok(TemplateFunction {
            function,
            consts: self.next_pipe_slot,
            vars: self.binding_slots + self.pure_function_slots,
        })
    }

    /// Builds `function <context>_HostBindings(rf, ctx, elIndex)` from
    /// parsed host listeners and property bindings. Returns the function and
    /// the number of binding slots it needs on the host.
    pub fn build_host_bindings(
        mut self,
        listeners: &'a [(String, AST)],
        properties: &'a [(String, AST)],
    ) -> Result<(o::Expression, usize)> {
        for (event, handler) in listeners {
            let function_name = sanitize_identifier(&format!("{}_{}_HostBindingHandler", self.context_name, event));
            let statements = self.convert_action(handler)?;
            let handler = fn_expr(vec![FnParam::new(EVENT_NAME)], statements, Some(function_name));
            self.creation
                .push(instruction(R3::listener(), vec![literal(event.as_str()), handler]));
        }
        for (name, value) in properties {
            if contains_pipe(value) {
                bail!("Host binding expression cannot contain pipes: [{}]", name);
            }
            let value = self.convert_binding(value)?;
            let (reference, name) = host_property_instruction(name);
            self.update.push(instruction(
                reference,
                vec![variable(ELEMENT_INDEX), literal(name), value],
            ));
        }

        let name = format!("{}_HostBindings", self.context_name);
        let function = self.finish(
            vec![
                FnParam::new(RENDER_FLAGS),
                FnParam::new(CONTEXT_NAME),
                FnParam::new(ELEMENT_INDEX),
            ],
            name,
        );
        Ok((function, self.binding_slots))
    }

    fn finish(&mut self, params: Vec<FnParam>, name: String) -> o::Expression {
        let mut statements = Vec::new();
        if !self.creation.is_empty() {
            statements.push(render_flag_check(RenderFlags::Create, std::mem::take(&mut self.creation)));
        }
        if !self.update.is_empty() {
            statements.push(render_flag_check(RenderFlags::Update, std::mem::take(&mut self.update)));
        }
        fn_expr(params, statements, Some(name))
    }

    fn projection_def_args(&mut self) -> Vec<o::Expression> {
        if self.ng_content_selectors.is_empty() {
            return Vec::new();
        }
        let r3_selectors = literal_arr(
            self.ng_content_selectors
                .iter()
                .map(|selector| selector_list_to_expression(&parse_selector_to_r3_selector(Some(selector))))
                .collect(),
        );
        let text_selectors = literal_arr(self.ng_content_selectors.iter().map(|s| literal(s.as_str())).collect());
        vec![
            self.constant_pool.get_const_literal(r3_selectors, true),
            self.constant_pool.get_const_literal(text_selectors, true),
        ]
    }

    fn allocate_slot(&mut self) -> usize {
        let slot = self.next_slot;
        self.next_slot += 1;
        slot
    }

    fn visit_node(&mut self, node: &'a R3Node) -> Result<()> {
        match node {
            R3Node::Element(el) => self.visit_element(el),
            R3Node::Template(tmpl) => self.visit_template(tmpl),
            R3Node::Content(content) => {
                self.visit_content(content);
                Ok(())
            }
            R3Node::Text(text) => {
                let slot = self.allocate_slot();
                self.creation
                    .push(instruction(R3::text(), vec![slot_literal(slot), literal(text.value.as_str())]));
                Ok(())
            }
            R3Node::BoundText(text) => {
                let slot = self.allocate_slot();
                self.creation.push(instruction(R3::text(), vec![slot_literal(slot)]));
                let value = self.convert(&text.value, false)?;
                self.update.push(instruction(R3::text_binding(), vec![slot_literal(slot), value]));
                Ok(())
            }
        }
    }

    fn visit_element(&mut self, el: &'a t::Element) -> Result<()> {
        let slot = self.allocate_slot();
        self.next_slot += el.references.len();

        let mut args = vec![slot_literal(slot), literal(el.name.as_str())];
        let attrs = self.attributes_param(&el.attributes, &el.inputs, &el.outputs);
        let refs = self.local_refs_param(&el.references);
        push_trailing_params(&mut args, attrs, refs);
        self.creation.push(instruction(R3::element_start(), args));

        self.add_listeners(&el.name, slot, &el.outputs)?;
        self.add_property_bindings(slot, &el.inputs)?;
        for child in &el.children {
            self.visit_node(child)?;
        }
        self.creation.push(instruction(R3::element_end(), Vec::new()));
        Ok(())
    }

    fn visit_template(&mut self, tmpl: &'a t::Template) -> Result<()> {
        let slot = self.allocate_slot();
        self.next_slot += tmpl.references.len();

        let context_name = sanitize_identifier(&format!("{}_{}_{}", self.context_name, tmpl.tag_name, slot));
        let level = self.bound.get_nesting_level(tmpl.id);
        let view = TemplateDefinitionBuilder::new(
            &mut *self.constant_pool,
            self.bound,
            self.reference_slots,
            self.ng_content_selectors,
            level,
            &context_name,
        )
        .build(&tmpl.children, false)?;

        let function_name = format!("{}_Template", context_name);
        let declaration = match view.function {
            o::Expression::Fn(function) => o::Statement::DeclareFn(o::DeclareFunctionStmt {
                name: function_name.clone(),
                params: function.params,
                statements: function.statements,
                type_: None,
                modifiers: Vec::new(),
            }),
            other => other.to_declare(function_name.clone()),
        };
        self.constant_pool.statements.push(declaration);

        let tag_name = if tmpl.tag_name == NG_TEMPLATE_TAG {
            null_expr()
        } else {
            literal(tmpl.tag_name.as_str())
        };
        let mut args = vec![
            slot_literal(slot),
            variable(function_name),
            slot_literal(view.consts),
            slot_literal(view.vars),
            tag_name,
        ];
        let attrs = self.attributes_param(&tmpl.attributes, &tmpl.inputs, &tmpl.outputs);
        let refs = self.local_refs_param(&tmpl.references);
        push_trailing_params(&mut args, attrs, refs);
        self.creation.push(instruction(R3::template_create(), args));

        self.add_listeners(&tmpl.tag_name, slot, &tmpl.outputs)?;
        self.add_property_bindings(slot, &tmpl.inputs)
    }

    fn visit_content(&mut self, content: &t::Content) {
        let slot = self.allocate_slot();
        let index = if content.selector == "*" {
            0
        } else {
            self.ng_content_selectors
                .iter()
                .position(|s| *s == content.selector)
                .map_or(0, |i| i + 1)
        };
        let attrs: Vec<o::Expression> = content
            .attributes
            .iter()
            .filter(|a| a.name != "select")
            .flat_map(|a| [literal(a.name.as_str()), literal(a.value.as_str())])
            .collect();

        let mut args = vec![slot_literal(slot)];
        if index > 0 || !attrs.is_empty() {
            args.push(slot_literal(index));
        }
        if !attrs.is_empty() {
            args.push(self.constant_pool.get_const_literal(literal_arr(attrs), true));
        }
        self.creation.push(instruction(R3::projection(), args));
    }

    /// Static attributes followed by the names of bound properties and
    /// events, which only take part in directive matching.
    fn attributes_param(
        &mut self,
        attributes: &[t::TextAttribute],
        inputs: &[t::BoundAttribute],
        outputs: &[t::BoundEvent],
    ) -> Option<o::Expression> {
        let mut attrs: Vec<o::Expression> = attributes
            .iter()
            .flat_map(|a| [literal(a.name.as_str()), literal(a.value.as_str())])
            .collect();
        let select_only: Vec<&str> = inputs
            .iter()
            .filter(|input| input.type_ == t::BindingType::Property)
            .map(|input| input.name.as_str())
            .chain(outputs.iter().filter(|o| o.target.is_none()).map(|o| o.name.as_str()))
            .collect();
        if !select_only.is_empty() {
            attrs.push(literal(AttributeMarker::SelectOnly as u8 as f64));
            attrs.extend(select_only.into_iter().map(literal));
        }
        if attrs.is_empty() {
            None
        } else {
            Some(self.constant_pool.get_const_literal(literal_arr(attrs), true))
        }
    }

    /// `["name", "exportAs", ...]`, with `""` for references without a value.
    fn local_refs_param(&mut self, references: &[t::Reference]) -> Option<o::Expression> {
        if references.is_empty() {
            return None;
        }
        let refs = references
            .iter()
            .flat_map(|r| [literal(r.name.as_str()), literal(r.value.as_str())])
            .collect();
        Some(self.constant_pool.get_const_literal(literal_arr(refs), true))
    }

    fn add_listeners(&mut self, tag_name: &str, slot: usize, outputs: &'a [t::BoundEvent]) -> Result<()> {
        for output in outputs {
            let function_name = sanitize_identifier(&format!(
                "{}_{}_{}_{}_listener",
                self.context_name, tag_name, output.name, slot
            ));
            let statements = self.convert_action(&output.handler)?;
            let handler = fn_expr(vec![FnParam::new(EVENT_NAME)], statements, Some(function_name));
            self.creation
                .push(instruction(R3::listener(), vec![literal(output.name.as_str()), handler]));
        }
        Ok(())
    }

    fn add_property_bindings(&mut self, slot: usize, inputs: &'a [t::BoundAttribute]) -> Result<()> {
        for input in inputs {
            let value = self.convert_binding(&input.value)?;
            let reference = match input.type_ {
                t::BindingType::Property => R3::element_property(),
                t::BindingType::Attribute => R3::element_attribute(),
                t::BindingType::Class => R3::element_class_prop(),
                t::BindingType::Style => R3::element_style_prop(),
            };
            let mut args = vec![slot_literal(slot), literal(input.name.as_str()), value];
            if let (t::BindingType::Style, Some(unit)) = (input.type_, &input.unit) {
                args.push(literal(unit.as_str()));
            }
            self.update.push(instruction(reference, args));
        }
        Ok(())
    }

    /// Interpolations bind their own slots. Anything else goes through `ɵbind`.
    fn convert_binding(&mut self, value: &'a AST) -> Result<o::Expression> {
        if matches!(value.kind, ASTKind::Interpolation { .. }) {
            return self.convert(value, false);
        }
        let converted = self.convert(value, false)?;
        self.binding_slots += 1;
        Ok(import_expr(R3::bind()).call_fn(vec![converted]))
    }

    /// Statements of a listener. The last expression is returned so that a
    /// `false` result prevents the default action.
    fn convert_action(&mut self, handler: &'a AST) -> Result<Vec<o::Statement>> {
        let expressions: Vec<&'a AST> = match &handler.kind {
            ASTKind::Chain(items) => items.iter().collect(),
            ASTKind::EmptyExpr => Vec::new(),
            _ => vec![handler],
        };
        let last = expressions.len().saturating_sub(1);
        let mut statements = Vec::with_capacity(expressions.len());
        for (i, expression) in expressions.into_iter().enumerate() {
            let converted = self.convert(expression, true)?;
            statements.push(if i == last {
                converted.to_return()
            } else {
                converted.to_stmt()
            });
        }
        Ok(statements)
    }

    /// The context of the view at `level`, reached from this view.
    fn context_at(&self, level: usize) -> o::Expression {
        if level >= self.level {
            return variable(CONTEXT_NAME);
        }
        let distance = self.level - level;
        let args = if distance == 1 {
            Vec::new()
        } else {
            vec![slot_literal(distance)]
        };
        import_expr(R3::next_context()).call_fn(args)
    }

    fn implicit_receiver(&self) -> o::Expression {
        self.context_at(0)
    }

    fn read_entity(&self, entity: TemplateEntity<'a>) -> Result<o::Expression> {
        match entity {
            TemplateEntity::Variable(var) => {
                let owner = self
                    .bound
                    .get_template_of_symbol(entity)
                    .map_or(0, |tmpl| self.bound.get_nesting_level(tmpl.id));
                Ok(self.context_at(owner).prop(var.value.as_str()))
            }
            TemplateEntity::Reference(reference) => {
                let (level, slot) = self
                    .reference_slots
                    .get(reference.id)
                    .ok_or_else(|| anyhow!("Unknown local reference '{}'", reference.name))?;
                let read = import_expr(R3::reference()).call_fn(vec![slot_literal(slot)]);
                if level == self.level {
                    Ok(read)
                } else {
                    Ok(o::Expression::Comma(o::CommaExpr {
                        parts: vec![self.context_at(level), read],
                    }))
                }
            }
        }
    }

    fn convert_all(&mut self, asts: &'a [AST], in_action: bool) -> Result<Vec<o::Expression>> {
        asts.iter().map(|ast| self.convert(ast, in_action)).collect()
    }

    fn convert(&mut self, ast: &'a AST, in_action: bool) -> Result<o::Expression> {
        Ok(match &ast.kind {
            ASTKind::EmptyExpr => o::undefined_expr(),
            ASTKind::ImplicitReceiver => self.implicit_receiver(),
            ASTKind::Chain(_) => bail!("Expression chains are only allowed in event handlers"),
            ASTKind::Conditional {
                condition,
                true_exp,
                false_exp,
            } => {
                let condition = self.convert(condition, in_action)?;
                let true_case = self.convert(true_exp, in_action)?;
                let false_case = self.convert(false_exp, in_action)?;
                condition.conditional(true_case, Some(false_case))
            }
            ASTKind::PropertyRead(read) | ASTKind::SafePropertyRead(read) if read.receiver.is_implicit_receiver() => {
                if let Some(entity) = self.bound.get_expression_target(ast) {
                    return self.read_entity(entity);
                }
                if in_action && read.name == EVENT_NAME {
                    return Ok(variable(EVENT_NAME));
                }
                self.implicit_receiver().prop(read.name.as_str())
            }
            ASTKind::PropertyRead(read) => self.convert(&read.receiver, in_action)?.prop(read.name.as_str()),
            ASTKind::SafePropertyRead(read) => {
                let receiver = self.convert(&read.receiver, in_action)?;
                let access = receiver.prop(read.name.as_str());
                guarded(receiver, access)
            }
            ASTKind::PropertyWrite(write) => {
                let receiver = if write.receiver.is_implicit_receiver() {
                    if self.bound.get_expression_target(ast).is_some() {
                        bail!("Cannot assign to a reference or variable '{}'", write.name);
                    }
                    self.implicit_receiver()
                } else {
                    self.convert(&write.receiver, in_action)?
                };
                let value = self.convert(&write.value, in_action)?;
                receiver.set_prop(write.name.as_str(), value)
            }
            ASTKind::KeyedRead(read) => {
                let receiver = self.convert(&read.obj, in_action)?;
                receiver.key(self.convert(&read.key, in_action)?)
            }
            ASTKind::KeyedWrite(write) => {
                let receiver = self.convert(&write.obj, in_action)?;
                let key = self.convert(&write.key, in_action)?;
                receiver.set_key(key, self.convert(&write.value, in_action)?)
            }
            ASTKind::MethodCall(call) if call.receiver.is_implicit_receiver() => {
                let args = self.convert_all(&call.args, in_action)?;
                match self.bound.get_expression_target(ast) {
                    Some(entity) => self.read_entity(entity)?.call_fn(args),
                    None => self.implicit_receiver().prop(call.name.as_str()).call_fn(args),
                }
            }
            ASTKind::MethodCall(call) => {
                let receiver = self.convert(&call.receiver, in_action)?;
                receiver.prop(call.name.as_str()).call_fn(self.convert_all(&call.args, in_action)?)
            }
            ASTKind::SafeMethodCall(call) => {
                let receiver = self.convert(&call.receiver, in_action)?;
                let args = self.convert_all(&call.args, in_action)?;
                let access = receiver.prop(call.name.as_str()).call_fn(args);
                guarded(receiver, access)
            }
            ASTKind::FunctionCall { target, args } => {
                let target = self.convert(target, in_action)?;
                target.call_fn(self.convert_all(args, in_action)?)
            }
            ASTKind::BindingPipe(pipe) => self.convert_pipe(pipe, in_action)?,
            ASTKind::LiteralPrimitive(value) => convert_literal(value),
            ASTKind::LiteralArray(items) => literal_arr(self.convert_all(items, in_action)?),
            ASTKind::LiteralMap { keys, values } => {
                let values = self.convert_all(values, in_action)?;
                literal_map(
                    keys.iter()
                        .zip(values)
                        .map(|(key, value)| LiteralMapEntry::new(key.key.clone(), value, key.quoted))
                        .collect(),
                )
            }
            ASTKind::Interpolation { strings, expressions } => {
                self.convert_interpolation(strings, expressions, in_action)?
            }
            ASTKind::Binary {
                operation,
                left,
                right,
            } => {
                let operator =
                    binary_operator(operation).ok_or_else(|| anyhow!("Unsupported operation {}", operation))?;
                let lhs = self.convert(left, in_action)?;
                lhs.binary(operator, self.convert(right, in_action)?)
            }
            ASTKind::PrefixNot(expression) => o::not(self.convert(expression, in_action)?),
            ASTKind::NonNullAssert(expression) => o::Expression::AssertNotNull(o::AssertNotNullExpr {
                condition: Box::new(self.convert(expression, in_action)?),
            }),
        })
    }

    fn convert_interpolation(
        &mut self,
        strings: &[String],
        expressions: &'a [AST],
        in_action: bool,
    ) -> Result<o::Expression> {
        let mut args = Vec::with_capacity(strings.len() + expressions.len());
        for (i, expression) in expressions.iter().enumerate() {
            args.push(literal(strings.get(i).map_or("", String::as_str)));
            args.push(self.convert(expression, in_action)?);
        }
        args.push(literal(strings.get(expressions.len()).map_or("", String::as_str)));
        self.binding_slots += expressions.len();

        let count = expressions.len();
        Ok(if (1..=MAX_INTERPOLATION_ARGS).contains(&count) {
            import_expr(R3::interpolation(count)).call_fn(args)
        } else {
            import_expr(R3::interpolation_v()).call_fn(vec![literal_arr(args)])
        })
    }

    /// `ɵpipe(slot, name)` in creation mode and `ɵpipeBindN(slot, offset, ...)`
    /// in place of the expression.
    fn convert_pipe(&mut self, pipe: &'a e::BindingPipe, in_action: bool) -> Result<o::Expression> {
        let slot = self.next_pipe_slot;
        self.next_pipe_slot += 1;
        self.creation
            .push(instruction(R3::pipe(), vec![slot_literal(slot), literal(pipe.name.as_str())]));

        let mut args = vec![self.convert(&pipe.exp, in_action)?];
        args.extend(self.convert_all(&pipe.args, in_action)?);
        let offset = self.pure_function_slots;
        self.pure_function_slots += 1 + args.len();

        let arg_count = args.len();
        let mut call_args = vec![slot_literal(slot), slot_literal(offset)];
        if arg_count <= MAX_PIPE_BIND_ARGS {
            call_args.extend(args);
        } else {
            call_args.push(literal_arr(args));
        }
        Ok(import_expr(R3::pipe_bind(arg_count)).call_fn(call_args))
    }
}

fn contains_pipe(ast: &AST) -> bool {
    let mut found = false;
    ast.walk(&mut |node| found |= matches!(node.kind, ASTKind::BindingPipe(_)));
    found
}

/// `[attr.x]`, `[class.x]` and `[style.x]` host keys select their own
/// instructions. Anything else is a DOM property.
fn host_property_instruction(name: &str) -> (ExternalReference, &str) {
    if let Some(attr) = name.strip_prefix("attr.") {
        (R3::element_attribute(), attr)
    } else if let Some(class) = name.strip_prefix("class.") {
        (R3::element_class_prop(), class)
    } else if let Some(style) = name.strip_prefix("style.") {
        (R3::element_style_prop(), style)
    } else {
        (R3::element_property(), name)
    }
}

/// Attributes are only passed when present, or as `null` ahead of references.
fn push_trailing_params(args: &mut Vec<o::Expression>, attrs: Option<o::Expression>, refs: Option<o::Expression>) {
    match (attrs, refs) {
        (attrs, Some(refs)) => {
            args.push(attrs.unwrap_or_else(null_expr));
            args.push(refs);
        }
        (Some(attrs), None) => args.push(attrs),
        (None, None) => {}
    }
}
