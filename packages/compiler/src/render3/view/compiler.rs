//! Render3 View Compiler
//!
//! Compiles directive, component and base definitions from their metadata
//! into `ɵdefineDirective`, `ɵdefineComponent` and `ɵdefineBase` calls, plus
//! the typed `ɵ*DefWithMeta` declarations written to `.d.ts` files.

use anyhow::{bail, Result};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constant_pool::ConstantPool;
use crate::core::{parse_selector_to_r3_selector, selector_list_to_expression, ViewEncapsulation};
use crate::expression_parser::{Parser, AST};
use crate::output::output_ast::{
    expression_type, fn_expr, import_expr, literal, literal_arr, literal_map, none_type, Expression,
    LiteralMapEntry, Statement, Type,
};
use crate::parse_util::sanitize_identifier;
use crate::render3::r3_factory::{compile_factory_function, R3FactoryKind, R3FactoryMetadata, R3FactoryTarget};
use crate::render3::r3_identifiers::Identifiers as R3;
use crate::render3::util::{type_with_parameters, DefinitionMap, R3CompiledExpression};

use super::api::{
    R3BaseRefMetadata, R3ComponentMetadata, R3DirectiveMetadata, R3HostMetadata, R3UsedDirectiveMetadata,
};
use super::query_generation::{create_content_queries_function, create_view_queries_function};
use super::t2_api::Target;
use super::t2_binder::R3TargetBinder;
use super::template::{ReferenceSlots, TemplateDefinitionBuilder};

/// `[prop]` or `(event)` keys of a `host` map.
static HOST_KEY_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\[([^\]]+)\]|\(([^\)]+)\))$").unwrap());

/// Compile a directive for the render3 runtime.
pub fn compile_directive_from_metadata(
    meta: &R3DirectiveMetadata,
    constant_pool: &mut ConstantPool,
) -> Result<R3CompiledExpression> {
    let (mut definition_map, statements) = base_directive_fields(meta, constant_pool, R3FactoryTarget::Directive)?;
    add_features(&mut definition_map, meta);

    let expression = import_expr(R3::define_directive()).call_fn(vec![definition_map.to_literal_map()]);
    Ok(R3CompiledExpression::new(expression, create_directive_type(meta), statements))
}

/// Compile a component for the render3 runtime.
pub fn compile_component_from_metadata(
    meta: &R3ComponentMetadata,
    constant_pool: &mut ConstantPool,
) -> Result<R3CompiledExpression> {
    let directive = &meta.directive;
    let (mut definition_map, statements) =
        base_directive_fields(directive, constant_pool, R3FactoryTarget::Component)?;

    if !meta.view_queries.is_empty() {
        definition_map.set(
            "viewQuery",
            Some(create_view_queries_function(&meta.view_queries, constant_pool, &directive.name)),
        );
    }

    let bound = R3TargetBinder::from_directives(meta.directives.iter().cloned()).bind(Target {
        template: &meta.template.nodes,
    });
    let reference_slots = ReferenceSlots::collect(&meta.template.nodes);
    let context_name = sanitize_identifier(&directive.name);
    let template = TemplateDefinitionBuilder::new(
        constant_pool,
        &bound,
        &reference_slots,
        &meta.template.ng_content_selectors,
        0,
        &context_name,
    )
    .build(&meta.template.nodes, meta.template.has_ng_content)?;

    definition_map.set("consts", Some(literal(template.consts as f64)));
    definition_map.set("vars", Some(literal(template.vars as f64)));
    definition_map.set("template", Some(template.function));

    let directives: Vec<Expression> = bound
        .get_used_directives()
        .into_iter()
        .map(|dir: R3UsedDirectiveMetadata| dir.expression)
        .collect();
    if !directives.is_empty() {
        definition_map.set(
            "directives",
            Some(declaration_list(directives, meta.wrap_directives_and_pipes_in_closure)),
        );
    }

    let pipes: Vec<Expression> = bound
        .get_used_pipes()
        .iter()
        .filter_map(|name| meta.pipes.get(name).cloned())
        .collect();
    if !pipes.is_empty() {
        definition_map.set(
            "pipes",
            Some(declaration_list(pipes, meta.wrap_directives_and_pipes_in_closure)),
        );
    }

    if !meta.styles.is_empty() {
        definition_map.set(
            "styles",
            Some(literal_arr(meta.styles.iter().map(|s| literal(s.as_str())).collect())),
        );
    }
    if meta.encapsulation != ViewEncapsulation::Emulated {
        definition_map.set("encapsulation", Some(literal(meta.encapsulation as u8 as f64)));
    }
    if let Some(animations) = &meta.animations {
        definition_map.set(
            "data",
            Some(literal_map(vec![LiteralMapEntry::new("animation", animations.clone(), false)])),
        );
    }

    add_features(&mut definition_map, directive);

    let expression = import_expr(R3::define_component()).call_fn(vec![definition_map.to_literal_map()]);
    Ok(R3CompiledExpression::new(expression, create_component_type(meta), statements))
}

/// `ɵdefineBase({inputs, outputs})` for undecorated base classes that declare
/// `@Input` or `@Output` members.
pub fn compile_base_def_from_metadata(meta: &R3BaseRefMetadata) -> R3CompiledExpression {
    let mut definition_map = DefinitionMap::new();
    definition_map.set("inputs", input_map(&meta.inputs));
    definition_map.set("outputs", string_map(&meta.outputs));

    let expression = import_expr(R3::define_base()).call_fn(vec![definition_map.to_literal_map()]);
    let type_ = expression_type(import_expr(R3::base_def()), None);
    R3CompiledExpression::new(expression, type_, Vec::new())
}

/// Fields shared by directives and components, and the statements the
/// factory needs next to the class.
fn base_directive_fields(
    meta: &R3DirectiveMetadata,
    constant_pool: &mut ConstantPool,
    target: R3FactoryTarget,
) -> Result<(DefinitionMap, Vec<Statement>)> {
    let mut definition_map = DefinitionMap::new();
    definition_map.set("type", Some(meta.type_.clone()));
    definition_map.set(
        "selectors",
        Some(selector_list_to_expression(&parse_selector_to_r3_selector(meta.selector.as_deref()))),
    );

    let factory = compile_factory_function(&R3FactoryMetadata {
        name: meta.name.clone(),
        type_: meta.type_.clone(),
        target,
        kind: R3FactoryKind::Constructor { deps: meta.deps.clone() },
    });
    definition_map.set("factory", Some(factory.factory));

    if !meta.queries.is_empty() {
        definition_map.set(
            "contentQueries",
            Some(create_content_queries_function(&meta.queries, constant_pool, &meta.name)),
        );
    }

    if let Some((host_bindings, host_vars)) = create_host_bindings_function(meta, constant_pool)? {
        definition_map.set("hostBindings", Some(host_bindings));
        if host_vars > 0 {
            definition_map.set("hostVars", Some(literal(host_vars as f64)));
        }
    }
    if !meta.host.attributes.is_empty() {
        let attributes = meta
            .host
            .attributes
            .iter()
            .flat_map(|(name, value)| [literal(name.as_str()), value.clone()])
            .collect();
        definition_map.set("attributes", Some(literal_arr(attributes)));
    }

    definition_map.set("inputs", input_map(&meta.inputs));
    definition_map.set("outputs", string_map(&meta.outputs));
    if let Some(export_as) = &meta.export_as {
        definition_map.set("exportAs", Some(literal(export_as.as_str())));
    }

    Ok((definition_map, factory.statements))
}

fn add_features(definition_map: &mut DefinitionMap, meta: &R3DirectiveMetadata) {
    let mut features = Vec::new();
    if let Some(providers) = &meta.providers {
        features.push(import_expr(R3::providers_feature()).call_fn(vec![providers.clone()]));
    }
    if meta.uses_inheritance {
        features.push(import_expr(R3::inherit_definition_feature()));
    }
    if meta.lifecycle.uses_on_changes {
        features.push(import_expr(R3::ng_on_changes_feature()));
    }
    if !features.is_empty() {
        definition_map.set("features", Some(literal_arr(features)));
    }
}

/// `{field: "publicName"}`, or `None` when there are no inputs.
fn input_map(inputs: &IndexMap<String, (String, String)>) -> Option<Expression> {
    let public: IndexMap<String, String> = inputs
        .iter()
        .map(|(field, (binding, _))| (field.clone(), binding.clone()))
        .collect();
    string_map(&public)
}

fn string_map(map: &IndexMap<String, String>) -> Option<Expression> {
    crate::render3::util::conditionally_create_map_object_literal(map)
}

/// An array, or `function () { return [...]; }` when some entries are
/// declared after the component.
fn declaration_list(entries: Vec<Expression>, wrap_in_closure: bool) -> Expression {
    let list = literal_arr(entries);
    if wrap_in_closure {
        fn_expr(Vec::new(), vec![list.to_return()], None)
    } else {
        list
    }
}

fn create_host_bindings_function(
    meta: &R3DirectiveMetadata,
    constant_pool: &mut ConstantPool,
) -> Result<Option<(Expression, usize)>> {
    if meta.host.listeners.is_empty() && meta.host.properties.is_empty() {
        return Ok(None);
    }

    let parser = Parser::new();
    let location = format!("{} host bindings", meta.name);
    let mut listeners: Vec<(String, AST)> = Vec::with_capacity(meta.host.listeners.len());
    for (event, handler) in &meta.host.listeners {
        let parsed = parser.parse_action(handler, &location, 0);
        if let Some(error) = parsed.errors.first() {
            bail!("{}", error.message);
        }
        listeners.push((event.clone(), parsed.ast));
    }
    let mut properties: Vec<(String, AST)> = Vec::with_capacity(meta.host.properties.len());
    for (name, binding) in &meta.host.properties {
        let parsed = parser.parse_binding(binding, &location, 0);
        if let Some(error) = parsed.errors.first() {
            bail!("{}", error.message);
        }
        properties.push((name.clone(), parsed.ast));
    }

    let bound = R3TargetBinder::<R3UsedDirectiveMetadata>::from_directives(Vec::new()).bind(Target { template: &[] });
    let reference_slots = ReferenceSlots::default();
    let builder = TemplateDefinitionBuilder::new(
        constant_pool,
        &bound,
        &reference_slots,
        &[],
        0,
        &sanitize_identifier(&meta.name),
    );
    builder.build_host_bindings(&listeners, &properties).map(Some)
}

/// Splits a `host` map into static attributes, `[property]` bindings and
/// `(event)` listeners.
pub fn parse_host_bindings(host: &IndexMap<String, String>) -> R3HostMetadata {
    let mut metadata = R3HostMetadata::default();
    for (key, value) in host {
        match HOST_KEY_REGEX.captures(key) {
            Some(captures) => {
                if let Some(property) = captures.get(1) {
                    metadata.properties.insert(property.as_str().to_string(), value.clone());
                } else if let Some(event) = captures.get(2) {
                    metadata.listeners.insert(event.as_str().to_string(), value.clone());
                }
            }
            None => {
                metadata.attributes.insert(key.clone(), literal(value.as_str()));
            }
        }
    }
    metadata
}

// ============================================================================
// Definition types
// ============================================================================

fn string_literal_type(value: &str) -> Type {
    expression_type(literal(value), None)
}

fn string_map_type(map: &IndexMap<String, String>) -> Type {
    expression_type(
        literal_map(
            map.iter()
                .map(|(key, value)| LiteralMapEntry::new(key.clone(), literal(value.as_str()), true))
                .collect(),
        ),
        None,
    )
}

fn string_array_type(values: &[String]) -> Type {
    expression_type(literal_arr(values.iter().map(|v| literal(v.as_str())).collect()), None)
}

/// `<T, "selector", "exportAs" | never, {inputs}, {outputs}, ["queries"]>`
fn directive_type_params(meta: &R3DirectiveMetadata) -> Vec<Type> {
    let selector = meta.selector.as_deref().map(|s| s.replace('\n', ""));
    let inputs: IndexMap<String, String> = meta
        .inputs
        .iter()
        .map(|(field, (binding, _))| (field.clone(), binding.clone()))
        .collect();
    let queries: Vec<String> = meta.queries.iter().map(|q| q.property_name.clone()).collect();
    vec![
        type_with_parameters(meta.type_.clone(), meta.type_argument_count),
        selector.as_deref().map_or_else(none_type, string_literal_type),
        meta.export_as.as_deref().map_or_else(none_type, string_literal_type),
        string_map_type(&inputs),
        string_map_type(&meta.outputs),
        string_array_type(&queries),
    ]
}

pub fn create_directive_type(meta: &R3DirectiveMetadata) -> Type {
    expression_type(import_expr(R3::directive_def_with_meta()), Some(directive_type_params(meta)))
}

pub fn create_component_type(meta: &R3ComponentMetadata) -> Type {
    expression_type(
        import_expr(R3::component_def_with_meta()),
        Some(directive_type_params(&meta.directive)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::output_ast::{variable, Expression as E};
    use crate::render3::view::api::{R3ComponentTemplate, R3LifecycleMetadata};
    use crate::render3::view::template::{parse_template, ParseTemplateOptions};

    fn directive(name: &str, selector: &str) -> R3DirectiveMetadata {
        R3DirectiveMetadata {
            name: name.into(),
            type_: variable(name),
            type_argument_count: 0,
            deps: Some(Vec::new()),
            selector: Some(selector.into()),
            queries: Vec::new(),
            host: R3HostMetadata::default(),
            lifecycle: R3LifecycleMetadata::default(),
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            uses_inheritance: false,
            export_as: None,
            providers: None,
        }
    }

    fn definition(expression: &Expression) -> Vec<(String, Expression)> {
        let E::InvokeFn(call) = expression else {
            panic!("expected define call");
        };
        let E::LiteralMap(map) = &call.args[0] else {
            panic!("expected definition map");
        };
        map.entries.iter().map(|e| (e.key.clone(), e.value.clone())).collect()
    }

    fn keys(expression: &Expression) -> Vec<String> {
        definition(expression).into_iter().map(|(key, _)| key).collect()
    }

    fn field(expression: &Expression, key: &str) -> Expression {
        definition(expression)
            .into_iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
            .unwrap_or_else(|| panic!("no field {}", key))
    }

    #[test]
    fn should_compile_a_directive_definition() {
        let mut meta = directive("Dir", "[dir]");
        meta.inputs
            .insert("value".into(), ("dirValue".into(), "value".into()));
        meta.outputs.insert("changed".into(), "dirChanged".into());
        meta.export_as = Some("dir".into());
        meta.lifecycle.uses_on_changes = true;

        let mut pool = ConstantPool::new();
        let compiled = compile_directive_from_metadata(&meta, &mut pool).unwrap();
        assert_eq!(
            keys(&compiled.expression),
            vec!["type", "selectors", "factory", "inputs", "outputs", "exportAs", "features"]
        );
        assert_eq!(
            field(&compiled.expression, "selectors"),
            literal_arr(vec![literal_arr(vec![literal(""), literal("dir"), literal("")])])
        );
        assert_eq!(
            field(&compiled.expression, "features"),
            literal_arr(vec![import_expr(R3::ng_on_changes_feature())])
        );
        let E::LiteralMap(inputs) = field(&compiled.expression, "inputs") else {
            panic!("expected inputs map");
        };
        assert_eq!(inputs.entries[0].key, "value");
        assert_eq!(inputs.entries[0].value, literal("dirValue"));
    }

    #[test]
    fn should_type_directive_definitions_with_metadata() {
        let mut meta = directive("Dir", "[dir]");
        meta.inputs.insert("value".into(), ("value".into(), "value".into()));
        let Type::Expression(ty) = create_directive_type(&meta) else {
            panic!("expected expression type");
        };
        let params = ty.type_params.unwrap();
        assert_eq!(params.len(), 6);
        assert_eq!(params[1], string_literal_type("[dir]"));
        assert_eq!(params[2], none_type());
    }

    #[test]
    fn should_compile_host_bindings() {
        let mut host = IndexMap::new();
        host.insert("role".to_string(), "button".to_string());
        host.insert("(click)".to_string(), "onClick($event)".to_string());
        host.insert("[attr.aria-label]".to_string(), "label".to_string());
        let mut meta = directive("Dir", "[dir]");
        meta.host = parse_host_bindings(&host);
        assert_eq!(meta.host.listeners["click"], "onClick($event)");

        let mut pool = ConstantPool::new();
        let compiled = compile_directive_from_metadata(&meta, &mut pool).unwrap();
        assert_eq!(field(&compiled.expression, "hostVars"), literal(1.0));
        assert_eq!(
            field(&compiled.expression, "attributes"),
            literal_arr(vec![literal("role"), literal("button")])
        );
        let E::Fn(function) = field(&compiled.expression, "hostBindings") else {
            panic!("expected host bindings function");
        };
        assert_eq!(function.name.as_deref(), Some("Dir_HostBindings"));
        assert_eq!(function.params.len(), 3);
    }

    #[test]
    fn should_reject_pipes_in_host_bindings() {
        let mut meta = directive("Dir", "[dir]");
        meta.host.properties.insert("title".into(), "value | upper".into());
        assert!(compile_directive_from_metadata(&meta, &mut ConstantPool::new()).is_err());
    }

    fn component(template: &str, directives: Vec<R3UsedDirectiveMetadata>) -> R3ComponentMetadata {
        let parsed = parse_template(template, "cmp.html", ParseTemplateOptions::default(), "cmp.ts");
        assert!(parsed.errors.is_empty());
        R3ComponentMetadata {
            directive: directive("Cmp", "app-cmp"),
            template: R3ComponentTemplate {
                nodes: parsed.nodes,
                has_ng_content: false,
                ng_content_selectors: Vec::new(),
            },
            view_queries: Vec::new(),
            directives,
            pipes: IndexMap::new(),
            wrap_directives_and_pipes_in_closure: false,
            styles: Vec::new(),
            encapsulation: ViewEncapsulation::Emulated,
            animations: None,
            relative_context_file_path: "cmp.ts".into(),
        }
    }

    fn used(name: &str, selector: &str) -> R3UsedDirectiveMetadata {
        R3UsedDirectiveMetadata {
            name: name.into(),
            selector: selector.into(),
            expression: variable(name),
            is_component: false,
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            export_as: None,
        }
    }

    #[test]
    fn should_compile_a_component_with_only_matched_directives() {
        let meta = component("<div dir>{{ title }}</div>", vec![used("Dir", "[dir]"), used("Other", "[other]")]);
        let mut pool = ConstantPool::new();
        let compiled = compile_component_from_metadata(&meta, &mut pool).unwrap();
        assert_eq!(
            keys(&compiled.expression),
            vec!["type", "selectors", "factory", "consts", "vars", "template", "directives"]
        );
        assert_eq!(field(&compiled.expression, "consts"), literal(2.0));
        assert_eq!(field(&compiled.expression, "vars"), literal(1.0));
        assert_eq!(field(&compiled.expression, "directives"), literal_arr(vec![variable("Dir")]));
    }

    #[test]
    fn should_wrap_forward_declarations_in_a_closure() {
        let mut meta = component("<div dir></div>", vec![used("Dir", "[dir]")]);
        meta.wrap_directives_and_pipes_in_closure = true;
        meta.encapsulation = ViewEncapsulation::None;
        let compiled = compile_component_from_metadata(&meta, &mut ConstantPool::new()).unwrap();
        let E::Fn(closure) = field(&compiled.expression, "directives") else {
            panic!("expected closure");
        };
        assert!(closure.params.is_empty());
        assert_eq!(field(&compiled.expression, "encapsulation"), literal(2.0));
    }

    #[test]
    fn should_compile_a_base_definition() {
        let mut meta = R3BaseRefMetadata::default();
        meta.inputs.insert("value".into(), ("value".into(), "value".into()));
        let compiled = compile_base_def_from_metadata(&meta);
        assert_eq!(keys(&compiled.expression), vec!["inputs"]);
        assert_eq!(compiled.type_, expression_type(import_expr(R3::base_def()), None));
    }
}
