// Directive Metadata Extraction
//
// Reads `@Directive` and `@Component` decorators, together with the
// decorated members of the class, into `R3DirectiveMetadata`. The component
// handler reuses everything here and adds the component-only fields.

use angular_compiler::output::output_ast::wrapped;
use angular_compiler::render3::view::{
    parse_host_bindings, R3DirectiveMetadata, R3HostMetadata, R3LifecycleMetadata, R3QueryMetadata, R3QueryPredicate,
};
use indexmap::IndexMap;
use ts::{ClassDeclaration, Expression, ExpressionKind};

use crate::ngtsc::annotations::common::{
    decorator_object_literal, extract_directive_guards, find_angular_decorator, get_constructor_dependencies,
    is_angular_decorator, is_angular_decorator_named, parse_field_to_property_mapping, resolve_string_array,
    unwrap_expression, unwrap_forward_ref, wrap_expression, AnalysisContext,
};
use crate::ngtsc::diagnostics::{fatal, ErrorCode, HandlerResult};
use crate::ngtsc::imports::{Reference, CORE_MODULE};
use crate::ngtsc::partial_evaluator::ResolvedValue;
use crate::ngtsc::reflection::{ClassMember, ClassMemberKind, Decorator};
use crate::ngtsc::typecheck::api::TypeCheckableDirectiveMeta;

const QUERY_TYPES: [&str; 4] = ["ContentChild", "ContentChildren", "ViewChild", "ViewChildren"];

/// The directive half of a `@Directive` or `@Component` analysis.
#[derive(Debug)]
pub struct DirectiveExtraction {
    /// Properties of the decorator's object literal.
    pub decorator: IndexMap<String, Expression>,
    /// Non-static members carrying decorators.
    pub decorated_members: Vec<ClassMember>,
    pub metadata: R3DirectiveMetadata,
}

/// Queries declared in the `queries` map of a decorator.
#[derive(Debug, Default)]
pub struct DecoratorQueries {
    pub content: Vec<R3QueryMetadata>,
    pub view: Vec<R3QueryMetadata>,
}

/// Extracts the directive metadata of `class`. Returns `None` for
/// `jit: true` directives, which are left to the runtime compiler.
pub fn extract_directive_metadata(
    class: &ClassDeclaration,
    decorator: &Decorator,
    ctx: &AnalysisContext<'_>,
) -> HandlerResult<Option<DirectiveExtraction>> {
    let Some([arg]) = decorator.args.as_deref() else {
        return fatal(
            ErrorCode::DecoratorArityWrong,
            Some(decorator.span.clone()),
            format!("Incorrect number of arguments to @{} decorator", decorator.name),
        );
    };
    let directive = decorator_object_literal(decorator, arg)?;
    if directive.contains_key("jit") {
        return Ok(None);
    }
    let Some(name) = class.name_text() else {
        return fatal(
            ErrorCode::DecoratorOnAnonymousClass,
            Some(decorator.span.clone()),
            format!("@{} on anonymous class", decorator.name),
        );
    };
    let file = ctx.file(class);

    let members = ctx.reflector.get_members_of_class(class);
    let decorated_members: Vec<ClassMember> = members
        .iter()
        .filter(|member| !member.is_static && !member.decorators.is_empty())
        .cloned()
        .collect();

    // Inputs and outputs named in the decorator, then the decorated fields.
    let mut inputs: IndexMap<String, (String, String)> = match directive.get("inputs") {
        Some(expr) => {
            let value = ctx.evaluate(expr, class.id.file);
            let fields = resolve_string_array(&value, &decorator.span_of(expr.range), "inputs")?;
            parse_field_to_property_mapping(&fields)
                .into_iter()
                .map(|(field, property)| (field.clone(), (property, field)))
                .collect()
        }
        None => IndexMap::new(),
    };
    for (field, alias) in parse_decorated_fields(&decorated_members, "Input", ctx, class)? {
        inputs.insert(field.clone(), (alias, field));
    }

    let mut outputs: IndexMap<String, String> = match directive.get("outputs") {
        Some(expr) => {
            let value = ctx.evaluate(expr, class.id.file);
            let fields = resolve_string_array(&value, &decorator.span_of(expr.range), "outputs")?;
            parse_field_to_property_mapping(&fields)
        }
        None => IndexMap::new(),
    };
    outputs.extend(parse_decorated_fields(&decorated_members, "Output", ctx, class)?);

    let mut queries = queries_from_fields(&decorated_members, "ContentChild", ctx, class)?;
    queries.extend(queries_from_fields(&decorated_members, "ContentChildren", ctx, class)?);
    if let Some(expr) = directive.get("queries") {
        queries.extend(extract_queries_from_decorator(expr, ctx, class)?.content);
    }

    let selector = match directive.get("selector") {
        Some(expr) => match ctx.evaluate(expr, class.id.file) {
            ResolvedValue::String(selector) => selector,
            _ => {
                return fatal(
                    ErrorCode::ValueHasWrongType,
                    Some(decorator.span_of(expr.range)),
                    "selector must be a string",
                )
            }
        },
        None => String::new(),
    };

    let host = extract_host_bindings(&directive, &decorated_members, decorator, ctx, class)?;

    let export_as = match directive.get("exportAs") {
        Some(expr) => match ctx.evaluate(expr, class.id.file) {
            ResolvedValue::String(export_as) => Some(export_as),
            _ => {
                return fatal(
                    ErrorCode::ValueHasWrongType,
                    Some(decorator.span_of(expr.range)),
                    "exportAs must be a string",
                )
            }
        },
        None => None,
    };

    let uses_on_changes = members
        .iter()
        .any(|member| !member.is_static && member.kind == ClassMemberKind::Method && member.name == "ngOnChanges");

    let metadata = R3DirectiveMetadata {
        name: name.to_string(),
        type_: wrapped(name),
        type_argument_count: ctx.reflector.get_generic_arity_of_class(class).unwrap_or(0),
        deps: get_constructor_dependencies(class, file, ctx.reflector, ctx.is_core)?,
        selector: Some(selector),
        queries,
        host,
        lifecycle: R3LifecycleMetadata { uses_on_changes },
        inputs,
        outputs,
        uses_inheritance: ctx.reflector.has_base_class(class),
        export_as,
        providers: directive.get("providers").map(|expr| wrap_expression(expr, file)),
    };
    Ok(Some(DirectiveExtraction {
        decorator: directive,
        decorated_members,
        metadata,
    }))
}

/// Members decorated with the Angular decorator `name`, with that decorator.
pub fn members_with_decorator<'m>(
    members: &'m [ClassMember],
    name: &str,
    is_core: bool,
) -> impl Iterator<Item = (&'m ClassMember, &'m Decorator)> + 'm {
    let name = name.to_string();
    members.iter().filter_map(move |member| {
        find_angular_decorator(&member.decorators, &name, is_core).map(|decorator| (member, decorator))
    })
}

/// `field -> alias` for members decorated with `@Input(alias?)` or
/// `@Output(alias?)`. The alias defaults to the field name.
pub fn parse_decorated_fields(
    members: &[ClassMember],
    decorator_name: &str,
    ctx: &AnalysisContext<'_>,
    class: &ClassDeclaration,
) -> HandlerResult<IndexMap<String, String>> {
    let mut fields = IndexMap::new();
    for (member, decorator) in members_with_decorator(members, decorator_name, ctx.is_core) {
        let alias = match decorator.args.as_deref() {
            None | Some([]) => member.name.clone(),
            Some([arg]) => match ctx.evaluate(arg, class.id.file) {
                ResolvedValue::String(alias) => alias,
                other => {
                    return fatal(
                        ErrorCode::ValueHasWrongType,
                        Some(decorator.span_of(arg.range)),
                        format!("@{} alias must be a string, got {}", decorator_name, other.kind_name()),
                    )
                }
            },
            Some(_) => {
                return fatal(
                    ErrorCode::DecoratorArityWrong,
                    Some(decorator.span.clone()),
                    format!("@{} can have at most one argument", decorator_name),
                )
            }
        };
        fields.insert(member.name.clone(), alias);
    }
    Ok(fields)
}

/// Queries declared by `@<name>` on members, in member order.
pub fn queries_from_fields(
    members: &[ClassMember],
    name: &str,
    ctx: &AnalysisContext<'_>,
    class: &ClassDeclaration,
) -> HandlerResult<Vec<R3QueryMetadata>> {
    members_with_decorator(members, name, ctx.is_core)
        .map(|(member, decorator)| {
            let query_decorators = member
                .decorators
                .iter()
                .filter(|d| QUERY_TYPES.iter().any(|q| is_angular_decorator_named(d, q, ctx.is_core)))
                .count();
            if query_decorators != 1 {
                return fatal(
                    ErrorCode::DecoratorUnexpected,
                    Some(member.span.clone()),
                    "Cannot have multiple query decorators on the same class member",
                );
            }
            if member.kind == ClassMemberKind::Method {
                return fatal(
                    ErrorCode::DecoratorUnexpected,
                    Some(member.span.clone()),
                    "Query decorator must go on a property-type member",
                );
            }
            let args = decorator.args.as_deref().unwrap_or_default();
            extract_query_metadata(decorator, name, args, &member.name, ctx, class)
        })
        .collect()
}

/// Reads one query from the arguments of `@ViewChild(...)`,
/// `new ContentChildren(...)` and friends.
pub fn extract_query_metadata(
    decorator: &Decorator,
    name: &str,
    args: &[Expression],
    property_name: &str,
    ctx: &AnalysisContext<'_>,
    class: &ClassDeclaration,
) -> HandlerResult<R3QueryMetadata> {
    let file = ctx.file(class);
    let Some(first_arg) = args.first() else {
        return fatal(
            ErrorCode::DecoratorArityWrong,
            Some(decorator.span.clone()),
            format!("@{} must have arguments", name),
        );
    };
    if args.len() > 2 {
        return fatal(
            ErrorCode::DecoratorArityWrong,
            Some(decorator.span_of(args[2].range)),
            format!("@{} has too many arguments", name),
        );
    }

    let node = unwrap_forward_ref(first_arg, class.id.file, ctx.reflector);
    let predicate = match ctx.evaluate(node, class.id.file) {
        ResolvedValue::Reference(_) => R3QueryPredicate::Type(wrap_expression(node, file)),
        ResolvedValue::String(selector) => {
            R3QueryPredicate::Selectors(selector.split(',').map(|s| s.trim().to_string()).collect())
        }
        value @ ResolvedValue::List(_) => {
            R3QueryPredicate::Selectors(resolve_string_array(&value, &decorator.span_of(node.range), "predicate")?)
        }
        _ => {
            return fatal(
                ErrorCode::ValueHasWrongType,
                Some(decorator.span_of(node.range)),
                format!("@{} predicate cannot be interpreted", name),
            )
        }
    };

    let mut read = None;
    let mut descendants = name != "ContentChildren";
    if let Some(options) = args.get(1) {
        let Some(members) = unwrap_expression(options).as_object_literal() else {
            return fatal(
                ErrorCode::DecoratorArgNotLiteral,
                Some(decorator.span_of(options.range)),
                format!("@{} options must be an object literal", name),
            );
        };
        for (key, value) in ts::reflect_object_literal(members) {
            match key {
                "read" => read = Some(wrap_expression(&value, file)),
                "descendants" => match ctx.evaluate(&value, class.id.file) {
                    ResolvedValue::Boolean(flag) => descendants = flag,
                    _ => {
                        return fatal(
                            ErrorCode::ValueHasWrongType,
                            Some(decorator.span_of(value.range)),
                            format!("@{} options.descendants must be a boolean", name),
                        )
                    }
                },
                _ => {}
            }
        }
    }

    Ok(R3QueryMetadata {
        property_name: property_name.to_string(),
        first: name == "ViewChild" || name == "ContentChild",
        predicate,
        descendants,
        read,
    })
}

/// Reads `queries: {prop: new ViewChild(...)}` into content and view queries.
pub fn extract_queries_from_decorator(
    queries: &Expression,
    ctx: &AnalysisContext<'_>,
    class: &ClassDeclaration,
) -> HandlerResult<DecoratorQueries> {
    let span = ctx.span(class, queries);
    let Some(members) = unwrap_expression(queries).as_object_literal() else {
        return fatal(
            ErrorCode::DecoratorArgNotLiteral,
            Some(span),
            "queries metadata must be an object literal",
        );
    };
    let mut result = DecoratorQueries::default();
    for (property_name, query) in ts::reflect_object_literal(members) {
        let query = unwrap_expression(&query);
        let not_a_query = || {
            fatal(
                ErrorCode::ValueHasWrongType,
                Some(ctx.span(class, query)),
                "query metadata must be an instance of a query type",
            )
        };
        let ExpressionKind::New { callee, arguments, .. } = &query.kind else {
            return not_a_query();
        };
        let Some(identifier) = callee.as_identifier() else {
            return not_a_query();
        };
        let type_name = match ctx.reflector.get_import_of_identifier(identifier, class.id.file) {
            Some(import) if ctx.is_core || import.from == CORE_MODULE => import.name,
            None if ctx.is_core => identifier.to_string(),
            _ => return not_a_query(),
        };
        if !QUERY_TYPES.contains(&type_name.as_str()) {
            return not_a_query();
        }
        let synthetic = Decorator {
            name: type_name.clone(),
            identifier: callee.as_ref().clone(),
            import: None,
            args: Some(arguments.clone()),
            span: ctx.span(class, query),
        };
        let metadata = extract_query_metadata(&synthetic, &type_name, arguments, property_name, ctx, class)?;
        if type_name.starts_with("Content") {
            result.content.push(metadata);
        } else {
            result.view.push(metadata);
        }
    }
    Ok(result)
}

/// Host bindings from the `host` map, `@HostBinding` and `@HostListener`.
fn extract_host_bindings(
    directive: &IndexMap<String, Expression>,
    members: &[ClassMember],
    decorator: &Decorator,
    ctx: &AnalysisContext<'_>,
    class: &ClassDeclaration,
) -> HandlerResult<R3HostMetadata> {
    let mut host_map = IndexMap::new();
    if let Some(expr) = directive.get("host") {
        let ResolvedValue::Map(entries) = ctx.evaluate(expr, class.id.file) else {
            return fatal(
                ErrorCode::DecoratorArgNotLiteral,
                Some(decorator.span_of(expr.range)),
                "Decorator host metadata must be an object",
            );
        };
        for (key, value) in entries {
            let ResolvedValue::String(value) = value else {
                return fatal(
                    ErrorCode::ValueHasWrongType,
                    Some(decorator.span_of(expr.range)),
                    format!("Decorator host metadata must be a string -> string object, got {}", value.kind_name()),
                );
            };
            host_map.insert(key, value);
        }
    }
    let mut host = parse_host_bindings(&host_map);

    for (member, binding) in members_with_decorator(members, "HostBinding", ctx.is_core) {
        let property = match binding.args.as_deref() {
            None | Some([]) => member.name.clone(),
            Some([arg]) => match ctx.evaluate(arg, class.id.file) {
                ResolvedValue::String(property) => property,
                _ => {
                    return fatal(
                        ErrorCode::ValueHasWrongType,
                        Some(binding.span_of(arg.range)),
                        "@HostBinding()'s argument must be a string",
                    )
                }
            },
            Some(_) => {
                return fatal(
                    ErrorCode::DecoratorArityWrong,
                    Some(binding.span.clone()),
                    "@HostBinding() can have at most one argument",
                )
            }
        };
        host.properties.insert(property, member.name.clone());
    }

    for (member, listener) in members_with_decorator(members, "HostListener", ctx.is_core) {
        let mut event = member.name.clone();
        let mut args = Vec::new();
        match listener.args.as_deref().unwrap_or_default() {
            [] => {}
            [event_arg, rest @ ..] => {
                if rest.len() > 1 {
                    return fatal(
                        ErrorCode::DecoratorArityWrong,
                        Some(listener.span_of(rest[1].range)),
                        "@HostListener() can have at most two arguments",
                    );
                }
                event = match ctx.evaluate(event_arg, class.id.file) {
                    ResolvedValue::String(event) => event,
                    _ => {
                        return fatal(
                            ErrorCode::ValueHasWrongType,
                            Some(listener.span_of(event_arg.range)),
                            "@HostListener()'s event name argument must be a string",
                        )
                    }
                };
                if let Some(args_expr) = rest.first() {
                    let value = ctx.evaluate(args_expr, class.id.file);
                    args = resolve_string_array(&value, &listener.span_of(args_expr.range), "@HostListener.args")?;
                }
            }
        }
        host.listeners.insert(event, format!("{}({})", member.name, args.join(",")));
    }
    Ok(host)
}

/// True if `decorators` holds an Angular decorator other than the ones the
/// base-def handler looks at.
pub fn has_angular_class_decorator(decorators: &[Decorator], names: &[&str], is_core: bool) -> bool {
    decorators
        .iter()
        .filter(|decorator| is_angular_decorator(decorator, is_core))
        .any(|decorator| names.iter().any(|name| is_angular_decorator_named(decorator, name, is_core)))
}

/// How the scope registry and template type-checking see a directive.
pub fn type_checkable_meta(
    class: &ClassDeclaration,
    metadata: &R3DirectiveMetadata,
    is_component: bool,
    ctx: &AnalysisContext<'_>,
) -> TypeCheckableDirectiveMeta {
    let file_name = ctx.file(class).file_name.clone();
    let guards = extract_directive_guards(&ctx.reflector.get_members_of_class(class));
    TypeCheckableDirectiveMeta {
        reference: Reference::resolved(class.id, metadata.name.clone(), file_name),
        name: metadata.name.clone(),
        selector: metadata.selector.clone(),
        is_component,
        inputs: metadata
            .inputs
            .iter()
            .map(|(field, (public, _))| (field.clone(), public.clone()))
            .collect(),
        outputs: metadata.outputs.clone(),
        export_as: metadata
            .export_as
            .as_ref()
            .map(|export_as| export_as.split(',').map(|name| name.trim().to_string()).collect()),
        queries: metadata.queries.iter().map(|query| query.property_name.clone()).collect(),
        ng_template_guards: guards.ng_template_guards,
        has_ng_template_context_guard: guards.has_ng_template_context_guard,
    }
}
