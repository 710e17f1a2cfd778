// Component Decorator Handler
//
// Handles @Component decorator processing: template and style loading,
// template parsing, compilation with the declaring module's scope and
// template type-checking.

use std::sync::Arc;

use angular_compiler::core::ViewEncapsulation;
use angular_compiler::directive_matching::{CssSelector, SelectorMatcher};
use angular_compiler::output::output_ast::Statement;
use angular_compiler::render3::r3_ast::R3Node;
use angular_compiler::render3::view::{
    compile_component_from_metadata, parse_template, ParseTemplateOptions, R3ComponentMetadata,
    R3ComponentTemplate, R3UsedDirectiveMetadata,
};
use angular_compiler::ConstantPool;
use anyhow::anyhow;
use indexmap::IndexMap;
use ts::{path, ClassDeclaration, Expression};

use crate::ngtsc::annotations::common::{
    decorator_object_literal, find_angular_decorator, generate_set_class_metadata_call, resolve_string_array,
    wrap_expression, AnalysisContext,
};
use crate::ngtsc::annotations::directive::{
    extract_directive_metadata, extract_queries_from_decorator, queries_from_fields, type_checkable_meta,
};
use crate::ngtsc::diagnostics::{fatal, ErrorCode, HandlerResult, SourceSpan};
use crate::ngtsc::partial_evaluator::ResolvedValue;
use crate::ngtsc::reflection::Decorator;
use crate::ngtsc::resource::{PreloadTask, ResourceLoader};
use crate::ngtsc::scope::SelectorScopeRegistry;
use crate::ngtsc::transform::{
    Analysis, AnalysisOutput, AnnotationKind, CompileResult, DecoratorHandler, DetectResult,
};
use crate::ngtsc::typecheck::TypeCheckContext;

#[derive(Debug)]
pub struct ComponentAnalysis {
    /// Compiled without a scope; `compile` fills in directives and pipes.
    pub meta: R3ComponentMetadata,
    pub metadata_stmt: Option<Statement>,
}

pub struct ComponentDecoratorHandler<'a> {
    ctx: AnalysisContext<'a>,
    resource_loader: Arc<dyn ResourceLoader>,
    root_dirs: Vec<String>,
    default_preserve_whitespaces: bool,
}

impl<'a> ComponentDecoratorHandler<'a> {
    pub fn new(
        ctx: AnalysisContext<'a>,
        resource_loader: Arc<dyn ResourceLoader>,
        root_dirs: Vec<String>,
        default_preserve_whitespaces: bool,
    ) -> Self {
        Self {
            ctx,
            resource_loader,
            root_dirs,
            default_preserve_whitespaces,
        }
    }

    /// Resolves `url` against the directory of the component's file.
    fn resolve_url(&self, node: &ClassDeclaration, url: &str) -> String {
        let file_name = &self.ctx.file(node).file_name;
        path::resolve(&path::dirname(file_name), &[url])
    }

    fn load_resource(&self, url: &str, span: SourceSpan) -> HandlerResult<String> {
        self.resource_loader.load(url).or_else(|err| {
            fatal(
                ErrorCode::ComponentMissingTemplate,
                Some(span),
                format!("Could not load resource: {}", err),
            )
        })
    }

    /// Shortest path of the component's file relative to any root dir.
    fn relative_context_file_path(&self, node: &ClassDeclaration) -> String {
        let file_name = &self.ctx.file(node).file_name;
        self.root_dirs
            .iter()
            .map(|root_dir| path::relative(root_dir, file_name))
            .min_by_key(|candidate| candidate.len())
            .unwrap_or_else(|| file_name.clone())
    }

    /// The template text and the url it is known by in spans.
    fn read_template(
        &self,
        node: &ClassDeclaration,
        decorator: &Decorator,
        component: &IndexMap<String, Expression>,
    ) -> HandlerResult<(String, String)> {
        if let Some(expr) = component.get("templateUrl") {
            let ResolvedValue::String(template_url) = self.ctx.evaluate(expr, node.id.file) else {
                return fatal(
                    ErrorCode::ValueHasWrongType,
                    Some(decorator.span_of(expr.range)),
                    "templateUrl must be a string",
                );
            };
            let url = self.resolve_url(node, &template_url);
            let template = self.load_resource(&url, decorator.span_of(expr.range))?;
            return Ok((template, url));
        }
        if let Some(expr) = component.get("template") {
            let ResolvedValue::String(template) = self.ctx.evaluate(expr, node.id.file) else {
                return fatal(
                    ErrorCode::ValueHasWrongType,
                    Some(decorator.span_of(expr.range)),
                    "template must be a string",
                );
            };
            let name = node.name_text().unwrap_or_default();
            let url = format!("{}#{}/template.html", self.ctx.file(node).file_name, name);
            return Ok((template, url));
        }
        fatal(
            ErrorCode::ComponentMissingTemplate,
            Some(decorator.span.clone()),
            "component is missing a template",
        )
    }

    fn read_styles(
        &self,
        node: &ClassDeclaration,
        decorator: &Decorator,
        component: &IndexMap<String, Expression>,
    ) -> HandlerResult<Vec<String>> {
        let mut styles = match component.get("styles") {
            Some(expr) => {
                let value = self.ctx.evaluate(expr, node.id.file);
                resolve_string_array(&value, &decorator.span_of(expr.range), "styles")?
            }
            None => Vec::new(),
        };
        if let Some(expr) = component.get("styleUrls") {
            let value = self.ctx.evaluate(expr, node.id.file);
            for style_url in resolve_string_array(&value, &decorator.span_of(expr.range), "styleUrls")? {
                let url = self.resolve_url(node, &style_url);
                styles.push(self.load_resource(&url, decorator.span_of(expr.range))?);
            }
        }
        Ok(styles)
    }

    /// Urls `analyze` will load: the template url, then the style urls.
    fn resource_urls(&self, node: &ClassDeclaration, component: &IndexMap<String, Expression>) -> Vec<String> {
        let mut urls = Vec::new();
        if let Some(expr) = component.get("templateUrl") {
            if let ResolvedValue::String(url) = self.ctx.evaluate(expr, node.id.file) {
                urls.push(self.resolve_url(node, &url));
            }
        }
        if let Some(expr) = component.get("styleUrls") {
            if let ResolvedValue::List(entries) = self.ctx.evaluate(expr, node.id.file) {
                urls.extend(
                    entries
                        .iter()
                        .filter_map(ResolvedValue::as_str)
                        .map(|url| self.resolve_url(node, url)),
                );
            }
        }
        urls
    }
}

impl<'a> DecoratorHandler<'a> for ComponentDecoratorHandler<'a> {
    fn kind(&self) -> AnnotationKind {
        AnnotationKind::Component
    }

    fn detect(&self, _node: &ClassDeclaration, decorators: Option<&[Decorator]>) -> Option<DetectResult> {
        let decorator = find_angular_decorator(decorators?, "Component", self.ctx.is_core)?;
        Some(DetectResult {
            trigger: Some(decorator.clone()),
        })
    }

    fn preanalyze(&self, node: &ClassDeclaration, detected: &DetectResult) -> HandlerResult<Vec<PreloadTask>> {
        // Malformed decorators are reported by `analyze`.
        let Some(decorator) = detected.trigger.as_ref() else {
            return Ok(Vec::new());
        };
        let Some([arg]) = decorator.args.as_deref() else {
            return Ok(Vec::new());
        };
        let Ok(component) = decorator_object_literal(decorator, arg) else {
            return Ok(Vec::new());
        };
        Ok(self
            .resource_urls(node, &component)
            .iter()
            .filter_map(|url| self.resource_loader.preload(url))
            .collect())
    }

    fn analyze(
        &self,
        node: &ClassDeclaration,
        detected: &DetectResult,
        scopes: &mut SelectorScopeRegistry<'a>,
    ) -> HandlerResult<AnalysisOutput> {
        let decorator = detected
            .trigger
            .as_ref()
            .ok_or_else(|| anyhow!("@Component analysis without a decorator"))?;
        let Some(extraction) = extract_directive_metadata(node, decorator, &self.ctx)? else {
            tracing::debug!(class = ?node.name_text(), "skipping jit component");
            return Ok(AnalysisOutput::empty());
        };
        let component = &extraction.decorator;

        let (template_str, template_url) = self.read_template(node, decorator, component)?;

        let preserve_whitespaces = match component.get("preserveWhitespaces") {
            Some(expr) => match self.ctx.evaluate(expr, node.id.file) {
                ResolvedValue::Boolean(value) => value,
                _ => {
                    return fatal(
                        ErrorCode::ValueHasWrongType,
                        Some(decorator.span_of(expr.range)),
                        "preserveWhitespaces must be a boolean",
                    )
                }
            },
            None => self.default_preserve_whitespaces,
        };

        let relative_context_file_path = self.relative_context_file_path(node);
        let parsed = parse_template(
            &template_str,
            &template_url,
            ParseTemplateOptions { preserve_whitespaces },
            &relative_context_file_path,
        );
        if !parsed.errors.is_empty() {
            let errors: Vec<String> = parsed.errors.iter().map(ToString::to_string).collect();
            let span = component
                .get("template")
                .or_else(|| component.get("templateUrl"))
                .map_or_else(|| decorator.span.clone(), |expr| decorator.span_of(expr.range));
            return fatal(
                ErrorCode::TemplateParseError,
                Some(span),
                format!("Errors parsing template: {}", errors.join(", ")),
            );
        }

        let mut view_queries = queries_from_fields(&extraction.decorated_members, "ViewChild", &self.ctx, node)?;
        view_queries.extend(queries_from_fields(&extraction.decorated_members, "ViewChildren", &self.ctx, node)?);
        if let Some(expr) = component.get("queries") {
            view_queries.extend(extract_queries_from_decorator(expr, &self.ctx, node)?.view);
        }

        let styles = self.read_styles(node, decorator, component)?;

        let encapsulation = match component.get("encapsulation") {
            Some(expr) => match self.ctx.evaluate(expr, node.id.file).as_number().and_then(ViewEncapsulation::from_number) {
                Some(encapsulation) => encapsulation,
                None => {
                    return fatal(
                        ErrorCode::ValueHasWrongType,
                        Some(decorator.span_of(expr.range)),
                        "encapsulation must be a ViewEncapsulation member",
                    )
                }
            },
            None => ViewEncapsulation::Emulated,
        };

        let file = self.ctx.file(node);
        let animations = component.get("animations").map(|expr| wrap_expression(expr, file));

        let directive = extraction.metadata;
        if directive.selector.as_deref().is_some_and(|selector| !selector.is_empty()) {
            scopes.register_directive(type_checkable_meta(node, &directive, true, &self.ctx))?;
        }

        let (has_ng_content, ng_content_selectors) = collect_ng_content(&parsed.nodes);
        let meta = R3ComponentMetadata {
            directive,
            template: R3ComponentTemplate {
                nodes: parsed.nodes,
                has_ng_content,
                ng_content_selectors,
            },
            view_queries,
            directives: Vec::new(),
            pipes: IndexMap::new(),
            wrap_directives_and_pipes_in_closure: false,
            styles,
            encapsulation,
            animations,
            relative_context_file_path,
        };
        let metadata_stmt = generate_set_class_metadata_call(node, file, self.ctx.reflector, self.ctx.is_core);
        Ok(AnalysisOutput::of(Analysis::Component(Box::new(ComponentAnalysis { meta, metadata_stmt }))).with_type_check())
    }

    fn type_check(
        &self,
        ctx: &mut TypeCheckContext<'a>,
        node: &ClassDeclaration,
        analysis: &Analysis,
        scopes: &mut SelectorScopeRegistry<'a>,
    ) -> HandlerResult<()> {
        let Analysis::Component(analysis) = analysis else {
            return Err(anyhow!("expected a component analysis, got {:?}", analysis.kind()).into());
        };
        let Some(scope) = scopes.lookup_compilation_scope_as_refs(node.id)? else {
            return Ok(());
        };
        let mut matcher = SelectorMatcher::new();
        for (selector, entry) in scope.directives {
            match CssSelector::parse(&selector) {
                Ok(selectors) => matcher.add_selectables(selectors, entry.meta),
                Err(err) => tracing::warn!(%selector, %err, "ignoring directive with an invalid selector"),
            }
        }
        ctx.add_template(node, &analysis.meta.template.nodes, matcher)?;
        Ok(())
    }

    fn compile(
        &self,
        node: &ClassDeclaration,
        analysis: &Analysis,
        scopes: &mut SelectorScopeRegistry<'a>,
        constant_pool: &mut ConstantPool,
    ) -> HandlerResult<Vec<CompileResult>> {
        let Analysis::Component(analysis) = analysis else {
            return Err(anyhow!("expected a component analysis, got {:?}", analysis.kind()).into());
        };
        let mut meta = analysis.meta.clone();
        if let Some(scope) = scopes.lookup_compilation_scope(node)? {
            meta.directives = scope
                .directives
                .into_iter()
                .map(|(selector, entry)| R3UsedDirectiveMetadata {
                    name: entry.meta.name,
                    selector,
                    expression: entry.directive,
                    is_component: entry.meta.is_component,
                    inputs: entry.meta.inputs,
                    outputs: entry.meta.outputs,
                    export_as: entry.meta.export_as,
                })
                .collect();
            meta.pipes = scope.pipes;
            meta.wrap_directives_and_pipes_in_closure = scope.contains_forward_decls;
        }

        let res = compile_component_from_metadata(&meta, constant_pool)?;
        let mut statements = res.statements;
        statements.extend(analysis.metadata_stmt.clone());
        Ok(vec![CompileResult {
            name: "ngComponentDef".to_string(),
            initializer: res.expression,
            statements,
            type_: res.type_,
        }])
    }
}

/// Whether the template projects content, and the non-wildcard
/// `<ng-content select>` selectors in document order.
fn collect_ng_content(nodes: &[R3Node]) -> (bool, Vec<String>) {
    fn walk(nodes: &[R3Node], found: &mut bool, selectors: &mut Vec<String>) {
        for node in nodes {
            match node {
                R3Node::Content(content) => {
                    *found = true;
                    if content.selector != "*" && !selectors.contains(&content.selector) {
                        selectors.push(content.selector.clone());
                    }
                }
                R3Node::Element(element) => walk(&element.children, found, selectors),
                R3Node::Template(template) => walk(&template.children, found, selectors),
                R3Node::Text(_) | R3Node::BoundText(_) => {}
            }
        }
    }
    let mut found = false;
    let mut selectors = Vec::new();
    walk(nodes, &mut found, &mut selectors);
    (found, selectors)
}
