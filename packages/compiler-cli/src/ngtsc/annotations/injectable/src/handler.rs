// Injectable Decorator Handler
//
// Handles @Injectable decorator processing and emits `ngInjectableDef`.

use angular_compiler::output::output_ast::{null_expr, wrapped, Statement};
use angular_compiler::render3::R3DependencyMetadata;
use angular_compiler::{compile_injectable, ConstantPool, R3InjectableMetadata, R3InjectableProvider};
use anyhow::anyhow;
use ts::{ClassDeclaration, Expression, ExpressionKind, SourceFile};

use crate::ngtsc::annotations::common::{
    find_angular_decorator, generate_set_class_metadata_call, get_constructor_dependencies, unwrap_expression,
    wrap_expression, AnalysisContext,
};
use crate::ngtsc::diagnostics::{fatal, ErrorCode, HandlerResult};
use crate::ngtsc::imports::CORE_MODULE;
use crate::ngtsc::reflection::Decorator;
use crate::ngtsc::scope::SelectorScopeRegistry;
use crate::ngtsc::transform::{
    Analysis, AnalysisOutput, AnnotationKind, CompileResult, DecoratorHandler, DetectResult,
};

#[derive(Debug)]
pub struct InjectableAnalysis {
    pub meta: R3InjectableMetadata,
    pub metadata_stmt: Option<Statement>,
}

pub struct InjectableDecoratorHandler<'a> {
    ctx: AnalysisContext<'a>,
}

impl<'a> InjectableDecoratorHandler<'a> {
    pub fn new(ctx: AnalysisContext<'a>) -> Self {
        Self { ctx }
    }

    fn extract_metadata(&self, node: &ClassDeclaration, decorator: &Decorator) -> HandlerResult<R3InjectableMetadata> {
        let Some(name) = node.name_text() else {
            return fatal(
                ErrorCode::DecoratorOnAnonymousClass,
                Some(decorator.span.clone()),
                "@Injectable decorator is on an anonymous class.",
            );
        };
        let Some(args) = decorator.args.as_deref() else {
            return fatal(
                ErrorCode::DecoratorNotCalled,
                Some(decorator.span.clone()),
                "@Injectable must be called",
            );
        };
        let file = self.ctx.file(node);
        let constructor = || get_constructor_dependencies(node, file, self.ctx.reflector, self.ctx.is_core);
        let mut meta = R3InjectableMetadata {
            name: name.to_string(),
            type_: wrapped(name),
            type_argument_count: self.ctx.reflector.get_generic_arity_of_class(node).unwrap_or(0),
            provided_in: null_expr(),
            provider: R3InjectableProvider::Constructor { deps: None },
        };

        let arg = match args {
            [] => {
                meta.provider = R3InjectableProvider::Constructor { deps: constructor()? };
                return Ok(meta);
            }
            [arg] => arg,
            [_, extra, ..] => {
                return fatal(
                    ErrorCode::DecoratorArityWrong,
                    Some(decorator.span_of(extra.range)),
                    "Too many arguments to @Injectable",
                )
            }
        };
        let Some(members) = unwrap_expression(arg).as_object_literal() else {
            return fatal(
                ErrorCode::DecoratorArgNotLiteral,
                Some(decorator.span_of(arg.range)),
                "In Ivy, decorator metadata must be inline.",
            );
        };
        let options: indexmap::IndexMap<&str, Expression> = ts::reflect_object_literal(members).into_iter().collect();

        if let Some(provided_in) = options.get("providedIn") {
            meta.provided_in = wrap_expression(provided_in, file);
        }

        let mut user_deps = None;
        if options.contains_key("useClass") || options.contains_key("useFactory") {
            if let Some(deps) = options.get("deps") {
                let Some(elements) = unwrap_expression(deps).as_array_literal() else {
                    return fatal(
                        ErrorCode::ValueNotLiteral,
                        Some(decorator.span_of(deps.range)),
                        "In Ivy, deps metadata must be an inline array.",
                    );
                };
                user_deps = Some(
                    elements
                        .iter()
                        .map(|dep| self.dependency(dep, node, file))
                        .collect::<Vec<_>>(),
                );
            }
        }

        meta.provider = if let Some(value) = options.get("useValue") {
            R3InjectableProvider::UseValue(wrap_expression(value, file))
        } else if let Some(existing) = options.get("useExisting") {
            R3InjectableProvider::UseExisting(wrap_expression(existing, file))
        } else if let Some(class) = options.get("useClass") {
            R3InjectableProvider::UseClass {
                class: wrap_expression(class, file),
                deps: user_deps,
            }
        } else if let Some(factory) = options.get("useFactory") {
            R3InjectableProvider::UseFactory {
                factory: wrap_expression(factory, file),
                deps: user_deps,
            }
        } else {
            R3InjectableProvider::Constructor { deps: constructor()? }
        };
        Ok(meta)
    }

    /// One entry of `deps`: a token, or an array mixing a token with
    /// `Optional`, `Self`, `SkipSelf`, `Host` and `new Inject(token)` markers.
    fn dependency(&self, dep: &Expression, node: &ClassDeclaration, file: &SourceFile) -> R3DependencyMetadata {
        let mut meta = R3DependencyMetadata::token(wrap_expression(dep, file));
        let Some(elements) = unwrap_expression(dep).as_array_literal() else {
            return meta;
        };
        for element in elements {
            let (marker, token) = match &unwrap_expression(element).kind {
                ExpressionKind::Identifier(name) => (self.core_marker(name, node), None),
                ExpressionKind::New { callee, arguments, .. } => match callee.as_identifier() {
                    Some(name) => (self.core_marker(name, node), arguments.first()),
                    None => (None, None),
                },
                _ => (None, None),
            };
            match marker.as_deref() {
                Some("Inject") => {
                    if let Some(token) = token {
                        meta.token = wrap_expression(token, file);
                    }
                }
                Some("Optional") => meta.optional = true,
                Some("Self") => meta.self_ = true,
                Some("SkipSelf") => meta.skip_self = true,
                Some("Host") => meta.host = true,
                _ => meta.token = wrap_expression(element, file),
            }
        }
        meta
    }

    /// The `@angular/core` export `name` refers to, if any.
    fn core_marker(&self, name: &str, node: &ClassDeclaration) -> Option<String> {
        match self.ctx.reflector.get_import_of_identifier(name, node.id.file) {
            Some(import) if import.from == CORE_MODULE => Some(import.name),
            None if self.ctx.is_core => Some(name.to_string()),
            _ => None,
        }
    }
}

impl<'a> DecoratorHandler<'a> for InjectableDecoratorHandler<'a> {
    fn kind(&self) -> AnnotationKind {
        AnnotationKind::Injectable
    }

    fn detect(&self, _node: &ClassDeclaration, decorators: Option<&[Decorator]>) -> Option<DetectResult> {
        let decorator = find_angular_decorator(decorators?, "Injectable", self.ctx.is_core)?;
        Some(DetectResult {
            trigger: Some(decorator.clone()),
        })
    }

    fn analyze(
        &self,
        node: &ClassDeclaration,
        detected: &DetectResult,
        _scopes: &mut SelectorScopeRegistry<'a>,
    ) -> HandlerResult<AnalysisOutput> {
        let decorator = detected
            .trigger
            .as_ref()
            .ok_or_else(|| anyhow!("@Injectable analysis without a decorator"))?;
        let meta = self.extract_metadata(node, decorator)?;
        let metadata_stmt =
            generate_set_class_metadata_call(node, self.ctx.file(node), self.ctx.reflector, self.ctx.is_core);
        Ok(AnalysisOutput::of(Analysis::Injectable(InjectableAnalysis { meta, metadata_stmt })))
    }

    fn compile(
        &self,
        _node: &ClassDeclaration,
        analysis: &Analysis,
        _scopes: &mut SelectorScopeRegistry<'a>,
        _constant_pool: &mut ConstantPool,
    ) -> HandlerResult<Vec<CompileResult>> {
        let Analysis::Injectable(analysis) = analysis else {
            return Err(anyhow!("expected an injectable analysis, got {:?}", analysis.kind()).into());
        };
        let res = compile_injectable(&analysis.meta);
        let mut statements = res.statements;
        statements.extend(analysis.metadata_stmt.clone());
        Ok(vec![CompileResult {
            name: "ngInjectableDef".to_string(),
            initializer: res.expression,
            statements,
            type_: res.type_,
        }])
    }
}
