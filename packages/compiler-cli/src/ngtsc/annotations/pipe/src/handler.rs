//! Pipe decorator handler
//!
//! Handles @Pipe decorator and generates the `ngPipeDef` definition.

use angular_compiler::output::output_ast::{wrapped, Statement};
use angular_compiler::render3::{compile_pipe_from_metadata, R3PipeMetadata};
use angular_compiler::ConstantPool;
use anyhow::anyhow;
use ts::ClassDeclaration;

use crate::ngtsc::annotations::common::{
    decorator_object_literal, find_angular_decorator, generate_set_class_metadata_call,
    get_constructor_dependencies, AnalysisContext,
};
use crate::ngtsc::diagnostics::{fatal, ErrorCode, HandlerResult};
use crate::ngtsc::imports::Reference;
use crate::ngtsc::partial_evaluator::ResolvedValue;
use crate::ngtsc::reflection::Decorator;
use crate::ngtsc::scope::SelectorScopeRegistry;
use crate::ngtsc::transform::{
    Analysis, AnalysisOutput, AnnotationKind, CompileResult, DecoratorHandler, DetectResult,
};

#[derive(Debug)]
pub struct PipeAnalysis {
    pub meta: R3PipeMetadata,
    pub metadata_stmt: Option<Statement>,
}

/// Handler for @Pipe decorator
pub struct PipeDecoratorHandler<'a> {
    ctx: AnalysisContext<'a>,
}

impl<'a> PipeDecoratorHandler<'a> {
    pub fn new(ctx: AnalysisContext<'a>) -> Self {
        Self { ctx }
    }
}

impl<'a> DecoratorHandler<'a> for PipeDecoratorHandler<'a> {
    fn kind(&self) -> AnnotationKind {
        AnnotationKind::Pipe
    }

    fn detect(&self, _node: &ClassDeclaration, decorators: Option<&[Decorator]>) -> Option<DetectResult> {
        let decorator = find_angular_decorator(decorators?, "Pipe", self.ctx.is_core)?;
        Some(DetectResult {
            trigger: Some(decorator.clone()),
        })
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
            .ok_or_else(|| anyhow!("@Pipe analysis without a decorator"))?;
        let Some(name) = node.name_text() else {
            return fatal(
                ErrorCode::DecoratorOnAnonymousClass,
                Some(decorator.span.clone()),
                "@Pipes must have names",
            );
        };
        let Some(args) = decorator.args.as_deref() else {
            return fatal(
                ErrorCode::DecoratorNotCalled,
                Some(decorator.span.clone()),
                "@Pipe must be called",
            );
        };
        let [arg] = args else {
            return fatal(
                ErrorCode::DecoratorArityWrong,
                Some(decorator.span.clone()),
                "@Pipe must have exactly one argument",
            );
        };
        let pipe = decorator_object_literal(decorator, arg)?;

        let Some(name_expr) = pipe.get("name") else {
            return fatal(
                ErrorCode::PipeMissingName,
                Some(decorator.span_of(arg.range)),
                "@Pipe decorator is missing name field",
            );
        };
        let ResolvedValue::String(pipe_name) = self.ctx.evaluate(name_expr, node.id.file) else {
            return fatal(
                ErrorCode::ValueHasWrongType,
                Some(decorator.span_of(name_expr.range)),
                "@Pipe.name must be a string",
            );
        };

        let pure = match pipe.get("pure") {
            Some(expr) => match self.ctx.evaluate(expr, node.id.file) {
                ResolvedValue::Boolean(pure) => pure,
                _ => {
                    return fatal(
                        ErrorCode::ValueHasWrongType,
                        Some(decorator.span_of(expr.range)),
                        "@Pipe.pure must be a boolean",
                    )
                }
            },
            None => true,
        };

        let file = self.ctx.file(node);
        let reference = Reference::resolved(node.id, name, file.file_name.clone());
        scopes.register_pipe(&reference, pipe_name.clone())?;

        let meta = R3PipeMetadata {
            name: name.to_string(),
            type_: wrapped(name),
            type_argument_count: self.ctx.reflector.get_generic_arity_of_class(node).unwrap_or(0),
            pipe_name,
            deps: get_constructor_dependencies(node, file, self.ctx.reflector, self.ctx.is_core)?,
            pure,
        };
        let metadata_stmt = generate_set_class_metadata_call(node, file, self.ctx.reflector, self.ctx.is_core);
        Ok(AnalysisOutput::of(Analysis::Pipe(PipeAnalysis { meta, metadata_stmt })))
    }

    fn compile(
        &self,
        _node: &ClassDeclaration,
        analysis: &Analysis,
        _scopes: &mut SelectorScopeRegistry<'a>,
        _constant_pool: &mut ConstantPool,
    ) -> HandlerResult<Vec<CompileResult>> {
        let Analysis::Pipe(analysis) = analysis else {
            return Err(anyhow!("expected a pipe analysis, got {:?}", analysis.kind()).into());
        };
        let res = compile_pipe_from_metadata(&analysis.meta);
        let mut statements = res.statements;
        statements.extend(analysis.metadata_stmt.clone());
        Ok(vec![CompileResult {
            name: "ngPipeDef".to_string(),
            initializer: res.expression,
            statements,
            type_: res.type_,
        }])
    }
}
