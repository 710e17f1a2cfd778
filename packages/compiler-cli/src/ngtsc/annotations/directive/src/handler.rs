// Directive Decorator Handler
//
// Handles @Directive decorator processing.

use angular_compiler::output::output_ast::Statement;
use angular_compiler::render3::view::{compile_directive_from_metadata, R3DirectiveMetadata};
use angular_compiler::ConstantPool;
use anyhow::anyhow;
use ts::ClassDeclaration;

use super::shared::{extract_directive_metadata, type_checkable_meta};
use crate::ngtsc::annotations::common::{find_angular_decorator, generate_set_class_metadata_call, AnalysisContext};
use crate::ngtsc::diagnostics::HandlerResult;
use crate::ngtsc::reflection::Decorator;
use crate::ngtsc::scope::SelectorScopeRegistry;
use crate::ngtsc::transform::{
    Analysis, AnalysisOutput, AnnotationKind, CompileResult, DecoratorHandler, DetectResult,
};

#[derive(Debug)]
pub struct DirectiveAnalysis {
    pub meta: R3DirectiveMetadata,
    /// `ɵsetClassMetadata` call emitted after the class.
    pub metadata_stmt: Option<Statement>,
}

pub struct DirectiveDecoratorHandler<'a> {
    ctx: AnalysisContext<'a>,
}

impl<'a> DirectiveDecoratorHandler<'a> {
    pub fn new(ctx: AnalysisContext<'a>) -> Self {
        Self { ctx }
    }
}

impl<'a> DecoratorHandler<'a> for DirectiveDecoratorHandler<'a> {
    fn kind(&self) -> AnnotationKind {
        AnnotationKind::Directive
    }

    fn detect(&self, _node: &ClassDeclaration, decorators: Option<&[Decorator]>) -> Option<DetectResult> {
        let decorator = find_angular_decorator(decorators?, "Directive", self.ctx.is_core)?;
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
            .ok_or_else(|| anyhow!("@Directive analysis without a decorator"))?;
        let Some(extraction) = extract_directive_metadata(node, decorator, &self.ctx)? else {
            tracing::debug!(class = ?node.name_text(), "skipping jit directive");
            return Ok(AnalysisOutput::empty());
        };
        let meta = extraction.metadata;

        if meta.selector.as_deref().is_some_and(|selector| !selector.is_empty()) {
            scopes.register_directive(type_checkable_meta(node, &meta, false, &self.ctx))?;
        }

        let metadata_stmt =
            generate_set_class_metadata_call(node, self.ctx.file(node), self.ctx.reflector, self.ctx.is_core);
        Ok(AnalysisOutput::of(Analysis::Directive(Box::new(DirectiveAnalysis { meta, metadata_stmt }))))
    }

    fn compile(
        &self,
        _node: &ClassDeclaration,
        analysis: &Analysis,
        _scopes: &mut SelectorScopeRegistry<'a>,
        constant_pool: &mut ConstantPool,
    ) -> HandlerResult<Vec<CompileResult>> {
        let Analysis::Directive(analysis) = analysis else {
            return Err(anyhow!("expected a directive analysis, got {:?}", analysis.kind()).into());
        };
        let res = compile_directive_from_metadata(&analysis.meta, constant_pool)?;
        let mut statements = res.statements;
        statements.extend(analysis.metadata_stmt.clone());
        Ok(vec![CompileResult {
            name: "ngDirectiveDef".to_string(),
            initializer: res.expression,
            statements,
            type_: res.type_,
        }])
    }
}
