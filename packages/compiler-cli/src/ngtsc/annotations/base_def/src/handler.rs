// Base Definition Handler
//
// Undecorated classes with `@Input` or `@Output` members get an
// `ngBaseDef`, so directives extending them inherit the bindings.

use angular_compiler::render3::view::{compile_base_def_from_metadata, R3BaseRefMetadata};
use angular_compiler::ConstantPool;
use anyhow::anyhow;
use ts::ClassDeclaration;

use crate::ngtsc::annotations::common::AnalysisContext;
use crate::ngtsc::annotations::directive::{has_angular_class_decorator, members_with_decorator, parse_decorated_fields};
use crate::ngtsc::diagnostics::HandlerResult;
use crate::ngtsc::reflection::{ClassMember, Decorator};
use crate::ngtsc::scope::SelectorScopeRegistry;
use crate::ngtsc::transform::{
    Analysis, AnalysisOutput, AnnotationKind, CompileResult, DecoratorHandler, DetectResult,
};

const TOP_LEVEL_DECORATORS: [&str; 3] = ["Component", "Directive", "NgModule"];

#[derive(Debug)]
pub struct BaseDefAnalysis {
    pub meta: R3BaseRefMetadata,
}

pub struct BaseDefDecoratorHandler<'a> {
    ctx: AnalysisContext<'a>,
}

impl<'a> BaseDefDecoratorHandler<'a> {
    pub fn new(ctx: AnalysisContext<'a>) -> Self {
        Self { ctx }
    }

    fn binding_members(&self, node: &ClassDeclaration) -> Vec<ClassMember> {
        self.ctx
            .reflector
            .get_members_of_class(node)
            .into_iter()
            .filter(|member| !member.is_static && !member.decorators.is_empty())
            .collect()
    }
}

impl<'a> DecoratorHandler<'a> for BaseDefDecoratorHandler<'a> {
    fn kind(&self) -> AnnotationKind {
        AnnotationKind::BaseDef
    }

    fn detect(&self, node: &ClassDeclaration, decorators: Option<&[Decorator]>) -> Option<DetectResult> {
        if has_angular_class_decorator(decorators.unwrap_or_default(), &TOP_LEVEL_DECORATORS, self.ctx.is_core) {
            return None;
        }
        let members = self.binding_members(node);
        let has_bindings = ["Input", "Output"].iter().any(|name| {
            members_with_decorator(&members, name, self.ctx.is_core)
                .next()
                .is_some()
        });
        has_bindings.then_some(DetectResult { trigger: None })
    }

    fn analyze(
        &self,
        node: &ClassDeclaration,
        _detected: &DetectResult,
        _scopes: &mut SelectorScopeRegistry<'a>,
    ) -> HandlerResult<AnalysisOutput> {
        let members = self.binding_members(node);
        let inputs = parse_decorated_fields(&members, "Input", &self.ctx, node)?
            .into_iter()
            .map(|(field, alias)| (field.clone(), (alias, field)))
            .collect();
        let outputs = parse_decorated_fields(&members, "Output", &self.ctx, node)?;
        Ok(AnalysisOutput::of(Analysis::BaseDef(BaseDefAnalysis {
            meta: R3BaseRefMetadata { inputs, outputs },
        })))
    }

    fn compile(
        &self,
        _node: &ClassDeclaration,
        analysis: &Analysis,
        _scopes: &mut SelectorScopeRegistry<'a>,
        _constant_pool: &mut ConstantPool,
    ) -> HandlerResult<Vec<CompileResult>> {
        let Analysis::BaseDef(analysis) = analysis else {
            return Err(anyhow!("expected a base def analysis, got {:?}", analysis.kind()).into());
        };
        let res = compile_base_def_from_metadata(&analysis.meta);
        Ok(vec![CompileResult {
            name: "ngBaseDef".to_string(),
            initializer: res.expression,
            statements: res.statements,
            type_: res.type_,
        }])
    }
}
