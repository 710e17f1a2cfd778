// NgModule Decorator Handler
//
// Handles @NgModule decorator processing: registers the module's scope and
// emits `ngModuleDef` and `ngInjectorDef`.

use angular_compiler::output::output_ast::{literal_arr, wrapped, Statement};
use angular_compiler::render3::{
    compile_injector, compile_ng_module, R3InjectorMetadata, R3NgModuleMetadata, R3Reference,
};
use angular_compiler::ConstantPool;
use anyhow::anyhow;
use ts::{ClassDeclaration, Expression};

use super::module_with_providers::ModuleWithProvidersResolver;
use crate::ngtsc::annotations::common::{
    decorator_object_literal, find_angular_decorator, generate_set_class_metadata_call,
    get_constructor_dependencies, wrap_expression, AnalysisContext,
};
use crate::ngtsc::diagnostics::{fatal, ErrorCode, HandlerResult, SourceSpan};
use crate::ngtsc::imports::Reference;
use crate::ngtsc::partial_evaluator::ResolvedValue;
use crate::ngtsc::reflection::Decorator;
use crate::ngtsc::scope::{ModuleData, SelectorScopeRegistry};
use crate::ngtsc::transform::{
    Analysis, AnalysisOutput, AnnotationKind, CompileResult, DecoratorHandler, DetectResult,
};

#[derive(Debug)]
pub struct NgModuleAnalysis {
    pub module_def: R3NgModuleMetadata,
    pub injector_def: R3InjectorMetadata,
    pub metadata_stmt: Option<Statement>,
}

pub struct NgModuleDecoratorHandler<'a> {
    ctx: AnalysisContext<'a>,
}

impl<'a> NgModuleDecoratorHandler<'a> {
    pub fn new(ctx: AnalysisContext<'a>) -> Self {
        Self { ctx }
    }

    /// Evaluates one of the reference arrays of the module. `imports` and
    /// `exports` may contain `ModuleWithProviders` calls.
    fn read_type_list(
        &self,
        node: &ClassDeclaration,
        expr: Option<&Expression>,
        name: &str,
    ) -> HandlerResult<Vec<Reference>> {
        let Some(expr) = expr else {
            return Ok(Vec::new());
        };
        let value = if name == "imports" || name == "exports" {
            self.ctx
                .evaluate_with(expr, node.id.file, &ModuleWithProvidersResolver::new(self.ctx))
        } else {
            self.ctx.evaluate(expr, node.id.file)
        };
        let mut refs = Vec::new();
        self.resolve_type_list(&value, name, &self.ctx.span(node, expr), &mut refs)?;
        tracing::trace!(module = ?node.name_text(), list = name, count = refs.len(), "resolved type list");
        Ok(refs)
    }

    fn resolve_type_list(
        &self,
        value: &ResolvedValue,
        name: &str,
        span: &SourceSpan,
        refs: &mut Vec<Reference>,
    ) -> HandlerResult<()> {
        let ResolvedValue::List(entries) = value else {
            return fatal(
                ErrorCode::ValueHasWrongType,
                Some(span.clone()),
                format!("Expected array when reading property {}", name),
            );
        };
        for (idx, entry) in entries.iter().enumerate() {
            // `{ngModule: X, providers: [...]}` contributes `X`.
            let entry = match entry {
                ResolvedValue::Map(map) => map.get("ngModule").unwrap_or(entry),
                _ => entry,
            };
            match entry {
                ResolvedValue::List(_) => self.resolve_type_list(entry, name, span, refs)?,
                ResolvedValue::Reference(reference) if self.ctx.reflector.is_class(reference.decl) => {
                    refs.push(reference.clone())
                }
                ResolvedValue::Reference(reference) => {
                    return fatal(
                        ErrorCode::ValueHasWrongType,
                        Some(span.clone()),
                        format!(
                            "Entry {} at position {} is not a type, but is used as such in {} array",
                            reference.name, idx, name
                        ),
                    )
                }
                other => {
                    return fatal(
                        ErrorCode::ValueHasWrongType,
                        Some(span.clone()),
                        format!(
                            "Value at position {} in {} array is not a reference: {}",
                            idx,
                            name,
                            other.kind_name()
                        ),
                    )
                }
            }
        }
        Ok(())
    }

    fn is_forward_declared(&self, reference: &Reference, node: &ClassDeclaration) -> bool {
        !reference.is_absolute()
            && reference.decl.file == node.id.file
            && self
                .ctx
                .program
                .declaration(reference.decl)
                .is_some_and(|decl| decl.range().pos > node.range.pos)
    }
}

impl<'a> DecoratorHandler<'a> for NgModuleDecoratorHandler<'a> {
    fn kind(&self) -> AnnotationKind {
        AnnotationKind::NgModule
    }

    fn detect(&self, _node: &ClassDeclaration, decorators: Option<&[Decorator]>) -> Option<DetectResult> {
        let decorator = find_angular_decorator(decorators?, "NgModule", self.ctx.is_core)?;
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
            .ok_or_else(|| anyhow!("@NgModule analysis without a decorator"))?;
        let Some(name) = node.name_text() else {
            return fatal(
                ErrorCode::DecoratorOnAnonymousClass,
                Some(decorator.span.clone()),
                "@NgModule on anonymous class",
            );
        };
        let ng_module = match decorator.args.as_deref() {
            Some([]) => Default::default(),
            Some([arg]) => decorator_object_literal(decorator, arg)?,
            _ => {
                return fatal(
                    ErrorCode::DecoratorArityWrong,
                    Some(decorator.span.clone()),
                    "Incorrect number of arguments to @NgModule decorator",
                )
            }
        };
        if ng_module.contains_key("jit") {
            tracing::debug!(module = name, "skipping jit NgModule");
            return Ok(AnalysisOutput::empty());
        }

        let declarations = self.read_type_list(node, ng_module.get("declarations"), "declarations")?;
        let imports = self.read_type_list(node, ng_module.get("imports"), "imports")?;
        let exports = self.read_type_list(node, ng_module.get("exports"), "exports")?;
        let bootstrap = self.read_type_list(node, ng_module.get("bootstrap"), "bootstrap")?;

        let file = self.ctx.file(node);
        let module_ref = Reference::resolved(node.id, name, file.file_name.clone());
        scopes.register_module(
            module_ref,
            ModuleData {
                declarations: declarations.clone(),
                imports: imports.clone(),
                exports: exports.clone(),
            },
        )?;

        let contains_forward_decls = [&declarations, &imports, &exports, &bootstrap]
            .into_iter()
            .flatten()
            .any(|reference| self.is_forward_declared(reference, node));
        let to_r3 = |refs: &[Reference]| -> Vec<R3Reference> {
            refs.iter()
                .map(|reference| R3Reference::of(reference.to_expression(&file.file_name)))
                .collect()
        };
        let module_def = R3NgModuleMetadata {
            type_: R3Reference::of(wrapped(name)),
            bootstrap: to_r3(&bootstrap),
            declarations: to_r3(&declarations),
            imports: to_r3(&imports),
            exports: to_r3(&exports),
            contains_forward_decls,
        };

        let injector_imports = ["imports", "exports"]
            .iter()
            .filter_map(|key| ng_module.get(*key))
            .map(|expr| wrap_expression(expr, file))
            .collect();
        let injector_def = R3InjectorMetadata {
            name: name.to_string(),
            type_: R3Reference::of(wrapped(name)),
            deps: get_constructor_dependencies(node, file, self.ctx.reflector, self.ctx.is_core)?,
            providers: Some(
                ng_module
                    .get("providers")
                    .map_or_else(|| literal_arr(Vec::new()), |expr| wrap_expression(expr, file)),
            ),
            imports: injector_imports,
        };

        let metadata_stmt = generate_set_class_metadata_call(node, file, self.ctx.reflector, self.ctx.is_core);
        Ok(AnalysisOutput::of(Analysis::NgModule(Box::new(NgModuleAnalysis {
            module_def,
            injector_def,
            metadata_stmt,
        }))))
    }

    fn compile(
        &self,
        _node: &ClassDeclaration,
        analysis: &Analysis,
        _scopes: &mut SelectorScopeRegistry<'a>,
        _constant_pool: &mut ConstantPool,
    ) -> HandlerResult<Vec<CompileResult>> {
        let Analysis::NgModule(analysis) = analysis else {
            return Err(anyhow!("expected an NgModule analysis, got {:?}", analysis.kind()).into());
        };
        let module_def = compile_ng_module(&analysis.module_def);
        let injector_def = compile_injector(&analysis.injector_def);
        let mut module_statements = module_def.statements;
        module_statements.extend(analysis.metadata_stmt.clone());
        Ok(vec![
            CompileResult {
                name: "ngModuleDef".to_string(),
                initializer: module_def.expression,
                statements: module_statements,
                type_: module_def.type_,
            },
            CompileResult {
                name: "ngInjectorDef".to_string(),
                initializer: injector_def.expression,
                statements: injector_def.statements,
                type_: injector_def.type_,
            },
        ])
    }
}
