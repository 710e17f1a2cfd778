// Module With Providers
//
// Lets NgModule `imports` and `exports` name a call such as
// `RouterModule.forRoot(routes)`. A function declared to return
// `ModuleWithProviders<T>` is treated as `T`.

use ts::{FileId, TypeKind, TypeNode};

use crate::ngtsc::annotations::common::{AnalysisContext, ForwardRefResolver};
use crate::ngtsc::imports::{Reference, CORE_MODULE};
use crate::ngtsc::partial_evaluator::{ForeignFunctionResolver, ForeignFunctionResult};
use crate::ngtsc::reflection::{type_to_value, FunctionDefinition};

/// Foreign function resolver for NgModule imports and exports: unwraps
/// `forwardRef` and functions returning `ModuleWithProviders<T>`.
pub struct ModuleWithProvidersResolver<'a> {
    ctx: AnalysisContext<'a>,
}

impl<'a> ModuleWithProvidersResolver<'a> {
    pub fn new(ctx: AnalysisContext<'a>) -> Self {
        Self { ctx }
    }

    /// `T` of a `ModuleWithProviders<T>` return type written in `file`.
    fn module_type<'t>(&self, return_type: &'t TypeNode, file: FileId) -> Option<&'t TypeNode> {
        let TypeKind::Reference { name, arguments } = &return_type.kind else {
            return None;
        };
        let from_core = match name.as_slice() {
            [local] => match self.ctx.reflector.get_import_of_identifier(local, file) {
                Some(import) => import.from == CORE_MODULE && import.name == "ModuleWithProviders",
                None => self.ctx.is_core && local == "ModuleWithProviders",
            },
            [namespace, symbol] => {
                symbol == "ModuleWithProviders"
                    && self
                        .ctx
                        .program
                        .namespace_import(file, namespace)
                        .is_some_and(|import| import.specifier == CORE_MODULE)
            }
            _ => false,
        };
        match arguments.as_slice() {
            [module] if from_core => Some(module),
            _ => None,
        }
    }
}

impl ForeignFunctionResolver for ModuleWithProvidersResolver<'_> {
    fn resolve(
        &self,
        callee: &Reference,
        function: &FunctionDefinition,
        args: &[ts::Expression],
        call_site: FileId,
    ) -> Option<ForeignFunctionResult> {
        if let Some(result) = ForwardRefResolver.resolve(callee, function, args, call_site) {
            return Some(result);
        }
        let module = self.module_type(function.return_type.as_ref()?, function.file)?;
        tracing::trace!(function = %callee.name, "resolved ModuleWithProviders call");
        Some(ForeignFunctionResult {
            expression: type_to_value(module)?,
            file: function.file,
        })
    }
}
