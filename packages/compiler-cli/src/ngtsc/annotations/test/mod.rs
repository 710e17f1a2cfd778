// Decorator Handler Tests
//
// Each suite runs the full handler set over an in-memory program, the way
// the program driver does, and inspects the recorded analyses.

use std::sync::Arc;

use ts::{ClassDeclaration, Program};

use super::common::AnalysisContext;
use super::*;
use crate::ngtsc::logging::NullLogger;
use crate::ngtsc::reflection::ReflectionHost;
use crate::ngtsc::resource::{FileResourceLoader, ResourceLoader};
use crate::ngtsc::transform::{Analysis, DecoratorHandler, IvyCompilation};

mod base_def_spec;
mod component_spec;
mod directive_spec;
mod injectable_spec;
mod ng_module_spec;

pub(super) const MAIN: &str = "/app/main.ts";

pub(super) fn compilation<'a>(
    program: &'a Program,
    reflector: &'a dyn ReflectionHost,
    loader: Arc<dyn ResourceLoader>,
) -> IvyCompilation<'a> {
    let ctx = AnalysisContext::new(program, reflector, false);
    let handlers: Vec<Box<dyn DecoratorHandler<'a> + 'a>> = vec![
        Box::new(BaseDefDecoratorHandler::new(ctx)),
        Box::new(ComponentDecoratorHandler::new(ctx, loader, vec!["/app".to_string()], false)),
        Box::new(DirectiveDecoratorHandler::new(ctx)),
        Box::new(InjectableDecoratorHandler::new(ctx)),
        Box::new(NgModuleDecoratorHandler::new(ctx)),
        Box::new(PipeDecoratorHandler::new(ctx)),
    ];
    IvyCompilation::new(handlers, program, reflector, None, Arc::new(NullLogger::new()))
}

/// Analyzes every source file of `program` with resources read from disk.
pub(super) fn analyze<'a>(program: &'a Program, reflector: &'a dyn ReflectionHost) -> IvyCompilation<'a> {
    analyze_with(program, reflector, Arc::new(FileResourceLoader::new()))
}

pub(super) fn analyze_with<'a>(
    program: &'a Program,
    reflector: &'a dyn ReflectionHost,
    loader: Arc<dyn ResourceLoader>,
) -> IvyCompilation<'a> {
    let mut compilation = compilation(program, reflector, loader);
    for file in program.source_files() {
        compilation.analyze_sync(file.id).unwrap();
    }
    compilation
}

pub(super) fn class<'p>(program: &'p Program, name: &str) -> &'p ClassDeclaration {
    program.find_class(MAIN, name).unwrap()
}

pub(super) fn analysis_of<'c>(compilation: &'c IvyCompilation<'_>, class: &ClassDeclaration) -> &'c Analysis {
    &compilation.record_for(class).unwrap().analysis
}

pub(super) fn codes(compilation: &IvyCompilation<'_>) -> Vec<i32> {
    compilation.diagnostics().iter().map(|diagnostic| diagnostic.code).collect()
}
