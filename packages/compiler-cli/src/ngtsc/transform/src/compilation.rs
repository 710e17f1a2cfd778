// Compilation - The heart of Angular compilation
//
// `IvyCompilation` is responsible for processing all classes in the program.
// Any time a `DecoratorHandler` claims a class, the analysis it produces is
// recorded against the class, and later used to generate the Ivy static
// fields of that class.

use std::sync::Arc;

use angular_compiler::ConstantPool;
use indexmap::IndexMap;
use rayon::prelude::*;
use ts::{ClassDeclaration, DeclId, Diagnostic, FileId, Program, SourceFile};

use super::api::{Analysis, CompileResult, DecoratorHandler, DetectResult};
use super::declaration::DtsFileTransformer;
use crate::ngtsc::diagnostics::HandlerError;
use crate::ngtsc::logging::Logger;
use crate::ngtsc::reflection::{Decorator, ReflectionHost};
use crate::ngtsc::resource::PreloadTask;
use crate::ngtsc::scope::SelectorScopeRegistry;
use crate::ngtsc::typecheck::TypeCheckContext;

/// The analysis of one class by the handler that claimed it.
#[derive(Debug)]
pub struct ClassRecord {
    /// Index of the claiming handler.
    handler: usize,
    /// The decorator that triggered the handler, if any.
    pub decorator: Option<Decorator>,
    pub analysis: Analysis,
    /// Whether the class takes part in template type-checking.
    pub type_check: bool,
}

/// Manages a compilation of Ivy decorators into static fields across an
/// entire program.
pub struct IvyCompilation<'a> {
    handlers: Vec<Box<dyn DecoratorHandler<'a> + 'a>>,
    program: &'a Program,
    reflector: &'a dyn ReflectionHost,
    logger: Arc<dyn Logger>,
    /// Set when `@angular/core` itself is compiled; `.d.ts` imports of core
    /// symbols then go through the r3 symbols file.
    core_imports_from: Option<String>,
    scopes: SelectorScopeRegistry<'a>,
    analysis: IndexMap<DeclId, ClassRecord>,
    diagnostics: Vec<Diagnostic>,
    /// `.d.ts` transforms keyed by the source file they belong to.
    dts_map: IndexMap<String, DtsFileTransformer>,
}

impl<'a> IvyCompilation<'a> {
    /// `handlers` are tried in order; the first whose `detect` matches
    /// claims the class.
    pub fn new(
        handlers: Vec<Box<dyn DecoratorHandler<'a> + 'a>>,
        program: &'a Program,
        reflector: &'a dyn ReflectionHost,
        core_imports_from: Option<String>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            handlers,
            program,
            reflector,
            logger,
            core_imports_from,
            scopes: SelectorScopeRegistry::new(program, reflector),
            analysis: IndexMap::new(),
            diagnostics: Vec::new(),
            dts_map: IndexMap::new(),
        }
    }

    pub fn scopes(&mut self) -> &mut SelectorScopeRegistry<'a> {
        &mut self.scopes
    }

    pub fn reflector(&self) -> &'a dyn ReflectionHost {
        self.reflector
    }

    pub fn is_core(&self) -> bool {
        self.core_imports_from.is_some()
    }

    pub fn core_imports_from(&self) -> Option<&str> {
        self.core_imports_from.as_deref()
    }

    /// Analyze every class of `file`, loading resources synchronously.
    pub fn analyze_sync(&mut self, file: FileId) -> anyhow::Result<()> {
        let program = self.program;
        for class in classes_of(program.file(file)) {
            if let Some((handler, detected)) = self.detect(class) {
                self.analyze_class(class, handler, &detected)?;
            }
        }
        Ok(())
    }

    /// Analyze `files`, first fetching every resource their classes need
    /// concurrently.
    pub fn analyze_async(&mut self, files: &[FileId]) -> anyhow::Result<()> {
        let program = self.program;
        let mut pending = Vec::new();
        let mut tasks: Vec<PreloadTask> = Vec::new();
        for &file in files {
            for class in classes_of(program.file(file)) {
                let Some((handler, detected)) = self.detect(class) else {
                    continue;
                };
                match self.handlers[handler].preanalyze(class, &detected) {
                    Ok(preloads) => tasks.extend(preloads),
                    Err(HandlerError::Fatal(err)) => {
                        self.diagnostics.push(err.to_diagnostic());
                        continue;
                    }
                    Err(HandlerError::Internal(err)) => return Err(err),
                }
                pending.push((class, handler, detected));
            }
        }

        tracing::debug!(tasks = tasks.len(), classes = pending.len(), "preloading resources");
        // A failed preload is reported by the analysis that needs it.
        let failures: Vec<_> = tasks.into_par_iter().filter_map(|task| task.run().err()).collect();
        for failure in failures {
            tracing::debug!(url = %failure.url, message = %failure.message, "preload failed");
        }

        for (class, handler, detected) in pending {
            self.analyze_class(class, handler, &detected)?;
        }
        Ok(())
    }

    /// Finds the handler responsible for `class`. Only the first match
    /// claims it.
    fn detect(&self, class: &ClassDeclaration) -> Option<(usize, DetectResult)> {
        let decorators = self.reflector.get_decorators_of_declaration(class);
        let mut claimed: Option<(usize, DetectResult)> = None;
        for (idx, handler) in self.handlers.iter().enumerate() {
            let Some(detected) = handler.detect(class, decorators.as_deref()) else {
                continue;
            };
            match &claimed {
                None => claimed = Some((idx, detected)),
                Some((first, _)) => {
                    let message = format!(
                        "{:?} also matches class {}, which is already claimed by {:?}",
                        handler.kind(),
                        class.name_text().unwrap_or("<anonymous>"),
                        self.handlers[*first].kind()
                    );
                    self.logger.warn(&message);
                }
            }
        }
        claimed
    }

    fn analyze_class(&mut self, class: &ClassDeclaration, handler: usize, detected: &DetectResult) -> anyhow::Result<()> {
        let name = class.name_text().unwrap_or("<anonymous>");
        self.logger.debug(&format!("analyzing {} as {:?}", name, self.handlers[handler].kind()));
        match self.handlers[handler].analyze(class, detected, &mut self.scopes) {
            Ok(output) => {
                if let Some(diagnostics) = output.diagnostics {
                    self.diagnostics.extend(diagnostics);
                }
                if let Some(analysis) = output.analysis {
                    self.analysis.insert(
                        class.id,
                        ClassRecord {
                            handler,
                            decorator: detected.trigger.clone(),
                            analysis,
                            type_check: output.type_check,
                        },
                    );
                }
                Ok(())
            }
            Err(HandlerError::Fatal(err)) => {
                tracing::debug!(class = name, code = ?err.code, "analysis failed");
                self.diagnostics.push(err.to_diagnostic());
                Ok(())
            }
            Err(HandlerError::Internal(err)) => Err(err),
        }
    }

    /// Add the template of every analyzed component to `ctx`.
    pub fn type_check(&mut self, ctx: &mut TypeCheckContext<'a>) -> anyhow::Result<()> {
        for (decl, record) in &self.analysis {
            if !record.type_check {
                continue;
            }
            let Some(class) = self.program.class(*decl) else {
                continue;
            };
            match self.handlers[record.handler].type_check(ctx, class, &record.analysis, &mut self.scopes) {
                Ok(()) => {}
                Err(HandlerError::Fatal(err)) => self.diagnostics.push(err.to_diagnostic()),
                Err(HandlerError::Internal(err)) => return Err(err),
            }
        }
        Ok(())
    }

    /// Generate the Ivy static fields of `class`, if it was analyzed, and
    /// record them for its `.d.ts`. Must only run once every class of the
    /// program has been analyzed.
    pub fn compile_ivy_field_for(
        &mut self,
        class: &ClassDeclaration,
        constant_pool: &mut ConstantPool,
    ) -> anyhow::Result<Option<Vec<CompileResult>>> {
        let Some(record) = self.analysis.get(&class.id) else {
            return Ok(None);
        };
        let handler = &self.handlers[record.handler];
        match handler.compile(class, &record.analysis, &mut self.scopes, constant_pool) {
            Ok(results) => {
                let name = class.name_text().unwrap_or("<anonymous>");
                self.logger.debug(&format!(
                    "compiled {} into {}",
                    name,
                    results.iter().map(|result| result.name.as_str()).collect::<Vec<_>>().join(", ")
                ));
                let program = self.program;
                self.record_dts(&program.file(class.id.file).file_name, name, &results);
                Ok(Some(results))
            }
            Err(HandlerError::Fatal(err)) => {
                self.diagnostics.push(err.to_diagnostic());
                Ok(None)
            }
            Err(HandlerError::Internal(err)) => Err(err),
        }
    }

    /// The decorator that made `class` an Ivy class, if it has one.
    pub fn ivy_decorator_for(&self, class: &ClassDeclaration) -> Option<&Decorator> {
        self.analysis.get(&class.id)?.decorator.as_ref()
    }

    pub fn record_for(&self, class: &ClassDeclaration) -> Option<&ClassRecord> {
        self.analysis.get(&class.id)
    }

    /// Remember the fields generated for `class_name` so they can be added
    /// to the `.d.ts` emitted for `file`.
    fn record_dts(&mut self, file: &str, class_name: &str, results: &[CompileResult]) {
        let core_imports_from = self.core_imports_from.clone();
        self.dts_map
            .entry(file.to_string())
            .or_insert_with(|| DtsFileTransformer::new(core_imports_from))
            .record_static_field(class_name, results);
    }

    /// The `.d.ts` text emitted for the source `file` with the recorded
    /// fields declared.
    pub fn transformed_dts_for(&self, file: &str, dts: &str) -> anyhow::Result<String> {
        match self.dts_map.get(file) {
            Some(transformer) => transformer.transform(dts, file),
            None => Ok(dts.to_string()),
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Every class of a source file, including those declared inside function
/// bodies. Declaration files have none that need compiling.
fn classes_of(file: &SourceFile) -> Vec<&ClassDeclaration> {
    if file.is_declaration_file() {
        return Vec::new();
    }
    file.all_classes()
}
