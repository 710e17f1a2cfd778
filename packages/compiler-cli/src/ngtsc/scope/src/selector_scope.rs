// Selector Scope Registry
//
// Records NgModules, directives and pipes as the program is analyzed, and
// answers which directives and pipes the template of a declared component
// may use. Classes compiled by earlier compilations are read from their
// `.d.ts` definitions on demand.

use std::collections::{HashMap, HashSet};

use angular_compiler::output::output_ast as o;
use ts::{ClassDeclaration, DeclId, Program};

use super::api::{CompilationScope, ModuleData, ScopeDirective};
use super::dependency::DependencyScopeReader;
use crate::ngtsc::diagnostics::{ErrorCode, FatalDiagnosticError, SourceSpan};
use crate::ngtsc::imports::Reference;
use crate::ngtsc::reflection::ReflectionHost;
use crate::ngtsc::typecheck::api::TypeCheckableDirectiveMeta;

/// Transitive scopes of an NgModule.
#[derive(Debug, Clone)]
struct SelectorScopes {
    /// Everything visible to the module's own declarations.
    compilation: Vec<Reference>,
    /// Everything visible to modules that import it.
    exported: Vec<Reference>,
}

type ScopeResult = Result<SelectorScopes, FatalDiagnosticError>;

pub struct SelectorScopeRegistry<'a> {
    program: &'a Program,
    dependencies: DependencyScopeReader<'a>,

    module_to_data: HashMap<DeclId, (Reference, ModuleData)>,
    directive_to_metadata: HashMap<DeclId, TypeCheckableDirectiveMeta>,
    pipe_to_name: HashMap<DeclId, String>,
    declared_type_to_module: HashMap<DeclId, DeclId>,

    scope_cache: HashMap<DeclId, ScopeResult>,
    compilation_scope_cache: HashMap<DeclId, CompilationScope<Reference>>,
    /// Modules whose scopes are being computed.
    resolving: HashSet<DeclId>,
}

impl<'a> SelectorScopeRegistry<'a> {
    pub fn new(program: &'a Program, reflector: &'a dyn ReflectionHost) -> Self {
        Self {
            program,
            dependencies: DependencyScopeReader::new(program, reflector),
            module_to_data: HashMap::new(),
            directive_to_metadata: HashMap::new(),
            pipe_to_name: HashMap::new(),
            declared_type_to_module: HashMap::new(),
            scope_cache: HashMap::new(),
            compilation_scope_cache: HashMap::new(),
            resolving: HashSet::new(),
        }
    }

    pub fn register_module(&mut self, module: Reference, data: ModuleData) -> Result<(), FatalDiagnosticError> {
        if self.module_to_data.contains_key(&module.decl) {
            return Err(self.duplicate(&module, format!("NgModule {} is registered twice", module.name)));
        }
        for declaration in &data.declarations {
            if let Some(owner) = self.declared_type_to_module.get(&declaration.decl) {
                let owner_name = self
                    .module_to_data
                    .get(owner)
                    .map_or("<unknown>", |(reference, _)| reference.name.as_str());
                return Err(self.duplicate(
                    &module,
                    format!(
                        "{} is declared by more than one NgModule: {} and {}",
                        declaration.name, owner_name, module.name
                    ),
                ));
            }
        }
        for declaration in &data.declarations {
            self.declared_type_to_module.insert(declaration.decl, module.decl);
        }
        tracing::debug!(module = %module.name, declarations = data.declarations.len(), "registered NgModule");
        self.module_to_data.insert(module.decl, (module, data));
        Ok(())
    }

    pub fn register_directive(&mut self, meta: TypeCheckableDirectiveMeta) -> Result<(), FatalDiagnosticError> {
        let decl = meta.reference.decl;
        if self.directive_to_metadata.contains_key(&decl) {
            return Err(self.duplicate(&meta.reference, format!("Directive {} is registered twice", meta.name)));
        }
        self.directive_to_metadata.insert(decl, meta);
        Ok(())
    }

    pub fn register_pipe(&mut self, pipe: &Reference, name: impl Into<String>) -> Result<(), FatalDiagnosticError> {
        if self.pipe_to_name.contains_key(&pipe.decl) {
            return Err(self.duplicate(pipe, format!("Pipe {} is registered twice", pipe.name)));
        }
        self.pipe_to_name.insert(pipe.decl, name.into());
        Ok(())
    }

    /// The module that declares `decl`, if one was registered.
    pub fn declaring_module(&self, decl: DeclId) -> Option<&Reference> {
        let module = self.declared_type_to_module.get(&decl)?;
        self.module_to_data.get(module).map(|(reference, _)| reference)
    }

    /// Compilation scope of a component as references, for type-checking.
    /// `None` when no registered NgModule declares the component.
    pub fn lookup_compilation_scope_as_refs(
        &mut self,
        component: DeclId,
    ) -> Result<Option<CompilationScope<Reference>>, FatalDiagnosticError> {
        let Some(module) = self.declaring_module(component).cloned() else {
            return Ok(None);
        };
        if let Some(scope) = self.compilation_scope_cache.get(&module.decl) {
            return Ok(Some(scope.clone()));
        }
        let Some(scopes) = self.lookup_scopes(&module)? else {
            return Ok(None);
        };

        let mut scope = CompilationScope::default();
        for reference in scopes.compilation {
            if let Some(meta) = self.lookup_directive_metadata(&reference) {
                // Directives without a selector never match.
                if let Some(selector) = meta.selector.clone().filter(|s| !s.is_empty()) {
                    scope.directives.insert(
                        selector,
                        ScopeDirective {
                            directive: reference,
                            meta,
                        },
                    );
                }
            } else if let Some(name) = self.lookup_pipe_name(&reference) {
                scope.pipes.insert(name, reference);
            }
        }
        self.compilation_scope_cache.insert(module.decl, scope.clone());
        Ok(Some(scope))
    }

    /// Compilation scope of a component with every directive and pipe turned
    /// into an expression usable from the component's file.
    pub fn lookup_compilation_scope(
        &mut self,
        component: &ClassDeclaration,
    ) -> Result<Option<CompilationScope<o::Expression>>, FatalDiagnosticError> {
        let Some(scope) = self.lookup_compilation_scope_as_refs(component.id)? else {
            return Ok(None);
        };
        let context_file = self.program.file(component.id.file).file_name.clone();
        let contains_forward_decls = scope
            .directives
            .values()
            .map(|entry| &entry.directive)
            .chain(scope.pipes.values())
            .any(|reference| self.is_forward_declared(reference, component));
        let mut scope = scope.map(|reference| reference.to_expression(&context_file));
        scope.contains_forward_decls = contains_forward_decls;
        Ok(Some(scope))
    }

    fn is_forward_declared(&self, reference: &Reference, component: &ClassDeclaration) -> bool {
        if reference.is_absolute() || reference.decl.file != component.id.file {
            return false;
        }
        self.program
            .declaration(reference.decl)
            .is_some_and(|decl| decl.range().pos > component.range.pos)
    }

    fn lookup_module_data(&self, module: &Reference) -> Option<ModuleData> {
        match self.module_to_data.get(&module.decl) {
            Some((_, data)) => Some(data.clone()),
            None => self.dependencies.read_module_data(module),
        }
    }

    fn lookup_directive_metadata(&self, reference: &Reference) -> Option<TypeCheckableDirectiveMeta> {
        match self.directive_to_metadata.get(&reference.decl) {
            Some(meta) => Some(meta.clone()),
            None => self.dependencies.read_directive_metadata(reference),
        }
    }

    fn lookup_pipe_name(&self, reference: &Reference) -> Option<String> {
        match self.pipe_to_name.get(&reference.decl) {
            Some(name) => Some(name.clone()),
            None => self.dependencies.read_pipe_name(reference),
        }
    }

    /// Scopes of `module`, or `None` if it is not an NgModule.
    fn lookup_scopes(&mut self, module: &Reference) -> Result<Option<SelectorScopes>, FatalDiagnosticError> {
        if let Some(cached) = self.scope_cache.get(&module.decl) {
            return cached.clone().map(Some);
        }
        let Some(data) = self.lookup_module_data(module) else {
            return Ok(None);
        };
        if !self.resolving.insert(module.decl) {
            return Err(FatalDiagnosticError::new(
                ErrorCode::ScopeCycle,
                self.span_of(module),
                format!("Cyclic dependency while computing the scope of NgModule {}", module.name),
            ));
        }
        let result = self.compute_scopes(&data);
        self.resolving.remove(&module.decl);
        self.scope_cache.insert(module.decl, result.clone());
        result.map(Some)
    }

    fn compute_scopes(&mut self, data: &ModuleData) -> ScopeResult {
        let mut compilation = data.declarations.clone();
        let mut exported = Vec::new();

        for import in &data.imports {
            match self.lookup_scopes(import)? {
                Some(scopes) => compilation.extend(scopes.exported),
                None => tracing::trace!(import = %import.name, "imported type is not an NgModule"),
            }
        }
        for export in &data.exports {
            match self.lookup_scopes(export)? {
                Some(scopes) => {
                    compilation.extend(scopes.exported.iter().cloned());
                    exported.extend(scopes.exported);
                }
                None => exported.push(export.clone()),
            }
        }
        Ok(SelectorScopes { compilation, exported })
    }

    fn span_of(&self, reference: &Reference) -> Option<SourceSpan> {
        let decl = self.program.declaration(reference.decl)?;
        Some(SourceSpan::new(reference.file_name.clone(), decl.range()))
    }

    fn duplicate(&self, reference: &Reference, message: String) -> FatalDiagnosticError {
        FatalDiagnosticError::new(ErrorCode::DuplicateRegistration, self.span_of(reference), message)
    }
}
