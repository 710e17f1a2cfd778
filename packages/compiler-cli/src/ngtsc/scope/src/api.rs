// Scope API
//
// Data the selector scope registry records for NgModules and hands out for
// the components they declare.

use indexmap::IndexMap;

use crate::ngtsc::imports::Reference;
use crate::ngtsc::typecheck::api::TypeCheckableDirectiveMeta;

/// What an NgModule declares, imports and exports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleData {
    pub declarations: Vec<Reference>,
    pub imports: Vec<Reference>,
    pub exports: Vec<Reference>,
}

/// A directive visible in a compilation scope, carried as `T`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeDirective<T> {
    pub directive: T,
    pub meta: TypeCheckableDirectiveMeta,
}

/// Directives and pipes a component template may use.
///
/// `T` is a `Reference` for type-checking and an output expression, already
/// relative to the component's file, for compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationScope<T> {
    /// Keyed by selector.
    pub directives: IndexMap<String, ScopeDirective<T>>,
    /// Keyed by pipe name.
    pub pipes: IndexMap<String, T>,
    /// Whether some directive or pipe is declared after the component in the
    /// same file, so that generated code must defer reading it.
    pub contains_forward_decls: bool,
}

impl<T> Default for CompilationScope<T> {
    fn default() -> Self {
        Self {
            directives: IndexMap::new(),
            pipes: IndexMap::new(),
            contains_forward_decls: false,
        }
    }
}

impl<T> CompilationScope<T> {
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> CompilationScope<U> {
        CompilationScope {
            directives: self
                .directives
                .into_iter()
                .map(|(selector, entry)| {
                    (
                        selector,
                        ScopeDirective {
                            directive: f(entry.directive),
                            meta: entry.meta,
                        },
                    )
                })
                .collect(),
            pipes: self.pipes.into_iter().map(|(name, pipe)| (name, f(pipe))).collect(),
            contains_forward_decls: self.contains_forward_decls,
        }
    }
}
