//! Render3 Injector Compiler
//!
//! Injector definitions of NgModules: the module factory, its providers and
//! the modules whose providers it pulls in.

use crate::output::output_ast::{expression_type, import_expr, literal_arr, Expression, Type};

use super::r3_factory::{compile_factory_function, R3DependencyMetadata, R3FactoryKind, R3FactoryMetadata, R3FactoryTarget};
use super::r3_identifiers::Identifiers as R3;
use super::util::{DefinitionMap, R3CompiledExpression, R3Reference};

/// Metadata for injector compilation
#[derive(Debug, Clone)]
pub struct R3InjectorMetadata {
    pub name: String,
    pub type_: R3Reference,
    pub deps: Option<Vec<R3DependencyMetadata>>,
    pub providers: Option<Expression>,
    /// Entries of the `imports` array, usually `[imports]` and `[exports]`.
    pub imports: Vec<Expression>,
}

/// `defineInjector({factory, providers, imports})`
pub fn compile_injector(meta: &R3InjectorMetadata) -> R3CompiledExpression {
    let factory = compile_factory_function(&R3FactoryMetadata {
        name: meta.name.clone(),
        type_: meta.type_.value.clone(),
        target: R3FactoryTarget::NgModule,
        kind: R3FactoryKind::Constructor { deps: meta.deps.clone() },
    });

    let mut definition_map = DefinitionMap::new();
    definition_map.set("factory", Some(factory.factory));
    definition_map.set("providers", meta.providers.clone());
    if !meta.imports.is_empty() {
        definition_map.set("imports", Some(literal_arr(meta.imports.clone())));
    }

    let expression = import_expr(R3::define_injector()).call_fn(vec![definition_map.to_literal_map()]);
    R3CompiledExpression::new(expression, create_injector_type(meta), factory.statements)
}

/// `ɵInjectorDef<T>`
pub fn create_injector_type(meta: &R3InjectorMetadata) -> Type {
    expression_type(
        import_expr(R3::injector_def()),
        Some(vec![expression_type(meta.type_.type_expr.clone(), None)]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::output_ast::{variable, Expression as E};

    #[test]
    fn should_compile_injector_with_imports_and_exports() {
        let meta = R3InjectorMetadata {
            name: "AppModule".into(),
            type_: R3Reference::of(variable("AppModule")),
            deps: Some(Vec::new()),
            providers: Some(literal_arr(vec![variable("Service")])),
            imports: vec![literal_arr(vec![variable("CommonModule")]), literal_arr(Vec::new())],
        };
        let compiled = compile_injector(&meta);
        let E::InvokeFn(call) = &compiled.expression else {
            panic!("expected define call");
        };
        assert_eq!(*call.fn_, import_expr(R3::define_injector()));
        let E::LiteralMap(map) = &call.args[0] else {
            panic!("expected definition map");
        };
        let keys: Vec<&str> = map.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["factory", "providers", "imports"]);
        let E::Fn(factory) = &map.entries[0].value else {
            panic!("expected factory");
        };
        assert_eq!(factory.name.as_deref(), Some("AppModule_Factory"));
    }
}
