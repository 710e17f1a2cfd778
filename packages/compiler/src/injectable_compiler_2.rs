//! Injectable Compiler
//!
//! Compiles `@Injectable` classes into `defineInjectable({providedIn,
//! factory})` definitions. The provider shape decides what the factory
//! returns when the type itself is not being constructed.

use crate::output::output_ast::{expression_type, import_expr, Expression, Type};
use crate::render3::r3_factory::{
    compile_factory_function, R3DependencyMetadata, R3FactoryDelegateType, R3FactoryKind, R3FactoryMetadata,
    R3FactoryTarget,
};
use crate::render3::r3_identifiers::Identifiers as R3;
use crate::render3::util::{type_with_parameters, DefinitionMap, R3CompiledExpression};

/// How an injectable is provided.
#[derive(Debug, Clone, PartialEq)]
pub enum R3InjectableProvider {
    /// Constructs the type itself.
    Constructor { deps: Option<Vec<R3DependencyMetadata>> },
    UseValue(Expression),
    UseExisting(Expression),
    /// `deps` of `None` defers to the class's own factory.
    UseClass {
        class: Expression,
        deps: Option<Vec<R3DependencyMetadata>>,
    },
    /// `deps` of `None` calls the factory without arguments.
    UseFactory {
        factory: Expression,
        deps: Option<Vec<R3DependencyMetadata>>,
    },
}

#[derive(Debug, Clone)]
pub struct R3InjectableMetadata {
    pub name: String,
    pub type_: Expression,
    pub type_argument_count: usize,
    pub provided_in: Expression,
    pub provider: R3InjectableProvider,
}

pub fn compile_injectable(meta: &R3InjectableMetadata) -> R3CompiledExpression {
    let inject = |token: &Expression| import_expr(R3::inject()).call_fn(vec![token.clone()]);
    let kind = match &meta.provider {
        R3InjectableProvider::Constructor { deps } => R3FactoryKind::Constructor { deps: deps.clone() },
        R3InjectableProvider::UseValue(value) => R3FactoryKind::Expression(value.clone()),
        R3InjectableProvider::UseExisting(existing) => R3FactoryKind::Expression(inject(existing)),
        R3InjectableProvider::UseClass { class, deps: Some(deps) } => R3FactoryKind::Delegated {
            delegate: class.clone(),
            delegate_type: R3FactoryDelegateType::Class,
            delegate_deps: deps.clone(),
        },
        R3InjectableProvider::UseClass { class, deps: None } => R3FactoryKind::Expression(inject(class)),
        R3InjectableProvider::UseFactory { factory, deps: Some(deps) } => R3FactoryKind::Delegated {
            delegate: factory.clone(),
            delegate_type: R3FactoryDelegateType::Function,
            delegate_deps: deps.clone(),
        },
        R3InjectableProvider::UseFactory { factory, deps: None } => {
            R3FactoryKind::Expression(factory.call_fn(Vec::new()))
        }
    };

    let factory = compile_factory_function(&R3FactoryMetadata {
        name: meta.name.clone(),
        type_: meta.type_.clone(),
        target: R3FactoryTarget::Injectable,
        kind,
    });

    let mut definition_map = DefinitionMap::new();
    definition_map.set("providedIn", Some(meta.provided_in.clone()));
    definition_map.set("factory", Some(factory.factory));

    let expression = import_expr(R3::define_injectable()).call_fn(vec![definition_map.to_literal_map()]);
    let type_ = expression_type(
        import_expr(R3::injectable_def()),
        Some(vec![type_with_parameters(meta.type_.clone(), meta.type_argument_count)]),
    );
    R3CompiledExpression::new(expression, type_, factory.statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::output_ast::{literal, null_expr, variable, Expression as E, Statement};

    fn factory_body(compiled: &R3CompiledExpression) -> Expression {
        let E::InvokeFn(call) = &compiled.expression else {
            panic!("expected define call");
        };
        let E::LiteralMap(map) = &call.args[0] else {
            panic!("expected definition map");
        };
        assert_eq!(map.entries[0].key, "providedIn");
        let E::Fn(factory) = &map.entries[1].value else {
            panic!("expected factory");
        };
        match &factory.statements[0] {
            Statement::Return(ret) => ret.value.clone(),
            other => panic!("unexpected {:?}", other),
        }
    }

    fn meta(provider: R3InjectableProvider) -> R3InjectableMetadata {
        R3InjectableMetadata {
            name: "Svc".into(),
            type_: variable("Svc"),
            type_argument_count: 0,
            provided_in: literal("root"),
            provider,
        }
    }

    #[test]
    fn should_return_use_value_unless_subclassing() {
        let compiled = compile_injectable(&meta(R3InjectableProvider::UseValue(literal(42.0))));
        let t = variable("t");
        assert_eq!(factory_body(&compiled), t.conditional(t.instantiate(Vec::new()), Some(literal(42.0))));
    }

    #[test]
    fn should_inject_existing_tokens() {
        let compiled = compile_injectable(&meta(R3InjectableProvider::UseExisting(variable("Other"))));
        let E::Conditional(cond) = factory_body(&compiled) else {
            panic!("expected conditional");
        };
        assert_eq!(
            cond.false_case.map(|e| *e),
            Some(import_expr(R3::inject()).call_fn(vec![variable("Other")]))
        );
    }

    #[test]
    fn should_construct_plain_injectables() {
        let compiled = compile_injectable(&meta(R3InjectableProvider::Constructor { deps: Some(Vec::new()) }));
        assert!(matches!(factory_body(&compiled), E::Instantiate(_)));
        assert!(compiled.statements.is_empty());
    }

    #[test]
    fn should_call_factories_without_deps() {
        let compiled = compile_injectable(&meta(R3InjectableProvider::UseFactory {
            factory: variable("make"),
            deps: None,
        }));
        let E::Conditional(cond) = factory_body(&compiled) else {
            panic!("expected conditional");
        };
        assert_eq!(cond.false_case.map(|e| *e), Some(variable("make").call_fn(Vec::new())));
        assert_ne!(*cond.condition, null_expr());
    }
}
