//! Render3 Factory
//!
//! Factory functions that instantiate a decorated class with its injected
//! constructor dependencies.

use super::r3_identifiers::Identifiers as R3;
use crate::output::output_ast::{
    fn_expr, import_expr, literal, variable, BinaryOperator, Expression, FnParam, Statement, StmtModifier,
    DeclareVarStmt,
};

/// What the factory is for. Selects the injection instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum R3FactoryTarget {
    Directive,
    Component,
    Pipe,
    Injectable,
    NgModule,
}

impl R3FactoryTarget {
    /// Node injectors serve declarables. Module and root injectors serve the rest.
    fn inject_fn(self) -> Expression {
        match self {
            R3FactoryTarget::Directive | R3FactoryTarget::Component | R3FactoryTarget::Pipe => {
                import_expr(R3::directive_inject())
            }
            R3FactoryTarget::Injectable | R3FactoryTarget::NgModule => import_expr(R3::inject()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum R3ResolvedDependencyType {
    /// Injected by token.
    Token,
    /// `@Attribute()`: the token is the literal attribute name.
    Attribute,
}

/// Bit flags matching `InjectFlags` in `@angular/core`.
pub mod inject_flags {
    pub const DEFAULT: u32 = 0;
    pub const HOST: u32 = 1;
    pub const SELF: u32 = 2;
    pub const SKIP_SELF: u32 = 4;
    pub const OPTIONAL: u32 = 8;
}

#[derive(Debug, Clone, PartialEq)]
pub struct R3DependencyMetadata {
    pub token: Expression,
    pub resolved: R3ResolvedDependencyType,
    pub host: bool,
    pub optional: bool,
    pub self_: bool,
    pub skip_self: bool,
}

impl R3DependencyMetadata {
    pub fn token(token: Expression) -> Self {
        R3DependencyMetadata {
            token,
            resolved: R3ResolvedDependencyType::Token,
            host: false,
            optional: false,
            self_: false,
            skip_self: false,
        }
    }

    pub fn flags(&self) -> u32 {
        let mut flags = inject_flags::DEFAULT;
        if self.host {
            flags |= inject_flags::HOST;
        }
        if self.self_ {
            flags |= inject_flags::SELF;
        }
        if self.skip_self {
            flags |= inject_flags::SKIP_SELF;
        }
        if self.optional {
            flags |= inject_flags::OPTIONAL;
        }
        flags
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum R3FactoryDelegateType {
    /// `new Delegate(...deps)`
    Class,
    /// `delegate(...deps)`
    Function,
}

#[derive(Debug, Clone, PartialEq)]
pub enum R3FactoryKind {
    /// Instantiates the type itself. `None` deps means the constructor is
    /// inherited, so the base class factory is used.
    Constructor { deps: Option<Vec<R3DependencyMetadata>> },
    Delegated {
        delegate: Expression,
        delegate_type: R3FactoryDelegateType,
        delegate_deps: Vec<R3DependencyMetadata>,
    },
    /// Returns an arbitrary expression unless a subclass is being created.
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct R3FactoryMetadata {
    /// Used to name the factory function, `<name>_Factory`.
    pub name: String,
    pub type_: Expression,
    pub target: R3FactoryTarget,
    pub kind: R3FactoryKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct R3FactoryFn {
    pub factory: Expression,
    /// Declarations the factory depends on, emitted next to the class.
    pub statements: Vec<Statement>,
}

/// Builds `function <Name>_Factory(t) { ... }`.
pub fn compile_factory_function(meta: &R3FactoryMetadata) -> R3FactoryFn {
    let t = variable("t");
    let mut statements = Vec::new();
    let type_for_ctor = t.binary(BinaryOperator::Or, meta.type_.clone());

    let body = match &meta.kind {
        R3FactoryKind::Constructor { deps: Some(deps) } => {
            type_for_ctor.instantiate(inject_dependencies(deps, meta.target))
        }
        R3FactoryKind::Constructor { deps: None } => {
            let base_factory = format!("ɵ{}_BaseFactory", meta.name);
            statements.push(Statement::DeclareVar(DeclareVarStmt {
                name: base_factory.clone(),
                value: Some(import_expr(R3::get_inherited_factory()).call_fn(vec![meta.type_.clone()])),
                type_: None,
                modifiers: vec![StmtModifier::Exported, StmtModifier::Final],
            }));
            variable(base_factory).call_fn(vec![type_for_ctor])
        }
        R3FactoryKind::Delegated {
            delegate,
            delegate_type,
            delegate_deps,
        } => {
            let args = inject_dependencies(delegate_deps, meta.target);
            let created = match delegate_type {
                R3FactoryDelegateType::Class => delegate.instantiate(args),
                R3FactoryDelegateType::Function => delegate.call_fn(args),
            };
            t.conditional(t.instantiate(Vec::new()), Some(created))
        }
        R3FactoryKind::Expression(expression) => t.conditional(t.instantiate(Vec::new()), Some(expression.clone())),
    };

    R3FactoryFn {
        factory: fn_expr(
            vec![FnParam::new("t")],
            vec![body.to_return()],
            Some(format!("{}_Factory", meta.name)),
        ),
        statements,
    }
}

fn inject_dependencies(deps: &[R3DependencyMetadata], target: R3FactoryTarget) -> Vec<Expression> {
    deps.iter().map(|dep| compile_inject_dependency(dep, target)).collect()
}

fn compile_inject_dependency(dep: &R3DependencyMetadata, target: R3FactoryTarget) -> Expression {
    match dep.resolved {
        R3ResolvedDependencyType::Attribute => import_expr(R3::inject_attribute()).call_fn(vec![dep.token.clone()]),
        R3ResolvedDependencyType::Token => {
            let flags = dep.flags();
            let mut args = vec![dep.token.clone()];
            if flags != inject_flags::DEFAULT {
                args.push(literal(flags as f64));
            }
            target.inject_fn().call_fn(args)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::output_ast::{Expression as E, InvokeFunctionExpr, LiteralExpr, LiteralValue};

    fn body(factory: &R3FactoryFn) -> &Expression {
        let E::Fn(function) = &factory.factory else {
            panic!("expected function");
        };
        match &function.statements[0] {
            Statement::Return(ret) => &ret.value,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn should_inject_constructor_dependencies_with_flags() {
        let mut optional = R3DependencyMetadata::token(variable("Dep"));
        optional.optional = true;
        optional.self_ = true;
        let meta = R3FactoryMetadata {
            name: "Dir".into(),
            type_: variable("Dir"),
            target: R3FactoryTarget::Directive,
            kind: R3FactoryKind::Constructor {
                deps: Some(vec![optional]),
            },
        };
        let factory = compile_factory_function(&meta);
        let E::Instantiate(created) = body(&factory) else {
            panic!("expected instantiation");
        };
        let E::InvokeFn(InvokeFunctionExpr { fn_, args, .. }) = &created.args[0] else {
            panic!("expected inject call");
        };
        assert_eq!(**fn_, import_expr(R3::directive_inject()));
        assert_eq!(
            args[1],
            E::Literal(LiteralExpr {
                value: LiteralValue::Number(10.0)
            })
        );
    }

    #[test]
    fn should_use_inherited_factory_without_constructor() {
        let meta = R3FactoryMetadata {
            name: "Child".into(),
            type_: variable("Child"),
            target: R3FactoryTarget::Injectable,
            kind: R3FactoryKind::Constructor { deps: None },
        };
        let factory = compile_factory_function(&meta);
        assert_eq!(factory.statements.len(), 1);
        let Statement::DeclareVar(decl) = &factory.statements[0] else {
            panic!("expected declaration");
        };
        assert_eq!(decl.name, "ɵChild_BaseFactory");
    }

    #[test]
    fn should_delegate_when_not_creating_a_subclass() {
        let meta = R3FactoryMetadata {
            name: "Svc".into(),
            type_: variable("Svc"),
            target: R3FactoryTarget::Injectable,
            kind: R3FactoryKind::Expression(variable("value")),
        };
        let factory = compile_factory_function(&meta);
        assert!(matches!(body(&factory), E::Conditional(_)));
    }
}
