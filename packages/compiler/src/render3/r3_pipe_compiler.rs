//! Render3 Pipe Compiler
//!
//! Pipe definition compilation.

use super::r3_factory::{compile_factory_function, R3DependencyMetadata, R3FactoryKind, R3FactoryMetadata, R3FactoryTarget};
use super::r3_identifiers::Identifiers as R3;
use super::util::{type_with_parameters, DefinitionMap, R3CompiledExpression};
use crate::output::output_ast::{expression_type, import_expr, literal, Expression, Type};

/// Metadata for pipe compilation
#[derive(Debug, Clone)]
pub struct R3PipeMetadata {
    /// Name of the pipe type
    pub name: String,
    /// An expression representing a reference to the pipe itself
    pub type_: Expression,
    /// Number of generic type parameters of the type itself
    pub type_argument_count: usize,
    /// Name the pipe is used by in templates
    pub pipe_name: String,
    /// Dependencies of the pipe's constructor
    pub deps: Option<Vec<R3DependencyMetadata>>,
    /// Whether the pipe is marked as pure
    pub pure: bool,
}

/// `ɵdefinePipe({name, type, factory, pure})`
pub fn compile_pipe_from_metadata(metadata: &R3PipeMetadata) -> R3CompiledExpression {
    let factory = compile_factory_function(&R3FactoryMetadata {
        name: metadata.name.clone(),
        type_: metadata.type_.clone(),
        target: R3FactoryTarget::Pipe,
        kind: R3FactoryKind::Constructor {
            deps: metadata.deps.clone(),
        },
    });

    let mut definition_map = DefinitionMap::new();
    definition_map.set("name", Some(literal(metadata.pipe_name.as_str())));
    definition_map.set("type", Some(metadata.type_.clone()));
    definition_map.set("factory", Some(factory.factory));
    definition_map.set("pure", Some(literal(metadata.pure)));

    let expression = import_expr(R3::define_pipe()).call_fn(vec![definition_map.to_literal_map()]);
    R3CompiledExpression::new(expression, create_pipe_type(metadata), factory.statements)
}

/// `ɵPipeDefWithMeta<T, "name">`
pub fn create_pipe_type(metadata: &R3PipeMetadata) -> Type {
    expression_type(
        import_expr(R3::pipe_def_with_meta()),
        Some(vec![
            type_with_parameters(metadata.type_.clone(), metadata.type_argument_count),
            expression_type(literal(metadata.pipe_name.as_str()), None),
        ]),
    )
}
