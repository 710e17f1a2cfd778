//! Render3 Class Metadata Compiler
//!
//! `ɵsetClassMetadata` calls that keep a class's Angular decorators
//! available to TestBed after the decorators are compiled away.

use crate::output::output_ast::{fn_expr, import_expr, null_expr, Expression, Statement};

use super::r3_identifiers::Identifiers as R3;

/// Metadata of a class which captures the original Angular decorators
#[derive(Debug, Clone)]
pub struct R3ClassMetadata {
    /// The class type for which the metadata is captured
    pub type_: Expression,
    /// `[{type, args}]` for the Angular decorators applied on the class
    pub decorators: Expression,
    /// `function () { return [{type, decorators}]; }` for constructor parameters
    pub ctor_parameters: Option<Expression>,
    /// `{prop: [{type, args}]}` for decorated properties
    pub prop_decorators: Option<Expression>,
}

/// `(function () { ɵsetClassMetadata(Type, decorators, ctorParams, propDecorators); })();`
/// as a pure call, so unused metadata is tree-shaken.
pub fn compile_class_metadata(metadata: &R3ClassMetadata) -> Statement {
    let set_metadata = import_expr(R3::set_class_metadata()).call_fn(vec![
        metadata.type_.clone(),
        metadata.decorators.clone(),
        metadata.ctor_parameters.clone().unwrap_or_else(null_expr),
        metadata.prop_decorators.clone().unwrap_or_else(null_expr),
    ]);
    fn_expr(Vec::new(), vec![set_metadata.to_stmt()], None)
        .call_pure(Vec::new())
        .to_stmt()
}
