//! Render3 Module Compiler
//!
//! NgModule definition compilation. The definition records the module's
//! selector scope: what it bootstraps, declares, imports and exports.

use crate::output::output_ast::{
    expression_type, fn_expr, import_expr, literal_arr, none_type, typeof_expr, Expression, Type,
};

use super::r3_identifiers::Identifiers as R3;
use super::util::{DefinitionMap, R3CompiledExpression, R3Reference};

/// Metadata of an NgModule.
#[derive(Debug, Clone)]
pub struct R3NgModuleMetadata {
    pub type_: R3Reference,
    pub bootstrap: Vec<R3Reference>,
    pub declarations: Vec<R3Reference>,
    pub imports: Vec<R3Reference>,
    pub exports: Vec<R3Reference>,
    /// Some references are declared later in the file, so the arrays are
    /// emitted as closures.
    pub contains_forward_decls: bool,
}

/// `ɵdefineNgModule({type, bootstrap, declarations, imports, exports})`
pub fn compile_ng_module(meta: &R3NgModuleMetadata) -> R3CompiledExpression {
    let mut definition_map = DefinitionMap::new();
    definition_map.set("type", Some(meta.type_.value.clone()));
    definition_map.set("bootstrap", Some(refs_to_array(&meta.bootstrap, meta.contains_forward_decls)));
    definition_map.set(
        "declarations",
        Some(refs_to_array(&meta.declarations, meta.contains_forward_decls)),
    );
    definition_map.set("imports", Some(refs_to_array(&meta.imports, meta.contains_forward_decls)));
    definition_map.set("exports", Some(refs_to_array(&meta.exports, meta.contains_forward_decls)));

    let expression = import_expr(R3::define_ng_module()).call_fn(vec![definition_map.to_literal_map()]);
    R3CompiledExpression::new(expression, create_ng_module_type(meta), Vec::new())
}

/// `ɵNgModuleDefWithMeta<T, [typeof D...], [typeof I...], [typeof E...]>`
pub fn create_ng_module_type(meta: &R3NgModuleMetadata) -> Type {
    expression_type(
        import_expr(R3::ng_module_def_with_meta()),
        Some(vec![
            expression_type(meta.type_.type_expr.clone(), None),
            tuple_type_of(&meta.declarations),
            tuple_type_of(&meta.imports),
            tuple_type_of(&meta.exports),
        ]),
    )
}

fn refs_to_array(refs: &[R3Reference], should_force_to_function: bool) -> Expression {
    let values = literal_arr(refs.iter().map(|r| r.value.clone()).collect());
    if should_force_to_function {
        fn_expr(Vec::new(), vec![values.to_return()], None)
    } else {
        values
    }
}

/// `[typeof A, typeof B]`, or `never` for no entries.
fn tuple_type_of(refs: &[R3Reference]) -> Type {
    if refs.is_empty() {
        return none_type();
    }
    expression_type(
        literal_arr(refs.iter().map(|r| typeof_expr(r.type_expr.clone())).collect()),
        None,
    )
}
