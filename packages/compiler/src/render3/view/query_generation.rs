//! Render3 Query Generation
//!
//! Content and view query functions of directive and component definitions.
//! Both run in creation mode to declare the queries and in update mode to
//! refresh them and assign the results to the class properties.

use crate::constant_pool::ConstantPool;
use crate::core::RenderFlags;
use crate::output::output_ast::{
    fn_expr, import_expr, literal, null_expr, variable, write_var, BinaryOperator, DeclareVarStmt, Expression,
    FnParam, IfStmt, Statement,
};
use crate::render3::r3_identifiers::Identifiers as R3;
use crate::render3::util::as_literal;

use super::api::{R3QueryMetadata, R3QueryPredicate};
use super::template::{CONTEXT_NAME, RENDER_FLAGS};

const TEMPORARY_NAME: &str = "_t";
const DIRECTIVE_INDEX: &str = "dirIndex";

/// A type reference, or the selector list shared through the constant pool.
fn get_query_predicate(query: &R3QueryMetadata, constant_pool: &mut ConstantPool) -> Expression {
    match &query.predicate {
        R3QueryPredicate::Type(expression) => expression.clone(),
        R3QueryPredicate::Selectors(selectors) => {
            // `@ViewChild('a, b')` queries two local references
            let names: Vec<String> = selectors
                .iter()
                .flat_map(|selector| selector.split(','))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            constant_pool.get_const_literal(as_literal(&names), true)
        }
    }
}

/// `predicate, descendants, read` arguments of a query instruction.
fn query_args(query: &R3QueryMetadata, constant_pool: &mut ConstantPool) -> Vec<Expression> {
    vec![
        get_query_predicate(query, constant_pool),
        literal(query.descendants),
        query.read.clone().unwrap_or_else(null_expr),
    ]
}

/// `ɵqueryRefresh(_t = load()) && (ctx.prop = _t.first)`
fn refresh_statement(query: &R3QueryMetadata, load: Expression) -> Statement {
    let temporary = variable(TEMPORARY_NAME);
    let result = if query.first {
        temporary.prop("first")
    } else {
        temporary
    };
    let refreshed = import_expr(R3::query_refresh()).call_fn(vec![write_var(TEMPORARY_NAME, load)]);
    refreshed
        .binary(
            BinaryOperator::And,
            variable(CONTEXT_NAME).set_prop(query.property_name.as_str(), result),
        )
        .to_stmt()
}

fn render_flag_block(flag: RenderFlags, statements: Vec<Statement>) -> Statement {
    Statement::If(IfStmt {
        condition: variable(RENDER_FLAGS).bitwise_and(literal(flag as u8 as f64)),
        true_case: statements,
        false_case: Vec::new(),
    })
}

fn temporary_declaration() -> Statement {
    Statement::DeclareVar(DeclareVarStmt {
        name: TEMPORARY_NAME.to_string(),
        value: None,
        type_: None,
        modifiers: Vec::new(),
    })
}

/// `function <Name>_ContentQueries(rf, ctx, dirIndex) { ... }`
pub fn create_content_queries_function(
    queries: &[R3QueryMetadata],
    constant_pool: &mut ConstantPool,
    name: &str,
) -> Expression {
    let mut create = Vec::with_capacity(queries.len());
    let mut update = vec![temporary_declaration()];
    for query in queries {
        let mut args = vec![variable(DIRECTIVE_INDEX)];
        args.extend(query_args(query, constant_pool));
        create.push(import_expr(R3::content_query()).call_fn(args).to_stmt());
        update.push(refresh_statement(
            query,
            import_expr(R3::load_content_query()).call_fn(Vec::new()),
        ));
    }

    fn_expr(
        vec![
            FnParam::new(RENDER_FLAGS),
            FnParam::new(CONTEXT_NAME),
            FnParam::new(DIRECTIVE_INDEX),
        ],
        vec![
            render_flag_block(RenderFlags::Create, create),
            render_flag_block(RenderFlags::Update, update),
        ],
        Some(format!("{}_ContentQueries", name)),
    )
}

/// `function <Name>_Query(rf, ctx) { ... }`
pub fn create_view_queries_function(
    queries: &[R3QueryMetadata],
    constant_pool: &mut ConstantPool,
    name: &str,
) -> Expression {
    let mut create = Vec::with_capacity(queries.len());
    let mut update = vec![temporary_declaration()];
    for query in queries {
        create.push(
            import_expr(R3::view_query())
                .call_fn(query_args(query, constant_pool))
                .to_stmt(),
        );
        update.push(refresh_statement(query, import_expr(R3::load_view_query()).call_fn(Vec::new())));
    }

    fn_expr(
        vec![FnParam::new(RENDER_FLAGS), FnParam::new(CONTEXT_NAME)],
        vec![
            render_flag_block(RenderFlags::Create, create),
            render_flag_block(RenderFlags::Update, update),
        ],
        Some(format!("{}_Query", name)),
    )
}
