// Class Metadata
//
// Builds the `ɵsetClassMetadata` call that preserves the Angular decorators of
// a class for TestBed once the decorators themselves are compiled away.

use angular_compiler::output::output_ast::{
    fn_expr, literal_arr, literal_map, undefined_expr, wrapped, Expression, LiteralMapEntry, Statement,
};
use angular_compiler::render3::{compile_class_metadata, R3ClassMetadata};
use ts::{ClassDeclaration, SourceFile};

use super::util::{is_angular_decorator, wrap_expression};
use crate::ngtsc::reflection::{Decorator, ReflectionHost};

/// The metadata statement for `class`, or `None` when it carries no Angular
/// decorator.
pub fn generate_set_class_metadata_call(
    class: &ClassDeclaration,
    file: &SourceFile,
    host: &dyn ReflectionHost,
    is_core: bool,
) -> Option<Statement> {
    let name = class.name_text()?;
    let decorators: Vec<Expression> = host
        .get_decorators_of_declaration(class)?
        .iter()
        .filter(|decorator| is_angular_decorator(decorator, is_core))
        .map(|decorator| decorator_to_metadata(decorator, file))
        .collect();
    if decorators.is_empty() {
        return None;
    }

    let ctor_parameters = host.get_constructor_parameters(class).map(|params| {
        let params = params
            .iter()
            .map(|param| {
                let mut entries = vec![LiteralMapEntry::new(
                    "type",
                    param
                        .type_expression
                        .as_ref()
                        .map_or_else(undefined_expr, |expr| wrap_expression(expr, file)),
                    false,
                )];
                let param_decorators: Vec<Expression> = param
                    .decorators
                    .iter()
                    .filter(|decorator| is_angular_decorator(decorator, is_core))
                    .map(|decorator| decorator_to_metadata(decorator, file))
                    .collect();
                if !param_decorators.is_empty() {
                    entries.push(LiteralMapEntry::new("decorators", literal_arr(param_decorators), false));
                }
                literal_map(entries)
            })
            .collect();
        fn_expr(Vec::new(), vec![literal_arr(params).to_return()], None)
    });

    let prop_decorators: Vec<LiteralMapEntry> = host
        .get_members_of_class(class)
        .iter()
        .filter(|member| !member.is_static)
        .filter_map(|member| {
            let decorators: Vec<Expression> = member
                .decorators
                .iter()
                .filter(|decorator| is_angular_decorator(decorator, is_core))
                .map(|decorator| decorator_to_metadata(decorator, file))
                .collect();
            if decorators.is_empty() {
                None
            } else {
                Some(LiteralMapEntry::new(member.name.as_str(), literal_arr(decorators), false))
            }
        })
        .collect();

    Some(compile_class_metadata(&R3ClassMetadata {
        type_: wrapped(name),
        decorators: literal_arr(decorators),
        ctor_parameters,
        prop_decorators: if prop_decorators.is_empty() {
            None
        } else {
            Some(literal_map(prop_decorators))
        },
    }))
}

/// `{type: Decorator, args: [...]}`
fn decorator_to_metadata(decorator: &Decorator, file: &SourceFile) -> Expression {
    let mut entries = vec![LiteralMapEntry::new("type", wrap_expression(&decorator.identifier, file), false)];
    if let Some(args) = decorator.args.as_ref().filter(|args| !args.is_empty()) {
        let args = args.iter().map(|arg| wrap_expression(arg, file)).collect();
        entries.push(LiteralMapEntry::new("args", literal_arr(args), false));
    }
    literal_map(entries)
}
