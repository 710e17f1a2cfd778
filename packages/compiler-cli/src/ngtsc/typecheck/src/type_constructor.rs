// Type Constructors
//
// A type constructor is a static method added to a directive class so the
// type checker can infer the directive's generic parameters from the values
// bound to its inputs:
//
//   static ngTypeCtor<T>(init: Partial<Pick<NgForOf<T>, "ngForOf">>): NgForOf<T> { return null!; }

use ts::{ClassDeclaration, SourceFile};

use super::expression::string_literal;
use crate::ngtsc::typecheck::api::TypeCtorMetadata;

/// Prints the type constructor described by `meta` for `node`.
pub fn generate_type_ctor(node: &ClassDeclaration, file: &SourceFile, meta: &TypeCtorMetadata) -> anyhow::Result<String> {
    let name = node
        .name_text()
        .ok_or_else(|| anyhow::anyhow!("type constructor requested for an anonymous class"))?;
    let (params, args) = type_parameters(node, file);
    let raw_type = format!("{}{}", name, args);

    let keys: Vec<String> = meta
        .fields
        .inputs
        .iter()
        .chain(&meta.fields.outputs)
        .chain(&meta.fields.queries)
        .map(|key| string_literal(key))
        .collect();
    let key_type = if keys.is_empty() {
        "never".to_string()
    } else {
        keys.join(" | ")
    };

    let signature = format!(
        "static {}{}(init: Partial<Pick<{}, {}>>): {}",
        meta.fn_name, params, raw_type, key_type, raw_type
    );
    Ok(if meta.body {
        format!("{} {{ return null!; }}", signature)
    } else {
        format!("{};", signature)
    })
}

/// The type parameter list of `node` as declared, and as type arguments
/// referencing those parameters. Both are empty for a non-generic class.
pub(crate) fn type_parameters(node: &ClassDeclaration, file: &SourceFile) -> (String, String) {
    if node.type_parameters.is_empty() {
        return (String::new(), String::new());
    }
    let declared: Vec<String> = node
        .type_parameters
        .iter()
        .map(|param| {
            let mut text = param.name.clone();
            if let Some(constraint) = &param.constraint {
                text.push_str(" extends ");
                text.push_str(file.text_of(constraint.range));
            }
            if let Some(default) = &param.default {
                text.push_str(" = ");
                text.push_str(file.text_of(default.range));
            }
            text
        })
        .collect();
    let names: Vec<&str> = node.type_parameters.iter().map(|param| param.name.as_str()).collect();
    (format!("<{}>", declared.join(", ")), format!("<{}>", names.join(", ")))
}
