// Dependency Injection Utilities
//
// Reads constructor parameters and their parameter decorators into the
// dependency metadata the factory compiler consumes.

use angular_compiler::render3::{R3DependencyMetadata, R3ResolvedDependencyType};
use ts::{ClassDeclaration, SourceFile};

use super::util::{is_angular_decorator, wrap_expression};
use crate::ngtsc::diagnostics::{fatal, ErrorCode, HandlerResult};
use crate::ngtsc::reflection::{CtorParameter, ReflectionHost};

/// Dependencies of the class constructor.
///
/// Returns `None` when the class has no constructor of its own but extends a
/// base class, in which case the factory has to inherit the base factory.
pub fn get_constructor_dependencies(
    class: &ClassDeclaration,
    file: &SourceFile,
    host: &dyn ReflectionHost,
    is_core: bool,
) -> HandlerResult<Option<Vec<R3DependencyMetadata>>> {
    let Some(params) = host.get_constructor_parameters(class) else {
        return Ok(if host.has_base_class(class) { None } else { Some(Vec::new()) });
    };
    let class_name = class.name_text().unwrap_or("<anonymous>");
    params
        .iter()
        .enumerate()
        .map(|(idx, param)| dependency_of_parameter(param, idx, class_name, file, is_core))
        .collect::<HandlerResult<Vec<_>>>()
        .map(Some)
}

fn dependency_of_parameter(
    param: &CtorParameter,
    idx: usize,
    class_name: &str,
    file: &SourceFile,
    is_core: bool,
) -> HandlerResult<R3DependencyMetadata> {
    let mut token = param.type_expression.as_ref().map(|expr| wrap_expression(expr, file));
    let mut resolved = R3ResolvedDependencyType::Token;
    let (mut optional, mut self_, mut skip_self, mut host) = (false, false, false, false);

    for decorator in param.decorators.iter().filter(|d| is_angular_decorator(d, is_core)) {
        let name = decorator.import.as_ref().map_or(decorator.name.as_str(), |import| import.name.as_str());
        match name {
            "Inject" | "Attribute" => {
                let Some([arg]) = decorator.args.as_deref() else {
                    return fatal(
                        ErrorCode::DecoratorArityWrong,
                        Some(decorator.span.clone()),
                        format!("Unexpected number of arguments to @{}().", name),
                    );
                };
                token = Some(wrap_expression(arg, file));
                if name == "Attribute" {
                    resolved = R3ResolvedDependencyType::Attribute;
                }
            }
            "Optional" => optional = true,
            "SkipSelf" => skip_self = true,
            "Self" => self_ = true,
            "Host" => host = true,
            _ => {
                return fatal(
                    ErrorCode::DecoratorUnexpected,
                    Some(decorator.span.clone()),
                    format!("Unexpected decorator {} on parameter.", name),
                )
            }
        }
    }

    let Some(token) = token else {
        let param_name = if param.name.is_empty() { idx.to_string() } else { param.name.clone() };
        return fatal(
            ErrorCode::ParamMissingToken,
            Some(param.span.clone()),
            format!("No suitable token for parameter {} of class {}", param_name, class_name),
        );
    };

    Ok(R3DependencyMetadata {
        token,
        resolved,
        host,
        optional,
        self_,
        skip_self,
    })
}
