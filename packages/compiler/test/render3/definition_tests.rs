use angular_compiler::output::output_ast::{import_expr, literal_arr, variable, Expression};
use angular_compiler::render3::{
    compile_injector, compile_ng_module, compile_pipe_from_metadata, Identifiers as R3, R3DependencyMetadata,
    R3InjectorMetadata, R3NgModuleMetadata, R3PipeMetadata, R3Reference,
};
use angular_compiler::{compile_injectable, R3InjectableMetadata, R3InjectableProvider};

#[cfg(test)]
mod tests {
    use super::*;

    fn callee(expression: &Expression) -> Expression {
        match expression {
            Expression::InvokeFn(call) => (*call.fn_).clone(),
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn should_compile_module_and_injector_definitions() {
        let module = R3NgModuleMetadata {
            type_: R3Reference::of(variable("AppModule")),
            bootstrap: vec![R3Reference::of(variable("AppCmp"))],
            declarations: vec![R3Reference::of(variable("AppCmp"))],
            imports: Vec::new(),
            exports: Vec::new(),
            contains_forward_decls: false,
        };
        let ng_module_def = compile_ng_module(&module);
        assert_eq!(callee(&ng_module_def.expression), import_expr(R3::define_ng_module()));

        let injector_def = compile_injector(&R3InjectorMetadata {
            name: "AppModule".into(),
            type_: module.type_.clone(),
            deps: Some(Vec::new()),
            providers: None,
            imports: vec![literal_arr(Vec::new()), literal_arr(Vec::new())],
        });
        assert_eq!(callee(&injector_def.expression), import_expr(R3::define_injector()));
    }

    #[test]
    fn should_compile_pipes_with_dependencies() {
        let compiled = compile_pipe_from_metadata(&R3PipeMetadata {
            name: "DatePipe".into(),
            type_: variable("DatePipe"),
            type_argument_count: 0,
            pipe_name: "date".into(),
            deps: Some(vec![R3DependencyMetadata::token(variable("LOCALE_ID"))]),
            pure: true,
        });
        assert_eq!(callee(&compiled.expression), import_expr(R3::define_pipe()));
        assert!(compiled.statements.is_empty());
    }

    #[test]
    fn should_delegate_use_class_with_deps() {
        let compiled = compile_injectable(&R3InjectableMetadata {
            name: "Logger".into(),
            type_: variable("Logger"),
            type_argument_count: 0,
            provided_in: variable("root"),
            provider: R3InjectableProvider::UseClass {
                class: variable("ConsoleLogger"),
                deps: Some(vec![R3DependencyMetadata::token(variable("Config"))]),
            },
        });
        assert_eq!(callee(&compiled.expression), import_expr(R3::define_injectable()));
    }
}
