use angular_compiler::constant_pool::ConstantPool;
use angular_compiler::core::ViewEncapsulation;
use angular_compiler::output::output_ast::{literal, literal_arr, variable, Expression, Statement};
use angular_compiler::render3::view::{
    compile_component_from_metadata, parse_template, ParseTemplateOptions, R3ComponentMetadata,
    R3ComponentTemplate, R3DirectiveMetadata, R3HostMetadata, R3LifecycleMetadata, R3UsedDirectiveMetadata,
};
use indexmap::IndexMap;

#[cfg(test)]
mod tests {
    use super::*;

    fn component(name: &str, template: &str) -> R3ComponentMetadata {
        let parsed = parse_template(
            template,
            &format!("/app/{}.ts#{}/template.html", name.to_lowercase(), name),
            ParseTemplateOptions::default(),
            "app.ts",
        );
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        R3ComponentMetadata {
            directive: R3DirectiveMetadata {
                name: name.into(),
                type_: variable(name),
                type_argument_count: 0,
                deps: Some(Vec::new()),
                selector: Some("app-root".into()),
                queries: Vec::new(),
                host: R3HostMetadata::default(),
                lifecycle: R3LifecycleMetadata::default(),
                inputs: IndexMap::new(),
                outputs: IndexMap::new(),
                uses_inheritance: false,
                export_as: None,
                providers: None,
            },
            template: R3ComponentTemplate {
                nodes: parsed.nodes,
                has_ng_content: false,
                ng_content_selectors: Vec::new(),
            },
            view_queries: Vec::new(),
            directives: Vec::new(),
            pipes: IndexMap::new(),
            wrap_directives_and_pipes_in_closure: false,
            styles: Vec::new(),
            encapsulation: ViewEncapsulation::Emulated,
            animations: None,
            relative_context_file_path: "app.ts".into(),
        }
    }

    fn ng_if() -> R3UsedDirectiveMetadata {
        let mut inputs = IndexMap::new();
        inputs.insert("ngIf".to_string(), "ngIf".to_string());
        R3UsedDirectiveMetadata {
            name: "NgIf".into(),
            selector: "[ngIf]".into(),
            expression: variable("NgIf"),
            is_component: false,
            inputs,
            outputs: IndexMap::new(),
            export_as: None,
        }
    }

    fn field(definition: &Expression, key: &str) -> Option<Expression> {
        let Expression::InvokeFn(call) = definition else {
            panic!("expected define call");
        };
        let Expression::LiteralMap(map) = &call.args[0] else {
            panic!("expected definition map");
        };
        map.entries.iter().find(|e| e.key == key).map(|e| e.value.clone())
    }

    #[test]
    fn should_compile_structural_directives_and_pipes() {
        let mut meta = component("AppCmp", "<div *ngIf=\"user\">{{ user.name | uppercase }}</div>");
        meta.directives.push(ng_if());
        meta.pipes.insert("uppercase".into(), variable("UpperCasePipe"));
        meta.pipes.insert("lowercase".into(), variable("LowerCasePipe"));

        let mut pool = ConstantPool::new();
        let compiled = compile_component_from_metadata(&meta, &mut pool).unwrap();

        assert_eq!(field(&compiled.expression, "directives"), Some(literal_arr(vec![variable("NgIf")])));
        assert_eq!(
            field(&compiled.expression, "pipes"),
            Some(literal_arr(vec![variable("UpperCasePipe")]))
        );
        assert_eq!(field(&compiled.expression, "consts"), Some(literal(1.0)));
        assert_eq!(field(&compiled.expression, "vars"), Some(literal(1.0)));

        let nested: Vec<&str> = pool
            .statements
            .iter()
            .filter_map(|stmt| match stmt {
                Statement::DeclareFn(function) => Some(function.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(nested, vec!["AppCmp_div_0_Template"]);
    }

    #[test]
    fn should_report_template_compile_errors() {
        let meta = component("AppCmp", "<ng-template let-item><button (click)=\"item = null\"></button></ng-template>");
        let result = compile_component_from_metadata(&meta, &mut ConstantPool::new());
        assert!(result.is_err());
    }

    #[test]
    fn should_emit_styles_and_animations() {
        let mut meta = component("AppCmp", "<p>hi</p>");
        meta.styles = vec!["p { color: red; }".into()];
        meta.animations = Some(variable("fadeIn"));
        let compiled = compile_component_from_metadata(&meta, &mut ConstantPool::new()).unwrap();
        assert_eq!(
            field(&compiled.expression, "styles"),
            Some(literal_arr(vec![literal("p { color: red; }")]))
        );
        assert!(field(&compiled.expression, "data").is_some());
        assert!(field(&compiled.expression, "encapsulation").is_none());
    }
}
