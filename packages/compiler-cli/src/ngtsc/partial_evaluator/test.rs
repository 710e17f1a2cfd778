// Partial Evaluator Tests

use ts::testing::make_program;
use ts::{DeclarationNode, Expression, FileId, Program};

use super::*;
use crate::ngtsc::imports::Reference;
use crate::ngtsc::reflection::{FunctionDefinition, TypeScriptReflectionHost};

fn evaluate_target_with(main: &str, others: &[(&str, &str)], foreign: Option<&dyn ForeignFunctionResolver>) -> ResolvedValue {
    let mut files = vec![("/app/main.ts", main)];
    files.extend_from_slice(others);
    let program = make_program(&files);
    evaluate_in(&program, foreign)
}

fn evaluate_in(program: &Program, foreign: Option<&dyn ForeignFunctionResolver>) -> ResolvedValue {
    let host = TypeScriptReflectionHost::new(program);
    let evaluator = PartialEvaluator::new(&host, program);
    let file = program.file_by_name("/app/main.ts").unwrap().id;
    let decl = program.local_declaration(file, "target").unwrap();
    let Some(DeclarationNode::Variable { declaration, .. }) = program.declaration(decl) else {
        panic!("target is not a variable");
    };
    evaluator.evaluate(declaration.initializer.as_ref().unwrap(), file, foreign)
}

fn evaluate_target(main: &str) -> ResolvedValue {
    evaluate_target_with(main, &[], None)
}

fn root_reason(value: &ResolvedValue) -> DynamicReason {
    match value {
        ResolvedValue::Dynamic(dynamic) => dynamic.root_cause().reason.clone(),
        other => panic!("expected a dynamic value, got {:?}", other),
    }
}

mod literal_tests {
    use super::*;

    #[test]
    fn should_evaluate_arithmetic() {
        assert_eq!(evaluate_target("const target = 1 + 2 * 3;"), ResolvedValue::Number(7.0));
        assert_eq!(evaluate_target("const target = (10 - 4) % 4;"), ResolvedValue::Number(2.0));
    }

    #[test]
    fn should_concatenate_strings() {
        let value = evaluate_target("const a = 'x'; const target = a + '-' + 1;");
        assert_eq!(value, ResolvedValue::from("x-1"));
    }

    #[test]
    fn should_evaluate_conditionals_and_logic() {
        let value = evaluate_target("const flag = true; const target = flag && !false ? 'yes' : 'no';");
        assert_eq!(value, ResolvedValue::from("yes"));
        assert_eq!(evaluate_target("const target = null || 'fallback';"), ResolvedValue::from("fallback"));
        assert_eq!(evaluate_target("const target = 1 === 1;"), ResolvedValue::Boolean(true));
        assert_eq!(evaluate_target("const target = undefined;"), ResolvedValue::Undefined);
    }

    #[test]
    fn should_evaluate_object_and_array_literals_with_spread() {
        let value = evaluate_target(
            "const base = {a: 1}; const b = 2; const target = {...base, b, c: [1, ...[2, 3]].length};",
        );
        let map = value.as_map().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(map["a"], ResolvedValue::Number(1.0));
        assert_eq!(map["b"], ResolvedValue::Number(2.0));
        assert_eq!(map["c"], ResolvedValue::Number(3.0));
    }

    #[test]
    fn should_read_through_casts_and_element_access() {
        let value = evaluate_target("const list = ['a', 'b'] as any; const target = list[1]!;");
        assert_eq!(value, ResolvedValue::from("b"));
    }
}

mod declaration_tests {
    use super::*;

    #[test]
    fn should_follow_relative_imports() {
        let value = evaluate_target_with(
            "import {value, Foo} from './other'; const target = [value, Foo];",
            &[("/app/other.ts", "export const value = 'hi'; export class Foo {}")],
            None,
        );
        let items = value.as_list().unwrap();
        assert_eq!(items[0], ResolvedValue::from("hi"));
        let foo = items[1].as_reference().unwrap();
        assert_eq!(foo.name, "Foo");
        assert_eq!(foo.file_name, "/app/other.ts");
        assert!(!foo.is_absolute());
    }

    #[test]
    fn should_produce_absolute_references_for_package_imports() {
        let value = evaluate_target("import {NgIf} from '@angular/common'; const target = NgIf;");
        let reference = value.as_reference().unwrap();
        assert!(reference.is_symbol_of("@angular/common", "NgIf"));
    }

    #[test]
    fn should_evaluate_enum_members() {
        assert_eq!(
            evaluate_target("enum Color { Red, Green = 5, Blue } const target = Color.Blue;"),
            ResolvedValue::Number(6.0)
        );
        assert_eq!(
            evaluate_target("import {ViewEncapsulation} from '@angular/core'; const target = ViewEncapsulation.None;"),
            ResolvedValue::Number(2.0)
        );
    }

    #[test]
    fn should_resolve_members_of_namespace_imports() {
        let value = evaluate_target("import * as core from '@angular/core'; const target = core.ViewEncapsulation.ShadowDom;");
        assert_eq!(value, ResolvedValue::Number(3.0));
    }

    #[test]
    fn should_read_static_properties() {
        let value = evaluate_target("class Cfg { static value = 'v'; } const target = Cfg.value;");
        assert_eq!(value, ResolvedValue::from("v"));
    }

    #[test]
    fn should_detect_self_referential_variables() {
        let value = evaluate_target("const a = b; const b = a; const target = a;");
        assert_eq!(root_reason(&value), DynamicReason::Cycle);
    }

    #[test]
    fn should_report_unknown_identifiers_as_dynamic() {
        let value = evaluate_target("const target = [missing];");
        let items = value.as_list().unwrap();
        assert_eq!(root_reason(&items[0]), DynamicReason::UnknownIdentifier("missing".into()));
    }
}

mod call_tests {
    use super::*;

    struct FirstArgument;

    impl ForeignFunctionResolver for FirstArgument {
        fn resolve(
            &self,
            _callee: &Reference,
            _function: &FunctionDefinition,
            args: &[Expression],
            call_site: FileId,
        ) -> Option<ForeignFunctionResult> {
            Some(ForeignFunctionResult {
                expression: args.first()?.clone(),
                file: call_site,
            })
        }
    }

    #[test]
    fn should_evaluate_single_return_functions() {
        let value = evaluate_target("function wrap(x, y = 2) { return [x, y]; } const target = wrap(1);");
        assert_eq!(
            value,
            ResolvedValue::List(vec![ResolvedValue::Number(1.0), ResolvedValue::Number(2.0)])
        );
    }

    #[test]
    fn should_evaluate_arrow_functions_across_files() {
        let value = evaluate_target_with(
            "import {make} from './lib'; const target = make('a');",
            &[("/app/lib.ts", "const suffix = '!'; export const make = (x) => x + suffix;")],
            None,
        );
        assert_eq!(value, ResolvedValue::from("a!"));
    }

    #[test]
    fn should_give_up_on_complex_functions() {
        let main = "function id(x) { const y = x; return y; } const target = id('v');";
        assert_eq!(root_reason(&evaluate_target(main)), DynamicReason::ComplexFunctionCall);
        assert_eq!(
            evaluate_target_with(main, &[], Some(&FirstArgument)),
            ResolvedValue::from("v")
        );
    }
}
