use ts::testing::make_program;

use super::*;
use crate::ngtsc::reflection::TypeScriptReflectionHost;

const SOURCE: &str = r#"import {Directive, Input, Output, EventEmitter} from '@angular/core';

export class Base {
  @Input() value: string;
  @Input('alias') other: string;
  @Output() changed = new EventEmitter();
  plain = 1;
}

export class NoBindings {
  @Custom() value: string;
}

@Directive({selector: '[sub]'})
export class Sub extends Base {
  @Input() extra: string;
}

function Custom(): any { return null; }
"#;

#[test]
fn should_detect_undecorated_classes_with_bindings() {
    let program = make_program(&[(MAIN, SOURCE)]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);
    assert!(compilation.diagnostics().is_empty(), "{:?}", compilation.diagnostics());

    let Analysis::BaseDef(analysis) = analysis_of(&compilation, class(&program, "Base")) else {
        panic!("expected a base def analysis");
    };
    assert_eq!(
        analysis.meta.inputs.iter().map(|(field, (binding, _))| (field.as_str(), binding.as_str())).collect::<Vec<_>>(),
        vec![("value", "value"), ("other", "alias")]
    );
    assert_eq!(analysis.meta.outputs["changed"], "changed");
    assert!(compilation.ivy_decorator_for(class(&program, "Base")).is_none());
}

#[test]
fn should_ignore_classes_without_angular_bindings() {
    let program = make_program(&[(MAIN, SOURCE)]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);
    assert!(compilation.record_for(class(&program, "NoBindings")).is_none());
}

#[test]
fn should_leave_decorated_directives_to_their_handler() {
    let program = make_program(&[(MAIN, SOURCE)]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);

    let Analysis::Directive(analysis) = analysis_of(&compilation, class(&program, "Sub")) else {
        panic!("expected a directive analysis");
    };
    assert!(analysis.meta.uses_inheritance);
    assert!(analysis.meta.deps.is_none());
}

#[test]
fn should_compile_ng_base_def() {
    let program = make_program(&[(MAIN, SOURCE)]);
    let host = TypeScriptReflectionHost::new(&program);
    let mut compilation = analyze(&program, &host);
    let mut pool = angular_compiler::ConstantPool::new();
    let results = compilation
        .compile_ivy_field_for(class(&program, "Base"), &mut pool)
        .unwrap()
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "ngBaseDef");
    assert!(results[0].statements.is_empty());
}
