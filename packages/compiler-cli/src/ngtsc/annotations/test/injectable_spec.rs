use angular_compiler::output::output_ast::wrapped;
use angular_compiler::R3InjectableProvider;
use ts::testing::make_program;

use super::*;
use crate::ngtsc::reflection::TypeScriptReflectionHost;

const SOURCE: &str = r#"import {Injectable, Inject, Optional} from '@angular/core';
export class Dep {}
export function factory(): any { return null; }

@Injectable()
export class ByConstructor {
  constructor(dep: Dep) {}
}

@Injectable({providedIn: 'root', useValue: 42})
export class ByValue {}

@Injectable({providedIn: 'root', useFactory: factory, deps: [Dep, [new Optional(), new Inject('TOKEN')]]})
export class WithDeps {}

@Injectable({providedIn: 'root', useFactory: factory})
export class WithoutDeps {}

@Injectable({useClass: Dep, deps: []})
export class EmptyDeps {}

@Injectable({useExisting: Dep, deps: [Dep]})
export class Existing {}
"#;

fn provider<'c>(compilation: &'c IvyCompilation<'_>, program: &Program, name: &str) -> &'c R3InjectableProvider {
    match analysis_of(compilation, class(program, name)) {
        Analysis::Injectable(analysis) => &analysis.meta.provider,
        other => panic!("expected an injectable analysis, got {:?}", other.kind()),
    }
}

#[test]
fn should_read_constructor_dependencies_by_default() {
    let program = make_program(&[(MAIN, SOURCE)]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);
    assert!(compilation.diagnostics().is_empty(), "{:?}", compilation.diagnostics());

    let R3InjectableProvider::Constructor { deps: Some(deps) } = provider(&compilation, &program, "ByConstructor") else {
        panic!("expected constructor dependencies");
    };
    assert_eq!(deps.len(), 1);
    assert_eq!(deps[0].token, wrapped("Dep"));
}

#[test]
fn should_read_provided_in_and_use_value() {
    let program = make_program(&[(MAIN, SOURCE)]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);

    let Analysis::Injectable(analysis) = analysis_of(&compilation, class(&program, "ByValue")) else {
        panic!("expected an injectable analysis");
    };
    assert_eq!(analysis.meta.provided_in, wrapped("'root'"));
    assert_eq!(analysis.meta.provider, R3InjectableProvider::UseValue(wrapped("42")));
    assert!(analysis.metadata_stmt.is_some());
}

#[test]
fn should_read_flags_and_tokens_of_factory_deps() {
    let program = make_program(&[(MAIN, SOURCE)]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);

    let R3InjectableProvider::UseFactory { factory, deps: Some(deps) } =
        provider(&compilation, &program, "WithDeps")
    else {
        panic!("expected a factory with deps");
    };
    assert_eq!(*factory, wrapped("factory"));
    assert_eq!(deps.len(), 2);
    assert_eq!(deps[0].token, wrapped("Dep"));
    assert!(!deps[0].optional);
    assert_eq!(deps[1].token, wrapped("'TOKEN'"));
    assert!(deps[1].optional);
    assert!(!deps[1].skip_self);
}

#[test]
fn should_tell_empty_deps_from_missing_deps() {
    let program = make_program(&[(MAIN, SOURCE)]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);

    assert!(matches!(
        provider(&compilation, &program, "WithoutDeps"),
        R3InjectableProvider::UseFactory { deps: None, .. }
    ));
    let R3InjectableProvider::UseClass { class: used, deps } = provider(&compilation, &program, "EmptyDeps") else {
        panic!("expected useClass");
    };
    assert_eq!(*used, wrapped("Dep"));
    assert_eq!(deps.as_deref().map(<[_]>::len), Some(0));
}

#[test]
fn should_ignore_deps_of_use_existing() {
    let program = make_program(&[(MAIN, SOURCE)]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);
    assert_eq!(
        *provider(&compilation, &program, "Existing"),
        R3InjectableProvider::UseExisting(wrapped("Dep"))
    );
}

#[test]
fn should_report_parameters_without_a_token() {
    let program = make_program(&[(
        MAIN,
        "import {Injectable} from '@angular/core';\n@Injectable()\nexport class Service {\n  constructor(name: string) {}\n}\n",
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);
    assert_eq!(codes(&compilation), vec![-992003]);
    assert_eq!(
        compilation.diagnostics()[0].message_text.to_string(),
        "No suitable token for parameter name of class Service"
    );
    assert!(compilation.record_for(class(&program, "Service")).is_none());
}

#[test]
fn should_reject_non_literal_arguments() {
    let program = make_program(&[(
        MAIN,
        "import {Injectable} from '@angular/core';\nconst OPTIONS = {providedIn: 'root'};\n@Injectable(OPTIONS)\nexport class Service {}\n",
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);
    assert_eq!(codes(&compilation), vec![-991001]);
}
