use angular_compiler::output::output_ast::wrapped;
use ts::testing::make_program;

use super::*;
use crate::ngtsc::reflection::TypeScriptReflectionHost;

fn module_analysis<'c>(
    compilation: &'c IvyCompilation<'_>,
    program: &Program,
    name: &str,
) -> &'c NgModuleAnalysis {
    match analysis_of(compilation, class(program, name)) {
        Analysis::NgModule(analysis) => analysis,
        other => panic!("expected an NgModule analysis, got {:?}", other.kind()),
    }
}

#[test]
fn should_read_module_lists_and_providers() {
    let program = make_program(&[(
        MAIN,
        r#"import {Component, NgModule} from '@angular/core';
import {CommonModule} from '@angular/common';

@Component({selector: 'app-root', template: ''})
export class AppRoot {}

export class Service {}

const DECLARATIONS = [AppRoot];

@NgModule({
  declarations: [...DECLARATIONS],
  imports: [CommonModule],
  exports: [AppRoot],
  providers: [Service],
  bootstrap: [AppRoot]
})
export class AppModule {}
"#,
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);
    assert!(compilation.diagnostics().is_empty(), "{:?}", compilation.diagnostics());

    let analysis = module_analysis(&compilation, &program, "AppModule");
    assert_eq!(analysis.module_def.declarations.len(), 1);
    assert_eq!(analysis.module_def.declarations[0].value, wrapped("AppRoot"));
    assert_eq!(analysis.module_def.imports.len(), 1);
    assert_eq!(analysis.module_def.bootstrap.len(), 1);
    assert!(!analysis.module_def.contains_forward_decls);
    assert_eq!(analysis.injector_def.providers, Some(wrapped("[Service]")));
    assert_eq!(
        analysis.injector_def.imports,
        vec![wrapped("[CommonModule]"), wrapped("[AppRoot]")]
    );
}

#[test]
fn should_flag_forward_declarations() {
    let program = make_program(&[(
        MAIN,
        r#"import {NgModule, forwardRef} from '@angular/core';
@NgModule({imports: [forwardRef(() => LaterModule)]})
export class EarlyModule {}

@NgModule({})
export class LaterModule {}
"#,
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);
    assert!(compilation.diagnostics().is_empty(), "{:?}", compilation.diagnostics());

    let analysis = module_analysis(&compilation, &program, "EarlyModule");
    assert_eq!(analysis.module_def.imports.len(), 1);
    assert!(analysis.module_def.contains_forward_decls);
}

#[test]
fn should_unwrap_module_with_providers_calls() {
    let program = make_program(&[(
        MAIN,
        r#"import {NgModule, ModuleWithProviders} from '@angular/core';
@NgModule({})
export class RouterModule {
  static forRoot(): ModuleWithProviders<RouterModule> {
    return {ngModule: RouterModule, providers: []};
  }
}

export function provideFeature(): ModuleWithProviders<RouterModule> {
  return {ngModule: RouterModule, providers: []};
}

@NgModule({imports: [RouterModule.forRoot(), provideFeature()]})
export class AppModule {}
"#,
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);
    assert!(compilation.diagnostics().is_empty(), "{:?}", compilation.diagnostics());

    let analysis = module_analysis(&compilation, &program, "AppModule");
    assert_eq!(
        analysis.module_def.imports.iter().map(|r| r.value.clone()).collect::<Vec<_>>(),
        vec![wrapped("RouterModule"), wrapped("RouterModule")]
    );
}

#[test]
fn should_reject_non_class_entries() {
    let program = make_program(&[(
        MAIN,
        "import {NgModule} from '@angular/core';\n@NgModule({declarations: ['nope']})\nexport class BadModule {}\n",
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);
    assert_eq!(codes(&compilation), vec![-991010]);
    assert_eq!(
        compilation.diagnostics()[0].message_text.to_string(),
        "Value at position 0 in declarations array is not a reference: string"
    );
}

#[test]
fn should_name_the_position_of_function_entries() {
    let program = make_program(&[(
        MAIN,
        concat!(
            "import {NgModule} from '@angular/core';\n",
            "export class Used {}\n",
            "export function notAClass() {}\n",
            "@NgModule({declarations: [Used, notAClass]})\n",
            "export class BadModule {}\n",
        ),
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);
    assert_eq!(codes(&compilation), vec![-991010]);
    assert_eq!(
        compilation.diagnostics()[0].message_text.to_string(),
        "Entry notAClass at position 1 is not a type, but is used as such in declarations array"
    );
}

#[test]
fn should_report_components_declared_by_two_modules() {
    let program = make_program(&[(
        MAIN,
        r#"import {Component, NgModule} from '@angular/core';
@Component({selector: 'shared', template: ''})
export class Shared {}

@NgModule({declarations: [Shared]})
export class FirstModule {}

@NgModule({declarations: [Shared]})
export class SecondModule {}
"#,
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let mut compilation = analyze(&program, &host);
    assert_eq!(codes(&compilation), vec![-992006]);
    assert_eq!(
        compilation.diagnostics()[0].message_text.to_string(),
        "Shared is declared by more than one NgModule: FirstModule and SecondModule"
    );
    assert!(compilation.record_for(class(&program, "SecondModule")).is_none());
    let owner = compilation.scopes().declaring_module(class(&program, "Shared").id).unwrap();
    assert_eq!(owner.name, "FirstModule");
}

#[test]
fn should_report_modules_analyzed_twice() {
    let program = make_program(&[(
        MAIN,
        "import {NgModule} from '@angular/core';\n@NgModule({})\nexport class OnceModule {}\n",
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let mut compilation = analyze(&program, &host);
    assert!(compilation.diagnostics().is_empty());

    let main = program.file_by_name(MAIN).unwrap().id;
    compilation.analyze_sync(main).unwrap();
    assert_eq!(codes(&compilation), vec![-992006]);
    assert_eq!(
        compilation.diagnostics()[0].message_text.to_string(),
        "NgModule OnceModule is registered twice"
    );
}

#[test]
fn should_compile_module_and_injector_defs() {
    let program = make_program(&[(
        MAIN,
        "import {NgModule} from '@angular/core';\n@NgModule({})\nexport class EmptyModule {}\n",
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let mut compilation = analyze(&program, &host);
    let mut pool = angular_compiler::ConstantPool::new();
    let results = compilation
        .compile_ivy_field_for(class(&program, "EmptyModule"), &mut pool)
        .unwrap()
        .unwrap();
    assert_eq!(
        results.iter().map(|result| result.name.as_str()).collect::<Vec<_>>(),
        vec!["ngModuleDef", "ngInjectorDef"]
    );
}
