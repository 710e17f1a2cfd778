// Selector Scope Tests

use angular_compiler::output::output_ast::wrapped;
use ts::testing::make_program;
use ts::Program;

use super::*;
use crate::ngtsc::diagnostics::{ng_error_code, ErrorCode};
use crate::ngtsc::imports::Reference;
use crate::ngtsc::reflection::TypeScriptReflectionHost;
use crate::ngtsc::typecheck::api::TypeCheckableDirectiveMeta;

const MAIN: &str = "/app/main.ts";

fn local(program: &Program, name: &str) -> Reference {
    let class = program.find_class(MAIN, name).unwrap();
    Reference::resolved(class.id, name, MAIN)
}

fn common_module(program: &Program) -> Reference {
    let file = program.file_by_name(MAIN).unwrap().id;
    let resolved = program.resolve_identifier(file, "CommonModule").unwrap();
    let file_name = program.file(resolved.decl.file).file_name.clone();
    Reference::absolute(resolved.decl, "CommonModule", file_name, "@angular/common")
}

fn directive_meta(reference: Reference, selector: &str) -> TypeCheckableDirectiveMeta {
    TypeCheckableDirectiveMeta {
        name: reference.name.clone(),
        reference,
        selector: Some(selector.to_string()),
        is_component: false,
        inputs: Default::default(),
        outputs: Default::default(),
        export_as: None,
        queries: Vec::new(),
        ng_template_guards: Vec::new(),
        has_ng_template_context_guard: false,
    }
}

#[test]
fn should_read_scopes_of_compiled_modules() {
    let program = make_program(&[(
        MAIN,
        "import {CommonModule} from '@angular/common'; export class Cmp {} export class AppModule {}",
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let mut registry = SelectorScopeRegistry::new(&program, &host);
    let cmp = local(&program, "Cmp");
    registry
        .register_module(
            local(&program, "AppModule"),
            ModuleData {
                declarations: vec![cmp.clone()],
                imports: vec![common_module(&program)],
                exports: Vec::new(),
            },
        )
        .unwrap();

    let scope = registry.lookup_compilation_scope_as_refs(cmp.decl).unwrap().unwrap();
    assert_eq!(
        scope.directives.keys().collect::<Vec<_>>(),
        vec!["[ngIf]", "[ngFor][ngForOf]"]
    );
    let ng_if = &scope.directives["[ngIf]"];
    assert!(ng_if.directive.is_symbol_of("@angular/common", "NgIf"));
    assert_eq!(ng_if.meta.inputs["ngIf"], "ngIf");
    assert_eq!(ng_if.meta.ng_template_guards, vec!["ngIf".to_string()]);
    assert!(ng_if.meta.has_ng_template_context_guard);
    assert!(scope.pipes["async"].is_symbol_of("@angular/common", "AsyncPipe"));
}

#[test]
fn should_not_scope_undeclared_components() {
    let program = make_program(&[(MAIN, "export class Cmp {}")]);
    let host = TypeScriptReflectionHost::new(&program);
    let mut registry = SelectorScopeRegistry::new(&program, &host);
    let cmp = local(&program, "Cmp");
    assert!(registry.lookup_compilation_scope_as_refs(cmp.decl).unwrap().is_none());
}

#[test]
fn should_include_exports_of_imported_modules() {
    let program = make_program(&[(
        MAIN,
        "export class Cmp {} export class Dir {} export class SharedModule {} export class AppModule {}",
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let mut registry = SelectorScopeRegistry::new(&program, &host);
    let dir = local(&program, "Dir");
    let cmp = local(&program, "Cmp");
    registry.register_directive(directive_meta(dir.clone(), "[dir]")).unwrap();
    registry
        .register_module(
            local(&program, "SharedModule"),
            ModuleData {
                declarations: vec![dir.clone()],
                imports: Vec::new(),
                exports: vec![dir],
            },
        )
        .unwrap();
    registry
        .register_module(
            local(&program, "AppModule"),
            ModuleData {
                declarations: vec![cmp.clone()],
                imports: vec![local(&program, "SharedModule")],
                exports: Vec::new(),
            },
        )
        .unwrap();

    let class = program.find_class(MAIN, "Cmp").unwrap();
    let scope = registry.lookup_compilation_scope(class).unwrap().unwrap();
    assert_eq!(scope.directives["[dir]"].directive, wrapped("Dir"));
    // `Dir` is declared after `Cmp` in the same file.
    assert!(scope.contains_forward_decls);
}

#[test]
fn should_report_cyclic_module_imports() {
    let program = make_program(&[(MAIN, "export class Cmp {} export class AModule {} export class BModule {}")]);
    let host = TypeScriptReflectionHost::new(&program);
    let mut registry = SelectorScopeRegistry::new(&program, &host);
    let cmp = local(&program, "Cmp");
    registry
        .register_module(
            local(&program, "AModule"),
            ModuleData {
                declarations: vec![cmp.clone()],
                imports: vec![local(&program, "BModule")],
                exports: Vec::new(),
            },
        )
        .unwrap();
    registry
        .register_module(
            local(&program, "BModule"),
            ModuleData {
                declarations: Vec::new(),
                imports: vec![local(&program, "AModule")],
                exports: vec![local(&program, "AModule")],
            },
        )
        .unwrap();

    let err = registry.lookup_compilation_scope_as_refs(cmp.decl).unwrap_err();
    assert_eq!(err.code, ErrorCode::ScopeCycle);
    // The failure is remembered rather than recomputed.
    let again = registry.lookup_compilation_scope_as_refs(cmp.decl).unwrap_err();
    assert_eq!(again.code, ErrorCode::ScopeCycle);
}

#[test]
fn should_report_modules_that_export_each_other() {
    let program = make_program(&[(MAIN, "export class Cmp {} export class AModule {} export class BModule {}")]);
    let host = TypeScriptReflectionHost::new(&program);
    let mut registry = SelectorScopeRegistry::new(&program, &host);
    let cmp = local(&program, "Cmp");
    registry
        .register_module(
            local(&program, "AModule"),
            ModuleData {
                declarations: vec![cmp.clone()],
                imports: Vec::new(),
                exports: vec![local(&program, "BModule")],
            },
        )
        .unwrap();
    registry
        .register_module(
            local(&program, "BModule"),
            ModuleData {
                declarations: Vec::new(),
                imports: Vec::new(),
                exports: vec![local(&program, "AModule")],
            },
        )
        .unwrap();

    let err = registry.lookup_compilation_scope_as_refs(cmp.decl).unwrap_err();
    assert_eq!(err.code, ErrorCode::ScopeCycle);
    assert_eq!(ng_error_code(err.code), -992004);
    assert!(err.message.contains("NgModule AModule"));
}

#[test]
fn should_reject_declarations_claimed_by_two_modules() {
    let program = make_program(&[(MAIN, "export class Cmp {} export class AModule {} export class BModule {}")]);
    let host = TypeScriptReflectionHost::new(&program);
    let mut registry = SelectorScopeRegistry::new(&program, &host);
    let declares_cmp = ModuleData {
        declarations: vec![local(&program, "Cmp")],
        ..Default::default()
    };
    registry
        .register_module(local(&program, "AModule"), declares_cmp.clone())
        .unwrap();
    let err = registry
        .register_module(local(&program, "BModule"), declares_cmp)
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::DuplicateRegistration);
    assert!(err.message.contains("AModule and BModule"));
}

#[test]
fn should_reject_duplicate_pipes() {
    let program = make_program(&[(MAIN, "export class P {}")]);
    let host = TypeScriptReflectionHost::new(&program);
    let mut registry = SelectorScopeRegistry::new(&program, &host);
    let pipe = local(&program, "P");
    registry.register_pipe(&pipe, "p").unwrap();
    assert_eq!(
        registry.register_pipe(&pipe, "p").unwrap_err().code,
        ErrorCode::DuplicateRegistration
    );
}
