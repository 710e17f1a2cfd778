use ts::testing::make_program;

use super::{directive, matcher, template, COMMON_DTS};
use crate::ngtsc::typecheck::TypeCheckContext;

const CMP: &str = "export class Cmp {\n  name: string;\n}\n";

fn tcb_of(files: &[(&str, &str)], html: &str, directives: impl FnOnce(&ts::Program) -> Vec<crate::ngtsc::typecheck::TypeCheckableDirectiveMeta>) -> String {
    let program = make_program(files);
    let cmp = program.find_class("/app/cmp.ts", "Cmp").unwrap();
    let mut ctx = TypeCheckContext::new(&program);
    ctx.add_template(cmp, &template(html), matcher(directives(&program))).unwrap();
    ctx.transform(cmp.id.file).unwrap()
}

#[test]
fn should_generate_a_block_for_elements_and_text() {
    let code = tcb_of(&[("/app/cmp.ts", CMP)], r#"<div [title]="name">{{name}}</div>"#, |_| Vec::new());
    assert!(code.contains(
        r#"function Cmp_TypeCheckBlock(ctx: Cmp) { if (true) { var _t0 = document.createElement("div"); _t0.title = ctx.name; ctx.name; } }"#
    ));
    assert!(code.starts_with("export class Cmp {"));
}

#[test]
fn should_lower_binary_and_conditional_expressions() {
    let code = tcb_of(&[("/app/cmp.ts", CMP)], "<i>{{a + b}}</i><b>{{c ? 'x' : 1}}</b>", |_| Vec::new());
    assert!(code.contains("(ctx.a + ctx.b);"), "{}", code);
    assert!(!code.contains("(ctx.a + ctx.b),"));
    assert!(code.contains(r#"(ctx.c ? "x" : 1);"#), "{}", code);
}

#[test]
fn should_join_interpolations_with_commas() {
    let code = tcb_of(&[("/app/cmp.ts", CMP)], "<p>{{a}} and {{b.c()}}</p>", |_| Vec::new());
    assert!(code.contains("(ctx.a, ctx.b.c());"), "{}", code);
}

#[test]
fn should_construct_directives_through_their_type_constructor() {
    let files = [
        ("/app/dir.ts", "export class Dir {\n  value: any;\n}\n"),
        ("/app/cmp.ts", "import {Dir} from './dir';\nexport class Cmp {\n  foo: any;\n}\n"),
    ];
    let program = make_program(&files);
    let cmp = program.find_class("/app/cmp.ts", "Cmp").unwrap();
    let dir = directive(&program, "/app/dir.ts", "Dir", "[dir]", &["value"]);
    let mut ctx = TypeCheckContext::new(&program);
    ctx.add_template(cmp, &template(r#"<div dir [value]="foo"></div>"#), matcher(vec![dir]))
        .unwrap();

    let code = ctx.transform(cmp.id.file).unwrap();
    assert!(code.starts_with("import * as _i0 from './dir';\n"), "{}", code);
    assert!(code.contains(
        r#"var _t0 = document.createElement("div"); var _t1 = _i0.Dir.ngTypeCtor({ value: ctx.foo }); _t1.value = ctx.foo; } }"#
    ));
    assert!(!code.contains("_t0.value"));

    let dir_file = program.file_by_name("/app/dir.ts").unwrap().id;
    let dir_code = ctx.transform(dir_file).unwrap();
    assert_eq!(
        dir_code,
        "export class Dir {\n  value: any;\nstatic ngTypeCtor(init: Partial<Pick<Dir, \"value\">>): Dir { return null!; }}\n"
    );
}

#[test]
fn should_guard_templates_with_directive_guards() {
    let code = tcb_of(&[("/app/cmp.ts", CMP)], r#"<div *ngIf="show">{{name}}</div>"#, |program| {
        let mut ng_if = directive(program, COMMON_DTS, "NgIf", "[ngIf]", &["ngIf"]);
        ng_if.ng_template_guards = vec!["ngIf".to_string()];
        ng_if.has_ng_template_context_guard = true;
        vec![ng_if]
    });
    assert!(code.starts_with("import * as _i0 from '@angular/common';\n"), "{}", code);
    assert!(code.contains(concat!(
        "var _t0: any = null!; ",
        "var _t1 = _i0.NgIf.ngTypeCtor({ ngIf: ctx.show }); _t1.ngIf = ctx.show; ",
        "if (_i0.NgIf.ngTemplateGuard_ngIf(_t1, ctx.show) && _i0.NgIf.ngTemplateContextGuard(_t1, _t0)) ",
        r#"{ var _t2 = document.createElement("div"); ctx.name; }"#
    )), "{}", code);
}

#[test]
fn should_use_an_unconditional_guard_without_directives() {
    let code = tcb_of(&[("/app/cmp.ts", CMP)], "<ng-template><span></span></ng-template>", |_| Vec::new());
    assert!(code.contains(r#"var _t0: any = null!; if (true) { var _t1 = document.createElement("span"); }"#), "{}", code);
}

#[test]
fn should_declare_template_variables_where_first_used() {
    let code = tcb_of(
        &[("/app/cmp.ts", CMP)],
        "<ng-template let-item><span>{{item}}</span></ng-template>",
        |_| Vec::new(),
    );
    assert!(code.contains(
        r#"if (true) { var _t1 = document.createElement("span"); var _t2 = _t0.$implicit; _t2; }"#
    ), "{}", code);
}

#[test]
fn should_carry_the_type_parameters_of_the_component() {
    let code = tcb_of(
        &[("/app/cmp.ts", "export class Cmp<T extends string> {\n  value: T;\n}\n")],
        "{{value}}",
        |_| Vec::new(),
    );
    assert!(code.contains("function Cmp_TypeCheckBlock<T extends string>(ctx: Cmp<T>) { if (true) { ctx.value; } }"), "{}", code);
}

#[test]
fn should_resolve_element_references_to_their_element() {
    let code = tcb_of(&[("/app/cmp.ts", CMP)], "<input #box><span>{{box.value}}</span>", |_| Vec::new());
    assert!(code.contains(concat!(
        r#"var _t0 = document.createElement("input"); "#,
        r#"var _t1 = document.createElement("span"); _t0.value;"#
    )), "{}", code);
}

#[test]
fn should_resolve_exported_references_to_the_directive_instance() {
    let files = [
        ("/app/dir.ts", "export class Dir {\n  value: any;\n}\n"),
        ("/app/cmp.ts", "import {Dir} from './dir';\nexport class Cmp {}\n"),
    ];
    let code = tcb_of(&files, r#"<div dir #d="dir"><span>{{d.value}}</span></div>"#, |program| {
        let mut dir = directive(program, "/app/dir.ts", "Dir", "[dir]", &[]);
        dir.export_as = Some(vec!["dir".to_string()]);
        vec![dir]
    });
    assert!(code.contains(concat!(
        r#"var _t0 = document.createElement("div"); var _t1 = _i0.Dir.ngTypeCtor({}); "#,
        r#"var _t2 = document.createElement("span"); _t1.value;"#
    )), "{}", code);
}

#[test]
fn should_reject_unsupported_expressions() {
    let program = make_program(&[("/app/cmp.ts", CMP)]);
    let cmp = program.find_class("/app/cmp.ts", "Cmp").unwrap();
    let mut ctx = TypeCheckContext::new(&program);
    let err = ctx
        .add_template(cmp, &template("{{items[0]}}"), matcher(Vec::new()))
        .unwrap_err();
    assert_eq!(err.to_string(), "Unknown node type: KeyedRead");
}

#[test]
fn should_leave_untouched_files_alone() {
    let program = make_program(&[("/app/cmp.ts", CMP)]);
    let ctx = TypeCheckContext::new(&program);
    let file = program.file_by_name("/app/cmp.ts").unwrap().id;
    assert!(ctx.is_empty());
    assert_eq!(ctx.transform(file).unwrap(), CMP);
}
