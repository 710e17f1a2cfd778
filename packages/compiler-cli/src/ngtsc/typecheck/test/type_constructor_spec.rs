use ts::testing::make_program;

use super::{directive, matcher, template, COMMON_DTS};
use crate::ngtsc::typecheck::{generate_type_ctor, TypeCheckContext, TypeCtorFields, TypeCtorMetadata};

fn meta(body: bool, fields: TypeCtorFields) -> TypeCtorMetadata {
    TypeCtorMetadata {
        fn_name: "ngTypeCtor".to_string(),
        body,
        fields,
    }
}

#[test]
fn should_pick_inputs_outputs_and_queries() {
    let program = make_program(&[("/app/dir.ts", "export class Dir<T> {\n  items: T[];\n}\n")]);
    let class = program.find_class("/app/dir.ts", "Dir").unwrap();
    let file = program.file(class.id.file);
    let fields = TypeCtorFields {
        inputs: vec!["items".to_string()],
        outputs: vec!["changed".to_string()],
        queries: vec!["children".to_string()],
    };
    assert_eq!(
        generate_type_ctor(class, file, &meta(true, fields)).unwrap(),
        r#"static ngTypeCtor<T>(init: Partial<Pick<Dir<T>, "items" | "changed" | "children">>): Dir<T> { return null!; }"#
    );
}

#[test]
fn should_use_never_without_fields() {
    let program = make_program(&[("/app/dir.ts", "export class Dir {}\n")]);
    let class = program.find_class("/app/dir.ts", "Dir").unwrap();
    let file = program.file(class.id.file);
    assert_eq!(
        generate_type_ctor(class, file, &meta(true, TypeCtorFields::default())).unwrap(),
        "static ngTypeCtor(init: Partial<Pick<Dir, never>>): Dir { return null!; }"
    );
}

#[test]
fn should_omit_the_body_in_declaration_files() {
    let program = make_program(&[("/app/cmp.ts", "export class Cmp {}\n")]);
    let cmp = program.find_class("/app/cmp.ts", "Cmp").unwrap();
    let ng_if = directive(&program, COMMON_DTS, "NgIf", "[ngIf]", &["ngIf"]);
    let mut ctx = TypeCheckContext::new(&program);
    ctx.add_template(cmp, &template(r#"<div *ngIf="show"></div>"#), matcher(vec![ng_if]))
        .unwrap();

    let dts = program.file_by_name(COMMON_DTS).unwrap().id;
    let code = ctx.transform(dts).unwrap();
    assert!(code.contains(r#"static ngTypeCtor(init: Partial<Pick<NgIf, "ngIf">>): NgIf;"#), "{}", code);
    assert!(ctx.files().any(|file| file == dts));
}

#[test]
fn should_add_one_type_constructor_per_directive() {
    let program = make_program(&[
        ("/app/dir.ts", "export class Dir {\n  value: any;\n}\n"),
        ("/app/cmp.ts", "export class Cmp {}\nexport class Other {}\n"),
    ]);
    let dir = directive(&program, "/app/dir.ts", "Dir", "[dir]", &["value"]);
    let mut ctx = TypeCheckContext::new(&program);
    for name in ["Cmp", "Other"] {
        let class = program.find_class("/app/cmp.ts", name).unwrap();
        ctx.add_template(class, &template("<div dir></div><span dir></span>"), matcher(vec![dir.clone()]))
            .unwrap();
    }
    let dir_file = program.file_by_name("/app/dir.ts").unwrap().id;
    assert_eq!(ctx.transform(dir_file).unwrap().matches("ngTypeCtor").count(), 1);
}
