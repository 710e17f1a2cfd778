use angular_compiler::render3::view::R3QueryPredicate;
use ts::testing::make_program;

use super::*;
use crate::ngtsc::reflection::TypeScriptReflectionHost;

const SOURCE: &str = r#"import {Directive, Input, Output, HostBinding, HostListener, ContentChildren, NgModule, EventEmitter, TemplateRef} from '@angular/core';

@Directive({
  selector: '[dir]',
  inputs: ['plain', 'field: bound'],
  outputs: ['changed'],
  host: {'(click)': 'onClick()', '[class.active]': 'active'},
  exportAs: 'dir, d'
})
export class Dir {
  @Input() decorated: string;
  @Input('publicName') aliased: string;
  @Output('closed') close = new EventEmitter();
  @HostBinding() title: string;
  @HostListener('focus', ['$event']) onFocus(event: any) {}
  @ContentChildren('a, b') items: any;

  static ngTemplateGuard_decorated(dir: Dir, value: any): boolean { return true; }
  static ngTemplateContextGuard(dir: Dir, ctx: any): boolean { return true; }

  ngOnChanges() {}
}

@Directive({selector: 'tpl'})
export class TplDir {
  @ContentChildren(TemplateRef, {descendants: true}) templates: any;
}

@NgModule({declarations: [Dir, TplDir]})
export class DirModule {}
"#;

fn directive_meta<'c>(
    compilation: &'c IvyCompilation<'_>,
    program: &Program,
    name: &str,
) -> &'c angular_compiler::render3::view::R3DirectiveMetadata {
    match analysis_of(compilation, class(program, name)) {
        Analysis::Directive(analysis) => &analysis.meta,
        other => panic!("expected a directive analysis, got {:?}", other.kind()),
    }
}

#[test]
fn should_merge_decorator_and_member_inputs() {
    let program = make_program(&[(MAIN, SOURCE)]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);
    assert!(compilation.diagnostics().is_empty(), "{:?}", compilation.diagnostics());

    let meta = directive_meta(&compilation, &program, "Dir");
    assert_eq!(meta.selector.as_deref(), Some("[dir]"));
    assert_eq!(
        meta.inputs.iter().map(|(field, (binding, _))| (field.as_str(), binding.as_str())).collect::<Vec<_>>(),
        vec![
            ("plain", "plain"),
            ("field", "bound"),
            ("decorated", "decorated"),
            ("aliased", "publicName"),
        ]
    );
    assert_eq!(
        meta.outputs.iter().map(|(field, binding)| (field.as_str(), binding.as_str())).collect::<Vec<_>>(),
        vec![("changed", "changed"), ("close", "closed")]
    );
    assert!(meta.lifecycle.uses_on_changes);
    assert!(!meta.uses_inheritance);
    assert_eq!(meta.export_as.as_deref(), Some("dir, d"));
}

#[test]
fn should_collect_host_bindings_from_map_and_members() {
    let program = make_program(&[(MAIN, SOURCE)]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);

    let meta = directive_meta(&compilation, &program, "Dir");
    assert_eq!(meta.host.listeners["click"], "onClick()");
    assert_eq!(meta.host.listeners["focus"], "onFocus($event)");
    assert_eq!(meta.host.properties["class.active"], "active");
    assert_eq!(meta.host.properties["title"], "title");
}

#[test]
fn should_read_content_queries() {
    let program = make_program(&[(MAIN, SOURCE)]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);

    let query = &directive_meta(&compilation, &program, "Dir").queries[0];
    assert_eq!(query.property_name, "items");
    assert!(!query.first);
    assert!(!query.descendants);
    let R3QueryPredicate::Selectors(selectors) = &query.predicate else {
        panic!("expected string selectors");
    };
    assert_eq!(selectors, &vec!["a".to_string(), "b".to_string()]);

    let query = &directive_meta(&compilation, &program, "TplDir").queries[0];
    assert!(query.descendants);
    assert!(matches!(query.predicate, R3QueryPredicate::Type(_)));
}

#[test]
fn should_register_type_checkable_metadata() {
    let program = make_program(&[(MAIN, SOURCE)]);
    let host = TypeScriptReflectionHost::new(&program);
    let mut compilation = analyze(&program, &host);

    // Scopes are looked up through a declared class.
    let dir = class(&program, "Dir").id;
    let scope = compilation.scopes().lookup_compilation_scope_as_refs(dir).unwrap().unwrap();
    assert_eq!(scope.directives.keys().collect::<Vec<_>>(), vec!["[dir]", "tpl"]);

    let meta = &scope.directives["[dir]"].meta;
    assert!(!meta.is_component);
    assert_eq!(meta.inputs["aliased"], "publicName");
    assert_eq!(meta.export_as, Some(vec!["dir".to_string(), "d".to_string()]));
    assert_eq!(meta.ng_template_guards, vec!["decorated".to_string()]);
    assert!(meta.has_ng_template_context_guard);
    assert_eq!(meta.queries, vec!["items".to_string()]);
}

#[test]
fn should_skip_jit_directives() {
    let program = make_program(&[(
        MAIN,
        "import {Directive} from '@angular/core';\n@Directive({selector: '[jit]', jit: true})\nexport class JitDir {}\n",
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);
    assert!(compilation.diagnostics().is_empty());
    assert!(compilation.record_for(class(&program, "JitDir")).is_none());
}

#[test]
fn should_not_register_directives_without_a_selector() {
    let program = make_program(&[(
        MAIN,
        r#"import {Directive, NgModule} from '@angular/core';
@Directive({})
export class Abstract {}

@NgModule({declarations: [Abstract]})
export class AbstractModule {}
"#,
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let mut compilation = analyze(&program, &host);
    assert!(compilation.diagnostics().is_empty(), "{:?}", compilation.diagnostics());

    let meta = directive_meta(&compilation, &program, "Abstract");
    assert_eq!(meta.selector.as_deref(), Some(""));
    let decl = class(&program, "Abstract").id;
    let scope = compilation.scopes().lookup_compilation_scope_as_refs(decl).unwrap().unwrap();
    assert!(scope.directives.is_empty());
}

#[test]
fn should_reject_multiple_query_decorators_on_one_member() {
    let program = make_program(&[(
        MAIN,
        r#"import {Directive, ContentChild, ContentChildren} from '@angular/core';
@Directive({selector: '[q]'})
export class QueryDir {
  @ContentChild('a') @ContentChildren('b') both: any;
}
"#,
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);
    assert_eq!(codes(&compilation), vec![-991005]);
}

#[test]
fn should_report_wrong_arity() {
    let program = make_program(&[(
        MAIN,
        "import {Directive} from '@angular/core';\n@Directive()\nexport class NoArgs {}\n",
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze(&program, &host);
    assert_eq!(codes(&compilation), vec![-991002]);
}
