use std::sync::Arc;

use angular_compiler::core::ViewEncapsulation;
use angular_compiler::ConstantPool;
use ts::testing::make_program;

use super::*;
use crate::ngtsc::reflection::TypeScriptReflectionHost;
use crate::ngtsc::resource::{HostResourceLoader, ResourceError, ResourceRead};

/// Serves `/app/cmp.html` and `/app/cmp.css`; everything else is missing.
fn loader() -> Arc<dyn ResourceLoader> {
    let host = |url: &str| -> Result<ResourceRead, ResourceError> {
        match url {
            "/app/cmp.html" => Ok(ResourceRead::Ready("<p>from url</p>".to_string())),
            "/app/cmp.css" => Ok(ResourceRead::Ready("p { color: red; }".to_string())),
            _ => Err(ResourceError::not_found(url)),
        }
    };
    Arc::new(HostResourceLoader::new(Arc::new(host)))
}

fn component_meta<'c>(
    compilation: &'c IvyCompilation<'_>,
    program: &Program,
    name: &str,
) -> &'c angular_compiler::render3::view::R3ComponentMetadata {
    match analysis_of(compilation, class(program, name)) {
        Analysis::Component(analysis) => &analysis.meta,
        other => panic!("expected a component analysis, got {:?}", other.kind()),
    }
}

#[test]
fn should_prefer_template_url_over_inline_template() {
    let program = make_program(&[(
        MAIN,
        r#"import {Component} from '@angular/core';
@Component({selector: 'app-cmp', template: '<p>inline</p>', templateUrl: './cmp.html', styleUrls: ['./cmp.css']})
export class AppCmp {}
"#,
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze_with(&program, &host, loader());
    assert!(compilation.diagnostics().is_empty(), "{:?}", compilation.diagnostics());

    let meta = component_meta(&compilation, &program, "AppCmp");
    assert_eq!(meta.template.nodes.len(), 1);
    assert_eq!(meta.styles, vec!["p { color: red; }".to_string()]);
    assert_eq!(meta.relative_context_file_path, "main.ts");
    assert!(compilation.record_for(class(&program, "AppCmp")).unwrap().type_check);
}

#[test]
fn should_report_missing_templates() {
    let program = make_program(&[(
        MAIN,
        "import {Component} from '@angular/core';\n@Component({selector: 'no-tpl'})\nexport class NoTemplate {}\n",
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze_with(&program, &host, loader());
    assert_eq!(codes(&compilation), vec![-992001]);
}

#[test]
fn should_report_unreadable_resources_as_missing_templates() {
    let program = make_program(&[(
        MAIN,
        "import {Component} from '@angular/core';\n@Component({selector: 'gone', templateUrl: './gone.html'})\nexport class Gone {}\n",
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze_with(&program, &host, loader());
    assert_eq!(codes(&compilation), vec![-992001]);
    assert!(compilation.diagnostics()[0]
        .message_text
        .to_string()
        .starts_with("Could not load resource:"));
}

#[test]
fn should_report_template_parse_errors() {
    let program = make_program(&[(
        MAIN,
        "import {Component} from '@angular/core';\n@Component({selector: 'bad', template: '<div></span>'})\nexport class Bad {}\n",
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze_with(&program, &host, loader());
    assert_eq!(codes(&compilation), vec![-992005]);
    assert!(compilation.diagnostics()[0]
        .message_text
        .to_string()
        .starts_with("Errors parsing template: "));
}

#[test]
fn should_collect_ng_content_selectors() {
    let program = make_program(&[(
        MAIN,
        r#"import {Component} from '@angular/core';
@Component({selector: 'card', template: '<ng-content select="header"></ng-content><div><ng-content></ng-content><ng-content select="header"></ng-content></div>'})
export class Card {}
"#,
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze_with(&program, &host, loader());
    assert!(compilation.diagnostics().is_empty(), "{:?}", compilation.diagnostics());

    let template = &component_meta(&compilation, &program, "Card").template;
    assert!(template.has_ng_content);
    assert_eq!(template.ng_content_selectors, vec!["header".to_string()]);
}

#[test]
fn should_read_encapsulation_and_view_queries() {
    let program = make_program(&[(
        MAIN,
        r#"import {Component, ViewChild, ViewEncapsulation} from '@angular/core';
@Component({selector: 'enc', template: '<p #ref></p>', encapsulation: ViewEncapsulation.None})
export class Enc {
  @ViewChild('ref') ref: any;
}
"#,
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let compilation = analyze_with(&program, &host, loader());
    assert!(compilation.diagnostics().is_empty(), "{:?}", compilation.diagnostics());

    let meta = component_meta(&compilation, &program, "Enc");
    assert_eq!(meta.encapsulation, ViewEncapsulation::None);
    assert_eq!(meta.view_queries.len(), 1);
    assert!(meta.view_queries[0].first);
    assert!(meta.directive.queries.is_empty());
}

#[test]
fn should_compile_with_the_scope_of_the_declaring_module() {
    let program = make_program(&[(
        MAIN,
        r#"import {Component, Directive, NgModule} from '@angular/core';
import {CommonModule} from '@angular/common';

@Component({selector: 'app-cmp', template: '<div *ngIf="show" dir></div>'})
export class AppCmp {
  show = true;
}

@Directive({selector: '[dir]'})
export class Dir {}

@NgModule({declarations: [AppCmp, Dir], imports: [CommonModule]})
export class AppModule {}
"#,
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let mut compilation = analyze_with(&program, &host, loader());
    assert!(compilation.diagnostics().is_empty(), "{:?}", compilation.diagnostics());

    let scope = compilation
        .scopes()
        .lookup_compilation_scope_as_refs(class(&program, "AppCmp").id)
        .unwrap()
        .unwrap();
    assert_eq!(
        scope.directives.keys().collect::<Vec<_>>(),
        vec!["app-cmp", "[dir]", "[ngIf]", "[ngFor][ngForOf]"]
    );
    assert!(scope.directives["app-cmp"].meta.is_component);

    let mut pool = ConstantPool::new();
    let results = compilation
        .compile_ivy_field_for(class(&program, "AppCmp"), &mut pool)
        .unwrap()
        .unwrap();
    assert_eq!(results[0].name, "ngComponentDef");
}

#[test]
fn should_skip_type_checking_of_unscoped_components() {
    let program = make_program(&[(
        MAIN,
        "import {Component} from '@angular/core';\n@Component({selector: 'lonely', template: '{{ missing }}'})\nexport class Lonely {}\n",
    )]);
    let host = TypeScriptReflectionHost::new(&program);
    let mut compilation = analyze_with(&program, &host, loader());
    let mut ctx = crate::ngtsc::typecheck::TypeCheckContext::new(&program);
    compilation.type_check(&mut ctx).unwrap();
    let files = ctx.transformed_files().unwrap();
    assert!(files.iter().all(|(_, text)| !text.contains("_TypeCheckBlock")));
}
