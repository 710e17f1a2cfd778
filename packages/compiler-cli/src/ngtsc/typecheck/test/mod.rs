mod type_check_block_spec;
mod type_constructor_spec;

use angular_compiler::directive_matching::{CssSelector, SelectorMatcher};
use angular_compiler::render3::r3_ast::R3Node;
use angular_compiler::render3::view::{parse_template, ParseTemplateOptions};
use indexmap::IndexMap;
use ts::Program;

use crate::ngtsc::imports::Reference;
use crate::ngtsc::typecheck::TypeCheckableDirectiveMeta;

const COMMON_DTS: &str = "/node_modules/@angular/common/index.d.ts";

fn directive(program: &Program, file: &str, name: &str, selector: &str, inputs: &[&str]) -> TypeCheckableDirectiveMeta {
    let class = program.find_class(file, name).unwrap();
    let mut reference = Reference::resolved(class.id, name, file);
    if file.starts_with("/node_modules/") {
        reference = reference.owned_by(Some("@angular/common"));
    }
    TypeCheckableDirectiveMeta {
        reference,
        name: name.to_string(),
        selector: Some(selector.to_string()),
        is_component: false,
        inputs: inputs.iter().map(|input| (input.to_string(), input.to_string())).collect(),
        outputs: IndexMap::new(),
        export_as: None,
        queries: Vec::new(),
        ng_template_guards: Vec::new(),
        has_ng_template_context_guard: false,
    }
}

fn matcher(directives: Vec<TypeCheckableDirectiveMeta>) -> SelectorMatcher<TypeCheckableDirectiveMeta> {
    let mut matcher = SelectorMatcher::new();
    for dir in directives {
        let selectors = CssSelector::parse(dir.selector.as_deref().unwrap()).unwrap();
        matcher.add_selectables(selectors, dir);
    }
    matcher
}

fn template(text: &str) -> Vec<R3Node> {
    let parsed = parse_template(text, "/app/cmp.ts#Cmp/template.html", ParseTemplateOptions::default(), "app/cmp.ts");
    assert!(parsed.errors.is_empty(), "template errors: {:?}", parsed.errors);
    parsed.nodes
}
