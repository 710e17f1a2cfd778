//! Render3 Template Transform
//!
//! Turns the HTML node tree into the Render3 AST: binding attributes become
//! inputs and outputs, `#ref` and `let-` become references and variables,
//! and `*directive` sugar wraps its host element in a `Template`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::expression_parser::ast::{ASTWithSource, AST};
use crate::expression_parser::Parser;
use crate::ml_parser::ast as html;
use crate::ml_parser::tags::is_ng_template;
use crate::parse_util::{ParseError, ParseSourceSpan};

use super::r3_ast as t;

static BIND_NAME_REGEXP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:(?:(bind-)|(let-)|(ref-|#)|(on-)|(bindon-)|(@))(.+))|\[\(([^\)]+)\)\]|\[([^\]]+)\]|\(([^\)]+)\))$")
        .unwrap()
});

const KW_BIND_IDX: usize = 1;
const KW_LET_IDX: usize = 2;
const KW_REF_IDX: usize = 3;
const KW_ON_IDX: usize = 4;
const KW_BINDON_IDX: usize = 5;
const KW_AT_IDX: usize = 6;
const IDENT_KW_IDX: usize = 7;
const IDENT_BANANA_BOX_IDX: usize = 8;
const IDENT_PROPERTY_IDX: usize = 9;
const IDENT_EVENT_IDX: usize = 10;

const TEMPLATE_ATTR_PREFIX: &str = "*";
const ANIMATE_PROP_PREFIX: &str = "animate-";
const IMPLICIT_VALUE: &str = "$implicit";

#[derive(Debug)]
pub struct Render3ParseResult {
    pub nodes: Vec<t::R3Node>,
    pub errors: Vec<ParseError>,
}

pub fn html_ast_to_render3_ast(html_nodes: &[html::Node]) -> Render3ParseResult {
    let mut transformer = HtmlAstToIvyAst {
        parser: Parser::new(),
        errors: Vec::new(),
        next_id: 0,
    };
    let nodes = transformer.visit_all(html_nodes);
    Render3ParseResult {
        nodes,
        errors: transformer.errors,
    }
}

/// A binding written on the host element of `*directive` sugar, before it is
/// known to be literal or bound.
enum TemplateAttr {
    Literal(t::TextAttribute),
    Bound(t::BoundAttribute),
}

struct HtmlAstToIvyAst {
    parser: Parser,
    errors: Vec<ParseError>,
    next_id: usize,
}

impl HtmlAstToIvyAst {
    fn visit_all(&mut self, nodes: &[html::Node]) -> Vec<t::R3Node> {
        nodes.iter().filter_map(|node| self.visit(node)).collect()
    }

    fn visit(&mut self, node: &html::Node) -> Option<t::R3Node> {
        match node {
            html::Node::Element(el) => self.visit_element(el),
            html::Node::Text(text) => Some(self.visit_text(text)),
            html::Node::Comment(_) => None,
        }
    }

    fn next_id(&mut self) -> t::NodeId {
        let id = t::NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn report(&mut self, message: impl Into<String>, span: &ParseSourceSpan) {
        self.errors.push(ParseError::new(span.clone(), message));
    }

    fn report_expression_errors(&mut self, ast: &ASTWithSource, span: &ParseSourceSpan) {
        for err in &ast.errors {
            self.errors.push(ParseError::new(span.clone(), err.message.clone()));
        }
    }

    fn visit_text(&mut self, text: &html::Text) -> t::R3Node {
        let offset = text.source_span.start.offset;
        let url = text.source_span.start.file.url.clone();
        match self.parser.parse_interpolation(&text.value, &url, offset) {
            Some(ast) => {
                self.report_expression_errors(&ast, &text.source_span);
                t::R3Node::BoundText(t::BoundText {
                    value: ast.ast,
                    source_span: text.source_span.clone(),
                })
            }
            None => t::R3Node::Text(t::Text {
                value: text.value.clone(),
                source_span: text.source_span.clone(),
            }),
        }
    }

    fn visit_element(&mut self, element: &html::Element) -> Option<t::R3Node> {
        if is_ignored_element(element) {
            return None;
        }
        let is_template_element = is_ng_template(&element.name);
        // Allocated before children so ids follow document order.
        let id = self.next_id();

        let mut attributes = Vec::new();
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        let mut references = Vec::new();
        let mut variables = Vec::new();
        let mut template_attrs: Option<Vec<TemplateAttr>> = None;
        let mut template_variables = Vec::new();

        for attribute in &element.attrs {
            let name = normalize_attribute_name(&attribute.name);
            if let Some(template_key) = name.strip_prefix(TEMPLATE_ATTR_PREFIX) {
                if template_attrs.is_some() {
                    self.report(
                        "Can't have multiple template bindings on one element. Use only one attribute prefixed with *",
                        &attribute.source_span,
                    );
                    continue;
                }
                let (attrs, vars) = self.parse_inline_template_binding(template_key, attribute);
                template_attrs = Some(attrs);
                template_variables = vars;
                continue;
            }

            let has_binding = self.parse_attribute(
                is_template_element,
                attribute,
                &mut inputs,
                &mut outputs,
                &mut variables,
                &mut references,
            );
            if !has_binding {
                attributes.push(t::TextAttribute {
                    name: attribute.name.clone(),
                    value: attribute.value.clone(),
                    source_span: attribute.source_span.clone(),
                });
            }
        }

        let children = self.visit_all(&element.children);

        let parsed = if element.name == "ng-content" {
            let selector = attributes
                .iter()
                .find(|a| a.name == "select")
                .map(|a| a.value.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "*".to_string());
            t::R3Node::Content(t::Content {
                selector,
                attributes,
                source_span: element.source_span.clone(),
            })
        } else if is_template_element {
            t::R3Node::Template(t::Template {
                id,
                tag_name: element.name.clone(),
                attributes,
                inputs,
                outputs,
                children,
                references,
                variables,
                source_span: element.source_span.clone(),
            })
        } else {
            t::R3Node::Element(t::Element {
                id,
                name: element.name.clone(),
                attributes,
                inputs,
                outputs,
                children,
                references,
                source_span: element.source_span.clone(),
            })
        };

        let Some(template_attrs) = template_attrs else {
            return Some(parsed);
        };

        let mut attributes = Vec::new();
        let mut inputs = Vec::new();
        for attr in template_attrs {
            match attr {
                TemplateAttr::Literal(literal) => attributes.push(literal),
                TemplateAttr::Bound(bound) => inputs.push(bound),
            }
        }
        Some(t::R3Node::Template(t::Template {
            id: self.next_id(),
            tag_name: element.name.clone(),
            attributes,
            inputs,
            outputs: Vec::new(),
            children: vec![parsed],
            references: Vec::new(),
            variables: template_variables,
            source_span: element.source_span.clone(),
        }))
    }

    fn parse_inline_template_binding(
        &mut self,
        template_key: &str,
        attribute: &html::Attribute,
    ) -> (Vec<TemplateAttr>, Vec<t::Variable>) {
        let span = &attribute.source_span;
        let offset = value_offset(attribute);
        let url = span.start.file.url.clone();
        let result = self
            .parser
            .parse_template_bindings(template_key, &attribute.value, &url, offset);
        for err in &result.errors {
            self.report(err.message.clone(), span);
        }

        let mut attrs = Vec::new();
        let mut variables = Vec::new();
        for binding in result.bindings {
            if binding.key_is_var {
                variables.push(t::Variable {
                    id: self.next_id(),
                    name: binding.key,
                    value: binding.name.unwrap_or_else(|| IMPLICIT_VALUE.to_string()),
                    source_span: span.clone(),
                });
            } else if let Some(expression) = binding.expression {
                attrs.push(TemplateAttr::Bound(t::BoundAttribute {
                    name: binding.key,
                    type_: t::BindingType::Property,
                    value: expression.ast,
                    unit: None,
                    source_span: span.clone(),
                }));
            } else {
                attrs.push(TemplateAttr::Literal(t::TextAttribute {
                    name: binding.key,
                    value: String::new(),
                    source_span: span.clone(),
                }));
            }
        }
        (attrs, variables)
    }

    /// Returns whether the attribute was a binding of some kind.
    fn parse_attribute(
        &mut self,
        is_template_element: bool,
        attribute: &html::Attribute,
        inputs: &mut Vec<t::BoundAttribute>,
        outputs: &mut Vec<t::BoundEvent>,
        variables: &mut Vec<t::Variable>,
        references: &mut Vec<t::Reference>,
    ) -> bool {
        let name = normalize_attribute_name(&attribute.name);
        let value = attribute.value.as_str();
        let span = &attribute.source_span;

        let Some(parts) = BIND_NAME_REGEXP.captures(name) else {
            return self.parse_property_interpolation(name, attribute, inputs);
        };
        let group = |parts: &Captures, idx: usize| parts.get(idx).map(|m| m.as_str().to_string());
        let identifier = group(&parts, IDENT_KW_IDX);

        if let Some(identifier) = identifier {
            if parts.get(KW_BIND_IDX).is_some() {
                self.parse_property_binding(&identifier, attribute, inputs);
            } else if parts.get(KW_LET_IDX).is_some() {
                if is_template_element {
                    self.parse_variable(&identifier, value, span, variables);
                } else {
                    self.report("\"let-\" is only supported on ng-template elements.", span);
                }
            } else if parts.get(KW_REF_IDX).is_some() {
                self.parse_reference(&identifier, value, span, references);
            } else if parts.get(KW_ON_IDX).is_some() {
                self.parse_event(&identifier, value, attribute, outputs);
            } else if parts.get(KW_BINDON_IDX).is_some() {
                self.parse_property_binding(&identifier, attribute, inputs);
                self.parse_assignment_event(&identifier, attribute, outputs);
            } else if parts.get(KW_AT_IDX).is_some() {
                // Animation bindings have no type-level meaning.
            }
            return true;
        }

        if let Some(identifier) = group(&parts, IDENT_BANANA_BOX_IDX) {
            self.parse_property_binding(&identifier, attribute, inputs);
            self.parse_assignment_event(&identifier, attribute, outputs);
        } else if let Some(identifier) = group(&parts, IDENT_PROPERTY_IDX) {
            self.parse_property_binding(&identifier, attribute, inputs);
        } else if let Some(identifier) = group(&parts, IDENT_EVENT_IDX) {
            self.parse_event(&identifier, value, attribute, outputs);
        }
        true
    }

    fn parse_variable(&mut self, identifier: &str, value: &str, span: &ParseSourceSpan, variables: &mut Vec<t::Variable>) {
        if identifier.contains('-') {
            self.report("\"-\" is not allowed in variable names", span);
        }
        let value = if value.is_empty() { IMPLICIT_VALUE } else { value };
        variables.push(t::Variable {
            id: self.next_id(),
            name: identifier.to_string(),
            value: value.to_string(),
            source_span: span.clone(),
        });
    }

    fn parse_reference(&mut self, identifier: &str, value: &str, span: &ParseSourceSpan, references: &mut Vec<t::Reference>) {
        if identifier.contains('-') {
            self.report("\"-\" is not allowed in reference names", span);
        }
        references.push(t::Reference {
            id: self.next_id(),
            name: identifier.to_string(),
            value: value.to_string(),
            source_span: span.clone(),
        });
    }

    fn parse_property_binding(&mut self, name: &str, attribute: &html::Attribute, inputs: &mut Vec<t::BoundAttribute>) {
        if name.starts_with(ANIMATE_PROP_PREFIX) {
            return;
        }
        let url = attribute.source_span.start.file.url.clone();
        let ast = self.parser.parse_binding(&attribute.value, &url, value_offset(attribute));
        self.report_expression_errors(&ast, &attribute.source_span);
        inputs.push(create_bound_attribute(name, ast.ast, &attribute.source_span));
    }

    fn parse_property_interpolation(&mut self, name: &str, attribute: &html::Attribute, inputs: &mut Vec<t::BoundAttribute>) -> bool {
        let url = attribute.source_span.start.file.url.clone();
        match self
            .parser
            .parse_interpolation(&attribute.value, &url, value_offset(attribute))
        {
            Some(ast) => {
                self.report_expression_errors(&ast, &attribute.source_span);
                inputs.push(create_bound_attribute(name, ast.ast, &attribute.source_span));
                true
            }
            None => false,
        }
    }

    fn parse_event(&mut self, name: &str, handler: &str, attribute: &html::Attribute, outputs: &mut Vec<t::BoundEvent>) {
        let (target, event_name) = match name.split_once(':') {
            Some((target, event)) => (Some(target.trim().to_string()), event.trim()),
            None => (None, name),
        };
        let url = attribute.source_span.start.file.url.clone();
        let ast = self.parser.parse_action(handler, &url, value_offset(attribute));
        self.report_expression_errors(&ast, &attribute.source_span);
        outputs.push(t::BoundEvent {
            name: event_name.to_string(),
            handler: ast.ast,
            target,
            source_span: attribute.source_span.clone(),
        });
    }

    fn parse_assignment_event(&mut self, name: &str, attribute: &html::Attribute, outputs: &mut Vec<t::BoundEvent>) {
        let handler = format!("{}=$event", attribute.value);
        self.parse_event(&format!("{}Change", name), &handler, attribute, outputs);
    }
}

fn create_bound_attribute(name: &str, value: AST, span: &ParseSourceSpan) -> t::BoundAttribute {
    let (type_, name, unit) = if let Some(rest) = name.strip_prefix("attr.") {
        (t::BindingType::Attribute, rest.to_string(), None)
    } else if let Some(rest) = name.strip_prefix("class.") {
        (t::BindingType::Class, rest.to_string(), None)
    } else if let Some(rest) = name.strip_prefix("style.") {
        match rest.split_once('.') {
            Some((prop, unit)) => (t::BindingType::Style, prop.to_string(), Some(unit.to_string())),
            None => (t::BindingType::Style, rest.to_string(), None),
        }
    } else {
        (t::BindingType::Property, name.to_string(), None)
    };
    t::BoundAttribute {
        name,
        type_,
        value,
        unit,
        source_span: span.clone(),
    }
}

fn value_offset(attribute: &html::Attribute) -> usize {
    attribute
        .value_span
        .as_ref()
        .map(|span| span.start.offset)
        .unwrap_or(attribute.source_span.end.offset)
}

fn normalize_attribute_name(name: &str) -> &str {
    match name.to_ascii_lowercase().starts_with("data-") {
        true => &name[5..],
        false => name,
    }
}

/// `<script>`, `<style>` and stylesheet links never reach the view.
fn is_ignored_element(element: &html::Element) -> bool {
    match element.name.to_ascii_lowercase().as_str() {
        "script" | "style" => true,
        "link" => element
            .attrs
            .iter()
            .any(|a| a.name == "rel" && a.value.eq_ignore_ascii_case("stylesheet")),
        _ => false,
    }
}
