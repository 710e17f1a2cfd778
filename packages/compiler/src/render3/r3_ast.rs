//! Render3 AST
//!
//! Template nodes after bindings, references and template variables have
//! been recognized. Elements, templates, references and variables carry a
//! `NodeId` unique within one parsed template, which binders use as identity.

use crate::expression_parser::ast::AST;
use crate::parse_util::ParseSourceSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub value: String,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundText {
    /// Always an `Interpolation`.
    pub value: AST,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextAttribute {
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingType {
    Property,
    Attribute,
    Class,
    Style,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundAttribute {
    pub name: String,
    pub type_: BindingType,
    pub value: AST,
    pub unit: Option<String>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundEvent {
    pub name: String,
    pub handler: AST,
    /// `window`, `document` or `body` for `(window:resize)` style events.
    pub target: Option<String>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: NodeId,
    pub name: String,
    pub attributes: Vec<TextAttribute>,
    pub inputs: Vec<BoundAttribute>,
    pub outputs: Vec<BoundEvent>,
    pub children: Vec<R3Node>,
    pub references: Vec<Reference>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub id: NodeId,
    /// `ng-template`, or the host element name for `*directive` sugar.
    pub tag_name: String,
    pub attributes: Vec<TextAttribute>,
    pub inputs: Vec<BoundAttribute>,
    pub outputs: Vec<BoundEvent>,
    pub children: Vec<R3Node>,
    pub references: Vec<Reference>,
    pub variables: Vec<Variable>,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub selector: String,
    pub attributes: Vec<TextAttribute>,
    pub source_span: ParseSourceSpan,
}

/// `let-name="value"` on a template, or a `let` in `*directive` syntax.
/// `value` names the template context property, `$implicit` by default.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub id: NodeId,
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
}

/// `#name` or `#name="exportAs"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub id: NodeId,
    pub name: String,
    pub value: String,
    pub source_span: ParseSourceSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum R3Node {
    Element(Element),
    Template(Template),
    Content(Content),
    Text(Text),
    BoundText(BoundText),
}

impl R3Node {
    pub fn source_span(&self) -> &ParseSourceSpan {
        match self {
            R3Node::Element(el) => &el.source_span,
            R3Node::Template(tmpl) => &tmpl.source_span,
            R3Node::Content(content) => &content.source_span,
            R3Node::Text(text) => &text.source_span,
            R3Node::BoundText(text) => &text.source_span,
        }
    }
}

/// An element or template, the nodes that can host directives.
#[derive(Debug, Clone, Copy)]
pub enum ElementOrTemplate<'a> {
    Element(&'a Element),
    Template(&'a Template),
}

impl<'a> ElementOrTemplate<'a> {
    pub fn id(&self) -> NodeId {
        match self {
            ElementOrTemplate::Element(el) => el.id,
            ElementOrTemplate::Template(tmpl) => tmpl.id,
        }
    }

    pub fn inputs(&self) -> &'a [BoundAttribute] {
        match self {
            ElementOrTemplate::Element(el) => &el.inputs,
            ElementOrTemplate::Template(tmpl) => &tmpl.inputs,
        }
    }

    pub fn outputs(&self) -> &'a [BoundEvent] {
        match self {
            ElementOrTemplate::Element(el) => &el.outputs,
            ElementOrTemplate::Template(tmpl) => &tmpl.outputs,
        }
    }

    pub fn attributes(&self) -> &'a [TextAttribute] {
        match self {
            ElementOrTemplate::Element(el) => &el.attributes,
            ElementOrTemplate::Template(tmpl) => &tmpl.attributes,
        }
    }

    pub fn references(&self) -> &'a [Reference] {
        match self {
            ElementOrTemplate::Element(el) => &el.references,
            ElementOrTemplate::Template(tmpl) => &tmpl.references,
        }
    }
}
