//! Render3 T2 API
//!
//! Types shared by the template binder and its consumers.

use indexmap::IndexMap;

use crate::render3::r3_ast::{NodeId, R3Node, Reference, Variable};

/// Metadata the binder needs about a directive to match and bind it.
pub trait DirectiveMeta: Clone {
    /// Class name, for diagnostics.
    fn name(&self) -> &str;

    /// CSS selector, absent for abstract directives which never match.
    fn selector(&self) -> Option<&str>;

    fn is_component(&self) -> bool;

    /// Class property name to binding property name.
    fn inputs(&self) -> &IndexMap<String, String>;

    /// Class property name to binding property name.
    fn outputs(&self) -> &IndexMap<String, String>;

    /// Names usable as `#ref="name"` on the host.
    fn export_as(&self) -> Option<&[String]>;
}

/// What a `#ref` in the template points at.
#[derive(Debug, Clone)]
pub enum ReferenceTarget<D> {
    Directive { directive: D, node: NodeId },
    Element(NodeId),
    Template(NodeId),
}

/// A name declared by the template itself.
#[derive(Debug, Clone, Copy)]
pub enum TemplateEntity<'a> {
    Reference(&'a Reference),
    Variable(&'a Variable),
}

impl<'a> TemplateEntity<'a> {
    pub fn id(&self) -> NodeId {
        match self {
            TemplateEntity::Reference(reference) => reference.id,
            TemplateEntity::Variable(variable) => variable.id,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            TemplateEntity::Reference(reference) => &reference.name,
            TemplateEntity::Variable(variable) => &variable.name,
        }
    }
}

/// A template to bind.
#[derive(Debug, Clone, Copy)]
pub struct Target<'a> {
    pub template: &'a [R3Node],
}
