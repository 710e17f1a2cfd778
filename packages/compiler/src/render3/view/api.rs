//! Render3 View API
//!
//! Metadata the definition compilers consume.

use indexmap::IndexMap;

use crate::core::ViewEncapsulation;
use crate::output::output_ast::Expression;
use crate::render3::r3_ast as t;
use crate::render3::r3_factory::R3DependencyMetadata;

use super::t2_api::DirectiveMeta;

/// Information needed to compile a directive for the render3 runtime.
#[derive(Debug, Clone)]
pub struct R3DirectiveMetadata {
    /// Name of the directive type.
    pub name: String,
    /// An expression representing a reference to the directive itself.
    pub type_: Expression,
    /// Number of generic type parameters of the type itself.
    pub type_argument_count: usize,
    /// Constructor dependencies. `None` when the constructor is inherited.
    pub deps: Option<Vec<R3DependencyMetadata>>,
    /// Unparsed selector of the directive, or `None` if there was no selector.
    pub selector: Option<String>,
    /// Content queries made by the directive.
    pub queries: Vec<R3QueryMetadata>,
    /// Mappings indicating how the directive interacts with its host element.
    pub host: R3HostMetadata,
    pub lifecycle: R3LifecycleMetadata,
    /// Class property name to `(binding property name, class property name)`.
    pub inputs: IndexMap<String, (String, String)>,
    /// Class property name to binding property name.
    pub outputs: IndexMap<String, String>,
    /// Whether the directive extends another class.
    pub uses_inheritance: bool,
    /// Reference name under which to export the directive's type in a template.
    pub export_as: Option<String>,
    pub providers: Option<Expression>,
}

#[derive(Debug, Clone, Default)]
pub struct R3LifecycleMetadata {
    /// Whether the directive implements `ngOnChanges`.
    pub uses_on_changes: bool,
}

/// Information needed to compile a component for the render3 runtime.
#[derive(Debug, Clone)]
pub struct R3ComponentMetadata {
    pub directive: R3DirectiveMetadata,
    pub template: R3ComponentTemplate,
    pub view_queries: Vec<R3QueryMetadata>,
    /// Directives visible to the template, in compilation scope order.
    pub directives: Vec<R3UsedDirectiveMetadata>,
    /// Pipe name to pipe type, for pipes visible to the template.
    pub pipes: IndexMap<String, Expression>,
    /// Emit `directives` and `pipes` as closures because some of them are
    /// declared later in the file.
    pub wrap_directives_and_pipes_in_closure: bool,
    pub styles: Vec<String>,
    pub encapsulation: ViewEncapsulation,
    pub animations: Option<Expression>,
    pub relative_context_file_path: String,
}

#[derive(Debug, Clone)]
pub struct R3ComponentTemplate {
    pub nodes: Vec<t::R3Node>,
    /// Whether the template contains `<ng-content>`.
    pub has_ng_content: bool,
    /// Selectors of `<ng-content select>` slots other than the wildcard.
    pub ng_content_selectors: Vec<String>,
}

/// A directive in a component's compilation scope.
#[derive(Debug, Clone)]
pub struct R3UsedDirectiveMetadata {
    pub name: String,
    pub selector: String,
    pub expression: Expression,
    pub is_component: bool,
    pub inputs: IndexMap<String, String>,
    pub outputs: IndexMap<String, String>,
    pub export_as: Option<Vec<String>>,
}

impl DirectiveMeta for R3UsedDirectiveMetadata {
    fn name(&self) -> &str {
        &self.name
    }

    fn selector(&self) -> Option<&str> {
        Some(&self.selector)
    }

    fn is_component(&self) -> bool {
        self.is_component
    }

    fn inputs(&self) -> &IndexMap<String, String> {
        &self.inputs
    }

    fn outputs(&self) -> &IndexMap<String, String> {
        &self.outputs
    }

    fn export_as(&self) -> Option<&[String]> {
        self.export_as.as_deref()
    }
}

/// Information needed to compile a query (view or content).
#[derive(Debug, Clone)]
pub struct R3QueryMetadata {
    /// Name of the property on the class to update with query results.
    pub property_name: String,
    /// Whether to read only the first matching result.
    pub first: bool,
    pub predicate: R3QueryPredicate,
    /// Whether to include only direct children or all descendants.
    pub descendants: bool,
    /// An expression representing a type to read from each matched node.
    pub read: Option<Expression>,
}

#[derive(Debug, Clone)]
pub enum R3QueryPredicate {
    Type(Expression),
    Selectors(Vec<String>),
}

/// Mappings indicating how the class interacts with its host element.
#[derive(Debug, Clone, Default)]
pub struct R3HostMetadata {
    /// Static attribute name to value expression.
    pub attributes: IndexMap<String, Expression>,
    /// Event name to unparsed handler expression.
    pub listeners: IndexMap<String, String>,
    /// Property name to unparsed binding expression.
    pub properties: IndexMap<String, String>,
}

/// Information needed to compile a base definition.
#[derive(Debug, Clone, Default)]
pub struct R3BaseRefMetadata {
    /// Class property name to `(binding property name, class property name)`.
    pub inputs: IndexMap<String, (String, String)>,
    pub outputs: IndexMap<String, String>,
}
