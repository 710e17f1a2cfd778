// TypeCheck API
//
// Directive metadata as seen by template type-checking, and the requests the
// type-checking context turns into generated code.

use angular_compiler::render3::view::DirectiveMeta;
use indexmap::IndexMap;

use crate::ngtsc::imports::Reference;

/// A directive that can appear in a type-checked template.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeCheckableDirectiveMeta {
    pub reference: Reference,
    pub name: String,
    pub selector: Option<String>,
    pub is_component: bool,
    /// Class property name to binding property name.
    pub inputs: IndexMap<String, String>,
    /// Class property name to binding property name.
    pub outputs: IndexMap<String, String>,
    pub export_as: Option<Vec<String>>,
    /// Property names of the content queries.
    pub queries: Vec<String>,
    /// Inputs that narrow the template context through a
    /// `static ngTemplateGuard_<input>` method.
    pub ng_template_guards: Vec<String>,
    /// Whether the class declares `static ngTemplateContextGuard`.
    pub has_ng_template_context_guard: bool,
}

impl DirectiveMeta for TypeCheckableDirectiveMeta {
    fn name(&self) -> &str {
        &self.name
    }

    fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
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

/// Request for a type check block function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCheckBlockMetadata {
    /// Name of the generated function, `<Component>_TypeCheckBlock`.
    pub fn_name: String,
}

/// Request for a static type constructor on a directive class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCtorMetadata {
    pub fn_name: String,
    /// Emit a body. Declarations in `.d.ts` files get none.
    pub body: bool,
    pub fields: TypeCtorFields,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCtorFields {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub queries: Vec<String>,
}
