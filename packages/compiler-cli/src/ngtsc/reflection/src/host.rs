//! Reflection host API
//!
//! The compiler never walks syntax trees to answer questions about classes
//! and their decorators. It asks a `ReflectionHost`, which keeps the
//! annotation handlers independent of how the program was parsed.

use ts::{ClassDeclaration, DeclId, Expression, FileId, Statement, TextRange, TypeNode};

use crate::ngtsc::diagnostics::SourceSpan;

/// Metadata extracted from an instance of a decorator on another declaration.
#[derive(Debug, Clone)]
pub struct Decorator {
    /// Name by which the decorator was invoked in the user's code.
    pub name: String,

    /// Expression which refers to the decorator in the user's code, either
    /// `Name` or `ns.Name`.
    pub identifier: Expression,

    /// `Import` by which the decorator was brought into the module in which it was invoked.
    pub import: Option<Import>,

    /// Arguments of the invocation. `None` when the decorator was not called,
    /// as in `@Input`; `Some(vec![])` for `@Input()`.
    pub args: Option<Vec<Expression>>,

    /// The whole decorator, including the leading `@`.
    pub span: SourceSpan,
}

impl Decorator {
    /// A span in the file the decorator was written in.
    pub fn span_of(&self, range: TextRange) -> SourceSpan {
        SourceSpan::new(self.span.file.clone(), range)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassMemberKind {
    Getter,
    Setter,
    Property,
    Method,
}

/// A member of a class, including constructor parameter properties.
#[derive(Debug, Clone)]
pub struct ClassMember {
    pub name: String,
    pub kind: ClassMemberKind,
    pub is_static: bool,
    pub decorators: Vec<Decorator>,
    pub type_node: Option<TypeNode>,
    /// Initializer of a property.
    pub value: Option<Expression>,
    /// Declaration of the member, when it is a real class element.
    pub implementation: Option<DeclId>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct CtorParameter {
    pub name: String,
    /// Value expression for the parameter's type, when the type annotation
    /// names something that also exists at runtime.
    pub type_expression: Option<Expression>,
    pub type_node: Option<TypeNode>,
    pub decorators: Vec<Decorator>,
    pub span: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub initializer: Option<Expression>,
}

/// A function or method whose body can be inspected.
#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub decl: DeclId,
    /// File the function is declared in.
    pub file: FileId,
    pub parameters: Vec<Parameter>,
    /// Statements of the body. Expression-bodied arrow functions are reported
    /// as a single `return`. `None` for declarations without a body.
    pub body: Option<Vec<Statement>>,
    pub return_type: Option<TypeNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Name of the symbol in the module it was imported from.
    pub name: String,
    /// Module specifier it was imported from.
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub decl: DeclId,
    /// Set when the declaration was reached through a bare module specifier.
    pub via_module: Option<String>,
}

/// Abstracts reflection operations on the program.
pub trait ReflectionHost {
    /// `None` when the class carries no decorators at all.
    fn get_decorators_of_declaration(&self, class: &ClassDeclaration) -> Option<Vec<Decorator>>;

    fn get_members_of_class(&self, class: &ClassDeclaration) -> Vec<ClassMember>;

    /// `None` when the class declares no constructor.
    fn get_constructor_parameters(&self, class: &ClassDeclaration) -> Option<Vec<CtorParameter>>;

    fn has_base_class(&self, class: &ClassDeclaration) -> bool;

    /// The import that brought `name` into `file`, if any.
    fn get_import_of_identifier(&self, name: &str, file: FileId) -> Option<Import>;

    fn get_declaration_of_identifier(&self, name: &str, file: FileId) -> Option<Declaration>;

    fn get_definition_of_function(&self, decl: DeclId) -> Option<FunctionDefinition>;

    /// The `.d.ts` declaration of a class, when the class comes from one.
    fn get_dts_declaration_of_class(&self, class: &ClassDeclaration) -> Option<DeclId>;

    fn is_class(&self, decl: DeclId) -> bool;

    fn get_generic_arity_of_class(&self, class: &ClassDeclaration) -> Option<usize>;
}
