//! Syntax tree for the TypeScript subset the Angular compiler reflects over.
//!
//! Every node records its `TextRange` in the owning file's text. Declarations
//! (classes, class members, functions, variables, enums) additionally carry a
//! `DeclId`, which is the stable identity used for caches and references.

use bitflags::bitflags;
use smallvec::SmallVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u32);

/// Identity of a declaration inside one `Program`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId {
    pub file: FileId,
    pub index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    pub pos: u32,
    pub end: u32,
}

impl TextRange {
    pub fn new(pos: u32, end: u32) -> Self {
        Self { pos, end }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.pos
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ModifierFlags: u16 {
        const EXPORT = 1 << 0;
        const DEFAULT = 1 << 1;
        const DECLARE = 1 << 2;
        const STATIC = 1 << 3;
        const PUBLIC = 1 << 4;
        const PRIVATE = 1 << 5;
        const PROTECTED = 1 << 6;
        const READONLY = 1 << 7;
        const ABSTRACT = 1 << 8;
        const ASYNC = 1 << 9;
        const CONST = 1 << 10;
    }
}

impl ModifierFlags {
    /// Modifiers that turn a constructor parameter into a class property.
    pub fn is_parameter_property(&self) -> bool {
        self.intersects(
            ModifierFlags::PUBLIC
                | ModifierFlags::PRIVATE
                | ModifierFlags::PROTECTED
                | ModifierFlags::READONLY,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub text: String,
    pub range: TextRange,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    Exponent,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    Less,
    Greater,
    LessEquals,
    GreaterEquals,
    Equals,
    NotEquals,
    StrictEquals,
    StrictNotEquals,
    And,
    Or,
    Coalesce,
    BitAnd,
    BitOr,
    BitXor,
    InstanceOf,
    In,
    Assign,
    Comma,
}

impl BinaryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Exponent => "**",
            BinaryOperator::LeftShift => "<<",
            BinaryOperator::RightShift => ">>",
            BinaryOperator::UnsignedRightShift => ">>>",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::LessEquals => "<=",
            BinaryOperator::GreaterEquals => ">=",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::StrictEquals => "===",
            BinaryOperator::StrictNotEquals => "!==",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
            BinaryOperator::Coalesce => "??",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::BitXor => "^",
            BinaryOperator::InstanceOf => "instanceof",
            BinaryOperator::In => "in",
            BinaryOperator::Assign => "=",
            BinaryOperator::Comma => ",",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixOperator {
    Not,
    Minus,
    Plus,
    BitNot,
    TypeOf,
    Void,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionKind {
    Identifier(String),
    String(String),
    Number(f64),
    True,
    False,
    Null,
    This,
    Array(Vec<Expression>),
    Object(Vec<ObjectMember>),
    PropertyAccess {
        object: Box<Expression>,
        name: Identifier,
    },
    ElementAccess {
        object: Box<Expression>,
        index: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
    },
    New {
        callee: Box<Expression>,
        type_arguments: Vec<TypeNode>,
        arguments: Vec<Expression>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Prefix {
        operator: PrefixOperator,
        operand: Box<Expression>,
    },
    Conditional {
        condition: Box<Expression>,
        when_true: Box<Expression>,
        when_false: Box<Expression>,
    },
    Parenthesized(Box<Expression>),
    As {
        expression: Box<Expression>,
        type_node: Box<TypeNode>,
    },
    NonNull(Box<Expression>),
    Arrow(Box<FunctionLike>),
    Function(Box<FunctionLike>),
    Spread(Box<Expression>),
    /// A template literal with substitutions, kept as raw source.
    Template(String),
    Regex(String),
}

impl Expression {
    pub fn new(kind: ExpressionKind, range: TextRange) -> Self {
        Self { kind, range }
    }

    pub fn as_identifier(&self) -> Option<&str> {
        match &self.kind {
            ExpressionKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_object_literal(&self) -> Option<&[ObjectMember]> {
        match &self.kind {
            ExpressionKind::Object(members) => Some(members),
            _ => None,
        }
    }

    pub fn as_array_literal(&self) -> Option<&[Expression]> {
        match &self.kind {
            ExpressionKind::Array(elements) => Some(elements),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyName {
    pub text: String,
    pub quoted: bool,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectMember {
    Property {
        name: PropertyName,
        value: Expression,
    },
    Shorthand(Identifier),
    Spread(Expression),
}

impl ObjectMember {
    pub fn name(&self) -> Option<&str> {
        match self {
            ObjectMember::Property { name, .. } => Some(&name.text),
            ObjectMember::Shorthand(id) => Some(&id.text),
            ObjectMember::Spread(_) => None,
        }
    }
}

/// Reads an object literal's members into `(name, value)` pairs in source order.
///
/// Shorthand members are reported with a synthesized identifier expression and
/// spread members are skipped.
pub fn reflect_object_literal(members: &[ObjectMember]) -> Vec<(&str, Expression)> {
    members
        .iter()
        .filter_map(|member| match member {
            ObjectMember::Property { name, value } => Some((name.text.as_str(), value.clone())),
            ObjectMember::Shorthand(id) => Some((
                id.text.as_str(),
                Expression::new(ExpressionKind::Identifier(id.text.clone()), id.range),
            )),
            ObjectMember::Spread(_) => None,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParameter {
    pub name: String,
    pub constraint: Option<TypeNode>,
    pub default: Option<TypeNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: Identifier,
    pub decorators: Vec<Decorator>,
    pub modifiers: ModifierFlags,
    pub type_node: Option<TypeNode>,
    pub initializer: Option<Expression>,
    pub optional: bool,
    pub rest: bool,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Expression(Box<Expression>),
    Block(Vec<Statement>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLike {
    pub name: Option<Identifier>,
    pub type_parameters: Vec<TypeParameter>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeNode>,
    pub body: Option<FunctionBody>,
    pub range: TextRange,
}

impl FunctionLike {
    /// The statements of a block body; empty for expression bodies and
    /// overload signatures.
    pub fn body_statements(&self) -> &[Statement] {
        match &self.body {
            Some(FunctionBody::Block(statements)) => statements,
            _ => &[],
        }
    }
}

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    pub kind: TypeKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// `a.b.C<args>`
    Reference {
        name: SmallVec<[String; 2]>,
        arguments: Vec<TypeNode>,
    },
    /// `typeof a.b`
    Query(SmallVec<[String; 2]>),
    Tuple(Vec<TypeNode>),
    Array(Box<TypeNode>),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    StringLiteral(String),
    NumberLiteral(f64),
    BooleanLiteral(bool),
    Literal(Vec<TypeMember>),
    /// `any`, `never`, `string`, `null`, ...
    Keyword(String),
    Function {
        parameters: Vec<Parameter>,
        return_type: Box<TypeNode>,
    },
    Parenthesized(Box<TypeNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeMember {
    pub name: PropertyName,
    pub optional: bool,
    pub type_node: Option<TypeNode>,
}

// ============================================================================
// Declarations and statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    pub expression: Expression,
    /// Includes the leading `@`.
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassElementKind {
    Property {
        type_node: Option<TypeNode>,
        initializer: Option<Expression>,
    },
    Method(FunctionLike),
    Getter(FunctionLike),
    Setter(FunctionLike),
    Constructor(FunctionLike),
    IndexSignature,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassElement {
    pub id: DeclId,
    pub name: Option<PropertyName>,
    pub decorators: Vec<Decorator>,
    pub modifiers: ModifierFlags,
    pub kind: ClassElementKind,
    pub range: TextRange,
}

impl ClassElement {
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(ModifierFlags::STATIC)
    }

    pub fn name_text(&self) -> Option<&str> {
        self.name.as_ref().map(|n| n.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    pub id: DeclId,
    pub name: Option<Identifier>,
    pub decorators: Vec<Decorator>,
    pub modifiers: ModifierFlags,
    pub type_parameters: Vec<TypeParameter>,
    pub extends: Option<Expression>,
    pub members: Vec<ClassElement>,
    /// From the first decorator (or modifier) to the closing brace.
    pub range: TextRange,
    /// From the opening brace to the closing brace, inclusive.
    pub body_range: TextRange,
}

impl ClassDeclaration {
    pub fn name_text(&self) -> Option<&str> {
        self.name.as_ref().map(|n| n.text.as_str())
    }

    pub fn constructor(&self) -> Option<&FunctionLike> {
        self.members.iter().find_map(|m| match &m.kind {
            ClassElementKind::Constructor(f) => Some(f),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    pub id: DeclId,
    pub modifiers: ModifierFlags,
    pub function: FunctionLike,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub id: DeclId,
    pub name: Identifier,
    pub type_node: Option<TypeNode>,
    pub initializer: Option<Expression>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableStatement {
    pub modifiers: ModifierFlags,
    pub kind: VariableKind,
    pub declarations: Vec<VariableDeclaration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: PropertyName,
    pub initializer: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDeclaration {
    pub id: DeclId,
    pub name: Identifier,
    pub modifiers: ModifierFlags,
    pub members: Vec<EnumMember>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpecifier {
    pub imported: String,
    pub local: Identifier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDeclaration {
    pub default_binding: Option<Identifier>,
    pub namespace: Option<Identifier>,
    pub named: Vec<ImportSpecifier>,
    pub module_specifier: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportDeclaration {
    /// Empty together with `star` for `export * from '...'`.
    pub specifiers: Vec<ExportSpecifier>,
    pub star: bool,
    pub module_specifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Import(ImportDeclaration),
    Export(ExportDeclaration),
    Class(ClassDeclaration),
    Function(FunctionDeclaration),
    Variable(VariableStatement),
    Enum(EnumDeclaration),
    Return(Option<Expression>),
    Expression(Expression),
    /// Anything the compiler never needs to look inside (interfaces, type
    /// aliases, control flow in function bodies).
    Other,
}

impl StatementKind {
    /// Statements that declare into a scope nested inside this one. Only
    /// function declaration bodies are followed.
    pub fn nested_statements(&self) -> &[Statement] {
        match self {
            StatementKind::Function(f) => f.function.body_statements(),
            _ => &[],
        }
    }
}

/// A parsed file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub id: FileId,
    pub file_name: String,
    pub text: String,
    pub statements: Vec<Statement>,
}

impl SourceFile {
    pub fn is_declaration_file(&self) -> bool {
        self.file_name.ends_with(".d.ts")
    }

    pub fn text_of(&self, range: TextRange) -> &str {
        let start = (range.pos as usize).min(self.text.len());
        let end = (range.end as usize).clamp(start, self.text.len());
        &self.text[start..end]
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDeclaration> {
        self.statements.iter().filter_map(|s| match &s.kind {
            StatementKind::Class(c) => Some(c),
            _ => None,
        })
    }

    /// Every class of the file in source order, including classes declared
    /// inside function bodies.
    pub fn all_classes(&self) -> Vec<&ClassDeclaration> {
        fn collect<'a>(statements: &'a [Statement], out: &mut Vec<&'a ClassDeclaration>) {
            for statement in statements {
                if let StatementKind::Class(c) = &statement.kind {
                    out.push(c);
                }
                collect(statement.kind.nested_statements(), out);
            }
        }
        let mut out = Vec::new();
        collect(&self.statements, &mut out);
        out
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportDeclaration> {
        self.statements.iter().filter_map(|s| match &s.kind {
            StatementKind::Import(i) => Some(i),
            _ => None,
        })
    }
}
