//! Output AST Module
//!
//! Language-neutral expression, statement and type trees produced by the
//! render3 compilers. The ngtsc translator turns them into TypeScript text.

//// Types

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinTypeName {
    Dynamic,
    Bool,
    String,
    Int,
    Number,
    Function,
    Inferred,
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinType {
    pub name: BuiltinTypeName,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionType {
    pub value: Box<Expression>,
    pub type_params: Option<Vec<Type>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub of: Box<Type>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapType {
    pub value_type: Option<Box<Type>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Builtin(BuiltinType),
    Expression(ExpressionType),
    Array(ArrayType),
    Map(MapType),
}

pub fn dynamic_type() -> Type {
    Type::Builtin(BuiltinType {
        name: BuiltinTypeName::Dynamic,
    })
}

pub fn number_type() -> Type {
    Type::Builtin(BuiltinType {
        name: BuiltinTypeName::Number,
    })
}

pub fn string_type() -> Type {
    Type::Builtin(BuiltinType {
        name: BuiltinTypeName::String,
    })
}

pub fn none_type() -> Type {
    Type::Builtin(BuiltinType {
        name: BuiltinTypeName::None,
    })
}

pub fn expression_type(value: Expression, type_params: Option<Vec<Type>>) -> Type {
    Type::Expression(ExpressionType {
        value: Box::new(value),
        type_params,
    })
}

///// Expressions

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Minus,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Equals,
    NotEquals,
    Identical,
    NotIdentical,
    Minus,
    Plus,
    Divide,
    Multiply,
    Modulo,
    And,
    Or,
    BitwiseAnd,
    BitwiseOr,
    Lower,
    LowerEquals,
    Bigger,
    BiggerEquals,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Undefined,
    Bool(bool),
    Number(f64),
    String(String),
}

impl From<String> for LiteralValue {
    fn from(s: String) -> Self {
        LiteralValue::String(s)
    }
}

impl From<&str> for LiteralValue {
    fn from(s: &str) -> Self {
        LiteralValue::String(s.to_string())
    }
}

impl From<f64> for LiteralValue {
    fn from(n: f64) -> Self {
        LiteralValue::Number(n)
    }
}

impl From<bool> for LiteralValue {
    fn from(b: bool) -> Self {
        LiteralValue::Bool(b)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadVarExpr {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteVarExpr {
    pub name: String,
    pub value: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WritePropExpr {
    pub receiver: Box<Expression>,
    pub name: String,
    pub value: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteKeyExpr {
    pub receiver: Box<Expression>,
    pub index: Box<Expression>,
    pub value: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvokeFunctionExpr {
    pub fn_: Box<Expression>,
    pub args: Vec<Expression>,
    /// Marks the call as side-effect free for optimizers.
    pub pure: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstantiateExpr {
    pub class_expr: Box<Expression>,
    pub args: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: LiteralValue,
}

/// A symbol imported from another module, or a local symbol when
/// `module_name` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalReference {
    pub module_name: Option<String>,
    pub name: Option<String>,
}

impl ExternalReference {
    pub fn new(module_name: impl Into<String>, name: impl Into<String>) -> Self {
        ExternalReference {
            module_name: Some(module_name.into()),
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExternalExpr {
    pub value: ExternalReference,
    pub type_params: Option<Vec<Type>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpr {
    pub condition: Box<Expression>,
    pub true_case: Box<Expression>,
    pub false_case: Option<Box<Expression>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotExpr {
    pub condition: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssertNotNullExpr {
    pub condition: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    pub value: Box<Expression>,
    pub type_: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnParam {
    pub name: String,
    pub type_: Option<Type>,
}

impl FnParam {
    pub fn new(name: impl Into<String>) -> Self {
        FnParam {
            name: name.into(),
            type_: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionExpr {
    pub params: Vec<FnParam>,
    pub statements: Vec<Statement>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperatorExpr {
    pub operator: BinaryOperator,
    pub lhs: Box<Expression>,
    pub rhs: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadPropExpr {
    pub receiver: Box<Expression>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadKeyExpr {
    pub receiver: Box<Expression>,
    pub index: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralArrayExpr {
    pub entries: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralMapEntry {
    pub key: String,
    pub value: Expression,
    pub quoted: bool,
}

impl LiteralMapEntry {
    pub fn new(key: impl Into<String>, value: Expression, quoted: bool) -> Self {
        LiteralMapEntry {
            key: key.into(),
            value,
            quoted,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralMapExpr {
    pub entries: Vec<LiteralMapEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommaExpr {
    pub parts: Vec<Expression>,
}

/// Host-language source text carried through the output AST untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedNodeExpr {
    pub node: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeofExpr {
    pub expr: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperatorExpr {
    pub operator: UnaryOperator,
    pub expr: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    ReadVar(ReadVarExpr),
    WriteVar(WriteVarExpr),
    WriteProp(WritePropExpr),
    WriteKey(WriteKeyExpr),
    InvokeFn(InvokeFunctionExpr),
    Instantiate(InstantiateExpr),
    Literal(LiteralExpr),
    External(ExternalExpr),
    Conditional(ConditionalExpr),
    Not(NotExpr),
    AssertNotNull(AssertNotNullExpr),
    Cast(CastExpr),
    Fn(FunctionExpr),
    BinaryOp(BinaryOperatorExpr),
    ReadProp(ReadPropExpr),
    ReadKey(ReadKeyExpr),
    LiteralArray(LiteralArrayExpr),
    LiteralMap(LiteralMapExpr),
    Comma(CommaExpr),
    WrappedNode(WrappedNodeExpr),
    TypeOf(TypeofExpr),
    Unary(UnaryOperatorExpr),
}

///// Statements

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StmtModifier {
    Final,
    Private,
    Exported,
    Static,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclareVarStmt {
    pub name: String,
    pub value: Option<Expression>,
    pub type_: Option<Type>,
    pub modifiers: Vec<StmtModifier>,
}

impl DeclareVarStmt {
    pub fn has_modifier(&self, modifier: StmtModifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclareFunctionStmt {
    pub name: String,
    pub params: Vec<FnParam>,
    pub statements: Vec<Statement>,
    pub type_: Option<Type>,
    pub modifiers: Vec<StmtModifier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expr: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expression,
    pub true_case: Vec<Statement>,
    pub false_case: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    DeclareVar(DeclareVarStmt),
    DeclareFn(DeclareFunctionStmt),
    Expression(ExpressionStatement),
    Return(ReturnStatement),
    If(IfStmt),
}

// Builders

pub fn write_var(name: impl Into<String>, value: Expression) -> Expression {
    Expression::WriteVar(WriteVarExpr {
        name: name.into(),
        value: Box::new(value),
    })
}

pub fn variable(name: impl Into<String>) -> Expression {
    Expression::ReadVar(ReadVarExpr { name: name.into() })
}

pub fn literal(value: impl Into<LiteralValue>) -> Expression {
    Expression::Literal(LiteralExpr {
        value: value.into(),
    })
}

pub fn null_expr() -> Expression {
    Expression::Literal(LiteralExpr {
        value: LiteralValue::Null,
    })
}

pub fn undefined_expr() -> Expression {
    Expression::Literal(LiteralExpr {
        value: LiteralValue::Undefined,
    })
}

pub fn literal_arr(entries: Vec<Expression>) -> Expression {
    Expression::LiteralArray(LiteralArrayExpr { entries })
}

pub fn literal_map(entries: Vec<LiteralMapEntry>) -> Expression {
    Expression::LiteralMap(LiteralMapExpr { entries })
}

pub fn import_expr(reference: ExternalReference) -> Expression {
    Expression::External(ExternalExpr {
        value: reference,
        type_params: None,
    })
}

pub fn not(expr: Expression) -> Expression {
    Expression::Not(NotExpr {
        condition: Box::new(expr),
    })
}

pub fn typeof_expr(expr: Expression) -> Expression {
    Expression::TypeOf(TypeofExpr {
        expr: Box::new(expr),
    })
}

pub fn wrapped(node: impl Into<String>) -> Expression {
    Expression::WrappedNode(WrappedNodeExpr { node: node.into() })
}

pub fn fn_expr(params: Vec<FnParam>, statements: Vec<Statement>, name: Option<String>) -> Expression {
    Expression::Fn(FunctionExpr {
        params,
        statements,
        name,
    })
}

impl Expression {
    pub fn prop(&self, name: impl Into<String>) -> Expression {
        Expression::ReadProp(ReadPropExpr {
            receiver: Box::new(self.clone()),
            name: name.into(),
        })
    }

    pub fn key(&self, index: Expression) -> Expression {
        Expression::ReadKey(ReadKeyExpr {
            receiver: Box::new(self.clone()),
            index: Box::new(index),
        })
    }

    pub fn call_fn(&self, args: Vec<Expression>) -> Expression {
        Expression::InvokeFn(InvokeFunctionExpr {
            fn_: Box::new(self.clone()),
            args,
            pure: false,
        })
    }

    pub fn call_pure(&self, args: Vec<Expression>) -> Expression {
        Expression::InvokeFn(InvokeFunctionExpr {
            fn_: Box::new(self.clone()),
            args,
            pure: true,
        })
    }

    pub fn instantiate(&self, args: Vec<Expression>) -> Expression {
        Expression::Instantiate(InstantiateExpr {
            class_expr: Box::new(self.clone()),
            args,
        })
    }

    pub fn conditional(&self, true_case: Expression, false_case: Option<Expression>) -> Expression {
        Expression::Conditional(ConditionalExpr {
            condition: Box::new(self.clone()),
            true_case: Box::new(true_case),
            false_case: false_case.map(Box::new),
        })
    }

    pub fn binary(&self, operator: BinaryOperator, rhs: Expression) -> Expression {
        Expression::BinaryOp(BinaryOperatorExpr {
            operator,
            lhs: Box::new(self.clone()),
            rhs: Box::new(rhs),
        })
    }

    pub fn bitwise_and(&self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::BitwiseAnd, rhs)
    }

    pub fn or(&self, rhs: Expression) -> Expression {
        self.binary(BinaryOperator::Or, rhs)
    }

    pub fn set_prop(&self, name: impl Into<String>, value: Expression) -> Expression {
        Expression::WriteProp(WritePropExpr {
            receiver: Box::new(self.clone()),
            name: name.into(),
            value: Box::new(value),
        })
    }

    pub fn set_key(&self, index: Expression, value: Expression) -> Expression {
        Expression::WriteKey(WriteKeyExpr {
            receiver: Box::new(self.clone()),
            index: Box::new(index),
            value: Box::new(value),
        })
    }

    pub fn to_stmt(self) -> Statement {
        Statement::Expression(ExpressionStatement { expr: self })
    }

    pub fn to_return(self) -> Statement {
        Statement::Return(ReturnStatement { value: self })
    }

    pub fn to_declare(self, name: impl Into<String>) -> Statement {
        Statement::DeclareVar(DeclareVarStmt {
            name: name.into(),
            value: Some(self),
            type_: None,
            modifiers: Vec::new(),
        })
    }

    /// True for literals and literal containers of literals.
    pub fn is_constant(&self) -> bool {
        match self {
            Expression::Literal(_) => true,
            Expression::LiteralArray(a) => a.entries.iter().all(|e| e.is_constant()),
            Expression::LiteralMap(m) => m.entries.iter().all(|e| e.value.is_constant()),
            _ => false,
        }
    }
}
