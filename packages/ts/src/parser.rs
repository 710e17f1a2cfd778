// Parser
//
// Parses TypeScript with `oxc_parser` and lowers the arena AST into the owned
// declaration model in `node`. Classes, decorators, imports/exports and
// variable/function/enum declarations are lowered in full. Interfaces, type
// aliases, namespaces and control flow inside function bodies become
// `StatementKind::Other`.

use oxc_allocator::Allocator;
use oxc_ast::ast as oxc;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use oxc_syntax::operator::{BinaryOperator as OxcBinaryOperator, LogicalOperator, UnaryOperator};
use smallvec::{smallvec, SmallVec};
use thiserror::Error;

use crate::node::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file_name}:{pos}: {message}")]
pub struct ParseError {
    pub file_name: String,
    pub message: String,
    pub pos: u32,
}

impl ParseError {
    pub fn new(file_name: &str, message: impl Into<String>, pos: u32) -> Self {
        Self {
            file_name: file_name.to_string(),
            message: message.into(),
            pos,
        }
    }
}

/// Parses `text` into a `SourceFile` with the given id.
///
/// Declaration ids are handed out in source order: a class takes its id
/// before its members, while functions, variables and enums take theirs once
/// their bodies have been lowered.
pub fn parse_source_file(id: FileId, file_name: &str, text: &str) -> Result<SourceFile, ParseError> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(file_name).unwrap_or_else(|_| SourceType::ts());
    let ret = Parser::new(&allocator, text, source_type).parse();
    if let Some(error) = ret.errors.first() {
        return Err(ParseError::new(file_name, error.to_string(), 0));
    }
    if ret.panicked {
        return Err(ParseError::new(file_name, "unrecoverable syntax error", 0));
    }

    let mut lowering = Lowering {
        file: id,
        text,
        next_decl: 0,
    };
    let statements = lowering.statements(&ret.program.body);
    Ok(SourceFile {
        id,
        file_name: file_name.to_string(),
        text: text.to_string(),
        statements,
    })
}

struct Lowering<'t> {
    file: FileId,
    text: &'t str,
    next_decl: u32,
}

fn range(span: Span) -> TextRange {
    TextRange::new(span.start, span.end)
}

/// Widens `span` to start at the first decorator, if any.
fn decorated_range(span: Span, decorators: &[oxc::Decorator<'_>]) -> TextRange {
    let start = decorators.first().map_or(span.start, |d| d.span.start.min(span.start));
    TextRange::new(start, span.end)
}

fn accessibility_flags(accessibility: Option<&oxc::TSAccessibility>) -> ModifierFlags {
    match accessibility {
        Some(oxc::TSAccessibility::Public) => ModifierFlags::PUBLIC,
        Some(oxc::TSAccessibility::Private) => ModifierFlags::PRIVATE,
        Some(oxc::TSAccessibility::Protected) => ModifierFlags::PROTECTED,
        None => ModifierFlags::empty(),
    }
}

fn binary_operator(operator: OxcBinaryOperator) -> BinaryOperator {
    match operator {
        OxcBinaryOperator::Equality => BinaryOperator::Equals,
        OxcBinaryOperator::Inequality => BinaryOperator::NotEquals,
        OxcBinaryOperator::StrictEquality => BinaryOperator::StrictEquals,
        OxcBinaryOperator::StrictInequality => BinaryOperator::StrictNotEquals,
        OxcBinaryOperator::LessThan => BinaryOperator::Less,
        OxcBinaryOperator::LessEqualThan => BinaryOperator::LessEquals,
        OxcBinaryOperator::GreaterThan => BinaryOperator::Greater,
        OxcBinaryOperator::GreaterEqualThan => BinaryOperator::GreaterEquals,
        OxcBinaryOperator::Addition => BinaryOperator::Plus,
        OxcBinaryOperator::Subtraction => BinaryOperator::Minus,
        OxcBinaryOperator::Multiplication => BinaryOperator::Multiply,
        OxcBinaryOperator::Division => BinaryOperator::Divide,
        OxcBinaryOperator::Remainder => BinaryOperator::Modulo,
        OxcBinaryOperator::Exponential => BinaryOperator::Exponent,
        OxcBinaryOperator::ShiftLeft => BinaryOperator::LeftShift,
        OxcBinaryOperator::ShiftRight => BinaryOperator::RightShift,
        OxcBinaryOperator::ShiftRightZeroFill => BinaryOperator::UnsignedRightShift,
        OxcBinaryOperator::BitwiseOR => BinaryOperator::BitOr,
        OxcBinaryOperator::BitwiseXOR => BinaryOperator::BitXor,
        OxcBinaryOperator::BitwiseAnd => BinaryOperator::BitAnd,
        OxcBinaryOperator::In => BinaryOperator::In,
        OxcBinaryOperator::Instanceof => BinaryOperator::InstanceOf,
    }
}

fn logical_operator(operator: LogicalOperator) -> BinaryOperator {
    match operator {
        LogicalOperator::Or => BinaryOperator::Or,
        LogicalOperator::And => BinaryOperator::And,
        LogicalOperator::Coalesce => BinaryOperator::Coalesce,
    }
}

fn prefix_operator(operator: UnaryOperator) -> PrefixOperator {
    match operator {
        UnaryOperator::UnaryNegation => PrefixOperator::Minus,
        UnaryOperator::UnaryPlus => PrefixOperator::Plus,
        UnaryOperator::LogicalNot => PrefixOperator::Not,
        UnaryOperator::BitwiseNot => PrefixOperator::BitNot,
        UnaryOperator::Typeof => PrefixOperator::TypeOf,
        UnaryOperator::Void => PrefixOperator::Void,
        UnaryOperator::Delete => PrefixOperator::Delete,
    }
}

fn binding_identifier(id: &oxc::BindingIdentifier<'_>) -> Identifier {
    Identifier {
        text: id.name.to_string(),
        range: range(id.span),
    }
}

fn keyword_type(keyword: &str, range: TextRange) -> TypeNode {
    TypeNode {
        kind: TypeKind::Keyword(keyword.to_string()),
        range,
    }
}

fn entity_name(name: &oxc::TSTypeName<'_>) -> SmallVec<[String; 2]> {
    match name {
        oxc::TSTypeName::IdentifierReference(id) => smallvec![id.name.to_string()],
        oxc::TSTypeName::QualifiedName(qualified) => qualified_name(qualified),
        _ => smallvec!["this".to_string()],
    }
}

fn qualified_name(qualified: &oxc::TSQualifiedName<'_>) -> SmallVec<[String; 2]> {
    let mut name = entity_name(&qualified.left);
    name.push(qualified.right.name.to_string());
    name
}

impl<'t> Lowering<'t> {
    fn next_id(&mut self) -> DeclId {
        let id = DeclId {
            file: self.file,
            index: self.next_decl,
        };
        self.next_decl += 1;
        id
    }

    fn slice(&self, start: u32, end: u32) -> &'t str {
        self.text.get(start as usize..end as usize).unwrap_or_default()
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statements(&mut self, statements: &[oxc::Statement<'_>]) -> Vec<Statement> {
        statements.iter().filter_map(|s| self.statement(s)).collect()
    }

    fn statement(&mut self, statement: &oxc::Statement<'_>) -> Option<Statement> {
        let span = statement.span();
        let mut start = span.start;
        let kind = match statement {
            oxc::Statement::EmptyStatement(_) => return None,
            oxc::Statement::ImportDeclaration(decl) => StatementKind::Import(self.import(decl)),
            oxc::Statement::ExportNamedDeclaration(decl) => match &decl.declaration {
                Some(declaration) => {
                    if let oxc::Declaration::ClassDeclaration(class) = declaration {
                        start = decorated_range(span, &class.decorators).pos;
                    }
                    self.declaration(declaration, ModifierFlags::EXPORT, start)
                }
                None => StatementKind::Export(ExportDeclaration {
                    specifiers: decl
                        .specifiers
                        .iter()
                        .map(|s| ExportSpecifier {
                            local: s.local.name().to_string(),
                            exported: s.exported.name().to_string(),
                        })
                        .collect(),
                    star: false,
                    module_specifier: decl.source.as_ref().map(|s| s.value.to_string()),
                }),
            },
            // `export * as ns from '...'` introduces a binding the host does not model.
            oxc::Statement::ExportAllDeclaration(decl) if decl.exported.is_some() => StatementKind::Other,
            oxc::Statement::ExportAllDeclaration(decl) => StatementKind::Export(ExportDeclaration {
                specifiers: Vec::new(),
                star: true,
                module_specifier: Some(decl.source.value.to_string()),
            }),
            oxc::Statement::ExportDefaultDeclaration(decl) => {
                let modifiers = ModifierFlags::EXPORT | ModifierFlags::DEFAULT;
                match &decl.declaration {
                    oxc::ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                        start = decorated_range(span, &class.decorators).pos;
                        StatementKind::Class(self.class(class, modifiers, start))
                    }
                    oxc::ExportDefaultDeclarationKind::FunctionDeclaration(function) => {
                        StatementKind::Function(self.function_declaration(function, modifiers, range(span)))
                    }
                    other => match other.as_expression() {
                        Some(expression) => StatementKind::Expression(self.expression(expression)),
                        None => StatementKind::Other,
                    },
                }
            }
            oxc::Statement::ClassDeclaration(class) => {
                start = decorated_range(span, &class.decorators).pos;
                StatementKind::Class(self.class(class, ModifierFlags::empty(), start))
            }
            oxc::Statement::FunctionDeclaration(function) => {
                StatementKind::Function(self.function_declaration(function, ModifierFlags::empty(), range(span)))
            }
            oxc::Statement::VariableDeclaration(decl) => {
                StatementKind::Variable(self.variable_statement(decl, ModifierFlags::empty()))
            }
            oxc::Statement::TSEnumDeclaration(decl) => {
                StatementKind::Enum(self.enum_declaration(decl, ModifierFlags::empty(), range(span)))
            }
            oxc::Statement::ReturnStatement(ret) => {
                StatementKind::Return(ret.argument.as_ref().map(|e| self.expression(e)))
            }
            oxc::Statement::ExpressionStatement(stmt) => StatementKind::Expression(self.expression(&stmt.expression)),
            _ => StatementKind::Other,
        };
        Some(Statement {
            kind,
            range: TextRange::new(start, span.end),
        })
    }

    fn declaration(&mut self, declaration: &oxc::Declaration<'_>, modifiers: ModifierFlags, start: u32) -> StatementKind {
        let span = declaration.span();
        let outer = TextRange::new(start, span.end);
        match declaration {
            oxc::Declaration::ClassDeclaration(class) => StatementKind::Class(self.class(class, modifiers, start)),
            oxc::Declaration::FunctionDeclaration(function) => {
                StatementKind::Function(self.function_declaration(function, modifiers, outer))
            }
            oxc::Declaration::VariableDeclaration(decl) => StatementKind::Variable(self.variable_statement(decl, modifiers)),
            oxc::Declaration::TSEnumDeclaration(decl) => StatementKind::Enum(self.enum_declaration(decl, modifiers, outer)),
            _ => StatementKind::Other,
        }
    }

    fn import(&mut self, decl: &oxc::ImportDeclaration<'_>) -> ImportDeclaration {
        let mut import = ImportDeclaration {
            default_binding: None,
            namespace: None,
            named: Vec::new(),
            module_specifier: decl.source.value.to_string(),
        };
        for specifier in decl.specifiers.iter().flatten() {
            match specifier {
                oxc::ImportDeclarationSpecifier::ImportSpecifier(s) => import.named.push(ImportSpecifier {
                    imported: s.imported.name().to_string(),
                    local: binding_identifier(&s.local),
                }),
                oxc::ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                    import.default_binding = Some(binding_identifier(&s.local));
                }
                oxc::ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                    import.namespace = Some(binding_identifier(&s.local));
                }
            }
        }
        import
    }

    fn function_declaration(
        &mut self,
        function: &oxc::Function<'_>,
        mut modifiers: ModifierFlags,
        outer: TextRange,
    ) -> FunctionDeclaration {
        if function.declare {
            modifiers |= ModifierFlags::DECLARE;
        }
        if function.r#async {
            modifiers |= ModifierFlags::ASYNC;
        }
        let function = self.function(function, function.span.start);
        FunctionDeclaration {
            id: self.next_id(),
            modifiers,
            function,
            range: outer,
        }
    }

    fn variable_statement(&mut self, decl: &oxc::VariableDeclaration<'_>, mut modifiers: ModifierFlags) -> VariableStatement {
        if decl.declare {
            modifiers |= ModifierFlags::DECLARE;
        }
        let kind = match decl.kind {
            oxc::VariableDeclarationKind::Const => {
                modifiers |= ModifierFlags::CONST;
                VariableKind::Const
            }
            oxc::VariableDeclarationKind::Var => VariableKind::Var,
            _ => VariableKind::Let,
        };
        let declarations = decl
            .declarations
            .iter()
            .map(|declarator| {
                let initializer = declarator.init.as_ref().map(|e| self.expression(e));
                VariableDeclaration {
                    id: self.next_id(),
                    name: self.binding_name(&declarator.id),
                    type_node: declarator.id.type_annotation.as_ref().map(|t| self.type_node(&t.type_annotation)),
                    initializer,
                    range: range(declarator.span),
                }
            })
            .collect();
        VariableStatement {
            modifiers,
            kind,
            declarations,
        }
    }

    fn enum_declaration(&mut self, decl: &oxc::TSEnumDeclaration<'_>, mut modifiers: ModifierFlags, outer: TextRange) -> EnumDeclaration {
        if decl.declare {
            modifiers |= ModifierFlags::DECLARE;
        }
        if decl.r#const {
            modifiers |= ModifierFlags::CONST;
        }
        let members = decl
            .body
            .members
            .iter()
            .map(|member| {
                let name = match &member.id {
                    oxc::TSEnumMemberName::Identifier(id) => PropertyName {
                        text: id.name.to_string(),
                        quoted: false,
                        range: range(id.span),
                    },
                    oxc::TSEnumMemberName::String(s) => PropertyName {
                        text: s.value.to_string(),
                        quoted: true,
                        range: range(s.span),
                    },
                    other => PropertyName {
                        text: String::new(),
                        quoted: false,
                        range: range(other.span()),
                    },
                };
                EnumMember {
                    name,
                    initializer: member.initializer.as_ref().map(|e| self.expression(e)),
                }
            })
            .collect();
        EnumDeclaration {
            id: self.next_id(),
            name: binding_identifier(&decl.id),
            modifiers,
            members,
            range: outer,
        }
    }

    // ========================================================================
    // Classes
    // ========================================================================

    fn class(&mut self, class: &oxc::Class<'_>, mut modifiers: ModifierFlags, start: u32) -> ClassDeclaration {
        let id = self.next_id();
        if class.declare {
            modifiers |= ModifierFlags::DECLARE;
        }
        if class.r#abstract {
            modifiers |= ModifierFlags::ABSTRACT;
        }
        let decorators = self.decorators(&class.decorators);
        let type_parameters = self.type_parameters(class.type_parameters.as_deref());
        let extends = class.super_class.as_ref().map(|e| self.expression(e));
        let members = class.body.body.iter().filter_map(|e| self.class_element(e)).collect();
        ClassDeclaration {
            id,
            name: class.id.as_ref().map(binding_identifier),
            decorators,
            modifiers,
            type_parameters,
            extends,
            members,
            range: TextRange::new(start, class.body.span.end),
            body_range: range(class.body.span),
        }
    }

    fn class_element(&mut self, element: &oxc::ClassElement<'_>) -> Option<ClassElement> {
        match element {
            oxc::ClassElement::MethodDefinition(method) => {
                let id = self.next_id();
                let decorators = self.decorators(&method.decorators);
                let mut modifiers = accessibility_flags(method.accessibility.as_ref());
                if method.r#static {
                    modifiers |= ModifierFlags::STATIC;
                }
                if method.value.r#async {
                    modifiers |= ModifierFlags::ASYNC;
                }
                if matches!(method.r#type, oxc::MethodDefinitionType::TSAbstractMethodDefinition) {
                    modifiers |= ModifierFlags::ABSTRACT;
                }
                let name = self.property_name(&method.key, method.computed);
                let mut function = self.function(&method.value, name.range.pos);
                function.name = Some(Identifier {
                    text: name.text.clone(),
                    range: name.range,
                });
                let kind = match method.kind {
                    oxc::MethodDefinitionKind::Constructor => ClassElementKind::Constructor(function),
                    oxc::MethodDefinitionKind::Get => ClassElementKind::Getter(function),
                    oxc::MethodDefinitionKind::Set => ClassElementKind::Setter(function),
                    oxc::MethodDefinitionKind::Method => ClassElementKind::Method(function),
                };
                Some(ClassElement {
                    id,
                    name: Some(name),
                    decorators,
                    modifiers,
                    kind,
                    range: decorated_range(method.span, &method.decorators),
                })
            }
            oxc::ClassElement::PropertyDefinition(prop) => {
                let id = self.next_id();
                let decorators = self.decorators(&prop.decorators);
                let mut modifiers = accessibility_flags(prop.accessibility.as_ref());
                if prop.r#static {
                    modifiers |= ModifierFlags::STATIC;
                }
                if prop.readonly {
                    modifiers |= ModifierFlags::READONLY;
                }
                if prop.declare {
                    modifiers |= ModifierFlags::DECLARE;
                }
                if matches!(prop.r#type, oxc::PropertyDefinitionType::TSAbstractPropertyDefinition) {
                    modifiers |= ModifierFlags::ABSTRACT;
                }
                let name = self.property_name(&prop.key, prop.computed);
                let type_node = prop.type_annotation.as_ref().map(|t| self.type_node(&t.type_annotation));
                let initializer = prop.value.as_ref().map(|e| self.expression(e));
                Some(ClassElement {
                    id,
                    name: Some(name),
                    decorators,
                    modifiers,
                    kind: ClassElementKind::Property { type_node, initializer },
                    range: decorated_range(prop.span, &prop.decorators),
                })
            }
            oxc::ClassElement::AccessorProperty(prop) => {
                let id = self.next_id();
                let decorators = self.decorators(&prop.decorators);
                let mut modifiers = ModifierFlags::empty();
                if prop.r#static {
                    modifiers |= ModifierFlags::STATIC;
                }
                let name = self.property_name(&prop.key, prop.computed);
                let initializer = prop.value.as_ref().map(|e| self.expression(e));
                Some(ClassElement {
                    id,
                    name: Some(name),
                    decorators,
                    modifiers,
                    kind: ClassElementKind::Property {
                        type_node: None,
                        initializer,
                    },
                    range: decorated_range(prop.span, &prop.decorators),
                })
            }
            oxc::ClassElement::TSIndexSignature(sig) => Some(ClassElement {
                id: self.next_id(),
                name: None,
                decorators: Vec::new(),
                modifiers: ModifierFlags::empty(),
                kind: ClassElementKind::IndexSignature,
                range: range(sig.span),
            }),
            // Static blocks run at class evaluation and declare nothing.
            oxc::ClassElement::StaticBlock(_) => None,
        }
    }

    fn decorators(&mut self, decorators: &[oxc::Decorator<'_>]) -> Vec<Decorator> {
        decorators
            .iter()
            .map(|d| Decorator {
                expression: self.expression(&d.expression),
                range: range(d.span),
            })
            .collect()
    }

    fn property_name(&self, key: &oxc::PropertyKey<'_>, computed: bool) -> PropertyName {
        let key_range = range(key.span());
        let (text, quoted) = match key {
            _ if computed => (String::new(), false),
            oxc::PropertyKey::StaticIdentifier(id) => (id.name.to_string(), false),
            oxc::PropertyKey::PrivateIdentifier(id) => (format!("#{}", id.name), false),
            oxc::PropertyKey::StringLiteral(s) => (s.value.to_string(), true),
            oxc::PropertyKey::NumericLiteral(n) => (format_number(n.value), false),
            _ => (String::new(), false),
        };
        PropertyName {
            text,
            quoted,
            range: key_range,
        }
    }

    // ========================================================================
    // Functions and parameters
    // ========================================================================

    fn function(&mut self, function: &oxc::Function<'_>, start: u32) -> FunctionLike {
        let type_parameters = self.type_parameters(function.type_parameters.as_deref());
        let parameters = self.parameters(&function.params);
        let return_type = function.return_type.as_ref().map(|t| self.type_node(&t.type_annotation));
        let body = function
            .body
            .as_ref()
            .map(|body| FunctionBody::Block(self.statements(&body.statements)));
        FunctionLike {
            name: function.id.as_ref().map(binding_identifier),
            type_parameters,
            parameters,
            return_type,
            body,
            range: TextRange::new(start.min(function.span.start), function.span.end),
        }
    }

    fn arrow(&mut self, arrow: &oxc::ArrowFunctionExpression<'_>) -> FunctionLike {
        let type_parameters = self.type_parameters(arrow.type_parameters.as_deref());
        let parameters = self.parameters(&arrow.params);
        let return_type = arrow.return_type.as_ref().map(|t| self.type_node(&t.type_annotation));
        let body = if arrow.expression {
            match arrow.body.statements.first() {
                Some(oxc::Statement::ExpressionStatement(stmt)) => {
                    Some(FunctionBody::Expression(Box::new(self.expression(&stmt.expression))))
                }
                _ => None,
            }
        } else {
            Some(FunctionBody::Block(self.statements(&arrow.body.statements)))
        };
        FunctionLike {
            name: None,
            type_parameters,
            parameters,
            return_type,
            body,
            range: range(arrow.span),
        }
    }

    fn parameters(&mut self, params: &oxc::FormalParameters<'_>) -> Vec<Parameter> {
        let mut parameters: Vec<Parameter> = params.items.iter().map(|p| self.parameter(p)).collect();
        if let Some(rest) = &params.rest {
            parameters.push(Parameter {
                name: self.binding_name(&rest.argument),
                decorators: Vec::new(),
                modifiers: ModifierFlags::empty(),
                type_node: rest.argument.type_annotation.as_ref().map(|t| self.type_node(&t.type_annotation)),
                initializer: None,
                optional: false,
                rest: true,
                range: range(rest.span),
            });
        }
        parameters
    }

    fn parameter(&mut self, param: &oxc::FormalParameter<'_>) -> Parameter {
        let decorators = self.decorators(&param.decorators);
        let mut modifiers = accessibility_flags(param.accessibility.as_ref());
        if param.readonly {
            modifiers |= ModifierFlags::READONLY;
        }
        // A default value wraps the annotated binding in an assignment pattern.
        let (binding, initializer) = match &param.pattern.kind {
            oxc::BindingPatternKind::AssignmentPattern(assign) => (&assign.left, Some(self.expression(&assign.right))),
            _ => (&param.pattern, None),
        };
        let annotation = param.pattern.type_annotation.as_ref().or(binding.type_annotation.as_ref());
        Parameter {
            name: self.binding_name(binding),
            decorators,
            modifiers,
            type_node: annotation.map(|t| self.type_node(&t.type_annotation)),
            initializer,
            optional: param.pattern.optional || binding.optional,
            rest: false,
            range: decorated_range(param.span, &param.decorators),
        }
    }

    /// Destructuring patterns have no single name and read as an empty identifier.
    fn binding_name(&self, pattern: &oxc::BindingPattern<'_>) -> Identifier {
        match &pattern.kind {
            oxc::BindingPatternKind::BindingIdentifier(id) => binding_identifier(id),
            oxc::BindingPatternKind::AssignmentPattern(assign) => self.binding_name(&assign.left),
            other => Identifier {
                text: String::new(),
                range: range(other.span()),
            },
        }
    }

    fn type_parameters(&mut self, params: Option<&oxc::TSTypeParameterDeclaration<'_>>) -> Vec<TypeParameter> {
        let Some(params) = params else {
            return Vec::new();
        };
        params
            .params
            .iter()
            .map(|p| TypeParameter {
                name: p.name.name.to_string(),
                constraint: p.constraint.as_ref().map(|t| self.type_node(t)),
                default: p.default.as_ref().map(|t| self.type_node(t)),
            })
            .collect()
    }

    fn type_arguments(&mut self, args: Option<&oxc::TSTypeParameterInstantiation<'_>>) -> Vec<TypeNode> {
        args.map(|args| args.params.iter().map(|t| self.type_node(t)).collect())
            .unwrap_or_default()
    }

    // ========================================================================
    // Types
    // ========================================================================

    fn type_node(&mut self, ty: &oxc::TSType<'_>) -> TypeNode {
        let ty_range = range(ty.span());
        let kind = match ty {
            oxc::TSType::TSAnyKeyword(_) => TypeKind::Keyword("any".into()),
            oxc::TSType::TSUnknownKeyword(_) => TypeKind::Keyword("unknown".into()),
            oxc::TSType::TSNeverKeyword(_) => TypeKind::Keyword("never".into()),
            oxc::TSType::TSStringKeyword(_) => TypeKind::Keyword("string".into()),
            oxc::TSType::TSNumberKeyword(_) => TypeKind::Keyword("number".into()),
            oxc::TSType::TSBooleanKeyword(_) => TypeKind::Keyword("boolean".into()),
            oxc::TSType::TSVoidKeyword(_) => TypeKind::Keyword("void".into()),
            oxc::TSType::TSUndefinedKeyword(_) => TypeKind::Keyword("undefined".into()),
            oxc::TSType::TSNullKeyword(_) => TypeKind::Keyword("null".into()),
            oxc::TSType::TSObjectKeyword(_) => TypeKind::Keyword("object".into()),
            oxc::TSType::TSSymbolKeyword(_) => TypeKind::Keyword("symbol".into()),
            oxc::TSType::TSBigIntKeyword(_) => TypeKind::Keyword("bigint".into()),
            oxc::TSType::TSThisType(_) => TypeKind::Keyword("this".into()),
            oxc::TSType::TSTypeReference(reference) => TypeKind::Reference {
                name: entity_name(&reference.type_name),
                arguments: self.type_arguments(reference.type_arguments.as_deref()),
            },
            oxc::TSType::TSTypeQuery(query) => match &query.expr_name {
                oxc::TSTypeQueryExprName::IdentifierReference(id) => TypeKind::Query(smallvec![id.name.to_string()]),
                oxc::TSTypeQueryExprName::QualifiedName(qualified) => TypeKind::Query(qualified_name(qualified)),
                _ => TypeKind::Keyword("any".into()),
            },
            oxc::TSType::TSArrayType(array) => TypeKind::Array(Box::new(self.type_node(&array.element_type))),
            oxc::TSType::TSTupleType(tuple) => {
                TypeKind::Tuple(tuple.element_types.iter().map(|e| self.tuple_element(e)).collect())
            }
            oxc::TSType::TSNamedTupleMember(member) => return self.tuple_element(&member.element_type),
            oxc::TSType::TSUnionType(union) => TypeKind::Union(union.types.iter().map(|t| self.type_node(t)).collect()),
            oxc::TSType::TSIntersectionType(intersection) => {
                TypeKind::Intersection(intersection.types.iter().map(|t| self.type_node(t)).collect())
            }
            oxc::TSType::TSLiteralType(literal) => match &literal.literal {
                oxc::TSLiteral::StringLiteral(s) => TypeKind::StringLiteral(s.value.to_string()),
                oxc::TSLiteral::NumericLiteral(n) => TypeKind::NumberLiteral(n.value),
                oxc::TSLiteral::BooleanLiteral(b) => TypeKind::BooleanLiteral(b.value),
                oxc::TSLiteral::TemplateLiteral(t) if t.expressions.is_empty() => {
                    TypeKind::StringLiteral(self.template_text(t))
                }
                oxc::TSLiteral::UnaryExpression(unary) => match &unary.argument {
                    oxc::Expression::NumericLiteral(n) if unary.operator == UnaryOperator::UnaryNegation => {
                        TypeKind::NumberLiteral(-n.value)
                    }
                    _ => TypeKind::Keyword("number".into()),
                },
                _ => TypeKind::Keyword("any".into()),
            },
            oxc::TSType::TSTypeLiteral(literal) => {
                TypeKind::Literal(literal.members.iter().filter_map(|m| self.type_member(m)).collect())
            }
            // Mapped types have no statically known members.
            oxc::TSType::TSMappedType(_) => TypeKind::Literal(Vec::new()),
            oxc::TSType::TSFunctionType(function) => TypeKind::Function {
                parameters: self.parameters(&function.params),
                return_type: Box::new(self.type_node(&function.return_type.type_annotation)),
            },
            oxc::TSType::TSConstructorType(ctor) => TypeKind::Function {
                parameters: self.parameters(&ctor.params),
                return_type: Box::new(self.type_node(&ctor.return_type.type_annotation)),
            },
            oxc::TSType::TSParenthesizedType(inner) => {
                TypeKind::Parenthesized(Box::new(self.type_node(&inner.type_annotation)))
            }
            // `keyof T`, `readonly T[]` and `unique symbol` keep the operand type.
            oxc::TSType::TSTypeOperatorType(op) => self.type_node(&op.type_annotation).kind,
            // Indexed access keeps the object type.
            oxc::TSType::TSIndexedAccessType(access) => self.type_node(&access.object_type).kind,
            // Conditional types are reduced to their check type.
            oxc::TSType::TSConditionalType(conditional) => self.type_node(&conditional.check_type).kind,
            oxc::TSType::TSTypePredicate(predicate) => match &predicate.type_annotation {
                Some(t) => self.type_node(&t.type_annotation).kind,
                None => TypeKind::Keyword("boolean".into()),
            },
            oxc::TSType::TSTemplateLiteralType(_) => TypeKind::Keyword("string".into()),
            _ => TypeKind::Keyword("any".into()),
        };
        TypeNode { kind, range: ty_range }
    }

    fn tuple_element(&mut self, element: &oxc::TSTupleElement<'_>) -> TypeNode {
        match element {
            oxc::TSTupleElement::TSOptionalType(optional) => self.type_node(&optional.type_annotation),
            oxc::TSTupleElement::TSRestType(rest) => self.type_node(&rest.type_annotation),
            other => match other.as_ts_type() {
                Some(ty) => self.type_node(ty),
                None => keyword_type("any", range(other.span())),
            },
        }
    }

    fn type_member(&mut self, signature: &oxc::TSSignature<'_>) -> Option<TypeMember> {
        match signature {
            oxc::TSSignature::TSPropertySignature(prop) => Some(TypeMember {
                name: self.property_name(&prop.key, prop.computed),
                optional: prop.optional,
                type_node: prop.type_annotation.as_ref().map(|t| self.type_node(&t.type_annotation)),
            }),
            oxc::TSSignature::TSMethodSignature(method) => {
                let method_range = range(method.span);
                let return_type = match &method.return_type {
                    Some(t) => self.type_node(&t.type_annotation),
                    None => keyword_type("any", method_range),
                };
                Some(TypeMember {
                    name: self.property_name(&method.key, method.computed),
                    optional: method.optional,
                    type_node: Some(TypeNode {
                        kind: TypeKind::Function {
                            parameters: self.parameters(&method.params),
                            return_type: Box::new(return_type),
                        },
                        range: method_range,
                    }),
                })
            }
            // Index, call and construct signatures have no member name.
            _ => None,
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn expression(&mut self, expr: &oxc::Expression<'_>) -> Expression {
        let expr_range = range(expr.span());
        let kind = match expr {
            oxc::Expression::BooleanLiteral(b) => {
                if b.value {
                    ExpressionKind::True
                } else {
                    ExpressionKind::False
                }
            }
            oxc::Expression::NullLiteral(_) => ExpressionKind::Null,
            oxc::Expression::NumericLiteral(n) => ExpressionKind::Number(n.value),
            oxc::Expression::StringLiteral(s) => ExpressionKind::String(s.value.to_string()),
            oxc::Expression::RegExpLiteral(r) => ExpressionKind::Regex(self.slice(r.span.start, r.span.end).to_string()),
            oxc::Expression::TemplateLiteral(t) => self.template(t),
            oxc::Expression::TaggedTemplateExpression(t) => ExpressionKind::Template(self.template_raw(&t.quasi)),
            oxc::Expression::Identifier(id) => ExpressionKind::Identifier(id.name.to_string()),
            oxc::Expression::ThisExpression(_) => ExpressionKind::This,
            oxc::Expression::Super(_) => ExpressionKind::Identifier("super".into()),
            oxc::Expression::ArrayExpression(array) => {
                ExpressionKind::Array(array.elements.iter().map(|e| self.array_element(e)).collect())
            }
            oxc::Expression::ObjectExpression(object) => {
                ExpressionKind::Object(object.properties.iter().map(|p| self.object_member(p)).collect())
            }
            oxc::Expression::StaticMemberExpression(member) => self.static_member(member),
            oxc::Expression::ComputedMemberExpression(member) => self.computed_member(member),
            oxc::Expression::PrivateFieldExpression(member) => ExpressionKind::PropertyAccess {
                object: Box::new(self.expression(&member.object)),
                name: Identifier {
                    text: format!("#{}", member.field.name),
                    range: range(member.field.span),
                },
            },
            oxc::Expression::CallExpression(call) => self.call(call),
            oxc::Expression::NewExpression(new) => ExpressionKind::New {
                callee: Box::new(self.expression(&new.callee)),
                type_arguments: self.type_arguments(new.type_arguments.as_deref()),
                arguments: self.arguments(&new.arguments),
            },
            oxc::Expression::ChainExpression(chain) => match &chain.expression {
                oxc::ChainElement::CallExpression(call) => self.call(call),
                oxc::ChainElement::StaticMemberExpression(member) => self.static_member(member),
                oxc::ChainElement::ComputedMemberExpression(member) => self.computed_member(member),
                oxc::ChainElement::TSNonNullExpression(non_null) => {
                    ExpressionKind::NonNull(Box::new(self.expression(&non_null.expression)))
                }
                _ => ExpressionKind::Identifier(String::new()),
            },
            oxc::Expression::BinaryExpression(binary) => ExpressionKind::Binary {
                operator: binary_operator(binary.operator),
                left: Box::new(self.expression(&binary.left)),
                right: Box::new(self.expression(&binary.right)),
            },
            oxc::Expression::LogicalExpression(logical) => ExpressionKind::Binary {
                operator: logical_operator(logical.operator),
                left: Box::new(self.expression(&logical.left)),
                right: Box::new(self.expression(&logical.right)),
            },
            // Compound assignments read as plain assignment of the right operand.
            oxc::Expression::AssignmentExpression(assign) => ExpressionKind::Binary {
                operator: BinaryOperator::Assign,
                left: Box::new(self.assignment_target(&assign.left)),
                right: Box::new(self.expression(&assign.right)),
            },
            oxc::Expression::SequenceExpression(sequence) => return self.sequence(&sequence.expressions, expr_range),
            oxc::Expression::UnaryExpression(unary) => ExpressionKind::Prefix {
                operator: prefix_operator(unary.operator),
                operand: Box::new(self.expression(&unary.argument)),
            },
            oxc::Expression::ConditionalExpression(conditional) => ExpressionKind::Conditional {
                condition: Box::new(self.expression(&conditional.test)),
                when_true: Box::new(self.expression(&conditional.consequent)),
                when_false: Box::new(self.expression(&conditional.alternate)),
            },
            oxc::Expression::ParenthesizedExpression(paren) => {
                ExpressionKind::Parenthesized(Box::new(self.expression(&paren.expression)))
            }
            oxc::Expression::TSAsExpression(as_expr) => ExpressionKind::As {
                expression: Box::new(self.expression(&as_expr.expression)),
                type_node: Box::new(self.as_type(&as_expr.type_annotation)),
            },
            oxc::Expression::TSNonNullExpression(non_null) => {
                ExpressionKind::NonNull(Box::new(self.expression(&non_null.expression)))
            }
            // Type-only wrappers evaluate to their operand.
            oxc::Expression::TSSatisfiesExpression(satisfies) => return self.expression(&satisfies.expression),
            oxc::Expression::TSTypeAssertion(assertion) => return self.expression(&assertion.expression),
            oxc::Expression::TSInstantiationExpression(inst) => return self.expression(&inst.expression),
            oxc::Expression::ArrowFunctionExpression(arrow) => ExpressionKind::Arrow(Box::new(self.arrow(arrow))),
            oxc::Expression::FunctionExpression(function) => {
                ExpressionKind::Function(Box::new(self.function(function, function.span.start)))
            }
            // Anything else is opaque to static evaluation.
            _ => ExpressionKind::Identifier(String::new()),
        };
        Expression::new(kind, expr_range)
    }

    /// `as const` is recorded as the `const` keyword type.
    fn as_type(&mut self, ty: &oxc::TSType<'_>) -> TypeNode {
        if let oxc::TSType::TSTypeReference(reference) = ty {
            if reference.type_arguments.is_none()
                && matches!(&reference.type_name, oxc::TSTypeName::IdentifierReference(id) if id.name.as_str() == "const")
            {
                return keyword_type("const", range(ty.span()));
            }
        }
        self.type_node(ty)
    }

    fn call(&mut self, call: &oxc::CallExpression<'_>) -> ExpressionKind {
        ExpressionKind::Call {
            callee: Box::new(self.expression(&call.callee)),
            arguments: self.arguments(&call.arguments),
        }
    }

    fn static_member(&mut self, member: &oxc::StaticMemberExpression<'_>) -> ExpressionKind {
        ExpressionKind::PropertyAccess {
            object: Box::new(self.expression(&member.object)),
            name: Identifier {
                text: member.property.name.to_string(),
                range: range(member.property.span),
            },
        }
    }

    fn computed_member(&mut self, member: &oxc::ComputedMemberExpression<'_>) -> ExpressionKind {
        ExpressionKind::ElementAccess {
            object: Box::new(self.expression(&member.object)),
            index: Box::new(self.expression(&member.expression)),
        }
    }

    fn arguments(&mut self, arguments: &[oxc::Argument<'_>]) -> Vec<Expression> {
        arguments
            .iter()
            .map(|arg| match arg {
                oxc::Argument::SpreadElement(spread) => Expression::new(
                    ExpressionKind::Spread(Box::new(self.expression(&spread.argument))),
                    range(spread.span),
                ),
                other => match other.as_expression() {
                    Some(e) => self.expression(e),
                    None => Expression::new(ExpressionKind::Identifier(String::new()), range(other.span())),
                },
            })
            .collect()
    }

    fn array_element(&mut self, element: &oxc::ArrayExpressionElement<'_>) -> Expression {
        match element {
            oxc::ArrayExpressionElement::SpreadElement(spread) => Expression::new(
                ExpressionKind::Spread(Box::new(self.expression(&spread.argument))),
                range(spread.span),
            ),
            // Holes read as `undefined`.
            oxc::ArrayExpressionElement::Elision(elision) => Expression::new(
                ExpressionKind::Identifier("undefined".into()),
                TextRange::new(elision.span.start, elision.span.start),
            ),
            other => match other.as_expression() {
                Some(e) => self.expression(e),
                None => Expression::new(ExpressionKind::Identifier(String::new()), range(other.span())),
            },
        }
    }

    fn object_member(&mut self, property: &oxc::ObjectPropertyKind<'_>) -> ObjectMember {
        match property {
            oxc::ObjectPropertyKind::ObjectProperty(prop) if prop.shorthand => {
                let name = self.property_name(&prop.key, false);
                ObjectMember::Shorthand(Identifier {
                    text: name.text,
                    range: name.range,
                })
            }
            oxc::ObjectPropertyKind::ObjectProperty(prop) => ObjectMember::Property {
                name: self.property_name(&prop.key, prop.computed),
                value: self.expression(&prop.value),
            },
            oxc::ObjectPropertyKind::SpreadProperty(spread) => ObjectMember::Spread(self.expression(&spread.argument)),
        }
    }

    fn assignment_target(&mut self, target: &oxc::AssignmentTarget<'_>) -> Expression {
        let target_range = range(target.span());
        let kind = match target {
            oxc::AssignmentTarget::AssignmentTargetIdentifier(id) => ExpressionKind::Identifier(id.name.to_string()),
            oxc::AssignmentTarget::StaticMemberExpression(member) => self.static_member(member),
            oxc::AssignmentTarget::ComputedMemberExpression(member) => self.computed_member(member),
            _ => ExpressionKind::Identifier(String::new()),
        };
        Expression::new(kind, target_range)
    }

    /// Folds `a, b, c` into left-nested comma operators.
    fn sequence(&mut self, expressions: &[oxc::Expression<'_>], outer: TextRange) -> Expression {
        let mut iter = expressions.iter();
        let Some(first) = iter.next() else {
            return Expression::new(ExpressionKind::Identifier("undefined".into()), outer);
        };
        let mut folded = self.expression(first);
        for next in iter {
            let right = self.expression(next);
            let folded_range = TextRange::new(folded.range.pos, right.range.end);
            folded = Expression::new(
                ExpressionKind::Binary {
                    operator: BinaryOperator::Comma,
                    left: Box::new(folded),
                    right: Box::new(right),
                },
                folded_range,
            );
        }
        folded
    }

    /// A template without substitutions is an ordinary string.
    fn template(&self, template: &oxc::TemplateLiteral<'_>) -> ExpressionKind {
        if template.expressions.is_empty() {
            ExpressionKind::String(self.template_text(template))
        } else {
            ExpressionKind::Template(self.template_raw(template))
        }
    }

    fn template_text(&self, template: &oxc::TemplateLiteral<'_>) -> String {
        template
            .quasis
            .first()
            .map(|q| q.value.cooked.as_ref().unwrap_or(&q.value.raw).to_string())
            .unwrap_or_default()
    }

    /// Source text between the backticks.
    fn template_raw(&self, template: &oxc::TemplateLiteral<'_>) -> String {
        let span = template.span;
        self.slice(span.start + 1, span.end.saturating_sub(1)).to_string()
    }
}

/// Formats a number the way JavaScript prints it for integral values.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
