//! Reflection over a `ts::Program`.

use ts::{
    ClassDeclaration, ClassElementKind, DeclId, DeclarationNode, Expression, ExpressionKind, FileId,
    FunctionBody, FunctionLike, Identifier, Program, Statement, StatementKind, TypeKind, TypeNode,
};

use super::host::*;
use crate::ngtsc::diagnostics::SourceSpan;

pub struct TypeScriptReflectionHost<'a> {
    program: &'a Program,
}

impl<'a> TypeScriptReflectionHost<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self { program }
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    fn file_name(&self, file: FileId) -> &'a str {
        &self.program.file(file).file_name
    }

    fn reflect_decorators(&self, decorators: &[ts::Decorator], file: FileId) -> Vec<Decorator> {
        decorators
            .iter()
            .filter_map(|decorator| self.reflect_decorator(decorator, file))
            .collect()
    }

    fn reflect_decorator(&self, decorator: &ts::Decorator, file: FileId) -> Option<Decorator> {
        let (identifier, args) = match &decorator.expression.kind {
            ExpressionKind::Call { callee, arguments } => (callee.as_ref().clone(), Some(arguments.clone())),
            _ => (decorator.expression.clone(), None),
        };
        let (name, import) = match &identifier.kind {
            ExpressionKind::Identifier(name) => (name.clone(), self.get_import_of_identifier(name, file)),
            // `@core.Component()` through a namespace import.
            ExpressionKind::PropertyAccess { object, name } => {
                let import = object.as_identifier().and_then(|namespace| {
                    let ns = self.program.namespace_import(file, namespace)?;
                    Some(Import {
                        name: name.text.clone(),
                        from: ns.specifier,
                    })
                });
                (name.text.clone(), import)
            }
            _ => return None,
        };
        Some(Decorator {
            name,
            identifier,
            import,
            args,
            span: SourceSpan::new(self.file_name(file), decorator.range),
        })
    }

    fn function_definition(&self, decl: DeclId, function: &FunctionLike) -> FunctionDefinition {
        let body = function.body.as_ref().map(|body| match body {
            FunctionBody::Block(statements) => statements.clone(),
            FunctionBody::Expression(expression) => vec![Statement {
                range: expression.range,
                kind: StatementKind::Return(Some(expression.as_ref().clone())),
            }],
        });
        FunctionDefinition {
            decl,
            file: decl.file,
            parameters: function
                .parameters
                .iter()
                .map(|param| Parameter {
                    name: param.name.text.clone(),
                    initializer: param.initializer.clone(),
                })
                .collect(),
            body,
            return_type: function.return_type.clone(),
        }
    }
}

/// The runtime value named by a type annotation: `Foo` for `Foo<T>`,
/// `ns.Foo` for `ns.Foo`, and the non-null half of `Foo | null`.
pub fn type_to_value(type_node: &TypeNode) -> Option<Expression> {
    match &type_node.kind {
        TypeKind::Reference { name, .. } => {
            let mut segments = name.iter();
            let first = segments.next()?;
            let mut expression = Expression::new(ExpressionKind::Identifier(first.clone()), type_node.range);
            for segment in segments {
                expression = Expression::new(
                    ExpressionKind::PropertyAccess {
                        object: Box::new(expression),
                        name: Identifier {
                            text: segment.clone(),
                            range: type_node.range,
                        },
                    },
                    type_node.range,
                );
            }
            Some(expression)
        }
        TypeKind::Parenthesized(inner) => type_to_value(inner),
        TypeKind::Union(members) => {
            let mut values = members.iter().filter(|member| {
                !matches!(&member.kind, TypeKind::Keyword(k) if k == "null" || k == "undefined")
            });
            match (values.next(), values.next()) {
                (Some(only), None) => type_to_value(only),
                _ => None,
            }
        }
        _ => None,
    }
}

impl ReflectionHost for TypeScriptReflectionHost<'_> {
    fn get_decorators_of_declaration(&self, class: &ClassDeclaration) -> Option<Vec<Decorator>> {
        if class.decorators.is_empty() {
            return None;
        }
        Some(self.reflect_decorators(&class.decorators, class.id.file))
    }

    fn get_members_of_class(&self, class: &ClassDeclaration) -> Vec<ClassMember> {
        let file = class.id.file;
        let file_name = self.file_name(file);
        let mut members = Vec::new();
        for element in &class.members {
            let (kind, type_node, value) = match &element.kind {
                ClassElementKind::Property {
                    type_node,
                    initializer,
                } => (ClassMemberKind::Property, type_node.clone(), initializer.clone()),
                ClassElementKind::Method(f) => (ClassMemberKind::Method, f.return_type.clone(), None),
                ClassElementKind::Getter(f) => (ClassMemberKind::Getter, f.return_type.clone(), None),
                ClassElementKind::Setter(_) => (ClassMemberKind::Setter, None, None),
                ClassElementKind::Constructor(ctor) => {
                    // Parameter properties are members too.
                    for param in ctor.parameters.iter().filter(|p| p.modifiers.is_parameter_property()) {
                        members.push(ClassMember {
                            name: param.name.text.clone(),
                            kind: ClassMemberKind::Property,
                            is_static: false,
                            decorators: Vec::new(),
                            type_node: param.type_node.clone(),
                            value: None,
                            implementation: None,
                            span: SourceSpan::new(file_name, param.range),
                        });
                    }
                    continue;
                }
                ClassElementKind::IndexSignature => continue,
            };
            let Some(name) = element.name_text() else {
                continue;
            };
            members.push(ClassMember {
                name: name.to_string(),
                kind,
                is_static: element.is_static(),
                decorators: self.reflect_decorators(&element.decorators, file),
                type_node,
                value,
                implementation: Some(element.id),
                span: SourceSpan::new(file_name, element.range),
            });
        }
        members
    }

    fn get_constructor_parameters(&self, class: &ClassDeclaration) -> Option<Vec<CtorParameter>> {
        let ctor = class.constructor()?;
        let file_name = self.file_name(class.id.file);
        Some(
            ctor.parameters
                .iter()
                .map(|param| CtorParameter {
                    name: param.name.text.clone(),
                    type_expression: param.type_node.as_ref().and_then(type_to_value),
                    type_node: param.type_node.clone(),
                    decorators: self.reflect_decorators(&param.decorators, class.id.file),
                    span: SourceSpan::new(file_name, param.range),
                })
                .collect(),
        )
    }

    fn has_base_class(&self, class: &ClassDeclaration) -> bool {
        class.extends.is_some()
    }

    fn get_import_of_identifier(&self, name: &str, file: FileId) -> Option<Import> {
        self.program.file(file).imports().find_map(|import| {
            if import.default_binding.as_ref().is_some_and(|b| b.text == name) {
                return Some(Import {
                    name: "default".to_string(),
                    from: import.module_specifier.clone(),
                });
            }
            import
                .named
                .iter()
                .find(|spec| spec.local.text == name)
                .map(|spec| Import {
                    name: spec.imported.clone(),
                    from: import.module_specifier.clone(),
                })
        })
    }

    fn get_declaration_of_identifier(&self, name: &str, file: FileId) -> Option<Declaration> {
        self.program
            .resolve_identifier(file, name)
            .map(|resolved| Declaration {
                decl: resolved.decl,
                via_module: resolved.via_module,
            })
    }

    fn get_definition_of_function(&self, decl: DeclId) -> Option<FunctionDefinition> {
        match self.program.declaration(decl)? {
            DeclarationNode::Function(f) => Some(self.function_definition(decl, &f.function)),
            DeclarationNode::Member { member, .. } => match &member.kind {
                ClassElementKind::Method(f) => Some(self.function_definition(decl, f)),
                _ => None,
            },
            DeclarationNode::Variable { declaration, .. } => match &declaration.initializer.as_ref()?.kind {
                ExpressionKind::Arrow(f) | ExpressionKind::Function(f) => Some(self.function_definition(decl, f)),
                _ => None,
            },
            _ => None,
        }
    }

    fn get_dts_declaration_of_class(&self, class: &ClassDeclaration) -> Option<DeclId> {
        if self.program.file(class.id.file).is_declaration_file() {
            Some(class.id)
        } else {
            None
        }
    }

    fn is_class(&self, decl: DeclId) -> bool {
        self.program.class(decl).is_some()
    }

    fn get_generic_arity_of_class(&self, class: &ClassDeclaration) -> Option<usize> {
        Some(class.type_parameters.len())
    }
}
