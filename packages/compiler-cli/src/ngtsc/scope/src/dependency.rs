// Dependency Scope Reader
//
// Reads the scope metadata of classes compiled by an earlier compilation out
// of the static definition fields in their `.d.ts` typings:
//
//   static ngModuleDef: ɵNgModuleDefWithMeta<Module, [declarations], [imports], [exports]>;
//   static ngDirectiveDef: ɵDirectiveDefWithMeta<Dir, selector, exportAs, inputs, outputs, queries>;
//   static ngPipeDef: ɵPipeDefWithMeta<Pipe, name>;

use indexmap::IndexMap;
use ts::{ClassDeclaration, ClassElementKind, FileId, Program, TypeKind, TypeNode};

use super::api::ModuleData;
use crate::ngtsc::annotations::common::extract_directive_guards;
use crate::ngtsc::imports::Reference;
use crate::ngtsc::reflection::ReflectionHost;
use crate::ngtsc::typecheck::api::TypeCheckableDirectiveMeta;

pub struct DependencyScopeReader<'a> {
    program: &'a Program,
    reflector: &'a dyn ReflectionHost,
}

impl<'a> DependencyScopeReader<'a> {
    pub fn new(program: &'a Program, reflector: &'a dyn ReflectionHost) -> Self {
        Self { program, reflector }
    }

    /// Module data of a compiled NgModule. References found in it are owned
    /// by the module `module` was imported from.
    pub fn read_module_data(&self, module: &Reference) -> Option<ModuleData> {
        let class = self.program.class(module.decl)?;
        let args = definition_type_arguments(class, "ngModuleDef")?;
        let [_, declarations, imports, exports, ..] = args else {
            return None;
        };
        let owner = module.module_name();
        Some(ModuleData {
            declarations: self.references_in_tuple(declarations, class.id.file, owner),
            imports: self.references_in_tuple(imports, class.id.file, owner),
            exports: self.references_in_tuple(exports, class.id.file, owner),
        })
    }

    pub fn read_directive_metadata(&self, reference: &Reference) -> Option<TypeCheckableDirectiveMeta> {
        let class = self.program.class(reference.decl)?;
        let (args, is_component) = match definition_type_arguments(class, "ngComponentDef") {
            Some(args) => (args, true),
            None => (definition_type_arguments(class, "ngDirectiveDef")?, false),
        };
        let [_, selector, export_as, inputs, outputs, rest @ ..] = args else {
            return None;
        };
        let guards = extract_directive_guards(&self.reflector.get_members_of_class(class));
        Some(TypeCheckableDirectiveMeta {
            reference: reference.clone(),
            name: class.name_text()?.to_string(),
            selector: string_literal(selector).map(str::to_string),
            is_component,
            inputs: string_map(inputs),
            outputs: string_map(outputs),
            export_as: string_literal(export_as)
                .map(|value| value.split(',').map(|name| name.trim().to_string()).collect()),
            queries: rest.first().map(string_tuple).unwrap_or_default(),
            ng_template_guards: guards.ng_template_guards,
            has_ng_template_context_guard: guards.has_ng_template_context_guard,
        })
    }

    pub fn read_pipe_name(&self, reference: &Reference) -> Option<String> {
        let class = self.program.class(reference.decl)?;
        match definition_type_arguments(class, "ngPipeDef")? {
            [_, name, ..] => string_literal(name).map(str::to_string),
            _ => None,
        }
    }

    fn references_in_tuple(&self, type_node: &TypeNode, file: FileId, owner: Option<&str>) -> Vec<Reference> {
        let TypeKind::Tuple(elements) = &type_node.kind else {
            return Vec::new();
        };
        elements
            .iter()
            .filter_map(|element| match &element.kind {
                TypeKind::Query(names) => self.resolve_type_query(names, file, owner),
                _ => None,
            })
            .collect()
    }

    /// Resolves `typeof Foo` or `typeof ns.Foo` written in `file`.
    fn resolve_type_query(&self, names: &[String], file: FileId, owner: Option<&str>) -> Option<Reference> {
        let resolved = match names {
            [name] => self.program.resolve_identifier(file, name)?,
            [namespace, name] => {
                let import = self.program.namespace_import(file, namespace)?;
                let mut resolved = self.program.resolve_export(import.file, name)?;
                if is_bare_specifier(&import.specifier) {
                    resolved.via_module = Some(import.specifier);
                }
                resolved
            }
            _ => return None,
        };
        let name = self.program.declaration(resolved.decl)?.name()?;
        let file_name = self.program.file(resolved.decl.file).file_name.as_str();
        Some(match resolved.via_module {
            Some(module) => Reference::absolute(resolved.decl, name, file_name, module),
            None => Reference::resolved(resolved.decl, name, file_name).owned_by(owner),
        })
    }
}

/// Type arguments of `static <field>: Def<...>`.
fn definition_type_arguments<'c>(class: &'c ClassDeclaration, field: &str) -> Option<&'c [TypeNode]> {
    let member = class
        .members
        .iter()
        .find(|member| member.is_static() && member.name_text() == Some(field))?;
    let ClassElementKind::Property {
        type_node: Some(type_node),
        ..
    } = &member.kind
    else {
        return None;
    };
    match &type_node.kind {
        TypeKind::Reference { arguments, .. } => Some(arguments),
        _ => None,
    }
}

fn string_literal(type_node: &TypeNode) -> Option<&str> {
    match &type_node.kind {
        TypeKind::StringLiteral(value) => Some(value),
        _ => None,
    }
}

fn string_map(type_node: &TypeNode) -> IndexMap<String, String> {
    let TypeKind::Literal(members) = &type_node.kind else {
        return IndexMap::new();
    };
    members
        .iter()
        .filter_map(|member| {
            let value = string_literal(member.type_node.as_ref()?)?;
            Some((member.name.text.clone(), value.to_string()))
        })
        .collect()
}

fn string_tuple(type_node: &TypeNode) -> Vec<String> {
    match &type_node.kind {
        TypeKind::Tuple(elements) => elements
            .iter()
            .filter_map(|element| string_literal(element).map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn is_bare_specifier(specifier: &str) -> bool {
    !specifier.is_empty() && !specifier.starts_with('.') && !specifier.starts_with('/')
}
