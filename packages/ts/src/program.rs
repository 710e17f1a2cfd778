// Program
//
// A set of parsed source files plus the module resolution and symbol lookup
// the Angular compiler needs: following named, default and namespace imports
// and `export {..} from` / `export * from` re-exports to the declaring node.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::node::*;
use crate::parser::{parse_source_file, ParseError};
use crate::path;

const MAX_RESOLUTION_DEPTH: usize = 32;

/// Where a declaration lives: the statement index at each nesting level
/// (top-level first, then into function bodies) and the slot within that
/// statement.
#[derive(Debug, Clone)]
struct DeclLocator {
    path: SmallVec<[usize; 2]>,
    slot: Slot,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Statement,
    Variable(usize),
    Member(usize),
}

/// A declaration node borrowed from its `Program`.
#[derive(Debug, Clone, Copy)]
pub enum DeclarationNode<'a> {
    Class(&'a ClassDeclaration),
    Function(&'a FunctionDeclaration),
    Variable {
        declaration: &'a VariableDeclaration,
        statement: &'a VariableStatement,
    },
    Enum(&'a EnumDeclaration),
    Member {
        class: &'a ClassDeclaration,
        member: &'a ClassElement,
    },
}

impl<'a> DeclarationNode<'a> {
    pub fn name(&self) -> Option<&'a str> {
        match self {
            DeclarationNode::Class(c) => c.name_text(),
            DeclarationNode::Function(f) => f.function.name.as_ref().map(|n| n.text.as_str()),
            DeclarationNode::Variable { declaration, .. } => Some(declaration.name.text.as_str()),
            DeclarationNode::Enum(e) => Some(e.name.text.as_str()),
            DeclarationNode::Member { member, .. } => member.name_text(),
        }
    }

    pub fn range(&self) -> TextRange {
        match self {
            DeclarationNode::Class(c) => c.range,
            DeclarationNode::Function(f) => f.range,
            DeclarationNode::Variable { declaration, .. } => declaration.range,
            DeclarationNode::Enum(e) => e.range,
            DeclarationNode::Member { member, .. } => member.range,
        }
    }

    pub fn as_class(&self) -> Option<&'a ClassDeclaration> {
        match self {
            DeclarationNode::Class(c) => Some(c),
            _ => None,
        }
    }
}

/// Result of resolving a name to its declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSymbol {
    pub decl: DeclId,
    /// Set when the name was reached through a non-relative module specifier,
    /// e.g. `@angular/core`.
    pub via_module: Option<String>,
}

/// A namespace import `import * as name from 'spec'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceImport {
    pub file: FileId,
    pub specifier: String,
}

pub struct Program {
    files: Vec<SourceFile>,
    by_name: HashMap<String, FileId>,
    decls: HashMap<DeclId, DeclLocator>,
}

impl Program {
    /// Parses every `(file_name, text)` pair into a program.
    pub fn new<N, T>(files: impl IntoIterator<Item = (N, T)>) -> Result<Self, ParseError>
    where
        N: AsRef<str>,
        T: AsRef<str>,
    {
        let mut program = Program {
            files: Vec::new(),
            by_name: HashMap::new(),
            decls: HashMap::new(),
        };
        for (name, text) in files {
            let id = FileId(program.files.len() as u32);
            let file_name = path::normalize(name.as_ref());
            let file = parse_source_file(id, &file_name, text.as_ref())?;
            program.index_declarations(&file);
            program.by_name.insert(file_name, id);
            program.files.push(file);
        }
        Ok(program)
    }

    fn index_declarations(&mut self, file: &SourceFile) {
        let mut path = SmallVec::new();
        self.index_statements(&file.statements, &mut path);
    }

    fn index_statements(&mut self, statements: &[Statement], path: &mut SmallVec<[usize; 2]>) {
        for (i, statement) in statements.iter().enumerate() {
            path.push(i);
            let at = |slot| DeclLocator { path: path.clone(), slot };
            match &statement.kind {
                StatementKind::Class(class) => {
                    self.decls.insert(class.id, at(Slot::Statement));
                    for (m, member) in class.members.iter().enumerate() {
                        self.decls.insert(member.id, at(Slot::Member(m)));
                    }
                }
                StatementKind::Function(f) => {
                    self.decls.insert(f.id, at(Slot::Statement));
                }
                StatementKind::Variable(v) => {
                    for (d, decl) in v.declarations.iter().enumerate() {
                        self.decls.insert(decl.id, at(Slot::Variable(d)));
                    }
                }
                StatementKind::Enum(e) => {
                    self.decls.insert(e.id, at(Slot::Statement));
                }
                _ => {}
            }
            self.index_statements(statement.kind.nested_statements(), path);
            path.pop();
        }
    }

    pub fn source_files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.0 as usize]
    }

    pub fn file_by_name(&self, name: &str) -> Option<&SourceFile> {
        self.by_name
            .get(&path::normalize(name))
            .map(|id| self.file(*id))
    }

    pub fn declaration(&self, id: DeclId) -> Option<DeclarationNode<'_>> {
        let locator = self.decls.get(&id)?;
        let (last, outer) = locator.path.split_last()?;
        let mut statements = &self.files.get(id.file.0 as usize)?.statements[..];
        for i in outer {
            statements = statements.get(*i)?.kind.nested_statements();
        }
        let node = match (locator.slot, &statements.get(*last)?.kind) {
            (Slot::Statement, StatementKind::Class(c)) => DeclarationNode::Class(c),
            (Slot::Statement, StatementKind::Function(f)) => DeclarationNode::Function(f),
            (Slot::Statement, StatementKind::Enum(e)) => DeclarationNode::Enum(e),
            (Slot::Variable(d), StatementKind::Variable(v)) => DeclarationNode::Variable {
                declaration: v.declarations.get(d)?,
                statement: v,
            },
            (Slot::Member(m), StatementKind::Class(c)) => DeclarationNode::Member {
                class: c,
                member: c.members.get(m)?,
            },
            _ => return None,
        };
        Some(node)
    }

    pub fn class(&self, id: DeclId) -> Option<&ClassDeclaration> {
        self.declaration(id).and_then(|d| d.as_class())
    }

    /// Finds a top-level class by file and name.
    pub fn find_class(&self, file_name: &str, name: &str) -> Option<&ClassDeclaration> {
        self.file_by_name(file_name)?
            .classes()
            .find(|c| c.name_text() == Some(name))
    }

    /// Resolves a module specifier imported from `from`.
    pub fn resolve_module(&self, specifier: &str, from: FileId) -> Option<FileId> {
        let candidates: Vec<String> = if specifier.starts_with('.') || specifier.starts_with('/') {
            let base = path::resolve(&path::dirname(&self.file(from).file_name), &[specifier]);
            vec![
                format!("{}.ts", base),
                format!("{}.d.ts", base),
                format!("{}/index.ts", base),
                format!("{}/index.d.ts", base),
                base,
            ]
        } else {
            vec![
                format!("/node_modules/{}/index.d.ts", specifier),
                format!("/node_modules/{}.d.ts", specifier),
                format!("/node_modules/{}/index.ts", specifier),
            ]
        };
        candidates
            .iter()
            .find_map(|candidate| self.by_name.get(candidate).copied())
    }

    /// Finds a top-level declaration named `name` in `file`.
    pub fn local_declaration(&self, file: FileId, name: &str) -> Option<DeclId> {
        self.file(file)
            .statements
            .iter()
            .find_map(|s| declared_name_matches(&s.kind, name))
    }

    /// Resolves an identifier used in `file` to its declaration.
    pub fn resolve_identifier(&self, file: FileId, name: &str) -> Option<ResolvedSymbol> {
        self.resolve_identifier_at_depth(file, name, 0)
    }

    fn resolve_identifier_at_depth(
        &self,
        file: FileId,
        name: &str,
        depth: usize,
    ) -> Option<ResolvedSymbol> {
        if depth > MAX_RESOLUTION_DEPTH {
            return None;
        }
        if let Some(decl) = self.local_declaration(file, name) {
            return Some(ResolvedSymbol {
                decl,
                via_module: None,
            });
        }
        for import in self.file(file).imports() {
            let imported = if import.default_binding.as_ref().map(|b| b.text.as_str()) == Some(name)
            {
                "default"
            } else if let Some(spec) = import.named.iter().find(|s| s.local.text == name) {
                spec.imported.as_str()
            } else {
                continue;
            };
            let target = self.resolve_module(&import.module_specifier, file)?;
            let resolved = self.resolve_export_at_depth(target, imported, depth + 1)?;
            return Some(ResolvedSymbol {
                decl: resolved.decl,
                via_module: if is_bare_specifier(&import.module_specifier) {
                    Some(import.module_specifier.clone())
                } else {
                    resolved.via_module
                },
            });
        }
        None
    }

    /// Finds the namespace import bound to `name` in `file`, if any.
    pub fn namespace_import(&self, file: FileId, name: &str) -> Option<NamespaceImport> {
        self.file(file).imports().find_map(|import| {
            let namespace = import.namespace.as_ref()?;
            if namespace.text != name {
                return None;
            }
            Some(NamespaceImport {
                file: self.resolve_module(&import.module_specifier, file)?,
                specifier: import.module_specifier.clone(),
            })
        })
    }

    /// Resolves the export `name` of module `file`.
    pub fn resolve_export(&self, file: FileId, name: &str) -> Option<ResolvedSymbol> {
        self.resolve_export_at_depth(file, name, 0)
    }

    fn resolve_export_at_depth(
        &self,
        file: FileId,
        name: &str,
        depth: usize,
    ) -> Option<ResolvedSymbol> {
        if depth > MAX_RESOLUTION_DEPTH {
            return None;
        }
        let source = self.file(file);
        for statement in &source.statements {
            if let Some(decl) = exported_declaration(&statement.kind, name) {
                return Some(ResolvedSymbol {
                    decl,
                    via_module: None,
                });
            }
        }
        for statement in &source.statements {
            let StatementKind::Export(export) = &statement.kind else {
                continue;
            };
            if export.star {
                continue;
            }
            let Some(spec) = export.specifiers.iter().find(|s| s.exported == name) else {
                continue;
            };
            return match &export.module_specifier {
                Some(module) => {
                    let target = self.resolve_module(module, file)?;
                    let resolved = self.resolve_export_at_depth(target, &spec.local, depth + 1)?;
                    Some(ResolvedSymbol {
                        decl: resolved.decl,
                        via_module: if is_bare_specifier(module) {
                            Some(module.clone())
                        } else {
                            resolved.via_module
                        },
                    })
                }
                None => self.resolve_identifier_at_depth(file, &spec.local, depth + 1),
            };
        }
        for statement in &source.statements {
            let StatementKind::Export(export) = &statement.kind else {
                continue;
            };
            if !export.star {
                continue;
            }
            let Some(module) = &export.module_specifier else {
                continue;
            };
            let Some(target) = self.resolve_module(module, file) else {
                continue;
            };
            if let Some(resolved) = self.resolve_export_at_depth(target, name, depth + 1) {
                return Some(ResolvedSymbol {
                    decl: resolved.decl,
                    via_module: if is_bare_specifier(module) {
                        Some(module.clone())
                    } else {
                        resolved.via_module
                    },
                });
            }
        }
        None
    }

    /// All exported names of `file` with their declarations, in source order.
    pub fn exports_of(&self, file: FileId) -> Vec<(String, DeclId)> {
        let mut out: Vec<(String, DeclId)> = Vec::new();
        self.collect_exports(file, &mut out, 0);
        out
    }

    fn collect_exports(&self, file: FileId, out: &mut Vec<(String, DeclId)>, depth: usize) {
        if depth > MAX_RESOLUTION_DEPTH {
            return;
        }
        fn push(name: String, decl: DeclId, out: &mut Vec<(String, DeclId)>) {
            if !out.iter().any(|(n, _)| *n == name) {
                out.push((name, decl));
            }
        }
        for statement in &self.file(file).statements {
            match &statement.kind {
                StatementKind::Export(export) if export.star => {
                    if let Some(target) = export
                        .module_specifier
                        .as_ref()
                        .and_then(|m| self.resolve_module(m, file))
                    {
                        let mut nested = Vec::new();
                        self.collect_exports(target, &mut nested, depth + 1);
                        for (name, decl) in nested {
                            if name != "default" {
                                push(name, decl, out);
                            }
                        }
                    }
                }
                StatementKind::Export(export) => {
                    for spec in &export.specifiers {
                        if let Some(resolved) = self.resolve_export(file, &spec.exported) {
                            push(spec.exported.clone(), resolved.decl, out);
                        }
                    }
                }
                kind => {
                    for (name, decl) in exported_names(kind) {
                        push(name, decl, out);
                    }
                }
            }
        }
    }

    /// True if the declaration is exported from its own file.
    pub fn is_exported(&self, id: DeclId) -> bool {
        let Some(node) = self.declaration(id) else {
            return false;
        };
        let Some(name) = node.name() else {
            return false;
        };
        self.resolve_export(id.file, name)
            .is_some_and(|resolved| resolved.decl == id)
    }
}

fn is_bare_specifier(specifier: &str) -> bool {
    !specifier.is_empty() && !specifier.starts_with('.') && !specifier.starts_with('/')
}

fn declared_name_matches(kind: &StatementKind, name: &str) -> Option<DeclId> {
    match kind {
        StatementKind::Class(c) if c.name_text() == Some(name) => Some(c.id),
        StatementKind::Function(f)
            if f.function.name.as_ref().map(|n| n.text.as_str()) == Some(name) =>
        {
            Some(f.id)
        }
        StatementKind::Variable(v) => v
            .declarations
            .iter()
            .find(|d| d.name.text == name)
            .map(|d| d.id),
        StatementKind::Enum(e) if e.name.text == name => Some(e.id),
        _ => None,
    }
}

fn statement_modifiers(kind: &StatementKind) -> ModifierFlags {
    match kind {
        StatementKind::Class(c) => c.modifiers,
        StatementKind::Function(f) => f.modifiers,
        StatementKind::Variable(v) => v.modifiers,
        StatementKind::Enum(e) => e.modifiers,
        _ => ModifierFlags::empty(),
    }
}

fn exported_declaration(kind: &StatementKind, name: &str) -> Option<DeclId> {
    let modifiers = statement_modifiers(kind);
    if !modifiers.contains(ModifierFlags::EXPORT) {
        return None;
    }
    if name == "default" {
        if !modifiers.contains(ModifierFlags::DEFAULT) {
            return None;
        }
        return match kind {
            StatementKind::Class(c) => Some(c.id),
            StatementKind::Function(f) => Some(f.id),
            _ => None,
        };
    }
    if modifiers.contains(ModifierFlags::DEFAULT) {
        return None;
    }
    declared_name_matches(kind, name)
}

fn exported_names(kind: &StatementKind) -> Vec<(String, DeclId)> {
    let modifiers = statement_modifiers(kind);
    if !modifiers.contains(ModifierFlags::EXPORT) {
        return Vec::new();
    }
    if modifiers.contains(ModifierFlags::DEFAULT) {
        return match kind {
            StatementKind::Class(c) => vec![("default".to_string(), c.id)],
            StatementKind::Function(f) => vec![("default".to_string(), f.id)],
            _ => Vec::new(),
        };
    }
    match kind {
        StatementKind::Class(c) => c
            .name_text()
            .map(|n| vec![(n.to_string(), c.id)])
            .unwrap_or_default(),
        StatementKind::Function(f) => f
            .function
            .name
            .as_ref()
            .map(|n| vec![(n.text.clone(), f.id)])
            .unwrap_or_default(),
        StatementKind::Variable(v) => v
            .declarations
            .iter()
            .map(|d| (d.name.text.clone(), d.id))
            .collect(),
        StatementKind::Enum(e) => vec![(e.name.text.clone(), e.id)],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program() -> Program {
        Program::new(vec![
            (
                "/node_modules/lib/index.d.ts",
                "export * from './src/things';",
            ),
            (
                "/node_modules/lib/src/things.d.ts",
                "export declare class Thing {}\nexport declare const VALUE: string;",
            ),
            (
                "/app/a.ts",
                "import {Thing as T} from 'lib';\nimport B from './b';\nimport * as ns from './c';\nexport class A {}",
            ),
            ("/app/b.ts", "export default class Bee {}"),
            ("/app/c.ts", "const x = 1;\nexport {x as y};\nexport {Z} from './d';"),
            ("/app/d.ts", "export enum Z { One, Two }"),
        ])
        .unwrap()
    }

    #[test]
    fn should_resolve_through_bare_module_reexports() {
        let program = program();
        let a = program.file_by_name("/app/a.ts").unwrap().id;
        let resolved = program.resolve_identifier(a, "T").unwrap();
        assert_eq!(resolved.via_module.as_deref(), Some("lib"));
        assert_eq!(program.declaration(resolved.decl).unwrap().name(), Some("Thing"));
    }

    #[test]
    fn should_resolve_default_imports() {
        let program = program();
        let a = program.file_by_name("/app/a.ts").unwrap().id;
        let resolved = program.resolve_identifier(a, "B").unwrap();
        assert_eq!(resolved.via_module, None);
        assert_eq!(program.declaration(resolved.decl).unwrap().name(), Some("Bee"));
    }

    #[test]
    fn should_list_module_exports_including_renames() {
        let program = program();
        let c = program.file_by_name("/app/c.ts").unwrap().id;
        let names: Vec<String> = program.exports_of(c).into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["y".to_string(), "Z".to_string()]);
    }

    #[test]
    fn should_find_namespace_imports() {
        let program = program();
        let a = program.file_by_name("/app/a.ts").unwrap().id;
        let ns = program.namespace_import(a, "ns").unwrap();
        assert_eq!(program.file(ns.file).file_name, "/app/c.ts");
        assert!(program.namespace_import(a, "missing").is_none());
    }

    #[test]
    fn should_know_which_declarations_are_exported() {
        let program = program();
        let c = program.file_by_name("/app/c.ts").unwrap().id;
        let x = program.local_declaration(c, "x").unwrap();
        assert!(!program.is_exported(x));
        let a = program.find_class("/app/a.ts", "A").unwrap();
        assert!(program.is_exported(a.id));
    }

    #[test]
    fn should_build_programs_with_class_static_blocks() {
        let program = Program::new(vec![("/app/a.ts", "export class A { static { } }")]).unwrap();
        let a = program.find_class("/app/a.ts", "A").unwrap();
        assert!(a.members.is_empty());
        assert!(program.is_exported(a.id));
    }

    #[test]
    fn should_locate_classes_declared_in_function_bodies() {
        let program = Program::new(vec![(
            "/app/a.ts",
            "export function factory() {\n  class Inner { run() {} }\n  return Inner;\n}\n",
        )])
        .unwrap();
        let file = program.file_by_name("/app/a.ts").unwrap();
        let classes = file.all_classes();
        assert_eq!(classes.len(), 1);
        let inner = program.class(classes[0].id).unwrap();
        assert_eq!(inner.name_text(), Some("Inner"));
        assert!(matches!(
            program.declaration(inner.members[0].id),
            Some(DeclarationNode::Member { .. })
        ));
        assert!(program.find_class("/app/a.ts", "Inner").is_none());
    }
}
