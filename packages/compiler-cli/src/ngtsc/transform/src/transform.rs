// Ivy Transform
//
// Rewrites a source file from the results of an `IvyCompilation`: compiled
// classes gain their static definition fields and lose their Angular
// decorators, auxiliary statements follow the class, and the namespace
// imports and constant-pool statements the generated code needs are added
// after the file's own imports.

use angular_compiler::ConstantPool;
use ts::{ClassDeclaration, SourceFile, StatementKind, TextRange};

use super::compilation::IvyCompilation;
use crate::ngtsc::annotations::common::is_angular_decorator;
use crate::ngtsc::imports::{NoopImportRewriter, R3SymbolsImportRewriter};
use crate::ngtsc::reflection::Decorator;
use crate::ngtsc::translator::{translate_expression, translate_statement, ImportManager};
use crate::ngtsc::util::{apply_edits, visit_edits, TextEdit, VisitListEntryResult, Visitor};

/// An import manager for generated code. Inside `@angular/core`,
/// `core_imports_from` names the r3 symbols file core symbols are read from.
pub fn import_manager_for(core_imports_from: Option<&str>) -> ImportManager {
    match core_imports_from {
        Some(r3_symbols) => ImportManager::new(Box::new(R3SymbolsImportRewriter::new(r3_symbols)), "i"),
        None => ImportManager::new(Box::new(NoopImportRewriter::new()), "i"),
    }
}

struct IvyVisitor<'c, 'a> {
    compilation: &'c mut IvyCompilation<'a>,
    constant_pool: ConstantPool,
    imports: ImportManager,
}

impl Visitor for IvyVisitor<'_, '_> {
    fn visit_class_declaration(
        &mut self,
        class: &ClassDeclaration,
        file: &SourceFile,
    ) -> anyhow::Result<Option<VisitListEntryResult>> {
        let Some(results) = self.compilation.compile_ivy_field_for(class, &mut self.constant_pool)? else {
            return Ok(None);
        };

        let mut edits = Vec::new();
        if let Some(decorator) = self.compilation.ivy_decorator_for(class) {
            edits.push(strip(file, decorator));
        }
        let is_core = self.compilation.is_core();
        let reflector = self.compilation.reflector();
        let member_decorators = reflector
            .get_members_of_class(class)
            .into_iter()
            .flat_map(|member| member.decorators);
        let param_decorators = reflector
            .get_constructor_parameters(class)
            .unwrap_or_default()
            .into_iter()
            .flat_map(|param| param.decorators);
        for decorator in member_decorators.chain(param_decorators) {
            if is_angular_decorator(&decorator, is_core) {
                edits.push(strip(file, &decorator));
            }
        }

        let mut fields = String::new();
        let mut after = Vec::new();
        for result in &results {
            let initializer = translate_expression(&result.initializer, &mut self.imports)?;
            fields.push_str(&format!("    static {} = {};\n", result.name, initializer));
            for statement in &result.statements {
                after.push(translate_statement(statement, &mut self.imports)?);
            }
        }
        edits.push(TextEdit::insert(class.range.end.saturating_sub(1), fields));

        let node = apply_edits(file.text_of(class.range), class.range.pos, edits);
        Ok(Some(VisitListEntryResult {
            node,
            before: Vec::new(),
            after,
        }))
    }
}

/// Removes `decorator` and the whitespace after it.
fn strip(file: &SourceFile, decorator: &Decorator) -> TextEdit {
    let range = decorator.span.range;
    let rest = file.text.get(range.end as usize..).unwrap_or_default();
    let trailing = rest.len() - rest.trim_start().len();
    TextEdit::delete(TextRange::new(range.pos, range.end + trailing as u32))
}

/// The text of `file` with the Ivy definitions of its classes added. Every
/// class of the program must have been analyzed.
pub fn transform_ivy_source_file(compilation: &mut IvyCompilation<'_>, file: &SourceFile) -> anyhow::Result<String> {
    let imports = import_manager_for(compilation.core_imports_from());
    let mut visitor = IvyVisitor {
        compilation,
        constant_pool: ConstantPool::new(),
        imports,
    };
    let mut edits = visit_edits(file, &mut visitor)?;

    let IvyVisitor {
        constant_pool,
        mut imports,
        ..
    } = visitor;
    let mut header = Vec::new();
    let constants = constant_pool
        .statements
        .iter()
        .map(|statement| translate_statement(statement, &mut imports))
        .collect::<anyhow::Result<Vec<_>>>()?;
    for import in imports.get_all_imports(&file.file_name)? {
        header.push(format!("import * as {} from '{}';", import.qualifier, import.specifier));
    }
    header.extend(constants);
    if header.is_empty() {
        return Ok(apply_edits(&file.text, 0, edits));
    }

    // After the last import of the file, or at the very top.
    let insert_at = file
        .statements
        .iter()
        .filter(|statement| matches!(statement.kind, StatementKind::Import(_)))
        .map(|statement| statement.range.end)
        .max();
    let text = match insert_at {
        Some(_) => header.iter().map(|line| format!("\n{}", line)).collect::<String>(),
        None => header.iter().map(|line| format!("{}\n", line)).collect::<String>(),
    };
    edits.insert(0, TextEdit::insert(insert_at.unwrap_or(0), text));
    Ok(apply_edits(&file.text, 0, edits))
}
