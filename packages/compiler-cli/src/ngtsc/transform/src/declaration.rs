// Declaration Transform
//
// Adds the Ivy static fields of compiled classes to their emitted `.d.ts`,
// as `static ngComponentDef: i0.ɵComponentDefWithMeta<...>;` members.

use angular_compiler::output::output_ast as o;
use indexmap::IndexMap;
use ts::{parse_source_file, FileId, StatementKind};

use super::api::CompileResult;
use super::transform::import_manager_for;
use crate::ngtsc::translator::translate_type;
use crate::ngtsc::util::{apply_edits, TextEdit};

/// A static field to declare on a class in a `.d.ts` file.
#[derive(Debug, Clone, PartialEq)]
pub struct IvyDeclarationField {
    pub name: String,
    pub type_: o::Type,
}

/// Processes `.d.ts` file text and adds static field declarations, with
/// types.
pub struct DtsFileTransformer {
    core_imports_from: Option<String>,
    ivy_fields: IndexMap<String, Vec<IvyDeclarationField>>,
}

impl DtsFileTransformer {
    pub fn new(core_imports_from: Option<String>) -> Self {
        Self {
            core_imports_from,
            ivy_fields: IndexMap::new(),
        }
    }

    /// Track that a static field was added to the class `name`.
    pub fn record_static_field(&mut self, name: &str, results: &[CompileResult]) {
        self.ivy_fields
            .entry(name.to_string())
            .or_default()
            .extend(results.iter().map(|result| IvyDeclarationField {
                name: result.name.clone(),
                type_: result.type_.clone(),
            }));
    }

    /// Process the `.d.ts` text for the source file at `ts_path` and add
    /// the static field declarations.
    pub fn transform(&self, dts: &str, ts_path: &str) -> anyhow::Result<String> {
        let file = parse_source_file(FileId(0), ts_path, dts)
            .map_err(|err| anyhow::anyhow!("cannot parse the declarations of {}: {}", ts_path, err))?;
        let mut imports = import_manager_for(self.core_imports_from.as_deref());

        let mut edits = Vec::new();
        for statement in &file.statements {
            let StatementKind::Class(class) = &statement.kind else {
                continue;
            };
            let Some(fields) = class.name_text().and_then(|name| self.ivy_fields.get(name)) else {
                continue;
            };
            let mut members = String::new();
            for field in fields {
                members.push_str(&format!(
                    "    static {}: {};\n",
                    field.name,
                    translate_type(&field.type_, &mut imports)?
                ));
            }
            edits.push(TextEdit::insert(class.range.end.saturating_sub(1), members));
        }

        let extra_imports: String = imports
            .get_all_imports(ts_path)?
            .into_iter()
            .map(|import| format!("import * as {} from '{}';\n", import.qualifier, import.specifier))
            .collect();
        Ok(extra_imports + &apply_edits(dts, 0, edits))
    }
}
