// TypeCheck Context
//
// Collects the code template type-checking adds to the program: type
// constructors on directive classes and one type check block per component.
// Each addition is an operation at a split point in its source file; the
// transformed file is the original text with every operation spliced in.

use std::collections::HashSet;

use angular_compiler::directive_matching::SelectorMatcher;
use angular_compiler::render3::r3_ast::R3Node;
use angular_compiler::render3::view::{R3TargetBinder, Target};
use indexmap::IndexMap;
use ts::{ClassDeclaration, DeclId, FileId, Program};

use super::type_check_block::generate_type_check_block;
use super::type_constructor::generate_type_ctor;
use crate::ngtsc::imports::NoopImportRewriter;
use crate::ngtsc::translator::ImportManager;
use crate::ngtsc::typecheck::api::{
    TypeCheckBlockMetadata, TypeCheckableDirectiveMeta, TypeCtorFields, TypeCtorMetadata,
};

/// Qualifier prefix of the namespace imports added to type-checked files.
const IMPORT_PREFIX: &str = "_i";

pub struct TypeCheckContext<'a> {
    program: &'a Program,
    files: IndexMap<FileId, PendingFile>,
    /// Directives that already have a type constructor.
    type_ctors: HashSet<DeclId>,
}

struct PendingFile {
    ops: Vec<Op>,
    imports: ImportManager,
}

impl PendingFile {
    fn new() -> Self {
        Self {
            ops: Vec::new(),
            imports: ImportManager::new(Box::new(NoopImportRewriter::new()), IMPORT_PREFIX),
        }
    }
}

/// Text to insert at a byte offset of the original file.
#[derive(Debug)]
struct Op {
    split_point: usize,
    text: String,
}

impl<'a> TypeCheckContext<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            files: IndexMap::new(),
            type_ctors: HashSet::new(),
        }
    }

    /// Record a template for type-checking: the component `node` is checked
    /// against the directives `matcher` can match in `nodes`.
    pub fn add_template(
        &mut self,
        node: &ClassDeclaration,
        nodes: &[R3Node],
        matcher: SelectorMatcher<TypeCheckableDirectiveMeta>,
    ) -> anyhow::Result<()> {
        let program = self.program;
        let binder = R3TargetBinder::new(matcher);
        let bound = binder.bind(Target { template: nodes });

        for dir in bound.get_used_directives() {
            let decl = dir.reference.decl;
            if !self.type_ctors.insert(decl) {
                continue;
            }
            let Some(class) = program.class(decl) else {
                tracing::warn!(directive = %dir.name, "directive used in a template is not a class");
                continue;
            };
            let file = program.file(decl.file);
            let meta = TypeCtorMetadata {
                fn_name: "ngTypeCtor".to_string(),
                body: !file.is_declaration_file(),
                fields: TypeCtorFields {
                    inputs: dir.inputs.keys().cloned().collect(),
                    outputs: dir.outputs.keys().cloned().collect(),
                    queries: dir.queries.clone(),
                },
            };
            let text = generate_type_ctor(class, file, &meta)?;
            self.pending(decl.file).ops.push(Op {
                split_point: (class.range.end as usize).saturating_sub(1),
                text,
            });
        }

        let file = program.file(node.id.file);
        let name = node
            .name_text()
            .ok_or_else(|| anyhow::anyhow!("cannot type-check the template of an anonymous class"))?;
        let meta = TypeCheckBlockMetadata {
            fn_name: format!("{}_TypeCheckBlock", name),
        };
        let pending = self.pending(file.id);
        let text = generate_type_check_block(node, file, &meta, &bound, &mut pending.imports)?;
        pending.ops.push(Op {
            split_point: node.range.end as usize + 1,
            text: format!("{}\n", text),
        });
        tracing::debug!(component = name, file = %file.file_name, "added type check block");
        Ok(())
    }

    fn pending(&mut self, file: FileId) -> &mut PendingFile {
        self.files.entry(file).or_insert_with(PendingFile::new)
    }

    /// Files with type-checking code, in the order they were first touched.
    pub fn files(&self) -> impl Iterator<Item = FileId> + '_ {
        self.files.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The text of `file` with every operation recorded for it applied.
    pub fn transform(&self, file: FileId) -> anyhow::Result<String> {
        let source = self.program.file(file);
        let Some(pending) = self.files.get(&file) else {
            return Ok(source.text.clone());
        };
        let text = source.text.as_str();

        let mut ops: Vec<&Op> = pending.ops.iter().collect();
        ops.sort_by_key(|op| op.split_point);

        let mut code = String::with_capacity(text.len());
        let mut last = 0;
        for op in ops {
            let mut split = op.split_point.clamp(last, text.len());
            while !text.is_char_boundary(split) {
                split += 1;
            }
            code.push_str(&text[last..split]);
            code.push_str(&op.text);
            last = split;
        }
        code.push_str(&text[last..]);

        let imports = pending
            .imports
            .get_all_imports(&source.file_name)?
            .into_iter()
            .map(|import| format!("import * as {} from '{}';\n", import.qualifier, import.specifier))
            .collect::<String>();
        Ok(imports + &code)
    }

    /// Every file of the program as it should be handed to the type checker.
    pub fn transformed_files(&self) -> anyhow::Result<Vec<(String, String)>> {
        self.program
            .source_files()
            .iter()
            .map(|file| Ok((file.file_name.clone(), self.transform(file.id)?)))
            .collect()
    }
}
