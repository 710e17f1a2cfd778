// Import Manager
//
// Tracks the modules generated code imports from. Every module gets one
// namespace import `import * as i<N> from '<module>'` per output file, and
// symbols are referenced as `i<N>.<symbol>`.

use indexmap::IndexMap;

use crate::ngtsc::imports::{ImportRewriter, NoopImportRewriter};

/// How a symbol is referenced from generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImport {
    /// Namespace the symbol is read from, or `None` for a local symbol.
    pub module_import: Option<String>,
    pub symbol: String,
}

/// A namespace import that must be added to the output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceImport {
    pub specifier: String,
    pub qualifier: String,
}

pub struct ImportManager {
    rewriter: Box<dyn ImportRewriter>,
    prefix: String,
    module_to_qualifier: IndexMap<String, String>,
    next_index: usize,
}

impl ImportManager {
    pub fn new(rewriter: Box<dyn ImportRewriter>, prefix: impl Into<String>) -> Self {
        Self {
            rewriter,
            prefix: prefix.into(),
            module_to_qualifier: IndexMap::new(),
            next_index: 0,
        }
    }

    /// An import manager for a program that is not `@angular/core`.
    pub fn with_default_prefix() -> Self {
        Self::new(Box::new(NoopImportRewriter::new()), "i")
    }

    pub fn generate_named_import(&mut self, module_name: &str, original_symbol: &str) -> anyhow::Result<NamedImport> {
        let symbol = self.rewriter.rewrite_symbol(original_symbol, module_name)?;
        let qualifier = match self.module_to_qualifier.get(module_name) {
            Some(qualifier) => qualifier.clone(),
            None => {
                let qualifier = format!("{}{}", self.prefix, self.next_index);
                self.next_index += 1;
                self.module_to_qualifier
                    .insert(module_name.to_string(), qualifier.clone());
                qualifier
            }
        };
        Ok(NamedImport {
            module_import: Some(qualifier),
            symbol,
        })
    }

    /// Imports needed by everything generated so far, in first-use order,
    /// with specifiers rewritten for `context_path`.
    pub fn get_all_imports(&self, context_path: &str) -> anyhow::Result<Vec<NamespaceImport>> {
        self.module_to_qualifier
            .iter()
            .map(|(module, qualifier)| {
                Ok(NamespaceImport {
                    specifier: self.rewriter.rewrite_specifier(module, context_path)?,
                    qualifier: qualifier.clone(),
                })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.module_to_qualifier.is_empty()
    }
}
