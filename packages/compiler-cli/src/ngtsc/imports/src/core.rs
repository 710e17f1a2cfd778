// Core - Import rewriting utilities
//
// When the program being compiled is `@angular/core` itself, generated code
// cannot import from '@angular/core'. Such imports are redirected to the
// package's `r3_symbols.ts` file, which re-exports the runtime symbols that
// definitions may reference.

use anyhow::{anyhow, bail};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use ts::{ExpressionKind, ModifierFlags, Program, SourceFile, StatementKind};

use crate::ngtsc::util::relative_path_between;

pub const CORE_MODULE: &str = "@angular/core";

const R3_SYMBOLS_FILE: &str = "r3_symbols.ts";

/// Rewrites imports of symbols being written into generated code.
pub trait ImportRewriter: Send + Sync {
    /// Name under which `symbol` from `specifier` is imported.
    fn rewrite_symbol(&self, symbol: &str, specifier: &str) -> anyhow::Result<String>;

    /// Module specifier to import `specifier` by from `in_context_of_file`.
    fn rewrite_specifier(&self, specifier: &str, in_context_of_file: &str) -> anyhow::Result<String>;
}

/// `ImportRewriter` that does no rewriting.
#[derive(Debug, Clone, Default)]
pub struct NoopImportRewriter;

impl NoopImportRewriter {
    pub fn new() -> Self {
        Self
    }
}

impl ImportRewriter for NoopImportRewriter {
    fn rewrite_symbol(&self, symbol: &str, _specifier: &str) -> anyhow::Result<String> {
        Ok(symbol.to_string())
    }

    fn rewrite_specifier(&self, specifier: &str, _in_context_of_file: &str) -> anyhow::Result<String> {
        Ok(specifier.to_string())
    }
}

/// Symbols of @angular/core that generated code may import while compiling
/// core itself.
static CORE_SUPPORTED_SYMBOLS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "defineInjectable",
        "defineInjector",
        "ɵdefineNgModule",
        "inject",
        "ɵsetClassMetadata",
        "InjectableDef",
        "ɵInjectorDef",
        "ɵNgModuleDefWithMeta",
        "ɵNgModuleFactory",
    ]
    .into_iter()
    .collect()
});

/// `ImportRewriter` that rewrites imports from '@angular/core' to be imported
/// from the r3_symbols.ts file instead.
#[derive(Debug, Clone)]
pub struct R3SymbolsImportRewriter {
    r3_symbols_path: String,
}

impl R3SymbolsImportRewriter {
    pub fn new(r3_symbols_path: impl Into<String>) -> Self {
        Self {
            r3_symbols_path: r3_symbols_path.into(),
        }
    }
}

impl ImportRewriter for R3SymbolsImportRewriter {
    fn rewrite_symbol(&self, symbol: &str, specifier: &str) -> anyhow::Result<String> {
        if specifier != CORE_MODULE {
            return Ok(symbol.to_string());
        }
        validate_and_rewrite_core_symbol(symbol)
    }

    fn rewrite_specifier(&self, specifier: &str, in_context_of_file: &str) -> anyhow::Result<String> {
        if specifier != CORE_MODULE {
            return Ok(specifier.to_string());
        }
        relative_path_between(in_context_of_file, &self.r3_symbols_path).ok_or_else(|| {
            anyhow!(
                "Failed to rewrite import inside core: {} -> {}",
                in_context_of_file,
                self.r3_symbols_path
            )
        })
    }
}

/// Validate that a symbol may be imported while compiling core.
pub fn validate_and_rewrite_core_symbol(name: &str) -> anyhow::Result<String> {
    if !CORE_SUPPORTED_SYMBOLS.contains(name) {
        bail!("Importing unexpected symbol {} while compiling core", name);
    }
    Ok(name.to_string())
}

/// The `r3_symbols.ts` file of the program, if there is one.
pub fn get_r3_symbols_file(program: &Program) -> Option<&SourceFile> {
    program
        .source_files()
        .iter()
        .find(|file| file.file_name.contains(R3_SYMBOLS_FILE))
}

/// The program is @angular/core when its r3_symbols file declares
/// `export const ITS_JUST_ANGULAR = true`.
pub fn is_angular_core_package(program: &Program) -> bool {
    let Some(r3_symbols) = get_r3_symbols_file(program) else {
        return false;
    };
    r3_symbols.statements.iter().any(|statement| {
        let StatementKind::Variable(variable) = &statement.kind else {
            return false;
        };
        variable.modifiers.contains(ModifierFlags::EXPORT)
            && variable.declarations.iter().any(|decl| {
                decl.name.text == "ITS_JUST_ANGULAR"
                    && matches!(
                        decl.initializer.as_ref().map(|init| &init.kind),
                        Some(ExpressionKind::True)
                    )
            })
    })
}
