//! Translator
//!
//! Turns the output AST into TypeScript source text.

pub mod src {
    pub mod import_manager;
    pub mod translator;
    pub mod type_translator;
}

pub use src::import_manager::{ImportManager, NamedImport, NamespaceImport};
pub use src::translator::{translate_expression, translate_statement};
pub use src::type_translator::translate_type;

#[cfg(test)]
mod test;
