//! References - pointers to declarations found during static analysis
//!
//! A `Reference` records a declaration together with how it was reached. A
//! declaration reached through a bare module specifier (`@angular/core`,
//! `@angular/common`) is `Absolute` and is imported from that module when
//! written into generated code. Anything else is imported by relative path
//! from the file it is declared in.

use std::hash::{Hash, Hasher};

use angular_compiler::output::output_ast::{import_expr, wrapped, Expression, ExternalReference};
use ts::DeclId;

use crate::ngtsc::util::relative_path_between;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceKind {
    /// Declared inside the program and reached by relative imports.
    Resolved,
    /// Reached through `module_name`, which exports it as `symbol_name`.
    Absolute {
        module_name: String,
        symbol_name: String,
    },
}

/// A declaration extracted from the program.
///
/// Equality and hashing only consider the declaration, so the same class
/// reached along two import paths is one reference.
#[derive(Debug, Clone)]
pub struct Reference {
    pub decl: DeclId,
    pub name: String,
    /// File the declaration lives in.
    pub file_name: String,
    pub kind: ReferenceKind,
}

impl Reference {
    pub fn resolved(decl: DeclId, name: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            decl,
            name: name.into(),
            file_name: file_name.into(),
            kind: ReferenceKind::Resolved,
        }
    }

    pub fn absolute(
        decl: DeclId,
        name: impl Into<String>,
        file_name: impl Into<String>,
        module_name: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let module_name = module_name.into();
        debug_assert!(!module_name.is_empty(), "absolute reference to {} without a module", name);
        Self {
            decl,
            file_name: file_name.into(),
            kind: ReferenceKind::Absolute {
                module_name,
                symbol_name: name.clone(),
            },
            name,
        }
    }

    /// Module that owns this reference, if it was reached through one.
    pub fn module_name(&self) -> Option<&str> {
        match &self.kind {
            ReferenceKind::Absolute { module_name, .. } => Some(module_name),
            ReferenceKind::Resolved => None,
        }
    }

    pub fn is_absolute(&self) -> bool {
        matches!(self.kind, ReferenceKind::Absolute { .. })
    }

    /// True if this is `symbol` exported by `module`.
    pub fn is_symbol_of(&self, module: &str, symbol: &str) -> bool {
        matches!(
            &self.kind,
            ReferenceKind::Absolute { module_name, symbol_name } if module_name == module && symbol_name == symbol
        )
    }

    /// An expression that refers to the declaration from `context_file`.
    pub fn to_expression(&self, context_file: &str) -> Expression {
        match &self.kind {
            ReferenceKind::Absolute {
                module_name,
                symbol_name,
            } => import_expr(ExternalReference::new(module_name.as_str(), symbol_name.as_str())),
            ReferenceKind::Resolved if self.file_name == context_file => wrapped(self.name.as_str()),
            ReferenceKind::Resolved => match relative_path_between(context_file, &self.file_name) {
                Some(module) => import_expr(ExternalReference::new(module, self.name.as_str())),
                None => wrapped(self.name.as_str()),
            },
        }
    }

    /// A copy of this reference owned by `module_name`, used for references
    /// found inside declarations that were themselves reached through it.
    pub fn owned_by(mut self, module_name: Option<&str>) -> Self {
        if let (ReferenceKind::Resolved, Some(module)) = (&self.kind, module_name) {
            self.kind = ReferenceKind::Absolute {
                module_name: module.to_string(),
                symbol_name: self.name.clone(),
            };
        }
        self
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.decl == other.decl
    }
}

impl Eq for Reference {}

impl Hash for Reference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.decl.hash(state);
    }
}
