use crate::ngtsc::imports::R3SymbolsImportRewriter;
use crate::ngtsc::translator::{ImportManager, NamedImport, NamespaceImport};

#[test]
fn should_assign_one_qualifier_per_module() {
    let mut imports = ImportManager::with_default_prefix();
    let first = imports.generate_named_import("@angular/core", "ɵdefineComponent").unwrap();
    let second = imports.generate_named_import("./dir", "Dir").unwrap();
    let third = imports.generate_named_import("@angular/core", "ɵdefineDirective").unwrap();
    assert_eq!(
        first,
        NamedImport {
            module_import: Some("i0".into()),
            symbol: "ɵdefineComponent".into()
        }
    );
    assert_eq!(second.module_import.as_deref(), Some("i1"));
    assert_eq!(third.module_import.as_deref(), Some("i0"));

    let all = imports.get_all_imports("/app/cmp.ts").unwrap();
    assert_eq!(
        all,
        vec![
            NamespaceImport {
                specifier: "@angular/core".into(),
                qualifier: "i0".into()
            },
            NamespaceImport {
                specifier: "./dir".into(),
                qualifier: "i1".into()
            },
        ]
    );
}

#[test]
fn should_rewrite_core_imports_to_r3_symbols() {
    let rewriter = R3SymbolsImportRewriter::new("/core/src/r3_symbols.ts");
    let mut imports = ImportManager::new(Box::new(rewriter), "i");
    imports.generate_named_import("@angular/core", "defineInjectable").unwrap();
    let all = imports.get_all_imports("/core/src/di/service.ts").unwrap();
    assert_eq!(all[0].specifier, "../r3_symbols");
}

#[test]
fn should_reject_unsupported_symbols_inside_core() {
    let rewriter = R3SymbolsImportRewriter::new("/core/src/r3_symbols.ts");
    let mut imports = ImportManager::new(Box::new(rewriter), "i");
    let err = imports
        .generate_named_import("@angular/core", "ɵdefineComponent")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Importing unexpected symbol ɵdefineComponent while compiling core"
    );
    assert!(imports.is_empty());
}
