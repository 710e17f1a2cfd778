// Core Import Rewriter Tests

use super::super::src::core::*;
use ts::testing::make_program;

#[test]
fn test_noop_import_rewriter() {
    let rewriter = NoopImportRewriter::new();
    assert_eq!(
        rewriter.rewrite_symbol("Injectable", "@angular/core").unwrap(),
        "Injectable"
    );
    assert_eq!(
        rewriter.rewrite_specifier("@angular/core", "/src/app.ts").unwrap(),
        "@angular/core"
    );
}

#[test]
fn test_r3_symbols_rewriter_ignores_other_modules() {
    let rewriter = R3SymbolsImportRewriter::new("/core/src/r3_symbols.ts");
    assert_eq!(
        rewriter.rewrite_symbol("SomeSymbol", "some-package").unwrap(),
        "SomeSymbol"
    );
    assert_eq!(
        rewriter.rewrite_specifier("some-package", "/core/src/di/injector.ts").unwrap(),
        "some-package"
    );
}

#[test]
fn test_r3_symbols_rewriter_redirects_core_to_r3_symbols() {
    let rewriter = R3SymbolsImportRewriter::new("/core/src/r3_symbols.ts");
    assert_eq!(
        rewriter.rewrite_specifier(CORE_MODULE, "/core/src/di/injector.ts").unwrap(),
        "../r3_symbols"
    );
    assert_eq!(
        rewriter.rewrite_symbol("defineInjectable", CORE_MODULE).unwrap(),
        "defineInjectable"
    );
}

#[test]
fn test_validate_and_rewrite_core_symbol_unknown() {
    let err = validate_and_rewrite_core_symbol("ɵdefineComponent").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Importing unexpected symbol ɵdefineComponent while compiling core"
    );
}

#[test]
fn test_is_angular_core_package() {
    let core = make_program(&[
        ("/core/src/r3_symbols.ts", "export const ITS_JUST_ANGULAR = true;"),
        ("/core/src/di.ts", "export class Injector {}"),
    ]);
    assert!(is_angular_core_package(&core));
    assert_eq!(
        get_r3_symbols_file(&core).map(|f| f.file_name.as_str()),
        Some("/core/src/r3_symbols.ts")
    );

    let not_exported = make_program(&[("/core/src/r3_symbols.ts", "const ITS_JUST_ANGULAR = true;")]);
    assert!(!is_angular_core_package(&not_exported));

    let app = make_program(&[("/app/main.ts", "export const ITS_JUST_ANGULAR = true;")]);
    assert!(!is_angular_core_package(&app));
}
