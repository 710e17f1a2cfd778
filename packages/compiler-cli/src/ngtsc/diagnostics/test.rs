use super::*;
use ts::TextRange;

#[test]
fn should_map_error_codes() {
    assert_eq!(ng_error_code(ErrorCode::DecoratorArgNotLiteral), -991001);
    assert_eq!(ng_error_code(ErrorCode::ComponentMissingTemplate), -992001);
    assert_eq!(ng_error_code(ErrorCode::DuplicateRegistration), -992006);
}

#[test]
fn should_replace_ts_with_ng() {
    let input = "\u{001b}[31mTS-991001: \u{001b}[0mError message";
    let expected = "\u{001b}[31mNG1001: \u{001b}[0mError message";
    assert_eq!(replace_ts_with_ng_in_errors(input), expected);
    assert_eq!(replace_ts_with_ng_in_errors("TS2304: plain"), "TS2304: plain");
}

#[test]
fn should_convert_fatal_errors_to_diagnostics() {
    let error = FatalDiagnosticError::new(
        ErrorCode::PipeMissingName,
        Some(SourceSpan::new("/app/pipe.ts", TextRange::new(10, 16))),
        "@Pipe decorator is missing name field",
    );
    let diagnostic = error.to_diagnostic();
    assert_eq!(diagnostic.code, -992002);
    assert_eq!(diagnostic.file.as_deref(), Some("/app/pipe.ts"));
    assert_eq!(diagnostic.start, Some(10));
    assert_eq!(diagnostic.length, Some(6));
    assert_eq!(diagnostic.message_text.to_string(), "@Pipe decorator is missing name field");
}

#[test]
fn should_keep_fatal_and_internal_errors_apart() {
    let result: HandlerResult<()> = fatal(ErrorCode::ValueNotLiteral, None, "not literal");
    assert!(matches!(result, Err(HandlerError::Fatal(_))));
    let internal: HandlerError = anyhow::anyhow!("unreachable node").into();
    assert!(matches!(internal, HandlerError::Internal(_)));
}
