use once_cell::sync::Lazy;
use regex::Regex;

use super::error_code::ErrorCode;

static ERROR_CODE_MATCHER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\x1b\[\d+m ?)TS-99(\d+: ?\x1b\[\d+m)").unwrap());

/// During formatting of diagnostics, the numeric code of each diagnostic is prefixed with the
/// hard-coded "TS" prefix. Angular's own codes all start with "-99", so the sequence "TS-99" can
/// be replaced with "NG".
pub fn replace_ts_with_ng_in_errors(errors: &str) -> String {
    ERROR_CODE_MATCHER.replace_all(errors, "${1}NG${2}").into_owned()
}

/// `-99<code>`, e.g. `-991001` for `DecoratorArgNotLiteral`.
pub fn ng_error_code(code: ErrorCode) -> i32 {
    -(990_000 + code.code())
}
