// Path Utilities
//
// Posix path helpers for generated import specifiers.

use once_cell::sync::Lazy;
use regex::Regex;
use ts::path;

static TS_DTS_EXTENSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\.d)?\.ts$").unwrap());

/// Module specifier of `to` as imported from the file `from`. `None` when `to`
/// is the directory containing `from`.
pub fn relative_path_between(from: &str, to: &str) -> Option<String> {
    let relative = path::relative(&path::dirname(from), to);
    let relative = TS_DTS_EXTENSION.replace(&relative, "").into_owned();
    if relative.is_empty() {
        return None;
    }
    if relative.starts_with('.') {
        Some(relative)
    } else {
        Some(format!("./{}", relative))
    }
}

/// True if `name` can be written as a bare identifier.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
