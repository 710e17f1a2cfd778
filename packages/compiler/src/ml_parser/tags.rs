//! ML Parser Tags
//!
//! Tag classification and named character references used by the HTML parser.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagContentType {
    RawText,
    EscapableRawText,
    ParsableData,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

pub fn get_content_type(name: &str) -> TagContentType {
    match name.to_ascii_lowercase().as_str() {
        "script" | "style" => TagContentType::RawText,
        "textarea" | "title" => TagContentType::EscapableRawText,
        _ => TagContentType::ParsableData,
    }
}

pub fn is_ng_template(name: &str) -> bool {
    name == "ng-template"
}

/// `&ngsp;` stands for a space that whitespace removal must keep.
pub const NGSP_UNICODE: char = '\u{E500}';

/// Decodes a named or numeric character reference body such as `amp`,
/// `#39` or `#x27`.
pub fn decode_entity(name: &str) -> Option<char> {
    if let Some(numeric) = name.strip_prefix('#') {
        let code = match numeric.strip_prefix('x').or_else(|| numeric.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "copy" => '\u{00A9}',
        "reg" => '\u{00AE}',
        "hellip" => '\u{2026}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "laquo" => '\u{00AB}',
        "raquo" => '\u{00BB}',
        "times" => '\u{00D7}',
        "ngsp" => NGSP_UNICODE,
        _ => return None,
    };
    Some(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_classify_tags() {
        assert!(is_void_element("br"));
        assert!(is_void_element("INPUT"));
        assert!(!is_void_element("div"));
        assert_eq!(get_content_type("style"), TagContentType::RawText);
    }

    #[test]
    fn should_decode_entities() {
        assert_eq!(decode_entity("amp"), Some('&'));
        assert_eq!(decode_entity("#39"), Some('\''));
        assert_eq!(decode_entity("#x41"), Some('A'));
        assert_eq!(decode_entity("bogus"), None);
    }
}
