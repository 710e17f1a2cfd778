//! HTML Whitespace Processing
//!
//! Removes and trims text nodes when a component does not preserve
//! whitespace:
//! - text nodes made only of whitespace are dropped;
//! - runs of whitespace in other text nodes collapse to one space;
//! - `&ngsp;` becomes a single space that is never removed.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ast::*;
use super::tags::NGSP_UNICODE;

pub const PRESERVE_WS_ATTR_NAME: &str = "ngPreserveWhitespaces";

const SKIP_WS_TRIM_TAGS: &[&str] = &["pre", "template", "textarea", "script", "style"];

// `\s` without the non-breaking space.
const WS_CHARS: &str = " \u{000C}\n\r\t\u{000B}\u{1680}\u{180E}\u{2000}\u{2001}\u{2002}\u{2003}\u{2004}\u{2005}\u{2006}\u{2007}\u{2008}\u{2009}\u{200A}\u{2028}\u{2029}\u{202F}\u{205F}\u{3000}\u{FEFF}";

static NO_WS_REGEXP: Lazy<Regex> = Lazy::new(|| Regex::new(&format!("[^{}]", regex::escape(WS_CHARS))).unwrap());

static WS_REPLACE_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("[{}]{{2,}}", regex::escape(WS_CHARS))).unwrap());

pub fn replace_ngsp(value: &str) -> String {
    value.replace(NGSP_UNICODE, " ")
}

pub fn remove_whitespaces(nodes: Vec<Node>) -> Vec<Node> {
    nodes.into_iter().filter_map(visit_node).collect()
}

fn visit_node(node: Node) -> Option<Node> {
    match node {
        Node::Element(mut element) => {
            let preserve = SKIP_WS_TRIM_TAGS.contains(&element.name.as_str())
                || element.attrs.iter().any(|a| a.name == PRESERVE_WS_ATTR_NAME);
            element.attrs.retain(|a| a.name != PRESERVE_WS_ATTR_NAME);
            if !preserve {
                element.children = remove_whitespaces(element.children);
            }
            Some(Node::Element(element))
        }
        Node::Text(mut text) => {
            let is_not_blank = NO_WS_REGEXP.is_match(&text.value);
            if !is_not_blank {
                return None;
            }
            text.value = replace_ngsp(&WS_REPLACE_REGEXP.replace_all(&text.value, " "));
            Some(Node::Text(text))
        }
        comment @ Node::Comment(_) => Some(comment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml_parser::parser::parse;

    fn texts(nodes: &[Node]) -> Vec<String> {
        let mut out = Vec::new();
        for node in nodes {
            match node {
                Node::Text(t) => out.push(t.value.clone()),
                Node::Element(el) => out.extend(texts(&el.children)),
                Node::Comment(_) => {}
            }
        }
        out
    }

    #[test]
    fn should_drop_blank_text_and_collapse_runs() {
        let nodes = remove_whitespaces(parse("<div>\n  <span>a   b</span>\n</div>", "t.html").root_nodes);
        assert_eq!(texts(&nodes), vec!["a b".to_string()]);
    }

    #[test]
    fn should_preserve_marked_elements() {
        let nodes = remove_whitespaces(parse("<pre>  x  </pre><p ngPreserveWhitespaces>  y  </p>", "t.html").root_nodes);
        assert_eq!(texts(&nodes), vec!["  x  ".to_string(), "  y  ".to_string()]);
        match &nodes[1] {
            Node::Element(p) => assert!(p.attrs.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn should_replace_ngsp() {
        let nodes = remove_whitespaces(parse("<b>a&ngsp;b</b>", "t.html").root_nodes);
        assert_eq!(texts(&nodes), vec!["a b".to_string()]);
    }
}
