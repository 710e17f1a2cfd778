//! ML Parser
//!
//! Builds the HTML node tree directly from source text. Interpolations are
//! kept intact inside text, so `{{ a < b }}` never opens a tag.

use std::sync::Arc;

use super::ast::*;
use super::tags::{decode_entity, get_content_type, is_void_element, TagContentType};
use crate::chars;
use crate::parse_util::{ParseError, ParseLocation, ParseSourceFile, ParseSourceSpan};

#[derive(Debug, Clone, PartialEq)]
pub struct ParseTreeResult {
    pub root_nodes: Vec<Node>,
    pub errors: Vec<ParseError>,
}

pub fn parse(source: &str, url: &str) -> ParseTreeResult {
    let file = Arc::new(ParseSourceFile::new(source, url));
    let mut builder = TreeBuilder {
        file,
        src: source,
        pos: 0,
        stack: Vec::new(),
        root_nodes: Vec::new(),
        errors: Vec::new(),
    };
    builder.build();
    ParseTreeResult {
        root_nodes: builder.root_nodes,
        errors: builder.errors,
    }
}

struct TreeBuilder<'a> {
    file: Arc<ParseSourceFile>,
    src: &'a str,
    pos: usize,
    stack: Vec<Element>,
    root_nodes: Vec<Node>,
    errors: Vec<ParseError>,
}

impl<'a> TreeBuilder<'a> {
    fn build(&mut self) {
        while self.pos < self.src.len() {
            if self.rest().starts_with("<!--") {
                self.consume_comment();
            } else if self.rest().starts_with("</") {
                self.consume_end_tag();
            } else if self.rest().starts_with("<!") {
                self.consume_doctype();
            } else if self.at_tag_start() {
                self.consume_start_tag();
            } else {
                self.consume_text();
            }
        }
        while let Some(mut el) = self.stack.pop() {
            el.source_span = self.span(el.source_span.start.offset, self.src.len());
            self.add_node(Node::Element(el));
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> char {
        self.rest().chars().next().unwrap_or(chars::EOF)
    }

    fn advance_char(&mut self) {
        if let Some(ch) = self.rest().chars().next() {
            self.pos += ch.len_utf8();
        }
    }

    fn at_tag_start(&self) -> bool {
        let mut it = self.rest().chars();
        it.next() == Some('<') && matches!(it.next(), Some(c) if chars::is_ascii_letter(c) || c == ':')
    }

    fn span(&self, start: usize, end: usize) -> ParseSourceSpan {
        ParseSourceSpan::new(
            ParseLocation::at_offset(self.file.clone(), start),
            ParseLocation::at_offset(self.file.clone(), end),
        )
    }

    fn error(&mut self, start: usize, end: usize, msg: impl Into<String>) {
        let span = self.span(start, end);
        self.errors.push(ParseError::new(span, msg));
    }

    fn add_node(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root_nodes.push(node),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.src.len() && chars::is_whitespace(self.peek()) {
            self.advance_char();
        }
    }

    fn consume_comment(&mut self) {
        let start = self.pos;
        let body_start = start + 4;
        match self.src[body_start..].find("-->") {
            Some(len) => {
                let value = self.src[body_start..body_start + len].trim().to_string();
                self.pos = body_start + len + 3;
                let source_span = self.span(start, self.pos);
                self.add_node(Node::Comment(Comment { value, source_span }));
            }
            None => {
                self.pos = self.src.len();
                self.error(start, self.pos, "Unexpected character \"EOF\"");
            }
        }
    }

    fn consume_doctype(&mut self) {
        match self.rest().find('>') {
            Some(len) => self.pos += len + 1,
            None => self.pos = self.src.len(),
        }
    }

    fn consume_text(&mut self) {
        let start = self.pos;
        let mut in_interpolation = false;
        while self.pos < self.src.len() {
            let rest = self.rest();
            if rest.starts_with("{{") {
                in_interpolation = true;
                self.pos += 2;
                continue;
            }
            if in_interpolation && rest.starts_with("}}") {
                in_interpolation = false;
                self.pos += 2;
                continue;
            }
            if !in_interpolation && (self.at_tag_start() || rest.starts_with("</") || rest.starts_with("<!")) {
                break;
            }
            self.advance_char();
        }
        if self.pos == start {
            // A lone `<` that starts nothing.
            self.advance_char();
        }
        let raw = &self.src[start..self.pos];
        let source_span = self.span(start, self.pos);
        self.add_text(decode_entities(raw), source_span);
    }

    fn add_text(&mut self, value: String, source_span: ParseSourceSpan) {
        // Adjacent text, e.g. around a stray `<`, is merged into one node.
        if let Some(Node::Text(prev)) = self.stack.last_mut().map_or(self.root_nodes.last_mut(), |p| p.children.last_mut()) {
            if prev.source_span.end.offset == source_span.start.offset {
                prev.value.push_str(&value);
                prev.source_span.end = source_span.end;
                return;
            }
        }
        self.add_node(Node::Text(Text { value, source_span }));
    }

    fn read_name(&mut self) -> &'a str {
        let start = self.pos;
        while self.pos < self.src.len() {
            let ch = self.peek();
            if chars::is_whitespace(ch) || ch == '>' || ch == '/' || ch == '=' || ch == '<' {
                break;
            }
            self.advance_char();
        }
        &self.src[start..self.pos]
    }

    fn consume_start_tag(&mut self) {
        let start = self.pos;
        self.pos += 1;
        let name = self.read_name().to_string();
        let mut attrs = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            if self.pos >= self.src.len() {
                self.error(start, self.pos, "Unexpected character \"EOF\"");
                break;
            }
            if self.rest().starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            }
            if self.peek() == '>' {
                self.pos += 1;
                break;
            }
            match self.consume_attribute() {
                Some(attr) => attrs.push(attr),
                None => {
                    let at = self.pos;
                    self.advance_char();
                    self.error(at, self.pos, format!("Unexpected character \"{}\"", &self.src[at..self.pos]));
                }
            }
        }

        let start_source_span = self.span(start, self.pos);
        let element = Element {
            name: name.clone(),
            attrs,
            children: Vec::new(),
            source_span: start_source_span.clone(),
            start_source_span,
            end_source_span: None,
        };

        if self_closing || is_void_element(&name) {
            self.add_node(Node::Element(element));
            return;
        }

        match get_content_type(&name) {
            TagContentType::ParsableData => self.stack.push(element),
            content_type => self.consume_raw_text(element, content_type),
        }
    }

    fn consume_attribute(&mut self) -> Option<Attribute> {
        let start = self.pos;
        let name = self.read_name();
        if name.is_empty() {
            return None;
        }
        let name_end = self.pos;
        self.skip_whitespace();
        if self.peek() != '=' {
            self.pos = name_end;
            return Some(Attribute {
                name: name.to_string(),
                value: String::new(),
                source_span: self.span(start, name_end),
                value_span: None,
            });
        }
        self.pos += 1;
        self.skip_whitespace();

        let quote = self.peek();
        let (value_start, value_end) = if quote == '"' || quote == '\'' {
            self.pos += 1;
            let value_start = self.pos;
            match self.rest().find(quote) {
                Some(len) => {
                    self.pos += len + 1;
                    (value_start, value_start + len)
                }
                None => {
                    self.pos = self.src.len();
                    self.error(start, self.pos, "Unexpected character \"EOF\"");
                    (value_start, self.pos)
                }
            }
        } else {
            let value_start = self.pos;
            while self.pos < self.src.len() && !chars::is_whitespace(self.peek()) && self.peek() != '>' {
                self.advance_char();
            }
            (value_start, self.pos)
        };

        Some(Attribute {
            name: name.to_string(),
            value: decode_entities(&self.src[value_start..value_end]),
            source_span: self.span(start, self.pos),
            value_span: Some(self.span(value_start, value_end)),
        })
    }

    fn consume_raw_text(&mut self, mut element: Element, content_type: TagContentType) {
        let text_start = self.pos;
        let closing = format!("</{}", element.name.to_ascii_lowercase());
        let text_end = self
            .rest()
            .to_ascii_lowercase()
            .find(&closing)
            .map(|len| text_start + len)
            .unwrap_or(self.src.len());
        if text_end > text_start {
            let raw = &self.src[text_start..text_end];
            let value = match content_type {
                TagContentType::EscapableRawText => decode_entities(raw),
                _ => raw.to_string(),
            };
            element.children.push(Node::Text(Text {
                value,
                source_span: self.span(text_start, text_end),
            }));
        }
        self.pos = text_end;
        self.stack.push(element);
        if self.pos < self.src.len() {
            self.consume_end_tag();
        }
    }

    fn consume_end_tag(&mut self) {
        let start = self.pos;
        self.pos += 2;
        let name = self.read_name().to_string();
        self.skip_whitespace();
        if self.peek() == '>' {
            self.pos += 1;
        } else {
            self.error(start, self.pos, format!("Unexpected character \"{}\"", self.peek()));
        }
        let end = self.pos;

        if is_void_element(&name) {
            self.error(start, end, format!("Void elements do not have end tags \"{}\"", name));
            return;
        }

        let matches_top = self
            .stack
            .last()
            .map_or(false, |el| el.name.eq_ignore_ascii_case(&name));
        if !matches_top {
            self.error(
                start,
                end,
                format!(
                    "Unexpected closing tag \"{}\". It may happen when the tag has already been closed by another tag.",
                    name
                ),
            );
            return;
        }
        if let Some(mut el) = self.stack.pop() {
            el.source_span = self.span(el.start_source_span.start.offset, end);
            el.end_source_span = Some(self.span(start, end));
            self.add_node(Node::Element(el));
        }
    }
}

/// Replaces character references like `&amp;` and `&#39;`. Unknown
/// references are kept verbatim.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|semi| *semi > 0 && *semi <= 32)
            .and_then(|semi| decode_entity(&after[..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(node: &Node) -> &Element {
        match node {
            Node::Element(el) => el,
            other => panic!("expected an element, got {:?}", other),
        }
    }

    #[test]
    fn should_parse_nested_elements_and_attributes() {
        let result = parse("<div class=\"a\" [title]='t'><span #ref>hi</span><br></div>", "t.html");
        assert!(result.errors.is_empty());
        let div = element(&result.root_nodes[0]);
        assert_eq!(div.name, "div");
        assert_eq!(div.attrs.len(), 2);
        assert_eq!(div.attrs[1].name, "[title]");
        assert_eq!(div.attrs[1].value, "t");
        assert_eq!(div.attrs[1].value_span.as_ref().unwrap().start.offset, 24);
        assert_eq!(div.children.len(), 2);
        let span = element(&div.children[0]);
        assert_eq!(span.attrs[0].name, "#ref");
        assert!(span.attrs[0].value_span.is_none());
        assert_eq!(element(&div.children[1]).name, "br");
        assert!(div.end_source_span.is_some());
    }

    #[test]
    fn should_keep_interpolations_intact() {
        let result = parse("<p>{{ a < b }} &amp; more</p>", "t.html");
        assert!(result.errors.is_empty());
        let p = element(&result.root_nodes[0]);
        match &p.children[0] {
            Node::Text(text) => assert_eq!(text.value, "{{ a < b }} & more"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn should_report_unexpected_closing_tags() {
        let result = parse("<div></span></div>", "t.html");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].msg.starts_with("Unexpected closing tag \"span\""));
        assert_eq!(result.root_nodes.len(), 1);
    }

    #[test]
    fn should_close_unclosed_elements_at_eof() {
        let result = parse("<div><p>text", "t.html");
        assert!(result.errors.is_empty());
        let div = element(&result.root_nodes[0]);
        assert_eq!(element(&div.children[0]).name, "p");
    }

    #[test]
    fn should_parse_comments_and_raw_text() {
        let result = parse("<!-- c --><style>a > b {}</style>", "t.html");
        assert!(matches!(&result.root_nodes[0], Node::Comment(c) if c.value == "c"));
        let style = element(&result.root_nodes[1]);
        assert!(matches!(&style.children[0], Node::Text(t) if t.value == "a > b {}"));
    }
}
