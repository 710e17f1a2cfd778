//! HTML Parser
//!
//! Entry point over the tree builder that applies whitespace removal.

use super::html_whitespaces::remove_whitespaces;
use super::parser::{parse, ParseTreeResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        HtmlParser
    }

    /// Parses `source`. Unless `preserve_whitespaces` is set, blank text is
    /// dropped and whitespace runs collapsed.
    pub fn parse(&self, source: &str, url: &str, preserve_whitespaces: bool) -> ParseTreeResult {
        let result = parse(source, url);
        if preserve_whitespaces {
            return result;
        }
        ParseTreeResult {
            root_nodes: remove_whitespaces(result.root_nodes),
            errors: result.errors,
        }
    }
}
