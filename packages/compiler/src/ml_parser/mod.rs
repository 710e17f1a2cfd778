//! ML (Markup Language) Parser Module
//!
//! HTML parsing for component templates.

pub mod ast;
pub mod html_parser;
pub mod html_whitespaces;
pub mod parser;
pub mod tags;

pub use ast::*;
pub use html_parser::HtmlParser;
pub use html_whitespaces::{remove_whitespaces, PRESERVE_WS_ATTR_NAME};
pub use parser::ParseTreeResult;
