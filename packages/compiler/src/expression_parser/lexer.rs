//! Angular Expression Lexer
//!
//! Tokenizes template expressions such as `items | slice:0:3` or
//! `user?.name`.

use crate::chars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Character,
    Identifier,
    Keyword,
    String,
    Operator,
    Number,
    Error,
}

const KEYWORDS: &[&str] = &["var", "let", "as", "null", "undefined", "true", "false", "if", "else", "this"];

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub index: usize,
    pub end: usize,
    pub token_type: TokenType,
    pub num_value: f64,
    pub str_value: String,
}

impl Token {
    fn new(index: usize, end: usize, token_type: TokenType, str_value: impl Into<String>) -> Self {
        Token {
            index,
            end,
            token_type,
            num_value: 0.0,
            str_value: str_value.into(),
        }
    }

    pub fn is_character(&self, ch: char) -> bool {
        self.token_type == TokenType::Character && self.str_value.starts_with(ch)
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.token_type == TokenType::Operator && self.str_value == op
    }

    pub fn is_identifier(&self) -> bool {
        self.token_type == TokenType::Identifier
    }

    pub fn is_keyword(&self) -> bool {
        self.token_type == TokenType::Keyword
    }

    pub fn is_keyword_named(&self, keyword: &str) -> bool {
        self.is_keyword() && self.str_value == keyword
    }

    pub fn is_string(&self) -> bool {
        self.token_type == TokenType::String
    }

    pub fn is_number(&self) -> bool {
        self.token_type == TokenType::Number
    }

    pub fn is_error(&self) -> bool {
        self.token_type == TokenType::Error
    }
}

/// Splits `input` into tokens. Offsets are byte offsets into `input`.
/// A lexing error ends the stream with an `Error` token.
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut scanner = Scanner {
        input,
        chars: input.char_indices().collect(),
        pos: 0,
    };
    let mut tokens = Vec::new();
    while let Some(token) = scanner.scan_token() {
        let is_error = token.is_error();
        tokens.push(token);
        if is_error {
            break;
        }
    }
    tokens
}

struct Scanner<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn peek_at(&self, pos: usize) -> char {
        self.chars.get(pos).map(|(_, c)| *c).unwrap_or(chars::EOF)
    }

    fn peek(&self) -> char {
        self.peek_at(self.pos)
    }

    fn offset(&self, pos: usize) -> usize {
        self.chars.get(pos).map(|(i, _)| *i).unwrap_or(self.input.len())
    }

    fn scan_token(&mut self) -> Option<Token> {
        while self.pos < self.chars.len() && chars::is_whitespace(self.peek()) {
            self.pos += 1;
        }
        if self.pos >= self.chars.len() {
            return None;
        }
        let start = self.pos;
        let ch = self.peek();

        if chars::is_identifier_start(ch) {
            return Some(self.scan_identifier());
        }
        if chars::is_digit(ch) || (ch == '.' && chars::is_digit(self.peek_at(start + 1))) {
            return Some(self.scan_number());
        }

        let token = match ch {
            '(' | ')' | '{' | '}' | '[' | ']' | ',' | ':' | ';' | '.' => {
                self.pos += 1;
                self.make(start, TokenType::Character, ch.to_string())
            }
            '\'' | '"' => return Some(self.scan_string(ch)),
            '?' if self.peek_at(start + 1) == '.' => {
                self.pos += 2;
                self.make(start, TokenType::Operator, "?.")
            }
            '+' | '-' | '*' | '/' | '%' | '^' | '?' => {
                self.pos += 1;
                self.make(start, TokenType::Operator, ch.to_string())
            }
            '<' | '>' => self.scan_complex_operator(start, ch, '=', None),
            '!' | '=' => self.scan_complex_operator(start, ch, '=', Some('=')),
            '&' => self.scan_complex_operator(start, '&', '&', None),
            '|' => self.scan_complex_operator(start, '|', '|', None),
            _ => {
                self.pos = self.chars.len();
                return Some(self.error(start, format!("Unexpected character [{}]", ch)));
            }
        };
        Some(token)
    }

    fn make(&self, start: usize, token_type: TokenType, text: impl Into<String>) -> Token {
        Token::new(self.offset(start), self.offset(self.pos), token_type, text)
    }

    fn error(&self, start: usize, message: String) -> Token {
        let index = self.offset(start);
        Token::new(
            index,
            index,
            TokenType::Error,
            format!("Lexer Error: {} at column {} in expression [{}]", message, index, self.input),
        )
    }

    fn scan_complex_operator(&mut self, start: usize, first: char, second: char, third: Option<char>) -> Token {
        self.pos += 1;
        let mut op = first.to_string();
        if self.peek() == second {
            self.pos += 1;
            op.push(second);
            if let Some(third) = third {
                if self.peek() == third {
                    self.pos += 1;
                    op.push(third);
                }
            }
        }
        self.make(start, TokenType::Operator, op)
    }

    fn scan_identifier(&mut self) -> Token {
        let start = self.pos;
        self.pos += 1;
        while chars::is_identifier_part(self.peek()) {
            self.pos += 1;
        }
        let text = &self.input[self.offset(start)..self.offset(self.pos)];
        let token_type = if KEYWORDS.contains(&text) {
            TokenType::Keyword
        } else {
            TokenType::Identifier
        };
        self.make(start, token_type, text)
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        let mut simple = true;
        loop {
            let ch = self.peek();
            if chars::is_digit(ch) {
                // digits
            } else if ch == '.' {
                simple = false;
            } else if ch == 'e' || ch == 'E' {
                self.pos += 1;
                if matches!(self.peek(), '+' | '-') {
                    self.pos += 1;
                }
                if !chars::is_digit(self.peek()) {
                    return self.error(self.pos, "Invalid exponent".to_string());
                }
                simple = false;
            } else {
                break;
            }
            self.pos += 1;
        }
        let text = &self.input[self.offset(start)..self.offset(self.pos)];
        let value = if simple {
            text.parse::<u64>().map(|v| v as f64).unwrap_or(f64::NAN)
        } else {
            text.parse::<f64>().unwrap_or(f64::NAN)
        };
        let mut token = self.make(start, TokenType::Number, "");
        token.num_value = value;
        token
    }

    fn scan_string(&mut self, quote: char) -> Token {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            let ch = self.peek();
            if self.pos >= self.chars.len() {
                return self.error(start, "Unterminated quote".to_string());
            }
            if ch == quote {
                self.pos += 1;
                break;
            }
            if ch == '\\' {
                self.pos += 1;
                let escaped = self.peek();
                let unescaped = match escaped {
                    'n' => '\n',
                    'f' => '\x0C',
                    'r' => '\r',
                    't' => '\t',
                    'v' => '\x0B',
                    'u' => {
                        let hex: String = (1..=4).map(|i| self.peek_at(self.pos + i)).collect();
                        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            Some(c) => {
                                self.pos += 4;
                                c
                            }
                            None => return self.error(self.pos, format!("Invalid unicode escape [\\u{}]", hex)),
                        }
                    }
                    other => other,
                };
                value.push(unescaped);
                self.pos += 1;
                continue;
            }
            value.push(ch);
            self.pos += 1;
        }
        self.make(start, TokenType::String, value)
    }
}
