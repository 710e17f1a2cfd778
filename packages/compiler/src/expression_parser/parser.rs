//! Angular Expression Parser
//!
//! Recursive descent parser for binding and action expressions,
//! `{{ }}` interpolations and `*directive` microsyntax.

use super::ast::*;
use super::lexer::{tokenize, Token};

const INTERPOLATION_START: &str = "{{";
const INTERPOLATION_END: &str = "}}";

/// Result of splitting an attribute value or text node on `{{ }}`.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitInterpolation {
    pub strings: Vec<String>,
    /// Expression text with its offset inside the input.
    pub expressions: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateBindingParseResult {
    pub bindings: Vec<TemplateBinding>,
    pub errors: Vec<ParserError>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Parser
    }

    /// Parses an event handler such as `save($event); dirty = false`.
    pub fn parse_action(&self, input: &str, location: &str, absolute_offset: usize) -> ASTWithSource {
        self.parse(input, location, absolute_offset, true)
    }

    /// Parses a property binding such as `user.name | uppercase`.
    pub fn parse_binding(&self, input: &str, location: &str, absolute_offset: usize) -> ASTWithSource {
        self.parse(input, location, absolute_offset, false)
    }

    fn parse(&self, input: &str, location: &str, absolute_offset: usize, parse_action: bool) -> ASTWithSource {
        let source = strip_comments(input);
        let mut errors = Vec::new();
        if let Some(err) = check_no_interpolation(input, location) {
            errors.push(err);
        }
        let mut parser = ParseAst::new(input, location, absolute_offset, tokenize(source), 0, source.len(), parse_action);
        let ast = match parser.parse_chain() {
            Ok(ast) => ast,
            Err(err) => {
                errors.push(err);
                parser.empty(0)
            }
        };
        ASTWithSource {
            ast,
            source: input.to_string(),
            location: location.to_string(),
            absolute_offset,
            errors,
        }
    }

    /// Parses text containing `{{ }}`. Returns `None` when there is no
    /// interpolation at all.
    pub fn parse_interpolation(&self, input: &str, location: &str, absolute_offset: usize) -> Option<ASTWithSource> {
        let split = split_interpolation(input)?;
        let mut errors = Vec::new();
        let mut expressions = Vec::new();

        for (text, offset) in &split.expressions {
            if text.trim().is_empty() {
                errors.push(ParserError::new(
                    "Blank expressions are not allowed in interpolated strings",
                    input,
                    &format!("at column {} in", offset),
                    location,
                ));
                expressions.push(AST::new(ParseSpan::new(*offset, *offset), absolute_offset, ASTKind::EmptyExpr));
                continue;
            }
            let source = strip_comments(text);
            let tokens = tokenize(source)
                .into_iter()
                .map(|mut t| {
                    t.index += offset;
                    t.end += offset;
                    t
                })
                .collect();
            let mut parser =
                ParseAst::new(input, location, absolute_offset, tokens, *offset, offset + source.len(), false);
            match parser.parse_chain() {
                Ok(ast) => expressions.push(ast),
                Err(err) => {
                    errors.push(err);
                    expressions.push(parser.empty(*offset));
                }
            }
        }

        let ast = AST::new(
            ParseSpan::new(0, input.len()),
            absolute_offset,
            ASTKind::Interpolation {
                strings: split.strings,
                expressions,
            },
        );
        Some(ASTWithSource {
            ast,
            source: input.to_string(),
            location: location.to_string(),
            absolute_offset,
            errors,
        })
    }

    /// Parses the value of `*tpl_key="..."`, e.g. `let item of items; trackBy: byId`.
    pub fn parse_template_bindings(
        &self,
        tpl_key: &str,
        input: &str,
        location: &str,
        absolute_offset: usize,
    ) -> TemplateBindingParseResult {
        let mut parser = ParseAst::new(input, location, absolute_offset, tokenize(input), 0, input.len(), false);
        let mut bindings = Vec::new();
        let mut errors = Vec::new();
        if let Err(err) = parser.parse_template_bindings(tpl_key, &mut bindings) {
            errors.push(err);
        }
        errors.extend(bindings.iter().filter_map(|b| b.expression.as_ref()).flat_map(|e| e.errors.clone()));
        TemplateBindingParseResult { bindings, errors }
    }
}

/// Splits `input` into literal strings and `{{ }}` expressions. An unclosed
/// `{{` is kept as literal text.
pub fn split_interpolation(input: &str) -> Option<SplitInterpolation> {
    let mut strings = Vec::new();
    let mut expressions = Vec::new();
    let mut pos = 0;
    let mut literal_start = 0;

    while let Some(found) = input[pos..].find(INTERPOLATION_START) {
        let start = pos + found;
        let expr_start = start + INTERPOLATION_START.len();
        match input[expr_start..].find(INTERPOLATION_END) {
            Some(len) => {
                strings.push(input[literal_start..start].to_string());
                expressions.push((input[expr_start..expr_start + len].to_string(), expr_start));
                pos = expr_start + len + INTERPOLATION_END.len();
                literal_start = pos;
            }
            None => break,
        }
    }

    if expressions.is_empty() {
        return None;
    }
    strings.push(input[literal_start..].to_string());
    Some(SplitInterpolation { strings, expressions })
}

fn check_no_interpolation(input: &str, location: &str) -> Option<ParserError> {
    let split = split_interpolation(input)?;
    let offset = split.expressions[0].1 - INTERPOLATION_START.len();
    Some(ParserError::new(
        "Got interpolation ({{}}) where expression was expected",
        input,
        &format!("at column {} in", offset),
        location,
    ))
}

/// Cuts a trailing `// comment` that is not inside a string literal.
fn strip_comments(input: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut prev = '\0';
    for (i, ch) in input.char_indices() {
        match quote {
            Some(q) if ch == q && prev != '\\' => quote = None,
            Some(_) => {}
            None if ch == '\'' || ch == '"' || ch == '`' => quote = Some(ch),
            None if ch == '/' && prev == '/' => return &input[..i - 1],
            None => {}
        }
        prev = ch;
    }
    input
}

// ============================================================================
// Recursive descent
// ============================================================================

struct ParseAst<'a> {
    input: &'a str,
    location: &'a str,
    absolute_offset: usize,
    tokens: Vec<Token>,
    input_length: usize,
    parse_action: bool,
    index: usize,
    /// Offset of the first token, used for spans of an empty stream.
    offset: usize,
}

type ParseResult<T> = Result<T, ParserError>;

impl<'a> ParseAst<'a> {
    fn new(
        input: &'a str,
        location: &'a str,
        absolute_offset: usize,
        tokens: Vec<Token>,
        offset: usize,
        input_length: usize,
        parse_action: bool,
    ) -> Self {
        ParseAst {
            input,
            location,
            absolute_offset,
            tokens,
            input_length,
            parse_action,
            index: 0,
            offset,
        }
    }

    fn next(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn at_eof(&self) -> bool {
        self.index >= self.tokens.len()
    }

    fn input_index(&self) -> usize {
        self.next().map(|t| t.index).unwrap_or(self.input_length)
    }

    fn last_end(&self) -> usize {
        if self.index == 0 {
            self.offset
        } else {
            self.tokens[self.index - 1].end
        }
    }

    fn span(&self, start: usize) -> ParseSpan {
        ParseSpan::new(start, self.last_end().max(start))
    }

    fn node(&self, start: usize, kind: ASTKind) -> AST {
        AST::new(self.span(start), self.absolute_offset, kind)
    }

    fn empty(&self, at: usize) -> AST {
        AST::new(ParseSpan::new(at, at), self.absolute_offset, ASTKind::EmptyExpr)
    }

    fn error(&self, message: impl Into<String>) -> ParserError {
        let err_location = match self.next() {
            Some(token) => format!("at column {} in", token.index + 1),
            None => "at the end of the expression".to_string(),
        };
        ParserError::new(message, self.input, &err_location, self.location)
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn optional_character(&mut self, ch: char) -> bool {
        if self.next().map_or(false, |t| t.is_character(ch)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn optional_operator(&mut self, op: &str) -> bool {
        if self.next().map_or(false, |t| t.is_operator(op)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.next().map_or(false, |t| t.is_keyword_named(keyword))
    }

    fn expect_character(&mut self, ch: char) -> ParseResult<()> {
        if self.optional_character(ch) {
            Ok(())
        } else {
            Err(self.error(format!("Missing expected {}", ch)))
        }
    }

    fn describe_next(&self) -> String {
        match self.next() {
            Some(token) if token.is_number() => token.num_value.to_string(),
            Some(token) => token.str_value.clone(),
            None => "EOF".to_string(),
        }
    }

    fn expect_identifier_or_keyword(&mut self) -> ParseResult<String> {
        match self.next() {
            Some(token) if token.is_identifier() || token.is_keyword() => {
                let name = token.str_value.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error(format!(
                "Unexpected token {}, expected identifier or keyword",
                self.describe_next()
            ))),
        }
    }

    fn expect_identifier_or_keyword_or_string(&mut self) -> ParseResult<String> {
        match self.next() {
            Some(token) if token.is_identifier() || token.is_keyword() || token.is_string() => {
                let name = token.str_value.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error(format!(
                "Unexpected token {}, expected identifier, keyword, or string",
                self.describe_next()
            ))),
        }
    }

    fn parse_chain(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let mut exprs = Vec::new();
        while !self.at_eof() {
            exprs.push(self.parse_pipe()?);
            if self.optional_character(';') {
                if !self.parse_action {
                    return Err(self.error("Binding expression cannot contain chained expression"));
                }
                while self.optional_character(';') {}
            } else if !self.at_eof() {
                return Err(self.error(format!("Unexpected token '{}'", self.describe_next())));
            }
        }
        Ok(match exprs.len() {
            0 => self.empty(start),
            1 => exprs.remove(0),
            _ => self.node(start, ASTKind::Chain(exprs)),
        })
    }

    fn parse_pipe(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let mut result = self.parse_expression()?;
        if self.optional_operator("|") {
            if self.parse_action {
                return Err(self.error("Cannot have a pipe in an action expression"));
            }
            loop {
                let name = self.expect_identifier_or_keyword()?;
                let mut args = Vec::new();
                while self.optional_character(':') {
                    args.push(self.parse_expression()?);
                }
                result = self.node(
                    start,
                    ASTKind::BindingPipe(BindingPipe {
                        exp: Box::new(result),
                        name,
                        args,
                    }),
                );
                if !self.optional_operator("|") {
                    break;
                }
            }
        }
        Ok(result)
    }

    fn parse_expression(&mut self) -> ParseResult<AST> {
        self.parse_conditional()
    }

    fn parse_conditional(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let result = self.parse_binary(0)?;
        if !self.optional_operator("?") {
            return Ok(result);
        }
        let true_exp = self.parse_pipe()?;
        if !self.optional_character(':') {
            let end = self.input_index().min(self.input.len());
            let expression = self.input.get(start..end).unwrap_or_default().to_string();
            return Err(self.error(format!(
                "Conditional expression {} requires all 3 expressions",
                expression
            )));
        }
        let false_exp = self.parse_pipe()?;
        Ok(self.node(
            start,
            ASTKind::Conditional {
                condition: Box::new(result),
                true_exp: Box::new(true_exp),
                false_exp: Box::new(false_exp),
            },
        ))
    }

    fn parse_binary(&mut self, level: usize) -> ParseResult<AST> {
        const LEVELS: &[&[&str]] = &[
            &["||"],
            &["&&"],
            &["==", "!=", "===", "!=="],
            &["<", ">", "<=", ">="],
            &["+", "-"],
            &["*", "%", "/"],
        ];
        if level >= LEVELS.len() {
            return self.parse_prefix();
        }
        let start = self.input_index();
        let mut result = self.parse_binary(level + 1)?;
        loop {
            let operator = LEVELS[level]
                .iter()
                .find(|op| self.next().map_or(false, |t| t.is_operator(op)));
            let Some(operator) = operator else {
                return Ok(result);
            };
            self.advance();
            let right = self.parse_binary(level + 1)?;
            result = self.node(
                start,
                ASTKind::Binary {
                    operation: operator.to_string(),
                    left: Box::new(result),
                    right: Box::new(right),
                },
            );
        }
    }

    fn parse_prefix(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let zero = || LiteralValue::Number(0.0);
        if self.optional_operator("+") {
            let operand = self.parse_prefix()?;
            let literal = AST::new(ParseSpan::new(start, start), self.absolute_offset, ASTKind::LiteralPrimitive(zero()));
            return Ok(self.node(
                start,
                ASTKind::Binary {
                    operation: "-".to_string(),
                    left: Box::new(operand),
                    right: Box::new(literal),
                },
            ));
        }
        if self.optional_operator("-") {
            let operand = self.parse_prefix()?;
            let literal = AST::new(ParseSpan::new(start, start), self.absolute_offset, ASTKind::LiteralPrimitive(zero()));
            return Ok(self.node(
                start,
                ASTKind::Binary {
                    operation: "-".to_string(),
                    left: Box::new(literal),
                    right: Box::new(operand),
                },
            ));
        }
        if self.optional_operator("!") {
            let operand = self.parse_prefix()?;
            return Ok(self.node(start, ASTKind::PrefixNot(Box::new(operand))));
        }
        self.parse_call_chain()
    }

    fn parse_call_chain(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let mut result = self.parse_primary()?;
        loop {
            if self.optional_character('.') {
                result = self.parse_access_member_or_method_call(result, false, start)?;
            } else if self.optional_operator("?.") {
                result = self.parse_access_member_or_method_call(result, true, start)?;
            } else if self.optional_character('[') {
                let key = self.parse_pipe()?;
                self.expect_character(']')?;
                if self.optional_operator("=") {
                    let value = self.parse_conditional()?;
                    result = self.node(
                        start,
                        ASTKind::KeyedWrite(KeyedWrite {
                            obj: Box::new(result),
                            key: Box::new(key),
                            value: Box::new(value),
                        }),
                    );
                } else {
                    result = self.node(
                        start,
                        ASTKind::KeyedRead(KeyedRead {
                            obj: Box::new(result),
                            key: Box::new(key),
                        }),
                    );
                }
            } else if self.optional_character('(') {
                let args = self.parse_call_arguments()?;
                self.expect_character(')')?;
                result = self.node(
                    start,
                    ASTKind::FunctionCall {
                        target: Box::new(result),
                        args,
                    },
                );
            } else if self.optional_operator("!") {
                result = self.node(start, ASTKind::NonNullAssert(Box::new(result)));
            } else {
                return Ok(result);
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        let Some(token) = self.next().cloned() else {
            return Err(self.error(format!("Unexpected end of expression: {}", self.input)));
        };

        if token.is_character('(') {
            self.advance();
            let result = self.parse_pipe()?;
            self.expect_character(')')?;
            return Ok(result);
        }
        if token.is_keyword() {
            let value = match token.str_value.as_str() {
                "null" => Some(LiteralValue::Null),
                "undefined" => Some(LiteralValue::Undefined),
                "true" => Some(LiteralValue::Bool(true)),
                "false" => Some(LiteralValue::Bool(false)),
                _ => None,
            };
            if let Some(value) = value {
                self.advance();
                return Ok(self.node(start, ASTKind::LiteralPrimitive(value)));
            }
            if token.str_value == "this" {
                self.advance();
                return Ok(self.node(start, ASTKind::ImplicitReceiver));
            }
        }
        if token.is_character('[') {
            self.advance();
            let elements = self.parse_expression_list(']')?;
            self.expect_character(']')?;
            return Ok(self.node(start, ASTKind::LiteralArray(elements)));
        }
        if token.is_character('{') {
            return self.parse_literal_map();
        }
        if token.is_identifier() {
            let receiver = AST::new(ParseSpan::new(start, start), self.absolute_offset, ASTKind::ImplicitReceiver);
            return self.parse_access_member_or_method_call(receiver, false, start);
        }
        if token.is_number() {
            self.advance();
            return Ok(self.node(start, ASTKind::LiteralPrimitive(LiteralValue::Number(token.num_value))));
        }
        if token.is_string() {
            self.advance();
            return Ok(self.node(start, ASTKind::LiteralPrimitive(LiteralValue::String(token.str_value))));
        }
        if token.is_error() {
            return Err(self.error(token.str_value));
        }
        Err(self.error(format!("Unexpected token {}", self.describe_next())))
    }

    fn parse_expression_list(&mut self, terminator: char) -> ParseResult<Vec<AST>> {
        let mut result = Vec::new();
        if self.next().map_or(false, |t| !t.is_character(terminator)) {
            loop {
                result.push(self.parse_pipe()?);
                if !self.optional_character(',') {
                    break;
                }
            }
        }
        Ok(result)
    }

    fn parse_literal_map(&mut self) -> ParseResult<AST> {
        let start = self.input_index();
        self.expect_character('{')?;
        let mut keys = Vec::new();
        let mut values = Vec::new();
        if !self.optional_character('}') {
            loop {
                let quoted = self.next().map_or(false, |t| t.is_string());
                let key = self.expect_identifier_or_keyword_or_string()?;
                keys.push(LiteralMapKey { key, quoted });
                self.expect_character(':')?;
                values.push(self.parse_pipe()?);
                if !self.optional_character(',') {
                    break;
                }
            }
            self.expect_character('}')?;
        }
        Ok(self.node(start, ASTKind::LiteralMap { keys, values }))
    }

    fn parse_access_member_or_method_call(&mut self, receiver: AST, is_safe: bool, start: usize) -> ParseResult<AST> {
        let name = self.expect_identifier_or_keyword()?;

        if self.optional_character('(') {
            let args = self.parse_call_arguments()?;
            self.expect_character(')')?;
            let call = MethodCall {
                receiver: Box::new(receiver),
                name,
                args,
            };
            let kind = if is_safe {
                ASTKind::SafeMethodCall(call)
            } else {
                ASTKind::MethodCall(call)
            };
            return Ok(self.node(start, kind));
        }

        if is_safe {
            if self.optional_operator("=") {
                return Err(self.error("The '?.' operator cannot be used in the assignment"));
            }
            return Ok(self.node(
                start,
                ASTKind::SafePropertyRead(PropertyRead {
                    receiver: Box::new(receiver),
                    name,
                }),
            ));
        }

        if self.optional_operator("=") {
            if !self.parse_action {
                return Err(self.error("Bindings cannot contain assignments"));
            }
            let value = self.parse_conditional()?;
            return Ok(self.node(
                start,
                ASTKind::PropertyWrite(PropertyWrite {
                    receiver: Box::new(receiver),
                    name,
                    value: Box::new(value),
                }),
            ));
        }

        Ok(self.node(
            start,
            ASTKind::PropertyRead(PropertyRead {
                receiver: Box::new(receiver),
                name,
            }),
        ))
    }

    fn parse_call_arguments(&mut self) -> ParseResult<Vec<AST>> {
        let mut args = Vec::new();
        if self.next().map_or(false, |t| t.is_character(')')) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_pipe()?);
            if !self.optional_character(',') {
                break;
            }
        }
        Ok(args)
    }

    /// Keys may contain dashes, e.g. `ng-for`.
    fn expect_template_binding_key(&mut self) -> ParseResult<String> {
        let mut result = String::new();
        loop {
            result.push_str(&self.expect_identifier_or_keyword()?);
            if !self.optional_operator("-") {
                return Ok(result);
            }
            result.push('-');
        }
    }

    fn parse_template_bindings(&mut self, tpl_key: &str, bindings: &mut Vec<TemplateBinding>) -> ParseResult<()> {
        let mut first_binding = true;
        loop {
            let start = self.input_index();
            let raw_key;
            let mut key;
            let mut key_is_var = false;

            if first_binding {
                raw_key = tpl_key.to_string();
                key = tpl_key.to_string();
                first_binding = false;
            } else {
                key_is_var = self.peek_keyword("let");
                if key_is_var {
                    self.advance();
                }
                raw_key = self.expect_template_binding_key()?;
                key = if key_is_var {
                    raw_key.clone()
                } else {
                    format!("{}{}", tpl_key, capitalize(&raw_key))
                };
                self.optional_character(':');
            }

            let mut name = None;
            let mut expression = None;
            if key_is_var {
                name = Some(if self.optional_operator("=") {
                    self.expect_template_binding_key()?
                } else {
                    "$implicit".to_string()
                });
            } else if self.peek_keyword("as") {
                self.advance();
                name = Some(raw_key);
                key = self.expect_template_binding_key()?;
                key_is_var = true;
            } else if !self.at_eof() && !self.peek_keyword("let") {
                let expr_start = self.input_index();
                let ast = self.parse_pipe()?;
                let end = self.last_end();
                expression = Some(ASTWithSource {
                    ast,
                    source: self.input.get(expr_start..end).unwrap_or_default().to_string(),
                    location: self.location.to_string(),
                    absolute_offset: self.absolute_offset + expr_start,
                    errors: Vec::new(),
                });
            }

            bindings.push(TemplateBinding {
                span: self.span(start),
                key: key.clone(),
                key_is_var,
                name,
                expression,
            });

            if self.peek_keyword("as") && !key_is_var {
                let let_start = self.input_index();
                self.advance();
                let let_name = self.expect_template_binding_key()?;
                bindings.push(TemplateBinding {
                    span: self.span(let_start),
                    key: let_name,
                    key_is_var: true,
                    name: Some(key),
                    expression: None,
                });
            }

            if !self.optional_character(';') {
                self.optional_character(',');
            }
            if self.at_eof() {
                return Ok(());
            }
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
