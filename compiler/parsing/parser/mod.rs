use crate::lexer::{Keyword, Symbol, Token, TokenKind};
use compiler__diagnostics::{Diagnostic, ErrorCode};
use compiler__source::Span;
use compiler__syntax::{Module, Package};

mod recovery;
mod rules;
mod terms;

#[derive(Clone, Debug)]
pub(super) enum InvalidConstructKind {
    DefaultRuleRequiresValue,
    DefaultRuleMustNotHaveBody,
    DefaultRuleMustNotHaveArguments,
    DefaultRuleMustNotHaveKey,
    RuleRequiresValueOrBody { name: String },
    PartialRuleMustUseUnify,
    EmptyBody,
    InvalidFunctionName,
    NestingTooDeep,
}

#[derive(Clone, Debug)]
pub(super) enum ParseError {
    UnexpectedToken {
        expected: &'static str,
        found: TokenKind,
        span: Span,
    },
    InvalidConstruct {
        kind: InvalidConstructKind,
        span: Span,
    },
    /// The lexer already reported this token.
    UnparsableToken,
}

pub(super) type ParseResult<T> = Result<T, ParseError>;

/// Deepest term nesting accepted before parsing gives up on a statement.
pub(crate) const MAX_NESTING_DEPTH: usize = 1000;

pub(crate) struct Parser {
    tokens: Vec<Token>,
    position: usize,
    /// Open `(`, `[` and composite `{` count. Newlines are insignificant while nonzero.
    nesting: usize,
    /// Depth of the term being parsed, bounded by `MAX_NESTING_DEPTH`.
    depth: usize,
    previous_span: Span,
    file: String,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>, file: &str) -> Self {
        let previous_span = tokens.first().map_or(
            Span {
                start: 0,
                end: 0,
                line: 1,
                column: 1,
            },
            |token| token.span.clone(),
        );
        Self {
            tokens,
            position: 0,
            nesting: 0,
            depth: 0,
            previous_span,
            file: file.to_string(),
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub(crate) fn parse_module(&mut self) -> Module {
        self.skip_newlines();
        let package = match self.parse_package() {
            Ok(package) => package,
            Err(error) => {
                self.report_parse_error(&error);
                self.synchronize();
                Package {
                    path: Vec::new(),
                    span: self.peek_span(),
                }
            }
        };

        let mut imports = Vec::new();
        let mut rules = Vec::new();
        loop {
            self.skip_newlines();
            if self.at_eof() {
                break;
            }
            let position_before = self.position;
            let result = if self.peek_is_keyword(Keyword::Import) {
                self.parse_import().map(|import| imports.push(import))
            } else if self.peek_is_keyword(Keyword::Package) {
                let found = self.peek().kind.clone();
                Err(ParseError::UnexpectedToken {
                    expected: "import or rule",
                    found,
                    span: self.peek_span(),
                })
            } else {
                self.parse_rule().map(|rule| rules.push(rule))
            };
            if let Err(error) = result {
                self.report_parse_error(&error);
                self.synchronize();
                if self.position == position_before {
                    self.advance();
                }
            }
        }

        Module {
            file: self.file.clone(),
            package,
            imports,
            rules,
        }
    }

    fn report_parse_error(&mut self, error: &ParseError) {
        match error {
            ParseError::UnexpectedToken {
                expected,
                found,
                span,
            } => {
                let message = format!("unexpected {}: expected {expected}", found.describe());
                self.error(message, span);
            }
            ParseError::InvalidConstruct { kind, span } => {
                let message = match kind {
                    InvalidConstructKind::DefaultRuleRequiresValue => {
                        "default rule must have a value".to_string()
                    }
                    InvalidConstructKind::DefaultRuleMustNotHaveBody => {
                        "default rules must not have a body".to_string()
                    }
                    InvalidConstructKind::DefaultRuleMustNotHaveArguments => {
                        "default rules must not have arguments".to_string()
                    }
                    InvalidConstructKind::DefaultRuleMustNotHaveKey => {
                        "default rules must not have a key".to_string()
                    }
                    InvalidConstructKind::RuleRequiresValueOrBody { name } => {
                        format!("rule {name} must have a value or a body")
                    }
                    InvalidConstructKind::PartialRuleMustUseUnify => {
                        "partial rules must use = operator (not := operator)".to_string()
                    }
                    InvalidConstructKind::EmptyBody => "found empty body".to_string(),
                    InvalidConstructKind::InvalidFunctionName => {
                        "invalid function name".to_string()
                    }
                    InvalidConstructKind::NestingTooDeep => {
                        "max nesting depth exceeded".to_string()
                    }
                };
                self.error(message, span);
            }
            ParseError::UnparsableToken => {}
        }
    }

    fn error(&mut self, message: String, span: &Span) {
        self.diagnostics.push(Diagnostic::located(
            ErrorCode::Parse,
            message,
            self.file.clone(),
            span,
        ));
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        let token = self.peek();
        if token.kind == TokenKind::Error {
            return ParseError::UnparsableToken;
        }
        ParseError::UnexpectedToken {
            expected,
            found: token.kind.clone(),
            span: token.span.clone(),
        }
    }

    fn peek_is_keyword(&self, keyword: Keyword) -> bool {
        matches!(self.peek().kind, TokenKind::Keyword(found) if found == keyword)
    }

    fn peek_is_symbol(&self, symbol: Symbol) -> bool {
        matches!(self.peek().kind, TokenKind::Symbol(found) if found == symbol)
    }

    fn peek_is_newline(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Newline)
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek().kind, TokenKind::EndOfFile)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current_index()]
    }

    fn peek_span(&self) -> Span {
        self.peek().span.clone()
    }

    fn current_index(&self) -> usize {
        let mut index = self.position;
        if self.nesting > 0 {
            while index + 1 < self.tokens.len() && self.tokens[index].kind == TokenKind::Newline {
                index += 1;
            }
        }
        index
    }

    fn advance(&mut self) -> Token {
        let index = self.current_index();
        let token = self.tokens[index].clone();
        if !matches!(token.kind, TokenKind::EndOfFile) {
            self.position = index + 1;
        }
        self.previous_span = token.span.clone();
        token
    }

    fn skip_newlines(&mut self) {
        while self.peek_is_newline() {
            self.advance();
        }
    }

    fn enter_nested(&mut self) {
        self.nesting += 1;
    }

    fn leave_nested(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }

    /// Span from `start` through the last consumed token.
    fn span_from(&self, start: &Span) -> Span {
        start.to(&self.previous_span)
    }
}
