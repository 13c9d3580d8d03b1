use compiler__source::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Keyword {
    // keep-sorted start
    As,
    Default,
    Import,
    Not,
    Null,
    Package,
    Some,
    // keep-sorted end
}

impl Keyword {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            // keep-sorted start
            Keyword::As => "as",
            Keyword::Default => "default",
            Keyword::Import => "import",
            Keyword::Not => "not",
            Keyword::Null => "null",
            Keyword::Package => "package",
            Keyword::Some => "some",
            // keep-sorted end
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Symbol {
    // keep-sorted start
    Assign,
    BangEqual,
    Colon,
    Comma,
    Dot,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    LeftBrace,
    LeftBracket,
    LeftParenthesis,
    Less,
    LessEqual,
    Minus,
    Plus,
    RightBrace,
    RightBracket,
    RightParenthesis,
    Semicolon,
    Slash,
    Star,
    // keep-sorted end
}

impl Symbol {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            // keep-sorted start
            Symbol::Assign => ":=",
            Symbol::BangEqual => "!=",
            Symbol::Colon => ":",
            Symbol::Comma => ",",
            Symbol::Dot => ".",
            Symbol::Equal => "=",
            Symbol::EqualEqual => "==",
            Symbol::Greater => ">",
            Symbol::GreaterEqual => ">=",
            Symbol::LeftBrace => "{",
            Symbol::LeftBracket => "[",
            Symbol::LeftParenthesis => "(",
            Symbol::Less => "<",
            Symbol::LessEqual => "<=",
            Symbol::Minus => "-",
            Symbol::Plus => "+",
            Symbol::RightBrace => "}",
            Symbol::RightBracket => "]",
            Symbol::RightParenthesis => ")",
            Symbol::Semicolon => ";",
            Symbol::Slash => "/",
            Symbol::Star => "*",
            // keep-sorted end
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind {
    Identifier(String),
    NumberLiteral(String),
    StringLiteral(String),
    BooleanLiteral(bool),
    Keyword(Keyword),
    Symbol(Symbol),
    /// Raw `\n` from the source. Separates rules and body literals.
    Newline,
    EndOfFile,
    Error,
}

impl TokenKind {
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(name) => format!("identifier '{name}'"),
            TokenKind::NumberLiteral(text) => format!("number {text}"),
            TokenKind::StringLiteral(_) => "string".to_string(),
            TokenKind::BooleanLiteral(value) => format!("boolean {value}"),
            TokenKind::Keyword(keyword) => format!("keyword '{}'", keyword.as_str()),
            TokenKind::Symbol(symbol) => format!("'{}'", symbol.as_str()),
            TokenKind::Newline => "newline".to_string(),
            TokenKind::EndOfFile => "end of file".to_string(),
            TokenKind::Error => "invalid token".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

pub(crate) struct LexError {
    pub(crate) message: String,
    pub(crate) span: Span,
}

pub(crate) struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    index: usize,
    line: usize,
    column: usize,
    lex_errors: Vec<LexError>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            index: 0,
            line: 1,
            column: 1,
            lex_errors: Vec::new(),
        }
    }

    pub(crate) fn lex_all_tokens(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_end_of_file = token.kind == TokenKind::EndOfFile;
            tokens.push(token);
            if is_end_of_file {
                break;
            }
        }
        tokens
    }

    pub(crate) fn into_errors(self) -> Vec<LexError> {
        self.lex_errors
    }

    fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let start = self.index;
        let (line, column) = (self.line, self.column);

        if self.index >= self.bytes.len() {
            return Token {
                kind: TokenKind::EndOfFile,
                span: Span {
                    start,
                    end: start,
                    line,
                    column,
                },
            };
        }

        match self.peek_byte() {
            b'\n' => {
                self.advance();
                Token {
                    kind: TokenKind::Newline,
                    span: Span {
                        start,
                        end: start + 1,
                        line,
                        column,
                    },
                }
            }
            b'(' => self.single(Symbol::LeftParenthesis, 1, start, line, column),
            b')' => self.single(Symbol::RightParenthesis, 1, start, line, column),
            b'{' => self.single(Symbol::LeftBrace, 1, start, line, column),
            b'}' => self.single(Symbol::RightBrace, 1, start, line, column),
            b'[' => self.single(Symbol::LeftBracket, 1, start, line, column),
            b']' => self.single(Symbol::RightBracket, 1, start, line, column),
            b',' => self.single(Symbol::Comma, 1, start, line, column),
            b'.' => self.single(Symbol::Dot, 1, start, line, column),
            b';' => self.single(Symbol::Semicolon, 1, start, line, column),
            b'+' => self.single(Symbol::Plus, 1, start, line, column),
            b'-' => self.single(Symbol::Minus, 1, start, line, column),
            b'*' => self.single(Symbol::Star, 1, start, line, column),
            b'/' => self.single(Symbol::Slash, 1, start, line, column),
            b'<' => {
                if self.match_bytes(b"<=") {
                    self.single(Symbol::LessEqual, 2, start, line, column)
                } else {
                    self.single(Symbol::Less, 1, start, line, column)
                }
            }
            b'>' => {
                if self.match_bytes(b">=") {
                    self.single(Symbol::GreaterEqual, 2, start, line, column)
                } else {
                    self.single(Symbol::Greater, 1, start, line, column)
                }
            }
            b':' => {
                if self.match_bytes(b":=") {
                    self.single(Symbol::Assign, 2, start, line, column)
                } else {
                    self.single(Symbol::Colon, 1, start, line, column)
                }
            }
            b'=' => {
                if self.match_bytes(b"==") {
                    self.single(Symbol::EqualEqual, 2, start, line, column)
                } else {
                    self.single(Symbol::Equal, 1, start, line, column)
                }
            }
            b'!' => {
                if self.match_bytes(b"!=") {
                    self.single(Symbol::BangEqual, 2, start, line, column)
                } else {
                    self.unexpected_character(start, line, column)
                }
            }
            b'"' => self.lex_string(start, line, column),
            b'`' => self.lex_raw_string(start, line, column),
            b'0'..=b'9' => self.lex_number(start, line, column),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.lex_identifier(start, line, column),
            _ => self.unexpected_character(start, line, column),
        }
    }

    fn single(
        &mut self,
        symbol: Symbol,
        length: usize,
        start: usize,
        line: usize,
        column: usize,
    ) -> Token {
        self.advance_by(length);
        Token {
            kind: TokenKind::Symbol(symbol),
            span: Span {
                start,
                end: start + length,
                line,
                column,
            },
        }
    }

    fn lex_string(&mut self, start: usize, line: usize, column: usize) -> Token {
        self.advance();
        let mut content = String::new();
        while self.index < self.bytes.len() {
            let character = self.peek_char();
            match character {
                '"' => {
                    self.advance();
                    return Token {
                        kind: TokenKind::StringLiteral(content),
                        span: self.span_from(start, line, column),
                    };
                }
                '\n' => break,
                '\\' => {
                    let escape_start = self.index;
                    let (escape_line, escape_column) = (self.line, self.column);
                    self.advance();
                    if self.index >= self.bytes.len() {
                        break;
                    }
                    let escaped = self.peek_char();
                    self.advance();
                    match escaped {
                        '"' => content.push('"'),
                        '\\' => content.push('\\'),
                        '/' => content.push('/'),
                        'b' => content.push('\u{8}'),
                        'f' => content.push('\u{c}'),
                        'n' => content.push('\n'),
                        'r' => content.push('\r'),
                        't' => content.push('\t'),
                        'u' => {
                            if let Some(decoded) = self.lex_unicode_escape() {
                                content.push(decoded);
                            } else {
                                self.lex_errors.push(LexError {
                                    message: "invalid unicode escape sequence".to_string(),
                                    span: self.span_from(escape_start, escape_line, escape_column),
                                });
                            }
                        }
                        other => {
                            self.lex_errors.push(LexError {
                                message: format!("invalid escape sequence '\\{other}'"),
                                span: self.span_from(escape_start, escape_line, escape_column),
                            });
                        }
                    }
                }
                _ => {
                    content.push(character);
                    self.advance();
                }
            }
        }

        self.lex_errors.push(LexError {
            message: "unterminated string literal".to_string(),
            span: self.span_from(start, line, column),
        });
        Token {
            kind: TokenKind::Error,
            span: self.span_from(start, line, column),
        }
    }

    fn lex_unicode_escape(&mut self) -> Option<char> {
        let digits = self.source.get(self.index..self.index + 4)?;
        let code_point = u32::from_str_radix(digits, 16).ok()?;
        self.advance_by(4);
        char::from_u32(code_point)
    }

    fn lex_raw_string(&mut self, start: usize, line: usize, column: usize) -> Token {
        self.advance();
        let content_start = self.index;
        while self.index < self.bytes.len() {
            if self.peek_byte() == b'`' {
                let content = self.source[content_start..self.index].to_string();
                self.advance();
                return Token {
                    kind: TokenKind::StringLiteral(content),
                    span: self.span_from(start, line, column),
                };
            }
            self.advance();
        }

        self.lex_errors.push(LexError {
            message: "unterminated raw string literal".to_string(),
            span: self.span_from(start, line, column),
        });
        Token {
            kind: TokenKind::Error,
            span: self.span_from(start, line, column),
        }
    }

    fn lex_number(&mut self, start: usize, line: usize, column: usize) -> Token {
        self.skip_digits();
        if self.peek_byte_at(0) == Some(b'.')
            && self
                .peek_byte_at(1)
                .is_some_and(|byte| byte.is_ascii_digit())
        {
            self.advance();
            self.skip_digits();
        }
        if matches!(self.peek_byte_at(0), Some(b'e' | b'E')) {
            let exponent_digits_offset = match self.peek_byte_at(1) {
                Some(b'+' | b'-') => 2,
                _ => 1,
            };
            if self
                .peek_byte_at(exponent_digits_offset)
                .is_some_and(|byte| byte.is_ascii_digit())
            {
                self.advance_by(exponent_digits_offset);
                self.skip_digits();
            }
        }
        Token {
            kind: TokenKind::NumberLiteral(self.source[start..self.index].to_string()),
            span: self.span_from(start, line, column),
        }
    }

    fn skip_digits(&mut self) {
        while self.index < self.bytes.len() && self.peek_byte().is_ascii_digit() {
            self.advance();
        }
    }

    fn lex_identifier(&mut self, start: usize, line: usize, column: usize) -> Token {
        while self.index < self.bytes.len() {
            match self.peek_byte() {
                b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' => self.advance(),
                _ => break,
            }
        }
        let text = &self.source[start..self.index];
        let kind = match text {
            "as" => TokenKind::Keyword(Keyword::As),
            "default" => TokenKind::Keyword(Keyword::Default),
            "import" => TokenKind::Keyword(Keyword::Import),
            "not" => TokenKind::Keyword(Keyword::Not),
            "null" => TokenKind::Keyword(Keyword::Null),
            "package" => TokenKind::Keyword(Keyword::Package),
            "some" => TokenKind::Keyword(Keyword::Some),
            "true" => TokenKind::BooleanLiteral(true),
            "false" => TokenKind::BooleanLiteral(false),
            _ => TokenKind::Identifier(text.to_string()),
        };
        Token {
            kind,
            span: self.span_from(start, line, column),
        }
    }

    fn unexpected_character(&mut self, start: usize, line: usize, column: usize) -> Token {
        let message = format!("unexpected character '{}'", self.peek_char());
        self.advance();
        self.lex_errors.push(LexError {
            message,
            span: self.span_from(start, line, column),
        });
        Token {
            kind: TokenKind::Error,
            span: self.span_from(start, line, column),
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        while self.index < self.bytes.len() {
            match self.peek_byte() {
                b' ' | b'\t' | b'\r' => self.advance(),
                b'#' => {
                    while self.index < self.bytes.len() && self.peek_byte() != b'\n' {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn span_from(&self, start: usize, line: usize, column: usize) -> Span {
        Span {
            start,
            end: self.index,
            line,
            column,
        }
    }

    fn advance(&mut self) {
        if self.index < self.bytes.len() {
            if self.bytes[self.index] == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            // Step over the whole UTF-8 sequence so slicing stays on char boundaries.
            self.index += self.source[self.index..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn peek_byte(&self) -> u8 {
        self.bytes[self.index]
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.index + offset).copied()
    }

    fn peek_char(&self) -> char {
        self.source[self.index..].chars().next().unwrap_or('\0')
    }

    fn match_bytes(&self, bytes: &[u8]) -> bool {
        self.bytes.get(self.index..self.index + bytes.len()) == Some(bytes)
    }
}
