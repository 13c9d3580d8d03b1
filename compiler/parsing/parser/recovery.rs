use crate::lexer::{Keyword, Symbol, TokenKind};
use compiler__source::Span;

use super::{ParseResult, Parser};

impl Parser {
    pub(super) fn expect_identifier(
        &mut self,
        expected: &'static str,
    ) -> ParseResult<(String, Span)> {
        if let TokenKind::Identifier(name) = &self.peek().kind {
            let name = name.clone();
            let token = self.advance();
            return Ok((name, token.span));
        }
        Err(self.unexpected(expected))
    }

    pub(super) fn expect_symbol(
        &mut self,
        symbol: Symbol,
        expected: &'static str,
    ) -> ParseResult<Span> {
        if self.peek_is_symbol(symbol) {
            return Ok(self.advance().span);
        }
        Err(self.unexpected(expected))
    }

    /// Top-level statements end at a newline or the end of the file.
    pub(super) fn expect_statement_end(&mut self) -> ParseResult<()> {
        if self.peek_is_newline() {
            self.advance();
            return Ok(());
        }
        if self.at_eof() {
            return Ok(());
        }
        Err(self.unexpected("newline"))
    }

    /// Skips to the next token that can start a top-level statement in the first column.
    pub(super) fn synchronize(&mut self) {
        self.nesting = 0;
        while !self.at_eof() {
            let token = self.peek();
            if token.span.column == 1 {
                let starts_statement = matches!(
                    token.kind,
                    TokenKind::Identifier(_)
                        | TokenKind::Keyword(Keyword::Default | Keyword::Import | Keyword::Package)
                );
                if starts_statement {
                    return;
                }
            }
            self.advance();
        }
    }
}
