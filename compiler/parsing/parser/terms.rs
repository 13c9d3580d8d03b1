use crate::lexer::{Keyword, Symbol, TokenKind};
use compiler__source::Span;
use compiler__syntax::{BinaryOperator, RefSegment, Term};

use super::{InvalidConstructKind, MAX_NESTING_DEPTH, ParseError, ParseResult, Parser};

impl Parser {
    /// Parses an expression term. `:=` and `=` bind loosest and do not chain.
    ///
    /// Every nested term and every chained operator counts toward `MAX_NESTING_DEPTH`.
    pub(super) fn parse_term(&mut self) -> ParseResult<Term> {
        let depth = self.depth;
        let result = self.descend().and_then(|()| self.parse_assignment());
        self.depth = depth;
        result
    }

    fn descend(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::InvalidConstruct {
                kind: InvalidConstructKind::NestingTooDeep,
                span: self.peek_span(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_assignment(&mut self) -> ParseResult<Term> {
        let left = self.parse_comparison()?;
        let operator = if self.peek_is_symbol(Symbol::Assign) {
            BinaryOperator::Assign
        } else if self.peek_is_symbol(Symbol::Equal) {
            BinaryOperator::Unify
        } else {
            return Ok(left);
        };
        self.advance();
        let right = self.parse_comparison()?;
        Ok(binary(operator, left, right))
    }

    fn parse_comparison(&mut self) -> ParseResult<Term> {
        let left = self.parse_additive()?;
        let operator = if self.peek_is_symbol(Symbol::EqualEqual) {
            BinaryOperator::Equal
        } else if self.peek_is_symbol(Symbol::BangEqual) {
            BinaryOperator::NotEqual
        } else if self.peek_is_symbol(Symbol::Less) {
            BinaryOperator::Less
        } else if self.peek_is_symbol(Symbol::LessEqual) {
            BinaryOperator::LessEqual
        } else if self.peek_is_symbol(Symbol::Greater) {
            BinaryOperator::Greater
        } else if self.peek_is_symbol(Symbol::GreaterEqual) {
            BinaryOperator::GreaterEqual
        } else {
            return Ok(left);
        };
        self.advance();
        let right = self.parse_additive()?;
        Ok(binary(operator, left, right))
    }

    fn parse_additive(&mut self) -> ParseResult<Term> {
        let mut term = self.parse_multiplicative()?;
        loop {
            let operator = if self.peek_is_symbol(Symbol::Plus) {
                BinaryOperator::Add
            } else if self.peek_is_symbol(Symbol::Minus) {
                BinaryOperator::Subtract
            } else {
                return Ok(term);
            };
            self.advance();
            self.descend()?;
            let right = self.parse_multiplicative()?;
            term = binary(operator, term, right);
        }
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Term> {
        let mut term = self.parse_unary()?;
        loop {
            let operator = if self.peek_is_symbol(Symbol::Star) {
                BinaryOperator::Multiply
            } else if self.peek_is_symbol(Symbol::Slash) {
                BinaryOperator::Divide
            } else {
                return Ok(term);
            };
            self.advance();
            self.descend()?;
            let right = self.parse_unary()?;
            term = binary(operator, term, right);
        }
    }

    fn parse_unary(&mut self) -> ParseResult<Term> {
        if !self.peek_is_symbol(Symbol::Minus) {
            return self.parse_primary();
        }
        let start = self.advance().span;
        if let TokenKind::NumberLiteral(text) = self.peek().kind.clone() {
            self.advance();
            return Ok(Term::Number {
                text: format!("-{text}"),
                span: self.span_from(&start),
            });
        }
        self.descend()?;
        let operand = self.parse_unary()?;
        Ok(Term::Negate {
            operand: Box::new(operand),
            span: self.span_from(&start),
        })
    }

    fn parse_primary(&mut self) -> ParseResult<Term> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Keyword(Keyword::Null) => {
                self.advance();
                Ok(Term::Null { span: token.span })
            }
            TokenKind::BooleanLiteral(value) => {
                self.advance();
                Ok(Term::Boolean {
                    value,
                    span: token.span,
                })
            }
            TokenKind::NumberLiteral(text) => {
                self.advance();
                Ok(Term::Number {
                    text,
                    span: token.span,
                })
            }
            TokenKind::StringLiteral(value) => {
                self.advance();
                Ok(Term::String {
                    value,
                    span: token.span,
                })
            }
            TokenKind::Identifier(name) => {
                self.advance();
                self.parse_ref_or_call(name, token.span)
            }
            TokenKind::Symbol(Symbol::LeftBracket) => {
                self.advance();
                self.enter_nested();
                let items = self.parse_term_list(Symbol::RightBracket, "']'")?;
                self.leave_nested();
                Ok(Term::Array {
                    items,
                    span: self.span_from(&token.span),
                })
            }
            TokenKind::Symbol(Symbol::LeftBrace) => {
                self.advance();
                self.enter_nested();
                let term = self.parse_object_or_set(&token.span)?;
                self.leave_nested();
                Ok(term)
            }
            TokenKind::Symbol(Symbol::LeftParenthesis) => {
                self.advance();
                self.enter_nested();
                let term = self.parse_term()?;
                self.expect_symbol(Symbol::RightParenthesis, "')'")?;
                self.leave_nested();
                Ok(term)
            }
            _ => Err(self.unexpected("term")),
        }
    }

    fn parse_ref_or_call(&mut self, root: String, root_span: Span) -> ParseResult<Term> {
        let mut path = Vec::new();
        loop {
            if self.peek_is_symbol(Symbol::Dot) {
                self.advance();
                let span = self.peek_span();
                let name = self.expect_field_name()?;
                path.push(RefSegment::Field { name, span });
            } else if self.peek_is_symbol(Symbol::LeftBracket) {
                self.advance();
                self.enter_nested();
                let index = self.parse_term()?;
                self.expect_symbol(Symbol::RightBracket, "']'")?;
                self.leave_nested();
                path.push(RefSegment::Index(index));
            } else if self.peek_is_symbol(Symbol::LeftParenthesis) {
                return self.parse_call(root, &root_span, &path);
            } else {
                break;
            }
        }

        if path.is_empty() {
            return Ok(Term::Variable {
                name: root,
                span: root_span,
            });
        }
        Ok(Term::Ref {
            span: self.span_from(&root_span),
            root,
            root_span,
            path,
        })
    }

    fn parse_call(
        &mut self,
        root: String,
        root_span: &Span,
        path: &[RefSegment],
    ) -> ParseResult<Term> {
        let mut function = vec![root];
        for segment in path {
            match segment {
                RefSegment::Field { name, .. } => function.push(name.clone()),
                RefSegment::Index(_) => {
                    return Err(ParseError::InvalidConstruct {
                        kind: InvalidConstructKind::InvalidFunctionName,
                        span: self.span_from(root_span),
                    });
                }
            }
        }
        self.advance();
        self.enter_nested();
        let arguments = self.parse_term_list(Symbol::RightParenthesis, "')'")?;
        self.leave_nested();
        let span = self.span_from(root_span);

        // `set()` is the empty set literal.
        if function.len() == 1 && function[0] == "set" && arguments.is_empty() {
            return Ok(Term::Set {
                items: Vec::new(),
                span,
            });
        }
        Ok(Term::Call {
            function,
            arguments,
            span,
        })
    }

    fn parse_object_or_set(&mut self, start: &Span) -> ParseResult<Term> {
        if self.peek_is_symbol(Symbol::RightBrace) {
            self.advance();
            return Ok(Term::Object {
                entries: Vec::new(),
                span: self.span_from(start),
            });
        }

        let first = self.parse_term()?;
        if !self.peek_is_symbol(Symbol::Colon) {
            let mut items = vec![first];
            if self.peek_is_symbol(Symbol::Comma) {
                self.advance();
                items.extend(self.parse_term_list(Symbol::RightBrace, "'}'")?);
            } else {
                self.expect_symbol(Symbol::RightBrace, "',' or '}'")?;
            }
            return Ok(Term::Set {
                items,
                span: self.span_from(start),
            });
        }

        let mut entries = Vec::new();
        let mut key = first;
        loop {
            self.expect_symbol(Symbol::Colon, "':'")?;
            let value = self.parse_term()?;
            entries.push((key, value));
            if self.peek_is_symbol(Symbol::RightBrace) {
                self.advance();
                break;
            }
            self.expect_symbol(Symbol::Comma, "',' or '}'")?;
            if self.peek_is_symbol(Symbol::RightBrace) {
                self.advance();
                break;
            }
            key = self.parse_term()?;
        }
        Ok(Term::Object {
            entries,
            span: self.span_from(start),
        })
    }

    /// Comma separated terms up to and including `end`. A trailing comma is allowed.
    pub(super) fn parse_term_list(
        &mut self,
        end: Symbol,
        expected_end: &'static str,
    ) -> ParseResult<Vec<Term>> {
        let mut terms = Vec::new();
        loop {
            if self.peek_is_symbol(end) {
                self.advance();
                return Ok(terms);
            }
            terms.push(self.parse_term()?);
            if self.peek_is_symbol(Symbol::Comma) {
                self.advance();
                continue;
            }
            if !self.peek_is_symbol(end) {
                return Err(self.unexpected(expected_end));
            }
        }
    }

    /// Field names after `.` may reuse keywords, e.g. `input.default`.
    pub(super) fn expect_field_name(&mut self) -> ParseResult<String> {
        match self.peek().kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            TokenKind::Keyword(keyword) => {
                self.advance();
                Ok(keyword.as_str().to_string())
            }
            _ => Err(self.unexpected("field name")),
        }
    }
}

fn binary(operator: BinaryOperator, left: Term, right: Term) -> Term {
    let span = left.span().to(right.span());
    Term::Binary {
        operator,
        left: Box::new(left),
        right: Box::new(right),
        span,
    }
}
