use crate::lexer::{Keyword, Symbol, TokenKind};
use compiler__source::Span;
use compiler__syntax::{
    Body, HeadAssignment, Import, Literal, Package, Rule, RuleHead, SomeVariable,
};

use super::{InvalidConstructKind, ParseError, ParseResult, Parser};

impl Parser {
    pub(super) fn parse_package(&mut self) -> ParseResult<Package> {
        if !self.peek_is_keyword(Keyword::Package) {
            return Err(self.unexpected("package declaration"));
        }
        let start = self.advance().span;
        let path = self.parse_dotted_path("package path")?;
        let span = self.span_from(&start);
        self.expect_statement_end()?;
        Ok(Package { path, span })
    }

    pub(super) fn parse_import(&mut self) -> ParseResult<Import> {
        let start = self.advance().span;
        let path = self.parse_dotted_path("import path")?;
        let alias = if self.peek_is_keyword(Keyword::As) {
            self.advance();
            Some(self.expect_identifier("import alias")?.0)
        } else {
            None
        };
        let span = self.span_from(&start);
        self.expect_statement_end()?;
        Ok(Import { path, alias, span })
    }

    /// `a.b["c"]` style paths used by package and import statements.
    fn parse_dotted_path(&mut self, expected: &'static str) -> ParseResult<Vec<String>> {
        let (first, _) = self.expect_identifier(expected)?;
        let mut segments = vec![first];
        loop {
            if self.peek_is_symbol(Symbol::Dot) {
                self.advance();
                segments.push(self.expect_field_name()?);
            } else if self.peek_is_symbol(Symbol::LeftBracket) {
                self.advance();
                let TokenKind::StringLiteral(segment) = self.peek().kind.clone() else {
                    return Err(self.unexpected("string"));
                };
                self.advance();
                self.expect_symbol(Symbol::RightBracket, "']'")?;
                segments.push(segment);
            } else {
                return Ok(segments);
            }
        }
    }

    pub(super) fn parse_rule(&mut self) -> ParseResult<Rule> {
        let start = self.peek_span();
        let is_default = if self.peek_is_keyword(Keyword::Default) {
            self.advance();
            true
        } else {
            false
        };
        let (name, name_span) = self.expect_identifier("rule")?;

        let arguments = if self.peek_is_symbol(Symbol::LeftParenthesis) {
            self.advance();
            self.enter_nested();
            let arguments = self.parse_term_list(Symbol::RightParenthesis, "')'")?;
            self.leave_nested();
            Some(arguments)
        } else {
            None
        };

        let key = if arguments.is_none() && self.peek_is_symbol(Symbol::LeftBracket) {
            self.advance();
            self.enter_nested();
            let key = self.parse_term()?;
            self.expect_symbol(Symbol::RightBracket, "']'")?;
            self.leave_nested();
            Some(key)
        } else {
            None
        };

        let assignment_span = self.peek_span();
        let assignment = if self.peek_is_symbol(Symbol::Equal) {
            self.advance();
            HeadAssignment::Unify
        } else if self.peek_is_symbol(Symbol::Assign) {
            self.advance();
            HeadAssignment::Assign
        } else {
            HeadAssignment::None
        };
        let value = if assignment == HeadAssignment::None {
            None
        } else {
            Some(self.parse_term()?)
        };

        let body = if self.peek_is_symbol(Symbol::LeftBrace) {
            Some(self.parse_body()?)
        } else {
            None
        };
        let span = self.span_from(&start);

        let rule = Rule {
            is_default,
            head: RuleHead {
                name,
                name_span,
                arguments,
                key,
                value,
                assignment,
            },
            body,
            span,
        };
        Self::validate_rule(&rule, &assignment_span)?;
        self.expect_statement_end()?;
        Ok(rule)
    }

    fn validate_rule(rule: &Rule, assignment_span: &Span) -> ParseResult<()> {
        let head = &rule.head;
        let invalid = |kind| {
            Err(ParseError::InvalidConstruct {
                kind,
                span: rule.span.clone(),
            })
        };
        if rule.is_default {
            if head.arguments.is_some() {
                return invalid(InvalidConstructKind::DefaultRuleMustNotHaveArguments);
            }
            if head.key.is_some() {
                return invalid(InvalidConstructKind::DefaultRuleMustNotHaveKey);
            }
            if head.value.is_none() {
                return invalid(InvalidConstructKind::DefaultRuleRequiresValue);
            }
            if rule.body.is_some() {
                return invalid(InvalidConstructKind::DefaultRuleMustNotHaveBody);
            }
            return Ok(());
        }
        if head.key.is_some() && head.assignment == HeadAssignment::Assign {
            return Err(ParseError::InvalidConstruct {
                kind: InvalidConstructKind::PartialRuleMustUseUnify,
                span: assignment_span.clone(),
            });
        }
        if head.key.is_none() && head.value.is_none() && rule.body.is_none() {
            return invalid(InvalidConstructKind::RuleRequiresValueOrBody {
                name: head.name.clone(),
            });
        }
        Ok(())
    }

    fn parse_body(&mut self) -> ParseResult<Body> {
        let start = self.advance().span;
        let mut literals = Vec::new();
        loop {
            self.skip_literal_separators();
            if self.peek_is_symbol(Symbol::RightBrace) {
                self.advance();
                break;
            }
            literals.push(self.parse_literal()?);
            if self.peek_is_symbol(Symbol::Semicolon) || self.peek_is_newline() {
                continue;
            }
            if !self.peek_is_symbol(Symbol::RightBrace) {
                return Err(self.unexpected("';', newline or '}'"));
            }
        }
        let span = self.span_from(&start);
        if literals.is_empty() {
            return Err(ParseError::InvalidConstruct {
                kind: InvalidConstructKind::EmptyBody,
                span,
            });
        }
        Ok(Body { literals, span })
    }

    fn skip_literal_separators(&mut self) {
        while self.peek_is_newline() || self.peek_is_symbol(Symbol::Semicolon) {
            self.advance();
        }
    }

    fn parse_literal(&mut self) -> ParseResult<Literal> {
        let start = self.peek_span();
        if self.peek_is_keyword(Keyword::Some) {
            self.advance();
            let mut variables = Vec::new();
            loop {
                let (name, span) = self.expect_identifier("variable")?;
                variables.push(SomeVariable { name, span });
                if !self.peek_is_symbol(Symbol::Comma) {
                    break;
                }
                self.advance();
            }
            return Ok(Literal::Some {
                variables,
                span: self.span_from(&start),
            });
        }

        let negated = if self.peek_is_keyword(Keyword::Not) {
            self.advance();
            true
        } else {
            false
        };
        let term = self.parse_term()?;
        Ok(Literal::Expression {
            negated,
            term,
            span: self.span_from(&start),
        })
    }
}
