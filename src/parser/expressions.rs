//! Expressions, by precedence layer: assignment, relation, `+ -`, `* /`,
//! factor.

use super::tree::*;
use super::Parser;
use crate::diagnostics::Diagnostic;
use crate::lexer::SyntaxKind;

/// A variable parsed ahead of an `=` that never came, kept for the re-read.
pub(super) struct Speculation {
    start: usize,
    end: usize,
    variable: Variable,
    diagnostics: Vec<Diagnostic>,
}

impl Parser<'_> {
    /// `var = expression` or a simple expression.
    ///
    /// An identifier is parsed as a variable first; if no `=` follows, the
    /// cursor is rewound to the identifier and the input is re-read as a
    /// simple expression. The re-read picks the speculative variable back up
    /// instead of parsing it a second time, so nested subscripts stay linear.
    pub(super) fn parse_expression(&mut self) -> Expression {
        if self.current_kind() != SyntaxKind::Identifier
            || self.peek(1).kind == SyntaxKind::OpenRoundBracket
        {
            return Expression::Simple(self.parse_simple_expression());
        }

        let start = self.position;
        let saved_diagnostics = self.diagnostics.len();
        let variable = self.parse_variable();
        if self.current_kind() == SyntaxKind::Assign {
            let operator = self.next_token();
            let value = self.parse_expression();
            return Expression::Assignment(Box::new(Assignment {
                variable,
                operator,
                value,
            }));
        }

        self.speculated = Some(Speculation {
            start,
            end: self.position,
            variable,
            diagnostics: self.diagnostics.split_off(saved_diagnostics),
        });
        self.position = start;
        Expression::Simple(self.parse_simple_expression())
    }

    fn parse_variable(&mut self) -> Variable {
        if self.speculated.as_ref().is_some_and(|s| s.start == self.position) {
            if let Some(done) = self.speculated.take() {
                self.position = done.end;
                self.diagnostics.restore(done.diagnostics);
                return done.variable;
            }
        }

        let identifier = self.match_kind(SyntaxKind::Identifier);
        if self.current_kind() != SyntaxKind::OpenSquareBracket {
            return Variable {
                identifier,
                offset: None,
            };
        }

        self.match_kind(SyntaxKind::OpenSquareBracket);
        let offset = self.parse_expression();
        self.match_kind(SyntaxKind::CloseSquareBracket);
        Variable {
            identifier,
            offset: Some(Box::new(offset)),
        }
    }

    fn parse_simple_expression(&mut self) -> SimpleExpression {
        let left = self.parse_additive_expression();
        if !self.current_kind().is_relop() {
            return SimpleExpression {
                left,
                relation: None,
            };
        }
        let operator = self.next_token();
        let right = self.parse_additive_expression();
        SimpleExpression {
            left,
            relation: Some((operator, right)),
        }
    }

    fn parse_additive_expression(&mut self) -> AdditiveExpression {
        let term = self.parse_term();
        let tail = self.parse_additive_tail();
        AdditiveExpression { term, tail }
    }

    fn parse_additive_tail(&mut self) -> Option<Box<AdditiveTail>> {
        let mut terms = Vec::new();
        while self.current_kind().is_additive() {
            let operator = self.next_token();
            terms.push((operator, self.parse_term()));
        }
        terms.into_iter().rev().fold(None, |tail, (operator, term)| {
            Some(Box::new(AdditiveTail {
                operator,
                term,
                tail,
            }))
        })
    }

    fn parse_term(&mut self) -> Term {
        let factor = self.parse_factor();
        let tail = self.parse_term_tail();
        Term { factor, tail }
    }

    fn parse_term_tail(&mut self) -> Option<Box<TermTail>> {
        let mut factors = Vec::new();
        while self.current_kind().is_multiplicative() {
            let operator = self.next_token();
            factors.push((operator, self.parse_factor()));
        }
        factors.into_iter().rev().fold(None, |tail, (operator, factor)| {
            Some(Box::new(TermTail {
                operator,
                factor,
                tail,
            }))
        })
    }

    fn parse_factor(&mut self) -> Factor {
        match self.current_kind() {
            SyntaxKind::OpenRoundBracket => {
                self.match_kind(SyntaxKind::OpenRoundBracket);
                let inner = self.parse_expression();
                self.match_kind(SyntaxKind::CloseRoundBracket);
                Factor::Parenthesized(Box::new(inner))
            }
            SyntaxKind::Identifier if self.peek(1).kind == SyntaxKind::OpenRoundBracket => {
                Factor::Call(self.parse_call_function())
            }
            SyntaxKind::Identifier => Factor::Variable(self.parse_variable()),
            _ => Factor::Number(self.match_kind(SyntaxKind::Number)),
        }
    }

    fn parse_call_function(&mut self) -> CallFunction {
        let identifier = self.match_kind(SyntaxKind::Identifier);
        self.match_kind(SyntaxKind::OpenRoundBracket);
        let args = self.parse_args();
        self.match_kind(SyntaxKind::CloseRoundBracket);
        CallFunction { identifier, args }
    }

    fn parse_args(&mut self) -> Args {
        if self.current_kind() == SyntaxKind::CloseRoundBracket {
            return Args { list: None };
        }
        let expression = self.parse_expression();
        let tail = self.parse_args_list_tail();
        Args {
            list: Some(Box::new(ArgsList { expression, tail })),
        }
    }

    fn parse_args_list_tail(&mut self) -> Option<Box<ArgsListTail>> {
        let mut expressions = Vec::new();
        while self.current_kind() == SyntaxKind::Comma {
            self.match_kind(SyntaxKind::Comma);
            expressions.push(self.parse_expression());
        }
        expressions
            .into_iter()
            .rev()
            .fold(None, |tail, expression| Some(Box::new(ArgsListTail { expression, tail })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::lexer;

    fn expression(source: &str) -> (Expression, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let tokens = lexer::tokenize(&[source], &mut diagnostics);
        let mut parser = Parser::new(tokens, &mut diagnostics);
        let expr = parser.parse_expression();
        (expr, diagnostics)
    }

    #[test]
    fn deeply_nested_subscripts_parse_in_linear_time() {
        let depth = 40;
        let source = format!("{}i{} + 1", "a[".repeat(depth), "]".repeat(depth));
        let started = std::time::Instant::now();
        let (expr, diagnostics) = expression(&source);
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
        assert!(diagnostics.is_empty(), "{diagnostics:?}");

        let Expression::Simple(simple) = expr else {
            panic!("expected a simple expression");
        };
        assert!(simple.left.tail.is_some());
        let mut nesting = 0;
        let mut factor = &simple.left.term.factor;
        while let Factor::Variable(Variable {
            offset: Some(offset), ..
        }) = factor
        {
            nesting += 1;
            let Expression::Simple(inner) = &**offset else {
                panic!("expected a simple subscript");
            };
            factor = &inner.left.term.factor;
        }
        assert_eq!(nesting, depth);
    }

    #[test]
    fn assignment_inside_a_rewound_subscript() {
        let (expr, diagnostics) = expression("a[b[c] = 2] < d[e]");
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        let Expression::Simple(simple) = expr else {
            panic!("expected a simple expression");
        };
        assert!(simple.relation.is_some());
        let Factor::Variable(var) = &simple.left.term.factor else {
            panic!("expected a variable factor");
        };
        let offset = var.offset.as_deref().expect("subscript");
        assert!(matches!(offset, Expression::Assignment(_)));
    }

    #[test]
    fn subscript_without_assignment_is_rewound() {
        let (expr, diagnostics) = expression("a[i + 1] < 3");
        assert!(diagnostics.is_empty());
        let Expression::Simple(simple) = expr else {
            panic!("expected a simple expression");
        };
        let (op, _) = simple.relation.expect("relation");
        assert_eq!(op.kind, SyntaxKind::LessThan);
        let Factor::Variable(var) = simple.left.term.factor else {
            panic!("expected a variable factor");
        };
        assert!(var.is_array_ref());
    }

    #[test]
    fn assignment_is_right_associative() {
        let (expr, diagnostics) = expression("a = b[2] = 7");
        assert!(diagnostics.is_empty());
        let Expression::Assignment(outer) = expr else {
            panic!("expected assignment");
        };
        assert_eq!(outer.variable.identifier.text, "a");
        let Expression::Assignment(inner) = &outer.value else {
            panic!("expected nested assignment");
        };
        assert!(inner.variable.is_array_ref());
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let (expr, _) = expression("1 + 2 * 3 - 4");
        let Expression::Simple(simple) = expr else {
            panic!("expected a simple expression");
        };
        let additive = simple.left;
        assert!(additive.term.tail.is_none());
        let plus = additive.tail.expect("`+` tail");
        assert_eq!(plus.operator.kind, SyntaxKind::Plus);
        assert_eq!(plus.term.tail.as_ref().map(|t| t.operator.kind), Some(SyntaxKind::Asterisk));
        let minus = plus.tail.as_ref().expect("`-` tail");
        assert_eq!(minus.operator.kind, SyntaxKind::Minus);
    }

    #[test]
    fn call_arguments_are_full_expressions() {
        let (expr, diagnostics) = expression("gcd(v, u - u / v * v)");
        assert!(diagnostics.is_empty());
        let Expression::Simple(simple) = expr else {
            panic!("expected a simple expression");
        };
        let Factor::Call(call) = simple.left.term.factor else {
            panic!("expected a call");
        };
        assert_eq!(call.identifier.text, "gcd");
        let list = call.args.list.expect("arguments");
        assert!(list.tail.is_some());
    }

    #[test]
    fn errors_inside_a_rewound_subscript_are_reported_once() {
        let (_, diagnostics) = expression("a[ ] + 1");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn relations_do_not_chain() {
        let (_, diagnostics) = expression("a < b < c");
        assert!(diagnostics.is_empty());
        let mut diagnostics = Diagnostics::new();
        let tokens = lexer::tokenize(&["void main(void) { a < b < c; }"], &mut diagnostics);
        let _ = super::super::parse(tokens, &mut diagnostics);
        assert!(diagnostics.has_errors());
    }
}
