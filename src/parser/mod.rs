//! Predictive recursive-descent parser producing the concrete
//! [`ExpressionTree`].
//!
//! # Grammar
//!
//! ```text
//! program          ::= declaration-list
//! declaration      ::= var-declaration | fun-declaration
//! var-declaration  ::= type ID ; | type ID [ NUM ] ;
//! fun-declaration  ::= type ID ( params ) compound-stmt
//! params           ::= void | param { , param }
//! param            ::= int ID | int ID [ ]
//! compound-stmt    ::= { { var-declaration } { statement } }
//! statement        ::= expr-stmt | compound-stmt | if-stmt | while-stmt | return-stmt
//! expression       ::= var = expression | simple-expression
//! simple-expression::= additive [ relop additive ]
//! additive         ::= term { (+|-) term }
//! term             ::= factor { (*|/) factor }
//! factor           ::= ( expression ) | var | call | NUM
//! ```
//!
//! The parser never stops on a syntax error: [`Parser::match_kind`] reports
//! the mismatch and hands back a placeholder token so the tree is always
//! complete. Callers must check the diagnostics before trusting it.
//!
//! The only backtracking point is assignment detection in
//! [`Parser::parse_expression`].

mod declarations;
mod expressions;
mod node;
mod statements;
pub mod tree;

pub use node::CstNode;
pub use tree::ExpressionTree;

use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::lexer::{SyntaxKind, Token};

pub struct Parser<'d> {
    tokens: Vec<Token>,
    position: usize,
    speculated: Option<expressions::Speculation>,
    diagnostics: &'d mut Diagnostics,
}

impl<'d> Parser<'d> {
    /// `tokens` must end with an `EndOfFile` token, as produced by
    /// [`crate::lexer::Lexer::tokenize`]. One is appended otherwise.
    pub fn new(mut tokens: Vec<Token>, diagnostics: &'d mut Diagnostics) -> Self {
        if !tokens.last().is_some_and(Token::is_end_of_file) {
            let (line, column) = tokens
                .last()
                .map(|t| (t.line, t.column + t.text.chars().count()))
                .unwrap_or((1, 1));
            tokens.push(Token::new(SyntaxKind::EndOfFile, "", line, column));
        }
        Self {
            tokens,
            position: 0,
            speculated: None,
            diagnostics,
        }
    }

    pub fn parse(&mut self) -> ExpressionTree {
        let before = self.diagnostics.len();
        let root = self.parse_declaration_list();
        if !self.current().is_end_of_file() {
            let location = self.current().location();
            let message = format!(
                "code ends early: unexpected {} after the last declaration",
                self.current()
            );
            self.diagnostics.parse_error(location, message);
        }
        debug!(
            stage = "parse",
            tokens = self.tokens.len(),
            diagnostics = self.diagnostics.len() - before,
            "parsed token stream"
        );
        ExpressionTree { root }
    }

    /// Token `offset` positions ahead; clamps to the trailing end-of-file.
    fn peek(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.position + offset).min(last)]
    }

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn current_kind(&self) -> SyntaxKind {
        self.current().kind
    }

    fn next_token(&mut self) -> Token {
        let token = self.current().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    /// Consume the current token if it is of `kind`.
    ///
    /// `Type` accepts `int` and `void`, `NumberOrIdentifier` accepts either.
    /// On mismatch a `ParseError` is reported, nothing is consumed and a
    /// placeholder token (of kind `kind`, or `Void` for `Type`) positioned at
    /// the current token is returned.
    fn match_kind(&mut self, kind: SyntaxKind) -> Token {
        let found = self.current_kind();
        let accepted = found == kind
            || (kind == SyntaxKind::Type && found.is_type())
            || (kind == SyntaxKind::NumberOrIdentifier
                && matches!(found, SyntaxKind::Number | SyntaxKind::Identifier));
        if accepted {
            return self.next_token();
        }

        let current = self.current();
        let location = current.location();
        let message = format!("unexpected {current}, expected {kind}");
        let placeholder_kind = if kind == SyntaxKind::Type {
            SyntaxKind::Void
        } else {
            kind
        };
        let mut placeholder = Token::new(placeholder_kind, current.text.clone(), current.line, current.column);
        if placeholder_kind == SyntaxKind::Number {
            placeholder.value = Some(0);
        }
        self.diagnostics.parse_error(location, message);
        placeholder
    }
}

/// Parse a token stream produced by the lexer.
pub fn parse(tokens: Vec<Token>, diagnostics: &mut Diagnostics) -> ExpressionTree {
    Parser::new(tokens, diagnostics).parse()
}
