//! Compound statements and the statement forms.

use super::tree::*;
use super::Parser;
use crate::lexer::SyntaxKind;

impl Parser<'_> {
    pub(super) fn parse_compound_statement(&mut self) -> CompoundStatement {
        let open = self.match_kind(SyntaxKind::OpenCurlyBracket);
        let local_declarations = self.parse_local_declarations();
        let statements = self.parse_statement_list_tail();
        self.match_kind(SyntaxKind::CloseCurlyBracket);

        CompoundStatement {
            open,
            local_declarations,
            statements,
        }
    }

    fn parse_statement_list_tail(&mut self) -> Option<Box<StatementListTail>> {
        let mut statements = Vec::new();
        while starts_statement(self.current_kind()) {
            statements.push(self.parse_statement());
        }
        statements
            .into_iter()
            .rev()
            .fold(None, |tail, statement| Some(Box::new(StatementListTail { statement, tail })))
    }

    fn parse_statement(&mut self) -> Statement {
        match self.current_kind() {
            SyntaxKind::If => Statement::Selection(self.parse_selection_statement()),
            SyntaxKind::While => Statement::Iteration(self.parse_iteration_statement()),
            SyntaxKind::Return => Statement::Return(self.parse_return_statement()),
            SyntaxKind::OpenCurlyBracket => Statement::Compound(self.parse_compound_statement()),
            _ => Statement::Expression(self.parse_expression_statement()),
        }
    }

    fn parse_expression_statement(&mut self) -> ExpressionStatement {
        if self.current_kind() == SyntaxKind::Semicolon {
            return ExpressionStatement {
                expression: None,
                semicolon: self.next_token(),
            };
        }
        let expression = self.parse_expression();
        let semicolon = self.match_kind(SyntaxKind::Semicolon);
        ExpressionStatement {
            expression: Some(expression),
            semicolon,
        }
    }

    fn parse_return_statement(&mut self) -> ReturnStatement {
        let keyword = self.match_kind(SyntaxKind::Return);
        let expression = if self.current_kind() == SyntaxKind::Semicolon {
            None
        } else {
            Some(self.parse_expression())
        };
        self.match_kind(SyntaxKind::Semicolon);
        ReturnStatement { keyword, expression }
    }

    /// A dangling `else` belongs to the innermost `if`.
    fn parse_selection_statement(&mut self) -> SelectionStatement {
        let keyword = self.match_kind(SyntaxKind::If);
        self.match_kind(SyntaxKind::OpenRoundBracket);
        let condition = self.parse_expression();
        self.match_kind(SyntaxKind::CloseRoundBracket);

        let then_body = Box::new(self.parse_statement());
        let else_body = if self.current_kind() == SyntaxKind::Else {
            self.next_token();
            Some(Box::new(self.parse_statement()))
        } else {
            None
        };

        SelectionStatement {
            keyword,
            condition,
            then_body,
            else_body,
        }
    }

    fn parse_iteration_statement(&mut self) -> IterationStatement {
        let keyword = self.match_kind(SyntaxKind::While);
        self.match_kind(SyntaxKind::OpenRoundBracket);
        let condition = self.parse_expression();
        self.match_kind(SyntaxKind::CloseRoundBracket);
        let body = Box::new(self.parse_statement());

        IterationStatement {
            keyword,
            condition,
            body,
        }
    }
}

/// Tokens that may begin another statement inside a statement list.
fn starts_statement(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Identifier
            | SyntaxKind::Number
            | SyntaxKind::If
            | SyntaxKind::While
            | SyntaxKind::Return
            | SyntaxKind::Semicolon
            | SyntaxKind::OpenCurlyBracket
            | SyntaxKind::OpenRoundBracket
    )
}
