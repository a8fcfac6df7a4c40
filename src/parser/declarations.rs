//! Top-level and local declarations, parameter lists.

use super::tree::*;
use super::Parser;
use crate::lexer::{SyntaxKind, Token};

impl Parser<'_> {
    pub(super) fn parse_declaration_list(&mut self) -> DeclarationList {
        let declaration = self.parse_declaration();
        let tail = self.parse_declaration_list_tail();
        DeclarationList { declaration, tail }
    }

    fn parse_declaration_list_tail(&mut self) -> Option<Box<DeclarationListTail>> {
        let mut declarations = Vec::new();
        while self.current_kind().is_type() {
            declarations.push(self.parse_declaration());
        }
        declarations
            .into_iter()
            .rev()
            .fold(None, |tail, declaration| Some(Box::new(DeclarationListTail { declaration, tail })))
    }

    /// `void ...` is always a function; otherwise `type ID (` is.
    fn parse_declaration(&mut self) -> Declaration {
        if self.current_kind() == SyntaxKind::Void
            || self.peek(2).kind == SyntaxKind::OpenRoundBracket
        {
            Declaration::Function(self.parse_fun_declaration())
        } else {
            Declaration::Variable(self.parse_var_declaration())
        }
    }

    pub(super) fn parse_var_declaration(&mut self) -> VarDeclaration {
        let ty = self.match_kind(SyntaxKind::Type);
        let identifier = self.match_kind(SyntaxKind::Identifier);

        let array_length = if self.current_kind() == SyntaxKind::OpenSquareBracket {
            self.match_kind(SyntaxKind::OpenSquareBracket);
            let length = self.match_kind(SyntaxKind::Number);
            self.match_kind(SyntaxKind::CloseSquareBracket);
            Some(length)
        } else {
            None
        };
        self.match_kind(SyntaxKind::Semicolon);

        VarDeclaration {
            ty,
            identifier,
            array_length,
        }
    }

    fn parse_fun_declaration(&mut self) -> FunctionDeclaration {
        let return_type = self.match_kind(SyntaxKind::Type);
        let identifier = self.match_kind(SyntaxKind::Identifier);

        self.match_kind(SyntaxKind::OpenRoundBracket);
        let params = self.parse_params();
        self.match_kind(SyntaxKind::CloseRoundBracket);

        let body = self.parse_compound_statement();

        FunctionDeclaration {
            return_type,
            identifier,
            params,
            body,
        }
    }

    fn parse_params(&mut self) -> Params {
        if self.current_kind() == SyntaxKind::Void
            && self.peek(1).kind == SyntaxKind::CloseRoundBracket
        {
            return Params::Void(self.next_token());
        }
        Params::List(self.parse_param_list())
    }

    fn parse_param_list(&mut self) -> ParamList {
        let param = self.parse_param();
        let tail = self.parse_param_list_tail();
        ParamList { param, tail }
    }

    fn parse_param_list_tail(&mut self) -> Option<Box<ParamListTail>> {
        let mut params = Vec::new();
        while self.current_kind() == SyntaxKind::Comma {
            self.match_kind(SyntaxKind::Comma);
            params.push(self.parse_param());
        }
        params
            .into_iter()
            .rev()
            .fold(None, |tail, param| Some(Box::new(ParamListTail { param, tail })))
    }

    fn parse_param(&mut self) -> Param {
        let ty = self.match_kind(SyntaxKind::Int);
        let identifier = self.match_kind(SyntaxKind::Identifier);
        if self.current_kind() != SyntaxKind::OpenSquareBracket {
            return Param { ty, identifier };
        }

        self.match_kind(SyntaxKind::OpenSquareBracket);
        self.match_kind(SyntaxKind::CloseSquareBracket);
        Param {
            ty: Token::new(SyntaxKind::IntPtrRef, ty.text, ty.line, ty.column),
            identifier,
        }
    }

    pub(super) fn parse_local_declarations(&mut self) -> Option<LocalDeclarations> {
        if !self.current_kind().is_type() {
            return None;
        }
        let declaration = self.parse_var_declaration();
        let tail = self.parse_local_declarations_tail();
        Some(LocalDeclarations { declaration, tail })
    }

    fn parse_local_declarations_tail(&mut self) -> Option<Box<LocalDeclarationsTail>> {
        let mut declarations = Vec::new();
        while self.current_kind().is_type() {
            declarations.push(self.parse_var_declaration());
        }
        declarations
            .into_iter()
            .rev()
            .fold(None, |tail, declaration| Some(Box::new(LocalDeclarationsTail { declaration, tail })))
    }
}
