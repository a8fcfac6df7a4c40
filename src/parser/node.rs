//! Generic, borrowed view over the Expression Tree for traversal and dumps.

use super::tree::*;
use crate::lexer::Token;
use crate::tree_dump::{self, TreeNode};

#[derive(Debug, Clone, Copy)]
pub enum CstNode<'a> {
    DeclarationList(&'a DeclarationList),
    DeclarationListTail(&'a DeclarationListTail),
    VarDeclaration(&'a VarDeclaration),
    FunctionDeclaration(&'a FunctionDeclaration),
    Params(&'a Params),
    ParamList(&'a ParamList),
    ParamListTail(&'a ParamListTail),
    Param(&'a Param),
    CompoundStatement(&'a CompoundStatement),
    LocalDeclarations(&'a LocalDeclarations),
    LocalDeclarationsTail(&'a LocalDeclarationsTail),
    StatementListTail(&'a StatementListTail),
    ExpressionStatement(&'a ExpressionStatement),
    SelectionStatement(&'a SelectionStatement),
    IterationStatement(&'a IterationStatement),
    ReturnStatement(&'a ReturnStatement),
    Assignment(&'a Assignment),
    Variable(&'a Variable),
    SimpleExpression(&'a SimpleExpression),
    AdditiveExpression(&'a AdditiveExpression),
    AdditiveTail(&'a AdditiveTail),
    Term(&'a Term),
    TermTail(&'a TermTail),
    Factor(&'a Factor),
    CallFunction(&'a CallFunction),
    Args(&'a Args),
    ArgsList(&'a ArgsList),
    ArgsListTail(&'a ArgsListTail),
    Token(&'a Token),
}

impl<'a> CstNode<'a> {
    pub fn name(&self) -> &'static str {
        match self {
            CstNode::DeclarationList(_) => "DeclarationList",
            CstNode::DeclarationListTail(_) => "DeclarationListTail",
            CstNode::VarDeclaration(_) => "VarDeclaration",
            CstNode::FunctionDeclaration(_) => "FunctionDeclaration",
            CstNode::Params(_) => "Params",
            CstNode::ParamList(_) => "ParamList",
            CstNode::ParamListTail(_) => "ParamListTail",
            CstNode::Param(_) => "Param",
            CstNode::CompoundStatement(_) => "CompoundStatement",
            CstNode::LocalDeclarations(_) => "LocalDeclarations",
            CstNode::LocalDeclarationsTail(_) => "LocalDeclarationsTail",
            CstNode::StatementListTail(_) => "StatementListTail",
            CstNode::ExpressionStatement(_) => "ExpressionStatement",
            CstNode::SelectionStatement(_) => "SelectionStatement",
            CstNode::IterationStatement(_) => "IterationStatement",
            CstNode::ReturnStatement(_) => "ReturnStatement",
            CstNode::Assignment(_) => "Assignment",
            CstNode::Variable(_) => "Variable",
            CstNode::SimpleExpression(_) => "SimpleExpression",
            CstNode::AdditiveExpression(_) => "AdditiveExpression",
            CstNode::AdditiveTail(_) => "AdditiveTail",
            CstNode::Term(_) => "Term",
            CstNode::TermTail(_) => "TermTail",
            CstNode::Factor(_) => "Factor",
            CstNode::CallFunction(_) => "CallFunction",
            CstNode::Args(_) => "Args",
            CstNode::ArgsList(_) => "ArgsList",
            CstNode::ArgsListTail(_) => "ArgsListTail",
            CstNode::Token(_) => "Token",
        }
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<CstNode<'a>> {
        let mut out = Vec::new();
        match *self {
            CstNode::DeclarationList(node) => {
                out.push(declaration(&node.declaration));
                if let Some(tail) = &node.tail {
                    out.push(CstNode::DeclarationListTail(tail));
                }
            }
            CstNode::DeclarationListTail(node) => {
                out.push(declaration(&node.declaration));
                if let Some(tail) = &node.tail {
                    out.push(CstNode::DeclarationListTail(tail));
                }
            }
            CstNode::VarDeclaration(node) => {
                out.push(CstNode::Token(&node.ty));
                out.push(CstNode::Token(&node.identifier));
                if let Some(length) = &node.array_length {
                    out.push(CstNode::Token(length));
                }
            }
            CstNode::FunctionDeclaration(node) => {
                out.push(CstNode::Token(&node.return_type));
                out.push(CstNode::Token(&node.identifier));
                out.push(CstNode::Params(&node.params));
                out.push(CstNode::CompoundStatement(&node.body));
            }
            CstNode::Params(Params::Void(token)) => out.push(CstNode::Token(token)),
            CstNode::Params(Params::List(list)) => out.push(CstNode::ParamList(list)),
            CstNode::ParamList(node) => {
                out.push(CstNode::Param(&node.param));
                if let Some(tail) = &node.tail {
                    out.push(CstNode::ParamListTail(tail));
                }
            }
            CstNode::ParamListTail(node) => {
                out.push(CstNode::Param(&node.param));
                if let Some(tail) = &node.tail {
                    out.push(CstNode::ParamListTail(tail));
                }
            }
            CstNode::Param(node) => {
                out.push(CstNode::Token(&node.ty));
                out.push(CstNode::Token(&node.identifier));
            }
            CstNode::CompoundStatement(node) => {
                if let Some(locals) = &node.local_declarations {
                    out.push(CstNode::LocalDeclarations(locals));
                }
                if let Some(statements) = &node.statements {
                    out.push(CstNode::StatementListTail(statements));
                }
            }
            CstNode::LocalDeclarations(node) => {
                out.push(CstNode::VarDeclaration(&node.declaration));
                if let Some(tail) = &node.tail {
                    out.push(CstNode::LocalDeclarationsTail(tail));
                }
            }
            CstNode::LocalDeclarationsTail(node) => {
                out.push(CstNode::VarDeclaration(&node.declaration));
                if let Some(tail) = &node.tail {
                    out.push(CstNode::LocalDeclarationsTail(tail));
                }
            }
            CstNode::StatementListTail(node) => {
                out.push(statement(&node.statement));
                if let Some(tail) = &node.tail {
                    out.push(CstNode::StatementListTail(tail));
                }
            }
            CstNode::ExpressionStatement(node) => {
                if let Some(expr) = &node.expression {
                    out.push(expression(expr));
                }
            }
            CstNode::SelectionStatement(node) => {
                out.push(expression(&node.condition));
                out.push(statement(&node.then_body));
                if let Some(else_body) = &node.else_body {
                    out.push(statement(else_body));
                }
            }
            CstNode::IterationStatement(node) => {
                out.push(expression(&node.condition));
                out.push(statement(&node.body));
            }
            CstNode::ReturnStatement(node) => {
                if let Some(expr) = &node.expression {
                    out.push(expression(expr));
                }
            }
            CstNode::Assignment(node) => {
                out.push(CstNode::Variable(&node.variable));
                out.push(expression(&node.value));
            }
            CstNode::Variable(node) => {
                out.push(CstNode::Token(&node.identifier));
                if let Some(offset) = &node.offset {
                    out.push(expression(offset));
                }
            }
            CstNode::SimpleExpression(node) => {
                out.push(CstNode::AdditiveExpression(&node.left));
                if let Some((op, right)) = &node.relation {
                    out.push(CstNode::Token(op));
                    out.push(CstNode::AdditiveExpression(right));
                }
            }
            CstNode::AdditiveExpression(node) => {
                out.push(CstNode::Term(&node.term));
                if let Some(tail) = &node.tail {
                    out.push(CstNode::AdditiveTail(tail));
                }
            }
            CstNode::AdditiveTail(node) => {
                out.push(CstNode::Token(&node.operator));
                out.push(CstNode::Term(&node.term));
                if let Some(tail) = &node.tail {
                    out.push(CstNode::AdditiveTail(tail));
                }
            }
            CstNode::Term(node) => {
                out.push(CstNode::Factor(&node.factor));
                if let Some(tail) = &node.tail {
                    out.push(CstNode::TermTail(tail));
                }
            }
            CstNode::TermTail(node) => {
                out.push(CstNode::Token(&node.operator));
                out.push(CstNode::Factor(&node.factor));
                if let Some(tail) = &node.tail {
                    out.push(CstNode::TermTail(tail));
                }
            }
            CstNode::Factor(Factor::Parenthesized(expr)) => out.push(expression(expr)),
            CstNode::Factor(Factor::Call(call)) => out.push(CstNode::CallFunction(call)),
            CstNode::Factor(Factor::Variable(var)) => out.push(CstNode::Variable(var)),
            CstNode::Factor(Factor::Number(token)) => out.push(CstNode::Token(token)),
            CstNode::CallFunction(node) => {
                out.push(CstNode::Token(&node.identifier));
                out.push(CstNode::Args(&node.args));
            }
            CstNode::Args(node) => {
                if let Some(list) = &node.list {
                    out.push(CstNode::ArgsList(list));
                }
            }
            CstNode::ArgsList(node) => {
                out.push(expression(&node.expression));
                if let Some(tail) = &node.tail {
                    out.push(CstNode::ArgsListTail(tail));
                }
            }
            CstNode::ArgsListTail(node) => {
                out.push(expression(&node.expression));
                if let Some(tail) = &node.tail {
                    out.push(CstNode::ArgsListTail(tail));
                }
            }
            CstNode::Token(_) => {}
        }
        out
    }
}

fn declaration(decl: &Declaration) -> CstNode<'_> {
    match decl {
        Declaration::Variable(var) => CstNode::VarDeclaration(var),
        Declaration::Function(func) => CstNode::FunctionDeclaration(func),
    }
}

fn statement(stmt: &Statement) -> CstNode<'_> {
    match stmt {
        Statement::Expression(s) => CstNode::ExpressionStatement(s),
        Statement::Compound(s) => CstNode::CompoundStatement(s),
        Statement::Selection(s) => CstNode::SelectionStatement(s),
        Statement::Iteration(s) => CstNode::IterationStatement(s),
        Statement::Return(s) => CstNode::ReturnStatement(s),
    }
}

fn expression(expr: &Expression) -> CstNode<'_> {
    match expr {
        Expression::Assignment(assign) => CstNode::Assignment(assign),
        Expression::Simple(simple) => CstNode::SimpleExpression(simple),
    }
}

impl<'a> TreeNode for CstNode<'a> {
    fn label(&self) -> String {
        match self {
            CstNode::Token(token) => format!("{:?} {} {}", token.kind, token, token.location()),
            other => other.name().to_string(),
        }
    }

    fn children(&self) -> Vec<Self> {
        CstNode::children(self)
    }
}

impl ExpressionTree {
    pub fn root_node(&self) -> CstNode<'_> {
        CstNode::DeclarationList(&self.root)
    }

    pub fn render(&self) -> String {
        tree_dump::render(&self.root_node())
    }
}
