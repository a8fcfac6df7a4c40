//! Lowering from the concrete Expression Tree to the AST.
//!
//! Total over well-typed trees: list/tail chains become vectors, precedence
//! chains become left-associative [`BinaryOperator`] nodes and every body of
//! an `if`/`while` becomes a [`CompoundStatement`].

use tracing::debug;

use super::*;
use crate::lexer::{SyntaxKind, Token};
use crate::parser::tree as cst;

#[derive(Debug, Default)]
pub struct AstBuilder {
    parents: Vec<Option<NodeId>>,
}

pub fn build(tree: &cst::ExpressionTree) -> Ast {
    AstBuilder::new().build(tree)
}

fn position(token: &Token) -> Position {
    Position {
        line: token.line,
        col: token.column,
    }
}

/// The parser only stores operator tokens in operator slots.
fn operator_kind(token: &Token) -> BinaryOperatorKind {
    match BinaryOperatorKind::from_syntax(token.kind) {
        Some(kind) => kind,
        None => unreachable!("{:?} token stored as a binary operator", token.kind),
    }
}

impl AstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build(mut self, tree: &cst::ExpressionTree) -> Ast {
        let program = self.program(&tree.root);
        debug!(
            stage = "ast",
            declarations = program.declarations.len(),
            nodes = self.parents.len(),
            "lowered expression tree"
        );
        Ast {
            program,
            parents: self.parents,
        }
    }

    fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.parents.len() as u32);
        self.parents.push(None);
        id
    }

    fn adopt(&mut self, parent: NodeId, child: NodeId) {
        self.parents[child.0 as usize] = Some(parent);
    }

    fn program(&mut self, list: &cst::DeclarationList) -> Program {
        let mut declarations = vec![self.declaration(&list.declaration)];
        let mut next = list.tail.as_deref();
        while let Some(tail) = next {
            declarations.push(self.declaration(&tail.declaration));
            next = tail.tail.as_deref();
        }

        let id = self.alloc();
        for decl in &declarations {
            self.adopt(id, decl.id());
        }
        Program { id, declarations }
    }

    fn declaration(&mut self, decl: &cst::Declaration) -> Declaration {
        match decl {
            cst::Declaration::Variable(var) => Declaration::Variable(self.variable_declaration(var)),
            cst::Declaration::Function(func) => Declaration::Function(self.function(func)),
        }
    }

    fn variable_declaration(&mut self, var: &cst::VarDeclaration) -> VariableDeclaration {
        let ty = match (var.ty.kind, &var.array_length) {
            (SyntaxKind::Void, _) => LiteralType::Void,
            (_, Some(_)) => LiteralType::IntPtr,
            (_, None) => LiteralType::Int,
        };
        let array_length = var
            .array_length
            .as_ref()
            .and_then(|token| token.value)
            .and_then(|value| u32::try_from(value).ok());

        VariableDeclaration {
            id: self.alloc(),
            position: position(&var.identifier),
            name: var.identifier.text.clone(),
            ty,
            array_length,
        }
    }

    fn function(&mut self, func: &cst::FunctionDeclaration) -> FunctionDeclaration {
        let return_type = match func.return_type.kind {
            SyntaxKind::Int => LiteralType::Int,
            _ => LiteralType::Void,
        };

        let mut parameters = Vec::new();
        if let cst::Params::List(list) = &func.params {
            parameters.push(parameter(&list.param));
            let mut next = list.tail.as_deref();
            while let Some(tail) = next {
                parameters.push(parameter(&tail.param));
                next = tail.tail.as_deref();
            }
        }

        let mut function_type = Vec::with_capacity(parameters.len() + 1);
        function_type.push(return_type);
        function_type.extend(parameters.iter().map(|p| p.ty));

        let body = self.compound(&func.body);
        let id = self.alloc();
        self.adopt(id, body.id);

        FunctionDeclaration {
            id,
            position: position(&func.identifier),
            name: func.identifier.text.clone(),
            function_type,
            parameters,
            body,
        }
    }

    fn compound(&mut self, compound: &cst::CompoundStatement) -> CompoundStatement {
        let mut declarations = Vec::new();
        if let Some(locals) = &compound.local_declarations {
            declarations.push(self.variable_declaration(&locals.declaration));
            let mut next = locals.tail.as_deref();
            while let Some(tail) = next {
                declarations.push(self.variable_declaration(&tail.declaration));
                next = tail.tail.as_deref();
            }
        }

        let mut statements = Vec::new();
        let mut next = compound.statements.as_deref();
        while let Some(item) = next {
            statements.push(self.statement(&item.statement));
            next = item.tail.as_deref();
        }

        let id = self.alloc();
        for decl in &declarations {
            self.adopt(id, decl.id);
        }
        for stmt in &statements {
            self.adopt(id, stmt.id());
        }
        CompoundStatement {
            id,
            position: position(&compound.open),
            declarations,
            statements,
        }
    }

    fn empty_compound(&mut self, at: Position) -> CompoundStatement {
        CompoundStatement {
            id: self.alloc(),
            position: at,
            declarations: Vec::new(),
            statements: Vec::new(),
        }
    }

    fn statement(&mut self, stmt: &cst::Statement) -> Statement {
        match stmt {
            cst::Statement::Expression(expr_stmt) => match &expr_stmt.expression {
                Some(expr) => Statement::Expression(self.expression(expr)),
                None => Statement::Compound(self.empty_compound(position(&expr_stmt.semicolon))),
            },
            cst::Statement::Compound(compound) => Statement::Compound(self.compound(compound)),
            cst::Statement::Selection(selection) => {
                let condition = self.expression(&selection.condition);
                let then_body = self.body(&selection.then_body);
                let else_body = selection.else_body.as_deref().map(|body| self.body(body));

                let id = self.alloc();
                self.adopt(id, condition.id());
                self.adopt(id, then_body.id);
                if let Some(else_body) = &else_body {
                    self.adopt(id, else_body.id);
                }
                Statement::If(IfStatement {
                    id,
                    position: position(&selection.keyword),
                    condition,
                    then_body,
                    else_body,
                })
            }
            cst::Statement::Iteration(iteration) => {
                let condition = self.expression(&iteration.condition);
                let body = self.body(&iteration.body);

                let id = self.alloc();
                self.adopt(id, condition.id());
                self.adopt(id, body.id);
                Statement::While(WhileStatement {
                    id,
                    position: position(&iteration.keyword),
                    condition,
                    body,
                })
            }
            cst::Statement::Return(ret) => {
                let expression = ret.expression.as_ref().map(|expr| self.expression(expr));
                let id = self.alloc();
                if let Some(expr) = &expression {
                    self.adopt(id, expr.id());
                }
                Statement::Return(ReturnStatement {
                    id,
                    position: position(&ret.keyword),
                    expression,
                })
            }
        }
    }

    /// Body of an `if`/`while`; a lone statement is wrapped in a compound.
    fn body(&mut self, stmt: &cst::Statement) -> CompoundStatement {
        match self.statement(stmt) {
            Statement::Compound(compound) => compound,
            other => {
                let id = self.alloc();
                self.adopt(id, other.id());
                CompoundStatement {
                    id,
                    position: other.position(),
                    declarations: Vec::new(),
                    statements: vec![other],
                }
            }
        }
    }

    fn expression(&mut self, expr: &cst::Expression) -> Expr {
        match expr {
            cst::Expression::Assignment(assign) => {
                let target = self.variable(&assign.variable);
                let value = self.expression(&assign.value);
                self.binary(&assign.operator, target, value)
            }
            cst::Expression::Simple(simple) => self.simple(simple),
        }
    }

    fn binary(&mut self, operator: &Token, left: Expr, right: Expr) -> Expr {
        let id = self.alloc();
        self.adopt(id, left.id());
        self.adopt(id, right.id());
        Expr::Binary(BinaryOperator {
            id,
            position: position(operator),
            kind: operator_kind(operator),
            left: Box::new(left),
            right: Some(Box::new(right)),
        })
    }

    fn simple(&mut self, simple: &cst::SimpleExpression) -> Expr {
        let left = self.additive(&simple.left);
        match &simple.relation {
            Some((operator, right)) => {
                let right = self.additive(right);
                self.binary(operator, left, right)
            }
            None => left,
        }
    }

    fn additive(&mut self, additive: &cst::AdditiveExpression) -> Expr {
        let mut acc = self.term(&additive.term);
        let mut next = additive.tail.as_deref();
        while let Some(tail) = next {
            let rhs = self.term(&tail.term);
            acc = self.binary(&tail.operator, acc, rhs);
            next = tail.tail.as_deref();
        }
        acc
    }

    fn term(&mut self, term: &cst::Term) -> Expr {
        let mut acc = self.factor(&term.factor);
        let mut next = term.tail.as_deref();
        while let Some(tail) = next {
            let rhs = self.factor(&tail.factor);
            acc = self.binary(&tail.operator, acc, rhs);
            next = tail.tail.as_deref();
        }
        acc
    }

    fn factor(&mut self, factor: &cst::Factor) -> Expr {
        match factor {
            cst::Factor::Parenthesized(inner) => self.expression(inner),
            cst::Factor::Call(call) => self.call(call),
            cst::Factor::Variable(var) => self.variable(var),
            cst::Factor::Number(token) => Expr::Integer(IntegerLiteral {
                id: self.alloc(),
                position: position(token),
                value: token.value.unwrap_or(0),
            }),
        }
    }

    fn variable(&mut self, var: &cst::Variable) -> Expr {
        let Some(offset) = &var.offset else {
            return Expr::Literal(Literal {
                id: self.alloc(),
                position: position(&var.identifier),
                name: var.identifier.text.clone(),
            });
        };

        let offset = self.expression(offset);
        let id = self.alloc();
        self.adopt(id, offset.id());
        Expr::ArraySubscript(ArraySubscript {
            id,
            position: position(&var.identifier),
            name: var.identifier.text.clone(),
            offset: Box::new(offset),
        })
    }

    fn call(&mut self, call: &cst::CallFunction) -> Expr {
        let mut arguments = Vec::new();
        if let Some(list) = &call.args.list {
            arguments.push(self.expression(&list.expression));
            let mut next = list.tail.as_deref();
            while let Some(tail) = next {
                arguments.push(self.expression(&tail.expression));
                next = tail.tail.as_deref();
            }
        }

        let id = self.alloc();
        for arg in &arguments {
            self.adopt(id, arg.id());
        }
        Expr::Call(CallFunction {
            id,
            position: position(&call.identifier),
            name: call.identifier.text.clone(),
            arguments,
        })
    }
}

fn parameter(param: &cst::Param) -> Parameter {
    let ty = match param.ty.kind {
        SyntaxKind::IntPtrRef => LiteralType::IntPtr,
        _ => LiteralType::Int,
    };
    Parameter {
        name: param.identifier.text.clone(),
        ty,
        position: position(&param.identifier),
    }
}
