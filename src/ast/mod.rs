//! Abstract syntax tree consumed by code generation.
//!
//! Children are owned by their parents. Every node also has a [`NodeId`];
//! the non-owning child → parent links live in a side table on [`Ast`].

mod builder;
mod operator;
mod print;

pub use builder::{build, AstBuilder};
pub use operator::BinaryOperatorKind;
pub use print::AstNode;

use std::fmt;

use crate::diagnostics::TextLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn location(self) -> TextLocation {
        TextLocation::new(self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.line, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralType {
    Void,
    Int,
    IntPtr,
    Function,
}

impl fmt::Display for LiteralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LiteralType::Void => "void",
            LiteralType::Int => "int",
            LiteralType::IntPtr => "int[]",
            LiteralType::Function => "function",
        };
        f.write_str(name)
    }
}

/// A lowered compilation unit plus its parent table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ast {
    pub program: Program,
    parents: Vec<Option<NodeId>>,
}

impl Ast {
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.0 as usize).copied().flatten()
    }

    pub fn node_count(&self) -> usize {
        self.parents.len()
    }

    pub fn render(&self) -> String {
        crate::tree_dump::render(&AstNode::Program(&self.program))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub id: NodeId,
    pub declarations: Vec<Declaration>,
}

impl Program {
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDeclaration> {
        self.declarations.iter().filter_map(|decl| match decl {
            Declaration::Function(func) => Some(func),
            Declaration::Variable(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Variable(VariableDeclaration),
    Function(FunctionDeclaration),
}

impl Declaration {
    pub fn id(&self) -> NodeId {
        match self {
            Declaration::Variable(var) => var.id,
            Declaration::Function(func) => func.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Declaration::Variable(var) => &var.name,
            Declaration::Function(func) => &func.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclaration {
    pub id: NodeId,
    pub position: Position,
    pub name: String,
    /// `Int` or `IntPtr` for a well-formed program.
    pub ty: LiteralType,
    pub array_length: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub ty: LiteralType,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclaration {
    pub id: NodeId,
    pub position: Position,
    pub name: String,
    /// Return type followed by one entry per parameter.
    pub function_type: Vec<LiteralType>,
    pub parameters: Vec<Parameter>,
    pub body: CompoundStatement,
}

impl FunctionDeclaration {
    pub fn return_type(&self) -> LiteralType {
        self.function_type.first().copied().unwrap_or(LiteralType::Void)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundStatement {
    pub id: NodeId,
    pub position: Position,
    pub declarations: Vec<VariableDeclaration>,
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Expression(Expr),
    Compound(CompoundStatement),
    If(IfStatement),
    While(WhileStatement),
    Return(ReturnStatement),
}

impl Statement {
    pub fn id(&self) -> NodeId {
        match self {
            Statement::Expression(expr) => expr.id(),
            Statement::Compound(stmt) => stmt.id,
            Statement::If(stmt) => stmt.id,
            Statement::While(stmt) => stmt.id,
            Statement::Return(stmt) => stmt.id,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Statement::Expression(expr) => expr.position(),
            Statement::Compound(stmt) => stmt.position,
            Statement::If(stmt) => stmt.position,
            Statement::While(stmt) => stmt.position,
            Statement::Return(stmt) => stmt.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfStatement {
    pub id: NodeId,
    pub position: Position,
    pub condition: Expr,
    pub then_body: CompoundStatement,
    pub else_body: Option<CompoundStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhileStatement {
    pub id: NodeId,
    pub position: Position,
    pub condition: Expr,
    pub body: CompoundStatement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStatement {
    pub id: NodeId,
    pub position: Position,
    pub expression: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Binary(BinaryOperator),
    Literal(Literal),
    ArraySubscript(ArraySubscript),
    Integer(IntegerLiteral),
    Call(CallFunction),
}

impl Expr {
    pub fn id(&self) -> NodeId {
        match self {
            Expr::Binary(e) => e.id,
            Expr::Literal(e) => e.id,
            Expr::ArraySubscript(e) => e.id,
            Expr::Integer(e) => e.id,
            Expr::Call(e) => e.id,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Expr::Binary(e) => e.position,
            Expr::Literal(e) => e.position,
            Expr::ArraySubscript(e) => e.position,
            Expr::Integer(e) => e.position,
            Expr::Call(e) => e.position,
        }
    }
}

/// `right` is `None` only in hand-built trees; the builder always fills it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryOperator {
    pub id: NodeId,
    pub position: Position,
    pub kind: BinaryOperatorKind,
    pub left: Box<Expr>,
    pub right: Option<Box<Expr>>,
}

/// A plain identifier reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub id: NodeId,
    pub position: Position,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArraySubscript {
    pub id: NodeId,
    pub position: Position,
    pub name: String,
    pub offset: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerLiteral {
    pub id: NodeId,
    pub position: Position,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFunction {
    pub id: NodeId,
    pub position: Position,
    pub name: String,
    pub arguments: Vec<Expr>,
}
