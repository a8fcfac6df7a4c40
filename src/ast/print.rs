use super::*;
use crate::tree_dump::TreeNode;

/// Borrowed view of any AST node, for generic walks and dumps.
#[derive(Debug, Clone, Copy)]
pub enum AstNode<'a> {
    Program(&'a Program),
    Variable(&'a VariableDeclaration),
    Function(&'a FunctionDeclaration),
    Compound(&'a CompoundStatement),
    If(&'a IfStatement),
    While(&'a WhileStatement),
    Return(&'a ReturnStatement),
    Expr(&'a Expr),
}

impl<'a> AstNode<'a> {
    pub fn id(&self) -> NodeId {
        match self {
            AstNode::Program(node) => node.id,
            AstNode::Variable(node) => node.id,
            AstNode::Function(node) => node.id,
            AstNode::Compound(node) => node.id,
            AstNode::If(node) => node.id,
            AstNode::While(node) => node.id,
            AstNode::Return(node) => node.id,
            AstNode::Expr(node) => node.id(),
        }
    }

    pub fn children(&self) -> Vec<AstNode<'a>> {
        match *self {
            AstNode::Program(node) => node.declarations.iter().map(declaration).collect(),
            AstNode::Variable(_) => Vec::new(),
            AstNode::Function(node) => vec![AstNode::Compound(&node.body)],
            AstNode::Compound(node) => node
                .declarations
                .iter()
                .map(AstNode::Variable)
                .chain(node.statements.iter().map(statement))
                .collect(),
            AstNode::If(node) => {
                let mut out = vec![AstNode::Expr(&node.condition), AstNode::Compound(&node.then_body)];
                out.extend(node.else_body.as_ref().map(AstNode::Compound));
                out
            }
            AstNode::While(node) => vec![AstNode::Expr(&node.condition), AstNode::Compound(&node.body)],
            AstNode::Return(node) => node.expression.iter().map(AstNode::Expr).collect(),
            AstNode::Expr(expr) => match expr {
                Expr::Binary(op) => {
                    let mut out = vec![AstNode::Expr(op.left.as_ref())];
                    out.extend(op.right.as_deref().map(AstNode::Expr));
                    out
                }
                Expr::ArraySubscript(sub) => vec![AstNode::Expr(sub.offset.as_ref())],
                Expr::Call(call) => call.arguments.iter().map(AstNode::Expr).collect(),
                Expr::Literal(_) | Expr::Integer(_) => Vec::new(),
            },
        }
    }
}

fn declaration(decl: &Declaration) -> AstNode<'_> {
    match decl {
        Declaration::Variable(var) => AstNode::Variable(var),
        Declaration::Function(func) => AstNode::Function(func),
    }
}

fn statement(stmt: &Statement) -> AstNode<'_> {
    match stmt {
        Statement::Expression(expr) => AstNode::Expr(expr),
        Statement::Compound(node) => AstNode::Compound(node),
        Statement::If(node) => AstNode::If(node),
        Statement::While(node) => AstNode::While(node),
        Statement::Return(node) => AstNode::Return(node),
    }
}

impl<'a> TreeNode for AstNode<'a> {
    fn label(&self) -> String {
        match self {
            AstNode::Program(_) => "Program".to_string(),
            AstNode::Variable(var) => match var.array_length {
                Some(len) => format!("VariableDeclaration {}: int[{len}] {}", var.name, var.position),
                None => format!("VariableDeclaration {}: {} {}", var.name, var.ty, var.position),
            },
            AstNode::Function(func) => {
                let params: Vec<String> = func.parameters.iter().map(|p| format!("{} {}", p.ty, p.name)).collect();
                format!(
                    "FunctionDeclaration {} {}({}) {}",
                    func.return_type(),
                    func.name,
                    params.join(", "),
                    func.position
                )
            }
            AstNode::Compound(node) => format!("CompoundStatement {}", node.position),
            AstNode::If(node) => format!("If {}", node.position),
            AstNode::While(node) => format!("While {}", node.position),
            AstNode::Return(node) => format!("Return {}", node.position),
            AstNode::Expr(expr) => match expr {
                Expr::Binary(op) => format!("BinaryOperator {} {}", op.kind, op.position),
                Expr::Literal(lit) => format!("Literal {} {}", lit.name, lit.position),
                Expr::ArraySubscript(sub) => format!("ArraySubscript {} {}", sub.name, sub.position),
                Expr::Integer(int) => format!("IntegerLiteral {} {}", int.value, int.position),
                Expr::Call(call) => format!("CallFunction {} {}", call.name, call.position),
            },
        }
    }

    fn children(&self) -> Vec<Self> {
        AstNode::children(self)
    }
}
