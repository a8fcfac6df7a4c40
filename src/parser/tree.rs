//! Concrete syntax tree ("Expression Tree").
//!
//! One type per grammar production. The `*Tail` types are the right-recursive
//! continuations of the predictive grammar; `None` marks the end of a list.

use crate::lexer::Token;

/// Drop, clone and compare `*Tail` chains one link at a time instead of
/// recursing once per list element.
macro_rules! linked_tail {
    ($($tail:ident { $($field:ident),+ }),+ $(,)?) => {$(
        impl Drop for $tail {
            fn drop(&mut self) {
                let mut next = self.tail.take();
                while let Some(mut link) = next {
                    next = link.tail.take();
                }
            }
        }

        impl Clone for $tail {
            fn clone(&self) -> Self {
                let mut links = Vec::new();
                let mut next = self.tail.as_deref();
                while let Some(link) = next {
                    links.push(link);
                    next = link.tail.as_deref();
                }
                let tail = links.into_iter().rev().fold(None, |tail, link| {
                    Some(Box::new($tail {
                        $($field: link.$field.clone(),)+
                        tail,
                    }))
                });
                $tail {
                    $($field: self.$field.clone(),)+
                    tail,
                }
            }
        }

        impl PartialEq for $tail {
            fn eq(&self, other: &Self) -> bool {
                let (mut left, mut right) = (Some(self), Some(other));
                loop {
                    match (left, right) {
                        (None, None) => return true,
                        (Some(l), Some(r)) => {
                            if $(l.$field != r.$field)||+ {
                                return false;
                            }
                            left = l.tail.as_deref();
                            right = r.tail.as_deref();
                        }
                        _ => return false,
                    }
                }
            }
        }

        impl Eq for $tail {}
    )+};
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionTree {
    pub root: DeclarationList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationList {
    pub declaration: Declaration,
    pub tail: Option<Box<DeclarationListTail>>,
}

#[derive(Debug)]
pub struct DeclarationListTail {
    pub declaration: Declaration,
    pub tail: Option<Box<DeclarationListTail>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Variable(VarDeclaration),
    Function(FunctionDeclaration),
}

/// `type ID ;` or `type ID [ NUM ] ;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDeclaration {
    pub ty: Token,
    pub identifier: Token,
    pub array_length: Option<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDeclaration {
    pub return_type: Token,
    pub identifier: Token,
    pub params: Params,
    pub body: CompoundStatement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Params {
    /// `( void )`
    Void(Token),
    List(ParamList),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamList {
    pub param: Param,
    pub tail: Option<Box<ParamListTail>>,
}

#[derive(Debug)]
pub struct ParamListTail {
    pub param: Param,
    pub tail: Option<Box<ParamListTail>>,
}

/// `int ID` or `int ID [ ]`; the latter carries an `IntPtrRef` type token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub ty: Token,
    pub identifier: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundStatement {
    pub open: Token,
    pub local_declarations: Option<LocalDeclarations>,
    pub statements: Option<Box<StatementListTail>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalDeclarations {
    pub declaration: VarDeclaration,
    pub tail: Option<Box<LocalDeclarationsTail>>,
}

#[derive(Debug)]
pub struct LocalDeclarationsTail {
    pub declaration: VarDeclaration,
    pub tail: Option<Box<LocalDeclarationsTail>>,
}

#[derive(Debug)]
pub struct StatementListTail {
    pub statement: Statement,
    pub tail: Option<Box<StatementListTail>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Expression(ExpressionStatement),
    Compound(CompoundStatement),
    Selection(SelectionStatement),
    Iteration(IterationStatement),
    Return(ReturnStatement),
}

/// `expr ;` or the empty statement `;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionStatement {
    pub expression: Option<Expression>,
    pub semicolon: Token,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionStatement {
    pub keyword: Token,
    pub condition: Expression,
    pub then_body: Box<Statement>,
    pub else_body: Option<Box<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationStatement {
    pub keyword: Token,
    pub condition: Expression,
    pub body: Box<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnStatement {
    pub keyword: Token,
    pub expression: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Assignment(Box<Assignment>),
    Simple(SimpleExpression),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub variable: Variable,
    pub operator: Token,
    pub value: Expression,
}

/// `ID` or `ID [ expr ]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub identifier: Token,
    pub offset: Option<Box<Expression>>,
}

impl Variable {
    pub fn is_array_ref(&self) -> bool {
        self.offset.is_some()
    }
}

/// At most one relational operator; relations do not chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleExpression {
    pub left: AdditiveExpression,
    pub relation: Option<(Token, AdditiveExpression)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditiveExpression {
    pub term: Term,
    pub tail: Option<Box<AdditiveTail>>,
}

#[derive(Debug)]
pub struct AdditiveTail {
    pub operator: Token,
    pub term: Term,
    pub tail: Option<Box<AdditiveTail>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub factor: Factor,
    pub tail: Option<Box<TermTail>>,
}

#[derive(Debug)]
pub struct TermTail {
    pub operator: Token,
    pub factor: Factor,
    pub tail: Option<Box<TermTail>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Factor {
    Parenthesized(Box<Expression>),
    Call(CallFunction),
    Variable(Variable),
    Number(Token),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFunction {
    pub identifier: Token,
    pub args: Args,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub list: Option<Box<ArgsList>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgsList {
    pub expression: Expression,
    pub tail: Option<Box<ArgsListTail>>,
}

#[derive(Debug)]
pub struct ArgsListTail {
    pub expression: Expression,
    pub tail: Option<Box<ArgsListTail>>,
}

linked_tail! {
    DeclarationListTail { declaration },
    ParamListTail { param },
    LocalDeclarationsTail { declaration },
    StatementListTail { statement },
    AdditiveTail { operator, term },
    TermTail { operator, factor },
    ArgsListTail { expression },
}
