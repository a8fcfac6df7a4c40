use std::mem;

use inkwell::{basic_block::BasicBlock, values::IntValue, IntPredicate};
use tracing::debug;

use super::{CodeGenerator, FunctionContext};
use crate::ast::{CompoundStatement, Expr, IfStatement, LiteralType, ReturnStatement, Statement, WhileStatement};
use crate::error::CodegenError;

/// Where control is after lowering a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow<'ctx> {
    /// Falls through; the next statement continues in this block.
    Open(BasicBlock<'ctx>),
    /// Every path ended in a terminator.
    Closed,
}

impl<'ctx, 'd> CodeGenerator<'ctx, 'd> {
    /// Lower `compound` into the current scope, starting at the end of `block`.
    pub(super) fn compound_items(
        &mut self,
        cx: &FunctionContext<'ctx, '_>,
        compound: &CompoundStatement,
        block: BasicBlock<'ctx>,
    ) -> Result<Flow<'ctx>, CodegenError> {
        self.builder.position_at_end(block);
        for var in &compound.declarations {
            self.local_variable(var)?;
        }

        let mut flow = Flow::Open(block);
        for statement in &compound.statements {
            let Flow::Open(current) = flow else {
                debug!(function = cx.name, position = %statement.position(), "dropping unreachable statement");
                break;
            };
            flow = self.statement(cx, statement, current)?;
        }
        Ok(flow)
    }

    /// Lower `compound` in a fresh scope of its own.
    pub(super) fn compound(
        &mut self,
        cx: &FunctionContext<'ctx, '_>,
        compound: &CompoundStatement,
        block: BasicBlock<'ctx>,
    ) -> Result<Flow<'ctx>, CodegenError> {
        self.scope = mem::take(&mut self.scope).enter();
        let flow = self.compound_items(cx, compound, block);
        self.scope = mem::take(&mut self.scope).leave();
        flow
    }

    pub(super) fn statement(
        &mut self,
        cx: &FunctionContext<'ctx, '_>,
        statement: &Statement,
        block: BasicBlock<'ctx>,
    ) -> Result<Flow<'ctx>, CodegenError> {
        self.builder.position_at_end(block);
        match statement {
            Statement::Expression(expr) => {
                self.expression(expr)?;
                Ok(Flow::Open(block))
            }
            Statement::Compound(compound) => self.compound(cx, compound, block),
            Statement::If(stmt) => self.if_statement(cx, stmt),
            Statement::While(stmt) => self.while_statement(cx, stmt),
            Statement::Return(stmt) => self.return_statement(cx, stmt),
        }
    }

    /// `value != 0` as an `i1`. A condition that failed to lower becomes
    /// constant false so both bodies still get checked.
    fn condition(&mut self, expr: &Expr) -> Result<IntValue<'ctx>, CodegenError> {
        match self.rvalue(expr)? {
            Some(value) => Ok(self.builder.build_int_compare(
                IntPredicate::NE,
                value,
                self.i32_type().const_zero(),
                "cond",
            )?),
            None => Ok(self.context.bool_type().const_zero()),
        }
    }

    fn if_statement(&mut self, cx: &FunctionContext<'ctx, '_>, stmt: &IfStatement) -> Result<Flow<'ctx>, CodegenError> {
        let condition = self.condition(&stmt.condition)?;
        let then_block = self.context.append_basic_block(cx.function, "then");

        let Some(else_body) = &stmt.else_body else {
            let not_block = self.context.append_basic_block(cx.function, "not");
            self.builder
                .build_conditional_branch(condition, then_block, not_block)?;
            if let Flow::Open(end) = self.compound(cx, &stmt.then_body, then_block)? {
                self.builder.position_at_end(end);
                self.builder.build_unconditional_branch(not_block)?;
            }
            return Ok(Flow::Open(not_block));
        };

        let else_block = self.context.append_basic_block(cx.function, "else");
        self.builder
            .build_conditional_branch(condition, then_block, else_block)?;
        let then_flow = self.compound(cx, &stmt.then_body, then_block)?;
        let else_flow = self.compound(cx, else_body, else_block)?;
        if then_flow == Flow::Closed && else_flow == Flow::Closed {
            return Ok(Flow::Closed);
        }

        let merge = self.context.append_basic_block(cx.function, "merge");
        for flow in [then_flow, else_flow] {
            if let Flow::Open(end) = flow {
                self.builder.position_at_end(end);
                self.builder.build_unconditional_branch(merge)?;
            }
        }
        Ok(Flow::Open(merge))
    }

    fn while_statement(
        &mut self,
        cx: &FunctionContext<'ctx, '_>,
        stmt: &WhileStatement,
    ) -> Result<Flow<'ctx>, CodegenError> {
        let logic = self.context.append_basic_block(cx.function, "logic");
        let body = self.context.append_basic_block(cx.function, "loop");
        let end = self.context.append_basic_block(cx.function, "loop_end");

        self.builder.build_unconditional_branch(logic)?;
        self.builder.position_at_end(logic);
        let condition = self.condition(&stmt.condition)?;
        self.builder.build_conditional_branch(condition, body, end)?;

        if let Flow::Open(last) = self.compound(cx, &stmt.body, body)? {
            self.builder.position_at_end(last);
            self.builder.build_unconditional_branch(logic)?;
        }
        Ok(Flow::Open(end))
    }

    fn return_statement(
        &mut self,
        cx: &FunctionContext<'ctx, '_>,
        stmt: &ReturnStatement,
    ) -> Result<Flow<'ctx>, CodegenError> {
        let location = stmt.position.location();
        match (cx.return_type, &stmt.expression) {
            (LiteralType::Void, None) => self.return_void(cx)?,
            (LiteralType::Void, Some(expr)) => {
                self.expression(expr)?;
                self.diagnostics.semantic_error(
                    location,
                    format!("void function `{}` cannot return a value", cx.name),
                );
                self.return_void(cx)?;
            }
            (_, None) => {
                self.diagnostics.semantic_warning(
                    location,
                    format!("`return;` in function `{}` returning `int`; returning 1", cx.name),
                );
                self.builder
                    .build_return(Some(&self.i32_type().const_int(1, false)))?;
            }
            (_, Some(expr)) => {
                let value = self
                    .rvalue(expr)?
                    .unwrap_or_else(|| self.i32_type().const_zero());
                self.builder.build_return(Some(&value))?;
            }
        }
        Ok(Flow::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{block_names, with_module};
    use crate::diagnostics::DiagnosticKind;

    #[test]
    fn single_branch_if_falls_through_to_not() {
        let ((names, verified), diagnostics) = with_module(
            &["void main(void) { int x; x = input(); if (x > 3) output(x); output(0); }"],
            |g| (block_names(g, "main"), g.verify()),
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        verified.unwrap();
        assert_eq!(names, vec!["entry", "comps", "then", "not"]);
    }

    #[test]
    fn statements_after_return_are_not_lowered() {
        let ((ir, verified), diagnostics) = with_module(
            &["int f(void) { return 2; output(7); }", "void main(void) { output(f()); }"],
            |g| (g.print_ir(), g.verify()),
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        verified.unwrap();
        let f = &ir[ir.find("define i32 @f").unwrap()..];
        let f = &f[..f.find("\n}").unwrap()];
        assert!(!f.contains("@output"), "{f}");
    }

    #[test]
    fn returning_a_value_from_void_is_an_error() {
        let (_, diagnostics) = with_module(&["void main(void) { return 1; }"], |_| ());
        let errors: Vec<_> = diagnostics.of_kind(DiagnosticKind::SemanticError).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("main"));
    }

    #[test]
    fn bare_return_in_int_function_warns() {
        let ((_, verified), diagnostics) = with_module(
            &["int f(void) { return; }", "void main(void) { f(); }"],
            |g| ((), g.verify()),
        );
        verified.unwrap();
        assert!(!diagnostics.has_errors());
        assert_eq!(diagnostics.of_kind(DiagnosticKind::SemanticWarning).count(), 1);
    }

    #[test]
    fn nested_returns_in_a_loop_verify() {
        let ((_, verified), diagnostics) = with_module(
            &[
                "int find(int a[], int n, int key) {",
                "  int i; i = 0;",
                "  while (i < n) { if (a[i] == key) return i; i = i + 1; }",
                "  return 0 - 1;",
                "}",
                "void main(void) { int v[3]; v[0] = 4; v[1] = 5; v[2] = 6; output(find(v, 3, 5)); }",
            ],
            |g| ((), g.verify()),
        );
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        verified.unwrap();
    }
}
