use inkwell::{
    values::{BasicMetadataValueEnum, IntValue},
    IntPredicate,
};

use super::{CodeGenerator, Place, Storage, Symbol};
use crate::ast::{ArraySubscript, BinaryOperator, BinaryOperatorKind, CallFunction, Expr, LiteralType, Position};
use crate::error::CodegenError;

/// Result of lowering one expression.
#[derive(Debug, Clone, Copy)]
pub(super) enum Operand<'ctx> {
    /// A computed `i32`.
    Value(IntValue<'ctx>),
    /// Storage that has to be loaded to be read.
    Address(Place<'ctx>),
    /// Result of calling a `void` function.
    Void,
    /// Lowering failed and the problem was already reported.
    Error,
}

/// How an expression is named in diagnostics.
fn describe(expr: &Expr) -> String {
    match expr {
        Expr::Literal(lit) => format!("`{}`", lit.name),
        Expr::ArraySubscript(sub) => format!("`{}[...]`", sub.name),
        Expr::Call(call) => format!("the call to `{}`", call.name),
        Expr::Integer(int) => format!("`{}`", int.value),
        Expr::Binary(op) => format!("the `{}` expression", op.kind),
    }
}

fn predicate(kind: BinaryOperatorKind) -> Option<IntPredicate> {
    let predicate = match kind {
        BinaryOperatorKind::LessThan => IntPredicate::SLT,
        BinaryOperatorKind::LessThanOrEqualTo => IntPredicate::SLE,
        BinaryOperatorKind::EqualTo => IntPredicate::EQ,
        BinaryOperatorKind::NotEqualTo => IntPredicate::NE,
        BinaryOperatorKind::GreaterThanOrEqualTo => IntPredicate::SGE,
        BinaryOperatorKind::GreaterThan => IntPredicate::SGT,
        _ => return None,
    };
    Some(predicate)
}

impl<'ctx, 'd> CodeGenerator<'ctx, 'd> {
    pub(super) fn expression(&mut self, expr: &Expr) -> Result<Operand<'ctx>, CodegenError> {
        match expr {
            Expr::Integer(int) => Ok(Operand::Value(
                self.i32_type().const_int(int.value as i64 as u64, true),
            )),
            Expr::Literal(lit) => Ok(match self.variable(&lit.name, lit.position) {
                Some(place) => Operand::Address(place),
                None => Operand::Error,
            }),
            Expr::ArraySubscript(sub) => self.subscript(sub),
            Expr::Binary(op) => self.binary(op),
            Expr::Call(call) => self.call(call),
        }
    }

    /// Lower `expr` and load it if it is an `int` slot.
    pub(super) fn rvalue(&mut self, expr: &Expr) -> Result<Option<IntValue<'ctx>>, CodegenError> {
        let operand = self.expression(expr)?;
        self.load(operand, expr)
    }

    fn load(&mut self, operand: Operand<'ctx>, expr: &Expr) -> Result<Option<IntValue<'ctx>>, CodegenError> {
        let location = expr.position().location();
        match operand {
            Operand::Value(value) => Ok(Some(value)),
            Operand::Address(Place {
                ptr,
                storage: Storage::Int,
            }) => Ok(Some(
                self.builder
                    .build_load(self.i32_type(), ptr, "load")?
                    .into_int_value(),
            )),
            Operand::Address(_) => {
                self.diagnostics.semantic_error(
                    location,
                    format!("{} is an array and cannot be used as a value", describe(expr)),
                );
                Ok(None)
            }
            Operand::Void => {
                self.diagnostics.semantic_error(
                    location,
                    format!("{} returns `void` and has no value", describe(expr)),
                );
                Ok(None)
            }
            Operand::Error => Ok(None),
        }
    }

    fn variable(&mut self, name: &str, position: Position) -> Option<Place<'ctx>> {
        match self.scope.get_chain(name).cloned() {
            Some(Symbol::Value(place)) => Some(place),
            Some(Symbol::Function { .. }) => {
                self.diagnostics.semantic_error(
                    position.location(),
                    format!("function `{name}` cannot be used as a variable"),
                );
                None
            }
            None => {
                self.diagnostics
                    .semantic_error(position.location(), format!("undefined variable `{name}`"));
                None
            }
        }
    }

    /// Address of `name[offset]`.
    fn subscript(&mut self, sub: &ArraySubscript) -> Result<Operand<'ctx>, CodegenError> {
        let base = self.variable(&sub.name, sub.position);
        let index = self.rvalue(&sub.offset)?;
        let (Some(base), Some(index)) = (base, index) else {
            return Ok(Operand::Error);
        };

        let i32_type = self.i32_type();
        let element = match base.storage {
            Storage::Array { len } => unsafe {
                self.builder.build_in_bounds_gep(
                    i32_type.array_type(len),
                    base.ptr,
                    &[i32_type.const_zero(), index],
                    "elem",
                )?
            },
            Storage::ArrayRef => {
                let first = self
                    .builder
                    .build_load(self.int_ptr_type(), base.ptr, "arr")?
                    .into_pointer_value();
                unsafe { self.builder.build_in_bounds_gep(i32_type, first, &[index], "elem")? }
            }
            Storage::Int => {
                self.diagnostics.semantic_error(
                    sub.position.location(),
                    format!("`{}` is not an array and cannot be subscripted", sub.name),
                );
                return Ok(Operand::Error);
            }
        };
        Ok(Operand::Address(Place {
            ptr: element,
            storage: Storage::Int,
        }))
    }

    fn binary(&mut self, op: &BinaryOperator) -> Result<Operand<'ctx>, CodegenError> {
        let Some(right) = op.right.as_deref() else {
            self.diagnostics.codegen_error(
                op.position.location(),
                format!("operator `{}` is missing its right operand", op.kind),
            );
            return Ok(Operand::Error);
        };
        if op.kind == BinaryOperatorKind::Assignment {
            return self.assignment(op, right);
        }

        let left = self.rvalue(&op.left)?;
        let right = self.rvalue(right)?;
        let (Some(lhs), Some(rhs)) = (left, right) else {
            return Ok(Operand::Error);
        };

        let value = match op.kind {
            BinaryOperatorKind::Addition => self.builder.build_int_nsw_add(lhs, rhs, "add")?,
            BinaryOperatorKind::Subtraction => self.builder.build_int_nsw_sub(lhs, rhs, "sub")?,
            BinaryOperatorKind::Multiplication => self.builder.build_int_nsw_mul(lhs, rhs, "mul")?,
            BinaryOperatorKind::Division => self.builder.build_int_signed_div(lhs, rhs, "div")?,
            kind => match predicate(kind) {
                Some(predicate) => {
                    let flag = self.builder.build_int_compare(predicate, lhs, rhs, "cmp")?;
                    self.builder
                        .build_int_z_extend(flag, self.i32_type(), "bool")?
                }
                None => unreachable!("assignment is lowered separately"),
            },
        };
        Ok(Operand::Value(value))
    }

    /// Store the right operand into the left one; the stored value is the result.
    fn assignment(&mut self, op: &BinaryOperator, right: &Expr) -> Result<Operand<'ctx>, CodegenError> {
        let target = self.expression(&op.left)?;
        let value = self.rvalue(right)?;

        let place = match target {
            Operand::Address(place) if place.storage == Storage::Int => place,
            Operand::Address(_) => {
                self.diagnostics.semantic_error(
                    op.position.location(),
                    format!(
                        "cannot assign to array {}; assign to its elements instead",
                        describe(&op.left)
                    ),
                );
                return Ok(Operand::Error);
            }
            Operand::Value(_) | Operand::Void => {
                self.diagnostics.semantic_error(
                    op.position.location(),
                    format!("{} cannot be assigned to", describe(&op.left)),
                );
                return Ok(Operand::Error);
            }
            Operand::Error => return Ok(Operand::Error),
        };
        let Some(value) = value else {
            return Ok(Operand::Error);
        };
        self.builder.build_store(place.ptr, value)?;
        Ok(Operand::Value(value))
    }

    fn call(&mut self, call: &CallFunction) -> Result<Operand<'ctx>, CodegenError> {
        let location = call.position.location();
        let (function, params, returns) = match self.scope.get_chain(&call.name).cloned() {
            Some(Symbol::Function {
                function,
                params,
                returns,
                ..
            }) => (function, params, returns),
            Some(Symbol::Value(_)) => {
                self.diagnostics
                    .semantic_error(location, format!("`{}` is not a function", call.name));
                return Ok(Operand::Error);
            }
            None => {
                self.diagnostics
                    .semantic_error(location, format!("call to undefined function `{}`", call.name));
                return Ok(Operand::Error);
            }
        };

        if call.arguments.len() != params.len() {
            self.diagnostics.semantic_error(
                location,
                format!(
                    "`{}` expects {} argument(s) but {} were given",
                    call.name,
                    params.len(),
                    call.arguments.len()
                ),
            );
            return Ok(Operand::Error);
        }

        let mut args = Vec::with_capacity(params.len());
        let mut failed = false;
        for (idx, (arg, param)) in call.arguments.iter().zip(&params).enumerate() {
            match self.argument(call, idx + 1, arg, *param)? {
                Some(value) => args.push(value),
                None => failed = true,
            }
        }
        if failed {
            return Ok(Operand::Error);
        }

        if returns == LiteralType::Void {
            self.builder.build_call(function, &args, "")?;
            return Ok(Operand::Void);
        }
        let site = self.builder.build_call(function, &args, "call")?;
        Ok(match site.try_as_basic_value().left() {
            Some(value) => Operand::Value(value.into_int_value()),
            None => Operand::Void,
        })
    }

    /// Coerce argument `index` (1-based) to the parameter's representation:
    /// `int` parameters take a loaded value, `int[]` parameters a pointer to
    /// the first element.
    fn argument(
        &mut self,
        call: &CallFunction,
        index: usize,
        arg: &Expr,
        param: LiteralType,
    ) -> Result<Option<BasicMetadataValueEnum<'ctx>>, CodegenError> {
        let operand = self.expression(arg)?;
        let found = match (param, operand) {
            (_, Operand::Error) => return Ok(None),
            (LiteralType::IntPtr, Operand::Address(place)) => match place.storage {
                Storage::Array { len } => {
                    let zero = self.i32_type().const_zero();
                    let first = unsafe {
                        self.builder.build_in_bounds_gep(
                            self.i32_type().array_type(len),
                            place.ptr,
                            &[zero, zero],
                            "decay",
                        )
                    }?;
                    return Ok(Some(first.into()));
                }
                Storage::ArrayRef => {
                    let first = self
                        .builder
                        .build_load(self.int_ptr_type(), place.ptr, "arr")?
                        .into_pointer_value();
                    return Ok(Some(first.into()));
                }
                Storage::Int => "an `int`",
            },
            (LiteralType::IntPtr, Operand::Value(_)) => "an `int`",
            (_, Operand::Address(place)) if place.storage != Storage::Int => "an array",
            (_, Operand::Void) => "a `void` value",
            (_, operand) => return Ok(self.load(operand, arg)?.map(Into::into)),
        };

        self.diagnostics.semantic_error(
            arg.position().location(),
            format!(
                "argument {index} of `{}` must be `{param}`, found {found} ({})",
                call.name,
                describe(arg)
            ),
        );
        Ok(None)
    }
}
