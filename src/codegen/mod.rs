//! LLVM IR generation for C-minus programs using inkwell.
//!
//! [`CodeGenerator::generate`] walks the AST once in program order. User
//! errors become diagnostics and lowering carries on; a `CodegenError` means
//! LLVM itself refused an operation.
//!
//! Every function gets two fixed blocks: `entry` holds the stack slots of
//! parameters and locals (all of them, however deeply nested) and ends with
//! a branch to `comps`, where the statements start.

mod expr;
mod intrinsics;
mod stmt;

use std::mem;
use std::path::Path;

use inkwell::{
    basic_block::BasicBlock,
    builder::Builder,
    context::Context,
    module::Module,
    targets::{CodeModel, FileType, InitializationConfig, RelocMode, Target, TargetMachine, TargetTriple},
    types::{BasicMetadataTypeEnum, BasicTypeEnum, IntType, PointerType},
    values::{FunctionValue, PointerValue},
    AddressSpace, OptimizationLevel,
};
use tracing::{debug, info};

use crate::ast::{Declaration, FunctionDeclaration, LiteralType, Position, Program, VariableDeclaration};
use crate::diagnostics::{Diagnostics, TextLocation};
use crate::error::CodegenError;
use crate::symbols::{Redefinition, SymbolTable};

pub use stmt::Flow;

/// What a pointer to a variable points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// One `i32`.
    Int,
    /// `[len x i32]`, a declared array.
    Array { len: u32 },
    /// A slot holding a pointer to the first element of the caller's array.
    ArrayRef,
}

#[derive(Debug, Clone, Copy)]
pub struct Place<'ctx> {
    pub ptr: PointerValue<'ctx>,
    pub storage: Storage,
}

#[derive(Debug, Clone)]
pub enum Symbol<'ctx> {
    Function {
        function: FunctionValue<'ctx>,
        params: Vec<LiteralType>,
        returns: LiteralType,
    },
    /// A global, local or parameter slot.
    Value(Place<'ctx>),
}

/// Per-function facts needed while lowering its statements.
#[derive(Debug, Clone, Copy)]
pub struct FunctionContext<'ctx, 'a> {
    pub function: FunctionValue<'ctx>,
    pub name: &'a str,
    pub return_type: LiteralType,
    /// `void main`: the C runtime still reads an exit status, so it returns `i32 0`.
    pub entry_point: bool,
}

pub struct CodeGenerator<'ctx, 'd> {
    context: &'ctx Context,
    module: Module<'ctx>,
    builder: Builder<'ctx>,
    /// Positioned at the end of the current function's `entry` block.
    allocas: Builder<'ctx>,
    scope: SymbolTable<Symbol<'ctx>>,
    diagnostics: &'d mut Diagnostics,
}

impl<'ctx, 'd> CodeGenerator<'ctx, 'd> {
    /// Create a module named `module_name` with `input` and `output` already
    /// defined and bound in the global scope.
    pub fn new(
        context: &'ctx Context,
        module_name: &str,
        diagnostics: &'d mut Diagnostics,
    ) -> Result<Self, CodegenError> {
        let mut generator = Self {
            context,
            module: context.create_module(module_name),
            builder: context.create_builder(),
            allocas: context.create_builder(),
            scope: SymbolTable::new(),
            diagnostics,
        };
        generator.define_intrinsics()?;
        Ok(generator)
    }

    pub fn module(&self) -> &Module<'ctx> {
        &self.module
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        self.diagnostics
    }

    /// Lower every declaration of `program`, then check that `main` comes last.
    pub fn generate(&mut self, program: &Program) -> Result<(), CodegenError> {
        let before = self.diagnostics.len();
        for decl in &program.declarations {
            match decl {
                Declaration::Variable(var) => self.global_variable(var)?,
                Declaration::Function(func) => self.function(func)?,
            }
        }
        self.check_main(program);

        info!(
            stage = "codegen",
            declarations = program.declarations.len(),
            diagnostics = self.diagnostics.len() - before,
            "generated module"
        );
        Ok(())
    }

    fn i32_type(&self) -> IntType<'ctx> {
        self.context.i32_type()
    }

    fn int_ptr_type(&self) -> PointerType<'ctx> {
        self.i32_type().ptr_type(AddressSpace::default())
    }

    fn storage_type(&self, storage: Storage) -> BasicTypeEnum<'ctx> {
        match storage {
            Storage::Int => self.i32_type().into(),
            Storage::Array { len } => self.i32_type().array_type(len).into(),
            Storage::ArrayRef => self.int_ptr_type().into(),
        }
    }

    /// Bind `name` in the innermost scope, reporting a redefinition instead.
    fn bind(&mut self, name: &str, position: Position, what: &str, symbol: Symbol<'ctx>) -> bool {
        match self.scope.add(name, symbol) {
            Ok(()) => true,
            Err(Redefinition(name)) => {
                self.diagnostics
                    .semantic_error(position.location(), format!("redefinition of {what} `{name}`"));
                false
            }
        }
    }

    fn variable_storage(&mut self, var: &VariableDeclaration) -> Option<Storage> {
        match (var.ty, var.array_length) {
            (LiteralType::Int, _) => Some(Storage::Int),
            (LiteralType::IntPtr, Some(len)) => Some(Storage::Array { len }),
            (LiteralType::IntPtr, None) => {
                self.diagnostics.semantic_error(
                    var.position.location(),
                    format!("array `{}` must declare its length", var.name),
                );
                None
            }
            (other, _) => {
                self.diagnostics.semantic_error(
                    var.position.location(),
                    format!(
                        "variable `{}` cannot have type `{other}`, expected `int` or `int[]`",
                        var.name
                    ),
                );
                None
            }
        }
    }

    /// Zero-initialised module-level definition.
    fn global_variable(&mut self, var: &VariableDeclaration) -> Result<(), CodegenError> {
        let Some(storage) = self.variable_storage(var) else {
            return Ok(());
        };

        let global = self
            .module
            .add_global(self.storage_type(storage), Some(AddressSpace::default()), &var.name);
        match storage {
            Storage::Array { len } => global.set_initializer(&self.i32_type().array_type(len).const_zero()),
            _ => global.set_initializer(&self.i32_type().const_zero()),
        }

        let place = Place {
            ptr: global.as_pointer_value(),
            storage,
        };
        self.bind(&var.name, var.position, "variable", Symbol::Value(place));
        Ok(())
    }

    /// Stack slot in the current function's `entry` block.
    fn local_variable(&mut self, var: &VariableDeclaration) -> Result<(), CodegenError> {
        let Some(storage) = self.variable_storage(var) else {
            return Ok(());
        };
        let ptr = self.allocas.build_alloca(self.storage_type(storage), &var.name)?;
        self.bind(&var.name, var.position, "variable", Symbol::Value(Place { ptr, storage }));
        Ok(())
    }

    fn function(&mut self, func: &FunctionDeclaration) -> Result<(), CodegenError> {
        let location = func.position.location();
        let return_type = func.return_type();
        if !matches!(return_type, LiteralType::Int | LiteralType::Void) {
            self.diagnostics.semantic_error(
                location,
                format!(
                    "function `{}` must return `int` or `void`, not `{return_type}`",
                    func.name
                ),
            );
            return Ok(());
        }

        let mut param_types: Vec<BasicMetadataTypeEnum> = Vec::with_capacity(func.parameters.len());
        for param in &func.parameters {
            match param.ty {
                LiteralType::Int => param_types.push(self.i32_type().into()),
                LiteralType::IntPtr => param_types.push(self.int_ptr_type().into()),
                other => {
                    self.diagnostics.semantic_error(
                        param.position.location(),
                        format!(
                            "parameter `{}` of `{}` cannot have type `{other}`",
                            param.name, func.name
                        ),
                    );
                    return Ok(());
                }
            }
        }

        let entry_point = func.name == "main" && return_type == LiteralType::Void;
        let fn_type = match return_type {
            LiteralType::Int => self.i32_type().fn_type(&param_types, false),
            _ if entry_point => self.i32_type().fn_type(&param_types, false),
            _ => self.context.void_type().fn_type(&param_types, false),
        };
        let function = self.module.add_function(&func.name, fn_type, None);
        let symbol = Symbol::Function {
            function,
            params: func.parameters.iter().map(|p| p.ty).collect(),
            returns: return_type,
        };
        if !self.bind(&func.name, func.position, "function", symbol) {
            return Ok(());
        }

        debug!(function = %func.name, params = func.parameters.len(), "lowering function");
        let entry = self.context.append_basic_block(function, "entry");
        let comps = self.context.append_basic_block(function, "comps");
        self.builder.position_at_end(entry);
        self.allocas.position_at_end(entry);

        self.scope = mem::take(&mut self.scope).enter();
        let lowered = self.function_body(func, function, comps);
        self.scope = mem::take(&mut self.scope).leave();
        lowered?;

        self.builder.position_at_end(entry);
        self.builder.build_unconditional_branch(comps)?;
        Ok(())
    }

    /// Parameters and the body's top-level locals share one scope.
    fn function_body(
        &mut self,
        func: &FunctionDeclaration,
        function: FunctionValue<'ctx>,
        comps: BasicBlock<'ctx>,
    ) -> Result<(), CodegenError> {
        for (idx, param) in func.parameters.iter().enumerate() {
            let storage = match param.ty {
                LiteralType::IntPtr => Storage::ArrayRef,
                _ => Storage::Int,
            };
            let slot = self.allocas.build_alloca(self.storage_type(storage), &param.name)?;
            if let Some(value) = function.get_nth_param(idx as u32) {
                self.builder.build_store(slot, value)?;
            }
            self.bind(
                &param.name,
                param.position,
                "parameter",
                Symbol::Value(Place { ptr: slot, storage }),
            );
        }

        let cx = FunctionContext {
            function,
            name: &func.name,
            return_type: func.return_type(),
            entry_point: func.name == "main" && func.return_type() == LiteralType::Void,
        };
        let Flow::Open(last) = self.compound_items(&cx, &func.body, comps)? else {
            return Ok(());
        };

        self.builder.position_at_end(last);
        match cx.return_type {
            LiteralType::Void => self.return_void(&cx)?,
            _ => {
                self.diagnostics.semantic_warning(
                    func.position.location(),
                    format!(
                        "function `{}` can reach its end without returning a value; returning 1",
                        func.name
                    ),
                );
                self.builder.build_return(Some(&self.i32_type().const_int(1, false)))?;
            }
        }
        Ok(())
    }

    fn return_void(&self, cx: &FunctionContext<'ctx, '_>) -> Result<(), CodegenError> {
        if cx.entry_point {
            self.builder.build_return(Some(&self.i32_type().const_zero()))?;
        } else {
            self.builder.build_return(None)?;
        }
        Ok(())
    }

    fn check_main(&mut self, program: &Program) {
        match program.functions().last() {
            Some(func) if func.name == "main" => {}
            Some(func) => self.diagnostics.semantic_error(
                TextLocation::NoPosition,
                format!("the last declared function must be `main`, found `{}`", func.name),
            ),
            None => self.diagnostics.semantic_error(
                TextLocation::NoPosition,
                "no functions declared; the last declared function must be `main`",
            ),
        }
    }

    /// Run LLVM's structural checks over the finished module.
    pub fn verify(&self) -> Result<(), CodegenError> {
        self.module
            .verify()
            .map_err(|e| CodegenError::Verification(e.to_string()))?;
        debug!("module verified");
        Ok(())
    }

    pub fn print_ir(&self) -> String {
        self.module.print_to_string().to_string()
    }

    pub fn write_ir(&self, path: &Path) -> Result<(), CodegenError> {
        self.module.print_to_file(path).map_err(|e| CodegenError::Emit {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn write_bitcode(&self, path: &Path) -> Result<(), CodegenError> {
        if self.module.write_bitcode_to_path(path) {
            Ok(())
        } else {
            Err(CodegenError::Emit {
                path: path.to_path_buf(),
                message: "LLVM could not write bitcode".into(),
            })
        }
    }

    /// Write an object file for `triple` using a generic CPU.
    pub fn write_object(&self, triple: &TargetTriple, path: &Path) -> Result<(), CodegenError> {
        Target::initialize_all(&InitializationConfig::default());
        let target_error = |message: String| CodegenError::Target {
            triple: triple.as_str().to_string_lossy().into_owned(),
            message,
        };
        let target = Target::from_triple(triple).map_err(|e| target_error(e.to_string()))?;
        let machine = target
            .create_target_machine(
                triple,
                "generic",
                "",
                OptimizationLevel::None,
                RelocMode::PIC,
                CodeModel::Default,
            )
            .ok_or_else(|| target_error("could not create a target machine".into()))?;

        self.module.set_triple(triple);
        self.module
            .set_data_layout(&machine.get_target_data().get_data_layout());
        machine
            .write_to_file(&self.module, FileType::Object, path)
            .map_err(|e| CodegenError::Emit {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}

/// Default target triple of the build machine.
pub fn host_triple() -> TargetTriple {
    TargetMachine::get_default_triple()
}
