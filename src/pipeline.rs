//! Stage orchestration: lex → parse → lower → generate → emit.
//!
//! Every stage appends to the same [`Diagnostics`]. The pipeline checks it
//! after lexing, parsing and code generation and stops at the first stage
//! that reported an error.

#[cfg(feature = "llvm")]
use std::path::Path;

use tracing::{debug, warn};

use crate::ast::{self, Ast};
use crate::diagnostics::Diagnostics;
use crate::error::{CompileError, Stage};
use crate::lexer::{self, Token};
use crate::parser::{self, ExpressionTree};

#[cfg(feature = "llvm")]
use crate::{
    codegen::{host_triple, CodeGenerator},
    config::{CompilerConfig, LINKER_ENV},
    link,
};
#[cfg(feature = "llvm")]
use inkwell::{context::Context, targets::TargetTriple};
#[cfg(feature = "llvm")]
use tracing::info;

/// What the driver writes once the module verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Emit {
    /// Textual LLVM IR
    Ir,
    /// LLVM bitcode
    Bc,
    /// Native object file
    Obj,
    /// Linked executable
    Exe,
}

impl Emit {
    /// File extension for a default output path.
    pub fn extension(self) -> &'static str {
        match self {
            Emit::Ir => "ll",
            Emit::Bc => "bc",
            Emit::Obj => "o",
            Emit::Exe => std::env::consts::EXE_EXTENSION,
        }
    }
}

fn checkpoint(stage: Stage, diagnostics: &Diagnostics) -> Result<(), CompileError> {
    let errors = diagnostics.error_count();
    if errors > 0 {
        warn!(stage = %stage, errors, "stopping after failed stage");
        return Err(CompileError::Diagnostics { stage, errors });
    }
    debug!(stage = %stage, diagnostics = diagnostics.len(), "stage finished");
    Ok(())
}

pub fn lex<S: AsRef<str>>(lines: &[S], diagnostics: &mut Diagnostics) -> Result<Vec<Token>, CompileError> {
    let tokens = lexer::tokenize(lines, diagnostics);
    checkpoint(Stage::Lex, diagnostics)?;
    Ok(tokens)
}

pub fn parse(tokens: Vec<Token>, diagnostics: &mut Diagnostics) -> Result<ExpressionTree, CompileError> {
    let tree = parser::parse(tokens, diagnostics);
    checkpoint(Stage::Parse, diagnostics)?;
    Ok(tree)
}

/// Lowering cannot fail on a tree that parsed without errors.
pub fn lower(tree: &ExpressionTree) -> Ast {
    ast::build(tree)
}

/// Source lines to AST.
pub fn front_end<S: AsRef<str>>(lines: &[S], diagnostics: &mut Diagnostics) -> Result<Ast, CompileError> {
    let tokens = lex(lines, diagnostics)?;
    let tree = parse(tokens, diagnostics)?;
    Ok(lower(&tree))
}

/// Generate and verify the module for `ast`. Verification is skipped when
/// code generation reported errors.
#[cfg(feature = "llvm")]
pub fn generate<'ctx, 'd>(
    context: &'ctx Context,
    module_name: &str,
    ast: &Ast,
    diagnostics: &'d mut Diagnostics,
) -> Result<CodeGenerator<'ctx, 'd>, CompileError> {
    let mut generator = CodeGenerator::new(context, module_name, diagnostics)?;
    generator.generate(&ast.program)?;
    checkpoint(Stage::Codegen, generator.diagnostics())?;
    generator.verify()?;
    Ok(generator)
}

/// Whole pipeline up to textual IR.
#[cfg(feature = "llvm")]
pub fn compile_to_ir<S: AsRef<str>>(lines: &[S], diagnostics: &mut Diagnostics) -> Result<String, CompileError> {
    let ast = front_end(lines, diagnostics)?;
    let context = Context::create();
    let generator = generate(&context, "main", &ast, diagnostics)?;
    Ok(generator.print_ir())
}

#[cfg(feature = "llvm")]
fn target_triple(config: &CompilerConfig) -> TargetTriple {
    config
        .target()
        .map(TargetTriple::create)
        .unwrap_or_else(host_triple)
}

/// Write the verified module to `output` in the requested form. An
/// executable goes through an object file next to it.
#[cfg(feature = "llvm")]
pub fn emit(
    generator: &CodeGenerator<'_, '_>,
    kind: Emit,
    output: &Path,
    config: &CompilerConfig,
) -> Result<(), CompileError> {
    match kind {
        Emit::Ir => generator.write_ir(output)?,
        Emit::Bc => generator.write_bitcode(output)?,
        Emit::Obj => generator.write_object(&target_triple(config), output)?,
        Emit::Exe => {
            let linker = config.linker().ok_or_else(|| {
                CompileError::Link(format!("no linker found; set {LINKER_ENV} or pass --linker"))
            })?;
            let obj = output.with_extension("o");
            generator.write_object(&target_triple(config), &obj)?;
            link::link_exe(linker, &obj, output).map_err(|err| CompileError::Link(format!("{err:#}")))?;
        }
    }
    info!(emit = ?kind, path = %output.display(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexer_errors_stop_before_parsing() {
        let mut diagnostics = Diagnostics::new();
        let err = front_end(&["int x; #", "void main(void) { }"], &mut diagnostics).unwrap_err();
        assert!(matches!(err, CompileError::Diagnostics { stage: Stage::Lex, errors: 1 }));
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn parse_errors_stop_before_lowering() {
        let mut diagnostics = Diagnostics::new();
        let err = front_end(&["void main(void) { output(1) }"], &mut diagnostics).unwrap_err();
        assert!(matches!(err, CompileError::Diagnostics { stage: Stage::Parse, .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn clean_source_reaches_the_ast() {
        let mut diagnostics = Diagnostics::new();
        let ast = front_end(&["int x;", "void main(void) { x = 1; }"], &mut diagnostics).unwrap();
        assert!(diagnostics.is_empty());
        assert_eq!(ast.program.declarations.len(), 2);
    }

    #[test]
    fn default_extensions() {
        assert_eq!(Emit::Ir.extension(), "ll");
        assert_eq!(Emit::Obj.extension(), "o");
    }

    #[cfg(feature = "llvm")]
    #[test]
    fn semantic_errors_skip_verification() {
        let mut diagnostics = Diagnostics::new();
        let err = compile_to_ir(&["void f(void) { }"], &mut diagnostics).unwrap_err();
        assert!(matches!(err, CompileError::Diagnostics { stage: Stage::Codegen, errors: 1 }));
    }

    #[cfg(feature = "llvm")]
    #[test]
    fn warnings_do_not_stop_the_pipeline() {
        let mut diagnostics = Diagnostics::new();
        let ir = compile_to_ir(&["int f(void) { }", "void main(void) { output(f()); }"], &mut diagnostics).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert!(ir.contains("define i32 @f()"), "{ir}");
    }
}
