//! A compiler for C-minus, the small C subset from Louden's *Compiler
//! Construction*: `int`/`void`, one-dimensional `int` arrays, `if`/`else`,
//! `while`, `return` and recursive functions, with `input()` and
//! `output(int)` built in.
//!
//! The front end (lexer, parser, AST) has no native dependencies. Code
//! generation and linking need LLVM 16 and sit behind the default `llvm`
//! feature.

pub mod ast;
#[cfg(feature = "llvm")]
pub mod codegen;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod lexer;
#[cfg(feature = "llvm")]
pub mod link;
pub mod parser;
pub mod pipeline;
pub mod symbols;
pub mod tree_dump;
