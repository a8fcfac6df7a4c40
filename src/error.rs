use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Pipeline stage after which the driver checks the diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
    Codegen,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Lex => write!(f, "lexing"),
            Stage::Parse => write!(f, "parsing"),
            Stage::Codegen => write!(f, "code generation"),
        }
    }
}

/// Failures of the LLVM back end. None of these are user errors.
#[cfg(feature = "llvm")]
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("llvm builder error: {0}")]
    Builder(#[from] inkwell::builder::BuilderError),
    #[error("module verification failed: {0}")]
    Verification(String),
    #[error("target `{triple}` is not available: {message}")]
    Target { triple: String, message: String },
    #[error("failed to write {}: {message}", .path.display())]
    Emit { path: PathBuf, message: String },
}

/// Everything that can stop a compilation.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{stage} failed with {errors} error(s)")]
    Diagnostics { stage: Stage, errors: usize },
    #[error("module verification failed: {0}")]
    Verification(String),
    #[error("code generation failed: {0}")]
    Backend(String),
    #[error("link failed: {0}")]
    Link(String),
}

impl CompileError {
    /// Short classification string used for logging.
    pub fn category(&self) -> &'static str {
        match self {
            CompileError::Io { .. } => "io",
            CompileError::Diagnostics { .. } => "diagnostics",
            CompileError::Verification(_) => "verification",
            CompileError::Backend(_) => "emission",
            CompileError::Link(_) => "link",
        }
    }

    /// Process exit status for the driver.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            "io" | "diagnostics" => 1,
            "verification" => 2,
            _ => 3,
        }
    }
}

#[cfg(feature = "llvm")]
impl From<CodegenError> for CompileError {
    fn from(err: CodegenError) -> Self {
        match err {
            CodegenError::Verification(message) => CompileError::Verification(message),
            other => CompileError::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_category() {
        let diagnostics = CompileError::Diagnostics {
            stage: Stage::Parse,
            errors: 2,
        };
        assert_eq!(diagnostics.category(), "diagnostics");
        assert_eq!(diagnostics.exit_code(), 1);
        assert_eq!(diagnostics.to_string(), "parsing failed with 2 error(s)");

        let link = CompileError::Link("cc exited with 1".into());
        assert_eq!(link.exit_code(), 3);
    }

    #[cfg(feature = "llvm")]
    #[test]
    fn verification_is_distinct() {
        let err = CompileError::from(CodegenError::Verification("bad block".into()));
        assert_eq!(err.category(), "verification");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "module verification failed: bad block");
    }
}
