//! Diagnostics shared by every compilation stage.
//!
//! Stages never abort on a user error: they append a [`Diagnostic`] to the
//! [`Diagnostics`] sink they were handed and keep going. The driver inspects
//! the sink between stages and stops as soon as it holds errors.

use std::fmt;

/// 1-based position of a character in the source, or no position at all for
/// whole-program problems such as a missing `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextLocation {
    At { line: usize, col: usize },
    NoPosition,
}

impl TextLocation {
    pub fn new(line: usize, col: usize) -> Self {
        TextLocation::At { line, col }
    }
}

impl fmt::Display for TextLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextLocation::At { line, col } => write!(f, "[{line}:{col}]"),
            TextLocation::NoPosition => write!(f, "[-]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    LexerError,
    ParseError,
    SemanticError,
    SemanticWarning,
    CodeGenError,
}

impl DiagnosticKind {
    pub fn is_error(self) -> bool {
        !matches!(self, DiagnosticKind::SemanticWarning)
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::LexerError => "LexerError",
            DiagnosticKind::ParseError => "ParseError",
            DiagnosticKind::SemanticError => "SemanticError",
            DiagnosticKind::SemanticWarning => "SemanticWarning",
            DiagnosticKind::CodeGenError => "CodeGenError",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: TextLocation,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} at {}", self.kind, self.message, self.location)
    }
}

/// Append-only, order-preserving list of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, location: TextLocation, kind: DiagnosticKind, message: impl Into<String>) {
        self.items.push(Diagnostic {
            location,
            kind,
            message: message.into(),
        });
    }

    pub fn lexer_error(&mut self, location: TextLocation, message: impl Into<String>) {
        self.report(location, DiagnosticKind::LexerError, message);
    }

    pub fn parse_error(&mut self, location: TextLocation, message: impl Into<String>) {
        self.report(location, DiagnosticKind::ParseError, message);
    }

    pub fn semantic_error(&mut self, location: TextLocation, message: impl Into<String>) {
        self.report(location, DiagnosticKind::SemanticError, message);
    }

    pub fn semantic_warning(&mut self, location: TextLocation, message: impl Into<String>) {
        self.report(location, DiagnosticKind::SemanticWarning, message);
    }

    pub fn codegen_error(&mut self, location: TextLocation, message: impl Into<String>) {
        self.report(location, DiagnosticKind::CodeGenError, message);
    }

    /// Detach everything reported after the first `len` entries. The parser
    /// sets these aside while it rewinds and puts them back with
    /// [`Diagnostics::restore`] when the same tokens are consumed again.
    pub(crate) fn split_off(&mut self, len: usize) -> Vec<Diagnostic> {
        self.items.split_off(len.min(self.items.len()))
    }

    pub(crate) fn restore(&mut self, diagnostics: Vec<Diagnostic>) {
        self.items.extend(diagnostics);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of entries that should fail the compilation (everything except warnings).
    pub fn error_count(&self) -> usize {
        self.items.iter().filter(|d| d.kind.is_error()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(move |d| d.kind == kind)
    }

    /// Overlay every diagnostic on the source line it points at.
    ///
    /// ```text
    /// SemanticError: redefinition of variable `x` at [2:5]
    ///   2 | int x;
    ///     |     ^
    /// ```
    pub fn render(&self, lines: &[String]) -> String {
        let mut out = String::new();
        for diagnostic in &self.items {
            out.push_str(&diagnostic.to_string());
            out.push('\n');
            if let TextLocation::At { line, col } = diagnostic.location {
                if let Some(text) = line.checked_sub(1).and_then(|idx| lines.get(idx)) {
                    let gutter = line.to_string();
                    out.push_str(&format!("  {gutter} | {text}\n"));
                    let pad = " ".repeat(gutter.len());
                    let caret = " ".repeat(col.saturating_sub(1));
                    out.push_str(&format!("  {pad} | {caret}^\n"));
                }
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Extend<Diagnostic> for Diagnostics {
    fn extend<T: IntoIterator<Item = Diagnostic>>(&mut self, iter: T) {
        self.items.extend(iter);
    }
}
