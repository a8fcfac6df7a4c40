use std::fmt;

use crate::diagnostics::TextLocation;

/// Every kind of token the lexer can produce, plus the abstract kinds the
/// parser asks for when several concrete kinds are acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    // keywords
    Void,
    Int,
    If,
    Else,
    While,
    Return,

    // arithmetic
    Plus,
    Minus,
    Asterisk,
    Slash,

    Assign,

    // relational
    LessThan,
    LessThanOrEqualTo,
    EqualTo,
    GreaterThanOrEqualTo,
    GreaterThan,
    NotEqualTo,

    Comma,
    Semicolon,
    OpenRoundBracket,
    CloseRoundBracket,
    OpenSquareBracket,
    CloseSquareBracket,
    OpenCurlyBracket,
    CloseCurlyBracket,

    Identifier,
    /// Accepting kind of the identifier state; resolved to a keyword or
    /// `Identifier` once the lexeme is complete.
    IdentifierOrKeyword,
    Number,

    EndOfFile,
    Unknown,
    CommentsEnd,

    /// `int` or `void`, only ever requested by the parser.
    Type,
    /// `Number` or `Identifier`, only ever requested by the parser.
    NumberOrIdentifier,
    /// Synthesised for `int name[]` parameters.
    IntPtrRef,
}

impl SyntaxKind {
    pub fn keyword(text: &str) -> Option<SyntaxKind> {
        match text {
            "void" => Some(SyntaxKind::Void),
            "int" => Some(SyntaxKind::Int),
            "if" => Some(SyntaxKind::If),
            "else" => Some(SyntaxKind::Else),
            "while" => Some(SyntaxKind::While),
            "return" => Some(SyntaxKind::Return),
            _ => None,
        }
    }

    pub fn is_type(self) -> bool {
        matches!(self, SyntaxKind::Int | SyntaxKind::Void)
    }

    pub fn is_relop(self) -> bool {
        matches!(
            self,
            SyntaxKind::LessThan
                | SyntaxKind::LessThanOrEqualTo
                | SyntaxKind::EqualTo
                | SyntaxKind::NotEqualTo
                | SyntaxKind::GreaterThan
                | SyntaxKind::GreaterThanOrEqualTo
        )
    }

    pub fn is_additive(self) -> bool {
        matches!(self, SyntaxKind::Plus | SyntaxKind::Minus)
    }

    pub fn is_multiplicative(self) -> bool {
        matches!(self, SyntaxKind::Asterisk | SyntaxKind::Slash)
    }

    /// Source spelling for punctuation and keywords, a descriptive name otherwise.
    pub fn describe(self) -> &'static str {
        match self {
            SyntaxKind::Void => "`void`",
            SyntaxKind::Int => "`int`",
            SyntaxKind::If => "`if`",
            SyntaxKind::Else => "`else`",
            SyntaxKind::While => "`while`",
            SyntaxKind::Return => "`return`",
            SyntaxKind::Plus => "`+`",
            SyntaxKind::Minus => "`-`",
            SyntaxKind::Asterisk => "`*`",
            SyntaxKind::Slash => "`/`",
            SyntaxKind::Assign => "`=`",
            SyntaxKind::LessThan => "`<`",
            SyntaxKind::LessThanOrEqualTo => "`<=`",
            SyntaxKind::EqualTo => "`==`",
            SyntaxKind::GreaterThanOrEqualTo => "`>=`",
            SyntaxKind::GreaterThan => "`>`",
            SyntaxKind::NotEqualTo => "`!=`",
            SyntaxKind::Comma => "`,`",
            SyntaxKind::Semicolon => "`;`",
            SyntaxKind::OpenRoundBracket => "`(`",
            SyntaxKind::CloseRoundBracket => "`)`",
            SyntaxKind::OpenSquareBracket => "`[`",
            SyntaxKind::CloseSquareBracket => "`]`",
            SyntaxKind::OpenCurlyBracket => "`{`",
            SyntaxKind::CloseCurlyBracket => "`}`",
            SyntaxKind::Identifier => "identifier",
            SyntaxKind::IdentifierOrKeyword => "identifier or keyword",
            SyntaxKind::Number => "number",
            SyntaxKind::EndOfFile => "end of file",
            SyntaxKind::Unknown => "unknown token",
            SyntaxKind::CommentsEnd => "`*/`",
            SyntaxKind::Type => "type (`int` or `void`)",
            SyntaxKind::NumberOrIdentifier => "number or identifier",
            SyntaxKind::IntPtrRef => "`int[]`",
        }
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// One lexeme. `value` is set only for `Number` tokens that parsed as `int`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
    pub value: Option<i32>,
}

impl Token {
    pub fn new(kind: SyntaxKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
            value: None,
        }
    }

    pub fn number(text: impl Into<String>, line: usize, column: usize, value: i32) -> Self {
        Self {
            kind: SyntaxKind::Number,
            text: text.into(),
            line,
            column,
            value: Some(value),
        }
    }

    pub fn location(&self) -> TextLocation {
        TextLocation::new(self.line, self.column)
    }

    pub fn is_end_of_file(&self) -> bool {
        self.kind == SyntaxKind::EndOfFile
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SyntaxKind::EndOfFile => write!(f, "end of file"),
            _ => write!(f, "`{}`", self.text),
        }
    }
}
