//! Hand-written lexer driven by the table in [`automaton`].
//!
//! The source is an array of lines. Line boundaries behave like a newline
//! character: they end the token being scanned but may appear inside a block
//! comment.

mod automaton;
mod token;

pub use token::{SyntaxKind, Token};

use tracing::debug;

use crate::diagnostics::{Diagnostics, TextLocation};

pub struct Lexer<'d> {
    lines: Vec<Vec<char>>,
    line: usize,
    col: usize,
    diagnostics: &'d mut Diagnostics,
}

impl<'d> Lexer<'d> {
    pub fn new<S: AsRef<str>>(lines: &[S], diagnostics: &'d mut Diagnostics) -> Self {
        Self {
            lines: lines.iter().map(|l| l.as_ref().chars().collect()).collect(),
            line: 0,
            col: 0,
            diagnostics,
        }
    }

    /// Character under the cursor; the end of every line reads as `'\n'`.
    fn current(&self) -> Option<char> {
        let line = self.lines.get(self.line)?;
        Some(line.get(self.col).copied().unwrap_or('\n'))
    }

    fn advance(&mut self) {
        match self.lines.get(self.line) {
            Some(line) if self.col < line.len() => self.col += 1,
            Some(_) => {
                self.line += 1;
                self.col = 0;
            }
            None => {}
        }
    }

    fn position(&self) -> (usize, usize) {
        if self.line < self.lines.len() {
            return (self.line + 1, self.col + 1);
        }
        match self.lines.last() {
            Some(last) => (self.lines.len(), last.len() + 1),
            None => (1, 1),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.current(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Scan one token. `Unknown` and `CommentsEnd` tokens are returned as
    /// well; [`Lexer::tokenize`] drops them.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let (line, column) = self.position();
        let location = TextLocation::new(line, column);

        let Some(first) = self.current() else {
            return Token::new(SyntaxKind::EndOfFile, "", line, column);
        };

        let Some(mut state) = automaton::next_state(automaton::START, first) else {
            self.advance();
            self.diagnostics
                .lexer_error(location, format!("unexpected character `{first}`"));
            return Token::new(SyntaxKind::Unknown, first.to_string(), line, column);
        };

        let mut text = String::from(first);
        self.advance();
        while let Some(c) = self.current() {
            match automaton::next_state(state, c) {
                Some(next) => {
                    state = next;
                    text.push(c);
                    self.advance();
                }
                None => break,
            }
        }

        if automaton::in_comment(state) {
            self.diagnostics.lexer_error(location, "unterminated block comment");
            return Token::new(SyntaxKind::Unknown, text, line, column);
        }

        match automaton::state_kind(state) {
            SyntaxKind::IdentifierOrKeyword => {
                let kind = SyntaxKind::keyword(&text).unwrap_or(SyntaxKind::Identifier);
                Token::new(kind, text, line, column)
            }
            SyntaxKind::Number => match text.parse::<i32>() {
                Ok(value) => Token::number(text, line, column, value),
                Err(_) => {
                    self.diagnostics.lexer_error(
                        location,
                        format!("integer literal `{text}` does not fit in `int`"),
                    );
                    Token::new(SyntaxKind::Unknown, text, line, column)
                }
            },
            SyntaxKind::Unknown => {
                self.diagnostics
                    .lexer_error(location, format!("expected `!=`, found `{text}`"));
                Token::new(SyntaxKind::Unknown, text, line, column)
            }
            kind => Token::new(kind, text, line, column),
        }
    }

    /// Scan the whole input from the beginning. The result always ends with
    /// exactly one `EndOfFile` token.
    pub fn tokenize(&mut self) -> Vec<Token> {
        self.line = 0;
        self.col = 0;
        let before = self.diagnostics.len();

        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            match token.kind {
                SyntaxKind::Unknown | SyntaxKind::CommentsEnd => continue,
                SyntaxKind::EndOfFile => {
                    tokens.push(token);
                    break;
                }
                _ => tokens.push(token),
            }
        }

        debug!(
            stage = "lex",
            tokens = tokens.len(),
            diagnostics = self.diagnostics.len() - before,
            "lexed source"
        );
        tokens
    }
}

pub fn tokenize<S: AsRef<str>>(lines: &[S], diagnostics: &mut Diagnostics) -> Vec<Token> {
    Lexer::new(lines, diagnostics).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;

    fn lex(lines: &[&str]) -> (Vec<Token>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let tokens = tokenize(lines, &mut diagnostics);
        (tokens, diagnostics)
    }

    fn kinds(tokens: &[Token]) -> Vec<SyntaxKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn declaration_with_positions() {
        let (tokens, diagnostics) = lex(&["int x[10];", "  void f(void) {}"]);
        assert!(diagnostics.is_empty());
        assert_eq!(
            kinds(&tokens),
            vec![
                SyntaxKind::Int,
                SyntaxKind::Identifier,
                SyntaxKind::OpenSquareBracket,
                SyntaxKind::Number,
                SyntaxKind::CloseSquareBracket,
                SyntaxKind::Semicolon,
                SyntaxKind::Void,
                SyntaxKind::Identifier,
                SyntaxKind::OpenRoundBracket,
                SyntaxKind::Void,
                SyntaxKind::CloseRoundBracket,
                SyntaxKind::OpenCurlyBracket,
                SyntaxKind::CloseCurlyBracket,
                SyntaxKind::EndOfFile,
            ]
        );
        assert_eq!(tokens[3].value, Some(10));
        assert_eq!((tokens[6].line, tokens[6].column), (2, 3));
        assert_eq!((tokens[7].line, tokens[7].column), (2, 8));
    }

    #[test]
    fn operators_take_the_longest_match() {
        let (tokens, diagnostics) = lex(&["a<=b<c==d=e!=f>=g>h+-*/"]);
        assert!(diagnostics.is_empty());
        let ops: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind != SyntaxKind::Identifier)
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            ops,
            vec![
                SyntaxKind::LessThanOrEqualTo,
                SyntaxKind::LessThan,
                SyntaxKind::EqualTo,
                SyntaxKind::Assign,
                SyntaxKind::NotEqualTo,
                SyntaxKind::GreaterThanOrEqualTo,
                SyntaxKind::GreaterThan,
                SyntaxKind::Plus,
                SyntaxKind::Minus,
                SyntaxKind::Asterisk,
                SyntaxKind::Slash,
                SyntaxKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn line_boundaries_split_tokens() {
        let (tokens, _) = lex(&["int", "x;"]);
        assert_eq!(
            kinds(&tokens),
            vec![SyntaxKind::Int, SyntaxKind::Identifier, SyntaxKind::Semicolon, SyntaxKind::EndOfFile]
        );
        assert_eq!((tokens[1].line, tokens[1].column), (2, 1));
    }

    #[test]
    fn whitespace_inside_a_word_splits_it() {
        let (tokens, diagnostics) = lex(&["in t\t1 2"]);
        assert!(diagnostics.is_empty());
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["in", "t", "1", "2", ""]);
        assert_eq!(tokens[0].kind, SyntaxKind::Identifier);
    }

    #[test]
    fn identifier_followed_by_digits() {
        let (tokens, _) = lex(&["x1"]);
        assert_eq!(
            kinds(&tokens),
            vec![SyntaxKind::Identifier, SyntaxKind::Number, SyntaxKind::EndOfFile]
        );
    }

    #[test]
    fn comments_span_lines_and_vanish() {
        let (tokens, diagnostics) = lex(&["int /* a", "\tb ** c **/ x;"]);
        assert!(diagnostics.is_empty());
        assert_eq!(
            kinds(&tokens),
            vec![SyntaxKind::Int, SyntaxKind::Identifier, SyntaxKind::Semicolon, SyntaxKind::EndOfFile]
        );
    }

    #[test]
    fn unterminated_comment_reports_once_at_its_start() {
        let (tokens, diagnostics) = lex(&["int x; /* never", "closed"]);
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.kind, DiagnosticKind::LexerError);
        assert_eq!(diagnostic.location, TextLocation::new(1, 8));
        assert_eq!(tokens.len(), 4);
        assert!(tokens[3].is_end_of_file());
    }

    #[test]
    fn oversized_literal_is_an_error() {
        let (tokens, diagnostics) = lex(&["2147483647 2147483648"]);
        assert_eq!(diagnostics.error_count(), 1);
        assert_eq!(tokens[0].value, Some(i32::MAX));
        assert_eq!(kinds(&tokens), vec![SyntaxKind::Number, SyntaxKind::EndOfFile]);
    }

    #[test]
    fn illegal_characters_are_reported_and_skipped() {
        let (tokens, diagnostics) = lex(&["a @ b ! c"]);
        assert_eq!(diagnostics.of_kind(DiagnosticKind::LexerError).count(), 2);
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn empty_input_yields_end_of_file() {
        let (tokens, diagnostics) = lex(&[]);
        assert!(diagnostics.is_empty());
        assert_eq!(kinds(&tokens), vec![SyntaxKind::EndOfFile]);
    }
}
