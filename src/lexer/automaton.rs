//! Table-driven finite automaton recognising a single lexeme.
//!
//! Each state carries the [`SyntaxKind`] it accepts and an ordered list of
//! transitions. The first transition whose predicate matches wins, so the
//! order inside a row matters (e.g. the comment body's catch-all must come
//! last). A state whose kind is `Unknown` is not accepting.

use super::token::SyntaxKind;

pub type State = usize;

pub const START: State = 0;
pub const IDENTIFIER: State = 1;
pub const NUMBER: State = 2;
pub const LESS: State = 3;
pub const GREATER: State = 4;
pub const ASSIGN: State = 5;
pub const BANG: State = 6;
pub const SLASH: State = 7;
pub const PLUS: State = 8;
pub const MINUS: State = 9;
pub const STAR: State = 10;
pub const LESS_EQ: State = 11;
pub const GREATER_EQ: State = 12;
pub const EQ_EQ: State = 13;
pub const NOT_EQ: State = 14;
pub const COMMENT: State = 15;
pub const COMMENT_STAR: State = 16;
pub const COMMENT_END: State = 17;
pub const COMMA: State = 18;
pub const SEMICOLON: State = 19;
pub const OPEN_ROUND: State = 20;
pub const CLOSE_ROUND: State = 21;
pub const OPEN_CURLY: State = 22;
pub const CLOSE_CURLY: State = 23;
pub const OPEN_SQUARE: State = 24;
pub const CLOSE_SQUARE: State = 25;

#[derive(Debug, Clone, Copy)]
enum Predicate {
    Letter,
    Digit,
    Is(char),
    Any,
}

impl Predicate {
    fn matches(self, c: char) -> bool {
        match self {
            Predicate::Letter => c.is_alphabetic(),
            Predicate::Digit => c.is_ascii_digit(),
            Predicate::Is(expected) => c == expected,
            Predicate::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    when: Predicate,
    to: State,
}

macro_rules! on {
    ($when:expr, $to:expr $(,)?) => {
        Transition { when: $when, to: $to }
    };
}

struct Row {
    kind: SyntaxKind,
    next: &'static [Transition],
}

macro_rules! row {
    ($kind:expr, $next:expr $(,)?) => {
        Row { kind: $kind, next: $next }
    };
}

use Predicate::{Any, Digit, Is, Letter};

static TABLE: [Row; 26] = [
    // START
    row!(
        SyntaxKind::Unknown,
        &[
            on!(Letter, IDENTIFIER),
            on!(Digit, NUMBER),
            on!(Is('<'), LESS),
            on!(Is('>'), GREATER),
            on!(Is('='), ASSIGN),
            on!(Is('!'), BANG),
            on!(Is('/'), SLASH),
            on!(Is('+'), PLUS),
            on!(Is('-'), MINUS),
            on!(Is('*'), STAR),
            on!(Is(','), COMMA),
            on!(Is(';'), SEMICOLON),
            on!(Is('('), OPEN_ROUND),
            on!(Is(')'), CLOSE_ROUND),
            on!(Is('{'), OPEN_CURLY),
            on!(Is('}'), CLOSE_CURLY),
            on!(Is('['), OPEN_SQUARE),
            on!(Is(']'), CLOSE_SQUARE),
        ],
    ),
    row!(SyntaxKind::IdentifierOrKeyword, &[on!(Letter, IDENTIFIER)]),
    row!(SyntaxKind::Number, &[on!(Digit, NUMBER)]),
    row!(SyntaxKind::LessThan, &[on!(Is('='), LESS_EQ)]),
    row!(SyntaxKind::GreaterThan, &[on!(Is('='), GREATER_EQ)]),
    row!(SyntaxKind::Assign, &[on!(Is('='), EQ_EQ)]),
    // a lone `!` is not a token
    row!(SyntaxKind::Unknown, &[on!(Is('='), NOT_EQ)]),
    row!(SyntaxKind::Slash, &[on!(Is('*'), COMMENT)]),
    row!(SyntaxKind::Plus, &[]),
    row!(SyntaxKind::Minus, &[]),
    row!(SyntaxKind::Asterisk, &[]),
    row!(SyntaxKind::LessThanOrEqualTo, &[]),
    row!(SyntaxKind::GreaterThanOrEqualTo, &[]),
    row!(SyntaxKind::EqualTo, &[]),
    row!(SyntaxKind::NotEqualTo, &[]),
    // COMMENT: inside `/* ... */`
    row!(SyntaxKind::Unknown, &[on!(Is('*'), COMMENT_STAR), on!(Any, COMMENT)]),
    // COMMENT_STAR: saw `*`, maybe about to leave
    row!(
        SyntaxKind::Unknown,
        &[on!(Is('/'), COMMENT_END), on!(Is('*'), COMMENT_STAR), on!(Any, COMMENT)],
    ),
    row!(SyntaxKind::CommentsEnd, &[]),
    row!(SyntaxKind::Comma, &[]),
    row!(SyntaxKind::Semicolon, &[]),
    row!(SyntaxKind::OpenRoundBracket, &[]),
    row!(SyntaxKind::CloseRoundBracket, &[]),
    row!(SyntaxKind::OpenCurlyBracket, &[]),
    row!(SyntaxKind::CloseCurlyBracket, &[]),
    row!(SyntaxKind::OpenSquareBracket, &[]),
    row!(SyntaxKind::CloseSquareBracket, &[]),
];

pub fn next_state(state: State, c: char) -> Option<State> {
    TABLE[state]
        .next
        .iter()
        .find(|transition| transition.when.matches(c))
        .map(|transition| transition.to)
}

pub fn state_kind(state: State) -> SyntaxKind {
    TABLE[state].kind
}

/// States that can only be left through `*/`.
pub fn in_comment(state: State) -> bool {
    matches!(state, COMMENT | COMMENT_STAR)
}
