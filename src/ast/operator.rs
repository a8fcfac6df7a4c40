use std::fmt;

use crate::lexer::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperatorKind {
    Assignment,
    Addition,
    Subtraction,
    Multiplication,
    Division,
    LessThan,
    LessThanOrEqualTo,
    EqualTo,
    NotEqualTo,
    GreaterThanOrEqualTo,
    GreaterThan,
}

impl BinaryOperatorKind {
    pub fn from_syntax(kind: SyntaxKind) -> Option<Self> {
        let op = match kind {
            SyntaxKind::Assign => BinaryOperatorKind::Assignment,
            SyntaxKind::Plus => BinaryOperatorKind::Addition,
            SyntaxKind::Minus => BinaryOperatorKind::Subtraction,
            SyntaxKind::Asterisk => BinaryOperatorKind::Multiplication,
            SyntaxKind::Slash => BinaryOperatorKind::Division,
            SyntaxKind::LessThan => BinaryOperatorKind::LessThan,
            SyntaxKind::LessThanOrEqualTo => BinaryOperatorKind::LessThanOrEqualTo,
            SyntaxKind::EqualTo => BinaryOperatorKind::EqualTo,
            SyntaxKind::NotEqualTo => BinaryOperatorKind::NotEqualTo,
            SyntaxKind::GreaterThanOrEqualTo => BinaryOperatorKind::GreaterThanOrEqualTo,
            SyntaxKind::GreaterThan => BinaryOperatorKind::GreaterThan,
            _ => return None,
        };
        Some(op)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperatorKind::Assignment => "=",
            BinaryOperatorKind::Addition => "+",
            BinaryOperatorKind::Subtraction => "-",
            BinaryOperatorKind::Multiplication => "*",
            BinaryOperatorKind::Division => "/",
            BinaryOperatorKind::LessThan => "<",
            BinaryOperatorKind::LessThanOrEqualTo => "<=",
            BinaryOperatorKind::EqualTo => "==",
            BinaryOperatorKind::NotEqualTo => "!=",
            BinaryOperatorKind::GreaterThanOrEqualTo => ">=",
            BinaryOperatorKind::GreaterThan => ">",
        }
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            BinaryOperatorKind::LessThan
                | BinaryOperatorKind::LessThanOrEqualTo
                | BinaryOperatorKind::EqualTo
                | BinaryOperatorKind::NotEqualTo
                | BinaryOperatorKind::GreaterThanOrEqualTo
                | BinaryOperatorKind::GreaterThan
        )
    }
}

impl fmt::Display for BinaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_agree_with_token_spelling() {
        for kind in [
            SyntaxKind::Assign,
            SyntaxKind::Plus,
            SyntaxKind::Minus,
            SyntaxKind::Asterisk,
            SyntaxKind::Slash,
            SyntaxKind::LessThan,
            SyntaxKind::LessThanOrEqualTo,
            SyntaxKind::EqualTo,
            SyntaxKind::NotEqualTo,
            SyntaxKind::GreaterThanOrEqualTo,
            SyntaxKind::GreaterThan,
        ] {
            let op = BinaryOperatorKind::from_syntax(kind).unwrap();
            assert_eq!(format!("`{op}`"), kind.describe());
            assert_eq!(op.is_relational(), kind.is_relop());
        }
        assert_eq!(BinaryOperatorKind::from_syntax(SyntaxKind::Comma), None);
    }
}
