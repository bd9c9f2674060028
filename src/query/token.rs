// Filter query tokens for lexical analysis

use std::fmt;

/// Comparison operator lexemes, longest first so that no lexeme is shadowed
/// by a shorter prefix.
pub const OPERATOR_LEXEMES: [&str; 9] = [">>", ">=", "<<", "<=", "==", "!=", "@=", "=@", "%%"];

/// Logical combinator lexemes
pub const LOGICAL_LEXEMES: [&str; 2] = ["&&", "||"];

pub const QUOTE: char = '\'';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Property,
    Operator,
    LogicalOp,
    BracketLeft,
    BracketRight,
    Value,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Property => "property",
            TokenKind::Operator => "operator",
            TokenKind::LogicalOp => "logical operator",
            TokenKind::BracketLeft => "'('",
            TokenKind::BracketRight => "')'",
            TokenKind::Value => "value",
        };
        f.write_str(name)
    }
}

/// Byte range of a token in the query text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Text exactly as written in the query, quotes included for values
    pub text: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// The literal of a value token with its surrounding ticks removed.
    /// No un-escaping is performed.
    pub fn value_literal(&self) -> &str {
        let text = self.text.as_str();
        text.strip_prefix(QUOTE)
            .and_then(|t| t.strip_suffix(QUOTE))
            .unwrap_or(text)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_literal_strips_ticks() {
        let token = Token::new(TokenKind::Value, "'foo bar'", Span::new(0, 9));
        assert_eq!(token.value_literal(), "foo bar");

        let empty = Token::new(TokenKind::Value, "''", Span::new(0, 2));
        assert_eq!(empty.value_literal(), "");
    }

    #[test]
    fn test_operator_lexemes_not_shadowed() {
        // A lexeme must never be a strict prefix of a later one
        for (i, earlier) in OPERATOR_LEXEMES.iter().enumerate() {
            for later in &OPERATOR_LEXEMES[i + 1..] {
                assert!(!later.starts_with(earlier) || later == earlier);
            }
        }
    }

    #[test]
    fn test_display() {
        let token = Token::new(TokenKind::Operator, ">=", Span::new(3, 5));
        assert_eq!(token.to_string(), "operator '>='");
        assert_eq!(token.span.len(), 2);
        assert!(!token.span.is_empty());
    }
}
