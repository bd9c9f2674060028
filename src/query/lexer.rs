// Filter query lexer - tokenizes query strings against a known set of field names

use super::token::{Span, Token, TokenKind, LOGICAL_LEXEMES, OPERATOR_LEXEMES, QUOTE};
use crate::access::registry::is_name_char;
use crate::access::FieldRegistry;
use crate::error::LexError;

/// Reusable lexer for one set of field names.
///
/// Field names are matched case-insensitively as whole tokens. Build one per
/// entity type and share it; `tokenize` takes `&self` and keeps no state
/// between calls.
#[derive(Debug, Clone)]
pub struct Lexer {
    /// Longest names first so that `Identifier` wins over `Id`
    field_names: Vec<String>,
}

impl Lexer {
    pub fn new<I, S>(field_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut field_names: Vec<String> = field_names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        field_names.sort_by_key(|name| std::cmp::Reverse(name.chars().count()));
        Lexer { field_names }
    }

    pub fn for_registry<T>(registry: &FieldRegistry<T>) -> Self {
        Self::new(registry.names())
    }

    /// Tokenize the entire input. Either every byte is consumed or the first
    /// unmatched position is reported.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut position = 0;

        while let Some(current) = input[position..].chars().next() {
            if current.is_whitespace() {
                position += current.len_utf8();
                continue;
            }

            let rest = &input[position..];
            let (kind, len) = self
                .next_token(rest, current)
                .ok_or_else(|| LexError::at(input, position))?;

            let end = position + len;
            let token = Token::new(kind, &input[position..end], Span::new(position, end));
            log::trace!("Lexed {} at {}..{}", token, position, end);
            tokens.push(token);
            position = end;
        }

        log::debug!(
            "Tokenized {} byte query into {} tokens",
            input.len(),
            tokens.len()
        );
        Ok(tokens)
    }

    /// Classify the token starting at `rest`, returning its kind and byte length
    fn next_token(&self, rest: &str, current: char) -> Option<(TokenKind, usize)> {
        match current {
            '(' => return Some((TokenKind::BracketLeft, 1)),
            ')' => return Some((TokenKind::BracketRight, 1)),
            _ => {}
        }

        if let Some(len) = self.read_property(rest) {
            return Some((TokenKind::Property, len));
        }

        if let Some(op) = OPERATOR_LEXEMES.iter().find(|op| rest.starts_with(**op)) {
            return Some((TokenKind::Operator, op.len()));
        }

        if let Some(op) = LOGICAL_LEXEMES.iter().find(|op| rest.starts_with(**op)) {
            return Some((TokenKind::LogicalOp, op.len()));
        }

        if current == QUOTE {
            return Self::read_value(rest).map(|len| (TokenKind::Value, len));
        }

        None
    }

    /// Match a registered field name that is not followed by another name
    /// character
    fn read_property(&self, rest: &str) -> Option<usize> {
        self.field_names.iter().find_map(|name| {
            let len = prefix_ignore_case(rest, name)?;
            match rest[len..].chars().next() {
                Some(c) if is_name_char(c) => None,
                _ => Some(len),
            }
        })
    }

    /// Read a quoted value; everything up to the next tick is taken verbatim
    fn read_value(rest: &str) -> Option<usize> {
        let body = &rest[QUOTE.len_utf8()..];
        body.find(QUOTE)
            .map(|close| QUOTE.len_utf8() + close + QUOTE.len_utf8())
    }
}

/// If `text` starts with `prefix` ignoring case, return how many bytes of
/// `text` the prefix covers.
fn prefix_ignore_case(text: &str, prefix: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(chars.next().map_or(text.len(), |(index, _)| index))
}

/// Tokenize a query with a one-off lexer
pub fn tokenize<I, S>(field_names: I, input: &str) -> Result<Vec<Token>, LexError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Lexer::new(field_names).tokenize(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_basic_tokens() {
        let lexer = Lexer::new(["Id", "Name"]);
        let tokens = lexer.tokenize("(Id >> '3') && Name @= 'foo'").unwrap();

        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::BracketLeft,
                TokenKind::Property,
                TokenKind::Operator,
                TokenKind::Value,
                TokenKind::BracketRight,
                TokenKind::LogicalOp,
                TokenKind::Property,
                TokenKind::Operator,
                TokenKind::Value,
            ]
        );
        assert_eq!(
            texts(&tokens),
            vec!["(", "Id", ">>", "'3'", ")", "&&", "Name", "@=", "'foo'"]
        );
        assert_eq!(tokens[3].span, Span::new(7, 10));
    }

    #[test]
    fn test_operators() {
        let lexer = Lexer::new(["A"]);
        let tokens = lexer
            .tokenize(">> >= << <= == != @= =@ %% && ||")
            .unwrap();
        assert_eq!(
            texts(&tokens),
            vec![">>", ">=", "<<", "<=", "==", "!=", "@=", "=@", "%%", "&&", "||"]
        );
        assert!(tokens[..9].iter().all(|t| t.kind == TokenKind::Operator));
        assert!(tokens[9..].iter().all(|t| t.kind == TokenKind::LogicalOp));
    }

    #[test]
    fn test_no_whitespace_needed() {
        let lexer = Lexer::new(["Id"]);
        let tokens = lexer.tokenize("Id=='1'||Id<='0'").unwrap();
        assert_eq!(texts(&tokens), vec!["Id", "==", "'1'", "||", "Id", "<=", "'0'"]);
    }

    #[test]
    fn test_field_names_case_insensitive() {
        let lexer = Lexer::new(["Name"]);
        let tokens = lexer.tokenize("nAmE == 'x'").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Property);
        assert_eq!(tokens[0].text, "nAmE");
    }

    #[test]
    fn test_longest_field_name_wins() {
        let lexer = Lexer::new(["Id", "Identifier"]);
        let tokens = lexer.tokenize("Identifier == 'x'").unwrap();
        assert_eq!(tokens[0].text, "Identifier");
    }

    #[test]
    fn test_field_names_are_whole_tokens() {
        let lexer = Lexer::new(["Id"]);
        let err = lexer.tokenize("Identity == '1'").unwrap_err();
        assert_eq!(err.position, 0);
        assert!(err.unexpected.starts_with("Identity"));
    }

    #[test]
    fn test_values_are_verbatim() {
        let lexer = Lexer::new(["Name"]);
        let tokens = lexer.tokenize("Name == '  a && b (c) == d  '").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].text, "'  a && b (c) == d  '");
        assert_eq!(tokens[2].value_literal(), "  a && b (c) == d  ");
    }

    #[test]
    fn test_value_cannot_contain_tick() {
        // 'it' is a complete value, then `s'` cannot be lexed
        let lexer = Lexer::new(["Name"]);
        let err = lexer.tokenize("Name == 'it's'").unwrap_err();
        assert_eq!(err.position, 12);
    }

    #[test]
    fn test_unterminated_value() {
        let lexer = Lexer::new(["Name"]);
        let err = lexer.tokenize("Name == 'open").unwrap_err();
        assert_eq!(err.position, 8);
        assert_eq!(err.unexpected, "'open");
    }

    #[test]
    fn test_unknown_input_fails_atomically() {
        let lexer = Lexer::new(["Id"]);
        let err = lexer.tokenize("Id == '1' && Age == '2'").unwrap_err();
        assert_eq!(err.position, 13);

        let err = lexer.tokenize("Id > '1'").unwrap_err();
        assert_eq!(err.position, 3);
    }

    #[test]
    fn test_unicode_positions() {
        let lexer = Lexer::new(["Név"]);
        let tokens = lexer.tokenize("  NÉV == 'ő'").unwrap();
        assert_eq!(tokens[0].span, Span::new(2, 6));
        assert_eq!(tokens[2].value_literal(), "ő");
    }

    #[test]
    fn test_empty_input() {
        let lexer = Lexer::new(["Id"]);
        assert!(lexer.tokenize("").unwrap().is_empty());
        assert!(lexer.tokenize("   \t\n").unwrap().is_empty());
    }

    #[test]
    fn test_one_off_tokenize() {
        let tokens = tokenize(vec!["Id".to_string()], "Id != '4'").unwrap();
        assert_eq!(tokens.len(), 3);
    }
}
