//! Error types for the filter pipeline.
//!
//! Each stage has its own error type so callers can tell malformed syntax
//! (lexing), structural violations (parsing) and semantic violations
//! (binding) apart. [`FilterError`] wraps all of them for the end-to-end
//! entry points.

use crate::access::DataType;
use thiserror::Error;

/// The query contains a character sequence no lexer rule matches.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unexpected input at position {position}: '{unexpected}'")]
pub struct LexError {
    /// Byte offset of the first unmatched character
    pub position: usize,
    /// The remaining text starting at `position`, shortened for display
    pub unexpected: String,
}

impl LexError {
    const MAX_SNIPPET_CHARS: usize = 16;

    pub(crate) fn at(input: &str, position: usize) -> Self {
        let unexpected = input
            .get(position..)
            .unwrap_or_default()
            .chars()
            .take(Self::MAX_SNIPPET_CHARS)
            .collect();
        Self {
            position,
            unexpected,
        }
    }
}

/// Structural violations found while building the raw AST.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty expression at position {position}")]
    EmptyExpression { position: usize },

    #[error("Wrong order of tokens at position {position}: {reason}")]
    WrongTokenOrder { reason: String, position: usize },

    #[error("No matching start bracket for ')' at position {position}")]
    UnmatchedClosingBracket { position: usize },

    #[error("No matching ending bracket for '(' at position {position}")]
    UnmatchedOpeningBracket { position: usize },

    #[error("Brackets nested deeper than {max_depth} at position {position}")]
    NestingTooDeep { max_depth: usize, position: usize },

    #[error("Expression nests more than {max_tree_depth} levels at position {position}")]
    ExpressionTooDeep {
        max_tree_depth: usize,
        position: usize,
    },
}

impl ParseError {
    /// Byte offset in the query the error refers to
    pub fn position(&self) -> usize {
        match self {
            ParseError::EmptyExpression { position }
            | ParseError::WrongTokenOrder { position, .. }
            | ParseError::UnmatchedClosingBracket { position }
            | ParseError::UnmatchedOpeningBracket { position }
            | ParseError::NestingTooDeep { position, .. }
            | ParseError::ExpressionTooDeep { position, .. } => *position,
        }
    }
}

/// Semantic violations found while resolving fields and values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("Unknown field: {field}")]
    UnknownField { field: String },

    #[error("Ambiguous field '{field}': {candidates:?} all match")]
    AmbiguousField {
        field: String,
        candidates: Vec<String>,
    },

    #[error("Cannot convert '{value}' to {data_type}: {reason}")]
    InvalidValue {
        value: String,
        data_type: DataType,
        reason: String,
    },

    #[error("Operator '{operator}' is not supported for field '{field}' of type {data_type}")]
    UnsupportedOperator {
        operator: String,
        field: String,
        data_type: DataType,
    },

    #[error("Unknown operator: {operator}")]
    UnknownOperator { operator: String },
}

/// Errors raised while assembling a field registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Field '{0}' is registered more than once")]
    DuplicateField(String),

    #[error("Field name must not be empty")]
    EmptyFieldName,

    #[error("Field name '{0}' contains characters that cannot be lexed")]
    InvalidFieldName(String),
}

/// Any failure of the lex → parse → bind → compile pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error("Query is {len} bytes long, limit is {max}")]
    QueryTooLong { len: usize, max: usize },
}

/// Result type for filter compilation.
pub type FilterResult<T> = Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_error_snippet() {
        let err = LexError::at("Id == '1' $$ garbage that keeps going", 10);
        assert_eq!(err.position, 10);
        assert_eq!(err.unexpected, "$$ garbage that ");
        assert_eq!(
            err.to_string(),
            "Unexpected input at position 10: '$$ garbage that '"
        );
    }

    #[test]
    fn test_error_display() {
        let err = ParseError::UnmatchedClosingBracket { position: 8 };
        assert_eq!(
            err.to_string(),
            "No matching start bracket for ')' at position 8"
        );
        assert_eq!(err.position(), 8);

        let err = BindError::InvalidValue {
            value: "abc".to_string(),
            data_type: DataType::Int64,
            reason: "invalid digit found in string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot convert 'abc' to int64: invalid digit found in string"
        );

        let err = BindError::UnsupportedOperator {
            operator: "@=".to_string(),
            field: "Id".to_string(),
            data_type: DataType::Int32,
        };
        assert_eq!(
            err.to_string(),
            "Operator '@=' is not supported for field 'Id' of type int32"
        );
    }

    #[test]
    fn test_filter_error_is_transparent() {
        let err: FilterError = BindError::UnknownField {
            field: "Nope".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Unknown field: Nope");
    }
}
