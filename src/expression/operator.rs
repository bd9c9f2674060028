//! Comparison operator table.

use crate::access::{DataType, Value};
use std::cmp::Ordering;

/// Comparison operators of the filter language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Equal,
    NotEqual,
    StartsWith,
    EndsWith,
    Contains,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 9] = [
        ComparisonOperator::GreaterThan,
        ComparisonOperator::GreaterThanOrEqual,
        ComparisonOperator::LessThan,
        ComparisonOperator::LessThanOrEqual,
        ComparisonOperator::Equal,
        ComparisonOperator::NotEqual,
        ComparisonOperator::StartsWith,
        ComparisonOperator::EndsWith,
        ComparisonOperator::Contains,
    ];

    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == lexeme)
    }

    /// Get the lexeme for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::GreaterThan => ">>",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::LessThan => "<<",
            ComparisonOperator::LessThanOrEqual => "<=",
            ComparisonOperator::Equal => "==",
            ComparisonOperator::NotEqual => "!=",
            ComparisonOperator::StartsWith => "@=",
            ComparisonOperator::EndsWith => "=@",
            ComparisonOperator::Contains => "%%",
        }
    }

    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            ComparisonOperator::GreaterThan
                | ComparisonOperator::GreaterThanOrEqual
                | ComparisonOperator::LessThan
                | ComparisonOperator::LessThanOrEqual
        )
    }

    pub fn is_string_only(&self) -> bool {
        matches!(
            self,
            ComparisonOperator::StartsWith
                | ComparisonOperator::EndsWith
                | ComparisonOperator::Contains
        )
    }

    /// Check if this operator has an implementation for the given field type
    pub fn supports(&self, data_type: DataType) -> bool {
        if self.is_ordering() {
            data_type.is_ordered()
        } else if self.is_string_only() {
            data_type == DataType::String
        } else {
            true
        }
    }

    /// Compare a field value against a bound literal.
    ///
    /// A `Null` field value only satisfies `!=`. Values whose variants do not
    /// line up never satisfy an ordering or string operator.
    pub fn apply(&self, actual: &Value, expected: &Value) -> bool {
        if actual.is_null() {
            return *self == ComparisonOperator::NotEqual;
        }

        match self {
            ComparisonOperator::Equal => actual == expected,
            ComparisonOperator::NotEqual => actual != expected,
            ComparisonOperator::GreaterThan => actual.compare(expected) == Some(Ordering::Greater),
            ComparisonOperator::GreaterThanOrEqual => matches!(
                actual.compare(expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            ComparisonOperator::LessThan => actual.compare(expected) == Some(Ordering::Less),
            ComparisonOperator::LessThanOrEqual => matches!(
                actual.compare(expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
            ComparisonOperator::StartsWith => {
                string_pair(actual, expected).is_some_and(|(a, e)| a.starts_with(e))
            }
            ComparisonOperator::EndsWith => {
                string_pair(actual, expected).is_some_and(|(a, e)| a.ends_with(e))
            }
            ComparisonOperator::Contains => {
                string_pair(actual, expected).is_some_and(|(a, e)| a.contains(e))
            }
        }
    }
}

fn string_pair<'a>(actual: &'a Value, expected: &'a Value) -> Option<(&'a str, &'a str)> {
    Some((actual.as_str()?, expected.as_str()?))
}
