// Untyped AST produced by the parser

use super::token::Token;
use std::fmt;

/// Logical combinator between two sub-expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "&&" => Some(LogicalOperator::And),
            "||" => Some(LogicalOperator::Or),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
        }
    }
}

/// Raw expression tree; leaves still hold the tokens as lexed
#[derive(Debug, Clone, PartialEq)]
pub enum RawNode {
    Comparison {
        property: Token,
        operator: Token,
        value: Token,
    },
    Logical {
        op: LogicalOperator,
        left: Box<RawNode>,
        right: Box<RawNode>,
    },
}

impl RawNode {
    pub fn logical(op: LogicalOperator, left: RawNode, right: RawNode) -> Self {
        RawNode::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Number of comparison leaves
    pub fn comparison_count(&self) -> usize {
        match self {
            RawNode::Comparison { .. } => 1,
            RawNode::Logical { left, right, .. } => {
                left.comparison_count() + right.comparison_count()
            }
        }
    }
}

/// Fully parenthesised rendering; shows how the fold grouped the operands
impl fmt::Display for RawNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawNode::Comparison {
                property,
                operator,
                value,
            } => write!(f, "{} {} {}", property.text, operator.text, value.text),
            RawNode::Logical { op, left, right } => {
                write!(f, "({} {} {})", left, op.as_str(), right)
            }
        }
    }
}
