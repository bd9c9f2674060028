//! Bound AST: comparisons resolved against a field registry.
//!
//! This is the structure handed to query translators that push a filter down
//! to another store; it carries the field descriptor, the operator and the
//! literal already converted to the field's native type.

use crate::access::{FieldDescriptor, Value};
use crate::expression::ComparisonOperator;
use crate::query::LogicalOperator;
use std::fmt;
use std::sync::Arc;

/// A single type-checked comparison
pub struct BoundComparison<T> {
    pub field: Arc<FieldDescriptor<T>>,
    pub operator: ComparisonOperator,
    pub value: Value,
}

impl<T> BoundComparison<T> {
    /// Evaluate this comparison against one entity
    pub fn evaluate(&self, entity: &T) -> bool {
        let actual = self.field.read(entity);
        actual.is_compatible_with(self.field.data_type()) && self.operator.apply(&actual, &self.value)
    }
}

impl<T> Clone for BoundComparison<T> {
    fn clone(&self) -> Self {
        Self {
            field: Arc::clone(&self.field),
            operator: self.operator,
            value: self.value.clone(),
        }
    }
}

impl<T> fmt::Debug for BoundComparison<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundComparison")
            .field("field", &self.field.name())
            .field("operator", &self.operator)
            .field("value", &self.value)
            .finish()
    }
}

impl<T> PartialEq for BoundComparison<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.field, &other.field)
            && self.operator == other.operator
            && self.value == other.value
    }
}

/// Expression tree node with resolved leaves
pub enum BoundNode<T> {
    Comparison(BoundComparison<T>),
    Logical {
        op: LogicalOperator,
        left: Box<BoundNode<T>>,
        right: Box<BoundNode<T>>,
    },
}

impl<T> BoundNode<T> {
    pub fn logical(op: LogicalOperator, left: BoundNode<T>, right: BoundNode<T>) -> Self {
        BoundNode::Logical {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Interpret the tree directly against one entity, short-circuiting
    /// left to right
    pub fn evaluate(&self, entity: &T) -> bool {
        match self {
            BoundNode::Comparison(cmp) => cmp.evaluate(entity),
            BoundNode::Logical { op, left, right } => match op {
                LogicalOperator::And => left.evaluate(entity) && right.evaluate(entity),
                LogicalOperator::Or => left.evaluate(entity) || right.evaluate(entity),
            },
        }
    }

    /// All comparison leaves, left to right
    pub fn comparisons(&self) -> Vec<&BoundComparison<T>> {
        let mut leaves = Vec::new();
        self.collect_comparisons(&mut leaves);
        leaves
    }

    fn collect_comparisons<'a>(&'a self, leaves: &mut Vec<&'a BoundComparison<T>>) {
        match self {
            BoundNode::Comparison(cmp) => leaves.push(cmp),
            BoundNode::Logical { left, right, .. } => {
                left.collect_comparisons(leaves);
                right.collect_comparisons(leaves);
            }
        }
    }
}

impl<T> Clone for BoundNode<T> {
    fn clone(&self) -> Self {
        match self {
            BoundNode::Comparison(cmp) => BoundNode::Comparison(cmp.clone()),
            BoundNode::Logical { op, left, right } => BoundNode::Logical {
                op: *op,
                left: left.clone(),
                right: right.clone(),
            },
        }
    }
}

impl<T> fmt::Debug for BoundNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundNode::Comparison(cmp) => fmt::Debug::fmt(cmp, f),
            BoundNode::Logical { op, left, right } => f
                .debug_struct("Logical")
                .field("op", op)
                .field("left", left)
                .field("right", right)
                .finish(),
        }
    }
}

impl<T> PartialEq for BoundNode<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (BoundNode::Comparison(a), BoundNode::Comparison(b)) => a == b,
            (
                BoundNode::Logical { op, left, right },
                BoundNode::Logical {
                    op: other_op,
                    left: other_left,
                    right: other_right,
                },
            ) => op == other_op && left == other_left && right == other_right,
            _ => false,
        }
    }
}

/// Renders back into query syntax, fully parenthesised
impl<T> fmt::Display for BoundNode<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundNode::Comparison(cmp) => write!(
                f,
                "{} {} '{}'",
                cmp.field.name(),
                cmp.operator.as_str(),
                cmp.value
            ),
            BoundNode::Logical { op, left, right } => {
                write!(f, "({} {} {})", left, op.as_str(), right)
            }
        }
    }
}
