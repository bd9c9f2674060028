//! Resolve a raw AST against a field registry.

use crate::access::FieldRegistry;
use crate::error::BindError;
use crate::expression::{BoundComparison, BoundNode, ComparisonOperator};
use crate::query::{RawNode, Token};
use std::sync::Arc;

/// Binds raw comparisons to field descriptors and typed literals
pub struct Binder<'r, T> {
    registry: &'r FieldRegistry<T>,
}

impl<'r, T> Binder<'r, T> {
    pub fn new(registry: &'r FieldRegistry<T>) -> Self {
        Self { registry }
    }

    /// Bind a raw tree. Stops at the first leaf that fails.
    pub fn bind(&self, raw: &RawNode) -> Result<BoundNode<T>, BindError> {
        match raw {
            RawNode::Comparison {
                property,
                operator,
                value,
            } => self
                .bind_comparison(property, operator, value)
                .map(BoundNode::Comparison),
            RawNode::Logical { op, left, right } => Ok(BoundNode::logical(
                *op,
                self.bind(left)?,
                self.bind(right)?,
            )),
        }
    }

    fn bind_comparison(
        &self,
        property: &Token,
        operator: &Token,
        value: &Token,
    ) -> Result<BoundComparison<T>, BindError> {
        let field = self.registry.lookup(&property.text)?;

        let op = ComparisonOperator::from_lexeme(&operator.text).ok_or_else(|| {
            BindError::UnknownOperator {
                operator: operator.text.clone(),
            }
        })?;

        let data_type = field.data_type();
        if !op.supports(data_type) {
            return Err(BindError::UnsupportedOperator {
                operator: operator.text.clone(),
                field: field.name().to_string(),
                data_type,
            });
        }

        let literal = data_type.parse_literal(value.value_literal())?;

        Ok(BoundComparison {
            field: Arc::clone(field),
            operator: op,
            value: literal,
        })
    }
}

/// Bind a raw tree against a registry
pub fn bind<T>(raw: &RawNode, registry: &FieldRegistry<T>) -> Result<BoundNode<T>, BindError> {
    Binder::new(registry).bind(raw)
}
