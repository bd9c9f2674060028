//! Translate a bound filter into a parameterised SQL `WHERE` fragment.
//!
//! Literals never appear in the clause text; each comparison contributes one
//! `?` placeholder and its value is appended to `params` in the same order.

use crate::access::Value;
use crate::expression::{BoundComparison, BoundNode, ComparisonOperator};
use crate::query::LogicalOperator;
use serde::Serialize;

/// SQL condition plus its positional parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlFilter {
    pub clause: String,
    pub params: Vec<Value>,
}

/// Render a bound tree as SQL, column names taken from field names
pub fn to_sql<T>(node: &BoundNode<T>) -> SqlFilter {
    let mut filter = SqlFilter {
        clause: String::new(),
        params: Vec::new(),
    };
    generate_node_sql(node, &mut filter);
    filter
}

fn generate_node_sql<T>(node: &BoundNode<T>, filter: &mut SqlFilter) {
    match node {
        BoundNode::Comparison(cmp) => generate_comparison_sql(cmp, filter),
        BoundNode::Logical { op, left, right } => {
            filter.clause.push('(');
            generate_node_sql(left, filter);
            filter.clause.push_str(match op {
                LogicalOperator::And => " AND ",
                LogicalOperator::Or => " OR ",
            });
            generate_node_sql(right, filter);
            filter.clause.push(')');
        }
    }
}

fn generate_comparison_sql<T>(cmp: &BoundComparison<T>, filter: &mut SqlFilter) {
    let column = quote_identifier(cmp.field.name());
    let buffer = &mut filter.clause;

    match cmp.operator {
        // NULL <> x is unknown in SQL, but a missing value satisfies `!=` here
        ComparisonOperator::NotEqual => {
            buffer.push('(');
            buffer.push_str(&column);
            buffer.push_str(" <> ? OR ");
            buffer.push_str(&column);
            buffer.push_str(" IS NULL)");
            filter.params.push(cmp.value.clone());
        }
        ComparisonOperator::StartsWith
        | ComparisonOperator::EndsWith
        | ComparisonOperator::Contains => {
            buffer.push_str(&column);
            buffer.push_str(" LIKE ? ESCAPE '\\'");
            let escaped = escape_like(cmp.value.as_str().unwrap_or_default());
            let pattern = match cmp.operator {
                ComparisonOperator::StartsWith => format!("{}%", escaped),
                ComparisonOperator::EndsWith => format!("%{}", escaped),
                _ => format!("%{}%", escaped),
            };
            filter.params.push(Value::String(pattern));
        }
        op => {
            buffer.push_str(&column);
            buffer.push(' ');
            buffer.push_str(sql_operator(op));
            buffer.push_str(" ?");
            filter.params.push(cmp.value.clone());
        }
    }
}

fn sql_operator(op: ComparisonOperator) -> &'static str {
    match op {
        ComparisonOperator::GreaterThan => ">",
        ComparisonOperator::GreaterThanOrEqual => ">=",
        ComparisonOperator::LessThan => "<",
        ComparisonOperator::LessThanOrEqual => "<=",
        ComparisonOperator::Equal => "=",
        ComparisonOperator::NotEqual => "<>",
        ComparisonOperator::StartsWith
        | ComparisonOperator::EndsWith
        | ComparisonOperator::Contains => "LIKE",
    }
}

fn quote_identifier(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for c in name.chars() {
        if c == '"' {
            quoted.push_str("\"\"");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('"');
    quoted
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
