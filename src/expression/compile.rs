//! Lower a bound AST into a reusable predicate.

use crate::expression::sql::{to_sql, SqlFilter};
use crate::expression::{BoundComparison, BoundNode};
use crate::query::LogicalOperator;
use std::fmt;
use std::sync::Arc;

/// Type alias for predicate functions over one entity
pub type PredicateFn<T> = dyn Fn(&T) -> bool + Send + Sync;

/// An executable, translatable filter over entities of type `T`.
///
/// Holds both the closure tree built at compile time and the bound AST it was
/// built from, so callers can either evaluate in memory or walk the AST to
/// push the filter down elsewhere. Clones share both.
pub struct CompiledPredicate<T> {
    source: Option<Arc<str>>,
    ast: Arc<BoundNode<T>>,
    predicate: Arc<PredicateFn<T>>,
}

impl<T: 'static> CompiledPredicate<T> {
    pub fn new(ast: BoundNode<T>) -> Self {
        let predicate = lower(&ast);
        Self {
            source: None,
            ast: Arc::new(ast),
            predicate: Arc::from(predicate),
        }
    }

    /// Record the query text this predicate was compiled from
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl<T> CompiledPredicate<T> {
    pub fn evaluate(&self, entity: &T) -> bool {
        (self.predicate)(entity)
    }

    /// Lazily keep the entities that satisfy the predicate
    pub fn filter<'a, I>(&'a self, entities: I) -> impl Iterator<Item = &'a T> + 'a
    where
        I: IntoIterator<Item = &'a T>,
        I::IntoIter: 'a,
    {
        entities.into_iter().filter(move |entity| self.evaluate(entity))
    }

    pub fn count_matches<'a, I>(&self, entities: I) -> usize
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        entities
            .into_iter()
            .filter(|entity| self.evaluate(entity))
            .count()
    }

    pub fn ast(&self) -> &BoundNode<T> {
        &self.ast
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Parameterised SQL `WHERE` fragment for this predicate
    pub fn to_sql(&self) -> SqlFilter {
        to_sql(&self.ast)
    }
}

impl<T> Clone for CompiledPredicate<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            ast: Arc::clone(&self.ast),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<T> fmt::Debug for CompiledPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledPredicate")
            .field("source", &self.source)
            .field("ast", &self.ast)
            .finish_non_exhaustive()
    }
}

impl<T> fmt::Display for CompiledPredicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.ast, f)
    }
}

/// Compile a bound tree into a predicate
pub fn compile<T: 'static>(bound: BoundNode<T>) -> CompiledPredicate<T> {
    CompiledPredicate::new(bound)
}

fn lower<T: 'static>(node: &BoundNode<T>) -> Box<PredicateFn<T>> {
    match node {
        BoundNode::Comparison(cmp) => lower_comparison(cmp),
        BoundNode::Logical { op, left, right } => {
            let left = lower(left);
            let right = lower(right);
            match op {
                LogicalOperator::And => Box::new(move |entity: &T| left(entity) && right(entity)),
                LogicalOperator::Or => Box::new(move |entity: &T| left(entity) || right(entity)),
            }
        }
    }
}

fn lower_comparison<T: 'static>(cmp: &BoundComparison<T>) -> Box<PredicateFn<T>> {
    let field = Arc::clone(&cmp.field);
    let data_type = field.data_type();
    let operator = cmp.operator;
    let expected = cmp.value.clone();

    Box::new(move |entity: &T| {
        let actual = field.read(entity);
        actual.is_compatible_with(data_type) && operator.apply(&actual, &expected)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{DataType, FieldRegistry, Value};
    use crate::expression::bind;
    use crate::query::{parse, Lexer};

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: i32,
        tag: Option<String>,
    }

    fn compile_str(query: &str) -> CompiledPredicate<Row> {
        let registry = FieldRegistry::builder()
            .field("Id", DataType::Int32, |r: &Row| r.id.into())
            .field("Tag", DataType::String, |r: &Row| r.tag.clone().into())
            .build()
            .unwrap();
        let tokens = Lexer::for_registry(&registry).tokenize(query).unwrap();
        let raw = parse(&tokens).unwrap();
        compile(bind(&raw, &registry).unwrap()).with_source(query)
    }

    fn rows() -> Vec<Row> {
        (1..=6)
            .map(|id| Row {
                id,
                tag: if id % 2 == 0 {
                    Some(format!("even-{}", id))
                } else {
                    None
                },
            })
            .collect()
    }

    #[test]
    fn test_evaluate_comparison() {
        let predicate = compile_str("Id >> '4'");
        let ids: Vec<i32> = predicate.filter(&rows()).map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 6]);
    }

    #[test]
    fn test_null_field_values() {
        let rows = rows();
        assert_eq!(compile_str("Tag @= 'even'").count_matches(&rows), 3);
        assert_eq!(compile_str("Tag == 'even-2'").count_matches(&rows), 1);
        // Null tags satisfy `!=`
        assert_eq!(compile_str("Tag != 'even-2'").count_matches(&rows), 5);
    }

    #[test]
    fn test_closure_agrees_with_ast_walk() {
        let rows = rows();
        for query in [
            "Id << '3' || Tag %% '4'",
            "Id >= '2' && Id <= '5' && Tag =@ '4'",
            "(Id == '1' || Id == '2') && Tag != 'x'",
        ] {
            let predicate = compile_str(query);
            for row in &rows {
                assert_eq!(predicate.evaluate(row), predicate.ast().evaluate(row), "{}", query);
            }
        }
    }

    #[test]
    fn test_source_and_display() {
        let predicate = compile_str("id==  '3'");
        assert_eq!(predicate.source(), Some("id==  '3'"));
        assert_eq!(predicate.to_string(), "Id == '3'");
    }

    #[test]
    fn test_wrongly_typed_accessor_never_matches() {
        let registry = FieldRegistry::builder()
            .field("Id", DataType::Int64, |r: &Row| Value::Int32(r.id))
            .build()
            .unwrap();
        let tokens = Lexer::for_registry(&registry).tokenize("Id != '1'").unwrap();
        let predicate = compile(bind(&parse(&tokens).unwrap(), &registry).unwrap());
        assert_eq!(predicate.count_matches(&rows()), 0);
    }

    #[test]
    fn test_predicate_is_send_and_sync() {
        fn assert_send_sync<S: Send + Sync>(_: &S) {}
        let predicate = compile_str("Id == '1'");
        assert_send_sync(&predicate);

        let shared = predicate.clone();
        let handle = std::thread::spawn(move || shared.count_matches(&rows()));
        assert_eq!(handle.join().unwrap(), 1);
    }
}
