//! Binding and compilation of parsed filters.
//!
//! This module provides:
//! - The comparison operator table and its type rules
//! - A binder that resolves raw comparisons against a field registry
//! - The bound AST and its lowering into a predicate closure
//! - SQL translation of a bound AST

pub mod binder;
pub mod bound;
pub mod compile;
pub mod operator;
pub mod sql;

pub use binder::{bind, Binder};
pub use bound::{BoundComparison, BoundNode};
pub use compile::{compile, CompiledPredicate, PredicateFn};
pub use operator::ComparisonOperator;
pub use sql::{to_sql, SqlFilter};
