pub mod access;
pub mod cache;
pub mod compiler;
pub mod error;
pub mod expression;
pub mod json;
pub mod query;

pub use access::{DataType, FieldDescriptor, FieldRegistry, RegistryBuilder, Value};
pub use cache::{CacheStats, PredicateCache};
pub use compiler::{compile_query, CompilerOptions, FilterCompiler};
pub use error::{BindError, FilterError, FilterResult, LexError, ParseError, RegistryError};
pub use expression::{BoundComparison, BoundNode, ComparisonOperator, CompiledPredicate, SqlFilter};
pub use query::{LogicalOperator, RawNode, Token, TokenKind};
