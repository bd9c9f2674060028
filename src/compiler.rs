//! End-to-end filter compilation for one entity type.

use crate::access::FieldRegistry;
use crate::error::{FilterError, FilterResult};
use crate::expression::{bind, compile, BoundNode, CompiledPredicate};
use crate::query::{Lexer, Parser, RawNode, Token, DEFAULT_MAX_DEPTH, DEFAULT_MAX_TREE_DEPTH};

/// Limits applied to every query a [`FilterCompiler`] accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Maximum bracket nesting depth
    pub max_depth: usize,
    /// Maximum depth of the folded expression tree; a flat chain of `n`
    /// comparisons is `n` levels deep
    pub max_tree_depth: usize,
    /// Maximum query length in bytes, unlimited when `None`
    pub max_query_len: Option<usize>,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
            max_query_len: None,
        }
    }
}

/// Turns query strings into [`CompiledPredicate`]s over `T`.
///
/// Holds the registry and a lexer prepared from its field names, so building
/// one compiler per entity type and reusing it avoids re-sorting the names on
/// every call. The compiler is immutable and can be shared between threads.
pub struct FilterCompiler<T> {
    registry: FieldRegistry<T>,
    lexer: Lexer,
    options: CompilerOptions,
}

impl<T> Clone for FilterCompiler<T> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            lexer: self.lexer.clone(),
            options: self.options,
        }
    }
}

impl<T> std::fmt::Debug for FilterCompiler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterCompiler")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<T> FilterCompiler<T> {
    pub fn new(registry: FieldRegistry<T>) -> Self {
        Self::with_options(registry, CompilerOptions::default())
    }

    pub fn with_options(registry: FieldRegistry<T>, options: CompilerOptions) -> Self {
        let lexer = Lexer::for_registry(&registry);
        Self {
            registry,
            lexer,
            options,
        }
    }

    pub fn registry(&self) -> &FieldRegistry<T> {
        &self.registry
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn tokenize(&self, query: &str) -> FilterResult<Vec<Token>> {
        self.check_length(query)?;
        Ok(self.lexer.tokenize(query)?)
    }

    pub fn parse(&self, query: &str) -> FilterResult<RawNode> {
        let tokens = self.tokenize(query)?;
        let raw = Parser::new(&tokens)
            .with_max_depth(self.options.max_depth)
            .with_max_tree_depth(self.options.max_tree_depth)
            .parse()?;
        Ok(raw)
    }

    /// Lex, parse and bind without building the closure tree, for callers
    /// that only translate the filter elsewhere
    pub fn bind(&self, query: &str) -> FilterResult<BoundNode<T>> {
        let raw = self.parse(query)?;
        Ok(bind(&raw, &self.registry)?)
    }

    fn check_length(&self, query: &str) -> FilterResult<()> {
        match self.options.max_query_len {
            Some(max) if query.len() > max => Err(FilterError::QueryTooLong {
                len: query.len(),
                max,
            }),
            _ => Ok(()),
        }
    }
}

impl<T: 'static> FilterCompiler<T> {
    /// Compile a query into a predicate. Any stage failing aborts the whole
    /// compilation; no partial predicate is returned.
    pub fn compile(&self, query: &str) -> FilterResult<CompiledPredicate<T>> {
        let bound = self.bind(query).map_err(|e| {
            log::debug!("Failed to compile filter {:?}: {}", query, e);
            e
        })?;

        log::debug!(
            "Compiled filter {:?} into {} comparisons",
            query,
            bound.comparisons().len()
        );
        Ok(compile(bound).with_source(query))
    }
}

/// One-shot compilation against a registry
pub fn compile_query<T: 'static>(
    registry: &FieldRegistry<T>,
    query: &str,
) -> FilterResult<CompiledPredicate<T>> {
    FilterCompiler::new(registry.clone()).compile(query)
}
