// Query module - filter query lexing and parsing

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{LogicalOperator, RawNode};
pub use lexer::{tokenize, Lexer};
pub use parser::{parse, Parser, DEFAULT_MAX_DEPTH, DEFAULT_MAX_TREE_DEPTH};
pub use token::{Span, Token, TokenKind};
