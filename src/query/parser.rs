// Filter query parser - converts tokens to a raw AST

use super::ast::{LogicalOperator, RawNode};
use super::token::{Token, TokenKind};
use crate::error::ParseError;

/// Default bound on bracket nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default bound on the depth of the folded tree. A flat chain of `n`
/// comparisons folds into a tree `n` levels deep.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 256;

/// Recursive-descent parser over an immutable token slice.
///
/// Every bracket scope is parsed by its own call, which collects operands
/// and logical combinators and folds them strictly left to right when the
/// scope closes. `&&` and `||` have equal precedence.
///
/// Everything downstream of the parser walks the tree recursively, so both
/// bracket nesting and the depth of the folded tree are bounded here.
pub struct Parser<'a> {
    tokens: &'a [Token],
    max_depth: usize,
    max_tree_depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser {
            tokens,
            max_depth: DEFAULT_MAX_DEPTH,
            max_tree_depth: DEFAULT_MAX_TREE_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_tree_depth(mut self, max_tree_depth: usize) -> Self {
        self.max_tree_depth = max_tree_depth;
        self
    }

    /// Parse the whole token stream into a single node
    pub fn parse(&self) -> Result<RawNode, ParseError> {
        let (node, _, tree_depth) = self.parse_scope(0, 0)?;
        log::debug!(
            "Parsed {} tokens into a tree {} level(s) deep",
            self.tokens.len(),
            tree_depth
        );
        Ok(node)
    }

    /// Parse one scope starting at `start`. Nested scopes (`depth > 0`) end at
    /// their closing bracket; the top-level scope ends at end of input.
    /// Returns the folded node, the index of the first unconsumed token and
    /// the depth of the folded node.
    fn parse_scope(
        &self,
        start: usize,
        depth: usize,
    ) -> Result<(RawNode, usize, usize), ParseError> {
        let mut operands: Vec<RawNode> = Vec::new();
        let mut combinators: Vec<(LogicalOperator, usize)> = Vec::new();
        let mut pos = start;
        let mut tree_depth = 0;

        while let Some(token) = self.tokens.get(pos) {
            match token.kind {
                TokenKind::Property | TokenKind::BracketLeft => {
                    if operands.len() > combinators.len() {
                        return Err(self.wrong_order(
                            pos,
                            format!("expected a logical operator before {}", token),
                        ));
                    }

                    let (node, next, operand_depth) = if token.kind == TokenKind::Property {
                        let (node, next) = self.parse_comparison(pos)?;
                        (node, next, 1)
                    } else {
                        if depth >= self.max_depth {
                            return Err(ParseError::NestingTooDeep {
                                max_depth: self.max_depth,
                                position: token.span.start,
                            });
                        }
                        self.parse_scope(pos + 1, depth + 1)?
                    };
                    // Folding appends one level above everything to the left
                    tree_depth = if operands.is_empty() {
                        operand_depth
                    } else {
                        1 + tree_depth.max(operand_depth)
                    };
                    if tree_depth > self.max_tree_depth {
                        return Err(ParseError::ExpressionTooDeep {
                            max_tree_depth: self.max_tree_depth,
                            position: token.span.start,
                        });
                    }
                    operands.push(node);
                    pos = next;
                }
                TokenKind::LogicalOp => {
                    if operands.len() == combinators.len() {
                        return Err(self.wrong_order(
                            pos,
                            format!("expected a comparison or '(' before {}", token),
                        ));
                    }
                    let op = LogicalOperator::from_lexeme(&token.text).ok_or_else(|| {
                        self.wrong_order(pos, format!("unknown logical operator {}", token))
                    })?;
                    combinators.push((op, token.span.start));
                    pos += 1;
                }
                TokenKind::BracketRight => {
                    if depth == 0 {
                        return Err(ParseError::UnmatchedClosingBracket {
                            position: token.span.start,
                        });
                    }
                    let node = Self::fold(operands, combinators, token.span.start)?;
                    return Ok((node, pos + 1, tree_depth));
                }
                TokenKind::Operator | TokenKind::Value => {
                    return Err(self.wrong_order(pos, format!("unexpected {}", token)));
                }
            }
        }

        if depth > 0 {
            return Err(ParseError::UnmatchedOpeningBracket {
                position: self.tokens[start - 1].span.start,
            });
        }

        let node = Self::fold(operands, combinators, self.end_position())?;
        Ok((node, pos, tree_depth))
    }

    /// Consume `Property Operator Value` starting at `pos`
    fn parse_comparison(&self, pos: usize) -> Result<(RawNode, usize), ParseError> {
        let property = &self.tokens[pos];
        let operator = self.expect_kind(pos + 1, TokenKind::Operator, property)?;
        let value = self.expect_kind(pos + 2, TokenKind::Value, operator)?;

        Ok((
            RawNode::Comparison {
                property: property.clone(),
                operator: operator.clone(),
                value: value.clone(),
            },
            pos + 3,
        ))
    }

    fn expect_kind(&self, pos: usize, kind: TokenKind, after: &Token) -> Result<&'a Token, ParseError> {
        match self.tokens.get(pos) {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(self.wrong_order(
                pos,
                format!("expected {} after {}, got {}", kind, after, token),
            )),
            None => Err(self.wrong_order(
                pos,
                format!("expected {} after {}, got end of input", kind, after),
            )),
        }
    }

    /// Fold operands left to right: `[a, b, c]` with `[op1, op2]` becomes
    /// `((a op1 b) op2 c)`.
    fn fold(
        operands: Vec<RawNode>,
        combinators: Vec<(LogicalOperator, usize)>,
        position: usize,
    ) -> Result<RawNode, ParseError> {
        if let Some(&(_, dangling)) = combinators.get(operands.len().saturating_sub(1)) {
            return Err(ParseError::WrongTokenOrder {
                reason: "logical operator is missing its right operand".to_string(),
                position: dangling,
            });
        }

        let mut operands = operands.into_iter();
        let first = operands
            .next()
            .ok_or(ParseError::EmptyExpression { position })?;

        Ok(combinators
            .into_iter()
            .zip(operands)
            .fold(first, |acc, ((op, _), right)| RawNode::logical(op, acc, right)))
    }

    fn wrong_order(&self, pos: usize, reason: String) -> ParseError {
        let position = self
            .tokens
            .get(pos)
            .map_or_else(|| self.end_position(), |t| t.span.start);
        ParseError::WrongTokenOrder { reason, position }
    }

    fn end_position(&self) -> usize {
        self.tokens.last().map_or(0, |t| t.span.end)
    }
}

/// Parse a token stream with the default nesting bound
pub fn parse(tokens: &[Token]) -> Result<RawNode, ParseError> {
    Parser::new(tokens).parse()
}
