//! Expression language: tokenizer, parser, canonical serializer and evaluator.

/// Vectorized evaluator.
pub mod eval;
/// Canonical text generation.
pub mod generate;
/// Tokenizer for expression source text.
pub mod lexer;
/// Recursive-descent parser.
pub mod parser;

use tracing::debug;

use crate::arena::{Arena, NodeId};
use crate::error::SkinError;

/// Parses expression source into nodes appended to `arena` and returns the root.
///
/// Names resolve against leaves already bound in the arena. On failure nothing
/// is returned; nodes allocated before the error stay in the arena unreferenced.
pub fn parse_expression(arena: &mut Arena, input: &str) -> Result<NodeId, SkinError> {
    let limits = *arena.limits();
    let tokens = lexer::tokenize(input, &limits)?;
    debug!(
        expression = input,
        tokens = %render_tokens(&tokens),
        "tokenized expression"
    );
    let root = parser::parse(&tokens, arena)?;
    debug!(root = %root, nodes = arena.len(), "parsed expression");
    Ok(root)
}

/// Renders tokens as `[a] [+] [b]`.
pub fn render_tokens(tokens: &[lexer::Token]) -> String {
    tokens
        .iter()
        .map(|t| format!("[{}]", t.kind))
        .collect::<Vec<_>>()
        .join(" ")
}
