//! Recursive-descent parser that builds nodes directly into an [`Arena`].
//!
//! Grammar:
//!
//! ```text
//! expr    := '-'? operand (operator '-'? operand)?
//! operand := literal | name | '(' expr ')' | '_' keyword '(' expr ',' expr ')'
//! ```
//!
//! Each frame reports how many tokens it consumed and which token closed it,
//! so the caller can resume right after a bracketed or function sub-expression.

use std::sync::OnceLock;

use regex::Regex;

use crate::arena::{Arena, BinaryOp, NodeId};
use crate::error::{SkinError, SyntaxErrorKind};

use super::lexer::{Token, TokenKind};

/// Parses a full token sequence into a single node.
pub fn parse(tokens: &[Token], arena: &mut Arena) -> Result<NodeId, SkinError> {
    let end = tokens.last().map_or(0, |t| t.pos + 1);
    let mut parser = Parser { arena, end };
    let parsed = parser.parse_frame(tokens, Frame::Root)?;
    match parsed.close {
        Close::Exhausted => Ok(parsed.node),
        Close::Bracket if parsed.consumed < tokens.len() => Err(SkinError::syntax(
            SyntaxErrorKind::TrailingTokens,
            tokens[parsed.consumed].pos,
        )),
        Close::Bracket | Close::Comma => Err(SkinError::syntax(
            SyntaxErrorKind::UnmatchedBracket,
            tokens[parsed.consumed - 1].pos,
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    /// Whole expression; ends when tokens run out.
    Root,
    /// Inside `( ... )`.
    Group,
    /// One operand of a function form; ends at `,` or `)`.
    Operand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Close {
    Exhausted,
    Bracket,
    Comma,
}

struct Parsed {
    node: NodeId,
    /// Tokens used, including the closing `)` or `,`.
    consumed: usize,
    close: Close,
}

#[derive(Debug, Default)]
struct Pending {
    value: Option<NodeId>,
    operator: Option<BinaryOp>,
    argument: Option<NodeId>,
    /// Position of a `-` waiting for its literal.
    negation: Option<usize>,
}

impl Pending {
    fn is_complete(&self) -> bool {
        self.negation.is_none()
            && self.value.is_some()
            && self.operator.is_some() == self.argument.is_some()
    }

    fn check_operand_slot(&self, pos: usize) -> Result<(), SkinError> {
        match (self.value, self.operator, self.argument) {
            (None, _, _) | (Some(_), Some(_), None) => Ok(()),
            (Some(_), None, _) => Err(SkinError::syntax(SyntaxErrorKind::MissingOperator, pos)),
            (Some(_), Some(_), Some(_)) => {
                Err(SkinError::syntax(SyntaxErrorKind::TooManyOperands, pos))
            }
        }
    }

    fn reject_negation(&self) -> Result<(), SkinError> {
        match self.negation {
            Some(pos) => Err(SkinError::syntax(SyntaxErrorKind::UnsupportedNegation, pos)),
            None => Ok(()),
        }
    }

    fn place(&mut self, node: NodeId) {
        if self.value.is_none() {
            self.value = Some(node);
        } else {
            self.argument = Some(node);
        }
    }

    /// `-` negates the next literal when an operand is expected, otherwise it
    /// is the subtract operator.
    fn minus(&mut self, pos: usize) -> Result<(), SkinError> {
        match (self.value, self.operator, self.argument) {
            (None, _, _) | (Some(_), Some(_), None) => {
                if self.negation.is_some() {
                    return Err(SkinError::syntax(SyntaxErrorKind::DoubleOperator, pos));
                }
                self.negation = Some(pos);
                Ok(())
            }
            (Some(_), None, _) => {
                self.operator = Some(BinaryOp::Subtract);
                Ok(())
            }
            // `1 + 2 - 3`: a second operator on an already complete pair.
            (Some(_), Some(_), Some(_)) => {
                Err(SkinError::syntax(SyntaxErrorKind::DoubleOperator, pos))
            }
        }
    }

    fn operator(&mut self, token: &TokenKind, pos: usize) -> Result<(), SkinError> {
        match (self.value, self.operator, self.argument) {
            (None, _, _) => Err(SkinError::syntax(
                SyntaxErrorKind::OperatorWithoutValue,
                pos,
            )),
            (Some(_), Some(_), _) => {
                Err(SkinError::syntax(SyntaxErrorKind::DoubleOperator, pos))
            }
            (Some(_), None, _) => {
                let op = symbol_operator(token).ok_or_else(|| {
                    SkinError::syntax(SyntaxErrorKind::UnknownOperator(token.to_string()), pos)
                })?;
                self.operator = Some(op);
                Ok(())
            }
        }
    }
}

fn symbol_operator(token: &TokenKind) -> Option<BinaryOp> {
    match token {
        TokenKind::Plus => Some(BinaryOp::Add),
        TokenKind::Minus => Some(BinaryOp::Subtract),
        TokenKind::Star => Some(BinaryOp::Product),
        TokenKind::Slash => Some(BinaryOp::Divide),
        TokenKind::Lt => Some(BinaryOp::LessThan),
        TokenKind::Gt => Some(BinaryOp::GreaterThan),
        TokenKind::EqEq => Some(BinaryOp::Equals),
        _ => None,
    }
}

fn is_numeric(text: &str) -> bool {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)$").expect("valid regex")
    });
    re.is_match(text)
}

struct Parser<'a> {
    arena: &'a mut Arena,
    /// Position reported for errors at end of input.
    end: usize,
}

impl Parser<'_> {
    fn parse_frame(&mut self, tokens: &[Token], frame: Frame) -> Result<Parsed, SkinError> {
        let mut pending = Pending::default();
        let mut used = 0;

        let close = loop {
            let Some(token) = tokens.get(used) else {
                break Close::Exhausted;
            };
            used += 1;

            match &token.kind {
                TokenKind::RParen => break Close::Bracket,
                TokenKind::Comma => {
                    if frame == Frame::Operand && pending.is_complete() {
                        break Close::Comma;
                    }
                    return Err(SkinError::syntax(SyntaxErrorKind::MisplacedComma, token.pos));
                }
                TokenKind::Underscore => {
                    pending.check_operand_slot(token.pos)?;
                    pending.reject_negation()?;
                    let (node, n) = self.parse_function(&tokens[used..], token.pos)?;
                    used += n;
                    pending.place(node);
                }
                TokenKind::LParen => {
                    pending.check_operand_slot(token.pos)?;
                    pending.reject_negation()?;
                    let inner = self.parse_frame(&tokens[used..], Frame::Group)?;
                    if inner.close != Close::Bracket {
                        return Err(SkinError::syntax(
                            SyntaxErrorKind::UnmatchedBracket,
                            token.pos,
                        ));
                    }
                    used += inner.consumed;
                    pending.place(inner.node);
                }
                TokenKind::Minus => pending.minus(token.pos)?,
                TokenKind::Word(text) => {
                    pending.check_operand_slot(token.pos)?;
                    let negation = pending.negation.take();
                    let node = self.leaf(text, negation, token.pos)?;
                    pending.place(node);
                }
                other => pending.operator(other, token.pos)?,
            }
        };

        let close_pos = match close {
            Close::Exhausted => self.end,
            Close::Bracket | Close::Comma => tokens[used - 1].pos,
        };
        let node = self.finish(pending, close_pos)?;
        Ok(Parsed {
            node,
            consumed: used,
            close,
        })
    }

    /// Parses `keyword '(' expr ',' expr ')'`; `tokens` starts after the `_`.
    fn parse_function(
        &mut self,
        tokens: &[Token],
        underscore_pos: usize,
    ) -> Result<(NodeId, usize), SkinError> {
        let keyword = tokens.first().ok_or_else(|| {
            SkinError::syntax(SyntaxErrorKind::IncompleteExpression, underscore_pos)
        })?;
        let op = match &keyword.kind {
            TokenKind::Word(word) => BinaryOp::from_keyword(word),
            _ => None,
        }
        .ok_or_else(|| {
            SkinError::syntax(
                SyntaxErrorKind::UnknownOperator(keyword.kind.to_string()),
                keyword.pos,
            )
        })?;

        let open = match tokens.get(1) {
            Some(t) if t.kind == TokenKind::LParen => t.pos,
            Some(t) => {
                return Err(SkinError::syntax(
                    SyntaxErrorKind::FunctionWithoutBracket,
                    t.pos,
                ))
            }
            None => {
                return Err(SkinError::syntax(
                    SyntaxErrorKind::FunctionWithoutBracket,
                    keyword.pos,
                ))
            }
        };
        let mut used = 2;

        let first = self.parse_frame(&tokens[used..], Frame::Operand)?;
        used += first.consumed;
        match first.close {
            Close::Comma => {}
            Close::Bracket => {
                return Err(SkinError::syntax(
                    SyntaxErrorKind::MissingOperand,
                    tokens[used - 1].pos,
                ))
            }
            Close::Exhausted => {
                return Err(SkinError::syntax(SyntaxErrorKind::UnmatchedBracket, open))
            }
        }

        let second = self.parse_frame(&tokens[used..], Frame::Operand)?;
        used += second.consumed;
        match second.close {
            Close::Bracket => {}
            Close::Comma => {
                return Err(SkinError::syntax(
                    SyntaxErrorKind::TooManyOperands,
                    tokens[used - 1].pos,
                ))
            }
            Close::Exhausted => {
                return Err(SkinError::syntax(SyntaxErrorKind::UnmatchedBracket, open))
            }
        }

        let node = self.arena.binary(op, first.node, second.node)?;
        Ok((node, used))
    }

    /// Creates a literal leaf or resolves a bound name.
    fn leaf(
        &mut self,
        text: &str,
        negation: Option<usize>,
        pos: usize,
    ) -> Result<NodeId, SkinError> {
        if is_numeric(text) {
            let value: f32 = text.parse().map_err(|_| SkinError::UnresolvedName {
                name: text.to_string(),
                pos,
            })?;
            return match negation {
                Some(_) => self.arena.literal_with_text(format!("-{text}"), -value),
                None => self.arena.literal_with_text(text.to_string(), value),
            };
        }

        if let Some(neg_pos) = negation {
            return Err(SkinError::syntax(
                SyntaxErrorKind::UnsupportedNegation,
                neg_pos,
            ));
        }

        self.arena
            .find_named(text)
            .ok_or_else(|| SkinError::UnresolvedName {
                name: text.to_string(),
                pos,
            })
    }

    fn finish(&mut self, pending: Pending, pos: usize) -> Result<NodeId, SkinError> {
        if let Some(neg_pos) = pending.negation {
            return Err(SkinError::syntax(
                SyntaxErrorKind::IncompleteExpression,
                neg_pos,
            ));
        }
        match (pending.value, pending.operator, pending.argument) {
            (Some(value), None, None) => Ok(value),
            (Some(value), Some(op), Some(argument)) => self.arena.binary(op, value, argument),
            _ => Err(SkinError::syntax(
                SyntaxErrorKind::IncompleteExpression,
                pos,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::is_numeric;

    #[test]
    fn numeric_literals_allow_one_decimal_point() {
        for text in ["1", "10", "1.1", "1.", ".5", "007"] {
            assert!(is_numeric(text), "{text} should be numeric");
        }
        for text in ["", ".", "1.1.1", "1e5", "x1", "1_0"] {
            assert!(!is_numeric(text), "{text} should not be numeric");
        }
    }
}
