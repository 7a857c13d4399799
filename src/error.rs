//! Error definitions for every stage of the expression engine.

use std::fmt;

use thiserror::Error;

use crate::arena::NodeId;

#[derive(Debug, Error)]
/// Top-level error type returned by public APIs.
pub enum SkinError {
    /// Expression text exceeds the configured byte length.
    #[error("lex error: expression length {len} exceeds max expression length {max}")]
    ExpressionTooLong { len: usize, max: usize },
    /// A single token exceeds the configured length.
    #[error("lex error: token at {pos} exceeds max token length {max}")]
    TokenTooLong { pos: usize, max: usize },
    /// Expression produces more tokens than allowed.
    #[error("lex error: expression exceeds max token count {max}")]
    TooManyTokens { max: usize },
    /// Grammar violation.
    #[error("syntax error at {pos}: {kind}")]
    Syntax { kind: SyntaxErrorKind, pos: usize },
    /// Identifier that matches no named leaf in the arena.
    #[error("unresolved name '{name}' at {pos}")]
    UnresolvedName { name: String, pos: usize },
    /// Input name that was never registered, outside of any parse.
    #[error("no input bound as '{0}'")]
    UnknownBinding(String),
    /// Name registered twice.
    #[error("name '{0}' is already bound")]
    DuplicateName(String),
    /// Name or literal text exceeds the configured name length.
    #[error("name '{name}' exceeds max name length {max}")]
    NameTooLong { name: String, max: usize },
    /// Arena has no room for another node.
    #[error("arena error: node capacity {capacity} exhausted")]
    ArenaFull { capacity: usize },
    /// Node id does not belong to this arena.
    #[error("arena error: unknown node {0}")]
    UnknownNode(NodeId),
    /// Value vector exceeds the configured length.
    #[error("arena error: {len} values exceed max vector length {max}")]
    ValuesTooLong { len: usize, max: usize },
    /// Values can only be written into leaves.
    #[error("arena error: node {0} is not a leaf")]
    NotALeaf(NodeId),
    /// Node shape that cannot be serialized or evaluated.
    #[error("malformed node {node}: {reason}")]
    MalformedNode { node: NodeId, reason: String },
    /// Invalid limits or input-group configuration.
    #[error("config error: {0}")]
    Config(String),
    /// Filesystem I/O error from the CLI or callers that propagate I/O.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Coarse classification of a [`SkinError`] for programmatic handling.
pub enum ErrorKind {
    /// Input rejected before parsing (length bounds).
    Lex,
    /// Token sequence does not match the grammar.
    Syntax,
    /// Name could not be resolved or bound.
    Resolution,
    /// Arena capacity or misuse of the construction API.
    Arena,
    /// Malformed tree reached the serializer or evaluator. Not user-recoverable.
    EvalInvariant,
    /// Configuration or I/O problem.
    Config,
}

impl SkinError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ExpressionTooLong { .. } | Self::TokenTooLong { .. } | Self::TooManyTokens { .. } => {
                ErrorKind::Lex
            }
            Self::Syntax { .. } => ErrorKind::Syntax,
            Self::UnresolvedName { .. }
            | Self::UnknownBinding(_)
            | Self::DuplicateName(_)
            | Self::NameTooLong { .. } => ErrorKind::Resolution,
            Self::ArenaFull { .. }
            | Self::UnknownNode(_)
            | Self::ValuesTooLong { .. }
            | Self::NotALeaf(_) => ErrorKind::Arena,
            Self::MalformedNode { .. } => ErrorKind::EvalInvariant,
            Self::Config(_) | Self::Io(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn syntax(kind: SyntaxErrorKind, pos: usize) -> Self {
        Self::Syntax { kind, pos }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Specific grammar violation reported by the parser.
pub enum SyntaxErrorKind {
    /// `(` without `)` or a stray `)`.
    UnmatchedBracket,
    /// Binary operator with nothing on its left.
    OperatorWithoutValue,
    /// Second operator applied to the same value, including unbracketed
    /// chains such as `1 + 2 + 3`.
    DoubleOperator,
    /// Comma outside a function form or in the wrong place.
    MisplacedComma,
    /// Unknown operator keyword or symbol.
    UnknownOperator(String),
    /// Function keyword not immediately followed by `(`.
    FunctionWithoutBracket,
    /// Function form closed before its second operand.
    MissingOperand,
    /// Function form given more than two operands, or an operand following a
    /// complete binary expression.
    TooManyOperands,
    /// Two operands with no operator between them.
    MissingOperator,
    /// `-` applied to something other than a numeric literal.
    UnsupportedNegation,
    /// Expression ended in a state that forms no node.
    IncompleteExpression,
    /// Tokens remain after the top-level expression.
    TrailingTokens,
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedBracket => write!(f, "mismatched brackets"),
            Self::OperatorWithoutValue => write!(f, "operator with no value"),
            Self::DoubleOperator => write!(f, "multiple operators for one value"),
            Self::MisplacedComma => write!(f, "',' is not between a value and an argument"),
            Self::UnknownOperator(op) => write!(f, "unrecognized operator '{op}'"),
            Self::FunctionWithoutBracket => {
                write!(f, "functions must be followed by '(' after the operator")
            }
            Self::MissingOperand => write!(f, "function requires two operands"),
            Self::TooManyOperands => write!(f, "too many operands; use brackets to nest"),
            Self::MissingOperator => write!(f, "missing operator between operands"),
            Self::UnsupportedNegation => {
                write!(f, "'-' can only negate a numeric literal")
            }
            Self::IncompleteExpression => write!(f, "incomplete expression"),
            Self::TrailingTokens => write!(f, "tokens left unparsed"),
        }
    }
}
