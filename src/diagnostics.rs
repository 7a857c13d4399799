//! Sinks for non-fatal warnings raised during evaluation.

use std::fmt;

use tracing::warn;

use crate::arena::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Non-fatal condition encountered while evaluating a tree.
pub enum EvalWarning {
    /// Division skipped because the divisor at `index` was exactly zero.
    DivideByZero { node: NodeId, index: usize },
}

impl fmt::Display for EvalWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivideByZero { node, index } => write!(
                f,
                "divide by zero at node {node} index {index}; value left unchanged"
            ),
        }
    }
}

/// Receives warnings emitted by the evaluator.
pub trait Diagnostics {
    fn warn(&mut self, warning: EvalWarning);
}

/// [`Diagnostics`] implementation that forwards warnings to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warn(&mut self, warning: EvalWarning) {
        warn!("{warning}");
    }
}

/// Collects warnings for inspection by the caller.
impl Diagnostics for Vec<EvalWarning> {
    fn warn(&mut self, warning: EvalWarning) {
        self.push(warning);
    }
}
