//! Post-order evaluator over arena nodes with hold-last-value broadcasting.

use tracing::trace;

use crate::arena::{Arena, BinaryOp, NodeId, NodeKind, UnaryOp};
use crate::diagnostics::{Diagnostics, EvalWarning};
use crate::error::SkinError;

/// Tolerance used by `equals`.
pub const EPSILON: f32 = 0.000001;

/// Evaluates the tree rooted at `root` and returns the root's result vector.
///
/// Leaves are read as-is. Operator nodes overwrite their own result buffer:
/// the output has the child's length, and when the argument is shorter its
/// last value is reused for the remaining positions. An empty argument leaves
/// the child unchanged, except for `equals` which yields `0.0` everywhere.
pub fn evaluate<'a>(
    arena: &'a mut Arena,
    root: NodeId,
    diagnostics: &mut dyn Diagnostics,
) -> Result<&'a [f32], SkinError> {
    eval_node(arena, root, diagnostics)?;
    arena.values(root)
}

fn eval_node(
    arena: &mut Arena,
    id: NodeId,
    diagnostics: &mut dyn Diagnostics,
) -> Result<(), SkinError> {
    match arena.node(id)?.kind() {
        NodeKind::Leaf => {}
        NodeKind::Unary {
            op: UnaryOp::Negate,
            child,
        } => {
            ensure_precedes(id, child)?;
            eval_node(arena, child, diagnostics)?;

            let (before, node) = arena.split_at_node(id)?;
            let out = node.values_mut();
            out.clear();
            out.extend(before[child.index()].values().iter().map(|v| -v));
        }
        NodeKind::Binary { op, child, arg } => {
            ensure_precedes(id, child)?;
            ensure_precedes(id, arg)?;
            eval_node(arena, child, diagnostics)?;
            eval_node(arena, arg, diagnostics)?;

            let (before, node) = arena.split_at_node(id)?;
            let out = node.values_mut();
            out.clear();
            out.extend_from_slice(before[child.index()].values());
            apply_binary(op, out, before[arg.index()].values(), id, diagnostics);
        }
    }
    trace!(node = %id, len = arena.values(id)?.len(), "evaluated node");
    Ok(())
}

/// Operands must be allocated before their parent. Trees built through the
/// arena API always satisfy this.
fn ensure_precedes(parent: NodeId, operand: NodeId) -> Result<(), SkinError> {
    if operand < parent {
        Ok(())
    } else {
        Err(SkinError::MalformedNode {
            node: parent,
            reason: format!("operand {operand} is not allocated before its parent"),
        })
    }
}

fn apply_binary(
    op: BinaryOp,
    out: &mut [f32],
    arg: &[f32],
    node: NodeId,
    diagnostics: &mut dyn Diagnostics,
) {
    let Some(&last) = arg.last() else {
        // lessthan/greaterthan share the arithmetic identity short-circuit.
        if op == BinaryOp::Equals {
            out.fill(0.0);
        }
        return;
    };

    for (index, value) in out.iter_mut().enumerate() {
        let rhs = arg.get(index).copied().unwrap_or(last);
        match op {
            BinaryOp::Add => *value += rhs,
            BinaryOp::Subtract => *value -= rhs,
            BinaryOp::Product => *value *= rhs,
            BinaryOp::Divide => {
                if rhs == 0.0 {
                    diagnostics.warn(EvalWarning::DivideByZero { node, index });
                } else {
                    *value /= rhs;
                }
            }
            BinaryOp::Min => *value = value.min(rhs),
            BinaryOp::Max => *value = value.max(rhs),
            BinaryOp::LessThan => *value = truth(*value < rhs),
            BinaryOp::GreaterThan => *value = truth(*value > rhs),
            BinaryOp::Equals => *value = truth((*value - rhs).abs() < EPSILON),
        }
    }
}

fn truth(condition: bool) -> f32 {
    if condition {
        1.0
    } else {
        0.0
    }
}
