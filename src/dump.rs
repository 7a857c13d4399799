//! Indented text rendering of node trees for debugging.

use crate::arena::{Arena, NodeId, NodeKind};
use crate::error::SkinError;

/// Renders the subtree at `root`, one node per line, indented by depth with tabs.
///
/// The argument is printed above its parent and the child below, so a tree
/// reads like a sideways diagram. With `with_values` each line also shows the
/// node's current vector as `[len] {v0, v1}`.
pub fn render_tree(arena: &Arena, root: NodeId, with_values: bool) -> Result<String, SkinError> {
    let mut out = String::new();
    render_node(arena, root, 0, with_values, &mut out)?;
    Ok(out)
}

fn render_node(
    arena: &Arena,
    id: NodeId,
    depth: usize,
    with_values: bool,
    out: &mut String,
) -> Result<(), SkinError> {
    let node = arena.node(id)?;

    let (label, child, arg) = match node.kind() {
        NodeKind::Leaf => (node.name().unwrap_or("<leaf>").to_string(), None, None),
        NodeKind::Unary { op, child } => (op.to_string(), Some(child), None),
        NodeKind::Binary { op, child, arg } => (op.to_string(), Some(child), Some(arg)),
    };

    if let Some(arg) = arg {
        render_node(arena, arg, depth + 1, with_values, out)?;
    }

    out.push_str(&"\t".repeat(depth));
    out.push_str(&label);
    if with_values {
        let values = node
            .values()
            .iter()
            .map(|v| format!("{v:.2}"))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(" [{}] {{{values}}}", node.values().len()));
    }
    out.push('\n');

    if let Some(child) = child {
        render_node(arena, child, depth + 1, with_values, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::render_tree;
    use crate::arena::Arena;
    use crate::diagnostics::LogDiagnostics;
    use crate::expr::eval::evaluate;
    use crate::expr::parse_expression;

    #[test]
    fn prints_argument_above_and_child_below() {
        let mut arena = Arena::default();
        let root = parse_expression(&mut arena, "1 - (2 * 3)").unwrap();
        let text = render_tree(&arena, root, false).unwrap();
        assert_eq!(text, "\t\t3\n\tproduct\n\t\t2\nsubtract\n\t1\n");
    }

    #[test]
    fn includes_values_after_evaluation() {
        let mut arena = Arena::default();
        let root = parse_expression(&mut arena, "1 + 2").unwrap();
        evaluate(&mut arena, root, &mut LogDiagnostics).unwrap();
        let text = render_tree(&arena, root, true).unwrap();
        assert!(text.contains("add [1] {3.00}"));
        assert!(text.contains("\t2 [1] {2.00}"));
    }
}
