//! Canonical text generation for node trees.

use crate::arena::{Arena, NodeId, NodeKind, UnaryOp};
use crate::error::SkinError;

/// Serializes the tree rooted at `root` into canonical prefix-function form.
///
/// Leaves emit their name verbatim, binary operators emit
/// `_<keyword>(<child>,<arg>)`. The output re-parses into an equivalent tree,
/// though it is not byte-identical to the text originally parsed
/// (`1 + 1` becomes `_add(1,1)`).
pub fn generate(arena: &Arena, root: NodeId) -> Result<String, SkinError> {
    let mut out = String::new();
    write_node(arena, root, &mut out)?;
    Ok(out)
}

fn write_node(arena: &Arena, id: NodeId, out: &mut String) -> Result<(), SkinError> {
    let node = arena.node(id)?;
    match node.kind() {
        NodeKind::Leaf => {
            let name = node.name().ok_or_else(|| SkinError::MalformedNode {
                node: id,
                reason: "leaf has no name or literal text".to_string(),
            })?;
            out.push_str(name);
        }
        NodeKind::Unary {
            op: UnaryOp::Negate,
            child,
        } => {
            out.push('-');
            write_node(arena, child, out)?;
        }
        NodeKind::Binary { op, child, arg } => {
            out.push('_');
            out.push_str(op.name());
            out.push('(');
            write_node(arena, child, out)?;
            out.push(',');
            write_node(arena, arg, out)?;
            out.push(')');
        }
    }
    Ok(())
}
