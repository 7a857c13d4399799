//! Append-only node storage and the node model shared by parser, serializer and evaluator.

use std::collections::HashMap;
use std::fmt;

use crate::error::SkinError;
use crate::limits::Limits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Stable index of a node inside its [`Arena`].
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in allocation order.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Binary operators. Canonical names are the keywords accepted after `_`.
pub enum BinaryOp {
    Add,
    Subtract,
    Product,
    Divide,
    Min,
    Max,
    LessThan,
    GreaterThan,
    Equals,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 9] = [
        BinaryOp::Add,
        BinaryOp::Subtract,
        BinaryOp::Product,
        BinaryOp::Divide,
        BinaryOp::Min,
        BinaryOp::Max,
        BinaryOp::LessThan,
        BinaryOp::GreaterThan,
        BinaryOp::Equals,
    ];

    /// Canonical lowercase keyword used by the serializer.
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Product => "product",
            Self::Divide => "divide",
            Self::Min => "min",
            Self::Max => "max",
            Self::LessThan => "lessthan",
            Self::GreaterThan => "greaterthan",
            Self::Equals => "equals",
        }
    }

    /// Resolves a function keyword (the word following `_`).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == keyword)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Unary operators.
pub enum UnaryOp {
    /// Elementwise negation.
    Negate,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negate => f.write_str("negate"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Shape of a node. Operands always have a lower id than their parent.
pub enum NodeKind {
    /// Literal or bound input; values are set at creation or written externally.
    Leaf,
    /// One-operand operator.
    Unary { op: UnaryOp, child: NodeId },
    /// Two-operand operator; `child` is the primary operand, `arg` the secondary.
    Binary {
        op: BinaryOp,
        child: NodeId,
        arg: NodeId,
    },
}

#[derive(Debug, Clone)]
/// A single expression node and its result buffer.
pub struct Node {
    name: Option<String>,
    kind: NodeKind,
    values: Vec<f32>,
}

impl Node {
    /// Bound input name or literal text, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Current result vector (last evaluation, literal, or externally written).
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    pub(crate) fn values_mut(&mut self) -> &mut Vec<f32> {
        &mut self.values
    }
}

/// Fixed-capacity, append-only node store.
///
/// Nodes are never removed individually; the whole arena is dropped at once.
/// Operator constructors only accept ids that already exist, so every tree in
/// the arena is acyclic by construction.
#[derive(Debug, Clone)]
pub struct Arena {
    nodes: Vec<Node>,
    names: HashMap<String, NodeId>,
    limits: Limits,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl Arena {
    /// Creates an empty arena that grows up to `limits.arena_capacity` nodes.
    pub fn new(limits: Limits) -> Self {
        Self {
            nodes: Vec::new(),
            names: HashMap::new(),
            limits,
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.limits.arena_capacity
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Returns the node or [`SkinError::UnknownNode`].
    pub fn node(&self, id: NodeId) -> Result<&Node, SkinError> {
        self.get(id).ok_or(SkinError::UnknownNode(id))
    }

    /// Current values of a node.
    pub fn values(&self, id: NodeId) -> Result<&[f32], SkinError> {
        self.node(id).map(Node::values)
    }

    /// Iterates nodes in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Looks up a bound leaf by exact name. The first registration wins.
    pub fn find_named(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    /// `true` if `id` is a leaf registered through [`Arena::bind`].
    pub fn is_bound(&self, id: NodeId) -> bool {
        self.get(id)
            .and_then(Node::name)
            .is_some_and(|name| self.find_named(name) == Some(id))
    }

    /// Allocates a named leaf whose values are written externally.
    pub fn bind(&mut self, name: &str) -> Result<NodeId, SkinError> {
        self.check_name(name)?;
        if self.names.contains_key(name) {
            return Err(SkinError::DuplicateName(name.to_string()));
        }
        let id = self.push(Node {
            name: Some(name.to_string()),
            kind: NodeKind::Leaf,
            values: Vec::new(),
        })?;
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Allocates a literal leaf holding one value, named by its shortest decimal text.
    pub fn literal(&mut self, value: f32) -> Result<NodeId, SkinError> {
        self.literal_with_text(value.to_string(), value)
    }

    /// Allocates a literal leaf that keeps the exact source text as its name.
    pub(crate) fn literal_with_text(&mut self, text: String, value: f32) -> Result<NodeId, SkinError> {
        self.check_name(&text)?;
        self.push(Node {
            name: Some(text),
            kind: NodeKind::Leaf,
            values: vec![value],
        })
    }

    /// Allocates an unnamed leaf with the given values.
    ///
    /// Such leaves evaluate normally but cannot be serialized.
    pub fn leaf(&mut self, values: &[f32]) -> Result<NodeId, SkinError> {
        self.check_values_len(values.len())?;
        self.push(Node {
            name: None,
            kind: NodeKind::Leaf,
            values: values.to_vec(),
        })
    }

    /// Allocates a negation of an existing node.
    pub fn negate(&mut self, child: NodeId) -> Result<NodeId, SkinError> {
        self.node(child)?;
        self.push(Node {
            name: None,
            kind: NodeKind::Unary {
                op: UnaryOp::Negate,
                child,
            },
            values: Vec::new(),
        })
    }

    /// Allocates a binary operator over two existing nodes.
    pub fn binary(&mut self, op: BinaryOp, child: NodeId, arg: NodeId) -> Result<NodeId, SkinError> {
        self.node(child)?;
        self.node(arg)?;
        self.push(Node {
            name: None,
            kind: NodeKind::Binary { op, child, arg },
            values: Vec::new(),
        })
    }

    /// Overwrites the values of a leaf, typically a bound input before an evaluation pass.
    pub fn set_values(&mut self, id: NodeId, values: &[f32]) -> Result<(), SkinError> {
        self.check_values_len(values.len())?;
        let node = self
            .nodes
            .get_mut(id.index())
            .ok_or(SkinError::UnknownNode(id))?;
        if !node.is_leaf() {
            return Err(SkinError::NotALeaf(id));
        }
        node.values.clear();
        node.values.extend_from_slice(values);
        Ok(())
    }

    /// Compares two subtrees (possibly in different arenas) by shape, operator,
    /// leaf names and leaf values.
    pub fn same_tree(&self, a: NodeId, other: &Arena, b: NodeId) -> bool {
        let (Some(left), Some(right)) = (self.get(a), other.get(b)) else {
            return false;
        };
        match (left.kind, right.kind) {
            (NodeKind::Leaf, NodeKind::Leaf) => {
                let bound = self.is_bound(a);
                left.name == right.name
                    && bound == other.is_bound(b)
                    && (bound || left.values == right.values)
            }
            (
                NodeKind::Unary { op: op_a, child: ca },
                NodeKind::Unary { op: op_b, child: cb },
            ) => op_a == op_b && self.same_tree(ca, other, cb),
            (
                NodeKind::Binary {
                    op: op_a,
                    child: ca,
                    arg: aa,
                },
                NodeKind::Binary {
                    op: op_b,
                    child: cb,
                    arg: ab,
                },
            ) => op_a == op_b && self.same_tree(ca, other, cb) && self.same_tree(aa, other, ab),
            _ => false,
        }
    }

    /// Splits the arena so `id` can be written while everything allocated
    /// before it (all of its operands) is read.
    pub(crate) fn split_at_node(&mut self, id: NodeId) -> Result<(&[Node], &mut Node), SkinError> {
        if id.index() >= self.nodes.len() {
            return Err(SkinError::UnknownNode(id));
        }
        let (before, rest) = self.nodes.split_at_mut(id.index());
        Ok((before, &mut rest[0]))
    }

    fn push(&mut self, node: Node) -> Result<NodeId, SkinError> {
        if self.nodes.len() >= self.limits.arena_capacity {
            return Err(SkinError::ArenaFull {
                capacity: self.limits.arena_capacity,
            });
        }
        let index = u32::try_from(self.nodes.len()).map_err(|_| SkinError::ArenaFull {
            capacity: self.limits.arena_capacity,
        })?;
        let id = NodeId(index);
        self.nodes.push(node);
        Ok(id)
    }

    fn check_name(&self, name: &str) -> Result<(), SkinError> {
        if name.len() > self.limits.max_name_len {
            return Err(SkinError::NameTooLong {
                name: name.to_string(),
                max: self.limits.max_name_len,
            });
        }
        Ok(())
    }

    fn check_values_len(&self, len: usize) -> Result<(), SkinError> {
        if len > self.limits.max_values {
            return Err(SkinError::ValuesTooLong {
                len,
                max: self.limits.max_values,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Arena, BinaryOp, NodeKind};
    use crate::limits::Limits;

    #[test]
    fn operators_reference_earlier_nodes() {
        let mut arena = Arena::default();
        let one = arena.literal(1.0).unwrap();
        let two = arena.literal(2.0).unwrap();
        let sum = arena.binary(BinaryOp::Add, one, two).unwrap();
        assert!(one < sum && two < sum);
        match arena.node(sum).unwrap().kind() {
            NodeKind::Binary { op, child, arg } => {
                assert_eq!(op, BinaryOp::Add);
                assert_eq!(child, one);
                assert_eq!(arg, two);
            }
            other => panic!("expected binary node, got {other:?}"),
        }
    }

    #[test]
    fn rejects_ids_from_outside_the_arena() {
        let mut big = Arena::default();
        big.literal(1.0).unwrap();
        let foreign = big.literal(2.0).unwrap();

        let mut small = Arena::default();
        let one = small.literal(1.0).unwrap();
        let err = small.binary(BinaryOp::Add, one, foreign).unwrap_err();
        assert!(err.to_string().contains("unknown node #1"));
    }

    #[test]
    fn capacity_is_fixed() {
        let limits = Limits {
            arena_capacity: 2,
            ..Limits::default()
        };
        let mut arena = Arena::new(limits);
        arena.literal(1.0).unwrap();
        arena.literal(2.0).unwrap();
        let err = arena.literal(3.0).unwrap_err();
        assert!(err.to_string().contains("capacity 2 exhausted"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn bind_rejects_duplicates_and_set_values_rejects_operators() {
        let mut arena = Arena::default();
        let x = arena.bind("example_x").unwrap();
        assert!(arena.bind("example_x").is_err());
        assert_eq!(arena.find_named("example_x"), Some(x));

        arena.set_values(x, &[1.0, 2.0]).unwrap();
        assert_eq!(arena.values(x).unwrap(), &[1.0, 2.0]);

        let neg = arena.negate(x).unwrap();
        let err = arena.set_values(neg, &[1.0]).unwrap_err();
        assert!(err.to_string().contains("is not a leaf"));
    }

    #[test]
    fn literal_names_use_shortest_decimal_text() {
        let mut arena = Arena::default();
        let a = arena.literal(1.0).unwrap();
        let b = arena.literal(-1.5).unwrap();
        assert_eq!(arena.node(a).unwrap().name(), Some("1"));
        assert_eq!(arena.node(b).unwrap().name(), Some("-1.5"));
    }

    #[test]
    fn names_may_fill_max_name_length() {
        let limits = Limits {
            max_name_len: 3,
            ..Limits::default()
        };
        let mut arena = Arena::new(limits);
        arena.bind("abc").unwrap();
        let err = arena.bind("abcd").unwrap_err();
        assert!(err.to_string().contains("name 'abcd' exceeds max name length 3"));

        let root = crate::expr::parse_expression(&mut arena, "123").unwrap();
        assert_eq!(arena.node(root).unwrap().name(), Some("123"));
        assert!(crate::expr::parse_expression(&mut arena, "1234").is_err());
    }
}
