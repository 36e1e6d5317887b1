//! Predicates over traversal candidates.
//!
//! Closures with the right signature are predicates already. The structs
//! here cover the fixed filters the query engine needs and the conjunction
//! used to combine them with caller-supplied ones.

use hashbrown::HashSet;

use crate::model::{EdgeKind, EdgeView, NodeId, NodeKind, NodeView};

/// Filter over an `(edge, node)` pair produced by one hop.
pub trait EdgeNodePredicate {
    fn test(&self, edge: &EdgeView, node: &NodeView) -> bool;

    /// Both `self` and `other` must hold; `self` is evaluated first.
    fn and<Q>(self, other: Q) -> And<Self, Q>
    where
        Self: Sized,
        Q: EdgeNodePredicate,
    {
        And(self, other)
    }
}

impl<F> EdgeNodePredicate for F
where
    F: Fn(&EdgeView, &NodeView) -> bool,
{
    fn test(&self, edge: &EdgeView, node: &NodeView) -> bool {
        self(edge, node)
    }
}

/// Filter over a single node.
pub trait NodePredicate {
    fn test(&self, node: &NodeView) -> bool;
}

impl<F> NodePredicate for F
where
    F: Fn(&NodeView) -> bool,
{
    fn test(&self, node: &NodeView) -> bool {
        self(node)
    }
}

// ============================================================================
// Combinators
// ============================================================================

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Always;

impl EdgeNodePredicate for Always {
    fn test(&self, _edge: &EdgeView, _node: &NodeView) -> bool {
        true
    }
}

impl NodePredicate for Always {
    fn test(&self, _node: &NodeView) -> bool {
        true
    }
}

/// Conjunction, short-circuiting left to right.
#[derive(Debug, Clone, Copy)]
pub struct And<A, B>(pub A, pub B);

impl<A, B> EdgeNodePredicate for And<A, B>
where
    A: EdgeNodePredicate,
    B: EdgeNodePredicate,
{
    fn test(&self, edge: &EdgeView, node: &NodeView) -> bool {
        self.0.test(edge, node) && self.1.test(edge, node)
    }
}

/// Lends a predicate without giving it up.
#[derive(Debug)]
pub struct Borrowed<'a, P: ?Sized>(pub &'a P);

impl<P> EdgeNodePredicate for Borrowed<'_, P>
where
    P: EdgeNodePredicate + ?Sized,
{
    fn test(&self, edge: &EdgeView, node: &NodeView) -> bool {
        self.0.test(edge, node)
    }
}

/// Edge kind equals the given one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeKindIs(pub EdgeKind);

impl EdgeNodePredicate for EdgeKindIs {
    fn test(&self, edge: &EdgeView, _node: &NodeView) -> bool {
        edge.is_kind(&self.0)
    }
}

/// Node kind equals the given one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeKindIs(pub NodeKind);

impl EdgeNodePredicate for NodeKindIs {
    fn test(&self, _edge: &EdgeView, node: &NodeView) -> bool {
        node.is_kind(&self.0)
    }
}

impl NodePredicate for NodeKindIs {
    fn test(&self, node: &NodeView) -> bool {
        node.is_kind(&self.0)
    }
}

/// Node id is not in the set.
#[derive(Debug)]
pub struct Unvisited<'a>(pub &'a HashSet<NodeId>);

impl EdgeNodePredicate for Unvisited<'_> {
    fn test(&self, _edge: &EdgeView, node: &NodeView) -> bool {
        !self.0.contains(&node.id)
    }
}
