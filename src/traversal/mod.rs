//! # Single-hop traversal
//!
//! [`adjacent`] enumerates the direct neighbours of a node in one
//! direction, pairing each with the edge that reaches it. Views are built
//! only when the cursor is advanced onto that pair, and the predicate runs
//! before a node is handed out.
//!
//! Every multi-hop query in [`crate::query`] is assembled from this one
//! primitive.

pub mod predicate;

use crate::model::{Direction, EdgeId, EdgeView, NodeId, NodeView};
use crate::storage::{Adjacency, GraphStore};
use crate::Result;

pub use predicate::{
    Always, And, Borrowed, EdgeKindIs, EdgeNodePredicate, NodeKindIs, NodePredicate, Unvisited,
};

/// Lazy cursor over the filtered one-hop neighbourhood of a node.
///
/// Yields `Err` when a view cannot be built; the caller decides whether to
/// stop there.
pub struct Adjacent<'g, S: GraphStore + ?Sized, P> {
    store: &'g S,
    of: NodeId,
    direction: Direction,
    pairs: Adjacency<'g>,
    predicate: P,
    max_depth: usize,
}

/// Start a one-hop traversal from `of`.
///
/// Fails only if the store cannot enumerate the adjacency of `of`.
/// `max_depth` is copied onto every view built and does not limit the hop.
pub fn adjacent<'g, S, P>(
    store: &'g S,
    of: NodeId,
    direction: Direction,
    predicate: P,
    max_depth: usize,
) -> Result<Adjacent<'g, S, P>>
where
    S: GraphStore + ?Sized,
    P: EdgeNodePredicate,
{
    let pairs = match direction {
        Direction::Outgoing => store.outgoing_edges(of)?,
        Direction::Incoming => store.incoming_edges(of)?,
    };
    Ok(Adjacent { store, of, direction, pairs, predicate, max_depth })
}

impl<S, P> Adjacent<'_, S, P>
where
    S: GraphStore + ?Sized,
    P: EdgeNodePredicate,
{
    fn load(&self, other: NodeId, edge: EdgeId) -> Result<(EdgeView, NodeView)> {
        let (src, dst) = match self.direction {
            Direction::Outgoing => (self.of, other),
            Direction::Incoming => (other, self.of),
        };
        let edge = EdgeView::load(self.store, src, dst, Some(edge), self.max_depth)?;
        let node = NodeView::load(self.store, other, self.max_depth)?;
        Ok((edge, node))
    }
}

impl<S, P> Iterator for Adjacent<'_, S, P>
where
    S: GraphStore + ?Sized,
    P: EdgeNodePredicate,
{
    type Item = Result<NodeView>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (other, edge) = self.pairs.next()?;
            match self.load(other, edge) {
                Ok((edge, node)) => {
                    if self.predicate.test(&edge, &node) {
                        return Some(Ok(node));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}
