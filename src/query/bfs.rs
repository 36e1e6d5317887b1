//! Depth-bounded breadth-first reachability.
//!
//! The queue interleaves a [`Slot::LevelEnd`] marker between BFS levels.
//! Popping the marker closes a level: if anything is still queued the
//! marker goes back to the end and one level of budget is spent. Nodes on
//! the last permitted level are yielded but never expanded, so nothing
//! further than `max_depth` hops from the source is ever discovered.

use std::collections::VecDeque;

use hashbrown::HashSet;

use crate::model::{Direction, NodeId, NodeView};
use crate::storage::GraphStore;
use crate::traversal::{adjacent, And, Borrowed, EdgeNodePredicate, Unvisited};
use crate::Result;

enum Slot {
    Node(NodeView),
    LevelEnd,
}

/// Lazy BFS over outgoing edges accepted by `predicate`.
///
/// Each node is yielded at most once, when it is dequeued for the first
/// time. The source itself is never yielded.
pub struct Reachable<'g, S: GraphStore + ?Sized, P> {
    store: &'g S,
    source: NodeId,
    predicate: P,
    queue: VecDeque<Slot>,
    visited: HashSet<NodeId>,
    /// Levels that may still be expanded.
    remaining: usize,
    max_depth: usize,
    failed: bool,
}

impl<'g, S, P> Reachable<'g, S, P>
where
    S: GraphStore + ?Sized,
    P: EdgeNodePredicate,
{
    pub fn new(store: &'g S, source: NodeView, predicate: P, max_depth: usize) -> Self {
        let mut queue = VecDeque::new();
        let id = source.id;
        queue.push_back(Slot::Node(source));
        queue.push_back(Slot::LevelEnd);
        Self {
            store,
            source: id,
            predicate,
            queue,
            visited: HashSet::new(),
            remaining: max_depth,
            max_depth,
            failed: false,
        }
    }

    fn expand(&mut self, from: NodeId) -> Result<()> {
        let filter = And(Borrowed(&self.predicate), Unvisited(&self.visited));
        let next = adjacent(self.store, from, Direction::Outgoing, filter, self.max_depth)?
            .collect::<Result<Vec<_>>>()?;
        self.queue.extend(next.into_iter().map(Slot::Node));
        Ok(())
    }
}

impl<S, P> Iterator for Reachable<'_, S, P>
where
    S: GraphStore + ?Sized,
    P: EdgeNodePredicate,
{
    type Item = Result<NodeView>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            match self.queue.pop_front()? {
                Slot::LevelEnd => {
                    if self.queue.is_empty() || self.remaining == 0 {
                        self.queue.clear();
                        return None;
                    }
                    self.remaining -= 1;
                    self.queue.push_back(Slot::LevelEnd);
                }
                Slot::Node(current) => {
                    if !self.visited.insert(current.id) {
                        continue;
                    }
                    if self.remaining > 0 {
                        if let Err(e) = self.expand(current.id) {
                            self.failed = true;
                            return Some(Err(e));
                        }
                    }
                    if current.id != self.source {
                        return Some(Ok(current));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{properties, EdgeView};
    use crate::storage::MemoryGraph;
    use crate::traversal::Always;

    fn graph(nodes: u64, edges: &[(u64, u64)]) -> MemoryGraph {
        let g = MemoryGraph::new();
        for id in 1..=nodes {
            g.add_node(NodeId(id), properties([("type", "AST_CALL")]));
        }
        for (src, dst) in edges {
            g.add_edge(NodeId(*src), NodeId(*dst), properties([("type", "FLOWS_TO")]))
                .unwrap();
        }
        g
    }

    fn bfs<P>(g: &MemoryGraph, from: u64, predicate: P, depth: usize) -> Vec<u64>
    where
        P: EdgeNodePredicate,
    {
        let src = NodeView::load(g, NodeId(from), depth).unwrap();
        Reachable::new(g, src, predicate, depth)
            .map(|n| n.unwrap().id.0)
            .collect()
    }

    #[test]
    fn test_cycle_terminates() {
        let g = graph(3, &[(1, 2), (2, 3), (3, 1)]);
        assert_eq!(bfs(&g, 1, Always, 5), vec![2, 3]);
    }

    #[test]
    fn test_depth_bound() {
        let g = graph(4, &[(1, 2), (2, 3), (3, 4)]);
        assert_eq!(bfs(&g, 1, Always, 2), vec![2, 3]);
        assert_eq!(bfs(&g, 1, Always, 1), vec![2]);
        assert_eq!(bfs(&g, 1, Always, 3), vec![2, 3, 4]);
        assert!(bfs(&g, 1, Always, 0).is_empty());
    }

    #[test]
    fn test_breadth_first_order_and_no_duplicates() {
        // 1 -> {2, 3}, 2 -> 4, 3 -> 4, 4 -> 5
        let g = graph(5, &[(1, 2), (1, 3), (2, 4), (3, 4), (4, 5)]);
        assert_eq!(bfs(&g, 1, Always, 10), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_self_loop_on_source() {
        let g = graph(2, &[(1, 1), (1, 2)]);
        assert_eq!(bfs(&g, 1, Always, 10), vec![2]);
    }

    #[test]
    fn test_predicate_prunes_expansion() {
        let g = graph(4, &[(1, 2), (1, 3), (3, 4)]);
        let skip_three = |_: &EdgeView, n: &NodeView| n.id != NodeId(3);
        assert_eq!(bfs(&g, 1, skip_three, 10), vec![2]);
    }

    #[test]
    fn test_isolated_source() {
        let g = graph(1, &[]);
        assert!(bfs(&g, 1, Always, 10).is_empty());
    }
}
