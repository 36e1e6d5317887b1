//! Ascent along incoming `PARENT_OF` edges to the enclosing top-level unit.

use crate::model::{Direction, EdgeKind, NodeKind, NodeView};
use crate::storage::GraphStore;
use crate::traversal::{adjacent, Adjacent, EdgeKindIs};
use crate::Result;

type Parents<'g, S> = Adjacent<'g, S, EdgeKindIs>;

/// Depth-first, pre-order walk up the AST yielding every top-level unit
/// reachable through structural parents.
///
/// A node that is itself a top-level unit is yielded before its own
/// parents are explored. Termination relies on `PARENT_OF` edges being
/// acyclic.
pub struct Ascent<'g, S: GraphStore + ?Sized> {
    store: &'g S,
    start: Option<NodeView>,
    stack: Vec<Parents<'g, S>>,
    max_depth: usize,
    failed: bool,
}

impl<'g, S> Ascent<'g, S>
where
    S: GraphStore + ?Sized,
{
    pub fn new(store: &'g S, start: NodeView, max_depth: usize) -> Self {
        Self { store, start: Some(start), stack: Vec::new(), max_depth, failed: false }
    }

    /// Push the parents of `node`; hand `node` back if it is a top-level unit.
    fn enter(&mut self, node: NodeView) -> Result<Option<NodeView>> {
        let parents = adjacent(
            self.store,
            node.id,
            Direction::Incoming,
            EdgeKindIs(EdgeKind::ParentOf),
            self.max_depth,
        )?;
        self.stack.push(parents);
        Ok(node.is_kind(&NodeKind::TopLevel).then_some(node))
    }

    fn advance(&mut self) -> Option<Result<NodeView>> {
        if let Some(start) = self.start.take() {
            match self.enter(start) {
                Ok(Some(top)) => return Some(Ok(top)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
        loop {
            let parent = match self.stack.last_mut()?.next() {
                None => {
                    self.stack.pop();
                    continue;
                }
                Some(Err(e)) => return Some(Err(e)),
                Some(Ok(parent)) => parent,
            };
            match self.enter(parent) {
                Ok(Some(top)) => return Some(Ok(top)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

impl<S> Iterator for Ascent<'_, S>
where
    S: GraphStore + ?Sized,
{
    type Item = Result<NodeView>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.advance();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
            self.stack.clear();
        }
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{properties, NodeId};
    use crate::storage::MemoryGraph;

    fn node(g: &MemoryGraph, id: u64, kind: &str) {
        g.add_node(NodeId(id), properties([("type", kind)]));
    }

    fn parent(g: &MemoryGraph, parent: u64, child: u64) {
        g.add_edge(NodeId(parent), NodeId(child), properties([("type", "PARENT_OF")]))
            .unwrap();
    }

    fn ascend(g: &MemoryGraph, from: u64) -> Vec<u64> {
        let start = NodeView::load(g, NodeId(from), 10).unwrap();
        Ascent::new(g, start, 10).map(|n| n.unwrap().id.0).collect()
    }

    #[test]
    fn test_chain_to_top_level() {
        let g = MemoryGraph::new();
        node(&g, 1, "AST_TOPLEVEL");
        node(&g, 2, "AST_FUNC_DECL");
        node(&g, 3, "AST_STMT_LIST");
        node(&g, 4, "AST_CALL");
        parent(&g, 1, 2);
        parent(&g, 2, 3);
        parent(&g, 3, 4);

        assert_eq!(ascend(&g, 4), vec![1]);
        assert_eq!(ascend(&g, 1), vec![1]);
    }

    #[test]
    fn test_non_structural_edges_are_ignored() {
        let g = MemoryGraph::new();
        node(&g, 1, "AST_TOPLEVEL");
        node(&g, 2, "AST_CALL");
        g.add_edge(NodeId(1), NodeId(2), properties([("type", "FLOWS_TO")])).unwrap();
        assert!(ascend(&g, 2).is_empty());
    }

    #[test]
    fn test_multiple_parents_yield_in_edge_order() {
        let g = MemoryGraph::new();
        node(&g, 1, "AST_TOPLEVEL");
        node(&g, 2, "AST_TOPLEVEL");
        node(&g, 3, "AST_STMT_LIST");
        node(&g, 4, "AST_CALL");
        parent(&g, 2, 4);
        parent(&g, 3, 4);
        parent(&g, 1, 3);

        assert_eq!(ascend(&g, 4), vec![2, 1]);
    }

    #[test]
    fn test_nested_top_level_units() {
        // An included file's top-level unit hangs under another one.
        let g = MemoryGraph::new();
        node(&g, 1, "AST_TOPLEVEL");
        node(&g, 2, "AST_TOPLEVEL");
        node(&g, 3, "AST_CALL");
        parent(&g, 1, 2);
        parent(&g, 2, 3);

        assert_eq!(ascend(&g, 3), vec![2, 1]);
    }
}
