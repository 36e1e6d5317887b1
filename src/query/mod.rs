//! # Query Engine
//!
//! Named queries over a [`GraphStore`], all assembled from the one-hop
//! [`adjacent`] primitive plus fixed edge/node filters.
//!
//! Every operation degrades to "no result" on failure. The failure is
//! reported to the engine's [`DiagnosticsSink`] with the operation name and
//! the identifiers involved; nothing is propagated to the caller.
//!
//! ```rust
//! use cpg_query::{properties, MemoryGraph, NodeId, QueryEngine};
//!
//! let graph = MemoryGraph::new();
//! graph.add_node(NodeId(1), properties([("type", "AST_ASSIGN")]));
//! graph.add_node(NodeId(2), properties([("type", "AST_CALL")]));
//! graph.add_edge(NodeId(1), NodeId(2), properties([("type", "FLOWS_TO")])).unwrap();
//!
//! let engine = QueryEngine::new(&graph);
//! let assign = engine.node(NodeId(1)).unwrap();
//! let reached: Vec<NodeId> = engine
//!     .flow_reachable_from(&assign, cpg_query::Always)
//!     .map(|n| n.id)
//!     .collect();
//! assert_eq!(reached, vec![NodeId(2)]);
//! ```

pub mod ascent;
pub mod bfs;

use std::fmt::Display;
use std::sync::Arc;

use crate::config::QueryConfig;
use crate::diagnostics::{Diagnostic, DiagnosticsSink, TracingSink};
use crate::model::{Direction, EdgeId, EdgeKind, EdgeView, NodeId, NodeKind, NodeView};
use crate::storage::GraphStore;
use crate::traversal::{
    adjacent, Always, And, EdgeKindIs, EdgeNodePredicate, NodeKindIs, NodePredicate,
};
use crate::{Error, Result};

pub use ascent::Ascent;
pub use bfs::Reachable;

// ============================================================================
// Result sequences
// ============================================================================

/// A failed item. `subject` names the ids involved when they are more
/// specific than the sequence's own subject.
struct Failure {
    subject: Option<String>,
    error: Error,
}

impl From<Error> for Failure {
    fn from(error: Error) -> Self {
        Self { subject: None, error }
    }
}

type Fallible<'q, T> = Box<dyn Iterator<Item = std::result::Result<T, Failure>> + 'q>;

/// Lazy query result. Ends at the first failure, after reporting it.
pub struct Results<'q, T> {
    inner: Option<Fallible<'q, T>>,
    sink: &'q dyn DiagnosticsSink,
    operation: &'static str,
    subject: String,
}

/// Lazy sequence of nodes.
pub type Nodes<'q> = Results<'q, NodeView>;

/// Lazy sequence of edges.
pub type Edges<'q> = Results<'q, EdgeView>;

impl<T> Iterator for Results<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match self.inner.as_mut()?.next() {
            Some(Ok(item)) => Some(item),
            Some(Err(failure)) => {
                self.inner = None;
                let subject = failure
                    .subject
                    .unwrap_or_else(|| std::mem::take(&mut self.subject));
                self.sink.report(&Diagnostic {
                    operation: self.operation,
                    subject,
                    message: failure.error.to_string(),
                });
                None
            }
            None => {
                self.inner = None;
                None
            }
        }
    }
}

// ============================================================================
// QueryEngine
// ============================================================================

/// Read-only query surface over a borrowed store.
pub struct QueryEngine<'g, S: GraphStore + ?Sized> {
    store: &'g S,
    config: QueryConfig,
    sink: Arc<dyn DiagnosticsSink>,
}

impl<'g, S> QueryEngine<'g, S>
where
    S: GraphStore + ?Sized,
{
    /// Engine with the default configuration, reporting through `tracing`.
    pub fn new(store: &'g S) -> Self {
        Self {
            store,
            config: QueryConfig::default(),
            sink: Arc::new(TracingSink),
        }
    }

    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn store(&self) -> &'g S {
        self.store
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    fn report(&self, operation: &'static str, subject: impl Display, message: impl Display) {
        self.sink.report(&Diagnostic {
            operation,
            subject: subject.to_string(),
            message: message.to_string(),
        });
    }

    /// Wrap a fallible lazy sequence, reporting a failure to start it.
    fn results<'q, T, I>(
        &'q self,
        operation: &'static str,
        subject: String,
        started: Result<I>,
    ) -> Results<'q, T>
    where
        I: Iterator<Item = Result<T>> + 'q,
    {
        let inner: Option<Fallible<'q, T>> = match started {
            Ok(iter) => Some(Box::new(iter.map(|item| item.map_err(Failure::from)))),
            Err(e) => {
                self.report(operation, &subject, e);
                None
            }
        };
        Results { inner, sink: self.sink.as_ref(), operation, subject }
    }

    // ========================================================================
    // Lookup by id
    // ========================================================================

    /// View of node `id`, or `None` if the store does not know it.
    pub fn node(&self, id: NodeId) -> Option<NodeView> {
        NodeView::load(self.store, id, self.config.max_depth)
            .inspect_err(|e| self.report("node", node_subject(id), e))
            .ok()
    }

    /// View of the edge `src → dst`, optionally a specific parallel edge.
    pub fn edge(&self, src: NodeId, dst: NodeId, edge: Option<EdgeId>) -> Option<EdgeView> {
        EdgeView::load(self.store, src, dst, edge, self.config.max_depth)
            .inspect_err(|e| self.report("edge", edge_subject(src, dst, edge), e))
            .ok()
    }

    /// Every parallel edge `src → dst`, in store order.
    pub fn edges_between(&self, src: NodeId, dst: NodeId) -> Edges<'_> {
        let store = self.store;
        let depth = self.config.max_depth;
        let started = store.edges_between(src, dst).map(|ids| {
            ids.into_iter()
                .map(move |id| EdgeView::load(store, src, dst, Some(id), depth))
        });
        self.results("edges_between", edge_subject(src, dst, None), started)
    }

    // ========================================================================
    // Whole-graph search
    // ========================================================================

    /// Scan the store's node enumeration. A node whose bag cannot be read
    /// ends the scan and is named in the report.
    fn scan<'q, P>(&'q self, operation: &'static str, predicate: P) -> Nodes<'q>
    where
        P: NodePredicate + 'q,
    {
        let store = self.store;
        let depth = self.config.max_depth;
        let scan = store.node_ids().filter_map(move |id| {
            match NodeView::load(store, id, depth) {
                Ok(node) => predicate.test(&node).then_some(Ok(node)),
                Err(error) => Some(Err(Failure { subject: Some(node_subject(id)), error })),
            }
        });
        Results {
            inner: Some(Box::new(scan)),
            sink: self.sink.as_ref(),
            operation,
            subject: "all nodes".to_string(),
        }
    }

    /// All nodes satisfying `predicate`, in store enumeration order.
    ///
    /// Each call re-enumerates the store.
    pub fn find_all_nodes<'q, P>(&'q self, predicate: P) -> Nodes<'q>
    where
        P: NodePredicate + 'q,
    {
        self.scan("find_all_nodes", predicate)
    }

    /// First node satisfying `predicate`, in store enumeration order.
    pub fn find_first_node<P>(&self, predicate: P) -> Option<NodeView>
    where
        P: NodePredicate,
    {
        self.scan("find_first_node", predicate).next()
    }

    // ========================================================================
    // One hop
    // ========================================================================

    fn hop<'q, P>(
        &'q self,
        operation: &'static str,
        of: &NodeView,
        direction: Direction,
        predicate: P,
    ) -> Nodes<'q>
    where
        P: EdgeNodePredicate + 'q,
    {
        let started = adjacent(self.store, of.id, direction, predicate, self.config.max_depth);
        self.results(operation, node_subject(of.id), started)
    }

    /// Direct successors of `of` accepted by `predicate`.
    pub fn successors<'q, P>(&'q self, of: &NodeView, predicate: P) -> Nodes<'q>
    where
        P: EdgeNodePredicate + 'q,
    {
        self.hop("successors", of, Direction::Outgoing, predicate)
    }

    /// Direct predecessors of `of` accepted by `predicate`.
    pub fn predecessors<'q, P>(&'q self, of: &NodeView, predicate: P) -> Nodes<'q>
    where
        P: EdgeNodePredicate + 'q,
    {
        self.hop("predecessors", of, Direction::Incoming, predicate)
    }

    /// AST children of `of`: targets of its outgoing `PARENT_OF` edges.
    pub fn structural_children<'q, P>(&'q self, of: &NodeView, extra: P) -> Nodes<'q>
    where
        P: EdgeNodePredicate + 'q,
    {
        let predicate = And(extra, EdgeKindIs(EdgeKind::ParentOf));
        self.hop("structural_children", of, Direction::Outgoing, predicate)
    }

    /// Targets of the `FLOWS_TO` edges leaving `of`.
    pub fn flow_successors<'q, P>(&'q self, of: &NodeView, extra: P) -> Nodes<'q>
    where
        P: EdgeNodePredicate + 'q,
    {
        let predicate = And(extra, EdgeKindIs(EdgeKind::FlowsTo));
        self.hop("flow_successors", of, Direction::Outgoing, predicate)
    }

    /// Sources of the `FLOWS_TO` edges entering `of`.
    pub fn flow_predecessors<'q, P>(&'q self, of: &NodeView, extra: P) -> Nodes<'q>
    where
        P: EdgeNodePredicate + 'q,
    {
        let predicate = And(extra, EdgeKindIs(EdgeKind::FlowsTo));
        self.hop("flow_predecessors", of, Direction::Incoming, predicate)
    }

    // ========================================================================
    // Structural search
    // ========================================================================

    fn first_structural_child<P>(&self, of: NodeId, extra: P) -> Result<Option<NodeView>>
    where
        P: EdgeNodePredicate,
    {
        let predicate = And(extra, EdgeKindIs(EdgeKind::ParentOf));
        adjacent(self.store, of, Direction::Outgoing, predicate, self.config.max_depth)?
            .next()
            .transpose()
    }

    /// First statement of an `if` branch: the first child of the branch's
    /// first `AST_STMT_LIST` child.
    ///
    /// Both lookups take the first match in store order.
    pub fn branch_entry(&self, if_branch: &NodeView) -> Option<NodeView> {
        let found = self
            .first_structural_child(if_branch.id, NodeKindIs(NodeKind::StmtList))
            .and_then(|list| match list {
                Some(list) => self.first_structural_child(list.id, Always),
                None => Ok(None),
            });
        match found {
            Ok(Some(entry)) => Some(entry),
            Ok(None) => {
                self.report(
                    "branch_entry",
                    node_subject(if_branch.id),
                    "branch has no statement list or the list is empty",
                );
                None
            }
            Err(e) => {
                self.report("branch_entry", node_subject(if_branch.id), e);
                None
            }
        }
    }

    /// Top-level units enclosing `of`, found by walking `PARENT_OF` edges
    /// upwards. `of` itself is included when it is a top-level unit.
    pub fn enclosing_top_level_unit(&self, of: &NodeView) -> Nodes<'_> {
        let ascent = Ascent::new(self.store, of.clone(), self.config.max_depth);
        self.results("enclosing_top_level_unit", node_subject(of.id), Ok(ascent))
    }

    // ========================================================================
    // Bounded reachability
    // ========================================================================

    /// Breadth-first search from `src` over outgoing edges accepted by
    /// `predicate`, at most `max_depth` hops deep. `src` is not included and
    /// no node is yielded twice.
    pub fn reachable_by<'q, P>(&'q self, src: &NodeView, predicate: P) -> Nodes<'q>
    where
        P: EdgeNodePredicate + 'q,
    {
        let bfs = Reachable::new(self.store, src.clone(), predicate, self.config.max_depth);
        self.results("reachable_by", node_subject(src.id), Ok(bfs))
    }

    /// Nodes that data/taint flow from `src` can reach within the depth
    /// budget.
    pub fn flow_reachable_from<'q, P>(&'q self, src: &NodeView, extra: P) -> Nodes<'q>
    where
        P: EdgeNodePredicate + 'q,
    {
        self.reachable_by(src, And(EdgeKindIs(EdgeKind::FlowsTo), extra))
    }
}

fn node_subject(id: NodeId) -> String {
    format!("node {id}")
}

fn edge_subject(src: NodeId, dst: NodeId, edge: Option<EdgeId>) -> String {
    match edge {
        Some(edge) => format!("edge {src} -> {dst} #{edge}"),
        None => format!("edge {src} -> {dst}"),
    }
}
