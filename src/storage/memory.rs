//! In-memory graph store.
//!
//! This is the reference implementation of `GraphStore`. It keeps attribute
//! bags and adjacency lists in hash maps protected by `RwLock`, so any
//! number of queries may read it concurrently.
//!
//! ## Limitations
//!
//! - **Builder-style mutation only**: `add_node()` and `add_edge()` exist so
//!   a host can populate the graph. Multi-step mutations are not atomic and
//!   must not race with readers that expect a consistent snapshot.
//! - **No indexes**: node lookups by attribute are full scans done by the
//!   query engine.
//!
//! Use this store for:
//! - Testing the traversal and query layers
//! - Embedding a graph exported by the CPG builder as a JSON snapshot

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Adjacency, GraphStore, NodeIds};
use crate::model::{EdgeId, NodeId, PropertyMap};
use crate::{Error, Result};

type AdjacencyList = SmallVec<[(NodeId, EdgeId); 4]>;

// ============================================================================
// Snapshot
// ============================================================================

/// Serializable form of a whole graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    #[serde(default)]
    pub attributes: PropertyMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Allocated by the store when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EdgeId>,
    pub src: NodeId,
    pub dst: NodeId,
    #[serde(default)]
    pub attributes: PropertyMap,
}

// ============================================================================
// MemoryGraph
// ============================================================================

/// In-memory directed multigraph.
///
/// Cloning is cheap and yields a handle to the same graph.
#[derive(Clone, Default)]
pub struct MemoryGraph {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    nodes: RwLock<HashMap<NodeId, Arc<PropertyMap>>>,
    /// Node ids in insertion order.
    node_order: RwLock<Vec<NodeId>>,
    edges: RwLock<HashMap<EdgeId, EdgeEntry>>,
    /// Edge ids in insertion order.
    edge_order: RwLock<Vec<EdgeId>>,
    /// node → (target, edge), in insertion order
    outgoing: RwLock<HashMap<NodeId, AdjacencyList>>,
    /// node → (source, edge), in insertion order
    incoming: RwLock<HashMap<NodeId, AdjacencyList>>,
    next_edge_id: AtomicU64,
}

struct EdgeEntry {
    src: NodeId,
    dst: NodeId,
    properties: Arc<PropertyMap>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, or replace the attributes of an existing one. An
    /// existing node keeps its position in the enumeration order.
    pub fn add_node(&self, id: NodeId, props: PropertyMap) {
        let previous = self.inner.nodes.write().insert(id, Arc::new(props));
        if previous.is_none() {
            self.inner.node_order.write().push(id);
            self.inner.outgoing.write().insert(id, AdjacencyList::new());
            self.inner.incoming.write().insert(id, AdjacencyList::new());
        }
    }

    /// Add an edge `src → dst` and return its freshly allocated id.
    pub fn add_edge(&self, src: NodeId, dst: NodeId, props: PropertyMap) -> Result<EdgeId> {
        let id = EdgeId(self.inner.next_edge_id.fetch_add(1, Ordering::Relaxed));
        self.insert_edge(id, src, dst, props)?;
        Ok(id)
    }

    /// Add an edge under a caller-chosen id.
    pub fn add_edge_with_id(
        &self,
        id: EdgeId,
        src: NodeId,
        dst: NodeId,
        props: PropertyMap,
    ) -> Result<()> {
        self.insert_edge(id, src, dst, props)?;
        self.inner.next_edge_id.fetch_max(id.0.saturating_add(1), Ordering::Relaxed);
        Ok(())
    }

    fn insert_edge(
        &self,
        id: EdgeId,
        src: NodeId,
        dst: NodeId,
        props: PropertyMap,
    ) -> Result<()> {
        // Verify both nodes exist
        {
            let nodes = self.inner.nodes.read();
            if !nodes.contains_key(&src) {
                return Err(Error::NodeNotFound(src));
            }
            if !nodes.contains_key(&dst) {
                return Err(Error::NodeNotFound(dst));
            }
        }

        {
            let mut edges = self.inner.edges.write();
            if edges.contains_key(&id) {
                return Err(Error::DuplicateEdge(id));
            }
            edges.insert(id, EdgeEntry { src, dst, properties: Arc::new(props) });
        }
        self.inner.edge_order.write().push(id);

        self.inner.outgoing.write().entry(src).or_default().push((dst, id));
        self.inner.incoming.write().entry(dst).or_default().push((src, id));
        Ok(())
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edges.read().len()
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Build a graph from a snapshot. Nodes are inserted first, then edges
    /// in the order given; an edge naming a missing node fails the load.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Result<Self> {
        let graph = Self::new();
        for node in snapshot.nodes {
            graph.add_node(node.id, node.attributes);
        }
        for edge in snapshot.edges {
            match edge.id {
                Some(id) => graph.add_edge_with_id(id, edge.src, edge.dst, edge.attributes)?,
                None => {
                    graph.add_edge(edge.src, edge.dst, edge.attributes)?;
                }
            }
        }
        Ok(graph)
    }

    /// Parse a JSON-encoded [`GraphSnapshot`].
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: GraphSnapshot = serde_json::from_str(json)?;
        Self::from_snapshot(snapshot)
    }

    /// Export the graph. Nodes and edges keep their insertion order, so a
    /// re-imported snapshot enumerates adjacency exactly as this graph does.
    pub fn to_snapshot(&self) -> GraphSnapshot {
        let nodes = {
            let bags = self.inner.nodes.read();
            self.inner
                .node_order
                .read()
                .iter()
                .filter_map(|id| {
                    bags.get(id).map(|props| NodeRecord {
                        id: *id,
                        attributes: (**props).clone(),
                    })
                })
                .collect()
        };

        let edges = {
            let entries = self.inner.edges.read();
            self.inner
                .edge_order
                .read()
                .iter()
                .filter_map(|id| {
                    entries.get(id).map(|entry| EdgeRecord {
                        id: Some(*id),
                        src: entry.src,
                        dst: entry.dst,
                        attributes: (*entry.properties).clone(),
                    })
                })
                .collect()
        };

        GraphSnapshot { nodes, edges }
    }

    fn adjacency(
        &self,
        list: &RwLock<HashMap<NodeId, AdjacencyList>>,
        id: NodeId,
    ) -> Result<Adjacency<'_>> {
        let pairs = list
            .read()
            .get(&id)
            .cloned()
            .ok_or(Error::NodeNotFound(id))?;
        Ok(Box::new(pairs.into_iter()))
    }
}

// ============================================================================
// GraphStore impl
// ============================================================================

impl GraphStore for MemoryGraph {
    fn node_attributes(&self, id: NodeId) -> Result<Arc<PropertyMap>> {
        self.inner
            .nodes
            .read()
            .get(&id)
            .cloned()
            .ok_or(Error::NodeNotFound(id))
    }

    fn edge_attributes(
        &self,
        src: NodeId,
        dst: NodeId,
        edge: Option<EdgeId>,
    ) -> Result<Arc<PropertyMap>> {
        let not_found = || Error::EdgeNotFound { src, dst, edge };

        let id = {
            let outgoing = self.inner.outgoing.read();
            outgoing
                .get(&src)
                .and_then(|pairs| {
                    pairs
                        .iter()
                        .find(|(target, id)| *target == dst && edge.is_none_or(|e| e == *id))
                        .map(|(_, id)| *id)
                })
                .ok_or_else(not_found)?
        };

        self.inner
            .edges
            .read()
            .get(&id)
            .map(|entry| Arc::clone(&entry.properties))
            .ok_or_else(not_found)
    }

    fn node_ids(&self) -> NodeIds<'_> {
        let ids = self.inner.node_order.read().clone();
        Box::new(ids.into_iter())
    }

    fn outgoing_edges(&self, id: NodeId) -> Result<Adjacency<'_>> {
        self.adjacency(&self.inner.outgoing, id)
    }

    fn incoming_edges(&self, id: NodeId) -> Result<Adjacency<'_>> {
        self.adjacency(&self.inner.incoming, id)
    }

    fn node_count(&self) -> usize {
        self.inner.nodes.read().len()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::properties;

    fn ast(kind: &str) -> PropertyMap {
        properties([("type", kind)])
    }

    #[test]
    fn test_add_and_get_node() {
        let g = MemoryGraph::new();
        g.add_node(NodeId(7), properties([("type", "AST_CALL"), ("code", "f()")]));

        let bag = g.node_attributes(NodeId(7)).unwrap();
        assert_eq!(bag.get("code").map(String::as_str), Some("f()"));
        assert!(matches!(
            g.node_attributes(NodeId(8)),
            Err(Error::NodeNotFound(NodeId(8)))
        ));
    }

    #[test]
    fn test_add_node_replaces_attributes_in_place() {
        let g = MemoryGraph::new();
        g.add_node(NodeId(1), ast("AST_CALL"));
        g.add_node(NodeId(2), ast("AST_CALL"));
        g.add_node(NodeId(1), ast("AST_ASSIGN"));

        let ids: Vec<NodeId> = g.node_ids().collect();
        assert_eq!(ids, vec![NodeId(1), NodeId(2)]);
        assert_eq!(g.node_count(), 2);
        let bag = g.node_attributes(NodeId(1)).unwrap();
        assert_eq!(bag.get("type").map(String::as_str), Some("AST_ASSIGN"));
    }

    #[test]
    fn test_edge_requires_both_endpoints() {
        let g = MemoryGraph::new();
        g.add_node(NodeId(1), ast("AST_CALL"));

        let result = g.add_edge(NodeId(1), NodeId(2), PropertyMap::new());
        assert!(matches!(result, Err(Error::NodeNotFound(NodeId(2)))));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn test_parallel_edges() {
        let g = MemoryGraph::new();
        g.add_node(NodeId(1), ast("AST_ASSIGN"));
        g.add_node(NodeId(2), ast("AST_CALL"));

        let e1 = g.add_edge(NodeId(1), NodeId(2), ast("PARENT_OF")).unwrap();
        let e2 = g.add_edge(NodeId(1), NodeId(2), ast("FLOWS_TO")).unwrap();
        assert_ne!(e1, e2);

        assert_eq!(g.edges_between(NodeId(1), NodeId(2)).unwrap(), vec![e1, e2]);
        assert!(g.edges_between(NodeId(2), NodeId(1)).unwrap().is_empty());

        let second = g.edge_attributes(NodeId(1), NodeId(2), Some(e2)).unwrap();
        assert_eq!(second.get("type").map(String::as_str), Some("FLOWS_TO"));

        // Without an id the first parallel edge wins.
        let first = g.edge_attributes(NodeId(1), NodeId(2), None).unwrap();
        assert_eq!(first.get("type").map(String::as_str), Some("PARENT_OF"));

        assert!(matches!(
            g.edge_attributes(NodeId(2), NodeId(1), None),
            Err(Error::EdgeNotFound { .. })
        ));
        assert!(matches!(
            g.edge_attributes(NodeId(1), NodeId(2), Some(EdgeId(99))),
            Err(Error::EdgeNotFound { edge: Some(EdgeId(99)), .. })
        ));
    }

    #[test]
    fn test_adjacency_order_and_direction() {
        let g = MemoryGraph::new();
        for id in 1..=3 {
            g.add_node(NodeId(id), ast("AST_CALL"));
        }
        let a = g.add_edge(NodeId(1), NodeId(3), PropertyMap::new()).unwrap();
        let b = g.add_edge(NodeId(1), NodeId(2), PropertyMap::new()).unwrap();
        let c = g.add_edge(NodeId(2), NodeId(3), PropertyMap::new()).unwrap();

        let out: Vec<_> = g.outgoing_edges(NodeId(1)).unwrap().collect();
        assert_eq!(out, vec![(NodeId(3), a), (NodeId(2), b)]);

        let inc: Vec<_> = g.incoming_edges(NodeId(3)).unwrap().collect();
        assert_eq!(inc, vec![(NodeId(1), a), (NodeId(2), c)]);

        assert!(g.outgoing_edges(NodeId(9)).is_err());
    }

    #[test]
    fn test_self_loop() {
        let g = MemoryGraph::new();
        g.add_node(NodeId(1), ast("AST_CALL"));
        let e = g.add_edge(NodeId(1), NodeId(1), PropertyMap::new()).unwrap();

        let out: Vec<_> = g.outgoing_edges(NodeId(1)).unwrap().collect();
        let inc: Vec<_> = g.incoming_edges(NodeId(1)).unwrap().collect();
        assert_eq!(out, vec![(NodeId(1), e)]);
        assert_eq!(inc, vec![(NodeId(1), e)]);
    }

    #[test]
    fn test_snapshot_json() {
        let g = MemoryGraph::from_json(
            r#"{
                "nodes": [
                    {"id": 1, "attributes": {"type": "AST_ASSIGN"}},
                    {"id": 2, "attributes": {"type": "AST_CALL", "lineno": "3"}}
                ],
                "edges": [
                    {"id": 10, "src": 1, "dst": 2, "attributes": {"type": "PARENT_OF"}},
                    {"src": 1, "dst": 2, "attributes": {"type": "FLOWS_TO"}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 2);
        // Allocation continues after the highest explicit id.
        assert_eq!(
            g.edges_between(NodeId(1), NodeId(2)).unwrap(),
            vec![EdgeId(10), EdgeId(11)]
        );

        let snapshot = g.to_snapshot();
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.edges[0].id, Some(EdgeId(10)));
        let reloaded = MemoryGraph::from_snapshot(snapshot.clone()).unwrap();
        assert_eq!(reloaded.to_snapshot(), snapshot);
    }

    #[test]
    fn test_snapshot_keeps_edge_insertion_order() {
        let g = MemoryGraph::new();
        for id in 1..=3 {
            g.add_node(NodeId(id), ast("AST_CALL"));
        }
        // Inserted out of id order.
        g.add_edge_with_id(EdgeId(10), NodeId(1), NodeId(2), ast("PARENT_OF")).unwrap();
        g.add_edge_with_id(EdgeId(5), NodeId(1), NodeId(3), ast("PARENT_OF")).unwrap();

        let snapshot = g.to_snapshot();
        let ids: Vec<Option<EdgeId>> = snapshot.edges.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![Some(EdgeId(10)), Some(EdgeId(5))]);

        let reloaded = MemoryGraph::from_snapshot(snapshot).unwrap();
        let before: Vec<_> = g.outgoing_edges(NodeId(1)).unwrap().collect();
        let after: Vec<_> = reloaded.outgoing_edges(NodeId(1)).unwrap().collect();
        assert_eq!(before, vec![(NodeId(2), EdgeId(10)), (NodeId(3), EdgeId(5))]);
        assert_eq!(after, before);
    }

    #[test]
    fn test_snapshot_with_largest_edge_id() {
        let g = MemoryGraph::from_json(
            r#"{
                "nodes": [{"id": 1}, {"id": 2}],
                "edges": [{"id": 18446744073709551615, "src": 1, "dst": 2}]
            }"#,
        )
        .unwrap();

        assert_eq!(g.edges_between(NodeId(1), NodeId(2)).unwrap(), vec![EdgeId(u64::MAX)]);
        // The id space is exhausted; allocating another id reports a clash.
        assert!(matches!(
            g.add_edge(NodeId(2), NodeId(1), PropertyMap::new()),
            Err(Error::DuplicateEdge(EdgeId(u64::MAX)))
        ));
    }

    #[test]
    fn test_snapshot_rejects_dangling_edges_and_bad_json() {
        let dangling = r#"{"nodes": [{"id": 1}], "edges": [{"src": 1, "dst": 2}]}"#;
        assert!(matches!(
            MemoryGraph::from_json(dangling),
            Err(Error::NodeNotFound(NodeId(2)))
        ));

        let duplicate = r#"{
            "nodes": [{"id": 1}, {"id": 2}],
            "edges": [{"id": 4, "src": 1, "dst": 2}, {"id": 4, "src": 2, "dst": 1}]
        }"#;
        assert!(matches!(
            MemoryGraph::from_json(duplicate),
            Err(Error::DuplicateEdge(EdgeId(4)))
        ));

        assert!(matches!(
            MemoryGraph::from_json("{not json"),
            Err(Error::Snapshot(_))
        ));
    }
}
