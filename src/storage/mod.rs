//! # Graph Store Trait
//!
//! The contract between the query engine and whatever holds the graph.
//! The engine only ever reads through it: attribute bags by id, the node
//! enumeration, and per-node adjacency in either direction.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryGraph` | `memory` | In-memory multigraph for testing/embedding |
//!
//! Concurrent readers are safe only when the implementation says so; the
//! engine itself takes no locks.

pub mod memory;

use std::sync::Arc;

use crate::model::{EdgeId, NodeId, PropertyMap};
use crate::Result;

pub use memory::{EdgeRecord, GraphSnapshot, MemoryGraph, NodeRecord};

/// Lazy enumeration of node ids.
pub type NodeIds<'a> = Box<dyn Iterator<Item = NodeId> + 'a>;

/// Lazy enumeration of `(neighbour, edge)` pairs around one node.
pub type Adjacency<'a> = Box<dyn Iterator<Item = (NodeId, EdgeId)> + 'a>;

// ============================================================================
// GraphStore Trait
// ============================================================================

/// Read-only access to a directed, labelled multigraph.
pub trait GraphStore {
    /// Attribute bag of a node. Fails with `NodeNotFound` for unknown ids.
    fn node_attributes(&self, id: NodeId) -> Result<Arc<PropertyMap>>;

    /// Attribute bag of the edge `src → dst`.
    ///
    /// `edge` picks one of several parallel edges; with `None` the first
    /// `src → dst` edge in enumeration order is used. Fails with
    /// `EdgeNotFound` when no matching edge exists.
    fn edge_attributes(
        &self,
        src: NodeId,
        dst: NodeId,
        edge: Option<EdgeId>,
    ) -> Result<Arc<PropertyMap>>;

    /// Every node id, in a stable order.
    fn node_ids(&self) -> NodeIds<'_>;

    /// Outgoing edges of `id` as `(target, edge)` pairs.
    fn outgoing_edges(&self, id: NodeId) -> Result<Adjacency<'_>>;

    /// Incoming edges of `id` as `(source, edge)` pairs.
    fn incoming_edges(&self, id: NodeId) -> Result<Adjacency<'_>>;

    /// Ids of all parallel edges `src → dst`.
    ///
    /// Default: scans the outgoing edges of `src`.
    fn edges_between(&self, src: NodeId, dst: NodeId) -> Result<Vec<EdgeId>> {
        Ok(self
            .outgoing_edges(src)?
            .filter(|(target, _)| *target == dst)
            .map(|(_, edge)| edge)
            .collect())
    }

    /// Total number of nodes.
    ///
    /// Default: counts the node enumeration.
    fn node_count(&self) -> usize {
        self.node_ids().count()
    }
}
