//! # cpg-query: Code Property Graph Query Engine
//!
//! Read-only traversal and query layer over a code property graph: a
//! directed multigraph whose nodes are AST elements and scopes and whose
//! edges carry syntax, flow, taint and lookup relations.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `GraphStore` is the contract between the engine and storage
//! 2. **Views, not copies**: `NodeView`/`EdgeView` project one attribute bag each
//! 3. **One primitive**: every query is built on single-hop `adjacent`
//! 4. **Lazy and bounded**: results are pulled on demand; BFS spends a level budget
//! 5. **Never fails loudly**: lookup errors go to a `DiagnosticsSink`, callers get nothing
//!
//! ## Quick Start
//!
//! ```rust
//! use cpg_query::{properties, Always, MemoryGraph, NodeId, NodeKind, QueryEngine};
//!
//! let graph = MemoryGraph::new();
//! graph.add_node(NodeId(1), properties([("type", "AST_TOPLEVEL")]));
//! graph.add_node(NodeId(2), properties([("type", "AST_CALL"), ("lineno", "3")]));
//! graph.add_edge(NodeId(1), NodeId(2), properties([("type", "PARENT_OF")])).unwrap();
//!
//! let engine = QueryEngine::new(&graph);
//! let call = engine
//!     .find_first_node(|n: &cpg_query::NodeView| n.is_kind(&NodeKind::Call))
//!     .unwrap();
//! assert_eq!(call.line_number(), Some(3));
//!
//! let file: Vec<NodeId> = engine.enclosing_top_level_unit(&call).map(|n| n.id).collect();
//! assert_eq!(file, vec![NodeId(1)]);
//!
//! let children: Vec<NodeId> = engine
//!     .structural_children(&engine.node(NodeId(1)).unwrap(), Always)
//!     .map(|n| n.id)
//!     .collect();
//! assert_eq!(children, vec![NodeId(2)]);
//! ```
//!
//! ## Stores
//!
//! | Store | Description |
//! |-------|-------------|
//! | `MemoryGraph` | In-memory multigraph, loadable from a JSON snapshot |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod traversal;
pub mod query;
pub mod diagnostics;
pub mod config;

// ============================================================================
// Re-exports: Model (the views)
// ============================================================================

pub use model::{
    Direction, EdgeId, EdgeKind, EdgeView, Namespace, NodeId, NodeKind, NodeView,
    PropertyMap, PropertyView, properties,
};

// ============================================================================
// Re-exports: Storage
// ============================================================================

pub use storage::{EdgeRecord, GraphSnapshot, GraphStore, MemoryGraph, NodeRecord};

// ============================================================================
// Re-exports: Traversal
// ============================================================================

pub use traversal::{
    adjacent, Adjacent, Always, And, Borrowed, EdgeKindIs, EdgeNodePredicate, NodeKindIs,
    NodePredicate, Unvisited,
};

// ============================================================================
// Re-exports: Queries
// ============================================================================

pub use query::{Edges, Nodes, QueryEngine, Results};
pub use diagnostics::{Diagnostic, DiagnosticsSink, RecordingSink, TracingSink};
pub use config::{QueryConfig, DEFAULT_MAX_DEPTH};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("edge {src} -> {dst} not found (edge id: {edge:?})")]
    EdgeNotFound {
        src: NodeId,
        dst: NodeId,
        edge: Option<EdgeId>,
    },

    #[error("duplicate edge id {0}")]
    DuplicateEdge(EdgeId),

    #[error("invalid graph snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
