//! Edge in the code property graph.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::property_map::{attr, PropertyMap, PropertyView};
use super::NodeId;
use crate::storage::GraphStore;
use crate::Result;

/// Opaque edge identifier. Distinguishes parallel edges between the same
/// ordered pair of nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u64);

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Traversal direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Outgoing,
    Incoming,
}

// ============================================================================
// EdgeKind
// ============================================================================

/// Role of an edge in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Syntactic parent → child.
    ParentOf,
    /// Control/data flow, including taint propagation.
    FlowsTo,
    ObjToAst,
    ObjToProp,
    ContributesTo,
    AstBinaryOp,
    Lookup,
    Other(String),
}

impl EdgeKind {
    pub fn as_str(&self) -> &str {
        match self {
            EdgeKind::ParentOf => "PARENT_OF",
            EdgeKind::FlowsTo => "FLOWS_TO",
            EdgeKind::ObjToAst => "OBJ_TO_AST",
            EdgeKind::ObjToProp => "OBJ_TO_PROP",
            EdgeKind::ContributesTo => "CONTRIBUTES_TO",
            EdgeKind::AstBinaryOp => "AST_BINARY_OP",
            EdgeKind::Lookup => "LOOKUP",
            EdgeKind::Other(s) => s,
        }
    }
}

impl From<&str> for EdgeKind {
    fn from(raw: &str) -> Self {
        match raw {
            "PARENT_OF" => EdgeKind::ParentOf,
            "FLOWS_TO" => EdgeKind::FlowsTo,
            "OBJ_TO_AST" => EdgeKind::ObjToAst,
            "OBJ_TO_PROP" => EdgeKind::ObjToProp,
            "CONTRIBUTES_TO" => EdgeKind::ContributesTo,
            "AST_BINARY_OP" => EdgeKind::AstBinaryOp,
            "LOOKUP" => EdgeKind::Lookup,
            other => EdgeKind::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// EdgeView
// ============================================================================

/// Immutable projection over one edge's attribute bag.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeView {
    pub src: NodeId,
    pub dst: NodeId,
    /// `None` when the caller did not need to disambiguate parallel edges.
    pub edge: Option<EdgeId>,
    properties: Arc<PropertyMap>,
    max_depth: usize,
}

impl EdgeView {
    /// Fetch the attribute bag for `src → dst`. Fails with `EdgeNotFound`
    /// when no such edge exists.
    pub fn load<S>(
        store: &S,
        src: NodeId,
        dst: NodeId,
        edge: Option<EdgeId>,
        max_depth: usize,
    ) -> Result<Self>
    where
        S: GraphStore + ?Sized,
    {
        let properties = store.edge_attributes(src, dst, edge)?;
        Ok(Self { src, dst, edge, properties, max_depth })
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Starting offset.
    pub fn start(&self) -> Option<u64> {
        self.get_uint(attr::EDGE_START)
    }

    /// Ending offset.
    pub fn end(&self) -> Option<u64> {
        self.get_uint(attr::EDGE_END)
    }

    pub fn label(&self) -> Option<&str> {
        self.get(attr::LABEL)
    }

    pub fn taint_source(&self) -> Option<&str> {
        self.get(attr::TAINT_SOURCE)
    }

    pub fn taint_destination(&self) -> Option<&str> {
        self.get(attr::TAINT_DESTINATION)
    }

    pub fn kind(&self) -> Option<EdgeKind> {
        self.get(attr::EDGE_KIND).map(EdgeKind::from)
    }

    pub fn is_kind(&self, kind: &EdgeKind) -> bool {
        self.kind().as_ref() == Some(kind)
    }
}

impl PropertyView for EdgeView {
    fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}
