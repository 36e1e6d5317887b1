//! Node in the code property graph.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::property_map::{attr, parse_uint, PropertyMap, PropertyView};
use crate::storage::GraphStore;
use crate::Result;

/// Opaque node identifier, stable for the node's lifetime in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// NodeKind
// ============================================================================

/// Role of a node in the graph, read from its `type` attribute.
///
/// Kinds the engine does not name are preserved verbatim in `Other`, so
/// comparisons stay by value even for AST types added later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Call,
    Assign,
    BinaryOp,
    If,
    IfElem,
    StmtList,
    FuncDecl,
    BaseScope,
    TopLevel,
    Other(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Call => "AST_CALL",
            NodeKind::Assign => "AST_ASSIGN",
            NodeKind::BinaryOp => "AST_BINARY_OP",
            NodeKind::If => "AST_IF",
            NodeKind::IfElem => "AST_IF_ELEM",
            NodeKind::StmtList => "AST_STMT_LIST",
            NodeKind::FuncDecl => "AST_FUNC_DECL",
            NodeKind::BaseScope => "BASE_SCOPE",
            NodeKind::TopLevel => "AST_TOPLEVEL",
            NodeKind::Other(s) => s,
        }
    }
}

impl From<&str> for NodeKind {
    fn from(raw: &str) -> Self {
        match raw {
            "AST_CALL" => NodeKind::Call,
            "AST_ASSIGN" => NodeKind::Assign,
            "AST_BINARY_OP" => NodeKind::BinaryOp,
            "AST_IF" => NodeKind::If,
            "AST_IF_ELEM" => NodeKind::IfElem,
            "AST_STMT_LIST" => NodeKind::StmtList,
            "AST_FUNC_DECL" => NodeKind::FuncDecl,
            "BASE_SCOPE" => NodeKind::BaseScope,
            "AST_TOPLEVEL" | "AST_TOP_LEVEL" => NodeKind::TopLevel,
            other => NodeKind::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Namespace
// ============================================================================

/// Source range recorded in the `namespace` attribute as `a:b:c:d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub start: (u64, u64),
    pub end: (u64, u64),
}

impl Namespace {
    /// Parse `a:b:c:d`. Any arity other than four yields `None`; a
    /// non-numeric component becomes zero rather than rejecting the value.
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.split(':').collect();
        let [a, b, c, d] = parts.as_slice() else {
            return None;
        };
        Some(Self {
            start: (component(a), component(b)),
            end: (component(c), component(d)),
        })
    }
}

fn component(raw: &str) -> u64 {
    parse_uint(raw).unwrap_or(0)
}

// ============================================================================
// NodeView
// ============================================================================

/// Immutable projection over one node's attribute bag.
///
/// Two views built from the same id against the same store compare equal.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    pub id: NodeId,
    properties: Arc<PropertyMap>,
    max_depth: usize,
}

impl NodeView {
    /// Fetch the attribute bag for `id`. Fails with `NodeNotFound` when the
    /// store has no such node.
    pub fn load<S>(store: &S, id: NodeId, max_depth: usize) -> Result<Self>
    where
        S: GraphStore + ?Sized,
    {
        let properties = store.node_attributes(id)?;
        Ok(Self { id, properties, max_depth })
    }

    /// Depth budget of the query that produced this view.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.get(attr::NODE_KIND).map(NodeKind::from)
    }

    pub fn is_kind(&self, kind: &NodeKind) -> bool {
        self.kind().as_ref() == Some(kind)
    }

    pub fn code(&self) -> Option<&str> {
        self.get(attr::CODE)
    }

    pub fn label(&self) -> Option<&str> {
        self.get(attr::LABEL)
    }

    /// Space-delimited flag list; empty when the attribute is absent.
    pub fn flags(&self) -> Vec<&str> {
        self.get(attr::FLAGS)
            .map(|raw| raw.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn line_number(&self) -> Option<u64> {
        self.get_uint(attr::LINE_NUMBER)
    }

    pub fn end_line_number(&self) -> Option<u64> {
        self.get_uint(attr::END_LINE_NUMBER)
    }

    pub fn child_ordinal(&self) -> Option<u64> {
        self.get_uint(attr::CHILD_ORDINAL)
    }

    /// Id of the enclosing function declaration.
    pub fn function_id(&self) -> Option<u64> {
        self.get_uint(attr::FUNCTION_ID)
    }

    pub fn class_name(&self) -> Option<&str> {
        self.get(attr::CLASS_NAME)
    }

    pub fn namespace(&self) -> Option<Namespace> {
        self.get(attr::NAMESPACE).and_then(Namespace::parse)
    }

    pub fn name(&self) -> Option<&str> {
        self.get(attr::NAME)
    }

    pub fn doc_comment(&self) -> Option<&str> {
        self.get(attr::DOC_COMMENT)
    }
}

impl PropertyView for NodeView {
    fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}
