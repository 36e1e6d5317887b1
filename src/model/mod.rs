//! # Code Property Graph Model
//!
//! Read-only views over the attribute bags the store keeps for each node
//! and edge. A view is built on demand from one store lookup, never caches
//! anything beyond that bag, and is dropped once the caller is done with it.
//!
//! Design rule: no traversal here. This module only knows how to project
//! one bag into typed accessors.

pub mod node;
pub mod relationship;
pub mod property_map;

pub use node::{Namespace, NodeId, NodeKind, NodeView};
pub use relationship::{Direction, EdgeId, EdgeKind, EdgeView};
pub use property_map::{attr, parse_uint, properties, PropertyMap, PropertyView};
