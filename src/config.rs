//! Query engine configuration.

use serde::{Deserialize, Serialize};

/// Level budget used when a query does not supply its own.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Knobs for a [`QueryEngine`](crate::QueryEngine).
///
/// Derives serde so a host can nest it in its own configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Maximum number of BFS levels expanded by bounded reachability.
    /// Also carried on every view the engine builds.
    pub max_depth: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }
}

impl QueryConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(QueryConfig::default().max_depth, 10);
        assert_eq!(QueryConfig::default().with_max_depth(3).max_depth, 3);
    }

    #[test]
    fn test_deserialize_fills_missing_fields() {
        let cfg: QueryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, QueryConfig::default());

        let cfg: QueryConfig = serde_json::from_str(r#"{"max_depth": 2}"#).unwrap();
        assert_eq!(cfg.max_depth, 2);
    }
}
