//! Edge definitions - directed connections between timeline nodes.

use serde::{Deserialize, Serialize};

use super::NodeId;

/// Unique identifier for edges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub String);

impl EdgeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EdgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named connection points on a node.
///
/// Most edges join default ports; an event node additionally exposes a
/// branch port feeding its prediction group, and predictions receive
/// through their incoming port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionPoint {
    Forward,
    Branch,
    Incoming,
}

impl ConnectionPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionPoint::Forward => "forward",
            ConnectionPoint::Branch => "branch",
            ConnectionPoint::Incoming => "incoming",
        }
    }
}

impl std::fmt::Display for ConnectionPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directed edge between two nodes.
///
/// Edges have no lifecycle of their own: removing either endpoint
/// removes the edge in the same transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub source_point: Option<ConnectionPoint>,
    pub target_point: Option<ConnectionPoint>,
}

impl Edge {
    /// Create an edge joining default ports.
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            source,
            target,
            source_point: None,
            target_point: None,
        }
    }

    /// Name the connection points on either end.
    pub fn with_points(
        mut self,
        source_point: Option<ConnectionPoint>,
        target_point: Option<ConnectionPoint>,
    ) -> Self {
        self.source_point = source_point;
        self.target_point = target_point;
        self
    }

    /// Whether the edge references the given node on either end.
    pub fn touches(&self, id: &NodeId) -> bool {
        self.source == *id || self.target == *id
    }
}
