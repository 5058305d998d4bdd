//! Identity allocation - one allocator per engine session.

use serde::{Deserialize, Serialize};

use crate::graph::{EdgeId, GroupId, NodeId, NodeKind};

/// Issues process-unique string identifiers for every created entity.
///
/// Constructed once per session and passed wherever identities are
/// minted; values increase monotonically and are never reused. The
/// identifiers carry a readable shape for debugging but are never shown
/// to the user as semantic values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    counter: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    /// Mint a node id for the given kind.
    pub fn node_id(&mut self, kind: NodeKind) -> NodeId {
        NodeId::new(format!("{}-{}", kind.as_str(), self.next()))
    }

    /// Mint a prediction group id.
    pub fn group_id(&mut self) -> GroupId {
        GroupId::new(self.next().to_string())
    }

    /// Mint a prediction id, qualified by its group and 1-based index.
    pub fn prediction_id(&self, group: &GroupId, index: usize) -> NodeId {
        NodeId::new(format!("prediction-{}-{}", group, index + 1))
    }

    /// Mint the id of a promoted event.
    ///
    /// Always a fresh value, never a rename of the retired prediction id:
    /// no edge may keep pointing at a retired id after promotion.
    pub fn promoted_event_id(&mut self) -> NodeId {
        NodeId::new(format!("event-from-prediction-{}", self.next()))
    }

    /// Mint an edge id.
    pub fn edge_id(&mut self) -> EdgeId {
        EdgeId::new(format!("edge-{}", self.next()))
    }
}
