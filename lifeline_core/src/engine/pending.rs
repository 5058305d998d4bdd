//! In-flight generation bookkeeping.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::generate::GenerationCategory;
use crate::graph::NodeId;

/// Opaque key of one in-flight generation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationTicket(pub Uuid);

impl GenerationTicket {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GenerationTicket {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GenerationTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One suspended generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingGeneration {
    pub node: NodeId,
    pub category: GenerationCategory,
    pub context: String,
}

/// The queue of suspended generation calls, keyed by ticket.
///
/// The queue is the only record of what is in flight: resolving a ticket
/// takes it out, so a second resolution of the same ticket is a no-op,
/// and invalidating a removed node's tickets closes the completion race.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingOps {
    inflight: HashMap<GenerationTicket, PendingGeneration>,
}

impl PendingOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new in-flight operation and hand back its ticket.
    pub fn begin(
        &mut self,
        node: NodeId,
        category: GenerationCategory,
        context: String,
    ) -> GenerationTicket {
        let ticket = GenerationTicket::new();
        self.inflight.insert(
            ticket,
            PendingGeneration {
                node,
                category,
                context,
            },
        );
        ticket
    }

    /// Take an operation out of the queue.
    pub fn resolve(&mut self, ticket: GenerationTicket) -> Option<PendingGeneration> {
        self.inflight.remove(&ticket)
    }

    /// Whether any operation targets the given node.
    pub fn is_inflight(&self, node: &NodeId) -> bool {
        self.inflight.values().any(|op| op.node == *node)
    }

    /// Drop every operation targeting one of the given nodes.
    ///
    /// Returns how many were invalidated.
    pub fn invalidate_nodes(&mut self, nodes: &[NodeId]) -> usize {
        let before = self.inflight.len();
        self.inflight.retain(|_, op| !nodes.contains(&op.node));
        before - self.inflight.len()
    }

    /// Count in-flight operations of a category.
    pub fn count_by_category(&self, category: GenerationCategory) -> usize {
        self.inflight
            .values()
            .filter(|op| op.category == category)
            .count()
    }

    pub fn len(&self) -> usize {
        self.inflight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inflight.is_empty()
    }

    /// Drop everything. Used at teardown.
    pub fn clear(&mut self) {
        self.inflight.clear();
    }
}
