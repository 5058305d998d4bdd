//! The timeline store - the canonical graph the render surface observes.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::{Edge, GroupId, LifeNode, NodeId, NodePatch};

/// The canonical mapping of node id to node, plus the ordered edge list.
///
/// Every mutation is transaction-shaped: the structure moves from one
/// consistent state to the next in a single call, so a snapshot taken
/// between calls never sees a half-applied operation. Mutations are
/// last-writer-wins at node granularity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineGraph {
    nodes: HashMap<NodeId, LifeNode>,
    edges: Vec<Edge>,
}

impl TimelineGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a batch of nodes.
    pub fn add_nodes(&mut self, nodes: impl IntoIterator<Item = LifeNode>) {
        for node in nodes {
            debug!(node = %node.id, kind = %node.kind, "add node");
            self.nodes.insert(node.id.clone(), node);
        }
    }

    /// Add a batch of edges.
    ///
    /// Edges may only join live nodes; an edge naming a missing endpoint
    /// is dropped rather than stored dangling.
    pub fn add_edges(&mut self, edges: impl IntoIterator<Item = Edge>) {
        for edge in edges {
            if !self.nodes.contains_key(&edge.source) || !self.nodes.contains_key(&edge.target) {
                debug!(edge = %edge.id, "dropping edge with missing endpoint");
                continue;
            }
            self.edges.push(edge);
        }
    }

    /// Merge a patch into a node.
    ///
    /// An absent id is a silent no-op, not an error: asynchronous
    /// completions may race a prior removal.
    pub fn update_node(&mut self, id: &NodeId, patch: NodePatch) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                patch.apply(node);
                true
            }
            None => {
                debug!(node = %id, "update of absent node ignored");
                false
            }
        }
    }

    /// Remove nodes and, atomically, every edge touching them.
    pub fn remove_nodes(&mut self, ids: &[NodeId]) {
        if ids.is_empty() {
            return;
        }
        let removing: HashSet<&NodeId> = ids.iter().collect();
        let edges_before = self.edges.len();
        self.edges
            .retain(|edge| !removing.contains(&edge.source) && !removing.contains(&edge.target));
        for id in ids {
            self.nodes.remove(id);
        }
        debug!(
            nodes = ids.len(),
            edges = edges_before - self.edges.len(),
            "removed nodes and touching edges"
        );
    }

    /// Point every edge targeting `old_target` at `new_target` instead.
    ///
    /// Returns the number of rewritten edges. Used by promotion only.
    pub fn retarget_edges(&mut self, old_target: &NodeId, new_target: &NodeId) -> usize {
        let mut rewritten = 0;
        for edge in &mut self.edges {
            if edge.target == *old_target {
                edge.target = new_target.clone();
                rewritten += 1;
            }
        }
        rewritten
    }

    /// Get a node by id.
    pub fn node(&self, id: &NodeId) -> Option<&LifeNode> {
        self.nodes.get(id)
    }

    /// Check whether a node exists.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &LifeNode> {
        self.nodes.values()
    }

    /// All edges, in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All members of a prediction group.
    pub fn group_members(&self, group: &GroupId) -> Vec<&LifeNode> {
        self.nodes
            .values()
            .filter(|node| node.prediction_group.as_ref() == Some(group))
            .collect()
    }

    /// The edge whose target is `id`.
    ///
    /// A prediction has exactly one such edge, from its parent event.
    pub fn parent_edge_of(&self, id: &NodeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.target == *id)
    }

    /// All edges referencing a node on either end.
    pub fn edges_touching(&self, id: &NodeId) -> Vec<&Edge> {
        self.edges.iter().filter(|edge| edge.touches(id)).collect()
    }

    /// Find nodes matching a predicate.
    pub fn find_nodes<F>(&self, predicate: F) -> Vec<&LifeNode>
    where
        F: Fn(&LifeNode) -> bool,
    {
        self.nodes.values().filter(|n| predicate(n)).collect()
    }

    /// Audit: whether any edge endpoint names a missing node.
    pub fn has_dangling_edges(&self) -> bool {
        self.edges.iter().any(|edge| {
            !self.nodes.contains_key(&edge.source) || !self.nodes.contains_key(&edge.target)
        })
    }
}
