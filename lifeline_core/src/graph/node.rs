//! Node definitions - entries on the branching timeline.

use serde::{Deserialize, Serialize};

/// Unique identifier for nodes.
///
/// Ids are issued by the engine's allocator, are unique for the graph's
/// lifetime, and their text is never surfaced to the user as meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for prediction groups.
///
/// A group is a derived relation, not a stored entity: it names the set
/// of prediction nodes spawned by one branching operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kinds of node a timeline can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Start,
    Milestone,
    Event,
    Prediction,
    Death,
}

impl NodeKind {
    /// Stable lowercase name, used when minting ids.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Start => "start",
            NodeKind::Milestone => "milestone",
            NodeKind::Event => "event",
            NodeKind::Prediction => "prediction",
            NodeKind::Death => "death",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A position on the render surface.
///
/// Owned by the layout surface, but authoritative for age derivation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A single entry on the timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifeNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Position,

    /// Derived once at creation; changed only by an explicit retime.
    pub age: i32,

    pub content: String,

    /// Set while a generation call targeting this node is in flight.
    pub is_loading: bool,

    /// Terminal flag; strips the re-roll capability.
    pub is_accepted: bool,

    /// An event offers branching exactly once.
    pub predictions_generated: bool,

    /// Set only on prediction-kind nodes.
    pub prediction_group: Option<GroupId>,

    /// Marks the first member of a generated group.
    pub is_primary: bool,
}

impl LifeNode {
    /// Create a new node with no transient flags set.
    pub fn new(
        id: NodeId,
        kind: NodeKind,
        position: Position,
        age: i32,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            age,
            content: content.into(),
            is_loading: false,
            is_accepted: false,
            predictions_generated: false,
            prediction_group: None,
            is_primary: false,
        }
    }

    /// Assign the node to a prediction group.
    pub fn with_group(mut self, group: GroupId) -> Self {
        self.prediction_group = Some(group);
        self
    }

    /// Mark the node as its group's primary member.
    pub fn with_primary(mut self, primary: bool) -> Self {
        self.is_primary = primary;
        self
    }

    /// Whether a re-roll may start on this node.
    pub fn can_shuffle(&self) -> bool {
        !self.is_accepted && !self.is_loading
    }
}

/// A partial update merged into a node by
/// [`TimelineGraph::update_node`](super::TimelineGraph::update_node).
///
/// Only the fields a patch names change; merging is last-writer-wins at
/// node granularity. Group membership and the primary flag are not
/// patchable: promotion replaces the node instead of mutating them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodePatch {
    pub content: Option<String>,
    pub age: Option<i32>,
    pub position: Option<Position>,
    pub is_loading: Option<bool>,
    pub is_accepted: Option<bool>,
    pub predictions_generated: Option<bool>,
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn age(mut self, age: i32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.is_loading = Some(loading);
        self
    }

    pub fn accepted(mut self, accepted: bool) -> Self {
        self.is_accepted = Some(accepted);
        self
    }

    pub fn predictions_generated(mut self, generated: bool) -> Self {
        self.predictions_generated = Some(generated);
        self
    }

    /// Merge this patch into a node.
    pub fn apply(self, node: &mut LifeNode) {
        if let Some(content) = self.content {
            node.content = content;
        }
        if let Some(age) = self.age {
            node.age = age;
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(loading) = self.is_loading {
            node.is_loading = loading;
        }
        if let Some(accepted) = self.is_accepted {
            node.is_accepted = accepted;
        }
        if let Some(generated) = self.predictions_generated {
            node.predictions_generated = generated;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_node() -> LifeNode {
        LifeNode::new(
            NodeId::new("milestone-1"),
            NodeKind::Milestone,
            Position::new(250.0, 180.0),
            30,
            "Age 30: Get promoted to team lead",
        )
    }

    #[test]
    fn test_new_node_has_no_transient_flags() {
        let node = sample_node();
        assert!(!node.is_loading);
        assert!(!node.is_accepted);
        assert!(!node.predictions_generated);
        assert!(node.prediction_group.is_none());
        assert!(!node.is_primary);
    }

    #[test]
    fn test_node_builder() {
        let group = GroupId::new("7");
        let node = LifeNode::new(
            NodeId::new("prediction-7-1"),
            NodeKind::Prediction,
            Position::default(),
            42,
            "It works out",
        )
        .with_group(group.clone())
        .with_primary(true);

        assert_eq!(node.prediction_group, Some(group));
        assert!(node.is_primary);
    }

    #[test]
    fn test_can_shuffle() {
        let mut node = sample_node();
        assert!(node.can_shuffle());

        node.is_loading = true;
        assert!(!node.can_shuffle());

        node.is_loading = false;
        node.is_accepted = true;
        assert!(!node.can_shuffle());
    }

    #[test]
    fn test_patch_merges_named_fields_only() {
        let mut node = sample_node();
        let before_age = node.age;

        NodePatch::new()
            .content("Age 30: Switch careers into tech")
            .loading(true)
            .apply(&mut node);

        assert_eq!(node.content, "Age 30: Switch careers into tech");
        assert!(node.is_loading);
        assert_eq!(node.age, before_age);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(NodeKind::Start.as_str(), "start");
        assert_eq!(NodeKind::Prediction.as_str(), "prediction");
        assert_eq!(NodeKind::Death.to_string(), "death");
    }
}
