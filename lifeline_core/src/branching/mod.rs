//! The event/prediction branching protocol.
//!
//! One module owns both halves of the protocol: fanning an event into a
//! group of mutually exclusive prediction candidates, and promoting the
//! accepted candidate back into a permanent event. An event offers
//! branching exactly once; a resolved group keeps exactly one survivor.

use tracing::debug;

use life_rules::SimulationConfig;

use crate::engine::IdAllocator;
use crate::generate::OUTCOME_PHRASES;
use crate::graph::{
    ConnectionPoint, Edge, GroupId, LifeNode, NodeId, NodeKind, NodePatch, Position, TimelineGraph,
};

/// How many predictions a branching operation fans out.
pub const PREDICTION_FAN: usize = 3;

/// What a resolution changed.
#[derive(Debug, Clone)]
pub struct PromotionOutcome {
    /// The freshly allocated event carrying the accepted content.
    pub promoted: NodeId,
    /// Every node record retired by the resolution: the losing siblings
    /// and the accepted prediction itself.
    pub removed: Vec<NodeId>,
}

/// Fan an event into a group of prediction candidates.
///
/// Idempotent: an event whose predictions were already generated keeps
/// its single existing group and the second call is a no-op. Candidates
/// sit in a fan below the parent, inherit its age, and join the parent's
/// branch port through their incoming port; index 0 is the group's
/// primary member.
pub fn generate_predictions(
    graph: &mut TimelineGraph,
    alloc: &mut IdAllocator,
    config: &SimulationConfig,
    event_id: &NodeId,
) -> Option<GroupId> {
    let parent = graph.node(event_id)?;
    if parent.kind != NodeKind::Event || parent.predictions_generated {
        return None;
    }
    let origin = parent.position;
    let age = parent.age;

    let group = alloc.group_id();
    let mut nodes = Vec::with_capacity(PREDICTION_FAN);
    let mut edges = Vec::with_capacity(PREDICTION_FAN);

    for index in 0..PREDICTION_FAN {
        let dx = (index as f32 - 1.0) * config.branch_fan_offset;
        let dy = config.branch_drop
            + if index % 2 == 0 {
                config.branch_jitter
            } else {
                0.0
            };

        let id = alloc.prediction_id(&group, index);
        let node = LifeNode::new(
            id.clone(),
            NodeKind::Prediction,
            Position::new(origin.x + dx, origin.y + dy),
            age,
            OUTCOME_PHRASES[index % OUTCOME_PHRASES.len()],
        )
        .with_group(group.clone())
        .with_primary(index == 0);

        edges.push(
            Edge::new(alloc.edge_id(), event_id.clone(), id).with_points(
                Some(ConnectionPoint::Branch),
                Some(ConnectionPoint::Incoming),
            ),
        );
        nodes.push(node);
    }

    graph.add_nodes(nodes);
    graph.add_edges(edges);
    graph.update_node(event_id, NodePatch::new().predictions_generated(true));
    debug!(parent = %event_id, group = %group, "generated prediction group");

    Some(group)
}

/// Promote the accepted prediction into a permanent event node.
///
/// The losing siblings and every edge touching them go in the same
/// transaction. The promoted node takes a fresh id carrying the accepted
/// content and age, losing the prediction-only fields and gaining the
/// event's branch capability; the parent edge is retargeted to it before
/// the original prediction record is deleted. A missing parent edge is a
/// recoverable anomaly: promotion still proceeds, just without the
/// rewrite.
pub fn accept_prediction(
    graph: &mut TimelineGraph,
    alloc: &mut IdAllocator,
    accepted_id: &NodeId,
) -> Option<PromotionOutcome> {
    let accepted = graph.node(accepted_id)?;
    if accepted.kind != NodeKind::Prediction {
        return None;
    }
    let group = accepted.prediction_group.clone()?;
    let position = accepted.position;
    let age = accepted.age;
    let content = accepted.content.clone();

    let losers: Vec<NodeId> = graph
        .group_members(&group)
        .into_iter()
        .filter(|member| member.id != *accepted_id)
        .map(|member| member.id.clone())
        .collect();

    let had_parent_edge = graph.parent_edge_of(accepted_id).is_some();
    graph.remove_nodes(&losers);

    let promoted_id = alloc.promoted_event_id();
    let promoted = LifeNode::new(
        promoted_id.clone(),
        NodeKind::Event,
        position,
        age,
        content,
    );
    graph.add_nodes([promoted]);

    if had_parent_edge {
        graph.retarget_edges(accepted_id, &promoted_id);
    } else {
        debug!(prediction = %accepted_id, "no parent edge found, promoting without rewrite");
    }
    graph.remove_nodes(&[accepted_id.clone()]);
    debug!(group = %group, promoted = %promoted_id, "resolved prediction group");

    let mut removed = losers;
    removed.push(accepted_id.clone());
    Some(PromotionOutcome {
        promoted: promoted_id,
        removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::EdgeId;

    fn event(id: &str, x: f32, y: f32, age: i32) -> LifeNode {
        LifeNode::new(
            NodeId::new(id),
            NodeKind::Event,
            Position::new(x, y),
            age,
            "An unexpected opportunity",
        )
    }

    fn branched_graph() -> (TimelineGraph, IdAllocator, NodeId, GroupId) {
        let mut graph = TimelineGraph::new();
        let mut alloc = IdAllocator::new();
        let config = SimulationConfig::default();

        let parent = event("event-0", 500.0, 200.0, 42);
        let parent_id = parent.id.clone();
        graph.add_nodes([parent]);

        let group = generate_predictions(&mut graph, &mut alloc, &config, &parent_id).unwrap();
        (graph, alloc, parent_id, group)
    }

    #[test]
    fn test_fan_geometry_and_inherited_age() {
        let (graph, _, _, group) = branched_graph();
        let config = SimulationConfig::default();

        let mut members = graph.group_members(&group);
        members.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        assert_eq!(members.len(), PREDICTION_FAN);

        let xs: Vec<f32> = members.iter().map(|n| n.position.x).collect();
        assert_eq!(xs, vec![250.0, 500.0, 750.0]);

        for member in &members {
            assert_eq!(member.age, 42);
            assert!(member.position.y > 200.0);
        }
        // Even fan indices drop further than the middle one.
        assert_eq!(
            members[0].position.y,
            200.0 + config.branch_drop + config.branch_jitter
        );
        assert_eq!(members[1].position.y, 200.0 + config.branch_drop);
    }

    #[test]
    fn test_first_member_is_primary() {
        let (graph, _, _, group) = branched_graph();

        let mut members = graph.group_members(&group);
        members.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));

        assert!(members[0].is_primary);
        assert!(!members[1].is_primary);
        assert!(!members[2].is_primary);
    }

    #[test]
    fn test_branch_edges_use_named_ports() {
        let (graph, _, parent_id, group) = branched_graph();

        for member in graph.group_members(&group) {
            let edge = graph.parent_edge_of(&member.id).unwrap();
            assert_eq!(edge.source, parent_id);
            assert_eq!(edge.source_point, Some(ConnectionPoint::Branch));
            assert_eq!(edge.target_point, Some(ConnectionPoint::Incoming));
        }
    }

    #[test]
    fn test_generation_is_idempotent() {
        let (mut graph, mut alloc, parent_id, group) = branched_graph();
        let config = SimulationConfig::default();

        let second = generate_predictions(&mut graph, &mut alloc, &config, &parent_id);

        assert!(second.is_none());
        assert_eq!(graph.group_members(&group).len(), PREDICTION_FAN);
        let predictions = graph.find_nodes(|n| n.kind == NodeKind::Prediction);
        assert_eq!(predictions.len(), PREDICTION_FAN);
    }

    #[test]
    fn test_generation_requires_an_event() {
        let mut graph = TimelineGraph::new();
        let mut alloc = IdAllocator::new();
        let config = SimulationConfig::default();

        let milestone = LifeNode::new(
            NodeId::new("milestone-1"),
            NodeKind::Milestone,
            Position::default(),
            30,
            "Age 30: Get promoted to team lead",
        );
        graph.add_nodes([milestone]);

        let result =
            generate_predictions(&mut graph, &mut alloc, &config, &NodeId::new("milestone-1"));
        assert!(result.is_none());
    }

    #[test]
    fn test_resolution_keeps_exactly_one_survivor() {
        let mut graph = TimelineGraph::new();
        let mut alloc = IdAllocator::new();
        let group = GroupId::new("7");

        graph.add_nodes([event("event-parent", 400.0, 100.0, 50)]);
        for index in 1..=3 {
            let id = NodeId::new(format!("prediction-7-{}", index));
            graph.add_nodes([LifeNode::new(
                id.clone(),
                NodeKind::Prediction,
                Position::new(400.0 + index as f32, 300.0),
                50,
                format!("Outcome {}", index),
            )
            .with_group(group.clone())]);
            graph.add_edges([Edge::new(
                EdgeId::new(format!("edge-{}", index)),
                NodeId::new("event-parent"),
                id,
            )
            .with_points(
                Some(ConnectionPoint::Branch),
                Some(ConnectionPoint::Incoming),
            )]);
        }

        let outcome =
            accept_prediction(&mut graph, &mut alloc, &NodeId::new("prediction-7-2")).unwrap();

        assert!(!graph.contains(&NodeId::new("prediction-7-1")));
        assert!(!graph.contains(&NodeId::new("prediction-7-3")));
        assert!(!graph.contains(&NodeId::new("prediction-7-2")));
        assert!(graph.group_members(&group).is_empty());

        let promoted = graph.node(&outcome.promoted).unwrap();
        assert_eq!(promoted.kind, NodeKind::Event);
        assert_eq!(promoted.content, "Outcome 2");
        assert_eq!(promoted.age, 50);
        assert!(promoted.prediction_group.is_none());
        assert!(!promoted.is_primary);
        assert!(!promoted.predictions_generated);

        // The parent edge now targets the promoted id.
        let parent_edge = graph.parent_edge_of(&outcome.promoted).unwrap();
        assert_eq!(parent_edge.source, NodeId::new("event-parent"));
        assert_eq!(graph.edge_count(), 1);
        assert!(!graph.has_dangling_edges());
    }

    #[test]
    fn test_resolution_reports_all_retired_records() {
        let (mut graph, mut alloc, _, group) = branched_graph();
        let accepted = NodeId::new(format!("prediction-{}-2", group));

        let outcome = accept_prediction(&mut graph, &mut alloc, &accepted).unwrap();

        assert_eq!(outcome.removed.len(), PREDICTION_FAN);
        assert!(outcome.removed.contains(&accepted));
    }

    #[test]
    fn test_resolution_survives_missing_parent_edge() {
        let mut graph = TimelineGraph::new();
        let mut alloc = IdAllocator::new();
        let group = GroupId::new("9");

        // An orphan group with no parent edge at all.
        graph.add_nodes([LifeNode::new(
            NodeId::new("prediction-9-1"),
            NodeKind::Prediction,
            Position::default(),
            61,
            "It goes better than anyone expected",
        )
        .with_group(group.clone())]);

        let outcome =
            accept_prediction(&mut graph, &mut alloc, &NodeId::new("prediction-9-1")).unwrap();

        let promoted = graph.node(&outcome.promoted).unwrap();
        assert_eq!(promoted.content, "It goes better than anyone expected");
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.has_dangling_edges());
    }

    #[test]
    fn test_resolving_a_non_prediction_is_a_noop() {
        let mut graph = TimelineGraph::new();
        let mut alloc = IdAllocator::new();
        graph.add_nodes([event("event-1", 0.0, 0.0, 30)]);

        let outcome = accept_prediction(&mut graph, &mut alloc, &NodeId::new("event-1"));
        assert!(outcome.is_none());
        assert!(graph.contains(&NodeId::new("event-1")));
    }
}
