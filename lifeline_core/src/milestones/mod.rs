//! Milestone seeding - populating the span between the anchors.
//!
//! Each milestone moves pending -> loading -> pending on re-roll, or
//! pending -> accepted, which is terminal and strips re-roll; those
//! transitions are driven by the engine. This module owns the seeding
//! math: evenly stepped ages, a deliberately widened horizontal span,
//! and a zig-zag vertical layout for readability.

use tracing::debug;

use life_rules::SimulationConfig;

use crate::engine::{age_at, AgeAxis, IdAllocator};
use crate::generate::{CAREER_MILESTONES, RISK_MILESTONES};
use crate::graph::{Edge, LifeNode, NodeId, NodeKind, Position};

/// The seeded span: milestone nodes plus the forward chain joining the
/// anchors.
#[derive(Debug, Clone)]
pub struct SeededSpan {
    pub nodes: Vec<LifeNode>,
    pub edges: Vec<Edge>,
}

/// Seed `config.milestone_count` milestones between the anchors.
///
/// Ages step evenly between the anchor ages, derived through the age
/// mapper at the even fractions of the start-end span. Horizontal
/// placement is widened by the spacing factor and centered, so the
/// outermost milestones overshoot both anchors; vertical placement
/// alternates high and low by index parity. Content alternates between
/// the career and risk pools by the same parity, each entry prefixed
/// with its computed age.
pub fn seed_milestones(
    start_id: &NodeId,
    death_id: &NodeId,
    axis: &AgeAxis,
    config: &SimulationConfig,
    alloc: &mut IdAllocator,
) -> SeededSpan {
    let count = config.milestone_count;
    let base_span = axis.end_x - axis.start_x;
    let wide_span = base_span * config.spacing_factor;
    let placed_start = axis.start_x - (wide_span - base_span) / 2.0;

    let mut nodes = Vec::with_capacity(count as usize);
    let mut edges = Vec::with_capacity(count as usize + 1);
    let mut prev = start_id.clone();

    for i in 1..=count {
        // Age follows the even step between the anchors, not the widened
        // placement.
        let fraction = i as f32 / (count + 1) as f32;
        let age = age_at(axis.start_x + base_span * fraction, axis);

        let x = if count > 1 {
            placed_start + wide_span * (i - 1) as f32 / (count - 1) as f32
        } else {
            axis.start_x + base_span / 2.0
        };
        let y = if i % 2 == 1 {
            config.base_y - config.milestone_rise
        } else {
            config.base_y + config.milestone_rise
        };

        let pool: &[&str] = if i % 2 == 1 {
            &CAREER_MILESTONES
        } else {
            &RISK_MILESTONES
        };
        let entry = pool[((i - 1) / 2) as usize % pool.len()];
        let content = format!("Age {}: {}", age, entry);

        let node = LifeNode::new(
            alloc.node_id(NodeKind::Milestone),
            NodeKind::Milestone,
            Position::new(x, y),
            age,
            content,
        );
        edges.push(Edge::new(alloc.edge_id(), prev, node.id.clone()));
        prev = node.id.clone();
        nodes.push(node);
    }

    edges.push(Edge::new(alloc.edge_id(), prev, death_id.clone()));
    debug!(milestones = nodes.len(), "seeded milestone span");

    SeededSpan { nodes, edges }
}
