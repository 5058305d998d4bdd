//! The engine facade - every mutation path funnels through here.
//!
//! [`LifeEngine`] owns the graph store, the identity allocator, the age
//! axis, the offer scheduler, and the in-flight generation queue. The
//! render surface calls these methods with user intents and observes the
//! result through [`LifeEngine::snapshot`]; between any two calls the
//! graph is in a consistent state.

mod axis;
mod ids;
mod pending;

pub use axis::*;
pub use ids::*;
pub use pending::*;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use life_rules::{
    apply_acceptance, LifeProfile, ProgressionDelta, SetupError, SetupInput, SimulationConfig,
};

use crate::branching;
use crate::generate::{build_context, GenerateError, GenerationCategory, TextSource};
use crate::graph::{
    ConnectionPoint, Edge, EdgeId, GroupId, LifeNode, NodeId, NodeKind, NodePatch, Position,
    TimelineGraph,
};
use crate::milestones;
use crate::offers::{Offer, OfferScheduler};

/// Everything a host needs to run one suspended generation call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub ticket: GenerationTicket,
    pub node: NodeId,
    pub category: GenerationCategory,
    pub context: String,
}

/// A consistent view handed to the render surface.
///
/// Nodes are ordered by id so repeated snapshots of the same graph
/// serialize identically.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<LifeNode>,
    pub edges: Vec<Edge>,
    pub profile: LifeProfile,
    pub axis: AgeAxis,
}

impl GraphSnapshot {
    /// Serialize the snapshot for transport to the render surface.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// The life-path graph engine.
#[derive(Debug)]
pub struct LifeEngine {
    graph: TimelineGraph,
    alloc: IdAllocator,
    axis: AgeAxis,
    config: SimulationConfig,
    profile: LifeProfile,
    scheduler: OfferScheduler,
    pending: PendingOps,
    start_id: NodeId,
    death_id: NodeId,
}

impl LifeEngine {
    /// Validate the setup and seed the timeline.
    ///
    /// Creates the start and death anchors, populates the milestone span,
    /// and arms the offer scheduler. Invalid setup never reaches the
    /// store.
    pub fn seed(
        setup: &SetupInput,
        config: SimulationConfig,
        now_ms: u64,
    ) -> Result<Self, SetupError> {
        setup.validate()?;

        let mut alloc = IdAllocator::new();
        let axis = AgeAxis::new(config.start_x, config.end_x, setup.start_age, setup.end_age());

        let start = LifeNode::new(
            alloc.node_id(NodeKind::Start),
            NodeKind::Start,
            Position::new(config.start_x, config.base_y),
            setup.start_age,
            setup.start_context.clone(),
        );
        let death = LifeNode::new(
            alloc.node_id(NodeKind::Death),
            NodeKind::Death,
            Position::new(config.end_x, config.base_y),
            setup.end_age(),
            setup.end_context.clone(),
        );
        let start_id = start.id.clone();
        let death_id = death.id.clone();

        let span = milestones::seed_milestones(&start_id, &death_id, &axis, &config, &mut alloc);

        let mut graph = TimelineGraph::new();
        graph.add_nodes([start, death]);
        graph.add_nodes(span.nodes);
        graph.add_edges(span.edges);

        let scheduler = OfferScheduler::start(&config, now_ms);
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "timeline seeded"
        );

        Ok(Self {
            graph,
            alloc,
            axis,
            config,
            profile: LifeProfile::new(),
            scheduler,
            pending: PendingOps::new(),
            start_id,
            death_id,
        })
    }

    pub fn graph(&self) -> &TimelineGraph {
        &self.graph
    }

    pub fn profile(&self) -> &LifeProfile {
        &self.profile
    }

    pub fn axis(&self) -> &AgeAxis {
        &self.axis
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn start_id(&self) -> &NodeId {
        &self.start_id
    }

    pub fn death_id(&self) -> &NodeId {
        &self.death_id
    }

    /// Advance the offer deadlines to `now_ms`.
    pub fn tick(&mut self, now_ms: u64, rng: &mut impl Rng) {
        self.scheduler.tick(now_ms, rng);
    }

    /// The currently pending random offer, if any.
    pub fn pending_offer(&self) -> Option<&Offer> {
        self.scheduler.pending_offer()
    }

    /// Accept the pending offer, materializing it as an event node at a
    /// random position inside the configured region.
    pub fn accept_offer(&mut self, now_ms: u64, rng: &mut impl Rng) -> Option<NodeId> {
        let offer = self.scheduler.accept(now_ms)?;

        let region = self.config.offer_region;
        let x = sample_coordinate(region.min_x, region.max_x, rng);
        let y = sample_coordinate(region.min_y, region.max_y, rng);
        let age = age_at(x, &self.axis);

        let id = self.alloc.node_id(NodeKind::Event);
        let node = LifeNode::new(
            id.clone(),
            NodeKind::Event,
            Position::new(x, y),
            age,
            offer.text,
        );
        self.graph.add_nodes([node]);
        debug!(node = %id, age, "offer materialized");
        Some(id)
    }

    /// Dismiss the pending offer. No graph mutation occurs.
    pub fn dismiss_offer(&mut self) -> bool {
        self.scheduler.dismiss()
    }

    /// Menu-driven placement of a node at a position.
    ///
    /// Only milestones and events can be placed directly; the anchors are
    /// unique and predictions only come from branching. The age is
    /// derived from the position without clamping, so extrapolated ages
    /// are allowed.
    pub fn place_node(
        &mut self,
        kind: NodeKind,
        position: Position,
        content: impl Into<String>,
    ) -> Option<NodeId> {
        if !matches!(kind, NodeKind::Milestone | NodeKind::Event) {
            return None;
        }
        let age = age_at(position.x, &self.axis);
        let id = self.alloc.node_id(kind);
        let node = LifeNode::new(id.clone(), kind, position, age, content);
        self.graph.add_nodes([node]);
        debug!(node = %id, age, "node placed");
        Some(id)
    }

    /// Connect two live nodes.
    pub fn connect(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        source_point: Option<ConnectionPoint>,
        target_point: Option<ConnectionPoint>,
    ) -> Option<EdgeId> {
        if source == target || !self.graph.contains(source) || !self.graph.contains(target) {
            return None;
        }
        let id = self.alloc.edge_id();
        let edge = Edge::new(id.clone(), source.clone(), target.clone())
            .with_points(source_point, target_point);
        self.graph.add_edges([edge]);
        Some(id)
    }

    /// Drag-retime: move a node and re-derive its age, clamped to
    /// [0, 99].
    pub fn retime(&mut self, id: &NodeId, position: Position) -> bool {
        let age = clamped_age_at(position.x, &self.axis);
        self.graph
            .update_node(id, NodePatch::new().position(position).age(age))
    }

    /// Accept a milestone. One-way; strips re-roll and triggers
    /// progression.
    pub fn accept_milestone(
        &mut self,
        id: &NodeId,
        rng: &mut impl Rng,
    ) -> Option<ProgressionDelta> {
        let node = self.graph.node(id)?;
        if node.kind != NodeKind::Milestone || node.is_accepted {
            return None;
        }
        self.graph
            .update_node(id, NodePatch::new().accepted(true).loading(false));
        debug!(node = %id, "milestone accepted");
        Some(apply_acceptance(
            &mut self.profile,
            self.config.skill_gain_chance,
            rng,
        ))
    }

    /// Begin a content re-roll on a milestone or prediction.
    ///
    /// Sets `is_loading` synchronously and hands back the ticket plus the
    /// assembled context for the backend. Accepted, already-loading, and
    /// missing nodes are a no-op.
    pub fn begin_shuffle(&mut self, id: &NodeId) -> Option<GenerationRequest> {
        let node = self.graph.node(id)?;
        let category = match node.kind {
            NodeKind::Milestone => GenerationCategory::Milestone,
            NodeKind::Prediction => GenerationCategory::Prediction,
            _ => return None,
        };
        if !node.can_shuffle() || self.pending.is_inflight(id) {
            return None;
        }

        let context = build_context(node, &self.graph, &self.profile);
        self.graph.update_node(id, NodePatch::new().loading(true));
        let ticket = self.pending.begin(id.clone(), category, context.clone());
        debug!(node = %id, %ticket, "shuffle started");

        Some(GenerationRequest {
            ticket,
            node: id.clone(),
            category,
            context,
        })
    }

    /// Complete a re-roll.
    ///
    /// Failure or unusable output leaves the prior content and clears the
    /// loading flag; a node removed or accepted while the call was in
    /// flight makes this a harmless no-op rather than a resurrection.
    pub fn resolve_generation(
        &mut self,
        ticket: GenerationTicket,
        outcome: Result<String, GenerateError>,
    ) -> bool {
        let Some(op) = self.pending.resolve(ticket) else {
            debug!(%ticket, "resolution of unknown ticket ignored");
            return false;
        };

        let accepted_meanwhile = self
            .graph
            .node(&op.node)
            .map(|node| node.is_accepted)
            .unwrap_or(false);

        let patch = match outcome {
            Ok(text) if !text.trim().is_empty() && !accepted_meanwhile => {
                NodePatch::new().loading(false).content(text)
            }
            result => {
                if let Err(error) = result {
                    debug!(node = %op.node, %error, "generation failed, keeping prior content");
                }
                NodePatch::new().loading(false)
            }
        };
        self.graph.update_node(&op.node, patch)
    }

    /// Run a full re-roll against a synchronous source.
    pub fn shuffle_with<S: TextSource>(&mut self, id: &NodeId, source: &mut S) -> bool {
        let Some(request) = self.begin_shuffle(id) else {
            return false;
        };
        let outcome = source.generate(&request.context, request.category);
        self.resolve_generation(request.ticket, outcome)
    }

    /// Fan an event into its prediction group. Idempotent per event.
    pub fn generate_predictions(&mut self, id: &NodeId) -> Option<GroupId> {
        branching::generate_predictions(&mut self.graph, &mut self.alloc, &self.config, id)
    }

    /// Accept a prediction: resolve its group, promote the content, and
    /// trigger progression. In-flight generation targeting any retired
    /// record is invalidated.
    pub fn accept_prediction(
        &mut self,
        id: &NodeId,
        rng: &mut impl Rng,
    ) -> Option<(NodeId, ProgressionDelta)> {
        let outcome = branching::accept_prediction(&mut self.graph, &mut self.alloc, id)?;
        self.pending.invalidate_nodes(&outcome.removed);

        let delta = apply_acceptance(&mut self.profile, self.config.skill_gain_chance, rng);
        Some((outcome.promoted, delta))
    }

    /// Cancel timers and in-flight bookkeeping. The graph itself stays,
    /// with no node left in a loading state.
    pub fn teardown(&mut self) {
        self.scheduler.teardown();
        self.pending.clear();

        let loading: Vec<NodeId> = self
            .graph
            .find_nodes(|node| node.is_loading)
            .into_iter()
            .map(|node| node.id.clone())
            .collect();
        for id in loading {
            self.graph.update_node(&id, NodePatch::new().loading(false));
        }
        info!("engine torn down");
    }

    /// A consistent snapshot for the render surface.
    pub fn snapshot(&self) -> GraphSnapshot {
        let mut nodes: Vec<LifeNode> = self.graph.nodes().cloned().collect();
        nodes.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));

        GraphSnapshot {
            nodes,
            edges: self.graph.edges().to_vec(),
            profile: self.profile.clone(),
            axis: self.axis,
        }
    }
}

fn sample_coordinate(min: f32, max: f32, rng: &mut impl Rng) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::PoolTextSource;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct FailingSource;

    impl TextSource for FailingSource {
        fn generate(
            &mut self,
            _context: &str,
            _category: GenerationCategory,
        ) -> Result<String, GenerateError> {
            Err(GenerateError::Backend("connection reset".to_string()))
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(21)
    }

    fn engine() -> LifeEngine {
        let setup = SetupInput::new("Born in a small coastal town", "Dies at sea", 20, 60);
        LifeEngine::seed(&setup, SimulationConfig::default(), 0).unwrap()
    }

    fn first_milestone(engine: &LifeEngine) -> NodeId {
        let mut milestones = engine.graph().find_nodes(|n| n.kind == NodeKind::Milestone);
        milestones.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        milestones[0].id.clone()
    }

    #[test]
    fn test_seed_creates_anchors_and_milestones() {
        let engine = engine();
        let graph = engine.graph();

        assert_eq!(graph.node_count(), 7);
        assert_eq!(graph.edge_count(), 6);
        assert_eq!(graph.find_nodes(|n| n.kind == NodeKind::Start).len(), 1);
        assert_eq!(graph.find_nodes(|n| n.kind == NodeKind::Death).len(), 1);

        let start = graph.node(engine.start_id()).unwrap();
        let death = graph.node(engine.death_id()).unwrap();
        assert_eq!(start.age, 20);
        assert_eq!(death.age, 80);
        assert!(!graph.has_dangling_edges());
    }

    #[test]
    fn test_seed_rejects_invalid_setup() {
        let setup = SetupInput::new("", "Dies at sea", 20, 60);
        let result = LifeEngine::seed(&setup, SimulationConfig::default(), 0);
        assert!(matches!(result, Err(SetupError::EmptyStartContext)));
    }

    #[test]
    fn test_retime_reclamps_age() {
        let mut engine = engine();
        let id = first_milestone(&engine);

        assert!(engine.retime(&id, Position::new(5_000.0, 100.0)));
        assert_eq!(engine.graph().node(&id).unwrap().age, 99);

        assert!(engine.retime(&id, Position::new(-5_000.0, 100.0)));
        assert_eq!(engine.graph().node(&id).unwrap().age, 0);

        assert!(engine.retime(&id, Position::new(600.0, 100.0)));
        let node = engine.graph().node(&id).unwrap();
        assert_eq!(node.age, 50);
        assert_eq!(node.position.x, 600.0);
    }

    #[test]
    fn test_place_node_derives_unclamped_age() {
        let mut engine = engine();

        let id = engine
            .place_node(NodeKind::Event, Position::new(600.0, 250.0), "A wild detour")
            .unwrap();
        assert_eq!(engine.graph().node(&id).unwrap().age, 50);

        // Placement beyond the anchors extrapolates rather than clamps.
        let far = engine
            .place_node(NodeKind::Event, Position::new(1_600.0, 250.0), "Late chapter")
            .unwrap();
        assert_eq!(engine.graph().node(&far).unwrap().age, 110);

        assert!(engine
            .place_node(NodeKind::Start, Position::default(), "another birth")
            .is_none());
        assert!(engine
            .place_node(NodeKind::Prediction, Position::default(), "loose guess")
            .is_none());
    }

    #[test]
    fn test_connect_validates_endpoints() {
        let mut engine = engine();
        let event = engine
            .place_node(NodeKind::Event, Position::new(400.0, 250.0), "A detour")
            .unwrap();
        let death = engine.death_id().clone();

        let edge = engine.connect(&event, &death, Some(ConnectionPoint::Forward), None);
        assert!(edge.is_some());

        assert!(engine
            .connect(&event, &NodeId::new("missing"), None, None)
            .is_none());
        assert!(engine.connect(&event, &event, None, None).is_none());
    }

    #[test]
    fn test_offer_lifecycle_materializes_event() {
        let mut engine = engine();
        let mut rng = rng();

        engine.tick(5_000, &mut rng);
        assert!(engine.pending_offer().is_some());

        let before = engine.graph().node_count();
        let id = engine.accept_offer(6_000, &mut rng).unwrap();
        let node = engine.graph().node(&id).unwrap();

        assert_eq!(engine.graph().node_count(), before + 1);
        assert_eq!(node.kind, NodeKind::Event);
        // Placement region spans x in [200, 1000], so the derived age
        // lands inside [26, 74].
        assert!(node.age >= 26 && node.age <= 74);
        assert!(engine.pending_offer().is_none());
    }

    #[test]
    fn test_expired_offer_leaves_graph_untouched() {
        let mut engine = engine();
        let mut rng = rng();
        let before = engine.graph().node_count();

        engine.tick(5_000, &mut rng);
        engine.tick(15_000, &mut rng);

        assert!(engine.pending_offer().is_none());
        assert_eq!(engine.graph().node_count(), before);
        assert!(engine.accept_offer(16_000, &mut rng).is_none());
    }

    #[test]
    fn test_accept_milestone_is_one_way() {
        let mut engine = engine();
        let mut rng = rng();
        let id = first_milestone(&engine);

        let delta = engine.accept_milestone(&id, &mut rng).unwrap();
        assert!(delta.luck < 5 && delta.intelligence < 5 && delta.rizz < 5 && delta.ambition < 5);
        assert!(engine.graph().node(&id).unwrap().is_accepted);

        assert!(engine.accept_milestone(&id, &mut rng).is_none());
        assert!(engine.begin_shuffle(&id).is_none());
    }

    #[test]
    fn test_shuffle_success_replaces_content_only() {
        let mut engine = engine();
        let id = first_milestone(&engine);
        let age_before = engine.graph().node(&id).unwrap().age;

        let request = engine.begin_shuffle(&id).unwrap();
        assert!(engine.graph().node(&id).unwrap().is_loading);
        assert!(request.context.contains("Life So Far"));

        let resolved =
            engine.resolve_generation(request.ticket, Ok("Inherit a lighthouse".to_string()));
        assert!(resolved);

        let node = engine.graph().node(&id).unwrap();
        assert_eq!(node.content, "Inherit a lighthouse");
        assert!(!node.is_loading);
        assert_eq!(node.age, age_before);
    }

    #[test]
    fn test_failed_shuffle_keeps_prior_content() {
        let mut engine = engine();
        let id = first_milestone(&engine);
        let content_before = engine.graph().node(&id).unwrap().content.clone();

        assert!(!engine.shuffle_with(&id, &mut FailingSource));

        let node = engine.graph().node(&id).unwrap();
        assert_eq!(node.content, content_before);
        assert!(!node.is_loading);
    }

    #[test]
    fn test_empty_output_counts_as_failure() {
        let mut engine = engine();
        let id = first_milestone(&engine);
        let content_before = engine.graph().node(&id).unwrap().content.clone();

        let request = engine.begin_shuffle(&id).unwrap();
        engine.resolve_generation(request.ticket, Ok("   ".to_string()));

        let node = engine.graph().node(&id).unwrap();
        assert_eq!(node.content, content_before);
        assert!(!node.is_loading);
    }

    #[test]
    fn test_shuffle_with_pool_source() {
        let mut engine = engine();
        let id = first_milestone(&engine);
        let mut source = PoolTextSource::new(StdRng::seed_from_u64(2));

        assert!(engine.shuffle_with(&id, &mut source));
        assert!(!engine.graph().node(&id).unwrap().is_loading);
    }

    #[test]
    fn test_double_shuffle_on_same_node_is_refused() {
        let mut engine = engine();
        let id = first_milestone(&engine);

        let first = engine.begin_shuffle(&id);
        assert!(first.is_some());
        assert!(engine.begin_shuffle(&id).is_none());
    }

    #[test]
    fn test_branching_is_idempotent_through_the_engine() {
        let mut engine = engine();
        let event = engine
            .place_node(NodeKind::Event, Position::new(500.0, 250.0), "A crossroads")
            .unwrap();

        let group = engine.generate_predictions(&event);
        assert!(group.is_some());
        assert!(engine.generate_predictions(&event).is_none());

        let predictions = engine
            .graph()
            .find_nodes(|n| n.kind == NodeKind::Prediction);
        assert_eq!(predictions.len(), 3);
    }

    #[test]
    fn test_accept_prediction_promotes_and_progresses() {
        let mut engine = engine();
        let mut rng = rng();
        let event = engine
            .place_node(NodeKind::Event, Position::new(500.0, 250.0), "A crossroads")
            .unwrap();
        let group = engine.generate_predictions(&event).unwrap();

        let accepted = NodeId::new(format!("prediction-{}-2", group));
        let skills_before = engine.profile().skills.len();
        let (promoted, _delta) = engine.accept_prediction(&accepted, &mut rng).unwrap();

        let graph = engine.graph();
        assert!(graph.contains(&promoted));
        assert!(graph.group_members(&group).is_empty());
        assert!(!graph.has_dangling_edges());
        assert!(engine.profile().skills.len() >= skills_before);
    }

    #[test]
    fn test_removal_mid_flight_invalidates_the_completion() {
        let mut engine = engine();
        let mut rng = rng();
        let event = engine
            .place_node(NodeKind::Event, Position::new(500.0, 250.0), "A crossroads")
            .unwrap();
        let group = engine.generate_predictions(&event).unwrap();

        let shuffled = NodeId::new(format!("prediction-{}-3", group));
        let request = engine.begin_shuffle(&shuffled).unwrap();

        // Accepting a sibling removes the shuffled node while its
        // generation call is still in flight.
        let accepted = NodeId::new(format!("prediction-{}-1", group));
        engine.accept_prediction(&accepted, &mut rng).unwrap();
        assert!(!engine.graph().contains(&shuffled));

        let resolved =
            engine.resolve_generation(request.ticket, Ok("Too late to matter".to_string()));
        assert!(!resolved);
        assert!(!engine.graph().contains(&shuffled));
        assert!(!engine.graph().has_dangling_edges());
    }

    #[test]
    fn test_acceptance_mid_flight_keeps_accepted_content() {
        let mut engine = engine();
        let mut rng = rng();
        let id = first_milestone(&engine);
        let request = engine.begin_shuffle(&id).unwrap();

        let content_before = engine.graph().node(&id).unwrap().content.clone();
        engine.accept_milestone(&id, &mut rng).unwrap();

        engine.resolve_generation(request.ticket, Ok("Stale rewrite".to_string()));

        let node = engine.graph().node(&id).unwrap();
        assert_eq!(node.content, content_before);
        assert!(!node.is_loading);
        assert!(node.is_accepted);
    }

    #[test]
    fn test_snapshot_is_stably_ordered_json() {
        let engine = engine();
        let snapshot = engine.snapshot();

        assert_eq!(snapshot.nodes.len(), 7);
        let ids: Vec<&str> = snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("start-1"));
        assert!(json.contains("death-2"));
    }

    #[test]
    fn test_teardown_cancels_timers_and_pending_work() {
        let mut engine = engine();
        let mut rng = rng();
        let id = first_milestone(&engine);

        engine.tick(5_000, &mut rng);
        let request = engine.begin_shuffle(&id).unwrap();
        engine.teardown();

        assert!(engine.pending_offer().is_none());
        engine.tick(60_000, &mut rng);
        assert!(engine.pending_offer().is_none());
        assert!(!engine.graph().node(&id).unwrap().is_loading);
        assert!(!engine.resolve_generation(request.ticket, Ok("late".to_string())));
    }
}
