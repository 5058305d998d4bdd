//! # Lifeline Core
//!
//! The life-path graph engine. This crate interfaces with `life_rules`,
//! holds the branching timeline graph, and translates user intents and
//! timed offers into atomic graph transactions.
//!
//! ## Core Components
//!
//! - **graph**: canonical node map and ordered edge list with
//!   transaction-shaped mutations
//! - **milestones**: seeds the span between the anchors
//! - **branching**: fans an event into a prediction group and promotes
//!   the accepted member
//! - **offers**: deadline-driven ephemeral event offers
//! - **generate**: the text-generation contract and its pool-backed
//!   fallback
//! - **engine**: the facade owning every mutation path
//!
//! ## Design Philosophy
//!
//! - **Transaction-shaped**: the render surface only ever observes consistent snapshots
//! - **Deterministic**: clocks and randomness are injected, never ambient
//! - **Recoverable**: generation failures and structural anomalies degrade to no-ops, never panics

pub mod branching;
pub mod engine;
pub mod generate;
pub mod graph;
pub mod milestones;
pub mod offers;

pub use branching::*;
pub use engine::*;
pub use generate::*;
pub use graph::*;
pub use milestones::*;
pub use offers::*;
