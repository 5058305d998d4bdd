//! Setup inputs and simulation configuration.
//!
//! Setup is validated before the timeline may be seeded: empty contexts
//! or an out-of-range horizon never reach the graph. The configuration
//! carries every tunable constant with built-in defaults, overridable
//! from a TOML document.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::progression::DEFAULT_SKILL_GAIN_CHANCE;

/// Shortest allowed time horizon, in years.
pub const MIN_HORIZON_YEARS: u32 = 40;

/// Longest allowed time horizon, in years.
pub const MAX_HORIZON_YEARS: u32 = 120;

/// Errors surfaced before the simulation may start.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("starting context must not be empty")]
    EmptyStartContext,

    #[error("terminal context must not be empty")]
    EmptyEndContext,

    #[error("starting age must be between 0 and 99, got {0}")]
    StartAgeOutOfRange(i32),

    #[error("time horizon must be between {MIN_HORIZON_YEARS} and {MAX_HORIZON_YEARS} years, got {0}")]
    HorizonOutOfRange(u32),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// User-provided inputs gating entry into the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupInput {
    /// Where the simulated life begins.
    pub start_context: String,
    /// Where it ends.
    pub end_context: String,
    pub start_age: i32,
    pub horizon_years: u32,
}

impl SetupInput {
    pub fn new(
        start_context: impl Into<String>,
        end_context: impl Into<String>,
        start_age: i32,
        horizon_years: u32,
    ) -> Self {
        Self {
            start_context: start_context.into(),
            end_context: end_context.into(),
            start_age,
            horizon_years,
        }
    }

    /// The terminal age implied by the horizon.
    pub fn end_age(&self) -> i32 {
        self.start_age + self.horizon_years as i32
    }

    /// Validate the inputs. Absence of a valid setup blocks seeding.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.start_context.trim().is_empty() {
            return Err(SetupError::EmptyStartContext);
        }
        if self.end_context.trim().is_empty() {
            return Err(SetupError::EmptyEndContext);
        }
        if !(0..=99).contains(&self.start_age) {
            return Err(SetupError::StartAgeOutOfRange(self.start_age));
        }
        if !(MIN_HORIZON_YEARS..=MAX_HORIZON_YEARS).contains(&self.horizon_years) {
            return Err(SetupError::HorizonOutOfRange(self.horizon_years));
        }
        Ok(())
    }
}

/// A bounded rectangle for randomized node placement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRegion {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl Default for PlacementRegion {
    fn default() -> Self {
        Self {
            min_x: 200.0,
            max_x: 1000.0,
            min_y: 420.0,
            max_y: 620.0,
        }
    }
}

/// Tunable constants for the engine.
///
/// Every field has a default; a partial TOML document overrides only the
/// fields it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// How many milestones seed the span between the anchors.
    pub milestone_count: u32,
    /// Widens the milestone span relative to the start-end distance.
    pub spacing_factor: f32,
    /// Horizontal position of the start anchor.
    pub start_x: f32,
    /// Horizontal position of the death anchor.
    pub end_x: f32,
    /// Baseline vertical position for anchors and milestones.
    pub base_y: f32,
    /// Amplitude of the milestone zig-zag.
    pub milestone_rise: f32,
    /// Horizontal fan offset between sibling predictions.
    pub branch_fan_offset: f32,
    /// Vertical drop of the prediction fan below its parent.
    pub branch_drop: f32,
    /// Extra drop applied to even fan indices.
    pub branch_jitter: f32,
    /// Delay before the first random offer, in milliseconds.
    pub first_offer_delay_ms: u64,
    /// Interval between random offers, in milliseconds.
    pub offer_interval_ms: u64,
    /// Lifetime of an untouched offer, in milliseconds.
    pub offer_auto_dismiss_ms: u64,
    /// Probability that an offer is sponsored.
    pub sponsored_offer_chance: f64,
    /// Probability that an acceptance touches a skill.
    pub skill_gain_chance: f64,
    /// Region accepted offers are placed into.
    pub offer_region: PlacementRegion,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            milestone_count: 5,
            spacing_factor: 1.5,
            start_x: 100.0,
            end_x: 1100.0,
            base_y: 300.0,
            milestone_rise: 120.0,
            branch_fan_offset: 250.0,
            branch_drop: 160.0,
            branch_jitter: 40.0,
            first_offer_delay_ms: 5_000,
            offer_interval_ms: 30_000,
            offer_auto_dismiss_ms: 10_000,
            sponsored_offer_chance: 0.2,
            skill_gain_chance: DEFAULT_SKILL_GAIN_CHANCE,
            offer_region: PlacementRegion::default(),
        }
    }
}

impl SimulationConfig {
    /// Parse configuration overrides from a TOML document.
    pub fn from_toml_str(document: &str) -> Result<Self, SetupError> {
        Ok(toml::from_str(document)?)
    }
}
