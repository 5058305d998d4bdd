//! Progression rules - stat and skill growth from acceptance actions.
//!
//! Accepting a milestone or a prediction grants each stat an independent
//! random increment in [0, 5), and with a configurable probability also
//! touches one skill drawn from a fixed pool. Progression is pure local
//! state derivation: it cannot fail and is never retried.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::profile::{LifeProfile, Skill, StatKind};

/// Fixed pool of skills a life can pick up.
pub const SKILL_POOL: [&str; 10] = [
    "Negotiation",
    "Cooking",
    "Public Speaking",
    "Coding",
    "Investing",
    "Networking",
    "Writing",
    "Guitar",
    "Chess",
    "Poker",
];

/// Default probability that an acceptance also touches a skill.
pub const DEFAULT_SKILL_GAIN_CHANCE: f64 = 0.3;

/// What a single acceptance changed on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionDelta {
    pub luck: u8,
    pub intelligence: u8,
    pub rizz: u8,
    pub ambition: u8,
    /// The skill touched, at its level after the touch.
    pub skill: Option<Skill>,
}

/// Apply the progression rules for one acceptance.
pub fn apply_acceptance(
    profile: &mut LifeProfile,
    skill_gain_chance: f64,
    rng: &mut impl Rng,
) -> ProgressionDelta {
    let mut gains = [0u8; 4];
    for (slot, kind) in gains.iter_mut().zip(StatKind::ALL) {
        *slot = rng.gen_range(0..5) as u8;
        profile.stats.raise(kind, *slot);
    }

    let skill = if rng.gen_bool(skill_gain_chance) {
        let name = SKILL_POOL[rng.gen_range(0..SKILL_POOL.len())];
        let level = profile.raise_skill(name);
        Some(Skill {
            name: name.to_string(),
            level,
        })
    } else {
        None
    };

    ProgressionDelta {
        luck: gains[0],
        intelligence: gains[1],
        rizz: gains[2],
        ambition: gains[3],
        skill,
    }
}
