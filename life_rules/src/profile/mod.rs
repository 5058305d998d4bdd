//! Profile definitions - the simulated person's stats and skills.

use serde::{Deserialize, Serialize};

/// Upper bound for every stat counter.
pub const STAT_MAX: u8 = 100;

/// Upper bound for skill levels.
pub const SKILL_MAX: u8 = 10;

/// Bounded stat counters for the simulated person.
///
/// Every stat lives in [0, 100]; increments past the cap saturate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub luck: u8,
    pub intelligence: u8,
    pub rizz: u8,
    pub ambition: u8,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            luck: 10,
            intelligence: 10,
            rizz: 10,
            ambition: 10,
        }
    }
}

/// The four stat axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Luck,
    Intelligence,
    Rizz,
    Ambition,
}

impl StatKind {
    /// All stat kinds in display order.
    pub const ALL: [StatKind; 4] = [
        StatKind::Luck,
        StatKind::Intelligence,
        StatKind::Rizz,
        StatKind::Ambition,
    ];
}

impl Stats {
    /// Get the current value of a stat.
    pub fn get(&self, kind: StatKind) -> u8 {
        match kind {
            StatKind::Luck => self.luck,
            StatKind::Intelligence => self.intelligence,
            StatKind::Rizz => self.rizz,
            StatKind::Ambition => self.ambition,
        }
    }

    /// Raise a stat by `amount`, saturating at [`STAT_MAX`].
    ///
    /// Returns the new value.
    pub fn raise(&mut self, kind: StatKind, amount: u8) -> u8 {
        let slot = match kind {
            StatKind::Luck => &mut self.luck,
            StatKind::Intelligence => &mut self.intelligence,
            StatKind::Rizz => &mut self.rizz,
            StatKind::Ambition => &mut self.ambition,
        };
        *slot = slot.saturating_add(amount).min(STAT_MAX);
        *slot
    }
}

/// A named skill with a level in [1, 10].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub level: u8,
}

impl Skill {
    /// Create a new skill at level 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: 1,
        }
    }
}

/// The simulated person: stats plus acquired skills.
///
/// Skills are unique by name; acquiring a skill the profile already has
/// raises its level instead of adding a duplicate entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LifeProfile {
    pub stats: Stats,
    pub skills: Vec<Skill>,
}

impl LifeProfile {
    /// Create a new profile with default stats and no skills.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a skill by name.
    pub fn skill(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.name == name)
    }

    /// Check whether the profile has a skill.
    pub fn has_skill(&self, name: &str) -> bool {
        self.skill(name).is_some()
    }

    /// Acquire or improve a skill, saturating at [`SKILL_MAX`].
    ///
    /// Returns the skill's level after the touch.
    pub fn raise_skill(&mut self, name: &str) -> u8 {
        if let Some(skill) = self.skills.iter_mut().find(|s| s.name == name) {
            skill.level = skill.level.saturating_add(1).min(SKILL_MAX);
            skill.level
        } else {
            self.skills.push(Skill::new(name));
            1
        }
    }
}
