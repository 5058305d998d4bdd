//! The text-generation contract and its pool-backed fallback.
//!
//! The engine treats content generation as an opaque, fallible
//! collaborator: a context string goes out, candidate text comes back,
//! and on failure the caller's prior content stands so the graph never
//! gets stuck loading. The pool-backed source here is the reference
//! implementation; any backend satisfying [`TextSource`] can replace it.

mod pools;

pub use pools::*;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use life_rules::LifeProfile;

use crate::graph::{LifeNode, TimelineGraph};

/// What a generation call is producing content for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenerationCategory {
    Milestone,
    Prediction,
}

/// Errors a generation backend may surface.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generation backend failed: {0}")]
    Backend(String),

    #[error("generation backend returned unusable output")]
    EmptyOutput,
}

/// A source of candidate life-event text.
///
/// Implementations may fail; callers treat the prior content as the
/// fallback.
pub trait TextSource {
    fn generate(
        &mut self,
        context: &str,
        category: GenerationCategory,
    ) -> Result<String, GenerateError>;
}

/// Pool-backed text source, drawing from the fixed pools.
pub struct PoolTextSource<R: Rng> {
    rng: R,
}

impl<R: Rng> PoolTextSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> TextSource for PoolTextSource<R> {
    fn generate(
        &mut self,
        _context: &str,
        category: GenerationCategory,
    ) -> Result<String, GenerateError> {
        let text = match category {
            GenerationCategory::Milestone => {
                if self.rng.gen_bool(0.5) {
                    CAREER_MILESTONES[self.rng.gen_range(0..CAREER_MILESTONES.len())]
                } else {
                    RISK_MILESTONES[self.rng.gen_range(0..RISK_MILESTONES.len())]
                }
            }
            GenerationCategory::Prediction => {
                OUTCOME_PHRASES[self.rng.gen_range(0..OUTCOME_PHRASES.len())]
            }
        };
        Ok(text.to_string())
    }
}

/// Assemble the context string handed to a generation backend.
///
/// Describes the life so far, the node being regenerated, and its
/// immediate graph neighborhood.
pub fn build_context(node: &LifeNode, graph: &TimelineGraph, profile: &LifeProfile) -> String {
    let mut context = String::new();

    context.push_str("## Life So Far\n");
    context.push_str(&format!(
        "Luck {}, Intelligence {}, Rizz {}, Ambition {}\n",
        profile.stats.luck, profile.stats.intelligence, profile.stats.rizz, profile.stats.ambition
    ));
    if !profile.skills.is_empty() {
        let skills: Vec<String> = profile
            .skills
            .iter()
            .map(|s| format!("{} (lv {})", s.name, s.level))
            .collect();
        context.push_str(&format!("Skills: {}\n", skills.join(", ")));
    }
    context.push('\n');

    context.push_str("## Current Node\n");
    context.push_str(&format!(
        "A {} at age {}: {}\n\n",
        node.kind, node.age, node.content
    ));

    let incoming: Vec<&str> = graph
        .edges()
        .iter()
        .filter(|edge| edge.target == node.id)
        .filter_map(|edge| graph.node(&edge.source))
        .map(|n| n.content.as_str())
        .collect();
    let outgoing: Vec<&str> = graph
        .edges()
        .iter()
        .filter(|edge| edge.source == node.id)
        .filter_map(|edge| graph.node(&edge.target))
        .map(|n| n.content.as_str())
        .collect();

    if !incoming.is_empty() || !outgoing.is_empty() {
        context.push_str("## Neighborhood\n");
        for content in incoming {
            context.push_str(&format!("Before: {}\n", content));
        }
        for content in outgoing {
            context.push_str(&format!("After: {}\n", content));
        }
    }

    context
}
