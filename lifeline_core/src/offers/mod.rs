//! Random event offers - time-driven ephemeral content.
//!
//! Offers are not graph nodes: the scheduler holds at most one pending
//! offer, each with its own auto-dismiss deadline. Accepting an offer
//! materializes it through the engine; dismissal and expiry leave the
//! graph untouched. All timing runs against injected `now_ms` values, so
//! every deadline is deterministically testable.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use life_rules::SimulationConfig;

use crate::generate::{GENERIC_OFFERS, SPONSORED_OFFERS};

/// Unique identifier for offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferId(pub Uuid);

impl OfferId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OfferId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OfferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ephemeral random-event proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub text: String,
    pub sponsored: bool,
    /// Absolute deadline for auto-dismissal.
    pub expires_at_ms: u64,
}

/// Deadline-driven scheduler for random event offers.
///
/// Armed once setup completes: the first offer comes due after the
/// configured delay, then one per interval. A newly emitted offer
/// supersedes any undismissed prior one, cancelling its deadline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferScheduler {
    next_offer_at_ms: Option<u64>,
    interval_ms: u64,
    auto_dismiss_ms: u64,
    sponsored_chance: f64,
    pending: Option<Offer>,
}

impl OfferScheduler {
    /// Arm the scheduler at `now_ms`.
    pub fn start(config: &SimulationConfig, now_ms: u64) -> Self {
        Self {
            next_offer_at_ms: Some(now_ms + config.first_offer_delay_ms),
            interval_ms: config.offer_interval_ms,
            auto_dismiss_ms: config.offer_auto_dismiss_ms,
            sponsored_chance: config.sponsored_offer_chance,
            pending: None,
        }
    }

    /// Advance to `now_ms`, expiring and emitting offers as deadlines
    /// pass.
    pub fn tick(&mut self, now_ms: u64, rng: &mut impl Rng) {
        let expired = matches!(&self.pending, Some(offer) if now_ms >= offer.expires_at_ms);
        if expired {
            if let Some(offer) = self.pending.take() {
                debug!(offer = %offer.id, "offer auto-dismissed");
            }
        }

        if let Some(due) = self.next_offer_at_ms {
            if now_ms >= due {
                let offer = self.draw_offer(now_ms, rng);
                debug!(offer = %offer.id, sponsored = offer.sponsored, "offer emitted");
                self.pending = Some(offer);
                self.next_offer_at_ms = Some(now_ms + self.interval_ms);
            }
        }
    }

    /// The currently pending offer, if any.
    pub fn pending_offer(&self) -> Option<&Offer> {
        self.pending.as_ref()
    }

    /// Take the pending offer for acceptance, cancelling its deadline.
    ///
    /// An offer whose deadline already passed cannot be accepted; it is
    /// cleared instead.
    pub fn accept(&mut self, now_ms: u64) -> Option<Offer> {
        match self.pending.take() {
            Some(offer) if now_ms < offer.expires_at_ms => Some(offer),
            Some(offer) => {
                debug!(offer = %offer.id, "acceptance after expiry ignored");
                None
            }
            None => None,
        }
    }

    /// Clear the pending offer, cancelling its deadline. No graph
    /// mutation happens here.
    pub fn dismiss(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Cancel every deadline. Used when leaving the simulation view.
    pub fn teardown(&mut self) {
        self.pending = None;
        self.next_offer_at_ms = None;
    }

    fn draw_offer(&self, now_ms: u64, rng: &mut impl Rng) -> Offer {
        let sponsored = rng.gen_bool(self.sponsored_chance);
        let text = if sponsored {
            let (text, sponsor) = SPONSORED_OFFERS[rng.gen_range(0..SPONSORED_OFFERS.len())];
            format!("{} (sponsored by {})", text, sponsor)
        } else {
            GENERIC_OFFERS[rng.gen_range(0..GENERIC_OFFERS.len())].to_string()
        };

        Offer {
            id: OfferId::new(),
            text,
            sponsored,
            expires_at_ms: now_ms + self.auto_dismiss_ms,
        }
    }
}
