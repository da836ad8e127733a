//! Per-actor authoritative ability timing state.
//!
//! Mirrors the shape the client predicts against; all timestamps are server
//! clock milliseconds until the client projects them by its offset estimate.

use data_runtime::ids::{AbilityId, ActorId};
use data_runtime::tuning;
use net_core::message::{AbilityResult, AbilityStateSnapshot};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct AbilityState {
    pub gcd_start_ms: i64,
    pub gcd_end_ms: i64,
    pub icd_end_ms: i64,
    pub cast_start_ms: i64,
    pub cast_end_ms: i64,
    pub cast_ability: Option<AbilityId>,
    /// Monotonic per actor; 0 = never cast.
    pub cast_id: u64,
    pub last_hostile_action_ms: i64,
}

impl AbilityState {
    #[must_use]
    pub fn is_casting(&self, now_ms: i64) -> bool {
        self.cast_ability.is_some() && now_ms < self.cast_end_ms
    }

    #[must_use]
    pub fn is_on_gcd(&self, now_ms: i64) -> bool {
        now_ms < self.gcd_end_ms
    }

    /// End of the current busy period (cast or GCD, whichever runs longer).
    #[must_use]
    pub fn busy_until(&self) -> i64 {
        self.gcd_end_ms.max(self.cast_end_ms)
    }

    /// The single-slot buffer accepts requests only after the busy period has
    /// run for the open delay, and never past its end.
    #[must_use]
    pub fn buffer_window_open(&self, now_ms: i64) -> bool {
        let casting = self.is_casting(now_ms);
        if !casting && !self.is_on_gcd(now_ms) {
            return false;
        }
        let busy_start = if casting {
            self.cast_start_ms
        } else {
            self.gcd_start_ms
        };
        now_ms >= busy_start + i64::from(tuning::QUEUE_WINDOW_OPEN_DELAY_MS)
            && now_ms <= self.busy_until()
    }

    #[must_use]
    pub fn snapshot(&self, actor_id: ActorId) -> AbilityStateSnapshot {
        AbilityStateSnapshot {
            actor_id,
            gcd_end_time_ms: self.gcd_end_ms,
            internal_cooldown_end_time_ms: self.icd_end_ms,
            cast_start_time_ms: self.cast_start_ms,
            cast_end_time_ms: self.cast_end_ms,
            cast_ability_id: self.cast_ability.clone(),
            cast_id: self.cast_id,
            last_hostile_action_time_ms: self.last_hostile_action_ms,
        }
    }
}

/// One accepted cast. Outcomes are pre-rolled from the cast seed at accept
/// time and applied at completion, so an interrupt simply discards them.
#[derive(Debug, Clone)]
pub struct CastJob {
    pub ability: AbilityId,
    pub request_id: u64,
    pub cast_id: u64,
    pub start_ms: i64,
    pub end_ms: i64,
    /// Mana deducted at accept; refunded if the cast is interrupted.
    pub cost: i32,
    pub result: AbilityResult,
}

/// Everything the server tracks about one actor's ability usage.
#[derive(Debug, Default)]
pub struct AbilityRecord {
    pub state: AbilityState,
    /// Per-ability cooldown ends, server clock.
    pub cooldowns: HashMap<AbilityId, i64>,
    /// Cast in progress, completing at `state.cast_end_ms`.
    pub active: Option<CastJob>,
    /// Single buffered cast, promoted when the busy period ends.
    pub queued: Option<CastJob>,
    /// Allocation counter for cast ids, in accept order.
    pub last_cast_id: u64,
}

impl AbilityRecord {
    #[must_use]
    pub fn cooldown_ready(&self, id: &AbilityId, now_ms: i64) -> bool {
        match self.cooldowns.get(id) {
            Some(end) => now_ms >= *end,
            None => true,
        }
    }
}
