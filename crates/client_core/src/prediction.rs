//! Per-actor optimistic prediction state.
//!
//! Owned exclusively by one `CombatController`; never shared across actors.
//! Mutation happens only through `mark_ability_requested`, the reconciliation
//! helpers, and the queue slot operations. Every value is a forecast in local
//! clock milliseconds.

use data_runtime::ability::AbilityDef;
use data_runtime::ids::AbilityId;
use data_runtime::tuning;
use std::collections::HashMap;

/// Admission phase derived from prediction state projected to "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPhase {
    Idle,
    OnGcd,
    Casting,
}

/// How an incoming ack relates to what this actor actually sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckClass {
    /// Sequence not newer than the applied watermark; discard.
    Stale,
    /// Request id/sequence this actor never sent; protocol or routing bug.
    Foreign,
    Known,
}

/// One timing capture, taken around a request's optimistic mark.
#[derive(Debug, Clone)]
struct TimingCapture {
    gcd_start_ms: i64,
    gcd_end_ms: i64,
    icd_end_ms: i64,
    cast_start_ms: i64,
    cast_end_ms: i64,
    cast_ability: Option<AbilityId>,
    /// Cooldown end for the request's own ability.
    cooldown_end_ms: Option<i64>,
}

/// Rollback ledger entry for one sent-but-unreconciled request.
///
/// `prev` holds the values seen just before the request's optimistic mark,
/// `installed` the values the mark wrote. A rejection restores a field from
/// `prev` only while the live value still equals `installed`, so optimistic
/// state installed by *other* requests (and authoritative values applied by
/// later acks) survives.
#[derive(Debug, Clone)]
struct PendingRequest {
    request_id: u64,
    sequence: u64,
    ability: AbilityId,
    prev: TimingCapture,
    installed: TimingCapture,
}

/// Read-only snapshot for UI (cast bars, cooldown sweeps, queue indicator).
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSnapshot {
    pub gcd_active: bool,
    /// Remaining fraction of the GCD window at the queried time, 0..=1.
    pub gcd_ratio: f32,
    pub casting: bool,
    pub cast_ability: Option<AbilityId>,
    pub queued_ability: Option<AbilityId>,
}

#[derive(Debug, Default, Clone)]
pub struct PredictionState {
    pub gcd_start_ms: i64,
    pub gcd_end_ms: i64,
    pub icd_end_ms: i64,
    pub cast_start_ms: i64,
    pub cast_end_ms: i64,
    pub cast_ability: Option<AbilityId>,
    cooldown_ends: HashMap<AbilityId, i64>,
    queued_ability: Option<AbilityId>,
    last_request_id: Option<u64>,
    /// Last sequence assigned at send time; strictly increasing, never reused.
    last_sequence: u64,
    /// Highest sequence already reconciled; acks at or below are stale.
    applied_sequence: u64,
    /// Rollback baselines for every unreconciled request, oldest first.
    pending: Vec<PendingRequest>,
    /// Sent-but-unreconciled requests, for stale/foreign classification.
    in_flight: Vec<(u64, u64)>,
}

impl PredictionState {
    /// Assign the next send sequence for this actor.
    pub fn next_sequence(&mut self) -> u64 {
        self.last_sequence += 1;
        self.last_sequence
    }

    #[must_use]
    pub fn last_request_id(&self) -> Option<u64> {
        self.last_request_id
    }

    #[must_use]
    pub fn applied_sequence(&self) -> u64 {
        self.applied_sequence
    }

    #[must_use]
    pub fn is_casting(&self, now_ms: i64) -> bool {
        self.cast_ability.is_some() && self.cast_start_ms <= now_ms && now_ms <= self.cast_end_ms
    }

    #[must_use]
    pub fn is_on_gcd(&self, now_ms: i64) -> bool {
        now_ms < self.gcd_end_ms
    }

    #[must_use]
    pub fn phase(&self, now_ms: i64) -> ActionPhase {
        if self.is_casting(now_ms) {
            ActionPhase::Casting
        } else if self.is_on_gcd(now_ms) {
            ActionPhase::OnGcd
        } else {
            ActionPhase::Idle
        }
    }

    /// Queue window: opens a fixed delay after the current cast's predicted
    /// start (never at the trigger attempt), closes at the later of predicted
    /// cast end and predicted GCD end.
    #[must_use]
    pub fn buffer_window(&self) -> (i64, i64) {
        let open = self.cast_start_ms + i64::from(tuning::QUEUE_WINDOW_OPEN_DELAY_MS);
        let close = self.cast_end_ms.max(self.gcd_end_ms);
        (open, close)
    }

    #[must_use]
    pub fn buffer_window_open(&self, now_ms: i64) -> bool {
        let (open, close) = self.buffer_window();
        now_ms >= open && now_ms < close
    }

    #[must_use]
    pub fn queued_ability(&self) -> Option<&AbilityId> {
        self.queued_ability.as_ref()
    }

    /// Occupy the single queue slot, overwriting any previously queued id.
    pub fn queue(&mut self, ability: AbilityId) {
        self.queued_ability = Some(ability);
    }

    pub fn take_queued(&mut self) -> Option<AbilityId> {
        self.queued_ability.take()
    }

    pub fn clear_queued(&mut self) {
        self.queued_ability = None;
    }

    #[must_use]
    pub fn ability_cooldown_end(&self, id: &AbilityId) -> Option<i64> {
        self.cooldown_ends.get(id).copied()
    }

    pub fn set_ability_cooldown_end(&mut self, id: AbilityId, end_ms: i64) {
        self.cooldown_ends.insert(id, end_ms);
    }

    fn capture(&self, ability: &AbilityId) -> TimingCapture {
        TimingCapture {
            gcd_start_ms: self.gcd_start_ms,
            gcd_end_ms: self.gcd_end_ms,
            icd_end_ms: self.icd_end_ms,
            cast_start_ms: self.cast_start_ms,
            cast_end_ms: self.cast_end_ms,
            cast_ability: self.cast_ability.clone(),
            cooldown_end_ms: self.cooldown_ends.get(ability).copied(),
        }
    }

    /// Optimistically install this request's timing forecast and remember the
    /// prior values so a rejection can undo exactly this request's effects.
    pub fn mark_ability_requested(
        &mut self,
        def: &AbilityDef,
        request_id: u64,
        sequence: u64,
        now_ms: i64,
    ) {
        let prev = self.capture(&def.id);
        if def.is_on_gcd {
            self.gcd_start_ms = now_ms;
            self.gcd_end_ms = now_ms + i64::from(def.gcd_ms());
        }
        if def.internal_cooldown_ms > 0 {
            self.icd_end_ms = now_ms + i64::from(def.internal_cooldown_ms);
        }
        if def.cooldown_ms > 0 {
            self.cooldown_ends
                .insert(def.id.clone(), now_ms + i64::from(def.cooldown_ms));
        }
        self.cast_start_ms = now_ms;
        self.cast_end_ms = now_ms + i64::from(def.cast_time_ms);
        self.cast_ability = if def.cast_time_ms > 0 {
            Some(def.id.clone())
        } else {
            None
        };
        let installed = self.capture(&def.id);
        self.last_request_id = Some(request_id);
        self.pending.push(PendingRequest {
            request_id,
            sequence,
            ability: def.id.clone(),
            prev,
            installed,
        });
        self.in_flight.push((sequence, request_id));
    }

    #[must_use]
    pub fn classify_ack(&self, sequence: u64, request_id: u64) -> AckClass {
        if sequence <= self.applied_sequence {
            return AckClass::Stale;
        }
        if self
            .in_flight
            .iter()
            .any(|&(s, r)| s == sequence && r == request_id)
        {
            AckClass::Known
        } else {
            AckClass::Foreign
        }
    }

    /// Advance the watermark after reconciling an ack (accepted or rejected)
    /// and drop ledger entries that can no longer match a live ack.
    pub fn commit_sequence(&mut self, sequence: u64) {
        debug_assert!(sequence > self.applied_sequence);
        self.applied_sequence = sequence;
        self.in_flight.retain(|&(s, _)| s > sequence);
        self.pending.retain(|p| p.sequence > sequence);
    }

    /// Undo the optimistic values installed for `request_id`. Returns the
    /// rejected ability id when a matching mark existed.
    ///
    /// Each field is restored only while the live value still equals what this
    /// request installed; values written since (a newer mark, an accepted ack)
    /// supersede the rejected forecast and stay. Baselines of newer in-flight
    /// requests that captured this request's optimism fall back to what
    /// preceded it, so their own rollback cannot resurrect rejected state.
    pub fn rollback(&mut self, request_id: u64) -> Option<AbilityId> {
        let idx = self.pending.iter().position(|p| p.request_id == request_id)?;
        let p = self.pending.remove(idx);
        if self.gcd_start_ms == p.installed.gcd_start_ms
            && self.gcd_end_ms == p.installed.gcd_end_ms
        {
            self.gcd_start_ms = p.prev.gcd_start_ms;
            self.gcd_end_ms = p.prev.gcd_end_ms;
        }
        if self.icd_end_ms == p.installed.icd_end_ms {
            self.icd_end_ms = p.prev.icd_end_ms;
        }
        if self.cast_start_ms == p.installed.cast_start_ms
            && self.cast_end_ms == p.installed.cast_end_ms
            && self.cast_ability == p.installed.cast_ability
        {
            self.cast_start_ms = p.prev.cast_start_ms;
            self.cast_end_ms = p.prev.cast_end_ms;
            self.cast_ability = p.prev.cast_ability.clone();
        }
        if self.cooldown_ends.get(&p.ability).copied() == p.installed.cooldown_end_ms {
            match p.prev.cooldown_end_ms {
                Some(end) => {
                    self.cooldown_ends.insert(p.ability.clone(), end);
                }
                None => {
                    self.cooldown_ends.remove(&p.ability);
                }
            }
        }
        for q in &mut self.pending[idx..] {
            if q.prev.gcd_start_ms == p.installed.gcd_start_ms
                && q.prev.gcd_end_ms == p.installed.gcd_end_ms
            {
                q.prev.gcd_start_ms = p.prev.gcd_start_ms;
                q.prev.gcd_end_ms = p.prev.gcd_end_ms;
            }
            if q.prev.icd_end_ms == p.installed.icd_end_ms {
                q.prev.icd_end_ms = p.prev.icd_end_ms;
            }
            if q.prev.cast_start_ms == p.installed.cast_start_ms
                && q.prev.cast_end_ms == p.installed.cast_end_ms
            {
                q.prev.cast_start_ms = p.prev.cast_start_ms;
                q.prev.cast_end_ms = p.prev.cast_end_ms;
                q.prev.cast_ability = p.prev.cast_ability.clone();
            }
            if q.ability == p.ability && q.prev.cooldown_end_ms == p.installed.cooldown_end_ms {
                q.prev.cooldown_end_ms = p.prev.cooldown_end_ms;
            }
        }
        Some(p.ability)
    }

    /// Drop the rollback baseline for `request_id` once the server has
    /// confirmed it (there is nothing speculative left to undo).
    ///
    /// Newer in-flight requests may have captured the confirmed request's
    /// optimism as their baseline; those fields are re-pointed at the
    /// authoritative values now live, so a later rejection restores confirmed
    /// state instead of a stale forecast. Only fields the confirmed request
    /// actually changed are touched.
    pub fn confirm_pending(&mut self, request_id: u64) {
        let Some(idx) = self.pending.iter().position(|p| p.request_id == request_id) else {
            return;
        };
        let p = self.pending.remove(idx);
        let now = self.capture(&p.ability);
        let gcd_changed = p.prev.gcd_start_ms != p.installed.gcd_start_ms
            || p.prev.gcd_end_ms != p.installed.gcd_end_ms;
        let icd_changed = p.prev.icd_end_ms != p.installed.icd_end_ms;
        let cast_changed = p.prev.cast_start_ms != p.installed.cast_start_ms
            || p.prev.cast_end_ms != p.installed.cast_end_ms;
        let cooldown_changed = p.prev.cooldown_end_ms != p.installed.cooldown_end_ms;
        for q in &mut self.pending[idx..] {
            if gcd_changed
                && q.prev.gcd_start_ms == p.installed.gcd_start_ms
                && q.prev.gcd_end_ms == p.installed.gcd_end_ms
            {
                q.prev.gcd_start_ms = now.gcd_start_ms;
                q.prev.gcd_end_ms = now.gcd_end_ms;
            }
            if icd_changed && q.prev.icd_end_ms == p.installed.icd_end_ms {
                q.prev.icd_end_ms = now.icd_end_ms;
            }
            if cast_changed
                && q.prev.cast_start_ms == p.installed.cast_start_ms
                && q.prev.cast_end_ms == p.installed.cast_end_ms
            {
                q.prev.cast_start_ms = now.cast_start_ms;
                q.prev.cast_end_ms = now.cast_end_ms;
                q.prev.cast_ability = now.cast_ability.clone();
            }
            if cooldown_changed
                && q.ability == p.ability
                && q.prev.cooldown_end_ms == p.installed.cooldown_end_ms
            {
                q.prev.cooldown_end_ms = now.cooldown_end_ms;
            }
        }
    }

    /// Forget the remembered request id (cast interrupt path).
    pub fn clear_last_request(&mut self) {
        self.last_request_id = None;
    }

    #[must_use]
    pub fn snapshot(&self, now_ms: i64) -> PredictionSnapshot {
        let gcd_active = self.is_on_gcd(now_ms);
        let gcd_span = self.gcd_end_ms - self.gcd_start_ms;
        let gcd_ratio = if gcd_active && gcd_span > 0 {
            ((self.gcd_end_ms - now_ms) as f32 / gcd_span as f32).clamp(0.0, 1.0)
        } else {
            0.0
        };
        PredictionSnapshot {
            gcd_active,
            gcd_ratio,
            casting: self.is_casting(now_ms),
            cast_ability: self.cast_ability.clone(),
            queued_ability: self.queued_ability.clone(),
        }
    }
}
