//! Combat controller: admission, buffering, and ack reconciliation.
//!
//! One controller per locally-controlled actor. Every operation is a
//! synchronous, bounded-time call driven by the host's fixed tick; the
//! controller never awaits the network.

use crate::io::{CommandSink, TargetSource};
use crate::prediction::{AckClass, PredictionSnapshot, PredictionState};
use data_runtime::ability::AbilityDef;
use data_runtime::catalog::AbilityCatalog;
use data_runtime::ids::{AbilityId, ActorId};
use net_core::message::{
    AbilityAck, AbilityCancel, AbilityStateSnapshot, AbilityUseRequest, CancelReason, ClientMsg,
    TargetSpec,
};
use std::sync::Arc;

/// How `apply_ack` disposed of an incoming ack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    Accepted,
    Rejected,
    /// Sequence not newer than the applied watermark; expected under
    /// reordering, discarded without fuss.
    Stale,
    /// References a request this actor never sent; protocol or routing bug.
    Foreign,
}

pub struct CombatController {
    actor_id: ActorId,
    catalog: Arc<AbilityCatalog>,
    pred: PredictionState,
    client_tick: u64,
    next_request: u64,
    /// Local-minus-server clock delta, recomputed from every ack.
    clock_offset_ms: i64,
    clock_synced: bool,
    /// Latest authoritative snapshot, for predicted-vs-real cast gating.
    replicated: Option<AbilityStateSnapshot>,
}

impl CombatController {
    #[must_use]
    pub fn new(actor_id: ActorId, catalog: Arc<AbilityCatalog>) -> Self {
        Self {
            actor_id,
            catalog,
            pred: PredictionState::default(),
            client_tick: 0,
            next_request: 0,
            clock_offset_ms: 0,
            clock_synced: false,
            replicated: None,
        }
    }

    /// Explicit player trigger. Local admission failures (unknown id,
    /// off-GCD while casting, queue window not yet open) are silent no-ops;
    /// they are frequent and recoverable by the next input attempt.
    pub fn try_use_ability(
        &mut self,
        ability_id: &AbilityId,
        world: &dyn TargetSource,
        sink: &mut dyn CommandSink,
        now_ms: i64,
    ) {
        let Some(def) = self.catalog.get(ability_id).cloned() else {
            return;
        };
        let casting = self.is_casting(now_ms);
        if casting && !def.is_on_gcd {
            // Off-GCD actions cannot be queued mid-cast.
            return;
        }
        if def.is_on_gcd && (casting || self.pred.is_on_gcd(now_ms)) {
            if self.pred.buffer_window_open(now_ms) {
                self.pred.queue(def.id.clone());
            }
            return;
        }
        self.send_request(&def, world, sink, now_ms);
    }

    /// Runs once per simulation step: promotes the queued ability to a real
    /// send at the earliest legal moment.
    pub fn fixed_tick(
        &mut self,
        world: &dyn TargetSource,
        sink: &mut dyn CommandSink,
        now_ms: i64,
    ) {
        self.client_tick += 1;
        if self.pred.queued_ability().is_none() {
            return;
        }
        // The window close (cast/GCD boundary) may fall between ticks; a
        // queued action still flushes on the first tick the actor is free.
        let flushable = self.pred.buffer_window_open(now_ms)
            || (!self.is_casting(now_ms) && !self.pred.is_on_gcd(now_ms));
        if !flushable {
            return;
        }
        if let Some(id) = self.pred.take_queued() {
            if let Some(def) = self.catalog.get(&id).cloned() {
                self.send_request(&def, world, sink, now_ms);
            }
        }
    }

    /// Reconcile one server ack against prediction state.
    pub fn apply_ack(&mut self, ack: &AbilityAck, local_receive_ms: i64) -> AckOutcome {
        match self.pred.classify_ack(ack.sequence, ack.request_id) {
            AckClass::Stale => {
                log::debug!(
                    "{}: stale ack seq={} (watermark {})",
                    self.actor_id,
                    ack.sequence,
                    self.pred.applied_sequence()
                );
                return AckOutcome::Stale;
            }
            AckClass::Foreign => {
                log::error!(
                    "{}: ack references request never sent (id={} seq={})",
                    self.actor_id,
                    ack.request_id,
                    ack.sequence
                );
                return AckOutcome::Foreign;
            }
            AckClass::Known => {}
        }
        // Fresh, unsmoothed offset estimate; projects every server-relative
        // timestamp in this ack onto the local clock.
        let offset = local_receive_ms - ack.server_time_ms;
        self.clock_offset_ms = offset;
        self.clock_synced = true;
        if ack.accepted {
            self.apply_accept(ack, offset);
            AckOutcome::Accepted
        } else {
            self.apply_reject(ack);
            AckOutcome::Rejected
        }
    }

    /// Movement, stun, or manual interrupt of the active cast. Clears the
    /// queue slot and remembered request id; the GCD is left alone — whether
    /// it is refunded is the server's call, delivered by a later state update.
    pub fn cancel_active_cast(
        &mut self,
        reason: CancelReason,
        sink: &mut dyn CommandSink,
        now_ms: i64,
    ) {
        self.pred.clear_queued();
        let Some(request_id) = self.pred.last_request_id() else {
            return;
        };
        if self.pred.is_casting(now_ms) {
            let sequence = self.pred.next_sequence();
            let msg = ClientMsg::AbilityCancel(AbilityCancel {
                request_id,
                sequence,
                client_tick: self.client_tick,
                actor_id: self.actor_id,
                reason,
                client_time_ms: now_ms,
            });
            if !sink.send(&msg) {
                log::warn!("{}: transport dropped ability_cancel", self.actor_id);
            }
            // Stop the local cast bar immediately; timing windows stand
            // until the server says otherwise.
            self.pred.cast_ability = None;
        }
        self.pred.clear_last_request();
    }

    /// Feed the latest replicated authoritative state (predicted-vs-real
    /// cast gating input).
    pub fn apply_state_snapshot(&mut self, snap: AbilityStateSnapshot) {
        if snap.actor_id == self.actor_id {
            self.replicated = Some(snap);
        }
    }

    /// Read-only prediction snapshot for UI consumption.
    #[must_use]
    pub fn prediction(&self, now_ms: i64) -> PredictionSnapshot {
        self.pred.snapshot(now_ms)
    }

    #[must_use]
    pub fn ability_cooldown_end(&self, id: &AbilityId) -> Option<i64> {
        self.pred.ability_cooldown_end(id)
    }

    #[must_use]
    pub fn queued_ability(&self) -> Option<&AbilityId> {
        self.pred.queued_ability()
    }

    #[must_use]
    pub fn clock_offset_ms(&self) -> i64 {
        self.clock_offset_ms
    }

    #[must_use]
    pub fn state(&self) -> &PredictionState {
        &self.pred
    }

    fn is_casting(&self, now_ms: i64) -> bool {
        self.pred.is_casting(now_ms) || self.replicated_casting(now_ms)
    }

    fn replicated_casting(&self, now_ms: i64) -> bool {
        let Some(s) = &self.replicated else {
            return false;
        };
        if !self.clock_synced || s.cast_ability_id.is_none() {
            return false;
        }
        let start = s.cast_start_time_ms + self.clock_offset_ms;
        let end = s.cast_end_time_ms + self.clock_offset_ms;
        start <= now_ms && now_ms <= end
    }

    fn next_request_id(&mut self) -> u64 {
        self.next_request += 1;
        (u64::from(self.actor_id.0) << 32) | self.next_request
    }

    fn send_request(
        &mut self,
        def: &AbilityDef,
        world: &dyn TargetSource,
        sink: &mut dyn CommandSink,
        now_ms: i64,
    ) {
        let sequence = self.pred.next_sequence();
        let request_id = self.next_request_id();
        self.pred
            .mark_ability_requested(def, request_id, sequence, now_ms);
        let target = match world.selected_target() {
            Some(id) => TargetSpec::Entity { id },
            None => TargetSpec::Ground {
                point: world.aim_origin(),
                dir: world.aim_dir(),
            },
        };
        let msg = ClientMsg::AbilityUse(AbilityUseRequest {
            request_id,
            sequence,
            client_tick: self.client_tick,
            actor_id: self.actor_id,
            ability_id: def.id.clone(),
            target,
            client_time_ms: now_ms,
        });
        if !sink.send(&msg) {
            log::warn!("{}: transport dropped ability_use {}", self.actor_id, def.id);
        }
    }

    fn apply_accept(&mut self, ack: &AbilityAck, offset: i64) {
        let ability = ack.result.as_ref().map(|r| r.ability_id.clone());
        if let (Some(gs), Some(ge)) = (ack.gcd_start_time_ms, ack.gcd_end_time_ms) {
            self.pred.gcd_start_ms = gs + offset;
            self.pred.gcd_end_ms = ge + offset;
        }
        if let (Some(cs), Some(ce)) = (ack.cast_start_time_ms, ack.cast_end_time_ms) {
            self.pred.cast_start_ms = cs + offset;
            self.pred.cast_end_ms = ce + offset;
            self.pred.cast_ability = if ce > cs { ability.clone() } else { None };
        }
        if let (Some(id), Some(cs)) = (ability.as_ref(), ack.cast_start_time_ms) {
            // Cooldowns re-anchor to the authoritative cast start, projected
            // onto the local clock.
            let start_local = cs + offset;
            if let Some(def) = self.catalog.get(id) {
                if def.internal_cooldown_ms > 0 {
                    self.pred.icd_end_ms = start_local + i64::from(def.internal_cooldown_ms);
                }
                if def.cooldown_ms > 0 {
                    self.pred
                        .set_ability_cooldown_end(id.clone(), start_local + i64::from(def.cooldown_ms));
                }
            }
        }
        self.pred.confirm_pending(ack.request_id);
        if let Some(id) = ability.as_ref() {
            // Buffered action confirmed sent.
            if self.pred.queued_ability() == Some(id)
                && self.pred.last_request_id() == Some(ack.request_id)
            {
                self.pred.clear_queued();
            }
        }
        self.pred.commit_sequence(ack.sequence);
    }

    fn apply_reject(&mut self, ack: &AbilityAck) {
        if let Some(ability) = self.pred.rollback(ack.request_id) {
            log::debug!(
                "{}: {} rejected ({:?})",
                self.actor_id,
                ability,
                ack.reject_reason
            );
            if self.pred.queued_ability() == Some(&ability) {
                self.pred.clear_queued();
            }
        } else {
            log::debug!(
                "{}: reject for request {} had no live optimistic state",
                self.actor_id,
                ack.request_id
            );
        }
        self.pred.commit_sequence(ack.sequence);
    }
}
