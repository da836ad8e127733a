//! Authoritative ability server: request validation, single-slot buffering,
//! and deterministic seeded outcome resolution.
//!
//! `ServerState` is the twin of the client's prediction: it runs the same
//! timing rules on its own clock and answers every `ability_use` with exactly
//! one `ability_ack`. Outcomes are pre-rolled from the per-cast seed at accept
//! time and applied when the cast completes, so interrupts discard them
//! without touching the RNG stream.

#![deny(warnings, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_panics_doc)]

pub mod ability_state;
pub mod actor;
pub mod combat;
pub mod resolver;
pub mod seed;

pub use ability_state::{AbilityRecord, AbilityState, CastJob};
pub use actor::{Actor, ActorStore, Health, ResourcePool, StatusFlags, Transform};
pub use combat::Team;
pub use resolver::{resolve, TargetRef};

use data_runtime::ability::{AbilityDef, EffectKind};
use data_runtime::catalog::AbilityCatalog;
use data_runtime::ids::{AbilityId, ActorId};
use data_runtime::tuning;
use glam::Vec3;
use net_core::message::{
    AbilityAck, AbilityCancel, AbilityResult, AbilityStateSnapshot, AbilityUseRequest, OutcomeKind,
    RejectReason, TargetSpec,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Observable combat occurrences, drained by the host each tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CombatEvent {
    CastStarted {
        actor: ActorId,
        ability: AbilityId,
        cast_id: u64,
    },
    CastCompleted {
        actor: ActorId,
        ability: AbilityId,
        cast_id: u64,
    },
    CastInterrupted {
        actor: ActorId,
        ability: AbilityId,
        cast_id: u64,
    },
    Damage {
        source: ActorId,
        target: ActorId,
        amount: i32,
        fatal: bool,
    },
    Healed {
        source: ActorId,
        target: ActorId,
        amount: i32,
    },
    StatusApplied {
        source: ActorId,
        target: ActorId,
    },
}

pub struct ServerState {
    time_ms: i64,
    tick: u64,
    world_seed: u64,
    catalog: Arc<AbilityCatalog>,
    pub actors: ActorStore,
    ability: HashMap<ActorId, AbilityRecord>,
    events: Vec<CombatEvent>,
    snapshots: Vec<AbilityStateSnapshot>,
}

impl ServerState {
    #[must_use]
    pub fn new(catalog: Arc<AbilityCatalog>, world_seed: u64) -> Self {
        Self {
            time_ms: 0,
            tick: 0,
            world_seed,
            catalog,
            actors: ActorStore::default(),
            ability: HashMap::new(),
            events: Vec::new(),
            snapshots: Vec::new(),
        }
    }

    #[must_use]
    pub fn time_ms(&self) -> i64 {
        self.time_ms
    }

    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn record(&self, id: ActorId) -> Option<&AbilityRecord> {
        self.ability.get(&id)
    }

    /// Events accumulated since the last drain, in occurrence order.
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Per-actor state snapshots emitted since the last drain.
    pub fn drain_snapshots(&mut self) -> Vec<AbilityStateSnapshot> {
        std::mem::take(&mut self.snapshots)
    }

    /// Validate and answer one use request. Always returns exactly one ack,
    /// accepted or rejected, echoing the request id and sequence.
    pub fn handle_use_request(&mut self, req: &AbilityUseRequest) -> AbilityAck {
        let now = self.time_ms;
        match self.validate(req, now) {
            Ok(def) => self.accept(req, &def, now),
            Err(reason) => {
                log::debug!(
                    "{}: reject {} seq={} ({reason:?})",
                    req.actor_id,
                    req.ability_id,
                    req.sequence
                );
                let mut ack = self.base_ack(req.request_id, req.sequence);
                ack.reject_reason = Some(reason);
                ack
            }
        }
    }

    /// Interrupt the active cast named by the cancel's request id and drop any
    /// buffered cast. Mana and the per-ability cooldown are refunded; the GCD
    /// and internal cooldown stand.
    pub fn handle_cancel(&mut self, msg: &AbilityCancel) {
        let now = self.time_ms;
        let dropped = self
            .ability
            .get_mut(&msg.actor_id)
            .and_then(|rec| rec.queued.take());
        if let Some(job) = dropped {
            self.refund(msg.actor_id, &job);
        }
        let interrupted = self.ability.get_mut(&msg.actor_id).and_then(|rec| {
            if rec.state.is_casting(now)
                && rec
                    .active
                    .as_ref()
                    .is_some_and(|j| j.request_id == msg.request_id)
            {
                rec.state.cast_ability = None;
                rec.state.cast_end_ms = now;
                rec.active.take()
            } else {
                None
            }
        });
        if let Some(job) = interrupted {
            if let Some(rec) = self.ability.get_mut(&msg.actor_id) {
                rec.cooldowns.remove(&job.ability);
            }
            self.refund(msg.actor_id, &job);
            log::debug!("{}: cast {} interrupted ({:?})", msg.actor_id, job.ability, msg.reason);
            self.events.push(CombatEvent::CastInterrupted {
                actor: msg.actor_id,
                ability: job.ability,
                cast_id: job.cast_id,
            });
            self.push_snapshot(msg.actor_id);
        }
    }

    /// Advance the simulation clock: complete finished casts, then promote
    /// buffered casts whose scheduled start has arrived.
    pub fn step(&mut self, dt_ms: i64) {
        self.time_ms += dt_ms;
        self.tick += 1;
        let now = self.time_ms;
        let ids: Vec<ActorId> = self.ability.keys().copied().collect();
        for id in ids {
            let finished = self.ability.get_mut(&id).and_then(|rec| {
                if rec.active.as_ref().is_some_and(|j| now >= j.end_ms) {
                    rec.state.cast_ability = None;
                    rec.active.take()
                } else {
                    None
                }
            });
            if let Some(job) = finished {
                self.complete_cast(id, &job);
                self.push_snapshot(id);
            }
            let promoted = self.ability.get_mut(&id).and_then(|rec| {
                let free = !rec.state.is_casting(now) && !rec.state.is_on_gcd(now);
                if free && rec.queued.as_ref().is_some_and(|j| now >= j.start_ms) {
                    rec.queued.take()
                } else {
                    None
                }
            });
            if let Some(job) = promoted {
                if let Some(def) = self.catalog.get(&job.ability).cloned() {
                    self.start_cast(id, job, &def);
                }
            }
        }
    }

    fn validate(&self, req: &AbilityUseRequest, now: i64) -> Result<AbilityDef, RejectReason> {
        let def = self
            .catalog
            .get(&req.ability_id)
            .cloned()
            .ok_or(RejectReason::Illegal)?;
        let actor = self.actors.get(req.actor_id).ok_or(RejectReason::Illegal)?;
        if !actor.hp.alive() {
            return Err(RejectReason::Illegal);
        }
        if actor.status.stunned {
            return Err(RejectReason::Stunned);
        }
        if actor.status.silenced && !def.is_instant() {
            return Err(RejectReason::Silenced);
        }
        if actor.status.disarmed && !def.is_on_gcd {
            return Err(RejectReason::Disarmed);
        }
        if actor.status.rooted && matches!(req.target, TargetSpec::Ground { .. }) {
            return Err(RejectReason::Rooted);
        }
        if actor.pool.mana < def.resource_cost {
            return Err(RejectReason::Resources);
        }
        self.check_range(actor, &req.target, &def)?;
        if let Some(rec) = self.ability.get(&req.actor_id) {
            if !rec.cooldown_ready(&def.id, now) {
                return Err(RejectReason::Cooldown);
            }
            if def.internal_cooldown_ms > 0 && now < rec.state.icd_end_ms {
                return Err(RejectReason::Cooldown);
            }
            // One buffer slot, period; covers the gap between a promoted
            // slot freeing up and the next simulation step.
            if rec.queued.is_some() {
                return Err(RejectReason::BufferFull);
            }
            if rec.state.is_casting(now) && !def.is_on_gcd {
                // Off-GCD actions cannot run or buffer mid-cast.
                return Err(RejectReason::Other);
            }
            if def.is_on_gcd
                && (rec.state.is_casting(now) || rec.state.is_on_gcd(now))
                && !rec.state.buffer_window_open(now)
            {
                return Err(RejectReason::BufferWindowClosed);
            }
        }
        Ok(def)
    }

    fn accept(&mut self, req: &AbilityUseRequest, def: &AbilityDef, now: i64) -> AbilityAck {
        let Some(caster) = self.target_ref(req.actor_id) else {
            let mut ack = self.base_ack(req.request_id, req.sequence);
            ack.reject_reason = Some(RejectReason::Illegal);
            return ack;
        };
        let candidates = self.collect_candidates(req.actor_id, &req.target, def);
        if def.resource_cost > 0 {
            if let Some(a) = self.actors.get_mut(req.actor_id) {
                a.pool.mana -= def.resource_cost;
            }
        }
        let world_seed = self.world_seed;
        let rec = self.ability.entry(req.actor_id).or_default();
        let busy = rec.state.is_casting(now) || rec.state.is_on_gcd(now);
        let start = if busy && def.is_on_gcd {
            rec.state.busy_until()
        } else {
            now
        };
        let end = start + i64::from(def.cast_time_ms);
        rec.last_cast_id += 1;
        let cast_id = rec.last_cast_id;
        let result = resolver::resolve(
            def,
            caster,
            &candidates,
            seed::seed_for_cast(world_seed, req.actor_id, cast_id),
        );
        let job = CastJob {
            ability: def.id.clone(),
            request_id: req.request_id,
            cast_id,
            start_ms: start,
            end_ms: end,
            cost: def.resource_cost,
            result: result.clone(),
        };
        let mut ack = self.base_ack(req.request_id, req.sequence);
        ack.accepted = true;
        ack.cast_start_time_ms = Some(start);
        ack.cast_end_time_ms = Some(end);
        ack.cast_id = Some(cast_id);
        if def.is_on_gcd {
            ack.gcd_start_time_ms = Some(start);
            ack.gcd_end_time_ms = Some(start + i64::from(tuning::GCD_MS));
        }
        ack.result = Some(result);
        if start > now {
            // Buffered: the slot holds it until the busy period ends.
            self.ability
                .entry(req.actor_id)
                .or_default()
                .queued = Some(job);
            log::debug!(
                "{}: buffered {} until {start}",
                req.actor_id,
                req.ability_id
            );
        } else {
            self.start_cast(req.actor_id, job, def);
        }
        ack
    }

    fn start_cast(&mut self, actor_id: ActorId, job: CastJob, def: &AbilityDef) {
        let instant = def.is_instant();
        {
            let rec = self.ability.entry(actor_id).or_default();
            let st = &mut rec.state;
            st.cast_id = job.cast_id;
            st.cast_start_ms = job.start_ms;
            st.cast_end_ms = job.end_ms;
            st.cast_ability = if instant {
                None
            } else {
                Some(job.ability.clone())
            };
            if def.is_on_gcd {
                st.gcd_start_ms = job.start_ms;
                st.gcd_end_ms = job.start_ms + i64::from(tuning::GCD_MS);
            }
            if def.internal_cooldown_ms > 0 {
                st.icd_end_ms = job.start_ms + i64::from(def.internal_cooldown_ms);
            }
            if def.cooldown_ms > 0 {
                rec.cooldowns
                    .insert(job.ability.clone(), job.start_ms + i64::from(def.cooldown_ms));
            }
        }
        self.events.push(CombatEvent::CastStarted {
            actor: actor_id,
            ability: job.ability.clone(),
            cast_id: job.cast_id,
        });
        if instant {
            self.complete_cast(actor_id, &job);
        } else if let Some(rec) = self.ability.get_mut(&actor_id) {
            rec.active = Some(job);
        }
        self.push_snapshot(actor_id);
    }

    fn complete_cast(&mut self, actor_id: ActorId, job: &CastJob) {
        self.apply_result(actor_id, &job.result);
        self.events.push(CombatEvent::CastCompleted {
            actor: actor_id,
            ability: job.ability.clone(),
            cast_id: job.cast_id,
        });
    }

    fn apply_result(&mut self, source: ActorId, result: &AbilityResult) {
        let Some(def) = self.catalog.get(&result.ability_id).cloned() else {
            return;
        };
        let now = self.time_ms;
        let mut hostile = false;
        for (eff, out) in def.effects.iter().zip(&result.effects) {
            for o in &out.outcomes {
                if o.outcome == OutcomeKind::NoEffect {
                    continue;
                }
                match eff.kind {
                    EffectKind::Damage => {
                        if o.amount > 0 {
                            if let Some(t) = self.actors.get_mut(o.target_id) {
                                t.hp.hp -= o.amount;
                                let fatal = !t.hp.alive();
                                hostile = true;
                                self.events.push(CombatEvent::Damage {
                                    source,
                                    target: o.target_id,
                                    amount: o.amount,
                                    fatal,
                                });
                            }
                        }
                    }
                    EffectKind::Healing => {
                        if o.amount > 0 {
                            if let Some(t) = self.actors.get_mut(o.target_id) {
                                t.hp.hp += o.amount;
                                t.hp.clamp();
                                self.events.push(CombatEvent::Healed {
                                    source,
                                    target: o.target_id,
                                    amount: o.amount,
                                });
                            }
                        }
                    }
                    EffectKind::Status => {
                        self.events.push(CombatEvent::StatusApplied {
                            source,
                            target: o.target_id,
                        });
                    }
                }
            }
        }
        if hostile {
            if let Some(rec) = self.ability.get_mut(&source) {
                rec.state.last_hostile_action_ms = now;
            }
        }
    }

    fn check_range(
        &self,
        caster: &Actor,
        target: &TargetSpec,
        def: &AbilityDef,
    ) -> Result<(), RejectReason> {
        let dist = match target {
            TargetSpec::Entity { id } => {
                let t = self.actors.get(*id).ok_or(RejectReason::Illegal)?;
                caster.tr.pos.distance(t.tr.pos) - caster.tr.radius - t.tr.radius
            }
            TargetSpec::Ground { point, .. } => caster.tr.pos.distance(Vec3::from_array(*point)),
        };
        if def.range_m > 0.0 && dist > def.range_m {
            return Err(RejectReason::OutOfRange);
        }
        Ok(())
    }

    fn collect_candidates(
        &self,
        caster: ActorId,
        target: &TargetSpec,
        def: &AbilityDef,
    ) -> Vec<TargetRef> {
        let mut out = Vec::new();
        if let Some(c) = self.target_ref(caster) {
            out.push(c);
        }
        match target {
            TargetSpec::Entity { id } => {
                if *id != caster {
                    if let Some(t) = self.target_ref(*id) {
                        out.push(t);
                    }
                }
            }
            TargetSpec::Ground { point, .. } => {
                let p = Vec3::from_array(*point);
                for a in self.actors.iter() {
                    if a.id == caster {
                        continue;
                    }
                    if a.tr.pos.distance(p) <= def.radius_m + a.tr.radius {
                        out.push(TargetRef {
                            id: a.id,
                            team: a.team,
                            alive: a.hp.alive(),
                        });
                    }
                }
            }
        }
        out
    }

    fn target_ref(&self, id: ActorId) -> Option<TargetRef> {
        self.actors.get(id).map(|a| TargetRef {
            id: a.id,
            team: a.team,
            alive: a.hp.alive(),
        })
    }

    fn refund(&mut self, id: ActorId, job: &CastJob) {
        if job.cost > 0 {
            if let Some(a) = self.actors.get_mut(id) {
                a.pool.mana += job.cost;
                a.pool.clamp();
            }
        }
    }

    fn push_snapshot(&mut self, id: ActorId) {
        if let Some(rec) = self.ability.get(&id) {
            self.snapshots.push(rec.state.snapshot(id));
        }
    }

    fn base_ack(&self, request_id: u64, sequence: u64) -> AbilityAck {
        AbilityAck {
            request_id,
            sequence,
            accepted: false,
            server_time_ms: self.time_ms,
            server_tick: self.tick,
            cast_start_time_ms: None,
            cast_end_time_ms: None,
            cast_id: None,
            gcd_start_time_ms: None,
            gcd_end_time_ms: None,
            result: None,
            reject_reason: None,
        }
    }
}
