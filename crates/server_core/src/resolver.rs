//! Deterministic outcome resolver.
//!
//! Pure function of (ability, caster, candidate targets, seed): no mutable
//! state, no I/O. The client's optimistic prediction is approximating the
//! timing around this; the outcomes themselves are never predicted.

use crate::combat::{are_allied, are_hostile, Team};
use data_runtime::ability::{AbilityDef, EffectKind, TargetRelation};
use data_runtime::ids::ActorId;
use data_runtime::tuning;
use net_core::message::{AbilityResult, EffectOutcomes, OutcomeKind, TargetOutcome, UseCheck};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Minimal view of an actor the resolver needs.
#[derive(Copy, Clone, Debug)]
pub struct TargetRef {
    pub id: ActorId,
    pub team: Team,
    pub alive: bool,
}

#[must_use]
pub fn resolve(
    def: &AbilityDef,
    caster: TargetRef,
    candidates: &[TargetRef],
    seed: u64,
) -> AbilityResult {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let use_check = roll_use_check(&mut rng);
    let mut effects = Vec::with_capacity(def.effects.len());
    for eff in &def.effects {
        let mut outcomes = Vec::new();
        for t in candidates
            .iter()
            .filter(|t| t.alive && relation_matches(eff.target, caster, **t))
        {
            let (outcome, amount) = if !use_check.succeeded() || eff.amount == 0 {
                (OutcomeKind::NoEffect, 0)
            } else {
                match eff.kind {
                    EffectKind::Damage => roll_damage(&mut rng, eff.amount),
                    EffectKind::Healing => roll_healing(&mut rng, eff.amount),
                    // Status effects land whenever the use-check passed.
                    EffectKind::Status => (OutcomeKind::Hit, eff.amount),
                }
            };
            outcomes.push(TargetOutcome {
                target_id: t.id,
                outcome,
                amount,
            });
        }
        effects.push(EffectOutcomes { outcomes });
    }
    AbilityResult {
        ability_id: def.id.clone(),
        use_check,
        effects,
    }
}

fn relation_matches(rel: TargetRelation, caster: TargetRef, t: TargetRef) -> bool {
    match rel {
        TargetRelation::SelfOnly => t.id == caster.id,
        TargetRelation::Allies => are_allied(caster.team, t.team),
        TargetRelation::Enemies => are_hostile(caster.team, t.team),
        TargetRelation::All => true,
    }
}

fn roll_use_check(rng: &mut ChaCha8Rng) -> UseCheck {
    let r: f32 = rng.random();
    if r < tuning::USE_CRIT_FAILURE_CHANCE {
        UseCheck::CritFailure
    } else if r < tuning::USE_CRIT_FAILURE_CHANCE + tuning::USE_FAILURE_CHANCE {
        UseCheck::Failure
    } else if r
        < tuning::USE_CRIT_FAILURE_CHANCE
            + tuning::USE_FAILURE_CHANCE
            + tuning::USE_CRIT_SUCCESS_CHANCE
    {
        UseCheck::CritSuccess
    } else {
        UseCheck::Success
    }
}

/// One draw per tier, in fixed order, so replays with the same seed are
/// bit-reproducible regardless of which tier fires.
fn roll_damage(rng: &mut ChaCha8Rng, base: i32) -> (OutcomeKind, i32) {
    if rng.random::<f32>() < tuning::MISS_CHANCE {
        (OutcomeKind::Miss, 0)
    } else if rng.random::<f32>() < tuning::DODGE_CHANCE {
        (OutcomeKind::Dodge, 0)
    } else if rng.random::<f32>() < tuning::BLOCK_CHANCE {
        (OutcomeKind::Block, scale(base, tuning::BLOCK_MULTIPLIER))
    } else if rng.random::<f32>() < tuning::CRIT_CHANCE {
        (OutcomeKind::Crit, scale(base, tuning::CRIT_MULTIPLIER))
    } else {
        (OutcomeKind::Hit, base)
    }
}

/// Healing never misses; it rolls its own, independent crit chance.
fn roll_healing(rng: &mut ChaCha8Rng, base: i32) -> (OutcomeKind, i32) {
    if rng.random::<f32>() < tuning::HEAL_CRIT_CHANCE {
        (OutcomeKind::Crit, scale(base, tuning::CRIT_MULTIPLIER))
    } else {
        (OutcomeKind::Hit, base)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn scale(base: i32, mult: f32) -> i32 {
    (base as f32 * mult).round() as i32
}
