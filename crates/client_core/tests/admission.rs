#![allow(clippy::unwrap_used)]

use client_core::{CombatController, CommandSink, TargetSource};
use data_runtime::ids::{AbilityId, ActorId};
use data_runtime::AbilityCatalog;
use net_core::message::ClientMsg;
use std::sync::Arc;

struct FixedWorld;
impl TargetSource for FixedWorld {
    fn aim_origin(&self) -> [f32; 3] {
        [0.0, 0.6, 0.0]
    }
    fn aim_dir(&self) -> [f32; 3] {
        [0.0, 0.0, 1.0]
    }
    fn selected_target(&self) -> Option<ActorId> {
        Some(ActorId(9))
    }
}

#[derive(Default)]
struct Recorder {
    sent: Vec<ClientMsg>,
}
impl CommandSink for Recorder {
    fn send(&mut self, msg: &ClientMsg) -> bool {
        self.sent.push(msg.clone());
        true
    }
}

fn controller() -> CombatController {
    CombatController::new(ActorId(1), Arc::new(AbilityCatalog::builtin()))
}

fn uses(rec: &Recorder) -> Vec<(u64, AbilityId)> {
    rec.sent
        .iter()
        .filter_map(|m| match m {
            ClientMsg::AbilityUse(r) => Some((r.sequence, r.ability_id.clone())),
            ClientMsg::AbilityCancel(_) => None,
        })
        .collect()
}

#[test]
fn idle_triggers_send_exactly_once_with_increasing_sequence() {
    let mut c = controller();
    let mut rec = Recorder::default();
    let shot = AbilityId::from("quick_shot"); // off-GCD: stays Idle between calls
    c.try_use_ability(&shot, &FixedWorld, &mut rec, 0);
    c.try_use_ability(&shot, &FixedWorld, &mut rec, 10);
    c.try_use_ability(&shot, &FixedWorld, &mut rec, 20);
    let sent = uses(&rec);
    assert_eq!(sent.len(), 3);
    assert_eq!(
        sent.iter().map(|(s, _)| *s).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[test]
fn unknown_ability_is_a_silent_noop() {
    let mut c = controller();
    let mut rec = Recorder::default();
    c.try_use_ability(&AbilityId::from("not_a_spell"), &FixedWorld, &mut rec, 0);
    assert!(rec.sent.is_empty());
    assert!(c.queued_ability().is_none());
}

#[test]
fn off_gcd_ability_mid_cast_never_sends_and_never_queues() {
    let mut c = controller();
    let mut rec = Recorder::default();
    c.try_use_ability(&AbilityId::from("flame_strike"), &FixedWorld, &mut rec, 0);
    assert_eq!(uses(&rec).len(), 1);
    // 600ms into the 2000ms cast
    c.try_use_ability(&AbilityId::from("quick_shot"), &FixedWorld, &mut rec, 600);
    assert_eq!(uses(&rec).len(), 1, "no second send");
    assert!(c.queued_ability().is_none());
}

#[test]
fn on_gcd_attempt_before_window_opens_is_dropped() {
    let mut c = controller();
    let mut rec = Recorder::default();
    c.try_use_ability(&AbilityId::from("shield_bash"), &FixedWorld, &mut rec, 0);
    // Window opens 500ms after cast start; 100ms is too early.
    c.try_use_ability(&AbilityId::from("mend"), &FixedWorld, &mut rec, 100);
    assert_eq!(uses(&rec).len(), 1);
    assert!(c.queued_ability().is_none());
}

#[test]
fn open_window_queues_and_fixed_tick_flushes_exactly_once() {
    let mut c = controller();
    let mut rec = Recorder::default();
    let mend = AbilityId::from("mend");
    c.try_use_ability(&AbilityId::from("shield_bash"), &FixedWorld, &mut rec, 0);
    c.try_use_ability(&mend, &FixedWorld, &mut rec, 600);
    assert_eq!(uses(&rec).len(), 1, "queued, not sent");
    assert_eq!(c.queued_ability(), Some(&mend));

    c.fixed_tick(&FixedWorld, &mut rec, 616);
    let sent = uses(&rec);
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1], (2, mend.clone()));
    assert!(c.queued_ability().is_none());

    // Nothing left to flush.
    c.fixed_tick(&FixedWorld, &mut rec, 632);
    assert_eq!(uses(&rec).len(), 2);
}

#[test]
fn later_attempt_overwrites_the_queue_slot() {
    let mut c = controller();
    let mut rec = Recorder::default();
    c.try_use_ability(&AbilityId::from("shield_bash"), &FixedWorld, &mut rec, 0);
    c.try_use_ability(&AbilityId::from("mend"), &FixedWorld, &mut rec, 600);
    c.try_use_ability(&AbilityId::from("flame_strike"), &FixedWorld, &mut rec, 700);
    assert_eq!(c.queued_ability(), Some(&AbilityId::from("flame_strike")));
    c.fixed_tick(&FixedWorld, &mut rec, 716);
    let sent = uses(&rec);
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].1, AbilityId::from("flame_strike"));
}

#[test]
fn queued_ability_still_flushes_when_boundary_falls_between_ticks() {
    let mut c = controller();
    let mut rec = Recorder::default();
    c.try_use_ability(&AbilityId::from("shield_bash"), &FixedWorld, &mut rec, 0);
    c.try_use_ability(&AbilityId::from("mend"), &FixedWorld, &mut rec, 1499);
    // First tick after the GCD boundary (window closed at 1500).
    c.fixed_tick(&FixedWorld, &mut rec, 1510);
    assert_eq!(uses(&rec).len(), 2);
}
