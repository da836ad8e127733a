#![allow(clippy::unwrap_used)]

use client_core::{AckOutcome, CombatController, CommandSink, TargetSource};
use data_runtime::ids::{AbilityId, ActorId};
use data_runtime::AbilityCatalog;
use net_core::message::{
    AbilityAck, AbilityResult, CancelReason, ClientMsg, RejectReason, UseCheck,
};
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

fn last_use(rec: &Recorder) -> (u64, u64, AbilityId) {
    match rec.sent.last().expect("a message was sent") {
        ClientMsg::AbilityUse(r) => (r.request_id, r.sequence, r.ability_id.clone()),
        ClientMsg::AbilityCancel(_) => panic!("expected ability_use"),
    }
}

fn accept_ack(request_id: u64, sequence: u64, ability: &str, server_time_ms: i64) -> AbilityAck {
    AbilityAck {
        request_id,
        sequence,
        accepted: true,
        server_time_ms,
        server_tick: 0,
        cast_start_time_ms: Some(server_time_ms),
        cast_end_time_ms: Some(server_time_ms),
        cast_id: Some(1),
        gcd_start_time_ms: Some(server_time_ms),
        gcd_end_time_ms: Some(server_time_ms + 1500),
        result: Some(AbilityResult {
            ability_id: AbilityId::from(ability),
            use_check: UseCheck::Success,
            effects: Vec::new(),
        }),
        reject_reason: None,
    }
}

fn reject_ack(request_id: u64, sequence: u64, server_time_ms: i64) -> AbilityAck {
    AbilityAck {
        request_id,
        sequence,
        accepted: false,
        server_time_ms,
        server_tick: 0,
        cast_start_time_ms: None,
        cast_end_time_ms: None,
        cast_id: None,
        gcd_start_time_ms: None,
        gcd_end_time_ms: None,
        result: None,
        reject_reason: Some(RejectReason::Cooldown),
    }
}

#[test]
fn accepted_ack_projects_server_windows_by_clock_offset() {
    let mut c = controller();
    let mut rec = Recorder::default();
    c.try_use_ability(&AbilityId::from("shield_bash"), &FixedWorld, &mut rec, 1000);
    let (rid, seq, _) = last_use(&rec);

    // Server processed at its t=900; we hear back at local t=1100.
    let mut ack = accept_ack(rid, seq, "shield_bash", 900);
    ack.gcd_end_time_ms = Some(2400);
    assert_eq!(c.apply_ack(&ack, 1100), AckOutcome::Accepted);

    assert_eq!(c.clock_offset_ms(), 200);
    assert_eq!(c.state().gcd_start_ms, 1100);
    assert_eq!(c.state().gcd_end_ms, 2600, "server 2400 + offset 200");
    // Cooldown re-anchored to server cast start (900), projected local (1100).
    assert_eq!(
        c.ability_cooldown_end(&AbilityId::from("shield_bash")),
        Some(1100 + 8000)
    );
}

#[test]
fn buffered_second_ability_scenario_matches_offset_math() {
    let mut c = controller();
    let mut rec = Recorder::default();
    c.try_use_ability(&AbilityId::from("mend"), &FixedWorld, &mut rec, 3400);
    let (rid, seq, _) = last_use(&rec);

    // gcdStartTimeMs=3500 received at local t=3600 => offset 100.
    let mut ack = accept_ack(rid, seq, "mend", 3500);
    ack.gcd_start_time_ms = Some(3500);
    ack.gcd_end_time_ms = Some(5000);
    ack.cast_start_time_ms = Some(3500);
    ack.cast_end_time_ms = Some(5000);
    assert_eq!(c.apply_ack(&ack, 3600), AckOutcome::Accepted);

    assert_eq!(c.clock_offset_ms(), 100);
    assert_eq!(c.state().gcd_start_ms, 3600);
    assert_eq!(c.state().gcd_end_ms, 5000 + 100);
    assert_eq!(c.state().cast_end_ms, 5100);
}

#[test]
fn stale_ack_is_a_noop_even_when_accepted() {
    let mut c = controller();
    let mut rec = Recorder::default();
    let shot = AbilityId::from("quick_shot");
    c.try_use_ability(&shot, &FixedWorld, &mut rec, 0);
    let (rid1, seq1, _) = last_use(&rec);
    c.try_use_ability(&shot, &FixedWorld, &mut rec, 50);
    let (rid2, seq2, _) = last_use(&rec);

    let mut ack2 = accept_ack(rid2, seq2, "quick_shot", 40);
    ack2.gcd_start_time_ms = None;
    ack2.gcd_end_time_ms = None;
    assert_eq!(c.apply_ack(&ack2, 60), AckOutcome::Accepted);
    let icd_after = c.state().icd_end_ms;
    let offset_after = c.clock_offset_ms();

    // The older ack arrives late; it must change nothing.
    let ack1 = accept_ack(rid1, seq1, "quick_shot", 999);
    assert_eq!(c.apply_ack(&ack1, 2000), AckOutcome::Stale);
    assert_eq!(c.state().icd_end_ms, icd_after);
    assert_eq!(c.clock_offset_ms(), offset_after);
}

#[test]
fn foreign_ack_is_reported_and_ignored() {
    let mut c = controller();
    let mut rec = Recorder::default();
    c.try_use_ability(&AbilityId::from("shield_bash"), &FixedWorld, &mut rec, 0);
    let before_gcd = c.state().gcd_end_ms;
    let ack = accept_ack(0xDEAD, 77, "shield_bash", 0);
    assert_eq!(c.apply_ack(&ack, 10), AckOutcome::Foreign);
    assert_eq!(c.state().gcd_end_ms, before_gcd);
}

#[test]
fn reject_reverts_only_that_requests_optimism() {
    let mut c = controller();
    let mut rec = Recorder::default();
    c.try_use_ability(&AbilityId::from("shield_bash"), &FixedWorld, &mut rec, 1000);
    let (rid1, seq1, _) = last_use(&rec);
    // Confirm the first cast with zero offset: GCD 1000..2500.
    assert_eq!(
        c.apply_ack(&accept_ack(rid1, seq1, "shield_bash", 1000), 1000),
        AckOutcome::Accepted
    );
    let bash_cd = c.ability_cooldown_end(&AbilityId::from("shield_bash"));

    // Off-GCD follow-up while the GCD is still running.
    c.try_use_ability(&AbilityId::from("quick_shot"), &FixedWorld, &mut rec, 1600);
    let (rid2, seq2, _) = last_use(&rec);
    assert_eq!(c.state().icd_end_ms, 1600 + 1000, "optimistic ICD installed");

    // Server says no: exactly that optimism unwinds.
    assert_eq!(
        c.apply_ack(&reject_ack(rid2, seq2, 1650), 1700),
        AckOutcome::Rejected
    );
    assert_eq!(c.state().icd_end_ms, 0, "ICD reverted to available-now");
    assert_eq!(c.state().gcd_end_ms, 2500, "accepted GCD untouched");
    assert_eq!(
        c.ability_cooldown_end(&AbilityId::from("shield_bash")),
        bash_cd,
        "accepted cooldown untouched"
    );
}

#[test]
fn reject_of_older_request_reverts_it_while_newer_is_in_flight() {
    let mut c = controller();
    let mut rec = Recorder::default();
    let bash = AbilityId::from("shield_bash");
    let mend = AbilityId::from("mend");
    // Bash sent at t=0; mend queued and flushed before bash's ack arrives,
    // so both requests are optimistic at once.
    c.try_use_ability(&bash, &FixedWorld, &mut rec, 0);
    let (rid1, seq1, _) = last_use(&rec);
    c.try_use_ability(&mend, &FixedWorld, &mut rec, 600);
    c.fixed_tick(&FixedWorld, &mut rec, 700);
    let (rid2, seq2, ab2) = last_use(&rec);
    assert_eq!(ab2, mend);
    assert_ne!(rid1, rid2);

    // The older request is rejected first: exactly its optimism unwinds.
    assert_eq!(
        c.apply_ack(&reject_ack(rid1, seq1, 650), 700),
        AckOutcome::Rejected
    );
    assert_eq!(c.ability_cooldown_end(&bash), None, "bash cooldown reverted");
    assert_eq!(c.state().gcd_end_ms, 700 + 1500, "mend's optimistic GCD stands");
    assert!(c.prediction(800).casting, "mend's cast bar stands");

    // The later rejection then lands on a clean baseline.
    assert_eq!(
        c.apply_ack(&reject_ack(rid2, seq2, 750), 800),
        AckOutcome::Rejected
    );
    assert_eq!(c.state().gcd_end_ms, 0);
    assert!(!c.prediction(900).casting);
}

#[test]
fn reject_after_newer_accept_restores_authoritative_values() {
    let mut c = controller();
    let mut rec = Recorder::default();
    let bash = AbilityId::from("shield_bash");
    // Request 1 sent, then request 2 queued+flushed before ack 1 arrives.
    c.try_use_ability(&bash, &FixedWorld, &mut rec, 0);
    let (rid1, seq1, _) = last_use(&rec);
    c.try_use_ability(&bash, &FixedWorld, &mut rec, 600);
    c.fixed_tick(&FixedWorld, &mut rec, 1510);
    let (rid2, seq2, _) = last_use(&rec);
    assert_ne!(rid1, rid2);

    // Ack 1 (accepted) lands while request 2 is still optimistic.
    assert_eq!(
        c.apply_ack(&accept_ack(rid1, seq1, "shield_bash", 0), 0),
        AckOutcome::Accepted
    );
    // Request 2 rejected: rollback lands on ack 1's authoritative values.
    assert_eq!(
        c.apply_ack(&reject_ack(rid2, seq2, 1600), 1600),
        AckOutcome::Rejected
    );
    assert_eq!(c.state().gcd_end_ms, 1500, "ack 1's GCD window restored");
    assert_eq!(c.ability_cooldown_end(&bash), Some(8000));
}

#[test]
fn cancel_clears_queue_and_sends_cancel_for_active_cast() {
    let mut c = controller();
    let mut rec = Recorder::default();
    c.try_use_ability(&AbilityId::from("flame_strike"), &FixedWorld, &mut rec, 0);
    let (rid, _, _) = last_use(&rec);
    c.try_use_ability(&AbilityId::from("mend"), &FixedWorld, &mut rec, 600);
    assert!(c.queued_ability().is_some());

    c.cancel_active_cast(CancelReason::Moved, &mut rec, 800);
    assert!(c.queued_ability().is_none());
    assert!(!c.prediction(900).casting, "local cast bar stops");
    assert_eq!(c.state().gcd_end_ms, 1500, "GCD not rolled back locally");
    match rec.sent.last().unwrap() {
        ClientMsg::AbilityCancel(m) => {
            assert_eq!(m.request_id, rid);
            assert_eq!(m.reason, CancelReason::Moved);
        }
        ClientMsg::AbilityUse(_) => panic!("expected ability_cancel"),
    }
}
