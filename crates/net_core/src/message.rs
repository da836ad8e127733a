//! Wire message schema (bidirectional, JSON-shaped, camelCase).
//!
//! Timestamps suffixed `_time_ms` are milliseconds on the sender's clock;
//! server timestamps are projected onto the local clock by the client's
//! per-ack offset estimate, never trusted raw.

use data_runtime::ids::{AbilityId, ActorId};
use serde::{Deserialize, Serialize};

/// Client -> server messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    AbilityUse(AbilityUseRequest),
    AbilityCancel(AbilityCancel),
}

/// Server -> client messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    AbilityAck(AbilityAck),
}

/// Entity- or ground-targeted aim for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSpec {
    Entity { id: ActorId },
    Ground { point: [f32; 3], dir: [f32; 3] },
}

/// Sent once per admitted attempt. Cancellation is a distinct message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityUseRequest {
    /// Client-generated unique token for this attempt.
    pub request_id: u64,
    /// Strictly increasing per actor, assigned at send time, never reused.
    pub sequence: u64,
    pub client_tick: u64,
    pub actor_id: ActorId,
    pub ability_id: AbilityId,
    pub target: TargetSpec,
    pub client_time_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    Moved,
    Stunned,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityCancel {
    pub request_id: u64,
    pub sequence: u64,
    pub client_tick: u64,
    pub actor_id: ActorId,
    pub reason: CancelReason,
    pub client_time_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    Illegal,
    Cooldown,
    Resources,
    OutOfRange,
    Stunned,
    Silenced,
    Disarmed,
    Rooted,
    BufferFull,
    BufferWindowClosed,
    Other,
}

/// Global use-check rolled once per accepted cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCheck {
    Success,
    CritSuccess,
    Failure,
    CritFailure,
}

impl UseCheck {
    #[must_use]
    pub fn succeeded(self) -> bool {
        matches!(self, Self::Success | Self::CritSuccess)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Hit,
    Crit,
    Block,
    Dodge,
    Miss,
    NoEffect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetOutcome {
    pub target_id: ActorId,
    pub outcome: OutcomeKind,
    /// Post-multiplier magnitude; 0 for miss/dodge/no_effect.
    pub amount: i32,
}

/// Outcomes of one effect, in the order targets were resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectOutcomes {
    pub outcomes: Vec<TargetOutcome>,
}

/// Deterministic result of one accepted cast, embedded in the ack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityResult {
    pub ability_id: AbilityId,
    pub use_check: UseCheck,
    /// One entry per effect in ability definition order.
    pub effects: Vec<EffectOutcomes>,
}

/// Server's authoritative response to a use request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityAck {
    pub request_id: u64,
    pub sequence: u64,
    pub accepted: bool,
    /// Server clock at processing time; basis for the client's offset.
    pub server_time_ms: i64,
    pub server_tick: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast_start_time_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast_end_time_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcd_start_time_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcd_end_time_ms: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AbilityResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject_reason: Option<RejectReason>,
}

/// Plain immutable replica of the server's per-actor ability state, pushed by
/// the server simulation after each mutation. Diffing is the transport
/// layer's concern, not this core's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityStateSnapshot {
    pub actor_id: ActorId,
    pub gcd_end_time_ms: i64,
    pub internal_cooldown_end_time_ms: i64,
    pub cast_start_time_ms: i64,
    pub cast_end_time_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast_ability_id: Option<AbilityId>,
    /// Monotonic per actor; 0 = never cast.
    pub cast_id: u64,
    pub last_hostile_action_time_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_skips_absent_fields() {
        let ack = AbilityAck {
            request_id: 7,
            sequence: 3,
            accepted: false,
            server_time_ms: 100,
            server_tick: 6,
            cast_start_time_ms: None,
            cast_end_time_ms: None,
            cast_id: None,
            gcd_start_time_ms: None,
            gcd_end_time_ms: None,
            result: None,
            reject_reason: Some(RejectReason::Cooldown),
        };
        let v = serde_json::to_value(ServerMsg::AbilityAck(ack)).expect("json");
        assert_eq!(v["type"], "ability_ack");
        assert_eq!(v["rejectReason"], "cooldown");
        assert!(v.get("castStartTimeMs").is_none());
        assert!(v.get("gcdEndTimeMs").is_none());
    }
}
