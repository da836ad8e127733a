//! `net_core`: ability wire messages + in-proc replication plumbing.
//!
//! Scope
//! - JSON-shaped `ability_use` / `ability_cancel` / `ability_ack` messages
//! - Versioned length framing so multiplexed streams can delimit payloads
//! - A minimal byte channel and `Transport` trait for loopback tests
//!
//! The engine tolerates loss, duplication, and reordering of acks; nothing in
//! this crate provides ordering beyond what the caller sends.

#![deny(warnings, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod channel;
pub mod codec;
pub mod frame;
pub mod message;
pub mod transport;

pub use message::{
    AbilityAck, AbilityCancel, AbilityResult, AbilityStateSnapshot, AbilityUseRequest, CancelReason,
    ClientMsg, EffectOutcomes, OutcomeKind, RejectReason, ServerMsg, TargetOutcome, TargetSpec,
    UseCheck,
};
