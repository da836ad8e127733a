//! Client glue: optimistic ability timing and ack reconciliation.
//!
//! The `CombatController` predicts GCD/cooldown/cast windows ahead of server
//! confirmation, buffers at most one follow-up ability while a cast or GCD is
//! in flight, and reconciles against acks that may arrive late, reordered,
//! duplicated, or rejected. The server remains the single source of truth;
//! everything here is a forecast the next ack can overwrite.

#![deny(warnings, clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]

pub mod controller;
pub mod io;
pub mod prediction;

pub use controller::{AckOutcome, CombatController};
pub use io::{ChannelSink, CommandSink, TargetSource};
pub use prediction::{ActionPhase, PredictionSnapshot, PredictionState};
