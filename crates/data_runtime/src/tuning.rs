//! Shared combat timing and outcome constants.
//!
//! Both sides read these from one place so the client's optimistic math and
//! the server's authoritative math cannot drift.

/// Global cooldown triggered by on-GCD abilities, in milliseconds.
pub const GCD_MS: u32 = 1500;

/// The ability queue window opens this long after the current cast's
/// predicted start (never immediately, so inputs mashed the instant a cast
/// begins cannot steal the buffer slot). It closes at
/// max(predicted cast end, predicted GCD end).
pub const QUEUE_WINDOW_OPEN_DELAY_MS: u32 = 500;

// Use-check ladder, one draw per cast. Remaining mass is plain success.
pub const USE_CRIT_FAILURE_CHANCE: f32 = 0.05;
pub const USE_FAILURE_CHANCE: f32 = 0.10;
pub const USE_CRIT_SUCCESS_CHANCE: f32 = 0.10;

// Per-target damage ladder, one draw per tier in fixed order.
pub const MISS_CHANCE: f32 = 0.25;
pub const DODGE_CHANCE: f32 = 0.10;
pub const BLOCK_CHANCE: f32 = 0.10;
pub const CRIT_CHANCE: f32 = 0.15;

/// Healing rolls its own crit chance and never misses.
pub const HEAL_CRIT_CHANCE: f32 = 0.20;

pub const BLOCK_MULTIPLIER: f32 = 0.5;
pub const CRIT_MULTIPLIER: f32 = 1.5;
