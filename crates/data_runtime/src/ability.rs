//! Ability schema. Maps closely to `data/abilities/*.json`.

use crate::ids::AbilityId;
use crate::tuning;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Damage,
    Healing,
    Status,
}

/// Which of the candidate targets an effect may touch, evaluated through
/// faction ally/enemy predicates relative to the caster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRelation {
    /// `"self"` on the wire; the Rust name dodges the keyword.
    #[serde(rename = "self")]
    SelfOnly,
    Allies,
    Enemies,
    All,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EffectDef {
    pub kind: EffectKind,
    pub target: TargetRelation,
    /// Base magnitude before outcome multipliers. Zero-magnitude effects
    /// resolve as `no_effect` rather than a zero-value hit.
    pub amount: i32,
}

/// Immutable ability definition, shared by client and server.
#[derive(Debug, Clone, Deserialize)]
pub struct AbilityDef {
    pub id: AbilityId,
    pub name: String,
    /// 0 = instant.
    pub cast_time_ms: u32,
    /// On-GCD abilities trigger and respect the global cooldown; off-GCD
    /// abilities ignore it but cannot be queued mid-cast.
    pub is_on_gcd: bool,
    #[serde(default)]
    pub cooldown_ms: u32,
    #[serde(default)]
    pub internal_cooldown_ms: u32,
    #[serde(default)]
    pub resource_cost: i32,
    /// 0 = unlimited range.
    #[serde(default)]
    pub range_m: f32,
    /// Area radius for ground-targeted abilities; 0 = single target.
    #[serde(default)]
    pub radius_m: f32,
    /// Ordered effect list; order is part of the RNG replay contract.
    pub effects: Vec<EffectDef>,
}

impl AbilityDef {
    /// GCD this ability triggers when used (0 for off-GCD abilities).
    #[must_use]
    pub fn gcd_ms(&self) -> u32 {
        if self.is_on_gcd { tuning::GCD_MS } else { 0 }
    }

    #[must_use]
    pub fn is_instant(&self) -> bool {
        self.cast_time_ms == 0
    }
}
