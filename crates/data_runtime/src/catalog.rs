//! Immutable ability id -> definition lookup table.

use crate::ability::{AbilityDef, EffectDef, EffectKind, TargetRelation};
use crate::ids::AbilityId;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct AbilityCatalog {
    abilities: HashMap<AbilityId, AbilityDef>,
}

impl AbilityCatalog {
    #[must_use]
    pub fn from_defs(defs: Vec<AbilityDef>) -> Self {
        let mut abilities = HashMap::with_capacity(defs.len());
        for d in defs {
            abilities.insert(d.id.clone(), d);
        }
        Self { abilities }
    }

    #[must_use]
    pub fn get(&self, id: &AbilityId) -> Option<&AbilityDef> {
        self.abilities.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &AbilityId) -> bool {
        self.abilities.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AbilityDef> {
        self.abilities.values()
    }

    /// Built-in sample kit mirroring `data/abilities/`, for tests and demos
    /// that should not touch the filesystem.
    #[must_use]
    pub fn builtin() -> Self {
        let defs = vec![
            AbilityDef {
                id: AbilityId::from("shield_bash"),
                name: "Shield Bash".into(),
                cast_time_ms: 0,
                is_on_gcd: true,
                cooldown_ms: 8000,
                internal_cooldown_ms: 0,
                resource_cost: 10,
                range_m: 2.0,
                radius_m: 0.0,
                effects: vec![
                    EffectDef {
                        kind: EffectKind::Damage,
                        target: TargetRelation::Enemies,
                        amount: 20,
                    },
                    EffectDef {
                        kind: EffectKind::Status,
                        target: TargetRelation::Enemies,
                        amount: 1,
                    },
                ],
            },
            AbilityDef {
                id: AbilityId::from("flame_strike"),
                name: "Flame Strike".into(),
                cast_time_ms: 2000,
                is_on_gcd: true,
                cooldown_ms: 4000,
                internal_cooldown_ms: 0,
                resource_cost: 25,
                range_m: 30.0,
                radius_m: 4.0,
                effects: vec![EffectDef {
                    kind: EffectKind::Damage,
                    target: TargetRelation::Enemies,
                    amount: 35,
                }],
            },
            AbilityDef {
                id: AbilityId::from("mend"),
                name: "Mend".into(),
                cast_time_ms: 1500,
                is_on_gcd: true,
                cooldown_ms: 0,
                internal_cooldown_ms: 0,
                resource_cost: 20,
                range_m: 25.0,
                radius_m: 0.0,
                effects: vec![EffectDef {
                    kind: EffectKind::Healing,
                    target: TargetRelation::Allies,
                    amount: 30,
                }],
            },
            AbilityDef {
                id: AbilityId::from("quick_shot"),
                name: "Quick Shot".into(),
                cast_time_ms: 0,
                is_on_gcd: false,
                cooldown_ms: 0,
                internal_cooldown_ms: 1000,
                resource_cost: 5,
                range_m: 20.0,
                radius_m: 0.0,
                effects: vec![EffectDef {
                    kind: EffectKind::Damage,
                    target: TargetRelation::Enemies,
                    amount: 10,
                }],
            },
        ];
        Self::from_defs(defs)
    }
}
