#![allow(clippy::unwrap_used)]

use data_runtime::ids::AbilityId;
use data_runtime::loader;

#[test]
fn loads_single_ability_from_data_dir() {
    let def = loader::load_ability_def("abilities/shield_bash.json").expect("load shield_bash");
    assert_eq!(def.id, AbilityId::from("shield_bash"));
    assert_eq!(def.cast_time_ms, 0);
    assert!(def.is_on_gcd);
    assert_eq!(def.cooldown_ms, 8000);
    assert_eq!(def.effects.len(), 2);
}

#[test]
fn loads_catalog_and_matches_builtin() {
    let cat = loader::load_catalog().expect("load catalog");
    let builtin = data_runtime::AbilityCatalog::builtin();
    assert_eq!(cat.len(), builtin.len());
    for def in builtin.iter() {
        let loaded = cat.get(&def.id).expect("catalog entry present on disk");
        assert_eq!(loaded.cast_time_ms, def.cast_time_ms);
        assert_eq!(loaded.is_on_gcd, def.is_on_gcd);
        assert_eq!(loaded.cooldown_ms, def.cooldown_ms);
        assert_eq!(loaded.internal_cooldown_ms, def.internal_cooldown_ms);
        assert_eq!(loaded.effects.len(), def.effects.len());
    }
}

#[test]
fn missing_file_reports_path() {
    let err = loader::load_ability_def("abilities/nope.json").unwrap_err();
    assert!(format!("{err:#}").contains("nope.json"));
}
