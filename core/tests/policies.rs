//! Seed assignment per policy, through the registry.

use seedmaster_core::{
    EngineId, PolicyKind, SeedError, SeedMaster, SeedServiceConfig, SeedStatus, UnitContext,
    INVALID_SEED,
};
use serde_json::{json, Value};

fn master(config: Value) -> SeedMaster {
    let config = SeedServiceConfig::from_value(config).expect("config");
    SeedMaster::new(&config).expect("seed master")
}

fn unit(event: u32) -> UnitContext {
    UnitContext::new(1, 2, event)
        .with_timestamp(1_600_000_000)
        .with_process_name("Test")
}

#[test]
fn auto_increment_counts_in_request_order() {
    let m = master(json!({ "policy": "autoIncrement", "baseSeed": 100 }));
    let a = EngineId::module("A");
    let b = EngineId::module("B");
    let bx = EngineId::new("B", "x");

    assert_eq!(m.get_seed(&a).unwrap(), 100);
    assert_eq!(m.get_seed(&b).unwrap(), 101);
    assert_eq!(m.get_seed(&bx).unwrap(), 102);
    assert_eq!(m.get_seed(&a).unwrap(), 100, "repeated query changed the seed");

    let report = m.report();
    for (id, seed) in [(&a, 100), (&b, 101), (&bx, 102)] {
        let row = report.row(id).expect("row for every engine");
        assert_eq!(row.configured, seed);
        assert_eq!(row.current, seed);
        assert_eq!(row.status, SeedStatus::Same);
    }
}

#[test]
fn auto_increment_range_is_enforced() {
    let m = master(json!({ "policy": "autoIncrement", "baseSeed": 1, "maxUniqueEngines": 2 }));
    m.get_seed(&EngineId::module("A")).unwrap();
    m.get_seed(&EngineId::module("B")).unwrap();

    match m.get_seed(&EngineId::module("C")) {
        Err(SeedError::OutOfRange { seed, offset, max, .. }) => {
            assert_eq!(seed, 3);
            assert_eq!(offset, 2);
            assert_eq!(max, 2);
        }
        other => panic!("expected OutOfRange, got {other:?}"),
    }
}

#[test]
fn auto_increment_range_check_can_be_disabled() {
    let m = master(json!({
        "policy": "autoIncrement", "baseSeed": 1, "maxUniqueEngines": 1, "checkRange": false
    }));
    m.get_seed(&EngineId::module("A")).unwrap();
    assert_eq!(m.get_seed(&EngineId::module("B")).unwrap(), 2);
}

#[test]
fn linear_mapping_uses_the_job_window() {
    let m = master(json!({ "policy": "linearMapping", "nJob": 4, "maxUniqueEngines": 5 }));
    let seeds: Vec<_> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|label| m.get_seed(&EngineId::module(*label)).unwrap())
        .collect();
    assert_eq!(seeds, vec![21, 22, 23, 24, 25]);
    assert!(matches!(
        m.get_seed(&EngineId::module("f")),
        Err(SeedError::OutOfRange { .. })
    ));
}

#[test]
fn linear_mapping_accepts_legacy_base_seed() {
    let m = master(json!({ "policy": "linearMapping", "baseSeed": 2, "maxUniqueEngines": 10 }));
    assert_eq!(m.get_seed(&EngineId::module("A")).unwrap(), 21);
}

#[test]
fn predefined_offset_adds_the_configured_offset() {
    let m = master(json!({
        "policy":   "preDefinedOffset",
        "baseSeed": 500,
        "gen":      { "noise": 1, "smear": 2 },
        "sim":      3,
        "fluxer":   4
    }));
    assert_eq!(m.get_seed(&EngineId::new("gen", "noise")).unwrap(), 501);
    assert_eq!(m.get_seed(&EngineId::new("gen", "smear")).unwrap(), 502);
    assert_eq!(m.get_seed(&EngineId::module("sim")).unwrap(), 503);
    assert_eq!(m.get_seed(&EngineId::global("fluxer")).unwrap(), 504);
}

#[test]
fn predefined_offset_rejects_shared_seeds() {
    let m = master(json!({ "policy": "preDefinedOffset", "baseSeed": 10, "A": 1, "B": 1 }));
    let a = EngineId::module("A");
    let b = EngineId::module("B");
    assert_eq!(m.get_seed(&a).unwrap(), 11);

    match m.get_seed(&b) {
        Err(SeedError::DuplicateSeed { seed, existing, requested }) => {
            assert_eq!(seed, 11);
            assert_eq!(existing, a);
            assert_eq!(requested, b);
        }
        other => panic!("expected DuplicateSeed, got {other:?}"),
    }
}

#[test]
fn predefined_lookup_errors() {
    let m = master(json!({ "policy": "preDefinedOffset", "baseSeed": 0, "gen": { "a": 1 }, "sim": 2 }));
    assert!(matches!(
        m.get_seed(&EngineId::module("reco")),
        Err(SeedError::MissingMapping { .. })
    ));
    assert!(matches!(
        m.get_seed(&EngineId::new("gen", "b")),
        Err(SeedError::MissingMapping { .. })
    ));
    assert!(matches!(
        m.get_seed(&EngineId::module("gen")),
        Err(SeedError::Configuration { .. })
    ));
    assert!(matches!(
        m.get_seed(&EngineId::new("sim", "x")),
        Err(SeedError::Configuration { .. })
    ));
}

#[test]
fn predefined_seed_allows_shared_seeds() {
    let m = master(json!({ "policy": "preDefinedSeed", "A": 7, "B": 7 }));
    assert_eq!(m.get_seed(&EngineId::module("A")).unwrap(), 7);
    assert_eq!(m.get_seed(&EngineId::module("B")).unwrap(), 7);
}

#[test]
fn random_seeds_are_valid_and_distinct() {
    let m = master(json!({ "policy": "random", "masterSeed": 99 }));
    let mut seeds: Vec<_> = (0..50)
        .map(|i| m.get_seed(&EngineId::module(format!("m{i}"))).unwrap())
        .collect();
    assert!(seeds.iter().all(|&s| (1..=900_000_000).contains(&s)));
    seeds.sort_unstable();
    seeds.dedup();
    assert_eq!(seeds.len(), 50);
}

#[test]
fn per_event_seeds_change_with_the_unit() {
    let m = master(json!({ "policy": "perEvent" }));
    let id = EngineId::new("gen", "noise");

    assert_eq!(m.get_seed(&id).unwrap(), INVALID_SEED, "no pre-unit policy configured");

    let first = m.get_unit_seed(&id, &unit(1)).unwrap();
    assert_ne!(first, INVALID_SEED);
    assert_eq!(m.get_unit_seed(&id, &unit(1)).unwrap(), first, "per-unit seed not cached");

    m.on_new_unit();
    let second = m.get_unit_seed(&id, &unit(2)).unwrap();
    assert_ne!(first, second);

    let other = m.get_unit_seed(&EngineId::new("gen", "smear"), &unit(2)).unwrap();
    assert_ne!(other, second);
}

#[test]
fn per_event_needs_a_timestamp() {
    let m = master(json!({ "policy": "perEvent" }));
    let ctx = UnitContext::new(1, 0, 1).with_process_name("Test");
    assert!(matches!(
        m.get_unit_seed(&EngineId::module("gen"), &ctx),
        Err(SeedError::InvalidContext { .. })
    ));
}

#[test]
fn per_event_offset_shifts_every_seed() {
    let plain = master(json!({ "policy": "perEvent" }));
    let shifted = master(json!({ "policy": "perEvent", "offset": 5 }));
    let id = EngineId::module("gen");
    assert_eq!(
        shifted.get_unit_seed(&id, &unit(3)).unwrap(),
        plain.get_unit_seed(&id, &unit(3)).unwrap() + 5
    );
}

#[test]
fn per_event_falls_back_before_the_first_unit() {
    let m = master(json!({
        "policy":         "perEvent",
        "algorithm":      "EventTimestamp_v1",
        "initSeedPolicy": { "policy": "preDefinedSeed", "gen": { "noise": 3 } }
    }));
    assert_eq!(m.get_seed(&EngineId::new("gen", "noise")).unwrap(), 3);
}

#[test]
fn job_level_policies_have_no_unit_seeds() {
    for config in [
        json!({ "policy": "autoIncrement", "baseSeed": 1 }),
        json!({ "policy": "random", "masterSeed": 1 }),
        json!({ "policy": "preDefinedSeed", "A": 9 }),
    ] {
        let m = master(config);
        assert!(!m.policy_kind().has_unit_seeds());
        assert_eq!(m.get_unit_seed(&EngineId::module("A"), &unit(1)).unwrap(), INVALID_SEED);
    }
}

#[test]
fn unknown_policy_is_rejected() {
    let config = SeedServiceConfig::from_value(json!({ "policy": "unDefined" })).unwrap();
    match SeedMaster::new(&config) {
        Err(SeedError::UnknownPolicy { name, known }) => {
            assert_eq!(name, "unDefined");
            for kind in PolicyKind::ALL {
                assert!(known.contains(kind.name()), "{known}");
            }
        }
        Err(other) => panic!("expected UnknownPolicy, got {other}"),
        Ok(_) => panic!("expected UnknownPolicy"),
    }
}

#[test]
fn invalid_configurations_fail_at_construction() {
    for config in [
        json!({ "policy": "autoIncrement" }),
        json!({ "policy": "linearMapping", "nJob": 0 }),
        json!({ "policy": "autoIncrement", "baseSeed": 1, "checkRange": true }),
        json!({ "policy": "perEvent", "algorithm": "EventTimestamp_v9" }),
        json!({ "policy": "perEvent", "initSeedPolicy": { "policy": "nope" } }),
    ] {
        let parsed = SeedServiceConfig::from_value(config.clone()).unwrap();
        assert!(SeedMaster::new(&parsed).is_err(), "accepted: {config}");
    }
}
