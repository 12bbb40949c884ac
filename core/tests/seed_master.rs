//! Registry behavior: seeders, freezing, per-unit reseeding, reporting
//! and concurrent access.

use parking_lot::Mutex;
use seedmaster_core::{
    seeder, EngineId, Seed, SeedError, SeedMaster, SeedServiceConfig, SeedStatus, Seeder,
    UnitContext, INVALID_SEED,
};
use serde_json::{json, Value};
use std::{collections::BTreeSet, sync::Arc};

fn master(config: Value) -> SeedMaster {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = SeedServiceConfig::from_value(config).expect("config");
    SeedMaster::new(&config).expect("seed master")
}

/// A seeder recording every seed it is handed.
fn recording_seeder() -> (Seeder, Arc<Mutex<Vec<Seed>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    (seeder(move |_, seed| sink.lock().push(seed)), calls)
}

fn unit(event: u32) -> UnitContext {
    UnitContext::new(3, 0, event)
        .with_timestamp(1_650_000_000 + u64::from(event))
        .with_process_name("Sim")
}

#[test]
fn reseed_calls_the_seeder_once() {
    let m = master(json!({ "policy": "autoIncrement", "baseSeed": 100 }));
    let id = EngineId::module("A");
    let (seeder, calls) = recording_seeder();
    m.register_new_seeder(&id, Some(seeder)).unwrap();

    assert_eq!(m.reseed(&id).unwrap(), 100);
    assert_eq!(*calls.lock(), vec![100]);
    assert_eq!(m.reseed(&id).unwrap(), 100, "configured seed changed");
    assert_eq!(*calls.lock(), vec![100, 100]);
}

#[test]
fn engine_without_seeder_is_tracked() {
    let m = master(json!({ "policy": "autoIncrement", "baseSeed": 100 }));
    let id = EngineId::module("A");
    m.register_new_seeder(&id, None).unwrap();

    assert!(m.has_engine(&id));
    assert!(!m.has_seeder(&id));
    assert_eq!(m.reseed(&id).unwrap(), 100);
    assert_eq!(m.get_current_seed(&id), 100);
}

#[test]
fn frozen_engine_is_never_reseeded() {
    let m = master(json!({ "policy": "perEvent",
                           "initSeedPolicy": { "policy": "autoIncrement", "baseSeed": 10 } }));
    let id = EngineId::new("gen", "noise");
    let (seeder, calls) = recording_seeder();
    m.register_new_seeder(&id, Some(seeder)).unwrap();
    m.freeze_seed(&id, 4321).unwrap();

    assert!(m.is_frozen(&id));
    assert_eq!(m.reseed(&id).unwrap(), INVALID_SEED);
    for event in 1..=3 {
        m.on_new_unit();
        assert_eq!(m.reseed_for_unit(&id, &unit(event)).unwrap(), INVALID_SEED);
    }
    assert!(calls.lock().is_empty(), "seeder called on a frozen engine");
    assert_eq!(m.get_seed(&id).unwrap(), 4321);
    assert_eq!(m.get_unit_seed(&id, &unit(9)).unwrap(), 4321);
    assert_eq!(m.get_current_seed(&id), 4321);

    let row = m.report().row(&id).cloned().expect("frozen row");
    assert!(row.frozen);
    assert_eq!(row.status, SeedStatus::Same);
}

#[test]
fn policy_seed_may_not_reuse_a_frozen_seed() {
    let m = master(json!({ "policy": "autoIncrement", "baseSeed": 100 }));
    let frozen = EngineId::module("frozen");
    let a = EngineId::module("A");
    m.register_new_seeder(&frozen, None).unwrap();
    m.freeze_seed(&frozen, 100).unwrap();

    match m.get_seed(&a) {
        Err(SeedError::DuplicateSeed { seed, existing, requested }) => {
            assert_eq!(seed, 100);
            assert_eq!(existing, frozen);
            assert_eq!(requested, a);
        }
        other => panic!("expected DuplicateSeed, got {other:?}"),
    }
}

#[test]
fn frozen_engines_may_share_a_seed() {
    let m = master(json!({ "policy": "autoIncrement", "baseSeed": 100 }));
    let first = EngineId::module("first");
    let second = EngineId::module("second");
    for id in [&first, &second] {
        m.register_new_seeder(id, None).unwrap();
        m.freeze_seed(id, 7).unwrap();
    }
    assert_eq!(m.get_seed(&first).unwrap(), 7);
    assert_eq!(m.get_seed(&second).unwrap(), 7);
    assert_eq!(m.get_seed(&EngineId::module("A")).unwrap(), 100);
}

#[test]
fn per_unit_seeds_are_forgotten_between_units() {
    let m = master(json!({ "policy": "perEvent" }));
    let id = EngineId::new("gen", "noise");
    let (seeder, calls) = recording_seeder();
    m.register_new_seeder(&id, Some(seeder)).unwrap();

    assert_eq!(m.reseed(&id).unwrap(), INVALID_SEED);
    assert!(calls.lock().is_empty(), "invalid seed reached the seeder");

    m.on_new_unit();
    let first = m.reseed_for_unit(&id, &unit(1)).unwrap();
    assert_eq!(m.reseed_for_unit(&id, &unit(1)).unwrap(), first);

    m.on_new_unit();
    let second = m.reseed_for_unit(&id, &unit(2)).unwrap();
    assert_ne!(first, second);
    assert_eq!(*calls.lock(), vec![first, first, second]);

    let row = m.report().row(&id).cloned().expect("row");
    assert_eq!(row.status, SeedStatus::PerUnit);
    assert_eq!(row.current, second);
}

#[test]
fn job_level_policy_leaves_engines_alone_per_unit() {
    let m = master(json!({ "policy": "autoIncrement", "baseSeed": 7 }));
    let id = EngineId::module("A");
    let (seeder, calls) = recording_seeder();
    m.register_new_seeder(&id, Some(seeder)).unwrap();
    m.reseed(&id).unwrap();

    m.on_new_unit();
    assert_eq!(m.reseed_for_unit(&id, &unit(1)).unwrap(), INVALID_SEED);
    assert_eq!(*calls.lock(), vec![7]);
    assert_eq!(m.get_current_seed(&id), 7);
}

#[test]
fn report_covers_every_known_engine() {
    let m = master(json!({ "policy": "autoIncrement", "baseSeed": 100 }));
    let idle = EngineId::module("idle");
    let global = EngineId::global("flux");
    m.register_new_seeder(&idle, None).unwrap();
    m.register_new_seeder(&global, None).unwrap();
    m.get_seed(&global).unwrap();
    m.get_seed(&EngineId::module("adhoc")).unwrap();

    let report = m.report();
    assert_eq!(report.policy, "autoIncrement");
    assert_eq!(report.rows.len(), 3);
    assert_eq!(report.row(&idle).expect("idle").status, SeedStatus::Unseeded);
    assert!(report.row(&global).expect("global").global);

    let text = m.summary();
    assert!(text.contains("Summary of seeds computed by the seed service"), "{text}");
    assert!(text.contains("(not seeded)"), "{text}");
    assert!(text.contains("flux (global)"), "{text}");
    assert!(text.contains("(same)"), "{text}");
    assert!(!text.contains("[[ERROR!!!]]"), "{text}");

    let mut written = String::new();
    m.write_report(&mut written).unwrap();
    assert_eq!(written, text);
}

#[test]
fn report_flags_invalid_seeds() {
    let m = master(json!({ "policy": "perEvent" }));
    let id = EngineId::module("gen");
    m.get_seed(&id).unwrap();
    let report = m.report();
    assert_eq!(report.row(&id).expect("row").status, SeedStatus::Invalid);
    assert!(report.to_string().contains("INVALID!!!"));
}

#[test]
fn concurrent_queries_yield_distinct_seeds() {
    let m = master(json!({ "policy": "autoIncrement", "baseSeed": 1 }));
    let seeds = Mutex::new(Vec::new());

    std::thread::scope(|scope| {
        for thread in 0..8 {
            let m = &m;
            let seeds = &seeds;
            scope.spawn(move || {
                for n in 0..25 {
                    let id = EngineId::new(format!("mod{thread}"), format!("inst{n}"));
                    let seed = m.get_seed(&id).expect("seed");
                    seeds.lock().push(seed);
                }
            });
        }
    });

    let seeds = seeds.into_inner();
    let unique: BTreeSet<_> = seeds.iter().copied().collect();
    assert_eq!(seeds.len(), 200);
    assert_eq!(unique.len(), 200, "duplicate seeds handed out concurrently");
    assert_eq!(unique.iter().next(), Some(&1));
    assert_eq!(unique.iter().last(), Some(&200));
}

#[test]
fn concurrent_unit_reseeds_call_each_seeder_once_per_unit() {
    let m = master(json!({ "policy": "perEvent" }));
    let engines: Vec<_> = (0..8)
        .map(|n| {
            let id = EngineId::new("gen", format!("inst{n}"));
            let (seeder, calls) = recording_seeder();
            m.register_new_seeder(&id, Some(seeder)).unwrap();
            (id, calls)
        })
        .collect();

    for event in 1..=3 {
        m.on_new_unit();
        let ctx = unit(event);
        std::thread::scope(|scope| {
            for (id, _) in &engines {
                let m = &m;
                let ctx = &ctx;
                scope.spawn(move || {
                    let seed = m.reseed_for_unit(id, ctx).expect("unit seed");
                    assert_ne!(seed, INVALID_SEED);
                });
            }
        });

        for (id, calls) in &engines {
            let calls = calls.lock();
            assert_eq!(calls.len(), event as usize, "'{id}' not reseeded exactly once in unit {event}");
            assert_eq!(calls.last().copied(), Some(m.get_current_seed(id)));
        }
    }

    for (id, calls) in &engines {
        let seeds: BTreeSet<_> = calls.lock().iter().copied().collect();
        assert_eq!(seeds.len(), 3, "'{id}' got a repeated seed across units");
    }
}
