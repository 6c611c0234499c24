//! End-to-end compilation and persistence of constraint specs.

use lineup_core::{EntityId, GroupId};
use lineup_spec::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn populated_store(n_entities: usize, n_groups: usize) -> InMemoryAttributeStore {
    let mut store = InMemoryAttributeStore::new();
    for i in 0..n_entities {
        store.insert_entity(
            EntityId::new(format!("driver-{:02}", i)),
            EntityConstraints::new(0.5 + 0.01 * i as f64, 0.3, 0.1).with_usage_bounds(0.0, 0.6),
        );
    }
    for g in 0..n_groups {
        store.insert_group(
            GroupId::new(format!("team-{}", g)),
            GroupConstraints::new(1.0, 0.9 + 0.01 * g as f64, 0.05).with_checkpoints(vec![100, 200]),
        );
    }
    store
}

fn entity_ids(n: usize) -> Vec<EntityId> {
    (0..n).map(|i| EntityId::new(format!("driver-{:02}", i))).collect()
}

fn group_ids(n: usize) -> Vec<GroupId> {
    (0..n).map(|g| GroupId::new(format!("team-{}", g))).collect()
}

#[test]
fn test_forty_entities_compile_within_budget() {
    let store = Arc::new(populated_store(40, 10));
    let compiler = ConstraintSpecCompiler::new(Arc::clone(&store));

    // Warm the store.
    compiler.compile_spec("warmup", &entity_ids(40), &group_ids(10)).unwrap();

    let start = Instant::now();
    let spec = compiler
        .compile_spec("slate-40", &entity_ids(40), &group_ids(10))
        .unwrap();
    assert!(start.elapsed() < Duration::from_millis(100));

    assert_eq!(spec.entity_count(), 40);
    assert_eq!(spec.group_count(), 10);
    assert_eq!(store.entity_batches(), 2);
    assert_eq!(store.group_batches(), 2);
}

#[test]
fn test_missing_ids_never_yield_partial_spec() {
    let store = populated_store(5, 1);
    let compiler = ConstraintSpecCompiler::new(&store);
    let mut ids = entity_ids(5);
    ids.push(EntityId::new("ghost-a"));
    ids.push(EntityId::new("ghost-b"));

    let err = compiler
        .compile_spec("slate", &ids, &group_ids(1))
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("ghost-a"));
    assert!(message.contains("ghost-b"));
    // Entity failure short-circuits before the group fetch.
    assert_eq!(store.group_batches(), 0);
}

#[test]
fn test_spec_and_run_config_persist_together() {
    let dir = tempfile::tempdir().unwrap();
    let store = populated_store(8, 2);
    let spec = ConstraintSpecCompiler::new(&store)
        .compile_spec("slate-8", &entity_ids(8), &group_ids(2))
        .unwrap();

    let spec_path = dir.path().join("spec.json");
    spec.save(&spec_path).unwrap();
    let loaded = ConstraintSpec::load(&spec_path).unwrap();
    assert_eq!(loaded, spec);
    assert_eq!(loaded.content_hash(), spec.content_hash());

    let config = RunConfig::new(
        "run-8",
        spec.content_hash(),
        SimParams::new(1_000).with_param("track", "daytona"),
        2024,
    )
    .unwrap();
    let config_path = dir.path().join("run.json");
    config.save(&config_path).unwrap();
    let restored = RunConfig::load(&config_path).unwrap();
    assert_eq!(restored, config);
    assert_eq!(restored.constraint_spec_hash(), loaded.content_hash());
}

#[test]
fn test_corrupted_spec_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = populated_store(3, 1);
    let spec = ConstraintSpecCompiler::new(&store)
        .compile_spec("slate-3", &entity_ids(3), &group_ids(1))
        .unwrap();
    let path = dir.path().join("spec.json");
    let json = spec.to_json().unwrap();
    let corrupted = json.replace(spec.content_hash(), &spec.content_hash()[..32]);
    std::fs::write(&path, corrupted).unwrap();

    let err = ConstraintSpec::load(&path).unwrap_err();
    assert!(err.is_hash_error());
}
