use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use scopestack_persist::{ManualClock, MemoryStore, SnapshotStore, StoreKey};
use scopestack_state::{ScopeRegistry, StateError, StoreConfig};

fn signup_config() -> StoreConfig {
    StoreConfig::new(json!({"fullName": "", "email": ""}))
        .persist(true)
        .ttl(Duration::from_secs(3600))
        .method("set_field", |mut state, args| {
            if let (Some(obj), Some(field), Some(value)) = (
                state.as_object_mut(),
                args.first().and_then(Value::as_str),
                args.get(1),
            ) {
                obj.insert(field.to_string(), value.clone());
            }
            state
        })
}

fn registry_with_clock(start_ms: i64) -> (ScopeRegistry, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start_ms));
    let registry = ScopeRegistry::new(Box::new(MemoryStore::new()), clock.clone());
    (registry, clock)
}

#[test]
fn mutations_fold_left_in_call_order() {
    let registry = ScopeRegistry::in_memory();
    let handle = registry
        .register(
            "math_flow",
            "acc",
            StoreConfig::new(json!(1))
                .method("add", |state, args| {
                    json!(state.as_i64().unwrap_or(0) + args[0].as_i64().unwrap_or(0))
                })
                .method("mul", |state, args| {
                    json!(state.as_i64().unwrap_or(0) * args[0].as_i64().unwrap_or(1))
                }),
        )
        .unwrap();

    handle.mutate("add", &[json!(4)]).unwrap();
    handle.mutate("mul", &[json!(3)]).unwrap();
    handle.mutate("add", &[json!(5)]).unwrap();

    // ((1 + 4) * 3) + 5
    assert_eq!(handle.state(), json!(20));
}

#[test]
fn unknown_method_fails_loudly() {
    let registry = ScopeRegistry::in_memory();
    let handle = registry
        .register("a_flow", "store", StoreConfig::new(json!(null)))
        .unwrap();

    let err = handle.mutate("missing", &[]).unwrap_err();
    assert!(matches!(err, StateError::UnknownMethod { .. }));
    // The failed call left the value untouched.
    assert_eq!(handle.state(), json!(null));
}

#[test]
fn same_key_registrations_share_one_store() {
    let registry = ScopeRegistry::in_memory();
    let first = registry
        .register(
            "shared_flow",
            "store",
            StoreConfig::new(json!(0)).method("inc", |state, _| {
                json!(state.as_i64().unwrap_or(0) + 1)
            }),
        )
        .unwrap();
    // Second registration with a different config: first one wins.
    let second = registry
        .register("shared_flow", "store", StoreConfig::new(json!(999)))
        .unwrap();

    assert_eq!(second.state(), json!(0));
    first.mutate("inc", &[]).unwrap();
    assert_eq!(second.state(), json!(1));
    // Methods from the winning config work through the second handle too.
    second.mutate("inc", &[]).unwrap();
    assert_eq!(first.state(), json!(2));
}

#[test]
fn signup_scenario_persists_within_ttl_and_clears_on_scope_clear() {
    let (registry, clock) = registry_with_clock(1_000);

    let handle = registry
        .register("signup_flow", "signup", signup_config())
        .unwrap();
    handle
        .mutate("set_field", &[json!("fullName"), json!("Ada Lovelace")])
        .unwrap();
    assert_eq!(
        handle.state(),
        json!({"fullName": "Ada Lovelace", "email": ""})
    );

    // Unmount, then remount within the TTL: hydrated from the snapshot.
    drop(handle);
    clock.advance(60_000);
    let handle = registry
        .register("signup_flow", "signup", signup_config())
        .unwrap();
    assert_eq!(
        handle.state(),
        json!({"fullName": "Ada Lovelace", "email": ""})
    );

    // Sign-out purge, then remount: back to the configured initial value.
    drop(handle);
    registry.clear_scope("signup_flow").unwrap();
    let handle = registry
        .register("signup_flow", "signup", signup_config())
        .unwrap();
    assert_eq!(handle.state(), json!({"fullName": "", "email": ""}));
}

#[test]
fn expired_store_is_absent_on_next_registration() {
    let (registry, clock) = registry_with_clock(0);
    let config = || {
        StoreConfig::new(json!("fresh"))
            .persist(true)
            .ttl(Duration::from_secs(60))
            .method("set", |_, args| args[0].clone())
    };

    let handle = registry.register("ttl_flow", "store", config()).unwrap();
    handle.mutate("set", &[json!("written")]).unwrap();
    drop(handle);

    // Within the TTL the old value survives the remount.
    clock.advance(59_000);
    let handle = registry.register("ttl_flow", "store", config()).unwrap();
    assert_eq!(handle.state(), json!("written"));
    drop(handle);

    // Past the TTL both the in-memory store and its snapshot are stale.
    clock.advance(120_000);
    let handle = registry.register("ttl_flow", "store", config()).unwrap();
    assert_eq!(handle.state(), json!("fresh"));
}

#[test]
fn clear_on_zero_subscribers_deletes_value_and_snapshot() {
    let (registry, _clock) = registry_with_clock(0);
    let config = || {
        StoreConfig::new(json!(0))
            .persist(true)
            .clear_on_zero_subscribers(true)
            .method("set", |_, args| args[0].clone())
    };

    let handle = registry.register("ephemeral_flow", "store", config()).unwrap();
    handle.mutate("set", &[json!(42)]).unwrap();

    // A second handle keeps the store alive past the first drop.
    let second = handle.clone();
    drop(handle);
    assert_eq!(second.state(), json!(42));

    drop(second);
    assert!(!registry.contains("ephemeral_flow", "store"));

    let handle = registry.register("ephemeral_flow", "store", config()).unwrap();
    assert_eq!(handle.state(), json!(0));
}

#[test]
fn value_retained_for_ttl_window_when_not_clearing_on_zero() {
    let (registry, clock) = registry_with_clock(0);
    let config = || {
        StoreConfig::new(json!("initial"))
            .ttl(Duration::from_secs(60))
            .method("set", |_, args| args[0].clone())
    };

    let handle = registry.register("keep_flow", "store", config()).unwrap();
    handle.mutate("set", &[json!("kept")]).unwrap();
    drop(handle);

    clock.advance(30_000);
    let handle = registry.register("keep_flow", "store", config()).unwrap();
    assert_eq!(handle.state(), json!("kept"));
}

#[test]
fn corrupted_snapshot_hydrates_as_initial() {
    let clock = Arc::new(ManualClock::new(0));
    let mut backing = MemoryStore::new();
    let key = StoreKey::new("broken_flow", "store").unwrap();
    // A snapshot from a future envelope version must be rejected.
    let mut snapshot = scopestack_persist::Snapshot::new(json!("poisoned"), 0);
    snapshot.version += 1;
    backing.save(&key, &snapshot).unwrap();

    let registry = ScopeRegistry::new(Box::new(backing), clock);
    let handle = registry
        .register(
            "broken_flow",
            "store",
            StoreConfig::new(json!("clean")).persist(true),
        )
        .unwrap();
    assert_eq!(handle.state(), json!("clean"));
}

#[test]
fn subscribers_notified_in_registration_order() {
    let registry = ScopeRegistry::in_memory();
    let handle = registry
        .register(
            "notify_flow",
            "store",
            StoreConfig::new(json!(0)).method("set", |_, args| args[0].clone()),
        )
        .unwrap();

    let order = Arc::new(Mutex::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let order = order.clone();
        handle.subscribe(move |_| order.lock().unwrap().push(tag));
    }

    handle.mutate("set", &[json!(1)]).unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
}

#[test]
fn reentrant_mutation_is_queued_not_recursed() {
    let registry = ScopeRegistry::in_memory();
    let handle = registry
        .register(
            "reentrant_flow",
            "store",
            StoreConfig::new(json!(0)).method("inc", |state, _| {
                json!(state.as_i64().unwrap_or(0) + 1)
            }),
        )
        .unwrap();

    let observed = Arc::new(Mutex::new(Vec::new()));
    let fired = Arc::new(AtomicUsize::new(0));
    {
        let handle = handle.clone();
        let observed = observed.clone();
        let fired = fired.clone();
        handle.clone().subscribe(move |value| {
            observed.lock().unwrap().push(value.clone());
            // Re-enter once from inside the notification cycle.
            if fired.fetch_add(1, Ordering::SeqCst) == 0 {
                handle.mutate("inc", &[]).unwrap();
            }
        });
    }

    handle.mutate("inc", &[]).unwrap();

    // Both mutations applied, one at a time, in order.
    assert_eq!(handle.state(), json!(2));
    assert_eq!(*observed.lock().unwrap(), vec![json!(1), json!(2)]);
}

#[test]
fn rollback_ring_is_bounded_by_history_depth() {
    let registry = ScopeRegistry::in_memory();
    let handle = registry
        .register(
            "undo_flow",
            "store",
            StoreConfig::new(json!(0))
                .history_depth(2)
                .method("set", |_, args| args[0].clone()),
        )
        .unwrap();

    for n in 1..=4 {
        handle.mutate("set", &[json!(n)]).unwrap();
    }

    assert!(handle.rollback());
    assert_eq!(handle.state(), json!(3));
    assert!(handle.rollback());
    assert_eq!(handle.state(), json!(2));
    // Depth 2: older states were evicted from the ring.
    assert!(!handle.rollback());
    assert_eq!(handle.state(), json!(2));
}

#[test]
fn reset_returns_to_initial_and_is_idempotent() {
    let registry = ScopeRegistry::in_memory();
    let handle = registry
        .register(
            "reset_flow",
            "store",
            StoreConfig::new(json!({"step": 0})).method("set", |_, args| args[0].clone()),
        )
        .unwrap();

    handle.mutate("set", &[json!({"step": 5})]).unwrap();
    handle.reset();
    assert_eq!(handle.state(), json!({"step": 0}));
    handle.reset();
    assert_eq!(handle.state(), json!({"step": 0}));
}

#[test]
fn clear_scope_spares_other_scopes() {
    let registry = ScopeRegistry::in_memory();
    let mission = registry
        .register(
            "mission_flow",
            "progress",
            StoreConfig::new(json!(1)).method("set", |_, args| args[0].clone()),
        )
        .unwrap();
    let payment = registry
        .register(
            "payment_flow",
            "checkout",
            StoreConfig::new(json!("open")).method("set", |_, args| args[0].clone()),
        )
        .unwrap();
    payment.mutate("set", &[json!("paid")]).unwrap();

    registry.clear_scope("mission_flow").unwrap();

    // The cleared scope's handle is inert; the other scope is untouched.
    mission.mutate("set", &[json!(9)]).unwrap();
    assert_eq!(mission.state(), json!(1));
    assert_eq!(payment.state(), json!("paid"));
}
