use std::sync::{Arc, Mutex};

use serde_json::{json, Map};

use scopestack_nav::{
    FakeHistory, NavEntry, NavError, StackConfig, StackController, StackPhase, Transition,
};
use scopestack_persist::{ManualClock, MemoryStore, SharedSnapshots, SnapshotStore, SystemClock};

fn params(step: i64) -> Map<String, serde_json::Value> {
    let mut map = Map::new();
    map.insert("step".to_string(), json!(step));
    map
}

fn shared_memory() -> SharedSnapshots {
    Arc::new(Mutex::new(Box::new(MemoryStore::new()) as Box<dyn SnapshotStore>))
}

fn signup_stack() -> StackController {
    StackController::create(
        "signup",
        StackConfig::new("step1").screen("step2").screen("step3"),
        None,
        None,
        Arc::new(SystemClock),
    )
    .unwrap()
}

#[test]
fn mounts_at_a_single_root_entry() {
    let stack = signup_stack();
    assert_eq!(stack.phase(), StackPhase::Ready);
    assert_eq!(stack.entries(), vec![NavEntry::new("step1")]);
    assert_eq!(stack.peek().name, "step1");
}

#[test]
fn push_then_pop_is_a_strict_inverse() {
    let stack = signup_stack();
    let before = stack.entries();

    stack.push("step2", params(2)).unwrap();
    assert_eq!(stack.depth(), 2);
    assert_eq!(stack.peek().name, "step2");

    let popped = stack.pop().unwrap();
    assert_eq!(popped, NavEntry::with_params("step2", params(2)));
    assert_eq!(stack.entries(), before);
    assert_eq!(stack.peek().name, "step1");
}

#[test]
fn pop_at_root_is_a_no_op() {
    let stack = signup_stack();
    assert_eq!(stack.pop(), None);
    assert_eq!(stack.peek().name, "step1");
    assert_eq!(stack.depth(), 1);
}

#[test]
fn push_of_unlinked_screen_fails_loudly() {
    let stack = signup_stack();
    let err = stack.push("settings", Map::new()).unwrap_err();
    assert!(matches!(err, NavError::UnknownScreen { .. }));
    assert_eq!(stack.depth(), 1);
}

#[test]
fn reset_collapses_and_is_idempotent() {
    let stack = signup_stack();
    stack.push("step2", Map::new()).unwrap();
    stack.push("step3", Map::new()).unwrap();

    stack.reset(None).unwrap();
    assert_eq!(stack.entries(), vec![NavEntry::new("step1")]);
    stack.reset(None).unwrap();
    assert_eq!(stack.entries(), vec![NavEntry::new("step1")]);

    // An override must be a registered screen.
    stack.reset(Some("step3")).unwrap();
    assert_eq!(stack.entries(), vec![NavEntry::new("step3")]);
    assert!(matches!(
        stack.reset(Some("elsewhere")),
        Err(NavError::UnknownScreen { .. })
    ));
}

#[test]
fn history_markers_mirror_pushes_and_pops() {
    let history = Arc::new(FakeHistory::new());
    let stack = StackController::create(
        "signup",
        StackConfig::new("step1")
            .screen("step2")
            .screen("step3")
            .sync_history(true),
        None,
        Some(history.clone()),
        Arc::new(SystemClock),
    )
    .unwrap();

    stack.push("step2", Map::new()).unwrap();
    stack.push("step3", Map::new()).unwrap();
    let depths: Vec<usize> = history.markers().iter().map(|m| m.depth).collect();
    assert_eq!(depths, vec![2, 3]);

    // An in-app pop consumes the mirrored entry instead of pushing one.
    stack.pop().unwrap();
    assert_eq!(history.len(), 1);
}

#[test]
fn n_back_gestures_return_to_the_root() {
    let history = Arc::new(FakeHistory::new());
    let stack = StackController::create(
        "signup",
        StackConfig::new("step1")
            .screen("step2")
            .screen("step3")
            .sync_history(true),
        None,
        Some(history.clone()),
        Arc::new(SystemClock),
    )
    .unwrap();

    stack.push("step2", Map::new()).unwrap();
    stack.push("step3", Map::new()).unwrap();

    for _ in 0..2 {
        let marker = history.back_gesture("signup");
        stack.handle_history_pop(&marker);
    }

    assert_eq!(stack.entries(), vec![NavEntry::new("step1")]);
    assert!(history.is_empty());
}

#[test]
fn history_marker_ahead_of_stack_is_clamped() {
    let history = Arc::new(FakeHistory::new());
    let stack = StackController::create(
        "signup",
        StackConfig::new("step1").screen("step2").sync_history(true),
        None,
        Some(history.clone()),
        Arc::new(SystemClock),
    )
    .unwrap();
    stack.push("step2", Map::new()).unwrap();

    stack.handle_history_pop(&scopestack_nav::HistoryMarker {
        stack_id: "signup".to_string(),
        depth: 9,
    });
    assert_eq!(stack.depth(), 2);
    assert_eq!(stack.peek().name, "step2");
}

#[test]
fn markers_for_other_stacks_are_ignored() {
    let stack = signup_stack();
    stack.push("step2", Map::new()).unwrap();

    stack.handle_history_pop(&scopestack_nav::HistoryMarker {
        stack_id: "payment".to_string(),
        depth: 1,
    });
    assert_eq!(stack.depth(), 2);
}

#[test]
fn persisted_sequence_survives_a_remount() {
    let snapshots = shared_memory();
    let clock = Arc::new(ManualClock::new(0));
    let config = || {
        StackConfig::new("step1")
            .screen("step2")
            .screen("step3")
            .persist(true)
    };

    let stack = StackController::create(
        "signup",
        config(),
        Some(snapshots.clone()),
        None,
        clock.clone(),
    )
    .unwrap();
    stack.push("step2", params(2)).unwrap();
    stack.push("step3", params(3)).unwrap();
    stack.dispose();

    let remounted = StackController::create(
        "signup",
        config(),
        Some(snapshots.clone()),
        None,
        clock.clone(),
    )
    .unwrap();
    assert_eq!(remounted.depth(), 3);
    assert_eq!(remounted.peek(), NavEntry::with_params("step3", params(3)));
}

#[test]
fn stale_persisted_sequence_is_discarded() {
    let snapshots = shared_memory();
    let clock = Arc::new(ManualClock::new(0));
    let config = || {
        StackConfig::new("step1")
            .screen("step2")
            .persist(true)
            .ttl(std::time::Duration::from_secs(60))
    };

    let stack = StackController::create(
        "signup",
        config(),
        Some(snapshots.clone()),
        None,
        clock.clone(),
    )
    .unwrap();
    stack.push("step2", Map::new()).unwrap();
    stack.dispose();

    clock.advance(120_000);
    let remounted = StackController::create(
        "signup",
        config(),
        Some(snapshots.clone()),
        None,
        clock.clone(),
    )
    .unwrap();
    assert_eq!(remounted.entries(), vec![NavEntry::new("step1")]);
}

#[test]
fn snapshot_naming_unlinked_screens_is_discarded() {
    let snapshots = shared_memory();
    let clock = Arc::new(ManualClock::new(0));

    let stack = StackController::create(
        "signup",
        StackConfig::new("step1").screen("legacy_step").persist(true),
        Some(snapshots.clone()),
        None,
        clock.clone(),
    )
    .unwrap();
    stack.push("legacy_step", Map::new()).unwrap();
    stack.dispose();

    // The next release dropped `legacy_step` from the nav link.
    let remounted = StackController::create(
        "signup",
        StackConfig::new("step1").screen("step2").persist(true),
        Some(snapshots.clone()),
        None,
        clock.clone(),
    )
    .unwrap();
    assert_eq!(remounted.entries(), vec![NavEntry::new("step1")]);
}

#[test]
fn reset_clears_the_persisted_snapshot() {
    let snapshots = shared_memory();
    let clock = Arc::new(ManualClock::new(0));
    let config = || StackConfig::new("step1").screen("step2").persist(true);

    let stack = StackController::create(
        "signup",
        config(),
        Some(snapshots.clone()),
        None,
        clock.clone(),
    )
    .unwrap();
    stack.push("step2", Map::new()).unwrap();
    stack.reset(None).unwrap();
    stack.dispose();

    let remounted = StackController::create(
        "signup",
        config(),
        Some(snapshots.clone()),
        None,
        clock.clone(),
    )
    .unwrap();
    assert_eq!(remounted.entries(), vec![NavEntry::new("step1")]);
}

#[test]
fn disposed_stack_ignores_every_call() {
    let stack = signup_stack();
    stack.push("step2", Map::new()).unwrap();
    stack.dispose();

    assert_eq!(stack.phase(), StackPhase::Disposed);
    stack.push("step3", Map::new()).unwrap();
    assert_eq!(stack.pop(), None);
    stack.reset(None).unwrap();
    // The sequence is frozen as it was at dispose time.
    assert_eq!(stack.peek().name, "step2");
    assert_eq!(stack.depth(), 2);
}

#[test]
fn subscribers_see_the_new_top_and_transition() {
    let stack = StackController::create(
        "signup",
        StackConfig::new("step1")
            .screen("step2")
            .transition(Transition::Slide),
        None,
        None,
        Arc::new(SystemClock),
    )
    .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = seen.clone();
        stack.subscribe(move |top, transition| {
            seen.lock().unwrap().push((top.name.clone(), transition));
        });
    }

    stack.push("step2", Map::new()).unwrap();
    stack.pop().unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("step2".to_string(), Transition::Slide),
            ("step1".to_string(), Transition::Slide),
        ]
    );
}

#[test]
fn create_rejects_missing_collaborators() {
    assert!(matches!(
        StackController::create(
            "signup",
            StackConfig::new("step1").sync_history(true),
            None,
            None,
            Arc::new(SystemClock),
        ),
        Err(NavError::MissingHistory { .. })
    ));
    assert!(matches!(
        StackController::create(
            "signup",
            StackConfig::new("step1").persist(true),
            None,
            None,
            Arc::new(SystemClock),
        ),
        Err(NavError::MissingPersistence { .. })
    ));
}
