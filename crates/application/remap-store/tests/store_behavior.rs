mod common;

use std::sync::atomic::Ordering;

use common::{names, profiles, MemoryGateway};
use remap_core::{ProfileError, ProfileId, Repair};
use remap_store::{LoadStatus, ProfileStore, StoreEvent};

fn published_revisions(events: &[StoreEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|e| match e {
            StoreEvent::Published(s) => Some(s.revision()),
            _ => None,
        })
        .collect()
}

#[test]
fn append_select_remove_scenario() {
    let gw = MemoryGateway::with_profiles(profiles(&["P1"], 0));
    let store = ProfileStore::open(gw.clone()).unwrap();
    assert_eq!(store.load_status(), &LoadStatus::Loaded);
    let p1 = store.snapshot().profiles()[0].id;

    let (snap, p2) = store.append();
    assert_eq!(snap.len(), 2);
    assert_eq!(snap.selected().id, p1);

    let snap = store.select(p2).unwrap();
    assert_eq!(snap.selected().id, p2);

    let snap = store.remove(p1).unwrap();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap.selected().id, p2);

    let before = store.snapshot();
    assert_eq!(store.remove(p2), Err(ProfileError::LastProfile));
    assert_eq!(*store.snapshot(), *before);
}

#[test]
fn move_scenario_keeps_selection() {
    let store = ProfileStore::open(MemoryGateway::with_profiles(profiles(&["P1", "P2", "P3"], 0)))
        .unwrap();

    let snap = store.move_profile(2, 0).unwrap();
    assert_eq!(names(&snap), ["P3", "P1", "P2"]);
    assert_eq!(snap.selected().name, "P1");
}

#[test]
fn every_mutation_is_saved_then_published_in_order() {
    let gw = MemoryGateway::with_profiles(profiles(&["A"], 0));
    let store = ProfileStore::open(gw.clone()).unwrap();
    let mut sub = store.subscribe();

    let (_, b) = store.append();
    store.rename(b, "B").unwrap();
    store.select(b).unwrap();
    store.duplicate(b).unwrap();
    store.move_profile(0, 2).unwrap();
    store.flush();

    let events = sub.drain();
    assert_eq!(published_revisions(&events), [1, 2, 3, 4, 5]);

    let saved = gw.saved_revisions();
    assert!(saved.windows(2).all(|w| w[0] < w[1]), "saves out of order: {saved:?}");
    assert_eq!(saved.last(), Some(&5));
    assert_eq!(gw.saved.lock().unwrap().last().unwrap(), &*store.snapshot());
}

#[test]
fn repeated_select_publishes_once() {
    let store = ProfileStore::open(MemoryGateway::with_profiles(profiles(&["A", "B"], 0))).unwrap();
    let b = store.snapshot().profiles()[1].id;
    let mut sub = store.subscribe();

    let first = store.select(b).unwrap();
    let second = store.select(b).unwrap();

    assert_eq!(*first, *second);
    assert_eq!(published_revisions(&sub.drain()), [1]);
}

#[test]
fn rejected_operations_publish_nothing() {
    let gw = MemoryGateway::with_profiles(profiles(&["A", "B"], 0));
    let store = ProfileStore::open(gw.clone()).unwrap();
    let mut sub = store.subscribe();
    let before = store.snapshot();
    let ghost = ProfileId::new();

    assert_eq!(store.select(ghost), Err(ProfileError::NotFound(ghost)));
    assert_eq!(store.rename(ghost, "x"), Err(ProfileError::NotFound(ghost)));
    assert!(matches!(store.duplicate(ghost), Err(ProfileError::NotFound(_))));
    assert_eq!(
        store.move_profile(0, 2),
        Err(ProfileError::IndexOutOfRange { index: 2, len: 2 })
    );
    store.flush();

    assert!(sub.drain().is_empty());
    assert!(gw.saved_revisions().is_empty());
    assert_eq!(*store.snapshot(), *before);
}

#[test]
fn failed_load_falls_back_to_default_profile() {
    let store = ProfileStore::open(MemoryGateway::failing_load("permission denied")).unwrap();

    match store.load_status() {
        LoadStatus::Fallback { reason } => assert!(reason.contains("permission denied")),
        other => panic!("expected fallback, got {other:?}"),
    }
    let snap = store.snapshot();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap.selected().name, "Default profile");
    assert!(snap.selected().configuration.is_empty());
}

#[test]
fn invalid_load_is_repaired() {
    let mut loaded = profiles(&["A", "B", "C"], 1);
    loaded[2].selected = true;
    let gw = MemoryGateway::with_profiles(loaded);
    let store = ProfileStore::open(gw.clone()).unwrap();

    assert_eq!(
        store.load_status(),
        &LoadStatus::Repaired(vec![Repair::ClearedExtraSelections { count: 1 }])
    );
    assert_eq!(store.snapshot().selected().name, "B");

    store.flush();
    assert_eq!(gw.saved_revisions(), [0], "the repaired load is stored once");
}

#[test]
fn clean_load_is_not_saved_back() {
    let gw = MemoryGateway::with_profiles(profiles(&["A", "B"], 0));
    let store = ProfileStore::open(gw.clone()).unwrap();
    store.flush();
    assert!(gw.saved_revisions().is_empty());
}

#[test]
fn named_append_publishes_one_revision() {
    let store = ProfileStore::open(MemoryGateway::with_profiles(profiles(&["A"], 0))).unwrap();
    let mut sub = store.subscribe();

    let (snap, id) = store.append_named("Travel");
    assert_eq!(snap.revision(), 1);
    assert_eq!(snap.get(id).unwrap().name, "Travel");
    assert_eq!(published_revisions(&sub.drain()), [1]);
}

#[test]
fn persistence_failure_is_reported_without_rollback() {
    let gw = MemoryGateway::with_profiles(profiles(&["A"], 0));
    gw.fail_saves.store(true, Ordering::SeqCst);
    let store = ProfileStore::open(gw.clone()).unwrap();
    let mut sub = store.subscribe();

    let (snap, _) = store.append();
    store.flush();

    assert_eq!(store.snapshot().revision(), snap.revision());
    assert_eq!(store.snapshot().len(), 2);

    let events = sub.drain();
    assert!(matches!(&events[0], StoreEvent::Published(s) if s.revision() == 1));
    assert!(events.iter().any(|e| matches!(
        e,
        StoreEvent::PersistenceFailed { revision: 1, message } if message.contains("disk full")
    )));

    gw.fail_saves.store(false, Ordering::SeqCst);
    store.append();
    store.flush();
    assert_eq!(gw.saved_revisions(), [2]);
}

#[test]
fn dropping_subscription_unregisters_it() {
    let store = ProfileStore::open(MemoryGateway::default()).unwrap();
    let keep = store.subscribe();
    let gone = store.subscribe();
    assert_eq!(store.observer_count(), 2);

    drop(gone);
    assert_eq!(store.observer_count(), 1);

    store.append();
    drop(keep);
    assert_eq!(store.observer_count(), 0);
}

#[test]
fn concurrent_mutations_stay_serialized() {
    let gw = MemoryGateway::with_profiles(profiles(&["A"], 0));
    let store = ProfileStore::open(gw.clone()).unwrap();
    let mut sub = store.subscribe();

    std::thread::scope(|s| {
        for t in 0..4 {
            let store = store.clone();
            s.spawn(move || {
                for i in 0..25 {
                    let (snap, id) = store.append();
                    snap.check().unwrap();
                    let _ = store.select(id);
                    if i % 3 == 0 {
                        let _ = store.remove(id);
                    }
                    let _ = store.move_profile(0, t % 2);
                }
            });
        }
    });
    store.flush();

    let snap = store.snapshot();
    snap.check().unwrap();

    let revisions = published_revisions(&sub.drain());
    let expected: Vec<u64> = (1..=snap.revision()).collect();
    assert_eq!(revisions, expected, "published revisions must have no gaps");
    assert_eq!(gw.saved_revisions().last(), Some(&snap.revision()));
}

#[tokio::test]
async fn async_subscriber_sees_each_snapshot() {
    let store = ProfileStore::open(MemoryGateway::default()).unwrap();
    let mut sub = store.subscribe();

    let (_, id) = store.append();
    store.rename(id, "Async").unwrap();

    match sub.recv().await {
        Some(StoreEvent::Published(s)) => assert_eq!(s.len(), 2),
        other => panic!("unexpected {other:?}"),
    }
    match sub.recv().await {
        Some(StoreEvent::Published(s)) => assert_eq!(s.get(id).unwrap().name, "Async"),
        other => panic!("unexpected {other:?}"),
    }
}
