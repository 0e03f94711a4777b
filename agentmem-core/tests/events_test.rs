use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agentmem_core::model::{EntryId, EntryKind, Scope};
use agentmem_core::{ChangeAction, ChangeEvent, EventBus};

fn sample_event() -> ChangeEvent {
    ChangeEvent::new(
        EntryKind::Guideline,
        EntryId::new("g-1"),
        &Scope::Project {
            id: "P".to_string(),
        },
        ChangeAction::Create,
    )
}

#[test]
fn subscribers_are_delivered_in_arrival_order() {
    let bus = EventBus::new();
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    let o1 = order.clone();
    bus.subscribe(move |_| o1.lock().unwrap().push(1));
    let o2 = order.clone();
    bus.subscribe(move |_| o2.lock().unwrap().push(2));

    bus.emit(&sample_event());
    assert_eq!(*order.lock().unwrap(), vec![1, 2]);
}

#[test]
fn a_panicking_subscriber_does_not_block_the_rest() {
    let bus = EventBus::new();
    let delivered = Arc::new(AtomicUsize::new(0));

    bus.subscribe(|_| panic!("boom"));
    let d = delivered.clone();
    bus.subscribe(move |_| {
        d.fetch_add(1, Ordering::SeqCst);
    });

    bus.emit(&sample_event());
    assert_eq!(delivered.load(Ordering::SeqCst), 1);
}

#[test]
fn unsubscribe_during_emission_does_not_corrupt_the_current_pass() {
    let bus = Arc::new(EventBus::new());
    let delivered = Arc::new(AtomicUsize::new(0));

    let bus_clone = bus.clone();
    let d = delivered.clone();
    let first_id = Arc::new(std::sync::Mutex::new(None));
    let first_id_setter = first_id.clone();
    let id = bus.subscribe(move |_| {
        d.fetch_add(1, Ordering::SeqCst);
        if let Some(id) = *first_id_setter.lock().unwrap() {
            bus_clone.unsubscribe(id);
        }
    });
    *first_id.lock().unwrap() = id;

    let d2 = delivered.clone();
    bus.subscribe(move |_| {
        d2.fetch_add(1, Ordering::SeqCst);
    });

    bus.emit(&sample_event());
    assert_eq!(delivered.load(Ordering::SeqCst), 2);
    assert_eq!(bus.subscriber_count(), 1);
}

#[test]
fn excess_subscribers_are_dropped_not_panicked() {
    let bus = EventBus::new();
    for _ in 0..agentmem_core::constants::MAX_EVENT_SUBSCRIBERS {
        assert!(bus.subscribe(|_| {}).is_some());
    }
    assert!(bus.subscribe(|_| {}).is_none());
}
