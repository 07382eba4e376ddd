use super::*;
use std::sync::atomic::AtomicUsize;

fn counting_handler(counter: Arc<AtomicUsize>) -> EventHandler<u32> {
    Arc::new(move |value: &u32| {
        counter.fetch_add(*value as usize, Ordering::SeqCst);
    })
}

#[test]
fn test_hub_starts_empty() {
    let hub: EventHub<u32> = EventHub::new("numbers");
    assert_eq!(hub.subscriber_count(), 0);
    assert_eq!(hub.publish(&1), 0);
}

#[test]
fn test_publish_reaches_subscriber() {
    let hub = EventHub::new("numbers");
    let counter = Arc::new(AtomicUsize::new(0));
    let _sub = hub.subscribe(counting_handler(counter.clone()));

    assert_eq!(hub.publish(&3), 1);
    assert_eq!(hub.publish(&4), 1);
    assert_eq!(counter.load(Ordering::SeqCst), 7);
}

#[test]
fn test_drop_unsubscribes() {
    let hub = EventHub::new("numbers");
    let counter = Arc::new(AtomicUsize::new(0));
    let sub = hub.subscribe(counting_handler(counter.clone()));
    assert_eq!(hub.subscriber_count(), 1);

    drop(sub);
    assert_eq!(hub.subscriber_count(), 0);
    hub.publish(&10);
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_explicit_unsubscribe_only_removes_own_handler() {
    let hub = EventHub::new("numbers");
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let sub_a = hub.subscribe(counting_handler(first.clone()));
    let _sub_b = hub.subscribe(counting_handler(second.clone()));

    sub_a.unsubscribe();
    hub.publish(&1);
    assert_eq!(first.load(Ordering::SeqCst), 0);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn test_subscription_outlives_hub() {
    let hub: EventHub<u32> = EventHub::new("numbers");
    let sub = hub.subscribe(Arc::new(|_: &u32| {}));
    drop(hub);
    // Releasing after the hub is gone must be a no-op.
    drop(sub);
}

#[test]
fn test_handler_may_publish_reentrantly() {
    let hub = Arc::new(EventHub::new("numbers"));
    let counter = Arc::new(AtomicUsize::new(0));
    let _counting = hub.subscribe(counting_handler(counter.clone()));

    let weak_hub = Arc::downgrade(&hub);
    let _reentrant = hub.subscribe(Arc::new(move |value: &u32| {
        if *value > 1 {
            if let Some(hub) = weak_hub.upgrade() {
                hub.publish(&(value - 1));
            }
        }
    }));

    hub.publish(&2);
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[test]
fn test_subscription_debug() {
    let sub = Subscription::new(|| {});
    assert!(format!("{:?}", sub).contains("active: true"));
}
