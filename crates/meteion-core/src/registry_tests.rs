use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};

fn echo() -> ActionHandler {
    Arc::new(|payload: &str| -> Result<String, ActionError> { Ok(format!("echo:{}", payload)) })
}

#[test]
fn test_registry_new_is_empty() {
    let registry = ActionRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
    assert!(registry.names().is_empty());
}

#[test]
fn test_registry_default() {
    let registry = ActionRegistry::default();
    assert!(registry.is_empty());
}

#[test]
fn test_dispatch_returns_handler_output() {
    let registry = ActionRegistry::new();
    registry.register("echo", echo());

    assert_eq!(registry.dispatch("echo", "hello"), "echo:hello");
    assert_eq!(registry.dispatch("echo", ""), "echo:");
}

#[test]
fn test_dispatch_is_case_insensitive() {
    let registry = ActionRegistry::new();
    registry.register("Query", echo());

    assert!(registry.contains("QUERY"));
    assert_eq!(registry.dispatch("query", "x"), "echo:x");
    assert_eq!(registry.dispatch("QuErY", "x"), "echo:x");
    assert_eq!(registry.names(), vec!["query".to_string()]);
}

#[test]
fn test_unknown_action_never_invokes_handler() {
    let registry = ActionRegistry::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    registry.register_fn("known", move |_| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        Ok(String::new())
    });

    let response = registry.dispatch("unknown", "payload");
    assert_eq!(response, "DoActionWrong(NoSuchAction):unknown");
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let err = registry.try_dispatch("unknown", "payload").unwrap_err();
    assert!(matches!(err, ActionError::NoSuchAction(_)));
}

#[test]
fn test_repeated_identical_registration_is_idempotent() {
    let registry = ActionRegistry::new();
    let handler = echo();
    registry.register("echo", handler.clone());
    registry.register("echo", handler);

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.dispatch("echo", "a"), "echo:a");
}

#[test]
fn test_last_registration_wins() {
    let registry = ActionRegistry::new();
    registry.register_fn("say", |_| Ok("first".to_string()));
    registry.register_fn("SAY", |_| Ok("second".to_string()));

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.dispatch("say", ""), "second");
}

#[test]
fn test_clear_removes_everything() {
    let registry = ActionRegistry::new();
    registry.register("a", echo());
    registry.register("b", echo());
    assert_eq!(registry.len(), 2);

    registry.clear();
    assert!(registry.is_empty());
    assert!(registry.dispatch("a", "").starts_with("DoActionWrong(NoSuchAction):"));
}

#[test]
fn test_handler_error_becomes_text() {
    let registry = ActionRegistry::new();
    registry.register_fn("strict", |payload| {
        Err(ActionError::InvalidCommand(payload.to_string()))
    });

    assert_eq!(
        registry.dispatch("strict", "bad"),
        "DoTextCommandWrong(InvalidCommand):bad"
    );
}

#[test]
fn test_panicking_handler_is_contained() {
    let registry = ActionRegistry::new();
    registry.register_fn("explode", |_| panic!("kaboom"));
    registry.register("echo", echo());

    let response = registry.dispatch("explode", "");
    assert!(response.starts_with("DoActionWrong(HandlerFault):"));
    assert!(response.contains("kaboom"));

    // The registry is still usable afterwards.
    assert_eq!(registry.dispatch("echo", "ok"), "echo:ok");
}

#[test]
fn test_handler_may_reregister_itself() {
    let registry = Arc::new(ActionRegistry::new());
    let weak = Arc::downgrade(&registry);
    registry.register_fn("rotate", move |_| {
        if let Some(registry) = weak.upgrade() {
            registry.register_fn("rotate", |_| Ok("rotated".to_string()));
        }
        Ok("first".to_string())
    });

    assert_eq!(registry.dispatch("rotate", ""), "first");
    assert_eq!(registry.dispatch("rotate", ""), "rotated");
}

#[test]
fn test_concurrent_dispatch() {
    let registry = Arc::new(ActionRegistry::new());
    registry.register("echo", echo());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            std::thread::spawn(move || registry.dispatch("echo", &i.to_string()))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("echo:{}", i));
    }
}
