use voltport::constants::MAX_TOASTS;
use voltport::notifications::{Notifier, ToastLevel};

#[test]
fn test_toasts_are_shared_between_clones() {
    let notifier = Notifier::new();
    let reporter = notifier.clone();

    reporter.info("Loading listings");
    reporter.success("✅ Export listing published");
    reporter.error("❌ Failed to import product");

    let newest_first = notifier.get_toasts();
    assert_eq!(newest_first.len(), 3);
    assert_eq!(newest_first[0].level, ToastLevel::Error);
    assert_eq!(newest_first[2].message, "Loading listings");
    assert!(newest_first[0].display().ends_with("❌ Failed to import product"));
}

#[test]
fn test_drain_and_clear() {
    let notifier = Notifier::default();
    notifier.success("one");
    notifier.error("two");

    let drained = notifier.drain();
    assert_eq!(drained.iter().map(|t| t.message.as_str()).collect::<Vec<_>>(), ["one", "two"]);
    assert!(notifier.latest().is_none());

    notifier.info("three");
    notifier.clear();
    assert!(notifier.get_toasts().is_empty());
}

#[test]
fn test_oldest_toasts_are_dropped_past_the_cap() {
    let notifier = Notifier::new();
    for n in 0..MAX_TOASTS + 5 {
        notifier.info(format!("toast {n}"));
    }

    let newest_first = notifier.get_toasts();
    assert_eq!(newest_first.len(), MAX_TOASTS);
    assert_eq!(newest_first[0].message, format!("toast {}", MAX_TOASTS + 4));
    assert_eq!(newest_first[MAX_TOASTS - 1].message, "toast 5");
}
