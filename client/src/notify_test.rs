use super::*;

#[test]
fn memory_notifier_keeps_order() {
    let notifier = MemoryNotifier::new();
    notifier.notify("first");
    notifier.notify("second");
    assert_eq!(notifier.notices(), ["first", "second"]);
}

#[test]
fn drain_empties_the_buffer() {
    let notifier = MemoryNotifier::new();
    notifier.notify("only");
    assert_eq!(notifier.drain(), ["only"]);
    assert!(notifier.notices().is_empty());
}
