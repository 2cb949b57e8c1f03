use crate::{Counter, Dummy, Handler, Storage};

#[derive(Debug, PartialEq, Eq)]
struct Narrow(u8);

#[derive(Debug, PartialEq, Eq)]
struct Wide(u32);

impl From<Narrow> for Wide {
    fn from(value: Narrow) -> Self { Self(value.0.into()) }
}

#[test]
fn storage_keeps_order_and_converts() {
    let storage = Storage::<Wide>::new();

    storage.receive(Narrow(1));
    storage.receive(Wide(2));

    assert_eq!(storage.into_vec(), vec![Wide(1), Wide(2)]);
}

#[test]
fn propagate_drains_into_other_handler() {
    let inner = Storage::<Narrow>::new();
    let outer = Storage::<Wide>::new();

    inner.receive(Narrow(7));
    inner.propagate::<Wide, _>(&outer);

    assert!(inner.is_empty());
    assert_eq!(*outer.as_vec(), vec![Wide(7)]);
}

#[test]
fn counter_and_dummy_keep_nothing() {
    let counter = Counter::default();
    let handlers: [&dyn Handler<Narrow>; 2] = [&counter, &Dummy];

    for handler in handlers {
        handler.receive(Narrow(0));
        handler.receive(Narrow(1));
    }

    assert_eq!(counter.count(), 2);
}
