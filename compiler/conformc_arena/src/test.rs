use crate::{Arena, Map, ID};

#[test]
fn arena_keeps_insertion_order() {
    let mut arena = Arena::<&str>::new();

    let first = arena.insert("first");
    let second = arena.insert("second");

    assert_eq!(first, ID::new(0));
    assert_eq!(second, ID::new(1));
    assert_eq!(arena[second], "second");
    assert_eq!(
        arena.entries().collect::<Vec<_>>(),
        vec![(first, &"first"), (second, &"second")]
    );
}

#[test]
fn map_rejects_duplicated_key() {
    let mut map = Map::<u32>::new();

    let id = map.insert("a".to_string(), 1).unwrap();
    let (existing, rejected) = map.insert("a".to_string(), 2).unwrap_err();

    assert_eq!(existing, id);
    assert_eq!(rejected, 2);
    assert_eq!(map.len(), 1);
    assert_eq!(map.get_id("a"), Some(id));
    assert_eq!(map[id], 1);
}
