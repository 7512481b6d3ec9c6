use std::sync::Arc;
use std::thread;

use rustc_hash::FxHashMap;

use crate::garbage::collector::Leak;
use crate::public::TagMap;
use crate::registry::Registry;
use crate::tag::Tag;
use crate::tag::TagName;

fn abc() -> Arc<Registry> {
  let mut registry: Registry = Registry::new();

  registry.register("a").unwrap();
  registry.register("b").unwrap();
  registry.register("c").unwrap();

  Arc::new(registry)
}

#[test]
fn test_end_to_end() {
  let registry: Arc<Registry> = abc();

  assert_eq!(registry.tag_of("a").into_bits(), 0);
  assert_eq!(registry.tag_of("b").into_bits(), 1);
  assert_eq!(registry.tag_of("c").into_bits(), 2);
  assert_eq!(registry.tag_of("d"), Tag::UNKNOWN);

  let map: TagMap<String> = TagMap::new(Arc::clone(&registry));
  let b: Tag = map.tag_by_name("b");

  assert_eq!(map.capacity(), 3);

  map.set(b, String::from("B"));

  assert_eq!(map.get_by_name("b"), Some(String::from("B")));
  assert_eq!(map.get_by_name("a"), None);

  assert_eq!(map.get_or_set_by_name("a", String::from("A")), (String::from("A"), false));
  assert_eq!(map.get_or_set_by_name("a", String::from("X")), (String::from("A"), true));

  assert_eq!(map.get_and_delete_by_name("a"), Some(String::from("A")));
  assert_eq!(map.get_and_delete_by_name("a"), None);

  let values: FxHashMap<TagName, String> = map.values_by_name();

  assert_eq!(values.len(), 1);
  assert_eq!(values.get("b").map(String::as_str), Some("B"));

  map.set_by_name("a", String::from("A"));

  assert!(map.delete_by_name("a"));
  assert_eq!(map.get_by_name("a"), None);
  assert_eq!(map.get_or_default(registry.tag_of("a")), "");
  assert_eq!(map.get_by_name("b"), Some(String::from("B")));
}

#[test]
fn test_name_lookup() {
  let map: TagMap<u8> = TagMap::new(abc());

  assert!(map.is_tag_name("a"));
  assert!(!map.is_tag_name("d"));
  assert_eq!(map.tag_by_name("c"), Tag::from_bits(2));
  assert_eq!(map.tag_by_name("d"), Tag::UNKNOWN);
}

#[test]
fn test_get_or_default() {
  let map: TagMap<u32> = TagMap::new(abc());
  let a: Tag = map.tag_by_name("a");

  assert_eq!(map.get_or_default(a), 0);

  map.set(a, 17);

  assert_eq!(map.get_or_default(a), 17);
}

#[test]
fn test_with_by_name() {
  let map: TagMap<Vec<u8>> = TagMap::new(abc());

  map.set_by_name("c", vec![1, 2, 3]);

  assert_eq!(map.with_by_name("c", Vec::len), Some(3));
  assert_eq!(map.with_by_name("a", Vec::len), None);
}

#[test]
fn test_set_and_delete_by_name() {
  let map: TagMap<i64> = TagMap::new(abc());

  assert!(!map.set_by_name("a", -1));
  assert!(map.set_by_name("a", -2));
  assert!(map.delete_by_name("a"));
  assert!(!map.delete_by_name("a"));
  assert!(map.is_empty());
}

#[test]
fn test_get_values() {
  let map: TagMap<char> = TagMap::new(abc());
  let [a, b, c] = ["a", "b", "c"].map(|name| map.tag_by_name(name));

  map.set(a, 'a');
  map.set(c, 'c');

  assert_eq!(map.get_values_by_tag([c, b, a]), [Some('c'), None, Some('a')]);
  assert!(map.get_values_by_tag(Vec::new()).is_empty());
  assert_eq!(
    map.get_values_by_name(["a", "b", "a"]),
    [Some('a'), None, Some('a')],
  );
}

#[test]
#[should_panic(expected = "there is no tag with name \"d\"")]
fn test_get_values_unknown_name() {
  let map: TagMap<char> = TagMap::new(abc());
  let _values: Vec<Option<char>> = map.get_values_by_name(["a", "d"]);
}

#[test]
#[should_panic(expected = "there is no tag with name \"d\"")]
fn test_set_unknown_name() {
  let map: TagMap<char> = TagMap::new(abc());
  map.set_by_name("d", 'd');
}

#[test]
#[should_panic(expected = "tag unknown out of range for 3 slots")]
fn test_get_unknown_tag() {
  let map: TagMap<char> = TagMap::new(abc());
  let _value: Option<char> = map.get(Tag::UNKNOWN);
}

#[test]
fn test_maps_share_registry() {
  let registry: Arc<Registry> = abc();

  let ints: TagMap<i32> = TagMap::new(Arc::clone(&registry));
  let strs: TagMap<&str, Leak> = TagMap::new(Arc::clone(&registry));

  ints.set_by_name("b", 2);
  strs.set_by_name("b", "two");

  assert!(Arc::ptr_eq(ints.registry(), strs.registry()));
  assert_eq!(ints.get_by_name("b"), Some(2));
  assert_eq!(strs.get_by_name("b"), Some("two"));
}

#[test]
fn test_debug() {
  let map: TagMap<u8> = TagMap::new(abc());

  map.set_by_name("b", 1);

  assert_eq!(format!("{map:?}"), r#"TagMap { capacity: 3, entries: {"b": 1} }"#);
}

#[test]
fn test_send_sync() {
  fn assert_send_sync<T: Send + Sync>() {}

  assert_send_sync::<TagMap<String>>();
  assert_send_sync::<TagMap<String, Leak>>();
}

#[test]
fn test_get_or_set_single_winner() {
  const THREADS: usize = 8;

  let map: TagMap<usize> = TagMap::new(abc());
  let tag: Tag = map.tag_by_name("a");

  let results: Vec<(usize, bool)> = thread::scope(|scope| {
    let handles: Vec<_> = (0..THREADS)
      .map(|index| scope.spawn({
        let map: &TagMap<usize> = &map;
        move || map.get_or_set(tag, index)
      }))
      .collect();

    handles
      .into_iter()
      .map(|handle| handle.join().unwrap())
      .collect()
  });

  let winners: Vec<usize> = results
    .iter()
    .filter(|(_, loaded)| !loaded)
    .map(|(value, _)| *value)
    .collect();

  assert_eq!(winners.len(), 1);

  for (value, _) in results {
    assert_eq!(value, winners[0]);
  }

  assert_eq!(map.get(tag), Some(winners[0]));
}
