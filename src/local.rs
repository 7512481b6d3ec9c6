//! Single-threaded counterpart of [`TagMap`].
//!
//! [`TagMap`]: crate::public::TagMap

use core::fmt::Debug;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;
use core::iter::FusedIterator;
use core::slice;
use std::sync::Arc;

use rustc_hash::FxBuildHasher;
use rustc_hash::FxHashMap;

use crate::registry::Registry;
use crate::table::out_of_range;
use crate::table::unknown_name;
use crate::tag::Tag;
use crate::tag::TagName;

/// A fixed-capacity value store indexed by [`Tag`], for exclusive use by one
/// thread at a time.
///
/// Offers the same operations as [`TagMap`] with plain `&mut self`
/// mutation instead of atomics. Each slot is an explicit [`Option`], so a
/// stored `V::default()` is never mistaken for an empty slot:
///
/// ```
/// use std::sync::Arc;
/// use tagmap::{LocalTagMap, Registry};
///
/// let registry: Registry = ["count"].into_iter().collect();
/// let mut map: LocalTagMap<u32> = LocalTagMap::new(Arc::new(registry));
/// let tag = map.tag_by_name("count");
///
/// // `0` is stored, not treated as "empty"
/// assert_eq!(map.get_or_set(tag, 0), (&0, false));
/// assert_eq!(map.get_or_set(tag, 5), (&0, true));
/// ```
///
/// Out-of-range tags and unknown names panic, exactly as with [`TagMap`].
///
/// [`TagMap`]: crate::public::TagMap
#[derive(Clone)]
pub struct LocalTagMap<V> {
  registry: Arc<Registry>,
  slots: Box<[Option<V>]>,
}

impl<V> LocalTagMap<V> {
  /// Creates a map with one empty slot per name currently in `registry`.
  pub fn new(registry: Arc<Registry>) -> Self {
    let slots: Box<[Option<V>]> = (0..registry.len()).map(|_| None).collect();

    tracing::debug!(capacity = slots.len(), "created local tag map");

    Self { registry, slots }
  }

  /// Returns the number of slots, one per registered tag.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.slots.len()
  }

  /// Returns the registry this map resolves names against.
  #[inline]
  pub fn registry(&self) -> &Arc<Registry> {
    &self.registry
  }

  /// Returns the number of occupied slots.
  #[inline]
  pub fn len(&self) -> usize {
    self.slots.iter().filter(|slot| slot.is_some()).count()
  }

  /// Returns `true` if no slot is occupied.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.slots.iter().all(Option::is_none)
  }

  /// Returns `true` if `name` has a tag in the registry.
  #[inline]
  pub fn is_tag_name(&self, name: &str) -> bool {
    self.registry.contains(name)
  }

  /// Returns the tag of `name`, or [`Tag::UNKNOWN`].
  #[inline]
  pub fn tag_by_name(&self, name: &str) -> Tag {
    self.registry.tag_of(name)
  }

  /// Returns a reference to the value stored for `tag`.
  ///
  /// # Panics
  ///
  /// Panics if `tag` is out of range.
  #[track_caller]
  #[inline]
  pub fn get(&self, tag: Tag) -> Option<&V> {
    self.value(tag)
  }

  /// Returns a mutable reference to the value stored for `tag`.
  ///
  /// # Panics
  ///
  /// Panics if `tag` is out of range.
  #[track_caller]
  #[inline]
  pub fn get_mut(&mut self, tag: Tag) -> Option<&mut V> {
    self.slot_mut(tag).as_mut()
  }

  /// Stores `value` for `tag`, returning the previous value.
  ///
  /// # Panics
  ///
  /// Panics if `tag` is out of range.
  #[track_caller]
  #[inline]
  pub fn set(&mut self, tag: Tag, value: V) -> Option<V> {
    self.slot_mut(tag).replace(value)
  }

  /// Stores `value` for `tag` only if the slot is empty.
  ///
  /// Returns the stored value and `false` if `value` was inserted, or the
  /// existing value and `true` otherwise.
  ///
  /// # Panics
  ///
  /// Panics if `tag` is out of range.
  #[track_caller]
  #[inline]
  pub fn get_or_set(&mut self, tag: Tag, value: V) -> (&V, bool) {
    let slot: &mut Option<V> = self.slot_mut(tag);
    let loaded: bool = slot.is_some();

    (slot.get_or_insert(value), loaded)
  }

  /// Removes the value stored for `tag` and returns it.
  ///
  /// # Panics
  ///
  /// Panics if `tag` is out of range.
  #[track_caller]
  #[inline]
  pub fn get_and_delete(&mut self, tag: Tag) -> Option<V> {
    self.slot_mut(tag).take()
  }

  /// Clears the slot for `tag`, returning `true` if a value was present.
  ///
  /// # Panics
  ///
  /// Panics if `tag` is out of range.
  #[track_caller]
  #[inline]
  pub fn delete(&mut self, tag: Tag) -> bool {
    self.slot_mut(tag).take().is_some()
  }

  /// Like [`get`](Self::get), addressed by name.
  ///
  /// # Panics
  ///
  /// Panics if `name` has no tag in the registry.
  #[track_caller]
  #[inline]
  pub fn get_by_name(&self, name: &str) -> Option<&V> {
    self.get(self.resolve(name))
  }

  /// Like [`set`](Self::set), addressed by name.
  ///
  /// # Panics
  ///
  /// Panics if `name` has no tag in the registry.
  #[track_caller]
  #[inline]
  pub fn set_by_name(&mut self, name: &str, value: V) -> Option<V> {
    self.set(self.resolve(name), value)
  }

  /// Like [`get_or_set`](Self::get_or_set), addressed by name.
  ///
  /// # Panics
  ///
  /// Panics if `name` has no tag in the registry.
  #[track_caller]
  #[inline]
  pub fn get_or_set_by_name(&mut self, name: &str, value: V) -> (&V, bool) {
    self.get_or_set(self.resolve(name), value)
  }

  /// Like [`get_and_delete`](Self::get_and_delete), addressed by name.
  ///
  /// # Panics
  ///
  /// Panics if `name` has no tag in the registry.
  #[track_caller]
  #[inline]
  pub fn get_and_delete_by_name(&mut self, name: &str) -> Option<V> {
    self.get_and_delete(self.resolve(name))
  }

  /// Like [`delete`](Self::delete), addressed by name.
  ///
  /// # Panics
  ///
  /// Panics if `name` has no tag in the registry.
  #[track_caller]
  #[inline]
  pub fn delete_by_name(&mut self, name: &str) -> bool {
    self.delete(self.resolve(name))
  }

  /// Returns every occupied slot, keyed by tag.
  pub fn values_by_tag(&self) -> FxHashMap<Tag, V>
  where
    V: Clone,
  {
    self
      .iter()
      .map(|(tag, value)| (tag, value.clone()))
      .collect()
  }

  /// Returns every occupied slot, keyed by name.
  pub fn values_by_name(&self) -> FxHashMap<TagName, V>
  where
    V: Clone,
  {
    let mut out: FxHashMap<TagName, V> =
      FxHashMap::with_capacity_and_hasher(self.capacity(), FxBuildHasher);

    for (tag, value) in self {
      out.insert(TagName::clone(self.registry.name_of(tag)), value.clone());
    }

    out
  }

  /// Reads the values of `tags` in order.
  ///
  /// # Panics
  ///
  /// Panics if any tag is out of range.
  #[track_caller]
  pub fn get_values_by_tag<I>(&self, tags: I) -> Vec<Option<&V>>
  where
    I: IntoIterator<Item = Tag>,
  {
    tags.into_iter().map(|tag| self.get(tag)).collect()
  }

  /// Reads the values of `names` in order.
  ///
  /// # Panics
  ///
  /// Panics if any name has no tag in the registry.
  #[track_caller]
  pub fn get_values_by_name<I, S>(&self, names: I) -> Vec<Option<&V>>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    names
      .into_iter()
      .map(|name| self.get_by_name(name.as_ref()))
      .collect()
  }

  /// Returns an iterator over occupied slots in tag order.
  #[inline]
  pub fn iter(&self) -> Iter<'_, V> {
    Iter {
      inner: self.slots.iter(),
      index: 0,
    }
  }

  /// Empties every slot.
  #[inline]
  pub fn clear(&mut self) {
    for slot in &mut *self.slots {
      *slot = None;
    }
  }

  #[track_caller]
  #[inline]
  fn resolve(&self, name: &str) -> Tag {
    match self.registry.get_tag(name) {
      Some(tag) => tag,
      None => unknown_name(name),
    }
  }

  #[track_caller]
  #[inline]
  fn value(&self, tag: Tag) -> Option<&V> {
    match self.slots.get(tag.index()) {
      Some(slot) => slot.as_ref(),
      None => out_of_range(tag, self.capacity()),
    }
  }

  #[track_caller]
  #[inline]
  fn slot_mut(&mut self, tag: Tag) -> &mut Option<V> {
    let cap: usize = self.capacity();

    match self.slots.get_mut(tag.index()) {
      Some(slot) => slot,
      None => out_of_range(tag, cap),
    }
  }
}

impl<V> Debug for LocalTagMap<V>
where
  V: Debug,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_map()
      .entries(self.iter().map(|(tag, value)| (self.registry.name_of(tag), value)))
      .finish()
  }
}

impl<'a, V> IntoIterator for &'a LocalTagMap<V> {
  type Item = (Tag, &'a V);
  type IntoIter = Iter<'a, V>;

  #[inline]
  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// Iterator over the occupied slots of a [`LocalTagMap`].
///
/// Created by [`LocalTagMap::iter`].
#[derive(Clone, Debug)]
pub struct Iter<'a, V> {
  inner: slice::Iter<'a, Option<V>>,
  index: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
  type Item = (Tag, &'a V);

  fn next(&mut self) -> Option<Self::Item> {
    for slot in self.inner.by_ref() {
      let tag: Tag = Tag::from_index(self.index);

      self.index += 1;

      if let Some(value) = slot {
        return Some((tag, value));
      }
    }

    None
  }

  #[inline]
  fn size_hint(&self) -> (usize, Option<usize>) {
    (0, Some(self.inner.len()))
  }
}

impl<V> FusedIterator for Iter<'_, V> {}
