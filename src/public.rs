use core::fmt::Debug;
use core::fmt::Formatter;
use core::fmt::Result;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::reclaim::CollectorWeak;
use crate::reclaim::collector::Sdd;
use crate::registry::Registry;
use crate::table::Table;
use crate::tag::Tag;
use crate::tag::TagName;

/// A lock-free, fixed-capacity value store indexed by [`Tag`].
///
/// `TagMap` holds one slot per name registered in its [`Registry`] at
/// construction time. Each slot is either empty or owns one value of type
/// `V`, and every operation touches exactly one slot with a single atomic
/// instruction. Any number of threads may read and write any slot
/// concurrently.
///
/// See the [crate-level documentation][crate] for an overview.
///
/// # Type Parameters
///
/// - `V`: The type of values stored in the map.
/// - `C`: The memory reclamation strategy implementing [`CollectorWeak`].
///   Defaults to [`Sdd`] (epoch-based reclamation).
///
/// # Tag and name access
///
/// Every operation takes a [`Tag`]; the `*_by_name` variants resolve the
/// name through the registry first. Both forms treat misuse as a bug in the
/// caller and panic:
///
/// - a tag not covered by the map, including [`Tag::UNKNOWN`],
/// - a name without an assigned tag.
///
/// Validate untrusted names with [`is_tag_name`] beforehand.
///
/// # Consistency
///
/// Operations on the same slot are linearizable. Operations on different
/// slots are unordered, so [`values_by_tag`], [`values_by_name`] and the
/// batch getters may observe a combination of slot states that never
/// existed at a single instant.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tagmap::{Registry, TagMap};
///
/// let registry: Registry = ["a", "b", "c"].into_iter().collect();
/// let map: TagMap<String> = TagMap::new(Arc::new(registry));
///
/// let b = map.tag_by_name("b");
///
/// map.set(b, "B".to_string());
///
/// assert_eq!(map.get_by_name("b"), Some("B".to_string()));
/// assert_eq!(map.get_by_name("a"), None);
/// ```
///
/// [`is_tag_name`]: Self::is_tag_name
/// [`values_by_tag`]: Self::values_by_tag
/// [`values_by_name`]: Self::values_by_name
/// [`Sdd`]: crate::garbage::collector::Sdd
#[repr(transparent)]
pub struct TagMap<V, C = Sdd>
where
  C: CollectorWeak,
{
  inner: Table<V, C>,
}

impl<V, C> TagMap<V, C>
where
  C: CollectorWeak,
{
  /// Creates a map with one empty slot per name currently in `registry`.
  ///
  /// The map keeps the registry for name resolution. Since the registry is
  /// shared behind an [`Arc`], it can no longer gain names, so the map's
  /// capacity always covers every tag the registry knows about.
  ///
  /// # Examples
  ///
  /// ```
  /// use std::sync::Arc;
  /// use tagmap::{Registry, TagMap};
  ///
  /// let registry: Arc<Registry> = Arc::new(["x", "y"].into_iter().collect());
  ///
  /// let ints: TagMap<i64> = TagMap::new(Arc::clone(&registry));
  /// let strs: TagMap<&str> = TagMap::new(Arc::clone(&registry));
  ///
  /// assert_eq!(ints.capacity(), 2);
  /// assert_eq!(strs.capacity(), 2);
  /// ```
  #[inline]
  pub fn new(registry: Arc<Registry>) -> Self {
    Self {
      inner: Table::new(registry),
    }
  }

  /// Returns the number of slots, one per registered tag.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.inner.cap()
  }

  /// Returns the registry this map resolves names against.
  #[inline]
  pub fn registry(&self) -> &Arc<Registry> {
    self.inner.registry()
  }

  /// Returns the number of occupied slots.
  ///
  /// Each slot is inspected separately, so the result may not match any
  /// single instant while other threads write concurrently.
  #[inline]
  pub fn len(&self) -> usize {
    self.inner.len()
  }

  /// Returns `true` if no slot is occupied.
  ///
  /// Subject to the same caveat as [`len`](Self::len).
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.inner.is_empty()
  }

  /// Returns `true` if `name` has a tag in the registry.
  ///
  /// A `true` result guarantees the `*_by_name` operations will not panic
  /// for this name.
  #[inline]
  pub fn is_tag_name(&self, name: &str) -> bool {
    !self.inner.tag_by_name(name).is_unknown()
  }

  /// Returns the tag of `name`, or [`Tag::UNKNOWN`].
  #[inline]
  pub fn tag_by_name(&self, name: &str) -> Tag {
    self.inner.tag_by_name(name)
  }

  /// Returns `true` if the slot for `tag` is occupied.
  ///
  /// # Panics
  ///
  /// Panics if `tag` is out of range.
  #[track_caller]
  #[inline]
  pub fn contains(&self, tag: Tag) -> bool {
    self.inner.contains(tag)
  }

  /// Applies `f` to the value stored for `tag`, if any.
  ///
  /// The reference passed to `f` stays valid for the whole call even if
  /// another thread replaces or deletes the value concurrently.
  ///
  /// # Panics
  ///
  /// Panics if `tag` is out of range.
  ///
  /// # Examples
  ///
  /// ```
  /// use std::sync::Arc;
  /// use tagmap::{Registry, TagMap};
  ///
  /// let registry: Registry = ["path"].into_iter().collect();
  /// let map: TagMap<Vec<u8>> = TagMap::new(Arc::new(registry));
  /// let tag = map.tag_by_name("path");
  ///
  /// map.set(tag, vec![1, 2, 3]);
  ///
  /// assert_eq!(map.with(tag, |bytes| bytes.len()), Some(3));
  /// ```
  #[track_caller]
  #[inline]
  pub fn with<F, R>(&self, tag: Tag, f: F) -> Option<R>
  where
    F: FnOnce(&V) -> R,
  {
    self.inner.with(tag, f)
  }

  /// Returns a clone of the value stored for `tag`.
  ///
  /// Returns `None` if the slot is empty.
  ///
  /// # Panics
  ///
  /// Panics if `tag` is out of range.
  #[track_caller]
  #[inline]
  pub fn get(&self, tag: Tag) -> Option<V>
  where
    V: Clone,
  {
    self.inner.get(tag)
  }

  /// Returns a clone of the value stored for `tag`, or `V::default()` if the
  /// slot is empty.
  ///
  /// # Panics
  ///
  /// Panics if `tag` is out of range.
  #[track_caller]
  #[inline]
  pub fn get_or_default(&self, tag: Tag) -> V
  where
    V: Clone + Default,
  {
    self.inner.get(tag).unwrap_or_default()
  }

  /// Stores `value` for `tag`, replacing any previous value.
  ///
  /// Returns `true` if a previous value was replaced. The replaced value is
  /// unreachable from the map afterwards and is handed to the collector.
  ///
  /// # Panics
  ///
  /// Panics if `tag` is out of range.
  #[track_caller]
  #[inline]
  pub fn set(&self, tag: Tag, value: V) -> bool
  where
    V: 'static,
  {
    self.inner.set(tag, value)
  }

  /// Stores `value` for `tag` only if the slot is empty.
  ///
  /// Returns `(value, false)` if the slot was empty and `value` was stored,
  /// or `(current, true)` with the untouched occupant otherwise. Among
  /// threads racing on the same empty slot exactly one stores its value and
  /// every other thread observes the winner's value.
  ///
  /// # Panics
  ///
  /// Panics if `tag` is out of range.
  ///
  /// # Examples
  ///
  /// ```
  /// use std::sync::Arc;
  /// use tagmap::{Registry, TagMap};
  ///
  /// let registry: Registry = ["id"].into_iter().collect();
  /// let map: TagMap<u64> = TagMap::new(Arc::new(registry));
  /// let tag = map.tag_by_name("id");
  ///
  /// assert_eq!(map.get_or_set(tag, 7), (7, false));
  /// assert_eq!(map.get_or_set(tag, 9), (7, true));
  /// ```
  #[track_caller]
  #[inline]
  pub fn get_or_set(&self, tag: Tag, value: V) -> (V, bool)
  where
    V: Clone + 'static,
  {
    self.inner.get_or_set(tag, value)
  }

  /// Removes the value stored for `tag` and returns it.
  ///
  /// Returns `None` if the slot was already empty.
  ///
  /// # Concurrency
  ///
  /// The read and the removal are two separate atomic steps. If another
  /// thread stores a value through [`set`] or [`get_or_set`] in between,
  /// that value is removed as well but is returned to no one.
  ///
  /// # Panics
  ///
  /// Panics if `tag` is out of range.
  ///
  /// [`get_or_set`]: Self::get_or_set
  /// [`set`]: Self::set
  #[track_caller]
  #[inline]
  pub fn get_and_delete(&self, tag: Tag) -> Option<V>
  where
    V: Clone,
  {
    self.inner.get_and_delete(tag)
  }

  /// Clears the slot for `tag`.
  ///
  /// Returns `true` if a value was present. The removed value is handed to
  /// the collector.
  ///
  /// # Panics
  ///
  /// Panics if `tag` is out of range.
  #[track_caller]
  #[inline]
  pub fn delete(&self, tag: Tag) -> bool {
    self.inner.delete(tag)
  }

  /// Like [`with`](Self::with), addressed by name.
  ///
  /// # Panics
  ///
  /// Panics if `name` has no tag in the registry.
  #[track_caller]
  #[inline]
  pub fn with_by_name<F, R>(&self, name: &str, f: F) -> Option<R>
  where
    F: FnOnce(&V) -> R,
  {
    self.inner.with(self.inner.resolve(name), f)
  }

  /// Like [`get`](Self::get), addressed by name.
  ///
  /// # Panics
  ///
  /// Panics if `name` has no tag in the registry.
  #[track_caller]
  #[inline]
  pub fn get_by_name(&self, name: &str) -> Option<V>
  where
    V: Clone,
  {
    self.inner.get(self.inner.resolve(name))
  }

  /// Like [`set`](Self::set), addressed by name.
  ///
  /// # Panics
  ///
  /// Panics if `name` has no tag in the registry.
  #[track_caller]
  #[inline]
  pub fn set_by_name(&self, name: &str, value: V) -> bool
  where
    V: 'static,
  {
    self.inner.set(self.inner.resolve(name), value)
  }

  /// Like [`get_or_set`](Self::get_or_set), addressed by name.
  ///
  /// # Panics
  ///
  /// Panics if `name` has no tag in the registry.
  #[track_caller]
  #[inline]
  pub fn get_or_set_by_name(&self, name: &str, value: V) -> (V, bool)
  where
    V: Clone + 'static,
  {
    self.inner.get_or_set(self.inner.resolve(name), value)
  }

  /// Like [`get_and_delete`](Self::get_and_delete), addressed by name.
  ///
  /// # Panics
  ///
  /// Panics if `name` has no tag in the registry.
  #[track_caller]
  #[inline]
  pub fn get_and_delete_by_name(&self, name: &str) -> Option<V>
  where
    V: Clone,
  {
    self.inner.get_and_delete(self.inner.resolve(name))
  }

  /// Like [`delete`](Self::delete), addressed by name.
  ///
  /// # Panics
  ///
  /// Panics if `name` has no tag in the registry.
  #[track_caller]
  #[inline]
  pub fn delete_by_name(&self, name: &str) -> bool {
    self.inner.delete(self.inner.resolve(name))
  }

  /// Returns a snapshot of every occupied slot, keyed by tag.
  ///
  /// Each slot is read atomically, but the snapshot as a whole is not: it
  /// may interleave with concurrent writers.
  pub fn values_by_tag(&self) -> FxHashMap<Tag, V>
  where
    V: Clone,
  {
    self.inner.values_by_tag()
  }

  /// Returns a snapshot of every occupied slot, keyed by name.
  ///
  /// Same consistency as [`values_by_tag`](Self::values_by_tag).
  pub fn values_by_name(&self) -> FxHashMap<TagName, V>
  where
    V: Clone,
  {
    self.inner.values_by_name()
  }

  /// Reads the values of `tags` in order.
  ///
  /// Each element is an independent atomic read; `None` marks an empty
  /// slot.
  ///
  /// # Panics
  ///
  /// Panics if any tag is out of range.
  ///
  /// # Examples
  ///
  /// ```
  /// use std::sync::Arc;
  /// use tagmap::{Registry, TagMap};
  ///
  /// let registry: Registry = ["a", "b"].into_iter().collect();
  /// let map: TagMap<char> = TagMap::new(Arc::new(registry));
  /// let [a, b] = ["a", "b"].map(|name| map.tag_by_name(name));
  ///
  /// map.set(b, 'b');
  ///
  /// assert_eq!(map.get_values_by_tag([b, a, b]), [Some('b'), None, Some('b')]);
  /// ```
  #[track_caller]
  pub fn get_values_by_tag<I>(&self, tags: I) -> Vec<Option<V>>
  where
    I: IntoIterator<Item = Tag>,
    V: Clone,
  {
    tags.into_iter().map(|tag| self.inner.get(tag)).collect()
  }

  /// Reads the values of `names` in order.
  ///
  /// # Panics
  ///
  /// Panics if any name has no tag in the registry.
  #[track_caller]
  pub fn get_values_by_name<I, S>(&self, names: I) -> Vec<Option<V>>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    V: Clone,
  {
    names
      .into_iter()
      .map(|name| self.inner.get(self.inner.resolve(name.as_ref())))
      .collect()
  }
}

impl<V, C> Debug for TagMap<V, C>
where
  V: Debug,
  C: CollectorWeak,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    f.debug_struct("TagMap")
      .field("capacity", &self.capacity())
      .field("entries", &self.inner)
      .finish()
  }
}

// SAFETY: Slots are only accessed through atomic operations, and values are
// moved in and cloned out, so `TagMap` is `Send` when `V` is `Send`.
unsafe impl<V, C> Send for TagMap<V, C>
where
  V: Send,
  C: CollectorWeak,
{
}

// SAFETY: Concurrent readers share `&V` (in `with` and when cloning), and
// values stored by one thread may be dropped by another, so sharing the map
// requires `V: Send + Sync`.
unsafe impl<V, C> Sync for TagMap<V, C>
where
  V: Send + Sync,
  C: CollectorWeak,
{
}
