//! Core lock-free slot table.
//!
//! Each slot is a single atomic pointer owned by the configured collector;
//! every operation touches exactly one slot with one atomic instruction.

use core::fmt::Debug;
use core::fmt::DebugMap;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;
use core::sync::atomic::Ordering::AcqRel;
use core::sync::atomic::Ordering::Acquire;
use std::sync::Arc;

use rustc_hash::FxBuildHasher;
use rustc_hash::FxHashMap;

use crate::reclaim::Atomic;
use crate::reclaim::CollectorWeak;
use crate::reclaim::Shared;
use crate::registry::Registry;
use crate::tag::Tag;
use crate::tag::TagName;

#[inline]
fn occupied<'guard, T, S>(shared: &S) -> &'guard T
where
  T: 'guard,
  S: Shared<'guard, T>,
{
  let value: Option<&'guard T> = shared.as_ref();

  debug_assert!(value.is_some(), "compare-and-swap reported a null slot");

  // SAFETY: `Atomic::write_if_null` never yields a null pointer; success
  // returns the freshly published value, failure the non-null occupant.
  unsafe { value.unwrap_unchecked() }
}

// -----------------------------------------------------------------------------
// Table State
// -----------------------------------------------------------------------------

pub(crate) struct Table<V, C>
where
  C: CollectorWeak,
{
  registry: Arc<Registry>,
  slots: Box<[C::Atomic<V>]>,
}

impl<V, C> Table<V, C>
where
  C: CollectorWeak,
{
  #[inline]
  pub(crate) fn new(registry: Arc<Registry>) -> Self {
    let slots: Box<[C::Atomic<V>]> = (0..registry.len())
      .map(|_| <C::Atomic<V> as Atomic<V>>::null())
      .collect();

    tracing::debug!(capacity = slots.len(), "created tag map");

    Self { registry, slots }
  }

  #[inline]
  pub(crate) fn cap(&self) -> usize {
    self.slots.len()
  }

  #[inline]
  pub(crate) fn registry(&self) -> &Arc<Registry> {
    &self.registry
  }

  #[inline]
  pub(crate) fn len(&self) -> usize {
    let guard: C::Guard = C::guard();

    self
      .slots
      .iter()
      .filter(|slot| !slot.read(Acquire, &guard).is_null())
      .count()
  }

  #[inline]
  pub(crate) fn is_empty(&self) -> bool {
    let guard: C::Guard = C::guard();

    self
      .slots
      .iter()
      .all(|slot| slot.read(Acquire, &guard).is_null())
  }

  #[inline]
  pub(crate) fn tag_by_name(&self, name: &str) -> Tag {
    self.registry.tag_of(name)
  }

  #[track_caller]
  #[inline]
  pub(crate) fn resolve(&self, name: &str) -> Tag {
    match self.registry.get_tag(name) {
      Some(tag) => tag,
      None => unknown_name(name),
    }
  }

  #[track_caller]
  #[inline]
  pub(crate) fn contains(&self, tag: Tag) -> bool {
    let guard: C::Guard = C::guard();

    !self.slot(tag).read(Acquire, &guard).is_null()
  }

  #[track_caller]
  #[inline]
  pub(crate) fn with<F, R>(&self, tag: Tag, f: F) -> Option<R>
  where
    F: FnOnce(&V) -> R,
  {
    let guard: C::Guard = C::guard();

    self.slot(tag).read(Acquire, &guard).as_ref().map(f)
  }

  #[track_caller]
  #[inline]
  pub(crate) fn get(&self, tag: Tag) -> Option<V>
  where
    V: Clone,
  {
    self.with(tag, V::clone)
  }

  #[track_caller]
  #[inline]
  pub(crate) fn set(&self, tag: Tag, value: V) -> bool
  where
    V: 'static,
  {
    self.slot(tag).write(AcqRel, value)
  }

  #[track_caller]
  #[inline]
  pub(crate) fn get_or_set(&self, tag: Tag, value: V) -> (V, bool)
  where
    V: Clone + 'static,
  {
    let guard: C::Guard = C::guard();

    match self.slot(tag).write_if_null(value, AcqRel, Acquire, &guard) {
      Ok(stored) => (occupied(&stored).clone(), false),
      Err(current) => (occupied(&current).clone(), true),
    }
  }

  #[track_caller]
  #[inline]
  pub(crate) fn get_and_delete(&self, tag: Tag) -> Option<V>
  where
    V: Clone,
  {
    let guard: C::Guard = C::guard();
    let slot: &C::Atomic<V> = self.slot(tag);
    let value: Option<V> = slot.read(Acquire, &guard).as_ref().cloned();

    // Not a single read-modify-write: a value stored between the load above
    // and this eviction is discarded without being returned.
    slot.evict(AcqRel);

    value
  }

  #[track_caller]
  #[inline]
  pub(crate) fn delete(&self, tag: Tag) -> bool {
    self.slot(tag).evict(AcqRel)
  }

  pub(crate) fn values_by_tag(&self) -> FxHashMap<Tag, V>
  where
    V: Clone,
  {
    let guard: C::Guard = C::guard();
    let mut out: FxHashMap<Tag, V> =
      FxHashMap::with_capacity_and_hasher(self.cap(), FxBuildHasher);

    for (index, slot) in self.slots.iter().enumerate() {
      if let Some(value) = slot.read(Acquire, &guard).as_ref() {
        out.insert(Tag::from_index(index), value.clone());
      }
    }

    out
  }

  pub(crate) fn values_by_name(&self) -> FxHashMap<TagName, V>
  where
    V: Clone,
  {
    let guard: C::Guard = C::guard();
    let mut out: FxHashMap<TagName, V> =
      FxHashMap::with_capacity_and_hasher(self.cap(), FxBuildHasher);

    // The registry is frozen behind the `Arc`, so it covers every slot.
    for ((_, name), slot) in self.registry.iter().zip(self.slots.iter()) {
      if let Some(value) = slot.read(Acquire, &guard).as_ref() {
        out.insert(TagName::clone(name), value.clone());
      }
    }

    out
  }

  #[track_caller]
  #[inline]
  fn slot(&self, tag: Tag) -> &C::Atomic<V> {
    match self.slots.get(tag.index()) {
      Some(slot) => slot,
      None => out_of_range(tag, self.cap()),
    }
  }
}

impl<V, C> Drop for Table<V, C>
where
  C: CollectorWeak,
{
  fn drop(&mut self) {
    for slot in &mut *self.slots {
      // SAFETY: `Drop` provides exclusive access; values are only borrowed
      // for the duration of a table method, so no readers remain.
      unsafe {
        slot.clear();
      }
    }
  }
}

impl<V, C> Debug for Table<V, C>
where
  V: Debug,
  C: CollectorWeak,
{
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    let mut debug: DebugMap<'_, '_> = f.debug_map();
    let guard: C::Guard = C::guard();

    for ((_, name), slot) in self.registry.iter().zip(self.slots.iter()) {
      if let Some(value) = slot.read(Acquire, &guard).as_ref() {
        debug.entry(name, value);
      }
    }

    debug.finish()
  }
}

// -----------------------------------------------------------------------------
// Contract Violations
// -----------------------------------------------------------------------------

#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn out_of_range(tag: Tag, cap: usize) -> ! {
  panic!("tag {tag} out of range for {cap} slots");
}

#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn unknown_name(name: &str) -> ! {
  panic!("there is no tag with name {name:?}");
}
