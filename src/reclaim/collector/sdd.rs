use core::mem;
use core::sync::atomic::Ordering;

use crate::reclaim::Atomic;
use crate::reclaim::Collector;
use crate::reclaim::CollectorWeak;
use crate::reclaim::Shared;

const NO_TAG: sdd::Tag = sdd::Tag::None;

/// A reclamation strategy based on [`sdd`].
///
/// Readers pin the current thread with an [`sdd::Guard`] for the duration
/// of a single map operation. Values displaced by a write or eviction are
/// handed to the epoch collector and destroyed once no pinned reader can
/// still observe them.
///
/// This is the default collector of [`TagMap`].
///
/// [`sdd`]: https://crates.io/crates/sdd
/// [`TagMap`]: crate::public::TagMap
pub enum Sdd {}

// SAFETY: Every displaced `sdd::Owned<T>` is dropped, which passes it to the
// epoch collector for deferred destruction.
unsafe impl Collector for Sdd {}

impl CollectorWeak for Sdd {
  type Guard = sdd::Guard;
  type Atomic<T> = sdd::AtomicOwned<T>;

  #[inline]
  fn guard() -> Self::Guard {
    sdd::Guard::new()
  }

  #[inline]
  fn flush() {
    // sdd triggers reclamation after we've observed three new epochs; we
    // observe one extra since we might lag behind the global value.
    const EPOCH: usize = 4;

    for _ in 0..EPOCH {
      Self::guard().accelerate();
    }
  }
}

// -----------------------------------------------------------------------------
// Atomic Ptr
// -----------------------------------------------------------------------------

impl<T> Atomic<T> for sdd::AtomicOwned<T> {
  type Guard = sdd::Guard;

  #[rustfmt::skip]
  type Shared<'guard> = sdd::Ptr<'guard, T>
  where
    T: 'guard;

  #[inline]
  fn null() -> Self {
    Self::null()
  }

  #[inline]
  fn read<'guard>(&self, order: Ordering, guard: &'guard Self::Guard) -> Self::Shared<'guard> {
    self.load(order, guard)
  }

  #[inline]
  fn write(&self, order: Ordering, value: T) -> bool
  where
    T: 'static,
  {
    // Dropping the displaced `Owned<T>` retires it to the collector.
    self
      .swap((Some(sdd::Owned::new(value)), NO_TAG), order)
      .0
      .is_some()
  }

  #[inline]
  fn write_if_null<'guard>(
    &self,
    value: T,
    success: Ordering,
    failure: Ordering,
    guard: &'guard Self::Guard,
  ) -> Result<Self::Shared<'guard>, Self::Shared<'guard>>
  where
    T: 'static,
  {
    let new: (Option<sdd::Owned<T>>, sdd::Tag) = (Some(sdd::Owned::new(value)), NO_TAG);

    match self.compare_exchange(sdd::Ptr::null(), new, success, failure, guard) {
      Ok((_, published)) => Ok(published),
      Err((_, current)) => Err(current),
    }
  }

  #[inline]
  fn evict(&self, order: Ordering) -> bool {
    self.swap((None, NO_TAG), order).0.is_some()
  }

  #[inline]
  unsafe fn clear(&mut self) -> bool {
    let entry: Self = mem::take(self);

    if let Some(value) = entry.into_owned(Ordering::Relaxed) {
      // SAFETY:
      // - `entry.into_owned` transfers exclusive ownership of the value.
      // - If `Some(value)` is returned, we are the unique owner.
      // - The caller guarantees no outstanding `Ptr` can observe the value,
      //   so it is dropped immediately instead of being deferred.
      unsafe {
        value.drop_in_place();
      }

      true
    } else {
      false
    }
  }
}

// -----------------------------------------------------------------------------
// Shared Ptr
// -----------------------------------------------------------------------------

impl<'guard, T> Shared<'guard, T> for sdd::Ptr<'guard, T> {
  #[inline]
  fn is_null(&self) -> bool {
    self.is_null()
  }

  #[inline]
  fn as_ref(&self) -> Option<&'guard T> {
    // SAFETY:
    // - `self` is either null or points to a fully initialized `T` published
    //   via `Atomic::write` or `Atomic::write_if_null`.
    // - The value cannot be reclaimed while the guard bound to `'guard` is
    //   alive.
    // - Only shared references to `T` are created, so aliasing rules are not
    //   violated.
    // - Tag bits are never set on slot pointers.
    unsafe { self.as_ref_unchecked() }
  }
}
