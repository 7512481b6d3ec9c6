use core::sync::atomic::Ordering;

// -----------------------------------------------------------------------------
// Collector API
// -----------------------------------------------------------------------------

/// A memory reclamation strategy that guarantees eventual reclamation of
/// replaced and evicted slot values.
///
/// # Safety
///
/// This is an **unsafe marker trait** extending [`CollectorWeak`]. By
/// implementing this trait, a collector makes the following guarantee:
///
/// > Any value displaced via [`Atomic::write()`] or [`Atomic::evict()`] will
/// > eventually have its destructor run and its memory reclaimed, assuming
/// > the program continues to make progress.
///
/// Temporary deferral of reclamation (e.g. due to pinned threads or epoch
/// lag) is expected, but reclamation must occur once it is safe to do so.
///
/// [`Atomic::write()`]: crate::reclaim::Atomic::write
/// [`Atomic::evict()`]: crate::reclaim::Atomic::evict
/// [`CollectorWeak`]: crate::reclaim::CollectorWeak
pub unsafe trait Collector: CollectorWeak {}

/// A memory reclamation strategy.
///
/// This trait defines the minimal interface a [`TagMap`] needs to publish
/// values through per-slot atomic pointers. It does *not* guarantee that
/// displaced values are eventually reclaimed; implementations are permitted
/// to leak them. If eventual reclamation is required, see [`Collector`].
///
/// # Overview
///
/// A `CollectorWeak` provides:
///
/// - A [`Guard`] type that pins the current thread.
/// - An [`Atomic`] pointer abstraction tied to that guard.
/// - A mechanism ([`flush()`]) to attempt reclamation.
///
/// The collector is responsible for ensuring that a value read through
/// [`Atomic::read()`] remains valid for the lifetime of the associated
/// guard, even if another thread replaces or evicts it in the meantime.
///
/// [`Atomic`]: crate::reclaim::CollectorWeak::Atomic
/// [`Atomic::read()`]: crate::reclaim::Atomic::read
/// [`Collector`]: crate::reclaim::Collector
/// [`flush()`]: crate::reclaim::CollectorWeak::flush
/// [`Guard`]: crate::reclaim::CollectorWeak::Guard
/// [`TagMap`]: crate::public::TagMap
pub trait CollectorWeak {
  #[doc(hidden)]
  const ASSERT_ATOMIC: () = {
    assert!(align_of::<Self::Atomic<()>>() == align_of::<usize>());
    assert!(size_of::<Self::Atomic<()>>() == size_of::<usize>());
  };

  /// A guard that keeps the current thread pinned.
  type Guard;

  /// An atomic pointer that can be safely shared between threads.
  type Atomic<T>: Atomic<T, Guard = Self::Guard>;

  /// Creates a new `Guard`, pinning the current thread.
  fn guard() -> Self::Guard;

  /// Attempts to trigger memory reclamation.
  ///
  /// This function is best-effort: it may advance epochs, drain deferred
  /// queues, run destructors of previously displaced values, or do nothing.
  fn flush();
}

// -----------------------------------------------------------------------------
// Atomic Ptr
// -----------------------------------------------------------------------------

/// A nullable atomic pointer owning one heap-allocated value.
///
/// A null pointer is an empty slot.
pub trait Atomic<T> {
  /// A guard that keeps the current thread pinned.
  type Guard;

  /// A pointer to a value protected by the collector.
  ///
  /// The pointer is valid for use only during the lifetime `'guard`.
  type Shared<'guard>: Shared<'guard, T>
  where
    T: 'guard;

  /// Creates a null atomic pointer.
  fn null() -> Self;

  /// Loads the current pointer.
  fn read<'guard>(&self, order: Ordering, guard: &'guard Self::Guard) -> Self::Shared<'guard>;

  /// Unconditionally stores `value`, handing any previous value to the
  /// collector.
  ///
  /// Returns `true` if a previous value was displaced.
  fn write(&self, order: Ordering, value: T) -> bool
  where
    T: 'static;

  /// Stores `value` only if the pointer is currently null, using a single
  /// compare-and-swap.
  ///
  /// Returns `Ok` with the newly published pointer on success, or `Err` with
  /// the current (non-null) pointer if the slot was occupied. On failure
  /// `value` is dropped without ever having been visible to other threads.
  fn write_if_null<'guard>(
    &self,
    value: T,
    success: Ordering,
    failure: Ordering,
    guard: &'guard Self::Guard,
  ) -> Result<Self::Shared<'guard>, Self::Shared<'guard>>
  where
    T: 'static;

  /// Swaps `null` into the pointer and schedules the previous value for
  /// reclamation.
  ///
  /// Returns `true` if a non-null value was removed, or `false` if the
  /// pointer was already null.
  ///
  /// # Reclamation
  ///
  /// - For collectors implementing [`Collector`], an evicted value is
  ///   guaranteed to be eventually reclaimed.
  /// - For [`CollectorWeak`] implementations, the value may be permanently
  ///   leaked.
  ///
  /// The removed value may remain accessible to readers holding a live
  /// `Guard`; reclamation is deferred until it is safe.
  ///
  /// [`Collector`]: crate::reclaim::Collector
  /// [`CollectorWeak`]: crate::reclaim::CollectorWeak
  fn evict(&self, order: Ordering) -> bool;

  /// Immediately drops the pointed-to value (if any) and nulls the pointer.
  ///
  /// # Safety
  ///
  /// No other thread may hold a [`Shared`] pointer to the current value.
  /// Exclusive access through `&mut self` is sufficient when values are only
  /// ever borrowed for the duration of a method call on the owning map.
  ///
  /// [`Shared`]: crate::reclaim::Shared
  unsafe fn clear(&mut self) -> bool;
}

// -----------------------------------------------------------------------------
// Shared Ptr
// -----------------------------------------------------------------------------

/// A pointer to a value protected by the collector.
///
/// The pointer is valid for use only during the lifetime `'guard`.
pub trait Shared<'guard, T> {
  /// Returns `true` if the pointer is null.
  fn is_null(&self) -> bool;

  /// Returns a shared reference to the value.
  fn as_ref(&self) -> Option<&'guard T>;
}
