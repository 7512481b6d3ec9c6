use core::marker::PhantomData;
use core::mem;
use core::ptr;
use core::ptr::NonNull;
use core::sync::atomic::Ordering;

use crate::reclaim::Atomic;
use crate::reclaim::CollectorWeak;
use crate::reclaim::Shared;
use crate::sync::atomic::AtomicPtr;

/// A reclamation strategy that leaks displaced values.
///
/// Values overwritten by [`TagMap::set`] or removed by [`TagMap::delete`]
/// are never freed, so readers never need to be pinned. Values still stored
/// when the map is dropped are freed normally.
///
/// Suitable for maps whose slots are written once, and for model checking.
///
/// [`TagMap::set`]: crate::public::TagMap::set
/// [`TagMap::delete`]: crate::public::TagMap::delete
pub enum Leak {}

impl CollectorWeak for Leak {
  type Guard = ();
  type Atomic<T> = AtomicPtr<T>;

  #[inline]
  fn guard() -> Self::Guard {
    // do nothing
  }

  #[inline]
  fn flush() {
    // do nothing
  }
}

// -----------------------------------------------------------------------------
// Atomic Ptr
// -----------------------------------------------------------------------------

impl<T> Atomic<T> for AtomicPtr<T> {
  type Guard = ();

  #[rustfmt::skip]
  type Shared<'guard> = Ptr<'guard, T>
  where
    T: 'guard;

  #[inline]
  fn null() -> Self {
    Self::new(ptr::null_mut())
  }

  #[inline]
  fn read<'guard>(&self, order: Ordering, _guard: &'guard Self::Guard) -> Self::Shared<'guard> {
    Ptr::new(self.load(order))
  }

  #[inline]
  fn write(&self, order: Ordering, value: T) -> bool
  where
    T: 'static,
  {
    // True to the name, any displaced `Box<T>` is leaked here
    !self.swap(Box::into_raw(Box::new(value)), order).is_null()
  }

  #[inline]
  fn write_if_null<'guard>(
    &self,
    value: T,
    success: Ordering,
    failure: Ordering,
    _guard: &'guard Self::Guard,
  ) -> Result<Self::Shared<'guard>, Self::Shared<'guard>>
  where
    T: 'static,
  {
    let new: *mut T = Box::into_raw(Box::new(value));

    match self.compare_exchange(ptr::null_mut(), new, success, failure) {
      Ok(_) => Ok(Ptr::new(new)),
      Err(current) => {
        // SAFETY:
        // - `new` was created by `Box::into_raw` above.
        // - The exchange failed, so `new` was never published and this thread
        //   is its only owner.
        drop(unsafe { Box::from_raw(new) });
        Err(Ptr::new(current))
      }
    }
  }

  #[inline]
  fn evict(&self, order: Ordering) -> bool {
    !self.swap(ptr::null_mut(), order).is_null()
  }

  #[inline]
  unsafe fn clear(&mut self) -> bool {
    #[cfg(not(loom))]
    let current: *mut T = mem::replace(self.get_mut(), ptr::null_mut());

    #[cfg(loom)]
    let current: *mut T = self.with_mut(|pointer| mem::replace(pointer, ptr::null_mut()));

    if let Some(pointer) = NonNull::new(current) {
      // SAFETY:
      // - `pointer` was previously created by `Box::into_raw`, so it
      //   originated from a valid `Box<T>` allocation.
      // - We have exclusive access via `&mut self`, and the caller guarantees
      //   no outstanding `Shared` pointers.
      // - Reconstructing the `Box<T>` transfers ownership back and will drop
      //   the value and free the allocation exactly once.
      drop(unsafe { Box::from_raw(pointer.as_ptr()) });
      true
    } else {
      false
    }
  }
}

// -----------------------------------------------------------------------------
// Shared Ptr
// -----------------------------------------------------------------------------

/// A pointer to a value that is never reclaimed while the map is alive.
#[repr(transparent)]
pub struct Ptr<'guard, T> {
  pointer: *mut T,
  phantom: PhantomData<&'guard T>,
}

impl<T> Ptr<'_, T> {
  #[inline]
  const fn new(pointer: *mut T) -> Self {
    Self {
      pointer,
      phantom: PhantomData,
    }
  }
}

impl<'guard, T> Shared<'guard, T> for Ptr<'guard, T> {
  #[inline]
  fn is_null(&self) -> bool {
    self.pointer.is_null()
  }

  #[inline]
  fn as_ref(&self) -> Option<&'guard T> {
    // SAFETY:
    // - `self.pointer` is either null or points to a fully initialized `T`
    //   published via `Atomic::write` or `Atomic::write_if_null`.
    // - The pointer originates from `Box::into_raw`, so it is valid and
    //   properly aligned for `T`.
    // - Displaced values are leaked rather than freed, so the allocation
    //   outlives any borrow of the owning map.
    // - Only shared references to `T` are created, so aliasing rules are not
    //   violated.
    unsafe { self.pointer.as_ref() }
  }
}
