mod traits;

pub mod collector;

pub use self::traits::Atomic;
pub use self::traits::Collector;
pub use self::traits::CollectorWeak;
pub use self::traits::Shared;

// -----------------------------------------------------------------------------
// Sanity Check
// -----------------------------------------------------------------------------

// loom atomics carry model state and are wider than a pointer.
#[cfg(not(loom))]
const _: () = <collector::Leak as CollectorWeak>::ASSERT_ATOMIC;

const _: () = <collector::Sdd as CollectorWeak>::ASSERT_ATOMIC;
