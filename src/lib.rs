//! Dense tag registry with lock-free, array-indexed value storage.
//!
//! `tagmap` replaces a string-keyed map when the key set is known up front
//! (attribute tables, component slots, property bags). Names are interned
//! into small dense [`Tag`] handles by a [`Registry`], and values live in
//! [`TagMap`] slots addressed directly by those handles.
//!
//! # Overview
//!
//! Usage follows two phases:
//!
//! 1. Build a [`Registry`] and register every name. Tags are assigned
//!    `0, 1, 2, ...` in registration order.
//! 2. Freeze the registry by moving it into an [`Arc`], then construct any
//!    number of [`TagMap`]s against it, one per value type or purpose.
//!
//! ```
//! use std::sync::Arc;
//! use tagmap::{Registry, Tag, TagMap};
//!
//! let mut registry = Registry::new();
//!
//! let a = registry.register("a").unwrap();
//! let b = registry.register("b").unwrap();
//! let c = registry.register("c").unwrap();
//!
//! assert_eq!([a, b, c].map(Tag::into_bits), [0, 1, 2]);
//!
//! let registry = Arc::new(registry);
//! let map: TagMap<String> = TagMap::new(Arc::clone(&registry));
//!
//! map.set(b, "B".to_string());
//! assert_eq!(map.get_by_name("b"), Some("B".to_string()));
//!
//! map.delete_by_name("a");
//! assert_eq!(map.get_or_default(a), "");
//!
//! assert_eq!(registry.tag_of("d"), Tag::UNKNOWN);
//! ```
//!
//! A map never grows: its capacity is the registry length at construction,
//! and the [`Arc`] guarantees the registry cannot gain names afterwards.
//!
//! # Concurrency
//!
//! All [`TagMap`] operations are thread-safe and lock-free. Each one touches
//! a single slot with a single atomic instruction (load, swap or
//! compare-and-swap), so operations on the same slot are linearizable and
//! operations on different slots never contend.
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::thread;
//! use tagmap::{Registry, TagMap};
//!
//! let registry: Registry = (0..16).map(|index| format!("slot{index}")).collect();
//! let map: Arc<TagMap<u64>> = Arc::new(TagMap::new(Arc::new(registry)));
//!
//! let handles: Vec<_> = (0..4)
//!   .map(|thread_id| {
//!     let map = Arc::clone(&map);
//!     thread::spawn(move || {
//!       for (tag, _) in map.registry().iter() {
//!         map.get_or_set(tag, thread_id);
//!         map.set(tag, thread_id * 1000);
//!         map.delete(tag);
//!       }
//!     })
//!   })
//!   .collect();
//!
//! for handle in handles {
//!   handle.join().unwrap();
//! }
//! ```
//!
//! Snapshots ([`TagMap::values_by_tag`], [`TagMap::values_by_name`]) and
//! batch reads read each slot atomically but not all slots at once.
//!
//! [`TagMap::get_and_delete`] reads and then clears its slot in two atomic
//! steps; a value stored by another thread between them is discarded.
//!
//! ## Memory Reclamation
//!
//! Values are boxed and published through per-slot atomic pointers. A value
//! displaced by [`TagMap::set`] or [`TagMap::delete`] may still be read by
//! another thread, so it is handed to a collector instead of being freed on
//! the spot. The default collector reclaims through epoch-based memory
//! management via [`sdd`]; [`Leak`] never frees displaced values. See the
//! [`garbage`] module.
//!
//! # Contract violations
//!
//! Registering a duplicate name is a recoverable [`RegistryError`]. Using a
//! tag the map does not cover (including [`Tag::UNKNOWN`]) or a name the
//! registry does not know is a caller bug and panics.
//!
//! [`Arc`]: std::sync::Arc
//! [`Leak`]: crate::garbage::collector::Leak
//! [`sdd`]: https://docs.rs/sdd
//!

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod error;
mod local;
mod public;
mod reclaim;
mod registry;
mod table;
mod tag;
mod utils;

#[cfg(all(test, not(loom)))]
mod tests;

pub(crate) use crate::utils::sync;

pub mod garbage {
  //! Memory reclamation traits and built-in strategies.
  //!
  //! [`TagMap`] is generic over its collector. You do not need to interact
  //! with these traits directly unless selecting a non-default strategy or
  //! implementing your own.
  //!
  //! ```
  //! use std::sync::Arc;
  //! use tagmap::{Registry, TagMap};
  //! use tagmap::garbage::collector::Leak;
  //!
  //! let registry: Registry = ["once"].into_iter().collect();
  //! let map: TagMap<String, Leak> = TagMap::new(Arc::new(registry));
  //!
  //! map.set_by_name("once", "written once, never replaced".to_string());
  //! ```
  //!
  //! [`TagMap`]: crate::public::TagMap

  pub use crate::reclaim::Atomic;
  pub use crate::reclaim::Collector;
  pub use crate::reclaim::CollectorWeak;
  pub use crate::reclaim::Shared;
  pub use crate::reclaim::collector;
}

pub use self::error::RegistryError;

pub use self::local::Iter as LocalIter;
pub use self::local::LocalTagMap;

pub use self::public::TagMap;

pub use self::registry::Iter as RegistryIter;
pub use self::registry::Registry;

pub use self::tag::Tag;
pub use self::tag::TagName;
