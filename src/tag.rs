use core::fmt::Debug;
use core::fmt::Display;
use core::fmt::Formatter;
use core::fmt::Result;
use std::sync::Arc;

/// The string identifier a [`Tag`] stands for.
///
/// Names are stored once per [`Registry`] and shared between its forward and
/// reverse lookups, so handing one out is a reference-count bump.
///
/// [`Registry`]: crate::registry::Registry
pub type TagName = Arc<str>;

/// A dense handle identifying a name registered in a [`Registry`].
///
/// Tags are assigned sequentially from `0` in registration order and stay
/// valid for the lifetime of their registry. They index directly into the
/// slot arrays of [`TagMap`] and [`LocalTagMap`].
///
/// The distinguished value [`Tag::UNKNOWN`] means "no such name" and is what
/// [`Registry::tag_of`] returns for names that were never registered.
///
/// # Examples
///
/// ```
/// use tagmap::{Registry, Tag};
///
/// let mut registry = Registry::new();
///
/// let tag = registry.register("color").unwrap();
///
/// assert_eq!(tag.into_bits(), 0);
/// assert_eq!(registry.tag_of("color"), tag);
/// assert_eq!(registry.tag_of("size"), Tag::UNKNOWN);
/// ```
///
/// [`Registry`]: crate::registry::Registry
/// [`Registry::tag_of`]: crate::registry::Registry::tag_of
/// [`TagMap`]: crate::public::TagMap
/// [`LocalTagMap`]: crate::local::LocalTagMap
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Tag {
  bits: u32,
}

impl Tag {
  /// The sentinel returned for names without an assigned tag.
  pub const UNKNOWN: Self = Self { bits: u32::MAX };

  /// The largest tag a registry will ever assign.
  pub const MAX: Self = Self {
    bits: u32::MAX - 1,
  };

  /// Creates a [`Tag`] from its raw bit representation.
  ///
  /// # Warning
  ///
  /// A tag built this way is only meaningful for a registry that actually
  /// assigned it; indexing a map with anything else panics.
  #[inline]
  pub const fn from_bits(bits: u32) -> Self {
    Self { bits }
  }

  /// Returns the raw bit representation of this tag.
  #[inline]
  pub const fn into_bits(self) -> u32 {
    self.bits
  }

  /// Returns `true` if this is the [`UNKNOWN`] sentinel.
  ///
  /// [`UNKNOWN`]: Self::UNKNOWN
  #[inline]
  pub const fn is_unknown(self) -> bool {
    self.bits == Self::UNKNOWN.bits
  }

  #[inline]
  pub(crate) const fn from_index(index: usize) -> Self {
    debug_assert!(index <= Self::MAX.bits as usize, "tag index overflow");
    Self { bits: index as u32 }
  }

  #[inline]
  pub(crate) const fn index(self) -> usize {
    self.bits as usize
  }
}

impl Debug for Tag {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    if self.is_unknown() {
      f.write_str("UNKNOWN")
    } else {
      Debug::fmt(&self.bits, f)
    }
  }
}

impl Display for Tag {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    if self.is_unknown() {
      f.write_str("unknown")
    } else {
      Display::fmt(&self.bits, f)
    }
  }
}
