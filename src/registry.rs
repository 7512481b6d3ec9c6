//! Append-only bijection between names and tags.

use core::fmt::Debug;
use core::fmt::Formatter;
use core::fmt::Result as FmtResult;
use core::iter::Enumerate;
use core::iter::FusedIterator;
use core::slice;

use rustc_hash::FxBuildHasher;
use rustc_hash::FxHashMap;

use crate::error::RegistryError;
use crate::tag::Tag;
use crate::tag::TagName;

/// The single source of truth for the name <-> [`Tag`] mapping.
///
/// Names are assigned tags `0, 1, 2, ...` in registration order. Entries are
/// never removed or renumbered, so a tag handed out once stays valid for the
/// lifetime of the registry.
///
/// # Lifecycle
///
/// Registration requires `&mut self`. Value stores such as [`TagMap`] take
/// the registry behind an [`Arc`], which freezes it: every name has to be
/// registered before the first store is built, and a store's capacity is
/// the registry length at that moment.
///
/// ```
/// use std::sync::Arc;
/// use tagmap::{Registry, TagMap};
///
/// let mut registry = Registry::new();
///
/// registry.register("width").unwrap();
/// registry.register("height").unwrap();
///
/// let registry = Arc::new(registry);
/// let map: TagMap<u32> = TagMap::new(Arc::clone(&registry));
///
/// assert_eq!(map.capacity(), 2);
/// ```
///
/// [`Arc`]: std::sync::Arc
/// [`TagMap`]: crate::public::TagMap
#[derive(Clone, Default)]
pub struct Registry {
  names: Vec<TagName>,
  lookup: FxHashMap<TagName, Tag>,
}

impl Registry {
  /// Creates a new, empty registry.
  #[inline]
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a new, empty registry with room for `capacity` names.
  #[inline]
  pub fn with_capacity(capacity: usize) -> Self {
    Self {
      names: Vec::with_capacity(capacity),
      lookup: FxHashMap::with_capacity_and_hasher(capacity, FxBuildHasher),
    }
  }

  /// Returns the number of registered names.
  #[inline]
  pub fn len(&self) -> usize {
    self.names.len()
  }

  /// Returns `true` if no names have been registered.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  /// Registers a new name and returns its tag.
  ///
  /// The returned tag equals the registry length before the call.
  ///
  /// # Errors
  ///
  /// Returns [`RegistryError::DuplicateName`] if `name` is already
  /// registered, and [`RegistryError::Exhausted`] if no tag values are left.
  /// The registry is unchanged in both cases.
  ///
  /// # Examples
  ///
  /// ```
  /// use tagmap::{Registry, RegistryError};
  ///
  /// let mut registry = Registry::new();
  ///
  /// assert_eq!(registry.register("a").unwrap().into_bits(), 0);
  /// assert_eq!(registry.register("b").unwrap().into_bits(), 1);
  ///
  /// assert!(matches!(
  ///   registry.register("a"),
  ///   Err(RegistryError::DuplicateName(_)),
  /// ));
  /// ```
  pub fn register(&mut self, name: &str) -> Result<Tag, RegistryError> {
    if let Some((existing, tag)) = self.lookup.get_key_value(name) {
      tracing::debug!(name, %tag, "rejected duplicate tag name");
      return Err(RegistryError::DuplicateName(TagName::clone(existing)));
    }

    self.insert(name)
  }

  /// Returns the tag of `name`, registering it first if necessary.
  ///
  /// Calling this any number of times with the same name yields the same
  /// tag and registers the name at most once.
  ///
  /// # Errors
  ///
  /// Returns [`RegistryError::Exhausted`] if `name` is new and no tag values
  /// are left.
  pub fn register_or_reuse(&mut self, name: &str) -> Result<Tag, RegistryError> {
    match self.lookup.get(name) {
      Some(tag) => Ok(*tag),
      None => self.insert(name),
    }
  }

  /// Returns the name assigned to `tag`.
  ///
  /// # Panics
  ///
  /// Panics if `tag` was never assigned by this registry, including
  /// [`Tag::UNKNOWN`]. Use [`get_name`] for a non-panicking lookup.
  ///
  /// [`get_name`]: Self::get_name
  #[track_caller]
  #[inline]
  pub fn name_of(&self, tag: Tag) -> &TagName {
    match self.get_name(tag) {
      Some(name) => name,
      None => index_out_of_range(tag, self.len()),
    }
  }

  /// Returns the name assigned to `tag`, or `None` if it was never assigned.
  #[inline]
  pub fn get_name(&self, tag: Tag) -> Option<&TagName> {
    self.names.get(tag.index())
  }

  /// Returns the tag assigned to `name`, or [`Tag::UNKNOWN`].
  #[inline]
  pub fn tag_of(&self, name: &str) -> Tag {
    self.get_tag(name).unwrap_or(Tag::UNKNOWN)
  }

  /// Returns the tag assigned to `name`, or `None` if it was never
  /// registered.
  #[inline]
  pub fn get_tag(&self, name: &str) -> Option<Tag> {
    self.lookup.get(name).copied()
  }

  /// Returns `true` if `name` has a tag assigned.
  #[inline]
  pub fn contains(&self, name: &str) -> bool {
    self.lookup.contains_key(name)
  }

  /// Returns an iterator over `(tag, name)` pairs in tag order.
  #[inline]
  pub fn iter(&self) -> Iter<'_> {
    Iter {
      inner: self.names.iter().enumerate(),
    }
  }

  fn insert(&mut self, name: &str) -> Result<Tag, RegistryError> {
    if self.names.len() > Tag::MAX.index() {
      return Err(RegistryError::Exhausted);
    }

    let tag: Tag = Tag::from_index(self.names.len());
    let key: TagName = TagName::from(name);

    self.names.push(TagName::clone(&key));
    self.lookup.insert(key, tag);

    tracing::trace!(name, %tag, "registered tag");

    Ok(tag)
  }
}

impl Debug for Registry {
  fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
    f.debug_map().entries(self.iter()).finish()
  }
}

impl<'a> IntoIterator for &'a Registry {
  type Item = (Tag, &'a TagName);
  type IntoIter = Iter<'a>;

  #[inline]
  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

/// Registers every name with [`Registry::register_or_reuse`] semantics.
///
/// # Panics
///
/// Panics if the registry runs out of tag values.
impl<S> Extend<S> for Registry
where
  S: AsRef<str>,
{
  fn extend<I>(&mut self, iter: I)
  where
    I: IntoIterator<Item = S>,
  {
    for name in iter {
      if let Err(error) = self.register_or_reuse(name.as_ref()) {
        panic!("{error}");
      }
    }
  }
}

impl<S> FromIterator<S> for Registry
where
  S: AsRef<str>,
{
  fn from_iter<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = S>,
  {
    let mut this: Self = Self::new();
    this.extend(iter);
    this
  }
}

/// Iterator over the `(tag, name)` pairs of a [`Registry`].
///
/// Created by [`Registry::iter`].
#[derive(Clone, Debug)]
pub struct Iter<'a> {
  inner: Enumerate<slice::Iter<'a, TagName>>,
}

impl<'a> Iterator for Iter<'a> {
  type Item = (Tag, &'a TagName);

  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    self
      .inner
      .next()
      .map(|(index, name)| (Tag::from_index(index), name))
  }

  #[inline]
  fn size_hint(&self) -> (usize, Option<usize>) {
    self.inner.size_hint()
  }
}

impl DoubleEndedIterator for Iter<'_> {
  #[inline]
  fn next_back(&mut self) -> Option<Self::Item> {
    self
      .inner
      .next_back()
      .map(|(index, name)| (Tag::from_index(index), name))
  }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

#[cold]
#[inline(never)]
#[track_caller]
fn index_out_of_range(tag: Tag, len: usize) -> ! {
  panic!("index out of range: tag {tag} is not assigned (registry holds {len} names)");
}
